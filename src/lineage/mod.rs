// Lineage module
// Retrieval-augmented column lineage: gather code, prompt the LLM, read back a report

pub mod report;


use itertools::Itertools;
use tracing::{debug, info, warn};

use crate::embeddings::chunking::Chunk;
use crate::indexer::Indexer;
use crate::llm::LlmClient;
use crate::retriever::Retriever;
use crate::Result;

pub use report::{LineageReport, LineageStep, SourceTable, Target, Transformation};

/// Characters of an unparsed response kept as the fallback summary
const FALLBACK_SUMMARY_CHARS: usize = 500;
/// Characters of an unparsed response kept as the fallback code snippet
const FALLBACK_SNIPPET_CHARS: usize = 1000;

/// Traces how a column is derived using the indexed code and an LLM
pub struct LineageAnalyzer<'a> {
    indexer: &'a Indexer,
    llm: &'a dyn LlmClient,
}

impl<'a> LineageAnalyzer<'a> {
    #[inline]
    pub fn new(indexer: &'a Indexer, llm: &'a dyn LlmClient) -> Self {
        Self { indexer, llm }
    }

    /// Lineage of `table.column`, or `None` when no relevant code is indexed
    #[inline]
    pub fn analyze_column_lineage(
        &self,
        table: &str,
        column: &str,
        max_depth: u32,
    ) -> Result<Option<LineageReport>> {
        info!("Analyzing lineage for {}.{}", table, column);

        let chunks = Retriever::new(self.indexer).find_relevant_chunks(table, column);
        if chunks.is_empty() {
            info!("No relevant code found for {}.{}", table, column);
            return Ok(None);
        }
        info!("Found {} relevant code chunks", chunks.len());

        let config = self.indexer.config();
        let context = prepare_context(&chunks, config.retrieval.context_chunk_limit);
        let prompt = create_lineage_prompt(table, column, &context, max_depth);
        debug!("Lineage prompt is {} characters", prompt.chars().count());

        // A failed request still yields a report carrying the error text
        let response = self
            .llm
            .complete(&prompt, config.llm.max_tokens)
            .unwrap_or_else(|e| {
                warn!("LLM request via {} failed: {:#}", self.llm.describe(), e);
                format!("Error querying LLM: {e:#}")
            });

        let report = parse_llm_response(&response, table, column);
        if report.is_fallback() {
            warn!("LLM response was not a lineage report, kept as raw text");
        }
        Ok(Some(report))
    }
}

/// Render the first `limit` chunks as numbered code sections
#[inline]
pub fn prepare_context(chunks: &[Chunk], limit: usize) -> String {
    chunks
        .iter()
        .take(limit)
        .enumerate()
        .map(|(i, chunk)| {
            let statement_type = chunk
                .statement_type()
                .map_or("Unknown", |statement_type| statement_type.as_str());

            format!(
                "\n--- Code Chunk {} ---\nFile: {}\nType: {}\nTables: {}\n\n{}\n",
                i + 1,
                chunk.context.file_path,
                statement_type,
                chunk.tables().join(", "),
                chunk.text
            )
        })
        .join("\n")
}

/// Instructions, code context and the expected JSON shape for one column
#[inline]
pub fn create_lineage_prompt(table: &str, column: &str, context: &str, max_depth: u32) -> String {
    format!(
        concat!(
            "You are a Teradata SQL expert analyzing data lineage. Your task is to trace how a \
             specific column in a table is derived from source data.\n\n\
             TARGET COLUMN TO ANALYZE:\nTable: {table}\nColumn: {column}\n\n\
             AVAILABLE CODE:\n{context}\n\n",
            "INSTRUCTIONS:\n\
             1. Analyze the provided Teradata code to understand how {column} in {table} is populated\n\
             2. Trace back through all transformations to identify:\n   \
                - Source tables and columns\n   \
                - SQL transformations (calculations, aggregations, CASE statements, etc.)\n   \
                - Join conditions\n   \
                - Filter conditions (WHERE clauses)\n   \
                - Any intermediate tables\n\n\
             3. Build a complete lineage chain showing:\n   \
                - Each step in the data flow\n   \
                - The SQL logic at each step\n   \
                - Which file contains each transformation\n\n\
             4. Provide your analysis in the following JSON format:\n\n",
            r#"{{
  "summary": "Brief description of how the column is derived",
  "target": {{
    "table": "{table}",
    "column": "{column}"
  }},
  "lineage_chain": [
    {{
      "level": 1,
      "table": "TARGET_TABLE",
      "column": "TARGET_COLUMN",
      "operation": "INSERT/CREATE/UPDATE",
      "source_file": "path/to/file.sql",
      "code_snippet": "relevant SQL code",
      "line_number": 10
    }},
    {{
      "level": 2,
      "table": "INTERMEDIATE_TABLE",
      "column": "SOURCE_COLUMN",
      "operation": "SELECT with transformation",
      "transformation": "SUM(amount) AS total",
      "source_file": "path/to/file.sql",
      "code_snippet": "relevant SQL code"
    }}
  ],
  "source_tables": [
    {{
      "table_name": "SOURCE_TABLE_1",
      "columns": ["col1", "col2"],
      "join_type": "LEFT JOIN",
      "filter_conditions": "WHERE date > '2024-01-01'"
    }}
  ],
  "transformations": [
    {{
      "type": "aggregation",
      "expression": "SUM(amount)",
      "description": "Aggregates transaction amounts"
    }}
  ]
}}
"#,
            "\nIMPORTANT:\n\
             - If you cannot find the lineage, explain why\n\
             - Include actual SQL code snippets\n\
             - Be specific about file paths and line numbers when visible\n\
             - Trace back to the original source tables, at most {max_depth} levels upstream\n\
             - Handle Teradata-specific syntax (QUALIFY, SAMPLE, COLLECT STATISTICS, etc.)\n\n\
             Provide your analysis:"
        ),
        table = table,
        column = column,
        context = context,
        max_depth = max_depth,
    )
}

/// Read a report from the outermost `{...}` span of `response`.
///
/// Anything that does not parse becomes a single-step fallback report that
/// keeps the raw text.
#[inline]
pub fn parse_llm_response(response: &str, table: &str, column: &str) -> LineageReport {
    if let Some(json) = outermost_object(response) {
        match serde_json::from_str::<LineageReport>(json) {
            Ok(mut report) => {
                if report.target.table.is_empty() {
                    report.target.table = table.to_string();
                }
                if report.target.column.is_empty() {
                    report.target.column = column.to_string();
                }
                return report;
            }
            Err(e) => debug!("Response JSON did not match the report shape: {}", e),
        }
    }

    fallback_report(response, table, column)
}

fn outermost_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    text.get(start..=end)
}

fn fallback_report(response: &str, table: &str, column: &str) -> LineageReport {
    LineageReport {
        summary: response.chars().take(FALLBACK_SUMMARY_CHARS).collect(),
        target: Target {
            table: table.to_string(),
            column: column.to_string(),
        },
        lineage_chain: vec![LineageStep {
            level: 1,
            table: table.to_string(),
            column: column.to_string(),
            operation: "Unknown".to_string(),
            source_file: "Not parsed".to_string(),
            code_snippet: response.chars().take(FALLBACK_SNIPPET_CHARS).collect(),
            ..LineageStep::default()
        }],
        source_tables: Vec::new(),
        transformations: Vec::new(),
        raw_response: Some(response.to_string()),
    }
}
