use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// Column whose lineage was requested
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Target {
    pub table: String,
    pub column: String,
}

/// One hop in the derivation chain; level 1 is the target itself
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineageStep {
    pub level: u32,
    pub table: String,
    pub column: String,
    pub operation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transformation: Option<String>,
    pub source_file: String,
    pub code_snippet: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_number: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceTable {
    pub table_name: String,
    pub columns: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub join_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter_conditions: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Transformation {
    #[serde(rename = "type")]
    pub transformation_type: String,
    pub expression: String,
    pub description: String,
}

/// Lineage of one column as inferred by the LLM
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineageReport {
    pub summary: String,
    pub target: Target,
    pub lineage_chain: Vec<LineageStep>,
    pub source_tables: Vec<SourceTable>,
    pub transformations: Vec<Transformation>,
    /// Set when the response could not be parsed as a report
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,
}

impl LineageReport {
    /// A report has at least one chain step
    #[inline]
    pub fn validate(&self) -> bool {
        !self.lineage_chain.is_empty()
    }

    /// Whether this report came from the unparsed-response fallback
    #[inline]
    pub fn is_fallback(&self) -> bool {
        self.raw_response.is_some()
    }

    /// Every table named by a chain step or source table, sorted and unique
    #[inline]
    pub fn upstream_tables(&self) -> Vec<String> {
        let chain = self.lineage_chain.iter().map(|step| step.table.as_str());
        let sources = self.source_tables.iter().map(|source| source.table_name.as_str());

        chain
            .chain(sources)
            .filter(|table| !table.is_empty())
            .sorted_unstable()
            .dedup()
            .map(str::to_string)
            .collect()
    }

    #[inline]
    pub fn transformations_summary(&self) -> String {
        if self.transformations.is_empty() {
            return "No transformations identified".to_string();
        }

        let mut lines = Vec::new();
        for (i, transformation) in self.transformations.iter().enumerate() {
            let kind = non_empty_or(&transformation.transformation_type, "Unknown");
            let expression = non_empty_or(&transformation.expression, "N/A");
            lines.push(format!("{}. {}: {}", i + 1, kind, expression));

            if !transformation.description.is_empty() {
                lines.push(format!("   {}", transformation.description));
            }
        }

        lines.join("\n")
    }
}

fn non_empty_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.is_empty() { fallback } else { value }
}
