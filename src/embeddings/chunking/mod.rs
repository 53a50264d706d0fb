#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::parser::{ColumnDefinition, FileType, ParsedFile, StatementType};

/// Source file a chunk was cut from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileContext {
    pub file_path: String,
    pub file_type: FileType,
}

/// What a chunk describes, with the fields that kind carries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "chunk_type", rename_all = "lowercase")]
pub enum ChunkKind {
    /// File-level header plus a prefix of the raw file
    Metadata { tables: Vec<String> },
    /// A single extracted SQL statement
    Statement {
        statement_type: StatementType,
        tables: Vec<String>,
        columns: Vec<ColumnDefinition>,
    },
}

/// A retrievable unit of text with its provenance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// `<file_path>:metadata` or `<file_path>:stmt_<statement_id>`
    pub id: String,
    /// The text that gets embedded and searched
    pub text: String,
    pub context: FileContext,
    pub kind: ChunkKind,
}

impl Chunk {
    /// Tables referenced by the file (metadata chunk) or by the statement
    #[inline]
    pub fn tables(&self) -> &[String] {
        match &self.kind {
            ChunkKind::Metadata { tables } | ChunkKind::Statement { tables, .. } => tables,
        }
    }

    #[inline]
    pub fn statement_type(&self) -> Option<StatementType> {
        match &self.kind {
            ChunkKind::Metadata { .. } => None,
            ChunkKind::Statement { statement_type, .. } => Some(*statement_type),
        }
    }

    #[inline]
    pub fn columns(&self) -> &[ColumnDefinition] {
        match &self.kind {
            ChunkKind::Metadata { .. } => &[],
            ChunkKind::Statement { columns, .. } => columns,
        }
    }

    #[inline]
    pub fn is_metadata(&self) -> bool {
        matches!(self.kind, ChunkKind::Metadata { .. })
    }
}

/// Configuration for chunking parsed files
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Characters of raw file content appended to the metadata chunk
    pub metadata_prefix_chars: usize,
}

impl Default for ChunkingConfig {
    #[inline]
    fn default() -> Self {
        Self {
            metadata_prefix_chars: 1000,
        }
    }
}

/// Chunk every file, preserving input order
#[inline]
pub fn chunk_files(files: &[ParsedFile], config: &ChunkingConfig) -> Vec<Chunk> {
    let chunks: Vec<Chunk> = files
        .iter()
        .flat_map(|file| chunk_file(file, config))
        .collect();

    debug!("Chunked {} files into {} chunks", files.len(), chunks.len());
    chunks
}

/// Cut one parsed file into a metadata chunk followed by one chunk per statement
#[inline]
pub fn chunk_file(file: &ParsedFile, config: &ChunkingConfig) -> Vec<Chunk> {
    let context = FileContext {
        file_path: file.file_path.clone(),
        file_type: file.file_type,
    };

    let mut chunks = Vec::with_capacity(file.sql_statements.len() + 1);

    let header = format!(
        "\nFile: {}\nType: {}\nTables Referenced: {}\n",
        file.file_path,
        file.file_type,
        file.tables_referenced.join(", ")
    );
    let prefix: String = file
        .content
        .chars()
        .take(config.metadata_prefix_chars)
        .collect();

    chunks.push(Chunk {
        id: format!("{}:metadata", file.file_path),
        text: format!("{}\n{}", header, prefix),
        context: context.clone(),
        kind: ChunkKind::Metadata {
            tables: file.tables_referenced.clone(),
        },
    });

    for statement in &file.sql_statements {
        let text = format!(
            "\nFile: {}\nStatement Type: {}\nTables: {}\nSQL:\n{}\n",
            file.file_path,
            statement.statement_type,
            statement.tables.join(", "),
            statement.content
        );

        chunks.push(Chunk {
            id: format!("{}:stmt_{}", file.file_path, statement.statement_id),
            text,
            context: context.clone(),
            kind: ChunkKind::Statement {
                statement_type: statement.statement_type,
                tables: statement.tables.clone(),
                columns: statement.columns.clone(),
            },
        });
    }

    chunks
}
