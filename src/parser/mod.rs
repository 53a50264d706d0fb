// Parser module
// Turns a local checkout of Teradata code into structured `ParsedFile` records


use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use fancy_regex::Regex;
use ignore::WalkBuilder;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{LineageError, Result};

/// Statements shorter than this (after trimming) are treated as noise
const MIN_STATEMENT_LENGTH: usize = 10;

static TABLE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"(?i)CREATE\s+(?:MULTISET\s+|SET\s+)?TABLE\s+(\w+\.\w+|\w+)")
            .expect("valid regex"),
        Regex::new(r"(?i)INSERT\s+INTO\s+(\w+\.\w+|\w+)").expect("valid regex"),
        Regex::new(r"(?i)FROM\s+(\w+\.\w+|\w+)").expect("valid regex"),
        Regex::new(r"(?i)(?:INNER|LEFT|RIGHT|FULL|CROSS)?\s*JOIN\s+(\w+\.\w+|\w+)")
            .expect("valid regex"),
        Regex::new(r"(?i)UPDATE\s+(\w+\.\w+|\w+)").expect("valid regex"),
        Regex::new(r"(?i)MERGE\s+INTO\s+(\w+\.\w+|\w+)").expect("valid regex"),
    ]
});

static BTEQ_LOGON: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\.LOGON\s+(\S+)").expect("valid regex"));

static SELECT_CLAUSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)SELECT\s+(.*?)\s+FROM").expect("valid regex"));

static COLUMN_DEFINITION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)(\w+)\s+AS\s+(.+?)(?:,|\s+FROM|\s+WHERE|\)|$)").expect("valid regex")
});

static HEREDOC_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<<\s*EOF.*?EOF").expect("valid regex"));

static QUOTED_SQL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)["']([^"']*(?:SELECT|INSERT|UPDATE|DELETE|CREATE|MERGE)[^"']*)["']"#)
        .expect("valid regex")
});

/// Kind of source file, decided by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Sql,
    Bteq,
    Ksh,
}

impl FileType {
    /// Classify a path by its extension, `None` for files we do not read
    #[inline]
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "sql" => Some(Self::Sql),
            "bteq" | "btq" => Some(Self::Bteq),
            "ksh" | "sh" | "bash" => Some(Self::Ksh),
            _ => None,
        }
    }

    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sql => "sql",
            Self::Bteq => "bteq",
            Self::Ksh => "ksh",
        }
    }
}

impl fmt::Display for FileType {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Leading keyword of a SQL statement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StatementType {
    Select,
    Insert,
    Update,
    Delete,
    Create,
    Merge,
    Drop,
    Other,
}

impl StatementType {
    /// Classify a statement by its first keyword
    #[inline]
    pub fn classify(statement: &str) -> Self {
        let upper = statement.trim().to_uppercase();
        [
            ("SELECT", Self::Select),
            ("INSERT", Self::Insert),
            ("UPDATE", Self::Update),
            ("DELETE", Self::Delete),
            ("CREATE", Self::Create),
            ("MERGE", Self::Merge),
            ("DROP", Self::Drop),
        ]
        .into_iter()
        .find_map(|(keyword, kind)| upper.starts_with(keyword).then_some(kind))
        .unwrap_or(Self::Other)
    }

    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Select => "SELECT",
            Self::Insert => "INSERT",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
            Self::Create => "CREATE",
            Self::Merge => "MERGE",
            Self::Drop => "DROP",
            Self::Other => "OTHER",
        }
    }
}

impl fmt::Display for StatementType {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A `<name> AS <expression>` pair from a SELECT list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDefinition {
    pub name: String,
    pub expression: String,
}

/// One SQL statement extracted from a file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SqlStatement {
    /// Position of the statement in the raw `;` split of its source text
    pub statement_id: usize,
    #[serde(rename = "type")]
    pub statement_type: StatementType,
    pub content: String,
    /// Uppercase, deduplicated, sorted
    pub tables: Vec<String>,
    #[serde(default)]
    pub columns: Vec<ColumnDefinition>,
}

/// Extra facts recorded while parsing a file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMetadata {
    pub size: usize,
    pub line_count: usize,
    /// `.LOGON` target of a BTEQ script
    pub logon: Option<String>,
    /// Number of SQL blocks found in a shell script
    pub sql_blocks: Option<usize>,
}

/// A source file with its extracted SQL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedFile {
    /// Path relative to the repository root
    pub file_path: String,
    pub file_type: FileType,
    pub content: String,
    pub sql_statements: Vec<SqlStatement>,
    pub tables_referenced: Vec<String>,
    #[serde(default)]
    pub metadata: FileMetadata,
}

impl ParsedFile {
    /// Whether this file references `table` (case-insensitive, exact name)
    #[inline]
    pub fn references_table(&self, table: &str) -> bool {
        let table = table.to_uppercase();
        self.tables_referenced
            .iter()
            .any(|t| t.to_uppercase() == table)
    }
}

/// Walks a repository checkout and parses every Teradata-related file
#[derive(Debug, Clone)]
pub struct TeradataParser {
    repo_path: PathBuf,
}

impl TeradataParser {
    #[inline]
    pub fn new(repo_path: impl Into<PathBuf>) -> Self {
        Self {
            repo_path: repo_path.into(),
        }
    }

    #[inline]
    pub fn repo_path(&self) -> &Path {
        &self.repo_path
    }

    /// Parse all `.sql`, `.bteq`, `.btq`, `.ksh`, `.sh` and `.bash` files under the repository.
    ///
    /// Unreadable files are logged and skipped. Results are ordered by path.
    #[inline]
    pub fn parse_all_files(&self) -> Result<Vec<ParsedFile>> {
        if !self.repo_path.is_dir() {
            return Err(LineageError::Parse(format!(
                "Repository path is not a directory: {}",
                self.repo_path.display()
            )));
        }

        info!("Parsing Teradata sources under {}", self.repo_path.display());

        let walker = WalkBuilder::new(&self.repo_path)
            .sort_by_file_name(|a, b| a.cmp(b))
            .build();

        let mut parsed_files = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable directory entry: {}", e);
                    continue;
                }
            };

            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }

            match self.parse_file(entry.path()) {
                Ok(Some(parsed)) => parsed_files.push(parsed),
                Ok(None) => {}
                Err(e) => warn!("Error parsing {}: {}", entry.path().display(), e),
            }
        }

        info!("Parsed {} files", parsed_files.len());
        Ok(parsed_files)
    }

    /// Parse a single file; `Ok(None)` when the extension is not one we handle
    #[inline]
    pub fn parse_file(&self, path: &Path) -> Result<Option<ParsedFile>> {
        let Some(file_type) = FileType::from_path(path) else {
            return Ok(None);
        };

        let bytes = fs::read(path)?;
        let content = String::from_utf8_lossy(&bytes);
        let relative = path.strip_prefix(&self.repo_path).unwrap_or(path);

        Ok(Some(parse_content(
            &relative.to_string_lossy(),
            file_type,
            &content,
        )))
    }
}

/// Parse already-loaded file content
#[inline]
pub fn parse_content(file_path: &str, file_type: FileType, content: &str) -> ParsedFile {
    let mut metadata = FileMetadata {
        size: content.len(),
        line_count: content.matches('\n').count() + 1,
        ..FileMetadata::default()
    };

    let sql_text = match file_type {
        FileType::Sql => content.to_string(),
        FileType::Bteq => {
            metadata.logon = match BTEQ_LOGON.captures(content) {
                Ok(Some(captures)) => captures.get(1).map(|m| m.as_str().to_string()),
                _ => None,
            };
            strip_bteq_commands(content)
        }
        FileType::Ksh => {
            let blocks = extract_shell_sql_blocks(content);
            metadata.sql_blocks = Some(blocks.len());
            blocks.join("\n")
        }
    };

    let sql_statements = extract_sql_statements(&sql_text);
    let tables_referenced = extract_tables(&sql_text);

    debug!(
        "Parsed {} ({}): {} statements, {} tables",
        file_path,
        file_type,
        sql_statements.len(),
        tables_referenced.len()
    );

    ParsedFile {
        file_path: file_path.to_string(),
        file_type,
        content: content.to_string(),
        sql_statements,
        tables_referenced,
        metadata,
    }
}

/// Blank out BTEQ dot-commands so only SQL remains
fn strip_bteq_commands(content: &str) -> String {
    content
        .lines()
        .map(|line| {
            if line.trim_start().starts_with('.') {
                ""
            } else {
                line
            }
        })
        .join("\n")
}

/// Collect heredoc bodies and quoted SQL strings from a shell script
fn extract_shell_sql_blocks(content: &str) -> Vec<String> {
    let heredocs = HEREDOC_BLOCK
        .find_iter(content)
        .filter_map(|m| m.ok())
        .map(|m| m.as_str().to_string());

    let quoted = QUOTED_SQL
        .captures_iter(content)
        .filter_map(|c| c.ok())
        .filter_map(|c| c.get(1).map(|m| m.as_str().to_string()));

    heredocs.chain(quoted).collect()
}

/// Split SQL text on `;` and describe each meaningful statement
#[inline]
pub fn extract_sql_statements(content: &str) -> Vec<SqlStatement> {
    content
        .split(';')
        .enumerate()
        .filter_map(|(statement_id, raw)| {
            let statement = raw.trim();
            if statement.chars().count() < MIN_STATEMENT_LENGTH {
                return None;
            }

            let columns = if statement.to_uppercase().contains("SELECT") {
                extract_columns(statement)
            } else {
                Vec::new()
            };

            Some(SqlStatement {
                statement_id,
                statement_type: StatementType::classify(statement),
                content: statement.to_string(),
                tables: extract_tables(statement),
                columns,
            })
        })
        .collect()
}

/// All table names referenced in `content`, uppercased, deduplicated and sorted
#[inline]
pub fn extract_tables(content: &str) -> Vec<String> {
    TABLE_PATTERNS
        .iter()
        .flat_map(|pattern| pattern.captures_iter(content))
        .filter_map(|c| c.ok())
        .filter_map(|c| c.get(1).map(|m| m.as_str().replace(['"', '\''], "")))
        .map(|name| name.trim().to_uppercase())
        .filter(|name| !name.is_empty())
        .sorted()
        .dedup()
        .collect()
}

/// `AS` column definitions from the SELECT list of a statement
#[inline]
pub fn extract_columns(statement: &str) -> Vec<ColumnDefinition> {
    let select_list = match SELECT_CLAUSE.captures(statement) {
        Ok(Some(captures)) => match captures.get(1) {
            Some(m) => m.as_str(),
            None => return Vec::new(),
        },
        _ => return Vec::new(),
    };

    COLUMN_DEFINITION
        .captures_iter(select_list)
        .filter_map(|c| c.ok())
        .filter_map(|c| {
            let name = c.get(1)?.as_str().trim().to_uppercase();
            let expression = c.get(2)?.as_str().trim().to_string();
            Some(ColumnDefinition { name, expression })
        })
        .collect()
}

/// Files whose referenced tables include `table`
#[inline]
pub fn files_referencing_table<'a>(table: &str, files: &'a [ParsedFile]) -> Vec<&'a ParsedFile> {
    files.iter().filter(|f| f.references_table(table)).collect()
}
