use super::*;
use crate::parser::{SqlStatement, parse_content};

fn create_test_file() -> ParsedFile {
    ParsedFile {
        file_path: "etl/load_orders.sql".to_string(),
        file_type: FileType::Sql,
        content: "INSERT INTO dw.orders SELECT * FROM stg.orders;".to_string(),
        sql_statements: vec![
            SqlStatement {
                statement_id: 0,
                statement_type: StatementType::Insert,
                content: "INSERT INTO dw.orders SELECT * FROM stg.orders".to_string(),
                tables: vec!["DW.ORDERS".to_string(), "STG.ORDERS".to_string()],
                columns: Vec::new(),
            },
            SqlStatement {
                statement_id: 2,
                statement_type: StatementType::Select,
                content: "SELECT amount AS total FROM dw.orders".to_string(),
                tables: vec!["DW.ORDERS".to_string()],
                columns: vec![ColumnDefinition {
                    name: "AMOUNT".to_string(),
                    expression: "total".to_string(),
                }],
            },
        ],
        tables_referenced: vec!["DW.ORDERS".to_string(), "STG.ORDERS".to_string()],
        metadata: Default::default(),
    }
}

#[test]
fn metadata_chunk_then_statement_chunks() {
    let file = create_test_file();
    let chunks = chunk_file(&file, &ChunkingConfig::default());

    assert_eq!(chunks.len(), 3);
    assert_eq!(chunks[0].id, "etl/load_orders.sql:metadata");
    assert_eq!(chunks[1].id, "etl/load_orders.sql:stmt_0");
    assert_eq!(chunks[2].id, "etl/load_orders.sql:stmt_2");
    assert!(chunks[0].is_metadata());
    assert_eq!(chunks[1].statement_type(), Some(StatementType::Insert));
    assert_eq!(chunks[2].columns().len(), 1);
}

#[test]
fn metadata_chunk_text_layout() {
    let file = create_test_file();
    let chunks = chunk_file(&file, &ChunkingConfig::default());

    assert_eq!(
        chunks[0].text,
        "\nFile: etl/load_orders.sql\nType: sql\nTables Referenced: DW.ORDERS, STG.ORDERS\n\n\
INSERT INTO dw.orders SELECT * FROM stg.orders;"
    );
    assert_eq!(chunks[0].tables(), ["DW.ORDERS", "STG.ORDERS"]);
    assert_eq!(chunks[0].statement_type(), None);
}

#[test]
fn statement_chunk_text_layout() {
    let file = create_test_file();
    let chunks = chunk_file(&file, &ChunkingConfig::default());

    assert_eq!(
        chunks[1].text,
        "\nFile: etl/load_orders.sql\nStatement Type: INSERT\nTables: DW.ORDERS, STG.ORDERS\nSQL:\n\
INSERT INTO dw.orders SELECT * FROM stg.orders\n"
    );
    assert_eq!(chunks[1].context.file_type, FileType::Sql);
}

#[test]
fn metadata_prefix_is_truncated_by_characters() {
    let mut file = create_test_file();
    file.content = "é".repeat(1500);
    file.sql_statements.clear();

    let chunks = chunk_file(&file, &ChunkingConfig::default());

    assert_eq!(chunks.len(), 1);
    let prefix = chunks[0]
        .text
        .rsplit("\n\n")
        .next()
        .expect("metadata text has a prefix section");
    assert_eq!(prefix.chars().count(), 1000);
}

#[test]
fn custom_prefix_length() {
    let file = create_test_file();
    let config = ChunkingConfig {
        metadata_prefix_chars: 6,
    };

    let chunks = chunk_file(&file, &config);
    assert!(chunks[0].text.ends_with("\n\nINSERT"));
}

#[test]
fn file_without_statements_yields_only_metadata() {
    let file = parse_content("notes.sql", FileType::Sql, "-- tbd");
    let chunks = chunk_file(&file, &ChunkingConfig::default());

    assert_eq!(chunks.len(), 1);
    assert!(chunks[0].is_metadata());
}

#[test]
fn chunk_files_keeps_input_order() {
    let first = create_test_file();
    let second = parse_content("b.sql", FileType::Sql, "DELETE FROM dw.orders WHERE 1 = 1;");

    let chunks = chunk_files(&[first, second], &ChunkingConfig::default());
    let ids: Vec<&str> = chunks.iter().map(|c| c.id.as_str()).collect();

    assert_eq!(
        ids,
        vec![
            "etl/load_orders.sql:metadata",
            "etl/load_orders.sql:stmt_0",
            "etl/load_orders.sql:stmt_2",
            "b.sql:metadata",
            "b.sql:stmt_0",
        ]
    );
}

#[test]
fn chunk_serializes_with_kind_tag() {
    let chunks = chunk_file(&create_test_file(), &ChunkingConfig::default());
    let json = serde_json::to_value(&chunks[1]).expect("can serialize chunk");

    assert_eq!(json["kind"]["chunk_type"], "statement");
    assert_eq!(json["kind"]["statement_type"], "INSERT");
    assert_eq!(json["context"]["file_type"], "sql");
}
