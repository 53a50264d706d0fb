use super::*;
use crate::config::Config;
use crate::parser::{FileType, ParsedFile, parse_content};

fn sql_file(path: &str, content: &str) -> ParsedFile {
    parse_content(path, FileType::Sql, content)
}

fn indexed(files: &[ParsedFile]) -> Indexer {
    let indexer = Indexer::new(Config::default());
    indexer.index(files).expect("should index files");
    indexer
}

fn sales_files() -> Vec<ParsedFile> {
    vec![
        sql_file(
            "ddl/orders.sql",
            "CREATE TABLE sales.orders (order_id INT, amount DECIMAL(12,2));",
        ),
        sql_file(
            "etl/orders_load.sql",
            "INSERT INTO sales.orders SELECT id AS order_id, amt AS amount FROM stage.orders_raw;",
        ),
        sql_file(
            "ddl/customers.sql",
            "CREATE TABLE sales.customers (customer_id INT, amount DECIMAL(12,2));",
        ),
        sql_file(
            "reports/daily.sql",
            "SELECT amount FROM reporting.daily_summary WHERE run_date = CURRENT_DATE;",
        ),
    ]
}

#[test]
fn fan_out_queries_are_ordered() {
    assert_eq!(
        fan_out_queries("SALES.ORDERS", "AMOUNT"),
        [
            "SALES.ORDERS AMOUNT".to_string(),
            "INSERT INTO SALES.ORDERS".to_string(),
            "CREATE TABLE SALES.ORDERS".to_string(),
            "SELECT AMOUNT".to_string(),
            "SALES.ORDERS".to_string(),
        ]
    );
}

#[test]
fn empty_index_returns_nothing() {
    let indexer = Indexer::new(Config::default());
    assert!(Retriever::new(&indexer).find_relevant_chunks("CUSTOMER", "ID").is_empty());
}

#[test]
fn empty_table_or_column_returns_nothing() {
    let indexer = indexed(&sales_files());
    let retriever = Retriever::new(&indexer);

    assert!(retriever.find_relevant_chunks("", "AMOUNT").is_empty());
    assert!(retriever.find_relevant_chunks("SALES.ORDERS", "").is_empty());
}

#[test]
fn single_matching_chunk_is_found() {
    let indexer = indexed(&[sql_file("customer.sql", "CREATE TABLE CUSTOMER (ID INT)")]);

    let chunks = Retriever::new(&indexer).find_relevant_chunks("CUSTOMER", "ID");

    assert!(chunks.iter().any(|c| c.id == "customer.sql:stmt_0"));
    assert!(chunks.iter().all(|c| c.context.file_path == "customer.sql"));
}

#[test]
fn only_chunks_mentioning_the_table_are_kept() {
    let indexer = indexed(&sales_files());

    let chunks = Retriever::new(&indexer).find_relevant_chunks("SALES.ORDERS", "AMOUNT");

    assert!(!chunks.is_empty());
    for chunk in &chunks {
        assert!(chunk.text.to_uppercase().contains("SALES.ORDERS"), "{}", chunk.id);
    }
    assert!(chunks.iter().all(|c| c.context.file_path != "ddl/customers.sql"));
    assert!(chunks.iter().all(|c| c.context.file_path != "reports/daily.sql"));
}

#[test]
fn table_match_is_case_insensitive() {
    let indexer = indexed(&sales_files());
    let retriever = Retriever::new(&indexer);

    let upper: Vec<String> = retriever
        .find_relevant_chunks("SALES.ORDERS", "AMOUNT")
        .into_iter()
        .map(|c| c.id)
        .collect();
    let lower: Vec<String> = retriever
        .find_relevant_chunks("sales.orders", "amount")
        .into_iter()
        .map(|c| c.id)
        .collect();

    assert!(!lower.is_empty());
    assert_eq!(upper, lower);
}

#[test]
fn column_does_not_filter() {
    let indexer = indexed(&[sql_file(
        "ddl/orders.sql",
        "CREATE TABLE sales.orders (order_id INT);",
    )]);

    let chunks = Retriever::new(&indexer).find_relevant_chunks("SALES.ORDERS", "NOT_A_COLUMN");

    assert_eq!(chunks.len(), 2);
}

#[test]
fn results_have_unique_ids() {
    let indexer = indexed(&sales_files());

    let chunks = Retriever::new(&indexer).find_relevant_chunks("SALES.ORDERS", "AMOUNT");
    let mut ids: Vec<&str> = chunks.iter().map(|c| c.id.as_str()).collect();
    let total = ids.len();
    ids.sort_unstable();
    ids.dedup();

    assert_eq!(ids.len(), total);
}

#[test]
fn results_follow_query_order() {
    let indexer = indexed(&sales_files());
    let retriever = Retriever::with_top_k(&indexer, 3);

    let mut expected: Vec<String> = Vec::new();
    for query in fan_out_queries("SALES.ORDERS", "AMOUNT") {
        for chunk in indexer.retrieve(&query, 3) {
            if !expected.contains(&chunk.id) && chunk.text.to_uppercase().contains("SALES.ORDERS") {
                expected.push(chunk.id);
            }
        }
    }

    let actual: Vec<String> = retriever
        .find_relevant_chunks("SALES.ORDERS", "AMOUNT")
        .into_iter()
        .map(|c| c.id)
        .collect();
    assert_eq!(actual, expected);
}

#[test]
fn per_query_top_k_bounds_the_result() {
    let indexer = indexed(&sales_files());

    let chunks = Retriever::with_top_k(&indexer, 1).find_relevant_chunks("SALES.ORDERS", "AMOUNT");

    assert!(chunks.len() <= 5);
}
