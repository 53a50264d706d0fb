// Retriever module
// Multi-query fan-out that gathers the chunks relevant to one table column

#[cfg(test)]
mod tests;

use std::collections::HashSet;

use tracing::debug;

use crate::embeddings::chunking::Chunk;
use crate::indexer::Indexer;

/// Queries issued for `table`/`column`, in the order their results are merged
#[inline]
pub fn fan_out_queries(table: &str, column: &str) -> [String; 5] {
    [
        format!("{table} {column}"),
        format!("INSERT INTO {table}"),
        format!("CREATE TABLE {table}"),
        format!("SELECT {column}"),
        table.to_string(),
    ]
}

/// Finds code relevant to a column by querying the current corpus several ways
#[derive(Debug, Clone, Copy)]
pub struct Retriever<'a> {
    indexer: &'a Indexer,
    per_query_top_k: usize,
}

impl<'a> Retriever<'a> {
    /// Retriever using the indexer's configured per-query result count
    #[inline]
    pub fn new(indexer: &'a Indexer) -> Self {
        Self::with_top_k(indexer, indexer.config().retrieval.per_query_top_k)
    }

    #[inline]
    pub fn with_top_k(indexer: &'a Indexer, per_query_top_k: usize) -> Self {
        Self {
            indexer,
            per_query_top_k,
        }
    }

    /// Chunks relevant to `table.column`, in fan-out order.
    ///
    /// Results of every query are merged in query order, a chunk id seen before
    /// is dropped, and only chunks whose text mentions `table`
    /// (case-insensitive) are kept. All queries run against one corpus
    /// snapshot, so a concurrent re-index cannot mix corpora in one result.
    #[inline]
    pub fn find_relevant_chunks(&self, table: &str, column: &str) -> Vec<Chunk> {
        if table.trim().is_empty() || column.trim().is_empty() {
            return Vec::new();
        }

        let corpus = self.indexer.current();
        if corpus.is_empty() {
            return Vec::new();
        }

        let table_upper = table.to_uppercase();
        let mut seen: HashSet<String> = HashSet::new();
        let mut relevant = Vec::new();

        for query in fan_out_queries(table, column) {
            let hits = corpus.search(&query, self.per_query_top_k);
            debug!("Fan-out query {:?} returned {} chunks", query, hits.len());

            for chunk in hits {
                if !seen.insert(chunk.id.clone()) {
                    continue;
                }
                if chunk.text.to_uppercase().contains(&table_upper) {
                    relevant.push(chunk);
                }
            }
        }

        debug!(
            "Found {} relevant chunks for {}.{}",
            relevant.len(),
            table,
            column
        );
        relevant
    }
}
