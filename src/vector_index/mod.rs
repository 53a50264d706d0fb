// Vector index module
// Nearest-neighbour search over the chunk embeddings of one corpus

pub mod brute_force;
pub mod flat_l2;

#[cfg(test)]
mod tests;

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use brute_force::BruteForceIndex;
pub use flat_l2::FlatL2Index;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IndexError {
    #[error("Vector dimension mismatch: expected {expected}, got {actual} (vector {position})")]
    DimensionMismatch {
        expected: usize,
        actual: usize,
        position: usize,
    },
    #[error("Index already loaded with {0} vectors")]
    AlreadyLoaded(usize),
}

/// Which nearest-neighbour implementation backs a corpus
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexStrategy {
    /// Contiguous matrix with precomputed norms and sparse-query distances
    #[default]
    FlatL2,
    /// Full cosine-similarity scan
    BruteForce,
}

impl fmt::Display for IndexStrategy {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FlatL2 => f.write_str("flat_l2"),
            Self::BruteForce => f.write_str("brute_force"),
        }
    }
}

/// A search hit: insertion position of the stored vector and its distance to the query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub position: usize,
    /// Smaller is closer
    pub distance: f32,
}

/// Nearest-neighbour search over vectors loaded once.
///
/// Implementations rank closest first and keep insertion order between equal
/// distances. A query whose length differs from the stored dimension matches
/// nothing.
pub trait NearestNeighborIndex: Send + Sync {
    /// Bulk-load every vector of the corpus; all must share one dimension
    fn add(&mut self, vectors: Vec<Vec<f32>>) -> Result<(), IndexError>;

    /// The `k` stored vectors closest to `query`
    fn search(&self, query: &[f32], k: usize) -> Vec<Neighbor>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `None` until vectors are loaded
    fn dimension(&self) -> Option<usize>;

    fn strategy(&self) -> IndexStrategy;
}

/// Construct an empty index for `strategy`
#[inline]
pub fn create_index(strategy: IndexStrategy) -> Box<dyn NearestNeighborIndex> {
    match strategy {
        IndexStrategy::FlatL2 => Box::new(FlatL2Index::new()),
        IndexStrategy::BruteForce => Box::new(BruteForceIndex::new()),
    }
}

/// Check that every vector has the same length and return it
fn common_dimension(vectors: &[Vec<f32>]) -> Result<Option<usize>, IndexError> {
    let Some(first) = vectors.first() else {
        return Ok(None);
    };
    let expected = first.len();

    if let Some((position, vector)) = vectors
        .iter()
        .enumerate()
        .find(|(_, v)| v.len() != expected)
    {
        return Err(IndexError::DimensionMismatch {
            expected,
            actual: vector.len(),
            position,
        });
    }

    Ok(Some(expected))
}

/// Stable ascending sort by distance, truncated to `k`
fn rank(mut neighbors: Vec<Neighbor>, k: usize) -> Vec<Neighbor> {
    neighbors.sort_by(|a, b| {
        a.distance
            .partial_cmp(&b.distance)
            .unwrap_or(Ordering::Equal)
    });
    neighbors.truncate(k);
    neighbors
}
