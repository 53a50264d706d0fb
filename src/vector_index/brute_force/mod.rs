
use tracing::{debug, warn};

use super::{IndexError, IndexStrategy, NearestNeighborIndex, Neighbor, common_dimension, rank};

/// Fallback index: scores every stored vector by cosine similarity.
///
/// Reported distances are `1 - cosine`, so "smaller is closer" holds for both
/// strategies. Vectors with zero norm have similarity 0.
#[derive(Debug, Clone, Default)]
pub struct BruteForceIndex {
    dimension: Option<usize>,
    vectors: Vec<Vec<f32>>,
}

impl BruteForceIndex {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cosine similarity, 0 when either side has zero norm
    #[inline]
    pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
        if a.len() != b.len() {
            return 0.0;
        }

        let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
        let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

        if norm_a == 0.0 || norm_b == 0.0 {
            return 0.0;
        }

        dot / (norm_a * norm_b)
    }
}

impl NearestNeighborIndex for BruteForceIndex {
    fn add(&mut self, vectors: Vec<Vec<f32>>) -> Result<(), IndexError> {
        if !self.vectors.is_empty() {
            return Err(IndexError::AlreadyLoaded(self.vectors.len()));
        }

        self.dimension = common_dimension(&vectors)?;
        self.vectors = vectors;

        debug!(
            "BruteForceIndex loaded {} vectors of dimension {:?}",
            self.vectors.len(),
            self.dimension
        );
        Ok(())
    }

    fn search(&self, query: &[f32], k: usize) -> Vec<Neighbor> {
        let Some(dimension) = self.dimension else {
            return Vec::new();
        };
        if k == 0 {
            return Vec::new();
        }
        if query.len() != dimension {
            warn!(
                "Query dimension {} does not match index dimension {}",
                query.len(),
                dimension
            );
            return Vec::new();
        }

        let neighbors = self
            .vectors
            .iter()
            .enumerate()
            .map(|(position, vector)| Neighbor {
                position,
                distance: 1.0 - Self::cosine_similarity(query, vector),
            })
            .collect();

        rank(neighbors, k)
    }

    fn len(&self) -> usize {
        self.vectors.len()
    }

    fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    fn strategy(&self) -> IndexStrategy {
        IndexStrategy::BruteForce
    }
}
