
use tracing::{debug, warn};

use super::{IndexError, IndexStrategy, NearestNeighborIndex, Neighbor, common_dimension, rank};

/// Exact L2 index over a contiguous row-major matrix.
///
/// Squared distances are computed as `|q|^2 + |x|^2 - 2 q.x` with the row norms
/// precomputed at load time, and the dot product only visits the non-zero
/// components of the query. TF-IDF queries touch a handful of vocabulary
/// entries, so a search costs `O(rows * nnz(query))` instead of
/// `O(rows * dimension)`.
#[derive(Debug, Clone, Default)]
pub struct FlatL2Index {
    dimension: Option<usize>,
    data: Vec<f32>,
    squared_norms: Vec<f32>,
}

impl FlatL2Index {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    fn row(&self, position: usize, dimension: usize) -> &[f32] {
        let start = position * dimension;
        &self.data[start..start + dimension]
    }
}

impl NearestNeighborIndex for FlatL2Index {
    fn add(&mut self, vectors: Vec<Vec<f32>>) -> Result<(), IndexError> {
        if !self.squared_norms.is_empty() {
            return Err(IndexError::AlreadyLoaded(self.squared_norms.len()));
        }

        let Some(dimension) = common_dimension(&vectors)? else {
            debug!("FlatL2Index loaded with no vectors");
            return Ok(());
        };

        self.data = Vec::with_capacity(vectors.len() * dimension);
        self.squared_norms = Vec::with_capacity(vectors.len());
        for vector in vectors {
            self.squared_norms
                .push(vector.iter().map(|v| v * v).sum::<f32>());
            self.data.extend(vector);
        }
        self.dimension = Some(dimension);

        debug!(
            "FlatL2Index loaded {} vectors of dimension {}",
            self.squared_norms.len(),
            dimension
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

        let non_zero: Vec<(usize, f32)> = query
            .iter()
            .enumerate()
            .filter(|(_, v)| **v != 0.0)
            .map(|(i, v)| (i, *v))
            .collect();
        let query_norm: f32 = non_zero.iter().map(|(_, v)| v * v).sum();

        let neighbors = self
            .squared_norms
            .iter()
            .enumerate()
            .map(|(position, row_norm)| {
                let row = self.row(position, dimension);
                let dot: f32 = non_zero.iter().map(|(i, v)| v * row[*i]).sum();
                Neighbor {
                    position,
                    distance: 2.0f32.mul_add(-dot, query_norm + row_norm).max(0.0),
                }
            })
            .collect();

        rank(neighbors, k)
    }

    fn len(&self) -> usize {
        self.squared_norms.len()
    }

    fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    fn strategy(&self) -> IndexStrategy {
        IndexStrategy::FlatL2
    }
}
