#[cfg(test)]
mod tests;

use std::collections::{HashMap, HashSet};

use tracing::debug;

/// Lower-case `text` and split it on whitespace
#[inline]
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// TF-IDF embedding over a vocabulary fitted to one corpus.
///
/// The vocabulary assigns each token a dense index in the order it is first seen
/// while walking the corpus. Its size is the dimensionality of every vector
/// produced by [`TfIdfEmbedder::embed`] until the next [`TfIdfEmbedder::fit`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TfIdfEmbedder {
    vocabulary: HashMap<String, usize>,
    /// Inverse document frequency, indexed by vocabulary position
    idf: Vec<f64>,
    document_count: usize,
}

impl TfIdfEmbedder {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a fitted embedder in one step
    #[inline]
    pub fn fitted<S: AsRef<str>>(documents: &[S]) -> Self {
        let mut embedder = Self::new();
        embedder.fit(documents);
        embedder
    }

    /// Build the vocabulary and IDF table from `documents`.
    ///
    /// Replaces any previous fit; vectors embedded before this call are no
    /// longer comparable with vectors embedded after it.
    #[inline]
    pub fn fit<S: AsRef<str>>(&mut self, documents: &[S]) {
        let mut vocabulary: HashMap<String, usize> = HashMap::new();
        let mut document_frequency: Vec<usize> = Vec::new();

        for document in documents {
            let tokens = tokenize(document.as_ref());
            let mut seen_in_document: HashSet<usize> = HashSet::new();

            for token in tokens {
                let next_index = vocabulary.len();
                let index = *vocabulary.entry(token).or_insert_with(|| {
                    document_frequency.push(0);
                    next_index
                });
                if seen_in_document.insert(index) {
                    document_frequency[index] += 1;
                }
            }
        }

        let n = documents.len() as f64;
        self.idf = document_frequency
            .iter()
            .map(|&df| (n / (1.0 + df as f64)).ln())
            .collect();
        self.vocabulary = vocabulary;
        self.document_count = documents.len();

        debug!(
            "Fitted TF-IDF vocabulary: {} tokens over {} documents",
            self.vocabulary.len(),
            self.document_count
        );
    }

    /// Map `text` to an L2-normalized vector in vocabulary space.
    ///
    /// Tokens outside the vocabulary contribute nothing. Text sharing no token
    /// with the vocabulary yields the zero vector, which is returned unnormalized.
    #[inline]
    pub fn embed(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0_f64; self.vocabulary.len()];
        let tokens = tokenize(text);
        if tokens.is_empty() || vector.is_empty() {
            return vec![0.0; vector.len()];
        }

        let mut counts: HashMap<usize, usize> = HashMap::new();
        for token in &tokens {
            if let Some(&index) = self.vocabulary.get(token) {
                *counts.entry(index).or_insert(0) += 1;
            }
        }

        let total = tokens.len() as f64;
        for (index, count) in counts {
            vector[index] = (count as f64 / total) * self.idf[index];
        }

        let norm = vector.iter().map(|v| v * v).sum::<f64>().sqrt();
        if norm > 0.0 {
            vector.iter().map(|v| (v / norm) as f32).collect()
        } else {
            vector.into_iter().map(|v| v as f32).collect()
        }
    }

    /// Embed each text in order
    #[inline]
    pub fn embed_all<S: AsRef<str>>(&self, texts: &[S]) -> Vec<Vec<f32>> {
        texts.iter().map(|t| self.embed(t.as_ref())).collect()
    }

    /// Vocabulary size, which is also the embedding dimensionality
    #[inline]
    pub fn dimension(&self) -> usize {
        self.vocabulary.len()
    }

    /// Number of documents seen by the last fit
    #[inline]
    pub fn document_count(&self) -> usize {
        self.document_count
    }

    #[inline]
    pub fn token_index(&self, token: &str) -> Option<usize> {
        self.vocabulary.get(token).copied()
    }

    #[inline]
    pub fn idf(&self, token: &str) -> Option<f64> {
        self.token_index(token).map(|index| self.idf[index])
    }
}
