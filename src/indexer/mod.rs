// Indexer module
// Builds an immutable corpus (chunks, fitted embedder, populated index) and
// swaps it in atomically for readers


use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::Result;
use crate::config::Config;
use crate::embeddings::chunking::{Chunk, chunk_files};
use crate::embeddings::tfidf::TfIdfEmbedder;
use crate::parser::{FileType, ParsedFile};
use crate::vector_index::{IndexStrategy, NearestNeighborIndex, create_index};

/// Counts describing the most recent `index` call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusStats {
    pub total_files: usize,
    pub sql_files: usize,
    pub bteq_files: usize,
    pub ksh_files: usize,
    pub total_chunks: usize,
}

impl CorpusStats {
    fn from_files(files: &[ParsedFile], total_chunks: usize) -> Self {
        let count = |file_type: FileType| files.iter().filter(|f| f.file_type == file_type).count();

        Self {
            total_files: files.len(),
            sql_files: count(FileType::Sql),
            bteq_files: count(FileType::Bteq),
            ksh_files: count(FileType::Ksh),
            total_chunks,
        }
    }
}

/// Chunks, the embedder fitted to their texts, and the index holding their vectors.
///
/// Position `i` in the index is always `chunks[i]`, and every stored vector has
/// the dimensionality of this corpus's vocabulary.
pub struct Corpus {
    chunks: Vec<Chunk>,
    embedder: TfIdfEmbedder,
    index: Box<dyn NearestNeighborIndex>,
    stats: CorpusStats,
}

impl fmt::Debug for Corpus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Corpus")
            .field("chunks", &self.chunks.len())
            .field("dimension", &self.embedder.dimension())
            .field("strategy", &self.index.strategy())
            .field("stats", &self.stats)
            .finish()
    }
}

impl Corpus {
    /// A corpus with no chunks; every search on it returns nothing
    #[inline]
    pub fn empty(strategy: IndexStrategy) -> Self {
        Self {
            chunks: Vec::new(),
            embedder: TfIdfEmbedder::new(),
            index: create_index(strategy),
            stats: CorpusStats::default(),
        }
    }

    /// Chunk `files`, fit the embedder to all chunk texts, embed them and load the index
    #[inline]
    pub fn build(files: &[ParsedFile], config: &Config) -> Result<Self> {
        let chunks = chunk_files(files, &config.chunking);
        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();

        let embedder = TfIdfEmbedder::fitted(&texts);
        let vectors = embedder.embed_all(&texts);

        let strategy = config.retrieval.index_strategy;
        let mut index = create_index(strategy);
        index.add(vectors)?;

        let stats = CorpusStats::from_files(files, chunks.len());
        info!(
            "Built corpus: {} files, {} chunks, vocabulary {} ({} index)",
            stats.total_files,
            stats.total_chunks,
            embedder.dimension(),
            strategy
        );

        Ok(Self {
            chunks,
            embedder,
            index,
            stats,
        })
    }

    /// The `top_k` chunks closest to `query`, closest first
    #[inline]
    pub fn search(&self, query: &str, top_k: usize) -> Vec<Chunk> {
        if self.chunks.is_empty() || top_k == 0 || query.trim().is_empty() {
            return Vec::new();
        }

        let query_vector = self.embedder.embed(query);
        let neighbors = self.index.search(&query_vector, top_k);
        debug!("Query {:?} matched {} chunks", query, neighbors.len());

        neighbors
            .into_iter()
            .filter_map(|neighbor| {
                let chunk = self.chunks.get(neighbor.position);
                if chunk.is_none() {
                    warn!("Index returned unknown position {}", neighbor.position);
                }
                chunk.cloned()
            })
            .collect()
    }

    #[inline]
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    #[inline]
    pub fn embedder(&self) -> &TfIdfEmbedder {
        &self.embedder
    }

    #[inline]
    pub fn stats(&self) -> CorpusStats {
        self.stats
    }

    #[inline]
    pub fn strategy(&self) -> IndexStrategy {
        self.index.strategy()
    }

    /// Embedding dimensionality, the vocabulary size of this corpus
    #[inline]
    pub fn dimension(&self) -> usize {
        self.embedder.dimension()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

/// Owns the current corpus and replaces it whole on every `index` call
#[derive(Debug)]
pub struct Indexer {
    config: Config,
    current: RwLock<Arc<Corpus>>,
}

impl Indexer {
    #[inline]
    pub fn new(config: Config) -> Self {
        let empty = Corpus::empty(config.retrieval.index_strategy);
        Self {
            config,
            current: RwLock::new(Arc::new(empty)),
        }
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Build a corpus from `files` and make it current.
    ///
    /// The build happens outside the lock; on error the previous corpus stays current.
    #[inline]
    pub fn index(&self, files: &[ParsedFile]) -> Result<CorpusStats> {
        let corpus = Arc::new(Corpus::build(files, &self.config)?);
        let stats = corpus.stats();

        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *current = corpus;

        Ok(stats)
    }

    /// Snapshot of the current corpus
    #[inline]
    pub fn current(&self) -> Arc<Corpus> {
        Arc::clone(&self.current.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// The `top_k` chunks of the current corpus closest to `query`
    #[inline]
    pub fn retrieve(&self, query: &str, top_k: usize) -> Vec<Chunk> {
        self.current().search(query, top_k)
    }

    #[inline]
    pub fn stats(&self) -> CorpusStats {
        self.current().stats()
    }
}
