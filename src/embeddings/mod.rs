// Embeddings module
// Chunking of parsed files and the TF-IDF embedding model

pub mod chunking;
pub mod tfidf;

pub use chunking::{Chunk, ChunkKind, ChunkingConfig, FileContext, chunk_file, chunk_files};
pub use tfidf::{TfIdfEmbedder, tokenize};
