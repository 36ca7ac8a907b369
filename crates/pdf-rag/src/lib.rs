//! pdf-rag: question answering over PDF documents
//!
//! PDFs are split into overlapping word windows, embedded locally, and
//! searched exactly by Euclidean distance. The closest chunks become the
//! context of a prompt answered by a local Ollama model. A query may carry
//! its own PDFs, which then replace the startup corpus for that query.

pub mod config;
pub mod embeddings;
pub mod error;
pub mod generation;
pub mod ingestion;
pub mod pipeline;
pub mod retrieval;
pub mod server;
pub mod storage;
pub mod types;

pub use config::RagConfig;
pub use error::{Error, Result};
pub use pipeline::{QaPipeline, Retrieval};
pub use types::{
    document::{Chunk, UploadedFile},
    response::{CorpusKind, CorpusStats, QueryResponse},
};
