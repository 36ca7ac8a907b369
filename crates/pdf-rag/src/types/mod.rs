//! Core types for documents, chunks, and query responses

pub mod document;
pub mod response;

pub use document::{Chunk, UploadedFile};
pub use response::{CorpusKind, CorpusStats, QueryResponse};
