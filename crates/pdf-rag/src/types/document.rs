//! Document and chunk types

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// A document supplied by the caller for one query
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Original filename as sent by the client
    pub filename: String,
    /// Raw PDF bytes
    pub data: Bytes,
}

impl UploadedFile {
    /// Create a new uploaded file
    pub fn new(filename: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            filename: filename.into(),
            data: data.into(),
        }
    }
}

/// A window of words cut from a document's text; the unit of retrieval
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Words of the window joined by single spaces
    pub text: String,
    /// Filename of the document the chunk came from
    pub source: Option<String>,
    /// Position within the owning corpus (equals the index row)
    pub ordinal: usize,
}

impl Chunk {
    /// Create a new chunk
    pub fn new(text: String, source: Option<String>, ordinal: usize) -> Self {
        Self {
            text,
            source,
            ordinal,
        }
    }

    /// Number of whitespace-delimited words
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}
