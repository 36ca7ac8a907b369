//! Query response types

use serde::{Deserialize, Serialize};

/// Which corpus answered a query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorpusKind {
    /// Documents loaded at startup
    Base,
    /// Documents uploaded with the query
    Session,
}

/// Size summary of a corpus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CorpusStats {
    /// Documents that contributed at least one chunk
    pub documents: usize,
    /// Indexed chunks
    pub chunks: usize,
    /// Vector dimensionality (0 when the corpus is empty)
    pub dimensions: usize,
}

/// Answer returned to the front-end
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    /// Generated answer text
    pub answer: String,
    /// Retrieved chunks joined by blank lines, closest first
    pub context: String,
    /// Corpus the context was drawn from
    pub corpus: CorpusKind,
    /// One entry per uploaded file that was skipped
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}
