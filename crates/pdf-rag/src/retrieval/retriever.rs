//! Query-time context retrieval

use std::sync::Arc;

use crate::embeddings::TextEmbedder;
use crate::error::{Error, Result};
use crate::types::Chunk;

use super::corpus::Corpus;
use super::index::FlatL2Index;

/// Separator between retrieved chunks in the context string
pub const CONTEXT_SEPARATOR: &str = "\n\n";

/// A retrieved chunk and its distance to the query
#[derive(Debug, Clone)]
pub struct RetrievedChunk {
    /// The matched chunk
    pub chunk: Chunk,
    /// Euclidean distance between query and chunk embeddings
    pub distance: f32,
}

/// Context selected for one query
#[derive(Debug, Clone)]
pub struct RetrievedContext {
    /// Matched chunks, closest first
    pub hits: Vec<RetrievedChunk>,
    /// Chunk texts joined by blank lines, in rank order
    pub context: String,
}

/// Embed `query`, search `index`, and join the matched `chunks` in rank order
///
/// `chunks[i]` must be the chunk embedded at index row `i`.
pub fn retrieve_context(
    query: &str,
    embedder: &dyn TextEmbedder,
    index: &FlatL2Index,
    chunks: &[Chunk],
    k: usize,
) -> Result<RetrievedContext> {
    if index.len() != chunks.len() {
        return Err(Error::internal(format!(
            "index holds {} vectors but {} chunks were supplied",
            index.len(),
            chunks.len()
        )));
    }

    let query_vector = embedder.embed_one(query)?;
    let neighbors = index.search(&query_vector, k)?;

    let hits: Vec<RetrievedChunk> = neighbors
        .into_iter()
        .map(|n| RetrievedChunk {
            chunk: chunks[n.index].clone(),
            distance: n.distance,
        })
        .collect();

    let context = hits
        .iter()
        .map(|h| h.chunk.text.as_str())
        .collect::<Vec<_>>()
        .join(CONTEXT_SEPARATOR);

    Ok(RetrievedContext { hits, context })
}

/// Top-k retrieval against a corpus with the shared embedder
pub struct Retriever {
    embedder: Arc<dyn TextEmbedder>,
    top_k: usize,
}

impl Retriever {
    /// Create a retriever returning up to `top_k` chunks
    pub fn new(embedder: Arc<dyn TextEmbedder>, top_k: usize) -> Self {
        Self { embedder, top_k }
    }

    /// Chunks returned per query
    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Retrieve context for `query` from `corpus`
    pub fn retrieve(&self, query: &str, corpus: &Corpus) -> Result<RetrievedContext> {
        let index = corpus
            .index()
            .ok_or_else(|| Error::empty_corpus("the selected corpus has no indexed chunks"))?;

        retrieve_context(query, self.embedder.as_ref(), index, corpus.chunks(), self.top_k)
    }
}
