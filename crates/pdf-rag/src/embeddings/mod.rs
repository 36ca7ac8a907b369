//! Text embedding
//!
//! One embedder instance is loaded at startup and shared by every corpus
//! build and query for the life of the process.

mod hash_embedder;
mod onnx_embedder;

pub use hash_embedder::HashEmbedder;
pub use onnx_embedder::OnnxEmbedder;

use std::sync::Arc;

use crate::config::{EmbeddingBackend, EmbeddingConfig};
use crate::error::{Error, Result};

/// Maps text to fixed-length vectors
///
/// Implementations:
/// - `OnnxEmbedder`: sentence-transformers model via ONNX Runtime
/// - `HashEmbedder`: feature-hashed bag of words
pub trait TextEmbedder: Send + Sync {
    /// Embed texts in order; an empty batch is an error
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>>;

    /// Embed a single text
    fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_batch(&[text])?
            .into_iter()
            .next()
            .ok_or_else(|| Error::embedding("Empty embedding result"))
    }

    /// Vector length
    fn dimensions(&self) -> usize;

    /// Model name for logging
    fn name(&self) -> &str;
}

/// Load the configured embedder
pub async fn load_embedder(config: &EmbeddingConfig) -> Result<Arc<dyn TextEmbedder>> {
    match config.backend {
        EmbeddingBackend::Onnx => Ok(Arc::new(OnnxEmbedder::new(config).await?)),
        EmbeddingBackend::Hash => {
            tracing::info!("Using feature-hash embedder ({} dimensions)", config.dimensions);
            Ok(Arc::new(HashEmbedder::new(config.dimensions)))
        }
    }
}

/// Callers special-case zero chunks; an empty batch reaching an embedder is a bug
pub(crate) fn ensure_non_empty(texts: &[&str]) -> Result<()> {
    if texts.is_empty() {
        return Err(Error::embedding("embed_batch called with no texts"));
    }
    Ok(())
}

/// Scale to unit length; zero vectors are left alone
pub(crate) fn l2_normalize(vector: &mut [f32]) {
    let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for val in vector.iter_mut() {
            *val /= norm;
        }
    }
}
