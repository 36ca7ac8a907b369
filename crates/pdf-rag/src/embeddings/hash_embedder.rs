//! Feature-hashed bag-of-words embeddings
//!
//! Needs no model files, so it serves offline deployments and tests. Texts that
//! share words land near each other; word order and synonyms are ignored.

use sha2::{Digest, Sha256};

use crate::error::Result;

use super::{ensure_non_empty, l2_normalize, TextEmbedder};

/// Deterministic hashing embedder
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dimensions: usize,
}

impl HashEmbedder {
    /// Create an embedder producing `dimensions`-length vectors
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    /// Embed a single text
    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];

        for word in text.split_whitespace() {
            let term: String = word
                .chars()
                .filter(|c| c.is_alphanumeric())
                .flat_map(char::to_lowercase)
                .collect();
            if term.is_empty() {
                continue;
            }

            let digest = Sha256::digest(term.as_bytes());
            let mut bucket_bytes = [0u8; 8];
            bucket_bytes.copy_from_slice(&digest[..8]);
            let bucket = (u64::from_le_bytes(bucket_bytes) % self.dimensions as u64) as usize;
            let sign = if digest[8] & 1 == 0 { 1.0 } else { -1.0 };

            vector[bucket] += sign;
        }

        l2_normalize(&mut vector);
        vector
    }
}

impl TextEmbedder for HashEmbedder {
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        ensure_non_empty(texts)?;
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        "feature-hash"
    }
}
