//! Ingestion pipeline orchestration

use crate::config::ChunkingConfig;
use crate::error::Result;
use crate::types::Chunk;

use super::chunker::WordChunker;
use super::parser::PdfExtractor;

/// Chunks produced from one document
#[derive(Debug, Clone)]
pub struct IngestedDocument {
    /// Source filename
    pub filename: String,
    /// Pages read from the PDF
    pub page_count: usize,
    /// Chunks in document order
    pub chunks: Vec<Chunk>,
}

/// Extract + chunk for a single document
pub struct IngestPipeline {
    chunker: WordChunker,
}

impl IngestPipeline {
    /// Create a new ingestion pipeline
    pub fn new(config: &ChunkingConfig) -> Self {
        Self {
            chunker: WordChunker::from_config(config),
        }
    }

    /// The chunker in use
    pub fn chunker(&self) -> &WordChunker {
        &self.chunker
    }

    /// Full ingestion: extract + chunk, numbering chunks from `first_ordinal`
    pub fn ingest(&self, filename: &str, data: &[u8], first_ordinal: usize) -> Result<IngestedDocument> {
        let extracted = PdfExtractor::extract(filename, data)?;
        if extracted.is_blank() {
            tracing::debug!("'{}' has no extractable text", filename);
        }

        let chunks = self
            .chunker
            .chunk(&extracted.text(), Some(filename), first_ordinal);

        Ok(IngestedDocument {
            filename: filename.to_string(),
            page_count: extracted.page_count(),
            chunks,
        })
    }
}

impl Default for IngestPipeline {
    fn default() -> Self {
        Self::new(&ChunkingConfig::default())
    }
}
