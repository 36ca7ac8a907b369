//! Corpora: chunks plus the index built over their embeddings

use once_cell::sync::OnceCell;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

use crate::config::ChunkingConfig;
use crate::embeddings::TextEmbedder;
use crate::error::{Error, Result};
use crate::ingestion::IngestPipeline;
use crate::types::{Chunk, CorpusStats, UploadedFile};

use super::index::FlatL2Index;

/// Chunks and their index
///
/// `index` row `i` is the embedding of `chunks[i]`. An empty corpus has no
/// index at all.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    chunks: Vec<Chunk>,
    index: Option<FlatL2Index>,
    documents: usize,
}

impl Corpus {
    /// A corpus with nothing to search
    pub fn empty() -> Self {
        Self::default()
    }

    /// Embed `chunks` and index them
    ///
    /// Chunks are renumbered so each ordinal equals its index row. Zero chunks
    /// yield [`Corpus::empty`] without touching the embedder.
    pub fn build(
        mut chunks: Vec<Chunk>,
        documents: usize,
        embedder: &dyn TextEmbedder,
    ) -> Result<Self> {
        if chunks.is_empty() {
            return Ok(Self::empty());
        }

        for (ordinal, chunk) in chunks.iter_mut().enumerate() {
            chunk.ordinal = ordinal;
        }

        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        let vectors = embedder.embed_batch(&texts)?;
        if vectors.len() != chunks.len() {
            return Err(Error::embedding(format!(
                "embedder returned {} vectors for {} chunks",
                vectors.len(),
                chunks.len()
            )));
        }

        let index = FlatL2Index::build(vectors)?;

        Ok(Self {
            chunks,
            index: Some(index),
            documents,
        })
    }

    /// Chunks in index order
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// The index, absent when the corpus is empty
    pub fn index(&self) -> Option<&FlatL2Index> {
        self.index.as_ref()
    }

    /// Number of chunks
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// True when there is nothing to search
    pub fn is_empty(&self) -> bool {
        self.index.is_none()
    }

    /// Size summary
    pub fn stats(&self) -> CorpusStats {
        CorpusStats {
            documents: self.documents,
            chunks: self.chunks.len(),
            dimensions: self.index.as_ref().map_or(0, |i| i.dimensions()),
        }
    }
}

/// Result of ingesting a query's uploaded files
#[derive(Debug, Clone, Default)]
pub struct SessionCorpus {
    /// The corpus; empty when no upload yielded text
    pub corpus: Corpus,
    /// One message per skipped file, naming it
    pub warnings: Vec<String>,
    /// Filenames that parsed successfully, in upload order
    pub accepted: Vec<String>,
    /// Positions in the upload list of the files that parsed
    pub accepted_indices: Vec<usize>,
}

impl SessionCorpus {
    /// True when there is nothing to search
    pub fn is_empty(&self) -> bool {
        self.corpus.is_empty()
    }
}

/// Chunks gathered across a batch of documents
#[derive(Default)]
struct IngestBatch {
    chunks: Vec<Chunk>,
    accepted: Vec<String>,
    accepted_indices: Vec<usize>,
    /// Accepted documents that produced at least one chunk
    contributing: usize,
    warnings: Vec<String>,
}

impl IngestBatch {
    fn add(&mut self, pipeline: &IngestPipeline, position: usize, filename: &str, data: &[u8]) {
        match pipeline.ingest(filename, data, self.chunks.len()) {
            Ok(doc) => {
                tracing::debug!(
                    "Ingested '{}': {} pages, {} chunks",
                    filename,
                    doc.page_count,
                    doc.chunks.len()
                );
                if !doc.chunks.is_empty() {
                    self.contributing += 1;
                }
                self.chunks.extend(doc.chunks);
                self.accepted.push(doc.filename);
                self.accepted_indices.push(position);
            }
            Err(e) => self.skip(filename, e),
        }
    }

    fn skip(&mut self, filename: &str, err: Error) {
        tracing::warn!("Skipping '{}': {}", filename, err);
        self.warnings.push(format!("Error reading {}: {}", filename, err));
    }
}

/// Builds the base corpus once and session corpora on demand
pub struct CorpusManager {
    embedder: Arc<dyn TextEmbedder>,
    pipeline: IngestPipeline,
    docs_dir: PathBuf,
    base: OnceCell<Arc<Corpus>>,
}

impl CorpusManager {
    /// Create a manager; nothing is built until [`CorpusManager::base_corpus`]
    pub fn new(
        embedder: Arc<dyn TextEmbedder>,
        chunking: &ChunkingConfig,
        docs_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            embedder,
            pipeline: IngestPipeline::new(chunking),
            docs_dir: docs_dir.into(),
            base: OnceCell::new(),
        }
    }

    /// Shared embedder
    pub fn embedder(&self) -> &Arc<dyn TextEmbedder> {
        &self.embedder
    }

    /// Directory the base corpus is read from
    pub fn docs_dir(&self) -> &Path {
        &self.docs_dir
    }

    /// The base corpus, built on the first call and shared afterwards
    pub fn base_corpus(&self) -> Result<Arc<Corpus>> {
        self.base
            .get_or_try_init(|| self.build_base_corpus().map(Arc::new))
            .map(Arc::clone)
    }

    /// True once the base corpus exists
    pub fn base_is_built(&self) -> bool {
        self.base.get().is_some()
    }

    fn build_base_corpus(&self) -> Result<Corpus> {
        let paths = list_pdfs(&self.docs_dir);
        if paths.is_empty() {
            tracing::warn!("No PDF documents found in {}", self.docs_dir.display());
            return Ok(Corpus::empty());
        }

        tracing::info!(
            "Building base corpus from {} PDFs in {}",
            paths.len(),
            self.docs_dir.display()
        );

        let mut batch = IngestBatch::default();
        for (position, path) in paths.iter().enumerate() {
            let filename = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| path.display().to_string());

            match std::fs::read(path) {
                Ok(data) => batch.add(&self.pipeline, position, &filename, &data),
                Err(e) => batch.skip(&filename, Error::Io(e)),
            }
        }

        if batch.accepted.is_empty() {
            return Err(Error::CorpusBuild(format!(
                "none of the {} PDFs in {} could be read",
                paths.len(),
                self.docs_dir.display()
            )));
        }

        let corpus = Corpus::build(batch.chunks, batch.contributing, self.embedder.as_ref())?;
        tracing::info!(
            "Base corpus ready: {} documents, {} chunks, {} skipped",
            batch.contributing,
            corpus.len(),
            batch.warnings.len()
        );

        Ok(corpus)
    }

    /// Build a fresh corpus from uploaded files
    ///
    /// Unreadable files are skipped with a warning. When nothing yields text
    /// the returned corpus is empty; that is not an error.
    pub fn build_session_corpus(&self, files: &[UploadedFile]) -> Result<SessionCorpus> {
        let mut batch = IngestBatch::default();
        for (position, file) in files.iter().enumerate() {
            batch.add(&self.pipeline, position, &file.filename, &file.data);
        }

        if batch.chunks.is_empty() {
            if !files.is_empty() {
                tracing::warn!("No valid content extracted from {} uploaded PDFs", files.len());
            }
            return Ok(SessionCorpus {
                corpus: Corpus::empty(),
                warnings: batch.warnings,
                accepted: batch.accepted,
                accepted_indices: batch.accepted_indices,
            });
        }

        let corpus = Corpus::build(batch.chunks, batch.contributing, self.embedder.as_ref())?;
        tracing::info!(
            "Session corpus ready: {} documents, {} chunks, {} skipped",
            batch.contributing,
            corpus.len(),
            batch.warnings.len()
        );

        Ok(SessionCorpus {
            corpus,
            warnings: batch.warnings,
            accepted: batch.accepted,
            accepted_indices: batch.accepted_indices,
        })
    }
}

/// `.pdf` files directly inside `dir`, sorted by name
fn list_pdfs(dir: &Path) -> Vec<PathBuf> {
    if !dir.is_dir() {
        return Vec::new();
    }

    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            e.path()
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
        })
        .map(|e| e.into_path())
        .collect()
}
