//! Application state for the server

use std::sync::Arc;

use crate::config::RagConfig;
use crate::embeddings::{load_embedder, TextEmbedder};
use crate::error::{Error, Result};
use crate::generation::{AnswerGenerator, OllamaClient};
use crate::pipeline::QaPipeline;
use crate::retrieval::CorpusManager;
use crate::storage::UploadStore;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Configuration
    config: RagConfig,
    /// Base and session corpora
    corpora: Arc<CorpusManager>,
    /// Query pipeline
    pipeline: QaPipeline,
    /// Answer generator (Ollama)
    generator: Arc<dyn AnswerGenerator>,
}

impl AppState {
    /// Load the embedder, connect the generator, and build the base corpus
    pub async fn new(config: RagConfig) -> Result<Self> {
        config.validate()?;
        tracing::info!("Initializing application state...");

        let embedder = load_embedder(&config.embeddings).await?;
        tracing::info!(
            "Embedder ready: {} ({} dimensions)",
            embedder.name(),
            embedder.dimensions()
        );

        let generator: Arc<dyn AnswerGenerator> = Arc::new(OllamaClient::new(&config.llm)?);
        tracing::info!("Ollama client initialized (model: {})", config.llm.model);

        Self::with_components(config, embedder, generator).await
    }

    /// Assemble state around an existing embedder and generator
    ///
    /// The base corpus is built here, before the state is handed out.
    pub async fn with_components(
        config: RagConfig,
        embedder: Arc<dyn TextEmbedder>,
        generator: Arc<dyn AnswerGenerator>,
    ) -> Result<Self> {
        let corpora = Arc::new(CorpusManager::new(
            embedder,
            &config.chunking,
            config.corpus.docs_dir.clone(),
        ));

        let builder = Arc::clone(&corpora);
        let base = tokio::task::spawn_blocking(move || builder.base_corpus())
            .await
            .map_err(|e| Error::internal(format!("Task join error: {}", e)))??;
        let stats = base.stats();
        tracing::info!(
            "Base corpus: {} documents, {} chunks",
            stats.documents,
            stats.chunks
        );

        let uploads = config
            .corpus
            .persist_uploads
            .then(|| UploadStore::new(config.corpus.upload_dir.clone()));

        let pipeline = QaPipeline::new(
            Arc::clone(&corpora),
            config.retrieval.top_k,
            Arc::clone(&generator),
            uploads,
        );

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                corpora,
                pipeline,
                generator,
            }),
        })
    }

    /// Get configuration
    pub fn config(&self) -> &RagConfig {
        &self.inner.config
    }

    /// Get corpus manager
    pub fn corpora(&self) -> &Arc<CorpusManager> {
        &self.inner.corpora
    }

    /// Get query pipeline
    pub fn pipeline(&self) -> &QaPipeline {
        &self.inner.pipeline
    }

    /// Get answer generator
    pub fn generator(&self) -> &Arc<dyn AnswerGenerator> {
        &self.inner.generator
    }

    /// Check if the base corpus is available
    pub fn is_ready(&self) -> bool {
        self.inner.corpora.base_is_built()
    }
}
