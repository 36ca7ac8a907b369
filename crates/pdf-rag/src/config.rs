//! Configuration for the question-answering service

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Environment variable naming a TOML config file
pub const CONFIG_ENV: &str = "PDF_RAG_CONFIG";

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RagConfig {
    /// Server configuration
    pub server: ServerConfig,
    /// Embedding configuration
    pub embeddings: EmbeddingConfig,
    /// Chunking configuration, shared by base and session ingestion
    pub chunking: ChunkingConfig,
    /// Retrieval configuration
    pub retrieval: RetrievalConfig,
    /// Document locations
    pub corpus: CorpusConfig,
    /// Ollama/LLM configuration
    pub llm: LlmConfig,
}

impl RagConfig {
    /// Parse a TOML config file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&raw)?;
        Ok(config)
    }

    /// Load from `PDF_RAG_CONFIG` when set, otherwise defaults
    pub fn load() -> Result<Self> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => {
                tracing::info!("Loading configuration from {:?}", path);
                Self::from_file(PathBuf::from(path))
            }
            None => Ok(Self::default()),
        }
    }

    /// Reject settings the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        self.chunking.validate()?;

        if self.retrieval.top_k == 0 {
            return Err(Error::Config("retrieval.top_k must be at least 1".to_string()));
        }
        if self.embeddings.batch_size == 0 {
            return Err(Error::Config("embeddings.batch_size must be at least 1".to_string()));
        }
        if self.embeddings.dimensions == 0 {
            return Err(Error::Config("embeddings.dimensions must be at least 1".to_string()));
        }

        Ok(())
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Enable CORS
    pub enable_cors: bool,
    /// Maximum upload size in bytes (default: 100MB)
    pub max_upload_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            enable_cors: true,
            max_upload_size: 100 * 1024 * 1024, // 100MB
        }
    }
}

/// Which embedder implementation to load
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingBackend {
    /// Sentence-transformers model through ONNX Runtime
    #[default]
    Onnx,
    /// Feature-hashed bag of words, no model download
    Hash,
}

/// Embedding configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Embedder implementation
    pub backend: EmbeddingBackend,
    /// sentence-transformers model name
    pub model: String,
    /// Embedding dimensions (384 for MiniLM)
    pub dimensions: usize,
    /// Batch size for embedding generation
    pub batch_size: usize,
    /// Maximum sequence length
    pub max_length: usize,
    /// Cache directory for models
    pub cache_dir: PathBuf,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            backend: EmbeddingBackend::Onnx,
            model: "all-MiniLM-L6-v2".to_string(),
            dimensions: 384,
            batch_size: 32,
            max_length: 256,
            cache_dir: dirs::cache_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("pdf-rag")
                .join("models"),
        }
    }
}

/// Word-window chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Words per chunk
    pub window: usize,
    /// Words between consecutive chunk starts
    pub stride: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            window: 500,
            stride: 400, // 100 words of overlap
        }
    }
}

impl ChunkingConfig {
    /// Words shared by consecutive chunks
    pub fn overlap(&self) -> usize {
        self.window.saturating_sub(self.stride)
    }

    /// Require `window >= stride > 0`
    pub fn validate(&self) -> Result<()> {
        if self.stride == 0 {
            return Err(Error::Config("chunking.stride must be at least 1".to_string()));
        }
        if self.stride > self.window {
            return Err(Error::Config(format!(
                "chunking.stride ({}) must not exceed chunking.window ({})",
                self.stride, self.window
            )));
        }
        Ok(())
    }
}

/// Retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Chunks returned per query
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self { top_k: 5 }
    }
}

/// Document locations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorpusConfig {
    /// Directory scanned once at startup for base PDFs
    pub docs_dir: PathBuf,
    /// Directory uploaded PDFs are written to
    pub upload_dir: PathBuf,
    /// Write successfully parsed uploads to `upload_dir`
    pub persist_uploads: bool,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            docs_dir: PathBuf::from("docs"),
            upload_dir: PathBuf::from("uploaded_docs"),
            persist_uploads: true,
        }
    }
}

/// LLM (Ollama) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Ollama base URL
    pub base_url: String,
    /// Generation model name
    pub model: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Retries for failed requests
    pub max_retries: u32,
    /// Sampling temperature; the model default applies when unset
    pub temperature: Option<f32>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "llama3.2:latest".to_string(),
            timeout_secs: 300,
            max_retries: 0,
            temperature: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = RagConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.chunking.window, 500);
        assert_eq!(config.chunking.stride, 400);
        assert_eq!(config.chunking.overlap(), 100);
        assert_eq!(config.retrieval.top_k, 5);
        assert_eq!(config.llm.model, "llama3.2:latest");
    }

    #[test]
    fn test_stride_validation() {
        let zero = ChunkingConfig { window: 10, stride: 0 };
        assert!(zero.validate().is_err());

        let wide = ChunkingConfig { window: 10, stride: 11 };
        assert!(wide.validate().is_err());

        let equal = ChunkingConfig { window: 10, stride: 10 };
        assert!(equal.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: RagConfig = toml::from_str(
            r#"
            [chunking]
            window = 200

            [embeddings]
            backend = "hash"

            [llm]
            model = "phi3"
            temperature = 0.2
            "#,
        )
        .unwrap();

        assert_eq!(config.chunking.window, 200);
        assert_eq!(config.chunking.stride, 400);
        assert_eq!(config.embeddings.backend, EmbeddingBackend::Hash);
        assert_eq!(config.embeddings.dimensions, 384);
        assert_eq!(config.llm.model, "phi3");
        assert_eq!(config.llm.temperature, Some(0.2));
        assert_eq!(config.server.port, 8080);
        // stride > window after the override
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rag.toml");
        std::fs::write(&path, "[retrieval]\ntop_k = 3\n").unwrap();

        let config = RagConfig::from_file(&path).unwrap();
        assert_eq!(config.retrieval.top_k, 3);
    }
}
