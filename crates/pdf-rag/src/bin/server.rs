//! PDF RAG server binary
//!
//! Run with: cargo run -p pdf-rag --bin pdf-rag-server
//! Set PDF_RAG_CONFIG to a TOML file to override the defaults.

use pdf_rag::{
    config::RagConfig,
    generation::{AnswerGenerator, OllamaClient},
    server::RagServer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pdf_rag=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = RagConfig::load()?;

    tracing::info!("Configuration loaded");
    tracing::info!("  - Documents: {}", config.corpus.docs_dir.display());
    tracing::info!(
        "  - Embedding model: {} ({:?}, {} dimensions)",
        config.embeddings.model,
        config.embeddings.backend,
        config.embeddings.dimensions
    );
    tracing::info!("  - LLM model: {}", config.llm.model);
    tracing::info!(
        "  - Chunking: {} words, stride {}",
        config.chunking.window,
        config.chunking.stride
    );

    // Check Ollama
    tracing::info!("Checking Ollama at {}...", config.llm.base_url);
    let ollama = OllamaClient::new(&config.llm)?;
    match ollama.health_check().await {
        Ok(true) => {
            tracing::info!("Ollama is running");
        }
        _ => {
            tracing::warn!("Ollama not available at {}", config.llm.base_url);
            tracing::warn!("Start it with `ollama serve` and pull the model: ollama pull {}", config.llm.model);
        }
    }

    let server = RagServer::new(config).await?;

    println!("\nServer starting...");
    println!("  API: http://{}", server.address());
    println!("  Health: http://{}/health", server.address());
    println!("  API Info: http://{}/api/info", server.address());
    println!("\nEndpoints:");
    println!("  POST /api/query - Ask a question, optionally attaching PDFs");
    println!("\nPress Ctrl+C to stop\n");

    server.start().await?;

    Ok(())
}
