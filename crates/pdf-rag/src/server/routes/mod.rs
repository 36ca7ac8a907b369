//! API routes

pub mod query;

use axum::{
    extract::{DefaultBodyLimit, State},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

use crate::server::state::AppState;

/// Build all API routes
pub fn api_routes(max_upload_size: usize) -> Router<AppState> {
    Router::new()
        // Query, optionally with PDFs attached
        .route(
            "/query",
            post(query::query_documents).layer(DefaultBodyLimit::max(max_upload_size)),
        )
        .route("/info", get(info))
}

/// API info endpoint
async fn info(State(state): State<AppState>) -> Json<serde_json::Value> {
    let config = state.config();
    let corpora = state.corpora();
    let embedder = corpora.embedder();

    let base = if corpora.base_is_built() {
        corpora.base_corpus().ok().map(|c| c.stats())
    } else {
        None
    };

    Json(json!({
        "name": "pdf-rag",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Question answering over PDF documents with local embeddings and Ollama",
        "endpoints": {
            "POST /api/query": "Ask a question (multipart: question, files*)",
            "GET /api/info": "Service and corpus information",
            "GET /health": "Liveness and Ollama reachability",
            "GET /ready": "Base corpus availability"
        },
        "base_corpus": base,
        "embedding": {
            "model": embedder.name(),
            "dimensions": embedder.dimensions(),
        },
        "llm": {
            "model": state.generator().model(),
            "base_url": config.llm.base_url,
        },
        "chunking": {
            "window": config.chunking.window,
            "stride": config.chunking.stride,
            "overlap": config.chunking.overlap(),
        },
        "top_k": config.retrieval.top_k,
    }))
}
