//! Query endpoint

use axum::{
    extract::{Multipart, State},
    Json,
};
use std::time::Instant;

use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::types::{QueryResponse, UploadedFile};

/// POST /api/query - Answer a question, from uploaded PDFs when attached
///
/// Multipart form: one `question` text field and any number of `files`
/// fields. Without files the base corpus answers.
pub async fn query_documents(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<QueryResponse>> {
    let start = Instant::now();
    let mut question: Option<String> = None;
    let mut files = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::Config(format!("Failed to read multipart field: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();

        if name == "question" {
            let text = field
                .text()
                .await
                .map_err(|e| Error::Config(format!("Failed to read question: {}", e)))?;
            question = Some(text);
            continue;
        }

        // Browsers send an empty, unnamed part when no file is chosen
        let Some(filename) = field.file_name().map(|s| s.to_string()) else {
            tracing::debug!("Ignoring multipart field '{}'", name);
            continue;
        };
        if filename.is_empty() {
            continue;
        }

        let data = field
            .bytes()
            .await
            .map_err(|e| Error::Config(format!("Failed to read file '{}': {}", filename, e)))?;

        tracing::info!("Received upload: {} ({} bytes)", filename, data.len());
        files.push(UploadedFile::new(filename, data));
    }

    let question =
        question.ok_or_else(|| Error::Config("missing 'question' field".to_string()))?;

    tracing::info!("Query: \"{}\" ({} uploads)", question, files.len());

    let response = state.pipeline().answer(&question, files).await?;

    tracing::info!(
        "Answered from {:?} corpus in {}ms",
        response.corpus,
        start.elapsed().as_millis()
    );

    Ok(Json(response))
}
