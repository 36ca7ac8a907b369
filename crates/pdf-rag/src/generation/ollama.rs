//! Ollama client for answer generation

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tokio::time::sleep;

use crate::config::LlmConfig;
use crate::error::{Error, Result};

use super::llm::AnswerGenerator;

/// Returned when Ollama answers without a `response` field
pub const NO_RESPONSE: &str = "Error: No response from Ollama";

/// Ollama API client with optional retry
pub struct OllamaClient {
    /// HTTP client
    client: Client,
    /// Configuration
    config: LlmConfig,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<GenerateOptions>,
}

#[derive(Serialize)]
struct GenerateOptions {
    temperature: f32,
}

impl OllamaClient {
    /// Create a new Ollama client
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_max_idle_per_host(5)
            .build()?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    /// Retry a request with exponential backoff
    async fn retry_request<F, Fut, T>(&self, operation: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        let max_retries = self.config.max_retries;
        let mut attempt = 0;

        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) if attempt < max_retries => {
                    let delay = Duration::from_secs(2u64.pow(attempt));
                    tracing::warn!(
                        "Request failed (attempt {}/{}): {}; retrying in {:?}",
                        attempt + 1,
                        max_retries + 1,
                        e,
                        delay
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Single non-streaming generate call
    async fn generate_once(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/api/generate", self.config.base_url);
        let request = GenerateRequest {
            model: &self.config.model,
            prompt,
            stream: false,
            options: self
                .config
                .temperature
                .map(|temperature| GenerateOptions { temperature }),
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::llm(format!("Generation request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::llm(format!(
                "Generation failed: HTTP {} - {}",
                status, body
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::llm(format!("Failed to read generation response: {}", e)))?;

        parse_generate_body(&body)
    }
}

/// Pull the answer out of a `/api/generate` response body
pub fn parse_generate_body(body: &str) -> Result<String> {
    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| Error::llm(format!("Failed to parse generation response: {}", e)))?;

    Ok(value
        .get("response")
        .and_then(|r| r.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| NO_RESPONSE.to_string()))
}

#[async_trait]
impl AnswerGenerator for OllamaClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        tracing::info!("Generating answer with model: {}", self.config.model);
        self.retry_request(|| self.generate_once(prompt)).await
    }

    async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/api/tags", self.config.base_url);

        match self.client.get(&url).send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_response_field() {
        let answer = parse_generate_body(r#"{"model":"llama3.2","response":"Profit = revenue - costs","done":true}"#)
            .unwrap();
        assert_eq!(answer, "Profit = revenue - costs");
    }

    #[test]
    fn test_missing_response_is_sentinel() {
        assert_eq!(parse_generate_body(r#"{"done":true}"#).unwrap(), NO_RESPONSE);
        assert_eq!(parse_generate_body(r#"{"response":null}"#).unwrap(), NO_RESPONSE);
    }

    #[test]
    fn test_non_json_is_llm_error() {
        assert!(matches!(parse_generate_body("<html>"), Err(Error::Llm(_))));
    }

    #[test]
    fn test_request_shape() {
        let request = GenerateRequest {
            model: "llama3.2:latest",
            prompt: "hi",
            stream: false,
            options: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"model": "llama3.2:latest", "prompt": "hi", "stream": false})
        );
    }
}
