//! Answer generator trait

use async_trait::async_trait;

use crate::error::Result;

/// Turns a composed prompt into answer text
///
/// Implementations:
/// - `OllamaClient`: local Ollama server
#[async_trait]
pub trait AnswerGenerator: Send + Sync {
    /// Generate an answer for a fully composed prompt
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Check if the generator is reachable
    async fn health_check(&self) -> Result<bool>;

    /// Get the model being used
    fn model(&self) -> &str;
}
