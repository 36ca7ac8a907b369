//! Prompt composition and answer generation

mod llm;
mod ollama;
mod prompt;

pub use llm::AnswerGenerator;
pub use ollama::{parse_generate_body, OllamaClient, NO_RESPONSE};
pub use prompt::PromptBuilder;
