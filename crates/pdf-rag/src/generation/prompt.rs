//! Prompt template for answer generation

/// Prompt builder for grounded question answering
pub struct PromptBuilder;

impl PromptBuilder {
    /// Build the answer prompt: instructions, context, question, then an `Answer:` cue
    pub fn build_qa_prompt(question: &str, context: &str) -> String {
        format!(
            r#"As a Business Education teacher. Use the context below to answer the user's question.

Context:
{context}

Question: {question}
Answer:"#,
            context = context,
            question = question
        )
    }
}
