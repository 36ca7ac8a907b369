//! Per-query control flow: pick a corpus, retrieve, prompt, generate

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::generation::{AnswerGenerator, PromptBuilder};
use crate::retrieval::{CorpusManager, RetrievedChunk, Retriever};
use crate::storage::UploadStore;
use crate::types::{CorpusKind, QueryResponse, UploadedFile};

/// Context chosen for one query
#[derive(Debug, Clone)]
pub struct Retrieval {
    /// Matched chunks, closest first
    pub hits: Vec<RetrievedChunk>,
    /// Chunk texts joined by blank lines
    pub context: String,
    /// Corpus the hits came from
    pub corpus: CorpusKind,
    /// One entry per skipped upload
    pub warnings: Vec<String>,
}

/// Question answering over the base corpus or a query's uploads
pub struct QaPipeline {
    corpora: Arc<CorpusManager>,
    retriever: Arc<Retriever>,
    generator: Arc<dyn AnswerGenerator>,
    uploads: Option<UploadStore>,
}

impl QaPipeline {
    /// Create a pipeline; `uploads` is `None` when uploads are not persisted
    pub fn new(
        corpora: Arc<CorpusManager>,
        top_k: usize,
        generator: Arc<dyn AnswerGenerator>,
        uploads: Option<UploadStore>,
    ) -> Self {
        let retriever = Arc::new(Retriever::new(Arc::clone(corpora.embedder()), top_k));
        Self {
            corpora,
            retriever,
            generator,
            uploads,
        }
    }

    /// Corpus manager
    pub fn corpora(&self) -> &Arc<CorpusManager> {
        &self.corpora
    }

    /// Answer generator
    pub fn generator(&self) -> &Arc<dyn AnswerGenerator> {
        &self.generator
    }

    /// Retrieve context, compose the prompt, and generate an answer
    pub async fn answer(&self, question: &str, files: Vec<UploadedFile>) -> Result<QueryResponse> {
        let retrieval = self.retrieve(question, files).await?;

        let prompt = PromptBuilder::build_qa_prompt(question, &retrieval.context);
        let answer = self.generator.generate(&prompt).await?;

        Ok(QueryResponse {
            answer,
            context: retrieval.context,
            corpus: retrieval.corpus,
            warnings: retrieval.warnings,
        })
    }

    /// Select the corpus for this query and retrieve context from it
    ///
    /// Uploaded files, when present, are indexed into a fresh session corpus
    /// that replaces the base corpus for this query only. If none of them
    /// yields text the query stops with [`Error::EmptyCorpus`].
    pub async fn retrieve(&self, question: &str, files: Vec<UploadedFile>) -> Result<Retrieval> {
        if question.trim().is_empty() {
            return Err(Error::Config("question must not be empty".to_string()));
        }

        let session = if files.is_empty() {
            None
        } else {
            let corpora = Arc::clone(&self.corpora);
            let batch = files.clone();
            let session = tokio::task::spawn_blocking(move || corpora.build_session_corpus(&batch))
                .await
                .map_err(|e| Error::internal(format!("Task join error: {}", e)))??;

            self.persist_uploads(&files, &session.accepted_indices).await;

            if session.is_empty() {
                let mut message = "No valid content extracted from uploaded PDFs".to_string();
                if !session.warnings.is_empty() {
                    message.push_str(": ");
                    message.push_str(&session.warnings.join("; "));
                }
                return Err(Error::empty_corpus(message));
            }
            Some(session)
        };

        let corpora = Arc::clone(&self.corpora);
        let retriever = Arc::clone(&self.retriever);
        let question = question.to_string();

        tokio::task::spawn_blocking(move || -> Result<Retrieval> {
            match session {
                Some(session) => {
                    tracing::debug!("Answering from session corpus ({} chunks)", session.corpus.len());
                    let retrieved = retriever.retrieve(&question, &session.corpus)?;
                    Ok(Retrieval {
                        hits: retrieved.hits,
                        context: retrieved.context,
                        corpus: CorpusKind::Session,
                        warnings: session.warnings,
                    })
                }
                None => {
                    let base = corpora.base_corpus()?;
                    tracing::debug!("Answering from base corpus ({} chunks)", base.len());
                    let retrieved = retriever.retrieve(&question, &base)?;
                    Ok(Retrieval {
                        hits: retrieved.hits,
                        context: retrieved.context,
                        corpus: CorpusKind::Base,
                        warnings: Vec::new(),
                    })
                }
            }
        })
        .await
        .map_err(|e| Error::internal(format!("Task join error: {}", e)))?
    }

    /// Save uploads that parsed; failures are logged only
    async fn persist_uploads(&self, files: &[UploadedFile], accepted: &[usize]) {
        let Some(store) = &self.uploads else {
            return;
        };

        for file in accepted.iter().filter_map(|&i| files.get(i)) {
            if let Err(e) = store.save(&file.filename, &file.data).await {
                tracing::warn!("Could not save upload '{}': {}", file.filename, e);
            }
        }
    }
}
