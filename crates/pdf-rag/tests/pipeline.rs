//! End-to-end pipeline tests over generated PDFs

mod common;

use std::sync::Arc;

use common::*;
use pdf_rag::storage::UploadStore;
use pdf_rag::{CorpusKind, Error, QaPipeline, UploadedFile};

fn pipeline(docs_dir: &std::path::Path, generator: Arc<RecordingGenerator>) -> QaPipeline {
    QaPipeline::new(manager(docs_dir), 5, generator, None)
}

#[test]
fn test_450_word_pdf_is_one_chunk() {
    let dir = tempfile::tempdir().unwrap();
    let files = vec![UploadedFile::new("short.pdf", pdf(FINANCE, 450))];

    let session = manager(dir.path()).build_session_corpus(&files).unwrap();

    assert_eq!(session.corpus.len(), 1);
    assert_eq!(session.accepted, vec!["short.pdf"]);
    assert!(session.warnings.is_empty());
}

#[test]
fn test_long_pdf_gets_overlapping_windows() {
    let dir = tempfile::tempdir().unwrap();
    let files = vec![UploadedFile::new("long.pdf", pdf(OPERATIONS, 1200))];

    let session = manager(dir.path()).build_session_corpus(&files).unwrap();
    let chunks = session.corpus.chunks();

    assert_eq!(chunks.len(), 3);
    assert_eq!(chunks[0].word_count(), 500);
    for (i, chunk) in chunks.iter().enumerate() {
        assert_eq!(chunk.ordinal, i);
        assert_eq!(chunk.source.as_deref(), Some("long.pdf"));
    }
}

#[test]
fn test_base_corpus_reads_sorted_pdfs_once() {
    let dir = tempfile::tempdir().unwrap();
    write_pdf(dir.path(), "b_marketing.pdf", MARKETING, 300);
    write_pdf(dir.path(), "a_finance.pdf", FINANCE, 300);
    std::fs::write(dir.path().join("readme.txt"), "not indexed").unwrap();

    let manager = manager(dir.path());
    let first = manager.base_corpus().unwrap();
    let second = manager.base_corpus().unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(first.stats().documents, 2);
    assert_eq!(first.len(), 2);
    assert_eq!(first.chunks()[0].source.as_deref(), Some("a_finance.pdf"));
    assert_eq!(first.chunks()[1].source.as_deref(), Some("b_marketing.pdf"));
}

#[test]
fn test_base_corpus_skips_broken_pdf() {
    let dir = tempfile::tempdir().unwrap();
    write_pdf(dir.path(), "finance.pdf", FINANCE, 200);
    std::fs::write(dir.path().join("broken.pdf"), b"%PDF-1.4 truncated").unwrap();

    let base = manager(dir.path()).base_corpus().unwrap();
    assert_eq!(base.stats().documents, 1);
    assert_eq!(base.len(), 1);
}

#[tokio::test]
async fn test_valid_and_corrupted_uploads() {
    let dir = tempfile::tempdir().unwrap();
    let generator = RecordingGenerator::new("stub answer");
    let pipeline = pipeline(dir.path(), generator.clone());

    let files = vec![
        UploadedFile::new("good.pdf", pdf(MARKETING, 450)),
        UploadedFile::new("corrupted.pdf", b"not a pdf".to_vec()),
    ];
    let response = pipeline
        .answer("How should a brand pick its segmentation?", files)
        .await
        .unwrap();

    assert_eq!(response.answer, "stub answer");
    assert_eq!(response.corpus, CorpusKind::Session);
    assert_eq!(response.warnings.len(), 1);
    assert!(response.warnings[0].contains("corrupted.pdf"));
    assert!(response.context.contains("segmentation"));
}

#[tokio::test]
async fn test_only_corrupted_uploads_stop_the_query() {
    let dir = tempfile::tempdir().unwrap();
    write_pdf(dir.path(), "finance.pdf", FINANCE, 200);
    let generator = RecordingGenerator::new("unused");
    let pipeline = pipeline(dir.path(), generator.clone());

    let files = vec![UploadedFile::new("scan.pdf", b"garbage".to_vec())];
    let result = pipeline.answer("What is equity?", files).await;

    match result {
        Err(Error::EmptyCorpus(message)) => assert!(message.contains("scan.pdf")),
        other => panic!("expected empty corpus error, got {:?}", other),
    }
    assert!(generator.prompts.lock().is_empty());
}

#[tokio::test]
async fn test_no_uploads_uses_base_corpus() {
    let dir = tempfile::tempdir().unwrap();
    write_pdf(dir.path(), "finance.pdf", FINANCE, 450);
    let generator = RecordingGenerator::new("base answer");
    let pipeline = pipeline(dir.path(), generator.clone());

    let response = pipeline
        .answer("What goes on a balance sheet?", Vec::new())
        .await
        .unwrap();

    assert_eq!(response.corpus, CorpusKind::Base);
    assert!(response.warnings.is_empty());
    assert!(response.context.contains("ledger"));
}

#[tokio::test]
async fn test_session_shadows_base() {
    let dir = tempfile::tempdir().unwrap();
    write_pdf(dir.path(), "finance.pdf", FINANCE, 450);
    let generator = RecordingGenerator::new("session answer");
    let pipeline = pipeline(dir.path(), generator.clone());

    let files = vec![UploadedFile::new("ops.pdf", pdf(OPERATIONS, 450))];
    let retrieval = pipeline
        .retrieve("What is a balance sheet?", files)
        .await
        .unwrap();

    assert_eq!(retrieval.corpus, CorpusKind::Session);
    assert!(!retrieval.context.contains("ledger"));
    assert!(retrieval
        .hits
        .iter()
        .all(|h| h.chunk.source.as_deref() == Some("ops.pdf")));

    // The next query without uploads goes back to the base corpus
    let retrieval = pipeline
        .retrieve("What is a balance sheet?", Vec::new())
        .await
        .unwrap();
    assert_eq!(retrieval.corpus, CorpusKind::Base);
    assert!(retrieval.context.contains("ledger"));
}

#[tokio::test]
async fn test_repeated_query_is_deterministic() {
    let dir = tempfile::tempdir().unwrap();
    write_pdf(dir.path(), "finance.pdf", FINANCE, 900);
    write_pdf(dir.path(), "marketing.pdf", MARKETING, 900);
    write_pdf(dir.path(), "ops.pdf", OPERATIONS, 900);
    let pipeline = pipeline(dir.path(), RecordingGenerator::new("same"));

    let first = pipeline.retrieve("warehouse capacity", Vec::new()).await.unwrap();
    let second = pipeline.retrieve("warehouse capacity", Vec::new()).await.unwrap();

    assert_eq!(first.context, second.context);
    let ordinals = |r: &pdf_rag::Retrieval| r.hits.iter().map(|h| h.chunk.ordinal).collect::<Vec<_>>();
    assert_eq!(ordinals(&first), ordinals(&second));
    assert_eq!(first.hits.len(), 5);
    assert!(first.hits.windows(2).all(|w| w[0].distance <= w[1].distance));
}

#[tokio::test]
async fn test_prompt_carries_context_and_question() {
    let dir = tempfile::tempdir().unwrap();
    write_pdf(dir.path(), "finance.pdf", FINANCE, 100);
    let generator = RecordingGenerator::new("ok");
    let pipeline = pipeline(dir.path(), generator.clone());

    let response = pipeline.answer("Define accrual.", Vec::new()).await.unwrap();
    let prompt = generator.last_prompt().unwrap();

    assert!(prompt.starts_with("As a Business Education teacher."));
    assert!(prompt.contains(&format!("Context:\n{}\n\nQuestion: Define accrual.", response.context)));
    assert!(prompt.ends_with("Answer:"));
}

#[tokio::test]
async fn test_empty_base_without_uploads() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = pipeline(dir.path(), RecordingGenerator::new("unused"));

    let result = pipeline.answer("Anything?", Vec::new()).await;
    assert!(matches!(result, Err(Error::EmptyCorpus(_))));
}

#[tokio::test]
async fn test_blank_question_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = pipeline(dir.path(), RecordingGenerator::new("unused"));

    let result = pipeline.answer("   ", Vec::new()).await;
    assert!(matches!(result, Err(Error::Config(_))));
}

#[tokio::test]
async fn test_accepted_uploads_are_persisted() {
    let docs = tempfile::tempdir().unwrap();
    let uploads = tempfile::tempdir().unwrap();
    let upload_dir = uploads.path().join("uploaded_docs");

    let pipeline = QaPipeline::new(
        manager(docs.path()),
        5,
        RecordingGenerator::new("ok"),
        Some(UploadStore::new(&upload_dir)),
    );

    let files = vec![
        UploadedFile::new("reports/q3.pdf", pdf(FINANCE, 120)),
        UploadedFile::new("broken.pdf", b"nope".to_vec()),
    ];
    pipeline.answer("What is depreciation?", files).await.unwrap();

    assert!(upload_dir.join("q3.pdf").is_file());
    assert!(!upload_dir.join("broken.pdf").exists());
}

#[tokio::test]
async fn test_corrupt_upload_never_replaces_valid_namesake() {
    let docs = tempfile::tempdir().unwrap();
    let uploads = tempfile::tempdir().unwrap();
    let pipeline = QaPipeline::new(
        manager(docs.path()),
        5,
        RecordingGenerator::new("ok"),
        Some(UploadStore::new(uploads.path())),
    );

    let valid = pdf(FINANCE, 120);
    let files = vec![
        UploadedFile::new("x.pdf", valid.clone()),
        UploadedFile::new("x.pdf", b"corrupt".to_vec()),
    ];
    let response = pipeline.answer("What is a ledger?", files).await.unwrap();

    assert_eq!(response.warnings.len(), 1);
    assert_eq!(std::fs::read(uploads.path().join("x.pdf")).unwrap(), valid);
}

#[test]
fn test_session_tracks_accepted_positions() {
    let dir = tempfile::tempdir().unwrap();
    let files = vec![
        UploadedFile::new("bad.pdf", b"junk".to_vec()),
        UploadedFile::new("good.pdf", pdf(MARKETING, 50)),
        UploadedFile::new("bad.pdf", b"junk".to_vec()),
    ];

    let session = manager(dir.path()).build_session_corpus(&files).unwrap();

    assert_eq!(session.accepted_indices, vec![1]);
    assert_eq!(session.warnings.len(), 2);
}

#[test]
fn test_textless_pdf_is_not_counted_as_document() {
    let dir = tempfile::tempdir().unwrap();
    let files = vec![
        UploadedFile::new("notes.pdf", pdf(OPERATIONS, 80)),
        UploadedFile::new("scan.pdf", pdf_from_words(&[])),
    ];

    let session = manager(dir.path()).build_session_corpus(&files).unwrap();

    assert_eq!(session.accepted, vec!["notes.pdf", "scan.pdf"]);
    assert_eq!(session.corpus.stats().documents, 1);
    assert_eq!(session.corpus.len(), 1);
}
