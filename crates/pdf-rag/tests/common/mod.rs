//! Shared helpers for integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use parking_lot::Mutex;
use std::path::Path;
use std::sync::Arc;

use pdf_rag::config::ChunkingConfig;
use pdf_rag::embeddings::HashEmbedder;
use pdf_rag::generation::AnswerGenerator;
use pdf_rag::retrieval::CorpusManager;
use pdf_rag::Result;

pub const DIMENSIONS: usize = 256;

const WORDS_PER_LINE: usize = 10;
const LINES_PER_PAGE: usize = 40;

/// Build a PDF whose text is `words`, ten per line, forty lines per page
///
/// Each line is its own text object. No words gives a single blank page.
pub fn pdf_from_words(words: &[String]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let lines: Vec<String> = words
        .chunks(WORDS_PER_LINE)
        .map(|line| line.join(" "))
        .collect();
    let pages: Vec<&[String]> = if lines.is_empty() {
        vec![&lines[..]]
    } else {
        lines.chunks(LINES_PER_PAGE).collect()
    };

    let mut kids: Vec<Object> = Vec::new();
    for page_lines in pages {
        let mut operations = Vec::new();
        for (row, line) in page_lines.iter().enumerate() {
            let y = 800 - 18 * row as i64;
            operations.push(Operation::new("BT", vec![]));
            operations.push(Operation::new("Tf", vec!["F1".into(), 10.into()]));
            operations.push(Operation::new("Td", vec![40.into(), y.into()]));
            operations.push(Operation::new("Tj", vec![Object::string_literal(line.as_str())]));
            operations.push(Operation::new("ET", vec![]));
        }

        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().expect("encode content"),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => count,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).expect("save pdf");
    buf
}

/// `count` words cycling through `vocabulary`
pub fn words(vocabulary: &[&str], count: usize) -> Vec<String> {
    vocabulary
        .iter()
        .cycle()
        .take(count)
        .map(|w| w.to_string())
        .collect()
}

/// `count` distinct words `w0, w1, ...`
pub fn numbered_words(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("w{}", i)).collect()
}

/// A PDF of `count` words drawn from `vocabulary`
pub fn pdf(vocabulary: &[&str], count: usize) -> Vec<u8> {
    pdf_from_words(&words(vocabulary, count))
}

pub fn write_pdf(dir: &Path, name: &str, vocabulary: &[&str], count: usize) {
    std::fs::write(dir.join(name), pdf(vocabulary, count)).expect("write pdf");
}

pub fn manager(docs_dir: &Path) -> Arc<CorpusManager> {
    Arc::new(CorpusManager::new(
        Arc::new(HashEmbedder::new(DIMENSIONS)),
        &ChunkingConfig::default(),
        docs_dir,
    ))
}

/// Generator that records prompts and answers with a fixed string
pub struct RecordingGenerator {
    pub prompts: Mutex<Vec<String>>,
    answer: String,
}

impl RecordingGenerator {
    pub fn new(answer: &str) -> Arc<Self> {
        Arc::new(Self {
            prompts: Mutex::new(Vec::new()),
            answer: answer.to_string(),
        })
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().last().cloned()
    }
}

#[async_trait]
impl AnswerGenerator for RecordingGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().push(prompt.to_string());
        Ok(self.answer.clone())
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    fn model(&self) -> &str {
        "recording"
    }
}

pub const FINANCE: &[&str] = &[
    "balance", "sheet", "assets", "liabilities", "equity", "depreciation", "ledger", "accrual",
];

pub const MARKETING: &[&str] = &[
    "brand", "segmentation", "targeting", "positioning", "promotion", "pricing", "channel", "campaign",
];

pub const OPERATIONS: &[&str] = &[
    "inventory", "logistics", "warehouse", "procurement", "supplier", "throughput", "capacity", "scheduling",
];
