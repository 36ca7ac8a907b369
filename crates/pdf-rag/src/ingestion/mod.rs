//! Document ingestion: PDF text extraction and word-window chunking

mod chunker;
mod parser;
mod processor;

pub use chunker::WordChunker;
pub use parser::{ExtractedText, PdfExtractor};
pub use processor::{IngestPipeline, IngestedDocument};
