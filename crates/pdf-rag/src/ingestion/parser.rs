//! PDF text extraction

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use crate::error::{Error, Result};

/// Upper bound on a single pdf-extract run; some fonts make it spin
const EXTRACT_TIMEOUT: Duration = Duration::from_secs(60);

/// Timed-out pdf-extract threads still running before new documents skip it
const MAX_STALLED_EXTRACTIONS: usize = 4;

/// Abandoned pdf-extract threads that have not finished yet
static STALLED_EXTRACTIONS: AtomicUsize = AtomicUsize::new(0);

/// Text extracted from a PDF, one entry per page in page order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedText {
    /// Per-page text
    pub pages: Vec<String>,
}

impl ExtractedText {
    /// Number of pages
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Pages joined by a newline
    pub fn text(&self) -> String {
        self.pages.join("\n")
    }

    /// True when no page produced any non-whitespace text
    pub fn is_blank(&self) -> bool {
        self.pages.iter().all(|p| p.trim().is_empty())
    }

    fn from_raw_pages(pages: Vec<String>) -> Self {
        Self {
            pages: pages.iter().map(|p| cleanup_pdf_text(p)).collect(),
        }
    }
}

/// Extracts page text from PDF byte streams
pub struct PdfExtractor;

impl PdfExtractor {
    /// Extract every page of a PDF
    ///
    /// Tries pdf-extract first and falls back to lopdf's content-stream reader.
    /// Returns [`Error::Extraction`] only when neither can read the document.
    pub fn extract(filename: &str, data: &[u8]) -> Result<ExtractedText> {
        let pages = match Self::extract_with_timeout(data) {
            Ok(pages) => pages,
            Err(primary) => {
                tracing::debug!("pdf-extract could not read '{}': {}", filename, primary);
                Self::extract_fallback(data).map_err(|fallback| {
                    Error::extraction(filename, format!("{}; fallback: {}", primary, fallback))
                })?
            }
        };

        Ok(ExtractedText::from_raw_pages(pages))
    }

    /// Extract every page with lopdf alone
    pub fn extract_with_lopdf(filename: &str, data: &[u8]) -> Result<ExtractedText> {
        let pages = Self::extract_fallback(data)
            .map_err(|e| Error::extraction(filename, e))?;
        Ok(ExtractedText::from_raw_pages(pages))
    }

    /// Run pdf-extract on its own thread so a hang or panic cannot take the caller down
    fn extract_with_timeout(data: &[u8]) -> std::result::Result<Vec<String>, String> {
        let stalled = STALLED_EXTRACTIONS.load(Ordering::SeqCst);
        if stalled >= MAX_STALLED_EXTRACTIONS {
            tracing::warn!("{} pdf-extract threads still stalled; using lopdf only", stalled);
            return Err("too many stalled extractions".to_string());
        }

        let data = data.to_vec();
        run_with_timeout(
            move || {
                pdf_extract::extract_text_from_mem_by_pages(&data).map_err(|e| e.to_string())
            },
            EXTRACT_TIMEOUT,
            &STALLED_EXTRACTIONS,
        )
    }

    /// Page-by-page extraction through lopdf
    fn extract_fallback(data: &[u8]) -> std::result::Result<Vec<String>, String> {
        let doc = lopdf::Document::load_mem(data).map_err(|e| e.to_string())?;

        let mut pages = Vec::new();
        for page_number in doc.get_pages().keys() {
            match doc.extract_text(&[*page_number]) {
                Ok(text) => pages.push(text),
                Err(e) => {
                    tracing::debug!("Could not read page {}: {}", page_number, e);
                    pages.push(String::new());
                }
            }
        }

        Ok(pages)
    }

    /// Count pages without extracting text
    pub fn page_count(data: &[u8]) -> Option<usize> {
        lopdf::Document::load_mem(data)
            .ok()
            .map(|doc| doc.get_pages().len())
    }
}

/// Fold typographic glyphs to ASCII and drop NUL characters
fn cleanup_pdf_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());

    for ch in text.chars() {
        match ch {
            '\0' => {}
            '\u{2010}' | '\u{2011}' | '\u{2013}' => out.push('-'),
            '\u{2014}' => out.push_str("--"),
            '\u{2018}' | '\u{2019}' => out.push('\''),
            '\u{201C}' | '\u{201D}' => out.push('"'),
            '\u{2022}' => out.push_str("* "),
            '\u{2026}' => out.push_str("..."),
            '\u{00A0}' => out.push(' '),
            '\u{FB00}' => out.push_str("ff"),
            '\u{FB01}' => out.push_str("fi"),
            '\u{FB02}' => out.push_str("fl"),
            '\u{FB03}' => out.push_str("ffi"),
            '\u{FB04}' => out.push_str("ffl"),
            _ => out.push(ch),
        }
    }

    out
}

/// Run `job` on a fresh thread and wait at most `timeout` for it
///
/// A job that overruns is left running and counted in `stalled` until it
/// finishes.
fn run_with_timeout<T, F>(
    job: F,
    timeout: Duration,
    stalled: &'static AtomicUsize,
) -> std::result::Result<T, String>
where
    T: Send + 'static,
    F: FnOnce() -> std::result::Result<T, String> + Send + 'static,
{
    let (tx, rx) = mpsc::channel();

    let handle = thread::spawn(move || {
        let result = panic::catch_unwind(AssertUnwindSafe(job))
            .unwrap_or_else(|_| Err("extraction thread panicked".to_string()));
        // A failed send means the caller gave up on us
        if tx.send(result).is_err() {
            stalled.fetch_sub(1, Ordering::SeqCst);
        }
    });

    match rx.recv_timeout(timeout) {
        Ok(result) => {
            let _ = handle.join();
            result
        }
        Err(mpsc::RecvTimeoutError::Timeout) => {
            stalled.fetch_add(1, Ordering::SeqCst);
            // The job may have finished between the timeout and the increment
            if let Ok(result) = rx.try_recv() {
                stalled.fetch_sub(1, Ordering::SeqCst);
                return result;
            }
            drop(rx);
            tracing::error!(
                "PDF extraction timed out after {:?}; abandoning its thread ({} stalled)",
                timeout,
                stalled.load(Ordering::SeqCst)
            );
            Err("extraction timed out".to_string())
        }
        Err(mpsc::RecvTimeoutError::Disconnected) => {
            let _ = handle.join();
            Err("extraction thread panicked".to_string())
        }
    }
}
