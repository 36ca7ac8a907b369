//! Sliding word-window chunking

use crate::config::ChunkingConfig;
use crate::types::Chunk;

/// Splits text into overlapping windows of whitespace-delimited words
///
/// Window `i` covers words `[i * stride, i * stride + window)`. Windows stop
/// once one reaches the final word, so the last window may be shorter than
/// `window` but is never wholly contained in its predecessor.
#[derive(Debug, Clone)]
pub struct WordChunker {
    window: usize,
    stride: usize,
}

impl WordChunker {
    /// Create a new chunker; `window >= stride > 0` is expected
    pub fn new(window: usize, stride: usize) -> Self {
        Self {
            window: window.max(1),
            stride: stride.clamp(1, window.max(1)),
        }
    }

    /// Create from config
    pub fn from_config(config: &ChunkingConfig) -> Self {
        Self::new(config.window, config.stride)
    }

    /// Words per window
    pub fn window(&self) -> usize {
        self.window
    }

    /// Words between window starts
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Split text into window strings
    pub fn split(&self, text: &str) -> Vec<String> {
        let words: Vec<&str> = text.split_whitespace().collect();
        let mut windows = Vec::with_capacity(self.expected_count(words.len()));

        if words.is_empty() {
            return windows;
        }

        let mut start = 0;
        loop {
            let end = (start + self.window).min(words.len());
            windows.push(words[start..end].join(" "));
            if end == words.len() {
                break;
            }
            start += self.stride;
        }

        windows
    }

    /// Split text into chunks numbered from `first_ordinal`
    pub fn chunk(&self, text: &str, source: Option<&str>, first_ordinal: usize) -> Vec<Chunk> {
        self.split(text)
            .into_iter()
            .enumerate()
            .map(|(i, window)| {
                Chunk::new(window, source.map(str::to_string), first_ordinal + i)
            })
            .collect()
    }

    /// `ceil(max(T - W, 0) / S) + 1` for `T > 0`, else 0
    pub fn expected_count(&self, tokens: usize) -> usize {
        if tokens == 0 {
            return 0;
        }
        tokens.saturating_sub(self.window).div_ceil(self.stride) + 1
    }
}

impl Default for WordChunker {
    fn default() -> Self {
        Self::from_config(&ChunkingConfig::default())
    }
}
