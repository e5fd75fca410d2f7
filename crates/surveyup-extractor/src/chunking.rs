//! Splitting long survey text into oracle-sized chunks
//!
//! Chunks are carved left to right. Each cut is pulled back from the naive
//! size limit to the start of the last question or section marker found in
//! the lookback window, so a question is never split across two oracle calls
//! when a boundary is available. Without a marker the cut falls back to the
//! last line break, and only then to the raw size limit.

use crate::config::ExtractorConfig;
use once_cell::sync::Lazy;
use regex::Regex;
use surveyup_domain::Chunk;

/// Line-leading markers that open a question or a section
///
/// Recognized: part/section headers (`PART 2`, `[Section B]`, `파트 1`),
/// question codes (`Q1.`, `SQ3`, `A1_1)`, `DQ2:`) and bare numbered items (`12. `).
/// Parenthesised numbers (`1)`) are left alone since they usually number options.
/// Lines may end in `\n` or `\r\n`.
static BOUNDARY_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?mR)^[ \t]*(?:\[?(?:(?i:part|section)\b|파트|섹션)[ \t]*[0-9A-Za-z]+|[A-Z]{1,3}[0-9]+(?:[-_][0-9]+)*(?:[.):]|[ \t]|$)|[0-9]+\.(?:[ \t]|$))",
    )
    .unwrap()
});

/// Splits survey text at question boundaries
#[derive(Debug, Clone, Copy)]
pub struct SurveyChunker {
    max_chunk_size: usize,
    lookback: usize,
}

impl SurveyChunker {
    /// Create a new chunker; sizes are in characters
    pub fn new(max_chunk_size: usize, lookback: usize) -> Self {
        Self {
            max_chunk_size: max_chunk_size.max(1),
            lookback: lookback.max(1),
        }
    }

    /// Create a chunker from extractor settings
    pub fn from_config(config: &ExtractorConfig) -> Self {
        Self::new(config.max_chunk_size, config.lookback)
    }

    /// Split `text` into ordered, contiguous chunks
    ///
    /// Concatenating the chunk texts reproduces `text` exactly. Text no longer
    /// than the size limit comes back as a single chunk.
    pub fn split<'a>(&self, text: &'a str) -> Vec<Chunk<'a>> {
        let mut chunks = Vec::new();
        let mut cursor = 0;

        loop {
            let naive_cut = match text[cursor..].char_indices().nth(self.max_chunk_size) {
                Some((offset, _)) => cursor + offset,
                None => {
                    chunks.push(Chunk::new(chunks.len(), text, cursor, text.len()));
                    break;
                }
            };

            let cut = self.find_cut(text, cursor, naive_cut);
            debug_assert!(cut > cursor && cut <= naive_cut);

            chunks.push(Chunk::new(chunks.len(), text, cursor, cut));
            cursor = cut;
        }

        chunks
    }

    /// Pick a cut in `(cursor, naive_cut]`
    fn find_cut(&self, text: &str, cursor: usize, naive_cut: usize) -> usize {
        let span = &text[cursor..naive_cut];

        // `span` holds exactly `max_chunk_size` characters
        let back = self.lookback.min(self.max_chunk_size);
        let window_start = span
            .char_indices()
            .rev()
            .nth(back - 1)
            .map(|(offset, _)| cursor + offset)
            .unwrap_or(cursor);
        // Search the real text so `^` and `$` see true line context
        let line_end = text[naive_cut..]
            .find('\n')
            .map_or(text.len(), |i| naive_cut + i);
        let haystack = &text[..line_end];

        let mut marker = None;
        let mut from = window_start;
        while let Some(m) = BOUNDARY_PATTERN.find_at(haystack, from) {
            if m.start() >= naive_cut {
                break;
            }
            if m.start() > cursor {
                marker = Some(m.start());
            }
            from = m.end();
        }
        if let Some(pos) = marker {
            return pos;
        }

        if let Some(newline) = span.rfind('\n') {
            return cursor + newline + 1;
        }

        naive_cut
    }
}

impl Default for SurveyChunker {
    fn default() -> Self {
        Self::from_config(&ExtractorConfig::default())
    }
}
