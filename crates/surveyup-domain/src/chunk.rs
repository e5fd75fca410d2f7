//! Chunk module - bounded slices of source text

/// A contiguous slice of the source text submitted to the oracle in one call
///
/// Offsets are byte positions into the original text and always fall on
/// character boundaries, so `&source[start_offset..end_offset] == text`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk<'a> {
    /// Position of this chunk in the document (0-based)
    pub index: usize,

    /// Byte offset where the chunk starts
    pub start_offset: usize,

    /// Byte offset one past the end of the chunk
    pub end_offset: usize,

    /// The chunk text
    pub text: &'a str,
}

impl<'a> Chunk<'a> {
    /// Create a chunk covering `source[start..end]`
    ///
    /// # Panics
    ///
    /// Panics if the range is out of bounds or not on character boundaries.
    pub fn new(index: usize, source: &'a str, start: usize, end: usize) -> Self {
        Self {
            index,
            start_offset: start,
            end_offset: end,
            text: &source[start..end],
        }
    }

    /// Whether this is the first chunk of the document
    pub fn is_first(&self) -> bool {
        self.index == 0
    }

    /// Length of the chunk in characters
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}
