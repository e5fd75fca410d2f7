//! Supported source document formats

use crate::error::ConvertError;
use std::fmt;
use std::path::Path;

/// A document format the text extractor can read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceFormat {
    /// Plain UTF-8 text
    Txt,
    /// Word document
    Docx,
    /// Excel workbook
    Xlsx,
    /// PDF document
    Pdf,
}

impl SourceFormat {
    /// Every supported format
    pub const ALL: [SourceFormat; 4] = [Self::Txt, Self::Docx, Self::Xlsx, Self::Pdf];

    /// Look up a format by extension, with or without the leading dot
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.strip_prefix('.').unwrap_or(ext);
        Self::ALL
            .into_iter()
            .find(|format| format.extension().eq_ignore_ascii_case(ext))
    }

    /// Detect the format of `path` from its extension
    pub fn from_path(path: &Path) -> Result<Self, ConvertError> {
        let ext = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");
        Self::from_extension(ext).ok_or_else(|| {
            ConvertError::UnsupportedFormat(if ext.is_empty() {
                "(no extension)".to_string()
            } else {
                format!(".{}", ext)
            })
        })
    }

    /// Canonical extension, without the dot
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Txt => "txt",
            Self::Docx => "docx",
            Self::Xlsx => "xlsx",
            Self::Pdf => "pdf",
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ".{}", self.extension())
    }
}
