//! Plain text extraction from survey documents
//!
//! All readers are blocking; async callers should run them on a blocking
//! thread.

use crate::error::ConvertError;
use crate::format::SourceFormat;
use calamine::{open_workbook, Reader, Xlsx};
use quick_xml::events::Event;
use std::fs;
use std::io::Read;
use std::path::Path;
use tracing::debug;

const DOCX_BODY: &str = "word/document.xml";

/// Extract text from `path`, detecting the format from its extension
pub fn extract_text(path: &Path) -> Result<String, ConvertError> {
    let format = SourceFormat::from_path(path)?;
    extract_text_as(path, format)
}

/// Extract text from `path` as the given format
pub fn extract_text_as(path: &Path, format: SourceFormat) -> Result<String, ConvertError> {
    debug!("Extracting text from {:?} as {}", path, format);

    let text = match format {
        SourceFormat::Txt => read_txt(path)?,
        SourceFormat::Docx => read_docx(path)?,
        SourceFormat::Xlsx => read_xlsx(path)?,
        SourceFormat::Pdf => read_pdf(path)?,
    };

    debug!("Extracted {} chars", text.chars().count());
    Ok(text)
}

fn read_txt(path: &Path) -> Result<String, ConvertError> {
    let bytes = fs::read(path)?;
    let text = String::from_utf8(bytes)
        .map_err(|_| ConvertError::Extraction("text file is not valid UTF-8".to_string()))?;
    Ok(match text.strip_prefix('\u{feff}') {
        Some(stripped) => stripped.to_string(),
        None => text,
    })
}

fn read_docx(path: &Path) -> Result<String, ConvertError> {
    let file = fs::File::open(path)?;
    let mut archive = zip::ZipArchive::new(file)
        .map_err(|e| ConvertError::Extraction(format!("invalid docx container: {}", e)))?;

    let mut xml = String::new();
    archive
        .by_name(DOCX_BODY)
        .map_err(|e| ConvertError::Extraction(format!("missing {}: {}", DOCX_BODY, e)))?
        .read_to_string(&mut xml)?;

    docx_text_from_xml(&xml)
}

/// Body paragraphs first, one per line, then every table row as ` | `-joined cells
pub(crate) fn docx_text_from_xml(xml: &str) -> Result<String, ConvertError> {
    let mut reader = quick_xml::Reader::from_str(xml);
    let mut doc = DocxText::default();

    loop {
        let event = reader
            .read_event()
            .map_err(|e| ConvertError::Extraction(format!("malformed document.xml: {}", e)))?;

        match event {
            Event::Start(e) => match e.local_name().as_ref() {
                b"tbl" => doc.table_depth += 1,
                b"r" => doc.in_run = true,
                b"t" => doc.in_text = true,
                _ => {}
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"p" => doc.end_paragraph(),
                b"tab" if doc.in_run => doc.paragraph.push('\t'),
                b"br" | b"cr" if doc.in_run => doc.paragraph.push('\n'),
                _ => {}
            },
            Event::Text(t) if doc.in_text => {
                let text = t
                    .unescape()
                    .map_err(|e| ConvertError::Extraction(format!("bad text escape: {}", e)))?;
                doc.paragraph.push_str(&text);
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"t" => doc.in_text = false,
                b"r" => doc.in_run = false,
                b"p" => doc.end_paragraph(),
                b"tc" => doc.end_cell(),
                b"tr" => doc.end_row(),
                b"tbl" => doc.table_depth = doc.table_depth.saturating_sub(1),
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(doc.finish())
}

#[derive(Default)]
struct DocxText {
    paragraphs: Vec<String>,
    table_rows: Vec<String>,
    paragraph: String,
    cell_paragraphs: Vec<String>,
    row_cells: Vec<String>,
    table_depth: usize,
    in_run: bool,
    in_text: bool,
}

impl DocxText {
    fn end_paragraph(&mut self) {
        let paragraph = std::mem::take(&mut self.paragraph);
        if self.table_depth == 0 {
            self.paragraphs.push(paragraph);
        } else {
            self.cell_paragraphs.push(paragraph);
        }
    }

    // Nested tables fold into the enclosing cell
    fn end_cell(&mut self) {
        if self.table_depth == 1 {
            let cell = self.cell_paragraphs.join("\n");
            self.row_cells.push(cell.trim().to_string());
            self.cell_paragraphs.clear();
        }
    }

    fn end_row(&mut self) {
        if self.table_depth == 1 {
            self.table_rows.push(self.row_cells.join(" | "));
            self.row_cells.clear();
        }
    }

    fn finish(self) -> String {
        self.paragraphs
            .into_iter()
            .chain(self.table_rows)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn read_xlsx(path: &Path) -> Result<String, ConvertError> {
    let mut workbook: Xlsx<_> = open_workbook(path)
        .map_err(|e: calamine::XlsxError| ConvertError::Extraction(format!("invalid xlsx: {}", e)))?;

    let mut parts = Vec::new();
    for name in workbook.sheet_names() {
        let range = workbook
            .worksheet_range(&name)
            .map_err(|e| ConvertError::Extraction(format!("sheet '{}': {}", name, e)))?;

        parts.push(format!("=== {} ===", name));
        for row in range.rows() {
            let mut cells: Vec<String> = row.iter().map(|cell| cell.to_string().trim().to_string()).collect();
            while cells.last().is_some_and(|cell| cell.is_empty()) {
                cells.pop();
            }
            if !cells.is_empty() {
                parts.push(cells.join(" | "));
            }
        }
    }

    Ok(parts.join("\n"))
}

fn read_pdf(path: &Path) -> Result<String, ConvertError> {
    let bytes = fs::read(path)?;

    // pdf-extract panics on some malformed inputs
    std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(&bytes))
        .map_err(|_| ConvertError::Extraction("PDF parser crashed on this file".to_string()))?
        .map_err(|e| ConvertError::Extraction(format!("PDF extraction failed: {}", e)))
}
