//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use surveyup_domain::{Chunk, QuestionRecord};
use surveyup_extractor::{ChunkFailure, ExtractionResult};
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Longest cell text shown in tables
const CELL_PREVIEW_CHARS: usize = 40;

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format an analysis result.
    pub fn format_analysis(&self, result: &ExtractionResult) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&serde_json::json!({
                "questions": result.survey.questions(),
                "failures": result.failures,
                "metadata": result.metadata,
            }))?),
            OutputFormat::Table => {
                let mut out = self.format_questions_table(result.survey.questions());
                if !result.failures.is_empty() {
                    out.push('\n');
                    out.push_str(&self.format_failures(&result.failures));
                }
                Ok(out)
            }
        }
    }

    fn format_questions_table(&self, questions: &[QuestionRecord]) -> String {
        if questions.is_empty() {
            return self.colorize("No questions found.", "yellow");
        }

        let mut builder = Builder::default();
        builder.push_record(["Console", "Item", "Type", "Style", "Question", "Options"]);

        for question in questions {
            builder.push_record([
                question.console_id.clone(),
                question.item_id.clone(),
                question.question_type.as_str().to_string(),
                question.option_style.as_str().to_string(),
                preview(&question.prompt),
                question.options.len().to_string(),
            ]);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        table.to_string()
    }

    fn format_failures(&self, failures: &[ChunkFailure]) -> String {
        failures
            .iter()
            .map(|f| {
                self.warning(&format!(
                    "Chunk {} skipped (bytes {}..{}): {}",
                    f.chunk_index + 1,
                    f.start_offset,
                    f.end_offset,
                    f.reason
                ))
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Format a chunk plan.
    pub fn format_chunks(&self, chunks: &[Chunk<'_>]) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let plan: Vec<serde_json::Value> = chunks
                    .iter()
                    .map(|c| {
                        serde_json::json!({
                            "index": c.index,
                            "start_offset": c.start_offset,
                            "end_offset": c.end_offset,
                            "chars": c.char_len(),
                            "first_line": first_line(c.text),
                        })
                    })
                    .collect();
                Ok(serde_json::to_string_pretty(&plan)?)
            }
            OutputFormat::Table => {
                if chunks.is_empty() {
                    return Ok(self.colorize("Document is empty.", "yellow"));
                }

                let mut builder = Builder::default();
                builder.push_record(["#", "Start", "End", "Chars", "Begins with"]);
                for chunk in chunks {
                    builder.push_record([
                        (chunk.index + 1).to_string(),
                        chunk.start_offset.to_string(),
                        chunk.end_offset.to_string(),
                        chunk.char_len().to_string(),
                        preview(first_line(chunk.text)),
                    ]);
                }

                let mut table = builder.build();
                table
                    .with(Style::rounded())
                    .with(Modify::new(Rows::first()).with(Alignment::center()));

                Ok(table.to_string())
            }
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}

fn first_line(text: &str) -> &str {
    text.lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("")
}

/// Single-line preview of at most `CELL_PREVIEW_CHARS` characters
fn preview(text: &str) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= CELL_PREVIEW_CHARS {
        return flat;
    }
    let mut cut: String = flat.chars().take(CELL_PREVIEW_CHARS - 1).collect();
    cut.push('…');
    cut
}
