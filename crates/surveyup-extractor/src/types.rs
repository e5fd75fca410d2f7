//! Request and response types for extraction

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use surveyup_domain::{OptionStyle, QuestionRecord, QuestionType, SurveyResult};
use uuid::Uuid;

/// Result of processing a whole document
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionResult {
    /// Merged, renumbered question records
    pub survey: SurveyResult,

    /// Chunks that were skipped
    pub failures: Vec<ChunkFailure>,

    /// Metadata about the run
    pub metadata: ExtractionMetadata,
}

/// Why a chunk was skipped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The oracle call failed
    Oracle,

    /// The oracle answered but the output could not be decoded
    Parse,
}

/// A chunk whose questions could not be collected
#[derive(Debug, Clone, Serialize)]
pub struct ChunkFailure {
    /// Position of the chunk (0-based)
    pub chunk_index: usize,

    /// Byte offset where the chunk starts
    pub start_offset: usize,

    /// Byte offset one past the end of the chunk
    pub end_offset: usize,

    /// Failure category
    pub kind: FailureKind,

    /// Bounded, human-readable reason
    pub reason: String,
}

/// Metadata about an extraction run
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionMetadata {
    /// Identifier of this run
    pub run_id: Uuid,

    /// Timestamp when extraction finished (seconds since Unix epoch)
    pub timestamp: u64,

    /// Name of the LLM model used
    pub model_name: String,

    /// Number of chunks the document was split into
    pub chunk_count: usize,

    /// Number of chunks skipped
    pub chunks_failed: usize,

    /// Number of questions collected
    pub questions_total: usize,

    /// Processing time in milliseconds
    pub processing_time_ms: u64,
}

/// Internal representation of a question as the oracle returned it
///
/// Every field is optional; the oracle may omit anything. Original Korean
/// keys are accepted alongside the English ones.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub(crate) struct QuestionCandidate {
    #[serde(alias = "문항번호", deserialize_with = "lenient_text")]
    pub item_id: Option<String>,

    #[serde(alias = "콘솔번호", deserialize_with = "lenient_text")]
    pub console_id: Option<String>,

    #[serde(alias = "프로그래밍_로직", deserialize_with = "lenient_text")]
    pub programming_logic: Option<String>,

    #[serde(alias = "콘솔_로직", deserialize_with = "lenient_text")]
    pub console_logic: Option<String>,

    #[serde(alias = "응답가이드", deserialize_with = "lenient_text")]
    pub response_guide: Option<String>,

    #[serde(alias = "검수_로직", deserialize_with = "lenient_text")]
    pub review_logic: Option<String>,

    #[serde(alias = "질문유형", deserialize_with = "lenient_text")]
    pub question_type: Option<String>,

    #[serde(alias = "보기유형", deserialize_with = "lenient_text")]
    pub option_style: Option<String>,

    #[serde(alias = "문항", deserialize_with = "lenient_text")]
    pub prompt: Option<String>,

    #[serde(alias = "보기", deserialize_with = "lenient_options")]
    pub options: Vec<String>,
}

impl QuestionCandidate {
    /// A candidate with neither an item number nor question text carries nothing
    pub fn is_empty(&self) -> bool {
        self.item_id.is_none() && self.prompt.is_none()
    }

    /// Build the final record under the given console id
    ///
    /// The oracle's own `console_id` is discarded.
    pub fn into_record(self, console_id: String) -> QuestionRecord {
        let question_type = self
            .question_type
            .as_deref()
            .and_then(QuestionType::parse)
            .unwrap_or(if self.options.is_empty() {
                QuestionType::OpenText
            } else {
                QuestionType::MultipleChoice
            });

        let option_style = self
            .option_style
            .as_deref()
            .and_then(OptionStyle::parse)
            .unwrap_or(match question_type {
                QuestionType::OpenText => OptionStyle::Text,
                QuestionType::MultipleChoice => OptionStyle::SingleSelect,
            });

        QuestionRecord {
            item_id: self.item_id.unwrap_or_default(),
            console_id,
            programming_logic: self.programming_logic,
            console_logic: self.console_logic,
            response_guide: self.response_guide,
            review_logic: self.review_logic,
            question_type,
            option_style,
            prompt: self.prompt.unwrap_or_default(),
            options: self.options,
        }
    }
}

/// Text field that tolerates numbers, lists and blank strings
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_text(&value))
}

/// Option list that tolerates a single string, numbers and nulls
fn lenient_options<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => items.iter().filter_map(value_to_text).collect(),
        other => value_to_text(&other).into_iter().collect(),
    })
}

fn value_to_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::Null => return None,
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Array(items) => items
            .iter()
            .filter_map(value_to_text)
            .collect::<Vec<_>>()
            .join("\n"),
        Value::Object(_) => value.to_string(),
    };
    if text.is_empty() || text.eq_ignore_ascii_case("null") {
        None
    } else {
        Some(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(json: &str) -> QuestionCandidate {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_english_keys() {
        let c = candidate(
            r#"{
                "item_id": "SQ1",
                "console_id": "Q99",
                "question_type": "multiple-choice",
                "option_style": "single-select",
                "prompt": "SQ1. Gender",
                "options": ["Male", "Female"]
            }"#,
        );
        let record = c.into_record("Q1".to_string());
        assert_eq!(record.item_id, "SQ1");
        assert_eq!(record.console_id, "Q1");
        assert_eq!(record.options, vec!["Male", "Female"]);
        assert_eq!(record.option_style, OptionStyle::SingleSelect);
    }

    #[test]
    fn test_korean_keys() {
        let c = candidate(
            r#"{
                "문항번호": "A3",
                "콘솔번호": "Q3",
                "프로그래밍_로직": "보기 Rotation",
                "콘솔_로직": null,
                "질문유형": "객관식",
                "보기유형": "복수선택",
                "문항": "A3. 이용 경험이 있는 서비스를 모두 선택해 주세요.",
                "보기": ["가", "나", "다"]
            }"#,
        );
        let record = c.into_record("Q10".to_string());
        assert_eq!(record.item_id, "A3");
        assert_eq!(record.programming_logic.as_deref(), Some("보기 Rotation"));
        assert_eq!(record.console_logic, None);
        assert_eq!(record.question_type, QuestionType::MultipleChoice);
        assert_eq!(record.option_style, OptionStyle::MultiSelect);
        assert_eq!(record.options.len(), 3);
    }

    #[test]
    fn test_lenient_values() {
        let c = candidate(
            r#"{
                "item_id": 5,
                "console_logic": ["If 1, end survey", "If 2, go to A4"],
                "response_guide": "   ",
                "options": [1, null, "Other", ""]
            }"#,
        );
        assert_eq!(c.item_id.as_deref(), Some("5"));
        assert_eq!(c.console_logic.as_deref(), Some("If 1, end survey\nIf 2, go to A4"));
        assert_eq!(c.response_guide, None);
        assert_eq!(c.options, vec!["1", "Other"]);
    }

    #[test]
    fn test_type_inference_without_labels() {
        let open = candidate(r#"{"item_id": "A9", "prompt": "A9. Why?"}"#).into_record("Q1".into());
        assert_eq!(open.question_type, QuestionType::OpenText);
        assert_eq!(open.option_style, OptionStyle::Text);

        let choice = candidate(r#"{"item_id": "A8", "options": ["a", "b"], "option_style": "weird"}"#)
            .into_record("Q2".into());
        assert_eq!(choice.question_type, QuestionType::MultipleChoice);
        assert_eq!(choice.option_style, OptionStyle::SingleSelect);
    }

    #[test]
    fn test_empty_candidate() {
        assert!(candidate("{}").is_empty());
        assert!(candidate(r#"{"options": ["a"]}"#).is_empty());
        assert!(!candidate(r#"{"prompt": "Q"}"#).is_empty());
    }
}
