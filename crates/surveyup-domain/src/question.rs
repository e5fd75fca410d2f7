//! Question module - one questionnaire item in the upload layout

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of option columns the upload layout renders per question
pub const MAX_RENDERED_OPTIONS: usize = 35;

/// Format a console number as it appears on the platform (`Q<n>`)
///
/// # Examples
///
/// ```
/// use surveyup_domain::console_id;
///
/// assert_eq!(console_id(7), "Q7");
/// ```
pub fn console_id(number: usize) -> String {
    format!("Q{}", number)
}

/// Kind of question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionType {
    /// Respondent picks from listed options
    MultipleChoice,

    /// Respondent writes a free-text answer
    OpenText,
}

impl QuestionType {
    /// Get the type name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::MultipleChoice => "multiple-choice",
            QuestionType::OpenText => "open-text",
        }
    }

    /// Label the hosting platform expects in the spreadsheet
    pub fn platform_label(&self) -> &'static str {
        match self {
            QuestionType::MultipleChoice => "객관식",
            QuestionType::OpenText => "주관식",
        }
    }

    /// Parse a question type from oracle output
    ///
    /// Accepts the English names in kebab or snake case and the platform labels.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "multiple-choice" | "choice" | "객관식" => Some(QuestionType::MultipleChoice),
            "open-text" | "open" | "text" | "주관식" => Some(QuestionType::OpenText),
            _ => None,
        }
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How options are presented and answered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OptionStyle {
    /// Exactly one option
    SingleSelect,

    /// Any number of options
    MultiSelect,

    /// Options put in order of preference
    Ranked,

    /// Rating scale
    Scale,

    /// Free text entry
    Text,
}

impl OptionStyle {
    /// Get the style name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            OptionStyle::SingleSelect => "single-select",
            OptionStyle::MultiSelect => "multi-select",
            OptionStyle::Ranked => "ranked",
            OptionStyle::Scale => "scale",
            OptionStyle::Text => "text",
        }
    }

    /// Label the hosting platform expects in the spreadsheet
    pub fn platform_label(&self) -> &'static str {
        match self {
            OptionStyle::SingleSelect => "단일선택",
            OptionStyle::MultiSelect => "복수선택",
            OptionStyle::Ranked => "순위선택",
            OptionStyle::Scale => "척도형",
            OptionStyle::Text => "텍스트",
        }
    }

    /// Parse an option style from oracle output
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "single-select" | "single" | "단일선택" => Some(OptionStyle::SingleSelect),
            "multi-select" | "multiple-select" | "multi" | "복수선택" => {
                Some(OptionStyle::MultiSelect)
            }
            "ranked" | "rank" | "ranking" | "순위선택" => Some(OptionStyle::Ranked),
            "scale" | "rating" | "척도형" => Some(OptionStyle::Scale),
            "text" | "텍스트" => Some(OptionStyle::Text),
            _ => None,
        }
    }
}

impl fmt::Display for OptionStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One questionnaire item, ready for the upload layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRecord {
    /// Original survey numbering (e.g. `SQ1`, `A1`, `A1_1`)
    pub item_id: String,

    /// Sequential platform numbering (`Q<n>`), unique across the document
    pub console_id: String,

    /// Rotation or loop directives
    pub programming_logic: Option<String>,

    /// Branching or termination conditions
    pub console_logic: Option<String>,

    /// Guidance shown to respondents
    pub response_guide: Option<String>,

    /// Data validation conditions
    pub review_logic: Option<String>,

    /// Kind of question
    pub question_type: QuestionType,

    /// How options are answered
    pub option_style: OptionStyle,

    /// Numbered question text
    pub prompt: String,

    /// Answer options in presentation order
    pub options: Vec<String>,
}

impl QuestionRecord {
    /// Options that fit in the rendered option columns
    pub fn rendered_options(&self) -> &[String] {
        let end = self.options.len().min(MAX_RENDERED_OPTIONS);
        &self.options[..end]
    }
}
