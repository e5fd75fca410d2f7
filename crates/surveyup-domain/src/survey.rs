//! Survey module - the merged result of a document

use crate::question::QuestionRecord;
use serde::{Deserialize, Serialize};

/// Ordered question records for a whole document
///
/// Built incrementally while chunks are processed; read-only once handed out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyResult {
    questions: Vec<QuestionRecord>,
}

impl SurveyResult {
    /// Create an empty result
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record in emission order
    pub fn push(&mut self, record: QuestionRecord) {
        self.questions.push(record);
    }

    /// All records in emission order
    pub fn questions(&self) -> &[QuestionRecord] {
        &self.questions
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Whether no records were collected
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Iterate over records in emission order
    pub fn iter(&self) -> std::slice::Iter<'_, QuestionRecord> {
        self.questions.iter()
    }

    /// Consume the result, yielding the records
    pub fn into_questions(self) -> Vec<QuestionRecord> {
        self.questions
    }
}

impl<'a> IntoIterator for &'a SurveyResult {
    type Item = &'a QuestionRecord;
    type IntoIter = std::slice::Iter<'a, QuestionRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.questions.iter()
    }
}

impl From<Vec<QuestionRecord>> for SurveyResult {
    fn from(questions: Vec<QuestionRecord>) -> Self {
        Self { questions }
    }
}
