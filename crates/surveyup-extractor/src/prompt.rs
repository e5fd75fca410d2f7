//! Oracle prompt construction for survey analysis

use surveyup_domain::OracleRequest;

/// Builds the oracle request for one chunk
pub struct PromptBuilder<'a> {
    text: &'a str,
    continuation: Option<Continuation>,
}

/// Where the previous chunk left off
#[derive(Debug, Clone, Copy)]
struct Continuation {
    last_console_number: usize,
    part: usize,
    total: usize,
}

impl<'a> PromptBuilder<'a> {
    /// Create a new prompt builder for a chunk of survey text
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            continuation: None,
        }
    }

    /// Mark this chunk as a continuation
    ///
    /// `part` is 1-based; `last_console_number` is the last console number
    /// assigned so far (0 if none).
    pub fn continuation(mut self, last_console_number: usize, part: usize, total: usize) -> Self {
        self.continuation = Some(Continuation {
            last_console_number,
            part,
            total,
        });
        self
    }

    /// Build the complete oracle request
    pub fn build(&self) -> OracleRequest {
        let mut prompt = String::with_capacity(self.text.len() + 1024);

        if let Some(c) = self.continuation {
            prompt.push_str(&format!(
                "This is part {} of {} of the same survey.\n",
                c.part, c.total
            ));
            prompt.push_str(&format!(
                "The previous parts ended at console number Q{}.\n",
                c.last_console_number
            ));
            prompt.push_str(&format!(
                "- Continue console numbering from Q{}\n",
                c.last_console_number + 1
            ));
            prompt.push_str(CONTINUATION_RULES);
            prompt.push_str("\n\n");
        }

        prompt.push_str(ANALYSIS_REQUEST);
        prompt.push_str("\n\n");
        prompt.push_str(self.text);

        OracleRequest {
            system: SYSTEM_PROMPT.to_string(),
            prompt,
        }
    }
}

const ANALYSIS_REQUEST: &str =
    "Analyze the following survey text and convert it into the upload JSON structure:";

const CONTINUATION_RULES: &str = r#"- Keep the item numbers exactly as they appear in the survey (SQ1, A1, ...)
- Fully expand repeated or looped question groups, one question per category
- Do not omit any question"#;

/// Fixed system instruction sent with every chunk
pub const SYSTEM_PROMPT: &str = r#"You are a survey analysis expert. Analyze the survey text you are given and convert it into the question structure used for web upload to the survey platform.

## Output format
Respond with valid JSON only, with no explanation before or after it.
```json
{
  "questions": [
    {
      "item_id": "SQ1 or A1 style item number",
      "console_id": "Q1, Q2, ... increasing sequentially",
      "programming_logic": "option rotation and similar instructions (null if none)",
      "console_logic": "branching and termination conditions (null if none)",
      "response_guide": "instructions shown to the respondent (null if none)",
      "review_logic": "data validation conditions (null if none)",
      "question_type": "multiple-choice or open-text",
      "option_style": "single-select / multi-select / ranked / scale / text",
      "prompt": "item number. question text",
      "options": ["option 1", "option 2"]
    }
  ]
}
```

## Rules
1. Screener items are numbered SQ1, SQ2, ... and main items A1, A2, ...
2. Remove numbering from options: "1) Yes" becomes "Yes"
3. Survey termination conditions go in console_logic
4. Exclude struck-through questions
5. Output valid JSON only (watch quotes and commas)
6. Replace double quotes inside strings with single quotes
7. When a question repeats for several categories (a loop), write one question per category"#;
