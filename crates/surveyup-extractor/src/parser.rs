//! Parse LLM output into question candidates
//!
//! Oracle output is free text that should hold one JSON object, but may be
//! wrapped in a code fence, surrounded by prose, or cut off by the output
//! token limit. Decoding walks a fallback chain and stops at the first
//! attempt that succeeds:
//!
//! 1. decode the fenced (or raw) text as-is
//! 2. decode the span from the first `{` to the last `}`
//! 3. strip a trailing comma and append the missing `]` then `}` by count
//! 4. cut back to the last complete array element (or, without one, keep
//!    the text as is) and close what is still open, in nesting order

use crate::error::ExtractorError;
use crate::types::QuestionCandidate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::{debug, warn};

static FENCED_JSON: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```json\s*([\s\S]*?)\s*```").unwrap());

/// Decode the oracle's raw output into a JSON value
pub fn parse_response(raw: &str) -> Result<Value, ExtractorError> {
    let extracted = extract_json(raw);
    let text = extracted.trim();

    if let Ok(value) = serde_json::from_str(text) {
        return Ok(value);
    }

    if let Some(span) = brace_span(text) {
        if let Ok(value) = serde_json::from_str(span) {
            debug!("Recovered JSON object from surrounding text");
            return Ok(value);
        }
    }

    let base = text.find('{').map_or(text, |start| &text[start..]);

    let counted = close_by_count(base);
    let count_error = match serde_json::from_str(&counted) {
        Ok(value) => {
            debug!("Recovered truncated JSON by appending closers");
            return Ok(value);
        }
        Err(e) => e,
    };

    if let Some(repaired) = close_by_structure(base) {
        if let Ok(value) = serde_json::from_str(&repaired) {
            debug!("Recovered truncated JSON by dropping the incomplete tail");
            return Ok(value);
        }
    }

    Err(count_error.into())
}

/// Parse LLM output into question candidates
///
/// A record without a question list, or with an empty or null one, yields
/// zero candidates rather than an error.
pub(crate) fn parse_llm_response(raw: &str) -> Result<Vec<QuestionCandidate>, ExtractorError> {
    let json = parse_response(raw)?;

    let items: &[Value] = match &json {
        Value::Object(map) => match map.get("questions") {
            Some(Value::Array(items)) => items,
            _ => &[],
        },
        Value::Array(items) => items,
        _ => &[],
    };

    let mut candidates = Vec::with_capacity(items.len());
    for (idx, item) in items.iter().enumerate() {
        if !item.is_object() {
            warn!("Skipping question {}: not an object", idx);
            continue;
        }
        match serde_json::from_value::<QuestionCandidate>(item.clone()) {
            Ok(candidate) if candidate.is_empty() => {
                warn!("Skipping question {}: no item number or text", idx);
            }
            Ok(candidate) => candidates.push(candidate),
            Err(e) => warn!("Failed to parse question {}: {}", idx, e),
        }
    }

    Ok(candidates)
}

/// Pull the JSON text out of a fenced code block if there is one
fn extract_json(response: &str) -> &str {
    if let Some(captures) = FENCED_JSON.captures(response) {
        if let Some(body) = captures.get(1) {
            return body.as_str();
        }
    }

    if response.contains("```") {
        // Unclosed or untagged fence: take what follows the first marker
        let body = response.split("```").nth(1).unwrap_or(response);
        return body.strip_prefix("json").unwrap_or(body);
    }

    response
}

/// Greedy span from the first `{` to the last `}`
fn brace_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}

/// Close unmatched brackets, then braces, by raw count
fn close_by_count(text: &str) -> String {
    let trimmed = text.trim_end().trim_end_matches(',').trim_end();

    let count = |c: char| trimmed.matches(c).count();
    let open_braces = count('{').saturating_sub(count('}'));
    let open_brackets = count('[').saturating_sub(count(']'));

    let mut closed = String::with_capacity(trimmed.len() + open_braces + open_brackets);
    closed.push_str(trimmed);
    closed.extend(std::iter::repeat(']').take(open_brackets));
    closed.extend(std::iter::repeat('}').take(open_braces));
    closed
}

/// Truncate to the last element that closed inside an array and close the rest
///
/// Without any complete element the open containers are closed where the
/// text stops. Returns `None` when nothing is left open or the text ends
/// inside a string.
fn close_by_structure(text: &str) -> Option<String> {
    let mut stack: Vec<char> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;
    let mut checkpoint: Option<(usize, Vec<char>)> = None;

    for (idx, c) in text.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            '{' => stack.push('}'),
            '[' => stack.push(']'),
            '}' | ']' => {
                if stack.pop() != Some(c) {
                    return None;
                }
                if stack.last() == Some(&']') {
                    checkpoint = Some((idx + c.len_utf8(), stack.clone()));
                }
            }
            _ => {}
        }
    }

    if stack.is_empty() && !in_string {
        return None;
    }

    let (end, open) = match checkpoint {
        Some(checkpoint) => checkpoint,
        None if in_string => return None,
        None => {
            let end = text.trim_end().trim_end_matches(',').trim_end().len();
            (end, stack)
        }
    };
    let mut repaired = String::with_capacity(end + open.len());
    repaired.push_str(&text[..end]);
    repaired.extend(open.iter().rev());
    Some(repaired)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const TWO_QUESTIONS: &str = r#"{"questions": [
        {"item_id": "SQ1", "prompt": "SQ1. Gender", "options": ["Male", "Female"]},
        {"item_id": "SQ2", "prompt": "SQ2. Age", "options": ["20s", "30s"]}
    ]}"#;

    #[test]
    fn test_well_formed_json_round_trips() {
        let value = parse_response(TWO_QUESTIONS).unwrap();
        let expected: Value = serde_json::from_str(TWO_QUESTIONS).unwrap();
        assert_eq!(value, expected);
    }

    #[test]
    fn test_parse_json_with_markdown_wrapper() {
        let response = format!("Here is the result:\n```json\n{}\n```\nDone.", TWO_QUESTIONS);
        let candidates = parse_llm_response(&response).unwrap();
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].item_id.as_deref(), Some("SQ1"));
    }

    #[test]
    fn test_parse_untagged_fence() {
        let response = "```\n{\"questions\": [{\"item_id\": \"A1\"}]}\n```";
        let candidates = parse_llm_response(response).unwrap();
        assert_eq!(candidates.len(), 1);
    }

    #[test]
    fn test_parse_with_surrounding_prose() {
        let response = format!("Sure! {} Let me know if you need more.", TWO_QUESTIONS);
        let candidates = parse_llm_response(&response).unwrap();
        assert_eq!(candidates.len(), 2);
    }

    #[test]
    fn test_truncation_repaired_by_count() {
        let truncated = r#"{"questions": [{"item_id": "A1", "prompt": "A1. Q"}, {"item_id": "A2", "prompt": "A2. Q"},"#;
        let value = parse_response(truncated).unwrap();
        assert_eq!(value["questions"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_truncation_inside_record_keeps_complete_ones() {
        let truncated = r#"{"questions": [{"item_id": "A1", "prompt": "A1. Q"}, {"item_id": "A2", "prompt": "A2. Which {brand"#;
        let candidates = parse_llm_response(truncated).unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].item_id.as_deref(), Some("A1"));
    }

    #[test]
    fn test_truncation_inside_unclosed_fence() {
        let truncated = "```json\n{\"questions\": [{\"item_id\": \"A1\", \"options\": [\"x\", \"y\"]}, {\"item_id\": \"A2\", \"opt";
        let candidates = parse_llm_response(truncated).unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].options, vec!["x", "y"]);
    }

    #[test]
    fn test_parse_invalid_json() {
        let result = parse_llm_response("This is not JSON");
        assert!(matches!(result, Err(ExtractorError::Parse(_))));
    }

    #[test]
    fn test_parse_error_message_is_bounded() {
        let garbage = format!("{{{}", "x".repeat(1_000));
        match parse_response(&garbage) {
            Err(ExtractorError::Parse(msg)) => assert!(msg.chars().count() <= 100),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_question_list() {
        assert!(parse_llm_response(r#"{"questions": []}"#).unwrap().is_empty());
        assert!(parse_llm_response(r#"{"questions": null}"#).unwrap().is_empty());
        assert!(parse_llm_response(r#"{"survey": "none"}"#).unwrap().is_empty());
    }

    #[test]
    fn test_null_and_empty_entries_are_skipped() {
        let response = r#"{"questions": [null, {}, {"item_id": "A1"}, "text", {"prompt": "A2. Q"}]}"#;
        let candidates = parse_llm_response(response).unwrap();
        assert_eq!(candidates.len(), 2);
    }

    #[test]
    fn test_top_level_array_is_accepted() {
        let candidates = parse_llm_response(r#"[{"item_id": "A1"}]"#).unwrap();
        assert_eq!(candidates.len(), 1);
    }

    #[test]
    fn test_close_by_count_order() {
        assert_eq!(close_by_count(r#"{"a": [1, 2,"#), r#"{"a": [1, 2]}"#);
        assert_eq!(close_by_count("{}"), "{}");
    }

    #[test]
    fn test_close_by_structure_ignores_brackets_in_strings() {
        let text = r#"{"q": [{"p": "a ] } b"}, {"p": "tr"#;
        let repaired = close_by_structure(text).unwrap();
        let value: Value = serde_json::from_str(&repaired).unwrap();
        assert_eq!(value, json!({"q": [{"p": "a ] } b"}]}));
    }

    #[test]
    fn test_close_by_structure_gives_up_inside_a_string() {
        assert_eq!(close_by_structure(r#"{"q": [{"p": "tr"#), None);
        assert_eq!(close_by_structure(r#"{"q": []}"#), None);
    }

    #[test]
    fn test_close_by_structure_without_complete_element() {
        assert_eq!(
            close_by_structure(r#"{"q": [{"o": ["a", "b","#).as_deref(),
            Some(r#"{"q": [{"o": ["a", "b"]}]}"#)
        );
    }

    #[test]
    fn test_truncation_inside_first_record_options() {
        let truncated = r#"{"questions": [{"item_id": "A1", "options": ["a", "b""#;
        let candidates = parse_llm_response(truncated).unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].item_id.as_deref(), Some("A1"));
        assert_eq!(candidates[0].options, vec!["a", "b"]);
    }

    #[test]
    fn test_extract_json_from_plain_json() {
        let json = r#"{"key": "value"}"#;
        assert_eq!(extract_json(json), json);
    }

    #[test]
    fn test_extract_json_from_markdown() {
        let response = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(extract_json(response), r#"{"key": "value"}"#);
    }
}
