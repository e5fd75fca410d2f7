//! Chunks command implementation.

use crate::cli::ChunksArgs;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use surveyup_convert::{cap_text, text::extract_text, ConvertConfig, ConvertError};
use surveyup_extractor::{ExtractorConfig, SurveyChunker};
use tracing::debug;

/// Execute the chunks command.
///
/// Prints how the document would be split without calling the oracle.
/// Returns the number of chunks.
pub fn execute_chunks(
    args: ChunksArgs,
    extractor: &ExtractorConfig,
    convert: &ConvertConfig,
    formatter: &Formatter,
) -> Result<usize> {
    let config = ExtractorConfig {
        max_chunk_size: args.max_chunk_size.unwrap_or(extractor.max_chunk_size),
        lookback: args.lookback.unwrap_or(extractor.lookback),
    };
    config.validate().map_err(CliError::InvalidInput)?;

    let mut text = extract_text(&args.input)?;
    if text.trim().is_empty() {
        return Err(ConvertError::EmptyExtraction.into());
    }
    if let Some(max_chars) = convert.max_input_chars {
        text = cap_text(text, max_chars);
    }

    let chunks = SurveyChunker::from_config(&config).split(&text);
    debug!(
        "{:?}: {} chunk(s) at max {} chars",
        args.input,
        chunks.len(),
        config.max_chunk_size
    );
    println!("{}", formatter.format_chunks(&chunks)?);
    Ok(chunks.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputFormat;
    use std::fs;
    use tempfile::tempdir;

    fn survey_text() -> String {
        (1..=6)
            .map(|n| format!("Q{}. Question number {} text here\n1) Yes\n2) No\n\n", n, n))
            .collect()
    }

    #[test]
    fn test_override_splits_document() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("survey.txt");
        fs::write(&input, survey_text()).unwrap();

        let formatter = Formatter::new(OutputFormat::Table, false);
        let whole = execute_chunks(
            ChunksArgs {
                input: input.clone(),
                max_chunk_size: None,
                lookback: None,
            },
            &ExtractorConfig::default(),
            &ConvertConfig::default(),
            &formatter,
        )
        .unwrap();
        assert_eq!(whole, 1);

        let split = execute_chunks(
            ChunksArgs {
                input,
                max_chunk_size: Some(100),
                lookback: Some(60),
            },
            &ExtractorConfig::default(),
            &ConvertConfig::default(),
            &formatter,
        )
        .unwrap();
        assert!(split > 1);
    }

    #[test]
    fn test_zero_size_is_invalid() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let err = execute_chunks(
            ChunksArgs {
                input: "survey.txt".into(),
                max_chunk_size: Some(0),
                lookback: None,
            },
            &ExtractorConfig::default(),
            &ConvertConfig::default(),
            &formatter,
        )
        .unwrap_err();
        assert!(matches!(err, CliError::InvalidInput(_)));
    }

    #[test]
    fn test_blank_document() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("blank.txt");
        fs::write(&input, "  \n ").unwrap();

        let formatter = Formatter::new(OutputFormat::Table, false);
        let err = execute_chunks(
            ChunksArgs {
                input,
                max_chunk_size: None,
                lookback: None,
            },
            &ExtractorConfig::default(),
            &ConvertConfig::default(),
            &formatter,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            CliError::Convert(ConvertError::EmptyExtraction)
        ));
    }
}
