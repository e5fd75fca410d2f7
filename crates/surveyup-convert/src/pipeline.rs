//! Whole-document conversion pipeline

use crate::error::ConvertError;
use crate::format::SourceFormat;
use crate::sheet;
use crate::text::extract_text_as;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use surveyup_domain::LlmProvider;
use surveyup_extractor::{ExtractionResult, Extractor};
use tracing::{info, warn};

/// Notice appended when the input text is cut to `max_input_chars`
pub const TRUNCATION_NOTICE: &str = "[The text is long; only part of it is analyzed]";

/// Settings for the conversion pipeline
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertConfig {
    /// Cut the extracted text to this many characters before analysis
    pub max_input_chars: Option<usize>,
}

impl ConvertConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_input_chars == Some(0) {
            return Err("max_input_chars must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }
}

/// Cut `text` to `max_chars` characters and append the truncation notice
pub fn cap_text(text: String, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => {
            let mut capped = text[..cut].to_string();
            capped.push_str("\n\n");
            capped.push_str(TRUNCATION_NOTICE);
            capped
        }
        None => text,
    }
}

/// Default output path: `<stem>_webup.xlsx` next to the input
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("survey");
    input.with_file_name(format!("{}_webup.xlsx", stem))
}

/// Converts survey documents into upload spreadsheets
pub struct Converter<L>
where
    L: LlmProvider,
{
    extractor: Extractor<L>,
    config: ConvertConfig,
}

impl<L> Converter<L>
where
    L: LlmProvider,
{
    /// Create a new converter
    pub fn new(extractor: Extractor<L>, config: ConvertConfig) -> Self {
        Self { extractor, config }
    }

    /// The underlying extractor
    pub fn extractor(&self) -> &Extractor<L> {
        &self.extractor
    }

    /// Active configuration
    pub fn config(&self) -> &ConvertConfig {
        &self.config
    }

    /// Read the document at `path` and return the text the oracle will see
    ///
    /// The format check happens before the file is touched.
    pub async fn read_document(&self, path: &Path) -> Result<String, ConvertError> {
        let format = SourceFormat::from_path(path)?;

        let owned = path.to_path_buf();
        let text = tokio::task::spawn_blocking(move || extract_text_as(&owned, format))
            .await
            .map_err(|e| ConvertError::Extraction(format!("Task join error: {}", e)))??;

        if text.trim().is_empty() {
            return Err(ConvertError::EmptyExtraction);
        }

        Ok(match self.config.max_input_chars {
            Some(max) if text.chars().count() > max => {
                warn!("Input text exceeds {} chars, analyzing only the beginning", max);
                cap_text(text, max)
            }
            _ => text,
        })
    }

    /// Analyze the document at `path`
    pub async fn convert_file(&self, path: &Path) -> Result<ExtractionResult, ConvertError> {
        info!("Converting {:?}", path);
        let text = self.read_document(path).await?;
        Ok(self.extractor.process(&text).await?)
    }

    /// Analyze the document at `input` and write the spreadsheet to `output`
    ///
    /// Nothing is written unless analysis succeeds.
    pub async fn convert_to_xlsx(
        &self,
        input: &Path,
        output: &Path,
    ) -> Result<ExtractionResult, ConvertError> {
        let result = self.convert_file(input).await?;
        sheet::write_xlsx(&result.survey, output)?;
        info!(
            "Wrote {} question(s) to {:?}",
            result.survey.len(),
            output
        );
        Ok(result)
    }

    /// Analyze the document at `input` and return the spreadsheet bytes
    pub async fn convert_to_bytes(
        &self,
        input: &Path,
    ) -> Result<(ExtractionResult, Vec<u8>), ConvertError> {
        let result = self.convert_file(input).await?;
        let bytes = sheet::to_xlsx_bytes(&result.survey)?;
        Ok((result, bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use surveyup_extractor::ExtractorConfig;
    use surveyup_llm::MockProvider;
    use tempfile::tempdir;

    const ONE_QUESTION: &str =
        r#"{"questions": [{"item_id": "SQ1", "prompt": "SQ1. 성별", "options": ["남", "여"]}]}"#;

    fn converter(llm: MockProvider, config: ConvertConfig) -> Converter<MockProvider> {
        Converter::new(Extractor::new(llm, ExtractorConfig::default()), config)
    }

    #[test]
    fn test_cap_text() {
        assert_eq!(cap_text("짧음".to_string(), 10), "짧음");

        let capped = cap_text("가나다라마".to_string(), 3);
        assert!(capped.starts_with("가나다\n\n"));
        assert!(capped.ends_with(TRUNCATION_NOTICE));
    }

    #[test]
    fn test_default_output_path() {
        assert_eq!(
            default_output_path(Path::new("/data/설문지.docx")),
            PathBuf::from("/data/설문지_webup.xlsx")
        );
    }

    #[test]
    fn test_config_validation() {
        assert!(ConvertConfig::default().validate().is_ok());
        let config = ConvertConfig::from_toml("max_input_chars = 0").unwrap();
        assert!(config.validate().is_err());
    }

    #[tokio::test]
    async fn test_convert_to_xlsx() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("survey.txt");
        let output = dir.path().join("survey_webup.xlsx");
        fs::write(&input, "SQ1. 성별\n1) 남\n2) 여").unwrap();

        let converter = converter(MockProvider::new(ONE_QUESTION), ConvertConfig::default());
        let result = converter.convert_to_xlsx(&input, &output).await.unwrap();

        assert_eq!(result.survey.len(), 1);
        assert!(output.exists());
    }

    #[tokio::test]
    async fn test_unsupported_format_skips_everything() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("survey.hwp");
        fs::write(&input, "SQ1. 성별").unwrap();

        let llm = MockProvider::new(ONE_QUESTION);
        let converter = converter(llm.clone(), ConvertConfig::default());
        let result = converter.convert_file(&input).await;

        assert!(matches!(result, Err(ConvertError::UnsupportedFormat(_))));
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn test_blank_document() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("blank.txt");
        fs::write(&input, " \n\n ").unwrap();

        let llm = MockProvider::new(ONE_QUESTION);
        let converter = converter(llm.clone(), ConvertConfig::default());

        assert!(matches!(
            converter.convert_file(&input).await,
            Err(ConvertError::EmptyExtraction)
        ));
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn test_no_spreadsheet_without_questions() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("survey.txt");
        let output = dir.path().join("out.xlsx");
        fs::write(&input, "Thank you for participating.").unwrap();

        let converter = converter(MockProvider::default(), ConvertConfig::default());
        let result = converter.convert_to_xlsx(&input, &output).await;

        assert!(matches!(result, Err(ConvertError::NoQuestionsFound)));
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn test_input_cap_is_applied() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("long.txt");
        fs::write(&input, "x".repeat(500)).unwrap();

        let llm = MockProvider::new(ONE_QUESTION);
        let config = ConvertConfig {
            max_input_chars: Some(100),
        };
        let converter = converter(llm.clone(), config);
        converter.convert_file(&input).await.unwrap();

        let prompt = &llm.requests()[0].prompt;
        assert!(prompt.contains(TRUNCATION_NOTICE));
        assert!(!prompt.contains(&"x".repeat(101)));
    }
}
