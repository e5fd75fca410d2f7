//! Core Extractor implementation

use crate::chunking::SurveyChunker;
use crate::config::ExtractorConfig;
use crate::error::ExtractorError;
use crate::parser::parse_llm_response;
use crate::prompt::PromptBuilder;
use crate::types::{
    ChunkFailure, ExtractionMetadata, ExtractionResult, FailureKind, QuestionCandidate,
};
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use surveyup_domain::{console_id, Chunk, LlmProvider, SurveyResult};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// The Extractor turns survey text into numbered question records
///
/// Chunks go to the oracle one at a time. The running console number is
/// owned by a single [`process`](Self::process) call, so one extractor can
/// serve several documents concurrently.
pub struct Extractor<L>
where
    L: LlmProvider,
{
    llm_provider: Arc<L>,
    chunker: SurveyChunker,
    config: ExtractorConfig,
}

impl<L> Extractor<L>
where
    L: LlmProvider,
{
    /// Create a new Extractor
    pub fn new(llm_provider: L, config: ExtractorConfig) -> Self {
        Self::with_shared_provider(Arc::new(llm_provider), config)
    }

    /// Create a new Extractor around a provider that is shared elsewhere
    pub fn with_shared_provider(llm_provider: Arc<L>, config: ExtractorConfig) -> Self {
        Self {
            llm_provider,
            chunker: SurveyChunker::from_config(&config),
            config,
        }
    }

    /// Active configuration
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Name of the model behind the oracle
    pub fn model_name(&self) -> &str {
        self.llm_provider.model_name()
    }

    /// The chunk plan for `text`, without calling the oracle
    pub fn preview_chunks<'a>(&self, text: &'a str) -> Vec<Chunk<'a>> {
        self.chunker.split(text)
    }

    /// Convert a whole document into numbered question records
    ///
    /// A chunk whose oracle call or response decoding fails is skipped and
    /// reported in [`ExtractionResult::failures`]; the console numbering then
    /// continues from the last successful chunk.
    pub async fn process(&self, full_text: &str) -> Result<ExtractionResult, ExtractorError> {
        if full_text.trim().is_empty() {
            return Err(ExtractorError::EmptyExtraction);
        }

        let started = Instant::now();
        let run_id = Uuid::now_v7();
        let chunks = self.chunker.split(full_text);
        let total = chunks.len();

        info!(
            "Starting extraction run {}: {} chars in {} chunk(s)",
            run_id,
            full_text.chars().count(),
            total
        );

        let mut survey = SurveyResult::default();
        let mut failures = Vec::new();
        let mut last_console_number = 0;

        for chunk in &chunks {
            debug!(
                "Processing chunk {}/{} (bytes {}..{})",
                chunk.index + 1,
                total,
                chunk.start_offset,
                chunk.end_offset
            );

            let candidates = match self.process_chunk(chunk, total, last_console_number).await {
                Ok(candidates) => candidates,
                Err(e) if e.is_chunk_local() => {
                    warn!("Skipping chunk {}/{}: {}", chunk.index + 1, total, e);
                    failures.push(chunk_failure(chunk, e));
                    continue;
                }
                Err(e) => return Err(e),
            };

            debug!(
                "Chunk {}/{} yielded {} question(s)",
                chunk.index + 1,
                total,
                candidates.len()
            );

            for candidate in candidates {
                last_console_number += 1;
                survey.push(candidate.into_record(console_id(last_console_number)));
            }
        }

        if survey.is_empty() {
            warn!(
                "Run {} produced no questions ({} of {} chunk(s) failed)",
                run_id,
                failures.len(),
                total
            );
            return Err(ExtractorError::NoQuestionsFound);
        }

        let metadata = ExtractionMetadata {
            run_id,
            timestamp: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or(Duration::from_secs(0))
                .as_secs(),
            model_name: self.model_name().to_string(),
            chunk_count: total,
            chunks_failed: failures.len(),
            questions_total: survey.len(),
            processing_time_ms: started.elapsed().as_millis() as u64,
        };

        info!(
            "Extraction complete: {} question(s), {} failed chunk(s), {} ms",
            metadata.questions_total, metadata.chunks_failed, metadata.processing_time_ms
        );

        Ok(ExtractionResult {
            survey,
            failures,
            metadata,
        })
    }

    /// Dispatch, invoke and parse one chunk
    async fn process_chunk(
        &self,
        chunk: &Chunk<'_>,
        total: usize,
        last_console_number: usize,
    ) -> Result<Vec<QuestionCandidate>, ExtractorError> {
        let builder = PromptBuilder::new(chunk.text);
        let builder = if chunk.is_first() {
            builder
        } else {
            builder.continuation(last_console_number, chunk.index + 1, total)
        };
        let request = builder.build();

        debug!("Prompt length: {} chars", request.prompt.len());

        let response = self
            .llm_provider
            .generate(&request)
            .await
            .map_err(|e| ExtractorError::OracleInvocation(e.to_string()))?;

        debug!("LLM response length: {} chars", response.len());

        parse_llm_response(&response)
    }
}

fn chunk_failure(chunk: &Chunk<'_>, error: ExtractorError) -> ChunkFailure {
    let kind = match error {
        ExtractorError::Parse(_) => FailureKind::Parse,
        _ => FailureKind::Oracle,
    };
    ChunkFailure {
        chunk_index: chunk.index,
        start_offset: chunk.start_offset,
        end_offset: chunk.end_offset,
        kind,
        reason: error.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use surveyup_llm::{MockProvider, MockReply};

    // Three 30-character lines; with these sizes each line is its own chunk
    const THREE_PART_SURVEY: &str = "SQ1. First question text here\nSQ2. Second question text her\nSQ3. Third question text here\n";

    fn three_part_config() -> ExtractorConfig {
        ExtractorConfig {
            max_chunk_size: 35,
            lookback: 35,
        }
    }

    fn questions(ids: &[&str]) -> MockReply {
        let items: Vec<String> = ids
            .iter()
            .map(|id| {
                format!(
                    r#"{{"item_id": "{id}", "console_id": "Q99", "prompt": "{id}. Question", "options": ["Yes", "No"]}}"#
                )
            })
            .collect();
        MockReply::Text(format!(r#"{{"questions": [{}]}}"#, items.join(",")))
    }

    fn console_ids(result: &ExtractionResult) -> Vec<String> {
        result
            .survey
            .iter()
            .map(|q| q.console_id.clone())
            .collect()
    }

    #[test]
    fn test_three_part_fixture_splits_per_line() {
        let extractor = Extractor::new(MockProvider::default(), three_part_config());
        let chunks = extractor.preview_chunks(THREE_PART_SURVEY);
        assert_eq!(chunks.len(), 3);
        assert!(chunks[1].text.starts_with("SQ2."));
        assert!(chunks[2].text.starts_with("SQ3."));
    }

    #[tokio::test]
    async fn test_single_chunk_numbering_overrides_oracle() {
        let llm = MockProvider::scripted(vec![questions(&["SQ1", "SQ2", "A1"])]);
        let extractor = Extractor::new(llm, ExtractorConfig::default());

        let result = extractor.process("SQ1. Gender\n1) M\n2) F").await.unwrap();

        assert_eq!(console_ids(&result), vec!["Q1", "Q2", "Q3"]);
        assert!(result.failures.is_empty());
        assert_eq!(result.metadata.chunk_count, 1);
        assert_eq!(result.metadata.questions_total, 3);
        assert_eq!(result.metadata.model_name, "mock");
    }

    #[tokio::test]
    async fn test_numbering_continues_across_chunks() {
        let llm = MockProvider::scripted(vec![
            questions(&["SQ1", "SQ2"]),
            questions(&["SQ3"]),
            questions(&["A1", "A2"]),
        ]);
        let extractor = Extractor::new(llm, three_part_config());

        let result = extractor.process(THREE_PART_SURVEY).await.unwrap();

        assert_eq!(console_ids(&result), vec!["Q1", "Q2", "Q3", "Q4", "Q5"]);
        let items: Vec<_> = result.survey.iter().map(|q| q.item_id.as_str()).collect();
        assert_eq!(items, vec!["SQ1", "SQ2", "SQ3", "A1", "A2"]);
    }

    #[tokio::test]
    async fn test_failed_chunk_is_skipped() {
        let llm = MockProvider::scripted(vec![
            questions(&["SQ1", "SQ2"]),
            MockReply::Error("connection reset".to_string()),
            questions(&["SQ3"]),
        ]);
        let extractor = Extractor::new(llm.clone(), three_part_config());

        let result = extractor.process(THREE_PART_SURVEY).await.unwrap();

        assert_eq!(console_ids(&result), vec!["Q1", "Q2", "Q3"]);
        assert_eq!(result.failures.len(), 1);
        assert_eq!(result.failures[0].chunk_index, 1);
        assert_eq!(result.failures[0].kind, FailureKind::Oracle);
        assert!(result.failures[0].reason.contains("connection reset"));
        assert_eq!(result.metadata.chunks_failed, 1);

        // The third chunk still continues from the last assigned number
        let requests = llm.requests();
        assert_eq!(requests.len(), 3);
        assert!(requests[2].prompt.contains("ended at console number Q2"));
        assert!(requests[2].prompt.contains("part 3 of 3"));
    }

    #[tokio::test]
    async fn test_unparseable_chunk_is_skipped() {
        let llm = MockProvider::scripted(vec![
            MockReply::Text("I could not find any questions, sorry.".to_string()),
            questions(&["SQ2"]),
            questions(&["SQ3"]),
        ]);
        let extractor = Extractor::new(llm, three_part_config());

        let result = extractor.process(THREE_PART_SURVEY).await.unwrap();

        assert_eq!(console_ids(&result), vec!["Q1", "Q2"]);
        assert_eq!(result.failures[0].chunk_index, 0);
        assert_eq!(result.failures[0].kind, FailureKind::Parse);
    }

    #[tokio::test]
    async fn test_first_chunk_has_no_continuation() {
        let llm = MockProvider::scripted(vec![questions(&["SQ1"])]);
        let extractor = Extractor::new(llm.clone(), three_part_config());

        extractor.process(THREE_PART_SURVEY).await.unwrap();

        let requests = llm.requests();
        assert!(!requests[0].prompt.contains("Continue console numbering"));
        assert!(requests[1].prompt.contains("Continue console numbering from Q2"));
        assert!(requests[1].prompt.contains("part 2 of 3"));
        assert!(requests[1].prompt.contains("SQ2. Second question"));
    }

    #[tokio::test]
    async fn test_empty_text_skips_oracle() {
        let llm = MockProvider::default();
        let extractor = Extractor::new(llm.clone(), ExtractorConfig::default());

        let result = extractor.process("  \n\t ").await;

        assert!(matches!(result, Err(ExtractorError::EmptyExtraction)));
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn test_no_questions_found() {
        let extractor = Extractor::new(MockProvider::default(), three_part_config());
        let result = extractor.process(THREE_PART_SURVEY).await;
        assert!(matches!(result, Err(ExtractorError::NoQuestionsFound)));
    }

    #[tokio::test]
    async fn test_every_chunk_failing_is_no_questions() {
        let llm = MockProvider::new("not json at all");
        let extractor = Extractor::new(llm.clone(), three_part_config());

        let result = extractor.process(THREE_PART_SURVEY).await;

        assert!(matches!(result, Err(ExtractorError::NoQuestionsFound)));
        assert_eq!(llm.call_count(), 3);
    }

    #[tokio::test]
    async fn test_runs_are_independent() {
        let llm = MockProvider::scripted(vec![questions(&["SQ1", "SQ2"]), questions(&["SQ1"])]);
        let extractor = Extractor::new(llm, ExtractorConfig::default());

        let first = extractor.process("SQ1. a\nSQ2. b").await.unwrap();
        let second = extractor.process("SQ1. a").await.unwrap();

        assert_eq!(console_ids(&first), vec!["Q1", "Q2"]);
        assert_eq!(console_ids(&second), vec!["Q1"]);
        assert_ne!(first.metadata.run_id, second.metadata.run_id);
    }
}
