//! Resume analysis pipeline.
//!
//! Flow: extract_text → build_prompt → complete → recover.
//! Each stage fails fast; nothing partial is returned.

use std::sync::Arc;

use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::analysis::models::{AnalysisRequest, AnalysisResult};
use crate::analysis::prompts::build_prompt;
use crate::analysis::recovery::recover;
use crate::errors::AppError;
use crate::extraction::TextExtractor;
use crate::llm_client::CompletionClient;

/// Owns the two external capabilities the pipeline depends on.
#[derive(Clone)]
pub struct Analyzer {
    extractor: Arc<dyn TextExtractor>,
    completer: Arc<dyn CompletionClient>,
}

impl Analyzer {
    pub fn new(extractor: Arc<dyn TextExtractor>, completer: Arc<dyn CompletionClient>) -> Self {
        Self {
            extractor,
            completer,
        }
    }

    pub async fn analyze(&self, request: AnalysisRequest) -> Result<AnalysisResult, AppError> {
        let analysis_id = Uuid::new_v4();
        let span = info_span!("analysis", %analysis_id, target_role = %request.target_role);
        self.run(request).instrument(span).await
    }

    async fn run(&self, request: AnalysisRequest) -> Result<AnalysisResult, AppError> {
        info!(
            target_company = request.target_company.as_deref().unwrap_or("-"),
            years_of_experience = request.years_of_experience,
            document_bytes = request.document.len(),
            "Starting resume analysis"
        );

        let resume_text = self.extractor.extract_text(request.document.clone()).await?;
        info!("Extracted {} characters of resume text", resume_text.len());

        let prompt = build_prompt(&request, &resume_text);
        let completion = self.completer.complete(&prompt).await?;
        info!("Received completion: {} characters", completion.len());

        let recovered = recover(&completion)?;
        info!(tier = %recovered.tier, "Resume analysis complete");
        Ok(recovered.result)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use bytes::Bytes;

    use crate::extraction::ExtractionError;
    use crate::llm_client::LlmError;

    pub(crate) struct FakeExtractor(pub &'static str);

    #[async_trait]
    impl TextExtractor for FakeExtractor {
        async fn extract_text(&self, _document: Bytes) -> Result<String, ExtractionError> {
            if self.0.trim().is_empty() {
                Err(ExtractionError::NoText)
            } else {
                Ok(self.0.to_string())
            }
        }
    }

    /// Returns a canned completion and remembers every prompt it saw.
    pub(crate) struct FakeCompleter {
        reply: Result<&'static str, u16>,
        pub calls: AtomicUsize,
        pub last_prompt: Mutex<Option<String>>,
    }

    impl FakeCompleter {
        pub(crate) fn replying(text: &'static str) -> Self {
            Self {
                reply: Ok(text),
                calls: AtomicUsize::new(0),
                last_prompt: Mutex::new(None),
            }
        }

        pub(crate) fn failing(status: u16) -> Self {
            Self {
                reply: Err(status),
                calls: AtomicUsize::new(0),
                last_prompt: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl CompletionClient for FakeCompleter {
        async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_prompt.lock().unwrap() = Some(prompt.to_string());
            match self.reply {
                Ok(text) => Ok(text.to_string()),
                Err(status) => Err(LlmError::Api {
                    status,
                    message: "upstream said no".to_string(),
                }),
            }
        }
    }

    fn request() -> AnalysisRequest {
        AnalysisRequest {
            document: Bytes::from_static(b"%PDF-1.4"),
            target_role: "Data Scientist".to_string(),
            target_company: Some("Google".to_string()),
            years_of_experience: 4.0,
        }
    }

    const GOOD_COMPLETION: &str =
        r#"{"extracted_fields": {"name": "Jane"}, "questionnaire_prompt": "Good start."}"#;

    #[tokio::test]
    async fn test_pipeline_returns_recovered_result() {
        let completer = Arc::new(FakeCompleter::replying(GOOD_COMPLETION));
        let analyzer = Analyzer::new(Arc::new(FakeExtractor("Jane Doe, Python")), completer.clone());

        let result = analyzer.analyze(request()).await.unwrap();
        assert_eq!(result.extracted_fields["name"], "Jane");

        let prompt = completer.last_prompt.lock().unwrap().clone().unwrap();
        assert!(prompt.contains("Jane Doe, Python"));
        assert!(prompt.contains("Target Company: Google"));
    }

    #[tokio::test]
    async fn test_empty_extraction_never_reaches_completion() {
        let completer = Arc::new(FakeCompleter::replying(GOOD_COMPLETION));
        let analyzer = Analyzer::new(Arc::new(FakeExtractor("   ")), completer.clone());

        let err = analyzer.analyze(request()).await.unwrap_err();
        assert!(matches!(err, AppError::UnreadableDocument(_)));
        assert_eq!(completer.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_upstream_failure_is_reported_once() {
        let completer = Arc::new(FakeCompleter::failing(503));
        let analyzer = Analyzer::new(Arc::new(FakeExtractor("text")), completer.clone());

        let err = analyzer.analyze(request()).await.unwrap_err();
        assert!(matches!(err, AppError::UpstreamUnavailable(_)));
        assert_eq!(completer.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unparseable_completion_is_malformed() {
        let analyzer = Analyzer::new(
            Arc::new(FakeExtractor("text")),
            Arc::new(FakeCompleter::replying("I cannot comply.")),
        );
        let err = analyzer.analyze(request()).await.unwrap_err();
        assert!(matches!(err, AppError::MalformedCompletion));
    }
}
