//! Chat-backed weekly analyzer

use std::sync::Arc;

use async_trait::async_trait;

use dailygym_core::WeeklyAnalysis;
use dailygym_summary::{AnalyzerError, WeeklyAnalyzer};

use crate::client::{AiBackend, SamplingOptions};
use crate::error::AiError;
use crate::prompts;
use crate::retry::{with_retry, RetryConfig};

/// Runs the weekly-analysis prompt against the chat API. Failures bubble up
/// as [`AnalyzerError`]; the summary layer substitutes its canned fallback.
pub struct OpenAiWeeklyAnalyzer {
    api: Arc<dyn AiBackend>,
    retry: RetryConfig,
}

impl OpenAiWeeklyAnalyzer {
    pub fn new(api: Arc<dyn AiBackend>, retry: RetryConfig) -> Self {
        Self { api, retry }
    }
}

/// The whole JSON object embedded in a chat response, fences and chatter
/// stripped by slicing from the first `{` to the last `}`.
fn extract_json_object(response: &str) -> Option<&str> {
    let start = response.find('{')?;
    let end = response.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&response[start..=end])
}

#[async_trait]
impl WeeklyAnalyzer for OpenAiWeeklyAnalyzer {
    async fn analyze(
        &self,
        spoken_texts: &[String],
        topics: &[String],
    ) -> Result<WeeklyAnalysis, AnalyzerError> {
        let user = prompts::weekly_analysis_user_prompt(spoken_texts, topics);
        let options = SamplingOptions::temperature(0.5);

        let response = with_retry(&self.retry, || {
            self.api
                .chat_completion(prompts::WEEKLY_ANALYSIS_SYSTEM_PROMPT, &user, &options)
        })
        .await?;

        let json = extract_json_object(&response).ok_or_else(|| {
            AiError::Malformed("No JSON object in weekly analysis response".to_string())
        })?;
        let mut analysis: WeeklyAnalysis = serde_json::from_str(json)
            .map_err(|e| AiError::Malformed(format!("Invalid weekly analysis JSON: {e}")))?;

        analysis.common_expressions.truncate(3);
        analysis.areas_for_improvement.truncate(3);
        Ok(analysis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockBackend;

    fn analyzer(api: Arc<MockBackend>) -> OpenAiWeeklyAnalyzer {
        OpenAiWeeklyAnalyzer::new(
            api,
            RetryConfig {
                max_retries: 1,
                retry_delay: std::time::Duration::from_millis(1),
                rate_limit_delay: std::time::Duration::from_millis(1),
            },
        )
    }

    fn spoken() -> Vec<String> {
        vec!["I think the chip is fast.".to_string()]
    }

    fn topics() -> Vec<String> {
        vec!["AI chips".to_string()]
    }

    #[tokio::test]
    async fn test_parses_json_embedded_in_prose() {
        let api = Arc::new(MockBackend::new());
        api.push_chat_ok(
            "Here is the analysis:\n{\"commonExpressions\": [\"I think\"], \"areasForImprovement\": [\"冠詞\"], \"advice\": \"がんばって\"}\nGood luck!",
        );

        let analysis = analyzer(api.clone())
            .analyze(&spoken(), &topics())
            .await
            .unwrap();

        assert_eq!(analysis.common_expressions, vec!["I think"]);
        assert_eq!(analysis.areas_for_improvement, vec!["冠詞"]);
        assert_eq!(analysis.advice, "がんばって");

        let calls = api.chat_calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].1.contains("AI chips"));
        assert!(calls[0].1.contains("1. I think the chip is fast."));
    }

    #[tokio::test]
    async fn test_lists_are_capped_at_three() {
        let api = Arc::new(MockBackend::new());
        api.push_chat_ok(
            "{\"commonExpressions\": [\"a\", \"b\", \"c\", \"d\"], \"areasForImprovement\": [], \"advice\": \"ok\"}",
        );

        let analysis = analyzer(api).analyze(&spoken(), &topics()).await.unwrap();
        assert_eq!(analysis.common_expressions.len(), 3);
    }

    #[tokio::test]
    async fn test_response_without_json_is_an_error() {
        let api = Arc::new(MockBackend::new());
        api.push_chat_ok("I cannot analyze that.");

        let err = analyzer(api).analyze(&spoken(), &topics()).await.unwrap_err();
        assert!(err.to_string().contains("No JSON object"));
    }

    #[test]
    fn test_extract_json_object_bounds() {
        assert_eq!(extract_json_object("x {\"a\":1} y"), Some("{\"a\":1}"));
        assert_eq!(extract_json_object("no braces"), None);
        assert_eq!(extract_json_object("} reversed {"), None);
    }
}
