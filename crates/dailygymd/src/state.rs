//! Shared application state
//!
//! Every collaborator is built once here and handed to the router. Handlers
//! never construct clients themselves.

use std::sync::Arc;

use dailygym_ai::{OpenAiClient, OpenAiWeeklyAnalyzer, RetryConfig};
use dailygym_core::Config;
use dailygym_logbook::LogStore;
use dailygym_storage::LogRoot;
use dailygym_summary::WeeklyAnalyzer;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<LogStore>,
    pub ai: Arc<OpenAiClient>,
    pub analyzer: Arc<dyn WeeklyAnalyzer>,
    pub retry: RetryConfig,
    /// Plain HTTP client for article fetches, separate from the OpenAI client
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        let store = Arc::new(LogStore::new(LogRoot::new(config.logs_root.clone())));
        let ai = Arc::new(OpenAiClient::new(&config.openai));
        let retry = RetryConfig::default();
        let analyzer: Arc<dyn WeeklyAnalyzer> =
            Arc::new(OpenAiWeeklyAnalyzer::new(ai.clone(), retry));

        Self {
            store,
            ai,
            analyzer,
            retry,
            http: reqwest::Client::new(),
        }
    }
}
