//! Shared domain and API types for Daily English Gym

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Regex pattern for date keys: exactly YYYY-MM-DD
static DATE_KEY_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("Invalid date key regex"));

/// Lexical check only: does the string have the YYYY-MM-DD shape?
pub fn is_date_key_shaped(date: &str) -> bool {
    DATE_KEY_REGEX.is_match(date)
}

/// Validate a date key lexically and as a real calendar date.
pub fn parse_date_key(date: &str) -> Result<NaiveDate> {
    if !is_date_key_shaped(date) {
        return Err(Error::validation(
            "date",
            "Invalid date format (expected YYYY-MM-DD)",
        ));
    }
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| Error::validation("date", "Invalid date format (expected YYYY-MM-DD)"))
}

/// Format a date as a YYYY-MM-DD key
pub fn format_date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// One practice session, as submitted for saving
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    /// YYYY-MM-DD
    pub date: String,
    pub news_title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub news_url: Option<String>,
    pub news_content: String,
    pub level1_text: String,
    pub level2_text: String,
    pub speaking_question: String,
    /// The learner's spoken response, transcribed
    pub spoken: String,
    pub corrected: String,
    pub upgraded: String,
    pub comment: String,
}

/// Per-day summary for the month listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogSummary {
    pub date: String,
    pub session_count: usize,
    pub has_audio: bool,
}

/// Sidecar presence flags for one session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDetail {
    pub session_number: usize,
    pub has_recording: bool,
    pub has_tts: bool,
}

/// Full day-file content plus per-session sidecar flags
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogDetail {
    pub date: String,
    pub content: String,
    pub sessions: Vec<SessionDetail>,
}

/// Consecutive-practice streak
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Streak {
    pub streak_days: u32,
    pub last_learning_date: Option<String>,
}

/// Result of the weekly expression analysis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyAnalysis {
    pub common_expressions: Vec<String>,
    pub areas_for_improvement: Vec<String>,
    pub advice: String,
}

/// Weekly summary over the current Monday-to-Sunday window
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklySummary {
    pub week_start: String,
    pub week_end: String,
    pub learning_days: usize,
    pub topics: Vec<String>,
    pub analysis: Option<WeeklyAnalysis>,
}

/// Speaking feedback for one response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    pub spoken: String,
    pub corrected: String,
    pub upgraded: String,
    pub comment: String,
}

/// Two simplified reading levels generated from an article
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedLevels {
    pub level1: String,
    pub level2: String,
}

/// A parsed news article
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedNews {
    pub title: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
}
