//! Weekly summary over the current Monday-to-Sunday window
//!
//! Collects the week's day-files, pulls out topics and spoken responses,
//! and hands the responses to an external analyzer. Zero logged days yields
//! a canned empty-state analysis without calling the analyzer; an analyzer
//! failure yields a canned fallback instead of an error.

use async_trait::async_trait;
use chrono::{Datelike, Duration, Local, NaiveDate};
use tracing::warn;

use dailygym_core::{format_date_key, Result, WeeklyAnalysis, WeeklySummary};
use dailygym_logbook::{entry, LogStore};

/// Errors from an analyzer are opaque here; any failure maps to the canned
/// fallback result.
pub type AnalyzerError = Box<dyn std::error::Error + Send + Sync>;

/// External collaborator that turns a week of spoken responses into
/// expressions, improvement notes, and one advice string.
#[async_trait]
pub trait WeeklyAnalyzer: Send + Sync {
    async fn analyze(
        &self,
        spoken_texts: &[String],
        topics: &[String],
    ) -> std::result::Result<WeeklyAnalysis, AnalyzerError>;
}

/// Monday of the week containing `date`. Sunday belongs to the week that
/// started the previous Monday.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let offset = date.weekday().number_from_monday() as i64 - 1;
    date - Duration::days(offset)
}

/// Sunday of the week containing `date`
pub fn week_end(date: NaiveDate) -> NaiveDate {
    week_start(date) + Duration::days(6)
}

/// Canned analysis for a week with nothing logged yet
pub fn empty_week_analysis() -> WeeklyAnalysis {
    WeeklyAnalysis {
        common_expressions: Vec::new(),
        areas_for_improvement: Vec::new(),
        advice: "今週はまだ学習がありません。ぜひ学習を始めてみましょう！".to_string(),
    }
}

/// Canned analysis when the external analyzer fails
pub fn failed_week_analysis() -> WeeklyAnalysis {
    WeeklyAnalysis {
        common_expressions: Vec::new(),
        areas_for_improvement: Vec::new(),
        advice: "分析中にエラーが発生しました。来週もがんばりましょう！".to_string(),
    }
}

/// Summarize the week containing `today`
pub async fn weekly_summary(
    store: &LogStore,
    analyzer: &dyn WeeklyAnalyzer,
    today: NaiveDate,
) -> Result<WeeklySummary> {
    let start = week_start(today);
    let end = week_end(today);

    let mut contents: Vec<String> = Vec::new();
    let mut day = start;
    while day <= end {
        let key = format_date_key(day);
        if store.has_log(&key).await {
            contents.push(store.read_day(&key).await?);
        }
        let Some(next) = day.succ_opt() else { break };
        day = next;
    }

    let learning_days = contents.len();
    let topics = entry::extract_topics(contents.iter().map(String::as_str));

    let analysis = if learning_days == 0 {
        empty_week_analysis()
    } else {
        let spoken_texts: Vec<String> = contents
            .iter()
            .flat_map(|content| entry::extract_spoken_texts(content))
            .collect();
        if spoken_texts.is_empty() {
            empty_week_analysis()
        } else {
            match analyzer.analyze(&spoken_texts, &topics).await {
                Ok(analysis) => analysis,
                Err(e) => {
                    warn!("Weekly analysis failed: {e}");
                    failed_week_analysis()
                }
            }
        }
    };

    Ok(WeeklySummary {
        week_start: format_date_key(start),
        week_end: format_date_key(end),
        learning_days,
        topics,
        analysis: Some(analysis),
    })
}

/// Weekly summary for the local wall-clock date
pub async fn weekly_summary_today(
    store: &LogStore,
    analyzer: &dyn WeeklyAnalyzer,
) -> Result<WeeklySummary> {
    weekly_summary(store, analyzer, Local::now().date_naive()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use dailygym_core::SessionRecord;
    use dailygym_storage::LogRoot;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    fn store() -> (TempDir, LogStore) {
        let dir = TempDir::new().unwrap();
        let root = LogRoot::new(dir.path().join("logs"));
        (dir, LogStore::new(root))
    }

    fn record(date: &str, title: &str, spoken: &str) -> SessionRecord {
        SessionRecord {
            date: date.to_string(),
            news_title: title.to_string(),
            news_url: None,
            news_content: "Content".to_string(),
            level1_text: "Easy".to_string(),
            level2_text: "Speakable".to_string(),
            speaking_question: "Why?".to_string(),
            spoken: spoken.to_string(),
            corrected: "c".to_string(),
            upgraded: "u".to_string(),
            comment: "ok".to_string(),
        }
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    /// Records calls; returns a fixed analysis or fails
    #[derive(Default)]
    struct MockAnalyzer {
        calls: AtomicUsize,
        inputs: Mutex<Vec<(Vec<String>, Vec<String>)>>,
        should_fail: bool,
    }

    impl MockAnalyzer {
        fn failing() -> Self {
            Self {
                should_fail: true,
                ..Default::default()
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl WeeklyAnalyzer for MockAnalyzer {
        async fn analyze(
            &self,
            spoken_texts: &[String],
            topics: &[String],
        ) -> std::result::Result<WeeklyAnalysis, AnalyzerError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inputs
                .lock()
                .push((spoken_texts.to_vec(), topics.to_vec()));
            if self.should_fail {
                return Err("mock failure".into());
            }
            Ok(WeeklyAnalysis {
                common_expressions: vec!["for example".to_string()],
                areas_for_improvement: vec!["articles".to_string()],
                advice: "keep going".to_string(),
            })
        }
    }

    #[test]
    fn test_week_start_monday_based() {
        // 2026-01-07 is a Wednesday
        assert_eq!(week_start(date("2026-01-07")), date("2026-01-05"));
        assert_eq!(week_end(date("2026-01-07")), date("2026-01-11"));
        // Monday maps to itself
        assert_eq!(week_start(date("2026-01-05")), date("2026-01-05"));
    }

    #[test]
    fn test_sunday_belongs_to_previous_monday() {
        // 2026-01-11 is a Sunday; its week started 2026-01-05
        assert_eq!(week_start(date("2026-01-11")), date("2026-01-05"));
        assert_eq!(week_end(date("2026-01-11")), date("2026-01-11"));
    }

    #[tokio::test]
    async fn test_empty_week_skips_analyzer() {
        let (_dir, store) = store();
        let analyzer = MockAnalyzer::default();

        let summary = weekly_summary(&store, &analyzer, date("2026-01-07"))
            .await
            .unwrap();

        assert_eq!(summary.learning_days, 0);
        assert!(summary.topics.is_empty());
        assert_eq!(summary.analysis, Some(empty_week_analysis()));
        assert_eq!(analyzer.call_count(), 0);
    }

    #[tokio::test]
    async fn test_week_with_logs_delegates_verbatim() {
        let (_dir, store) = store();
        store
            .save(&record("2026-01-05", "AI chips", "I think chips matter."))
            .await
            .unwrap();
        store
            .save(&record("2026-01-06", "Rust release", "Rust is growing."))
            .await
            .unwrap();
        // Outside the window, must be ignored
        store
            .save(&record("2026-01-04", "Old news", "Old response."))
            .await
            .unwrap();

        let analyzer = MockAnalyzer::default();
        let summary = weekly_summary(&store, &analyzer, date("2026-01-07"))
            .await
            .unwrap();

        assert_eq!(summary.week_start, "2026-01-05");
        assert_eq!(summary.week_end, "2026-01-11");
        assert_eq!(summary.learning_days, 2);
        assert_eq!(summary.topics, vec!["AI chips", "Rust release"]);
        assert_eq!(analyzer.call_count(), 1);

        let inputs = analyzer.inputs.lock();
        let (spoken, topics) = &inputs[0];
        assert_eq!(
            spoken,
            &vec![
                "I think chips matter.".to_string(),
                "Rust is growing.".to_string()
            ]
        );
        assert_eq!(topics.len(), 2);

        let analysis = summary.analysis.unwrap();
        assert_eq!(analysis.advice, "keep going");
    }

    #[tokio::test]
    async fn test_analyzer_failure_yields_canned_fallback() {
        let (_dir, store) = store();
        store
            .save(&record("2026-01-05", "AI chips", "I think chips matter."))
            .await
            .unwrap();

        let analyzer = MockAnalyzer::failing();
        let summary = weekly_summary(&store, &analyzer, date("2026-01-07"))
            .await
            .unwrap();

        assert_eq!(summary.learning_days, 1);
        assert_eq!(summary.analysis, Some(failed_week_analysis()));
        assert_eq!(analyzer.call_count(), 1);
    }
}
