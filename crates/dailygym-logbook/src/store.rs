//! Log store: save sessions and audio, read details and listings
//!
//! Session numbers are derived from file content alone: the next number is
//! always `count of existing markers + 1`. Saves for the same date key are
//! serialized behind a per-date mutex so concurrent saves cannot observe the
//! same count. Reads take no lock.

use chrono::Local;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

use dailygym_core::{
    parse_date_key, Error, LogDetail, LogSummary, Result, SessionDetail, SessionRecord,
    DAY_FILE_EXT,
};
use dailygym_storage as storage;
use dailygym_storage::{AudioKind, LogRoot};

use crate::entry;

/// Append-only store over the log root
pub struct LogStore {
    root: LogRoot,
    /// One write lock per date key, created on first save for that date
    write_locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl LogStore {
    pub fn new(root: LogRoot) -> Self {
        Self {
            root,
            write_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn root(&self) -> &LogRoot {
        &self.root
    }

    fn lock_for(&self, date: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.write_locks.lock();
        locks
            .entry(date.to_string())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }

    /// Save one practice session, creating the day-file on first use or
    /// appending the next numbered block. Returns the day-file path.
    pub async fn save(&self, record: &SessionRecord) -> Result<PathBuf> {
        let date = parse_date_key(&record.date)?;
        if record.news_title.trim().is_empty() {
            return Err(Error::validation("newsTitle", "News title is required"));
        }
        if record.spoken.trim().is_empty() {
            return Err(Error::validation("spoken", "Spoken text is required"));
        }

        let path = self.root.day_file(&record.date)?;
        let lock = self.lock_for(&record.date);
        let _guard = lock.lock().await;

        let hh_mm = Local::now().format("%H:%M").to_string();

        if storage::exists(&path).await {
            let number = self.count_at(&path).await + 1;
            let block = entry::format_session(record, number, &hh_mm);
            storage::append_text(&path, &block).await?;
            debug!("Appended session {} to {}", number, path.display());
        } else {
            let mut content = entry::date_header(date);
            content.push_str(&entry::format_session(record, 1, &hh_mm));
            storage::write_text(&path, &content).await?;
            debug!("Created day-file {}", path.display());
        }

        Ok(path)
    }

    /// Save an audio sidecar for `(date, session, kind)`. Overwrites if
    /// present; re-saving the same session's audio replaces it.
    pub async fn save_audio(
        &self,
        date: &str,
        session_number: usize,
        data: &[u8],
        kind: AudioKind,
    ) -> Result<PathBuf> {
        parse_date_key(date)?;
        if session_number < 1 {
            return Err(Error::validation(
                "sessionNumber",
                "Session number must be positive",
            ));
        }

        let path = self.root.audio_file(date, session_number, kind)?;
        storage::write_bytes(&path, data).await?;
        Ok(path)
    }

    /// Count sessions for a date. Soft probe: missing or unreadable
    /// day-files count as zero.
    pub async fn session_count(&self, date: &str) -> usize {
        match self.root.day_file(date) {
            Ok(path) => self.count_at(&path).await,
            Err(_) => 0,
        }
    }

    /// The number the next saved session for this date would get
    pub async fn next_session_number(&self, date: &str) -> Result<usize> {
        let path = self.root.day_file(date)?;
        Ok(self.count_at(&path).await + 1)
    }

    async fn count_at(&self, path: &Path) -> usize {
        match storage::read_text(path).await {
            Ok(content) => entry::count_sessions(&content),
            Err(Error::NotFound(_)) => 0,
            Err(e) => {
                warn!("Treating unreadable day-file as empty: {e}");
                0
            }
        }
    }

    /// Whether a day-file exists for this date. Never fails.
    pub async fn has_log(&self, date: &str) -> bool {
        match self.root.day_file(date) {
            Ok(path) => storage::exists(&path).await,
            Err(_) => false,
        }
    }

    /// Full day-file content for a date
    pub async fn read_day(&self, date: &str) -> Result<String> {
        let path = self.root.day_file(date)?;
        storage::read_text(&path).await
    }

    /// Day-file content plus per-session sidecar flags. Fails with
    /// `NotFound` when no file exists for the date.
    pub async fn detail(&self, date: &str) -> Result<LogDetail> {
        parse_date_key(date)?;
        let path = self.root.day_file(date)?;
        if !storage::exists(&path).await {
            return Err(Error::NotFound(path));
        }

        let content = storage::read_text(&path).await?;
        let count = entry::count_sessions(&content);

        let mut sessions = Vec::with_capacity(count);
        for number in 1..=count {
            let recording = self.root.audio_file(date, number, AudioKind::Recording)?;
            let tts = self.root.audio_file(date, number, AudioKind::Tts)?;
            sessions.push(SessionDetail {
                session_number: number,
                has_recording: storage::exists(&recording).await,
                has_tts: storage::exists(&tts).await,
            });
        }

        Ok(LogDetail {
            date: date.to_string(),
            content,
            sessions,
        })
    }

    /// Per-day summaries for a month, newest date first. File names that do
    /// not parse as a valid date are skipped. The audio flag probes only
    /// session 1's recording.
    pub async fn list(&self, year: i32, month: u32) -> Result<Vec<LogSummary>> {
        let month_dir = self.root.month_dir(year, month)?;
        let names = storage::list_files(&month_dir, Some(DAY_FILE_EXT)).await?;

        let mut summaries = Vec::new();
        for name in names {
            let date = name.trim_end_matches(DAY_FILE_EXT);
            if parse_date_key(date).is_err() {
                continue;
            }

            let session_count = self.session_count(date).await;
            let audio_path = self.root.audio_file(date, 1, AudioKind::Recording)?;
            summaries.push(LogSummary {
                date: date.to_string(),
                session_count,
                has_audio: storage::exists(&audio_path).await,
            });
        }

        summaries.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(summaries)
    }

    /// Month bucket names under the root, most recent first
    pub async fn month_dirs(&self) -> Result<Vec<String>> {
        storage::list_month_dirs(&self.root).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store() -> (TempDir, LogStore) {
        let dir = TempDir::new().unwrap();
        let root = LogRoot::new(dir.path().join("logs"));
        (dir, LogStore::new(root))
    }

    fn record(date: &str) -> SessionRecord {
        SessionRecord {
            date: date.to_string(),
            news_title: "Title".to_string(),
            news_url: None,
            news_content: "Content".to_string(),
            level1_text: "Easy".to_string(),
            level2_text: "Speakable".to_string(),
            speaking_question: "Why?".to_string(),
            spoken: "Because.".to_string(),
            corrected: "Because of that.".to_string(),
            upgraded: "Owing to that.".to_string(),
            comment: "ok".to_string(),
        }
    }

    #[tokio::test]
    async fn test_first_save_creates_header_and_block() {
        let (_dir, store) = store();
        let path = store.save(&record("2026-01-05")).await.unwrap();

        let content = storage::read_text(&path).await.unwrap();
        assert!(content.starts_with("# Daily English Gym - Monday, January 5, 2026\n"));
        assert!(content.contains("## Session 1 ("));
        assert!(content.trim_end().ends_with("---"));
        assert_eq!(entry::count_sessions(&content), 1);
    }

    #[tokio::test]
    async fn test_second_save_appends_without_touching_block_one() {
        let (_dir, store) = store();
        let path = store.save(&record("2026-01-05")).await.unwrap();
        let before = storage::read_text(&path).await.unwrap();

        store.save(&record("2026-01-05")).await.unwrap();
        let after = storage::read_text(&path).await.unwrap();

        assert!(after.starts_with(&before));
        assert!(after.contains("## Session 2 ("));
        assert_eq!(entry::count_sessions(&after), 2);
    }

    #[tokio::test]
    async fn test_sequential_saves_number_contiguously() {
        let (_dir, store) = store();
        for _ in 0..4 {
            store.save(&record("2026-01-05")).await.unwrap();
        }
        assert_eq!(store.session_count("2026-01-05").await, 4);
        assert_eq!(store.next_session_number("2026-01-05").await.unwrap(), 5);

        let content = store.read_day("2026-01-05").await.unwrap();
        for n in 1..=4 {
            assert!(content.contains(&format!("## Session {n} (")));
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_concurrent_saves_serialize_per_date() {
        let (_dir, store) = store();
        let store = Arc::new(store);

        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.save(&record("2026-01-05")).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let content = store.read_day("2026-01-05").await.unwrap();
        assert_eq!(entry::count_sessions(&content), 8);
        for n in 1..=8 {
            assert!(
                content.contains(&format!("## Session {n} (")),
                "missing session {n}"
            );
        }
    }

    #[tokio::test]
    async fn test_save_validates_fields() {
        let (_dir, store) = store();

        let mut bad = record("2026-1-5");
        assert_eq!(store.save(&bad).await.unwrap_err().field(), Some("date"));

        bad = record("2026-01-05");
        bad.news_title = "  ".to_string();
        assert_eq!(
            store.save(&bad).await.unwrap_err().field(),
            Some("newsTitle")
        );

        bad = record("2026-01-05");
        bad.spoken = String::new();
        assert_eq!(store.save(&bad).await.unwrap_err().field(), Some("spoken"));
    }

    #[tokio::test]
    async fn test_save_audio_is_idempotent() {
        let (_dir, store) = store();
        let path = store
            .save_audio("2026-01-05", 1, b"first", AudioKind::Recording)
            .await
            .unwrap();
        store
            .save_audio("2026-01-05", 1, b"second", AudioKind::Recording)
            .await
            .unwrap();
        assert_eq!(storage::read_bytes(&path).await.unwrap(), b"second");
    }

    #[tokio::test]
    async fn test_save_audio_rejects_zero_session() {
        let (_dir, store) = store();
        let err = store
            .save_audio("2026-01-05", 0, b"x", AudioKind::Tts)
            .await
            .unwrap_err();
        assert_eq!(err.field(), Some("sessionNumber"));
    }

    #[tokio::test]
    async fn test_detail_missing_date_is_not_found() {
        let (_dir, store) = store();
        let err = store.detail("2026-01-05").await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_detail_reports_sidecar_presence() {
        let (_dir, store) = store();
        store.save(&record("2026-01-05")).await.unwrap();
        store.save(&record("2026-01-05")).await.unwrap();
        store
            .save_audio("2026-01-05", 1, b"webm", AudioKind::Recording)
            .await
            .unwrap();

        let detail = store.detail("2026-01-05").await.unwrap();
        assert_eq!(
            detail.sessions,
            vec![
                SessionDetail {
                    session_number: 1,
                    has_recording: true,
                    has_tts: false,
                },
                SessionDetail {
                    session_number: 2,
                    has_recording: false,
                    has_tts: false,
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_list_sorts_descending_and_flags_audio() {
        let (_dir, store) = store();
        store.save(&record("2026-01-03")).await.unwrap();
        store.save(&record("2026-01-09")).await.unwrap();
        store.save(&record("2026-01-09")).await.unwrap();
        store
            .save_audio("2026-01-03", 1, b"webm", AudioKind::Recording)
            .await
            .unwrap();

        let summaries = store.list(2026, 1).await.unwrap();
        assert_eq!(
            summaries,
            vec![
                LogSummary {
                    date: "2026-01-09".to_string(),
                    session_count: 2,
                    has_audio: false,
                },
                LogSummary {
                    date: "2026-01-03".to_string(),
                    session_count: 1,
                    has_audio: true,
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_list_skips_non_date_files() {
        let (_dir, store) = store();
        store.save(&record("2026-01-05")).await.unwrap();
        let stray = store.root().month_dir(2026, 1).unwrap().join("notes.md");
        storage::write_text(&stray, "scratch").await.unwrap();

        let summaries = store.list(2026, 1).await.unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].date, "2026-01-05");
    }

    #[tokio::test]
    async fn test_list_empty_month() {
        let (_dir, store) = store();
        assert!(store.list(2026, 6).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_month_dirs_descending() {
        let (_dir, store) = store();
        store.save(&record("2025-12-31")).await.unwrap();
        store.save(&record("2026-01-05")).await.unwrap();
        assert_eq!(store.month_dirs().await.unwrap(), vec!["2026-01", "2025-12"]);
    }

    #[tokio::test]
    async fn test_session_count_soft_on_missing() {
        let (_dir, store) = store();
        assert_eq!(store.session_count("2026-01-05").await, 0);
        assert_eq!(store.session_count("not-a-date").await, 0);
    }
}
