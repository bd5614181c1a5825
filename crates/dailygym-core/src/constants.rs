//! Constants and default values for Daily English Gym

use std::path::PathBuf;

/// Log root directory name, relative to the process working directory
pub const LOGS_DIR: &str = "logs";

/// Day-file extension
pub const DAY_FILE_EXT: &str = ".md";

/// Recording sidecar extension
pub const RECORDING_EXT: &str = ".webm";

/// Synthesized-speech sidecar suffix (session number goes before it)
pub const TTS_SUFFIX: &str = "-tts.mp3";

/// How far back the streak calculation walks, in days
pub const STREAK_HORIZON_DAYS: u32 = 365;

/// Maximum article length in characters
pub const MAX_ARTICLE_LEN: usize = 10_000;

/// Maximum TTS input length in characters (OpenAI limit)
pub const MAX_TTS_TEXT_LEN: usize = 4096;

/// Maximum audio upload size in bytes (OpenAI transcription limit)
pub const MAX_AUDIO_BYTES: usize = 25 * 1024 * 1024;

/// Default retry attempts for external API calls
pub const DEFAULT_MAX_RETRIES: u32 = 1;

/// Delay before retrying a generic transient API failure
pub const RETRY_DELAY_MS: u64 = 1000;

/// Delay before retrying a rate-limited API call
pub const RATE_LIMIT_DELAY_MS: u64 = 5000;

/// Timeout for fetching an article URL
pub const ARTICLE_FETCH_TIMEOUT_SECS: u64 = 10;

/// Maximum article page size fetched from a URL (1MB)
pub const MAX_ARTICLE_FETCH_BYTES: usize = 1024 * 1024;

/// Default server port
pub const DEFAULT_PORT: u16 = 3000;

/// Default allowed CORS origin (the Vite dev frontend)
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:5173";

/// Default OpenAI API base URL
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Default chat model
pub const DEFAULT_CHAT_MODEL: &str = "gpt-4o-mini";

/// TTS model
pub const TTS_MODEL: &str = "tts-1";

/// Default TTS voice
pub const DEFAULT_TTS_VOICE: &str = "nova";

/// Transcription model
pub const TRANSCRIBE_MODEL: &str = "whisper-1";

/// Get the default log root directory
pub fn default_logs_root() -> PathBuf {
    std::env::current_dir()
        .map(|d| d.join(LOGS_DIR))
        .unwrap_or_else(|_| PathBuf::from(LOGS_DIR))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_logs_root() {
        let root = default_logs_root();
        assert!(root.to_string_lossy().ends_with(LOGS_DIR));
    }

    #[test]
    fn test_sidecar_suffixes_distinct() {
        assert_ne!(DAY_FILE_EXT, RECORDING_EXT);
        assert_ne!(RECORDING_EXT, TTS_SUFFIX);
    }
}
