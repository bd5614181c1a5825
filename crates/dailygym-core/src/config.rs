//! Configuration for the Daily English Gym server
//!
//! Values come from three layers, lowest priority first:
//! defaults, an optional `dailygym.toml` next to the working directory,
//! then environment variables (a `.env` file is honored via dotenvy).

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::constants::*;
use crate::error::{Error, Result};

/// Config file name searched in the working directory
pub const CONFIG_FILE: &str = "dailygym.toml";

/// OpenAI client configuration
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub base_url: String,
    pub chat_model: String,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub cors_origin: String,
    pub logs_root: PathBuf,
    pub openai: OpenAiConfig,
}

/// Raw shape of dailygym.toml; every key optional
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    port: Option<u16>,
    cors_origin: Option<String>,
    logs_root: Option<PathBuf>,
    openai_base_url: Option<String>,
    openai_chat_model: Option<String>,
}

impl ConfigFile {
    fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::config(format!("Failed to read {}: {}", path.display(), e)))?;
        toml::from_str(&content)
            .map_err(|e| Error::config(format!("Failed to parse {}: {}", path.display(), e)))
    }
}

impl Config {
    /// Load configuration from the working directory and environment.
    ///
    /// `OPENAI_API_KEY` must be set; everything else has a default.
    pub fn load() -> Result<Self> {
        let _ = dotenvy::dotenv();

        let file = if Path::new(CONFIG_FILE).exists() {
            ConfigFile::load(Path::new(CONFIG_FILE))?
        } else {
            ConfigFile::default()
        };

        Self::from_parts(file, |key| std::env::var(key).ok())
    }

    /// Build a config from a parsed file and an env lookup. Split out so
    /// tests can drive it without touching process environment.
    fn from_parts(file: ConfigFile, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_key = env("OPENAI_API_KEY")
            .filter(|k| !k.is_empty())
            .ok_or_else(|| Error::config("OPENAI_API_KEY environment variable is not set"))?;

        let port = match env("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|_| Error::config(format!("Invalid PORT value: {raw}")))?,
            None => file.port.unwrap_or(DEFAULT_PORT),
        };

        let cors_origin = env("CORS_ORIGIN")
            .or(file.cors_origin)
            .unwrap_or_else(|| DEFAULT_CORS_ORIGIN.to_string());

        let logs_root = env("DAILYGYM_LOGS_DIR")
            .map(PathBuf::from)
            .or(file.logs_root)
            .unwrap_or_else(default_logs_root);

        let openai = OpenAiConfig {
            api_key,
            base_url: env("OPENAI_BASE_URL")
                .or(file.openai_base_url)
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
            chat_model: env("OPENAI_CHAT_MODEL")
                .or(file.openai_chat_model)
                .unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string()),
        };

        Ok(Config {
            port,
            cors_origin,
            logs_root,
            openai,
        })
    }
}
