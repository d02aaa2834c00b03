//! Configuration file parser for ~/.config/dripfeed/config.toml.
//!
//! Settings come from a TOML file; the two API keys may also arrive via
//! environment variables, which take precedence over the file. Required
//! values are validated here, before any core logic runs.
use chrono_tz::Tz;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable overriding `gemini_api_key`.
const GEMINI_KEY_VAR: &str = "GEMINI_API_KEY";
/// Environment variable overriding `typefully_api_key`.
const TYPEFULLY_KEY_VAR: &str = "TYPEFULLY_API_KEY";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file too large: {0}")]
    TooLarge(String),

    /// A required setting is absent from both the file and the environment.
    #[error("Missing required setting: {0}")]
    Missing(&'static str),
}

/// Pipeline configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified;
/// `feed_url` and the two API keys are then checked by validation.
///
/// Custom Debug impl masks both API keys to prevent secret leakage in logs,
/// error messages, and debug output.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Feed to ingest. Required.
    pub feed_url: String,

    /// Gemini API key. Required; env `GEMINI_API_KEY` takes precedence.
    pub gemini_api_key: String,

    /// Typefully API key. Required; env `TYPEFULLY_API_KEY` takes precedence.
    pub typefully_api_key: String,

    /// IANA timezone the pipeline reasons in (target date, publishing window).
    pub timezone: Tz,

    /// Gemini model identifier.
    pub gemini_model: String,

    /// Retry budget for every network call.
    pub max_attempts: u32,

    /// Build drafts and the run log without publishing.
    pub dry_run: bool,

    /// Directory run logs are written into.
    pub logs_dir: PathBuf,

    /// Upper bound on feed pages walked per run.
    pub max_feed_pages: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            feed_url: String::new(),
            gemini_api_key: String::new(),
            typefully_api_key: String::new(),
            timezone: chrono_tz::Asia::Kolkata,
            gemini_model: "gemini-1.5-pro".to_string(),
            max_attempts: 3,
            dry_run: false,
            logs_dir: PathBuf::from("logs"),
            max_feed_pages: 10,
        }
    }
}

/// Mask API keys in Debug output.
impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("feed_url", &self.feed_url)
            .field("gemini_api_key", &redact(&self.gemini_api_key))
            .field("typefully_api_key", &redact(&self.typefully_api_key))
            .field("timezone", &self.timezone)
            .field("gemini_model", &self.gemini_model)
            .field("max_attempts", &self.max_attempts)
            .field("dry_run", &self.dry_run)
            .field("logs_dir", &self.logs_dir)
            .field("max_feed_pages", &self.max_feed_pages)
            .finish()
    }
}

fn redact(value: &str) -> &'static str {
    if value.is_empty() {
        "<unset>"
    } else {
        "[REDACTED]"
    }
}

impl Settings {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    /// Load configuration from a TOML file plus environment overrides.
    ///
    /// - Missing or empty file → defaults (required fields then fail
    ///   validation unless the environment supplies them)
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → accepted, logged as a warning
    /// - Missing required value after the env overlay → `ConfigError::Missing`
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        // Check file size before reading to avoid slurping a corrupted file.
        let content = match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(
                    path = %path.display(),
                    "No config file found, relying on defaults and environment"
                );
                String::new()
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => match std::fs::read_to_string(path) {
                Ok(c) => c,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    // File deleted between metadata and read
                    String::new()
                }
                Err(e) => return Err(ConfigError::Io(e)),
            },
        };

        let mut settings = Self::from_toml(&content)?;
        settings.apply_env_overrides();
        settings.validate()?;

        tracing::info!(
            path = %path.display(),
            feed = %settings.feed_url,
            timezone = %settings.timezone,
            "Loaded configuration"
        );
        Ok(settings)
    }

    fn from_toml(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        // Parse as a raw table first to flag probable typos.
        if let Ok(raw) = content.parse::<toml::Table>() {
            let known_keys = [
                "feed_url",
                "gemini_api_key",
                "typefully_api_key",
                "timezone",
                "gemini_model",
                "max_attempts",
                "dry_run",
                "logs_dir",
                "max_feed_pages",
            ];
            for key in raw.keys() {
                if !known_keys.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        Ok(toml::from_str(content)?)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var(GEMINI_KEY_VAR) {
            if !key.is_empty() {
                self.gemini_api_key = key;
            }
        }
        if let Ok(key) = std::env::var(TYPEFULLY_KEY_VAR) {
            if !key.is_empty() {
                self.typefully_api_key = key;
            }
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.feed_url.trim().is_empty() {
            return Err(ConfigError::Missing("feed_url"));
        }
        if self.gemini_api_key.is_empty() {
            return Err(ConfigError::Missing("gemini_api_key"));
        }
        if self.typefully_api_key.is_empty() {
            return Err(ConfigError::Missing("typefully_api_key"));
        }
        Ok(())
    }
}
