//! Configuration types.
//!
//! Everything is environment-driven with sensible defaults, so the bot
//! runs out of the box against a local data directory. Cron expressions
//! are validated here so a typo fails at startup instead of inside the
//! scheduler loop.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;

/// Default feed endpoint (AWS Builder Center content feed).
pub const DEFAULT_FEED_URL: &str = "https://api.builder.aws.com/cs/content/feed";

/// Default base URL article links are built from.
pub const DEFAULT_SITE_BASE_URL: &str = "https://builder.aws.com";

/// Bot configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Directory holding the database, outbox and audit log.
    pub data_dir: PathBuf,
    /// Path to the article database.
    pub db_path: PathBuf,
    /// Path to the durable outbox file (fallback sink).
    pub outbox_path: PathBuf,
    /// Path to the append-only audit log.
    pub audit_log_path: PathBuf,
    /// Directory holding the spam rule files.
    pub rules_dir: PathBuf,
    /// Feed API endpoint.
    pub feed_url: String,
    /// Base URL article links are built from (content id is appended as-is).
    pub site_base_url: String,
    /// Optional local JSON file read instead of calling the feed API.
    pub feed_cache: Option<PathBuf>,
    /// Timeout for outbound HTTP calls.
    pub http_timeout: Duration,
    /// Cron expression for the fetch cycle.
    pub fetch_cron: String,
    /// Cron expression for the publish cycle.
    pub publish_cron: String,
}

impl AppConfig {
    /// Build config from environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let data_dir = PathBuf::from(env_or("FEEDRELAY_DATA_DIR", "./data"));

        let db_path = std::env::var("FEEDRELAY_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_dir.join("feedrelay.db"));

        let outbox_path = std::env::var("FEEDRELAY_OUTBOX_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_dir.join("outbox.jsonl"));

        let audit_log_path = std::env::var("FEEDRELAY_AUDIT_LOG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_dir.join("audit_log.txt"));

        let rules_dir = PathBuf::from(env_or("FEEDRELAY_RULES_DIR", "./config"));

        let feed_url = env_or("FEEDRELAY_FEED_URL", DEFAULT_FEED_URL);
        let site_base_url = env_or("FEEDRELAY_SITE_BASE_URL", DEFAULT_SITE_BASE_URL);
        let feed_cache = std::env::var("FEEDRELAY_FEED_CACHE").ok().map(PathBuf::from);

        let timeout_secs: u64 = std::env::var("FEEDRELAY_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(30);

        // Hourly, at the top of the hour (6-field cron with seconds).
        let fetch_cron = env_or("FEEDRELAY_FETCH_CRON", "0 0 * * * *");
        let publish_cron = env_or("FEEDRELAY_PUBLISH_CRON", "0 0 * * * *");
        validate_cron("FEEDRELAY_FETCH_CRON", &fetch_cron)?;
        validate_cron("FEEDRELAY_PUBLISH_CRON", &publish_cron)?;

        Ok(Self {
            data_dir,
            db_path,
            outbox_path,
            audit_log_path,
            rules_dir,
            feed_url,
            site_base_url,
            feed_cache,
            http_timeout: Duration::from_secs(timeout_secs),
            fetch_cron,
            publish_cron,
        })
    }

    /// Path of the main spam rule file.
    pub fn base_rules_path(&self) -> PathBuf {
        self.rules_dir.join("spam_rules.json")
    }

    /// Path of the optional local spam rule file.
    pub fn local_rules_path(&self) -> PathBuf {
        self.rules_dir.join("spam_rules.local.json")
    }
}

/// Buffer posting credentials.
#[derive(Debug, Clone)]
pub struct BufferConfig {
    pub access_token: SecretString,
    pub profile_id: String,
    /// API base, overridable for tests.
    pub api_base: String,
}

impl BufferConfig {
    /// Build config from environment variables.
    /// Returns `None` if `BUFFER_ACCESS_TOKEN` or `BUFFER_PROFILE_ID` is not
    /// set (sink disabled, the fallback queue takes over).
    pub fn from_env() -> Option<Self> {
        let access_token = non_empty_env("BUFFER_ACCESS_TOKEN")?;
        let profile_id = non_empty_env("BUFFER_PROFILE_ID")?;

        Some(Self {
            access_token: SecretString::from(access_token),
            profile_id,
            api_base: env_or("BUFFER_API_BASE", "https://api.bufferapp.com/1"),
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|s| !s.trim().is_empty())
}

fn validate_cron(key: &str, expr: &str) -> Result<(), ConfigError> {
    cron::Schedule::from_str(expr)
        .map(|_| ())
        .map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })
}
