//! Application configuration structures.

use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::utils::log;

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// YouTube Data API settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Collection loop settings
    #[serde(default)]
    pub collection: CollectionConfig,

    /// Keyword and date-window sampling settings
    #[serde(default)]
    pub sampling: SamplingConfig,

    /// File paths
    #[serde(default)]
    pub paths: PathsConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn(&format!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            ));
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.api.keys.is_empty() {
            return Err(AppError::validation("api.keys must not be empty"));
        }
        if self.api.keys.iter().any(|k| k.trim().is_empty()) {
            return Err(AppError::validation("api.keys contains an empty key"));
        }
        if self.api.user_agent.trim().is_empty() {
            return Err(AppError::validation("api.user_agent is empty"));
        }
        if self.api.timeout_secs == 0 {
            return Err(AppError::validation("api.timeout_secs must be > 0"));
        }
        if self.api.page_size == 0 || self.api.page_size > 50 {
            return Err(AppError::validation(
                "api.page_size must be between 1 and 50",
            ));
        }
        if self.collection.target_count == 0 {
            return Err(AppError::validation("collection.target_count must be > 0"));
        }
        if self.collection.save_interval == 0 {
            return Err(AppError::validation("collection.save_interval must be > 0"));
        }
        if self.collection.safety_factor == 0 {
            return Err(AppError::validation("collection.safety_factor must be > 0"));
        }
        if self.collection.retry_max_attempts == 0 {
            return Err(AppError::validation(
                "collection.retry_max_attempts must be > 0",
            ));
        }
        if self.sampling.keywords.is_empty() {
            return Err(AppError::validation("No sampling keywords defined"));
        }
        if self.sampling.window_days == 0 {
            return Err(AppError::validation("sampling.window_days must be > 0"));
        }
        let from = self.sampling.published_from()?;
        let to = self.sampling.published_to()?;
        if (to - from).num_days() <= self.sampling.window_days as i64 {
            return Err(AppError::validation(
                "sampling date bounds must span more than one window",
            ));
        }
        if self.paths.output_file.trim().is_empty() {
            return Err(AppError::validation("paths.output_file is empty"));
        }
        Ok(())
    }
}

/// YouTube Data API client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Pool of API keys rotated on quota exhaustion
    #[serde(default)]
    pub keys: Vec<String>,

    /// Region code for search requests
    #[serde(default = "defaults::region_code")]
    pub region_code: String,

    /// Results per search page (provider ceiling is 50)
    #[serde(default = "defaults::page_size")]
    pub page_size: usize,

    /// videoDuration filter for search requests
    #[serde(default = "defaults::video_duration")]
    pub video_duration: String,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Delay between search pages in milliseconds
    #[serde(default = "defaults::page_delay")]
    pub page_delay_ms: u64,

    /// Delay between statistics batches in milliseconds
    #[serde(default = "defaults::batch_delay")]
    pub batch_delay_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            keys: Vec::new(),
            region_code: defaults::region_code(),
            page_size: defaults::page_size(),
            video_duration: defaults::video_duration(),
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            page_delay_ms: defaults::page_delay(),
            batch_delay_ms: defaults::batch_delay(),
        }
    }
}

/// Collection loop settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionConfig {
    /// Total number of accepted records to collect
    #[serde(default = "defaults::target_count")]
    pub target_count: usize,

    /// Flush the buffer every time this many records accumulate
    #[serde(default = "defaults::save_interval")]
    pub save_interval: usize,

    /// Multiplier on target/page_size bounding the iteration count
    #[serde(default = "defaults::safety_factor")]
    pub safety_factor: usize,

    /// Maximum transient-failure retries per statistics batch
    #[serde(default = "defaults::retry_max_attempts")]
    pub retry_max_attempts: u32,

    /// Fixed backoff between transient-failure retries in milliseconds
    #[serde(default = "defaults::retry_backoff")]
    pub retry_backoff_ms: u64,
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            target_count: defaults::target_count(),
            save_interval: defaults::save_interval(),
            safety_factor: defaults::safety_factor(),
            retry_max_attempts: defaults::retry_max_attempts(),
            retry_backoff_ms: defaults::retry_backoff(),
        }
    }
}

/// Keyword and date-window sampling settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplingConfig {
    /// Keyword vocabulary sampled uniformly per page
    #[serde(default = "defaults::keywords")]
    pub keywords: Vec<String>,

    /// Inclusive start of the historical publish-date bound (YYYY-MM-DD)
    #[serde(default = "defaults::published_from")]
    pub published_from: String,

    /// Inclusive end of the historical publish-date bound (YYYY-MM-DD)
    #[serde(default = "defaults::published_to")]
    pub published_to: String,

    /// Length of each sampled publish-date window in days
    #[serde(default = "defaults::window_days")]
    pub window_days: u32,
}

impl SamplingConfig {
    /// Parsed start bound.
    pub fn published_from(&self) -> Result<NaiveDate> {
        self.published_from.parse().map_err(|e| {
            AppError::validation(format!("sampling.published_from is not a date: {e}"))
        })
    }

    /// Parsed end bound.
    pub fn published_to(&self) -> Result<NaiveDate> {
        self.published_to
            .parse()
            .map_err(|e| AppError::validation(format!("sampling.published_to is not a date: {e}")))
    }
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            keywords: defaults::keywords(),
            published_from: defaults::published_from(),
            published_to: defaults::published_to(),
            window_days: defaults::window_days(),
        }
    }
}

/// File path settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Output CSV for collected non-trending records
    #[serde(default = "defaults::output_file")]
    pub output_file: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            output_file: defaults::output_file(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Minimum console log level
    #[serde(default = "defaults::log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
        }
    }
}

mod defaults {
    // API defaults
    pub fn region_code() -> String {
        "US".into()
    }
    pub fn page_size() -> usize {
        50
    }
    pub fn video_duration() -> String {
        "any".into()
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; tubepulse/0.1)".into()
    }
    pub fn timeout() -> u64 {
        10
    }
    pub fn page_delay() -> u64 {
        250
    }
    pub fn batch_delay() -> u64 {
        150
    }

    // Collection defaults
    pub fn target_count() -> usize {
        100_000
    }
    pub fn save_interval() -> usize {
        1000
    }
    pub fn safety_factor() -> usize {
        2
    }
    pub fn retry_max_attempts() -> u32 {
        5
    }
    pub fn retry_backoff() -> u64 {
        1000
    }

    // Sampling defaults
    pub fn keywords() -> Vec<String> {
        [
            "music",
            "movie",
            "vlog",
            "review",
            "funny",
            "gaming",
            "education",
            "sports",
            "tutorial",
            "travel",
            "science",
            "art",
            "food",
            "comedy",
            "documentary",
            "tech",
            "dance",
            "live",
            "shorts",
            "how to",
            "challenge",
            "reaction",
            "asmr",
            "interview",
            "test",
            "study",
            "ai",
            "robotics",
            "fashion",
            "nature",
        ]
        .into_iter()
        .map(String::from)
        .collect()
    }
    pub fn published_from() -> String {
        "2022-01-01".into()
    }
    pub fn published_to() -> String {
        "2024-12-31".into()
    }
    pub fn window_days() -> u32 {
        30
    }

    // Path defaults
    pub fn output_file() -> String {
        "data/non_trending_videos.csv".into()
    }

    // Logging defaults
    pub fn log_level() -> String {
        "info".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_key() -> Config {
        let mut config = Config::default();
        config.api.keys = vec!["K1".to_string()];
        config
    }

    #[test]
    fn validate_default_config_needs_keys() {
        assert!(Config::default().validate().is_err());
        assert!(config_with_key().validate().is_ok());
    }

    #[test]
    fn validate_rejects_oversized_page() {
        let mut config = config_with_key();
        config.api.page_size = 51;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_save_interval() {
        let mut config = config_with_key();
        config.collection.save_interval = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_window_wider_than_bounds() {
        let mut config = config_with_key();
        config.sampling.published_from = "2024-12-01".into();
        config.sampling.published_to = "2024-12-31".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_bad_date() {
        let mut config = config_with_key();
        config.sampling.published_from = "not-a-date".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn load_or_default_survives_missing_file() {
        let config = Config::load_or_default("definitely/not/here.toml");
        assert_eq!(config.api.page_size, 50);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn default_keywords_are_nonempty() {
        assert!(!Config::default().sampling.keywords.is_empty());
    }
}
