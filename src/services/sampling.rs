// src/services/sampling.rs

//! Random query sampling for the search stream.
//!
//! Each page request gets an independently sampled keyword and a 30-day
//! publish-date window drawn uniformly from the configured historical
//! bounds. This is sampling, not enumeration: there is no coverage
//! guarantee over the keyword/date space.

use chrono::{Duration, NaiveDate};
use rand::Rng;

use crate::error::{AppError, Result};
use crate::models::SamplingConfig;

/// One sampled (keyword, date window) pair in API request format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryWindow {
    pub query: String,
    pub published_after: String,
    pub published_before: String,
}

/// Samples keywords and publish-date windows.
///
/// The random source is injected so tests can fix the draw sequence.
#[derive(Debug, Clone)]
pub struct QuerySampler {
    keywords: Vec<String>,
    start: NaiveDate,
    window_days: i64,
    max_offset: i64,
}

impl QuerySampler {
    /// Build a sampler from validated configuration.
    pub fn from_config(config: &SamplingConfig) -> Result<Self> {
        if config.keywords.is_empty() {
            return Err(AppError::config("sampling keywords are empty"));
        }
        let start = config.published_from()?;
        let end = config.published_to()?;
        let window_days = i64::from(config.window_days);
        let max_offset = (end - start).num_days() - window_days;
        if max_offset < 0 {
            return Err(AppError::config(
                "sampling window does not fit inside the date bounds",
            ));
        }
        Ok(Self {
            keywords: config.keywords.clone(),
            start,
            window_days,
            max_offset,
        })
    }

    /// Draw a keyword and window uniformly at random.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> QueryWindow {
        let query = self.keywords[rng.random_range(0..self.keywords.len())].clone();

        let offset = rng.random_range(0..=self.max_offset);
        let window_start = self.start + Duration::days(offset);
        let window_end = window_start + Duration::days(self.window_days);

        QueryWindow {
            query,
            published_after: format!("{window_start}T00:00:00Z"),
            published_before: format!("{window_end}T23:59:59Z"),
        }
    }
}
