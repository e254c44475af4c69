// src/services/stats.rs

//! Statistics enrichment service.
//!
//! Looks up statistics and snippet fields for batches of up to 50 ids.
//! Quota errors rotate the credential and retry the same batch; transient
//! failures rotate, back off, and retry under a bounded policy. A fixed
//! delay separates batches to stay under provider request-rate ceilings.

use std::collections::HashMap;
use std::time::Duration;

use reqwest::Client;

use crate::error::Result;
use crate::models::api::{parse_count, VideoItem, VideosResponse};
use crate::models::{ApiConfig, CollectionConfig, Config, VideoStats};
use crate::services::keys::KeyRotator;
use crate::utils::http;
use crate::utils::log;

/// Production videos endpoint.
pub const VIDEOS_ENDPOINT: &str = "https://www.googleapis.com/youtube/v3/videos";

/// Provider-imposed ceiling on ids per statistics request.
pub const MAX_BATCH: usize = 50;

/// Bounded retry policy for transient statistics failures.
///
/// Replaces the unbounded retry-on-exception loop the dataset was
/// originally collected with; quota rotations are not counted against
/// attempts since they are bounded by key exhaustion instead.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &CollectionConfig) -> Self {
        Self {
            max_attempts: config.retry_max_attempts,
            backoff: Duration::from_millis(config.retry_backoff_ms),
        }
    }
}

/// Service enriching accepted records with statistics.
pub struct StatsFetcher {
    client: Client,
    endpoint: String,
    api: ApiConfig,
    policy: RetryPolicy,
}

impl StatsFetcher {
    /// Create a fetcher from validated configuration.
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            client: http::create_client(&config.api)?,
            endpoint: VIDEOS_ENDPOINT.to_string(),
            api: config.api.clone(),
            policy: RetryPolicy::from_config(&config.collection),
        })
    }

    /// Override the endpoint URL (used by tests).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Fetch statistics for the given ids, chunked into ≤50 batches.
    ///
    /// Ids missing from the result map keep their default statistics.
    pub async fn fetch(
        &self,
        keys: &mut KeyRotator,
        ids: &[String],
    ) -> Result<HashMap<String, VideoStats>> {
        let mut stats = HashMap::new();

        for batch in ids.chunks(MAX_BATCH) {
            self.fetch_batch(keys, batch, &mut stats).await?;
            tokio::time::sleep(Duration::from_millis(self.api.batch_delay_ms)).await;
        }

        Ok(stats)
    }

    async fn fetch_batch(
        &self,
        keys: &mut KeyRotator,
        batch: &[String],
        stats: &mut HashMap<String, VideoStats>,
    ) -> Result<()> {
        let mut attempts = 0u32;

        loop {
            match self.request(batch, keys.current()).await {
                Ok(response) => {
                    if let Some(error) = response.error {
                        if error.is_quota() {
                            log::warn(&format!("Statistics quota hit: {}", error.message));
                            keys.advance()?;
                            continue;
                        }
                        // Non-quota API error: give up on this batch; the
                        // affected records keep default statistics.
                        log::warn(&format!("Statistics API error: {}", error.message));
                        return Ok(());
                    }

                    for item in response.items {
                        stats.insert(item.id.clone(), Self::derive_stats(item));
                    }
                    return Ok(());
                }
                Err(error) => {
                    attempts += 1;
                    if attempts >= self.policy.max_attempts {
                        return Err(error);
                    }
                    log::warn(&format!(
                        "Statistics request failed (attempt {}/{}): {}",
                        attempts, self.policy.max_attempts, error
                    ));
                    keys.advance()?;
                    tokio::time::sleep(self.policy.backoff).await;
                }
            }
        }
    }

    async fn request(&self, batch: &[String], key: &str) -> Result<VideosResponse> {
        let params: Vec<(&str, String)> = vec![
            ("part", "statistics,snippet".to_string()),
            ("id", batch.join(",")),
            ("key", key.to_string()),
        ];

        let response = self
            .client
            .get(&self.endpoint)
            .query(&params)
            .send()
            .await?
            .json()
            .await?;
        Ok(response)
    }

    /// Derive the enrichment fields for one video.
    ///
    /// A disabled feature is signaled by the absence of its count field,
    /// not by a zero value.
    fn derive_stats(item: VideoItem) -> VideoStats {
        let statistics = item.statistics.unwrap_or_default();
        let snippet = item.snippet.unwrap_or_default();

        VideoStats {
            comments_disabled: statistics.comment_count.is_none(),
            ratings_disabled: statistics.like_count.is_none(),
            view_count: parse_count(statistics.view_count.as_ref()),
            likes: parse_count(statistics.like_count.as_ref()),
            comment_count: parse_count(statistics.comment_count.as_ref()),
            category_id: snippet
                .category_id
                .as_deref()
                .and_then(|c| c.parse().ok())
                .unwrap_or(0),
            tags: snippet.tags.join(", "),
        }
    }
}
