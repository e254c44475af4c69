// src/services/search.rs

//! Search pagination service.
//!
//! Issues keyword- and date-window-randomized queries against the search
//! endpoint and yields new candidate records. Quota errors rotate the
//! credential and retry the same cursor; any other failure abandons the
//! page so the outer loop resumes with a fresh random query.

use rand::Rng;
use reqwest::Client;

use crate::error::Result;
use crate::models::api::{SearchItem, SearchResponse, VIDEO_KIND};
use crate::models::{ApiConfig, Config, VideoRecord};
use crate::services::dedup::DedupStore;
use crate::services::keys::KeyRotator;
use crate::services::sampling::{QuerySampler, QueryWindow};
use crate::utils::http;
use crate::utils::log;

/// Production search endpoint.
pub const SEARCH_ENDPOINT: &str = "https://www.googleapis.com/youtube/v3/search";

/// Pagination state for the search stream.
///
/// The continuation token is threaded across successive sampled queries,
/// reproducing the accumulated dataset's collection behavior: it updates
/// on every successful page and stays untouched when a page is abandoned.
#[derive(Debug, Clone, Default)]
pub struct CollectionCursor {
    /// Opaque continuation token from the last successful page.
    pub page_token: Option<String>,

    /// Query and window the current page was requested under.
    pub window: Option<QueryWindow>,
}

/// Service fetching candidate records page by page.
pub struct SearchPaginator {
    client: Client,
    endpoint: String,
    api: ApiConfig,
    sampler: QuerySampler,
}

impl SearchPaginator {
    /// Create a paginator from validated configuration.
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            client: http::create_client(&config.api)?,
            endpoint: SEARCH_ENDPOINT.to_string(),
            api: config.api.clone(),
            sampler: QuerySampler::from_config(&config.sampling)?,
        })
    }

    /// Override the endpoint URL (used by tests).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Fetch the next page of candidates.
    ///
    /// Samples a fresh keyword/window, follows the cursor's continuation
    /// token, and inserts every accepted id into the dedup store. Returns
    /// an empty list when the page is abandoned after a non-quota failure;
    /// only credential exhaustion surfaces as an error.
    pub async fn next_page<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        keys: &mut KeyRotator,
        dedup: &mut DedupStore,
        cursor: &mut CollectionCursor,
    ) -> Result<Vec<VideoRecord>> {
        let window = self.sampler.sample(rng);
        cursor.window = Some(window.clone());

        loop {
            let response = match self
                .request(&window, cursor.page_token.as_deref(), keys.current())
                .await
            {
                Ok(response) => response,
                Err(error) => {
                    log::warn(&format!("Search request failed: {error}"));
                    return Ok(Vec::new());
                }
            };

            if let Some(error) = response.error {
                if error.is_quota() {
                    log::warn(&format!("Search quota hit: {}", error.message));
                    // Token stays valid under a different credential.
                    keys.advance()?;
                    continue;
                }
                log::warn(&format!("Search API error: {}", error.message));
                return Ok(Vec::new());
            }

            cursor.page_token = response.next_page_token;
            return Ok(Self::accept_items(response.items, dedup));
        }
    }

    async fn request(
        &self,
        window: &QueryWindow,
        page_token: Option<&str>,
        key: &str,
    ) -> Result<SearchResponse> {
        let mut params: Vec<(&str, String)> = vec![
            ("part", "snippet".to_string()),
            ("type", "video".to_string()),
            ("maxResults", self.api.page_size.to_string()),
            ("regionCode", self.api.region_code.clone()),
            ("q", window.query.clone()),
            ("videoDuration", self.api.video_duration.clone()),
            ("publishedAfter", window.published_after.clone()),
            ("publishedBefore", window.published_before.clone()),
            ("key", key.to_string()),
        ];
        if let Some(token) = page_token {
            params.push(("pageToken", token.to_string()));
        }

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

    /// Convert raw items into records, skipping non-video kinds and
    /// empty or already-seen ids. Skips are dedup misses, not errors.
    fn accept_items(items: Vec<SearchItem>, dedup: &mut DedupStore) -> Vec<VideoRecord> {
        let mut records = Vec::new();

        for item in items {
            if item.id.kind != VIDEO_KIND {
                continue;
            }
            let Some(video_id) = item.id.video_id else {
                continue;
            };
            if video_id.is_empty() || dedup.contains(&video_id) {
                continue;
            }
            dedup.insert(video_id.clone());

            let snippet = item.snippet;
            records.push(VideoRecord {
                video_id,
                title: snippet.title,
                published_at: snippet.published_at,
                channel_id: snippet.channel_id,
                channel_title: snippet.channel_title,
                description: snippet.description,
                thumbnail_url: snippet
                    .thumbnails
                    .default_size
                    .map(|t| t.url)
                    .unwrap_or_default(),
                is_trending: false,
                view_count: 0,
                likes: 0,
                comment_count: 0,
                category_id: 0,
                tags: String::new(),
                comments_disabled: false,
                ratings_disabled: false,
            });
        }

        records
    }
}

#[cfg(test)]
mod tests {
    use mockito::Matcher;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    fn test_config(keys: &[&str]) -> Config {
        let mut config = Config::default();
        config.api.keys = keys.iter().map(|k| k.to_string()).collect();
        config.api.page_size = 5;
        config
    }

    fn paginator(config: &Config, url: &str) -> SearchPaginator {
        SearchPaginator::new(config).unwrap().with_endpoint(url)
    }

    const PAGE_BODY: &str = r#"{
        "nextPageToken": "TOK1",
        "items": [
            {"id": {"kind": "youtube#video", "videoId": "vid1"},
             "snippet": {"title": "One", "publishedAt": "2023-01-01T00:00:00Z",
                         "channelId": "c1", "channelTitle": "C1",
                         "description": "d",
                         "thumbnails": {"default": {"url": "u1"}}}},
            {"id": {"kind": "youtube#channel"},
             "snippet": {"title": "Not a video"}},
            {"id": {"kind": "youtube#video", "videoId": "vid1"},
             "snippet": {"title": "Duplicate"}}
        ]
    }"#;

    #[tokio::test]
    async fn test_next_page_accepts_and_dedups() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/search")
            .match_query(Matcher::Any)
            .with_body(PAGE_BODY)
            .create_async()
            .await;

        let config = test_config(&["K1"]);
        let paginator = paginator(&config, &format!("{}/search", server.url()));
        let mut keys = KeyRotator::new(config.api.keys.clone()).unwrap();
        let mut dedup = DedupStore::new();
        let mut cursor = CollectionCursor::default();
        let mut rng = StdRng::seed_from_u64(1);

        let records = paginator
            .next_page(&mut rng, &mut keys, &mut dedup, &mut cursor)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].video_id, "vid1");
        assert!(!records[0].is_trending);
        assert_eq!(records[0].thumbnail_url, "u1");
        assert_eq!(cursor.page_token.as_deref(), Some("TOK1"));
        assert_eq!(dedup.len(), 1);
    }

    #[tokio::test]
    async fn test_seeded_dedup_rejects_known_ids() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/search")
            .match_query(Matcher::Any)
            .with_body(PAGE_BODY)
            .create_async()
            .await;

        let config = test_config(&["K1"]);
        let paginator = paginator(&config, &format!("{}/search", server.url()));
        let mut keys = KeyRotator::new(config.api.keys.clone()).unwrap();
        let mut dedup = DedupStore::new();
        dedup.seed(["vid1".to_string()]);
        let mut cursor = CollectionCursor::default();
        let mut rng = StdRng::seed_from_u64(1);

        let records = paginator
            .next_page(&mut rng, &mut keys, &mut dedup, &mut cursor)
            .await
            .unwrap();

        assert!(records.is_empty());
        assert_eq!(dedup.len(), 1);
    }

    #[tokio::test]
    async fn test_quota_error_rotates_and_retries_same_cursor() {
        let mut server = mockito::Server::new_async().await;
        let quota = server
            .mock("GET", "/search")
            .match_query(Matcher::UrlEncoded("key".into(), "K1".into()))
            .with_body(r#"{"error": {"message": "Quota exceeded."}}"#)
            .create_async()
            .await;
        let ok = server
            .mock("GET", "/search")
            .match_query(Matcher::UrlEncoded("key".into(), "K2".into()))
            .with_body(PAGE_BODY)
            .create_async()
            .await;

        let config = test_config(&["K1", "K2"]);
        let paginator = paginator(&config, &format!("{}/search", server.url()));
        let mut keys = KeyRotator::new(config.api.keys.clone()).unwrap();
        let mut dedup = DedupStore::new();
        let mut cursor = CollectionCursor::default();
        let mut rng = StdRng::seed_from_u64(1);

        let records = paginator
            .next_page(&mut rng, &mut keys, &mut dedup, &mut cursor)
            .await
            .unwrap();

        quota.assert_async().await;
        ok.assert_async().await;
        assert_eq!(records.len(), 1);
        assert_eq!(keys.current(), "K2");
    }

    #[tokio::test]
    async fn test_quota_on_last_key_is_fatal() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/search")
            .match_query(Matcher::Any)
            .with_body(r#"{"error": {"message": "quota exceeded"}}"#)
            .create_async()
            .await;

        let config = test_config(&["K1"]);
        let paginator = paginator(&config, &format!("{}/search", server.url()));
        let mut keys = KeyRotator::new(config.api.keys.clone()).unwrap();
        let mut dedup = DedupStore::new();
        let mut cursor = CollectionCursor::default();
        let mut rng = StdRng::seed_from_u64(1);

        let err = paginator
            .next_page(&mut rng, &mut keys, &mut dedup, &mut cursor)
            .await
            .unwrap_err();
        assert!(err.is_quota_exhausted());
    }

    #[tokio::test]
    async fn test_non_quota_error_abandons_page() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/search")
            .match_query(Matcher::Any)
            .with_body(r#"{"error": {"message": "Backend Error"}}"#)
            .create_async()
            .await;

        let config = test_config(&["K1"]);
        let paginator = paginator(&config, &format!("{}/search", server.url()));
        let mut keys = KeyRotator::new(config.api.keys.clone()).unwrap();
        let mut dedup = DedupStore::new();
        let mut cursor = CollectionCursor {
            page_token: Some("STALE".to_string()),
            window: None,
        };
        let mut rng = StdRng::seed_from_u64(1);

        let records = paginator
            .next_page(&mut rng, &mut keys, &mut dedup, &mut cursor)
            .await
            .unwrap();

        assert!(records.is_empty());
        assert!(dedup.is_empty());
        // Abandonment leaves the token untouched; no key is burned.
        assert_eq!(cursor.page_token.as_deref(), Some("STALE"));
        assert_eq!(keys.remaining(), 1);
    }

    #[tokio::test]
    async fn test_malformed_body_abandons_page() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/search")
            .match_query(Matcher::Any)
            .with_body("not json")
            .create_async()
            .await;

        let config = test_config(&["K1"]);
        let paginator = paginator(&config, &format!("{}/search", server.url()));
        let mut keys = KeyRotator::new(config.api.keys.clone()).unwrap();
        let mut dedup = DedupStore::new();
        let mut cursor = CollectionCursor::default();
        let mut rng = StdRng::seed_from_u64(1);

        let records = paginator
            .next_page(&mut rng, &mut keys, &mut dedup, &mut cursor)
            .await
            .unwrap();
        assert!(records.is_empty());
    }
}
