// src/models/api.rs

//! YouTube Data API v3 wire types.
//!
//! Count fields in `statistics` arrive as JSON strings and are optional;
//! absence (not zero) is what marks a feature as disabled on the video.
//!
//! See: <https://developers.google.com/youtube/v3/docs>

use serde::Deserialize;

/// Resource kind identifying a video in search results.
pub const VIDEO_KIND: &str = "youtube#video";

/// Response structure for the `search.list` API call.
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    /// Search results for the current page.
    #[serde(default)]
    pub items: Vec<SearchItem>,

    /// Continuation token for the next result page.
    #[serde(rename = "nextPageToken")]
    pub next_page_token: Option<String>,

    /// Error envelope; present instead of results on failure.
    pub error: Option<ApiError>,
}

/// One search result. The id may reference a channel or playlist,
/// so `kind` must be checked before treating it as a video.
#[derive(Debug, Deserialize)]
pub struct SearchItem {
    pub id: SearchId,

    #[serde(default)]
    pub snippet: SearchSnippet,
}

/// Polymorphic result identifier.
#[derive(Debug, Default, Deserialize)]
pub struct SearchId {
    #[serde(default)]
    pub kind: String,

    #[serde(rename = "videoId")]
    pub video_id: Option<String>,
}

/// Descriptive fields of a search result.
#[derive(Debug, Default, Deserialize)]
pub struct SearchSnippet {
    #[serde(default)]
    pub title: String,

    #[serde(rename = "publishedAt", default)]
    pub published_at: String,

    #[serde(rename = "channelId", default)]
    pub channel_id: String,

    #[serde(rename = "channelTitle", default)]
    pub channel_title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub thumbnails: Thumbnails,
}

/// Thumbnail variants; only the default size is collected.
#[derive(Debug, Default, Deserialize)]
pub struct Thumbnails {
    #[serde(rename = "default")]
    pub default_size: Option<Thumbnail>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Thumbnail {
    #[serde(default)]
    pub url: String,
}

/// Response structure for the `videos.list` API call.
#[derive(Debug, Deserialize)]
pub struct VideosResponse {
    #[serde(default)]
    pub items: Vec<VideoItem>,

    /// Error envelope; present instead of results on failure.
    pub error: Option<ApiError>,
}

/// One enriched video resource.
#[derive(Debug, Deserialize)]
pub struct VideoItem {
    /// The ID that YouTube uses to uniquely identify the video.
    pub id: String,

    /// Statistics block; individual counts are absent when the
    /// corresponding feature is disabled on the video.
    pub statistics: Option<VideoStatistics>,

    pub snippet: Option<VideoSnippet>,
}

/// Statistics about the video. Counts are decimal strings.
#[derive(Debug, Default, Deserialize)]
pub struct VideoStatistics {
    #[serde(rename = "viewCount")]
    pub view_count: Option<String>,

    #[serde(rename = "likeCount")]
    pub like_count: Option<String>,

    #[serde(rename = "commentCount")]
    pub comment_count: Option<String>,
}

/// Snippet fields used for enrichment.
#[derive(Debug, Default, Deserialize)]
pub struct VideoSnippet {
    #[serde(rename = "categoryId")]
    pub category_id: Option<String>,

    #[serde(default)]
    pub tags: Vec<String>,
}

/// API-level error envelope shared by both endpoints.
#[derive(Debug, Deserialize)]
pub struct ApiError {
    #[serde(default)]
    pub message: String,
}

impl ApiError {
    /// True if this error signals quota exhaustion for the current key.
    ///
    /// The provider distinguishes quota errors from everything else only
    /// through the message text, so this substring check is the contract
    /// the accumulated dataset was collected under.
    pub fn is_quota(&self) -> bool {
        self.message.to_lowercase().contains("quota")
    }
}

/// Parse a decimal string count, defaulting to 0 when absent or malformed.
pub fn parse_count(raw: Option<&String>) -> u64 {
    raw.and_then(|s| s.parse().ok()).unwrap_or(0)
}
