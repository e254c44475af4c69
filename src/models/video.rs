//! Video record data structures.

use serde::{Deserialize, Serialize};

/// One row of the output dataset.
///
/// Field renames match the legacy CSV header so newly collected rows
/// append cleanly onto previously accumulated files.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VideoRecord {
    /// Unique video identifier (dataset-wide dedup key)
    pub video_id: String,

    /// Video title
    pub title: String,

    /// Publish timestamp as returned by the API
    #[serde(rename = "publishedAt")]
    pub published_at: String,

    /// Channel unique identifier
    #[serde(rename = "channelId")]
    pub channel_id: String,

    /// Channel display name
    #[serde(rename = "channelTitle")]
    pub channel_title: String,

    /// Video description
    pub description: String,

    /// Default thumbnail URL
    #[serde(rename = "thumbnail_link")]
    pub thumbnail_url: String,

    /// Trending label (always false for collector output)
    #[serde(with = "int_bool")]
    pub is_trending: bool,

    /// View count, 0 when absent
    pub view_count: u64,

    /// Like count, 0 when absent
    pub likes: u64,

    /// Comment count, 0 when absent
    pub comment_count: u64,

    /// YouTube category identifier
    #[serde(rename = "categoryId")]
    pub category_id: u32,

    /// Tags joined with ", "
    pub tags: String,

    /// True iff the statistics block had no commentCount field
    #[serde(with = "int_bool")]
    pub comments_disabled: bool,

    /// True iff the statistics block had no likeCount field
    #[serde(with = "int_bool")]
    pub ratings_disabled: bool,
}

impl VideoRecord {
    /// Merge enrichment statistics into a snippet-level record.
    pub fn apply_stats(&mut self, stats: &VideoStats) {
        self.view_count = stats.view_count;
        self.likes = stats.likes;
        self.comment_count = stats.comment_count;
        self.category_id = stats.category_id;
        self.tags = stats.tags.clone();
        self.comments_disabled = stats.comments_disabled;
        self.ratings_disabled = stats.ratings_disabled;
    }
}

/// Enrichment statistics for one video, keyed by id in the fetcher output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VideoStats {
    pub view_count: u64,
    pub likes: u64,
    pub comment_count: u64,
    pub category_id: u32,
    pub tags: String,
    pub comments_disabled: bool,
    pub ratings_disabled: bool,
}

/// Serialize booleans as 0/1 integers, matching the legacy dataset.
///
/// Deserialization also accepts `true`/`false` strings for tolerance
/// toward externally produced files.
mod int_bool {
    use serde::de::{Deserializer, Error};
    use serde::ser::Serializer;
    use serde::Deserialize;

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(u8::from(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        let raw = String::deserialize(deserializer)?;
        match raw.trim() {
            "0" => Ok(false),
            "1" => Ok(true),
            other => other
                .to_lowercase()
                .parse()
                .map_err(|_| D::Error::custom(format!("invalid boolean value: {other}"))),
        }
    }
}
