//! Records flowing through the ingestion pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Origin tag written to every record's `source` column.
pub const SOURCE_TAG: &str = "Telegram";

/// One post as extracted from the channel preview page.
///
/// Created once per successful extraction and never mutated afterwards.
/// `image_urls` and `image_paths` are index-aligned and always the same length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPost {
    /// `{channel}_{sequence}`.
    pub post_id: String,
    pub channel_name: Option<String>,
    pub channel_username: String,
    /// Absent for posts authored by the channel itself.
    pub author: Option<String>,
    /// Empty when the post carries no text body.
    pub message_text: String,
    /// Counter as rendered by the source, e.g. `"2.0K"`.
    pub views: Option<String>,
    /// ISO-8601 string as published by the source.
    pub timestamp: Option<String>,
    pub image_urls: Vec<String>,
    pub image_paths: Vec<String>,
    pub source: String,
}

/// Builds the `post_id` for a channel and sequence number.
#[must_use]
pub fn post_id(channel: &str, sequence: u64) -> String {
    format!("{channel}_{sequence}")
}

/// Output of the cleaning stage.
///
/// Same shape as [`RawPost`] minus `author`, with `views` and `timestamp` coerced.
/// `views` stays fractional until load time because imputed values are means.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanedRow {
    pub post_id: String,
    pub channel_name: Option<String>,
    pub channel_username: String,
    pub message_text: String,
    pub views: Option<f64>,
    pub timestamp: Option<DateTime<Utc>>,
    pub image_urls: Vec<String>,
    pub image_paths: Vec<String>,
    pub source: String,
}
