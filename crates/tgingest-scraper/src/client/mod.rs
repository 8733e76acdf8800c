//! Channel-level operations on top of [`Fetcher`]: range discovery and
//! single-post extraction.

mod discover;
mod extract;

use std::path::{Path, PathBuf};

use crate::fetch::Fetcher;

/// Display name and frontier of a channel as seen on its preview listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelRange {
    pub channel_name: Option<String>,
    /// Highest sequence number observed on the listing.
    pub max_sequence: u64,
}

/// Client for a channel preview host.
///
/// `base_url` is the scheme and host without a trailing slash, e.g.
/// `https://t.me`. Downloaded images land under `media_dir`.
#[derive(Debug, Clone)]
pub struct ChannelClient {
    fetcher: Fetcher,
    base_url: String,
    media_dir: PathBuf,
}

impl ChannelClient {
    #[must_use]
    pub fn new(fetcher: Fetcher, base_url: &str, media_dir: impl Into<PathBuf>) -> Self {
        Self {
            fetcher,
            base_url: base_url.trim_end_matches('/').to_string(),
            media_dir: media_dir.into(),
        }
    }

    #[must_use]
    pub fn fetcher(&self) -> &Fetcher {
        &self.fetcher
    }

    #[must_use]
    pub fn media_dir(&self) -> &Path {
        &self.media_dir
    }

    /// Preview listing of the most recent posts.
    #[must_use]
    pub fn listing_url(&self, channel: &str) -> String {
        format!("{}/s/{channel}", self.base_url)
    }

    /// Preview page anchored on one post.
    #[must_use]
    pub fn post_url(&self, channel: &str, sequence: u64) -> String {
        format!("{}/s/{channel}/{sequence}", self.base_url)
    }
}
