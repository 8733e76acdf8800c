use tgingest_core::{post_id, RawPost, SOURCE_TAG};

use crate::error::ScraperError;
use crate::media::{download_image, image_path};
use crate::parse::parse_post;

use super::ChannelClient;

impl ChannelClient {
    /// Fetches and parses post `sequence` of `channel`, downloading its images.
    ///
    /// Returns `None` when the page cannot be fetched or holds no container for
    /// exactly this post. `channel_name` is left unset; the crawl fills it from
    /// discovery.
    pub async fn extract(&self, channel: &str, sequence: u64) -> Option<RawPost> {
        match self.try_extract(channel, sequence).await {
            Ok(post) => post,
            Err(e) => {
                tracing::warn!(channel, sequence, error = %e, "post page unavailable");
                None
            }
        }
    }

    /// Like [`Self::extract`], but reports a failed page fetch as an error so the
    /// caller can tell an unreachable page from a missing post.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::FetchFailed`] when the post page could not be
    /// fetched. Image download failures never surface here.
    pub async fn try_extract(
        &self,
        channel: &str,
        sequence: u64,
    ) -> Result<Option<RawPost>, ScraperError> {
        let url = self.post_url(channel, sequence);
        let page = self.fetcher.fetch(&url).await?;

        let data_post = format!("{channel}/{sequence}");
        let Some(parsed) = parse_post(&page.text(), &data_post) else {
            tracing::debug!(channel, sequence, "no matching post container");
            return Ok(None);
        };

        let mut image_urls = Vec::with_capacity(parsed.photos.len());
        let mut image_paths = Vec::with_capacity(parsed.photos.len());
        for photo in parsed.photos {
            let path = image_path(&self.media_dir, channel, sequence, photo.index);
            if let Err(e) = download_image(&self.fetcher, &photo.url, &path).await {
                tracing::warn!(
                    channel,
                    sequence,
                    url = %photo.url,
                    path = %path.display(),
                    error = %e,
                    "image download failed"
                );
            }
            image_urls.push(photo.url);
            image_paths.push(path.to_string_lossy().into_owned());
        }

        Ok(Some(RawPost {
            post_id: post_id(channel, sequence),
            channel_name: None,
            channel_username: channel.to_string(),
            author: parsed.author,
            message_text: parsed.message_text,
            views: parsed.views,
            timestamp: parsed.timestamp,
            image_urls,
            image_paths,
            source: SOURCE_TAG.to_string(),
        }))
    }
}
