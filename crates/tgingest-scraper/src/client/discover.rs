use crate::error::ScraperError;
use crate::parse::{parse_listing, sequence_of};

use super::{ChannelClient, ChannelRange};

impl ChannelClient {
    /// Finds the channel's display name and highest post sequence number.
    ///
    /// Returns `None` when the listing cannot be fetched or carries no post
    /// identifier with a numeric suffix. Both mean "nothing to crawl".
    pub async fn discover(&self, channel: &str) -> Option<ChannelRange> {
        match self.try_discover(channel).await {
            Ok(range) => range,
            Err(e) => {
                tracing::warn!(channel, error = %e, "channel listing unavailable");
                None
            }
        }
    }

    pub(crate) async fn try_discover(
        &self,
        channel: &str,
    ) -> Result<Option<ChannelRange>, ScraperError> {
        let url = self.listing_url(channel);
        let page = self.fetcher.fetch(&url).await?;
        let listing = parse_listing(&page.text());

        let mut skipped = 0usize;
        let max_sequence = listing
            .post_ids
            .iter()
            .filter_map(|id| {
                let seq = sequence_of(id);
                if seq.is_none() {
                    skipped += 1;
                }
                seq
            })
            .max();

        if skipped > 0 {
            tracing::debug!(channel, skipped, "ignored post identifiers without a numeric suffix");
        }

        let Some(max_sequence) = max_sequence else {
            tracing::info!(channel, "listing has no posts");
            return Ok(None);
        };

        tracing::info!(
            channel,
            channel_name = listing.channel_name.as_deref().unwrap_or(""),
            max_sequence,
            "discovered channel range"
        );

        Ok(Some(ChannelRange {
            channel_name: listing.channel_name,
            max_sequence,
        }))
    }
}
