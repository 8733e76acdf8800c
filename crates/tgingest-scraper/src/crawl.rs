//! Crawl of one channel: discovery, then every sequence number in order.

use std::collections::HashSet;

use tgingest_core::{post_id, DatasetSink};

use crate::client::ChannelClient;
use crate::error::ScraperError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlOptions {
    /// Skip sequence numbers whose `post_id` is already in the dataset file.
    pub resume: bool,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self { resume: true }
    }
}

/// Outcome of [`crawl_channel`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlSummary {
    pub channel: String,
    /// `None` when discovery found nothing to crawl.
    pub max_sequence: Option<u64>,
    /// Rows appended to the dataset by this run.
    pub extracted: usize,
    /// Sequences skipped because the dataset already holds them.
    pub already_present: usize,
    /// Sequences whose page had no matching post container.
    pub gaps: Vec<u64>,
    /// Sequences whose page could not be fetched.
    pub unavailable: Vec<u64>,
}

/// Crawls `channel` from sequence 1 through the discovered frontier, appending
/// every extracted post to `sink`.
///
/// Unreachable or missing posts are recorded in the summary and skipped.
///
/// # Errors
///
/// Returns [`ScraperError::Dataset`] if the dataset file cannot be read for
/// resume or a row cannot be appended.
pub async fn crawl_channel(
    client: &ChannelClient,
    channel: &str,
    sink: &DatasetSink,
    options: CrawlOptions,
) -> Result<CrawlSummary, ScraperError> {
    let mut summary = CrawlSummary {
        channel: channel.to_string(),
        ..CrawlSummary::default()
    };

    let Some(range) = client.discover(channel).await else {
        tracing::info!(channel, "nothing to crawl");
        return Ok(summary);
    };
    summary.max_sequence = Some(range.max_sequence);

    let existing = if options.resume {
        sink.existing_post_ids()?
    } else {
        HashSet::new()
    };

    for sequence in 1..=range.max_sequence {
        if existing.contains(&post_id(channel, sequence)) {
            summary.already_present += 1;
            continue;
        }

        match client.try_extract(channel, sequence).await {
            Ok(Some(mut post)) => {
                post.channel_name.clone_from(&range.channel_name);
                sink.append(&post)?;
                summary.extracted += 1;
                tracing::debug!(channel, sequence, post_id = %post.post_id, "appended post");
            }
            Ok(None) => {
                tracing::info!(channel, sequence, "sequence has no post, skipping");
                summary.gaps.push(sequence);
            }
            Err(e) => {
                tracing::warn!(channel, sequence, error = %e, "post unavailable, skipping");
                summary.unavailable.push(sequence);
            }
        }
    }

    tracing::info!(
        channel,
        max_sequence = range.max_sequence,
        extracted = summary.extracted,
        already_present = summary.already_present,
        gaps = summary.gaps.len(),
        unavailable = summary.unavailable.len(),
        "channel crawl complete"
    );

    Ok(summary)
}
