//! `crawl` command handler.

use std::time::Duration;

use tgingest_core::{parse_channels, AppConfig, DatasetSink};
use tgingest_scraper::{crawl_channel, ChannelClient, CrawlOptions, Fetcher, RetryPolicy};

pub(crate) fn build_channel_client(config: &AppConfig) -> anyhow::Result<ChannelClient> {
    let policy = RetryPolicy::fixed(
        config.scraper_max_attempts,
        Duration::from_secs(config.scraper_retry_delay_secs),
    );
    let fetcher = Fetcher::new(
        config.scraper_request_timeout_secs,
        &config.scraper_user_agent,
        policy,
    )?;
    Ok(ChannelClient::new(fetcher, &config.base_url, &config.media_dir))
}

/// Channels named on the command line, or the configured list when none are.
pub(crate) fn select_channels(config: &AppConfig, requested: &[String]) -> Vec<String> {
    if requested.is_empty() {
        return config.channels.clone();
    }
    requested.iter().flat_map(|c| parse_channels(c)).collect()
}

/// Crawls each channel in turn into the configured dataset file.
///
/// Unreachable channels and posts are skipped; only dataset write failures
/// abort the run.
pub(crate) async fn run_crawl(
    config: &AppConfig,
    requested: &[String],
    full: bool,
) -> anyhow::Result<()> {
    let channels = select_channels(config, requested);
    let client = build_channel_client(config)?;
    let sink = DatasetSink::new(&config.dataset_path);
    let options = CrawlOptions { resume: !full };

    tracing::info!(
        channels = channels.len(),
        dataset = %sink.path().display(),
        resume = options.resume,
        "starting crawl"
    );

    for channel in &channels {
        let summary = crawl_channel(&client, channel, &sink, options).await?;
        match summary.max_sequence {
            Some(max) => println!(
                "{channel}: {} new, {} already present, {} gaps, {} unavailable (max sequence {max})",
                summary.extracted,
                summary.already_present,
                summary.gaps.len(),
                summary.unavailable.len(),
            ),
            None => println!("{channel}: nothing to crawl"),
        }
    }

    Ok(())
}
