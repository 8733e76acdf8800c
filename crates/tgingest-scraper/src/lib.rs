pub mod client;
pub mod crawl;
pub mod error;
pub mod fetch;
pub mod media;
pub mod parse;
pub mod retry;

pub use client::{ChannelClient, ChannelRange};
pub use crawl::{crawl_channel, CrawlOptions, CrawlSummary};
pub use error::ScraperError;
pub use fetch::{Fetched, Fetcher};
pub use media::{download_image, image_path, missing_files};
pub use retry::{Backoff, RetryPolicy};
