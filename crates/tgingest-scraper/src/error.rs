use std::path::PathBuf;

use thiserror::Error;
use tgingest_core::DatasetError;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// Every attempt allowed by the retry policy failed. Callers treat this as
    /// "content unavailable" for the current item, not as a fatal error.
    #[error("fetching {url} failed after {attempts} attempt(s): {cause}")]
    FetchFailed {
        url: String,
        attempts: u32,
        cause: String,
    },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Dataset(#[from] DatasetError),
}
