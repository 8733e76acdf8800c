//! Local persistence of post images.

use std::path::{Path, PathBuf};

use crate::error::ScraperError;
use crate::fetch::Fetcher;

/// Deterministic file path for image `index` of post `sequence`.
#[must_use]
pub fn image_path(media_dir: &Path, channel: &str, sequence: u64, index: usize) -> PathBuf {
    media_dir.join(format!("{channel}_{sequence}_{index}.jpg"))
}

/// Fetches `url` and writes the body to `path`, creating parent directories.
///
/// # Errors
///
/// Returns [`ScraperError::FetchFailed`] when every attempt failed, or
/// [`ScraperError::Io`] when the file cannot be written.
pub async fn download_image(fetcher: &Fetcher, url: &str, path: &Path) -> Result<(), ScraperError> {
    let fetched = fetcher.fetch(url).await?;

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|source| ScraperError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
    }
    tokio::fs::write(path, &fetched.body)
        .await
        .map_err(|source| ScraperError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    tracing::debug!(url, path = %path.display(), bytes = fetched.body.len(), "saved image");
    Ok(())
}

/// Entries of `paths` that do not exist on disk.
#[must_use]
pub fn missing_files<'a>(paths: impl IntoIterator<Item = &'a str>) -> Vec<&'a str> {
    paths
        .into_iter()
        .filter(|p| !Path::new(p).is_file())
        .collect()
}
