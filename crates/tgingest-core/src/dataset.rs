//! Flat CSV dataset files.
//!
//! The raw dataset is append-only and single-writer: each [`DatasetSink::append`]
//! opens the file, writes one row (plus the header when the file is new or empty)
//! and flushes. There is no locking and no atomic replace.

use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::list_literal::{encode_list, parse_list, ListLiteralError};
use crate::post::{CleanedRow, RawPost};

/// Column order of the raw dataset file.
pub const DATASET_COLUMNS: [&str; 10] = [
    "post_id",
    "channel_name",
    "channel_username",
    "author",
    "message_text",
    "views",
    "timestamp",
    "image_urls",
    "image_paths",
    "source",
];

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("row {post_id}: {source}")]
    ListLiteral {
        post_id: String,
        #[source]
        source: ListLiteralError,
    },

    #[error("row {post_id}: {urls} image URLs but {paths} image paths")]
    MisalignedMedia {
        post_id: String,
        urls: usize,
        paths: usize,
    },

    #[error("row {post_id}: invalid timestamp {value:?}")]
    InvalidTimestamp { post_id: String, value: String },

    #[error("dataset {path} has no post_id column")]
    MissingPostIdColumn { path: PathBuf },
}

fn io_err(path: &Path) -> impl FnOnce(io::Error) -> DatasetError + '_ {
    move |source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn check_aligned(post_id: &str, urls: &[String], paths: &[String]) -> Result<(), DatasetError> {
    if urls.len() == paths.len() {
        Ok(())
    } else {
        Err(DatasetError::MisalignedMedia {
            post_id: post_id.to_string(),
            urls: urls.len(),
            paths: paths.len(),
        })
    }
}

/// On-disk shape of one raw dataset row. Field order is the column order.
#[derive(Debug, Serialize, Deserialize)]
struct DatasetRow {
    post_id: String,
    channel_name: Option<String>,
    channel_username: String,
    author: Option<String>,
    message_text: Option<String>,
    views: Option<String>,
    timestamp: Option<String>,
    image_urls: Option<String>,
    image_paths: Option<String>,
    source: String,
}

impl From<&RawPost> for DatasetRow {
    fn from(post: &RawPost) -> Self {
        Self {
            post_id: post.post_id.clone(),
            channel_name: post.channel_name.clone(),
            channel_username: post.channel_username.clone(),
            author: post.author.clone(),
            message_text: Some(post.message_text.clone()),
            views: post.views.clone(),
            timestamp: post.timestamp.clone(),
            image_urls: Some(encode_list(&post.image_urls)),
            image_paths: Some(encode_list(&post.image_paths)),
            source: post.source.clone(),
        }
    }
}

impl TryFrom<DatasetRow> for RawPost {
    type Error = DatasetError;

    fn try_from(row: DatasetRow) -> Result<Self, Self::Error> {
        let list = |cell: Option<&str>| {
            parse_list(cell.unwrap_or_default()).map_err(|source| DatasetError::ListLiteral {
                post_id: row.post_id.clone(),
                source,
            })
        };
        let image_urls = list(row.image_urls.as_deref())?;
        let image_paths = list(row.image_paths.as_deref())?;
        check_aligned(&row.post_id, &image_urls, &image_paths)?;

        Ok(RawPost {
            post_id: row.post_id,
            channel_name: row.channel_name,
            channel_username: row.channel_username,
            author: row.author,
            message_text: row.message_text.unwrap_or_default(),
            views: row.views,
            timestamp: row.timestamp,
            image_urls,
            image_paths,
            source: row.source,
        })
    }
}

/// Append-only writer for the raw dataset file.
#[derive(Debug, Clone)]
pub struct DatasetSink {
    path: PathBuf,
}

impl DatasetSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one record, writing the header first if the file is absent or empty.
    ///
    /// Parent directories are created as needed.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::MisalignedMedia`] if the record's media lists differ in
    /// length, or an I/O / CSV error if the write fails.
    pub fn append(&self, post: &RawPost) -> Result<(), DatasetError> {
        check_aligned(&post.post_id, &post.image_urls, &post.image_paths)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err(parent))?;
        }

        let needs_header = match fs::metadata(&self.path) {
            Ok(meta) => meta.len() == 0,
            Err(e) if e.kind() == io::ErrorKind::NotFound => true,
            Err(e) => return Err(io_err(&self.path)(e)),
        };

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(io_err(&self.path))?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(needs_header)
            .from_writer(file);
        writer.serialize(DatasetRow::from(post))?;
        writer.flush().map_err(io_err(&self.path))?;
        Ok(())
    }

    /// Returns every `post_id` already present in the file.
    ///
    /// A missing file yields an empty set. Only the `post_id` column is read, so
    /// rows that are otherwise malformed still count as present.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read as CSV.
    pub fn existing_post_ids(&self) -> Result<HashSet<String>, DatasetError> {
        if !self.path.exists() {
            return Ok(HashSet::new());
        }
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(&self.path)?;
        let Some(column) = reader.headers()?.iter().position(|h| h == "post_id") else {
            // An empty file has no header yet.
            if fs::metadata(&self.path).map_err(io_err(&self.path))?.len() == 0 {
                return Ok(HashSet::new());
            }
            return Err(DatasetError::MissingPostIdColumn {
                path: self.path.clone(),
            });
        };

        let mut ids = HashSet::new();
        for record in reader.records() {
            if let Some(id) = record?.get(column).filter(|id| !id.is_empty()) {
                ids.insert(id.to_string());
            }
        }
        Ok(ids)
    }
}

/// Reads the whole raw dataset, in file order.
///
/// # Errors
///
/// Returns an error if the file cannot be read, a row does not match the column
/// schema, or a media list cell cannot be parsed.
pub fn read_dataset(path: &Path) -> Result<Vec<RawPost>, DatasetError> {
    let mut reader = csv::Reader::from_path(path)?;
    reader
        .deserialize::<DatasetRow>()
        .map(|row| RawPost::try_from(row?))
        .collect()
}

/// On-disk shape of one cleaned row; the columns of the `cleaned_data` table.
#[derive(Debug, Serialize, Deserialize)]
struct CleanedCsvRow {
    post_id: String,
    channel_name: Option<String>,
    channel_username: String,
    message_text: String,
    views: Option<f64>,
    timestamp: Option<String>,
    image_urls: Option<String>,
    image_paths: Option<String>,
    source: String,
}

impl From<&CleanedRow> for CleanedCsvRow {
    fn from(row: &CleanedRow) -> Self {
        Self {
            post_id: row.post_id.clone(),
            channel_name: row.channel_name.clone(),
            channel_username: row.channel_username.clone(),
            message_text: row.message_text.clone(),
            views: row.views,
            timestamp: row.timestamp.map(|ts| ts.to_rfc3339()),
            image_urls: Some(encode_list(&row.image_urls)),
            image_paths: Some(encode_list(&row.image_paths)),
            source: row.source.clone(),
        }
    }
}

impl TryFrom<CleanedCsvRow> for CleanedRow {
    type Error = DatasetError;

    fn try_from(row: CleanedCsvRow) -> Result<Self, Self::Error> {
        let list = |cell: Option<&str>| {
            parse_list(cell.unwrap_or_default()).map_err(|source| DatasetError::ListLiteral {
                post_id: row.post_id.clone(),
                source,
            })
        };
        let image_urls = list(row.image_urls.as_deref())?;
        let image_paths = list(row.image_paths.as_deref())?;
        check_aligned(&row.post_id, &image_urls, &image_paths)?;

        let timestamp = match row.timestamp.as_deref() {
            None => None,
            Some(raw) => Some(
                DateTime::parse_from_rfc3339(raw)
                    .map(|ts| ts.with_timezone(&Utc))
                    .map_err(|_| DatasetError::InvalidTimestamp {
                        post_id: row.post_id.clone(),
                        value: raw.to_string(),
                    })?,
            ),
        };

        Ok(CleanedRow {
            post_id: row.post_id,
            channel_name: row.channel_name,
            channel_username: row.channel_username,
            message_text: row.message_text,
            views: row.views,
            timestamp,
            image_urls,
            image_paths,
            source: row.source,
        })
    }
}

/// Writes cleaned rows to `path`, replacing any previous file.
///
/// # Errors
///
/// Returns an I/O or CSV error if the file cannot be written.
pub fn write_cleaned(path: &Path, rows: &[CleanedRow]) -> Result<(), DatasetError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err(parent))?;
    }
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(CleanedCsvRow::from(row))?;
    }
    writer.flush().map_err(io_err(path))?;
    Ok(())
}

/// Reads a file produced by [`write_cleaned`].
///
/// # Errors
///
/// Returns an error if the file cannot be read or a row is malformed.
pub fn read_cleaned(path: &Path) -> Result<Vec<CleanedRow>, DatasetError> {
    let mut reader = csv::Reader::from_path(path)?;
    reader
        .deserialize::<CleanedCsvRow>()
        .map(|row| CleanedRow::try_from(row?))
        .collect()
}

#[cfg(test)]
#[path = "dataset_test.rs"]
mod tests;
