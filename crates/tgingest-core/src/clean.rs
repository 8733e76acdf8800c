//! Batch cleaning of raw dataset rows.
//!
//! [`clean`] is a pure transform over the whole collection, applied in a fixed order:
//!
//! 1. drop rows with empty text or a channel announcement,
//! 2. coerce `views` (expanding `K`/`M` suffixes),
//! 3. fill missing `views` from the positional neighbourhood,
//! 4. coerce `timestamp`,
//! 5. drop `author`.
//!
//! Imputation uses row position as a proxy for time, so it is only meaningful on
//! input kept in scrape order. Sorting by timestamp first changes the results.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::post::{CleanedRow, RawPost};

/// Text prefix of the automated "Channel created" / "Channel photo updated" posts.
pub const CHANNEL_ANNOUNCEMENT_PREFIX: &str = "Channel";

/// Number of positions considered on each side of a missing value.
pub const IMPUTATION_RADIUS: usize = 5;

/// Cleans a full collection of raw posts.
#[must_use]
pub fn clean(rows: Vec<RawPost>) -> Vec<CleanedRow> {
    let total = rows.len();
    let kept: Vec<RawPost> = rows.into_iter().filter(keep_row).collect();
    tracing::info!(
        dropped = total - kept.len(),
        kept = kept.len(),
        "removed empty and announcement rows"
    );

    let mut views: Vec<Option<f64>> = kept
        .iter()
        .map(|post| post.views.as_deref().and_then(parse_views))
        .collect();
    let missing = views.iter().filter(|v| v.is_none()).count();
    let imputed = impute_views(&mut views);
    tracing::info!(
        missing,
        imputed,
        unresolved = missing - imputed,
        "filled missing views from neighbouring rows"
    );

    kept.into_iter()
        .zip(views)
        .map(|(post, views)| CleanedRow {
            timestamp: post.timestamp.as_deref().and_then(parse_timestamp),
            post_id: post.post_id,
            channel_name: post.channel_name,
            channel_username: post.channel_username,
            message_text: post.message_text,
            views,
            image_urls: post.image_urls,
            image_paths: post.image_paths,
            source: post.source,
        })
        .collect()
}

/// Returns `false` for rows the cleaner drops.
#[must_use]
pub fn keep_row(post: &RawPost) -> bool {
    let text = post.message_text.trim();
    !text.is_empty() && !text.starts_with(CHANNEL_ANNOUNCEMENT_PREFIX)
}

/// Parses a rendered view counter such as `"512"`, `"2.0K"` or `"1.3M"`.
///
/// The suffix is expanded into an exponent before parsing, so `"1.2K"` is exactly
/// `1200.0`. Negative, non-finite and unparsable values are `None`.
#[must_use]
pub fn parse_views(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    let expanded = match trimmed.chars().last()? {
        'K' | 'k' => format!("{}e3", trimmed[..trimmed.len() - 1].trim_end()),
        'M' | 'm' => format!("{}e6", trimmed[..trimmed.len() - 1].trim_end()),
        _ => trimmed.to_string(),
    };
    let value = expanded.parse::<f64>().ok()?;
    (value.is_finite() && value >= 0.0).then_some(value)
}

/// Fills each `None` with the mean of the present values at positions
/// `[i - 5, i + 5)`, clipped to the slice.
///
/// Rows are filled in index order and a filled value counts for later windows.
/// A window with no values leaves the row `None`. Returns the number filled.
pub fn impute_views(views: &mut [Option<f64>]) -> usize {
    let missing: Vec<usize> = views
        .iter()
        .enumerate()
        .filter_map(|(idx, v)| v.is_none().then_some(idx))
        .collect();

    let mut filled = 0;
    for idx in missing {
        let start = idx.saturating_sub(IMPUTATION_RADIUS);
        let end = (idx + IMPUTATION_RADIUS).min(views.len());
        let (sum, count) = views[start..end]
            .iter()
            .flatten()
            .fold((0.0_f64, 0_u32), |(sum, count), v| (sum + v, count + 1));
        if count > 0 {
            views[idx] = Some(sum / f64::from(count));
            filled += 1;
        }
    }
    filled
}

/// Parses a published timestamp into UTC.
///
/// Accepts RFC 3339, the space-separated form with an offset, naive date-times
/// (taken as UTC) and bare dates (midnight UTC).
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%z"] {
        if let Ok(ts) = DateTime::parse_from_str(raw, fmt) {
            return Some(ts.with_timezone(&Utc));
        }
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
#[path = "clean_test.rs"]
mod tests;
