//! Schema and transactional loader for `cleaned_data`.

use chrono::NaiveDateTime;
use sqlx::{PgPool, Postgres, Transaction};
use tgingest_core::{pg_array_literal, CleanedRow};

use crate::DbError;

const CREATE_CLEANED_DATA: &str =
    include_str!("../../../migrations/20261015000100_create_cleaned_data.sql");

/// Smallest `f64` above the `BIGINT` range (2^63).
const BIGINT_UPPER_EXCLUSIVE: f64 = 9_223_372_036_854_775_808.0;
const BIGINT_LOWER: f64 = -9_223_372_036_854_775_808.0;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row of `cleaned_data` as persisted.
///
/// `image_urls` and `image_paths` map to `TEXT[]` and are index-aligned.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct StoredRow {
    pub post_id: String,
    pub channel_name: Option<String>,
    pub channel_username: Option<String>,
    pub message_text: String,
    pub views: Option<i64>,
    pub timestamp: Option<NaiveDateTime>,
    pub image_urls: Option<Vec<String>>,
    pub image_paths: Option<Vec<String>>,
    pub source: Option<String>,
}

impl StoredRow {
    /// Converts a cleaned row into its stored form.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::MisalignedMedia`] if the two media lists differ in length.
    pub fn from_cleaned(row: &CleanedRow) -> Result<Self, DbError> {
        if row.image_urls.len() != row.image_paths.len() {
            return Err(DbError::MisalignedMedia {
                post_id: row.post_id.clone(),
                urls: row.image_urls.len(),
                paths: row.image_paths.len(),
            });
        }
        Ok(Self {
            post_id: row.post_id.clone(),
            channel_name: row.channel_name.clone(),
            channel_username: Some(row.channel_username.clone()),
            message_text: row.message_text.clone(),
            views: Some(coerce_views(&row.post_id, row.views)),
            timestamp: row.timestamp.map(|ts| ts.naive_utc()),
            image_urls: Some(row.image_urls.clone()),
            image_paths: Some(row.image_paths.clone()),
            source: Some(row.source.clone()),
        })
    }
}

/// Integer view count for storage.
///
/// Missing and NaN become 0. Fractions are truncated toward zero. Values outside
/// the signed 64-bit range are logged and become 0.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn coerce_views(post_id: &str, views: Option<f64>) -> i64 {
    let Some(value) = views.filter(|v| !v.is_nan()) else {
        return 0;
    };
    let truncated = value.trunc();
    if !(BIGINT_LOWER..BIGINT_UPPER_EXCLUSIVE).contains(&truncated) {
        tracing::warn!(post_id, views = value, "views out of range for BIGINT, storing 0");
        return 0;
    }
    truncated as i64
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Creates `cleaned_data` if it does not exist. Safe to call on every run.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the statement fails.
pub async fn ensure_cleaned_data_table(pool: &PgPool) -> Result<(), DbError> {
    sqlx::query(CREATE_CLEANED_DATA).execute(pool).await?;
    tracing::info!("table cleaned_data is ready");
    Ok(())
}

/// Inserts every row in a single transaction and returns the number inserted.
///
/// All rows are converted before the transaction opens. Any insert failure rolls
/// back the whole batch; nothing from this call is committed. An empty batch is
/// a successful no-op.
///
/// # Errors
///
/// Returns [`DbError::MisalignedMedia`] for a row whose media lists differ in
/// length, or [`DbError::Sqlx`] once the transaction has been rolled back.
pub async fn load_cleaned_rows(pool: &PgPool, rows: &[CleanedRow]) -> Result<u64, DbError> {
    let stored = rows
        .iter()
        .map(StoredRow::from_cleaned)
        .collect::<Result<Vec<_>, _>>()?;

    if stored.is_empty() {
        tracing::info!("no cleaned rows to load");
        return Ok(0);
    }

    let mut tx = pool.begin().await?;
    match insert_rows(&mut tx, &stored).await {
        Ok(inserted) => {
            tx.commit().await?;
            tracing::info!(inserted, "cleaned data inserted");
            Ok(inserted)
        }
        Err(e) => {
            tracing::error!(error = %e, rows = stored.len(), "insert failed, rolling back batch");
            if let Err(rollback) = tx.rollback().await {
                tracing::warn!(error = %rollback, "rollback reported an error");
            }
            Err(e.into())
        }
    }
}

async fn insert_rows(
    tx: &mut Transaction<'_, Postgres>,
    rows: &[StoredRow],
) -> Result<u64, sqlx::Error> {
    let mut inserted = 0u64;
    for row in rows {
        tracing::debug!(
            post_id = %row.post_id,
            views = row.views,
            image_urls = %pg_array_literal(row.image_urls.as_deref().unwrap_or_default()),
            image_paths = %pg_array_literal(row.image_paths.as_deref().unwrap_or_default()),
            "inserting cleaned row"
        );
        let result = sqlx::query(
            "INSERT INTO cleaned_data \
                 (post_id, channel_name, channel_username, message_text, views, \
                  timestamp, image_urls, image_paths, source) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(&row.post_id)
        .bind(&row.channel_name)
        .bind(&row.channel_username)
        .bind(&row.message_text)
        .bind(row.views)
        .bind(row.timestamp)
        .bind(&row.image_urls)
        .bind(&row.image_paths)
        .bind(&row.source)
        .execute(&mut **tx)
        .await?;
        inserted += result.rows_affected();
    }
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn cleaned(views: Option<f64>) -> CleanedRow {
        CleanedRow {
            post_id: "EAHCI_3".to_string(),
            channel_name: Some("EAHCI".to_string()),
            channel_username: "EAHCI".to_string(),
            message_text: "Clinic hours".to_string(),
            views,
            timestamp: Some(Utc.with_ymd_and_hms(2024, 2, 1, 10, 0, 0).unwrap()),
            image_urls: vec!["https://cdn/a.jpg".to_string()],
            image_paths: vec!["data/tg_image/EAHCI_3_0.jpg".to_string()],
            source: "Telegram".to_string(),
        }
    }

    #[test]
    fn missing_and_nan_views_store_zero() {
        assert_eq!(coerce_views("p", None), 0);
        assert_eq!(coerce_views("p", Some(f64::NAN)), 0);
    }

    #[test]
    fn fractional_views_truncate() {
        assert_eq!(coerce_views("p", Some(1234.9)), 1234);
        assert_eq!(coerce_views("p", Some(2000.0)), 2000);
    }

    #[test]
    fn views_outside_bigint_store_zero() {
        assert_eq!(coerce_views("p", Some(9_223_372_036_854_775_808.0)), 0);
        assert_eq!(coerce_views("p", Some(1e20)), 0);
        assert_eq!(coerce_views("p", Some(-1e19)), 0);
        assert_eq!(coerce_views("p", Some(f64::INFINITY)), 0);
    }

    #[test]
    fn views_at_bigint_bounds_are_kept() {
        assert_eq!(coerce_views("p", Some(-9_223_372_036_854_775_808.0)), i64::MIN);
        // Largest f64 below 2^63.
        assert_eq!(
            coerce_views("p", Some(9_223_372_036_854_774_784.0)),
            9_223_372_036_854_774_784
        );
    }

    #[test]
    fn stored_row_keeps_fields_and_naive_utc_timestamp() {
        let row = StoredRow::from_cleaned(&cleaned(Some(2000.0))).unwrap();
        assert_eq!(row.views, Some(2000));
        assert_eq!(
            row.timestamp.map(|ts| ts.to_string()).as_deref(),
            Some("2024-02-01 10:00:00")
        );
        assert_eq!(row.image_urls.as_ref().map(Vec::len), Some(1));
        assert_eq!(row.image_paths.as_ref().map(Vec::len), Some(1));
        assert_eq!(row.source.as_deref(), Some("Telegram"));
    }

    #[test]
    fn misaligned_media_is_rejected() {
        let mut row = cleaned(None);
        row.image_paths.clear();
        let err = StoredRow::from_cleaned(&row).unwrap_err();
        assert!(matches!(
            err,
            DbError::MisalignedMedia { urls: 1, paths: 0, .. }
        ));
    }
}
