//! Schema and batch insert for `object_detections`.

use rust_decimal::Decimal;
use sqlx::PgPool;
use tgingest_core::DetectionRecord;

use crate::DbError;

const CREATE_OBJECT_DETECTIONS: &str =
    include_str!("../../../migrations/20261015000200_create_object_detections.sql");

/// Creates `object_detections` if it does not exist.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the statement fails.
pub async fn ensure_detections_table(pool: &PgPool) -> Result<(), DbError> {
    sqlx::query(CREATE_OBJECT_DETECTIONS).execute(pool).await?;
    tracing::info!("table object_detections is ready");
    Ok(())
}

/// Rounds `value` to `scale` decimal places for a `NUMERIC` column.
pub(crate) fn to_numeric(field: &'static str, value: f64, scale: u32) -> Result<Decimal, DbError> {
    Decimal::try_from(value)
        .map(|d| d.round_dp(scale))
        .map_err(|_| DbError::OutOfRange { field, value })
}

struct DetectionParams {
    confidence: Decimal,
    x_min: Decimal,
    y_min: Decimal,
    x_max: Decimal,
    y_max: Decimal,
}

impl DetectionParams {
    fn from_record(record: &DetectionRecord) -> Result<Self, DbError> {
        Ok(Self {
            confidence: to_numeric("confidence", record.confidence, 4)?,
            x_min: to_numeric("x_min", record.x_min, 2)?,
            y_min: to_numeric("y_min", record.y_min, 2)?,
            x_max: to_numeric("x_max", record.x_max, 2)?,
            y_max: to_numeric("y_max", record.y_max, 2)?,
        })
    }
}

/// Inserts detections in one transaction and returns the number inserted.
///
/// # Errors
///
/// Returns [`DbError::OutOfRange`] if a value cannot be represented as a
/// decimal, or [`DbError::Sqlx`] if any insert fails; nothing is committed then.
pub async fn store_detections(pool: &PgPool, records: &[DetectionRecord]) -> Result<u64, DbError> {
    let params = records
        .iter()
        .map(DetectionParams::from_record)
        .collect::<Result<Vec<_>, _>>()?;

    if records.is_empty() {
        return Ok(0);
    }

    let mut tx = pool.begin().await?;
    let mut inserted = 0u64;
    for (record, p) in records.iter().zip(&params) {
        let result = sqlx::query(
            "INSERT INTO object_detections \
                 (image_name, class_name, confidence, x_min, y_min, x_max, y_max, detection_time) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(&record.image_name)
        .bind(&record.class_name)
        .bind(p.confidence)
        .bind(p.x_min)
        .bind(p.y_min)
        .bind(p.x_max)
        .bind(p.y_max)
        .bind(record.detection_time)
        .execute(&mut *tx)
        .await?;
        inserted += result.rows_affected();
    }
    tx.commit().await?;

    tracing::info!(inserted, "detections stored");
    Ok(inserted)
}
