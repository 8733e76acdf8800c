//! `detect` command handler.

use std::path::Path;

use anyhow::Context;
use tgingest_core::AppConfig;
use tgingest_detect::{detect_folder, CommandDetector};

pub(crate) async fn run_detect(
    config: &AppConfig,
    folder: &Path,
    command: Option<&str>,
    store: bool,
) -> anyhow::Result<()> {
    let command = command
        .or(config.detector_command.as_deref())
        .context("no detector configured; set TGINGEST_DETECTOR_COMMAND or pass --command")?;
    let detector = CommandDetector::from_command_line(command)?;

    let records = detect_folder(&detector, folder).await?;
    if records.is_empty() {
        println!("no detections in {}", folder.display());
        return Ok(());
    }

    if store {
        let pool = tgingest_db::connect_pool_from_config(config).await?;
        tgingest_db::ensure_detections_table(&pool).await?;
        let inserted = tgingest_db::store_detections(&pool, &records).await?;
        println!("stored {inserted} detections");
    } else {
        for record in &records {
            println!("{}", serde_json::to_string(record)?);
        }
    }
    Ok(())
}
