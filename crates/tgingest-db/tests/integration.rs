//! Offline tests for tgingest-db pool configuration and row conversion.
//! These tests do not require a live database connection.

use std::path::PathBuf;

use tgingest_core::{AppConfig, CleanedRow, Environment};
use tgingest_db::{PoolConfig, StoredRow};

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let app_config = AppConfig {
        database_url: Some("postgres://example".to_string()),
        env: Environment::Test,
        log_level: "info".to_string(),
        channels: vec!["EAHCI".to_string()],
        base_url: "https://t.me".to_string(),
        dataset_path: PathBuf::from("./data/telegram_data.csv"),
        media_dir: PathBuf::from("./data/tg_image"),
        scraper_request_timeout_secs: 30,
        scraper_user_agent: "ua".to_string(),
        scraper_max_attempts: 3,
        scraper_retry_delay_secs: 3,
        db_max_connections: 42,
        db_min_connections: 7,
        db_acquire_timeout_secs: 9,
        detector_command: None,
    };

    let pool_config = PoolConfig::from_app_config(&app_config);
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout_secs, 9);
}

#[test]
fn stored_row_zeroes_missing_views_and_keeps_empty_media() {
    let row = CleanedRow {
        post_id: "yetenaweg_12".to_string(),
        channel_name: None,
        channel_username: "yetenaweg".to_string(),
        message_text: "Daily health tip".to_string(),
        views: None,
        timestamp: None,
        image_urls: vec![],
        image_paths: vec![],
        source: "Telegram".to_string(),
    };

    let stored = StoredRow::from_cleaned(&row).unwrap();
    assert_eq!(stored.views, Some(0));
    assert!(stored.timestamp.is_none());
    assert_eq!(stored.image_urls, Some(vec![]));
    assert_eq!(stored.image_paths, Some(vec![]));
}
