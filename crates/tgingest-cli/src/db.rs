//! `db` command handlers.

use tgingest_core::AppConfig;

pub(crate) async fn run_ping(config: &AppConfig) -> anyhow::Result<()> {
    let pool = tgingest_db::connect_pool_from_config(config).await?;
    tgingest_db::ping(&pool).await?;
    println!("database connection ok");
    Ok(())
}

pub(crate) async fn run_init(config: &AppConfig) -> anyhow::Result<()> {
    let pool = tgingest_db::connect_pool_from_config(config).await?;
    let applied = tgingest_db::run_migrations(&pool).await?;
    println!("applied {applied} migration(s)");
    Ok(())
}
