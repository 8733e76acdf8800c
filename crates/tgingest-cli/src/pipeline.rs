//! `clean`, `load` and `verify-media` command handlers.

use std::path::{Path, PathBuf};

use tgingest_core::{clean, read_cleaned, read_dataset, write_cleaned, AppConfig};
use tgingest_scraper::missing_files;

use crate::DEFAULT_CLEANED_PATH;

pub(crate) fn run_clean(input: &Path, output: &Path) -> anyhow::Result<()> {
    let raw = read_dataset(input)?;
    let total = raw.len();
    let rows = clean(raw);
    write_cleaned(output, &rows)?;
    println!(
        "cleaned {total} rows into {} rows at {}",
        rows.len(),
        output.display()
    );
    Ok(())
}

pub(crate) async fn run_load(
    config: &AppConfig,
    input: Option<PathBuf>,
    from_cleaned: bool,
) -> anyhow::Result<()> {
    let rows = if from_cleaned {
        let input = input.unwrap_or_else(|| PathBuf::from(DEFAULT_CLEANED_PATH));
        read_cleaned(&input)?
    } else {
        let input = input.unwrap_or_else(|| config.dataset_path.clone());
        clean(read_dataset(&input)?)
    };

    let pool = tgingest_db::connect_pool_from_config(config).await?;
    tgingest_db::ensure_cleaned_data_table(&pool).await?;
    let inserted = tgingest_db::load_cleaned_rows(&pool, &rows).await?;
    println!("loaded {inserted} rows into cleaned_data");
    Ok(())
}

/// Prints every recorded image path that does not exist on disk.
pub(crate) fn run_verify_media(input: &Path) -> anyhow::Result<()> {
    let posts = read_dataset(input)?;

    let mut checked = 0usize;
    let mut missing = 0usize;
    for post in &posts {
        checked += post.image_paths.len();
        for path in missing_files(post.image_paths.iter().map(String::as_str)) {
            missing += 1;
            tracing::warn!(post_id = %post.post_id, path, "image missing on disk");
            println!("{}\t{path}", post.post_id);
        }
    }

    println!("checked {checked} image paths across {} posts: {missing} missing", posts.len());
    Ok(())
}
