//! `score` command handler.

use std::path::Path;

use anyhow::Context;
use tagpulse_core::AppConfig;
use tagpulse_store::TablePaths;

/// Scores a raw post table and writes the feature table.
///
/// With no `input`, the newest run-stamped raw Parquet table in the data
/// directory is used.
///
/// # Errors
///
/// Returns an error if no input table exists or the output cannot be written.
pub(crate) fn run_score(config: &AppConfig, input: Option<&Path>) -> anyhow::Result<TablePaths> {
    let input = match input {
        Some(path) => path.to_path_buf(),
        None => tagpulse_store::latest_raw_parquet(&config.data_dir)
            .context("locating newest raw post table")?,
    };

    let posts = tagpulse_store::read_posts(&input)
        .with_context(|| format!("reading raw posts from {}", input.display()))?;
    tracing::info!(input = %input.display(), posts = posts.len(), "loaded raw posts");

    let scored = tagpulse_signals::score_posts(posts);
    let paths = tagpulse_store::write_scored_posts(&config.features_dir, &scored)
        .context("saving scored posts")?;

    println!(
        "scored {} posts -> {}",
        scored.len(),
        paths.parquet.display()
    );
    Ok(paths)
}
