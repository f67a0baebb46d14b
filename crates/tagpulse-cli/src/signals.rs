//! `signals` command handler.

use std::path::{Path, PathBuf};

use anyhow::Context;
use tagpulse_core::AppConfig;

/// Aggregates a scored post table into the daily signal CSV.
///
/// Rows without a sentiment label are classified from their content.
///
/// # Errors
///
/// Returns an error if the input table is missing or unreadable, or the
/// output cannot be written.
pub(crate) fn run_signals(
    config: &AppConfig,
    input: Option<&Path>,
    output: Option<&Path>,
) -> anyhow::Result<PathBuf> {
    let input = input.map_or_else(
        || tagpulse_store::scored_paths(&config.features_dir).parquet,
        Path::to_path_buf,
    );
    let output = output.map_or_else(
        || tagpulse_store::daily_signals_path(&config.signals_dir),
        Path::to_path_buf,
    );

    let rows = tagpulse_store::read_scored_rows(&input)
        .with_context(|| format!("reading scored posts from {}", input.display()))?;
    tracing::info!(input = %input.display(), posts = rows.len(), "loaded scored posts");

    let scored: Vec<_> = rows
        .into_iter()
        .map(|row| {
            let (post, keyword_score, sentiment) = row.into_parts();
            tagpulse_signals::with_sentiment(post, keyword_score, sentiment)
        })
        .collect();

    let daily = tagpulse_signals::aggregate_daily(&scored);
    if daily.is_empty() {
        tracing::warn!("no dated posts; writing an empty signal table");
    }
    for day in &daily {
        tracing::info!(
            date = %day.date,
            volume = day.tweet_volume,
            composite = day.composite_score,
            signal = %day.signal,
            "daily signal"
        );
    }

    tagpulse_store::write_daily_signals(&output, &daily).context("saving daily signals")?;
    println!("wrote {} daily signals -> {}", daily.len(), output.display());
    Ok(output)
}
