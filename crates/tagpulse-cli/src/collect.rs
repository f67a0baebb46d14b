//! `collect` command handler.
//!
//! Hashtags run sequentially against one browser session; per-hashtag
//! failures are logged and skipped, and only a run that retains nothing at
//! all is an error.

use std::time::Duration;

use anyhow::Context;
use clap::Args;
use tagpulse_collector::{
    CancelToken, CollectLimits, Collector, CollectorError, DelayPolicy, SeenSet, WebDriverConfig,
    WebDriverSession,
};
use tagpulse_core::hashtags::validate_hashtags;
use tagpulse_core::{AppConfig, HashtagConfig};
use tagpulse_store::TablePaths;

#[derive(Debug, Clone, Default, Args)]
pub struct CollectArgs {
    /// Hashtag to collect (repeatable); defaults to the enabled watchlist entries
    #[arg(long = "tag")]
    pub tags: Vec<String>,

    /// Maximum unique posts per hashtag
    #[arg(long)]
    pub max_posts: Option<usize>,

    /// Maximum scroll iterations per hashtag
    #[arg(long)]
    pub max_scrolls: Option<usize>,

    /// Print the hashtags and limits without opening a browser
    #[arg(long)]
    pub dry_run: bool,
}

/// Prefixes a bare tag with `#` so `--tag nifty50` and `--tag '#nifty50'` agree.
fn normalize_tag(tag: &str) -> String {
    let tag = tag.trim();
    if tag.starts_with('#') {
        tag.to_string()
    } else {
        format!("#{tag}")
    }
}

/// Resolves the hashtags to collect: CLI tags when given, otherwise the
/// enabled watchlist entries.
pub(crate) fn resolve_tags(config: &AppConfig, cli_tags: &[String]) -> anyhow::Result<Vec<String>> {
    if cli_tags.is_empty() {
        let file = tagpulse_core::load_hashtags(&config.hashtags_path)?;
        return Ok(file.enabled_tags());
    }

    let entries: Vec<HashtagConfig> = cli_tags
        .iter()
        .map(|t| HashtagConfig {
            tag: normalize_tag(t),
            enabled: true,
            notes: None,
        })
        .collect();
    validate_hashtags(&entries)?;
    Ok(entries.into_iter().map(|e| e.tag).collect())
}

pub(crate) fn limits_for(config: &AppConfig, args: &CollectArgs) -> CollectLimits {
    CollectLimits {
        max_posts: args.max_posts.unwrap_or(config.max_posts),
        max_scrolls: args.max_scrolls.unwrap_or(config.max_scrolls),
    }
}

fn webdriver_config(config: &AppConfig) -> WebDriverConfig {
    WebDriverConfig {
        webdriver_url: config.webdriver_url.clone(),
        feed_base_url: config.feed_base_url.clone(),
        headless: config.headless,
        cookies: config
            .session_cookies()
            .map(|(token, ct0)| (token.to_string(), ct0.to_string())),
        scroll_pixels: config.scroll_pixels,
        nav_settle: Duration::from_millis(config.nav_settle_ms),
        nav_timeout: Duration::from_secs(config.nav_timeout_secs),
        max_retries: config.max_retries,
        retry_backoff_base_secs: config.retry_backoff_base_secs,
    }
}

fn load_seen_set(config: &AppConfig) -> anyhow::Result<SeenSet> {
    match &config.seen_set_path {
        Some(path) => {
            let seen = SeenSet::load(path)?;
            tracing::info!(path = %path.display(), known = seen.len(), "loaded seen set");
            Ok(seen)
        }
        None => Ok(SeenSet::new()),
    }
}

/// Runs one collection pass and writes the raw tables.
///
/// Returns `None` for a dry run.
///
/// # Errors
///
/// Returns an error if the watchlist or seen set cannot be loaded, the
/// browser session cannot be started, nothing was collected, or the tables
/// cannot be written.
pub(crate) async fn run_collect(
    config: &AppConfig,
    args: &CollectArgs,
    cancel: CancelToken,
) -> anyhow::Result<Option<TablePaths>> {
    let tags = resolve_tags(config, &args.tags)?;
    if tags.is_empty() {
        anyhow::bail!(
            "no enabled hashtags; pass --tag or enable entries in {}",
            config.hashtags_path.display()
        );
    }
    let limits = limits_for(config, args);

    if args.dry_run {
        println!(
            "dry-run: would collect {} hashtags [{}] with max_posts={} max_scrolls={}",
            tags.len(),
            tags.join(", "),
            limits.max_posts,
            limits.max_scrolls
        );
        return Ok(None);
    }

    let started = chrono::Local::now().naive_local();
    let mut seen = load_seen_set(config)?;
    let delay = DelayPolicy::from_millis(
        config.scroll_delay_ms,
        config.scroll_jitter_min_ms,
        config.scroll_jitter_max_ms,
    );

    let session = WebDriverSession::connect(webdriver_config(config))
        .await
        .with_context(|| format!("starting browser session at {}", config.webdriver_url))?;

    let mut collector = Collector::new(session, delay, limits, cancel);
    let result = collector.collect_all(&tags, &mut seen).await;

    if let Err(e) = collector.into_session().close().await {
        tracing::warn!(error = %e, "failed to close browser session");
    }

    let report = match result {
        Ok(report) => report,
        Err(CollectorError::Cancelled) => {
            anyhow::bail!("collection cancelled before any posts were retained")
        }
        Err(e) => return Err(e.into()),
    };

    for summary in &report.hashtags {
        tracing::info!(
            hashtag = %summary.hashtag,
            collected = summary.collected,
            scrolls = summary.scrolls,
            duplicates = summary.duplicates_skipped,
            failures = summary.extraction_failures,
            stop = ?summary.stop,
            "hashtag summary"
        );
    }

    let paths = tagpulse_store::write_raw_posts(&config.data_dir, started, &report.records)
        .context("saving raw posts")?;
    seen.persist()?;

    if report.cancelled {
        tracing::warn!(
            saved = report.records.len(),
            "collection cancelled; saved partial results"
        );
    }
    println!(
        "collected {} posts across {} hashtags ({} failed) -> {}",
        report.records.len(),
        report.hashtags.len(),
        report.failed_hashtags(),
        paths.parquet.display()
    );

    Ok(Some(paths))
}
