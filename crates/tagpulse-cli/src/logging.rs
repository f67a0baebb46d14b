//! Per-stage log files.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Context;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

pub(crate) fn log_path(log_dir: &Path, stage: &str) -> PathBuf {
    log_dir.join(format!("{stage}.log"))
}

/// Installs the global subscriber: stderr output plus an append-only,
/// ANSI-free `<log_dir>/<stage>.log`.
///
/// `RUST_LOG` takes precedence over the configured log level.
pub(crate) fn init(config: &tagpulse_core::AppConfig, stage: &str) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;

    std::fs::create_dir_all(&config.log_dir)
        .with_context(|| format!("creating log directory {}", config.log_dir.display()))?;
    let path = log_path(&config.log_dir, stage);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("opening log file {}", path.display()))?;

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        .try_init()
        .context("installing tracing subscriber")?;

    tracing::info!(stage, log_file = %path.display(), env = %config.env, "logging initialized");
    Ok(())
}
