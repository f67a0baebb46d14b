//! Table locations for each pipeline stage.

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;

use crate::error::StoreError;

const RAW_PREFIX: &str = "tweets_";
const RUN_STAMP_FORMAT: &str = "%Y%m%d_%H%M";

/// File stem of the keyword-scored table under the features directory.
pub const SCORED_STEM: &str = "tweets_with_keywordscore";
/// File name of the daily signal table under the signals directory.
pub const DAILY_SIGNALS_FILE: &str = "daily_aggregated_signals.csv";

/// A table written in both CSV and Parquet form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TablePaths {
    pub csv: PathBuf,
    pub parquet: PathBuf,
}

impl TablePaths {
    fn from_stem(dir: &Path, stem: &str) -> Self {
        Self {
            csv: dir.join(format!("{stem}.csv")),
            parquet: dir.join(format!("{stem}.parquet")),
        }
    }
}

/// Raw table paths for a collection run started at `started`,
/// e.g. `tweets_20250801_0915.csv`.
#[must_use]
pub fn run_stamped_paths(data_dir: &Path, started: NaiveDateTime) -> TablePaths {
    let stem = format!("{RAW_PREFIX}{}", started.format(RUN_STAMP_FORMAT));
    TablePaths::from_stem(data_dir, &stem)
}

#[must_use]
pub fn scored_paths(features_dir: &Path) -> TablePaths {
    TablePaths::from_stem(features_dir, SCORED_STEM)
}

#[must_use]
pub fn daily_signals_path(signals_dir: &Path) -> PathBuf {
    signals_dir.join(DAILY_SIGNALS_FILE)
}

/// Finds the most recent run-stamped raw Parquet table in `data_dir`.
///
/// Run stamps sort chronologically, so the lexicographically greatest name wins.
///
/// # Errors
///
/// Returns [`StoreError::InputMissing`] if the directory is absent or holds no
/// raw tables.
pub fn latest_raw_parquet(data_dir: &Path) -> Result<PathBuf, StoreError> {
    let entries = match std::fs::read_dir(data_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(StoreError::InputMissing(data_dir.to_path_buf()));
        }
        Err(e) => return Err(StoreError::io(data_dir, e)),
    };

    entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(RAW_PREFIX) && n.ends_with(".parquet"))
        })
        .max()
        .ok_or_else(|| StoreError::InputMissing(data_dir.join(format!("{RAW_PREFIX}*.parquet"))))
}

pub(crate) fn ensure_parent(path: &Path) -> Result<(), StoreError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))
        }
        _ => Ok(()),
    }
}
