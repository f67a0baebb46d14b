//! File-backed tables for each pipeline stage.
//!
//! Raw collection runs land as run-stamped CSV and Parquet pairs, the scoring
//! stage writes a fixed-name feature table, and the aggregator rewrites a
//! single daily signal CSV.

pub mod csv_io;
pub mod error;
pub mod parquet_io;
pub mod paths;
pub mod rows;
pub mod tables;

pub use error::StoreError;
pub use paths::{
    daily_signals_path, latest_raw_parquet, run_stamped_paths, scored_paths, TablePaths,
};
pub use rows::{PostRow, ScoredRow};
pub use tables::{
    read_posts, read_scored_rows, write_daily_signals, write_raw_posts, write_scored_posts,
};
