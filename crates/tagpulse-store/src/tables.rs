//! Stage-level table reads and writes.
//!
//! Raw and scored tables are written in both CSV and Parquet form; readers
//! pick the format from the file extension.

use std::path::Path;

use chrono::NaiveDateTime;
use tagpulse_core::{DailySignal, PostRecord, ScoredPost};

use crate::csv_io::{read_csv, write_csv};
use crate::error::StoreError;
use crate::parquet_io::{
    read_posts_parquet, read_scored_parquet, write_posts_parquet, write_scored_parquet,
};
use crate::paths::{run_stamped_paths, scored_paths, TablePaths};
use crate::rows::{PostRow, ScoredRow};

enum Format {
    Csv,
    Parquet,
}

fn format_of(path: &Path) -> Result<Format, StoreError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("csv") => Ok(Format::Csv),
        Some(ext) if ext.eq_ignore_ascii_case("parquet") => Ok(Format::Parquet),
        _ => Err(StoreError::UnsupportedFormat(path.to_path_buf())),
    }
}

/// Writes one collection run's posts as run-stamped CSV and Parquet tables.
///
/// # Errors
///
/// Returns [`StoreError`] if either table cannot be written.
pub fn write_raw_posts(
    data_dir: &Path,
    started: NaiveDateTime,
    posts: &[PostRecord],
) -> Result<TablePaths, StoreError> {
    let paths = run_stamped_paths(data_dir, started);
    let rows: Vec<PostRow> = posts.iter().map(PostRow::from).collect();
    write_csv(&paths.csv, &rows)?;
    write_posts_parquet(&paths.parquet, &rows)?;
    tracing::info!(
        csv = %paths.csv.display(),
        parquet = %paths.parquet.display(),
        rows = rows.len(),
        "saved raw posts"
    );
    Ok(paths)
}

/// Reads a raw post table in either format.
///
/// # Errors
///
/// - [`StoreError::InputMissing`] if `path` does not exist.
/// - [`StoreError::UnsupportedFormat`] for extensions other than `.csv`/`.parquet`.
pub fn read_posts(path: &Path) -> Result<Vec<PostRecord>, StoreError> {
    let rows: Vec<PostRow> = match format_of(path)? {
        Format::Csv => read_csv(path)?,
        Format::Parquet => read_posts_parquet(path)?,
    };
    Ok(rows.into_iter().map(PostRecord::from).collect())
}

/// Writes the keyword-scored table in both formats under `features_dir`.
///
/// # Errors
///
/// Returns [`StoreError`] if either table cannot be written.
pub fn write_scored_posts(
    features_dir: &Path,
    posts: &[ScoredPost],
) -> Result<TablePaths, StoreError> {
    let paths = scored_paths(features_dir);
    let rows: Vec<ScoredRow> = posts.iter().map(ScoredRow::from).collect();
    write_csv(&paths.csv, &rows)?;
    write_scored_parquet(&paths.parquet, &rows)?;
    tracing::info!(
        csv = %paths.csv.display(),
        parquet = %paths.parquet.display(),
        rows = rows.len(),
        "saved scored posts"
    );
    Ok(paths)
}

/// Reads a scored post table in either format.
///
/// # Errors
///
/// - [`StoreError::InputMissing`] if `path` does not exist.
/// - [`StoreError::UnsupportedFormat`] for extensions other than `.csv`/`.parquet`.
pub fn read_scored_rows(path: &Path) -> Result<Vec<ScoredRow>, StoreError> {
    match format_of(path)? {
        Format::Csv => read_csv(path),
        Format::Parquet => read_scored_parquet(path),
    }
}

/// Rewrites the daily signal table at `path`.
///
/// # Errors
///
/// Returns [`StoreError`] if the table cannot be written.
pub fn write_daily_signals(path: &Path, rows: &[DailySignal]) -> Result<(), StoreError> {
    write_csv(path, rows)?;
    tracing::info!(path = %path.display(), days = rows.len(), "saved daily signals");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tagpulse_core::Sentiment;

    fn temp_dir(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "tagpulse-tables-{}-{name}",
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    fn started() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 8, 1)
            .unwrap()
            .and_hms_opt(9, 15, 0)
            .unwrap()
    }

    fn post(body: &str) -> PostRecord {
        PostRecord {
            hashtag: "#nifty50".to_string(),
            author: "Alice".to_string(),
            timestamp: "2025-08-01T09:15:00.000Z".to_string(),
            body: body.to_string(),
            like_count: 1200,
            repost_count: 4,
            mentions: vec!["@bob".to_string()],
            hashtags_found: vec!["#nifty50".to_string(), "#sensex".to_string()],
        }
    }

    #[test]
    fn raw_posts_read_back_from_both_formats() {
        let dir = temp_dir("raw");
        let posts = vec![post("Nifty breakout, target 20000"), post("flat day")];
        let paths = write_raw_posts(&dir, started(), &posts).unwrap();

        assert!(paths.csv.ends_with("tweets_20250801_0915.csv"));
        assert_eq!(read_posts(&paths.csv).unwrap(), posts);
        assert_eq!(read_posts(&paths.parquet).unwrap(), posts);
    }

    #[test]
    fn raw_csv_header_matches_table_layout() {
        let dir = temp_dir("header");
        let paths = write_raw_posts(&dir, started(), &[post("x")]).unwrap();
        let text = std::fs::read_to_string(&paths.csv).unwrap();
        assert_eq!(
            text.lines().next().unwrap(),
            "hashtag,username,timestamp,content,likes,retweets,mentions,hashtags"
        );
        assert!(text.contains("\"#nifty50, #sensex\""));
    }

    #[test]
    fn scored_posts_read_back_with_labels() {
        let dir = temp_dir("scored");
        let scored = vec![ScoredPost {
            post: post("go long"),
            sentiment: Sentiment::Buy,
            keyword_score: 1,
        }];
        let paths = write_scored_posts(&dir, &scored).unwrap();
        assert!(paths
            .parquet
            .ends_with("tweets_with_keywordscore.parquet"));

        for path in [&paths.csv, &paths.parquet] {
            let rows = read_scored_rows(path).unwrap();
            let (post_back, score, sentiment) = rows[0].clone().into_parts();
            assert_eq!(post_back, scored[0].post);
            assert_eq!(score, 1);
            assert_eq!(sentiment, Some(Sentiment::Buy));
        }
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let dir = temp_dir("ext");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("posts.json");
        std::fs::write(&path, b"[]").unwrap();
        assert!(matches!(
            read_posts(&path),
            Err(StoreError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn daily_signals_are_rewritten_not_appended() {
        let dir = temp_dir("daily");
        let path = dir.join("daily_aggregated_signals.csv");
        let row = DailySignal {
            date: NaiveDate::from_ymd_opt(2025, 8, 1).unwrap(),
            tweet_volume: 3,
            buy_pct: 0.667,
            sell_pct: 0.0,
            neutral_pct: 0.333,
            avg_keyword_score: 1.0,
            composite_score: 0.395,
            signal: Sentiment::Neutral,
            confidence_pct: 39.5,
        };
        write_daily_signals(&path, &[row.clone()]).unwrap();
        write_daily_signals(&path, &[row]).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            "date,tweet_volume,buy_pct,sell_pct,neutral_pct,avg_keyword_score,composite_score,signal,confidence_pct"
        );
        assert!(lines[1].starts_with("2025-08-01,3,0.667,"));
        assert!(lines[1].contains(",neutral,39.5"));
    }
}
