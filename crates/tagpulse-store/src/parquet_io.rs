//! Snappy-compressed Parquet tables via Arrow record batches.

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, Int64Array, StringArray, UInt64Array};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use tagpulse_core::Sentiment;

use crate::error::StoreError;
use crate::paths::ensure_parent;
use crate::rows::{PostRow, ScoredRow};

fn post_fields() -> Vec<Field> {
    vec![
        Field::new("hashtag", DataType::Utf8, false),
        Field::new("username", DataType::Utf8, false),
        Field::new("timestamp", DataType::Utf8, false),
        Field::new("content", DataType::Utf8, false),
        Field::new("likes", DataType::UInt64, false),
        Field::new("retweets", DataType::UInt64, false),
        Field::new("mentions", DataType::Utf8, false),
        Field::new("hashtags", DataType::Utf8, false),
    ]
}

fn utf8<'a, T>(rows: &'a [T], field: impl Fn(&'a T) -> &'a str) -> ArrayRef {
    Arc::new(StringArray::from_iter_values(rows.iter().map(field)))
}

fn uint64<T>(rows: &[T], field: impl Fn(&T) -> u64) -> ArrayRef {
    Arc::new(UInt64Array::from_iter_values(rows.iter().map(field)))
}

fn write_batch(path: &Path, batch: &RecordBatch) -> Result<(), StoreError> {
    ensure_parent(path)?;
    let file = File::create(path).map_err(|e| StoreError::io(path, e))?;
    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();
    let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props))?;
    writer.write(batch)?;
    writer.close()?;
    tracing::debug!(path = %path.display(), rows = batch.num_rows(), "wrote parquet table");
    Ok(())
}

/// Writes raw post rows, replacing any existing file.
///
/// # Errors
///
/// Returns [`StoreError`] if the batch cannot be built or the file written.
pub fn write_posts_parquet(path: &Path, rows: &[PostRow]) -> Result<(), StoreError> {
    let schema = Arc::new(Schema::new(post_fields()));
    let batch = RecordBatch::try_new(
        schema,
        vec![
            utf8(rows, |r| r.hashtag.as_str()),
            utf8(rows, |r| r.username.as_str()),
            utf8(rows, |r| r.timestamp.as_str()),
            utf8(rows, |r| r.content.as_str()),
            uint64(rows, |r| r.likes),
            uint64(rows, |r| r.retweets),
            utf8(rows, |r| r.mentions.as_str()),
            utf8(rows, |r| r.hashtags.as_str()),
        ],
    )?;
    write_batch(path, &batch)
}

/// Writes scored post rows, replacing any existing file.
///
/// # Errors
///
/// Returns [`StoreError`] if the batch cannot be built or the file written.
pub fn write_scored_parquet(path: &Path, rows: &[ScoredRow]) -> Result<(), StoreError> {
    let mut fields = post_fields();
    fields.push(Field::new("keyword_score", DataType::Int64, false));
    fields.push(Field::new("sentiment", DataType::Utf8, true));
    let schema = Arc::new(Schema::new(fields));

    let scores: ArrayRef = Arc::new(Int64Array::from_iter_values(
        rows.iter().map(|r| r.keyword_score),
    ));
    let sentiments: ArrayRef = Arc::new(StringArray::from(
        rows.iter()
            .map(|r| r.sentiment.map(Sentiment::as_str))
            .collect::<Vec<_>>(),
    ));

    let batch = RecordBatch::try_new(
        schema,
        vec![
            utf8(rows, |r| r.hashtag.as_str()),
            utf8(rows, |r| r.username.as_str()),
            utf8(rows, |r| r.timestamp.as_str()),
            utf8(rows, |r| r.content.as_str()),
            uint64(rows, |r| r.likes),
            uint64(rows, |r| r.retweets),
            utf8(rows, |r| r.mentions.as_str()),
            utf8(rows, |r| r.hashtags.as_str()),
            scores,
            sentiments,
        ],
    )?;
    write_batch(path, &batch)
}

fn read_batches(path: &Path) -> Result<Vec<RecordBatch>, StoreError> {
    if !path.exists() {
        return Err(StoreError::InputMissing(path.to_path_buf()));
    }
    let file = File::open(path).map_err(|e| StoreError::io(path, e))?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;
    let batches = reader.collect::<Result<Vec<_>, _>>()?;
    Ok(batches)
}

/// Reads a Utf8 column; absent `optional` columns read as all-null.
fn strings(
    batch: &RecordBatch,
    name: &str,
    optional: bool,
    path: &Path,
) -> Result<Vec<Option<String>>, StoreError> {
    let Some(column) = batch.column_by_name(name) else {
        if optional {
            return Ok(vec![None; batch.num_rows()]);
        }
        return Err(StoreError::schema(path, format!("missing column '{name}'")));
    };
    let array = column
        .as_any()
        .downcast_ref::<StringArray>()
        .ok_or_else(|| StoreError::schema(path, format!("column '{name}' is not utf8")))?;
    Ok((0..array.len())
        .map(|i| (!array.is_null(i)).then(|| array.value(i).to_string()))
        .collect())
}

fn required_strings(batch: &RecordBatch, name: &str, path: &Path) -> Result<Vec<String>, StoreError> {
    Ok(strings(batch, name, false, path)?
        .into_iter()
        .map(Option::unwrap_or_default)
        .collect())
}

fn optional_strings(batch: &RecordBatch, name: &str, path: &Path) -> Result<Vec<String>, StoreError> {
    Ok(strings(batch, name, true, path)?
        .into_iter()
        .map(Option::unwrap_or_default)
        .collect())
}

/// Reads an integer column as `u64`; nulls and negatives read as 0, and an
/// absent `optional` column reads as all zeros.
fn counts(
    batch: &RecordBatch,
    name: &str,
    optional: bool,
    path: &Path,
) -> Result<Vec<u64>, StoreError> {
    let Some(column) = batch.column_by_name(name) else {
        if optional {
            return Ok(vec![0; batch.num_rows()]);
        }
        return Err(StoreError::schema(path, format!("missing column '{name}'")));
    };
    let casted = cast(column, &DataType::UInt64)?;
    let array = casted
        .as_any()
        .downcast_ref::<UInt64Array>()
        .ok_or_else(|| StoreError::schema(path, format!("column '{name}' is not an integer")))?;
    Ok((0..array.len())
        .map(|i| if array.is_null(i) { 0 } else { array.value(i) })
        .collect())
}

fn scores(batch: &RecordBatch, name: &str, path: &Path) -> Result<Vec<i64>, StoreError> {
    let column = batch
        .column_by_name(name)
        .ok_or_else(|| StoreError::schema(path, format!("missing column '{name}'")))?;
    let casted = cast(column, &DataType::Int64)?;
    let array = casted
        .as_any()
        .downcast_ref::<Int64Array>()
        .ok_or_else(|| StoreError::schema(path, format!("column '{name}' is not an integer")))?;
    Ok((0..array.len())
        .map(|i| if array.is_null(i) { 0 } else { array.value(i) })
        .collect())
}

/// Reads the post columns. With `metadata_optional`, only `timestamp` and
/// `content` must be present.
fn post_rows(
    batch: &RecordBatch,
    metadata_optional: bool,
    path: &Path,
) -> Result<Vec<PostRow>, StoreError> {
    let metadata = |name: &str| -> Result<Vec<String>, StoreError> {
        if metadata_optional {
            optional_strings(batch, name, path)
        } else {
            required_strings(batch, name, path)
        }
    };
    let hashtag = metadata("hashtag")?;
    let username = metadata("username")?;
    let timestamp = required_strings(batch, "timestamp", path)?;
    let content = required_strings(batch, "content", path)?;
    let likes = counts(batch, "likes", metadata_optional, path)?;
    let retweets = counts(batch, "retweets", metadata_optional, path)?;
    let mentions = optional_strings(batch, "mentions", path)?;
    let hashtags = optional_strings(batch, "hashtags", path)?;

    let mut rows = Vec::with_capacity(batch.num_rows());
    let columns = hashtag
        .into_iter()
        .zip(username)
        .zip(timestamp)
        .zip(content)
        .zip(likes.into_iter().zip(retweets))
        .zip(mentions.into_iter().zip(hashtags));
    for (((((hashtag, username), timestamp), content), (likes, retweets)), (mentions, hashtags)) in
        columns
    {
        rows.push(PostRow {
            hashtag,
            username,
            timestamp,
            content,
            likes,
            retweets,
            mentions,
            hashtags,
        });
    }
    Ok(rows)
}

/// Reads every raw post row.
///
/// # Errors
///
/// - [`StoreError::InputMissing`] if `path` does not exist.
/// - [`StoreError::Schema`] if a required column is absent or mistyped.
pub fn read_posts_parquet(path: &Path) -> Result<Vec<PostRow>, StoreError> {
    let mut rows = Vec::new();
    for batch in read_batches(path)? {
        rows.extend(post_rows(&batch, false, path)?);
    }
    tracing::debug!(path = %path.display(), rows = rows.len(), "read parquet table");
    Ok(rows)
}

/// Reads every scored post row.
///
/// Only `timestamp`, `content` and `keyword_score` are required; `sentiment`
/// and the post metadata columns default when absent.
///
/// # Errors
///
/// - [`StoreError::InputMissing`] if `path` does not exist.
/// - [`StoreError::Schema`] if a required column is absent or a label is unknown.
pub fn read_scored_parquet(path: &Path) -> Result<Vec<ScoredRow>, StoreError> {
    let mut rows = Vec::new();
    for batch in read_batches(path)? {
        let posts = post_rows(&batch, true, path)?;
        let keyword_scores = scores(&batch, "keyword_score", path)?;
        let sentiments = strings(&batch, "sentiment", true, path)?;

        for ((post, keyword_score), sentiment) in posts.into_iter().zip(keyword_scores).zip(sentiments) {
            let sentiment = sentiment
                .filter(|s| !s.trim().is_empty())
                .map(|s| s.parse::<Sentiment>())
                .transpose()
                .map_err(|reason| StoreError::schema(path, reason))?;
            rows.push(ScoredRow {
                hashtag: post.hashtag,
                username: post.username,
                timestamp: post.timestamp,
                content: post.content,
                likes: post.likes,
                retweets: post.retweets,
                mentions: post.mentions,
                hashtags: post.hashtags,
                keyword_score,
                sentiment,
            });
        }
    }
    tracing::debug!(path = %path.display(), rows = rows.len(), "read parquet table");
    Ok(rows)
}
