//! Header-first CSV tables via serde.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::StoreError;
use crate::paths::ensure_parent;

/// Writes `rows` to `path` with a header row, replacing any existing file.
///
/// # Errors
///
/// Returns [`StoreError`] if the parent directory or file cannot be written.
pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), StoreError> {
    ensure_parent(path)?;
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush().map_err(|e| StoreError::io(path, e))?;
    tracing::debug!(path = %path.display(), rows = rows.len(), "wrote csv table");
    Ok(())
}

/// Reads every row of a header-first CSV table.
///
/// # Errors
///
/// - [`StoreError::InputMissing`] if `path` does not exist.
/// - [`StoreError::Csv`] if a row does not match `T`.
pub fn read_csv<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, StoreError> {
    if !path.exists() {
        return Err(StoreError::InputMissing(path.to_path_buf()));
    }
    let mut reader = csv::Reader::from_path(path)?;
    let rows = reader.deserialize().collect::<Result<Vec<T>, _>>()?;
    tracing::debug!(path = %path.display(), rows = rows.len(), "read csv table");
    Ok(rows)
}
