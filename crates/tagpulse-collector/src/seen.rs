//! The set of content hashes already retained by a collection run.

use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::CollectorError;
use crate::hasher::ContentHash;

/// Monotonically growing set of [`ContentHash`] values.
///
/// By default the set lives only for one multi-hashtag run. When built with
/// [`SeenSet::load`] it is backed by a file of one hash per line, and
/// [`SeenSet::persist`] appends whatever was inserted since loading.
#[derive(Debug, Default)]
pub struct SeenSet {
    hashes: HashSet<ContentHash>,
    added: Vec<ContentHash>,
    backing: Option<PathBuf>,
}

impl SeenSet {
    /// An empty, run-scoped set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a file-backed set. A missing file is treated as empty; malformed
    /// lines are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns [`CollectorError::SeenSetIo`] if the file exists but cannot be read.
    pub fn load(path: &Path) -> Result<Self, CollectorError> {
        let mut set = Self {
            backing: Some(path.to_path_buf()),
            ..Self::default()
        };

        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(set),
            Err(e) => {
                return Err(CollectorError::SeenSetIo {
                    path: path.display().to_string(),
                    source: e,
                })
            }
        };

        for (line_no, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match ContentHash::from_hex(line) {
                Some(hash) => {
                    set.hashes.insert(hash);
                }
                None => tracing::warn!(
                    path = %path.display(),
                    line = line_no + 1,
                    "skipping malformed seen-set entry"
                ),
            }
        }

        tracing::info!(
            path = %path.display(),
            count = set.hashes.len(),
            "loaded persisted seen set"
        );
        Ok(set)
    }

    #[must_use]
    pub fn contains(&self, hash: &ContentHash) -> bool {
        self.hashes.contains(hash)
    }

    /// Inserts `hash`, returning `true` if it was not already present.
    pub fn insert(&mut self, hash: ContentHash) -> bool {
        if self.hashes.insert(hash.clone()) {
            self.added.push(hash);
            true
        } else {
            false
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }

    /// Number of hashes inserted since the set was created or loaded.
    #[must_use]
    pub fn added_count(&self) -> usize {
        self.added.len()
    }

    /// Appends newly inserted hashes to the backing file. A run-scoped set is
    /// a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`CollectorError::SeenSetIo`] if the file cannot be written.
    pub fn persist(&mut self) -> Result<(), CollectorError> {
        let Some(path) = &self.backing else {
            return Ok(());
        };
        if self.added.is_empty() {
            return Ok(());
        }

        let io_err = |source| CollectorError::SeenSetIo {
            path: path.display().to_string(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }

        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(io_err)?;

        let mut buf = String::with_capacity(self.added.len() * 65);
        for hash in &self.added {
            buf.push_str(hash.as_str());
            buf.push('\n');
        }
        file.write_all(buf.as_bytes()).map_err(io_err)?;

        tracing::info!(
            path = %path.display(),
            appended = self.added.len(),
            "persisted seen set"
        );
        self.added.clear();
        Ok(())
    }
}
