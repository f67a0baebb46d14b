use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

fn default_enabled() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HashtagConfig {
    /// Query tag including the leading `#`, e.g. `#nifty50`.
    pub tag: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct HashtagsFile {
    pub hashtags: Vec<HashtagConfig>,
}

impl HashtagsFile {
    /// Tags marked `enabled`, in file order.
    #[must_use]
    pub fn enabled_tags(&self) -> Vec<String> {
        self.hashtags
            .iter()
            .filter(|h| h.enabled)
            .map(|h| h.tag.trim().to_string())
            .collect()
    }
}

/// Load and validate the hashtag watchlist from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_hashtags(path: &Path) -> Result<HashtagsFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::HashtagsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let file: HashtagsFile = serde_yaml::from_str(&content)?;
    validate_hashtags(&file.hashtags)?;

    Ok(file)
}

/// Validate a list of hashtag queries.
///
/// # Errors
///
/// Returns `ConfigError::Validation` for an empty tag, a tag without the
/// leading `#`, a tag containing whitespace, or a case-insensitive duplicate.
pub fn validate_hashtags(hashtags: &[HashtagConfig]) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();

    for entry in hashtags {
        let tag = entry.tag.trim();
        if tag.len() < 2 {
            return Err(ConfigError::Validation(format!(
                "hashtag '{}' is empty",
                entry.tag
            )));
        }

        if !tag.starts_with('#') {
            return Err(ConfigError::Validation(format!(
                "hashtag '{tag}' must start with '#'"
            )));
        }

        if tag.chars().any(char::is_whitespace) {
            return Err(ConfigError::Validation(format!(
                "hashtag '{tag}' must not contain whitespace"
            )));
        }

        if !seen.insert(tag.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate hashtag: '{tag}'"
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "hashtags_test.rs"]
mod tests;
