//! Content addressing for candidate posts.

use std::fmt;

use sha2::{Digest, Sha256};

/// Hex digest of `author|timestamp|body` used as the dedup key.
///
/// This is a dedup key only; nothing relies on it being unguessable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentHash(String);

impl ContentHash {
    /// Wraps an already-computed digest, e.g. one read back from a seen-set file.
    #[must_use]
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim();
        if hex.len() == 64 && hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            Some(Self(hex.to_ascii_lowercase()))
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Derives the content hash of a post. The body is trimmed before hashing so
/// that render-time whitespace differences do not defeat dedup.
#[must_use]
pub fn content_hash(author: &str, timestamp: &str, body: &str) -> ContentHash {
    let base = format!("{author}|{timestamp}|{}", body.trim());
    ContentHash(format!("{:x}", Sha256::digest(base.as_bytes())))
}
