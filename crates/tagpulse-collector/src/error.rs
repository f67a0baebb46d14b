use thiserror::Error;

#[derive(Debug, Error)]
pub enum CollectorError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The WebDriver endpoint answered with a protocol-level error object.
    #[error("webdriver error '{error}' during {command}: {message}")]
    WebDriver {
        command: String,
        error: String,
        message: String,
    },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    /// A single post container could not be read; the scroll loop skips it.
    #[error("extraction failed: {0}")]
    Extraction(String),

    #[error("invalid feed URL \"{url}\": {reason}")]
    InvalidFeedUrl { url: String, reason: String },

    #[error("seen-set file {path}: {source}")]
    SeenSetIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("collection cancelled")]
    Cancelled,

    /// Every hashtag was attempted and nothing was retained.
    #[error("no data collected across {attempted} hashtags ({failed} failed)")]
    NoDataCollected { attempted: usize, failed: usize },
}
