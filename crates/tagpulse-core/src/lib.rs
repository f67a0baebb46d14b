//! Shared domain types and configuration for tagpulse.

pub mod app_config;
pub mod config;
pub mod hashtags;
pub mod posts;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use hashtags::{load_hashtags, HashtagConfig, HashtagsFile};
pub use posts::{DailySignal, PostRecord, ScoredPost, Sentiment, NOT_AVAILABLE};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read hashtags file {path}: {source}")]
    HashtagsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse hashtags file: {0}")]
    HashtagsFileParse(#[from] serde_yaml::Error),

    #[error("config validation error: {0}")]
    Validation(String),
}
