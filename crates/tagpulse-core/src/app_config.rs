use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    pub log_dir: PathBuf,
    pub data_dir: PathBuf,
    pub features_dir: PathBuf,
    pub signals_dir: PathBuf,
    pub hashtags_path: PathBuf,
    pub seen_set_path: Option<PathBuf>,
    pub webdriver_url: String,
    pub feed_base_url: String,
    pub headless: bool,
    pub twitter_auth_token: Option<String>,
    pub twitter_ct0: Option<String>,
    pub max_posts: usize,
    pub max_scrolls: usize,
    pub scroll_pixels: u32,
    pub scroll_delay_ms: u64,
    pub scroll_jitter_min_ms: u64,
    pub scroll_jitter_max_ms: u64,
    pub nav_settle_ms: u64,
    pub nav_timeout_secs: u64,
    pub max_retries: u32,
    pub retry_backoff_base_secs: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("log_dir", &self.log_dir)
            .field("data_dir", &self.data_dir)
            .field("features_dir", &self.features_dir)
            .field("signals_dir", &self.signals_dir)
            .field("hashtags_path", &self.hashtags_path)
            .field("seen_set_path", &self.seen_set_path)
            .field("webdriver_url", &self.webdriver_url)
            .field("feed_base_url", &self.feed_base_url)
            .field("headless", &self.headless)
            .field(
                "twitter_auth_token",
                &self.twitter_auth_token.as_ref().map(|_| "[redacted]"),
            )
            .field(
                "twitter_ct0",
                &self.twitter_ct0.as_ref().map(|_| "[redacted]"),
            )
            .field("max_posts", &self.max_posts)
            .field("max_scrolls", &self.max_scrolls)
            .field("scroll_pixels", &self.scroll_pixels)
            .field("scroll_delay_ms", &self.scroll_delay_ms)
            .field("scroll_jitter_min_ms", &self.scroll_jitter_min_ms)
            .field("scroll_jitter_max_ms", &self.scroll_jitter_max_ms)
            .field("nav_settle_ms", &self.nav_settle_ms)
            .field("nav_timeout_secs", &self.nav_timeout_secs)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_base_secs", &self.retry_backoff_base_secs)
            .finish()
    }
}

impl AppConfig {
    /// Returns the session cookie pair when both halves are configured.
    #[must_use]
    pub fn session_cookies(&self) -> Option<(&str, &str)> {
        match (&self.twitter_auth_token, &self.twitter_ct0) {
            (Some(a), Some(c)) => Some((a.as_str(), c.as_str())),
            _ => None,
        }
    }
}
