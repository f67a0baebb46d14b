use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can drive it with a `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var).ok().filter(|v| !v.trim().is_empty())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_bool = |var: &str, default: &str| -> Result<bool, ConfigError> {
        let raw = or_default(var, default);
        match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" => Ok(true),
            "0" | "false" | "no" => Ok(false),
            _ => Err(invalid(var, format!("expected a boolean, got '{raw}'"))),
        }
    };

    let env = parse_environment(&or_default("TAGPULSE_ENV", "development"))?;
    let log_level = or_default("TAGPULSE_LOG_LEVEL", "info");

    let log_dir = PathBuf::from(or_default("TAGPULSE_LOG_DIR", "./logs"));
    let data_dir = PathBuf::from(or_default("TAGPULSE_DATA_DIR", "./data"));
    let features_dir = PathBuf::from(or_default("TAGPULSE_FEATURES_DIR", "./features"));
    let signals_dir = PathBuf::from(or_default("TAGPULSE_SIGNALS_DIR", "./signals"));
    let hashtags_path = PathBuf::from(or_default(
        "TAGPULSE_HASHTAGS_PATH",
        "./config/hashtags.yaml",
    ));
    let seen_set_path = optional("TAGPULSE_SEEN_SET_PATH").map(PathBuf::from);

    let webdriver_url = or_default("TAGPULSE_WEBDRIVER_URL", "http://localhost:9515");
    let feed_base_url = or_default("TAGPULSE_FEED_BASE_URL", "https://x.com");
    let headless = parse_bool("TAGPULSE_HEADLESS", "false")?;
    let twitter_auth_token = optional("TWITTER_AUTH_TOKEN");
    let twitter_ct0 = optional("TWITTER_CT0");

    let max_posts = parse_usize("TAGPULSE_MAX_POSTS", "2000")?;
    let max_scrolls = parse_usize("TAGPULSE_MAX_SCROLLS", "150")?;
    let scroll_pixels = parse_u32("TAGPULSE_SCROLL_PIXELS", "3000")?;
    let scroll_delay_ms = parse_u64("TAGPULSE_SCROLL_DELAY_MS", "1500")?;
    let scroll_jitter_min_ms = parse_u64("TAGPULSE_SCROLL_JITTER_MIN_MS", "200")?;
    let scroll_jitter_max_ms = parse_u64("TAGPULSE_SCROLL_JITTER_MAX_MS", "600")?;
    let nav_settle_ms = parse_u64("TAGPULSE_NAV_SETTLE_MS", "5000")?;
    let nav_timeout_secs = parse_u64("TAGPULSE_NAV_TIMEOUT_SECS", "60")?;
    let max_retries = parse_u32("TAGPULSE_MAX_RETRIES", "3")?;
    let retry_backoff_base_secs = parse_u64("TAGPULSE_RETRY_BACKOFF_BASE_SECS", "5")?;

    if scroll_jitter_min_ms > scroll_jitter_max_ms {
        return Err(ConfigError::Validation(format!(
            "TAGPULSE_SCROLL_JITTER_MIN_MS ({scroll_jitter_min_ms}) exceeds \
             TAGPULSE_SCROLL_JITTER_MAX_MS ({scroll_jitter_max_ms})"
        )));
    }

    if max_posts == 0 {
        return Err(invalid("TAGPULSE_MAX_POSTS", "must be at least 1".to_string()));
    }

    Ok(AppConfig {
        env,
        log_level,
        log_dir,
        data_dir,
        features_dir,
        signals_dir,
        hashtags_path,
        seen_set_path,
        webdriver_url,
        feed_base_url,
        headless,
        twitter_auth_token,
        twitter_ct0,
        max_posts,
        max_scrolls,
        scroll_pixels,
        scroll_delay_ms,
        scroll_jitter_min_ms,
        scroll_jitter_max_ms,
        nav_settle_ms,
        nav_timeout_secs,
        max_retries,
        retry_backoff_base_secs,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for anything other than
/// `development`, `test`, or `production`.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "TAGPULSE_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
