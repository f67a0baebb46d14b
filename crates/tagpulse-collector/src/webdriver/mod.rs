//! [`FeedSession`] backed by a W3C WebDriver endpoint (chromedriver,
//! geckodriver, Selenium).
//!
//! Every browser action is one HTTP command against the driver; the session
//! is authenticated by installing the feed's `auth_token` and `ct0` cookies
//! before the first search.

mod protocol;

use std::time::Duration;

use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use reqwest::{Client, Method};
use serde::Serialize;
use serde_json::{json, Value};

use crate::error::CollectorError;
use crate::retry::retry_with_backoff;
use crate::session::{FeedSession, RawPost};

use protocol::{
    chrome_capabilities, element_ids, Cookie, Envelope, ErrorValue, FindRequest, NewSessionValue,
};

/// Selector for rendered posts; only containers carrying a timestamp count.
const POST_SELECTOR: &str = "article:has(time)";
const TIME_SELECTOR: &str = "time";
const AUTHOR_SELECTOR: &str = r#"div[data-testid="User-Name"] span"#;
const LIKE_SELECTOR: &str = r#"div[data-testid="like"] span"#;
const REPOST_SELECTOR: &str = r#"div[data-testid="retweet"] span"#;

/// Connection and pacing settings for [`WebDriverSession`].
#[derive(Debug, Clone)]
pub struct WebDriverConfig {
    pub webdriver_url: String,
    pub feed_base_url: String,
    pub headless: bool,
    /// `(auth_token, ct0)` cookie values for an authenticated session.
    pub cookies: Option<(String, String)>,
    pub scroll_pixels: u32,
    /// Wait after a navigation so the live feed can render.
    pub nav_settle: Duration,
    pub nav_timeout: Duration,
    pub max_retries: u32,
    pub retry_backoff_base_secs: u64,
}

impl Default for WebDriverConfig {
    fn default() -> Self {
        Self {
            webdriver_url: "http://localhost:9515".to_string(),
            feed_base_url: "https://x.com".to_string(),
            headless: false,
            cookies: None,
            scroll_pixels: 3000,
            nav_settle: Duration::from_secs(5),
            nav_timeout: Duration::from_secs(60),
            max_retries: 3,
            retry_backoff_base_secs: 5,
        }
    }
}

/// Handle to one rendered element in the driver's page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementRef(String);

impl ElementRef {
    #[must_use]
    pub fn id(&self) -> &str {
        &self.0
    }
}

/// A live WebDriver browser session.
pub struct WebDriverSession {
    client: Client,
    base: String,
    session_id: String,
    config: WebDriverConfig,
}

impl WebDriverSession {
    /// Starts a browser session and, when cookies are configured, signs it in.
    ///
    /// # Errors
    ///
    /// - [`CollectorError::Http`] if the driver is unreachable.
    /// - [`CollectorError::WebDriver`] if the driver refuses the session.
    /// - [`CollectorError::InvalidFeedUrl`] if the feed base URL has no host.
    pub async fn connect(config: WebDriverConfig) -> Result<Self, CollectorError> {
        let client = Client::builder()
            .timeout(config.nav_timeout + Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        let base = config.webdriver_url.trim_end_matches('/').to_string();

        let value = send_command(
            &client,
            Method::POST,
            &format!("{base}/session"),
            "new session",
            Some(&chrome_capabilities(config.headless)),
        )
        .await?;
        let created: NewSessionValue =
            serde_json::from_value(value).map_err(|e| CollectorError::Deserialize {
                context: "new session response".to_string(),
                source: e,
            })?;

        let session = Self {
            client,
            base,
            session_id: created.session_id,
            config,
        };
        tracing::info!(session_id = %session.session_id, "webdriver session started");

        #[allow(clippy::cast_possible_truncation)]
        let page_load_ms = session.config.nav_timeout.as_millis() as u64;
        session
            .command(
                Method::POST,
                "timeouts",
                "set timeouts",
                Some(&json!({ "pageLoad": page_load_ms })),
            )
            .await?;

        if let Some((auth_token, ct0)) = session.config.cookies.clone() {
            session.install_cookies(&auth_token, &ct0).await?;
        } else {
            tracing::warn!("no session cookies configured; feed may require sign-in");
        }

        Ok(session)
    }

    /// Builds the live-search URL for a hashtag query.
    ///
    /// # Errors
    ///
    /// Returns [`CollectorError::InvalidFeedUrl`] if `feed_base_url` does not parse.
    pub fn search_url(feed_base_url: &str, hashtag: &str) -> Result<String, CollectorError> {
        let base = feed_base_url.trim_end_matches('/');
        reqwest::Url::parse(base).map_err(|e| CollectorError::InvalidFeedUrl {
            url: feed_base_url.to_string(),
            reason: e.to_string(),
        })?;
        let query = utf8_percent_encode(hashtag, NON_ALPHANUMERIC);
        Ok(format!("{base}/search?q={query}&src=typed_query&f=live"))
    }

    #[must_use]
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Ends the browser session.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver rejects the delete command.
    pub async fn close(self) -> Result<(), CollectorError> {
        send_command::<()>(
            &self.client,
            Method::DELETE,
            &format!("{}/session/{}", self.base, self.session_id),
            "delete session",
            None,
        )
        .await?;
        tracing::info!(session_id = %self.session_id, "webdriver session closed");
        Ok(())
    }

    async fn install_cookies(&self, auth_token: &str, ct0: &str) -> Result<(), CollectorError> {
        let url = reqwest::Url::parse(&self.config.feed_base_url).map_err(|e| {
            CollectorError::InvalidFeedUrl {
                url: self.config.feed_base_url.clone(),
                reason: e.to_string(),
            }
        })?;
        let host = url.host_str().ok_or_else(|| CollectorError::InvalidFeedUrl {
            url: self.config.feed_base_url.clone(),
            reason: "no host".to_string(),
        })?;
        let domain = format!(".{host}");
        let secure = url.scheme() == "https";

        // Cookies can only be set for the domain currently loaded.
        self.navigate(url.as_str()).await?;

        for (name, value) in [("auth_token", auth_token), ("ct0", ct0)] {
            let cookie = Cookie {
                name,
                value,
                domain: &domain,
                path: "/",
                secure,
            };
            self.command(
                Method::POST,
                "cookie",
                "add cookie",
                Some(&json!({ "cookie": cookie })),
            )
            .await?;
        }
        tracing::info!(domain = %domain, "installed session cookies");
        Ok(())
    }

    async fn navigate(&self, url: &str) -> Result<(), CollectorError> {
        retry_with_backoff(
            self.config.max_retries,
            self.config.retry_backoff_base_secs,
            || async move {
                self.command(Method::POST, "url", "navigate", Some(&json!({ "url": url })))
                    .await
                    .map(|_| ())
                    .map_err(|e| match e {
                        // Page-load timeouts and network errors surface as these codes.
                        CollectorError::WebDriver { error, message, .. }
                            if error == "timeout" || error == "unknown error" =>
                        {
                            CollectorError::Navigation {
                                url: url.to_string(),
                                reason: message,
                            }
                        }
                        other => other,
                    })
            },
        )
        .await
    }

    async fn command<B: Serialize + Sync>(
        &self,
        method: Method,
        path: &str,
        name: &str,
        body: Option<&B>,
    ) -> Result<Value, CollectorError> {
        let url = format!("{}/session/{}/{path}", self.base, self.session_id);
        send_command(&self.client, method, &url, name, body).await
    }

    async fn find_within(
        &self,
        element: &ElementRef,
        selector: &str,
    ) -> Result<Option<ElementRef>, CollectorError> {
        let value = self
            .command(
                Method::POST,
                &format!("element/{}/elements", element.0),
                "find child elements",
                Some(&FindRequest::css(selector)),
            )
            .await?;
        Ok(element_ids(&value).into_iter().next().map(ElementRef))
    }

    async fn text_of(&self, element: &ElementRef) -> Result<String, CollectorError> {
        let value = self
            .command::<()>(
                Method::GET,
                &format!("element/{}/text", element.0),
                "element text",
                None,
            )
            .await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    async fn attribute_of(
        &self,
        element: &ElementRef,
        name: &str,
    ) -> Result<Option<String>, CollectorError> {
        let value = self
            .command::<()>(
                Method::GET,
                &format!("element/{}/attribute/{name}", element.0),
                "element attribute",
                None,
            )
            .await?;
        Ok(value.as_str().map(str::to_owned))
    }

    async fn child_text(
        &self,
        element: &ElementRef,
        selector: &str,
    ) -> Result<Option<String>, CollectorError> {
        match self.find_within(element, selector).await? {
            Some(child) => Ok(Some(self.text_of(&child).await?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl FeedSession for WebDriverSession {
    type Container = ElementRef;

    async fn open_feed(&mut self, hashtag: &str) -> Result<(), CollectorError> {
        let url = Self::search_url(&self.config.feed_base_url, hashtag)?;
        self.navigate(&url).await?;
        if !self.config.nav_settle.is_zero() {
            tokio::time::sleep(self.config.nav_settle).await;
        }
        Ok(())
    }

    async fn scroll(&mut self) -> Result<(), CollectorError> {
        self.command(
            Method::POST,
            "execute/sync",
            "scroll",
            Some(&json!({
                "script": "window.scrollBy(0, arguments[0]);",
                "args": [self.config.scroll_pixels]
            })),
        )
        .await?;
        Ok(())
    }

    async fn containers(&mut self) -> Result<Vec<ElementRef>, CollectorError> {
        let value = self
            .command(
                Method::POST,
                "elements",
                "find posts",
                Some(&FindRequest::css(POST_SELECTOR)),
            )
            .await?;
        Ok(element_ids(&value).into_iter().map(ElementRef).collect())
    }

    async fn extract(&mut self, container: &ElementRef) -> Result<RawPost, CollectorError> {
        let text = self
            .text_of(container)
            .await
            .map_err(|e| CollectorError::Extraction(format!("post text: {e}")))?;

        let timestamp = match self.find_within(container, TIME_SELECTOR).await {
            Ok(Some(time)) => self.attribute_of(&time, "datetime").await,
            Ok(None) => Ok(None),
            Err(e) => Err(e),
        }
        .map_err(|e| CollectorError::Extraction(format!("timestamp: {e}")))?;

        let author = self
            .child_text(container, AUTHOR_SELECTOR)
            .await
            .map_err(|e| CollectorError::Extraction(format!("author: {e}")))?;
        let likes = self
            .child_text(container, LIKE_SELECTOR)
            .await
            .map_err(|e| CollectorError::Extraction(format!("likes: {e}")))?;
        let reposts = self
            .child_text(container, REPOST_SELECTOR)
            .await
            .map_err(|e| CollectorError::Extraction(format!("reposts: {e}")))?;

        Ok(RawPost {
            text,
            timestamp,
            author,
            likes,
            reposts,
        })
    }
}

/// Sends one WebDriver command and unwraps the `value` envelope.
async fn send_command<B: Serialize + Sync>(
    client: &Client,
    method: Method,
    url: &str,
    name: &str,
    body: Option<&B>,
) -> Result<Value, CollectorError> {
    let mut request = client.request(method, url);
    if let Some(body) = body {
        request = request.json(body);
    }

    let response = request.send().await?;
    let status = response.status();
    let bytes = response.bytes().await?;

    if status.is_success() {
        let envelope: Envelope =
            serde_json::from_slice(&bytes).map_err(|e| CollectorError::Deserialize {
                context: format!("{name} response"),
                source: e,
            })?;
        return Ok(envelope.value);
    }

    let error = serde_json::from_slice::<Envelope>(&bytes)
        .ok()
        .and_then(|env| serde_json::from_value::<ErrorValue>(env.value).ok());

    match error {
        Some(err) => Err(CollectorError::WebDriver {
            command: name.to_string(),
            error: err.error,
            message: err.message,
        }),
        None => Err(CollectorError::UnexpectedStatus {
            status: status.as_u16(),
            url: url.to_string(),
        }),
    }
}
