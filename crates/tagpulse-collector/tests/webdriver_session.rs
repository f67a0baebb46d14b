//! Integration tests for `WebDriverSession` against a fake WebDriver endpoint.
//!
//! Uses `wiremock` to answer the W3C commands the session issues, so no
//! browser or driver binary is needed.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use tagpulse_collector::{
    CancelToken, CollectLimits, Collector, CollectorError, DelayPolicy, FeedSession, SeenSet,
    WebDriverConfig, WebDriverSession,
};

const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4a4d176d0d0a";

fn test_config(server: &MockServer, cookies: Option<(&str, &str)>) -> WebDriverConfig {
    WebDriverConfig {
        webdriver_url: server.uri(),
        feed_base_url: server.uri(),
        headless: true,
        cookies: cookies.map(|(a, c)| (a.to_string(), c.to_string())),
        scroll_pixels: 3000,
        nav_settle: Duration::ZERO,
        nav_timeout: Duration::from_secs(5),
        max_retries: 0,
        retry_backoff_base_secs: 0,
    }
}

fn null_value() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "value": null }))
}

fn elements(ids: &[&str]) -> ResponseTemplate {
    let refs: Vec<_> = ids.iter().map(|id| json!({ ELEMENT_KEY: id })).collect();
    ResponseTemplate::new(200).set_body_json(json!({ "value": refs }))
}

fn string_value(s: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "value": s }))
}

async fn mount_session(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/session"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": { "sessionId": "s1", "capabilities": {} }
        })))
        .expect(1)
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/session/s1/timeouts"))
        .respond_with(null_value())
        .mount(server)
        .await;
}

/// One rendered post `p1` with a timestamp, author and like count but no
/// repost count element.
async fn mount_single_post(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/session/s1/elements"))
        .and(body_partial_json(json!({ "value": "article:has(time)" })))
        .respond_with(elements(&["p1"]))
        .mount(server)
        .await;

    for (selector, ids) in [
        ("time", vec!["t1"]),
        (r#"div[data-testid="User-Name"] span"#, vec!["a1"]),
        (r#"div[data-testid="like"] span"#, vec!["l1"]),
        (r#"div[data-testid="retweet"] span"#, vec![]),
    ] {
        Mock::given(method("POST"))
            .and(path("/session/s1/element/p1/elements"))
            .and(body_partial_json(json!({ "value": selector })))
            .respond_with(elements(&ids))
            .mount(server)
            .await;
    }

    Mock::given(method("GET"))
        .and(path("/session/s1/element/p1/text"))
        .respond_with(string_value("Nifty looks bullish\n#nifty50 @trader"))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/session/s1/element/t1/attribute/datetime"))
        .respond_with(string_value("2024-05-01T10:00:00.000Z"))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/session/s1/element/a1/text"))
        .respond_with(string_value("Alice"))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/session/s1/element/l1/text"))
        .respond_with(string_value("1.2K"))
        .mount(server)
        .await;
}

#[tokio::test]
async fn connect_installs_both_session_cookies() {
    let server = MockServer::start().await;
    mount_session(&server).await;

    Mock::given(method("POST"))
        .and(path("/session/s1/url"))
        .respond_with(null_value())
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/session/s1/cookie"))
        .and(body_partial_json(json!({ "cookie": { "name": "auth_token", "value": "tok" } })))
        .respond_with(null_value())
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/session/s1/cookie"))
        .and(body_partial_json(json!({ "cookie": { "name": "ct0", "value": "csrf" } })))
        .respond_with(null_value())
        .expect(1)
        .mount(&server)
        .await;

    let session = WebDriverSession::connect(test_config(&server, Some(("tok", "csrf"))))
        .await
        .expect("session should connect");
    assert_eq!(session.session_id(), "s1");
}

#[tokio::test]
async fn connect_without_cookies_skips_sign_in() {
    let server = MockServer::start().await;
    mount_session(&server).await;

    Mock::given(method("POST"))
        .and(path("/session/s1/cookie"))
        .respond_with(null_value())
        .expect(0)
        .mount(&server)
        .await;

    WebDriverSession::connect(test_config(&server, None))
        .await
        .expect("session should connect");
}

#[tokio::test]
async fn connect_surfaces_driver_error_object() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/session"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "value": { "error": "session not created", "message": "chrome not found" }
        })))
        .mount(&server)
        .await;

    let err = WebDriverSession::connect(test_config(&server, None))
        .await
        .err()
        .expect("connect should fail");
    match err {
        CollectorError::WebDriver { error, message, .. } => {
            assert_eq!(error, "session not created");
            assert_eq!(message, "chrome not found");
        }
        other => panic!("expected WebDriver error, got {other:?}"),
    }
}

#[tokio::test]
async fn non_json_error_body_is_unexpected_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/session"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let err = WebDriverSession::connect(test_config(&server, None))
        .await
        .err()
        .expect("connect should fail");
    assert!(
        matches!(err, CollectorError::UnexpectedStatus { status: 502, .. }),
        "got {err:?}"
    );
}

#[tokio::test]
async fn open_feed_navigates_to_encoded_live_search() {
    let server = MockServer::start().await;
    mount_session(&server).await;

    let expected = format!(
        "{}/search?q=%23nifty50&src=typed_query&f=live",
        server.uri()
    );
    Mock::given(method("POST"))
        .and(path("/session/s1/url"))
        .and(body_partial_json(json!({ "url": expected })))
        .respond_with(null_value())
        .expect(1)
        .mount(&server)
        .await;

    let mut session = WebDriverSession::connect(test_config(&server, None))
        .await
        .unwrap();
    session.open_feed("#nifty50").await.unwrap();
}

#[tokio::test]
async fn navigation_timeout_becomes_navigation_error() {
    let server = MockServer::start().await;
    mount_session(&server).await;

    Mock::given(method("POST"))
        .and(path("/session/s1/url"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "value": { "error": "timeout", "message": "page load timed out" }
        })))
        .mount(&server)
        .await;

    let mut session = WebDriverSession::connect(test_config(&server, None))
        .await
        .unwrap();
    let err = session.open_feed("#nifty50").await.unwrap_err();
    assert!(
        matches!(err, CollectorError::Navigation { .. }),
        "got {err:?}"
    );
}

#[tokio::test]
async fn scroll_executes_scroll_script_with_configured_pixels() {
    let server = MockServer::start().await;
    mount_session(&server).await;

    Mock::given(method("POST"))
        .and(path("/session/s1/execute/sync"))
        .and(body_partial_json(json!({ "args": [3000] })))
        .respond_with(null_value())
        .expect(1)
        .mount(&server)
        .await;

    let mut session = WebDriverSession::connect(test_config(&server, None))
        .await
        .unwrap();
    session.scroll().await.unwrap();
}

#[tokio::test]
async fn extract_reads_fields_and_leaves_missing_ones_empty() {
    let server = MockServer::start().await;
    mount_session(&server).await;
    mount_single_post(&server).await;

    let mut session = WebDriverSession::connect(test_config(&server, None))
        .await
        .unwrap();
    let containers = session.containers().await.unwrap();
    assert_eq!(containers.len(), 1);
    assert_eq!(containers[0].id(), "p1");

    let raw = session.extract(&containers[0]).await.unwrap();
    assert_eq!(raw.text, "Nifty looks bullish\n#nifty50 @trader");
    assert_eq!(raw.timestamp.as_deref(), Some("2024-05-01T10:00:00.000Z"));
    assert_eq!(raw.author.as_deref(), Some("Alice"));
    assert_eq!(raw.likes.as_deref(), Some("1.2K"));
    assert_eq!(raw.reposts, None);
}

#[tokio::test]
async fn collector_drives_webdriver_session_end_to_end() {
    let server = MockServer::start().await;
    mount_session(&server).await;
    mount_single_post(&server).await;

    Mock::given(method("POST"))
        .and(path("/session/s1/url"))
        .respond_with(null_value())
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/session/s1/execute/sync"))
        .respond_with(null_value())
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/session/s1"))
        .respond_with(null_value())
        .expect(1)
        .mount(&server)
        .await;

    let session = WebDriverSession::connect(test_config(&server, None))
        .await
        .unwrap();
    let limits = CollectLimits {
        max_posts: 5,
        max_scrolls: 3,
    };
    let mut collector = Collector::new(session, DelayPolicy::none(), limits, CancelToken::new());
    let mut seen = SeenSet::new();

    let report = collector
        .collect_all(&["#nifty50".to_string()], &mut seen)
        .await
        .unwrap();

    // The same container is rendered on every scroll; it is kept once.
    assert_eq!(report.records.len(), 1);
    assert_eq!(report.hashtags[0].scrolls, 3);
    assert_eq!(report.hashtags[0].duplicates_skipped, 2);

    let record = &report.records[0];
    assert_eq!(record.hashtag, "#nifty50");
    assert_eq!(record.author, "Alice");
    assert_eq!(record.body, "Nifty looks bullish #nifty50 @trader");
    assert_eq!(record.like_count, 1200);
    assert_eq!(record.repost_count, 0);
    assert_eq!(record.mentions, vec!["@trader"]);
    assert_eq!(record.hashtags_found, vec!["#nifty50"]);

    collector.into_session().close().await.unwrap();
}
