//! W3C WebDriver wire types.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Key under which WebDriver serializes element references.
pub(super) const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4a4d176d0d0a";

/// Every WebDriver response wraps its payload in `{"value": ...}`.
#[derive(Deserialize)]
pub(super) struct Envelope {
    #[serde(default)]
    pub value: Value,
}

/// Error payload carried in `value` on a failed command.
#[derive(Deserialize)]
pub(super) struct ErrorValue {
    pub error: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Deserialize)]
pub(super) struct NewSessionValue {
    #[serde(rename = "sessionId")]
    pub session_id: String,
}

#[derive(Serialize)]
pub(super) struct FindRequest<'a> {
    pub using: &'static str,
    pub value: &'a str,
}

impl<'a> FindRequest<'a> {
    pub fn css(selector: &'a str) -> Self {
        Self {
            using: "css selector",
            value: selector,
        }
    }
}

#[derive(Serialize)]
pub(super) struct Cookie<'a> {
    pub name: &'a str,
    pub value: &'a str,
    pub domain: &'a str,
    pub path: &'static str,
    pub secure: bool,
}

/// Capabilities for a Chrome session, optionally headless.
pub(super) fn chrome_capabilities(headless: bool) -> Value {
    let mut args = vec!["--disable-blink-features=AutomationControlled", "--window-size=1280,2000"];
    if headless {
        args.push("--headless=new");
    }
    json!({
        "capabilities": {
            "alwaysMatch": {
                "browserName": "chrome",
                "goog:chromeOptions": { "args": args }
            }
        }
    })
}

/// Pulls element ids out of a find-elements response value.
pub(super) fn element_ids(value: &Value) -> Vec<String> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.get(ELEMENT_KEY).and_then(Value::as_str))
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default()
}
