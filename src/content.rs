//! Remote content bundle: shape, lenient field access, and the single
//! page-load fetch.
//!
//! The bundle is one JSON object of named row arrays published by the content
//! sheet. Rows are schema-less; everything read out of them goes through the
//! lenient accessors here so malformed cells degrade to empty values instead
//! of failing the page.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestCache, RequestInit, Response};

/// One schema-less content row.
pub type Row = Value;

/// The complete fetched content set driving the page for one load.
#[derive(Debug, Default, Deserialize)]
pub struct ContentBundle {
    #[serde(rename = "Config", default)]
    pub config: Vec<Row>,
    #[serde(rename = "AnimalTalk", default)]
    pub animal_talk: Vec<Row>,
    #[serde(rename = "DailyMenu", default)]
    pub daily_menu: Vec<Row>,
    #[serde(rename = "DailyInteraction", default)]
    pub daily_interaction: Vec<Row>,
    #[serde(rename = "BlindBox", default)]
    pub blind_box: Vec<Row>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Fetching or decoding the bundle failed. The only error kind allowed to
/// abort the initial render.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("no content endpoint configured")]
    MissingUrl,
    #[error("content request failed: {0}")]
    Network(String),
    #[error("content fetch returned HTTP {0}")]
    Status(u16),
    #[error("content bundle is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Resolve the content endpoint: a `window.__FLOOFBOX_CONTENT_URL` global set
/// by the host page wins, else the URL baked in at compile time.
pub fn content_url() -> Result<String, FetchError> {
    if let Some(win) = web_sys::window()
        && let Ok(v) = js_sys::Reflect::get(win.as_ref(), &JsValue::from_str("__FLOOFBOX_CONTENT_URL"))
        && let Some(s) = v.as_string()
        && !s.is_empty()
    {
        return Ok(s);
    }
    option_env!("FLOOFBOX_CONTENT_URL")
        .map(str::to_string)
        .ok_or(FetchError::MissingUrl)
}

/// Single non-cached GET of the bundle. No retry and no timeout: a failure
/// propagates to the caller and fails the whole page render.
pub async fn fetch_bundle(url: &str) -> Result<ContentBundle, FetchError> {
    let network = |e: JsValue| FetchError::Network(js_err(&e));

    let win = web_sys::window().ok_or_else(|| FetchError::Network("no window".into()))?;
    let init = RequestInit::new();
    init.set_method("GET");
    init.set_cache(RequestCache::NoStore);
    let request = Request::new_with_str_and_init(url, &init).map_err(network)?;

    let resp_value = JsFuture::from(win.fetch_with_request(&request))
        .await
        .map_err(network)?;
    let resp: Response = resp_value.dyn_into().map_err(network)?;
    if !resp.ok() {
        return Err(FetchError::Status(resp.status()));
    }
    let text = JsFuture::from(resp.text().map_err(network)?)
        .await
        .map_err(network)?
        .as_string()
        .unwrap_or_default();
    Ok(serde_json::from_str(&text)?)
}

/// Stringified view of one row field; absent and null cells read as empty.
pub fn field(row: &Row, key: &str) -> String {
    match row.get(key) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(other) => other.to_string(),
    }
}

/// Flatten `Config` rows into a key/value map; the last row wins on duplicate
/// keys.
pub fn config_to_map(rows: &[Row]) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for row in rows {
        let key = field(row, "key");
        if key.is_empty() {
            continue;
        }
        map.insert(key, field(row, "value"));
    }
    map
}

/// Leniently parsed opaque cell (`payload` / `response_map`): structured when
/// it decodes, the raw text when it does not, empty when there is nothing.
/// Parse errors are swallowed here and never surface.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Jsonish {
    #[default]
    Empty,
    Text(String),
    List(Vec<String>),
    Map(HashMap<String, String>),
}

impl Jsonish {
    pub fn parse(value: &Value) -> Jsonish {
        match value {
            Value::Null => Jsonish::Empty,
            Value::Array(items) => Jsonish::List(items.iter().map(scalar_string).collect()),
            Value::Object(map) => Jsonish::Map(
                map.iter()
                    .map(|(k, v)| (k.clone(), scalar_string(v)))
                    .collect(),
            ),
            Value::String(s) => {
                let s = s.trim();
                if s.is_empty() {
                    return Jsonish::Empty;
                }
                match serde_json::from_str::<Value>(s) {
                    Ok(parsed @ (Value::Array(_) | Value::Object(_))) => Jsonish::parse(&parsed),
                    // A bare scalar that happens to be valid JSON is still text.
                    _ => Jsonish::Text(s.to_string()),
                }
            }
            other => Jsonish::Text(scalar_string(other)),
        }
    }

    /// Map entry lookup; non-map values have no entries.
    pub fn get(&self, key: &str) -> Option<&str> {
        match self {
            Jsonish::Map(map) => map.get(key).map(String::as_str),
            _ => None,
        }
    }

    /// Ordered list items; non-list values have none.
    pub fn items(&self) -> &[String] {
        match self {
            Jsonish::List(items) => items,
            _ => &[],
        }
    }
}

fn scalar_string(v: &Value) -> String {
    match v {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

fn js_err(v: &JsValue) -> String {
    v.as_string().unwrap_or_else(|| format!("{v:?}"))
}
