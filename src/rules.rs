//! Daily selection rules: pure functions from the fetched bundle plus a
//! `today` key to the slices each widget renders. No side effects here so the
//! whole layer runs under host tests with injected dates.

use std::collections::HashMap;
use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate};
use regex::Regex;
use serde_json::Value;

use crate::content::{Jsonish, Row, field};

/// Extract a `YYYY-MM-DD` key from a raw cell, or empty when nothing date-like
/// is found. Empty never matches a real today key.
pub fn normalize_date(raw: &str) -> String {
    static DATE_RE: OnceLock<Regex> = OnceLock::new();
    let re = DATE_RE.get_or_init(|| Regex::new(r"\d{4}-\d{2}-\d{2}").unwrap());

    let s = raw.trim();
    if s.is_empty() {
        return String::new();
    }
    if let Some(m) = re.find(s) {
        return m.as_str().to_string();
    }
    parse_loose(s)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

fn parse_loose(s: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.date_naive());
    }
    for fmt in ["%Y/%m/%d", "%m/%d/%Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    // JS Date#toString prefix, e.g. "Sun Feb 08 2026 00:11:22 GMT+0800 (CST)".
    let prefix: String = s.chars().take(15).collect();
    NaiveDate::parse_from_str(prefix.trim(), "%a %b %d %Y").ok()
}

// Sheet date cells may carry a time suffix; only the first 10 chars key a day.
fn date_prefix(s: &str) -> &str {
    s.get(0..10).unwrap_or(s)
}

/// Today's pet talk lines: daily rows matching today, else fallback rows, else
/// the single built-in placeholder. `type` matches case-insensitively.
pub fn select_talk_lines(rows: &[Row], today: &str) -> Vec<String> {
    let daily: Vec<String> = rows
        .iter()
        .filter(|r| field(r, "type").to_lowercase() == "daily")
        .filter(|r| normalize_date(&field(r, "start_date")) == today)
        .map(|r| field(r, "text"))
        .collect();
    if !daily.is_empty() {
        return daily;
    }

    let fallback: Vec<String> = rows
        .iter()
        .filter(|r| field(r, "type").to_lowercase() == "fallback")
        .map(|r| field(r, "text"))
        .collect();
    if !fallback.is_empty() {
        return fallback;
    }

    vec![crate::PLACEHOLDER_TALK_LINE.to_string()]
}

/// Option ids scheduled for today, source order preserved.
pub fn select_today_options(menu: &[Row], today: &str) -> Vec<String> {
    menu.iter()
        .filter(|r| date_prefix(&field(r, "date")) == today)
        .map(|r| field(r, "option_id"))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionKind {
    Choice,
    Input,
}

impl InteractionKind {
    // Missing cells mean choice; any other unrecognized tag renders the
    // free-text flow, same as the original page.
    fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "" | "choice" => InteractionKind::Choice,
            _ => InteractionKind::Input,
        }
    }
}

/// One offered daily interaction, fields parsed leniently.
#[derive(Debug, Clone, PartialEq)]
pub struct Interaction {
    pub option_id: String,
    pub title: String,
    pub kind: InteractionKind,
    pub payload: Jsonish,
    pub response_map: Jsonish,
}

/// Join today's option ids against the interaction rows, at most 3 entries.
/// The id lookup is built by insertion, so a later row with a duplicate
/// `option_id` overwrites an earlier one; ids with no row are dropped.
pub fn join_interactions(option_ids: &[String], rows: &[Row]) -> Vec<Interaction> {
    let mut by_id: HashMap<String, &Row> = HashMap::new();
    for row in rows {
        by_id.insert(field(row, "option_id"), row);
    }

    option_ids
        .iter()
        .filter_map(|id| by_id.get(id))
        .take(3)
        .map(|row| {
            let title = field(row, "title");
            Interaction {
                option_id: field(row, "option_id"),
                title: if title.is_empty() {
                    crate::DEFAULT_INTERACTION_TITLE.to_string()
                } else {
                    title
                },
                kind: InteractionKind::parse(&field(row, "interaction_type")),
                payload: Jsonish::parse(row.get("payload").unwrap_or(&Value::Null)),
                response_map: Jsonish::parse(row.get("response_map").unwrap_or(&Value::Null)),
            }
        })
        .collect()
}

/// Blind box content kind; unrecognized tags render as plain text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoxKind {
    Text,
    Link,
    Image,
    Video,
}

impl BoxKind {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "link" => BoxKind::Link,
            "image" => BoxKind::Image,
            "video" => BoxKind::Video,
            _ => BoxKind::Text,
        }
    }
}

/// Today's blind box entry.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxRow {
    pub date: String,
    pub kind: BoxKind,
    pub title: String,
    pub content: String,
}

/// First blind box row dated today, if any.
pub fn select_today_box(rows: &[Row], today: &str) -> Option<BoxRow> {
    rows.iter()
        .find(|r| date_prefix(&field(r, "date")) == today)
        .map(|r| BoxRow {
            date: field(r, "date"),
            kind: BoxKind::parse(&field(r, "type")),
            title: field(r, "title"),
            content: field(r, "content"),
        })
}
