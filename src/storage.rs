//! Per-day completion flags in browser local storage.
//!
//! Each widget owns disjoint keys and is handed the store explicitly, so host
//! tests can swap in [`MemFlagStore`] and assert on exact keys. Storage access
//! can fail (private mode, quota); every access here is best-effort and
//! degrades to "not yet done" instead of propagating.

use std::cell::RefCell;
use std::collections::HashMap;

/// Minimal key/value store for per-day flags.
pub trait FlagStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// `window.localStorage` backed store. Constructed once per page; when storage
/// is unavailable every read comes back `None` and writes are dropped.
pub struct LocalFlagStore {
    inner: Option<web_sys::Storage>,
}

impl LocalFlagStore {
    pub fn open() -> Self {
        Self {
            inner: web_sys::window().and_then(|w| w.local_storage().ok().flatten()),
        }
    }
}

impl FlagStore for LocalFlagStore {
    fn get(&self, key: &str) -> Option<String> {
        self.inner.as_ref()?.get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) {
        if let Some(storage) = &self.inner {
            let _ = storage.set_item(key, value);
        }
    }

    fn remove(&self, key: &str) {
        if let Some(storage) = &self.inner {
            let _ = storage.remove_item(key);
        }
    }
}

/// In-memory store for tests and storage-less sessions.
#[derive(Default)]
pub struct MemFlagStore {
    map: RefCell<HashMap<String, String>>,
}

impl MemFlagStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FlagStore for MemFlagStore {
    fn get(&self, key: &str) -> Option<String> {
        self.map.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.map.borrow_mut().insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.map.borrow_mut().remove(key);
    }
}

// Key scheme. Stale per-day keys accumulate and are never swept; acceptable
// for this page's lifetime.

pub fn blindbox_key(today: &str) -> String {
    format!("blindbox_opened_{today}")
}

pub fn daily_done_key(today: &str) -> String {
    format!("daily_done_{today}")
}

pub fn daily_reply_key(today: &str) -> String {
    format!("daily_reply_{today}")
}

/// The literal value a set flag carries.
pub const FLAG_SET: &str = "1";
