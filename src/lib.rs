//! Floofbox core crate.
//!
//! A single-page daily companion: a lunar-calendar greeting, a pick-one-of-
//! three daily interaction, a once-per-day blind box reveal, and a draggable
//! pet floof overlay. All content comes from one remote bundle fetched at
//! page load; completion state lives in per-day local-storage flags.

use wasm_bindgen::prelude::*;

pub mod calendar;
pub mod content;
pub mod lunar;
pub mod page;
pub mod rules;
pub mod storage;
pub mod widgets;

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

// -----------------------------------------------------------------------------
// Built-in phrase sets and default copy. Content rows override where they can;
// these are the voices the pet falls back to.
// -----------------------------------------------------------------------------

/// Talk line when the bundle has neither daily nor fallback rows.
pub const PLACEHOLDER_TALK_LINE: &str = "怎么啦bb👀";

/// Idle tap lines when the content set is empty.
pub const IDLE_LINES: &[&str] = &["我在这。", "贴贴。", "今天也辛苦了。"];

/// Lines shown when the pet gets picked up.
pub const DRAG_LINES: &[&str] = &["我来啦。", "贴贴。", "靠近一点。", "别走。"];

/// Lines for the double-tap spin.
pub const SPIN_LINES: &[&str] = &["嘿嘿。", "我转给你看。", "贴贴升级。"];

/// Generic acknowledgments when a response map has no matching entry.
pub const CHOICE_ACK: &str = "我收到啦。";
pub const INPUT_ACK: &str = "我看到你写的了。谢谢你。";

pub const DEFAULT_INTERACTION_TITLE: &str = "今天的小互动";
pub const DEFAULT_BOX_TITLE: &str = "今天的小惊喜";
pub const DEFAULT_PET_NAME: &str = "静静子";

// -----------------------------------------------------------------------------
// Unified entrypoint
// -----------------------------------------------------------------------------

/// Kick off the page: one bundle fetch, then mount everything. Resolves
/// immediately; the actual boot runs on the event loop.
#[wasm_bindgen]
pub fn start_page() -> Result<(), JsValue> {
    wasm_bindgen_futures::spawn_local(async {
        if let Err(err) = page::boot().await {
            web_sys::console::error_2(&JsValue::from_str("floofbox: page boot failed:"), &err);
            page::render_fatal();
        }
    });
    Ok(())
}
