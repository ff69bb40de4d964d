//! Blind box card: one surprise per day, revealed once.
//!
//! The reveal decision collapses to "flag set or not" so a box opened in a
//! prior session renders exactly like one opened a moment ago.

use std::cell::RefCell;

use wasm_bindgen::JsValue;
use web_sys::{Document, Element, MouseEvent, window};

use crate::rules::{BoxKind, BoxRow};
use crate::storage::{self, FLAG_SET, FlagStore, LocalFlagStore};
use crate::widgets::{listen, make};

const ROOT_ID: &str = "fb-blindbox";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoxPhase {
    /// No row dated today; terminal for the day.
    NoBoxToday,
    Closed,
    OpenedThisSession,
    OpenedPreviously,
}

/// Widget state machine, DOM-free so it runs under host tests.
pub struct BlindBox {
    row: Option<BoxRow>,
    key: String,
    phase: BoxPhase,
}

impl BlindBox {
    pub fn init(row: Option<BoxRow>, today: &str, store: &dyn FlagStore) -> Self {
        let key = storage::blindbox_key(today);
        let phase = match &row {
            None => BoxPhase::NoBoxToday,
            Some(_) if store.get(&key).as_deref() == Some(FLAG_SET) => BoxPhase::OpenedPreviously,
            Some(_) => BoxPhase::Closed,
        };
        Self { row, key, phase }
    }

    pub fn phase(&self) -> BoxPhase {
        self.phase
    }

    pub fn row(&self) -> Option<&BoxRow> {
        self.row.as_ref()
    }

    pub fn content_visible(&self) -> bool {
        matches!(
            self.phase,
            BoxPhase::OpenedThisSession | BoxPhase::OpenedPreviously
        )
    }

    /// Explicit user reveal; only meaningful from `Closed`. Persists the flag
    /// for the rest of the day.
    pub fn open(&mut self, store: &dyn FlagStore) -> bool {
        if self.phase != BoxPhase::Closed {
            return false;
        }
        self.phase = BoxPhase::OpenedThisSession;
        store.set(&self.key, FLAG_SET);
        true
    }

    /// Testing affordance: clear the flag and close the box again.
    pub fn reset(&mut self, store: &dyn FlagStore) {
        if self.phase == BoxPhase::NoBoxToday {
            return;
        }
        store.remove(&self.key);
        self.phase = BoxPhase::Closed;
    }
}

thread_local! {
    static STATE: RefCell<Option<BlindBox>> = const { RefCell::new(None) };
}

/// Mount the card into `parent` and render the initial phase.
pub fn mount(parent: &Element, row: Option<BoxRow>, today: &str) -> Result<(), JsValue> {
    let doc = parent.owner_document().ok_or("no document")?;
    let root = make(&doc, "div", "", "")?;
    root.set_id(ROOT_ID);
    parent.append_child(&root)?;

    let machine = BlindBox::init(row, today, &LocalFlagStore::open());
    STATE.with(|cell| cell.replace(Some(machine)));
    render()
}

fn render() -> Result<(), JsValue> {
    let Some(doc) = window().and_then(|w| w.document()) else {
        return Ok(());
    };
    let Some(root) = doc.get_element_by_id(ROOT_ID) else {
        return Ok(());
    };
    root.set_inner_html("");
    root.append_child(&make(&doc, "div", "fb-label", "Blind Box")?.into())?;

    let (phase, row) = STATE.with(|cell| {
        let b = cell.borrow();
        match b.as_ref() {
            Some(m) => (m.phase(), m.row().cloned()),
            None => (BoxPhase::NoBoxToday, None),
        }
    });

    match (phase, row) {
        (BoxPhase::NoBoxToday, _) | (_, None) => {
            root.append_child(&make(&doc, "div", "fb-card-title", "今天没有盲盒")?.into())?;
            root.append_child(&make(
                &doc,
                "div",
                "fb-hint",
                "去内容表 BlindBox 为今天加一条。",
            )?.into())?;
        }
        (BoxPhase::Closed, Some(row)) => {
            root.append_child(&make(&doc, "div", "fb-card-title", box_title(&row))?.into())?;
            let btn = make(&doc, "button", "fb-open-btn", "")?;
            btn.append_child(&make(&doc, "div", "fb-hint", "Tap to open")?.into())?;
            btn.append_child(&make(&doc, "div", "fb-gift", "🎁")?.into())?;
            listen::<MouseEvent>(btn.as_ref(), "click", move |_| {
                STATE.with(|cell| {
                    if let Some(m) = cell.borrow_mut().as_mut() {
                        m.open(&LocalFlagStore::open());
                    }
                });
                let _ = render();
            })?;
            root.append_child(&btn)?;
            append_reset(&doc, &root)?;
        }
        (opened, Some(row)) => {
            root.append_child(&make(&doc, "div", "fb-card-title", box_title(&row))?.into())?;
            root.append_child(&render_content(&doc, &row)?.into())?;
            if opened == BoxPhase::OpenedPreviously {
                root.append_child(&make(
                    &doc,
                    "div",
                    "fb-hint",
                    "你今天已经开过盲盒啦（本机记录）。",
                )?.into())?;
            }
            append_reset(&doc, &root)?;
        }
    }
    Ok(())
}

fn box_title(row: &BoxRow) -> &str {
    if row.title.is_empty() {
        crate::DEFAULT_BOX_TITLE
    } else {
        &row.title
    }
}

fn append_reset(doc: &Document, root: &Element) -> Result<(), JsValue> {
    let reset = make(doc, "button", "fb-reset", "（测试用）重置今天盲盒")?;
    listen::<MouseEvent>(reset.as_ref(), "click", move |_| {
        STATE.with(|cell| {
            if let Some(m) = cell.borrow_mut().as_mut() {
                m.reset(&LocalFlagStore::open());
            }
        });
        let _ = render();
    })?;
    root.append_child(&reset)?;
    Ok(())
}

// One renderer per declared content kind; unrecognized kinds already collapsed
// to Text during selection.
fn render_content(doc: &Document, row: &BoxRow) -> Result<Element, JsValue> {
    match row.kind {
        BoxKind::Text => sticky_note(doc, &row.content),
        BoxKind::Image => polaroid(doc, &row.content),
        BoxKind::Video => film_frame(doc, &row.content),
        BoxKind::Link => link_card(doc, &row.content),
    }
}

fn sticky_note(doc: &Document, text: &str) -> Result<Element, JsValue> {
    let note = make(doc, "div", "fb-note", "")?;
    note.append_child(&make(doc, "div", "fb-hint", "a little note")?.into())?;
    note.append_child(&make(doc, "div", "fb-note-text", text)?.into())?;
    Ok(note)
}

fn polaroid(doc: &Document, url: &str) -> Result<Element, JsValue> {
    let frame = make(doc, "div", "fb-polaroid", "")?;
    let img = make(doc, "img", "fb-polaroid-img", "")?;
    img.set_attribute("src", url)?;
    img.set_attribute("alt", "photo")?;
    img.set_attribute("referrerpolicy", "no-referrer")?;
    frame.append_child(&img)?;
    frame.append_child(&make(doc, "div", "fb-hint", "polaroid")?.into())?;
    Ok(frame)
}

fn link_card(doc: &Document, url: &str) -> Result<Element, JsValue> {
    let card = make(doc, "div", "fb-linkcard", "")?;
    card.append_child(&make(doc, "div", "fb-hint", "link")?.into())?;
    let a = make(doc, "a", "fb-link", "")?;
    a.set_attribute("href", url)?;
    a.set_attribute("target", "_blank")?;
    a.set_attribute("rel", "noreferrer")?;
    a.append_child(&make(doc, "div", "", "打开链接")?.into())?;
    a.append_child(&make(doc, "div", "fb-link-url", url)?.into())?;
    card.append_child(&a)?;
    Ok(card)
}

// Film-frame cover with a muted first-frame preview; clicking expands to a
// full player overlay.
fn film_frame(doc: &Document, url: &str) -> Result<Element, JsValue> {
    let frame = make(doc, "button", "fb-film", "")?;
    let preview = make(doc, "video", "fb-film-preview", "")?;
    preview.set_attribute("src", url)?;
    preview.set_attribute("preload", "metadata")?;
    preview.set_attribute("muted", "")?;
    preview.set_attribute("playsinline", "")?;
    frame.append_child(&preview)?;
    frame.append_child(&make(doc, "div", "fb-film-play", "▶ 播放")?.into())?;
    frame.append_child(&make(doc, "div", "fb-hint", "film")?.into())?;

    let video_url = url.to_string();
    listen::<MouseEvent>(frame.as_ref(), "click", move |_| {
        if let Some(doc) = window().and_then(|w| w.document()) {
            let _ = open_video_overlay(&doc, &video_url);
        }
    })?;
    Ok(frame)
}

fn open_video_overlay(doc: &Document, url: &str) -> Result<(), JsValue> {
    let body = doc.body().ok_or("no body")?;
    let overlay = make(doc, "div", "fb-overlay", "")?;
    let panel = make(doc, "div", "fb-overlay-panel", "")?;

    let bar = make(doc, "div", "fb-overlay-bar", "")?;
    bar.append_child(&make(doc, "div", "", "Now playing")?.into())?;
    let close = make(doc, "button", "fb-overlay-close", "关闭")?;
    bar.append_child(&close)?;
    panel.append_child(&bar)?;

    let video = make(doc, "video", "fb-overlay-video", "")?;
    video.set_attribute("src", url)?;
    video.set_attribute("controls", "")?;
    video.set_attribute("autoplay", "")?;
    video.set_attribute("playsinline", "")?;
    panel.append_child(&video)?;

    // Clicks on the backdrop close the player, clicks inside do not.
    listen::<MouseEvent>(panel.as_ref(), "click", |e| e.stop_propagation())?;
    let overlay_for_close = overlay.clone();
    listen::<MouseEvent>(close.as_ref(), "click", move |_| overlay_for_close.remove())?;
    let overlay_for_backdrop = overlay.clone();
    listen::<MouseEvent>(overlay.as_ref(), "click", move |_| {
        overlay_for_backdrop.remove()
    })?;

    overlay.append_child(&panel)?;
    body.append_child(&overlay)?;
    Ok(())
}
