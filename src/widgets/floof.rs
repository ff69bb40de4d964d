//! Pet floof overlay: tap to hop, double-tap to spin, long-press to pick it
//! up and drag it around.
//!
//! The gesture machine and follow math are DOM-free ([`FloofCore`]); the glue
//! below wires them to pointer events, deferred timers and a cancellable
//! `requestAnimationFrame` loop.

use std::cell::RefCell;

use gloo_timers::callback::Timeout;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Element, MouseEvent, PointerEvent, window};

use crate::widgets::{listen, make, rand_index};

/// Blending factor of the follow loop; smaller is softer, larger snappier.
pub const FOLLOW_ALPHA: f64 = 0.16;

/// Viewport clamp margins: pointer-to-anchor offset and the edge paddings
/// keeping the pet fully on screen.
const ANCHOR_OFFSET: f64 = 40.0;
const EDGE_MIN: f64 = 16.0;
const EDGE_PAD: f64 = 88.0;

const LONG_PRESS_MS: u32 = 350;
const BUBBLE_MS: u32 = 2500;
const HOP_MS: u32 = 420;
const SPIN_MS: u32 = 520;
const CLING_MS: u32 = 1200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Gesture {
    #[default]
    Idle,
    Pressing,
    Dragging,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseOutcome {
    /// Released before the long-press timer: a tap.
    Tap,
    /// Released while dragging: anchor dropped, loop must stop.
    EndDrag,
    Ignored,
}

/// Clamp a pointer position to an anchored pet position inside the viewport.
pub fn point_to_xy(client_x: f64, client_y: f64, vw: f64, vh: f64) -> (f64, f64) {
    (
        clampf(client_x - ANCHOR_OFFSET, EDGE_MIN, vw - EDGE_PAD),
        clampf(client_y - ANCHOR_OFFSET, EDGE_MIN, vh - EDGE_PAD),
    )
}

fn clampf(n: f64, min: f64, max: f64) -> f64 {
    n.max(min).min(max)
}

/// Gesture state machine plus the follow interpolation. No DOM access, so the
/// whole thing runs under host tests.
#[derive(Debug, Default)]
pub struct FloofCore {
    gesture: Gesture,
    target: Option<(f64, f64)>,
    current: Option<(f64, f64)>,
}

impl FloofCore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gesture(&self) -> Gesture {
        self.gesture
    }

    pub fn has_target(&self) -> bool {
        self.target.is_some()
    }

    pub fn position(&self) -> Option<(f64, f64)> {
        self.current
    }

    /// Pointer down; arms the long-press window.
    pub fn press(&mut self) -> bool {
        if self.gesture != Gesture::Idle {
            return false;
        }
        self.gesture = Gesture::Pressing;
        true
    }

    /// Long-press timer fired while still pressed: snap the anchor to the
    /// pointer and enter dragging. Returns the clamped anchor.
    pub fn long_press(&mut self, cx: f64, cy: f64, vw: f64, vh: f64) -> Option<(f64, f64)> {
        if self.gesture != Gesture::Pressing {
            return None;
        }
        self.gesture = Gesture::Dragging;
        let pos = point_to_xy(cx, cy, vw, vh);
        self.target = Some(pos);
        self.current = Some(pos);
        Some(pos)
    }

    /// Pointer moved while dragging: only the target advances, the rendered
    /// position is driven by [`FloofCore::step`].
    pub fn drag_to(&mut self, cx: f64, cy: f64, vw: f64, vh: f64) -> Option<(f64, f64)> {
        if self.gesture != Gesture::Dragging {
            return None;
        }
        let pos = point_to_xy(cx, cy, vw, vh);
        self.target = Some(pos);
        Some(pos)
    }

    pub fn release(&mut self) -> ReleaseOutcome {
        match self.gesture {
            Gesture::Pressing => {
                self.gesture = Gesture::Idle;
                ReleaseOutcome::Tap
            }
            Gesture::Dragging => {
                self.cancel();
                ReleaseOutcome::EndDrag
            }
            Gesture::Idle => ReleaseOutcome::Ignored,
        }
    }

    /// Unconditional cleanup; also the pointercancel path.
    pub fn cancel(&mut self) {
        self.gesture = Gesture::Idle;
        self.target = None;
        self.current = None;
    }

    /// One follow frame: move the current position toward the target by the
    /// blending factor. `None` when there is no target, which ends the loop.
    pub fn step(&mut self) -> Option<(f64, f64)> {
        let (tx, ty) = self.target?;
        let (cx, cy) = self.current.unwrap_or((tx, ty));
        let next = (cx + (tx - cx) * FOLLOW_ALPHA, cy + (ty - cy) * FOLLOW_ALPHA);
        self.current = Some(next);
        Some(next)
    }
}

// ---------------------------------------------------------------------------
// DOM glue
// ---------------------------------------------------------------------------

struct FloofWidget {
    core: FloofCore,
    root: Element,
    face: Element,
    bubble: Element,
    bubble_text: Element,
    lines: Vec<String>,
    press_timer: Option<Timeout>,
    bubble_timer: Option<Timeout>,
    anim_timer: Option<Timeout>,
    raf_id: Option<i32>,
}

thread_local! {
    static STATE: RefCell<Option<FloofWidget>> = const { RefCell::new(None) };
    static RAF_CB: RefCell<Option<Closure<dyn FnMut(f64)>>> = const { RefCell::new(None) };
}

/// Mount the overlay onto the body. `lines` are today's talk lines; an empty
/// set falls back to the built-in idle phrases.
pub fn mount(skin_url: Option<&str>, name: &str, lines: &[String]) -> Result<(), JsValue> {
    let doc = window().and_then(|w| w.document()).ok_or("no document")?;
    let body = doc.body().ok_or("no body")?;

    let root = make(&doc, "div", "fb-floof", "")?;
    set_anchor_style(&root, None);

    let bubble = make(&doc, "div", "fb-bubble", "")?;
    let _ = bubble.set_attribute("style", "display:none");
    bubble.append_child(&make(&doc, "div", "fb-bubble-name", name)?.into())?;
    let bubble_text = make(&doc, "div", "fb-bubble-text", "")?;
    bubble.append_child(&bubble_text)?;
    root.append_child(&bubble)?;

    let face = make(&doc, "button", "fb-floof-face", "")?;
    face.set_attribute("aria-label", "pet")?;
    match skin_url {
        Some(url) if !url.is_empty() => {
            let img = make(&doc, "img", "fb-floof-skin", "")?;
            img.set_attribute("src", url)?;
            img.set_attribute("alt", name)?;
            img.set_attribute("draggable", "false")?;
            img.set_attribute("referrerpolicy", "no-referrer")?;
            face.append_child(&img)?;
        }
        _ => {
            let blank = make(&doc, "div", "fb-floof-blank", "")?;
            blank.append_child(&make(&doc, "div", "fb-floof-eye fb-eye-left", "")?.into())?;
            blank.append_child(&make(&doc, "div", "fb-floof-eye fb-eye-right", "")?.into())?;
            blank.append_child(&make(&doc, "div", "fb-floof-mouth", "")?.into())?;
            face.append_child(&blank)?;
        }
    }
    root.append_child(&face)?;
    body.append_child(&root)?;

    let fallback: Vec<String> = if lines.is_empty() {
        crate::IDLE_LINES.iter().map(|s| s.to_string()).collect()
    } else {
        lines.to_vec()
    };

    STATE.with(|cell| {
        cell.replace(Some(FloofWidget {
            core: FloofCore::new(),
            root,
            face: face.clone(),
            bubble,
            bubble_text,
            lines: fallback,
            press_timer: None,
            bubble_timer: None,
            anim_timer: None,
            raf_id: None,
        }))
    });

    init_follow_closure();
    attach_gestures(&face)
}

/// Tear the overlay down: cancels the long-press timer, bubble/animation
/// timers and any outstanding frame callback before removing the DOM.
pub fn unmount() {
    if let Some(mut w) = STATE.with(|cell| cell.borrow_mut().take()) {
        stop_follow(&mut w);
        // Dropping the Timeouts cancels them.
        w.root.remove();
    }
}

fn attach_gestures(face: &Element) -> Result<(), JsValue> {
    listen::<PointerEvent>(face.as_ref(), "pointerdown", |e| {
        let (cx, cy) = (e.client_x() as f64, e.client_y() as f64);
        STATE.with(|cell| {
            if let Some(w) = cell.borrow_mut().as_mut()
                && w.core.press()
            {
                w.press_timer = Some(Timeout::new(LONG_PRESS_MS, move || on_long_press(cx, cy)));
            }
        });
    })?;

    listen::<PointerEvent>(face.as_ref(), "pointermove", |e| {
        let (cx, cy) = (e.client_x() as f64, e.client_y() as f64);
        let dragging = STATE.with(|cell| {
            let mut b = cell.borrow_mut();
            let Some(w) = b.as_mut() else { return false };
            let (vw, vh) = viewport();
            w.core.drag_to(cx, cy, vw, vh).is_some()
        });
        if dragging {
            ensure_follow_loop();
        }
    })?;

    listen::<PointerEvent>(face.as_ref(), "pointerup", |_| {
        let outcome = STATE.with(|cell| {
            let mut b = cell.borrow_mut();
            let Some(w) = b.as_mut() else {
                return ReleaseOutcome::Ignored;
            };
            w.press_timer = None;
            let outcome = w.core.release();
            if outcome == ReleaseOutcome::EndDrag {
                stop_follow(w);
                set_anchor_style(&w.root, None);
            }
            outcome
        });
        if outcome == ReleaseOutcome::Tap {
            on_tap();
        }
    })?;

    listen::<PointerEvent>(face.as_ref(), "pointercancel", |_| {
        STATE.with(|cell| {
            if let Some(w) = cell.borrow_mut().as_mut() {
                w.press_timer = None;
                w.core.cancel();
                stop_follow(w);
                set_anchor_style(&w.root, None);
            }
        });
    })?;

    listen::<MouseEvent>(face.as_ref(), "dblclick", |_| {
        STATE.with(|cell| {
            if let Some(w) = cell.borrow_mut().as_mut() {
                trigger_anim(w, "fb-anim-spin", SPIN_MS);
                let line = crate::SPIN_LINES[rand_index(crate::SPIN_LINES.len())];
                show_bubble(w, line);
            }
        });
    })
}

fn on_tap() {
    STATE.with(|cell| {
        if let Some(w) = cell.borrow_mut().as_mut() {
            trigger_anim(w, "fb-anim-hop", HOP_MS);
            let line = w.lines[rand_index(w.lines.len())].clone();
            show_bubble(w, &line);
        }
    });
}

fn on_long_press(cx: f64, cy: f64) {
    let anchored = STATE.with(|cell| {
        let mut b = cell.borrow_mut();
        let Some(w) = b.as_mut() else { return false };
        let (vw, vh) = viewport();
        let Some(pos) = w.core.long_press(cx, cy, vw, vh) else {
            return false;
        };
        set_anchor_style(&w.root, Some(pos));
        trigger_anim(w, "fb-anim-cling", CLING_MS);
        let line = crate::DRAG_LINES[rand_index(crate::DRAG_LINES.len())];
        show_bubble(w, line);
        true
    });
    if anchored {
        ensure_follow_loop();
    }
}

fn show_bubble(w: &mut FloofWidget, line: &str) {
    w.bubble_text.set_text_content(Some(line));
    let _ = w.bubble.remove_attribute("style");
    // Replacing the handle cancels the previous auto-clear.
    w.bubble_timer = Some(Timeout::new(BUBBLE_MS, || {
        STATE.with(|cell| {
            if let Some(w) = cell.borrow_mut().as_mut() {
                let _ = w.bubble.set_attribute("style", "display:none");
            }
        });
    }));
    // Haptic pulse where available; unavailability is fine.
    if let Some(win) = window() {
        let _ = win.navigator().vibrate_with_duration(10);
    }
}

fn trigger_anim(w: &mut FloofWidget, class: &str, ms: u32) {
    w.face.set_class_name(&format!("fb-floof-face {class}"));
    w.anim_timer = Some(Timeout::new(ms, || {
        STATE.with(|cell| {
            if let Some(w) = cell.borrow_mut().as_mut() {
                w.face.set_class_name("fb-floof-face");
            }
        });
    }));
}

fn set_anchor_style(root: &Element, pos: Option<(f64, f64)>) {
    let style = match pos {
        Some((x, y)) => format!("left:{x}px; top:{y}px; right:auto; bottom:auto;"),
        None => "right:80px; bottom:48px;".to_string(),
    };
    let _ = root.set_attribute("style", &style);
}

fn viewport() -> (f64, f64) {
    let win = window();
    let vw = win
        .as_ref()
        .and_then(|w| w.inner_width().ok())
        .and_then(|v| v.as_f64())
        .unwrap_or(0.0);
    let vh = win
        .as_ref()
        .and_then(|w| w.inner_height().ok())
        .and_then(|v| v.as_f64())
        .unwrap_or(0.0);
    (vw, vh)
}

fn init_follow_closure() {
    RAF_CB.with(|cb| {
        if cb.borrow().is_some() {
            return;
        }
        *cb.borrow_mut() = Some(Closure::wrap(Box::new(|_ts: f64| {
            let keep_going = STATE.with(|cell| {
                let mut b = cell.borrow_mut();
                let Some(w) = b.as_mut() else { return false };
                w.raf_id = None;
                match w.core.step() {
                    Some(pos) => {
                        set_anchor_style(&w.root, Some(pos));
                        w.core.has_target()
                    }
                    None => false,
                }
            });
            if keep_going {
                request_frame();
            }
        }) as Box<dyn FnMut(f64)>));
    });
}

// Starting the loop while it is already scheduled is a no-op.
fn ensure_follow_loop() {
    let running = STATE.with(|cell| {
        cell.borrow()
            .as_ref()
            .map(|w| w.raf_id.is_some())
            .unwrap_or(true)
    });
    if !running {
        request_frame();
    }
}

fn request_frame() {
    RAF_CB.with(|cb| {
        if let (Some(win), Some(closure)) = (window(), cb.borrow().as_ref())
            && let Ok(id) = win.request_animation_frame(closure.as_ref().unchecked_ref())
        {
            STATE.with(|cell| {
                if let Some(w) = cell.borrow_mut().as_mut() {
                    w.raf_id = Some(id);
                }
            });
        }
    });
}

fn stop_follow(w: &mut FloofWidget) {
    if let Some(id) = w.raf_id.take()
        && let Some(win) = window()
    {
        let _ = win.cancel_animation_frame(id);
    }
}
