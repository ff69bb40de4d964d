//! The three page widgets and their shared DOM plumbing. Each widget keeps
//! its interaction state in its own thread-local cell and owns disjoint
//! storage keys; nothing is shared across widget modules.

use wasm_bindgen::convert::FromWasmAbi;
use wasm_bindgen::prelude::*;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, EventTarget, window};

pub mod blindbox;
pub mod chooser;
pub mod floof;

/// Create an element with an optional class and text content.
pub fn make(doc: &Document, tag: &str, class: &str, text: &str) -> Result<Element, JsValue> {
    let el = doc.create_element(tag)?;
    if !class.is_empty() {
        el.set_class_name(class);
    }
    if !text.is_empty() {
        el.set_text_content(Some(text));
    }
    Ok(el)
}

/// Attach a leaked event listener. Handlers live for the page lifetime, like
/// every listener on this page.
pub fn listen<E>(
    target: &EventTarget,
    kind: &str,
    handler: impl FnMut(E) + 'static,
) -> Result<(), JsValue>
where
    E: FromWasmAbi + 'static,
{
    let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(E)>);
    target.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

// Simple linear transform and modulus for prototype randomness (not crypto secure)
pub fn rand_index(len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    let now = window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0);
    (now as u64 as usize)
        .wrapping_mul(1664525)
        .wrapping_add(1013904223)
        % len
}
