//! Daily chooser card: pick one of up to three interactions, answer once,
//! get one canned reply for the day.

use std::cell::RefCell;

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, HtmlTextAreaElement, MouseEvent, window};

use crate::rules::{Interaction, InteractionKind};
use crate::storage::{self, FLAG_SET, FlagStore, LocalFlagStore};
use crate::widgets::{listen, make};

const ROOT_ID: &str = "fb-chooser";
const ANSWER_ID: &str = "fb-chooser-answer";

#[derive(Debug, Clone, PartialEq)]
pub enum ChooserPhase {
    /// Nothing configured for today; terminal.
    NoOptionsToday,
    Selecting,
    /// Index of the picked item.
    Answering(usize),
    DoneWithReply(String),
    DoneNoReply,
}

/// Widget state machine, DOM-free so it runs under host tests.
pub struct DailyChooser {
    items: Vec<Interaction>,
    done_key: String,
    reply_key: String,
    phase: ChooserPhase,
}

impl DailyChooser {
    pub fn init(items: Vec<Interaction>, today: &str, store: &dyn FlagStore) -> Self {
        let done_key = storage::daily_done_key(today);
        let reply_key = storage::daily_reply_key(today);
        let phase = if items.is_empty() {
            ChooserPhase::NoOptionsToday
        } else if store.get(&done_key).as_deref() == Some(FLAG_SET) {
            match store.get(&reply_key) {
                Some(reply) if !reply.is_empty() => ChooserPhase::DoneWithReply(reply),
                _ => ChooserPhase::DoneNoReply,
            }
        } else {
            ChooserPhase::Selecting
        };
        Self {
            items,
            done_key,
            reply_key,
            phase,
        }
    }

    pub fn phase(&self) -> &ChooserPhase {
        &self.phase
    }

    pub fn items(&self) -> &[Interaction] {
        &self.items
    }

    pub fn picked(&self) -> Option<&Interaction> {
        match self.phase {
            ChooserPhase::Answering(i) => self.items.get(i),
            _ => None,
        }
    }

    pub fn pick(&mut self, index: usize) -> bool {
        if self.phase != ChooserPhase::Selecting || index >= self.items.len() {
            return false;
        }
        self.phase = ChooserPhase::Answering(index);
        true
    }

    /// Abandon the current pick without persisting anything.
    pub fn back(&mut self) {
        if matches!(self.phase, ChooserPhase::Answering(_)) {
            self.phase = ChooserPhase::Selecting;
        }
    }

    /// Resolve a choice answer: the picked option's mapped reply, else the
    /// `default` entry, else the generic acknowledgment. Completes the day.
    pub fn submit_choice(&mut self, option: &str, store: &dyn FlagStore) -> Option<String> {
        let item = self.picked()?;
        let reply = non_empty(item.response_map.get(option))
            .or_else(|| non_empty(item.response_map.get("default")))
            .unwrap_or(crate::CHOICE_ACK)
            .to_string();
        self.finish(reply.clone(), store);
        Some(reply)
    }

    /// Free-text answers always resolve through the `default` entry; the text
    /// itself is acknowledged, not stored.
    pub fn submit_input(&mut self, _text: &str, store: &dyn FlagStore) -> Option<String> {
        let item = self.picked()?;
        let reply = non_empty(item.response_map.get("default"))
            .unwrap_or(crate::INPUT_ACK)
            .to_string();
        self.finish(reply.clone(), store);
        Some(reply)
    }

    fn finish(&mut self, reply: String, store: &dyn FlagStore) {
        store.set(&self.done_key, FLAG_SET);
        store.set(&self.reply_key, &reply);
        self.phase = ChooserPhase::DoneWithReply(reply);
    }

    /// Testing affordance: clear flag and reply, back to selecting.
    pub fn reset(&mut self, store: &dyn FlagStore) {
        if !matches!(
            self.phase,
            ChooserPhase::DoneWithReply(_) | ChooserPhase::DoneNoReply
        ) {
            return;
        }
        store.remove(&self.done_key);
        store.remove(&self.reply_key);
        self.phase = ChooserPhase::Selecting;
    }
}

fn non_empty(v: Option<&str>) -> Option<&str> {
    v.filter(|s| !s.is_empty())
}

thread_local! {
    static STATE: RefCell<Option<DailyChooser>> = const { RefCell::new(None) };
}

/// Mount the card into `parent` and render the initial phase.
pub fn mount(parent: &Element, items: Vec<Interaction>, today: &str) -> Result<(), JsValue> {
    let doc = parent.owner_document().ok_or("no document")?;
    let root = make(&doc, "div", "", "")?;
    root.set_id(ROOT_ID);
    parent.append_child(&root)?;

    let machine = DailyChooser::init(items, today, &LocalFlagStore::open());
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
    root.append_child(&make(&doc, "div", "fb-label", "Daily")?.into())?;

    let phase = STATE.with(|cell| cell.borrow().as_ref().map(|m| m.phase().clone()));
    match phase {
        None | Some(ChooserPhase::NoOptionsToday) => {
            root.append_child(&make(&doc, "div", "fb-card-title", "今天还没配置三选一")?.into())?;
            root.append_child(&make(
                &doc,
                "div",
                "fb-hint",
                "去内容表 DailyMenu 填今天的 option_id，并在 DailyInteraction 里配置对应内容。",
            )?.into())?;
        }
        Some(ChooserPhase::Selecting) => render_selecting(&doc, &root)?,
        Some(ChooserPhase::Answering(index)) => render_answering(&doc, &root, index)?,
        Some(ChooserPhase::DoneWithReply(reply)) => {
            root.append_child(&make(&doc, "div", "fb-card-title", "已完成")?.into())?;
            root.append_child(&make(&doc, "div", "fb-reply", &reply)?.into())?;
            append_reset(&doc, &root)?;
        }
        Some(ChooserPhase::DoneNoReply) => {
            root.append_child(&make(&doc, "div", "fb-card-title", "今天已经做过啦")?.into())?;
            root.append_child(&make(&doc, "div", "fb-hint", "明天会有新的三选一。")?.into())?;
            append_reset(&doc, &root)?;
        }
    }
    Ok(())
}

fn render_selecting(doc: &Document, root: &Element) -> Result<(), JsValue> {
    root.append_child(&make(doc, "div", "fb-card-title", "今天想做什么？")?.into())?;
    let list = make(doc, "div", "fb-option-list", "")?;

    let items: Vec<(usize, String, InteractionKind)> = STATE.with(|cell| {
        cell.borrow()
            .as_ref()
            .map(|m| {
                m.items()
                    .iter()
                    .take(3)
                    .enumerate()
                    .map(|(i, it)| (i, it.title.clone(), it.kind))
                    .collect()
            })
            .unwrap_or_default()
    });

    for (index, title, kind) in items {
        let btn = make(doc, "button", "fb-option", "")?;
        btn.append_child(&make(doc, "div", "", &title)?.into())?;
        let subtitle = match kind {
            InteractionKind::Choice => "点一下试试！",
            InteractionKind::Input => "写一句话",
        };
        btn.append_child(&make(doc, "div", "fb-hint", subtitle)?.into())?;
        listen::<MouseEvent>(btn.as_ref(), "click", move |_| {
            STATE.with(|cell| {
                if let Some(m) = cell.borrow_mut().as_mut() {
                    m.pick(index);
                }
            });
            let _ = render();
        })?;
        list.append_child(&btn)?;
    }
    root.append_child(&list)?;
    Ok(())
}

fn render_answering(doc: &Document, root: &Element, index: usize) -> Result<(), JsValue> {
    let Some(item) = STATE.with(|cell| {
        cell.borrow()
            .as_ref()
            .and_then(|m| m.items().get(index).cloned())
    }) else {
        return Ok(());
    };

    root.append_child(&make(doc, "div", "fb-card-title", &item.title)?.into())?;

    match item.kind {
        InteractionKind::Choice => {
            let chips = make(doc, "div", "fb-chip-row", "")?;
            for option in item.payload.items() {
                let chip = make(doc, "button", "fb-chip", option)?;
                let picked = option.clone();
                listen::<MouseEvent>(chip.as_ref(), "click", move |_| {
                    STATE.with(|cell| {
                        if let Some(m) = cell.borrow_mut().as_mut() {
                            m.submit_choice(&picked, &LocalFlagStore::open());
                        }
                    });
                    let _ = render();
                })?;
                chips.append_child(&chip)?;
            }
            root.append_child(&chips)?;
        }
        InteractionKind::Input => {
            let area = make(doc, "textarea", "fb-answer", "")?;
            area.set_id(ANSWER_ID);
            area.set_attribute("placeholder", "写一句就好")?;
            root.append_child(&area)?;

            let send = make(doc, "button", "fb-send", "发送")?;
            listen::<MouseEvent>(send.as_ref(), "click", move |_| {
                let text = window()
                    .and_then(|w| w.document())
                    .and_then(|d| d.get_element_by_id(ANSWER_ID))
                    .and_then(|el| el.dyn_into::<HtmlTextAreaElement>().ok())
                    .map(|area| area.value())
                    .unwrap_or_default();
                STATE.with(|cell| {
                    if let Some(m) = cell.borrow_mut().as_mut() {
                        m.submit_input(&text, &LocalFlagStore::open());
                    }
                });
                let _ = render();
            })?;
            root.append_child(&send)?;
        }
    }

    let back = make(doc, "button", "fb-reset", "返回")?;
    listen::<MouseEvent>(back.as_ref(), "click", move |_| {
        STATE.with(|cell| {
            if let Some(m) = cell.borrow_mut().as_mut() {
                m.back();
            }
        });
        let _ = render();
    })?;
    root.append_child(&back)?;
    Ok(())
}

fn append_reset(doc: &Document, root: &Element) -> Result<(), JsValue> {
    let reset = make(doc, "button", "fb-reset", "（测试用）重置今天")?;
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
