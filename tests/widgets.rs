// Integration tests (native) for the widget state machines. DOM glue is not
// touched here; machines are driven directly with an in-memory flag store so
// exact keys and transitions can be asserted.

use floofbox::rules::{BoxKind, BoxRow, join_interactions};
use floofbox::storage::{FlagStore, MemFlagStore};
use floofbox::widgets::blindbox::{BlindBox, BoxPhase};
use floofbox::widgets::chooser::{ChooserPhase, DailyChooser};
use floofbox::widgets::floof::{FloofCore, Gesture, ReleaseOutcome, point_to_xy};
use serde_json::json;

const TODAY: &str = "2026-02-09";

fn text_box() -> BoxRow {
    BoxRow {
        date: TODAY.to_string(),
        kind: BoxKind::Text,
        title: String::new(),
        content: "hi".to_string(),
    }
}

// --- blind box ---------------------------------------------------------------

#[test]
fn blindbox_open_persists_flag() {
    let store = MemFlagStore::new();
    let mut machine = BlindBox::init(Some(text_box()), TODAY, &store);
    assert_eq!(machine.phase(), BoxPhase::Closed);
    assert!(!machine.content_visible());

    assert!(machine.open(&store));
    assert_eq!(machine.phase(), BoxPhase::OpenedThisSession);
    assert!(machine.content_visible());
    assert_eq!(machine.row().unwrap().content, "hi");
    assert_eq!(
        store.get("blindbox_opened_2026-02-09").as_deref(),
        Some("1")
    );

    // Opening twice is a no-op.
    assert!(!machine.open(&store));
}

#[test]
fn blindbox_reinit_sees_prior_session_flag() {
    let store = MemFlagStore::new();
    let mut first = BlindBox::init(Some(text_box()), TODAY, &store);
    first.open(&store);

    // Same day, fresh widget: must not offer the box again.
    let second = BlindBox::init(Some(text_box()), TODAY, &store);
    assert_eq!(second.phase(), BoxPhase::OpenedPreviously);
    assert!(second.content_visible());
}

#[test]
fn blindbox_flag_written_externally_counts() {
    let store = MemFlagStore::new();
    store.set("blindbox_opened_2026-02-09", "1");
    let machine = BlindBox::init(Some(text_box()), TODAY, &store);
    assert_eq!(machine.phase(), BoxPhase::OpenedPreviously);
}

#[test]
fn blindbox_reset_clears_flag() {
    let store = MemFlagStore::new();
    let mut machine = BlindBox::init(Some(text_box()), TODAY, &store);
    machine.open(&store);
    machine.reset(&store);
    assert_eq!(machine.phase(), BoxPhase::Closed);
    assert!(store.get("blindbox_opened_2026-02-09").is_none());
}

#[test]
fn blindbox_without_today_row_is_terminal() {
    let store = MemFlagStore::new();
    let mut machine = BlindBox::init(None, TODAY, &store);
    assert_eq!(machine.phase(), BoxPhase::NoBoxToday);
    assert!(!machine.open(&store));
    assert!(store.get("blindbox_opened_2026-02-09").is_none());
}

// --- daily chooser -----------------------------------------------------------

fn spec_items() -> Vec<floofbox::rules::Interaction> {
    let ids = vec!["a".to_string()];
    let rows = vec![json!({
        "option_id": "a",
        "title": "emoji day",
        "interaction_type": "choice",
        "payload": ["yes", "no"],
        "response_map": {"yes": "😊", "default": "ok"},
    })];
    join_interactions(&ids, &rows)
}

#[test]
fn chooser_choice_flow_maps_reply() {
    let store = MemFlagStore::new();
    let mut chooser = DailyChooser::init(spec_items(), TODAY, &store);
    assert_eq!(*chooser.phase(), ChooserPhase::Selecting);

    assert!(chooser.pick(0));
    assert_eq!(*chooser.phase(), ChooserPhase::Answering(0));

    let reply = chooser.submit_choice("yes", &store).unwrap();
    assert_eq!(reply, "😊");
    assert_eq!(*chooser.phase(), ChooserPhase::DoneWithReply("😊".into()));
    assert_eq!(store.get("daily_done_2026-02-09").as_deref(), Some("1"));
    assert_eq!(store.get("daily_reply_2026-02-09").as_deref(), Some("😊"));
}

#[test]
fn chooser_unmapped_choice_falls_back_to_default_entry() {
    let store = MemFlagStore::new();
    let mut chooser = DailyChooser::init(spec_items(), TODAY, &store);
    chooser.pick(0);
    assert_eq!(chooser.submit_choice("no", &store).unwrap(), "ok");
}

#[test]
fn chooser_input_flow_uses_default_or_ack() {
    let ids = vec!["w".to_string()];
    let rows = vec![json!({"option_id": "w", "interaction_type": "input"})];
    let store = MemFlagStore::new();
    let mut chooser = DailyChooser::init(join_interactions(&ids, &rows), TODAY, &store);
    chooser.pick(0);
    // No response map at all: generic acknowledgment.
    assert_eq!(
        chooser.submit_input("写了一句", &store).unwrap(),
        floofbox::INPUT_ACK
    );
    assert_eq!(store.get("daily_done_2026-02-09").as_deref(), Some("1"));
}

#[test]
fn chooser_back_abandons_without_persisting() {
    let store = MemFlagStore::new();
    let mut chooser = DailyChooser::init(spec_items(), TODAY, &store);
    chooser.pick(0);
    chooser.back();
    assert_eq!(*chooser.phase(), ChooserPhase::Selecting);
    assert!(store.get("daily_done_2026-02-09").is_none());
    // Submitting without a pick resolves nothing.
    assert!(chooser.submit_choice("yes", &store).is_none());
}

#[test]
fn chooser_completed_day_blocks_further_picks() {
    let store = MemFlagStore::new();
    let mut chooser = DailyChooser::init(spec_items(), TODAY, &store);
    chooser.pick(0);
    chooser.submit_choice("yes", &store);
    assert!(!chooser.pick(0));
    assert!(chooser.submit_choice("yes", &store).is_none());
}

#[test]
fn chooser_reinit_restores_stored_reply() {
    let store = MemFlagStore::new();
    let mut first = DailyChooser::init(spec_items(), TODAY, &store);
    first.pick(0);
    first.submit_choice("yes", &store);

    let second = DailyChooser::init(spec_items(), TODAY, &store);
    assert_eq!(*second.phase(), ChooserPhase::DoneWithReply("😊".into()));
}

#[test]
fn chooser_flag_without_reply_is_done_no_reply() {
    let store = MemFlagStore::new();
    store.set("daily_done_2026-02-09", "1");
    let chooser = DailyChooser::init(spec_items(), TODAY, &store);
    assert_eq!(*chooser.phase(), ChooserPhase::DoneNoReply);
}

#[test]
fn chooser_reset_clears_flag_and_reply() {
    let store = MemFlagStore::new();
    let mut chooser = DailyChooser::init(spec_items(), TODAY, &store);
    chooser.pick(0);
    chooser.submit_choice("yes", &store);
    chooser.reset(&store);
    assert_eq!(*chooser.phase(), ChooserPhase::Selecting);
    assert!(store.get("daily_done_2026-02-09").is_none());
    assert!(store.get("daily_reply_2026-02-09").is_none());

    // A reload after reset starts over.
    let reloaded = DailyChooser::init(spec_items(), TODAY, &store);
    assert_eq!(*reloaded.phase(), ChooserPhase::Selecting);
}

#[test]
fn chooser_without_items_is_terminal() {
    let store = MemFlagStore::new();
    let mut chooser = DailyChooser::init(Vec::new(), TODAY, &store);
    assert_eq!(*chooser.phase(), ChooserPhase::NoOptionsToday);
    assert!(!chooser.pick(0));
}

// --- pet floof ---------------------------------------------------------------

#[test]
fn floof_tap_vs_long_press() {
    let mut core = FloofCore::new();
    assert!(core.press());
    assert_eq!(core.release(), ReleaseOutcome::Tap);
    assert_eq!(core.gesture(), Gesture::Idle);

    assert!(core.press());
    assert!(core.long_press(300.0, 200.0, 800.0, 600.0).is_some());
    assert_eq!(core.gesture(), Gesture::Dragging);
    assert_eq!(core.release(), ReleaseOutcome::EndDrag);
    assert_eq!(core.gesture(), Gesture::Idle);
}

#[test]
fn floof_clamps_anchor_to_viewport() {
    assert_eq!(point_to_xy(0.0, 0.0, 800.0, 600.0), (16.0, 16.0));
    assert_eq!(point_to_xy(10_000.0, 10_000.0, 800.0, 600.0), (712.0, 512.0));
    assert_eq!(point_to_xy(300.0, 200.0, 800.0, 600.0), (260.0, 160.0));
}

#[test]
fn floof_follow_monotonically_approaches_target() {
    let mut core = FloofCore::new();
    core.press();
    core.long_press(100.0, 100.0, 800.0, 600.0);
    core.drag_to(700.0, 500.0, 800.0, 600.0);

    let (tx, ty) = (660.0, 460.0); // clamped drag target
    let mut prev = {
        let (x, y) = core.position().unwrap();
        ((tx - x).hypot(ty - y), (x, y))
    };
    for _ in 0..50 {
        let (x, y) = core.step().unwrap();
        let dist = (tx - x).hypot(ty - y);
        assert!(dist < prev.0, "distance must strictly shrink toward target");
        prev = (dist, (x, y));
    }
}

#[test]
fn floof_move_updates_target_not_position() {
    let mut core = FloofCore::new();
    core.press();
    core.long_press(100.0, 100.0, 800.0, 600.0);
    let before = core.position().unwrap();
    core.drag_to(400.0, 400.0, 800.0, 600.0);
    assert_eq!(core.position().unwrap(), before);
    // Only stepping advances the rendered position.
    assert_ne!(core.step().unwrap(), before);
}

#[test]
fn floof_stops_after_release_and_cancel() {
    let mut core = FloofCore::new();
    core.press();
    core.long_press(100.0, 100.0, 800.0, 600.0);
    core.drag_to(500.0, 300.0, 800.0, 600.0);
    assert!(core.step().is_some());

    assert_eq!(core.release(), ReleaseOutcome::EndDrag);
    assert!(!core.has_target());
    assert!(core.step().is_none(), "no position updates after release");
    assert!(core.position().is_none());

    // pointercancel mid-press cleans up the same way.
    core.press();
    core.cancel();
    assert_eq!(core.gesture(), Gesture::Idle);
    assert_eq!(core.release(), ReleaseOutcome::Ignored);
    assert!(core.step().is_none());
}

#[test]
fn floof_drag_ignored_outside_dragging() {
    let mut core = FloofCore::new();
    assert!(core.drag_to(10.0, 10.0, 800.0, 600.0).is_none());
    core.press();
    assert!(core.drag_to(10.0, 10.0, 800.0, 600.0).is_none());
    // A second press while already pressing is refused.
    assert!(!core.press());
}
