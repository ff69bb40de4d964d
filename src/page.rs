//! Page assembly: fetch the bundle once, derive today's slices, mount the
//! header, the two cards and the pet overlay.

use wasm_bindgen::JsValue;
use web_sys::{Document, console, window};

use crate::calendar::{self, HomeClock};
use crate::content::{self, ContentBundle, FetchError};
use crate::rules;
use crate::widgets::{blindbox, chooser, floof, make};

const STYLE_ID: &str = "fb-style";

/// One-shot page boot. Only a fetch failure escapes; everything downstream
/// degrades in place.
pub async fn boot() -> Result<(), JsValue> {
    let url = content::content_url().map_err(fatal)?;
    let bundle = content::fetch_bundle(&url).await.map_err(fatal)?;
    render_page(&bundle)
}

fn fatal(e: FetchError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Failure surface when boot errors out: a single line instead of the page.
pub fn render_fatal() {
    if let Some(doc) = window().and_then(|w| w.document())
        && let Some(body) = doc.body()
        && let Ok(el) = make(&doc, "div", "fb-fatal", "内容加载失败，请稍后再来。")
    {
        let _ = body.append_child(&el);
    }
}

fn render_page(bundle: &ContentBundle) -> Result<(), JsValue> {
    let doc = window().and_then(|w| w.document()).ok_or("no document")?;
    let body = doc.body().ok_or("no body")?;
    inject_style(&doc)?;

    let cfg = content::config_to_map(&bundle.config);

    // Home-zone clock; a bad configured offset logs and falls back to +08:00.
    let clock = cfg
        .get("home_tz")
        .and_then(|raw| match HomeClock::from_offset_str(raw) {
            Ok(clock) => Some(clock),
            Err(err) => {
                console::warn_1(&JsValue::from_str(&err.to_string()));
                None
            }
        })
        .unwrap_or_default();
    let today = clock.today_iso();

    let date_line = match calendar::format_display_date(clock.today()) {
        Ok(line) => line,
        Err(err) => {
            console::error_1(&JsValue::from_str(&format!("date line failed: {err}")));
            calendar::format_solar_only(clock.today())
        }
    };

    let main = make(&doc, "main", "fb-main", "")?;
    let shell = make(&doc, "div", "fb-shell", "")?;

    let header = make(&doc, "div", "fb-header", "")?;
    header.append_child(&make(&doc, "div", "fb-date", &date_line)?.into())?;
    header.append_child(&make(&doc, "h1", "fb-title", "又是喜欢你的一天！！啵啵啵～")?.into())?;
    header.append_child(&make(&doc, "p", "fb-subtitle", "vibe coding 了一下，送给你💖")?.into())?;
    shell.append_child(&header)?;

    let grid = make(&doc, "div", "fb-grid", "")?;
    let chooser_card = make(&doc, "div", "fb-card", "")?;
    let box_card = make(&doc, "div", "fb-card", "")?;
    grid.append_child(&chooser_card)?;
    grid.append_child(&box_card)?;
    shell.append_child(&grid)?;
    main.append_child(&shell)?;
    body.append_child(&main)?;

    let lines = rules::select_talk_lines(&bundle.animal_talk, &today);
    let option_ids = rules::select_today_options(&bundle.daily_menu, &today);
    let items = rules::join_interactions(&option_ids, &bundle.daily_interaction);
    let box_row = rules::select_today_box(&bundle.blind_box, &today);

    chooser::mount(&chooser_card, items, &today)?;
    blindbox::mount(&box_card, box_row, &today)?;
    box_card.append_child(&make(&doc, "div", "fb-hint", "会变成纸条/拍立得/电视/屏幕。")?.into())?;

    let name = cfg
        .get("pet_name")
        .filter(|s| !s.is_empty())
        .map(String::as_str)
        .unwrap_or(crate::DEFAULT_PET_NAME);
    floof::mount(cfg.get("pet_skin_url").map(String::as_str), name, &lines)
}

fn inject_style(doc: &Document) -> Result<(), JsValue> {
    if doc.get_element_by_id(STYLE_ID).is_some() {
        return Ok(());
    }
    let style = doc.create_element("style")?;
    style.set_id(STYLE_ID);
    style.set_text_content(Some(PAGE_CSS));
    if let Some(body) = doc.body() {
        body.append_child(&style)?;
    }
    Ok(())
}

const PAGE_CSS: &str = r#"
:root { color-scheme: light; }
body { margin:0; min-height:100vh; background:linear-gradient(#fbf7f2,#ffffff); color:#262626;
  font-family:ui-sans-serif,system-ui,"PingFang SC","Noto Sans SC",sans-serif; }
.fb-shell { max-width:980px; margin:0 auto; padding:64px 24px; }
.fb-header { margin-bottom:40px; }
.fb-date { font-size:14px; color:#737373; }
.fb-title { margin:8px 0 0; font-size:30px; font-weight:600; letter-spacing:-0.02em; }
.fb-subtitle { margin:12px 0 0; max-width:36rem; color:#525252; line-height:1.6; }
.fb-grid { display:grid; gap:16px; }
@media (min-width:768px) { .fb-grid { grid-template-columns:1fr 1fr; } }
.fb-card { border-radius:24px; border:1px solid rgba(0,0,0,0.05); background:rgba(255,255,255,0.7);
  padding:24px; box-shadow:0 1px 2px rgba(0,0,0,0.05); backdrop-filter:blur(8px); }
.fb-label { font-size:13px; color:#737373; }
.fb-card-title { margin-top:8px; font-size:18px; font-weight:500; }
.fb-hint { margin-top:6px; font-size:13px; color:#8a8a8a; }
.fb-reset { display:block; margin-top:16px; padding:0; font-size:12px; color:#a3a3a3; background:none;
  border:none; text-decoration:underline; text-underline-offset:4px; cursor:pointer; }
.fb-reply { margin-top:16px; border-radius:16px; border:1px solid rgba(0,0,0,0.05);
  background:rgba(255,255,255,0.7); padding:16px; line-height:1.6; }
.fb-option-list { margin-top:16px; display:grid; gap:12px; }
.fb-option { text-align:left; border-radius:16px; border:1px solid rgba(0,0,0,0.05);
  background:rgba(255,255,255,0.7); padding:12px 16px; cursor:pointer; }
.fb-chip-row { margin-top:16px; display:flex; flex-wrap:wrap; gap:8px; }
.fb-chip { border-radius:999px; border:1px solid rgba(0,0,0,0.05); background:rgba(255,255,255,0.7);
  padding:8px 16px; font-size:14px; cursor:pointer; }
.fb-answer { width:100%; min-height:110px; margin-top:16px; border-radius:16px;
  border:1px solid rgba(0,0,0,0.05); padding:16px; box-sizing:border-box; font:inherit; }
.fb-send { display:block; margin-top:12px; border-radius:16px; border:1px solid rgba(0,0,0,0.05);
  background:#fff; padding:8px 16px; font-size:14px; cursor:pointer; }
.fb-open-btn { margin-top:20px; width:100%; border-radius:24px; border:1px solid rgba(0,0,0,0.05);
  background:#fff; padding:40px 24px; cursor:pointer; }
.fb-gift { margin-top:8px; font-size:24px; }
.fb-note { position:relative; margin-top:20px; border-radius:24px; border:1px solid rgba(0,0,0,0.1);
  background:#fff8dc; padding:24px; }
.fb-note-text { margin-top:8px; white-space:pre-wrap; font-size:15px; line-height:1.6; }
.fb-polaroid { margin:20px auto 0; max-width:360px; border-radius:28px; border:1px solid rgba(0,0,0,0.1);
  background:#fff; padding:16px; }
.fb-polaroid-img { display:block; width:100%; aspect-ratio:4/3; object-fit:cover; border-radius:16px; }
.fb-linkcard { margin-top:20px; border-radius:24px; border:1px solid rgba(0,0,0,0.1); background:#fff; padding:20px; }
.fb-link { display:block; margin-top:8px; border-radius:16px; background:#fafafa; padding:16px;
  color:#262626; text-decoration:none; }
.fb-link-url { margin-top:4px; font-size:12px; color:#8a8a8a; word-break:break-all; }
.fb-film { margin-top:20px; width:100%; text-align:left; border-radius:24px; border:1px solid rgba(0,0,0,0.1);
  background:#171717; color:#d4d4d4; padding:16px; cursor:pointer; }
.fb-film-preview { display:block; width:100%; aspect-ratio:16/9; object-fit:cover; border-radius:16px;
  opacity:0.9; background:#000; }
.fb-film-play { position:relative; margin:-64px auto 40px; width:fit-content; border-radius:999px;
  background:rgba(255,255,255,0.85); padding:12px 20px; font-size:14px; color:#171717; }
.fb-overlay { position:fixed; inset:0; z-index:60; background:rgba(0,0,0,0.6); backdrop-filter:blur(4px); padding:24px; }
.fb-overlay-panel { margin:0 auto; width:100%; max-width:780px; border-radius:24px; background:#171717;
  border:1px solid rgba(255,255,255,0.1); overflow:hidden; }
.fb-overlay-bar { display:flex; justify-content:space-between; align-items:center; padding:12px 16px;
  color:#e5e5e5; font-size:14px; border-bottom:1px solid rgba(255,255,255,0.1); }
.fb-overlay-close { color:#d4d4d4; background:none; border:none; font-size:14px; cursor:pointer; }
.fb-overlay-video { display:block; width:calc(100% - 32px); margin:16px; border-radius:16px; }
.fb-fatal { padding:48px 24px; text-align:center; color:#737373; }
.fb-floof { position:fixed; z-index:50; user-select:none; -webkit-user-select:none; }
.fb-bubble { margin-bottom:12px; max-width:240px; border-radius:16px; border:1px solid rgba(0,0,0,0.05);
  background:rgba(255,255,255,0.85); padding:12px 16px; font-size:14px; color:#404040;
  box-shadow:0 1px 2px rgba(0,0,0,0.05); backdrop-filter:blur(8px); }
.fb-bubble-name { font-size:12px; opacity:0.6; margin-bottom:4px; }
.fb-floof-face { position:relative; display:block; height:120px; width:120px; padding:0; border-radius:999px;
  border:1px solid rgba(0,0,0,0.05); background:#fdf2f4; box-shadow:0 1px 2px rgba(0,0,0,0.05);
  cursor:pointer; touch-action:none; animation:fb-breathe 3.4s ease-in-out infinite; }
.fb-floof-skin { height:100%; width:100%; border-radius:999px; object-fit:contain; padding:4px; box-sizing:border-box; }
.fb-floof-blank { position:absolute; inset:0; }
.fb-floof-eye { position:absolute; top:32px; height:6px; width:6px; border-radius:999px; background:rgba(64,64,64,0.7); }
.fb-eye-left { left:28px; }
.fb-eye-right { right:28px; }
.fb-floof-mouth { position:absolute; top:44px; left:50%; transform:translateX(-50%); height:4px; width:24px;
  border-radius:999px; background:rgba(64,64,64,0.3); }
.fb-anim-hop { animation:fb-hop 420ms ease-in-out; }
.fb-anim-spin { animation:fb-spin 520ms ease-in-out; }
.fb-anim-cling { animation:fb-cling 1200ms ease-in-out; }
@keyframes fb-breathe { 0% { transform:scale(1); } 50% { transform:scale(1.03); } 100% { transform:scale(1); } }
@keyframes fb-hop { 0% { transform:translateY(0) scale(1); } 35% { transform:translateY(-10px) scale(1.03); }
  70% { transform:translateY(0) scale(0.99); } 100% { transform:translateY(0) scale(1); } }
@keyframes fb-spin { 0% { transform:rotate(0deg) scale(1); } 100% { transform:rotate(360deg) scale(1); } }
@keyframes fb-cling { 0% { transform:scale(1); } 30% { transform:scale(1.05); } 60% { transform:scale(1.02); }
  100% { transform:scale(1); } }
"#;
