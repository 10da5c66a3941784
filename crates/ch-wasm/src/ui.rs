//! Injected page chrome: stylesheet, status toast, reset button, the custom
//! context menu and the swap-colors picker.
//!
//! The menu and picker are shown or hidden from controller state after every
//! event that changed it; nothing here holds state of its own. Each element
//! is built once per page, so its click handlers are never rebuilt.

use crate::EventSink;
use crate::dom::DomPage;
use ch_core::color::ColorTag;
use ch_core::config::HelperConfig;
use ch_engine::input::PageEvent;
use ch_engine::menu::{ContextMenu, MenuAction, SwapPicker};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, Event, HtmlOptionElement, HtmlSelectElement};

const STYLE_ID: &str = "connections-helper-style";
const STATUS_ID: &str = "connections-helper-status";
const RESET_CLASS: &str = "connections-helper-reset-btn";
const MENU_ID: &str = "connections-custom-menu";
const OVERLAY_ID: &str = "swap-colors-overlay";
const POPUP_ID: &str = "swap-colors-popup";
const SOURCE_SELECT_ID: &str = "source-color-select";
const TARGET_SELECT_ID: &str = "target-color-select";

/// Install the stylesheet, status element and reset button. Idempotent.
pub fn install(document: &Document, config: &HelperConfig, sink: &EventSink) {
    if let Err(e) = try_install(document, config, sink) {
        log::error!("failed to decorate page: {e:?}");
    }
}

fn try_install(document: &Document, config: &HelperConfig, sink: &EventSink) -> Result<(), JsValue> {
    let body = document
        .body()
        .ok_or_else(|| JsValue::from_str("no document body"))?;

    if document.get_element_by_id(STYLE_ID).is_none() {
        let style = document.create_element("style")?;
        style.set_id(STYLE_ID);
        style.set_text_content(Some(&stylesheet(config)));
        body.append_child(&style)?;
    }

    if document.get_element_by_id(STATUS_ID).is_none() {
        let status = element(document, "div", STATUS_ID)?;
        status.set_id(STATUS_ID);
        body.append_child(&status)?;
    }

    if document
        .query_selector(&format!(".{RESET_CLASS}"))?
        .is_none()
        && let Some(group) = document.query_selector(&config.button_group_selector)?
    {
        // Borrow the host's button styling.
        let host_class = group
            .first_element_child()
            .map(|b| b.class_name())
            .unwrap_or_default();
        let button = element(document, "button", &format!("{host_class} {RESET_CLASS}"))?;
        button.set_text_content(Some("🔄 Reset Order"));
        let sink = sink.clone();
        on_click(&button, move |_| sink.emit(PageEvent::ResetButton))?;
        group.append_child(&button)?;
    }
    Ok(())
}

fn stylesheet(config: &HelperConfig) -> String {
    let mut css = String::new();
    for tag in ColorTag::ALL {
        css.push_str(&format!(
            ".{} {{ background-color: {} !important; }}\n",
            config.color_class(tag),
            tag.hex()
        ));
    }
    css.push_str(&format!(
        ".{} {{ transition: background-color 0.5s ease; }}\n\
         .{} {{ opacity: 0.5; }}\n\
         .{} {{ outline: 3px dashed #5a594e; }}\n",
        config.transition_class, config.dragging_class, config.drag_over_class
    ));
    css.push_str(
        "#connections-helper-status { position: fixed; bottom: 20px; right: 20px; \
         padding: 8px 14px; border-radius: 6px; background: #333; color: #fff; \
         opacity: 0; transition: opacity 0.3s; z-index: 10000; pointer-events: none; }\n\
         #connections-helper-status.show { opacity: 1; }\n\
         .connections-custom-menu { position: absolute; z-index: 10001; background: #fff; \
         border: 1px solid #ccc; border-radius: 6px; box-shadow: 0 2px 8px rgba(0,0,0,.2); }\n\
         .connections-custom-menu .menu-section-title { padding: 6px 12px; font-weight: bold; }\n\
         .connections-custom-menu .menu-item { padding: 6px 12px; cursor: pointer; }\n\
         .popup-overlay { position: fixed; inset: 0; background: rgba(0,0,0,.4); z-index: 10002; }\n\
         .swap-colors-popup { position: fixed; top: 50%; left: 50%; \
         transform: translate(-50%, -50%); background: #fff; padding: 16px; \
         border-radius: 8px; z-index: 10003; }\n",
    );
    css
}

/// Show `message` in the status toast for `duration_ms`.
pub fn show_status(document: &Document, message: &str, duration_ms: u32) {
    let Some(status) = document.get_element_by_id(STATUS_ID) else {
        return;
    };
    status.set_text_content(Some(message));
    if status.class_list().add_1("show").is_err() {
        return;
    }
    let Some(window) = web_sys::window() else {
        return;
    };
    let hide = Closure::once_into_js(move || {
        if let Err(e) = status.class_list().remove_1("show") {
            log::warn!("failed to hide status: {e:?}");
        }
    });
    if let Err(e) = window.set_timeout_with_callback_and_timeout_and_arguments_0(
        hide.unchecked_ref(),
        i32::try_from(duration_ms).unwrap_or(i32::MAX),
    ) {
        log::error!("failed to schedule status hide: {e:?}");
    }
}

/// What to do with a built-once element on repaint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Chrome {
    Build,
    Show,
    Hide,
    Untouched,
}

impl Chrome {
    fn plan(built: bool, wanted: bool) -> Self {
        match (built, wanted) {
            (false, true) => Chrome::Build,
            (true, true) => Chrome::Show,
            (true, false) => Chrome::Hide,
            (false, false) => Chrome::Untouched,
        }
    }
}

// ─── Context menu ────────────────────────────────────────────────────────

/// Show the menu at its position, or hide it. The element and its click
/// handlers are built on first use and kept for the life of the page.
pub fn render_menu(page: &DomPage, menu: Option<ContextMenu>) {
    let document = page.document();
    let position = menu.and_then(|m| m.position());
    let existing = document.get_element_by_id(MENU_ID);
    let plan = Chrome::plan(existing.is_some(), position.is_some());
    let result = match (plan, existing, position) {
        (Chrome::Show, Some(menu), Some((x, y))) => place_menu(&menu, x, y),
        (Chrome::Hide, Some(menu), _) => menu.set_attribute("style", "display: none;"),
        (Chrome::Build, _, Some((x, y))) => {
            build_menu(document, page.sink()).and_then(|menu| place_menu(&menu, x, y))
        }
        _ => Ok(()),
    };
    if let Err(e) = result {
        log::error!("failed to render menu: {e:?}");
    }
}

fn place_menu(menu: &Element, x: f64, y: f64) -> Result<(), JsValue> {
    menu.set_attribute("style", &format!("top: {y}px; left: {x}px; display: block;"))
}

fn build_menu(document: &Document, sink: &EventSink) -> Result<Element, JsValue> {
    let body = document
        .body()
        .ok_or_else(|| JsValue::from_str("no document body"))?;
    let menu = element(document, "div", MENU_ID)?;
    menu.set_id(MENU_ID);

    let colors = element(document, "div", "menu-section")?;
    let title = element(document, "div", "menu-section-title")?;
    title.set_text_content(Some("Color Code"));
    colors.append_child(&title)?;
    let utilities = element(document, "div", "menu-section")?;

    for action in MenuAction::all() {
        let item = element(document, "div", "menu-item")?;
        item.set_text_content(Some(action.title()));
        if let Some(hex) = action.swatch() {
            item.set_attribute("style", &format!("border-left: 4px solid {hex};"))?;
        }
        let sink = sink.clone();
        on_click(&item, move |event| {
            event.stop_propagation();
            sink.emit(PageEvent::Menu(action));
        })?;
        match action {
            MenuAction::Color(_) => colors.append_child(&item)?,
            _ => utilities.append_child(&item)?,
        };
    }

    menu.append_child(&colors)?;
    menu.append_child(&utilities)?;
    body.append_child(&menu)?;
    Ok(menu)
}

// ─── Swap picker ─────────────────────────────────────────────────────────

/// Show the picker with its current selection, or hide it. Built once like
/// the menu.
pub fn render_picker(page: &DomPage, picker: Option<SwapPicker>) {
    let document = page.document();
    let open = picker.filter(SwapPicker::is_open);
    let built = document.get_element_by_id(POPUP_ID).is_some();
    let result = match (Chrome::plan(built, open.is_some()), open) {
        (Chrome::Show, Some(picker)) => show_picker(document, picker),
        (Chrome::Hide, _) => hide_picker(document),
        (Chrome::Build, Some(picker)) => {
            build_picker(document, page.sink()).and_then(|()| show_picker(document, picker))
        }
        _ => Ok(()),
    };
    if let Err(e) = result {
        log::error!("failed to render swap picker: {e:?}");
    }
}

fn show_picker(document: &Document, picker: SwapPicker) -> Result<(), JsValue> {
    for (id, tag) in [
        (SOURCE_SELECT_ID, picker.source()),
        (TARGET_SELECT_ID, picker.target()),
    ] {
        if let Some(select) = document
            .get_element_by_id(id)
            .and_then(|el| el.dyn_into::<HtmlSelectElement>().ok())
        {
            select.set_value(tag.as_str());
        }
    }
    set_picker_display(document, "block")
}

fn hide_picker(document: &Document) -> Result<(), JsValue> {
    set_picker_display(document, "none")
}

fn set_picker_display(document: &Document, display: &str) -> Result<(), JsValue> {
    for id in [OVERLAY_ID, POPUP_ID] {
        if let Some(el) = document.get_element_by_id(id) {
            el.set_attribute("style", &format!("display: {display};"))?;
        }
    }
    Ok(())
}

fn build_picker(document: &Document, sink: &EventSink) -> Result<(), JsValue> {
    let body = document
        .body()
        .ok_or_else(|| JsValue::from_str("no document body"))?;

    let overlay = element(document, "div", "popup-overlay")?;
    overlay.set_id(OVERLAY_ID);
    let cancel_sink = sink.clone();
    on_click(&overlay, move |_| cancel_sink.emit(PageEvent::PickerCancel))?;

    let popup = element(document, "div", "swap-colors-popup")?;
    popup.set_id(POPUP_ID);
    on_click(&popup, |event| event.stop_propagation())?;

    let header = element(document, "div", "swap-popup-header")?;
    let title = element(document, "div", "swap-popup-title")?;
    title.set_text_content(Some("Swap Colors"));
    let close = element(document, "button", "swap-popup-close")?;
    close.set_text_content(Some("✕"));
    close.set_attribute("aria-label", "Close")?;
    let cancel_sink = sink.clone();
    on_click(&close, move |_| cancel_sink.emit(PageEvent::PickerCancel))?;
    header.append_child(&title)?;
    header.append_child(&close)?;

    let content = element(document, "div", "swap-popup-content")?;
    let source = color_select(document, SOURCE_SELECT_ID, "Source Color")?;
    let target = color_select(document, TARGET_SELECT_ID, "Target Color")?;
    content.append_child(&source)?;
    content.append_child(&target)?;

    let actions = element(document, "div", "swap-popup-actions")?;
    let cancel = element(document, "button", "swap-popup-button swap-popup-cancel")?;
    cancel.set_text_content(Some("Cancel"));
    let cancel_sink = sink.clone();
    on_click(&cancel, move |_| cancel_sink.emit(PageEvent::PickerCancel))?;
    let confirm = element(document, "button", "swap-popup-button swap-popup-confirm")?;
    confirm.set_text_content(Some("Swap"));
    let confirm_sink = sink.clone();
    let doc = document.clone();
    on_click(&confirm, move |_| {
        let source = selected_color(&doc, SOURCE_SELECT_ID);
        let target = selected_color(&doc, TARGET_SELECT_ID);
        if let (Some(source), Some(target)) = (source, target) {
            confirm_sink.emit(PageEvent::PickerConfirm { source, target });
        }
    })?;
    actions.append_child(&cancel)?;
    actions.append_child(&confirm)?;

    popup.append_child(&header)?;
    popup.append_child(&content)?;
    popup.append_child(&actions)?;
    body.append_child(&overlay)?;
    body.append_child(&popup)?;
    Ok(())
}

fn color_select(document: &Document, id: &str, label: &str) -> Result<Element, JsValue> {
    let group = element(document, "div", "color-select-group")?;
    let caption = element(document, "label", "color-select-label")?;
    caption.set_text_content(Some(label));
    caption.set_attribute("for", id)?;

    let select = document
        .create_element("select")?
        .dyn_into::<HtmlSelectElement>()?;
    select.set_id(id);
    select.set_class_name("color-select");
    for tag in ColorTag::ALL {
        let option = HtmlOptionElement::new_with_text_and_value(tag.title(), tag.as_str())?;
        option.set_attribute("style", &format!("background: {};", tag.hex()))?;
        select.append_child(&option)?;
    }

    group.append_child(&caption)?;
    group.append_child(&select)?;
    Ok(group)
}

fn selected_color(document: &Document, id: &str) -> Option<ColorTag> {
    let select = document
        .get_element_by_id(id)?
        .dyn_into::<HtmlSelectElement>()
        .ok()?;
    ColorTag::parse(&select.value())
}

// ─── Helpers ─────────────────────────────────────────────────────────────

fn element(document: &Document, tag: &str, class: &str) -> Result<Element, JsValue> {
    let el = document.create_element(tag)?;
    el.set_class_name(class);
    Ok(el)
}

fn on_click(target: &Element, handler: impl FnMut(Event) + 'static) -> Result<(), JsValue> {
    let callback = Closure::<dyn FnMut(Event)>::wrap(Box::new(handler));
    target.add_event_listener_with_callback("click", callback.as_ref().unchecked_ref())?;
    callback.forget();
    Ok(())
}
