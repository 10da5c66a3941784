//! WASM bridge for the Connections helper.
//!
//! The content script calls [`start_helper`] once; from then on every DOM
//! event, timer and extension message is funneled into a single
//! [`Controller`]. The background script only needs [`menu_items`] and
//! [`menu_click_message`] to build the native context menu and forward
//! clicks.

mod dom;
mod storage;
mod ui;

use ch_core::config::HelperConfig;
use ch_core::protocol::{MenuItemId, native_menu};
use ch_engine::controller::{Controller, Timer};
use ch_engine::input::PageEvent;
use dom::DomPage;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::{Rc, Weak};
use storage::SessionStorage;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Element, MouseEvent, MutationObserver, MutationObserverInit};

#[wasm_bindgen]
extern "C" {
    /// `chrome.runtime.onMessage.addListener`
    #[wasm_bindgen(js_namespace = ["chrome", "runtime", "onMessage"], js_name = addListener)]
    fn add_runtime_message_listener(callback: &Closure<dyn FnMut(JsValue)>);
}

thread_local! {
    static APP: RefCell<Option<Rc<App>>> = const { RefCell::new(None) };
}

enum Input {
    Page(PageEvent),
    Timer(Timer),
    Message(String),
}

/// The live helper: one controller plus a queue for inputs that arrive
/// while it is busy (synthetic events dispatched from inside a handler).
struct App {
    controller: RefCell<Controller<DomPage, SessionStorage>>,
    queue: RefCell<VecDeque<Input>>,
}

/// Cloneable handle DOM listeners use to reach the controller.
#[derive(Clone)]
pub(crate) struct EventSink(Weak<App>);

impl EventSink {
    pub(crate) fn emit(&self, event: PageEvent) {
        if let Some(app) = self.0.upgrade() {
            dispatch(&app, Input::Page(event));
        }
    }

    fn timer(&self, timer: Timer) {
        if let Some(app) = self.0.upgrade() {
            dispatch(&app, Input::Timer(timer));
        }
    }

    fn message(&self, json: String) {
        if let Some(app) = self.0.upgrade() {
            dispatch(&app, Input::Message(json));
        }
    }
}

#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook_setup();
    wasm_logger::init(wasm_logger::Config::default());
}

/// Start the helper on the puzzle page.
///
/// `config_json` is an optional partial [`HelperConfig`] override.
#[wasm_bindgen]
pub fn start_helper(config_json: Option<String>) -> Result<(), JsValue> {
    if APP.with(|app| app.borrow().is_some()) {
        log::warn!("helper already started");
        return Ok(());
    }
    let config = match config_json {
        Some(json) => HelperConfig::from_json(&json).map_err(|e| JsValue::from_str(&e))?,
        None => HelperConfig::default(),
    };
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let store = SessionStorage::open(&window)?;

    let app = Rc::new_cyclic(|weak: &Weak<App>| {
        let page = DomPage::new(document.clone(), config.clone(), EventSink(weak.clone()));
        App {
            controller: RefCell::new(Controller::new(page, store, config.clone())),
            queue: RefCell::new(VecDeque::new()),
        }
    });
    let sink = EventSink(Rc::downgrade(&app));

    listen_document(&document, &config, &sink)?;
    observe_tree(&document, &sink)?;
    listen_runtime_messages(&sink);

    app.controller.borrow_mut().start();
    flush(&app, false);
    APP.with(|slot| *slot.borrow_mut() = Some(app));
    log::info!("connections helper loaded");
    Ok(())
}

/// Native context menu entries as a JSON array for `chrome.contextMenus.create`.
#[wasm_bindgen]
pub fn menu_items() -> String {
    serde_json::to_string(&native_menu()).unwrap_or_else(|_| "[]".to_string())
}

/// The JSON message the background script sends to the tab for a clicked
/// native menu entry, or `undefined` for entries that are not ours.
#[wasm_bindgen]
pub fn menu_click_message(menu_item_id: &str) -> Option<String> {
    MenuItemId::parse(menu_item_id).map(|item| item.message().to_json())
}

// ─── Dispatch ────────────────────────────────────────────────────────────

fn dispatch(app: &Rc<App>, input: Input) {
    app.queue.borrow_mut().push_back(input);
    let Ok(mut controller) = app.controller.try_borrow_mut() else {
        // The running handler drains the queue before it returns.
        return;
    };
    let mut repaint = false;
    loop {
        let next = app.queue.borrow_mut().pop_front();
        let Some(input) = next else { break };
        match input {
            Input::Page(event) => repaint |= controller.handle(event),
            Input::Timer(timer) => controller.on_timer(timer),
            Input::Message(json) => repaint |= controller.handle_message_json(&json),
        }
    }
    drop(controller);
    flush(app, repaint);
}

/// Arm requested timers and re-render the injected menu and picker.
fn flush(app: &Rc<App>, repaint: bool) {
    let wakeups = app.controller.borrow_mut().take_wakeups();
    let Some(window) = web_sys::window() else {
        return;
    };
    for wakeup in wakeups {
        let sink = EventSink(Rc::downgrade(app));
        let callback = Closure::once_into_js(move || sink.timer(wakeup.timer));
        if let Err(e) = window.set_timeout_with_callback_and_timeout_and_arguments_0(
            callback.unchecked_ref(),
            i32::try_from(wakeup.delay_ms).unwrap_or(i32::MAX),
        ) {
            log::error!("failed to schedule {:?}: {e:?}", wakeup.timer);
        }
    }
    if repaint {
        let controller = app.controller.borrow();
        ui::render_menu(controller.page(), controller.menu());
        ui::render_picker(controller.page(), controller.picker());
    }
}

// ─── Listeners ───────────────────────────────────────────────────────────

fn listen_document(
    document: &web_sys::Document,
    config: &HelperConfig,
    sink: &EventSink,
) -> Result<(), JsValue> {
    let tile_selector = config.tile_selector.clone();
    let id_attribute = config.tile_id_attribute.clone();
    let on_context = {
        let sink = sink.clone();
        Closure::<dyn FnMut(MouseEvent)>::wrap(Box::new(move |event: MouseEvent| {
            let tile = event
                .target()
                .and_then(|t| t.dyn_into::<Element>().ok())
                .and_then(|el| el.closest(&tile_selector).ok().flatten());
            let Some(tile) = tile else { return };
            let Some(id) = tile.get_attribute(&id_attribute) else {
                return;
            };
            event.prevent_default();
            sink.emit(PageEvent::ContextMenu {
                tile: id.as_str().into(),
                x: f64::from(event.page_x()),
                y: f64::from(event.page_y()),
            });
        }))
    };
    document.add_event_listener_with_callback("contextmenu", on_context.as_ref().unchecked_ref())?;
    on_context.forget();

    let on_click = {
        let sink = sink.clone();
        Closure::<dyn FnMut(MouseEvent)>::wrap(Box::new(move |_event: MouseEvent| {
            sink.emit(PageEvent::DocumentClick);
        }))
    };
    document.add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())?;
    on_click.forget();
    Ok(())
}

/// Watch the whole body for added or removed elements.
fn observe_tree(document: &web_sys::Document, sink: &EventSink) -> Result<(), JsValue> {
    let body = document
        .body()
        .ok_or_else(|| JsValue::from_str("no document body"))?;
    let sink = sink.clone();
    let callback = Closure::<dyn FnMut(js_sys::Array, MutationObserver)>::wrap(Box::new(
        move |_records: js_sys::Array, _observer: MutationObserver| {
            sink.emit(PageEvent::TreeMutated);
        },
    ));
    let observer = MutationObserver::new(callback.as_ref().unchecked_ref())?;
    let init = MutationObserverInit::new();
    init.set_child_list(true);
    init.set_subtree(true);
    observer.observe_with_options(&body, &init)?;
    callback.forget();
    Ok(())
}

fn listen_runtime_messages(sink: &EventSink) {
    let sink = sink.clone();
    let callback = Closure::<dyn FnMut(JsValue)>::wrap(Box::new(move |message: JsValue| {
        match js_sys::JSON::stringify(&message) {
            Ok(json) => sink.message(String::from(json)),
            Err(e) => log::warn!("unreadable runtime message: {e:?}"),
        }
    }));
    add_runtime_message_listener(&callback);
    callback.forget();
}

fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("Connections helper panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}
