//! [`HostPage`] over the live puzzle DOM.

use crate::EventSink;
use crate::ui;
use ch_core::config::HelperConfig;
use ch_core::id::TileId;
use ch_engine::input::PageEvent;
use ch_engine::page::HostPage;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    Document, DragEvent, Element, KeyboardEvent, KeyboardEventInit, MutationObserver,
    MutationObserverInit,
};

pub struct DomPage {
    document: Document,
    config: HelperConfig,
    sink: EventSink,
}

/// A `class` attribute observer bound to one tile element.
pub struct ClassObserver {
    observer: MutationObserver,
    element: Element,
    _callback: Closure<dyn FnMut(js_sys::Array, MutationObserver)>,
}

impl ClassObserver {
    fn observe(&self) {
        let init = MutationObserverInit::new();
        init.set_attributes(true);
        init.set_attribute_filter(&js_sys::Array::of1(&JsValue::from_str("class")));
        if let Err(e) = self.observer.observe_with_options(&self.element, &init) {
            log::error!("failed to observe tile classes: {e:?}");
        }
    }
}

impl DomPage {
    pub(crate) fn new(document: Document, config: HelperConfig, sink: EventSink) -> Self {
        Self {
            document,
            config,
            sink,
        }
    }

    pub(crate) fn document(&self) -> &Document {
        &self.document
    }

    pub(crate) fn sink(&self) -> &EventSink {
        &self.sink
    }

    fn tile(&self, id: TileId) -> Option<Element> {
        let selector = format!(
            "{}[{}=\"{}\"]",
            self.config.tile_selector,
            self.config.tile_id_attribute,
            id.as_str().replace('"', "\\\"")
        );
        self.document.query_selector(&selector).ok().flatten()
    }

    fn listen(&self, element: &Element, kind: &str, handler: impl FnMut(DragEvent) + 'static) {
        let callback = Closure::<dyn FnMut(DragEvent)>::wrap(Box::new(handler));
        match element.add_event_listener_with_callback(kind, callback.as_ref().unchecked_ref()) {
            // Listeners live as long as the element; the page drops them with it.
            Ok(()) => callback.forget(),
            Err(e) => log::error!("failed to listen for {kind}: {e:?}"),
        }
    }
}

impl HostPage for DomPage {
    type Observer = ClassObserver;

    fn tile_ids(&self) -> Vec<TileId> {
        let Ok(nodes) = self.document.query_selector_all(&self.config.tile_selector) else {
            return Vec::new();
        };
        (0..nodes.length())
            .filter_map(|i| nodes.item(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .filter_map(|el| el.get_attribute(&self.config.tile_id_attribute))
            .map(|id| TileId::intern(&id))
            .collect()
    }

    fn tile_text(&self, id: TileId) -> Option<String> {
        self.tile(id)
            .and_then(|el| el.text_content())
            .map(|text| text.trim().to_string())
    }

    fn game_date(&self) -> Option<String> {
        self.document
            .query_selector(&self.config.date_selector)
            .ok()
            .flatten()
            .and_then(|el| el.text_content())
    }

    fn has_class(&self, id: TileId, class: &str) -> bool {
        self.tile(id)
            .is_some_and(|el| el.class_list().contains(class))
    }

    fn add_class(&mut self, id: TileId, class: &str) {
        if let Some(el) = self.tile(id)
            && let Err(e) = el.class_list().add_1(class)
        {
            log::error!("failed to add {class} to {id}: {e:?}");
        }
    }

    fn remove_class(&mut self, id: TileId, class: &str) {
        if let Some(el) = self.tile(id)
            && let Err(e) = el.class_list().remove_1(class)
        {
            log::error!("failed to remove {class} from {id}: {e:?}");
        }
    }

    fn arrange(&mut self, order: &[TileId]) {
        let tiles: Vec<Element> = order.iter().filter_map(|id| self.tile(*id)).collect();
        let Some(parent) = tiles.first().and_then(|el| el.parent_node()) else {
            return;
        };
        for tile in &tiles {
            if let Err(e) = parent.append_child(tile) {
                log::error!("failed to move tile: {e:?}");
            }
        }
    }

    fn send_select_key(&mut self, id: TileId) {
        let Some(target) = self.tile(id).and_then(|el| el.first_element_child()) else {
            return;
        };
        let init = KeyboardEventInit::new();
        init.set_key(" ");
        init.set_bubbles(true);
        match KeyboardEvent::new_with_keyboard_event_init_dict("keydown", &init) {
            Ok(event) => {
                if let Err(e) = target.dispatch_event(&event) {
                    log::error!("failed to send select key to {id}: {e:?}");
                }
            }
            Err(e) => log::error!("failed to build select key: {e:?}"),
        }
    }

    fn show_status(&mut self, message: &str, duration_ms: u32) {
        ui::show_status(&self.document, message, duration_ms);
    }

    fn decorate(&mut self) {
        ui::install(&self.document, &self.config, &self.sink);
    }

    fn observe_classes(&mut self, id: TileId) -> Option<Self::Observer> {
        let element = self.tile(id)?;
        let sink = self.sink.clone();
        let callback = Closure::<dyn FnMut(js_sys::Array, MutationObserver)>::wrap(Box::new(
            move |_records: js_sys::Array, _observer: MutationObserver| {
                sink.emit(PageEvent::ClassMutated(id));
            },
        ));
        let observer = MutationObserver::new(callback.as_ref().unchecked_ref()).ok()?;
        let class_observer = ClassObserver {
            observer,
            element,
            _callback: callback,
        };
        class_observer.observe();
        Some(class_observer)
    }

    fn disconnect(&mut self, observer: &Self::Observer) {
        observer.observer.disconnect();
    }

    fn reconnect(&mut self, observer: &Self::Observer) {
        observer.observe();
    }

    fn instrument_drag(&mut self, id: TileId) -> bool {
        let Some(tile) = self.tile(id) else {
            return false;
        };
        let marker = &self.config.drag_marker_attribute;
        if tile.has_attribute(marker) {
            return false;
        }
        if tile.set_attribute(marker, "true").is_err()
            || tile.set_attribute("draggable", "true").is_err()
        {
            return false;
        }

        let sink = self.sink.clone();
        self.listen(&tile, "dragstart", move |event: DragEvent| {
            if let Some(data) = event.data_transfer() {
                data.set_effect_allowed("move");
                if let Err(e) = data.set_data("text/plain", id.as_str()) {
                    log::warn!("failed to set drag data: {e:?}");
                }
            }
            sink.emit(PageEvent::DragStart(id));
        });

        let sink = self.sink.clone();
        self.listen(&tile, "dragover", move |event: DragEvent| {
            event.prevent_default();
            if let Some(data) = event.data_transfer() {
                data.set_drop_effect("move");
            }
            sink.emit(PageEvent::DragOver(id));
        });

        let sink = self.sink.clone();
        self.listen(&tile, "dragleave", move |_event: DragEvent| {
            sink.emit(PageEvent::DragLeave(id));
        });

        let sink = self.sink.clone();
        self.listen(&tile, "drop", move |event: DragEvent| {
            event.prevent_default();
            let payload = event
                .data_transfer()
                .and_then(|data| data.get_data("text/plain").ok())
                .filter(|raw| !raw.is_empty())
                .map(|raw| TileId::intern(&raw));
            sink.emit(PageEvent::Drop {
                target: id,
                payload,
            });
        });

        let sink = self.sink.clone();
        self.listen(&tile, "dragend", move |_event: DragEvent| {
            sink.emit(PageEvent::DragEnd(id));
        });
        true
    }
}
