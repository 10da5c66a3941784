//! `sessionStorage` behind [`SessionStore`].

use ch_core::store::SessionStore;
use wasm_bindgen::JsValue;
use web_sys::Storage;

pub struct SessionStorage {
    storage: Storage,
}

impl SessionStorage {
    /// The window's session storage, if the browser exposes one.
    pub fn open(window: &web_sys::Window) -> Result<Self, JsValue> {
        let storage = window
            .session_storage()?
            .ok_or_else(|| JsValue::from_str("sessionStorage is not available"))?;
        Ok(Self { storage })
    }
}

impl SessionStore for SessionStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.storage.get_item(key).ok().flatten()
    }

    fn set(&mut self, key: &str, value: &str) {
        if let Err(e) = self.storage.set_item(key, value) {
            log::error!("failed to write {key}: {e:?}");
        }
    }

    fn remove(&mut self, key: &str) {
        if let Err(e) = self.storage.remove_item(key) {
            log::error!("failed to remove {key}: {e:?}");
        }
    }
}
