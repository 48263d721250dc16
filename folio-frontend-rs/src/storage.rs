//! `localStorage` as a [`KeyValueStore`].

use tally::{KeyValueStore, StoreError};
use wasm_bindgen::JsValue;

/// Handle to the browser's `localStorage`. Private browsing modes and sandboxed iframes may not have one, in which
/// case every operation reports [`StoreError::Unavailable`].
#[derive(Clone, Debug)]
pub struct BrowserStorage {
    storage: Option<web_sys::Storage>,
}

impl BrowserStorage {
    pub fn local() -> Self {
        #[cfg(target_arch = "wasm32")]
        let storage = web_sys::window().and_then(|w| w.local_storage().ok().flatten());

        #[cfg(not(target_arch = "wasm32"))]
        let storage: Option<web_sys::Storage> = None;

        if storage.is_none() {
            log::warn!("localStorage is unavailable, likes will not be remembered offline");
        }
        Self { storage }
    }

    fn storage(&self) -> Result<&web_sys::Storage, StoreError> {
        self.storage.as_ref().ok_or(StoreError::Unavailable)
    }
}

fn rejected(e: JsValue) -> StoreError {
    StoreError::Rejected(format!("{e:?}"))
}

impl KeyValueStore for BrowserStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.storage()?.get_item(key).map_err(rejected)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.storage()?.set_item(key, value).map_err(rejected)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.storage()?.remove_item(key).map_err(rejected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn outside_the_browser_storage_is_unavailable() {
        let storage = BrowserStorage::local();
        assert_eq!(storage.get("visitor_id"), Err(StoreError::Unavailable));
        assert_eq!(storage.set("visitor_id", "x"), Err(StoreError::Unavailable));
        assert_eq!(storage.remove("visitor_id"), Err(StoreError::Unavailable));
    }
}
