//! # FlagStore
//! A non-authoritative shadow of the per-viewer "liked" flag, one key per entity.
//! It is only read when the status query fails. A liked entity is stored as `"true"`, an unliked one has no key at all.

use crate::data_model::{EntityRef, KeyValueStore, StoreError};

const LIKED: &str = "true";

#[derive(Debug, Clone)]
pub struct FlagStore<S> {
    store: S,
}

impl<S: KeyValueStore> FlagStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// `None` if there is no shadow for this entity (or storage can't be read).
    pub fn get(&self, entity: &EntityRef) -> Option<bool> {
        self.store
            .get(&entity.shadow_key())
            .inspect_err(|e| log::warn!("Could not read like shadow for {entity}: {e}"))
            .ok()
            .flatten()
            .map(|value| value == LIKED)
    }

    pub fn set(&self, entity: &EntityRef) -> Result<(), StoreError> {
        self.store.set(&entity.shadow_key(), LIKED)
    }

    pub fn clear(&self, entity: &EntityRef) -> Result<(), StoreError> {
        self.store.remove(&entity.shadow_key())
    }

    /// Write `liked` through to storage. Failures only cost us the offline fallback, so they are logged and dropped.
    pub fn mirror(&self, entity: &EntityRef, liked: bool) {
        let result = if liked {
            self.set(entity)
        } else {
            self.clear(entity)
        };
        if let Err(e) = result {
            log::warn!("Could not mirror like shadow for {entity}: {e}");
        }
    }
}
