#[path = "1-entity.rs"]
mod entity;

#[path = "2-key-value.rs"]
mod key_value;

#[path = "3-flag-store.rs"]
mod flag_store;

#[path = "4-visitor.rs"]
mod visitor;

#[path = "5-reaction-service.rs"]
mod reaction_service;

#[path = "6-view-state.rs"]
mod view_state;

#[path = "7-synchronizer.rs"]
mod synchronizer;

pub use entity::*;
pub use flag_store::*;
pub use key_value::*;
pub use reaction_service::*;
pub use synchronizer::*;
pub use view_state::*;
pub use visitor::*;

#[cfg_attr(target_arch = "wasm32", wasm_bindgen::prelude::wasm_bindgen)]
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct ListenerKey(pub(crate) slotmap::DefaultKey);
