//! Browser-only checks for the `localStorage` binding. Run with `wasm-pack test --headless --firefox`.

#![cfg(target_arch = "wasm32")]

use folio_frontend_rs::BrowserStorage;
use tally::{EntityRef, FlagStore, KeyValueStore, VisitorIdentity, VISITOR_KEY};
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn local_storage_round_trip() {
    let storage = BrowserStorage::local();
    storage.set("folio-test", "1").unwrap();
    assert_eq!(storage.get("folio-test").unwrap().as_deref(), Some("1"));
    storage.remove("folio-test").unwrap();
    assert_eq!(storage.get("folio-test").unwrap(), None);
}

#[wasm_bindgen_test]
fn shadow_flags_use_the_documented_keys() {
    let storage = BrowserStorage::local();
    let flags = FlagStore::new(storage.clone());
    let post = EntityRef::blog_post(424242u64);

    flags.set(&post).unwrap();
    assert_eq!(storage.get("liked_blog_424242").unwrap().as_deref(), Some("true"));
    flags.clear(&post).unwrap();
    assert_eq!(flags.get(&post), None);
}

#[wasm_bindgen_test]
fn visitor_token_is_stable_across_providers() {
    let storage = BrowserStorage::local();
    let first = VisitorIdentity::new(storage.clone()).get_or_create();
    let second = VisitorIdentity::new(storage.clone()).get_or_create();
    assert_eq!(first, second);
    assert_eq!(storage.get(VISITOR_KEY).unwrap().as_deref(), Some(first.as_str()));
}
