use std::sync::Arc;

use super::*;
use crate::session::types::test_helpers::{admin_user, session, student_user};

fn store_with_mirrors() -> (SessionStore, Arc<MemoryStorage>, Arc<MemoryCookieMirror>) {
    let storage = Arc::new(MemoryStorage::new());
    let cookie = Arc::new(MemoryCookieMirror::new());
    let store = SessionStore::new(storage.clone(), cookie.clone());
    (store, storage, cookie)
}

// =============================================================================
// P1: session atomicity — token and user always together
// =============================================================================

#[test]
fn fresh_store_is_signed_out() {
    let store = SessionStore::in_memory();
    assert!(!store.is_authenticated());
    assert!(!store.is_admin());
    assert!(!store.has_valid_refresh_token());
    assert_eq!(store.access_token(), None);
    assert_eq!(store.user(), None);
}

#[test]
fn set_auth_establishes_full_session() {
    let store = SessionStore::in_memory();
    store.set_auth("a1", "r1", student_user());
    assert!(store.is_authenticated());
    assert!(!store.is_admin());
    assert!(store.has_valid_refresh_token());
    assert_eq!(store.access_token().as_deref(), Some("a1"));
    assert_eq!(store.user().unwrap().id, 2);
}

#[test]
fn clear_auth_wipes_everything_together() {
    let store = SessionStore::in_memory();
    store.set_auth("a1", "r1", admin_user());
    store.clear_auth();
    assert!(!store.is_authenticated());
    assert_eq!(store.access_token(), None);
    assert_eq!(store.refresh_token(), None);
    assert_eq!(store.user(), None);
}

#[test]
fn admin_predicate_follows_normalized_role() {
    let store = SessionStore::in_memory();
    store.set_auth("a1", "r1", admin_user());
    assert!(store.is_admin());
    store.set_auth("a1", "r1", student_user());
    assert!(!store.is_admin());
}

// =============================================================================
// P2: cookie mirrors store after every mutation
// =============================================================================

#[test]
fn cookie_mirror_matches_store_after_set_auth() {
    let (store, _storage, cookie) = store_with_mirrors();
    store.set_auth("a1", "r1", student_user());

    let mirrored = crate::session::cookie::parse(&cookie.get().unwrap()).unwrap();
    assert_eq!(Some(mirrored), store.session());
}

#[test]
fn cookie_mirror_matches_store_after_token_update() {
    let (store, _storage, cookie) = store_with_mirrors();
    store.set_auth("a1", "r1", student_user());
    store.update_access_token("a2");

    let mirrored = crate::session::cookie::parse(&cookie.get().unwrap()).unwrap();
    assert_eq!(mirrored.access_token, "a2");
    assert_eq!(mirrored.refresh_token, "r1");
    assert_eq!(Some(mirrored), store.session());
}

#[test]
fn cookie_mirror_cleared_with_store() {
    let (store, _storage, cookie) = store_with_mirrors();
    store.set_auth("a1", "r1", student_user());
    store.clear_auth();
    assert_eq!(cookie.get(), None);
}

#[test]
fn storage_mirror_matches_store() {
    let (store, storage, _cookie) = store_with_mirrors();
    store.set_auth("a1", "r1", student_user());
    assert_eq!(storage.load().unwrap(), store.session());

    store.update_access_token("a2");
    assert_eq!(storage.load().unwrap(), store.session());

    store.clear_auth();
    assert_eq!(storage.load().unwrap(), None);
}

// =============================================================================
// refresh-path mutation
// =============================================================================

#[test]
fn update_access_token_preserves_refresh_and_user() {
    let store = SessionStore::in_memory();
    store.set_auth("a1", "r1", student_user());
    store.update_access_token("a2");

    assert_eq!(store.access_token().as_deref(), Some("a2"));
    assert_eq!(store.refresh_token().as_deref(), Some("r1"));
    assert_eq!(store.user(), Some(student_user()));
}

#[test]
fn update_user_preserves_tokens() {
    let (store, _storage, cookie) = store_with_mirrors();
    store.set_auth("a1", "r1", student_user());
    store.update_user(admin_user());

    assert_eq!(store.access_token().as_deref(), Some("a1"));
    assert_eq!(store.refresh_token().as_deref(), Some("r1"));
    assert!(store.is_admin());
    let mirrored = crate::session::cookie::parse(&cookie.get().unwrap()).unwrap();
    assert_eq!(Some(mirrored), store.session());
}

#[test]
fn update_user_signed_out_is_noop() {
    let store = SessionStore::in_memory();
    store.update_user(student_user());
    assert!(!store.is_authenticated());
}

#[test]
fn update_access_token_signed_out_is_noop() {
    let store = SessionStore::in_memory();
    store.update_access_token("a2");
    assert!(!store.is_authenticated());
    assert_eq!(store.access_token(), None);
}

// =============================================================================
// startup restore
// =============================================================================

#[test]
fn persisted_session_is_restored_on_startup() {
    let storage = Arc::new(MemoryStorage::new());
    storage.save(&session("a1", "r1", admin_user())).unwrap();

    let cookie = Arc::new(MemoryCookieMirror::new());
    let store = SessionStore::new(storage, cookie.clone());

    assert!(store.is_authenticated());
    assert!(store.is_admin());
    // Cookie is re-asserted so the edge guard agrees with the restored session.
    let mirrored = crate::session::cookie::parse(&cookie.get().unwrap()).unwrap();
    assert_eq!(Some(mirrored), store.session());
}

#[test]
fn startup_without_persisted_session_clears_cookie() {
    let cookie = Arc::new(MemoryCookieMirror::new());
    cookie.write("stale-value");
    let store = SessionStore::new(Arc::new(MemoryStorage::new()), cookie.clone());
    assert!(!store.is_authenticated());
    assert_eq!(cookie.get(), None);
}

// =============================================================================
// shared handle semantics
// =============================================================================

#[test]
fn clones_observe_the_same_session() {
    let store = SessionStore::in_memory();
    let other = store.clone();
    store.set_auth("a1", "r1", student_user());
    assert!(other.is_authenticated());
    other.clear_auth();
    assert!(!store.is_authenticated());
}
