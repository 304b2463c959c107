//! The session store.
//!
//! DESIGN
//! ======
//! One shared, cloneable handle owns the current session. All mutation goes
//! through `set_auth` / `update_access_token` / `clear_auth`, which write
//! the storage blob and the cookie mirror before the in-memory value, under
//! the write lock. The cookie and storage therefore never desynchronize
//! from what page code observes, and the token/user pairing invariant holds
//! by construction (`Option<Session>` — never half a session).
//!
//! TRADE-OFFS
//! ==========
//! Mirror failures are logged and swallowed: the in-memory session stays
//! authoritative for the running client, so a full disk or a blocked cookie
//! write degrades persistence, not the session itself.

use std::sync::{Arc, Mutex, RwLock};

use super::cookie;
use super::storage::{MemoryStorage, SessionStorage};
use super::types::{Session, SessionUser};

/// Sink for the request-visible cookie mirror. In a browser deployment the
/// embedder maps this onto `document.cookie`; the edge guard only ever
/// reads the request header.
pub trait CookieMirror: Send + Sync {
    /// Write the encoded session payload under the session cookie.
    fn write(&self, value: &str);
    /// Expire the session cookie.
    fn clear(&self);
}

/// In-memory cookie sink for tests and embedders without a real jar.
#[derive(Default)]
pub struct MemoryCookieMirror {
    value: Mutex<Option<String>>,
}

impl MemoryCookieMirror {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current cookie value, as the guard would receive it.
    #[must_use]
    pub fn get(&self) -> Option<String> {
        self.value.lock().expect("cookie lock poisoned").clone()
    }
}

impl CookieMirror for MemoryCookieMirror {
    fn write(&self, value: &str) {
        *self.value.lock().expect("cookie lock poisoned") = Some(value.to_owned());
    }

    fn clear(&self) {
        *self.value.lock().expect("cookie lock poisoned") = None;
    }
}

/// Single source of truth for the current session.
#[derive(Clone)]
pub struct SessionStore {
    session: Arc<RwLock<Option<Session>>>,
    storage: Arc<dyn SessionStorage>,
    cookie: Arc<dyn CookieMirror>,
}

impl SessionStore {
    /// Create a store over the given mirrors, loading any persisted session.
    /// A load failure is logged and treated as no session.
    #[must_use]
    pub fn new(storage: Arc<dyn SessionStorage>, cookie: Arc<dyn CookieMirror>) -> Self {
        let initial = storage.load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "failed to load stored session, starting signed out");
            None
        });
        // Re-assert the cookie mirror so the guard agrees with the restored
        // session even if the cookie was lost independently.
        match &initial {
            Some(session) => cookie.write(&cookie::encode(session)),
            None => cookie.clear(),
        }
        Self { session: Arc::new(RwLock::new(initial)), storage, cookie }
    }

    /// Fully in-memory store (tests, ephemeral embedders).
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()), Arc::new(MemoryCookieMirror::new()))
    }

    // =========================================================================
    // MUTATION
    // =========================================================================

    /// Establish a new session: both tokens and the user, together.
    pub fn set_auth(&self, access_token: &str, refresh_token: &str, user: SessionUser) {
        self.apply(Some(Session {
            access_token: access_token.to_owned(),
            refresh_token: refresh_token.to_owned(),
            user,
        }));
    }

    /// Replace only the access token, preserving refresh token and user.
    /// Used exclusively by the refresh protocol. No-op when signed out.
    pub fn update_access_token(&self, new_token: &str) {
        let mut guard = self.session.write().expect("session lock poisoned");
        let Some(current) = guard.as_ref() else {
            tracing::warn!("update_access_token with no active session ignored");
            return;
        };
        let mut next = current.clone();
        next.access_token = new_token.to_owned();
        self.write_mirrors(Some(&next));
        *guard = Some(next);
    }

    /// Replace only the identity snapshot, preserving both tokens. Used
    /// after profile edits and re-fetches. No-op when signed out.
    pub fn update_user(&self, user: SessionUser) {
        let mut guard = self.session.write().expect("session lock poisoned");
        let Some(current) = guard.as_ref() else {
            tracing::warn!("update_user with no active session ignored");
            return;
        };
        let mut next = current.clone();
        next.user = user;
        self.write_mirrors(Some(&next));
        *guard = Some(next);
    }

    /// Tear the session down: tokens, user, storage blob, and cookie.
    pub fn clear_auth(&self) {
        self.apply(None);
    }

    fn apply(&self, next: Option<Session>) {
        let mut guard = self.session.write().expect("session lock poisoned");
        self.write_mirrors(next.as_ref());
        *guard = next;
    }

    /// Write storage and cookie for the pending state. Called under the
    /// write lock so no reader observes a mirror ahead of memory.
    fn write_mirrors(&self, next: Option<&Session>) {
        match next {
            Some(session) => {
                if let Err(e) = self.storage.save(session) {
                    tracing::warn!(error = %e, "failed to persist session, keeping it in memory");
                }
                self.cookie.write(&cookie::encode(session));
            }
            None => {
                if let Err(e) = self.storage.clear() {
                    tracing::warn!(error = %e, "failed to clear persisted session");
                }
                self.cookie.clear();
            }
        }
    }

    // =========================================================================
    // READS
    // =========================================================================

    /// True iff both an access token and a user are present.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.read(|s| !s.access_token.is_empty()).unwrap_or(false)
    }

    /// True iff the current user's normalized role is admin.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.read(|s| s.user.role.is_admin()).unwrap_or(false)
    }

    /// True iff a refresh token is present. Expiry is only ever discovered
    /// by a failed refresh call; there is no client-side introspection.
    #[must_use]
    pub fn has_valid_refresh_token(&self) -> bool {
        self.read(|s| !s.refresh_token.is_empty()).unwrap_or(false)
    }

    #[must_use]
    pub fn access_token(&self) -> Option<String> {
        self.read(|s| s.access_token.clone())
    }

    #[must_use]
    pub fn refresh_token(&self) -> Option<String> {
        self.read(|s| s.refresh_token.clone()).filter(|t| !t.is_empty())
    }

    #[must_use]
    pub fn user(&self) -> Option<SessionUser> {
        self.read(|s| s.user.clone())
    }

    /// Snapshot of the full session.
    #[must_use]
    pub fn session(&self) -> Option<Session> {
        self.read(Clone::clone)
    }

    fn read<T>(&self, f: impl FnOnce(&Session) -> T) -> Option<T> {
        self.session.read().expect("session lock poisoned").as_ref().map(f)
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
