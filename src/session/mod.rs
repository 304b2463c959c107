//! Session state: the token/user triple, its durable mirrors, and the
//! restricted mutation API every other component goes through.

pub mod cookie;
pub mod storage;
pub mod store;
pub mod types;

pub use store::{CookieMirror, MemoryCookieMirror, SessionStore};
pub use types::{Role, Session, SessionUser};
