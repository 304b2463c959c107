//! AspireBridge session core.
//!
//! ARCHITECTURE
//! ============
//! Three collaborating pieces back every authenticated flow in the
//! AspireBridge client:
//!
//! - [`session::SessionStore`] — the single source of truth for the current
//!   `{access token, refresh token, user}` triple, mirrored to durable
//!   storage and to a request-visible cookie on every mutation.
//! - [`client::ApiClient`] — bearer-decorated HTTP layer that transparently
//!   recovers from an expired access token with a single, coalesced refresh.
//! - [`guard`] — edge middleware that gates navigations from the cookie
//!   mirror alone, before any page code runs.
//!
//! TRUST BOUNDARY
//! ==============
//! The guard is advisory UX routing only. The cookie is client-writable, so
//! nothing here is a security boundary; the backend re-checks authorization
//! on every request it serves.

pub mod client;
pub mod config;
pub mod guard;
pub mod paths;
pub mod session;
