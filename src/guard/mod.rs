//! Edge route guard.
//!
//! Gates every incoming navigation from the session cookie alone, before
//! any page code runs. Advisory UX routing only — the cookie is
//! client-writable, so the backend must re-check authorization on every
//! request it serves.

pub mod middleware;
pub mod policy;

pub use middleware::route_guard;
pub use policy::{RouteDecision, decide};
