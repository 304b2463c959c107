//! Pure routing decisions.
//!
//! The decision never touches IO: it takes the request path and the
//! already-parsed cookie session and says allow or redirect. Anything the
//! cookie parser rejected arrives here as `None`, so every malformed
//! payload lands on the unauthenticated branch (fail closed).

use crate::paths;
use crate::session::Session;

/// What the guard should do with a navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    Allow,
    Redirect(&'static str),
}

/// Paths reachable without a session.
const PUBLIC_EXACT: &[&str] = &["/", paths::LOGIN, paths::REGISTER, "/about", "/contact", "/opportunities"];

/// Prefixes reachable without a session: public opportunity detail pages,
/// static assets, API passthrough, and the health endpoint.
const PUBLIC_PREFIXES: &[&str] = &["/opportunities/", "/assets/", "/api/", "/healthz"];

fn is_public(path: &str) -> bool {
    PUBLIC_EXACT.contains(&path) || PUBLIC_PREFIXES.iter().any(|prefix| path.starts_with(prefix))
}

fn is_admin_path(path: &str) -> bool {
    path == paths::ADMIN_HOME || path.starts_with("/admin/")
}

/// Decide a navigation from its path and the cookie-derived session.
#[must_use]
pub fn decide(path: &str, session: Option<&Session>) -> RouteDecision {
    let Some(session) = session else {
        if is_public(path) {
            return RouteDecision::Allow;
        }
        return RouteDecision::Redirect(paths::LOGIN);
    };

    let is_admin = session.user.role.is_admin();

    // Authenticated users never see the login or register forms; send them
    // to their role's landing page instead.
    if path == paths::LOGIN || path == paths::REGISTER {
        let landing = if is_admin { paths::ADMIN_HOME } else { paths::DASHBOARD };
        return RouteDecision::Redirect(landing);
    }

    if is_admin_path(path) && !is_admin {
        return RouteDecision::Redirect(paths::DASHBOARD);
    }

    RouteDecision::Allow
}

#[cfg(test)]
#[path = "policy_test.rs"]
mod tests;
