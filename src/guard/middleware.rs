//! Axum adapter for the route guard.

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar};

use super::policy::{self, RouteDecision};
use crate::session::cookie;

/// Guard middleware for `axum::middleware::from_fn`.
///
/// Reads the session cookie from the incoming headers, applies the routing
/// policy, and either forwards to the inner service or redirects.
pub async fn route_guard(request: Request, next: Next) -> Response {
    let jar = CookieJar::from_headers(request.headers());
    let session = jar
        .get(cookie::SESSION_COOKIE)
        .map(Cookie::value)
        .and_then(cookie::parse);

    match policy::decide(request.uri().path(), session.as_ref()) {
        RouteDecision::Allow => next.run(request).await,
        RouteDecision::Redirect(target) => {
            tracing::debug!(path = %request.uri().path(), %target, "navigation redirected");
            Redirect::temporary(target).into_response()
        }
    }
}
