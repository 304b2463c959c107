//! AspireBridge edge gateway.
//!
//! Mounts the route guard in front of the app origin: every navigation is
//! decided from the session cookie first, then allowed requests are proxied
//! upstream. The guard is UX routing only; the backend authorizes every
//! request on its own.

use axum::Router;
use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::{HeaderName, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;

use aspirebridge::config::GatewayConfig;
use aspirebridge::guard;

/// Request/response headers owned by the hops, never forwarded.
const HOP_HEADERS: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
    "host",
    "content-length",
];

const MAX_PROXY_BODY_BYTES: usize = 10 * 1024 * 1024;

#[derive(Clone)]
struct GatewayState {
    http: reqwest::Client,
    upstream_url: String,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = GatewayConfig::from_env().expect("gateway config");
    let http = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .build()
        .expect("failed to build proxy client");

    let state = GatewayState { http, upstream_url: config.upstream_url.clone() };

    let app = Router::new()
        .route("/healthz", get(healthz))
        .fallback(proxy)
        .layer(axum::middleware::from_fn(guard::route_guard))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port))
        .await
        .expect("failed to bind");

    tracing::info!(port = config.port, upstream = %config.upstream_url, "aspirebridge gateway listening");
    axum::serve(listener, app).await.expect("server failed");
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

fn is_hop_header(name: &str) -> bool {
    HOP_HEADERS.iter().any(|h| name.eq_ignore_ascii_case(h))
}

/// Join the upstream origin with the request's path and query.
fn upstream_url(upstream: &str, path_and_query: &str) -> String {
    format!("{upstream}{path_and_query}")
}

/// Forward an allowed request to the app origin and relay the response.
async fn proxy(State(state): State<GatewayState>, request: Request) -> Response {
    let path_and_query = request
        .uri()
        .path_and_query()
        .map_or_else(|| request.uri().path().to_owned(), ToString::to_string);
    let url = upstream_url(&state.upstream_url, &path_and_query);

    let Ok(method) = reqwest::Method::from_bytes(request.method().as_str().as_bytes()) else {
        return StatusCode::METHOD_NOT_ALLOWED.into_response();
    };

    let mut builder = state.http.request(method, &url);
    for (name, value) in request.headers() {
        if !is_hop_header(name.as_str()) {
            builder = builder.header(name, value);
        }
    }

    let body = match axum::body::to_bytes(request.into_body(), MAX_PROXY_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(error = %e, "failed to read request body");
            return StatusCode::PAYLOAD_TOO_LARGE.into_response();
        }
    };
    if !body.is_empty() {
        builder = builder.body(body);
    }

    let upstream_response = match builder.send().await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(error = %e, %url, "upstream request failed");
            return (StatusCode::BAD_GATEWAY, "upstream unavailable").into_response();
        }
    };

    let status = StatusCode::from_u16(upstream_response.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
    let mut response = Response::builder().status(status);
    for (name, value) in upstream_response.headers() {
        if !is_hop_header(name.as_str()) {
            if let Ok(header_name) = HeaderName::try_from(name.as_str()) {
                response = response.header(header_name, value.as_bytes());
            }
        }
    }

    let bytes = match upstream_response.bytes().await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::error!(error = %e, "failed to read upstream body");
            return (StatusCode::BAD_GATEWAY, "upstream unavailable").into_response();
        }
    };

    response
        .body(Body::from(bytes))
        .unwrap_or_else(|_| StatusCode::BAD_GATEWAY.into_response())
}
