//! Environment-driven configuration.

const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";
const DEFAULT_UPSTREAM_URL: &str = "http://localhost:3001";
const DEFAULT_PORT: u16 = 3000;

/// Backend API configuration. One base URL; every endpoint hangs off it.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    base_url: String,
}

impl ApiConfig {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Self { base_url }
    }

    /// Load from `API_BASE_URL`, falling back to the local dev backend.
    #[must_use]
    pub fn from_env() -> Self {
        let base_url = std::env::var("API_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_owned());
        Self::new(base_url)
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Join an absolute endpoint path (leading `/`) onto the base URL.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// `POST` with `{email, password}`, returns the access/refresh pair.
    #[must_use]
    pub fn token_url(&self) -> String {
        self.url("/auth/token")
    }

    /// `POST` with `{refresh}`, returns a fresh access token.
    #[must_use]
    pub fn token_refresh_url(&self) -> String {
        self.url("/auth/token/refresh")
    }

    /// `GET`, returns the current user record.
    #[must_use]
    pub fn me_url(&self) -> String {
        self.url("/users/me")
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid PORT value {0:?}")]
    InvalidPort(String),
}

/// Edge gateway configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Port the gateway listens on.
    pub port: u16,
    /// App origin requests are proxied to after the guard allows them.
    pub upstream_url: String,
}

impl GatewayConfig {
    /// Load from `PORT` and `UPSTREAM_URL`, with local-dev defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = match std::env::var("PORT") {
            Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidPort(raw))?,
            Err(_) => DEFAULT_PORT,
        };
        let upstream_url = std::env::var("UPSTREAM_URL")
            .unwrap_or_else(|_| DEFAULT_UPSTREAM_URL.to_owned())
            .trim_end_matches('/')
            .to_owned();
        Ok(Self { port, upstream_url })
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
