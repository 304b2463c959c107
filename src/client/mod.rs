//! Outbound HTTP: bearer decoration and the one-shot refresh protocol.

pub mod api;
pub mod transport;

pub use api::{ApiClient, ApiError, Navigator, NoopNavigator};
pub use transport::{ApiRequest, ApiResponse, HttpTransport, Method, ReqwestTransport, TransportError};
