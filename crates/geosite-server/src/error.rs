//! Error types for the HTTP server.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Server error type.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Geo data could not be loaded.
    #[error("Geo load failed: {0}")]
    Geo(#[from] geosite_geo::GeoError),

    /// Malformed admin request.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Listen address could not be parsed.
    #[error("Invalid listen address: {0}")]
    Address(#[from] std::net::AddrParseError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Geo(_) | Self::Address(_) | Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, axum::Json(json!({"error": self.to_string()}))).into_response()
    }
}
