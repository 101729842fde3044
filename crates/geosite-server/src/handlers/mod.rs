//! HTTP request handlers.

pub(crate) mod admin;
pub(crate) mod pages;

use axum::http::{HeaderMap, Uri, header};

/// Host the request was sent to: the `Host` header, else the URI authority.
pub(crate) fn request_host(headers: &HeaderMap, uri: &Uri) -> String {
    headers
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
        .or_else(|| uri.authority().map(|authority| authority.as_str()))
        .unwrap_or_default()
        .to_owned()
}
