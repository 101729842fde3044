//! Page endpoints.
//!
//! Resolves `GET /` and `GET /{page}` by the request host and returns HTML.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use geosite_site::{PageRequest, PageStatus};
use md5::{Digest, Md5};

use crate::handlers::request_host;
use crate::state::AppState;

/// Header set by proxies that terminate TLS.
const FORWARDED_PROTO: &str = "x-forwarded-proto";

/// Content type of every page response.
const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// Handle GET / (home page of the host).
pub(crate) async fn get_home(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    uri: Uri,
) -> Response {
    respond(&state, &headers, &uri, None)
}

/// Handle GET /{page}.
pub(crate) async fn get_page(
    Path(page): Path<String>,
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    uri: Uri,
) -> Response {
    respond(&state, &headers, &uri, Some(page))
}

/// Shared implementation for page responses.
fn respond(state: &AppState, headers: &HeaderMap, uri: &Uri, page: Option<String>) -> Response {
    let request = PageRequest {
        host: request_host(headers, uri),
        page,
        scheme: forwarded_proto(headers),
    };

    let response = state.site.respond(&request);

    if response.status == PageStatus::NotFound {
        return (
            StatusCode::NOT_FOUND,
            [(header::CONTENT_TYPE, HTML_CONTENT_TYPE.to_owned())],
            response.body,
        )
            .into_response();
    }

    let etag = compute_etag(&state.version, &response.body);

    if let Some(if_none_match) = headers.get(header::IF_NONE_MATCH)
        && if_none_match.as_bytes() == etag.as_bytes()
    {
        return StatusCode::NOT_MODIFIED.into_response();
    }

    (
        [
            (header::CONTENT_TYPE, HTML_CONTENT_TYPE.to_owned()),
            (header::ETAG, etag),
            (header::CACHE_CONTROL, "public, max-age=300".to_owned()),
        ],
        response.body,
    )
        .into_response()
}

/// Scheme from `X-Forwarded-Proto` (first entry), if it is http or https.
fn forwarded_proto(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(FORWARDED_PROTO)?.to_str().ok()?;
    let proto = value.split(',').next()?.trim().to_ascii_lowercase();
    matches!(proto.as_str(), "http" | "https").then_some(proto)
}

/// Compute `ETag` from version and content.
///
/// Uses MD5 hash truncated to 64 bits (16 hex chars).
fn compute_etag(version: &str, content: &str) -> String {
    let hash = Md5::digest(format!("{version}:{content}").as_bytes());
    format!("\"{}\"", &hex::encode(hash)[..16])
}
