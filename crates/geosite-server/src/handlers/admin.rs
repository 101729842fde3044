//! Admin endpoints: cache invalidation and geo reload.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, Uri};
use geosite_geo::GeoIndex;
use geosite_site::{HostInfo, InvalidationScope};
use serde::{Deserialize, Serialize};

use crate::error::ServerError;
use crate::handlers::request_host;
use crate::state::AppState;

/// Query of POST /api/invalidate.
#[derive(Debug, Deserialize)]
pub(crate) struct InvalidateQuery {
    /// `all`, or absent for the request's domain.
    scope: Option<String>,
}

/// Response for POST /api/invalidate.
#[derive(Debug, Serialize)]
pub(crate) struct InvalidateResponse {
    /// Domain that was invalidated, or `*` for everything.
    invalidated: String,
}

/// Response for POST /api/geo/reload.
#[derive(Debug, Serialize)]
pub(crate) struct ReloadResponse {
    states: usize,
    cities: usize,
    records: usize,
}

/// Handle POST /api/invalidate.
///
/// Without a scope, invalidates the root domain of the request host.
pub(crate) async fn invalidate(
    State(state): State<Arc<AppState>>,
    Query(query): Query<InvalidateQuery>,
    headers: HeaderMap,
    uri: Uri,
) -> Result<Json<InvalidateResponse>, ServerError> {
    let scope = match query.scope.as_deref() {
        Some("all") => InvalidationScope::All,
        None | Some("domain") => {
            let host = HostInfo::parse(
                &request_host(&headers, &uri),
                state.site.config().root_labels,
            )
            .map_err(|e| ServerError::BadRequest(e.to_string()))?;
            InvalidationScope::Domain(host.root_domain)
        }
        Some(other) => {
            return Err(ServerError::BadRequest(format!(
                "Unknown invalidation scope '{other}'"
            )));
        }
    };

    state.site.invalidate(&scope);

    let invalidated = match scope {
        InvalidationScope::Domain(domain) => domain,
        InvalidationScope::All => "*".to_owned(),
    };
    Ok(Json(InvalidateResponse { invalidated }))
}

/// Handle POST /api/geo/reload.
///
/// Builds a new index from the database and swaps it in. On failure the
/// current index stays in place.
pub(crate) async fn reload_geo(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ReloadResponse>, ServerError> {
    let _guard = state.reload_lock.lock().await;

    let records = geosite_geo::load_sqlite(&state.database)
        .await
        .inspect_err(|e| tracing::warn!(error = %e, "Geo reload failed, keeping current index"))?;
    let index = Arc::new(GeoIndex::from_records(records));

    let response = ReloadResponse {
        states: index.state_count(),
        cities: index.city_count(),
        records: index.record_count(),
    };
    tracing::info!(
        states = response.states,
        cities = response.cities,
        records = response.records,
        "Reloaded geo index"
    );
    state.site.replace_geo_index(index);

    Ok(Json(response))
}
