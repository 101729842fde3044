//! Router construction.
//!
//! Builds the axum router with all routes and middleware.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware::security;
use crate::state::AppState;

/// Create the application router.
pub(crate) fn create_router(state: Arc<AppState>) -> Router {
    let admin_routes = Router::new()
        .route("/api/invalidate", post(handlers::admin::invalidate))
        .route("/api/geo/reload", post(handlers::admin::reload_geo));

    Router::new()
        .route("/", get(handlers::pages::get_home))
        .route("/{page}", get(handlers::pages::get_page))
        .merge(admin_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(security::content_type_options_layer())
                .layer(security::frame_options_layer()),
        )
        .with_state(state)
}
