//! Route configuration.

use crate::handlers;
use crate::metrics::metrics_handler;
use crate::state::AppState;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

/// Create the application router.
///
/// `{repo}` names the tenant. `api`, `health` and `metrics` are reserved and
/// never parse as tenant names, so the static routes cannot be shadowed.
pub fn create_router(state: AppState) -> Router {
    let mut chart_version = get(handlers::get_chart_version);
    if !state.config.repo.disable_delete {
        chart_version = chart_version.delete(handlers::delete_chart_version);
    }

    let api_routes = Router::new()
        .route(
            "/api/{repo}/charts",
            get(handlers::list_charts).post(handlers::upload_chart),
        )
        .route("/api/{repo}/charts/{name}", get(handlers::get_chart))
        .route("/api/{repo}/charts/{name}/{version}", chart_version)
        .route("/api/{repo}/prov", post(handlers::upload_provenance));

    let repo_routes = Router::new()
        .route("/{repo}/index.yaml", get(handlers::get_index))
        .route("/{repo}/charts/{filename}", get(handlers::get_artifact));

    let mut router = Router::new()
        .route("/health", get(handlers::health_check))
        .merge(api_routes)
        .merge(repo_routes);

    // Must be network-restricted when enabled; see crate::metrics.
    if state.config.server.metrics_enabled {
        router = router.route("/metrics", get(metrics_handler));
    }

    router
        .layer(DefaultBodyLimit::max(state.config.server.max_upload_size))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
