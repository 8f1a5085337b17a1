pub mod error;
pub mod routes;
pub mod state;

use axum::routing::{get, post, put};
use axum::Router;
use std::path::PathBuf;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the axum Router for a gapcheck root: config from
/// `.gapcheck/config.yaml` (defaults when absent) and the configured store.
pub fn build_router(root: PathBuf) -> anyhow::Result<Router> {
    let app_state = state::AppState::open(root)?;
    Ok(router(app_state))
}

/// Router with all API routes and middleware over an existing state.
pub fn router(app_state: state::AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Reports
        .route(
            "/api/reports",
            get(routes::reports::list_reports).post(routes::reports::create_report),
        )
        .route(
            "/api/reports/{slug}",
            get(routes::reports::get_report)
                .patch(routes::reports::patch_report)
                .delete(routes::reports::delete_report),
        )
        .route(
            "/api/reports/{slug}/fields",
            put(routes::reports::put_fields),
        )
        .route(
            "/api/reports/{slug}/import",
            post(routes::reports::import_report),
        )
        .route("/api/reports/{slug}/view", get(routes::reports::view_report))
        // Metrics for unsaved records
        .route("/api/metrics", post(routes::metrics::compute_metrics))
        // Shareable links
        .route("/reports/{slug}", get(routes::share::shared_report))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

/// Start the gapcheck server on `port`.
pub async fn serve(root: PathBuf, port: u16, open_browser: bool) -> anyhow::Result<()> {
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    serve_on(root, listener, open_browser).await
}

/// Start the gapcheck server on a pre-bound listener.
///
/// The caller can read the actual port before starting, which matters when
/// binding port 0.
pub async fn serve_on(
    root: PathBuf,
    listener: tokio::net::TcpListener,
    open_browser: bool,
) -> anyhow::Result<()> {
    let actual_port = listener.local_addr()?.port();
    let app = build_router(root)?;

    tracing::info!("gapcheck server listening on http://localhost:{actual_port}");

    if open_browser {
        let url = format!("http://localhost:{actual_port}/api/reports");
        if let Err(e) = open::that(&url) {
            tracing::warn!(error = %e, "failed to open browser");
        }
    }

    axum::serve(listener, app).await?;
    Ok(())
}
