use axum::{
    http::{header, HeaderValue},
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};
use tracing::debug;

use crate::api::handlers::{self, health, SharedTracker};

/// Create the application router around a loaded tracker
pub fn create_app(tracker: SharedTracker) -> Router {
    debug!("Creating application router");

    let api_routes = Router::new()
        .route("/readings", get(handlers::list_readings).post(handlers::create_reading))
        .route("/readings/:id", delete(handlers::delete_reading))
        .route("/classify", get(handlers::classify_pressure))
        .route("/categories", get(handlers::list_categories))
        .route("/statistics", get(handlers::get_statistics))
        .route("/chart", get(handlers::get_chart))
        .route("/settings", get(handlers::get_settings).put(handlers::update_settings))
        .route("/settings/dark-mode", post(handlers::toggle_dark_mode));

    debug!("API routes configured");

    // Reports are never cached
    let report_routes = Router::new()
        .route("/report", get(handlers::get_report))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ));

    let app = Router::new()
        .route("/health", get(handlers::health_check))
        .merge(report_routes)
        .nest("/api/v1", api_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(tracker);

    // Initialize health check service startup time
    health::initialize_server_start_time();
    debug!("Health check service initialized");

    app
}
