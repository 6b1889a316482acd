//! Web application router and middleware setup.

use crate::web::config::WebConfig;
use crate::web::handlers::{self, AppState};
use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Create the axum application with all routes and middleware.
pub fn create_app(config: &WebConfig, state: AppState) -> Router {
    let mut app = Router::new()
        .route("/api", get(handlers::api_root))
        .route("/api/cpu", get(handlers::get_cpu))
        .route("/api/ram", get(handlers::get_ram))
        .route("/api/disks", get(handlers::get_disks))
        .route("/api/network", get(handlers::get_network))
        .route("/api/gpus", get(handlers::get_gpus))
        .route("/api/containers", get(handlers::get_containers))
        .route("/api/ports", get(handlers::get_ports))
        .route("/api/processes", get(handlers::get_processes))
        .route("/api/sys", get(handlers::get_snapshot))
        .with_state(state);

    if config.enable_cors {
        app = app.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
    }

    app.layer(TraceLayer::new_for_http())
}
