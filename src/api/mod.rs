mod handlers;
mod middleware;

use axum::{middleware::from_fn_with_state, routing::get, Router};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::config::Config;

pub use handlers::{AppState, ErrorBody};

pub fn create_router(state: AppState, config: &Config) -> Router {
    let api = Router::new()
        // Manifest
        .route("/meta", get(handlers::get_meta))
        .route("/entries", get(handlers::list_entries))
        .route("/structures/{key}", get(handlers::get_structure))
        // Lookups
        .route("/lookup", get(handlers::lookup))
        .route(
            "/reference/{structure_key}/{entry}/{version}",
            get(handlers::reference),
        )
        .route(
            "/compare/{structure_key}/{entry1}/{version1}/{entry2}/{version2}",
            get(handlers::compare),
        )
        // Templates
        .route("/templates/{structure_key}/{entry}", get(handlers::entry_template))
        // Health
        .route("/health", get(handlers::health))
        .layer(from_fn_with_state(state.clone(), middleware::record_visit));

    Router::new()
        .nest("/api/v1", api)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(config.cors_layer()),
        )
        .with_state(state)
}
