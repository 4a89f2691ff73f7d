use std::sync::Arc;

use axum::Router;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use tower_http::trace::TraceLayer;

use crate::service::docs::{
    get_generated_handler, get_metadata_handler, get_static_handler, get_static_root_handler,
};
use crate::utils::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(|| async { StatusCode::OK.into_response() }))
        // a wildcard never matches an empty tail
        .route("/static/docs/", get(get_static_root_handler))
        .route("/static/docs/{*path}", get(get_static_handler))
        .route(
            "/metadata/techdocs/{namespace}/{kind}/{name}",
            get(get_metadata_handler),
        )
        .route(
            "/docs/{namespace}/{kind}/{name}/generated",
            get(get_generated_handler),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
