use crate::domain::EntityIdentity;
use crate::error::AppError;
use crate::service::publisher::DocsPublisher;
use crate::storage::paths::request_key;
use crate::utils::headers::headers_for_path;
use crate::utils::state::AppState;
use axum::Json;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde_json::json;
use std::sync::Arc;

/// GET /static/docs/<key>
pub async fn get_static_handler(
    State(state): State<Arc<AppState>>,
    Path(path): Path<String>,
) -> Response {
    serve_object(&state.publisher, &path).await
}

/// GET /static/docs/
pub async fn get_static_root_handler(State(state): State<Arc<AppState>>) -> Response {
    serve_object(&state.publisher, "").await
}

/// Buffers the whole object and answers with it, or with 404 and the
/// error message when it cannot be read.
pub async fn serve_object(publisher: &DocsPublisher, request_path: &str) -> Response {
    let key = request_key(request_path);
    match publisher.read_object(&key).await {
        Ok(body) => (StatusCode::OK, headers_for_path(&key), body).into_response(),
        Err(e) => {
            tracing::debug!("Unable to serve {}: {}", key, e);
            (StatusCode::NOT_FOUND, e.to_string()).into_response()
        }
    }
}

/// GET /metadata/techdocs/<namespace>/<kind>/<name>
pub async fn get_metadata_handler(
    State(state): State<Arc<AppState>>,
    Path((namespace, kind, name)): Path<(String, String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let entity = EntityIdentity::new(namespace, kind, name)?;
    let metadata = state.publisher.fetch_metadata(&entity).await?;
    Ok(([(header::CONTENT_TYPE, "application/json")], metadata))
}

/// GET /docs/<namespace>/<kind>/<name>/generated
pub async fn get_generated_handler(
    State(state): State<Arc<AppState>>,
    Path((namespace, kind, name)): Path<(String, String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let entity = EntityIdentity::new(namespace, kind, name)?;
    let generated = state.publisher.has_docs_been_generated(&entity).await;
    Ok(Json(json!({ "generated": generated })))
}
