//! Helm client endpoints: the index and raw artifact downloads.

use super::tenant;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};

/// Content type of `index.yaml`.
pub const INDEX_CONTENT_TYPE: &str = "application/x-yaml";

/// GET /{repo}/index.yaml
pub async fn get_index(
    State(state): State<AppState>,
    Path(repo): Path<String>,
) -> ApiResult<Response> {
    let tenant = tenant(&repo)?;
    let index = state.repo.fetch_index(&tenant).await?;
    let yaml = index.to_yaml().map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok((StatusCode::OK, [(CONTENT_TYPE, INDEX_CONTENT_TYPE)], yaml).into_response())
}

/// GET /{repo}/charts/{filename}
pub async fn get_artifact(
    State(state): State<AppState>,
    Path((repo, filename)): Path<(String, String)>,
) -> ApiResult<Response> {
    let tenant = tenant(&repo)?;
    let object = state.repo.fetch_raw_object(&tenant, &filename).await?;
    let content_type = object
        .content_type
        .unwrap_or_else(|| "application/octet-stream".to_string());

    Ok((StatusCode::OK, [(CONTENT_TYPE, content_type)], object.content).into_response())
}
