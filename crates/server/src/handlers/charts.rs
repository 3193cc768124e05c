//! Chart API: uploads, listing, lookup and deletion.

use super::tenant;
use crate::error::{ApiError, ApiResult};
use crate::repo::{Deleted, FormFields, Saved};
use crate::state::AppState;
use axum::Json;
use axum::extract::{FromRequest, Multipart, Path, Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, StatusCode};
use bytes::Bytes;
use chartroom_core::ChartVersion;
use std::collections::BTreeMap;

/// POST /api/{repo}/charts - upload a package, or a package and provenance
/// file as `multipart/form-data`.
pub async fn upload_chart(
    State(state): State<AppState>,
    Path(repo): Path<String>,
    request: Request,
) -> ApiResult<(StatusCode, Json<Saved>)> {
    let tenant = tenant(&repo)?;

    let saved = if is_multipart(request.headers()) {
        let fields = read_form(&state, request).await?;
        state.repo.ingest_form(&tenant, fields).await?
    } else {
        let body = read_body(&state, request).await?;
        state.repo.ingest_single(&tenant, body).await?
    };

    Ok((StatusCode::CREATED, Json(saved)))
}

/// POST /api/{repo}/prov - upload a provenance file.
pub async fn upload_provenance(
    State(state): State<AppState>,
    Path(repo): Path<String>,
    request: Request,
) -> ApiResult<(StatusCode, Json<Saved>)> {
    let tenant = tenant(&repo)?;
    let body = read_body(&state, request).await?;
    let saved = state.repo.ingest_provenance(&tenant, body).await?;
    Ok((StatusCode::CREATED, Json(saved)))
}

/// GET /api/{repo}/charts - all charts and versions.
pub async fn list_charts(
    State(state): State<AppState>,
    Path(repo): Path<String>,
) -> ApiResult<Json<BTreeMap<String, Vec<ChartVersion>>>> {
    let tenant = tenant(&repo)?;
    Ok(Json(state.repo.fetch_all_charts(&tenant).await?))
}

/// GET /api/{repo}/charts/{name} - every version of one chart.
pub async fn get_chart(
    State(state): State<AppState>,
    Path((repo, name)): Path<(String, String)>,
) -> ApiResult<Json<Vec<ChartVersion>>> {
    let tenant = tenant(&repo)?;
    Ok(Json(state.repo.fetch_chart(&tenant, &name).await?))
}

/// GET /api/{repo}/charts/{name}/{version} - one version, or `latest`.
pub async fn get_chart_version(
    State(state): State<AppState>,
    Path((repo, name, version)): Path<(String, String, String)>,
) -> ApiResult<Json<ChartVersion>> {
    let tenant = tenant(&repo)?;
    Ok(Json(
        state
            .repo
            .fetch_chart_version(&tenant, &name, &version)
            .await?,
    ))
}

/// DELETE /api/{repo}/charts/{name}/{version}
pub async fn delete_chart_version(
    State(state): State<AppState>,
    Path((repo, name, version)): Path<(String, String, String)>,
) -> ApiResult<Json<Deleted>> {
    let tenant = tenant(&repo)?;
    Ok(Json(
        state.repo.delete_artifact(&tenant, &name, &version).await?,
    ))
}

fn is_multipart(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case("multipart/form-data"))
}

async fn read_body(state: &AppState, request: Request) -> ApiResult<Bytes> {
    axum::body::to_bytes(request.into_body(), state.config.server.max_upload_size)
        .await
        .map_err(|e| ApiError::Io(e.to_string()))
}

/// Collect the configured form fields. Other parts are skipped unread.
async fn read_form(state: &AppState, request: Request) -> ApiResult<FormFields> {
    let mut multipart = Multipart::from_request(request, state)
        .await
        .map_err(|e| ApiError::BadRequest(format!("invalid multipart form: {e}")))?;

    let policy = state.repo.policy();
    let mut fields = FormFields::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Io(e.to_string()))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        if !policy.is_form_field(&name) || fields.contains(&name) {
            continue;
        }
        let content = field.bytes().await.map_err(|e| ApiError::Io(e.to_string()))?;
        fields.insert(name, content);
    }

    Ok(fields)
}
