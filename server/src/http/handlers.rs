use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use shared_types::ArtifactName;
use std::sync::Arc;
use tracing::{info, instrument};

use super::{
    dto::{ListArtifactsResponse, ListVersionsResponse, MessageResponse},
    error::{ApiError, ApiResult},
    state::AppState,
};
use crate::store::{DeleteOutcome, StoreError, UpdateOutcome};

fn artifact_name(raw: &str) -> Result<ArtifactName, ApiError> {
    ArtifactName::new(raw).map_err(|e| ApiError::Store(StoreError::InvalidName(e)))
}

/// GET /health
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "config-archive",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// GET /artifacts
/// List the names of all current artifacts
#[instrument(skip(state))]
pub async fn list_artifacts(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<ListArtifactsResponse>> {
    let artifacts = state.store.list_artifacts().await?;
    Ok(Json(ListArtifactsResponse { artifacts }))
}

/// GET /artifacts/:name
/// Return the current content of an artifact as plain text
#[instrument(skip(state))]
pub async fn get_artifact(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> ApiResult<String> {
    let name = artifact_name(&name)?;
    Ok(state.store.get_current(&name).await?)
}

/// GET /artifacts/:name/versions
/// List archived version timestamps, most recent first
#[instrument(skip(state))]
pub async fn list_versions(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> ApiResult<Json<ListVersionsResponse>> {
    let name = artifact_name(&name)?;
    let versions = state
        .store
        .list_versions(&name)
        .await?
        .iter()
        .map(ToString::to_string)
        .collect();
    Ok(Json(ListVersionsResponse { versions }))
}

/// GET /artifacts/:name/versions/:version
/// Return the archived content at the given timestamp
#[instrument(skip(state))]
pub async fn get_artifact_version(
    State(state): State<Arc<AppState>>,
    Path((name, version)): Path<(String, String)>,
) -> ApiResult<String> {
    let name = artifact_name(&name)?;
    Ok(state.store.get_version(&name, &version).await?)
}

/// PUT /artifacts/:name
/// Create or update an artifact from the raw request body.
///
/// Returns 202 on create/update: the backend confirms our own write,
/// but propagation to consumers of the backend is still asynchronous.
#[instrument(skip(state, body))]
pub async fn put_artifact(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    body: String,
) -> ApiResult<(StatusCode, Json<MessageResponse>)> {
    let name = artifact_name(&name)?;
    info!("Putting artifact: {name}");

    let (status, message) = match state.store.put(&name, &body).await? {
        UpdateOutcome::Created => (
            StatusCode::ACCEPTED,
            format!("A new artifact {name} is being created."),
        ),
        UpdateOutcome::Updated => (
            StatusCode::ACCEPTED,
            format!("The existing artifact {name} is being updated."),
        ),
        UpdateOutcome::Unchanged => (
            StatusCode::OK,
            format!(
                "The provided body is identical to the current {name}. No action will be taken."
            ),
        ),
        UpdateOutcome::Invalid(diagnostics) => {
            return Err(ApiError::BadRequest(format!(
                "No action taken, content failed validation: {diagnostics}"
            )));
        }
    };
    Ok((status, Json(MessageResponse { message })))
}

/// DELETE /artifacts/:name
/// Remove the current value and all archived versions
#[instrument(skip(state))]
pub async fn delete_artifact(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> ApiResult<(StatusCode, Json<MessageResponse>)> {
    let name = artifact_name(&name)?;
    info!("Deleting artifact: {name}");

    match state.store.delete(&name).await? {
        DeleteOutcome::Deleted => Ok((
            StatusCode::ACCEPTED,
            Json(MessageResponse {
                message: format!("The artifact {name} and all older versions are being deleted."),
            }),
        )),
        DeleteOutcome::NotFound => Err(ApiError::NotFound(format!(
            "No action taken. Unable to find an artifact called: {name}"
        ))),
    }
}
