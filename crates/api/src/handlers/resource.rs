//! Handlers shared by every `/api/v1/{resource}` route tree.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::Json;
use faultline_core::patch::ChangeSet;
use serde::de::DeserializeOwned;

use crate::controller::{RepositoryController, ResourceHandler};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::{Created, WorkAccepted};
use crate::state::AppState;

/// GET /api/v1/{resource}/{id}
pub async fn get_by_id<H: ResourceHandler>(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(id): Path<String>,
) -> AppResult<Json<H::ViewModel>> {
    let controller = RepositoryController::<H>::from_state(&state);
    let view = controller.get_by_id(&actor, &id).await?;
    Ok(Json(view))
}

/// POST /api/v1/{resource}
///
/// An empty body is rejected as a bad request.
pub async fn create<H: ResourceHandler>(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    body: Bytes,
) -> AppResult<Created<H::ViewModel>> {
    let input = parse_body::<H::NewModel>(&body)?;
    let controller = RepositoryController::<H>::from_state(&state);
    controller.create(&actor, input).await
}

/// PATCH /api/v1/{resource}/{id}
///
/// The body is a JSON object of field → new value. An empty body is an
/// empty change set.
pub async fn patch<H: ResourceHandler>(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(id): Path<String>,
    body: Bytes,
) -> AppResult<Json<H::ViewModel>> {
    let changes = match parse_body::<serde_json::Value>(&body)? {
        Some(payload) => ChangeSet::from_json(payload)?,
        None => ChangeSet::new(),
    };
    let controller = RepositoryController::<H>::from_state(&state);
    let view = controller.patch(&actor, &id, changes).await?;
    Ok(Json(view))
}

/// DELETE /api/v1/{resource}/{ids}
///
/// `ids` is a comma-separated list.
pub async fn delete<H: ResourceHandler>(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(ids): Path<String>,
) -> AppResult<WorkAccepted> {
    let ids: Vec<String> = ids.split(',').map(str::to_string).collect();
    let controller = RepositoryController::<H>::from_state(&state);
    controller.delete_many(&actor, &ids).await
}

fn parse_body<T: DeserializeOwned>(body: &[u8]) -> AppResult<Option<T>> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice(body)
        .map(Some)
        .map_err(|e| AppError::BadRequest(format!("Invalid JSON body: {e}")))
}
