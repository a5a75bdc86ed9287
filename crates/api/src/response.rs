//! Success response types for the resource handlers.
//!
//! Error bodies live in [`crate::error`]; everything a handler returns on
//! success is one of the types here or a bare `Json<View>`.

use axum::http::header::LOCATION;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use faultline_core::types::EntityId;
use faultline_core::work::WorkItemId;
use serde::Serialize;

/// `201 Created` with a `Location` header and the created entity's view.
#[derive(Debug)]
pub struct Created<V> {
    pub id: EntityId,
    pub location: String,
    pub view: V,
}

impl<V: Serialize> IntoResponse for Created<V> {
    fn into_response(self) -> Response {
        (
            StatusCode::CREATED,
            [(LOCATION, self.location)],
            Json(self.view),
        )
            .into_response()
    }
}

/// `202 Accepted` carrying the ids of queued background work.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkAccepted {
    pub workers: Vec<WorkItemId>,
}

impl IntoResponse for WorkAccepted {
    fn into_response(self) -> Response {
        (StatusCode::ACCEPTED, Json(self)).into_response()
    }
}
