use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use faultline_core::bulk::BulkResult;
use faultline_core::error::CoreError;
use faultline_core::mapping::MapError;
use faultline_core::patch::PatchError;
use faultline_core::permission::{Decision, PermissionResult};
use faultline_core::validation::FieldErrors;
use faultline_db::error::RepositoryError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `faultline_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The permission evaluator denied the operation with a message.
    #[error("Permission denied: {}", .0.message.as_deref().unwrap_or("denied"))]
    PermissionDenied(PermissionResult),

    /// Persistence rejected the entity with field-level messages.
    #[error("Validation failed: {}", .0.summary())]
    ValidationFailed(FieldErrors),

    /// A bulk operation where some items were denied. Not a true failure:
    /// the body tells the caller exactly what happened to every id.
    #[error("Bulk operation partially failed")]
    BulkPartial(BulkResult),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Validation(errors) => AppError::ValidationFailed(errors),
            RepositoryError::Conflict { entity, id } => AppError::Core(CoreError::Conflict(
                format!("{entity} with id {id} already exists"),
            )),
            RepositoryError::Missing { entity, id } => {
                AppError::Core(CoreError::NotFound { entity, id })
            }
            RepositoryError::Database(e) => AppError::Database(e),
            RepositoryError::Serialization(e) => AppError::InternalError(e.to_string()),
        }
    }
}

impl From<PatchError> for AppError {
    fn from(err: PatchError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl From<MapError> for AppError {
    fn from(err: MapError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            // --- Structured bodies ---
            AppError::PermissionDenied(permission) => return permission_response(permission),
            AppError::ValidationFailed(errors) => {
                let body = json!({
                    "error": "Validation failed",
                    "code": "VALIDATION_ERROR",
                    "details": errors,
                });
                return (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(body)).into_response();
            }
            AppError::BulkPartial(result) => {
                let body = json!({
                    "error": "One or more items could not be processed",
                    "code": "BULK_PARTIAL",
                    "success": result.success,
                    "failure": result.failure,
                    "workers": result.workers,
                    "not_found": result.not_found,
                });
                return (StatusCode::BAD_REQUEST, axum::Json(body)).into_response();
            }

            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg),
                CoreError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg),
            },

            // --- Database errors ---
            AppError::Database(err) => classify_sqlx_error(&err),

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                internal()
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}

/// A not-found shaped denial is indistinguishable from a missing entity.
fn permission_response(permission: PermissionResult) -> Response {
    match permission.decision {
        Decision::NotFound => {
            let body = json!({
                "error": "Resource not found",
                "code": "NOT_FOUND",
            });
            (StatusCode::NOT_FOUND, axum::Json(body)).into_response()
        }
        Decision::Denied | Decision::Allowed => {
            let body = json!({
                "error": permission.message.unwrap_or_else(|| "Permission denied".to_string()),
                "code": "PERMISSION_DENIED",
                "id": permission.id,
            });
            (StatusCode::BAD_REQUEST, axum::Json(body)).into_response()
        }
    }
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// - `RowNotFound` maps to 404.
/// - Unique constraint violations map to 409.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        sqlx::Error::Database(db_err) => {
            // PostgreSQL unique constraint violation: error code 23505
            if db_err.code().as_deref() == Some("23505") {
                let constraint = db_err.constraint().unwrap_or("unknown");
                return (
                    StatusCode::CONFLICT,
                    "CONFLICT",
                    format!("Duplicate value violates unique constraint: {constraint}"),
                );
            }
            tracing::error!(error = %db_err, "Database error");
            internal()
        }
        other => {
            tracing::error!(error = %other, "Database error");
            internal()
        }
    }
}
