//! Tests for `AppError` → HTTP response mapping.
//!
//! These call `IntoResponse` directly on `AppError` values; no router is
//! involved.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use faultline_api::error::AppError;
use faultline_core::bulk::BulkResult;
use faultline_core::error::CoreError;
use faultline_core::patch::PatchError;
use faultline_core::permission::PermissionResult;
use faultline_core::validation::FieldErrors;
use faultline_db::error::RepositoryError;
use http_body_util::BodyExt;

/// Helper: convert an `AppError` into its status code and parsed JSON body.
async fn error_to_response(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

#[tokio::test]
async fn not_found_error_returns_404() {
    let err = AppError::Core(CoreError::NotFound {
        entity: "Project",
        id: "p42".into(),
    });

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], "Project with id p42 not found");
}

#[tokio::test]
async fn bad_request_error_returns_400() {
    let err = AppError::BadRequest("invalid field value".into());

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "BAD_REQUEST");
    assert_eq!(json["error"], "invalid field value");
}

#[tokio::test]
async fn permission_denial_with_message_returns_400() {
    let err = AppError::PermissionDenied(PermissionResult::deny_with_message(
        "Invalid organization id specified.",
        Some("p1"),
    ));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "PERMISSION_DENIED");
    assert_eq!(json["error"], "Invalid organization id specified.");
    assert_eq!(json["id"], "p1");
}

#[tokio::test]
async fn not_found_shaped_denial_returns_404_without_details() {
    let err = AppError::PermissionDenied(PermissionResult::deny_with_not_found("p1"));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
    assert!(json.get("id").is_none());
}

#[tokio::test]
async fn validation_failure_returns_422_with_field_details() {
    let err = AppError::ValidationFailed(FieldErrors::new().with("name", "is required"));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["details"]["name"][0], "is required");
}

#[tokio::test]
async fn bulk_partial_returns_400_with_every_bucket() {
    let err = AppError::BulkPartial(BulkResult {
        success: vec!["c".into()],
        failure: vec![PermissionResult::deny_with_not_found("b")],
        workers: vec!["w1".into()],
        not_found: vec!["a".into()],
    });

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "BULK_PARTIAL");
    assert_eq!(json["success"][0], "c");
    assert_eq!(json["failure"][0]["id"], "b");
    assert_eq!(json["workers"][0], "w1");
    assert_eq!(json["not_found"][0], "a");
}

#[tokio::test]
async fn conflict_error_returns_409() {
    let err = AppError::from(RepositoryError::Conflict {
        entity: "Project",
        id: "p1".into(),
    });

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], "CONFLICT");
}

#[tokio::test]
async fn unauthorized_error_returns_401() {
    let err = AppError::Core(CoreError::Unauthorized("Missing authorization header".into()));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["code"], "UNAUTHORIZED");
    assert_eq!(json["error"], "Missing authorization header");
}

#[tokio::test]
async fn patch_errors_are_bad_requests() {
    let err = AppError::from(PatchError::UnknownField("colour".into()));
    let (status, _) = error_to_response(err).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn internal_error_returns_500_and_sanitizes_message() {
    let err = AppError::InternalError("secret database credentials leaked".into());

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "INTERNAL_ERROR");
    assert_eq!(json["error"], "An internal error occurred");
}

#[tokio::test]
async fn database_error_returns_500() {
    let err = AppError::from(RepositoryError::Database(sqlx::Error::PoolTimedOut));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "An internal error occurred");
}
