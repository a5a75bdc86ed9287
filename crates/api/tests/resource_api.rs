//! HTTP-level integration tests for the generic resource endpoints.
//!
//! Uses Axum's tower::ServiceExt to send requests directly to the router
//! without an actual TCP listener. Storage is in-memory.

mod common;

use std::time::Duration;

use axum::http::{header, StatusCode};
use common::{body_json, delete, get, get_anonymous, patch_json, post_empty, post_json, token_for};
use faultline_core::actor::ActorContext;
use faultline_core::permission::{INVALID_ORGANIZATION_MESSAGE, ORGANIZATION_IMMUTABLE_MESSAGE};
use faultline_db::models::organization::Organization;
use faultline_db::models::project::Project;
use serde_json::json;

use common::TestApp;

async fn seed_project(app: &TestApp, id: &str, organization_id: &str) {
    app.state
        .repositories
        .projects
        .add(Project {
            id: id.into(),
            organization_id: organization_id.into(),
            name: format!("project {id}"),
            delete_bot_data_enabled: false,
            custom_content: None,
            created_at: chrono::Utc::now(),
        })
        .await
        .unwrap();
}

async fn seed_organization(app: &TestApp, id: &str) {
    app.state
        .repositories
        .organizations
        .add(Organization {
            id: id.into(),
            name: format!("organization {id}"),
            created_at: chrono::Utc::now(),
        })
        .await
        .unwrap();
}

// ---------------------------------------------------------------------------
// Authentication
// ---------------------------------------------------------------------------

#[tokio::test]
async fn requests_without_token_are_unauthorized() {
    let app = common::build_test_app();
    let response = get_anonymous(&app, "/api/v1/projects/p1").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn requests_with_garbage_token_are_unauthorized() {
    let app = common::build_test_app();
    let response = get(&app, "/api/v1/projects/p1", "not-a-jwt").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_project_returns_201_with_location() {
    let app = common::build_test_app();
    let token = token_for("user-1", &["org-a"]);

    let response = post_json(&app, "/api/v1/projects", &token, json!({"name": "Web"})).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let location = response
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    let json = body_json(response).await;
    assert_eq!(json["name"], "Web");
    assert_eq!(json["organization_id"], "org-a");
    assert_eq!(json["has_custom_content"], false);
    assert_eq!(location, format!("/api/v1/projects/{}", json["id"].as_str().unwrap()));

    let response = get(&app, &location, &token).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn create_without_body_is_bad_request() {
    let app = common::build_test_app();
    let token = token_for("user-1", &["org-a"]);
    let response = post_empty(&app, "/api/v1/projects", &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_in_foreign_organization_is_denied() {
    let app = common::build_test_app();
    let token = token_for("user-1", &["org-a"]);

    let response = post_json(
        &app,
        "/api/v1/projects",
        &token,
        json!({"organization_id": "org-b", "name": "Web"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "PERMISSION_DENIED");
    assert_eq!(json["error"], INVALID_ORGANIZATION_MESSAGE);
}

#[tokio::test]
async fn create_with_invalid_fields_returns_422_with_details() {
    let app = common::build_test_app();
    let token = token_for("user-1", &["org-a"]);

    let response = post_json(
        &app,
        "/api/v1/webhooks",
        &token,
        json!({"url": "not a url", "event_types": ["Bogus"]}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert!(json["details"]["url"].is_array());
    assert!(json["details"]["event_types"].is_array());
}

#[tokio::test]
async fn create_webhook_applies_mapping_rule() {
    let app = common::build_test_app();
    let token = token_for("user-1", &["org-a"]);

    let response = post_json(
        &app,
        "/api/v1/webhooks",
        &token,
        json!({
            "url": "https://hooks.example.com/in",
            "event_types": ["NewError", "NewError", "StackPromoted"]
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["organization_id"], "org-a");
    assert_eq!(json["is_enabled"], true);
    assert_eq!(json["event_types"], json!(["NewError", "StackPromoted"]));
}

// ---------------------------------------------------------------------------
// Get
// ---------------------------------------------------------------------------

#[tokio::test]
async fn get_of_foreign_project_is_not_found() {
    let app = common::build_test_app();
    seed_project(&app, "p1", "org-b").await;
    let token = token_for("user-1", &["org-a"]);

    let response = get(&app, "/api/v1/projects/p1", &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "NOT_FOUND");
}

// ---------------------------------------------------------------------------
// Patch
// ---------------------------------------------------------------------------

#[tokio::test]
async fn patch_updates_named_fields_only() {
    let app = common::build_test_app();
    seed_project(&app, "p1", "org-a").await;
    let token = token_for("user-1", &["org-a"]);

    let response = patch_json(
        &app,
        "/api/v1/projects/p1",
        &token,
        json!({"DeleteBotDataEnabled": true}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["delete_bot_data_enabled"], true);
    assert_eq!(json["name"], "project p1");
}

#[tokio::test]
async fn empty_patch_returns_current_view() {
    let app = common::build_test_app();
    seed_project(&app, "p1", "org-a").await;
    let token = token_for("user-1", &["org-a"]);

    let response = patch_json(&app, "/api/v1/projects/p1", &token, json!({})).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["id"], "p1");
}

#[tokio::test]
async fn empty_patch_of_foreign_project_is_not_found() {
    let app = common::build_test_app();
    seed_project(&app, "p1", "org-b").await;
    let token = token_for("user-1", &["org-a"]);

    let response = patch_json(&app, "/api/v1/projects/p1", &token, json!({})).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["code"], "NOT_FOUND");
    assert!(json.get("name").is_none());
}

#[tokio::test]
async fn patch_of_organization_id_is_denied_for_global_admin() {
    let app = common::build_test_app();
    seed_project(&app, "p1", "org-a").await;
    let mut admin = ActorContext::new("admin", vec!["org-a".into()]);
    admin.is_global_admin = true;
    let token = common::token_for_actor(&admin);

    let response = patch_json(
        &app,
        "/api/v1/projects/p1",
        &token,
        json!({"organizationId": "org-b"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "PERMISSION_DENIED");
    assert_eq!(json["error"], ORGANIZATION_IMMUTABLE_MESSAGE);
    assert_eq!(json["id"], "p1");
}

#[tokio::test]
async fn patch_with_non_object_body_is_bad_request() {
    let app = common::build_test_app();
    seed_project(&app, "p1", "org-a").await;
    let token = token_for("user-1", &["org-a"]);

    let response = patch_json(&app, "/api/v1/projects/p1", &token, json!(["name"])).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn patch_that_breaks_validation_returns_422() {
    let app = common::build_test_app();
    seed_project(&app, "p1", "org-a").await;
    let token = token_for("user-1", &["org-a"]);

    let response = patch_json(&app, "/api/v1/projects/p1", &token, json!({"name": ""})).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

#[tokio::test]
async fn delete_project_returns_202_with_cleanup_worker() {
    let app = common::build_test_app();
    seed_project(&app, "p1", "org-a").await;
    let token = token_for("user-1", &["org-a"]);

    let response = delete(&app, "/api/v1/projects/p1", &token).await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let json = body_json(response).await;
    assert_eq!(json["workers"].as_array().unwrap().len(), 1);

    let response = get(&app, "/api/v1/projects/p1", &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_of_unknown_ids_is_not_found() {
    let app = common::build_test_app();
    let token = token_for("user-1", &["org-a"]);
    let response = delete(&app, "/api/v1/projects/x,y", &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_of_single_foreign_project_looks_missing() {
    let app = common::build_test_app();
    seed_project(&app, "p1", "org-b").await;
    let token = token_for("user-1", &["org-a"]);

    let response = delete(&app, "/api/v1/projects/p1", &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(app.state.repositories.projects.get_by_id("p1").await.unwrap().is_some());
}

#[tokio::test]
async fn delete_of_mixed_batch_reports_every_bucket() {
    let app = common::build_test_app();
    seed_project(&app, "b", "org-b").await;
    seed_project(&app, "c", "org-a").await;
    let token = token_for("user-1", &["org-a"]);

    let response = delete(&app, "/api/v1/projects/a,b,c", &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["code"], "BULK_PARTIAL");
    assert_eq!(json["not_found"], json!(["a"]));
    assert_eq!(json["success"], json!(["c"]));
    assert_eq!(json["failure"][0]["id"], "b");
    assert_eq!(json["failure"][0]["decision"], "not_found");
    assert_eq!(json["workers"].as_array().unwrap().len(), 1);

    assert!(app.state.repositories.projects.get_by_id("c").await.unwrap().is_none());
    assert!(app.state.repositories.projects.get_by_id("b").await.unwrap().is_some());
}

#[tokio::test]
async fn delete_over_id_limit_is_bad_request() {
    let app = common::build_test_app();
    let token = token_for("user-1", &["org-a"]);
    let ids: Vec<String> = (0..11).map(|i| format!("p{i}")).collect();

    let response = delete(&app, &format!("/api/v1/projects/{}", ids.join(",")), &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn delete_organization_queues_cascading_removal() {
    let app = common::build_test_app();
    seed_organization(&app, "org-a").await;
    seed_project(&app, "p1", "org-a").await;
    let token = token_for("user-1", &["org-a"]);

    let response = delete(&app, "/api/v1/organizations/org-a", &token).await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    assert_eq!(body_json(response).await["workers"].as_array().unwrap().len(), 1);

    // The removal runs on the background worker.
    let repositories = &app.state.repositories;
    let mut removed = false;
    for _ in 0..100 {
        if repositories.organizations.get_by_id("org-a").await.unwrap().is_none() {
            removed = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(removed, "organization should be removed by the worker");
    assert!(repositories.projects.get_by_id("p1").await.unwrap().is_none());
}

#[tokio::test]
async fn delete_of_foreign_organization_looks_missing() {
    let app = common::build_test_app();
    seed_organization(&app, "org-b").await;
    let token = token_for("user-1", &["org-a"]);

    let response = delete(&app, "/api/v1/organizations/org-b", &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
