#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request};
use axum::response::Response;
use axum::Router;
use faultline_core::actor::{ActorContext, MembershipAccess};
use faultline_core::mapping::Mapper;
use http_body_util::BodyExt;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

use faultline_api::auth::jwt::{generate_access_token, JwtConfig};
use faultline_api::background::{work_queue::InProcessWorkQueue, worker};
use faultline_api::config::ServerConfig;
use faultline_api::resources;
use faultline_api::router::build_app_router;
use faultline_api::state::{AppState, Repositories};

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "integration-test-secret".to_string(),
            access_token_expiry_mins: 15,
        },
        database_url: None,
        max_bulk_ids: 10,
    }
}

/// The router plus the state behind it, so tests can seed and inspect the
/// repositories directly.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub worker_cancel: CancellationToken,
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self.worker_cancel.cancel();
    }
}

/// Build the full application router over in-memory storage, with the
/// background worker running.
///
/// Must be called from within a tokio runtime.
pub fn build_test_app() -> TestApp {
    let config = test_config();
    let repositories = Repositories::in_memory();

    let mapper = Mapper::new();
    resources::register_mappings(&mapper);

    let (work_queue, receiver) = InProcessWorkQueue::new();
    let worker_cancel = CancellationToken::new();
    tokio::spawn(worker::run(
        receiver,
        repositories.clone(),
        worker_cancel.clone(),
    ));

    let state = AppState {
        pool: None,
        config: Arc::new(config.clone()),
        repositories,
        mapper: Arc::new(mapper),
        access: Arc::new(MembershipAccess),
        work_queue: Arc::new(work_queue),
    };

    TestApp {
        router: build_app_router(state.clone(), &config),
        state,
        worker_cancel,
    }
}

/// A bearer token for a user belonging to `organizations`, the first being
/// the default.
pub fn token_for(user_id: &str, organizations: &[&str]) -> String {
    let actor = ActorContext::new(
        user_id,
        organizations.iter().map(|s| s.to_string()).collect(),
    );
    token_for_actor(&actor)
}

pub fn token_for_actor(actor: &ActorContext) -> String {
    generate_access_token(actor, &test_config().jwt).unwrap()
}

async fn send(
    app: &TestApp,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(serde_json::to_vec(&json).unwrap())
        }
        None => Body::empty(),
    };
    app.router
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap()
}

pub async fn get(app: &TestApp, uri: &str, token: &str) -> Response {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(
    app: &TestApp,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn post_empty(app: &TestApp, uri: &str, token: &str) -> Response {
    send(app, Method::POST, uri, Some(token), None).await
}

pub async fn patch_json(
    app: &TestApp,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response {
    send(app, Method::PATCH, uri, Some(token), Some(body)).await
}

pub async fn delete(app: &TestApp, uri: &str, token: &str) -> Response {
    send(app, Method::DELETE, uri, Some(token), None).await
}

pub async fn get_anonymous(app: &TestApp, uri: &str) -> Response {
    send(app, Method::GET, uri, None, None).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
