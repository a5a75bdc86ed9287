pub mod health;

use axum::routing::{get, post};
use axum::Router;

use crate::controller::ResourceHandler;
use crate::handlers::resource;
use crate::resources::organization::OrganizationResource;
use crate::resources::project::ProjectResource;
use crate::resources::webhook::WebhookResource;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /organizations                 create
/// /organizations/{id}            get, patch, delete (comma-separated ids)
///
/// /projects                      create
/// /projects/{id}                 get, patch, delete (comma-separated ids)
///
/// /webhooks                      create
/// /webhooks/{id}                 get, patch, delete (comma-separated ids)
/// ```
///
/// All routes require a Bearer token.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/organizations", resource_router::<OrganizationResource>())
        .nest("/projects", resource_router::<ProjectResource>())
        .nest("/webhooks", resource_router::<WebhookResource>())
}

/// Routes for one resource served by the generic controller.
///
/// ```text
/// POST   /          -> create
/// GET    /{id}      -> get_by_id
/// PATCH  /{id}      -> patch
/// DELETE /{id}      -> delete
/// ```
pub fn resource_router<H: ResourceHandler>() -> Router<AppState> {
    Router::new().route("/", post(resource::create::<H>)).route(
        "/{id}",
        get(resource::get_by_id::<H>)
            .patch(resource::patch::<H>)
            .delete(resource::delete::<H>),
    )
}
