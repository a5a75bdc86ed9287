use std::sync::Arc;

use faultline_core::actor::OrganizationAccess;
use faultline_core::mapping::Mapper;
use faultline_core::work::WorkQueue;
use faultline_db::models::organization::Organization;
use faultline_db::models::project::Project;
use faultline_db::models::webhook::Webhook;
use faultline_db::repositories::{MemoryRepository, PgDocumentRepository, Repository};
use faultline_db::DbPool;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool. `None` when running on in-memory storage.
    pub pool: Option<DbPool>,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// One repository per resource.
    pub repositories: Repositories,
    /// Input → model → view mapping rules.
    pub mapper: Arc<Mapper>,
    /// Organization access lookup used by every permission check.
    pub access: Arc<dyn OrganizationAccess>,
    /// Queue for cleanup that runs after a delete request returns.
    pub work_queue: Arc<dyn WorkQueue>,
}

/// Repositories for every resource the API exposes.
#[derive(Clone)]
pub struct Repositories {
    pub organizations: Arc<dyn Repository<Organization>>,
    pub projects: Arc<dyn Repository<Project>>,
    pub webhooks: Arc<dyn Repository<Webhook>>,
}

impl Repositories {
    pub fn in_memory() -> Self {
        Self {
            organizations: Arc::new(MemoryRepository::<Organization>::new()),
            projects: Arc::new(MemoryRepository::<Project>::new()),
            webhooks: Arc::new(MemoryRepository::<Webhook>::new()),
        }
    }

    pub fn postgres(pool: DbPool) -> Self {
        Self {
            organizations: Arc::new(PgDocumentRepository::<Organization>::new(pool.clone())),
            projects: Arc::new(PgDocumentRepository::<Project>::new(pool.clone())),
            webhooks: Arc::new(PgDocumentRepository::<Webhook>::new(pool)),
        }
    }
}
