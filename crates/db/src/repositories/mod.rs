//! Repository capability and its storage backends.
//!
//! Controllers depend only on [`Repository`]; which backend sits behind it
//! is decided once at start-up.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use faultline_core::entity::Entity;
use faultline_core::types::EntityId;

use crate::error::RepositoryResult;

pub use memory::MemoryRepository;
pub use postgres::PgDocumentRepository;

/// Persistence operations for one entity type.
///
/// `add` and `save` validate the entity and fail with
/// [`RepositoryError::Validation`](crate::error::RepositoryError::Validation)
/// carrying per-field messages.
#[async_trait]
pub trait Repository<E: Entity>: Send + Sync {
    async fn get_by_id(&self, id: &str) -> RepositoryResult<Option<E>>;

    /// Entities whose id is in `ids`. Missing ids are skipped; order is not
    /// guaranteed.
    async fn get_by_ids(&self, ids: &[EntityId]) -> RepositoryResult<Vec<E>>;

    async fn get_by_organization_id(&self, organization_id: &str) -> RepositoryResult<Vec<E>>;

    /// Insert a new entity. An empty id is replaced by a fresh one.
    async fn add(&self, entity: E) -> RepositoryResult<E>;

    /// Overwrite an existing entity.
    async fn save(&self, entity: E) -> RepositoryResult<E>;

    async fn save_all(&self, entities: Vec<E>) -> RepositoryResult<Vec<E>> {
        let mut saved = Vec::with_capacity(entities.len());
        for entity in entities {
            saved.push(self.save(entity).await?);
        }
        Ok(saved)
    }

    /// Remove the given entities. Returns how many were actually removed.
    async fn remove(&self, entities: &[E]) -> RepositoryResult<u64>;
}
