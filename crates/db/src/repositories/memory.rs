//! In-process repository backed by an insertion-ordered map.

use std::marker::PhantomData;

use async_trait::async_trait;
use faultline_core::entity::Entity;
use faultline_core::types::{new_entity_id, EntityId};
use faultline_core::validation::validate_fields;
use indexmap::IndexMap;
use tokio::sync::RwLock;
use validator::Validate;

use super::Repository;
use crate::error::{RepositoryError, RepositoryResult};

/// Keeps entities in memory. Used when no database is configured and in
/// tests.
pub struct MemoryRepository<E> {
    items: RwLock<IndexMap<EntityId, E>>,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Default for MemoryRepository<E> {
    fn default() -> Self {
        Self {
            items: RwLock::new(IndexMap::new()),
            _entity: PhantomData,
        }
    }
}

impl<E: Entity> MemoryRepository<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn count(&self) -> usize {
        self.items.read().await.len()
    }
}

#[async_trait]
impl<E: Entity + Validate> Repository<E> for MemoryRepository<E> {
    async fn get_by_id(&self, id: &str) -> RepositoryResult<Option<E>> {
        Ok(self.items.read().await.get(id).cloned())
    }

    async fn get_by_ids(&self, ids: &[EntityId]) -> RepositoryResult<Vec<E>> {
        let items = self.items.read().await;
        Ok(ids.iter().filter_map(|id| items.get(id).cloned()).collect())
    }

    async fn get_by_organization_id(&self, organization_id: &str) -> RepositoryResult<Vec<E>> {
        Ok(self
            .items
            .read()
            .await
            .values()
            .filter(|e| e.organization_id() == Some(organization_id))
            .cloned()
            .collect())
    }

    async fn add(&self, mut entity: E) -> RepositoryResult<E> {
        if entity.id().is_empty() {
            entity.set_id(new_entity_id());
        }
        validate_fields(&entity)?;

        let mut items = self.items.write().await;
        if items.contains_key(entity.id()) {
            return Err(RepositoryError::Conflict {
                entity: E::ENTITY,
                id: entity.id().to_string(),
            });
        }
        items.insert(entity.id().to_string(), entity.clone());
        tracing::debug!(entity = E::ENTITY, id = %entity.id(), "Added to memory store");
        Ok(entity)
    }

    async fn save(&self, entity: E) -> RepositoryResult<E> {
        validate_fields(&entity)?;

        let mut items = self.items.write().await;
        match items.get_mut(entity.id()) {
            Some(slot) => {
                *slot = entity.clone();
                Ok(entity)
            }
            None => Err(RepositoryError::Missing {
                entity: E::ENTITY,
                id: entity.id().to_string(),
            }),
        }
    }

    async fn remove(&self, entities: &[E]) -> RepositoryResult<u64> {
        let mut items = self.items.write().await;
        let removed = entities
            .iter()
            .filter(|e| items.shift_remove(e.id()).is_some())
            .count();
        Ok(removed as u64)
    }
}
