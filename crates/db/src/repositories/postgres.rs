//! PostgreSQL repository storing entities as JSONB documents.
//!
//! All entity types share the `documents` table, partitioned by
//! [`Entity::RESOURCE`]. The owning organization is copied into its own
//! column on every write.

use std::marker::PhantomData;

use async_trait::async_trait;
use faultline_core::entity::Entity;
use faultline_core::types::{new_entity_id, EntityId};
use faultline_core::validation::validate_fields;
use sqlx::types::Json;
use sqlx::PgPool;
use validator::Validate;

use super::Repository;
use crate::error::{RepositoryError, RepositoryResult};

/// Document-store repository for one entity type.
pub struct PgDocumentRepository<E> {
    pool: PgPool,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> PgDocumentRepository<E> {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _entity: PhantomData,
        }
    }
}

#[async_trait]
impl<E> Repository<E> for PgDocumentRepository<E>
where
    E: Entity + Validate + Unpin,
{
    async fn get_by_id(&self, id: &str) -> RepositoryResult<Option<E>> {
        let row = sqlx::query_scalar::<_, Json<E>>(
            "SELECT body FROM documents WHERE resource = $1 AND id = $2",
        )
        .bind(E::RESOURCE)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|Json(entity)| entity))
    }

    async fn get_by_ids(&self, ids: &[EntityId]) -> RepositoryResult<Vec<E>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = sqlx::query_scalar::<_, Json<E>>(
            "SELECT body FROM documents WHERE resource = $1 AND id = ANY($2)",
        )
        .bind(E::RESOURCE)
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(|Json(entity)| entity).collect())
    }

    async fn get_by_organization_id(&self, organization_id: &str) -> RepositoryResult<Vec<E>> {
        let rows = sqlx::query_scalar::<_, Json<E>>(
            "SELECT body FROM documents
             WHERE resource = $1 AND organization_id = $2
             ORDER BY created_at",
        )
        .bind(E::RESOURCE)
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(|Json(entity)| entity).collect())
    }

    async fn add(&self, mut entity: E) -> RepositoryResult<E> {
        if entity.id().is_empty() {
            entity.set_id(new_entity_id());
        }
        validate_fields(&entity)?;

        let result = sqlx::query(
            "INSERT INTO documents (resource, id, organization_id, body)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (resource, id) DO NOTHING",
        )
        .bind(E::RESOURCE)
        .bind(entity.id())
        .bind(entity.organization_id())
        .bind(Json(&entity))
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::Conflict {
                entity: E::ENTITY,
                id: entity.id().to_string(),
            });
        }
        Ok(entity)
    }

    async fn save(&self, entity: E) -> RepositoryResult<E> {
        validate_fields(&entity)?;

        let result = sqlx::query(
            "UPDATE documents SET
                organization_id = $3,
                body = $4,
                updated_at = NOW()
             WHERE resource = $1 AND id = $2",
        )
        .bind(E::RESOURCE)
        .bind(entity.id())
        .bind(entity.organization_id())
        .bind(Json(&entity))
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::Missing {
                entity: E::ENTITY,
                id: entity.id().to_string(),
            });
        }
        Ok(entity)
    }

    async fn remove(&self, entities: &[E]) -> RepositoryResult<u64> {
        if entities.is_empty() {
            return Ok(0);
        }
        let ids: Vec<&str> = entities.iter().map(|e| e.id()).collect();
        let result = sqlx::query("DELETE FROM documents WHERE resource = $1 AND id = ANY($2)")
            .bind(E::RESOURCE)
            .bind(ids)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
