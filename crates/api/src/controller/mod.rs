//! Generic repository-backed controller.
//!
//! [`RepositoryController`] implements create, read, patch and bulk delete
//! once for every resource. A resource plugs in through [`ResourceHandler`]:
//! its entity, input and view types, its permission policy, and the hooks it
//! wants to override.
//!
//! ```text
//! create: input → map → default organization → can_add → add_model → after_add → view
//! patch:  load → can_read → (empty? return view) → can_update → apply → update_model → after_patch → view
//! delete: dedupe ids → load → partition → can_delete → delete_models → accepted | partial
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use faultline_core::actor::{ActorContext, OrganizationAccess};
use faultline_core::bulk::{distinct_ids, BulkCompletion, BulkOperation, BulkRejection};
use faultline_core::entity::{Entity, Scope};
use faultline_core::error::CoreError;
use faultline_core::mapping::Mapper;
use faultline_core::patch::{apply_changes, ChangeSet};
use faultline_core::permission::{Decision, PermissionEvaluator, PermissionPolicy, PermissionResult};
use faultline_core::work::WorkItemId;
use faultline_db::repositories::Repository;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::DEFAULT_MAX_BULK_IDS;
use crate::error::{AppError, AppResult};
use crate::response::{Created, WorkAccepted};
use crate::state::AppState;


/// Everything that differs between two resources served by
/// [`RepositoryController`].
///
/// Hook defaults go straight to the repository; override a hook to add
/// side effects (queueing cleanup, filling computed view fields).
#[async_trait]
pub trait ResourceHandler: Send + Sync + Sized + 'static {
    type Entity: Entity;
    /// Body accepted by create.
    type NewModel: Serialize + DeserializeOwned + Send + Sync + 'static;
    /// Shape returned to clients.
    type ViewModel: Serialize + DeserializeOwned + Send + Sync + 'static;
    type Policy: PermissionPolicy<Self::Entity>;

    fn policy(&self) -> &Self::Policy;

    fn from_state(state: &AppState) -> Self;

    fn repository(state: &AppState) -> Arc<dyn Repository<Self::Entity>>;

    async fn add_model(
        &self,
        repository: &dyn Repository<Self::Entity>,
        _actor: &ActorContext,
        model: Self::Entity,
    ) -> AppResult<Self::Entity> {
        Ok(repository.add(model).await?)
    }

    async fn after_add(&self, _actor: &ActorContext, model: Self::Entity) -> AppResult<Self::Entity> {
        Ok(model)
    }

    async fn update_model(
        &self,
        repository: &dyn Repository<Self::Entity>,
        _actor: &ActorContext,
        model: Self::Entity,
    ) -> AppResult<Self::Entity> {
        Ok(repository.save(model).await?)
    }

    async fn after_patch(
        &self,
        _actor: &ActorContext,
        model: Self::Entity,
    ) -> AppResult<Self::Entity> {
        Ok(model)
    }

    /// Remove `models` and return ids of any background work started for
    /// them. Errors are logged by the controller and reported as a 500.
    async fn delete_models(
        &self,
        repository: &dyn Repository<Self::Entity>,
        _actor: &ActorContext,
        models: &[Self::Entity],
    ) -> anyhow::Result<Vec<WorkItemId>> {
        repository.remove(models).await?;
        Ok(Vec::new())
    }

    /// Fill view fields that plain field mapping cannot.
    fn after_result_map(&self, _model: &Self::Entity, _view: &mut Self::ViewModel) {}
}

/// CRUD operations for one resource, parameterised by its handler.
pub struct RepositoryController<H: ResourceHandler> {
    repository: Arc<dyn Repository<H::Entity>>,
    mapper: Arc<Mapper>,
    access: Arc<dyn OrganizationAccess>,
    handler: H,
    max_bulk_ids: usize,
}

impl<H: ResourceHandler> RepositoryController<H> {
    pub fn new(
        repository: Arc<dyn Repository<H::Entity>>,
        mapper: Arc<Mapper>,
        access: Arc<dyn OrganizationAccess>,
        handler: H,
    ) -> Self {
        Self {
            repository,
            mapper,
            access,
            handler,
            max_bulk_ids: DEFAULT_MAX_BULK_IDS,
        }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(
            H::repository(state),
            Arc::clone(&state.mapper),
            Arc::clone(&state.access),
            H::from_state(state),
        )
        .with_max_bulk_ids(state.config.max_bulk_ids)
    }

    pub fn with_max_bulk_ids(mut self, max_bulk_ids: usize) -> Self {
        self.max_bulk_ids = max_bulk_ids;
        self
    }

    /// Fetch one entity. Entities the actor cannot see are reported as not
    /// found.
    pub async fn get_by_id(&self, actor: &ActorContext, id: &str) -> AppResult<H::ViewModel> {
        let entity = self.repository.get_by_id(id).await?;
        let evaluator = self.evaluator(actor);
        let entity = entity
            .filter(|e| self.handler.policy().can_read(&evaluator, e))
            .ok_or_else(|| not_found::<H::Entity>(id))?;
        self.to_view(&entity)
    }

    pub async fn create(
        &self,
        actor: &ActorContext,
        input: Option<H::NewModel>,
    ) -> AppResult<Created<H::ViewModel>> {
        let input =
            input.ok_or_else(|| AppError::BadRequest("Request body is required".to_string()))?;

        let mut model: H::Entity = self.mapper.map(&input)?;
        if <H::Entity as Entity>::SCOPE == Scope::OrganizationOwned
            && model.organization_id().unwrap_or_default().is_empty()
        {
            if let Some(default_org) = actor.default_organization_id() {
                model.set_organization_id(default_org.to_string());
            }
        }

        let permission = self
            .handler
            .policy()
            .can_add(&self.evaluator(actor), &model);
        if !permission.is_allowed() {
            return Err(self.denied(actor, permission));
        }

        let model = self
            .handler
            .add_model(self.repository.as_ref(), actor, model)
            .await?;
        let model = self.handler.after_add(actor, model).await?;

        tracing::info!(
            user_id = %actor.user_id,
            entity = <H::Entity as Entity>::ENTITY,
            id = %model.id(),
            "Created entity"
        );

        Ok(Created {
            id: model.id().to_string(),
            location: model.location(),
            view: self.to_view(&model)?,
        })
    }

    /// Apply a partial update. Entities the actor cannot see are reported as
    /// not found. An empty change set returns the stored entity without an
    /// update check or a write.
    pub async fn patch(
        &self,
        actor: &ActorContext,
        id: &str,
        changes: ChangeSet,
    ) -> AppResult<H::ViewModel> {
        let evaluator = self.evaluator(actor);
        let original = self
            .repository
            .get_by_id(id)
            .await?
            .filter(|e| self.handler.policy().can_read(&evaluator, e))
            .ok_or_else(|| not_found::<H::Entity>(id))?;

        if changes.is_empty() {
            return self.to_view(&original);
        }

        let permission = self
            .handler
            .policy()
            .can_update(&evaluator, &original, &changes);
        if !permission.is_allowed() {
            return Err(self.denied(actor, permission));
        }

        let mut model = original;
        let changed = apply_changes(&mut model, &changes)?;

        let model = self
            .handler
            .update_model(self.repository.as_ref(), actor, model)
            .await?;
        let model = self.handler.after_patch(actor, model).await?;

        tracing::info!(
            user_id = %actor.user_id,
            entity = <H::Entity as Entity>::ENTITY,
            id = %model.id(),
            fields = ?changed,
            "Patched entity"
        );

        self.to_view(&model)
    }

    /// Delete every entity named by `ids` that the actor may delete.
    pub async fn delete_many(&self, actor: &ActorContext, ids: &[String]) -> AppResult<WorkAccepted> {
        let ids = distinct_ids(ids);
        if ids.is_empty() {
            return Err(AppError::BadRequest("At least one id is required".to_string()));
        }
        if ids.len() > self.max_bulk_ids {
            return Err(AppError::BadRequest(format!(
                "At most {} ids may be deleted in one request",
                self.max_bulk_ids
            )));
        }

        let found = self.repository.get_by_ids(&ids).await?;

        let operation = {
            let evaluator = self.evaluator(actor);
            let policy = self.handler.policy();
            BulkOperation::partition(&ids, found).authorize(|e| policy.can_delete(&evaluator, e))
        };

        if operation.nothing_found() {
            return Err(not_found::<H::Entity>(&ids.join(",")));
        }

        if let Some(rejection) = operation.rejection() {
            return Err(match rejection {
                BulkRejection::Denied(permission) => self.denied(actor, permission),
                BulkRejection::Rejected(result) => AppError::BulkPartial(result),
            });
        }

        let workers = match self
            .handler
            .delete_models(self.repository.as_ref(), actor, operation.actionable())
            .await
        {
            Ok(workers) => workers,
            Err(err) => {
                tracing::error!(
                    user_id = %actor.user_id,
                    entity = <H::Entity as Entity>::ENTITY,
                    ids = ?ids,
                    error = %err,
                    "Failed to delete entities"
                );
                return Err(AppError::InternalError(err.to_string()));
            }
        };

        tracing::info!(
            user_id = %actor.user_id,
            entity = <H::Entity as Entity>::ENTITY,
            deleted = operation.actionable().len(),
            workers = workers.len(),
            "Deleted entities"
        );

        match operation.complete(workers) {
            BulkCompletion::Accepted(workers) => Ok(WorkAccepted { workers }),
            BulkCompletion::Partial(result) => Err(AppError::BulkPartial(result)),
        }
    }

    fn evaluator<'a>(&'a self, actor: &'a ActorContext) -> PermissionEvaluator<'a> {
        PermissionEvaluator::new(actor, self.access.as_ref())
    }

    fn denied(&self, actor: &ActorContext, permission: PermissionResult) -> AppError {
        tracing::debug!(
            user_id = %actor.user_id,
            entity = <H::Entity as Entity>::ENTITY,
            id = ?permission.id,
            decision = ?permission.decision,
            "Permission denied"
        );
        denied::<H::Entity>(permission)
    }

    fn to_view(&self, model: &H::Entity) -> AppResult<H::ViewModel> {
        let mut view: H::ViewModel = self
            .mapper
            .map(model)
            .map_err(|e| AppError::InternalError(e.to_string()))?;
        self.handler.after_result_map(model, &mut view);
        Ok(view)
    }
}

fn not_found<E: Entity>(id: &str) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: E::ENTITY,
        id: id.to_string(),
    })
}

/// A not-found shaped denial gets the same body as a missing entity.
fn denied<E: Entity>(permission: PermissionResult) -> AppError {
    match permission.decision {
        Decision::NotFound => not_found::<E>(permission.id.as_deref().unwrap_or_default()),
        Decision::Denied | Decision::Allowed => AppError::PermissionDenied(permission),
    }
}
