//! `/organizations`: the tenant boundary itself.
//!
//! Ownership checks run against the organization's own id. Deleting an
//! organization only queues the removal; the cascade runs in the background
//! worker.

use std::sync::Arc;

use async_trait::async_trait;
use faultline_core::actor::ActorContext;
use faultline_core::patch::ChangeSet;
use faultline_core::permission::{
    PermissionEvaluator, PermissionPolicy, PermissionResult, INVALID_ORGANIZATION_MESSAGE,
};
use faultline_core::work::{WorkItem, WorkItemId, WorkQueue};
use faultline_db::models::organization::{NewOrganization, Organization};
use faultline_db::repositories::Repository;

use crate::controller::ResourceHandler;
use crate::state::AppState;

#[derive(Debug, Clone, Copy, Default)]
pub struct OrganizationPolicy;

impl PermissionPolicy<Organization> for OrganizationPolicy {
    fn can_read(&self, evaluator: &PermissionEvaluator<'_>, organization: &Organization) -> bool {
        evaluator.can_access_organization(&organization.id)
    }

    fn can_update(
        &self,
        evaluator: &PermissionEvaluator<'_>,
        original: &Organization,
        changes: &ChangeSet,
    ) -> PermissionResult {
        if !evaluator.can_access_organization(&original.id) {
            return PermissionResult::deny_with_message(
                INVALID_ORGANIZATION_MESSAGE,
                Some(&original.id),
            );
        }
        evaluator.can_update(original, changes)
    }

    fn can_delete(
        &self,
        evaluator: &PermissionEvaluator<'_>,
        organization: &Organization,
    ) -> PermissionResult {
        if !evaluator.can_access_organization(&organization.id) {
            return PermissionResult::deny_with_not_found(&organization.id);
        }
        evaluator.can_delete(organization)
    }
}

pub struct OrganizationResource {
    policy: OrganizationPolicy,
    work_queue: Arc<dyn WorkQueue>,
}

#[async_trait]
impl ResourceHandler for OrganizationResource {
    type Entity = Organization;
    type NewModel = NewOrganization;
    type ViewModel = Organization;
    type Policy = OrganizationPolicy;

    fn policy(&self) -> &OrganizationPolicy {
        &self.policy
    }

    fn from_state(state: &AppState) -> Self {
        Self {
            policy: OrganizationPolicy,
            work_queue: Arc::clone(&state.work_queue),
        }
    }

    fn repository(state: &AppState) -> Arc<dyn Repository<Organization>> {
        Arc::clone(&state.repositories.organizations)
    }

    async fn delete_models(
        &self,
        _repository: &dyn Repository<Organization>,
        actor: &ActorContext,
        models: &[Organization],
    ) -> anyhow::Result<Vec<WorkItemId>> {
        let mut workers = Vec::with_capacity(models.len());
        for organization in models {
            let id = self
                .work_queue
                .enqueue(WorkItem::RemoveOrganization {
                    organization_id: organization.id.clone(),
                    requested_by: actor.user_id.clone(),
                })
                .await?;
            tracing::info!(
                organization_id = %organization.id,
                work_item_id = %id,
                "Queued organization removal"
            );
            workers.push(id);
        }
        Ok(workers)
    }
}
