//! Tenant-ownership authorization for create, update and delete.
//!
//! The evaluator is a pure predicate over the entity, the change set and the
//! [`OrganizationAccess`] lookup. It never touches persistence.

use serde::Serialize;

use crate::actor::{ActorContext, OrganizationAccess};
use crate::entity::{Entity, ORGANIZATION_ID_FIELD};
use crate::patch::ChangeSet;
use crate::types::EntityId;

pub const INVALID_ORGANIZATION_MESSAGE: &str = "Invalid organization id specified.";
pub const ORGANIZATION_IMMUTABLE_MESSAGE: &str = "OrganizationId cannot be modified.";

/// Outcome kind of a permission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Allowed,
    /// Denied, with a reason the caller may see.
    Denied,
    /// Denied, reported as if the entity did not exist.
    NotFound,
}

/// A permission decision about one entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PermissionResult {
    pub decision: Decision,
    pub id: Option<EntityId>,
    pub message: Option<String>,
}

impl PermissionResult {
    pub fn allow() -> Self {
        Self {
            decision: Decision::Allowed,
            id: None,
            message: None,
        }
    }

    pub fn deny_with_message(message: impl Into<String>, id: Option<&str>) -> Self {
        Self {
            decision: Decision::Denied,
            id: id.map(str::to_string),
            message: Some(message.into()),
        }
    }

    pub fn deny_with_not_found(id: &str) -> Self {
        Self {
            decision: Decision::NotFound,
            id: Some(id.to_string()),
            message: None,
        }
    }

    pub fn is_allowed(&self) -> bool {
        self.decision == Decision::Allowed
    }

    /// Attach the subject id when the decision was made without one.
    pub fn for_entity(mut self, id: &str) -> Self {
        if self.id.is_none() && !id.is_empty() {
            self.id = Some(id.to_string());
        }
        self
    }
}

/// Evaluates create / update / delete permissions for one actor.
#[derive(Clone, Copy)]
pub struct PermissionEvaluator<'a> {
    actor: &'a ActorContext,
    access: &'a dyn OrganizationAccess,
}

impl<'a> PermissionEvaluator<'a> {
    pub fn new(actor: &'a ActorContext, access: &'a dyn OrganizationAccess) -> Self {
        Self { actor, access }
    }

    pub fn actor(&self) -> &ActorContext {
        self.actor
    }

    pub fn can_access_organization(&self, organization_id: &str) -> bool {
        self.access.can_access(self.actor, organization_id)
    }

    /// Organization entities and unowned entities may always be created.
    /// Owned entities need access to their organization.
    pub fn can_create<E: Entity>(&self, entity: &E) -> PermissionResult {
        match entity.owner() {
            Some(org) if !self.can_access_organization(org) => {
                PermissionResult::deny_with_message(INVALID_ORGANIZATION_MESSAGE, non_empty(entity.id()))
            }
            _ => PermissionResult::allow(),
        }
    }

    /// Ownership is checked against the stored entity; moving an entity to
    /// another organization is never allowed through a patch.
    pub fn can_update<E: Entity>(&self, original: &E, changes: &ChangeSet) -> PermissionResult {
        if let Some(org) = original.owner() {
            if !self.can_access_organization(org) {
                return PermissionResult::deny_with_message(
                    INVALID_ORGANIZATION_MESSAGE,
                    Some(original.id()),
                );
            }
        }

        if changes.contains_field(ORGANIZATION_ID_FIELD) {
            return PermissionResult::deny_with_message(
                ORGANIZATION_IMMUTABLE_MESSAGE,
                Some(original.id()),
            );
        }

        PermissionResult::allow()
    }

    /// Whether the entity is visible to the actor at all.
    pub fn can_read<E: Entity>(&self, entity: &E) -> bool {
        match entity.owner() {
            Some(org) => self.can_access_organization(org),
            None => true,
        }
    }

    /// Failing the ownership check on delete is reported as not found so the
    /// caller learns nothing about entities outside its organizations.
    pub fn can_delete<E: Entity>(&self, entity: &E) -> PermissionResult {
        match entity.owner() {
            Some(org) if !self.can_access_organization(org) => {
                PermissionResult::deny_with_not_found(entity.id())
            }
            _ => PermissionResult::allow(),
        }
    }
}

fn non_empty(id: &str) -> Option<&str> {
    (!id.is_empty()).then_some(id)
}

/// Per-resource permission policy. The defaults are the ownership rules of
/// [`PermissionEvaluator`]; resources with extra rules override a method and
/// usually still defer to the evaluator first.
pub trait PermissionPolicy<E: Entity>: Send + Sync {
    fn can_read(&self, evaluator: &PermissionEvaluator<'_>, entity: &E) -> bool {
        evaluator.can_read(entity)
    }

    fn can_add(&self, evaluator: &PermissionEvaluator<'_>, entity: &E) -> PermissionResult {
        evaluator.can_create(entity)
    }

    fn can_update(
        &self,
        evaluator: &PermissionEvaluator<'_>,
        original: &E,
        changes: &ChangeSet,
    ) -> PermissionResult {
        evaluator.can_update(original, changes)
    }

    fn can_delete(&self, evaluator: &PermissionEvaluator<'_>, entity: &E) -> PermissionResult {
        evaluator.can_delete(entity)
    }
}

/// The ownership rules and nothing else.
#[derive(Debug, Clone, Copy, Default)]
pub struct OwnershipPolicy;

impl<E: Entity> PermissionPolicy<E> for OwnershipPolicy {}
