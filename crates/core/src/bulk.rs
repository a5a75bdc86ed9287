//! Bulk (multi-id) operation bookkeeping.
//!
//! Every distinct requested id ends up in exactly one bucket of
//! [`BulkResult`]: not found, denied, or succeeded. Work-item ids produced
//! by the succeeded entities ride along in `workers`.
//!
//! A batch with some denials and some successes is reported as a client
//! error carrying the full [`BulkResult`]; callers inspect the body to learn
//! what actually happened.

use std::collections::HashSet;

use serde::Serialize;

use crate::entity::Entity;
use crate::permission::PermissionResult;
use crate::types::EntityId;
use crate::work::WorkItemId;

/// Aggregate outcome of a bulk request.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BulkResult {
    pub success: Vec<EntityId>,
    pub failure: Vec<PermissionResult>,
    pub workers: Vec<WorkItemId>,
    pub not_found: Vec<EntityId>,
}

impl BulkResult {
    /// Every id recorded across the success, failure and not-found buckets.
    pub fn accounted_ids(&self) -> Vec<&str> {
        self.success
            .iter()
            .map(String::as_str)
            .chain(self.failure.iter().filter_map(|f| f.id.as_deref()))
            .chain(self.not_found.iter().map(String::as_str))
            .collect()
    }
}

/// Trim, drop empties and de-duplicate ids, keeping first occurrence order.
pub fn distinct_ids<I, S>(ids: I) -> Vec<EntityId>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    ids.into_iter()
        .map(|id| id.as_ref().trim().to_string())
        .filter(|id| !id.is_empty())
        .filter(|id| seen.insert(id.clone()))
        .collect()
}

/// What to do once permission filtering left nothing to act on.
#[derive(Debug, Clone, PartialEq)]
pub enum BulkRejection {
    /// A single denial is surfaced as that permission failure.
    Denied(PermissionResult),
    /// Several denials are surfaced as the aggregate result.
    Rejected(BulkResult),
}

/// Final outcome after the actionable entities were processed.
#[derive(Debug, Clone, PartialEq)]
pub enum BulkCompletion {
    /// No denials: the work was accepted. Carries the background work ids.
    Accepted(Vec<WorkItemId>),
    /// Denials alongside successes.
    Partial(BulkResult),
}

/// A bulk request moving through partition → authorize → complete.
#[derive(Debug)]
pub struct BulkOperation<E> {
    actionable: Vec<E>,
    result: BulkResult,
}

impl<E: Entity> BulkOperation<E> {
    /// Split `requested` ids into entities found in `available` and ids that
    /// were not. Entities not requested are ignored; duplicates collapse.
    pub fn partition(requested: &[EntityId], available: Vec<E>) -> Self {
        let requested = distinct_ids(requested);
        let mut available = available;
        let mut actionable = Vec::with_capacity(requested.len());
        let mut not_found = Vec::new();

        for id in requested {
            match available.iter().position(|e| e.id() == id) {
                Some(index) => actionable.push(available.swap_remove(index)),
                None => not_found.push(id),
            }
        }

        Self {
            actionable,
            result: BulkResult {
                not_found,
                ..BulkResult::default()
            },
        }
    }

    /// Run `check` on every found entity, moving denied ones into the
    /// failure bucket.
    pub fn authorize(mut self, mut check: impl FnMut(&E) -> PermissionResult) -> Self {
        let mut allowed = Vec::with_capacity(self.actionable.len());
        for entity in self.actionable {
            let permission = check(&entity);
            if permission.is_allowed() {
                allowed.push(entity);
            } else {
                self.result.failure.push(permission.for_entity(entity.id()));
            }
        }
        self.actionable = allowed;
        self
    }

    /// True when nothing that was requested exists.
    pub fn nothing_found(&self) -> bool {
        self.actionable.is_empty() && self.result.failure.is_empty()
    }

    pub fn actionable(&self) -> &[E] {
        &self.actionable
    }

    pub fn result(&self) -> &BulkResult {
        &self.result
    }

    /// The rejection to return when permission filtering removed every
    /// found entity, or `None` when there is still work to do.
    pub fn rejection(&self) -> Option<BulkRejection> {
        if !self.actionable.is_empty() {
            return None;
        }
        match self.result.failure.as_slice() {
            [single] => Some(BulkRejection::Denied(single.clone())),
            _ => Some(BulkRejection::Rejected(self.result.clone())),
        }
    }

    /// Record the actionable entities as succeeded and apply the outcome
    /// policy.
    pub fn complete(mut self, workers: Vec<WorkItemId>) -> BulkCompletion {
        self.result.success = self.actionable.iter().map(|e| e.id().to_string()).collect();
        if self.result.failure.is_empty() {
            BulkCompletion::Accepted(workers)
        } else {
            self.result.workers = workers;
            BulkCompletion::Partial(self.result)
        }
    }
}
