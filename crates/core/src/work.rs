//! Background work contract.
//!
//! Deleting an entity may hand cleanup to asynchronous workers. The core only
//! needs "enqueue, get an id back"; delivery and retry belong to the queue.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::types::EntityId;

/// Opaque handle to queued background work, returned to clients for polling.
pub type WorkItemId = String;

/// A unit of background work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorkItem {
    /// Remove an organization and everything it owns.
    RemoveOrganization {
        organization_id: EntityId,
        requested_by: EntityId,
    },
    /// Remove data that hangs off a deleted project.
    RemoveProjectData {
        organization_id: EntityId,
        project_id: EntityId,
        requested_by: EntityId,
    },
}

impl WorkItem {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::RemoveOrganization { .. } => "remove_organization",
            Self::RemoveProjectData { .. } => "remove_project_data",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    #[error("Work queue is closed")]
    Closed,

    #[error("Failed to enqueue work item: {0}")]
    Enqueue(String),
}

#[async_trait]
pub trait WorkQueue: Send + Sync {
    async fn enqueue(&self, item: WorkItem) -> Result<WorkItemId, QueueError>;
}
