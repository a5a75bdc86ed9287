//! Project entity model and DTOs.

use faultline_core::entity::{Entity, Scope};
use faultline_core::types::{EntityId, Timestamp};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A project collects error events for one application. Owned by an
/// organization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Project {
    #[serde(default)]
    pub id: EntityId,
    #[serde(default)]
    #[validate(length(min = 1, message = "is required"))]
    pub organization_id: EntityId,
    #[validate(length(min = 1, max = 100, message = "must be between 1 and 100 characters"))]
    pub name: String,
    #[serde(default)]
    pub delete_bot_data_enabled: bool,
    #[serde(default)]
    #[validate(length(max = 2000, message = "must be at most 2000 characters"))]
    pub custom_content: Option<String>,
    #[serde(default = "chrono::Utc::now")]
    pub created_at: Timestamp,
}

impl Entity for Project {
    const ENTITY: &'static str = "Project";
    const RESOURCE: &'static str = "projects";
    const SCOPE: Scope = Scope::OrganizationOwned;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }

    fn organization_id(&self) -> Option<&str> {
        Some(&self.organization_id)
    }

    fn set_organization_id(&mut self, organization_id: EntityId) {
        self.organization_id = organization_id;
    }
}

/// DTO for creating a new project. Without `organization_id` the project is
/// placed in the caller's default organization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProject {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<EntityId>,
    pub name: String,
    #[serde(default)]
    pub delete_bot_data_enabled: bool,
    #[serde(default)]
    pub custom_content: Option<String>,
}

/// Project as returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewProject {
    pub id: EntityId,
    pub organization_id: EntityId,
    pub name: String,
    pub delete_bot_data_enabled: bool,
    pub created_at: Timestamp,
    /// Filled in after mapping.
    #[serde(default)]
    pub has_custom_content: bool,
}
