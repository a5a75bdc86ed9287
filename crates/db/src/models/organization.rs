//! Organization entity model and DTOs.

use faultline_core::entity::{Entity, Scope};
use faultline_core::types::{EntityId, Timestamp};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// An organization: the tenant boundary every other entity is owned by.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Organization {
    #[serde(default)]
    pub id: EntityId,
    #[validate(length(min = 1, max = 100, message = "must be between 1 and 100 characters"))]
    pub name: String,
    #[serde(default = "chrono::Utc::now")]
    pub created_at: Timestamp,
}

impl Entity for Organization {
    const ENTITY: &'static str = "Organization";
    const RESOURCE: &'static str = "organizations";
    const SCOPE: Scope = Scope::Organization;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }
}

/// DTO for creating a new organization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrganization {
    pub name: String,
}
