//! Webhook entity model and DTOs.

use faultline_core::entity::{Entity, Scope};
use faultline_core::types::{EntityId, Timestamp};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

pub const EVENT_NEW_ERROR: &str = "NewError";
pub const EVENT_CRITICAL_ERROR: &str = "CriticalError";
pub const EVENT_STACK_REGRESSION: &str = "StackRegression";
pub const EVENT_STACK_PROMOTED: &str = "StackPromoted";

/// All event types a webhook may subscribe to.
pub const VALID_EVENT_TYPES: &[&str] = &[
    EVENT_NEW_ERROR,
    EVENT_CRITICAL_ERROR,
    EVENT_STACK_REGRESSION,
    EVENT_STACK_PROMOTED,
];

/// An outbound HTTP callback, owned by an organization and optionally scoped
/// to one project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Webhook {
    #[serde(default)]
    pub id: EntityId,
    #[serde(default)]
    #[validate(length(min = 1, message = "is required"))]
    pub organization_id: EntityId,
    #[serde(default)]
    pub project_id: Option<EntityId>,
    #[validate(url(message = "must be a valid URL"))]
    pub url: String,
    #[validate(custom(function = "validate_event_types"))]
    pub event_types: Vec<String>,
    #[serde(default = "enabled")]
    pub is_enabled: bool,
    #[serde(default = "chrono::Utc::now")]
    pub created_at: Timestamp,
}

fn enabled() -> bool {
    true
}

#[allow(clippy::ptr_arg)]
fn validate_event_types(event_types: &Vec<String>) -> Result<(), ValidationError> {
    if event_types.is_empty() {
        return Err(ValidationError::new("required")
            .with_message("at least one event type is required".into()));
    }
    match event_types
        .iter()
        .find(|t| !VALID_EVENT_TYPES.contains(&t.as_str()))
    {
        Some(unknown) => Err(ValidationError::new("event_type")
            .with_message(format!("unknown event type '{unknown}'").into())),
        None => Ok(()),
    }
}

impl Entity for Webhook {
    const ENTITY: &'static str = "Webhook";
    const RESOURCE: &'static str = "webhooks";
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

/// DTO for creating a new webhook.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewWebhook {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<EntityId>,
    #[serde(default)]
    pub project_id: Option<EntityId>,
    pub url: String,
    pub event_types: Vec<String>,
}
