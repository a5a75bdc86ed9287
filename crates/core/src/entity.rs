//! Capabilities an entity type declares about itself.
//!
//! Whether an entity is owned by an organization is a property of its type,
//! declared once through [`Entity::SCOPE`], never discovered at runtime.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::types::EntityId;

/// Canonical wire name of the ownership field.
pub const ORGANIZATION_ID_FIELD: &str = "organization_id";

/// Canonical wire name of the identity field.
pub const ID_FIELD: &str = "id";

/// How an entity type relates to organizations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// The entity *is* an organization. Ownership checks against
    /// `organization_id` do not apply.
    Organization,
    /// Owned by exactly one organization through `organization_id`.
    OrganizationOwned,
    /// Not attributed to any organization.
    Global,
}

/// A persisted domain object with a stable string identifier.
pub trait Entity: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
    /// Singular name used in errors and logs, e.g. `"Project"`.
    const ENTITY: &'static str;
    /// Plural resource segment of the canonical location, e.g. `"projects"`.
    const RESOURCE: &'static str;
    const SCOPE: Scope;

    fn id(&self) -> &str;

    fn set_id(&mut self, id: EntityId);

    /// Owning organization. Only meaningful for
    /// [`Scope::OrganizationOwned`] types; `None` or `""` means unassigned.
    fn organization_id(&self) -> Option<&str> {
        None
    }

    fn set_organization_id(&mut self, _organization_id: EntityId) {}

    /// The owning organization id when this type is organization-owned,
    /// with an unassigned owner reported as `""`.
    fn owner(&self) -> Option<&str> {
        match Self::SCOPE {
            Scope::OrganizationOwned => Some(self.organization_id().unwrap_or_default()),
            Scope::Organization | Scope::Global => None,
        }
    }

    /// Canonical location of this entity under the API root.
    fn location(&self) -> String {
        format!("/api/v1/{}/{}", Self::RESOURCE, self.id())
    }
}
