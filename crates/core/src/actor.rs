//! The authenticated caller and the organization-access lookup.

use serde::{Deserialize, Serialize};

use crate::types::EntityId;

/// The authenticated caller a request is executed on behalf of.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorContext {
    /// Identity of the authenticated user. Attached to every error log.
    pub user_id: EntityId,
    /// Organizations the caller belongs to, in association order. The first
    /// entry is the caller's default organization.
    pub organization_ids: Vec<EntityId>,
    /// Global administrators may access every organization.
    pub is_global_admin: bool,
}

impl ActorContext {
    pub fn new(user_id: impl Into<EntityId>, organization_ids: Vec<EntityId>) -> Self {
        Self {
            user_id: user_id.into(),
            organization_ids,
            is_global_admin: false,
        }
    }

    /// The organization new organization-owned entities are assigned to when
    /// the caller does not name one.
    pub fn default_organization_id(&self) -> Option<&str> {
        self.organization_ids.first().map(String::as_str)
    }

    /// Membership-based access check. Empty ids are never accessible.
    pub fn can_access_organization(&self, organization_id: &str) -> bool {
        if organization_id.is_empty() {
            return false;
        }
        self.is_global_admin || self.organization_ids.iter().any(|id| id == organization_id)
    }
}

/// Decides whether an actor may access an organization.
///
/// The permission evaluator only ever asks this question; swapping the
/// implementation changes where the answer comes from (token claims, a
/// membership table, a cache).
pub trait OrganizationAccess: Send + Sync {
    fn can_access(&self, actor: &ActorContext, organization_id: &str) -> bool;
}

/// Answers from the organization ids carried on the actor itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct MembershipAccess;

impl OrganizationAccess for MembershipAccess {
    fn can_access(&self, actor: &ActorContext, organization_id: &str) -> bool {
        actor.can_access_organization(organization_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member_of(orgs: &[&str]) -> ActorContext {
        ActorContext::new("user-1", orgs.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn default_organization_is_first_association() {
        let actor = member_of(&["org-b", "org-a"]);
        assert_eq!(actor.default_organization_id(), Some("org-b"));
    }

    #[test]
    fn no_default_organization_without_memberships() {
        assert_eq!(member_of(&[]).default_organization_id(), None);
    }

    #[test]
    fn member_can_access_own_organization_only() {
        let actor = member_of(&["org-a"]);
        assert!(MembershipAccess.can_access(&actor, "org-a"));
        assert!(!MembershipAccess.can_access(&actor, "org-b"));
    }

    #[test]
    fn global_admin_can_access_any_organization() {
        let mut actor = member_of(&[]);
        actor.is_global_admin = true;
        assert!(actor.can_access_organization("anything"));
    }

    #[test]
    fn empty_organization_id_is_never_accessible() {
        let mut actor = member_of(&["org-a"]);
        actor.is_global_admin = true;
        assert!(!actor.can_access_organization(""));
    }
}
