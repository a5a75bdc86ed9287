//! `/webhooks`: plain ownership rules, synchronous delete.

use std::sync::Arc;

use async_trait::async_trait;
use faultline_core::mapping::Mapper;
use faultline_core::permission::OwnershipPolicy;
use faultline_db::models::webhook::{NewWebhook, Webhook};
use faultline_db::repositories::Repository;

use crate::controller::ResourceHandler;
use crate::state::AppState;

pub struct WebhookResource {
    policy: OwnershipPolicy,
}

#[async_trait]
impl ResourceHandler for WebhookResource {
    type Entity = Webhook;
    type NewModel = NewWebhook;
    type ViewModel = Webhook;
    type Policy = OwnershipPolicy;

    fn policy(&self) -> &OwnershipPolicy {
        &self.policy
    }

    fn from_state(_state: &AppState) -> Self {
        Self {
            policy: OwnershipPolicy,
        }
    }

    fn repository(state: &AppState) -> Arc<dyn Repository<Webhook>> {
        Arc::clone(&state.repositories.webhooks)
    }
}

/// New webhooks start enabled, with repeated event types collapsed.
///
/// Returns `false` when the mapper already held a rule for the pair; the
/// earlier rule stays in place.
pub fn register_mappings(mapper: &Mapper) -> bool {
    let registered = mapper.register(|input: &NewWebhook| {
        let mut event_types: Vec<String> = Vec::with_capacity(input.event_types.len());
        for event_type in &input.event_types {
            if !event_types.contains(event_type) {
                event_types.push(event_type.clone());
            }
        }
        Webhook {
            id: String::new(),
            organization_id: input.organization_id.clone().unwrap_or_default(),
            project_id: input.project_id.clone(),
            url: input.url.trim().to_string(),
            event_types,
            is_enabled: true,
            created_at: chrono::Utc::now(),
        }
    });
    if !registered {
        tracing::debug!("NewWebhook -> Webhook mapping already registered, keeping existing rule");
    }
    registered
}
