//! `/projects`: removed synchronously, with their dependent data cleaned up
//! in the background.

use std::sync::Arc;

use async_trait::async_trait;
use faultline_core::actor::ActorContext;
use faultline_core::permission::OwnershipPolicy;
use faultline_core::work::{WorkItem, WorkItemId, WorkQueue};
use faultline_db::models::project::{NewProject, Project, ViewProject};
use faultline_db::repositories::Repository;

use crate::controller::ResourceHandler;
use crate::state::AppState;

pub struct ProjectResource {
    policy: OwnershipPolicy,
    work_queue: Arc<dyn WorkQueue>,
}

#[async_trait]
impl ResourceHandler for ProjectResource {
    type Entity = Project;
    type NewModel = NewProject;
    type ViewModel = ViewProject;
    type Policy = OwnershipPolicy;

    fn policy(&self) -> &OwnershipPolicy {
        &self.policy
    }

    fn from_state(state: &AppState) -> Self {
        Self {
            policy: OwnershipPolicy,
            work_queue: Arc::clone(&state.work_queue),
        }
    }

    fn repository(state: &AppState) -> Arc<dyn Repository<Project>> {
        Arc::clone(&state.repositories.projects)
    }

    async fn delete_models(
        &self,
        repository: &dyn Repository<Project>,
        actor: &ActorContext,
        models: &[Project],
    ) -> anyhow::Result<Vec<WorkItemId>> {
        let removed = repository.remove(models).await?;
        tracing::debug!(removed, "Removed projects");

        let mut workers = Vec::with_capacity(models.len());
        for project in models {
            let id = self
                .work_queue
                .enqueue(WorkItem::RemoveProjectData {
                    organization_id: project.organization_id.clone(),
                    project_id: project.id.clone(),
                    requested_by: actor.user_id.clone(),
                })
                .await?;
            workers.push(id);
        }
        Ok(workers)
    }

    fn after_result_map(&self, model: &Project, view: &mut ViewProject) {
        view.has_custom_content = model
            .custom_content
            .as_deref()
            .is_some_and(|content| !content.trim().is_empty());
    }
}
