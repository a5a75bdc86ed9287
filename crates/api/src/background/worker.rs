//! Executes queued cleanup work.
//!
//! Receives [`QueuedWork`] from the in-process queue and removes whatever the
//! deleted entity left behind. Runs until the channel closes or `cancel` is
//! triggered. On cancel the queue stops accepting work and every item already
//! accepted is still processed; the caller bounds how long that takes.

use faultline_core::work::WorkItem;
use faultline_db::error::RepositoryResult;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::work_queue::QueuedWork;
use crate::state::Repositories;

/// Run the work loop.
pub async fn run(
    mut receiver: mpsc::Receiver<QueuedWork>,
    repositories: Repositories,
    cancel: CancellationToken,
) {
    tracing::info!("Background worker started");

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                receiver.close();
                tracing::info!("Background worker draining queue");
                while let Some(work) = receiver.recv().await {
                    execute(&repositories, work).await;
                }
                tracing::info!("Background worker stopping");
                break;
            }
            next = receiver.recv() => {
                let Some(work) = next else {
                    tracing::info!("Work queue closed, background worker stopping");
                    break;
                };
                execute(&repositories, work).await;
            }
        }
    }
}

async fn execute(repositories: &Repositories, work: QueuedWork) {
    match process(repositories, &work.item).await {
        Ok(removed) => {
            tracing::info!(
                work_item_id = %work.id,
                kind = work.item.kind(),
                removed,
                "Work item completed"
            );
        }
        Err(e) => {
            tracing::error!(
                work_item_id = %work.id,
                kind = work.item.kind(),
                error = %e,
                "Work item failed"
            );
        }
    }
}

/// Execute one work item. Returns how many entities were removed.
pub async fn process(repositories: &Repositories, item: &WorkItem) -> RepositoryResult<u64> {
    match item {
        WorkItem::RemoveOrganization {
            organization_id, ..
        } => {
            let webhooks = repositories
                .webhooks
                .get_by_organization_id(organization_id)
                .await?;
            let mut removed = repositories.webhooks.remove(&webhooks).await?;

            let projects = repositories
                .projects
                .get_by_organization_id(organization_id)
                .await?;
            removed += repositories.projects.remove(&projects).await?;

            if let Some(organization) = repositories.organizations.get_by_id(organization_id).await? {
                removed += repositories.organizations.remove(&[organization]).await?;
            }
            Ok(removed)
        }
        WorkItem::RemoveProjectData {
            organization_id,
            project_id,
            ..
        } => {
            let webhooks: Vec<_> = repositories
                .webhooks
                .get_by_organization_id(organization_id)
                .await?
                .into_iter()
                .filter(|w| w.project_id.as_deref() == Some(project_id.as_str()))
                .collect();
            repositories.webhooks.remove(&webhooks).await
        }
    }
}
