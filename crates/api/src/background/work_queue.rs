//! In-process [`WorkQueue`] backed by a bounded tokio channel.

use async_trait::async_trait;
use faultline_core::work::{QueueError, WorkItem, WorkItemId, WorkQueue};
use tokio::sync::mpsc;
use uuid::Uuid;

/// Channel capacity. `enqueue` waits when the worker falls this far behind.
const QUEUE_CAPACITY: usize = 1024;

/// A work item together with the id handed back to the client.
#[derive(Debug, Clone, PartialEq)]
pub struct QueuedWork {
    pub id: WorkItemId,
    pub item: WorkItem,
}

pub struct InProcessWorkQueue {
    sender: mpsc::Sender<QueuedWork>,
}

impl InProcessWorkQueue {
    /// Create the queue and the receiving end for the worker.
    pub fn new() -> (Self, mpsc::Receiver<QueuedWork>) {
        let (sender, receiver) = mpsc::channel(QUEUE_CAPACITY);
        (Self { sender }, receiver)
    }
}

#[async_trait]
impl WorkQueue for InProcessWorkQueue {
    async fn enqueue(&self, item: WorkItem) -> Result<WorkItemId, QueueError> {
        let id = Uuid::new_v4().to_string();
        tracing::debug!(work_item_id = %id, kind = item.kind(), "Enqueueing work item");
        self.sender
            .send(QueuedWork {
                id: id.clone(),
                item,
            })
            .await
            .map_err(|_| QueueError::Closed)?;
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn remove_org(id: &str) -> WorkItem {
        WorkItem::RemoveOrganization {
            organization_id: id.into(),
            requested_by: "user-1".into(),
        }
    }

    #[tokio::test]
    async fn enqueued_items_arrive_in_order_with_their_ids() {
        let (queue, mut receiver) = InProcessWorkQueue::new();
        let first = queue.enqueue(remove_org("org-a")).await.unwrap();
        let second = queue.enqueue(remove_org("org-b")).await.unwrap();
        assert_ne!(first, second);

        let received = receiver.recv().await.unwrap();
        assert_eq!(received.id, first);
        assert_eq!(received.item, remove_org("org-a"));
        assert_eq!(receiver.recv().await.unwrap().id, second);
    }

    #[tokio::test]
    async fn enqueue_after_worker_stopped_fails() {
        let (queue, receiver) = InProcessWorkQueue::new();
        drop(receiver);
        assert_matches!(queue.enqueue(remove_org("org-a")).await, Err(QueueError::Closed));
    }
}
