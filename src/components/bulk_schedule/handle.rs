use super::actor::{BulkScheduleActor, BulkScheduleActorHandle};
use super::models::{PreviewRequest, SlotPreview};
use crate::components::conflict_check::ConflictChecker;
use crate::config::Config;
use crate::error::SchedulerResult;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

/// Handle for interacting with the preview actor
#[derive(Clone)]
pub struct BulkScheduleHandle {
    actor_handle: BulkScheduleActorHandle,
    _actor_task: Arc<JoinHandle<()>>,
}

impl BulkScheduleHandle {
    /// Create a new BulkScheduleHandle and spawn the actor
    pub fn new(config: Arc<RwLock<Config>>, checker: ConflictChecker) -> Self {
        let (mut actor, handle) = BulkScheduleActor::new(config, checker);

        let actor_task = tokio::spawn(async move {
            actor.run().await;
        });

        Self {
            actor_handle: handle,
            _actor_task: Arc::new(actor_task),
        }
    }

    /// Preview slots for a request.
    ///
    /// Fails with `Error::Superseded` when a newer request was queued behind
    /// this one before the actor got to it.
    pub async fn preview(&self, request: PreviewRequest) -> SchedulerResult<Vec<SlotPreview>> {
        self.actor_handle.preview(request).await
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> SchedulerResult<()> {
        self.actor_handle.shutdown().await
    }
}
