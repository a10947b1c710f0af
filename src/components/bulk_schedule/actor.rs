use super::models::{PreviewRequest, SlotPreview};
use crate::components::conflict_check::ConflictChecker;
use crate::config::Config;
use crate::error::{component_error, Error, SchedulerResult};
use crate::utils::time::tomorrow;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::{mpsc, RwLock};
use tracing::{debug, error, info};

type PreviewReply = mpsc::Sender<SchedulerResult<Vec<SlotPreview>>>;

/// The preview actor that processes messages
pub struct BulkScheduleActor {
    config: Arc<RwLock<Config>>,
    checker: ConflictChecker,
    command_rx: mpsc::Receiver<BulkScheduleCommand>,
}

/// Commands that can be sent to the preview actor
pub enum BulkScheduleCommand {
    Preview(PreviewRequest, PreviewReply),
    Shutdown,
}

/// Handle for communicating with the preview actor
#[derive(Clone)]
pub struct BulkScheduleActorHandle {
    command_tx: mpsc::Sender<BulkScheduleCommand>,
}

impl BulkScheduleActorHandle {
    /// Generate slots for a request and check them for conflicts
    pub async fn preview(&self, request: PreviewRequest) -> SchedulerResult<Vec<SlotPreview>> {
        let (response_tx, mut response_rx) = mpsc::channel(1);
        self.command_tx
            .send(BulkScheduleCommand::Preview(request, response_tx))
            .await
            .map_err(|e| component_error(&format!("Actor mailbox error: {}", e)))?;

        response_rx
            .recv()
            .await
            .ok_or_else(|| component_error("Response channel closed"))?
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> SchedulerResult<()> {
        let _ = self.command_tx.send(BulkScheduleCommand::Shutdown).await;
        Ok(())
    }
}

impl BulkScheduleActor {
    /// Create a new actor and return its handle
    pub fn new(
        config: Arc<RwLock<Config>>,
        checker: ConflictChecker,
    ) -> (Self, BulkScheduleActorHandle) {
        let (command_tx, command_rx) = mpsc::channel(32);

        let actor = Self {
            config,
            checker,
            command_rx,
        };

        let handle = BulkScheduleActorHandle { command_tx };

        (actor, handle)
    }

    /// Start the actor's processing loop
    pub async fn run(&mut self) {
        info!("Bulk schedule actor started");

        while let Some(cmd) = self.command_rx.recv().await {
            match cmd {
                BulkScheduleCommand::Preview(request, response_tx) => {
                    let (request, response_tx, shutdown) =
                        self.take_latest(request, response_tx).await;

                    let result = self.preview(request).await;
                    let _ = response_tx.send(result).await;

                    if shutdown {
                        info!("Bulk schedule actor shutting down");
                        break;
                    }
                }
                BulkScheduleCommand::Shutdown => {
                    info!("Bulk schedule actor shutting down");
                    break;
                }
            }
        }

        info!("Bulk schedule actor shut down");
    }

    /// Drain queued previews, answering all but the newest with `Superseded`
    async fn take_latest(
        &mut self,
        mut request: PreviewRequest,
        mut response_tx: PreviewReply,
    ) -> (PreviewRequest, PreviewReply, bool) {
        loop {
            match self.command_rx.try_recv() {
                Ok(BulkScheduleCommand::Preview(newer, newer_tx)) => {
                    debug!("Discarding stale preview request");
                    let _ = response_tx.send(Err(Error::Superseded)).await;
                    request = newer;
                    response_tx = newer_tx;
                }
                Ok(BulkScheduleCommand::Shutdown) => return (request, response_tx, true),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => {
                    return (request, response_tx, false)
                }
            }
        }
    }

    async fn preview(&self, request: PreviewRequest) -> SchedulerResult<Vec<SlotPreview>> {
        let (tz, max_days_scanned) = {
            let config_read = self.config.read().await;
            (config_read.tz(), config_read.max_days_scanned)
        };

        let tz = tz.map_err(|e| {
            error!("Preview rejected: {}", e);
            e
        })?;
        let default_start = tomorrow(&Utc::now().with_timezone(&tz));

        Ok(super::preview(&self.checker, &request, default_start, max_days_scanned).await)
    }
}
