mod actor;
pub mod generator;
mod handle;
pub mod models;

pub use generator::{generate, generate_with};
pub use handle::BulkScheduleHandle;
pub use models::{GenerateOptions, GeneratedSlot, PreviewRequest, SchedulePreference, SlotPreview};

use crate::components::conflict_check::{annotate, build_source, ConflictChecker};
use crate::config::Config;
use crate::error::SchedulerResult;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

/// Generate the slots of a request and annotate them with conflicts.
///
/// `default_start` is used when the request carries no start date.
pub async fn preview(
    checker: &ConflictChecker,
    request: &PreviewRequest,
    default_start: NaiveDate,
    max_days_scanned: Option<u32>,
) -> Vec<SlotPreview> {
    let options = GenerateOptions {
        closed_dates: request.closed_dates.iter().copied().collect(),
        max_days_scanned,
    };
    let start_date = request.start_date.unwrap_or(default_start);

    let slots = generate_with(
        start_date,
        &request.preferences,
        request.count,
        request.duration_minutes,
        &options,
    );
    let conflicts = checker.check_conflicts(&slots).await;

    annotate(&slots, &conflicts)
}

/// Bulk schedule component serving slot previews
#[derive(Default)]
pub struct BulkSchedule {
    handle: RwLock<Option<BulkScheduleHandle>>,
}

impl BulkSchedule {
    /// Create a new Bulk Schedule component
    pub fn new() -> Self {
        Self {
            handle: RwLock::new(None),
        }
    }

    /// Get the handle if it exists
    pub async fn get_handle(&self) -> Option<BulkScheduleHandle> {
        let handle_lock = self.handle.read().await;
        handle_lock.clone()
    }
}

#[async_trait]
impl super::Component for BulkSchedule {
    fn name(&self) -> &'static str {
        "bulk_schedule"
    }

    async fn init(&self, config: Arc<RwLock<Config>>) -> SchedulerResult<()> {
        let mut handle_lock = self.handle.write().await;
        if handle_lock.is_some() {
            return Ok(());
        }

        let checker = {
            let config_read = config.read().await;
            let source = build_source(&config_read)?;
            info!(
                "Bulk schedule previews use the {} conflict source (capacity threshold {})",
                source.name(),
                config_read.capacity_threshold
            );
            ConflictChecker::new(source, config_read.capacity_threshold)
        };

        *handle_lock = Some(BulkScheduleHandle::new(config, checker));
        Ok(())
    }

    async fn shutdown(&self) -> SchedulerResult<()> {
        let handle_lock = self.handle.read().await;
        if let Some(handle) = &*handle_lock {
            handle.shutdown().await?;
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
