use crate::components::bulk_schedule::{BulkSchedule, PreviewRequest, SlotPreview};
use crate::components::ComponentManager;
use crate::config::Config;
use crate::error::{component_error, Error, SchedulerResult};
use serde::Serialize;
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tokio::sync::RwLock;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// What the binary prints to stdout
#[derive(Debug, Serialize)]
pub struct PreviewOutput {
    pub slots: Vec<SlotPreview>,
}

/// Initialize logging with environment-based configuration
pub fn init_logging() -> miette::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,reqwest=warn,redis=warn")),
        )
        // stdout carries the JSON result
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| Error::Other(format!("Failed to set up logging: {}", e)))?;

    Ok(())
}

/// Load and initialize the application config
pub async fn load_config() -> miette::Result<Arc<RwLock<Config>>> {
    match Config::load() {
        Ok(config) => Ok(Arc::new(RwLock::new(config))),
        Err(e) => {
            error!("Failed to load configuration: {:?}", e);
            Err(e.into())
        }
    }
}

/// Read a preview request from a file, or stdin when no path is given
pub async fn read_request(path: Option<&str>) -> SchedulerResult<PreviewRequest> {
    let raw = match path {
        Some(path) => {
            info!("Reading preview request from {}", path);
            tokio::fs::read_to_string(path).await?
        }
        None => {
            info!("Reading preview request from stdin");
            let mut buffer = String::new();
            tokio::io::stdin().read_to_string(&mut buffer).await?;
            buffer
        }
    };

    Ok(serde_json::from_str(&raw)?)
}

/// Run one preview through the bulk schedule component
pub async fn run_preview(
    config: Arc<RwLock<Config>>,
    request: PreviewRequest,
) -> SchedulerResult<PreviewOutput> {
    let mut component_manager = ComponentManager::new(Arc::clone(&config));
    component_manager.register(BulkSchedule::new());
    if let Err(e) = component_manager.init_all().await {
        component_manager.shutdown_all().await?;
        return Err(e);
    }

    let handle = match component_manager.get_component::<BulkSchedule>("bulk_schedule") {
        Some(component) => component.get_handle().await,
        None => None,
    };

    let result = match handle {
        Some(handle) => handle.preview(request).await,
        None => Err(component_error("Bulk schedule component is not running")),
    };

    component_manager.shutdown_all().await?;

    let slots = result?;
    info!(
        "Previewed {} slots, {} already full",
        slots.len(),
        slots.iter().filter(|s| s.is_full).count()
    );

    Ok(PreviewOutput { slots })
}
