use bulk_scheduler::error::Error;
use bulk_scheduler::startup;
use tracing::info;

#[tokio::main]
async fn main() -> miette::Result<()> {
    // Initialize logging
    startup::init_logging()?;

    info!("Starting bulk scheduler");

    // Load configuration
    let config = startup::load_config().await?;

    // Request file path, stdin when absent
    let path = std::env::args().nth(1);
    let request = startup::read_request(path.as_deref()).await?;

    let output = startup::run_preview(config, request).await?;

    let json = serde_json::to_string_pretty(&output).map_err(Error::from)?;
    println!("{}", json);

    Ok(())
}
