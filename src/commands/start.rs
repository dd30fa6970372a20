use anyhow::Result;
use colored::Colorize;
use insurance_predictor::{config::Config, server};
use tracing::info;

/// Execute the start command
///
/// Artifacts are loaded inside `start_server`; a missing or broken artifact
/// aborts startup with a non-zero exit.
pub async fn execute(cfg: Config) -> Result<()> {
    println!("{}", "Starting insurance cost predictor...".green());
    info!(
        scaler = %cfg.artifacts.scaler_path,
        model = %cfg.artifacts.model_path,
        "Loading artifacts"
    );

    // Blocks until shutdown
    server::start_server(cfg).await?;

    Ok(())
}
