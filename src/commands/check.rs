use anyhow::{Context, Result};
use colored::Colorize;
use insurance_predictor::{
    artifacts::load_artifacts,
    config::Config,
    features::{PredictionRequest, Region, Sex, Smoker},
    predictor::Predictor,
};
use tracing::info;

/// Execute the check command
///
/// Loads the configured artifacts and scores one reference request, without
/// starting the server.
pub fn execute(cfg: &Config) -> Result<()> {
    println!("{}", "Checking configuration and artifacts...".yellow());

    let artifacts = load_artifacts(&cfg.artifacts).context("Artifact check failed")?;
    let n_trees = artifacts.model.n_trees();
    let max_depth = artifacts.model.max_depth();

    let predictor = Predictor::from_artifacts(artifacts);
    let prediction = predictor
        .predict(&reference_request())
        .context("Smoke prediction failed")?;

    println!("{}", "✓ Check successful".green());
    println!();

    println!("{}", "Summary:".bold());
    println!("  {}: {}:{}", "Server".cyan(), cfg.server.host, cfg.server.port);
    println!("  {}: {}", "Log Level".cyan(), cfg.server.log_level);
    println!("  {}: {}", "Log Format".cyan(), cfg.server.log_format);
    println!("  {}: {}", "Scaler".cyan(), cfg.artifacts.scaler_path);
    println!(
        "  {}: {} ({} trees, max depth {})",
        "Model".cyan(),
        cfg.artifacts.model_path,
        n_trees,
        max_depth
    );
    println!("  {}: {:?}", "Category Policy".cyan(), cfg.prediction.category_policy);
    println!("  {}: {} ms", "Result Delay".cyan(), cfg.prediction.result_delay_ms);
    println!(
        "  {}: {}",
        "Metrics".cyan(),
        if cfg.metrics.enabled {
            format!("enabled at {}", cfg.metrics.endpoint).green()
        } else {
            "disabled".red()
        }
    );
    println!();
    println!("  {}: {}", "Smoke Prediction".cyan(), prediction);

    info!(cost = prediction.cost, "Artifact check completed successfully");
    Ok(())
}

/// 30-year-old male, BMI 25, non-smoker, Southeast, no children
fn reference_request() -> PredictionRequest {
    PredictionRequest {
        age: 30,
        sex: Sex::Male,
        bmi: 25.0,
        smoker: Smoker::No,
        region: Region::Southeast,
        children: 0,
    }
}
