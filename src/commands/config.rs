use anyhow::Result;
use colored::Colorize;
use insurance_predictor::config::Config;
use tracing::info;

/// Execute the config show command
///
/// Prints the effective configuration (file + environment + defaults) as TOML
pub fn show(cfg: &Config) -> Result<()> {
    println!("{}", "Effective Configuration:".green().bold());
    println!();

    println!("{}", render(cfg)?);

    info!("Configuration displayed successfully");
    Ok(())
}

fn render(cfg: &Config) -> Result<String> {
    Ok(toml::to_string_pretty(cfg)?)
}
