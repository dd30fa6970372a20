use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable prefix, e.g. `INSURANCE_PREDICTOR__SERVER__PORT=9000`
pub const ENV_PREFIX: &str = "INSURANCE_PREDICTOR";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub artifacts: ArtifactsConfig,
    #[serde(default)]
    pub prediction: PredictionConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// `pretty` or `json`
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

/// Locations of the pre-fitted scaler and the trained model
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ArtifactsConfig {
    #[serde(default = "default_scaler_path")]
    pub scaler_path: String,
    #[serde(default = "default_model_path")]
    pub model_path: String,
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            scaler_path: default_scaler_path(),
            model_path: default_model_path(),
        }
    }
}

/// How form values outside the known choices are treated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryPolicy {
    /// Reject with a validation message
    #[default]
    Strict,
    /// Fall back to Male / smoker / Southeast
    Lenient,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PredictionConfig {
    /// Pause before a successful result is shown
    #[serde(default = "default_result_delay_ms")]
    pub result_delay_ms: u64,
    #[serde(default)]
    pub category_policy: CategoryPolicy,
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            result_delay_ms: default_result_delay_ms(),
            category_policy: CategoryPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MetricsConfig {
    #[serde(default = "default_metrics_enabled")]
    pub enabled: bool,
    #[serde(default = "default_metrics_endpoint")]
    pub endpoint: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_metrics_enabled(),
            endpoint: default_metrics_endpoint(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8501
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_scaler_path() -> String {
    "artifacts/standardscaler.json".to_string()
}

fn default_model_path() -> String {
    "artifacts/insurance_model.json".to_string()
}

fn default_result_delay_ms() -> u64 {
    6000
}

fn default_metrics_enabled() -> bool {
    true
}

fn default_metrics_endpoint() -> String {
    "/metrics".to_string()
}

/// Routes owned by the page and probes; the metrics endpoint must not shadow them
const RESERVED_PATHS: [&str; 5] = ["/", "/predict", "/bmi", "/health", "/ready"];

/// Load configuration from an optional TOML file, overridden by environment
pub fn load_config(path: &Path) -> anyhow::Result<Config> {
    let config = config::Config::builder()
        .add_source(config::File::from(path).required(false))
        .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
        .build()?;

    let cfg: Config = config.try_deserialize()?;
    validate_config(&cfg)?;

    Ok(cfg)
}

fn validate_config(cfg: &Config) -> anyhow::Result<()> {
    if cfg.artifacts.scaler_path.trim().is_empty() {
        anyhow::bail!("artifacts.scaler_path cannot be empty");
    }

    if cfg.artifacts.model_path.trim().is_empty() {
        anyhow::bail!("artifacts.model_path cannot be empty");
    }

    match cfg.server.log_format.as_str() {
        "pretty" | "json" => {}
        other => anyhow::bail!("Invalid log format '{}', expected 'pretty' or 'json'", other),
    }

    if cfg.metrics.enabled {
        if !cfg.metrics.endpoint.starts_with('/') {
            anyhow::bail!("Metrics endpoint '{}' must start with '/'", cfg.metrics.endpoint);
        }
        if RESERVED_PATHS.contains(&cfg.metrics.endpoint.as_str()) {
            anyhow::bail!(
                "Metrics endpoint '{}' collides with an application route",
                cfg.metrics.endpoint
            );
        }
    }

    Ok(())
}
