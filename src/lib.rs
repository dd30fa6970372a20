pub mod artifacts;
pub mod bmi;
pub mod config;
pub mod error;
pub mod features;
pub mod forest;
pub mod form;
pub mod handlers;
pub mod metrics;
pub mod predictor;
pub mod scaler;
pub mod server;
pub mod signals;
pub mod views;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize tracing/logging
///
/// `RUST_LOG` wins over the configured level. `format` is `pretty` or `json`.
pub fn init_tracing(default_level: &str, format: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    let registry = tracing_subscriber::registry().with(filter);

    if format == "json" {
        registry.with(fmt::layer().json().with_target(true)).init();
    } else {
        registry.with(fmt::layer().with_target(true)).init();
    }
}
