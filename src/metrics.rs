use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

/// Install the global Prometheus recorder
///
/// Fails if a recorder is already installed (only one per process).
pub fn init_metrics() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    init_metric_descriptions();

    Ok(handle)
}

/// Initialize metric descriptions (can be called multiple times safely)
fn init_metric_descriptions() {
    describe_counter!(
        "insurance_predictions_total",
        "Prediction form submissions by outcome"
    );
    describe_counter!(
        "insurance_validation_failures_total",
        "Rejected prediction form submissions by reason"
    );
    describe_histogram!(
        "insurance_inference_duration_seconds",
        "Time spent scaling features and evaluating the model"
    );
    describe_counter!(
        "insurance_bmi_calculations_total",
        "BMI calculator submissions by outcome"
    );
    describe_gauge!(
        "insurance_predictor_info",
        "Service version"
    );
    describe_gauge!(
        "insurance_predictor_model_trees",
        "Number of trees in the loaded model"
    );

    gauge!("insurance_predictor_info", "version" => env!("CARGO_PKG_VERSION")).set(1.0);
}

/// Record the size of the loaded model
pub fn record_model_info(n_trees: usize) {
    gauge!(
        "insurance_predictor_model_trees",
        "version" => env!("CARGO_PKG_VERSION"),
    )
    .set(n_trees as f64);
}

/// Record a prediction submission (`success`, `invalid` or `error`)
pub fn record_prediction(outcome: &str) {
    counter!(
        "insurance_predictions_total",
        "outcome" => outcome.to_string(),
    )
    .increment(1);
}

/// Record why a submission was rejected
pub fn record_validation_failure(reason: &'static str) {
    counter!(
        "insurance_validation_failures_total",
        "reason" => reason,
    )
    .increment(1);
}

pub fn record_inference_duration(duration: Duration) {
    histogram!("insurance_inference_duration_seconds").record(duration.as_secs_f64());
}

pub fn record_bmi_calculation(outcome: &'static str) {
    counter!(
        "insurance_bmi_calculations_total",
        "outcome" => outcome,
    )
    .increment(1);
}
