use axum::{extract::State, response::Html, Form};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    bmi::BmiForm,
    config::{CategoryPolicy, PredictionConfig},
    error::AppError,
    form::PredictionForm,
    metrics,
    predictor::Predictor,
    views::{render_page, PageView, PredictionOutcome},
};

/// Size of the loaded model, reported by the readiness probe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelSummary {
    pub n_trees: usize,
    pub max_depth: usize,
}

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub predictor: Predictor,
    pub model: ModelSummary,
    pub prediction: Arc<PredictionConfig>,
}

impl AppState {
    fn category_policy(&self) -> CategoryPolicy {
        self.prediction.category_policy
    }

    fn result_delay(&self) -> Duration {
        Duration::from_millis(self.prediction.result_delay_ms)
    }
}

/// Handle `GET /`: the empty page
pub async fn index() -> Html<String> {
    Html(render_page(&PageView::default()))
}

/// Handle `POST /predict`
///
/// Invalid submissions re-render the form with a message and never reach the
/// predictor.
pub async fn handle_predict(
    State(state): State<AppState>,
    Form(form): Form<PredictionForm>,
) -> Result<Html<String>, AppError> {
    let request_id = Uuid::new_v4();

    let request = match form.validate(state.category_policy()) {
        Ok(request) => request,
        Err(err) => {
            warn!(
                request_id = %request_id,
                reason = err.reason(),
                "Prediction form rejected"
            );
            metrics::record_validation_failure(err.reason());
            metrics::record_prediction("invalid");

            return Ok(Html(render_page(&PageView {
                prediction_form: form,
                prediction: Some(PredictionOutcome::Invalid(err.to_string())),
                ..Default::default()
            })));
        }
    };

    let prediction = state.predictor.predict(&request).map_err(|err| {
        metrics::record_prediction("error");
        AppError::from(err)
    })?;

    info!(
        request_id = %request_id,
        age = request.age,
        region = %request.region,
        cost = prediction.cost,
        "Prediction computed"
    );

    let delay = state.result_delay();
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }

    metrics::record_prediction("success");

    Ok(Html(render_page(&PageView {
        prediction_form: form,
        prediction: Some(PredictionOutcome::Success(prediction)),
        ..Default::default()
    })))
}

/// Handle `POST /bmi`: the sidebar calculator
pub async fn handle_bmi(Form(form): Form<BmiForm>) -> Html<String> {
    let outcome = form.calculate();

    match &outcome {
        Ok(bmi) => {
            tracing::debug!(bmi = bmi.rounded(), "BMI calculated");
            metrics::record_bmi_calculation("ok");
        }
        Err(err) => {
            tracing::debug!(reason = err.reason(), "BMI calculator rejected input");
            metrics::record_bmi_calculation(err.reason());
        }
    }

    Html(render_page(&PageView {
        bmi_form: form,
        bmi: Some(outcome),
        ..Default::default()
    }))
}
