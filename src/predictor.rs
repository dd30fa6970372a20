//! Prediction service: encode → scale → predict

use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

use crate::artifacts::Artifacts;
use crate::features::PredictionRequest;

/// Request-time inference failure
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InferenceError {
    #[error("{stage} expects {expected} features, got {actual}")]
    DimensionMismatch {
        stage: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("model has no trees")]
    EmptyModel,
    #[error("model produced a non-finite prediction: {0}")]
    NonFinite(f64),
}

/// Pre-fitted feature transform applied before the model
pub trait FeatureScaler: Send + Sync {
    fn n_features(&self) -> usize;

    fn transform(&self, x: &[f64]) -> Result<Vec<f64>, InferenceError>;
}

/// Pre-trained regression model mapping scaled features to a cost
pub trait CostModel: Send + Sync {
    fn n_features(&self) -> usize;

    fn predict(&self, x: &[f64]) -> Result<f64, InferenceError>;
}

/// Predicted medical insurance cost
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub cost: f64,
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Your predicted medical insurance cost is ${:.2}", self.cost)
    }
}

#[derive(Clone)]
pub struct Predictor {
    scaler: Arc<dyn FeatureScaler>,
    model: Arc<dyn CostModel>,
}

impl fmt::Debug for Predictor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Predictor")
            .field("scaler_features", &self.scaler.n_features())
            .field("model_features", &self.model.n_features())
            .finish()
    }
}

impl Predictor {
    pub fn new(scaler: Arc<dyn FeatureScaler>, model: Arc<dyn CostModel>) -> Self {
        Self { scaler, model }
    }

    pub fn from_artifacts(artifacts: Artifacts) -> Self {
        Self::new(Arc::new(artifacts.scaler), Arc::new(artifacts.model))
    }

    pub fn predict(&self, request: &PredictionRequest) -> Result<Prediction, InferenceError> {
        let started = Instant::now();
        let features = request.encode();
        let scaled = self.scaler.transform(features.as_slice())?;
        let cost = self.model.predict(&scaled)?;

        crate::metrics::record_inference_duration(started.elapsed());
        debug!(?features, ?scaled, cost, "Inference complete");

        Ok(Prediction { cost })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{Region, Sex, Smoker, N_FEATURES};
    use crate::forest::{RandomForestRegressor, RegressionTree, TreeNode};
    use crate::scaler::StandardScaler;

    struct Identity;

    impl FeatureScaler for Identity {
        fn n_features(&self) -> usize {
            N_FEATURES
        }

        fn transform(&self, x: &[f64]) -> Result<Vec<f64>, InferenceError> {
            Ok(x.to_vec())
        }
    }

    struct SumModel;

    impl CostModel for SumModel {
        fn n_features(&self) -> usize {
            N_FEATURES
        }

        fn predict(&self, x: &[f64]) -> Result<f64, InferenceError> {
            Ok(x.iter().sum())
        }
    }

    fn request() -> PredictionRequest {
        PredictionRequest {
            age: 30,
            sex: Sex::Male,
            bmi: 25.0,
            smoker: Smoker::No,
            region: Region::Southeast,
            children: 0,
        }
    }

    #[test]
    fn test_model_receives_encoded_vector() {
        let predictor = Predictor::new(Arc::new(Identity), Arc::new(SumModel));
        let prediction = predictor.predict(&request()).unwrap();
        // 30 + 1 + 25 + 0 + 3 + 0
        assert_eq!(prediction.cost, 59.0);
    }

    #[test]
    fn test_model_receives_scaled_vector() {
        let scaler = StandardScaler::new(vec![30.0, 1.0, 25.0, 0.0, 3.0, 0.0], vec![1.0; 6]);
        let model = RandomForestRegressor::new(
            N_FEATURES,
            vec![RegressionTree::new(TreeNode::split(
                0,
                0.0,
                TreeNode::leaf(1000.0),
                TreeNode::leaf(2000.0),
            ))],
        );
        let predictor = Predictor::new(Arc::new(scaler), Arc::new(model));

        // scaled age is exactly 0.0, so the sample goes left
        assert_eq!(predictor.predict(&request()).unwrap().cost, 1000.0);
    }

    #[test]
    fn test_scaler_errors_propagate() {
        let scaler = StandardScaler::new(vec![0.0; 3], vec![1.0; 3]);
        let predictor = Predictor::new(Arc::new(scaler), Arc::new(SumModel));
        assert!(matches!(
            predictor.predict(&request()),
            Err(InferenceError::DimensionMismatch { stage: "scaler", .. })
        ));
    }

    #[test]
    fn test_prediction_display_has_two_decimals() {
        assert_eq!(
            Prediction { cost: 4321.0 }.to_string(),
            "Your predicted medical insurance cost is $4321.00"
        );
        assert_eq!(
            Prediction { cost: 12345.6789 }.to_string(),
            "Your predicted medical insurance cost is $12345.68"
        );
    }
}
