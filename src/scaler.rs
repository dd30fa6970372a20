use serde::{Deserialize, Serialize};

use crate::predictor::{FeatureScaler, InferenceError};

/// Pre-fitted standardization transform
///
/// Each feature is centred on `mean` and divided by `scale`. A zero scale
/// (constant feature at fit time) leaves the centred value untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    #[serde(default)]
    pub feature_names: Vec<String>,
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    pub fn new(mean: Vec<f64>, scale: Vec<f64>) -> Self {
        Self {
            feature_names: Vec::new(),
            mean,
            scale,
        }
    }
}

impl FeatureScaler for StandardScaler {
    fn n_features(&self) -> usize {
        self.mean.len()
    }

    fn transform(&self, x: &[f64]) -> Result<Vec<f64>, InferenceError> {
        if x.len() != self.mean.len() {
            return Err(InferenceError::DimensionMismatch {
                stage: "scaler",
                expected: self.mean.len(),
                actual: x.len(),
            });
        }

        Ok(x
            .iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(&value, (&mean, &scale))| {
                let centred = value - mean;
                if scale > 0.0 {
                    centred / scale
                } else {
                    centred
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_standardizes_each_feature() {
        let scaler = StandardScaler::new(vec![10.0, 0.5], vec![2.0, 0.5]);
        let scaled = scaler.transform(&[14.0, 0.0]).unwrap();
        assert_eq!(scaled, vec![2.0, -1.0]);
    }

    #[test]
    fn test_zero_scale_only_centres() {
        let scaler = StandardScaler::new(vec![3.0], vec![0.0]);
        assert_eq!(scaler.transform(&[5.0]).unwrap(), vec![2.0]);
    }

    #[test]
    fn test_dimension_mismatch() {
        let scaler = StandardScaler::new(vec![0.0, 0.0], vec![1.0, 1.0]);
        let err = scaler.transform(&[1.0, 2.0, 3.0]).unwrap_err();
        assert!(matches!(
            err,
            InferenceError::DimensionMismatch { expected: 2, actual: 3, .. }
        ));
    }

    #[test]
    fn test_deserialize_without_feature_names() {
        let scaler: StandardScaler =
            serde_json::from_str(r#"{"mean": [1.0], "scale": [2.0]}"#).unwrap();
        assert!(scaler.feature_names.is_empty());
        assert_eq!(scaler.n_features(), 1);
    }
}
