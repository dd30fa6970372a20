//! Artifact loading
//!
//! The fitted scaler and the trained forest are exported to JSON by the
//! training pipeline and read once at startup. Anything wrong with them is a
//! startup error: the service never runs with a half-loaded model.

use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::ArtifactsConfig;
use crate::features::{FEATURE_NAMES, N_FEATURES};
use crate::forest::RandomForestRegressor;
use crate::scaler::StandardScaler;

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("failed to read artifact {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse artifact {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid artifact {}: {reason}", path.display())]
    Invalid { path: PathBuf, reason: String },
}

/// Both loaded artifacts, validated against each other
#[derive(Debug, Clone)]
pub struct Artifacts {
    pub scaler: StandardScaler,
    pub model: RandomForestRegressor,
}

pub fn load_artifacts(config: &ArtifactsConfig) -> Result<Artifacts, ArtifactError> {
    let scaler_path = Path::new(&config.scaler_path);
    let model_path = Path::new(&config.model_path);

    let scaler: StandardScaler = read_json(scaler_path)?;
    validate_scaler(&scaler).map_err(|reason| invalid(scaler_path, reason))?;
    info!(path = %scaler_path.display(), "Loaded feature scaler");

    let model: RandomForestRegressor = read_json(model_path)?;
    validate_model(&model).map_err(|reason| invalid(model_path, reason))?;
    info!(
        path = %model_path.display(),
        trees = model.n_trees(),
        max_depth = model.max_depth(),
        "Loaded regression model"
    );

    Ok(Artifacts { scaler, model })
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    let content = std::fs::read_to_string(path).map_err(|source| ArtifactError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&content).map_err(|source| ArtifactError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn invalid(path: &Path, reason: String) -> ArtifactError {
    ArtifactError::Invalid {
        path: path.to_path_buf(),
        reason,
    }
}

fn validate_scaler(scaler: &StandardScaler) -> Result<(), String> {
    if scaler.mean.len() != N_FEATURES || scaler.scale.len() != N_FEATURES {
        return Err(format!(
            "expected {} means and scales, found {} and {}",
            N_FEATURES,
            scaler.mean.len(),
            scaler.scale.len()
        ));
    }

    if !scaler.feature_names.is_empty() && scaler.feature_names != FEATURE_NAMES {
        return Err(format!(
            "feature order {:?} does not match {:?}",
            scaler.feature_names, FEATURE_NAMES
        ));
    }

    if scaler.mean.iter().chain(&scaler.scale).any(|v| !v.is_finite()) {
        return Err("means and scales must be finite".to_string());
    }

    if scaler.scale.iter().any(|&s| s < 0.0) {
        return Err("scales must not be negative".to_string());
    }

    Ok(())
}

fn validate_model(model: &RandomForestRegressor) -> Result<(), String> {
    if model.n_features != N_FEATURES {
        return Err(format!(
            "model expects {} features, encoder produces {}",
            model.n_features, N_FEATURES
        ));
    }

    if model.trees.is_empty() {
        return Err("model has no trees".to_string());
    }

    for (idx, tree) in model.trees.iter().enumerate() {
        if let Some(feature) = tree.root.max_feature() {
            if feature >= model.n_features {
                return Err(format!(
                    "tree {} splits on feature {} but the model has {} features",
                    idx, feature, model.n_features
                ));
            }
        }
        if !tree.root.is_finite() {
            return Err(format!("tree {} has a non-finite threshold or value", idx));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forest::{RegressionTree, TreeNode};
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    fn scaler_json() -> String {
        serde_json::json!({
            "feature_names": FEATURE_NAMES,
            "mean": [39.0, 0.5, 30.0, 0.2, 1.5, 1.0],
            "scale": [14.0, 0.5, 6.0, 0.4, 1.1, 1.2],
        })
        .to_string()
    }

    fn model(n_features: usize, feature: usize) -> RandomForestRegressor {
        RandomForestRegressor::new(
            n_features,
            vec![RegressionTree::new(TreeNode::split(
                feature,
                0.0,
                TreeNode::leaf(1.0),
                TreeNode::leaf(2.0),
            ))],
        )
    }

    fn config(scaler: &NamedTempFile, model: &NamedTempFile) -> ArtifactsConfig {
        ArtifactsConfig {
            scaler_path: scaler.path().display().to_string(),
            model_path: model.path().display().to_string(),
        }
    }

    #[test]
    fn test_load_valid_artifacts() {
        let scaler = write_temp(&scaler_json());
        let model = write_temp(&serde_json::to_string(&model(6, 3)).unwrap());

        let artifacts = load_artifacts(&config(&scaler, &model)).unwrap();
        assert_eq!(artifacts.model.n_trees(), 1);
        assert_eq!(artifacts.scaler.mean[0], 39.0);
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let scaler = write_temp(&scaler_json());
        let cfg = ArtifactsConfig {
            scaler_path: scaler.path().display().to_string(),
            model_path: "/nonexistent/insurance_model.json".to_string(),
        };

        assert!(matches!(load_artifacts(&cfg), Err(ArtifactError::Read { .. })));
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let scaler = write_temp("{ not json");
        let model = write_temp(&serde_json::to_string(&model(6, 0)).unwrap());

        assert!(matches!(
            load_artifacts(&config(&scaler, &model)),
            Err(ArtifactError::Parse { .. })
        ));
    }

    #[test]
    fn test_wrong_feature_count_is_invalid() {
        let scaler = write_temp(&scaler_json());
        let model = write_temp(&serde_json::to_string(&model(5, 0)).unwrap());

        let err = load_artifacts(&config(&scaler, &model)).unwrap_err();
        assert!(err.to_string().contains("model expects 5 features"));
    }

    #[test]
    fn test_split_feature_out_of_range_is_invalid() {
        let scaler = write_temp(&scaler_json());
        let model = write_temp(&serde_json::to_string(&model(6, 9)).unwrap());

        let err = load_artifacts(&config(&scaler, &model)).unwrap_err();
        assert!(err.to_string().contains("splits on feature 9"));
    }

    #[test]
    fn test_scaler_feature_order_is_checked() {
        let mean = vec![0.0_f64; 6];
        let scale = vec![1.0_f64; 6];
        let json = serde_json::json!({
            "feature_names": ["sex", "age", "bmi", "smoker", "region", "children"],
            "mean": mean,
            "scale": scale,
        });
        let scaler = write_temp(&json.to_string());
        let model = write_temp(&serde_json::to_string(&model(6, 0)).unwrap());

        let err = load_artifacts(&config(&scaler, &model)).unwrap_err();
        assert!(matches!(err, ArtifactError::Invalid { .. }));
        assert!(err.to_string().contains("feature order"));
    }

    #[test]
    fn test_empty_forest_is_invalid() {
        let scaler = write_temp(&scaler_json());
        let empty = RandomForestRegressor::new(6, vec![]);
        let model = write_temp(&serde_json::to_string(&empty).unwrap());

        let err = load_artifacts(&config(&scaler, &model)).unwrap_err();
        assert!(err.to_string().contains("no trees"));
    }
}
