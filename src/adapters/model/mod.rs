//! Logistic model adapter: Implementation of `RiskClassifier` over a JSON
//! model artifact.
//!
//! The artifact is a logistic regression exported from the training pipeline
//! as plain JSON:
//!
//! ```json
//! {
//!   "format_version": 1,
//!   "feature_names": ["pregnancies", "glucose", "..."],
//!   "coefficients": [0.12, 0.035, "..."],
//!   "intercept": -8.4,
//!   "scaler_mean": null,
//!   "scaler_scale": null,
//!   "threshold": 0.5
//! }
//! ```
//!
//! # Shape check
//!
//! `feature_names` must match `FEATURE_ORDER` exactly, element by element.
//! A model trained on a different feature count or order is rejected at load
//! time instead of silently producing wrong labels.
//!
//! # Integrity
//!
//! If a `manifest.json` sits next to the model file, the model's SHA-256
//! digest must match the entry recorded there. `write_manifest` produces it.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::domain::{FeatureVector, RiskLabel, FEATURE_COUNT, FEATURE_ORDER};
use crate::ports::RiskClassifier;

/// File name looked up when the model path is a directory.
pub const MODEL_FILE_NAME: &str = "diabetes_model.json";

/// Manifest file name, next to the model file.
pub const MANIFEST_FILE_NAME: &str = "manifest.json";

/// Artifact format understood by this loader.
pub const SUPPORTED_FORMAT_VERSION: u32 = 1;

/// Errors raised while loading a model artifact.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid model format: {0}")]
    Format(#[from] serde_json::Error),

    #[error("Unsupported model format version {got} (expected {expected})")]
    UnsupportedVersion { got: u32, expected: u32 },

    #[error("Model expects {got} features, form provides {expected}")]
    FeatureCount { expected: usize, got: usize },

    #[error("Feature {position} is {got:?}, expected {expected:?}")]
    FeatureOrder {
        position: usize,
        expected: &'static str,
        got: String,
    },

    #[error("Parameter {name} has {got} entries, expected {expected}")]
    ParameterLength {
        name: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("Invalid model parameter: {0}")]
    InvalidParameter(String),

    #[error("Model integrity check failed: {0}")]
    Integrity(String),

    #[error("No manifest.json found next to {0:?}")]
    ManifestMissing(PathBuf),
}

/// Model parameters exported by the training pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportedLogisticModel {
    pub format_version: u32,
    pub feature_names: Vec<String>,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    #[serde(default)]
    pub scaler_mean: Option<Vec<f64>>,
    #[serde(default)]
    pub scaler_scale: Option<Vec<f64>>,
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

fn default_threshold() -> f64 {
    0.5
}

/// File digests bound to a model directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelManifest {
    pub version: u32,
    #[serde(default)]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub files: BTreeMap<String, String>,
}

impl ModelManifest {
    /// Hash every `*.json` artifact in `dir` except the manifest itself.
    ///
    /// # Errors
    /// Returns error if the directory or a file cannot be read, or if no
    /// artifact is found.
    pub fn for_directory(dir: &Path) -> Result<Self, ModelError> {
        let entries = std::fs::read_dir(dir).map_err(|source| ModelError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut files = BTreeMap::new();
        for entry in entries {
            let path = entry
                .map_err(|source| ModelError::Io {
                    path: dir.to_path_buf(),
                    source,
                })?
                .path();

            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if !path.is_file() || !name.ends_with(".json") || name == MANIFEST_FILE_NAME {
                continue;
            }
            files.insert(name.to_string(), sha256_hex(&read_file(&path)?));
        }

        if files.is_empty() {
            return Err(ModelError::Integrity(format!(
                "no model JSON found in {}",
                dir.display()
            )));
        }

        Ok(Self {
            version: 1,
            created_at: Some(chrono::Utc::now()),
            files,
        })
    }

    /// Write `manifest.json` into `dir`, returning its path.
    ///
    /// # Errors
    /// Returns error if the manifest cannot be serialized or written.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf, ModelError> {
        let path = dir.join(MANIFEST_FILE_NAME);
        let bytes = serde_json::to_vec_pretty(self)?;
        std::fs::write(&path, bytes).map_err(|source| ModelError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}

/// Hex-encoded SHA-256 of a byte slice.
#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

// Constant-time compare for ASCII strings (used for SHA-256 hex digests).
fn constant_time_eq_str(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff: u8 = 0;
    for (x, y) in a.as_bytes().iter().zip(b.as_bytes().iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

fn read_file(path: &Path) -> Result<Vec<u8>, ModelError> {
    std::fs::read(path).map_err(|source| ModelError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Options controlling how strictly an artifact is loaded.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoadOptions {
    /// Fail when no manifest is present.
    pub require_manifest: bool,
}

/// Logistic regression classifier loaded from a JSON artifact.
///
/// Read-only after load; share it with `Arc`.
#[derive(Debug, Clone)]
pub struct LogisticModel {
    coefficients: [f64; FEATURE_COUNT],
    intercept: f64,
    mean: [f64; FEATURE_COUNT],
    scale: [f64; FEATURE_COUNT],
    threshold: f64,
    source: Option<PathBuf>,
}

impl LogisticModel {
    /// Load a model from a directory (containing `diabetes_model.json`) or a file.
    ///
    /// # Errors
    /// Returns error if the file is unreadable, malformed, fails its manifest
    /// check, or does not match the expected feature order.
    pub fn load(path: &Path, options: LoadOptions) -> Result<Self, ModelError> {
        let model_path = if path.is_dir() {
            path.join(MODEL_FILE_NAME)
        } else {
            path.to_path_buf()
        };

        let bytes = read_file(&model_path)?;
        Self::verify_manifest(&model_path, &bytes, options)?;

        let exported: ExportedLogisticModel = serde_json::from_slice(&bytes)?;
        let mut model = Self::from_exported(exported)?;
        model.source = Some(model_path.clone());

        tracing::info!(
            path = ?model_path,
            threshold = model.threshold,
            n_features = FEATURE_COUNT,
            "Loaded diabetes model"
        );

        Ok(model)
    }

    /// Check the manifest next to `model_path`, if any.
    fn verify_manifest(
        model_path: &Path,
        bytes: &[u8],
        options: LoadOptions,
    ) -> Result<(), ModelError> {
        let dir = model_path.parent().unwrap_or_else(|| Path::new("."));
        let manifest_path = dir.join(MANIFEST_FILE_NAME);

        if !manifest_path.exists() {
            if options.require_manifest {
                return Err(ModelError::ManifestMissing(model_path.to_path_buf()));
            }
            tracing::warn!(
                path = ?model_path,
                "No model manifest found; loading without integrity check"
            );
            return Ok(());
        }

        let manifest: ModelManifest = serde_json::from_slice(&read_file(&manifest_path)?)?;

        let file_name = model_path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| ModelError::Integrity("model path has no file name".into()))?;

        let expected = manifest.files.get(file_name).ok_or_else(|| {
            ModelError::Integrity(format!("{file_name} is not listed in the manifest"))
        })?;

        let actual = sha256_hex(bytes);
        if !constant_time_eq_str(&actual, &expected.trim().to_ascii_lowercase()) {
            return Err(ModelError::Integrity(format!(
                "SHA-256 mismatch for {file_name}"
            )));
        }

        tracing::debug!(file = file_name, "Model digest matches manifest");
        Ok(())
    }

    /// Build a classifier from exported parameters, checking their shape.
    ///
    /// # Errors
    /// Returns error on version, feature-name, length or value mismatches.
    pub fn from_exported(model: ExportedLogisticModel) -> Result<Self, ModelError> {
        if model.format_version != SUPPORTED_FORMAT_VERSION {
            return Err(ModelError::UnsupportedVersion {
                got: model.format_version,
                expected: SUPPORTED_FORMAT_VERSION,
            });
        }

        if model.feature_names.len() != FEATURE_COUNT {
            return Err(ModelError::FeatureCount {
                expected: FEATURE_COUNT,
                got: model.feature_names.len(),
            });
        }
        for (position, (got, expected)) in model
            .feature_names
            .iter()
            .zip(FEATURE_ORDER.iter())
            .enumerate()
        {
            if got.as_str() != *expected {
                return Err(ModelError::FeatureOrder {
                    position,
                    expected: *expected,
                    got: got.clone(),
                });
            }
        }

        let coefficients = fixed_len("coefficients", &model.coefficients)?;
        let mean = match &model.scaler_mean {
            Some(v) => fixed_len("scaler_mean", v)?,
            None => [0.0; FEATURE_COUNT],
        };
        let scale = match &model.scaler_scale {
            Some(v) => fixed_len("scaler_scale", v)?,
            None => [1.0; FEATURE_COUNT],
        };

        let all_finite = coefficients
            .iter()
            .chain(mean.iter())
            .chain(scale.iter())
            .chain(std::iter::once(&model.intercept))
            .all(|v| v.is_finite());
        if !all_finite {
            return Err(ModelError::InvalidParameter(
                "parameters must be finite numbers".into(),
            ));
        }
        if let Some(i) = scale.iter().position(|s| *s == 0.0) {
            return Err(ModelError::InvalidParameter(format!(
                "scaler_scale for {} is zero",
                FEATURE_ORDER[i]
            )));
        }
        if !(model.threshold > 0.0 && model.threshold < 1.0) {
            return Err(ModelError::InvalidParameter(format!(
                "threshold {} must be in (0, 1)",
                model.threshold
            )));
        }

        Ok(Self {
            coefficients,
            intercept: model.intercept,
            mean,
            scale,
            threshold: model.threshold,
            source: None,
        })
    }

    /// Probability of the elevated-risk class.
    #[must_use]
    pub fn probability(&self, features: &FeatureVector) -> f64 {
        let z = features
            .as_slice()
            .iter()
            .zip(self.coefficients.iter())
            .zip(self.mean.iter().zip(self.scale.iter()))
            .fold(self.intercept, |acc, ((x, w), (m, s))| acc + w * (x - m) / s);
        sigmoid(z)
    }

    #[must_use]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }
}

fn fixed_len(name: &'static str, values: &[f64]) -> Result<[f64; FEATURE_COUNT], ModelError> {
    values.try_into().map_err(|_| ModelError::ParameterLength {
        name,
        expected: FEATURE_COUNT,
        got: values.len(),
    })
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

impl RiskClassifier for LogisticModel {
    fn predict(&self, features: &FeatureVector) -> RiskLabel {
        if self.probability(features) >= self.threshold {
            RiskLabel::Elevated
        } else {
            RiskLabel::Low
        }
    }

    fn describe(&self) -> String {
        match &self.source {
            Some(path) => format!("logistic model {}", path.display()),
            None => "logistic model (in memory)".to_string(),
        }
    }
}

#[cfg(test)]
mod tests;
