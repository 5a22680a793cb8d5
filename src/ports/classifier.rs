//! Classifier port: Trait for the pre-trained diabetes model.
//!
//! This trait abstracts the model artifact format from the application logic.

use crate::domain::{FeatureVector, RiskLabel};

/// Trait for binary risk classifiers.
///
/// Implementations must be pure and deterministic: the same vector always
/// yields the same label. Shape mismatches are rejected when the artifact is
/// loaded, so prediction itself cannot fail.
pub trait RiskClassifier: Send + Sync {
    /// Classify one feature vector (see `FEATURE_ORDER` for element order).
    fn predict(&self, features: &FeatureVector) -> RiskLabel;

    /// Short description for logs.
    fn describe(&self) -> String {
        std::any::type_name::<Self>().to_string()
    }
}
