//! Assessment service: Orchestrates one risk assessment.
//!
//! This service coordinates:
//! - Input validation
//! - Feature assembly (derived BMI, fixed feature order)
//! - Classifier invocation
//! - Mapping the label to the personalized message

use std::sync::Arc;

use crate::domain::{Assessment, AssessmentRequest, ValidationError};
use crate::ports::RiskClassifier;

/// Service for running diabetes risk assessments.
///
/// The classifier is injected and shared read-only; the service holds no
/// other state, so any number of sequential assessments can run against it.
pub struct AssessmentService<C>
where
    C: RiskClassifier,
{
    classifier: Arc<C>,
}

impl<C> Clone for AssessmentService<C>
where
    C: RiskClassifier,
{
    fn clone(&self) -> Self {
        Self {
            classifier: Arc::clone(&self.classifier),
        }
    }
}

impl<C> AssessmentService<C>
where
    C: RiskClassifier,
{
    /// Create a new assessment service.
    pub fn new(classifier: Arc<C>) -> Self {
        tracing::info!(classifier = %classifier.describe(), "Assessment service ready");
        Self { classifier }
    }

    /// Assess one request.
    ///
    /// Performs the full pipeline:
    /// 1. Validate (empty name, then zero height)
    /// 2. Compute BMI and assemble the feature vector
    /// 3. Call the classifier once
    /// 4. Build the personalized result
    ///
    /// # Errors
    /// Returns the first validation failure. The classifier is not called in
    /// that case.
    pub fn assess_risk(&self, request: &AssessmentRequest) -> Result<Assessment, ValidationError> {
        tracing::debug!("Step 1-2: Validating input and assembling features...");
        let features = match request.to_features() {
            Ok(features) => features,
            Err(e) => {
                tracing::warn!(reason = ?e, "Assessment rejected");
                return Err(e);
            }
        };

        tracing::debug!("Step 3: Invoking classifier...");
        let label = self.classifier.predict(&features);

        let assessment = Assessment::new(request.name.trim(), features, label);

        tracing::info!(
            label = label.label(),
            bmi = %format!("{:.2}", assessment.bmi()),
            "Assessment complete"
        );

        Ok(assessment)
    }
}
