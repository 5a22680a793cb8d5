//! Risk labels and assessment results.
//!
//! Represents the output of the diabetes classifier and the message shown
//! to the user.

use serde::{Deserialize, Serialize};

use super::assessment::FeatureVector;

/// Binary classifier output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLabel {
    /// Label 0: not likely to have diabetes
    Low,
    /// Label 1: likely to have diabetes
    Elevated,
}

impl RiskLabel {
    /// Map a raw model label. Anything other than 1 is low risk.
    #[must_use]
    pub fn from_label(label: u8) -> Self {
        if label == 1 {
            Self::Elevated
        } else {
            Self::Low
        }
    }

    /// Raw model label (0 or 1).
    #[must_use]
    pub fn label(&self) -> u8 {
        match self {
            Self::Low => 0,
            Self::Elevated => 1,
        }
    }

    /// Result sentence shown under the greeting.
    #[must_use]
    pub fn message(&self) -> &'static str {
        match self {
            Self::Low => "Based on the input, you are not likely to have diabetes.",
            Self::Elevated => "Based on the input, you are likely to have diabetes.",
        }
    }

    /// Get the associated color for TUI display (RGB).
    #[must_use]
    pub fn color(&self) -> (u8, u8, u8) {
        match self {
            Self::Low => (16, 185, 129),     // Emerald (#10B981)
            Self::Elevated => (244, 63, 94), // Rose (#F43F5E)
        }
    }
}

impl std::fmt::Display for RiskLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "LOW RISK"),
            Self::Elevated => write!(f, "ELEVATED RISK"),
        }
    }
}

/// Outcome of one successful submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    /// Trimmed name used to personalize the message
    pub name: String,

    /// Vector the classifier was called with
    pub features: FeatureVector,

    pub label: RiskLabel,

    pub assessed_at: chrono::DateTime<chrono::Utc>,
}

impl Assessment {
    #[must_use]
    pub fn new(name: impl Into<String>, features: FeatureVector, label: RiskLabel) -> Self {
        Self {
            name: name.into(),
            features,
            label,
            assessed_at: chrono::Utc::now(),
        }
    }

    /// Personalized heading, e.g. `Hi Alex, here is your result:`.
    #[must_use]
    pub fn greeting(&self) -> String {
        format!("Hi {}, here is your result:", self.name)
    }

    #[must_use]
    pub fn message(&self) -> &'static str {
        self.label.message()
    }

    #[must_use]
    pub fn bmi(&self) -> f64 {
        self.features.bmi()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn features() -> FeatureVector {
        FeatureVector([0.0, 100.0, 80.0, 20.0, 80.0, 22.5, 0.5, 30.0])
    }

    #[test]
    fn test_label_mapping() {
        assert_eq!(RiskLabel::from_label(1), RiskLabel::Elevated);
        assert_eq!(RiskLabel::from_label(0), RiskLabel::Low);
        assert_eq!(RiskLabel::Elevated.label(), 1);
        assert_eq!(RiskLabel::Low.label(), 0);
    }

    #[test]
    fn test_messages_are_distinct() {
        assert_ne!(RiskLabel::Low.message(), RiskLabel::Elevated.message());
        assert!(RiskLabel::Elevated.message().contains("likely to have diabetes"));
        assert!(RiskLabel::Low.message().contains("not likely"));
    }

    #[test]
    fn test_assessment_greeting() {
        let assessment = Assessment::new("Alex", features(), RiskLabel::Low);

        assert_eq!(assessment.greeting(), "Hi Alex, here is your result:");
        assert_eq!(assessment.message(), RiskLabel::Low.message());
        assert!((assessment.bmi() - 22.5).abs() < f64::EPSILON);
    }
}
