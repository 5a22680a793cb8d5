//! Assessment request types and feature assembly.
//!
//! Feature order follows the Pima Indians diabetes dataset the model was
//! trained on.

use serde::{Deserialize, Serialize};

/// Insulin value sent to the model (not collected from the user).
pub const DEFAULT_INSULIN: f64 = 80.0;

/// Skin thickness value sent to the model (not collected from the user).
pub const DEFAULT_SKIN_THICKNESS: f64 = 20.0;

/// Diabetes pedigree value sent to the model (not collected from the user).
pub const DEFAULT_DIABETES_PEDIGREE: f64 = 0.5;

/// Number of features the classifier consumes.
pub const FEATURE_COUNT: usize = 8;

/// Feature names in the exact order the classifier expects them.
///
/// The model artifact is checked against this list when it is loaded.
pub const FEATURE_ORDER: [&str; FEATURE_COUNT] = [
    "pregnancies",
    "glucose",
    "blood_pressure",
    "skin_thickness",
    "insulin",
    "bmi",
    "diabetes_pedigree",
    "age",
];

/// Inclusive bounds of an input widget.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldBounds {
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub initial: f64,
}

impl FieldBounds {
    /// Clamp a value into the bounds.
    #[must_use]
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }
}

pub const PREGNANCIES_BOUNDS: FieldBounds = FieldBounds { min: 0.0, max: 20.0, step: 1.0, initial: 0.0 };
pub const AGE_BOUNDS: FieldBounds = FieldBounds { min: 1.0, max: 120.0, step: 1.0, initial: 1.0 };
pub const GLUCOSE_BOUNDS: FieldBounds = FieldBounds { min: 0.0, max: 200.0, step: 1.0, initial: 120.0 };
pub const BLOOD_PRESSURE_BOUNDS: FieldBounds = FieldBounds { min: 40.0, max: 200.0, step: 1.0, initial: 80.0 };
pub const HEIGHT_BOUNDS: FieldBounds = FieldBounds { min: 0.5, max: 2.5, step: 0.01, initial: 0.5 };
pub const WEIGHT_BOUNDS: FieldBounds = FieldBounds { min: 10.0, max: 300.0, step: 0.1, initial: 10.0 };

/// Self-reported gender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Gender {
    #[default]
    Female,
    Male,
}

impl Gender {
    /// The other option of the two-way select.
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Female => Self::Male,
            Self::Male => Self::Female,
        }
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Female => write!(f, "Female"),
            Self::Male => write!(f, "Male"),
        }
    }
}

/// Visibility and fallback value of the pregnancies input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PregnancyField {
    pub visible: bool,
    pub default_value: u32,
}

/// Decide whether the pregnancies input is shown for a gender.
///
/// When hidden, `default_value` is what the model receives.
#[must_use]
pub fn pregnancy_field(gender: Gender) -> PregnancyField {
    match gender {
        Gender::Female => PregnancyField {
            visible: true,
            default_value: 0,
        },
        Gender::Male => PregnancyField {
            visible: false,
            default_value: 0,
        },
    }
}

/// Input validation failures. Shown to the user as warnings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please enter your name before submitting.")]
    EmptyName,

    #[error("Height cannot be zero.")]
    InvalidHeight,
}

/// One submission of the assessment form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentRequest {
    pub name: String,
    pub gender: Gender,
    pub pregnancies: u32,
    pub age: u32,
    /// Plasma glucose in mg/dL
    pub glucose: u32,
    /// Systolic blood pressure in mmHg
    pub blood_pressure: u32,
    /// Height in meters
    pub height: f64,
    /// Weight in kilograms
    pub weight: f64,
}

impl AssessmentRequest {
    /// Check the request in order; the first failure wins.
    ///
    /// # Errors
    /// `EmptyName` when the trimmed name is empty, then `InvalidHeight` when
    /// the height is zero or not a finite number.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if self.height == 0.0 || !self.height.is_finite() {
            return Err(ValidationError::InvalidHeight);
        }
        Ok(())
    }

    /// Pregnancy count sent to the model. Always 0 unless the input is visible.
    #[must_use]
    pub fn effective_pregnancies(&self) -> u32 {
        let field = pregnancy_field(self.gender);
        if field.visible {
            self.pregnancies
        } else {
            field.default_value
        }
    }

    /// Body mass index, `weight / height²`. Call only after `validate()`.
    #[must_use]
    pub fn bmi(&self) -> f64 {
        self.weight / (self.height * self.height)
    }

    /// Validate and assemble the classifier input.
    ///
    /// # Errors
    /// Returns the first validation failure; nothing is computed in that case.
    pub fn to_features(&self) -> Result<FeatureVector, ValidationError> {
        self.validate()?;

        Ok(FeatureVector([
            f64::from(self.effective_pregnancies()),
            f64::from(self.glucose),
            f64::from(self.blood_pressure),
            DEFAULT_SKIN_THICKNESS,
            DEFAULT_INSULIN,
            self.bmi(),
            DEFAULT_DIABETES_PEDIGREE,
            f64::from(self.age),
        ]))
    }
}

/// Classifier input. Element `i` is the feature named `FEATURE_ORDER[i]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector(pub [f64; FEATURE_COUNT]);

impl FeatureVector {
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Look up a feature by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<f64> {
        FEATURE_ORDER
            .iter()
            .position(|n| *n == name)
            .map(|i| self.0[i])
    }

    #[must_use]
    pub fn bmi(&self) -> f64 {
        self.0[5]
    }

    /// Iterate `(name, value)` pairs in model order.
    pub fn named(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        FEATURE_ORDER.iter().copied().zip(self.0.iter().copied())
    }
}
