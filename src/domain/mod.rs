//! Domain layer: Core business types and logic.
//!
//! This module contains pure Rust types with no I/O.
//! All types are serializable and implement strict validation.

mod assessment;
mod risk;

pub use assessment::{
    pregnancy_field, AssessmentRequest, FeatureVector, FieldBounds, Gender, PregnancyField,
    ValidationError, AGE_BOUNDS, BLOOD_PRESSURE_BOUNDS, DEFAULT_DIABETES_PEDIGREE,
    DEFAULT_INSULIN, DEFAULT_SKIN_THICKNESS, FEATURE_COUNT, FEATURE_ORDER, GLUCOSE_BOUNDS,
    HEIGHT_BOUNDS, PREGNANCIES_BOUNDS, WEIGHT_BOUNDS,
};
pub use risk::{Assessment, RiskLabel};
