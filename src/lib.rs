//! # Glucocheck
//!
//! Diabetes risk assessment form backed by a pre-trained binary classifier.
//!
//! This crate provides:
//! - Feature assembly for the classifier (derived BMI, fixed feature order)
//! - A JSON logistic-regression model adapter with shape and integrity checks
//! - Terminal UI for the single-page assessment form
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - `domain`: Core types (AssessmentRequest, FeatureVector, RiskLabel)
//! - `ports`: Trait definitions for external collaborators (the classifier)
//! - `adapters`: Concrete implementations (JSON model loader, log sanitizer)
//! - `application`: The assessment use case
//! - `config`: Environment-driven runtime configuration
//! - `tui`: Terminal user interface

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod tui;

pub use domain::{Assessment, AssessmentRequest, FeatureVector, Gender, RiskLabel, ValidationError};

/// Result type for Glucocheck operations
pub type Result<T> = std::result::Result<T, GlucocheckError>;

/// Main error type for Glucocheck
#[derive(Debug, thiserror::Error)]
pub enum GlucocheckError {
    #[error("Model artifact rejected: {0}")]
    Model(#[from] adapters::ModelError),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
