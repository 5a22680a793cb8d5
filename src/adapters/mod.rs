//! Adapters layer: Concrete implementations of ports.
//!
//! - `model`: JSON logistic-regression artifact implementing `RiskClassifier`
//! - `sanitize`: personal-data filtering for logs

pub mod model;
pub mod sanitize;

// Re-export model error for lib.rs
pub use model::ModelError;
