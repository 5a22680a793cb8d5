//! TUI module: Terminal User Interface using Ratatui.
//!
//! A single page holding the assessment form, the result panel and the
//! disclaimer.

mod app;
mod styles;
pub mod ui;

pub use app::App;
pub use styles::MedicalTheme;
