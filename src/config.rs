//! Runtime configuration from environment variables.
//!
//! | Variable | Default | Meaning |
//! |---|---|---|
//! | `GLUCOCHECK_MODEL_PATH` | `models` | model directory or JSON file |
//! | `GLUCOCHECK_LOG_MODE` | `auto` | `auto`, `file` or `stdout` |
//! | `GLUCOCHECK_LOG_FILE` | `glucocheck.log` | log file used in file mode |
//! | `GLUCOCHECK_REQUIRE_MODEL_MANIFEST` | `false` | refuse models without `manifest.json` |

use std::path::PathBuf;

use crate::GlucocheckError;

pub const MODEL_PATH_ENV: &str = "GLUCOCHECK_MODEL_PATH";
pub const LOG_MODE_ENV: &str = "GLUCOCHECK_LOG_MODE";
pub const LOG_FILE_ENV: &str = "GLUCOCHECK_LOG_FILE";
pub const REQUIRE_MANIFEST_ENV: &str = "GLUCOCHECK_REQUIRE_MODEL_MANIFEST";

/// Where log output goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogMode {
    /// File when stdout is a terminal (logs would corrupt the TUI), stdout otherwise
    #[default]
    Auto,
    File,
    Stdout,
}

impl LogMode {
    /// Resolve `Auto` against whether stdout is interactive.
    #[must_use]
    pub fn use_file(self, interactive: bool) -> bool {
        match self {
            Self::File => true,
            Self::Stdout => false,
            Self::Auto => interactive,
        }
    }
}

impl std::str::FromStr for LogMode {
    type Err = GlucocheckError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" | "" => Ok(Self::Auto),
            "file" => Ok(Self::File),
            "stdout" => Ok(Self::Stdout),
            other => Err(GlucocheckError::Config(format!(
                "{LOG_MODE_ENV} must be auto, file or stdout (got {other:?})"
            ))),
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub model_path: PathBuf,
    pub log_mode: LogMode,
    pub log_file: PathBuf,
    pub require_manifest: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("models"),
            log_mode: LogMode::Auto,
            log_file: PathBuf::from("glucocheck.log"),
            require_manifest: false,
        }
    }
}

fn parse_bool(value: &str) -> bool {
    matches!(value, "1" | "true" | "TRUE" | "yes" | "YES")
}

impl AppConfig {
    /// Read configuration from the process environment.
    ///
    /// # Errors
    /// Returns `GlucocheckError::Config` for an unknown log mode.
    pub fn from_env() -> crate::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through a lookup function (used by tests).
    ///
    /// # Errors
    /// Returns `GlucocheckError::Config` for an unknown log mode.
    pub fn from_lookup<F>(lookup: F) -> crate::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let log_mode = match lookup(LOG_MODE_ENV) {
            Some(v) => v.parse()?,
            None => defaults.log_mode,
        };

        Ok(Self {
            model_path: lookup(MODEL_PATH_ENV)
                .map(PathBuf::from)
                .unwrap_or(defaults.model_path),
            log_mode,
            log_file: lookup(LOG_FILE_ENV)
                .map(PathBuf::from)
                .unwrap_or(defaults.log_file),
            require_manifest: lookup(REQUIRE_MANIFEST_ENV)
                .map(|v| parse_bool(&v))
                .unwrap_or(defaults.require_manifest),
        })
    }
}
