//! Error types for the sdkgen generation driver.

use std::path::PathBuf;
use thiserror::Error;

/// Unit-scoped pipeline errors.
///
/// Every variant is local to one unit: the scheduler catches it at the unit
/// boundary, reports it, and keeps going with the remaining units.
#[derive(Debug, Error)]
pub enum UnitError {
    #[error("No description files found for {unit} under {root}")]
    NotFound { unit: String, root: PathBuf },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("No service shape found in {0}")]
    Resolution(PathBuf),

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Build failed with {}", describe_status(.status))]
    Build { status: Option<i32> },

    #[error("Invalid unit id {0:?}: expected a single directory name")]
    InvalidUnit(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl UnitError {
    /// Wrap an I/O failure together with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        UnitError::Io {
            path: path.into(),
            source,
        }
    }

    /// Short stable label for the error kind, emitted as `error_kind` in
    /// completion records.
    pub fn kind(&self) -> &'static str {
        match self {
            UnitError::NotFound { .. } => "not_found",
            UnitError::Parse { .. } => "parse",
            UnitError::Resolution(_) => "resolution",
            UnitError::Io { .. } => "io",
            UnitError::Build { .. } => "build",
            UnitError::InvalidUnit(_) => "invalid_unit",
            UnitError::Unexpected(_) => "unexpected",
        }
    }
}

fn describe_status(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!("exit status {}", code),
        None => "no exit status (terminated by signal)".to_string(),
    }
}

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Load(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Logging setup failed: {0}")]
    Logging(String),
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::Load(err.to_string())
    }
}

/// Errors surfaced by CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Unit(#[from] UnitError),

    #[error("{0}")]
    Usage(String),
}
