//! Error handling for the svcgen code generation library.
//!
//! This module defines the main error type `Error` used throughout the library,
//! along with a convenient `Result` type alias. Generation failures carry the
//! operation, shape or path that caused them so a failing run can be diagnosed
//! from the error alone.
//!
//! # Examples
//!
//! ```
//! use svcgen_core::error::{Error, Result};
//!
//! fn might_fail() -> Result<()> {
//!     Err(Error::config("no artifact kinds requested"))
//! }
//!
//! assert!(might_fail().is_err());
//! ```

use std::path::PathBuf;

use thiserror::Error;

/// Result type for svcgen generation operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for svcgen generation operations
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Template engine error
    #[error("Template engine error: {0}")]
    Tera(#[from] tera::Error),

    /// Formatting into an artifact buffer failed
    #[error("Formatting error: {0}")]
    Fmt(#[from] std::fmt::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// The service model could not be loaded
    #[error("Model error: {0}")]
    Model(String),

    /// An operation references a shape the model does not define
    #[error("Operation '{operation}' references unknown shape '{shape}'")]
    ModelResolution { operation: String, shape: String },

    /// Two structurally different definitions would be emitted under one name
    #[error(
        "Naming collision on '{name}': operation '{operation}' would redefine the symbol already emitted for '{existing_operation}'"
    )]
    NamingCollision {
        name: String,
        existing_operation: String,
        operation: String,
    },

    /// An artifact could not be persisted
    #[error("Failed to persist {}: {source}", .path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Several independent failures, reported together
    #[error("{} artifacts failed: {}", .0.len(), join_errors(.0))]
    Multiple(Vec<Error>),
}

impl Error {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new model error
    pub fn model<S: Into<String>>(msg: S) -> Self {
        Self::Model(msg.into())
    }

    /// Collapse a list of failures into a single error, if there are any.
    pub fn from_failures(mut failures: Vec<Error>) -> Option<Self> {
        match failures.len() {
            0 => None,
            1 => failures.pop(),
            _ => Some(Self::Multiple(failures)),
        }
    }
}

fn join_errors(errors: &[Error]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
