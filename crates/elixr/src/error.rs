//! Error types for elixr.
//!
//! This module defines all error types used throughout the elixr crate,
//! providing enough context for a single-line message at the command line.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for elixr operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Input Errors ===
    /// A calculator or table input was rejected.
    #[error("invalid {field}: {message}")]
    InvalidInput {
        /// Name of the offending field.
        field: String,
        /// Description of what is wrong with it.
        message: String,
    },

    /// The nicotine or flavor volume does not fit in its base liquid share.
    #[error("not enough {base} for this mix: short by {shortfall_ml:.2} ml")]
    InsufficientBase {
        /// The base liquid that came up short ("VG" or "PG").
        base: &'static str,
        /// How many millilitres are missing.
        shortfall_ml: f64,
    },

    // === Recipe Store Errors ===
    /// No recipe with this name exists in the store.
    #[error("recipe '{name}' not found")]
    RecipeNotFound {
        /// Name of the missing recipe.
        name: String,
    },

    /// The recipe name cannot be used as a file name.
    #[error("invalid recipe name '{name}': {reason}")]
    InvalidRecipeName {
        /// The rejected name.
        name: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// A recipe file exists but could not be parsed.
    #[error("failed to read recipe at {path}: {source}")]
    RecipeRead {
        /// Path to the recipe file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: serde_json::Error,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for elixr operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new invalid input error.
    #[must_use]
    pub fn invalid_input(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a recipe not found error.
    #[must_use]
    pub fn recipe_not_found(name: impl Into<String>) -> Self {
        Self::RecipeNotFound { name: name.into() }
    }

    /// Check if this error means a recipe does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::RecipeNotFound { .. })
    }

    /// Check if this error was caused by bad user input rather than the environment.
    #[must_use]
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidInput { .. }
                | Self::InsufficientBase { .. }
                | Self::InvalidRecipeName { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_input_display() {
        let err = Error::invalid_input("amount", "must be greater than 0");
        assert_eq!(err.to_string(), "invalid amount: must be greater than 0");
    }

    #[test]
    fn test_insufficient_base_display() {
        let err = Error::InsufficientBase {
            base: "VG",
            shortfall_ml: 2.5,
        };
        assert_eq!(
            err.to_string(),
            "not enough VG for this mix: short by 2.50 ml"
        );
    }

    #[test]
    fn test_recipe_not_found() {
        let err = Error::recipe_not_found("Custard");
        assert_eq!(err.to_string(), "recipe 'Custard' not found");
        assert!(err.is_not_found());
        assert!(!err.is_input_error());
    }

    #[test]
    fn test_is_input_error() {
        assert!(Error::invalid_input("pg", "out of range").is_input_error());
        assert!(Error::InvalidRecipeName {
            name: "../x".to_string(),
            reason: "contains a path separator",
        }
        .is_input_error());
        assert!(!Error::ConfigValidation {
            message: "bad".to_string()
        }
        .is_input_error());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_from_json_error() {
        let json_result: std::result::Result<i32, serde_json::Error> =
            serde_json::from_str("not valid json");
        if let Err(json_err) = json_result {
            let err: Error = json_err.into();
            assert!(matches!(err, Error::Json(_)));
        }
    }

    #[test]
    fn test_recipe_read_error_display() {
        let json_err = serde_json::from_str::<i32>("{").unwrap_err();
        let err = Error::RecipeRead {
            path: PathBuf::from("/tmp/recipes/Broken.json"),
            source: json_err,
        };
        assert!(err.to_string().contains("/tmp/recipes/Broken.json"));
    }

    #[test]
    fn test_directory_create_error_display() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = Error::DirectoryCreate {
            path: PathBuf::from("/root/forbidden"),
            source: io_err,
        };
        let msg = err.to_string();
        assert!(msg.contains("/root/forbidden"));
        assert!(msg.contains("access denied"));
    }

    #[test]
    fn test_config_validation_error_display() {
        let err = Error::ConfigValidation {
            message: "pg_density must be greater than 0".to_string(),
        };
        assert!(err.to_string().contains("pg_density"));
    }
}
