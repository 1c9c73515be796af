//! Error types for Rustform.
//!
//! This module defines the error types used throughout Rustform, providing
//! rich error information for debugging and user feedback.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Rustform operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for Rustform.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Input Errors
    // ========================================================================
    /// A required input variable was not supplied.
    #[error("Missing required input variable '{0}' (pass -v {0}=... or set RUSTFORM_VAR_{upper})", upper = .0.to_uppercase())]
    MissingInput(String),

    /// An input variable has an invalid value.
    #[error("Invalid value for input variable '{name}': {message}")]
    InvalidInput {
        /// Input variable name
        name: String,
        /// Error message
        message: String,
    },

    /// A `-v` argument was not in `key=value` form.
    #[error("Invalid variable assignment '{0}': expected key=value")]
    InvalidVarAssignment(String),

    // ========================================================================
    // Stack Errors
    // ========================================================================
    /// Stack validation failed.
    #[error("Stack validation failed: {0}")]
    StackValidation(String),

    /// A resource references an address that is not part of the stack.
    #[error("Resource '{from}' references unknown resource '{to}'")]
    DanglingReference {
        /// Referencing resource address
        from: String,
        /// Referenced (missing) resource address
        to: String,
    },

    /// The dependency graph contains a cycle.
    #[error("Dependency cycle involving resource '{0}'")]
    DependencyCycle(String),

    // ========================================================================
    // State Errors
    // ========================================================================
    /// Error loading the state file.
    #[error("Failed to load state from '{path}': {message}")]
    StateLoad {
        /// Path to the state file
        path: PathBuf,
        /// Error message
        message: String,
    },

    /// Error saving the state file.
    #[error("Failed to save state to '{path}': {message}")]
    StateSave {
        /// Path to the state file
        path: PathBuf,
        /// Error message
        message: String,
    },

    /// A recorded resource is missing an attribute the engine needs.
    #[error("Recorded resource '{address}' is missing attribute '{attribute}'")]
    MissingAttribute {
        /// Resource address
        address: String,
        /// Attribute name
        attribute: String,
    },

    /// An output value was requested that the state does not hold.
    #[error("Output '{0}' not found; run apply first")]
    OutputNotFound(String),

    // ========================================================================
    // Provider Errors
    // ========================================================================
    /// A cloud provider API call failed.
    #[error("Provider operation '{operation}' failed: {message}")]
    Provider {
        /// API operation name
        operation: String,
        /// Error message
        message: String,
    },

    /// The image lookup matched no images.
    #[error("Image lookup '{address}' matched no images (owner '{owner}', pattern '{pattern}')")]
    NoImageFound {
        /// Lookup resource address
        address: String,
        /// Image owner filter
        owner: String,
        /// Image name pattern
        pattern: String,
    },

    /// Timed out waiting for a resource to reach its desired state.
    #[error("Timed out after {timeout_secs}s waiting for '{address}' to become ready")]
    WaitTimeout {
        /// Resource address
        address: String,
        /// Timeout in seconds
        timeout_secs: u64,
    },

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid configuration value.
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidConfig {
        /// Configuration key
        key: String,
        /// Error message
        message: String,
    },

    // ========================================================================
    // IO / Serialization Errors
    // ========================================================================
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error.
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    // ========================================================================
    // Other Errors
    // ========================================================================
    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),

    /// Generic error with source.
    #[error("{message}")]
    Other {
        /// Error message
        message: String,
        /// Source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl Error {
    /// Creates a new invalid input error.
    pub fn invalid_input(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Creates a new provider error.
    pub fn provider(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Creates a new state load error.
    pub fn state_load(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::StateLoad {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a new state save error.
    pub fn state_save(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::StateSave {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Returns the error code for CLI exit status.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::MissingInput(_)
            | Error::InvalidInput { .. }
            | Error::InvalidVarAssignment(_)
            | Error::StackValidation(_)
            | Error::DanglingReference { .. }
            | Error::DependencyCycle(_) => 2,
            Error::Provider { .. } | Error::NoImageFound { .. } | Error::WaitTimeout { .. } => 3,
            Error::StateLoad { .. }
            | Error::StateSave { .. }
            | Error::MissingAttribute { .. }
            | Error::OutputNotFound(_) => 5,
            Error::Config(_) | Error::InvalidConfig { .. } => 6,
            _ => 1,
        }
    }
}

/// Extension trait for adding context to errors.
pub trait ErrorContext<T> {
    /// Adds context to an error.
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Adds context with a closure that is only evaluated on error.
    fn with_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Other {
            message: message.into(),
            source: Some(Box::new(e)),
        })
    }

    fn with_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|e| Error::Other {
            message: f().into(),
            source: Some(Box::new(e)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_group_by_category() {
        assert_eq!(Error::MissingInput("ssh_cidr".into()).exit_code(), 2);
        assert_eq!(
            Error::invalid_input("ssh_cidr", "not a CIDR").exit_code(),
            2
        );
        assert_eq!(Error::provider("RunInstances", "quota").exit_code(), 3);
        assert_eq!(Error::OutputNotFound("public_dns".into()).exit_code(), 5);
        assert_eq!(Error::Config("bad".into()).exit_code(), 6);
        assert_eq!(Error::Internal("oops".into()).exit_code(), 1);
    }

    #[test]
    fn context_wraps_source() {
        let io: std::result::Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "missing",
        ));
        let err = io.context("reading state").unwrap_err();
        assert_eq!(err.to_string(), "reading state");
        assert!(std::error::Error::source(&err).is_some());
    }
}
