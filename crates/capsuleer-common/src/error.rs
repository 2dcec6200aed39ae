//! Common error types shared across Capsuleer components

use thiserror::Error;

/// Marker trait implemented by all Capsuleer component error types
pub trait CapsuleerError: std::error::Error {}

/// Configuration errors
///
/// These are startup-only and always fatal: a component that cannot
/// assemble a valid configuration must refuse to start rather than run
/// with defaults it cannot trust.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// A required configuration key was not provided
    #[error("Missing required configuration: {key}")]
    MissingRequired { key: String },

    /// A configuration value was provided but is not usable
    #[error("Invalid configuration value for {key}: {details}")]
    InvalidValue { key: String, details: String },

    /// The configuration sources could not be parsed
    #[error("Failed to parse configuration: {details}")]
    ParseError { details: String },
}

impl CapsuleerError for ConfigurationError {}
