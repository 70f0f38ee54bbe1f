use miette::Diagnostic;
use thiserror::Error;

/// Unified error type for all strata operations.
#[derive(Debug, Error, Diagnostic)]
pub enum StrataError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or malformed project manifest or lockfile.
    #[error("Manifest error: {message}")]
    #[diagnostic(help("Check your Strata.toml for syntax errors"))]
    Manifest { message: String },

    /// Invalid invocation or run configuration. Raised before any traversal starts.
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// A pipeline unit rejected its configuration at construction time.
    #[error("Invalid configuration for unit {unit}: {message}")]
    #[diagnostic(help("Check the [[pipeline.units]] entries in your configuration"))]
    UnitConfiguration { unit: String, message: String },

    /// Dependency graph construction or state expansion failed.
    #[error("Dependency resolution failed: {message}")]
    Resolution { message: String },

    /// The package index could not answer a query.
    #[error("Package index error: {message}")]
    Index { message: String },

    /// Network request to an external service failed.
    #[error("Network error: {message}")]
    Network { message: String },

    /// Structured output could not be produced.
    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

impl StrataError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn resolution(message: impl Into<String>) -> Self {
        Self::Resolution {
            message: message.into(),
        }
    }
}

/// Convenience alias for `miette::Result<T>`.
pub type StrataResult<T> = miette::Result<T>;
