use miette::{Diagnostic, Result};
use thiserror::Error;

/// Main error type for the application
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Environment error: {0}")]
    #[diagnostic(code(bulk_scheduler::environment))]
    Environment(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(bulk_scheduler::config))]
    Config(String),

    #[error("Conflict source error: {0}")]
    #[diagnostic(code(bulk_scheduler::conflict_source))]
    ConflictSource(String),

    #[error("Component error: {0}")]
    #[diagnostic(code(bulk_scheduler::component))]
    Component(String),

    #[error("Preview request superseded by a newer request")]
    #[diagnostic(code(bulk_scheduler::superseded))]
    Superseded,

    #[error(transparent)]
    #[diagnostic(code(bulk_scheduler::io))]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(bulk_scheduler::serialization))]
    Serialization(String),

    #[error("Other error: {0}")]
    #[diagnostic(code(bulk_scheduler::other))]
    Other(String),
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Type alias for Result with our Error type
pub type SchedulerResult<T> = Result<T, Error>;

/// Helper to create environment errors
pub fn env_error(var: &str) -> Error {
    Error::Environment(format!("Missing environment variable: {}", var))
}

/// Helper to create configuration errors
pub fn config_error(message: &str) -> Error {
    Error::Config(message.to_string())
}

/// Helper to create conflict source errors
pub fn conflict_source_error(message: &str) -> Error {
    Error::ConflictSource(message.to_string())
}

/// Helper to create component errors
pub fn component_error(message: &str) -> Error {
    Error::Component(message.to_string())
}
