//! Crate-wide error type.
//!
//! Subsystems keep their own small context traits (see `terrain::error` and
//! `physics::error`) that funnel into [`DemoError`].

use std::path::PathBuf;

/// Result alias used across the crate
pub type DemoResult<T> = Result<T, DemoError>;

#[derive(Debug, thiserror::Error)]
pub enum DemoError {
    #[error("Invalid dimensions for {component}: {details}")]
    InvalidDimensions { component: String, details: String },

    #[error("Invalid configuration value `{field}`: {reason}")]
    InvalidConfig { field: String, reason: String },

    #[error("Shader `{}` failed to load: {reason}", path.display())]
    Shader { path: PathBuf, reason: String },

    #[error("Fracture failed: {0}")]
    Fracture(String),

    #[error("Physics error: {0}")]
    Physics(String),

    #[error("Resource not found: {resource_type} {id}")]
    ResourceNotFound { resource_type: String, id: String },

    #[error("{component} error: {error}")]
    SystemError { component: String, error: String },

    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Failed to serialize configuration: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DemoError {
    pub fn invalid_dimensions(component: &str, details: impl Into<String>) -> Self {
        DemoError::InvalidDimensions {
            component: component.to_string(),
            details: details.into(),
        }
    }

    pub fn invalid_config(field: &str, reason: impl Into<String>) -> Self {
        DemoError::InvalidConfig {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}
