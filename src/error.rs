//! Error types for registry provisioning

use thiserror::Error;

/// Result type for registry operations
pub type Result<T> = std::result::Result<T, RegistryError>;

/// What kind of entity an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Registry,
    Schema,
    SchemaVersion,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityKind::Registry => write!(f, "registry"),
            EntityKind::Schema => write!(f, "schema"),
            EntityKind::SchemaVersion => write!(f, "schema version"),
        }
    }
}

/// Errors reported by the registry collaborator
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("{kind} already exists: {name}")]
    AlreadyExists { kind: EntityKind, name: String },

    #[error("{kind} not found: {name}")]
    NotFound { kind: EntityKind, name: String },

    #[error("registry service error [{code}]: {message}")]
    Service { code: String, message: String },

    #[error("malformed registry response: {0}")]
    InvalidResponse(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(#[from] config_crate::ConfigError),
}

impl RegistryError {
    /// Whether this error is the expected "already exists" condition
    pub fn is_already_exists(&self) -> bool {
        matches!(self, RegistryError::AlreadyExists { .. })
    }

    /// Whether this error is a "not found" condition
    pub fn is_not_found(&self) -> bool {
        matches!(self, RegistryError::NotFound { .. })
    }
}
