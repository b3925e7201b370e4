use crate::domain::model::EntityKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SanctuaryError {
    #[error("{entity} not found with ID: {id}")]
    NotFound { entity: EntityKind, id: i64 },

    #[error("Animal must have a caretaker associated.")]
    CaretakerRequired,

    #[error("Habitat {name} (ID: {habitat_id}) has reached its maximum capacity of {capacity} (current: {occupants}).")]
    HabitatCapacityExceeded {
        habitat_id: i64,
        name: String,
        capacity: u32,
        occupants: u32,
    },

    #[error("Cannot delete {entity} {id} because it is still referenced by {references} animal(s).")]
    InUseConflict {
        entity: EntityKind,
        id: i64,
        references: u32,
    },

    #[error("A keeper with contact {contact} already exists.")]
    DuplicateContact { contact: String },

    #[error("A vet with CRMV {crmv} already exists.")]
    DuplicateLicense { crmv: String },

    #[error("Validation error on {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Notification delivery failed: {message}")]
    Notification { message: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidation { field: String, message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfig { field: String },
}

/// Coarse grouping used by the HTTP layer to pick a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    NotFound,
    Validation,
    Conflict,
    Internal,
}

impl SanctuaryError {
    pub fn not_found(entity: EntityKind, id: i64) -> Self {
        Self::NotFound { entity, id }
    }

    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::CaretakerRequired
            | Self::HabitatCapacityExceeded { .. }
            | Self::DuplicateContact { .. }
            | Self::DuplicateLicense { .. }
            | Self::Validation { .. } => ErrorCategory::Validation,
            Self::InUseConflict { .. } => ErrorCategory::Conflict,
            _ => ErrorCategory::Internal,
        }
    }
}

pub type Result<T> = std::result::Result<T, SanctuaryError>;
