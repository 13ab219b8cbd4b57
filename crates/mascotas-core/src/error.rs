//! Error types for the Mascotas system.

use thiserror::Error;
use uuid::Uuid;

use crate::validation::ValidationErrors;

#[derive(Debug, Error)]
pub enum MascotasError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Entity already exists: {entity}")]
    AlreadyExists { entity: String },

    /// The pet was adopted before this request could claim it.
    #[error("Pet already adopted: {pet_name} ({pet_id})")]
    AlreadyAdopted { pet_id: Uuid, pet_name: String },

    #[error("Permission denied: {reason}")]
    PermissionDenied { reason: String },

    #[error("Validation error: {0}")]
    Validation(ValidationErrors),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Cryptography error: {0}")]
    Crypto(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl MascotasError {
    pub fn not_found(entity: &str, id: impl ToString) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }
}

impl From<ValidationErrors> for MascotasError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}

pub type MascotasResult<T> = Result<T, MascotasError>;
