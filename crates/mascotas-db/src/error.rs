//! Database-specific error types and conversions.

use mascotas_core::error::MascotasError;
use uuid::Uuid;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Unique constraint violated on {entity}")]
    Duplicate { entity: String },

    #[error("Stored record is malformed: {0}")]
    InvalidRecord(String),
}

impl DbError {
    pub(crate) fn not_found(entity: &str, id: impl ToString) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Classify a failed statement. Unique index violations become
    /// [`DbError::Duplicate`].
    pub(crate) fn statement(entity: &str, err: surrealdb::Error) -> Self {
        let message = err.to_string();
        if message.contains("already contains") {
            Self::Duplicate {
                entity: entity.into(),
            }
        } else {
            Self::Query(message)
        }
    }
}

/// Parse a UUID stored as a string field or record key.
pub(crate) fn parse_uuid(value: &str, what: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(value).map_err(|e| DbError::InvalidRecord(format!("invalid {what} UUID: {e}")))
}

impl From<DbError> for MascotasError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => MascotasError::NotFound { entity, id },
            DbError::Duplicate { entity } => MascotasError::AlreadyExists { entity },
            other => MascotasError::Database(other.to_string()),
        }
    }
}
