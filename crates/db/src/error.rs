use faultline_core::types::EntityId;
use faultline_core::validation::FieldErrors;

/// Failures raised by a repository.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// Domain field constraints were violated. Carries per-field messages.
    #[error("Validation failed: {}", .0.summary())]
    Validation(FieldErrors),

    #[error("{entity} with id {id} already exists")]
    Conflict {
        entity: &'static str,
        id: EntityId,
    },

    #[error("{entity} with id {id} no longer exists")]
    Missing {
        entity: &'static str,
        id: EntityId,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

impl From<FieldErrors> for RepositoryError {
    fn from(errors: FieldErrors) -> Self {
        RepositoryError::Validation(errors)
    }
}
