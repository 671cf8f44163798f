// ==========================================
// Poultry Metrics - API errors
// ==========================================
// Maps repository failures onto caller-facing categories
// ==========================================

use crate::domain::EntryError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    // ===== input =====
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("validation failed: {0}")]
    ValidationError(#[from] EntryError),

    #[error("not found: {0}")]
    NotFound(String),

    // ===== data access =====
    #[error("database error: {0}")]
    DatabaseError(String),

    #[error("database connection failed: {0}")]
    DatabaseConnectionError(String),

    #[error("stored data is malformed: {0}")]
    DataFormatError(String),

    // ===== other =====
    #[error("internal error: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{} (id={})", entity, id))
            }
            RepositoryError::DatabaseConnectionError(msg) => ApiError::DatabaseConnectionError(msg),
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("lock poisoned: {}", msg))
            }
            RepositoryError::DatabaseQueryError(msg)
            | RepositoryError::UniqueConstraintViolation(msg)
            | RepositoryError::ForeignKeyViolation(msg) => ApiError::DatabaseError(msg),
            RepositoryError::FieldValueError { field, message } => {
                ApiError::DataFormatError(format!("{}: {}", field, message))
            }
            RepositoryError::SerializationError(msg) => ApiError::DataFormatError(msg),
            RepositoryError::Validation(e) => ApiError::ValidationError(e),
            RepositoryError::TaskError(msg) => ApiError::InternalError(msg),
            RepositoryError::Other(e) => ApiError::Other(e),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_error_mapping() {
        let err: ApiError = RepositoryError::NotFound {
            entity: "Batch".to_string(),
            id: "b1".to_string(),
        }
        .into();
        assert!(matches!(err, ApiError::NotFound(ref m) if m == "Batch (id=b1)"));

        let err: ApiError = RepositoryError::Validation(EntryError::InvalidAmount).into();
        assert!(matches!(err, ApiError::ValidationError(EntryError::InvalidAmount)));

        let err: ApiError = RepositoryError::ForeignKeyViolation("fk".to_string()).into();
        assert!(matches!(err, ApiError::DatabaseError(_)));
    }
}
