use thiserror::Error;

pub mod audit;
pub mod database;
pub mod meeting;
pub mod policy;
pub mod position;
pub mod user;

pub use audit::AuditError;
pub use database::DatabaseError;
pub use meeting::MeetingError;
pub use policy::PolicyError;
pub use position::PositionError;
pub use user::UserError;

/// Internal error type for store and service operations
///
/// Hybrid design separates infrastructure errors (shared) from domain errors
/// (per concern). Callers map not-found variants to their "unknown record"
/// surface, `Policy` to a business-rule message, and `Database` to a generic
/// failure.
#[derive(Error, Debug)]
pub enum InternalError {
    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    User(#[from] UserError),

    #[error(transparent)]
    Position(#[from] PositionError),

    #[error(transparent)]
    Policy(#[from] PolicyError),

    #[error(transparent)]
    Meeting(#[from] MeetingError),

    #[error(transparent)]
    Audit(#[from] AuditError),

    #[error("Crypto error: {operation} failed: {message}")]
    Crypto { operation: String, message: String },
}

impl InternalError {
    pub fn database(operation: &str, source: sea_orm::DbErr) -> InternalError {
        InternalError::Database(DatabaseError::Operation {
            operation: operation.to_string(),
            source,
        })
    }

    pub fn crypto(operation: &str, message: impl Into<String>) -> InternalError {
        InternalError::Crypto {
            operation: operation.to_string(),
            message: message.into(),
        }
    }
}
