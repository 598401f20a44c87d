use thiserror::Error;

/// Errors that can occur during audit logging operations
#[derive(Error, Debug)]
pub enum AuditError {
    #[error("Failed to serialize audit data: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Failed to write audit event: {0}")]
    WriteFailed(#[from] sea_orm::DbErr),
}
