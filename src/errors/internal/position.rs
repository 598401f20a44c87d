use thiserror::Error;

#[derive(Error, Debug)]
pub enum PositionError {
    #[error("Position not found: {position_id}")]
    PositionNotFound { position_id: String },

    #[error("Position code already exists: {code}")]
    DuplicateCode { code: String },
}
