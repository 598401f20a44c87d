use thiserror::Error;

#[derive(Error, Debug)]
pub enum UserError {
    #[error("User already exists: {username}")]
    DuplicateUsername { username: String },

    #[error("Email already in use: {email}")]
    DuplicateEmail { email: String },

    #[error("User ID not found: {user_id}")]
    UserIdNotFound { user_id: String },
}
