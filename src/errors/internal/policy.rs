use thiserror::Error;

/// Business-rule breaches. Every variant blocks the operation before any
/// mutation is committed; messages name the conflicting holder or rule so an
/// operator can act on them.
#[derive(Error, Debug)]
pub enum PolicyError {
    #[error("Super Admin position is currently held by {holder}; it must be vacated before it can be reassigned")]
    SuperAdminOccupied { holder: String },

    #[error("Cannot delete user {user_id}: they are the only current Super Admin")]
    LastSuperAdminDeletion { user_id: String },

    #[error("Cannot move user {user_id} off the Super Admin position: no other current holder exists. Vacate the position explicitly first")]
    LastSuperAdminReassignment { user_id: String },

    #[error("Action {action} denied for {actor_id}: {reason}")]
    ActionDenied {
        action: String,
        actor_id: String,
        reason: String,
    },

    #[error("Action {action} requires an authenticated actor")]
    ActorRequired { action: String },
}
