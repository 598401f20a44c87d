use serde::{Deserialize, Serialize};

/// Input for scheduling a meeting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMeeting {
    pub title: String,
    /// Unix timestamp of the scheduled start
    pub scheduled_for: i64,
    pub location: Option<String>,
    /// User id of the convener, when known
    pub convened_by: Option<String>,
}
