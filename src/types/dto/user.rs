use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Input for user creation. `position_id` grants an initial position in the
/// same transaction as the insert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub username: String,
    pub password: String,
    pub phone: Option<String>,
    pub employment_status: Option<String>,
    pub position_id: Option<String>,
    pub appointment_date: Option<NaiveDate>,
}

/// Requested position change on a user update.
///
/// The UI only ever sets one current position per user, so an update either
/// leaves the assignment set alone, vacates it, or replaces it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PositionChange {
    Unchanged,
    Vacate,
    Assign {
        position_id: String,
        start_date: Option<NaiveDate>,
    },
}

impl Default for PositionChange {
    fn default() -> Self {
        PositionChange::Unchanged
    }
}

/// Partial update for a user record; `None` fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub employment_status: Option<String>,
    #[serde(default)]
    pub position: PositionChange,
}
