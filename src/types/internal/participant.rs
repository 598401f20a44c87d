use std::fmt;

use serde::{Deserialize, Serialize};

/// A meeting participant is either an internal user or an external guest.
/// The tag replaces runtime type inspection: every call site matches on the
/// variant instead of probing which columns happen to be set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Participant {
    User {
        user_id: String,
    },
    Guest {
        name: String,
        email: Option<String>,
        organization: Option<String>,
    },
}

impl Participant {
    pub const TYPE_USER: &'static str = "user";
    pub const TYPE_GUEST: &'static str = "guest";

    pub fn type_tag(&self) -> &'static str {
        match self {
            Participant::User { .. } => Self::TYPE_USER,
            Participant::Guest { .. } => Self::TYPE_GUEST,
        }
    }
}

impl fmt::Display for Participant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Participant::User { user_id } => write!(f, "user {}", user_id),
            Participant::Guest { name, .. } => write!(f, "guest {}", name),
        }
    }
}

/// Role a participant plays in one meeting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParticipantRole {
    Chair,
    Secretary,
    Member,
    Observer,
}

impl ParticipantRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Chair => "chair",
            Self::Secretary => "secretary",
            Self::Member => "member",
            Self::Observer => "observer",
        }
    }
}

impl fmt::Display for ParticipantRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
