use std::collections::HashMap;
use std::fmt;

/// Event types for audit logging
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventType {
    PositionAssigned,
    PositionVacated,
    AssignmentBlocked,
    UserCreated,
    UserUpdated,
    UserDeleted,
    UserDeletionBlocked,
    MeetingScheduled,
    MeetingCancelled,
    ParticipantAdded,
    ParticipantRemoved,
    PolicyDenied,
    Custom(String),
}

impl EventType {
    /// String representation for database storage
    pub fn as_str(&self) -> &str {
        match self {
            Self::PositionAssigned => "position_assigned",
            Self::PositionVacated => "position_vacated",
            Self::AssignmentBlocked => "assignment_blocked",
            Self::UserCreated => "user_created",
            Self::UserUpdated => "user_updated",
            Self::UserDeleted => "user_deleted",
            Self::UserDeletionBlocked => "user_deletion_blocked",
            Self::MeetingScheduled => "meeting_scheduled",
            Self::MeetingCancelled => "meeting_cancelled",
            Self::ParticipantAdded => "participant_added",
            Self::ParticipantRemoved => "participant_removed",
            Self::PolicyDenied => "policy_denied",
            Self::Custom(s) => s.as_str(),
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Audit event structure for building and storing audit logs
#[derive(Debug, Clone)]
pub struct AuditEvent {
    pub event_type: EventType,
    pub actor_id: String,
    pub ip_address: Option<String>,
    pub request_id: String,
    pub data: HashMap<String, serde_json::Value>,
}

impl AuditEvent {
    /// Create a new audit event with the specified event type
    pub fn new(event_type: EventType) -> Self {
        Self {
            event_type,
            actor_id: "unknown".to_string(),
            ip_address: None,
            request_id: "none".to_string(),
            data: HashMap::new(),
        }
    }
}
