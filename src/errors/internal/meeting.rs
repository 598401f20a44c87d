use thiserror::Error;

#[derive(Error, Debug)]
pub enum MeetingError {
    #[error("Meeting not found: {meeting_id}")]
    MeetingNotFound { meeting_id: String },

    #[error("Participant row not found: {participant_id}")]
    ParticipantNotFound { participant_id: i32 },

    #[error("{participant} already participates in meeting {meeting_id} as {role}")]
    DuplicateParticipant {
        meeting_id: String,
        participant: String,
        role: String,
    },
}
