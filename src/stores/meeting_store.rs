use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, ModelTrait, QueryFilter, Set,
};
use uuid::Uuid;

use crate::errors::InternalError;
use crate::types::db::meeting::{self, Entity as Meeting};
use crate::types::db::meeting_participant::{self, Entity as MeetingParticipant};
use crate::types::dto::NewMeeting;
use crate::types::internal::{Participant, ParticipantRole};

/// Data access for meetings and their participant rows
pub struct MeetingStore;

impl MeetingStore {
    pub async fn find_by_id<C: ConnectionTrait>(
        conn: &C,
        meeting_id: &str,
    ) -> Result<Option<meeting::Model>, InternalError> {
        Meeting::find_by_id(meeting_id)
            .one(conn)
            .await
            .map_err(|e| InternalError::database("find_meeting_by_id", e))
    }

    pub async fn insert<C: ConnectionTrait>(
        conn: &C,
        input: &NewMeeting,
    ) -> Result<meeting::Model, InternalError> {
        let now = Utc::now().timestamp();

        let new_meeting = meeting::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            title: Set(input.title.clone()),
            scheduled_for: Set(input.scheduled_for),
            location: Set(input.location.clone()),
            status: Set(meeting::STATUS_SCHEDULED.to_string()),
            convened_by: Set(input.convened_by.clone()),
            created_at: Set(now),
            updated_at: Set(now),
        };

        new_meeting
            .insert(conn)
            .await
            .map_err(|e| InternalError::database("insert_meeting", e))
    }

    pub async fn set_status<C: ConnectionTrait>(
        conn: &C,
        model: meeting::Model,
        status: &str,
    ) -> Result<meeting::Model, InternalError> {
        let mut active: meeting::ActiveModel = model.into();
        active.status = Set(status.to_string());
        active.updated_at = Set(Utc::now().timestamp());

        active
            .update(conn)
            .await
            .map_err(|e| InternalError::database("update_meeting_status", e))
    }

    /// Look up a participation row by the (meeting, participant, role) key.
    /// Guests are keyed by name plus email; users by their id.
    pub async fn find_participant<C: ConnectionTrait>(
        conn: &C,
        meeting_id: &str,
        participant: &Participant,
        role: ParticipantRole,
    ) -> Result<Option<meeting_participant::Model>, InternalError> {
        let mut query = MeetingParticipant::find()
            .filter(meeting_participant::Column::MeetingId.eq(meeting_id))
            .filter(meeting_participant::Column::ParticipantType.eq(participant.type_tag()))
            .filter(meeting_participant::Column::Role.eq(role.as_str()));

        query = match participant {
            Participant::User { user_id } => {
                query.filter(meeting_participant::Column::UserId.eq(user_id.as_str()))
            }
            Participant::Guest { name, email, .. } => {
                let query =
                    query.filter(meeting_participant::Column::GuestName.eq(name.as_str()));
                match email {
                    Some(email) => {
                        query.filter(meeting_participant::Column::GuestEmail.eq(email.as_str()))
                    }
                    None => query.filter(meeting_participant::Column::GuestEmail.is_null()),
                }
            }
        };

        query
            .one(conn)
            .await
            .map_err(|e| InternalError::database("find_participant", e))
    }

    pub async fn find_participant_by_id<C: ConnectionTrait>(
        conn: &C,
        participant_id: i32,
    ) -> Result<Option<meeting_participant::Model>, InternalError> {
        MeetingParticipant::find_by_id(participant_id)
            .one(conn)
            .await
            .map_err(|e| InternalError::database("find_participant_by_id", e))
    }

    pub async fn insert_participant<C: ConnectionTrait>(
        conn: &C,
        meeting_id: &str,
        participant: &Participant,
        role: ParticipantRole,
    ) -> Result<meeting_participant::Model, InternalError> {
        let mut new_row = meeting_participant::ActiveModel {
            id: sea_orm::ActiveValue::NotSet,
            meeting_id: Set(meeting_id.to_string()),
            participant_type: Set(participant.type_tag().to_string()),
            user_id: Set(None),
            guest_name: Set(None),
            guest_email: Set(None),
            guest_organization: Set(None),
            role: Set(role.as_str().to_string()),
            created_at: Set(Utc::now().timestamp()),
        };

        match participant {
            Participant::User { user_id } => {
                new_row.user_id = Set(Some(user_id.clone()));
            }
            Participant::Guest {
                name,
                email,
                organization,
            } => {
                new_row.guest_name = Set(Some(name.clone()));
                new_row.guest_email = Set(email.clone());
                new_row.guest_organization = Set(organization.clone());
            }
        }

        new_row
            .insert(conn)
            .await
            .map_err(|e| InternalError::database("insert_participant", e))
    }

    pub async fn delete_participant<C: ConnectionTrait>(
        conn: &C,
        model: meeting_participant::Model,
    ) -> Result<(), InternalError> {
        model
            .delete(conn)
            .await
            .map_err(|e| InternalError::database("delete_participant", e))?;

        Ok(())
    }

    pub async fn participants_for_meeting<C: ConnectionTrait>(
        conn: &C,
        meeting_id: &str,
    ) -> Result<Vec<meeting_participant::Model>, InternalError> {
        MeetingParticipant::find()
            .filter(meeting_participant::Column::MeetingId.eq(meeting_id))
            .all(conn)
            .await
            .map_err(|e| InternalError::database("find_meeting_participants", e))
    }
}
