use std::sync::Arc;

use sea_orm::{DatabaseConnection, TransactionTrait};

use crate::audit::AuditLogger;
use crate::errors::internal::{DatabaseError, MeetingError, UserError};
use crate::errors::InternalError;
use crate::policy::{self, Action, PolicyEvaluator, Resource};
use crate::stores::{MeetingStore, UserStore};
use crate::types::db::{meeting, meeting_participant};
use crate::types::dto::NewMeeting;
use crate::types::internal::{Participant, ParticipantRole, RequestContext};

/// Meeting and participant record keeping.
///
/// Participants are either internal users or external guests; the
/// (meeting, participant, role) combination is unique per meeting.
pub struct MeetingService {
    db: DatabaseConnection,
    audit_logger: Arc<AuditLogger>,
    policy: Arc<dyn PolicyEvaluator>,
}

impl MeetingService {
    pub fn new(
        db: DatabaseConnection,
        audit_logger: Arc<AuditLogger>,
        policy: Arc<dyn PolicyEvaluator>,
    ) -> Self {
        Self {
            db,
            audit_logger,
            policy,
        }
    }

    pub async fn schedule_meeting(
        &self,
        ctx: &RequestContext,
        input: NewMeeting,
    ) -> Result<meeting::Model, InternalError> {
        self.authorize(ctx, Action::ManageMeetings, &Resource::System)
            .await?;

        if let Some(convener) = &input.convened_by {
            UserStore::find_by_id(&self.db, convener)
                .await?
                .ok_or_else(|| UserError::UserIdNotFound {
                    user_id: convener.clone(),
                })?;
        }

        let created = MeetingStore::insert(&self.db, &input).await?;

        self.audit(
            self.audit_logger
                .log_meeting_scheduled(ctx, &created.id, &created.title)
                .await,
        );

        tracing::info!("Meeting {} scheduled by {}", created.id, ctx.actor_id);

        Ok(created)
    }

    pub async fn cancel_meeting(
        &self,
        ctx: &RequestContext,
        meeting_id: &str,
    ) -> Result<meeting::Model, InternalError> {
        self.authorize(ctx, Action::ManageMeetings, &Resource::Meeting(meeting_id.to_string()))
            .await?;

        let existing = MeetingStore::find_by_id(&self.db, meeting_id)
            .await?
            .ok_or_else(|| MeetingError::MeetingNotFound {
                meeting_id: meeting_id.to_string(),
            })?;

        let cancelled =
            MeetingStore::set_status(&self.db, existing, meeting::STATUS_CANCELLED).await?;

        self.audit(
            self.audit_logger
                .log_meeting_cancelled(ctx, meeting_id)
                .await,
        );

        Ok(cancelled)
    }

    /// Add a participant to a meeting. The duplicate check and the insert
    /// run in one transaction.
    pub async fn add_participant(
        &self,
        ctx: &RequestContext,
        meeting_id: &str,
        participant: Participant,
        role: ParticipantRole,
    ) -> Result<meeting_participant::Model, InternalError> {
        self.authorize(ctx, Action::ManageMeetings, &Resource::Meeting(meeting_id.to_string()))
            .await?;

        let txn = self
            .db
            .begin()
            .await
            .map_err(|source| DatabaseError::TransactionBegin { source })?;

        MeetingStore::find_by_id(&txn, meeting_id)
            .await?
            .ok_or_else(|| MeetingError::MeetingNotFound {
                meeting_id: meeting_id.to_string(),
            })?;

        if let Participant::User { user_id } = &participant {
            UserStore::find_by_id(&txn, user_id)
                .await?
                .ok_or_else(|| UserError::UserIdNotFound {
                    user_id: user_id.clone(),
                })?;
        }

        if MeetingStore::find_participant(&txn, meeting_id, &participant, role)
            .await?
            .is_some()
        {
            return Err(MeetingError::DuplicateParticipant {
                meeting_id: meeting_id.to_string(),
                participant: participant.to_string(),
                role: role.to_string(),
            }
            .into());
        }

        let row = MeetingStore::insert_participant(&txn, meeting_id, &participant, role).await?;

        txn.commit()
            .await
            .map_err(|source| DatabaseError::TransactionCommit { source })?;

        self.audit(
            self.audit_logger
                .log_participant_added(ctx, meeting_id, &participant.to_string(), role.as_str())
                .await,
        );

        Ok(row)
    }

    pub async fn remove_participant(
        &self,
        ctx: &RequestContext,
        participant_id: i32,
    ) -> Result<(), InternalError> {
        let row = MeetingStore::find_participant_by_id(&self.db, participant_id)
            .await?
            .ok_or(MeetingError::ParticipantNotFound { participant_id })?;

        self.authorize(
            ctx,
            Action::ManageMeetings,
            &Resource::Meeting(row.meeting_id.clone()),
        )
        .await?;

        let meeting_id = row.meeting_id.clone();
        MeetingStore::delete_participant(&self.db, row).await?;

        self.audit(
            self.audit_logger
                .log_participant_removed(ctx, &meeting_id, participant_id)
                .await,
        );

        Ok(())
    }

    pub async fn list_participants(
        &self,
        meeting_id: &str,
    ) -> Result<Vec<meeting_participant::Model>, InternalError> {
        MeetingStore::participants_for_meeting(&self.db, meeting_id).await
    }

    async fn authorize(
        &self,
        ctx: &RequestContext,
        action: Action,
        resource: &Resource,
    ) -> Result<(), InternalError> {
        if let Err(err) = policy::authorize(self.policy.as_ref(), ctx, action, resource) {
            self.audit(
                self.audit_logger
                    .log_policy_denied(ctx, action.as_str(), &err.to_string())
                    .await,
            );
            return Err(err.into());
        }
        Ok(())
    }

    fn audit(&self, result: Result<(), InternalError>) {
        if let Err(e) = result {
            tracing::warn!("Audit write failed: {}", e);
        }
    }
}
