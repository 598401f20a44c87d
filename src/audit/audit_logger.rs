use std::sync::Arc;

use chrono::NaiveDate;
use serde_json::json;

use crate::errors::InternalError;
use crate::stores::AuditStore;
use crate::types::internal::audit::{AuditEvent, EventType};
use crate::types::internal::RequestContext;

/// Audit logging provider that handles audit event creation and storage.
///
/// Every method stamps the event with the actor, ip, and request id from the
/// request context; callers only supply operation-specific data.
pub struct AuditLogger {
    audit_store: Arc<AuditStore>,
}

impl AuditLogger {
    pub fn new(audit_store: Arc<AuditStore>) -> Self {
        Self { audit_store }
    }

    fn event(&self, ctx: &RequestContext, event_type: EventType) -> AuditEvent {
        let mut event = AuditEvent::new(event_type);
        event.actor_id = ctx.actor_id.clone();
        event.ip_address = ctx.ip_address.map(|ip| ip.to_string());
        event.request_id = ctx.request_id.to_string();
        event
            .data
            .insert("source".to_string(), json!(format!("{:?}", ctx.source)));
        event
    }

    /// Log a position grant
    pub async fn log_position_assigned(
        &self,
        ctx: &RequestContext,
        user_id: &str,
        position_id: &str,
        appointment_date: NaiveDate,
    ) -> Result<(), InternalError> {
        let mut event = self.event(ctx, EventType::PositionAssigned);
        event.data.insert("target_user_id".to_string(), json!(user_id));
        event.data.insert("position_id".to_string(), json!(position_id));
        event.data.insert(
            "appointment_date".to_string(),
            json!(appointment_date.to_string()),
        );

        self.audit_store.write_event(event).await
    }

    /// Log the closing of a user's current assignments
    pub async fn log_position_vacated(
        &self,
        ctx: &RequestContext,
        user_id: &str,
        closed_assignment_ids: &[i32],
    ) -> Result<(), InternalError> {
        let mut event = self.event(ctx, EventType::PositionVacated);
        event.data.insert("target_user_id".to_string(), json!(user_id));
        event.data.insert(
            "closed_assignment_ids".to_string(),
            json!(closed_assignment_ids),
        );

        self.audit_store.write_event(event).await
    }

    /// Log an assignment blocked by a business rule
    pub async fn log_assignment_blocked(
        &self,
        ctx: &RequestContext,
        user_id: &str,
        position_id: &str,
        rule: &str,
    ) -> Result<(), InternalError> {
        let mut event = self.event(ctx, EventType::AssignmentBlocked);
        event.data.insert("target_user_id".to_string(), json!(user_id));
        event.data.insert("position_id".to_string(), json!(position_id));
        event.data.insert("rule".to_string(), json!(rule));

        self.audit_store.write_event(event).await
    }

    pub async fn log_user_created(
        &self,
        ctx: &RequestContext,
        user_id: &str,
        username: &str,
    ) -> Result<(), InternalError> {
        let mut event = self.event(ctx, EventType::UserCreated);
        event.data.insert("target_user_id".to_string(), json!(user_id));
        event.data.insert("username".to_string(), json!(username));

        self.audit_store.write_event(event).await
    }

    pub async fn log_user_updated(
        &self,
        ctx: &RequestContext,
        user_id: &str,
        changed_fields: &[&str],
    ) -> Result<(), InternalError> {
        let mut event = self.event(ctx, EventType::UserUpdated);
        event.data.insert("target_user_id".to_string(), json!(user_id));
        event
            .data
            .insert("changed_fields".to_string(), json!(changed_fields));

        self.audit_store.write_event(event).await
    }

    pub async fn log_user_deleted(
        &self,
        ctx: &RequestContext,
        user_id: &str,
    ) -> Result<(), InternalError> {
        let mut event = self.event(ctx, EventType::UserDeleted);
        event.data.insert("target_user_id".to_string(), json!(user_id));

        self.audit_store.write_event(event).await
    }

    /// Log a deletion blocked by the last-Super-Admin guard
    pub async fn log_user_deletion_blocked(
        &self,
        ctx: &RequestContext,
        user_id: &str,
        rule: &str,
    ) -> Result<(), InternalError> {
        let mut event = self.event(ctx, EventType::UserDeletionBlocked);
        event.data.insert("target_user_id".to_string(), json!(user_id));
        event.data.insert("rule".to_string(), json!(rule));

        self.audit_store.write_event(event).await
    }

    pub async fn log_meeting_scheduled(
        &self,
        ctx: &RequestContext,
        meeting_id: &str,
        title: &str,
    ) -> Result<(), InternalError> {
        let mut event = self.event(ctx, EventType::MeetingScheduled);
        event.data.insert("meeting_id".to_string(), json!(meeting_id));
        event.data.insert("title".to_string(), json!(title));

        self.audit_store.write_event(event).await
    }

    pub async fn log_meeting_cancelled(
        &self,
        ctx: &RequestContext,
        meeting_id: &str,
    ) -> Result<(), InternalError> {
        let mut event = self.event(ctx, EventType::MeetingCancelled);
        event.data.insert("meeting_id".to_string(), json!(meeting_id));

        self.audit_store.write_event(event).await
    }

    pub async fn log_participant_added(
        &self,
        ctx: &RequestContext,
        meeting_id: &str,
        participant: &str,
        role: &str,
    ) -> Result<(), InternalError> {
        let mut event = self.event(ctx, EventType::ParticipantAdded);
        event.data.insert("meeting_id".to_string(), json!(meeting_id));
        event.data.insert("participant".to_string(), json!(participant));
        event.data.insert("role".to_string(), json!(role));

        self.audit_store.write_event(event).await
    }

    pub async fn log_participant_removed(
        &self,
        ctx: &RequestContext,
        meeting_id: &str,
        participant_id: i32,
    ) -> Result<(), InternalError> {
        let mut event = self.event(ctx, EventType::ParticipantRemoved);
        event.data.insert("meeting_id".to_string(), json!(meeting_id));
        event
            .data
            .insert("participant_id".to_string(), json!(participant_id));

        self.audit_store.write_event(event).await
    }

    /// Log a policy denial surfaced to the caller
    pub async fn log_policy_denied(
        &self,
        ctx: &RequestContext,
        action: &str,
        reason: &str,
    ) -> Result<(), InternalError> {
        let mut event = self.event(ctx, EventType::PolicyDenied);
        event.data.insert("action".to_string(), json!(action));
        event.data.insert("reason".to_string(), json!(reason));

        self.audit_store.write_event(event).await
    }
}
