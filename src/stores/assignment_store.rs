use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};

use crate::errors::InternalError;
use crate::types::db::position_assignment::{self, Entity as PositionAssignment};

/// Data access for the position-holding history.
///
/// The current-holder reads take exclusive row locks so that two transactions
/// racing to fill the same position serialize on the read instead of both
/// observing it vacant. SQLite ignores the lock clause (its writers serialize
/// anyway); PostgreSQL emits `FOR UPDATE`.
pub struct AssignmentStore;

impl AssignmentStore {
    pub async fn current_for_position<C: ConnectionTrait>(
        conn: &C,
        position_id: &str,
    ) -> Result<Vec<position_assignment::Model>, InternalError> {
        PositionAssignment::find()
            .filter(position_assignment::Column::PositionId.eq(position_id))
            .filter(position_assignment::Column::IsCurrent.eq(true))
            .lock_exclusive()
            .all(conn)
            .await
            .map_err(|e| InternalError::database("find_current_holders", e))
    }

    pub async fn current_for_user<C: ConnectionTrait>(
        conn: &C,
        user_id: &str,
    ) -> Result<Vec<position_assignment::Model>, InternalError> {
        PositionAssignment::find()
            .filter(position_assignment::Column::UserId.eq(user_id))
            .filter(position_assignment::Column::IsCurrent.eq(true))
            .lock_exclusive()
            .all(conn)
            .await
            .map_err(|e| InternalError::database("find_current_assignments", e))
    }

    pub async fn count_current_for_position<C: ConnectionTrait>(
        conn: &C,
        position_id: &str,
    ) -> Result<u64, InternalError> {
        PositionAssignment::find()
            .filter(position_assignment::Column::PositionId.eq(position_id))
            .filter(position_assignment::Column::IsCurrent.eq(true))
            .count(conn)
            .await
            .map_err(|e| InternalError::database("count_current_holders", e))
    }

    /// Full appointment history for one user, oldest first
    pub async fn history_for_user<C: ConnectionTrait>(
        conn: &C,
        user_id: &str,
    ) -> Result<Vec<position_assignment::Model>, InternalError> {
        PositionAssignment::find()
            .filter(position_assignment::Column::UserId.eq(user_id))
            .order_by_asc(position_assignment::Column::AppointmentDate)
            .all(conn)
            .await
            .map_err(|e| InternalError::database("find_assignment_history", e))
    }

    /// Close an assignment: mark it non-current with the given end date.
    /// Closed rows are terminal; reappointment creates a fresh row.
    pub async fn close<C: ConnectionTrait>(
        conn: &C,
        assignment: position_assignment::Model,
        end_date: NaiveDate,
    ) -> Result<position_assignment::Model, InternalError> {
        let mut active: position_assignment::ActiveModel = assignment.into();
        active.is_current = Set(false);
        active.end_date = Set(Some(end_date));
        active.updated_at = Set(Utc::now().timestamp());

        active
            .update(conn)
            .await
            .map_err(|e| InternalError::database("close_assignment", e))
    }

    /// Insert a fresh current assignment starting on `appointment_date`
    pub async fn insert_current<C: ConnectionTrait>(
        conn: &C,
        user_id: &str,
        position_id: &str,
        appointment_date: NaiveDate,
    ) -> Result<position_assignment::Model, InternalError> {
        let now = Utc::now().timestamp();

        let new_assignment = position_assignment::ActiveModel {
            id: sea_orm::ActiveValue::NotSet,
            user_id: Set(user_id.to_string()),
            position_id: Set(position_id.to_string()),
            appointment_date: Set(appointment_date),
            end_date: Set(None),
            is_current: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };

        new_assignment
            .insert(conn)
            .await
            .map_err(|e| InternalError::database("insert_assignment", e))
    }
}
