use std::sync::Arc;

use chrono::{Duration, NaiveDate, Utc};
use sea_orm::{DatabaseConnection, DatabaseTransaction, TransactionTrait};

use crate::audit::AuditLogger;
use crate::errors::internal::{DatabaseError, PolicyError, PositionError, UserError};
use crate::errors::InternalError;
use crate::policy::{self, Action, PolicyEvaluator, Resource};
use crate::stores::{AssignmentStore, PositionStore, UserStore};
use crate::types::db::position;
use crate::types::internal::{AssignmentOutcome, RequestContext};

/// Position assignment engine.
///
/// Executes grants, transfers, and removals as single transactions that
/// preserve the holding invariants: at most one current holder for a unique
/// position, at most one current assignment per user, and a Super Admin
/// position that can only change hands through an explicit vacate.
///
/// All mutations run between an explicit `begin` and `commit`; an error on
/// any step drops the transaction, which rolls back every partial change.
pub struct AssignmentService {
    db: DatabaseConnection,
    audit_logger: Arc<AuditLogger>,
    policy: Arc<dyn PolicyEvaluator>,
}

impl AssignmentService {
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

    /// Grant a position to a user.
    ///
    /// `start_date` defaults to today. Granting a position the user already
    /// holds is a no-op. For unique positions the previous holder's
    /// assignment is closed with `end_date = start_date - 1 day`, except the
    /// Super Admin position, which fails with a policy error naming the
    /// current holder until it is explicitly vacated.
    pub async fn assign_position(
        &self,
        ctx: &RequestContext,
        user_id: &str,
        position_id: &str,
        start_date: Option<NaiveDate>,
    ) -> Result<AssignmentOutcome, InternalError> {
        self.authorize(ctx, Action::AssignPosition, &Resource::Position(position_id.to_string()))
            .await?;

        let start = start_date.unwrap_or_else(|| Utc::now().date_naive());

        let txn = self
            .db
            .begin()
            .await
            .map_err(|source| DatabaseError::TransactionBegin { source })?;

        let outcome = match self.assign_in_txn(&txn, user_id, position_id, start).await {
            Ok(outcome) => outcome,
            Err(err) => {
                // Transaction dropped here, rolling back any closed rows
                self.audit_blocked(ctx, user_id, position_id, &err).await;
                return Err(err);
            }
        };

        txn.commit()
            .await
            .map_err(|source| DatabaseError::TransactionCommit { source })?;

        match &outcome {
            AssignmentOutcome::Granted { .. } => {
                self.audit(
                    self.audit_logger
                        .log_position_assigned(ctx, user_id, position_id, start)
                        .await,
                );
                tracing::info!(
                    "Position {} assigned to user {} effective {}",
                    position_id,
                    user_id,
                    start
                );
            }
            _ => {
                tracing::debug!(
                    "User {} already holds position {}, nothing to do",
                    user_id,
                    position_id
                );
            }
        }

        Ok(outcome)
    }

    /// Replace a user's current position, enforcing the single-active-position
    /// policy.
    ///
    /// `None` closes all of the user's current assignments without creating a
    /// new one. A position the user already holds is a no-op. Everything runs
    /// in one transaction spanning the close-all-then-assign sequence.
    pub async fn replace_current_position(
        &self,
        ctx: &RequestContext,
        user_id: &str,
        new_position_id: Option<&str>,
        start_date: Option<NaiveDate>,
    ) -> Result<AssignmentOutcome, InternalError> {
        self.authorize(ctx, Action::AssignPosition, &Resource::User(user_id.to_string()))
            .await?;

        let start = start_date.unwrap_or_else(|| Utc::now().date_naive());

        let txn = self
            .db
            .begin()
            .await
            .map_err(|source| DatabaseError::TransactionBegin { source })?;

        let (outcome, closed) = match self
            .replace_in_txn(&txn, user_id, new_position_id, start)
            .await
        {
            Ok(result) => result,
            Err(err) => {
                if let Some(position_id) = new_position_id {
                    self.audit_blocked(ctx, user_id, position_id, &err).await;
                }
                return Err(err);
            }
        };

        txn.commit()
            .await
            .map_err(|source| DatabaseError::TransactionCommit { source })?;

        if !closed.is_empty() {
            self.audit(
                self.audit_logger
                    .log_position_vacated(ctx, user_id, &closed)
                    .await,
            );
        }
        if let AssignmentOutcome::Granted { .. } = &outcome {
            // new_position_id is always present when a grant happened
            if let Some(position_id) = new_position_id {
                self.audit(
                    self.audit_logger
                        .log_position_assigned(ctx, user_id, position_id, start)
                        .await,
                );
                tracing::info!(
                    "User {} moved to position {} effective {}",
                    user_id,
                    position_id,
                    start
                );
            }
        }

        Ok(outcome)
    }

    /// Assignment step shared with the user lifecycle flows. Runs inside the
    /// caller's transaction; the caller owns commit and rollback.
    pub(crate) async fn assign_in_txn(
        &self,
        txn: &DatabaseTransaction,
        user_id: &str,
        position_id: &str,
        start: NaiveDate,
    ) -> Result<AssignmentOutcome, InternalError> {
        let position = PositionStore::find_by_id(txn, position_id)
            .await?
            .ok_or_else(|| PositionError::PositionNotFound {
                position_id: position_id.to_string(),
            })?;

        UserStore::find_by_id(txn, user_id)
            .await?
            .ok_or_else(|| UserError::UserIdNotFound {
                user_id: user_id.to_string(),
            })?;

        // Locking read: competing transfers serialize here instead of both
        // observing the position vacant
        let holders = AssignmentStore::current_for_position(txn, position_id).await?;

        if holders.iter().any(|a| a.user_id == user_id) {
            return Ok(AssignmentOutcome::AlreadyHeld);
        }

        if position.is_unique {
            if position.is_super_admin() {
                if let Some(holder) = holders.first() {
                    let holder_name = UserStore::find_by_id(txn, &holder.user_id)
                        .await?
                        .map(|u| u.name)
                        .unwrap_or_else(|| holder.user_id.clone());
                    return Err(PolicyError::SuperAdminOccupied {
                        holder: holder_name,
                    }
                    .into());
                }
            } else {
                let end = start - Duration::days(1);
                for holder in holders {
                    AssignmentStore::close(txn, holder, end).await?;
                }
            }
        }

        let assignment =
            AssignmentStore::insert_current(txn, user_id, position_id, start).await?;

        Ok(AssignmentOutcome::Granted {
            assignment_id: assignment.id,
        })
    }

    /// Replace step shared with the user lifecycle flows. Returns the outcome
    /// plus the ids of the assignments it closed.
    pub(crate) async fn replace_in_txn(
        &self,
        txn: &DatabaseTransaction,
        user_id: &str,
        new_position_id: Option<&str>,
        start: NaiveDate,
    ) -> Result<(AssignmentOutcome, Vec<i32>), InternalError> {
        UserStore::find_by_id(txn, user_id)
            .await?
            .ok_or_else(|| UserError::UserIdNotFound {
                user_id: user_id.to_string(),
            })?;

        // Validate the target before touching existing rows
        if let Some(position_id) = new_position_id {
            PositionStore::find_by_id(txn, position_id)
                .await?
                .ok_or_else(|| PositionError::PositionNotFound {
                    position_id: position_id.to_string(),
                })?;
        }

        let current = AssignmentStore::current_for_user(txn, user_id).await?;

        if let Some(position_id) = new_position_id {
            if current.iter().any(|a| a.position_id == position_id) {
                return Ok((AssignmentOutcome::AlreadyHeld, Vec::new()));
            }
        }

        // Moving the sole Super Admin holder onto another position would
        // leave the position without a holder; require an explicit vacate
        // first. Vacating (no new position) is the sanctioned hand-over step.
        if new_position_id.is_some() {
            for assignment in &current {
                let held = PositionStore::find_by_id(txn, &assignment.position_id)
                    .await?
                    .ok_or_else(|| PositionError::PositionNotFound {
                        position_id: assignment.position_id.clone(),
                    })?;

                if held.is_super_admin() {
                    let other_holders = AssignmentStore::current_for_position(txn, &held.id)
                        .await?
                        .into_iter()
                        .filter(|a| a.user_id != user_id)
                        .count();
                    if other_holders == 0 {
                        return Err(PolicyError::LastSuperAdminReassignment {
                            user_id: user_id.to_string(),
                        }
                        .into());
                    }
                }
            }
        }

        let end = start - Duration::days(1);
        let mut closed = Vec::with_capacity(current.len());
        for assignment in current {
            let assignment = AssignmentStore::close(txn, assignment, end).await?;
            closed.push(assignment.id);
        }

        let outcome = match new_position_id {
            Some(position_id) => self.assign_in_txn(txn, user_id, position_id, start).await?,
            None => AssignmentOutcome::Vacated {
                closed: closed.len(),
            },
        };

        Ok((outcome, closed))
    }

    async fn audit_blocked(
        &self,
        ctx: &RequestContext,
        user_id: &str,
        position_id: &str,
        err: &InternalError,
    ) {
        if let InternalError::Policy(policy_err) = err {
            self.audit(
                self.audit_logger
                    .log_assignment_blocked(ctx, user_id, position_id, &policy_err.to_string())
                    .await,
            );
        }
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

    /// Audit writes must not mask the operation result
    fn audit(&self, result: Result<(), InternalError>) {
        if let Err(e) = result {
            tracing::warn!("Audit write failed: {}", e);
        }
    }

    /// Convenience lookup for callers resolving the reserved position
    pub async fn find_super_admin_position(
        &self,
    ) -> Result<Option<position::Model>, InternalError> {
        PositionStore::find_by_code(&self.db, position::SUPER_ADMIN_CODE).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use migration::{AuditMigrator, GovernanceMigrator, MigratorTrait};
    use sea_orm::{ColumnTrait, Database, EntityTrait, QueryFilter};

    use crate::policy::RoleMatrix;
    use crate::stores::{AuditStore, PositionStore, UserStore};
    use crate::types::db::position_assignment::{self, Entity as PositionAssignment};

    async fn setup() -> (DatabaseConnection, AssignmentService) {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to create test database");
        GovernanceMigrator::up(&db, None)
            .await
            .expect("Failed to run migrations");

        let audit_db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to create audit test database");
        AuditMigrator::up(&audit_db, None)
            .await
            .expect("Failed to run audit migrations");

        let audit_logger = Arc::new(AuditLogger::new(Arc::new(AuditStore::new(audit_db))));
        let service = AssignmentService::new(
            db.clone(),
            audit_logger,
            Arc::new(RoleMatrix::default()),
        );

        (db, service)
    }

    async fn seed_user(db: &DatabaseConnection, name: &str) -> String {
        UserStore::insert(
            db,
            name.to_string(),
            format!("{}@example.org", name),
            name.to_string(),
            "hash".to_string(),
            None,
            "active".to_string(),
        )
        .await
        .expect("Failed to seed user")
        .id
    }

    async fn seed_position(
        db: &DatabaseConnection,
        name: &str,
        code: Option<&str>,
        is_unique: bool,
    ) -> String {
        PositionStore::create(db, name, code, is_unique, None)
            .await
            .expect("Failed to seed position")
            .id
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    async fn rows_for_position(
        db: &DatabaseConnection,
        position_id: &str,
    ) -> Vec<position_assignment::Model> {
        PositionAssignment::find()
            .filter(position_assignment::Column::PositionId.eq(position_id))
            .all(db)
            .await
            .expect("Failed to query assignments")
    }

    fn ctx() -> RequestContext {
        RequestContext::for_system("test")
    }

    #[tokio::test]
    async fn assigning_a_position_creates_a_current_assignment() {
        let (db, service) = setup().await;
        let alice = seed_user(&db, "alice").await;
        let registrar = seed_position(&db, "Registrar", None, true).await;

        let outcome = service
            .assign_position(&ctx(), &alice, &registrar, Some(date(2024, 1, 1)))
            .await
            .expect("assignment failed");

        assert!(matches!(outcome, AssignmentOutcome::Granted { .. }));

        let rows = rows_for_position(&db, &registrar).await;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].user_id, alice);
        assert!(rows[0].is_current);
        assert_eq!(rows[0].appointment_date, date(2024, 1, 1));
        assert_eq!(rows[0].end_date, None);
    }

    #[tokio::test]
    async fn assigning_a_held_position_is_a_noop() {
        let (db, service) = setup().await;
        let alice = seed_user(&db, "alice").await;
        let registrar = seed_position(&db, "Registrar", None, true).await;

        service
            .assign_position(&ctx(), &alice, &registrar, Some(date(2024, 1, 1)))
            .await
            .expect("first assignment failed");

        let outcome = service
            .assign_position(&ctx(), &alice, &registrar, Some(date(2024, 6, 1)))
            .await
            .expect("second assignment failed");

        assert_eq!(outcome, AssignmentOutcome::AlreadyHeld);

        // State is identical: one row, original appointment date, still open
        let rows = rows_for_position(&db, &registrar).await;
        assert_eq!(rows.len(), 1);
        assert!(rows[0].is_current);
        assert_eq!(rows[0].appointment_date, date(2024, 1, 1));
        assert_eq!(rows[0].end_date, None);
    }

    #[tokio::test]
    async fn unique_position_transfer_closes_the_previous_holder() {
        let (db, service) = setup().await;
        let alice = seed_user(&db, "alice").await;
        let bob = seed_user(&db, "bob").await;
        let registrar = seed_position(&db, "Registrar", None, true).await;

        service
            .assign_position(&ctx(), &alice, &registrar, Some(date(2024, 1, 1)))
            .await
            .expect("first assignment failed");
        service
            .assign_position(&ctx(), &bob, &registrar, Some(date(2024, 6, 1)))
            .await
            .expect("transfer failed");

        let rows = rows_for_position(&db, &registrar).await;
        assert_eq!(rows.len(), 2);

        let alice_row = rows.iter().find(|r| r.user_id == alice).unwrap();
        assert!(!alice_row.is_current);
        assert_eq!(alice_row.end_date, Some(date(2024, 5, 31)));

        let bob_row = rows.iter().find(|r| r.user_id == bob).unwrap();
        assert!(bob_row.is_current);
        assert_eq!(bob_row.appointment_date, date(2024, 6, 1));
        assert_eq!(bob_row.end_date, None);
    }

    #[tokio::test]
    async fn non_unique_position_keeps_other_holders_current() {
        let (db, service) = setup().await;
        let alice = seed_user(&db, "alice").await;
        let bob = seed_user(&db, "bob").await;
        let member = seed_position(&db, "Committee Member", None, false).await;

        service
            .assign_position(&ctx(), &alice, &member, Some(date(2024, 1, 1)))
            .await
            .expect("first assignment failed");
        service
            .assign_position(&ctx(), &bob, &member, Some(date(2024, 6, 1)))
            .await
            .expect("second assignment failed");

        let rows = rows_for_position(&db, &member).await;
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.is_current));
        assert!(rows.iter().all(|r| r.end_date.is_none()));
    }

    #[tokio::test]
    async fn super_admin_takeover_is_blocked_and_names_the_holder() {
        let (db, service) = setup().await;
        let alice = seed_user(&db, "alice").await;
        let bob = seed_user(&db, "bob").await;
        let super_admin =
            seed_position(&db, "Super Admin", Some(position::SUPER_ADMIN_CODE), true).await;

        service
            .assign_position(&ctx(), &alice, &super_admin, Some(date(2024, 1, 1)))
            .await
            .expect("initial super admin assignment failed");

        let result = service
            .assign_position(&ctx(), &bob, &super_admin, Some(date(2024, 6, 1)))
            .await;

        match result {
            Err(InternalError::Policy(PolicyError::SuperAdminOccupied { holder })) => {
                assert_eq!(holder, "alice");
            }
            other => panic!("Expected SuperAdminOccupied, got {:?}", other.map(|_| ())),
        }

        // Existing holder untouched, no partial rows for the challenger
        let rows = rows_for_position(&db, &super_admin).await;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].user_id, alice);
        assert!(rows[0].is_current);
        assert_eq!(rows[0].end_date, None);
    }

    #[tokio::test]
    async fn super_admin_grant_to_the_current_holder_is_a_noop() {
        let (db, service) = setup().await;
        let alice = seed_user(&db, "alice").await;
        let super_admin =
            seed_position(&db, "Super Admin", Some(position::SUPER_ADMIN_CODE), true).await;

        service
            .assign_position(&ctx(), &alice, &super_admin, Some(date(2024, 1, 1)))
            .await
            .expect("initial assignment failed");

        let outcome = service
            .assign_position(&ctx(), &alice, &super_admin, Some(date(2024, 6, 1)))
            .await
            .expect("repeat grant should be a no-op");

        assert_eq!(outcome, AssignmentOutcome::AlreadyHeld);
        assert_eq!(rows_for_position(&db, &super_admin).await.len(), 1);
    }

    #[tokio::test]
    async fn assigning_an_unknown_position_fails_with_not_found() {
        let (db, service) = setup().await;
        let alice = seed_user(&db, "alice").await;

        let result = service
            .assign_position(&ctx(), &alice, "missing-position", None)
            .await;

        assert!(matches!(
            result,
            Err(InternalError::Position(PositionError::PositionNotFound { .. }))
        ));
    }

    #[tokio::test]
    async fn assigning_to_an_unknown_user_fails_with_not_found() {
        let (db, service) = setup().await;
        let registrar = seed_position(&db, "Registrar", None, true).await;

        let result = service
            .assign_position(&ctx(), "missing-user", &registrar, None)
            .await;

        assert!(matches!(
            result,
            Err(InternalError::User(UserError::UserIdNotFound { .. }))
        ));
    }

    #[tokio::test]
    async fn replace_with_none_closes_every_current_assignment() {
        let (db, service) = setup().await;
        let alice = seed_user(&db, "alice").await;
        let registrar = seed_position(&db, "Registrar", None, true).await;

        service
            .assign_position(&ctx(), &alice, &registrar, Some(date(2024, 1, 1)))
            .await
            .expect("assignment failed");

        let outcome = service
            .replace_current_position(&ctx(), &alice, None, Some(date(2024, 6, 1)))
            .await
            .expect("vacate failed");

        assert_eq!(outcome, AssignmentOutcome::Vacated { closed: 1 });

        let rows = rows_for_position(&db, &registrar).await;
        assert_eq!(rows.len(), 1);
        assert!(!rows[0].is_current);
        assert_eq!(rows[0].end_date, Some(date(2024, 5, 31)));
    }

    #[tokio::test]
    async fn replace_moves_the_user_onto_the_new_position() {
        let (db, service) = setup().await;
        let alice = seed_user(&db, "alice").await;
        let registrar = seed_position(&db, "Registrar", None, true).await;
        let treasurer = seed_position(&db, "Treasurer", None, true).await;

        service
            .assign_position(&ctx(), &alice, &registrar, Some(date(2024, 1, 1)))
            .await
            .expect("assignment failed");

        let outcome = service
            .replace_current_position(&ctx(), &alice, Some(&treasurer), Some(date(2024, 6, 1)))
            .await
            .expect("replace failed");

        assert!(matches!(outcome, AssignmentOutcome::Granted { .. }));

        let registrar_rows = rows_for_position(&db, &registrar).await;
        assert!(!registrar_rows[0].is_current);
        assert_eq!(registrar_rows[0].end_date, Some(date(2024, 5, 31)));

        let treasurer_rows = rows_for_position(&db, &treasurer).await;
        assert_eq!(treasurer_rows.len(), 1);
        assert!(treasurer_rows[0].is_current);
        assert_eq!(treasurer_rows[0].appointment_date, date(2024, 6, 1));
    }

    #[tokio::test]
    async fn replace_with_a_held_position_is_a_noop() {
        let (db, service) = setup().await;
        let alice = seed_user(&db, "alice").await;
        let registrar = seed_position(&db, "Registrar", None, true).await;

        service
            .assign_position(&ctx(), &alice, &registrar, Some(date(2024, 1, 1)))
            .await
            .expect("assignment failed");

        let outcome = service
            .replace_current_position(&ctx(), &alice, Some(&registrar), Some(date(2024, 6, 1)))
            .await
            .expect("replace failed");

        assert_eq!(outcome, AssignmentOutcome::AlreadyHeld);

        let rows = rows_for_position(&db, &registrar).await;
        assert_eq!(rows.len(), 1);
        assert!(rows[0].is_current);
        assert_eq!(rows[0].appointment_date, date(2024, 1, 1));
        assert_eq!(rows[0].end_date, None);
    }

    #[tokio::test]
    async fn sole_super_admin_cannot_be_moved_onto_another_position() {
        let (db, service) = setup().await;
        let alice = seed_user(&db, "alice").await;
        let super_admin =
            seed_position(&db, "Super Admin", Some(position::SUPER_ADMIN_CODE), true).await;
        let registrar = seed_position(&db, "Registrar", None, true).await;

        service
            .assign_position(&ctx(), &alice, &super_admin, Some(date(2024, 1, 1)))
            .await
            .expect("initial assignment failed");

        let result = service
            .replace_current_position(&ctx(), &alice, Some(&registrar), Some(date(2024, 6, 1)))
            .await;

        assert!(matches!(
            result,
            Err(InternalError::Policy(
                PolicyError::LastSuperAdminReassignment { .. }
            ))
        ));

        // The holding is untouched
        let rows = rows_for_position(&db, &super_admin).await;
        assert_eq!(rows.len(), 1);
        assert!(rows[0].is_current);
        assert!(rows_for_position(&db, &registrar).await.is_empty());
    }

    #[tokio::test]
    async fn vacated_super_admin_position_can_be_reassigned() {
        let (db, service) = setup().await;
        let alice = seed_user(&db, "alice").await;
        let bob = seed_user(&db, "bob").await;
        let super_admin =
            seed_position(&db, "Super Admin", Some(position::SUPER_ADMIN_CODE), true).await;

        service
            .assign_position(&ctx(), &alice, &super_admin, Some(date(2024, 1, 1)))
            .await
            .expect("initial assignment failed");

        // Explicit vacate is the sanctioned hand-over step
        service
            .replace_current_position(&ctx(), &alice, None, Some(date(2024, 6, 1)))
            .await
            .expect("vacate failed");

        let outcome = service
            .assign_position(&ctx(), &bob, &super_admin, Some(date(2024, 6, 1)))
            .await
            .expect("handover assignment failed");

        assert!(matches!(outcome, AssignmentOutcome::Granted { .. }));

        let rows = rows_for_position(&db, &super_admin).await;
        assert_eq!(rows.len(), 2);
        let current: Vec<_> = rows.iter().filter(|r| r.is_current).collect();
        assert_eq!(current.len(), 1);
        assert_eq!(current[0].user_id, bob);
    }

    #[tokio::test]
    async fn reappointment_creates_a_fresh_row_instead_of_reopening() {
        let (db, service) = setup().await;
        let alice = seed_user(&db, "alice").await;
        let bob = seed_user(&db, "bob").await;
        let registrar = seed_position(&db, "Registrar", None, true).await;

        service
            .assign_position(&ctx(), &alice, &registrar, Some(date(2024, 1, 1)))
            .await
            .expect("assignment failed");
        service
            .assign_position(&ctx(), &bob, &registrar, Some(date(2024, 6, 1)))
            .await
            .expect("transfer failed");
        service
            .assign_position(&ctx(), &alice, &registrar, Some(date(2025, 1, 1)))
            .await
            .expect("reappointment failed");

        let rows = rows_for_position(&db, &registrar).await;
        assert_eq!(rows.len(), 3);

        let alice_rows: Vec<_> = rows.iter().filter(|r| r.user_id == alice).collect();
        assert_eq!(alice_rows.len(), 2);

        // The old row stays closed with its original dates
        let closed = alice_rows.iter().find(|r| !r.is_current).unwrap();
        assert_eq!(closed.appointment_date, date(2024, 1, 1));
        assert_eq!(closed.end_date, Some(date(2024, 5, 31)));

        let reopened = alice_rows.iter().find(|r| r.is_current).unwrap();
        assert_eq!(reopened.appointment_date, date(2025, 1, 1));

        // Exactly one current holder for the unique position
        assert_eq!(rows.iter().filter(|r| r.is_current).count(), 1);
    }

    #[tokio::test]
    async fn api_actor_without_a_grant_is_denied() {
        let (db, service) = setup().await;
        let alice = seed_user(&db, "alice").await;
        let registrar = seed_position(&db, "Registrar", None, true).await;

        let actor = crate::policy::Actor::new("outsider", vec!["secretary".to_string()]);
        let api_ctx = RequestContext::for_api(actor, None);

        let result = service
            .assign_position(&api_ctx, &alice, &registrar, None)
            .await;

        assert!(matches!(
            result,
            Err(InternalError::Policy(PolicyError::ActionDenied { .. }))
        ));
        assert!(rows_for_position(&db, &registrar).await.is_empty());
    }
}
