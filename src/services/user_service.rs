use std::sync::Arc;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHasher};
use chrono::Utc;
use sea_orm::{DatabaseConnection, TransactionTrait};

use crate::audit::AuditLogger;
use crate::errors::internal::{DatabaseError, PolicyError, PositionError, UserError};
use crate::errors::InternalError;
use crate::policy::{self, Action, PolicyEvaluator, Resource};
use crate::services::AssignmentService;
use crate::stores::{AssignmentStore, PositionStore, UserStore};
use crate::types::db::user;
use crate::types::dto::{NewUser, PositionChange, UserUpdate};
use crate::types::internal::{AssignmentOutcome, RequestContext};

/// User lifecycle manager.
///
/// Creates, updates, and soft-deletes user records, delegating position
/// changes to the assignment engine inside the same transaction and
/// enforcing the last-Super-Admin deletion guard.
pub struct UserService {
    db: DatabaseConnection,
    audit_logger: Arc<AuditLogger>,
    policy: Arc<dyn PolicyEvaluator>,
    assignments: Arc<AssignmentService>,
}

impl UserService {
    pub fn new(
        db: DatabaseConnection,
        audit_logger: Arc<AuditLogger>,
        policy: Arc<dyn PolicyEvaluator>,
        assignments: Arc<AssignmentService>,
    ) -> Self {
        Self {
            db,
            audit_logger,
            policy,
            assignments,
        }
    }

    pub async fn get_user(
        &self,
        user_id: &str,
    ) -> Result<Option<user::Model>, InternalError> {
        UserStore::find_by_id(&self.db, user_id).await
    }

    /// Create a user, optionally granting an initial position in the same
    /// transaction.
    pub async fn create_user(
        &self,
        ctx: &RequestContext,
        input: NewUser,
    ) -> Result<user::Model, InternalError> {
        self.authorize(ctx, Action::CreateUser, &Resource::System)
            .await?;

        let password_hash = hash_password(&input.password)?;

        let txn = self
            .db
            .begin()
            .await
            .map_err(|source| DatabaseError::TransactionBegin { source })?;

        if UserStore::username_exists(&txn, &input.username).await? {
            return Err(UserError::DuplicateUsername {
                username: input.username,
            }
            .into());
        }
        if UserStore::email_exists(&txn, &input.email).await? {
            return Err(UserError::DuplicateEmail { email: input.email }.into());
        }

        let created = UserStore::insert(
            &txn,
            input.name,
            input.email,
            input.username,
            password_hash,
            input.phone,
            input
                .employment_status
                .unwrap_or_else(|| "active".to_string()),
        )
        .await?;

        let mut granted_position = None;
        if let Some(position_id) = &input.position_id {
            let start = input
                .appointment_date
                .unwrap_or_else(|| Utc::now().date_naive());
            let outcome = self
                .assignments
                .assign_in_txn(&txn, &created.id, position_id, start)
                .await?;
            if let AssignmentOutcome::Granted { .. } = outcome {
                granted_position = Some((position_id.clone(), start));
            }
        }

        txn.commit()
            .await
            .map_err(|source| DatabaseError::TransactionCommit { source })?;

        self.audit(
            self.audit_logger
                .log_user_created(ctx, &created.id, &created.username)
                .await,
        );
        if let Some((position_id, start)) = granted_position {
            self.audit(
                self.audit_logger
                    .log_position_assigned(ctx, &created.id, &position_id, start)
                    .await,
            );
        }

        tracing::info!("User {} created by {}", created.id, ctx.actor_id);

        Ok(created)
    }

    /// Update a user record. Field changes and the position change run in
    /// one transaction.
    pub async fn update_user(
        &self,
        ctx: &RequestContext,
        user_id: &str,
        update: UserUpdate,
    ) -> Result<user::Model, InternalError> {
        self.authorize(ctx, Action::UpdateUser, &Resource::User(user_id.to_string()))
            .await?;

        let txn = self
            .db
            .begin()
            .await
            .map_err(|source| DatabaseError::TransactionBegin { source })?;

        let existing = UserStore::find_by_id(&txn, user_id)
            .await?
            .ok_or_else(|| UserError::UserIdNotFound {
                user_id: user_id.to_string(),
            })?;

        if let Some(email) = &update.email {
            if *email != existing.email && UserStore::email_exists(&txn, email).await? {
                return Err(UserError::DuplicateEmail {
                    email: email.clone(),
                }
                .into());
            }
        }

        let changed_fields = changed_field_names(&update);
        let updated = UserStore::apply_update(&txn, existing, &update).await?;

        let mut position_audit = None;
        match &update.position {
            PositionChange::Unchanged => {}
            PositionChange::Vacate => {
                let start = Utc::now().date_naive();
                let (_, closed) = self
                    .assignments
                    .replace_in_txn(&txn, user_id, None, start)
                    .await?;
                position_audit = Some((None, closed, start));
            }
            PositionChange::Assign {
                position_id,
                start_date,
            } => {
                let start = start_date.unwrap_or_else(|| Utc::now().date_naive());
                let (outcome, closed) = self
                    .assignments
                    .replace_in_txn(&txn, user_id, Some(position_id), start)
                    .await?;
                if let AssignmentOutcome::Granted { .. } = outcome {
                    position_audit = Some((Some(position_id.clone()), closed, start));
                }
            }
        }

        txn.commit()
            .await
            .map_err(|source| DatabaseError::TransactionCommit { source })?;

        self.audit(
            self.audit_logger
                .log_user_updated(ctx, user_id, &changed_fields)
                .await,
        );
        if let Some((assigned, closed, start)) = position_audit {
            if !closed.is_empty() {
                self.audit(
                    self.audit_logger
                        .log_position_vacated(ctx, user_id, &closed)
                        .await,
                );
            }
            if let Some(position_id) = assigned {
                self.audit(
                    self.audit_logger
                        .log_position_assigned(ctx, user_id, &position_id, start)
                        .await,
                );
            }
        }

        Ok(updated)
    }

    /// Soft-delete a user.
    ///
    /// Blocked when the user is the only current Super Admin. Otherwise the
    /// record is marked deleted, its current assignments are closed so any
    /// unique positions are freed for reappointment, and the full assignment
    /// history stays in place.
    pub async fn delete_user(
        &self,
        ctx: &RequestContext,
        user_id: &str,
    ) -> Result<(), InternalError> {
        self.authorize(ctx, Action::DeleteUser, &Resource::User(user_id.to_string()))
            .await?;

        let txn = self
            .db
            .begin()
            .await
            .map_err(|source| DatabaseError::TransactionBegin { source })?;

        let existing = UserStore::find_by_id(&txn, user_id)
            .await?
            .ok_or_else(|| UserError::UserIdNotFound {
                user_id: user_id.to_string(),
            })?;

        let current = AssignmentStore::current_for_user(&txn, user_id).await?;

        for assignment in &current {
            let held = PositionStore::find_by_id(&txn, &assignment.position_id)
                .await?
                .ok_or_else(|| PositionError::PositionNotFound {
                    position_id: assignment.position_id.clone(),
                })?;

            if held.is_super_admin() {
                let holders =
                    AssignmentStore::count_current_for_position(&txn, &held.id).await?;
                if holders <= 1 {
                    let err = PolicyError::LastSuperAdminDeletion {
                        user_id: user_id.to_string(),
                    };
                    self.audit(
                        self.audit_logger
                            .log_user_deletion_blocked(ctx, user_id, &err.to_string())
                            .await,
                    );
                    return Err(err.into());
                }
            }
        }

        let today = Utc::now().date_naive();
        for assignment in current {
            AssignmentStore::close(&txn, assignment, today).await?;
        }

        UserStore::soft_delete(&txn, existing).await?;

        txn.commit()
            .await
            .map_err(|source| DatabaseError::TransactionCommit { source })?;

        self.audit(self.audit_logger.log_user_deleted(ctx, user_id).await);

        tracing::info!("User {} deleted by {}", user_id, ctx.actor_id);

        Ok(())
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

fn changed_field_names(update: &UserUpdate) -> Vec<&'static str> {
    let mut fields = Vec::new();
    if update.name.is_some() {
        fields.push("name");
    }
    if update.email.is_some() {
        fields.push("email");
    }
    if update.phone.is_some() {
        fields.push("phone");
    }
    if update.employment_status.is_some() {
        fields.push("employment_status");
    }
    if update.position != PositionChange::Unchanged {
        fields.push("position");
    }
    fields
}

fn hash_password(password: &str) -> Result<String, InternalError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| InternalError::crypto("hash_password", e.to_string()))?;
    Ok(hash.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use migration::{AuditMigrator, GovernanceMigrator, MigratorTrait};
    use sea_orm::{ColumnTrait, Database, EntityTrait, QueryFilter};

    use crate::policy::{Actor, RoleMatrix};
    use crate::stores::AuditStore;
    use crate::types::db::position;
    use crate::types::db::position_assignment::{self, Entity as PositionAssignment};
    use crate::types::db::user::Entity as User;

    async fn setup() -> (DatabaseConnection, UserService) {
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
        let policy: Arc<dyn PolicyEvaluator> = Arc::new(RoleMatrix::default());
        let assignments = Arc::new(AssignmentService::new(
            db.clone(),
            audit_logger.clone(),
            policy.clone(),
        ));
        let service = UserService::new(db.clone(), audit_logger, policy, assignments);

        (db, service)
    }

    fn ctx() -> RequestContext {
        RequestContext::for_system("test")
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn new_user(name: &str) -> NewUser {
        NewUser {
            name: name.to_string(),
            email: format!("{}@example.org", name),
            username: name.to_string(),
            password: "correct horse battery staple".to_string(),
            phone: None,
            employment_status: None,
            position_id: None,
            appointment_date: None,
        }
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

    async fn assignments_of(
        db: &DatabaseConnection,
        user_id: &str,
    ) -> Vec<position_assignment::Model> {
        PositionAssignment::find()
            .filter(position_assignment::Column::UserId.eq(user_id))
            .all(db)
            .await
            .expect("Failed to query assignments")
    }

    #[tokio::test]
    async fn create_user_persists_record_and_hashes_password() {
        let (db, service) = setup().await;

        let created = service
            .create_user(&ctx(), new_user("alice"))
            .await
            .expect("create failed");

        assert_eq!(created.employment_status, "active");
        assert_ne!(created.password_hash, "correct horse battery staple");
        assert!(created.password_hash.starts_with("$argon2"));

        let stored = User::find_by_id(&created.id)
            .one(&db)
            .await
            .expect("query failed")
            .expect("user missing");
        assert_eq!(stored.username, "alice");
        assert!(!stored.is_deleted());
    }

    #[tokio::test]
    async fn create_user_grants_the_initial_position() {
        let (db, service) = setup().await;
        let registrar = seed_position(&db, "Registrar", None, true).await;

        let mut input = new_user("alice");
        input.position_id = Some(registrar.clone());
        input.appointment_date = Some(date(2024, 1, 1));

        let created = service
            .create_user(&ctx(), input)
            .await
            .expect("create failed");

        let rows = assignments_of(&db, &created.id).await;
        assert_eq!(rows.len(), 1);
        assert!(rows[0].is_current);
        assert_eq!(rows[0].position_id, registrar);
        assert_eq!(rows[0].appointment_date, date(2024, 1, 1));
    }

    #[tokio::test]
    async fn create_user_rejects_duplicate_username() {
        let (_db, service) = setup().await;

        service
            .create_user(&ctx(), new_user("alice"))
            .await
            .expect("first create failed");

        let mut second = new_user("alice");
        second.email = "other@example.org".to_string();
        let result = service.create_user(&ctx(), second).await;

        assert!(matches!(
            result,
            Err(InternalError::User(UserError::DuplicateUsername { .. }))
        ));
    }

    #[tokio::test]
    async fn create_user_rejects_duplicate_email() {
        let (_db, service) = setup().await;

        service
            .create_user(&ctx(), new_user("alice"))
            .await
            .expect("first create failed");

        let mut second = new_user("alicia");
        second.email = "alice@example.org".to_string();
        let result = service.create_user(&ctx(), second).await;

        assert!(matches!(
            result,
            Err(InternalError::User(UserError::DuplicateEmail { .. }))
        ));
    }

    #[tokio::test]
    async fn deleting_the_sole_super_admin_is_blocked() {
        let (db, service) = setup().await;
        let super_admin =
            seed_position(&db, "Super Admin", Some(position::SUPER_ADMIN_CODE), true).await;

        let mut input = new_user("alice");
        input.position_id = Some(super_admin);
        let created = service
            .create_user(&ctx(), input)
            .await
            .expect("create failed");

        let result = service.delete_user(&ctx(), &created.id).await;

        assert!(matches!(
            result,
            Err(InternalError::Policy(
                PolicyError::LastSuperAdminDeletion { .. }
            ))
        ));

        // The record remains undeleted and the holding is untouched
        let user = service
            .get_user(&created.id)
            .await
            .expect("query failed")
            .expect("user should still exist");
        assert!(!user.is_deleted());

        let rows = assignments_of(&db, &created.id).await;
        assert_eq!(rows.len(), 1);
        assert!(rows[0].is_current);
    }

    #[tokio::test]
    async fn deleting_a_regular_user_soft_deletes_and_closes_assignments() {
        let (db, service) = setup().await;
        let registrar = seed_position(&db, "Registrar", None, true).await;

        let mut input = new_user("alice");
        input.position_id = Some(registrar);
        let created = service
            .create_user(&ctx(), input)
            .await
            .expect("create failed");

        service
            .delete_user(&ctx(), &created.id)
            .await
            .expect("delete failed");

        // Hidden from lookups, but the row and its history survive
        assert!(service
            .get_user(&created.id)
            .await
            .expect("query failed")
            .is_none());

        let raw = User::find_by_id(&created.id)
            .one(&db)
            .await
            .expect("query failed")
            .expect("row should survive soft delete");
        assert!(raw.is_deleted());

        let rows = assignments_of(&db, &created.id).await;
        assert_eq!(rows.len(), 1);
        assert!(!rows[0].is_current);
        assert!(rows[0].end_date.is_some());
    }

    #[tokio::test]
    async fn deleting_an_unknown_user_fails_with_not_found() {
        let (_db, service) = setup().await;

        let result = service.delete_user(&ctx(), "missing-user").await;

        assert!(matches!(
            result,
            Err(InternalError::User(UserError::UserIdNotFound { .. }))
        ));
    }

    #[tokio::test]
    async fn update_user_applies_field_changes() {
        let (_db, service) = setup().await;
        let created = service
            .create_user(&ctx(), new_user("alice"))
            .await
            .expect("create failed");

        let update = UserUpdate {
            name: Some("Alice Smith".to_string()),
            phone: Some("555-0100".to_string()),
            employment_status: Some("on_leave".to_string()),
            ..Default::default()
        };

        let updated = service
            .update_user(&ctx(), &created.id, update)
            .await
            .expect("update failed");

        assert_eq!(updated.name, "Alice Smith");
        assert_eq!(updated.phone.as_deref(), Some("555-0100"));
        assert_eq!(updated.employment_status, "on_leave");
        assert_eq!(updated.email, "alice@example.org");
    }

    #[tokio::test]
    async fn update_user_switches_the_position_in_one_transaction() {
        let (db, service) = setup().await;
        let registrar = seed_position(&db, "Registrar", None, true).await;
        let treasurer = seed_position(&db, "Treasurer", None, true).await;

        let mut input = new_user("alice");
        input.position_id = Some(registrar.clone());
        input.appointment_date = Some(date(2024, 1, 1));
        let created = service
            .create_user(&ctx(), input)
            .await
            .expect("create failed");

        let update = UserUpdate {
            position: PositionChange::Assign {
                position_id: treasurer.clone(),
                start_date: Some(date(2024, 6, 1)),
            },
            ..Default::default()
        };
        service
            .update_user(&ctx(), &created.id, update)
            .await
            .expect("update failed");

        let rows = assignments_of(&db, &created.id).await;
        assert_eq!(rows.len(), 2);

        let old = rows.iter().find(|r| r.position_id == registrar).unwrap();
        assert!(!old.is_current);
        assert_eq!(old.end_date, Some(date(2024, 5, 31)));

        let new = rows.iter().find(|r| r.position_id == treasurer).unwrap();
        assert!(new.is_current);
        assert_eq!(new.appointment_date, date(2024, 6, 1));
    }

    #[tokio::test]
    async fn update_user_vacates_the_position() {
        let (db, service) = setup().await;
        let registrar = seed_position(&db, "Registrar", None, true).await;

        let mut input = new_user("alice");
        input.position_id = Some(registrar);
        let created = service
            .create_user(&ctx(), input)
            .await
            .expect("create failed");

        let update = UserUpdate {
            position: PositionChange::Vacate,
            ..Default::default()
        };
        service
            .update_user(&ctx(), &created.id, update)
            .await
            .expect("update failed");

        let rows = assignments_of(&db, &created.id).await;
        assert_eq!(rows.len(), 1);
        assert!(!rows[0].is_current);
    }

    #[tokio::test]
    async fn api_actor_without_a_grant_cannot_create_users() {
        let (_db, service) = setup().await;

        let actor = Actor::new("outsider", vec![]);
        let api_ctx = RequestContext::for_api(actor, None);

        let result = service.create_user(&api_ctx, new_user("alice")).await;

        assert!(matches!(
            result,
            Err(InternalError::Policy(PolicyError::ActionDenied { .. }))
        ));
    }

    #[tokio::test]
    async fn registrar_role_can_create_but_not_delete() {
        let (_db, service) = setup().await;

        let actor = Actor::new("registrar-1", vec!["registrar".to_string()]);
        let api_ctx = RequestContext::for_api(actor, None);

        let created = service
            .create_user(&api_ctx, new_user("alice"))
            .await
            .expect("registrar should be able to create users");

        let result = service.delete_user(&api_ctx, &created.id).await;
        assert!(matches!(
            result,
            Err(InternalError::Policy(PolicyError::ActionDenied { .. }))
        ));
    }
}
