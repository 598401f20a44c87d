use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set,
};
use uuid::Uuid;

use crate::errors::InternalError;
use crate::types::db::user::{self, Entity as User};
use crate::types::dto::UserUpdate;

/// Data access for user records
pub struct UserStore;

impl UserStore {
    /// Find a user by id, excluding soft-deleted rows
    pub async fn find_by_id<C: ConnectionTrait>(
        conn: &C,
        user_id: &str,
    ) -> Result<Option<user::Model>, InternalError> {
        User::find_by_id(user_id)
            .filter(user::Column::DeletedAt.is_null())
            .one(conn)
            .await
            .map_err(|e| InternalError::database("find_user_by_id", e))
    }

    pub async fn username_exists<C: ConnectionTrait>(
        conn: &C,
        username: &str,
    ) -> Result<bool, InternalError> {
        let existing = User::find()
            .filter(user::Column::Username.eq(username))
            .one(conn)
            .await
            .map_err(|e| InternalError::database("find_user_by_username", e))?;

        Ok(existing.is_some())
    }

    pub async fn email_exists<C: ConnectionTrait>(
        conn: &C,
        email: &str,
    ) -> Result<bool, InternalError> {
        let existing = User::find()
            .filter(user::Column::Email.eq(email))
            .one(conn)
            .await
            .map_err(|e| InternalError::database("find_user_by_email", e))?;

        Ok(existing.is_some())
    }

    /// Insert a new user row with an already-hashed password
    pub async fn insert<C: ConnectionTrait>(
        conn: &C,
        name: String,
        email: String,
        username: String,
        password_hash: String,
        phone: Option<String>,
        employment_status: String,
    ) -> Result<user::Model, InternalError> {
        let now = Utc::now().timestamp();

        let new_user = user::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            name: Set(name),
            email: Set(email),
            username: Set(username),
            password_hash: Set(password_hash),
            phone: Set(phone),
            employment_status: Set(employment_status),
            deleted_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        new_user
            .insert(conn)
            .await
            .map_err(|e| InternalError::database("insert_user", e))
    }

    /// Apply the non-position fields of an update to a user row
    pub async fn apply_update<C: ConnectionTrait>(
        conn: &C,
        model: user::Model,
        update: &UserUpdate,
    ) -> Result<user::Model, InternalError> {
        let mut active: user::ActiveModel = model.into();

        if let Some(name) = &update.name {
            active.name = Set(name.clone());
        }
        if let Some(email) = &update.email {
            active.email = Set(email.clone());
        }
        if let Some(phone) = &update.phone {
            active.phone = Set(Some(phone.clone()));
        }
        if let Some(status) = &update.employment_status {
            active.employment_status = Set(status.clone());
        }
        active.updated_at = Set(Utc::now().timestamp());

        active
            .update(conn)
            .await
            .map_err(|e| InternalError::database("update_user", e))
    }

    /// Soft-delete a user row; assignment history stays in place
    pub async fn soft_delete<C: ConnectionTrait>(
        conn: &C,
        model: user::Model,
    ) -> Result<user::Model, InternalError> {
        let now = Utc::now().timestamp();

        let mut active: user::ActiveModel = model.into();
        active.deleted_at = Set(Some(now));
        active.updated_at = Set(now);

        active
            .update(conn)
            .await
            .map_err(|e| InternalError::database("soft_delete_user", e))
    }
}
