use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set,
};
use uuid::Uuid;

use crate::errors::internal::PositionError;
use crate::errors::InternalError;
use crate::types::db::position::{self, Entity as Position};

/// Data access for position records
pub struct PositionStore;

impl PositionStore {
    pub async fn find_by_id<C: ConnectionTrait>(
        conn: &C,
        position_id: &str,
    ) -> Result<Option<position::Model>, InternalError> {
        Position::find_by_id(position_id)
            .one(conn)
            .await
            .map_err(|e| InternalError::database("find_position_by_id", e))
    }

    pub async fn find_by_code<C: ConnectionTrait>(
        conn: &C,
        code: &str,
    ) -> Result<Option<position::Model>, InternalError> {
        Position::find()
            .filter(position::Column::Code.eq(code))
            .one(conn)
            .await
            .map_err(|e| InternalError::database("find_position_by_code", e))
    }

    /// Create a position slot. Codes are reserved identifiers and must be
    /// unique when present.
    pub async fn create<C: ConnectionTrait>(
        conn: &C,
        name: &str,
        code: Option<&str>,
        is_unique: bool,
        role: Option<&str>,
    ) -> Result<position::Model, InternalError> {
        if let Some(code) = code {
            if Self::find_by_code(conn, code).await?.is_some() {
                return Err(PositionError::DuplicateCode {
                    code: code.to_string(),
                }
                .into());
            }
        }

        let now = Utc::now().timestamp();

        let new_position = position::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            name: Set(name.to_string()),
            code: Set(code.map(str::to_string)),
            is_unique: Set(is_unique),
            role: Set(role.map(str::to_string)),
            created_at: Set(now),
            updated_at: Set(now),
        };

        new_position
            .insert(conn)
            .await
            .map_err(|e| InternalError::database("insert_position", e))
    }
}
