use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    #[sea_orm(unique)]
    pub email: String,
    #[sea_orm(unique)]
    pub username: String,
    pub password_hash: String,
    pub phone: Option<String>,
    pub employment_status: String,

    // Soft delete marker; the row and its assignment history survive
    pub deleted_at: Option<i64>,

    pub created_at: i64,
    pub updated_at: i64,
}

impl Model {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::position_assignment::Entity")]
    PositionAssignments,
}

impl Related<super::position_assignment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PositionAssignments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
