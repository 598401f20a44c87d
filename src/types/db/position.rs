use sea_orm::entity::prelude::*;

/// Reserved code for the protected Super Admin position.
pub const SUPER_ADMIN_CODE: &str = "super_admin";

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "positions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,

    // Reserved codes identify protected positions; most positions have none
    #[sea_orm(unique)]
    pub code: Option<String>,

    // At most one current holder system-wide when set
    pub is_unique: bool,

    // Coarse permission-role grouping consumed by the policy matrix
    pub role: Option<String>,

    pub created_at: i64,
    pub updated_at: i64,
}

impl Model {
    pub fn is_super_admin(&self) -> bool {
        self.code.as_deref() == Some(SUPER_ADMIN_CODE)
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
