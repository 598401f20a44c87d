use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create users table
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Users::Name).string().not_null())
                    .col(ColumnDef::new(Users::Email).string().not_null().unique_key())
                    .col(ColumnDef::new(Users::Username).string().not_null().unique_key())
                    .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                    .col(ColumnDef::new(Users::Phone).string())
                    .col(ColumnDef::new(Users::EmploymentStatus).string().not_null().default("active"))
                    .col(ColumnDef::new(Users::DeletedAt).big_integer())
                    .col(ColumnDef::new(Users::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Users::UpdatedAt).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        // Create positions table
        manager
            .create_table(
                Table::create()
                    .table(Positions::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Positions::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Positions::Name).string().not_null())
                    .col(ColumnDef::new(Positions::Code).string().unique_key())
                    .col(ColumnDef::new(Positions::IsUnique).boolean().not_null().default(false))
                    .col(ColumnDef::new(Positions::Role).string())
                    .col(ColumnDef::new(Positions::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Positions::UpdatedAt).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        // Create position_assignments table (append-only holding history)
        manager
            .create_table(
                Table::create()
                    .table(PositionAssignments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PositionAssignments::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PositionAssignments::UserId).string().not_null())
                    .col(ColumnDef::new(PositionAssignments::PositionId).string().not_null())
                    .col(ColumnDef::new(PositionAssignments::AppointmentDate).date().not_null())
                    .col(ColumnDef::new(PositionAssignments::EndDate).date())
                    .col(ColumnDef::new(PositionAssignments::IsCurrent).boolean().not_null().default(true))
                    .col(ColumnDef::new(PositionAssignments::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(PositionAssignments::UpdatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_position_assignments_user_id")
                            .from(PositionAssignments::Table, PositionAssignments::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_position_assignments_position_id")
                            .from(PositionAssignments::Table, PositionAssignments::PositionId)
                            .to(Positions::Table, Positions::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // Indexes for the current-holder lookups
        manager
            .create_index(
                Index::create()
                    .name("idx_position_assignments_position_current")
                    .table(PositionAssignments::Table)
                    .col(PositionAssignments::PositionId)
                    .col(PositionAssignments::IsCurrent)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_position_assignments_user_current")
                    .table(PositionAssignments::Table)
                    .col(PositionAssignments::UserId)
                    .col(PositionAssignments::IsCurrent)
                    .to_owned(),
            )
            .await?;

        // Partial unique index backing the single-active-position policy.
        // Raw SQL: sea-query's index builder has no WHERE clause; the statement
        // below is valid on both SQLite and PostgreSQL.
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE UNIQUE INDEX IF NOT EXISTS uniq_position_assignments_user_is_current \
                 ON position_assignments (user_id) WHERE is_current",
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PositionAssignments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Positions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Name,
    Email,
    Username,
    PasswordHash,
    Phone,
    EmploymentStatus,
    DeletedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Positions {
    Table,
    Id,
    Name,
    Code,
    IsUnique,
    Role,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum PositionAssignments {
    Table,
    Id,
    UserId,
    PositionId,
    AppointmentDate,
    EndDate,
    IsCurrent,
    CreatedAt,
    UpdatedAt,
}
