use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create meetings table
        manager
            .create_table(
                Table::create()
                    .table(Meetings::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Meetings::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Meetings::Title).string().not_null())
                    .col(ColumnDef::new(Meetings::ScheduledFor).big_integer().not_null())
                    .col(ColumnDef::new(Meetings::Location).string())
                    .col(ColumnDef::new(Meetings::Status).string().not_null().default("scheduled"))
                    .col(ColumnDef::new(Meetings::ConvenedBy).string())
                    .col(ColumnDef::new(Meetings::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Meetings::UpdatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_meetings_convened_by")
                            .from(Meetings::Table, Meetings::ConvenedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // Create meeting_participants table.
        // A participant is either an internal user (user_id set) or an
        // external guest (guest_* columns set); participant_type tags which.
        manager
            .create_table(
                Table::create()
                    .table(MeetingParticipants::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MeetingParticipants::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(MeetingParticipants::MeetingId).string().not_null())
                    .col(ColumnDef::new(MeetingParticipants::ParticipantType).string().not_null())
                    .col(ColumnDef::new(MeetingParticipants::UserId).string())
                    .col(ColumnDef::new(MeetingParticipants::GuestName).string())
                    .col(ColumnDef::new(MeetingParticipants::GuestEmail).string())
                    .col(ColumnDef::new(MeetingParticipants::GuestOrganization).string())
                    .col(ColumnDef::new(MeetingParticipants::Role).string().not_null())
                    .col(ColumnDef::new(MeetingParticipants::CreatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_meeting_participants_meeting_id")
                            .from(MeetingParticipants::Table, MeetingParticipants::MeetingId)
                            .to(Meetings::Table, Meetings::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_meeting_participants_user_id")
                            .from(MeetingParticipants::Table, MeetingParticipants::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_meeting_participants_meeting_id")
                    .table(MeetingParticipants::Table)
                    .col(MeetingParticipants::MeetingId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(MeetingParticipants::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Meetings::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Meetings {
    Table,
    Id,
    Title,
    ScheduledFor,
    Location,
    Status,
    ConvenedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum MeetingParticipants {
    Table,
    Id,
    MeetingId,
    ParticipantType,
    UserId,
    GuestName,
    GuestEmail,
    GuestOrganization,
    Role,
    CreatedAt,
}
