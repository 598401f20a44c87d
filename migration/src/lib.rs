pub use sea_orm_migration::prelude::*;

mod m20250310_000001_create_governance_schema;
mod m20250310_000002_create_meeting_schema;
mod m20250310_000003_create_audit_schema;

pub struct GovernanceMigrator;

#[async_trait::async_trait]
impl MigratorTrait for GovernanceMigrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250310_000001_create_governance_schema::Migration),
            Box::new(m20250310_000002_create_meeting_schema::Migration),
        ]
    }
}

pub struct AuditMigrator;

#[async_trait::async_trait]
impl MigratorTrait for AuditMigrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250310_000003_create_audit_schema::Migration),
        ]
    }
}
