use migration::{AuditMigrator, GovernanceMigrator, MigratorTrait};
use sea_orm::{Database, DatabaseConnection};

use crate::config::BootstrapSettings;
use crate::errors::InternalError;

/// The two database connections the application runs on: governance records
/// and the audit trail.
pub struct DatabaseConnections {
    pub governance: DatabaseConnection,
    pub audit: DatabaseConnection,
}

impl DatabaseConnections {
    /// Connect to both databases. Does NOT run migrations - call migrate()
    /// separately.
    pub async fn init(settings: &BootstrapSettings) -> Result<Self, InternalError> {
        let governance = Database::connect(settings.database_url())
            .await
            .map_err(|e| InternalError::database("connect_governance_database", e))?;

        tracing::debug!("Connected to governance database: {}", settings.database_url());

        let audit = Database::connect(settings.audit_database_url())
            .await
            .map_err(|e| InternalError::database("connect_audit_database", e))?;

        tracing::debug!("Connected to audit database: {}", settings.audit_database_url());

        Ok(Self { governance, audit })
    }

    /// Run all pending migrations on both databases
    pub async fn migrate(&self) -> Result<(), InternalError> {
        GovernanceMigrator::up(&self.governance, None)
            .await
            .map_err(|e| InternalError::database("run_governance_migrations", e))?;

        tracing::debug!("Governance database migrations completed");

        AuditMigrator::up(&self.audit, None)
            .await
            .map_err(|e| InternalError::database("run_audit_migrations", e))?;

        tracing::debug!("Audit database migrations completed");

        Ok(())
    }
}
