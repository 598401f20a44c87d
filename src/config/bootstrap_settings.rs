use std::env;

/// Settings needed before the stores exist: where the databases live.
///
/// Everything else is runtime data; these come from the environment with
/// local-development defaults.
#[derive(Debug, Clone)]
pub struct BootstrapSettings {
    database_url: String,
    audit_database_url: String,
}

impl BootstrapSettings {
    pub fn from_env() -> Self {
        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://governance.db?mode=rwc".to_string());
        let audit_database_url = env::var("AUDIT_DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://audit.db?mode=rwc".to_string());

        Self {
            database_url,
            audit_database_url,
        }
    }

    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    pub fn audit_database_url(&self) -> &str {
        &self.audit_database_url
    }
}
