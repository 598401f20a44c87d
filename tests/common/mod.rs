use quorum_backend::config::DatabaseConnections;
use quorum_backend::AppData;
use sea_orm::Database;

/// Build a fully wired AppData over in-memory databases
pub async fn setup_app() -> AppData {
    // Safe to call repeatedly; later calls fail and are ignored
    let _ = quorum_backend::config::init_logging();

    let governance = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to create governance test database");
    let audit = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to create audit test database");

    let connections = DatabaseConnections { governance, audit };
    connections
        .migrate()
        .await
        .expect("Failed to run migrations");

    AppData::init(connections, None).expect("Failed to initialize AppData")
}
