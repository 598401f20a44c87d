use std::sync::Arc;

use crate::audit::AuditLogger;
use crate::config::database::DatabaseConnections;
use crate::errors::InternalError;
use crate::policy::{PolicyEvaluator, RoleMatrix};
use crate::services::{AssignmentService, MeetingService, UserService};
use crate::stores::AuditStore;

/// Centralized application data following the main-owned pattern.
///
/// All dependencies are created once by the embedding application and shared
/// across request handlers. Creation order matters: the audit store comes
/// first since the services depend on it for logging.
pub struct AppData {
    pub connections: DatabaseConnections,
    pub audit_store: Arc<AuditStore>,
    pub audit_logger: Arc<AuditLogger>,
    pub policy: Arc<dyn PolicyEvaluator>,
    pub assignment_service: Arc<AssignmentService>,
    pub user_service: Arc<UserService>,
    pub meeting_service: Arc<MeetingService>,
}

impl AppData {
    /// Wire up stores and services over already-connected databases.
    ///
    /// Database connections should be initialized and migrated before calling
    /// this. Pass `None` for `policy` to use the default role matrix.
    pub fn init(
        connections: DatabaseConnections,
        policy: Option<Arc<dyn PolicyEvaluator>>,
    ) -> Result<Self, InternalError> {
        tracing::info!("Initializing AppData...");

        let db = connections.governance.clone();
        let audit_db = connections.audit.clone();

        let audit_store = Arc::new(AuditStore::new(audit_db));
        let audit_logger = Arc::new(AuditLogger::new(audit_store.clone()));

        let policy: Arc<dyn PolicyEvaluator> =
            policy.unwrap_or_else(|| Arc::new(RoleMatrix::default()));

        let assignment_service = Arc::new(AssignmentService::new(
            db.clone(),
            audit_logger.clone(),
            policy.clone(),
        ));

        let user_service = Arc::new(UserService::new(
            db.clone(),
            audit_logger.clone(),
            policy.clone(),
            assignment_service.clone(),
        ));

        let meeting_service = Arc::new(MeetingService::new(
            db,
            audit_logger.clone(),
            policy.clone(),
        ));

        tracing::info!("AppData initialization complete");

        Ok(Self {
            connections,
            audit_store,
            audit_logger,
            policy,
            assignment_service,
            user_service,
            meeting_service,
        })
    }
}
