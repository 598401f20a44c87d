use std::fmt;
use std::net::IpAddr;

use uuid::Uuid;

use crate::policy::Actor;

/// Unique identifier for one request, for tracing across layers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestId(pub Uuid);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Source of the request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestSource {
    Api,
    Cli,
    System,
}

/// Request context that flows through all layers
///
/// Contains contextual information about the current operation that is needed
/// for logging, auditing, and policy evaluation across service and store
/// layers. The HTTP layer (out of scope for this crate) builds one per
/// request; CLI and system call sites use the dedicated constructors.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// IP address of the client, when one exists
    pub ip_address: Option<IpAddr>,

    /// Unique identifier for this request
    pub request_id: RequestId,

    /// Source of the request (API, CLI, or System)
    pub source: RequestSource,

    /// Actor who initiated the operation, for audit records
    pub actor_id: String,

    /// Resolved actor with roles, when the caller authenticated one.
    /// API-sourced operations must carry this for policy evaluation.
    pub actor: Option<Actor>,
}

impl RequestContext {
    /// Context for an authenticated API request
    pub fn for_api(actor: Actor, ip_address: Option<IpAddr>) -> Self {
        Self {
            ip_address,
            request_id: RequestId(Uuid::new_v4()),
            source: RequestSource::Api,
            actor_id: actor.user_id.clone(),
            actor: Some(actor),
        }
    }

    /// Context for CLI operations
    pub fn for_cli(command_name: &str) -> Self {
        Self {
            ip_address: None,
            request_id: RequestId(Uuid::new_v4()),
            source: RequestSource::Cli,
            actor_id: format!("cli:{}", command_name),
            actor: None,
        }
    }

    /// Context for system operations (migrations, seeding, maintenance)
    pub fn for_system(operation_name: &str) -> Self {
        Self {
            ip_address: None,
            request_id: RequestId(Uuid::new_v4()),
            source: RequestSource::System,
            actor_id: format!("system:{}", operation_name),
            actor: None,
        }
    }
}
