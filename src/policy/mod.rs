//! Explicit policy evaluation.
//!
//! Authorization is a pure `(actor, action, resource) -> decision` call on an
//! injected evaluator; services never consult ambient authentication state.
//! The request-handling layer resolves the actor (and their coarse roles,
//! taken from the `role` field of currently held positions) before calling in.

use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::errors::internal::PolicyError;
use crate::types::internal::{RequestContext, RequestSource};

/// Actions the policy layer distinguishes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    CreateUser,
    UpdateUser,
    DeleteUser,
    AssignPosition,
    ManageMeetings,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreateUser => "create_user",
            Self::UpdateUser => "update_user",
            Self::DeleteUser => "delete_user",
            Self::AssignPosition => "assign_position",
            Self::ManageMeetings => "manage_meetings",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The record an action targets
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resource {
    User(String),
    Position(String),
    Meeting(String),
    System,
}

/// Outcome of a policy evaluation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny { reason: String },
}

/// Actor on whose behalf an operation runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub user_id: String,
    /// Coarse role names, e.g. from the roles of currently held positions
    pub roles: Vec<String>,
}

impl Actor {
    pub fn new(user_id: impl Into<String>, roles: Vec<String>) -> Self {
        Self {
            user_id: user_id.into(),
            roles,
        }
    }
}

/// Policy evaluation seam injected into the services
pub trait PolicyEvaluator: Send + Sync {
    fn evaluate(&self, actor: &Actor, action: Action, resource: &Resource) -> Decision;
}

/// Role-to-action grant table.
///
/// The default matrix encodes the standard committee roles; deployments
/// build their own with [`RoleMatrix::new`] + [`RoleMatrix::allow`].
pub struct RoleMatrix {
    grants: HashMap<String, HashSet<Action>>,
}

impl RoleMatrix {
    pub fn new() -> Self {
        Self {
            grants: HashMap::new(),
        }
    }

    pub fn allow(mut self, role: &str, action: Action) -> Self {
        self.grants
            .entry(role.to_string())
            .or_default()
            .insert(action);
        self
    }
}

impl Default for RoleMatrix {
    fn default() -> Self {
        RoleMatrix::new()
            .allow("admin", Action::CreateUser)
            .allow("admin", Action::UpdateUser)
            .allow("admin", Action::DeleteUser)
            .allow("admin", Action::AssignPosition)
            .allow("admin", Action::ManageMeetings)
            .allow("registrar", Action::CreateUser)
            .allow("registrar", Action::UpdateUser)
            .allow("secretary", Action::ManageMeetings)
    }
}

impl PolicyEvaluator for RoleMatrix {
    fn evaluate(&self, actor: &Actor, action: Action, _resource: &Resource) -> Decision {
        let allowed = actor.roles.iter().any(|role| {
            self.grants
                .get(role)
                .map(|actions| actions.contains(&action))
                .unwrap_or(false)
        });

        if allowed {
            Decision::Allow
        } else {
            Decision::Deny {
                reason: format!("no role of {} grants {}", actor.user_id, action),
            }
        }
    }
}

/// Evaluate the injected policy for an operation.
///
/// CLI and system contexts are trusted (the process owner already has full
/// access); API contexts must carry an actor and receive an Allow decision.
pub fn authorize(
    policy: &dyn PolicyEvaluator,
    ctx: &RequestContext,
    action: Action,
    resource: &Resource,
) -> Result<(), PolicyError> {
    match ctx.source {
        RequestSource::Cli | RequestSource::System => Ok(()),
        RequestSource::Api => {
            let actor = ctx.actor.as_ref().ok_or_else(|| PolicyError::ActorRequired {
                action: action.to_string(),
            })?;

            match policy.evaluate(actor, action, resource) {
                Decision::Allow => Ok(()),
                Decision::Deny { reason } => Err(PolicyError::ActionDenied {
                    action: action.to_string(),
                    actor_id: actor.user_id.clone(),
                    reason,
                }),
            }
        }
    }
}
