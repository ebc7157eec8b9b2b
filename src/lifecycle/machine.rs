use std::fmt;

use thiserror::Error;

use crate::auth::Role;

/// A directed edge in a status table and the roles allowed to take it
#[derive(Debug)]
pub struct Edge<S: 'static> {
    pub from: S,
    pub to: S,
    pub roles: &'static [Role],
}

/// A status vocabulary with a fixed edge table
pub trait Lifecycle: Copy + Eq + fmt::Display + fmt::Debug + Send + Sync + 'static {
    /// Entity name used in messages ("match", "registration", ...)
    const ENTITY: &'static str;

    /// Ordered edge list; anything not listed is rejected
    fn edges() -> &'static [Edge<Self>];

    /// Terminal states have no outgoing edges
    fn is_terminal(self) -> bool {
        !Self::edges().iter().any(|edge| edge.from == self)
    }
}

/// Why the guard refused a transition
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Denial {
    #[error("Invalid state transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Cannot move to {to}: {entity} is {from}")]
    Terminal {
        entity: &'static str,
        from: String,
        to: String,
    },

    #[error("Not permitted to move {entity} from {from} to {to}")]
    RoleNotPermitted {
        entity: &'static str,
        from: String,
        to: String,
    },
}

impl Denial {
    /// Whether the denial is about who is asking rather than what is asked
    pub fn is_authorization(&self) -> bool {
        matches!(self, Denial::RoleNotPermitted { .. })
    }
}

/// Pure transition check: (current, requested, acting roles) -> permit or deny.
///
/// A caller with no acting role on the row is refused before anything about
/// the row's state is reported.
pub fn guard<S: Lifecycle>(from: S, to: S, roles: &[Role]) -> Result<&'static Edge<S>, Denial> {
    if roles.is_empty() {
        return Err(Denial::RoleNotPermitted {
            entity: S::ENTITY,
            from: from.to_string(),
            to: to.to_string(),
        });
    }

    if from.is_terminal() {
        return Err(Denial::Terminal {
            entity: S::ENTITY,
            from: from.to_string(),
            to: to.to_string(),
        });
    }

    let edge = S::edges()
        .iter()
        .find(|edge| edge.from == from && edge.to == to)
        .ok_or_else(|| Denial::InvalidTransition {
            from: from.to_string(),
            to: to.to_string(),
        })?;

    if !edge.roles.iter().any(|role| roles.contains(role)) {
        return Err(Denial::RoleNotPermitted {
            entity: S::ENTITY,
            from: from.to_string(),
            to: to.to_string(),
        });
    }

    Ok(edge)
}

/// States reachable in one step by a caller holding `roles`
pub fn allowed_targets<S: Lifecycle>(from: S, roles: &[Role]) -> Vec<S> {
    S::edges()
        .iter()
        .filter(|edge| edge.from == from && edge.roles.iter().any(|r| roles.contains(r)))
        .map(|edge| edge.to)
        .collect()
}
