use thiserror::Error;

use super::models::Role;
use super::verifier::Principal;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Denial {
    #[error("Authentication required")]
    Unauthenticated,

    #[error("User {full_name} is inactive, talk with an admin")]
    InactiveAccount { full_name: String },

    #[error("User {full_name} needs a valid role: [{}]", format_roles(.required))]
    InsufficientRole { full_name: String, required: Vec<Role> },
}

impl Denial {
    /// Unauthenticated is a missing identity; the rest are identities without permission
    pub fn is_forbidden(&self) -> bool {
        !matches!(self, Denial::Unauthenticated)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(Denial),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    pub fn into_result(self) -> Result<(), Denial> {
        match self {
            Decision::Allow => Ok(()),
            Decision::Deny(denial) => Err(denial),
        }
    }
}

fn format_roles(roles: &[Role]) -> String {
    roles.iter().map(Role::as_str).collect::<Vec<_>>().join(",")
}

/// Decide whether `principal` may use a route requiring any one of `required`.
///
/// An empty requirement admits any verified identity, active or not. A non-empty one needs an
/// active account holding at least one of the roles.
pub fn authorize(principal: Option<&Principal>, required: &[Role]) -> Decision {
    let Some(principal) = principal else {
        return Decision::Deny(Denial::Unauthenticated);
    };

    if required.is_empty() {
        return Decision::Allow;
    }

    if !principal.is_active() {
        return Decision::Deny(Denial::InactiveAccount {
            full_name: principal.full_name().to_string(),
        });
    }

    if principal.roles().iter().any(|role| required.contains(role)) {
        Decision::Allow
    } else {
        Decision::Deny(Denial::InsufficientRole {
            full_name: principal.full_name().to_string(),
            required: required.to_vec(),
        })
    }
}
