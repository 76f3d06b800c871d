use serde::{Deserialize, Serialize};

use crate::Role;

/// Custom claims attached to a user's identity (transport-agnostic).
///
/// Derived fresh on every role change and handed to the identity provider,
/// which stores it with the user's token-signing metadata. Never persisted
/// by this workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomClaims {
    /// The user's `roleIds`, verbatim.
    pub roles: Vec<Role>,

    pub admin: bool,
    pub operador: bool,
    pub cliente: bool,
}

impl CustomClaims {
    /// Roles carried in `roles` that have no boolean claim of their own.
    pub fn unrecognized_roles(&self) -> impl Iterator<Item = &Role> {
        self.roles.iter().filter(|r| !r.is_recognized())
    }
}

/// Derive the claims set for a role sequence.
///
/// Pure and deterministic. `roles` keeps the input order; the flags use
/// membership semantics, so position and duplicates do not matter.
pub fn derive_claims(role_ids: &[Role]) -> CustomClaims {
    let has = |role: &Role| role_ids.contains(role);

    CustomClaims {
        roles: role_ids.to_vec(),
        admin: has(&Role::ADMIN),
        operador: has(&Role::OPERADOR),
        cliente: has(&Role::CLIENTE),
    }
}
