use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Role identifier assigned to a user record.
///
/// Roles are opaque strings; only the three in [`RECOGNIZED_ROLES`] map to a
/// dedicated boolean claim. Any other identifier is carried through verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(Cow<'static, str>);

impl Role {
    pub const ADMIN: Role = Role(Cow::Borrowed("admin"));
    pub const OPERADOR: Role = Role(Cow::Borrowed("operador"));
    pub const CLIENTE: Role = Role(Cow::Borrowed("cliente"));

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this role produces its own boolean claim.
    pub fn is_recognized(&self) -> bool {
        RECOGNIZED_ROLES.contains(self)
    }
}

/// Roles that produce a boolean claim. Compiled in, not configurable.
pub const RECOGNIZED_ROLES: [Role; 3] = [Role::ADMIN, Role::OPERADOR, Role::CLIENTE];

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for Role {
    fn from(value: &'static str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}
