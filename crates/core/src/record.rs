//! User record snapshots as delivered by the document store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::Role;

/// Field holding the ordered role identifiers of a user.
pub const ROLE_IDS_FIELD: &str = "roleIds";

/// Field written after every successful claims update.
pub const LAST_CLAIMS_SYNC_FIELD: &str = "lastClaimsSync";

/// Snapshot of a user document (all fields, schemaless).
///
/// Other services own most fields; only `roleIds` is read and only
/// `lastClaimsSync` is ever written by the synchronizer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserRecord {
    fields: Map<String, Value>,
}

/// Interpretation of the `roleIds` field of a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleIds {
    /// Field absent or `null`.
    Missing,
    /// An array of strings.
    Present(Vec<Role>),
    /// Present but not an array of strings.
    ///
    /// A single non-string entry discards the whole list; `["admin", 1]`
    /// grants no roles at all.
    Malformed,
}

impl RoleIds {
    /// Normalize to a role sequence; missing and malformed become empty.
    pub fn into_roles(self) -> Vec<Role> {
        match self {
            RoleIds::Present(roles) => roles,
            RoleIds::Missing | RoleIds::Malformed => Vec::new(),
        }
    }
}

impl UserRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a record carrying only `roleIds`.
    pub fn with_roles<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new().with_field(
            ROLE_IDS_FIELD,
            Value::Array(roles.into_iter().map(|r| Value::String(r.into())).collect()),
        )
    }

    pub fn with_field(mut self, name: impl Into<String>, value: Value) -> Self {
        self.fields.insert(name.into(), value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn fields_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.fields
    }

    pub fn role_ids(&self) -> RoleIds {
        match self.fields.get(ROLE_IDS_FIELD) {
            None | Some(Value::Null) => RoleIds::Missing,
            Some(Value::Array(items)) => items
                .iter()
                .map(|v| v.as_str().map(|s| Role::new(s.to_owned())))
                .collect::<Option<Vec<_>>>()
                .map_or(RoleIds::Malformed, RoleIds::Present),
            Some(_) => RoleIds::Malformed,
        }
    }

    /// When claims were last synchronized, if the field holds an RFC 3339 timestamp.
    pub fn last_claims_sync(&self) -> Option<DateTime<Utc>> {
        let raw = self.fields.get(LAST_CLAIMS_SYNC_FIELD)?.as_str()?;
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|t| t.with_timezone(&Utc))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn record(value: Value) -> UserRecord {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn role_ids_are_read_in_order() {
        let r = record(json!({ "roleIds": ["cliente", "admin", "cliente"], "name": "Ana" }));
        assert_eq!(
            r.role_ids(),
            RoleIds::Present(vec![Role::CLIENTE, Role::ADMIN, Role::CLIENTE])
        );
    }

    #[test]
    fn missing_and_null_role_ids() {
        assert_eq!(record(json!({})).role_ids(), RoleIds::Missing);
        assert_eq!(record(json!({ "roleIds": null })).role_ids(), RoleIds::Missing);
        assert!(record(json!({})).role_ids().into_roles().is_empty());
    }

    #[test]
    fn malformed_role_ids_normalize_to_empty() {
        for bad in [json!("admin"), json!(42), json!(["admin", 1]), json!({ "admin": true })] {
            let r = record(json!({ "roleIds": bad }));
            assert_eq!(r.role_ids(), RoleIds::Malformed);
            assert!(r.role_ids().into_roles().is_empty());
        }
    }

    #[test]
    fn last_claims_sync_parses_rfc3339() {
        let r = record(json!({ "lastClaimsSync": "2024-05-01T10:00:00Z" }));
        let ts = r.last_claims_sync().unwrap();
        assert_eq!(ts.to_rfc3339(), "2024-05-01T10:00:00+00:00");

        assert!(record(json!({ "lastClaimsSync": 5 })).last_claims_sync().is_none());
        assert!(UserRecord::new().last_claims_sync().is_none());
    }

    #[test]
    fn with_roles_builds_role_ids_field() {
        let r = UserRecord::with_roles(["admin"]).with_field("email", json!("a@b.c"));
        assert_eq!(r.get(ROLE_IDS_FIELD), Some(&json!(["admin"])));
        assert_eq!(r.fields().len(), 2);
    }
}
