//! Strongly-typed identifiers used across the domain.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Maximum length of a user identifier accepted by the identity provider.
pub const MAX_UID_LEN: usize = 128;

/// Identifier of a user (identity provider uid, also the user document id).
///
/// Opaque and assigned externally; the only structure enforced here is what
/// the document path and the identity provider require.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserUid(String);

impl UserUid {
    pub fn new(uid: impl Into<String>) -> Result<Self, DomainError> {
        let uid = uid.into();
        if uid.is_empty() {
            return Err(DomainError::invalid_id("UserUid: empty"));
        }
        if uid.len() > MAX_UID_LEN {
            return Err(DomainError::invalid_id(format!(
                "UserUid: longer than {MAX_UID_LEN} bytes"
            )));
        }
        if uid.contains('/') {
            return Err(DomainError::invalid_id(format!(
                "UserUid: '{uid}' contains a path separator"
            )));
        }
        Ok(Self(uid))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for UserUid {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for UserUid {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for UserUid {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UserUid> for String {
    fn from(value: UserUid) -> Self {
        value.0
    }
}

/// Reference to a single document: `<collection>/<id>`.
///
/// Only top-level collections are modelled; user records live directly under
/// their collection keyed by uid.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RawDocumentRef")]
pub struct DocumentRef {
    collection: String,
    id: String,
}

/// Unvalidated wire form of [`DocumentRef`].
#[derive(Deserialize)]
struct RawDocumentRef {
    collection: String,
    id: String,
}

impl TryFrom<RawDocumentRef> for DocumentRef {
    type Error = DomainError;

    fn try_from(raw: RawDocumentRef) -> Result<Self, Self::Error> {
        Self::new(raw.collection, raw.id)
    }
}

impl DocumentRef {
    pub fn new(collection: impl Into<String>, id: impl Into<String>) -> Result<Self, DomainError> {
        let collection = collection.into();
        let id = id.into();
        for (what, segment) in [("collection", &collection), ("document id", &id)] {
            if segment.is_empty() || segment.contains('/') {
                return Err(DomainError::invalid_id(format!(
                    "DocumentRef: invalid {what} '{segment}'"
                )));
            }
        }
        Ok(Self { collection, id })
    }

    /// The document holding the record of `uid` inside `collection`.
    pub fn user(collection: impl Into<String>, uid: &UserUid) -> Result<Self, DomainError> {
        Self::new(collection, uid.as_str())
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Interpret the document id as a user uid.
    pub fn user_uid(&self) -> Result<UserUid, DomainError> {
        UserUid::new(self.id.clone())
    }

    pub fn path(&self) -> String {
        format!("{}/{}", self.collection, self.id)
    }
}

impl core::fmt::Display for DocumentRef {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}/{}", self.collection, self.id)
    }
}

impl FromStr for DocumentRef {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (collection, id) = s
            .split_once('/')
            .ok_or_else(|| DomainError::invalid_id(format!("DocumentRef: '{s}' is not <collection>/<id>")))?;
        Self::new(collection, id)
    }
}
