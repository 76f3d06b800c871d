use thiserror::Error;

use claimsync_core::{DomainError, UserUid};

/// Failure reported by an identity provider when setting custom claims.
///
/// The provider call is all-or-nothing: on any of these, no claims were
/// applied.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdentityError {
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("user not found: {0}")]
    UserNotFound(String),

    #[error("claims payload is {size} bytes, limit is {limit}")]
    PayloadTooLarge { size: usize, limit: usize },

    #[error("invalid claims payload: {0}")]
    InvalidClaims(String),

    #[error("identity provider rejected the request ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}

/// Failure reported by the document store on a merge-write.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("document store rejected the write ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("document store unavailable: {0}")]
    Unavailable(String),

    /// The write was applied but the change notification could not be sent.
    #[error("change notification failed: {0}")]
    Publish(String),
}

/// Failure of one synchronization invocation.
///
/// Every variant is fatal to the invocation and is handed back to the
/// delivery mechanism; nothing is retried or compensated here.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Claims were not applied; the timestamp write was not attempted.
    #[error("failed to set custom claims for user {uid}: {source}")]
    SetClaims {
        uid: UserUid,
        #[source]
        source: IdentityError,
    },

    /// Claims were applied, `lastClaimsSync` is stale.
    #[error("claims set for user {uid} but recording the sync time failed: {source}")]
    RecordSync {
        uid: UserUid,
        #[source]
        source: StoreError,
    },

    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl SyncError {
    /// Whether the identity provider already holds the new claims.
    pub fn claims_applied(&self) -> bool {
        matches!(self, SyncError::RecordSync { .. })
    }
}
