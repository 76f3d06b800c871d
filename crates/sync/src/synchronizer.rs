//! Role-claims synchronizer.
//!
//! Per invocation the synchronizer is a two-state gate:
//!
//! - **no-op**: the document was deleted, or its `roleIds` did not change
//! - **sync**: derive claims from the new `roleIds`, set them on the identity
//!   provider, then merge `lastClaimsSync = <server time>` into the document
//!
//! The timestamp write is itself a document change. It never alters
//! `roleIds`, so the notification it produces ends in the no-op branch and
//! the loop terminates after one extra invocation.

use async_trait::async_trait;
use tracing::{debug, info, instrument, warn};

use claimsync_core::{
    CustomClaims, DocumentRef, LAST_CLAIMS_SYNC_FIELD, Role, RoleIds, UserRecord, UserUid,
    derive_claims,
};
use claimsync_events::ChangeListener;

use crate::{DocumentStore, FieldMap, FieldValue, IdentityProvider, SyncError};

/// Collection holding user documents unless configured otherwise.
pub const DEFAULT_USERS_COLLECTION: &str = "users";

/// Result of a successful invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The document no longer exists; nothing to do.
    Deleted,
    /// `roleIds` are sequence-equal on both sides; nothing to do.
    Unchanged,
    /// Claims were set and the sync time recorded.
    Synced { claims: CustomClaims },
}

impl SyncOutcome {
    pub fn is_noop(&self) -> bool {
        !matches!(self, SyncOutcome::Synced { .. })
    }
}

/// Keeps a user's custom claims a function of the user's `roleIds`.
///
/// Holds no per-invocation state; one instance can serve concurrent
/// invocations behind an `Arc`.
#[derive(Debug, Clone)]
pub struct RoleClaimsSynchronizer<P, S> {
    identity: P,
    store: S,
    users_collection: String,
}

impl<P, S> RoleClaimsSynchronizer<P, S>
where
    P: IdentityProvider,
    S: DocumentStore,
{
    pub fn new(identity: P, store: S) -> Self {
        Self::with_collection(identity, store, DEFAULT_USERS_COLLECTION)
    }

    pub fn with_collection(identity: P, store: S, users_collection: impl Into<String>) -> Self {
        Self {
            identity,
            store,
            users_collection: users_collection.into(),
        }
    }

    /// React to one write of the document of `uid`.
    ///
    /// The identity-provider write is awaited before the timestamp write is
    /// issued. If it fails, the timestamp is left alone and the error is
    /// returned. If the timestamp write fails, claims are already applied and
    /// the error says so (`SyncError::RecordSync`). An invalid users
    /// collection is rejected before either write.
    #[instrument(skip_all, fields(uid = %uid))]
    pub async fn handle_change(
        &self,
        uid: &UserUid,
        before: Option<&UserRecord>,
        after: Option<&UserRecord>,
    ) -> Result<SyncOutcome, SyncError> {
        let Some(after) = after else {
            debug!("user document deleted, skipping");
            return Ok(SyncOutcome::Deleted);
        };

        let before_roles = roles_of(before, "before");
        let after_roles = roles_of(Some(after), "after");

        if before_roles == after_roles {
            debug!(roles = after_roles.len(), "roleIds unchanged, skipping");
            return Ok(SyncOutcome::Unchanged);
        }

        let document = DocumentRef::user(self.users_collection.as_str(), uid)?;
        let claims = derive_claims(&after_roles);
        let unrecognized = claims.unrecognized_roles().count();
        if unrecognized > 0 {
            debug!(unrecognized, "roles without a dedicated claim");
        }

        self.identity
            .set_custom_claims(uid, &claims)
            .await
            .map_err(|source| SyncError::SetClaims {
                uid: uid.clone(),
                source,
            })?;

        let mut fields = FieldMap::new();
        fields.insert(LAST_CLAIMS_SYNC_FIELD.to_string(), FieldValue::ServerTimestamp);

        self.store
            .merge_fields(&document, fields)
            .await
            .map_err(|source| SyncError::RecordSync {
                uid: uid.clone(),
                source,
            })?;

        info!(
            roles = ?claims.roles,
            admin = claims.admin,
            operador = claims.operador,
            cliente = claims.cliente,
            "custom claims synchronized"
        );

        Ok(SyncOutcome::Synced { claims })
    }
}

#[async_trait]
impl<P, S> ChangeListener for RoleClaimsSynchronizer<P, S>
where
    P: IdentityProvider,
    S: DocumentStore,
{
    type Error = SyncError;

    async fn on_record_written(
        &self,
        before: Option<&UserRecord>,
        after: Option<&UserRecord>,
        uid: &UserUid,
    ) -> Result<(), Self::Error> {
        self.handle_change(uid, before, after).await.map(|_| ())
    }
}

/// `roleIds` of a snapshot; an absent snapshot or field reads as empty.
fn roles_of(record: Option<&UserRecord>, side: &'static str) -> Vec<Role> {
    match record.map(UserRecord::role_ids) {
        None => Vec::new(),
        Some(RoleIds::Malformed) => {
            warn!(side, "roleIds is not a list of strings, treating as empty");
            Vec::new()
        }
        Some(ids) => ids.into_roles(),
    }
}
