use std::sync::Arc;

use async_trait::async_trait;

use claimsync_core::{CustomClaims, UserUid};

use crate::IdentityError;

/// Identity provider holding per-user custom claims.
///
/// Constructed once at startup and injected into the synchronizer; the same
/// handle serves every invocation.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Replace the custom claims of `uid` with `claims` (all-or-nothing).
    async fn set_custom_claims(&self, uid: &UserUid, claims: &CustomClaims) -> Result<(), IdentityError>;
}

#[async_trait]
impl<P> IdentityProvider for Arc<P>
where
    P: IdentityProvider + ?Sized,
{
    async fn set_custom_claims(&self, uid: &UserUid, claims: &CustomClaims) -> Result<(), IdentityError> {
        (**self).set_custom_claims(uid, claims).await
    }
}
