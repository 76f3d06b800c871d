use std::collections::HashMap;
use std::sync::{Mutex, RwLock};

use async_trait::async_trait;

use claimsync_core::{CustomClaims, UserUid};
use claimsync_sync::{IdentityError, IdentityProvider};

use super::encode_claims;

/// In-memory identity provider for tests/dev.
///
/// Keeps the current claims per user plus a log of every accepted call.
/// Applies the same payload limit as the hosted provider.
#[derive(Debug, Default)]
pub struct InMemoryIdentityProvider {
    claims: RwLock<HashMap<UserUid, CustomClaims>>,
    calls: Mutex<Vec<(UserUid, CustomClaims)>>,
    failure: Mutex<Option<IdentityError>>,
}

impl InMemoryIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn claims_for(&self, uid: &UserUid) -> Option<CustomClaims> {
        self.claims.read().ok()?.get(uid).cloned()
    }

    /// Every accepted `set_custom_claims` call, in order.
    pub fn calls(&self) -> Vec<(UserUid, CustomClaims)> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or(0)
    }

    /// Make every following call fail with `err` (`None` restores service).
    pub fn fail_with(&self, err: Option<IdentityError>) {
        if let Ok(mut slot) = self.failure.lock() {
            *slot = err;
        }
    }
}

#[async_trait]
impl IdentityProvider for InMemoryIdentityProvider {
    async fn set_custom_claims(&self, uid: &UserUid, claims: &CustomClaims) -> Result<(), IdentityError> {
        if let Some(err) = self.failure.lock().ok().and_then(|slot| slot.clone()) {
            return Err(err);
        }
        encode_claims(claims)?;

        self.claims
            .write()
            .map_err(|_| IdentityError::Unavailable("lock poisoned".to_string()))?
            .insert(uid.clone(), claims.clone());
        self.calls
            .lock()
            .map_err(|_| IdentityError::Unavailable("lock poisoned".to_string()))?
            .push((uid.clone(), claims.clone()));

        Ok(())
    }
}
