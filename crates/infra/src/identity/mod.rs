//! Identity provider adapters.

pub mod in_memory;

use claimsync_core::CustomClaims;
use claimsync_sync::IdentityError;

pub use in_memory::InMemoryIdentityProvider;

/// Largest serialized custom-claims object the identity provider accepts.
pub const MAX_CLAIMS_PAYLOAD_BYTES: usize = 1000;

/// Serialize claims for the provider, enforcing the payload limit.
pub fn encode_claims(claims: &CustomClaims) -> Result<String, IdentityError> {
    let encoded =
        serde_json::to_string(claims).map_err(|e| IdentityError::InvalidClaims(e.to_string()))?;
    if encoded.len() > MAX_CLAIMS_PAYLOAD_BYTES {
        return Err(IdentityError::PayloadTooLarge {
            size: encoded.len(),
            limit: MAX_CLAIMS_PAYLOAD_BYTES,
        });
    }
    Ok(encoded)
}
