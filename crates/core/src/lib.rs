//! `claimsync-core`: domain primitives for role/claims synchronization.
//!
//! This crate contains **pure domain** code (no IO, no async): identifiers,
//! role identifiers, user record snapshots and claims derivation.

pub mod claims;
pub mod error;
pub mod id;
pub mod record;
pub mod role;

pub use claims::{CustomClaims, derive_claims};
pub use error::{DomainError, DomainResult};
pub use id::{DocumentRef, UserUid};
pub use record::{LAST_CLAIMS_SYNC_FIELD, ROLE_IDS_FIELD, RoleIds, UserRecord};
pub use role::{RECOGNIZED_ROLES, Role};
