//! `claimsync-sync`: keeps identity-provider custom claims in step with the
//! `roleIds` of user documents.
//!
//! The document store and the identity provider are collaborators behind
//! traits; this crate only decides *whether* to sync and *what* to send.

pub mod error;
pub mod identity;
pub mod store;
pub mod synchronizer;

pub use error::{IdentityError, StoreError, SyncError};
pub use identity::IdentityProvider;
pub use store::{DocumentStore, FieldMap, FieldValue};
pub use synchronizer::{DEFAULT_USERS_COLLECTION, RoleClaimsSynchronizer, SyncOutcome};
