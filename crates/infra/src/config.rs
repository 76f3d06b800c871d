//! Configuration loading and representation.
//!
//! Everything comes from `CLAIMSYNC_*` environment variables with defaults
//! suited to the hosted Google APIs. The set of recognized roles is not
//! configurable.

use reqwest::Url;
use thiserror::Error;

use claimsync_core::DocumentRef;
use claimsync_sync::DEFAULT_USERS_COLLECTION;

pub const USERS_COLLECTION_VAR: &str = "CLAIMSYNC_USERS_COLLECTION";
pub const PROJECT_ID_VAR: &str = "CLAIMSYNC_PROJECT_ID";
pub const DATABASE_ID_VAR: &str = "CLAIMSYNC_DATABASE_ID";
pub const IDENTITY_TOOLKIT_URL_VAR: &str = "CLAIMSYNC_IDENTITY_TOOLKIT_URL";
pub const FIRESTORE_URL_VAR: &str = "CLAIMSYNC_FIRESTORE_URL";
pub const ACCESS_TOKEN_VAR: &str = "CLAIMSYNC_ACCESS_TOKEN";

pub const DEFAULT_DATABASE_ID: &str = "(default)";
pub const DEFAULT_IDENTITY_TOOLKIT_URL: &str = "https://identitytoolkit.googleapis.com";
pub const DEFAULT_FIRESTORE_URL: &str = "https://firestore.googleapis.com";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// Collection holding one document per user, keyed by uid.
    pub users_collection: String,
    /// Cloud project hosting the identity provider and document store.
    pub project_id: Option<String>,
    pub database_id: String,
    /// Base URL of the Identity Toolkit API, without trailing slash.
    pub identity_toolkit_url: String,
    /// Base URL of the Firestore API, without trailing slash.
    pub firestore_url: String,
    /// OAuth bearer token sent by the HTTP adapters, if any.
    pub access_token: Option<String>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            users_collection: DEFAULT_USERS_COLLECTION.to_string(),
            project_id: None,
            database_id: DEFAULT_DATABASE_ID.to_string(),
            identity_toolkit_url: DEFAULT_IDENTITY_TOOLKIT_URL.to_string(),
            firestore_url: DEFAULT_FIRESTORE_URL.to_string(),
            access_token: None,
        }
    }
}

impl SyncConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        let users_collection = get(USERS_COLLECTION_VAR).unwrap_or(defaults.users_collection);
        // Same rules as a document path segment.
        DocumentRef::new(users_collection.as_str(), "_").map_err(|e| ConfigError::Invalid {
            key: USERS_COLLECTION_VAR,
            reason: e.to_string(),
        })?;

        let identity_toolkit_url = base_url(
            IDENTITY_TOOLKIT_URL_VAR,
            get(IDENTITY_TOOLKIT_URL_VAR).unwrap_or(defaults.identity_toolkit_url),
        )?;
        let firestore_url = base_url(
            FIRESTORE_URL_VAR,
            get(FIRESTORE_URL_VAR).unwrap_or(defaults.firestore_url),
        )?;

        Ok(Self {
            users_collection,
            project_id: get(PROJECT_ID_VAR),
            database_id: get(DATABASE_ID_VAR).unwrap_or(defaults.database_id),
            identity_toolkit_url,
            firestore_url,
            access_token: get(ACCESS_TOKEN_VAR),
        })
    }

    /// Project id, required by the HTTP adapters.
    pub fn require_project_id(&self) -> Result<&str, ConfigError> {
        self.project_id
            .as_deref()
            .ok_or(ConfigError::Missing(PROJECT_ID_VAR))
    }
}

fn base_url(key: &'static str, raw: String) -> Result<String, ConfigError> {
    let url = Url::parse(&raw).map_err(|e| ConfigError::Invalid {
        key,
        reason: e.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Invalid {
            key,
            reason: format!("unsupported scheme '{}'", url.scheme()),
        });
    }
    Ok(raw.trim_end_matches('/').to_string())
}
