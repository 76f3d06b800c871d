//! Startup wiring: build collaborators once and hand them to the synchronizer.

use std::sync::Arc;

use claimsync_events::{InMemoryEventBus, RecordChange};
use claimsync_sync::RoleClaimsSynchronizer;

use crate::config::{ConfigError, SyncConfig};
use crate::document_store::{InMemoryDocumentStore, PublishingDocumentStore};
use crate::external::{FirestoreClient, IdentityToolkitClient};
use crate::identity::InMemoryIdentityProvider;
use crate::workers::{ChangeWorker, WorkerHandle};

pub type HttpSynchronizer = RoleClaimsSynchronizer<IdentityToolkitClient, FirestoreClient>;

pub type InMemoryBus = Arc<InMemoryEventBus<RecordChange>>;
pub type InMemoryStore = Arc<PublishingDocumentStore<InMemoryBus>>;
pub type InMemorySynchronizer =
    RoleClaimsSynchronizer<Arc<InMemoryIdentityProvider>, InMemoryStore>;

/// Synchronizer talking to the hosted identity provider and document store.
///
/// Both clients share one `reqwest::Client`.
pub fn http_synchronizer(config: &SyncConfig) -> Result<HttpSynchronizer, ConfigError> {
    let http = reqwest::Client::new();
    let identity = IdentityToolkitClient::from_config(http.clone(), config)?;
    let store = FirestoreClient::from_config(http, config)?;

    Ok(RoleClaimsSynchronizer::with_collection(
        identity,
        store,
        config.users_collection.clone(),
    ))
}

/// Self-contained pipeline for dev/tests:
/// store writes → bus → change worker → synchronizer → identity provider + store.
pub struct InMemoryPipeline {
    pub bus: InMemoryBus,
    pub store: InMemoryStore,
    pub identity: Arc<InMemoryIdentityProvider>,
    pub synchronizer: Arc<InMemorySynchronizer>,
    pub worker: WorkerHandle,
}

impl InMemoryPipeline {
    /// Wire everything and start the worker. Must run inside a tokio runtime.
    pub fn start(config: &SyncConfig) -> Self {
        let bus: InMemoryBus = Arc::new(InMemoryEventBus::new());
        let store = Arc::new(PublishingDocumentStore::new(
            InMemoryDocumentStore::new(),
            bus.clone(),
        ));
        let identity = Arc::new(InMemoryIdentityProvider::new());
        let synchronizer = Arc::new(RoleClaimsSynchronizer::with_collection(
            identity.clone(),
            store.clone(),
            config.users_collection.clone(),
        ));

        let worker = ChangeWorker::spawn(
            "claims-sync",
            &bus,
            Some(config.users_collection.clone()),
            synchronizer.clone(),
        );

        Self {
            bus,
            store,
            identity,
            synchronizer,
            worker,
        }
    }
}
