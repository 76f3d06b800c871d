//! Document store adapters.
//!
//! The in-memory store stands in for the real document database in dev and
//! tests. Wrapped in [`PublishingDocumentStore`] it also plays the part of the
//! trigger runtime: every applied write is published as a [`RecordChange`].

pub mod in_memory;

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use claimsync_core::{DocumentRef, UserRecord};
use claimsync_events::{EventBus, RecordChange};
use claimsync_sync::{DocumentStore, FieldMap, StoreError};

pub use in_memory::{AppliedWrite, InMemoryDocumentStore};

/// Adapter that publishes a change notification after every successful write.
///
/// Ordering invariant: **publish happens only after the write is applied**,
/// and notifications for one store leave in the order writes were applied.
pub struct PublishingDocumentStore<B> {
    store: InMemoryDocumentStore,
    bus: B,
    // Held from write through publish so notification order matches write order.
    ordering: Mutex<()>,
}

impl<B> PublishingDocumentStore<B>
where
    B: EventBus<RecordChange>,
{
    pub fn new(store: InMemoryDocumentStore, bus: B) -> Self {
        Self {
            store,
            bus,
            ordering: Mutex::new(()),
        }
    }

    pub fn inner(&self) -> &InMemoryDocumentStore {
        &self.store
    }

    pub fn get(&self, document: &DocumentRef) -> Option<UserRecord> {
        self.store.get(document)
    }

    /// Replace the whole document (create if absent).
    pub fn set(&self, document: &DocumentRef, record: UserRecord) -> Result<(), StoreError> {
        let _order = self.ordering()?;
        let write = self.store.set(document, record)?;
        self.publish(write)
    }

    pub fn merge(&self, document: &DocumentRef, fields: FieldMap) -> Result<(), StoreError> {
        let _order = self.ordering()?;
        let write = self.store.merge(document, fields)?;
        self.publish(write)
    }

    /// Delete the document. Deleting a missing document publishes nothing.
    pub fn delete(&self, document: &DocumentRef) -> Result<(), StoreError> {
        let _order = self.ordering()?;
        match self.store.delete(document)? {
            Some(write) => self.publish(write),
            None => Ok(()),
        }
    }

    fn ordering(&self) -> Result<MutexGuard<'_, ()>, StoreError> {
        self.ordering
            .lock()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))
    }

    fn publish(&self, write: AppliedWrite) -> Result<(), StoreError> {
        self.bus
            .publish(write.into_change())
            .map_err(|err| StoreError::Publish(format!("{err:?}")))
    }
}

#[async_trait]
impl<B> DocumentStore for PublishingDocumentStore<B>
where
    B: EventBus<RecordChange>,
{
    async fn merge_fields(&self, document: &DocumentRef, fields: FieldMap) -> Result<(), StoreError> {
        self.merge(document, fields)
    }
}
