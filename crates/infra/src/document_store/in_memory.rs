use std::collections::HashMap;
use std::sync::{Mutex, RwLock};

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde_json::Value;

use claimsync_core::{DocumentRef, UserRecord};
use claimsync_events::RecordChange;
use claimsync_sync::{DocumentStore, FieldMap, FieldValue, StoreError};

/// Snapshots on either side of one applied write.
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedWrite {
    pub document: DocumentRef,
    pub before: Option<UserRecord>,
    pub after: Option<UserRecord>,
}

impl AppliedWrite {
    pub fn into_change(self) -> RecordChange {
        RecordChange::now(self.document, self.before, self.after)
    }
}

/// In-memory document store.
///
/// Intended for tests/dev. `ServerTimestamp` fields resolve to the current
/// UTC time as an RFC 3339 string.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    documents: RwLock<HashMap<DocumentRef, UserRecord>>,
    merge_failure: Mutex<Option<StoreError>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, document: &DocumentRef) -> Option<UserRecord> {
        self.documents.read().ok()?.get(document).cloned()
    }

    pub fn len(&self) -> usize {
        self.documents.read().map(|d| d.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Make every following merge fail with `err` (`None` restores service).
    pub fn fail_merges(&self, err: Option<StoreError>) {
        if let Ok(mut slot) = self.merge_failure.lock() {
            *slot = err;
        }
    }

    pub fn set(&self, document: &DocumentRef, record: UserRecord) -> Result<AppliedWrite, StoreError> {
        let mut documents = self.write_lock()?;
        let before = documents.insert(document.clone(), record.clone());

        Ok(AppliedWrite {
            document: document.clone(),
            before,
            after: Some(record),
        })
    }

    /// Merge `fields` into the document, creating it if needed.
    pub fn merge(&self, document: &DocumentRef, fields: FieldMap) -> Result<AppliedWrite, StoreError> {
        if let Some(err) = self.merge_failure.lock().ok().and_then(|slot| slot.clone()) {
            return Err(err);
        }

        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);
        let mut documents = self.write_lock()?;
        let before = documents.get(document).cloned();

        let mut after = before.clone().unwrap_or_default();
        for (name, value) in fields {
            let value = match value {
                FieldValue::Value(v) => v,
                FieldValue::ServerTimestamp => Value::String(now.clone()),
            };
            after.fields_mut().insert(name, value);
        }
        documents.insert(document.clone(), after.clone());

        Ok(AppliedWrite {
            document: document.clone(),
            before,
            after: Some(after),
        })
    }

    /// Remove the document; `None` if it did not exist.
    pub fn delete(&self, document: &DocumentRef) -> Result<Option<AppliedWrite>, StoreError> {
        let mut documents = self.write_lock()?;
        Ok(documents.remove(document).map(|before| AppliedWrite {
            document: document.clone(),
            before: Some(before),
            after: None,
        }))
    }

    fn write_lock(
        &self,
    ) -> Result<std::sync::RwLockWriteGuard<'_, HashMap<DocumentRef, UserRecord>>, StoreError> {
        self.documents
            .write()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn merge_fields(&self, document: &DocumentRef, fields: FieldMap) -> Result<(), StoreError> {
        self.merge(document, fields).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn doc() -> DocumentRef {
        DocumentRef::new("users", "u-1").unwrap()
    }

    #[test]
    fn merge_keeps_unrelated_fields() {
        let store = InMemoryDocumentStore::new();
        store
            .set(&doc(), UserRecord::with_roles(["admin"]).with_field("email", json!("a@b.c")))
            .unwrap();

        let mut fields = FieldMap::new();
        fields.insert("lastClaimsSync".into(), FieldValue::ServerTimestamp);
        fields.insert("note".into(), FieldValue::Value(json!("x")));
        let write = store.merge(&doc(), fields).unwrap();

        let after = write.after.unwrap();
        assert_eq!(after.get("email"), Some(&json!("a@b.c")));
        assert_eq!(after.get("roleIds"), Some(&json!(["admin"])));
        assert_eq!(after.get("note"), Some(&json!("x")));
        assert!(after.last_claims_sync().is_some());
        assert!(write.before.unwrap().last_claims_sync().is_none());
        assert_eq!(store.get(&doc()), Some(after));
    }

    #[test]
    fn merge_creates_missing_document() {
        let store = InMemoryDocumentStore::new();
        let write = store
            .merge(&doc(), FieldMap::from([("a".to_string(), FieldValue::Value(json!(1)))]))
            .unwrap();

        assert!(write.before.is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn delete_reports_previous_snapshot() {
        let store = InMemoryDocumentStore::new();
        assert_eq!(store.delete(&doc()).unwrap(), None);

        store.set(&doc(), UserRecord::with_roles(["cliente"])).unwrap();
        let write = store.delete(&doc()).unwrap().unwrap();

        assert_eq!(write.before, Some(UserRecord::with_roles(["cliente"])));
        assert!(write.after.is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn injected_failure_blocks_merges_only() {
        let store = InMemoryDocumentStore::new();
        store.fail_merges(Some(StoreError::Unavailable("down".into())));

        assert!(store.merge(&doc(), FieldMap::new()).is_err());
        assert!(store.set(&doc(), UserRecord::new()).is_ok());

        store.fail_merges(None);
        assert!(store.merge(&doc(), FieldMap::new()).is_ok());
    }
}
