use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use claimsync_core::DocumentRef;

use crate::StoreError;

/// Value of one field in a merge-write.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// A literal JSON value.
    Value(Value),
    /// Resolved by the store to its own clock at the time the write applies.
    ServerTimestamp,
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        FieldValue::Value(value)
    }
}

/// Fields of a merge-write, ordered by name.
pub type FieldMap = BTreeMap<String, FieldValue>;

/// Document store accepting merge-writes.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Set `fields` on `document`, leaving every other field untouched.
    ///
    /// Creates the document if it does not exist.
    async fn merge_fields(&self, document: &DocumentRef, fields: FieldMap) -> Result<(), StoreError>;
}

#[async_trait]
impl<S> DocumentStore for Arc<S>
where
    S: DocumentStore + ?Sized,
{
    async fn merge_fields(&self, document: &DocumentRef, fields: FieldMap) -> Result<(), StoreError> {
        (**self).merge_fields(document, fields).await
    }
}
