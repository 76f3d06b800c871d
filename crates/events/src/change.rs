use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use claimsync_core::{DocumentRef, DomainResult, UserRecord, UserUid};

/// Notification that one user document was written.
///
/// Delivered once per write (create, update or delete) with the snapshots on
/// either side of it:
/// - `before == None`: the document was created by this write.
/// - `after == None`: the document was deleted by this write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordChange {
    event_id: Uuid,
    document: DocumentRef,

    #[serde(default)]
    before: Option<UserRecord>,
    #[serde(default)]
    after: Option<UserRecord>,

    /// When the store applied the write.
    occurred_at: DateTime<Utc>,
}

impl RecordChange {
    pub fn new(
        event_id: Uuid,
        document: DocumentRef,
        before: Option<UserRecord>,
        after: Option<UserRecord>,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            event_id,
            document,
            before,
            after,
            occurred_at,
        }
    }

    /// Notification for a write happening now (UUIDv7 id, current time).
    pub fn now(document: DocumentRef, before: Option<UserRecord>, after: Option<UserRecord>) -> Self {
        Self::new(Uuid::now_v7(), document, before, after, Utc::now())
    }

    pub fn event_id(&self) -> Uuid {
        self.event_id
    }

    pub fn document(&self) -> &DocumentRef {
        &self.document
    }

    /// The affected user (the document id).
    pub fn uid(&self) -> DomainResult<UserUid> {
        self.document.user_uid()
    }

    pub fn before(&self) -> Option<&UserRecord> {
        self.before.as_ref()
    }

    pub fn after(&self) -> Option<&UserRecord> {
        self.after.as_ref()
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }

    pub fn is_deletion(&self) -> bool {
        self.after.is_none()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn decodes_changefeed_payload() {
        let change: RecordChange = serde_json::from_value(json!({
            "event_id": "0190a4b2-7c1e-7000-8000-000000000001",
            "document": { "collection": "users", "id": "u-1" },
            "before": null,
            "after": { "roleIds": ["admin"] },
            "occurred_at": "2024-05-01T10:00:00Z"
        }))
        .unwrap();

        assert_eq!(change.uid().unwrap().as_str(), "u-1");
        assert!(change.before().is_none());
        assert!(!change.is_deletion());
        assert_eq!(change.after().unwrap().get("roleIds"), Some(&json!(["admin"])));
    }

    #[test]
    fn missing_after_means_deletion() {
        let change: RecordChange = serde_json::from_value(json!({
            "event_id": "0190a4b2-7c1e-7000-8000-000000000002",
            "document": { "collection": "users", "id": "u-1" },
            "before": { "roleIds": ["admin"] },
            "occurred_at": "2024-05-01T10:00:00Z"
        }))
        .unwrap();

        assert!(change.is_deletion());
    }

    #[test]
    fn rejects_invalid_document_path() {
        for document in [json!({ "collection": "a/b", "id": "u-1" }), json!({ "collection": "", "id": "u-1" })] {
            let decoded = serde_json::from_value::<RecordChange>(json!({
                "event_id": "0190a4b2-7c1e-7000-8000-000000000003",
                "document": document,
                "after": { "roleIds": ["admin"] },
                "occurred_at": "2024-05-01T10:00:00Z"
            }));
            assert!(decoded.is_err());
        }
    }
}
