//! Integration tests for the full synchronization pipeline.
//!
//! Tests: store write → bus → change worker → synchronizer → identity provider + store
//!
//! Verifies:
//! - Role changes end up as custom claims and a recorded sync time
//! - The synchronizer's own timestamp write does not loop
//! - Collaborator failures are contained to the failing invocation

#[cfg(test)]
mod tests {
    use serde_json::json;

    use claimsync_core::{DocumentRef, UserRecord, UserUid};
    use claimsync_sync::{IdentityError, StoreError};

    use crate::config::SyncConfig;
    use crate::wiring::InMemoryPipeline;

    fn setup() -> InMemoryPipeline {
        claimsync_observability::init();
        InMemoryPipeline::start(&SyncConfig::default())
    }

    fn uid(id: &str) -> UserUid {
        UserUid::new(id).unwrap()
    }

    fn user_doc(id: &str) -> DocumentRef {
        DocumentRef::new("users", id).unwrap()
    }

    #[tokio::test]
    async fn role_change_syncs_claims_and_timestamp_once() -> anyhow::Result<()> {
        let pipeline = setup();
        let doc = user_doc("u-1");

        pipeline
            .store
            .set(&doc, UserRecord::with_roles(["cliente"]).with_field("email", json!("ana@example.com")))?;
        pipeline.store.set(
            &doc,
            UserRecord::with_roles(["cliente", "operador"]).with_field("email", json!("ana@example.com")),
        )?;

        let stats = pipeline.worker.shutdown().await?;

        // Two role changes, plus one no-op per timestamp write they caused.
        assert_eq!(stats.received, 4);
        assert_eq!(stats.handled, 4);
        assert_eq!(stats.failed, 0);
        assert_eq!(pipeline.identity.call_count(), 2);

        let claims = pipeline.identity.claims_for(&uid("u-1")).unwrap();
        assert_eq!(
            serde_json::to_value(&claims)?,
            json!({ "roles": ["cliente", "operador"], "admin": false, "operador": true, "cliente": true })
        );

        let stored = pipeline.store.get(&doc).unwrap();
        assert!(stored.last_claims_sync().is_some());
        assert_eq!(stored.get("email"), Some(&json!("ana@example.com")));
        Ok(())
    }

    #[tokio::test]
    async fn unrelated_field_update_does_nothing() -> anyhow::Result<()> {
        let pipeline = setup();
        let doc = user_doc("u-2");

        pipeline.store.set(&doc, UserRecord::with_roles(["admin"]))?;
        pipeline
            .store
            .set(&doc, UserRecord::with_roles(["admin"]).with_field("name", json!("Bruno")))?;

        let stats = pipeline.worker.shutdown().await?;

        assert_eq!(pipeline.identity.call_count(), 1);
        assert_eq!(stats.failed, 0);
        Ok(())
    }

    #[tokio::test]
    async fn deletion_and_other_collections_are_ignored() -> anyhow::Result<()> {
        let pipeline = setup();

        pipeline
            .store
            .set(&DocumentRef::new("orders", "o-1")?, UserRecord::with_roles(["admin"]))?;
        pipeline.store.set(&user_doc("u-3"), UserRecord::new())?;
        pipeline.store.delete(&user_doc("u-3"))?;

        let stats = pipeline.worker.shutdown().await?;

        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.handled, 2);
        assert_eq!(pipeline.identity.call_count(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn identity_failure_leaves_document_untouched() -> anyhow::Result<()> {
        let pipeline = setup();
        let doc = user_doc("u-4");
        pipeline
            .identity
            .fail_with(Some(IdentityError::PermissionDenied("service account lacks role".into())));

        pipeline.store.set(&doc, UserRecord::with_roles(["admin"]))?;
        let stats = pipeline.worker.shutdown().await?;

        assert_eq!(stats.failed, 1);
        assert!(pipeline.identity.claims_for(&uid("u-4")).is_none());
        assert!(pipeline.store.get(&doc).unwrap().last_claims_sync().is_none());
        Ok(())
    }

    #[tokio::test]
    async fn timestamp_failure_keeps_claims() -> anyhow::Result<()> {
        let pipeline = setup();
        let doc = user_doc("u-5");
        pipeline
            .store
            .inner()
            .fail_merges(Some(StoreError::Unavailable("quota exceeded".into())));

        pipeline.store.set(&doc, UserRecord::with_roles(["operador"]))?;
        let stats = pipeline.worker.shutdown().await?;

        assert_eq!(stats.failed, 1);
        assert!(pipeline.identity.claims_for(&uid("u-5")).unwrap().operador);
        assert!(pipeline.store.get(&doc).unwrap().last_claims_sync().is_none());
        Ok(())
    }

    #[tokio::test]
    async fn synchronizer_can_be_called_directly() -> anyhow::Result<()> {
        let pipeline = setup();
        let before = UserRecord::with_roles(["cliente"]);
        let after = UserRecord::with_roles(["cliente", "admin"]);

        let outcome = pipeline
            .synchronizer
            .handle_change(&uid("u-6"), Some(&before), Some(&after))
            .await?;

        assert!(!outcome.is_noop());
        // The merge created the document and notified the worker.
        assert!(pipeline.store.get(&user_doc("u-6")).unwrap().last_claims_sync().is_some());

        let stats = pipeline.worker.shutdown().await?;
        assert_eq!(stats.handled, 1);
        assert_eq!(pipeline.identity.call_count(), 1);
        Ok(())
    }
}
