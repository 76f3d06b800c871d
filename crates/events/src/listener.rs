use std::sync::Arc;

use async_trait::async_trait;

use claimsync_core::{UserRecord, UserUid};

/// Capability to react to a user document being written.
///
/// This is the registration point between a change-delivery mechanism
/// (trigger runtime, changefeed consumer, in-memory worker) and whatever
/// reacts to the write. Implementations receive both snapshots:
///
/// - `before`: state prior to the write, `None` if the document did not exist
/// - `after`: state after the write, `None` if the write deleted the document
///
/// Delivery is at-least-once from the listener's point of view; listeners must
/// tolerate duplicates. Errors are reported back to the delivery mechanism,
/// which owns any retry policy.
#[async_trait]
pub trait ChangeListener: Send + Sync {
    type Error: core::fmt::Debug + core::fmt::Display + Send + Sync + 'static;

    async fn on_record_written(
        &self,
        before: Option<&UserRecord>,
        after: Option<&UserRecord>,
        uid: &UserUid,
    ) -> Result<(), Self::Error>;
}

#[async_trait]
impl<L> ChangeListener for Arc<L>
where
    L: ChangeListener + ?Sized,
{
    type Error = L::Error;

    async fn on_record_written(
        &self,
        before: Option<&UserRecord>,
        after: Option<&UserRecord>,
        uid: &UserUid,
    ) -> Result<(), Self::Error> {
        (**self).on_record_written(before, after, uid).await
    }
}
