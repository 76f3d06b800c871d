use crate::RecordChange;

/// Messages that belong to one document collection.
///
/// Workers pinned to a collection use this to skip notifications for
/// documents they do not own.
pub trait CollectionScoped {
    fn collection(&self) -> &str;
}

impl CollectionScoped for RecordChange {
    fn collection(&self) -> &str {
        self.document().collection()
    }
}
