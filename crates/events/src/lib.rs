//! Change notifications for user records and the listener capability that
//! consumes them.

pub mod bus;
pub mod change;
pub mod in_memory_bus;
pub mod listener;
pub mod scope;

pub use bus::{EventBus, Subscription};
pub use change::RecordChange;
pub use in_memory_bus::{InMemoryBusError, InMemoryEventBus};
pub use listener::ChangeListener;
pub use scope::CollectionScoped;
