//! Adapters: concrete implementations of the outbound ports

pub mod event_store;
pub mod sender_cache;
pub mod snapshot;

pub use event_store::InMemoryEventStore;
pub use sender_cache::{SenderCache, DEFAULT_SENDER_CACHE_SIZE};
pub use snapshot::{EpochSnapshotStore, EpochState, DEFAULT_RETAINED_EPOCHS};
