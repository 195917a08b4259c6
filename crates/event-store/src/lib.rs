//! Persistence of saga event snapshots.
//!
//! The order service stores the full [`domain::Event`] when a saga starts and
//! again when it ends. Snapshots are keyed by event ID and only ever read back
//! for auditing; the saga itself never depends on them.

pub mod error;
pub mod memory;
pub mod postgres;
pub mod query;
pub mod store;

pub use error::{EventStoreError, Result};
pub use memory::InMemoryEventStore;
pub use postgres::PostgresEventStore;
pub use query::EventFilters;
pub use store::{EventStore, EventStoreExt};
