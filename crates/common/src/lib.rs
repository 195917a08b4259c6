//! Identifiers shared by every service taking part in the order saga.

pub mod types;

pub use types::{EventId, OrderId, TransactionId};
