//! Domain model shared by the orchestrator, the participants and the order service.
//!
//! This crate provides:
//! - The order payload carried by every saga event
//! - The saga event itself with its append-only execution history
//! - The source and status enums the transition table is keyed on

pub mod error;
pub mod event;
pub mod order;

pub use error::DomainError;
pub use event::{Event, EventSource, History, SagaStatus};
pub use order::{Money, Order, OrderError, OrderProducts, OrderRequest, Product, ProductCode};
