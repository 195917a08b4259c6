//! Orchestrated saga for order processing.
//!
//! The orchestrator starts every saga, routes each participant reply through
//! a fixed transition table and ends the saga by notifying the order
//! service. Participants run product validation, payment and inventory
//! steps and compensate them in reverse order when a later step fails.
//!
//! Events travel over a [`Publisher`]; [`InMemoryBus`] provides one ordered
//! channel per [`Topic`].

pub mod bus;
pub mod consumer;
pub mod coordinator;
pub mod error;
pub mod orchestrator;
pub mod participant;
pub mod publisher;
pub mod services;
pub mod topic;
pub mod transition;

pub use bus::InMemoryBus;
pub use consumer::{spawn_consumer, spawn_orchestrator, spawn_participant};
pub use coordinator::SagaCoordinator;
pub use error::{Result, SagaError};
pub use orchestrator::Orchestrator;
pub use participant::{Participant, ParticipantHandler};
pub use publisher::{Publisher, RecordingPublisher};
pub use services::{InventoryService, PaymentService, ProductValidationService};
pub use topic::Topic;
pub use transition::{STANDARD_RULES, TransitionRule, TransitionTable};
