//! In-memory saga participants.

pub mod inventory;
pub mod payment;
pub mod product_validation;

pub use inventory::{InventoryService, OrderInventory};
pub use payment::{Payment, PaymentService, PaymentStatus};
pub use product_validation::ProductValidationService;

use common::{OrderId, TransactionId};
use domain::Order;

/// Product codes every participant knows out of the box.
pub const DEFAULT_CATALOG: [&str; 4] = ["COMIC_BOOKS", "BOOKS", "MOVIES", "MUSIC"];

/// Local state of every participant is keyed by the saga it belongs to.
type SagaKey = (OrderId, TransactionId);

fn saga_key(order: &Order) -> SagaKey {
    (order.id, order.transaction_id.clone())
}
