//! Order payload and related types.

mod payload;
mod value_objects;

pub use payload::{Order, OrderRequest};
pub use value_objects::{Money, OrderProducts, Product, ProductCode};

use thiserror::Error;

/// Errors that can occur while building an order.
#[derive(Debug, Error)]
pub enum OrderError {
    /// Order has no products.
    #[error("Product list is empty")]
    NoProducts,

    /// A product line has a zero quantity.
    #[error("Invalid quantity for product {code} (must be greater than 0)")]
    InvalidQuantity { code: String },

    /// A product line has a negative unit value.
    #[error("Invalid unit value for product {code} (must not be negative)")]
    InvalidPrice { code: String },

    /// The order total or item count does not fit its numeric type.
    #[error("Order total is too large")]
    TotalOverflow,
}
