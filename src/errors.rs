//! Unified error type for the storefront.
//!
//! Every fallible operation in the crate returns [`Result`]. Variants are grouped loosely
//! by the layer that raises them: validation, lookups and authorization, then persistence.

use crate::entities::order::OrderStatus;
use rust_decimal::Decimal;
use sea_orm::DbErr;
use thiserror::Error;

/// Errors raised by catalog, cart and order operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be read or parsed
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// Underlying database failure outside of order placement
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    /// The user tried to place an order with nothing in the cart
    #[error("Cart is empty")]
    EmptyCart,

    /// Something failed inside the order placement transaction; everything was rolled back
    #[error("Order creation failed: {reason}")]
    OrderCreationFailed {
        /// Underlying cause, kept for logs
        reason: String,
    },

    /// Not enough units left to satisfy a cart line or order line
    #[error("Not enough stock for product {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        /// Product that ran short
        product_id: i64,
        /// Units asked for
        requested: i32,
        /// Units on hand when checked
        available: i32,
    },

    /// Quantities must be at least one
    #[error("Invalid quantity: {quantity}")]
    InvalidQuantity {
        /// The rejected quantity
        quantity: i32,
    },

    /// Prices must be non-negative
    #[error("Invalid price: {price}")]
    InvalidPrice {
        /// The rejected price
        price: Decimal,
    },

    /// Stock counts must be non-negative
    #[error("Invalid stock: {stock}")]
    InvalidStock {
        /// The rejected stock count
        stock: i32,
    },

    /// Client input that failed validation
    #[error("Invalid input: {message}")]
    Validation {
        /// What was wrong with the input
        message: String,
    },

    /// The product is referenced by order history and cannot be deleted
    #[error("Product {id} has order history and cannot be deleted")]
    ProductInUse {
        /// Product id
        id: i64,
    },

    /// A product name was blank
    #[error("Invalid product name")]
    InvalidName,

    /// No user with this id
    #[error("User not found: {id}")]
    UserNotFound {
        /// Requested user id
        id: i64,
    },

    /// No product with this id
    #[error("Product not found: {id}")]
    ProductNotFound {
        /// Requested product id
        id: i64,
    },

    /// No cart line with this id
    #[error("Cart line not found: {id}")]
    CartLineNotFound {
        /// Requested cart line id
        id: i64,
    },

    /// No order with this id
    #[error("Order not found: {id}")]
    OrderNotFound {
        /// Requested order id
        id: i64,
    },

    /// The caller is not allowed to touch this resource
    #[error("User {user_id} is not allowed to {action}")]
    Forbidden {
        /// Acting user
        user_id: i64,
        /// Short description of the refused action
        action: &'static str,
    },

    /// A status string outside the fixed enumeration
    #[error("Unknown order status: {value}")]
    UnknownStatus {
        /// The rejected value
        value: String,
    },

    /// The order status machine does not allow this move
    #[error("Cannot move order from {from} to {to}")]
    InvalidStatusTransition {
        /// Current status
        from: OrderStatus,
        /// Requested status
        to: OrderStatus,
    },

    /// Filesystem failure while loading configuration
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
