//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod cart_line;
pub mod order;
pub mod order_line;
pub mod product;
pub mod user;

// Re-export entity types and enums used across modules
pub use cart_line::Entity as CartLine;
pub use order::{Entity as Order, OrderStatus};
pub use order_line::Entity as OrderLine;
pub use product::Entity as Product;
pub use user::{Entity as User, UserRole};
