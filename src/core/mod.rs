/// Cart management - adding, updating and removing cart lines
pub mod cart;
/// Order placement, order queries and status transitions
pub mod order;
/// Catalog management - product creation, listing and administrative updates
pub mod product;
/// User lookups and role checks
pub mod user;
