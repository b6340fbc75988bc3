//! Database configuration module for the storefront.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with `Schema::create_table_from_entity`,
//! so the schema always matches the Rust models without hand-written SQL.

use crate::entities::{CartLine, Order, OrderLine, Product, User};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};
use tracing::{debug, info};

/// Default database location when `DATABASE_URL` is not set
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/storefront.sqlite?mode=rwc";

/// Gets the database URL from the environment or returns the default `SQLite` path.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the database named by `DATABASE_URL`.
///
/// Falls back to [`DEFAULT_DATABASE_URL`] if no environment variable is set.
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url();
    if database_url == DEFAULT_DATABASE_URL {
        std::fs::create_dir_all("data")?;
    }
    debug!("Connecting to database at {}", database_url);
    Database::connect(&database_url).await.map_err(Into::into)
}

/// Creates all tables from the entity definitions, skipping the ones that already exist.
///
/// Referenced tables are created before the tables holding foreign keys to them.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut users = schema.create_table_from_entity(User);
    let mut products = schema.create_table_from_entity(Product);
    let mut cart_lines = schema.create_table_from_entity(CartLine);
    let mut orders = schema.create_table_from_entity(Order);
    let mut order_lines = schema.create_table_from_entity(OrderLine);

    for table in [
        users.if_not_exists(),
        products.if_not_exists(),
        cart_lines.if_not_exists(),
        orders.if_not_exists(),
        order_lines.if_not_exists(),
    ] {
        db.execute(builder.build(&*table)).await?;
    }

    info!("Database tables ensured");
    Ok(())
}
