//! Shared test utilities for the storefront.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    core::{product, user},
    entities::{self, UserRole},
    errors::Result,
};
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;
use std::str::FromStr;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Parses a decimal literal such as `"749.99"`.
///
/// # Panics
/// Panics on malformed input; only meant for literals in tests.
#[allow(clippy::unwrap_used)]
pub fn price(value: &str) -> Decimal {
    Decimal::from_str(value).unwrap()
}

/// Creates a customer whose email is derived from `name`.
pub async fn create_test_user(
    db: &DatabaseConnection,
    name: &str,
) -> Result<entities::user::Model> {
    user::create_user(
        db,
        name.to_string(),
        format!("{name}@example.com"),
        UserRole::Customer,
    )
    .await
}

/// Creates an admin whose email is derived from `name`.
pub async fn create_test_admin(
    db: &DatabaseConnection,
    name: &str,
) -> Result<entities::user::Model> {
    user::create_user(
        db,
        name.to_string(),
        format!("{name}@example.com"),
        UserRole::Admin,
    )
    .await
}

/// Creates a test product with sensible defaults.
///
/// # Defaults
/// * price: 10.00
/// * stock: 10
pub async fn create_test_product(
    db: &DatabaseConnection,
    name: &str,
) -> Result<entities::product::Model> {
    create_custom_product(db, name, "10.00", 10).await
}

/// Creates a test product with a custom price and stock.
pub async fn create_custom_product(
    db: &DatabaseConnection,
    name: &str,
    unit_price: &str,
    stock: i32,
) -> Result<entities::product::Model> {
    product::create_product(db, name.to_string(), None, price(unit_price), stock).await
}

/// Sets up a complete test environment with one customer.
/// Returns (db, customer) for common test scenarios.
pub async fn setup_with_customer() -> Result<(DatabaseConnection, entities::user::Model)> {
    let db = setup_test_db().await?;
    let customer = create_test_user(&db, "alice").await?;
    Ok((db, customer))
}
