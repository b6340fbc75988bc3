//! Product entity - Represents a catalog item with a unit price and stock count.
//!
//! Stock is decremented by order placement and set directly by catalog administration.
//! Prices use fixed-point decimals with two fractional digits.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Product database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    /// Unique identifier for the product
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name of the product (e.g., "Laptop")
    pub name: String,
    /// Optional free-form description
    #[sea_orm(nullable)]
    pub description: Option<String>,
    /// Current unit price
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub price: Decimal,
    /// Units available for purchase
    pub stock: i32,
    /// When the product was created
    pub created_at: DateTimeUtc,
    /// When the product was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Product and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Cart lines referencing this product
    #[sea_orm(has_many = "super::cart_line::Entity")]
    CartLine,
    /// Order lines referencing this product
    #[sea_orm(has_many = "super::order_line::Entity")]
    OrderLine,
}

impl Related<super::cart_line::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CartLine.def()
    }
}

impl Related<super::order_line::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderLine.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
