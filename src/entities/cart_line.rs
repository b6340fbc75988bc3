//! Cart line entity - One product and quantity in a user's pending cart.
//!
//! Lines live until they are removed, or consumed by order placement.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Cart line database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "cart_lines")]
pub struct Model {
    /// Unique identifier; ascending ids give insertion order
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owner of the cart
    pub user_id: i64,
    /// Product being bought
    pub product_id: i64,
    /// Units requested, always positive
    pub quantity: i32,
    /// When the line was added
    pub created_at: DateTimeUtc,
    /// When the quantity last changed
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between CartLine and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each cart line belongs to one user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
    /// Each cart line references one product
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id",
        on_delete = "Cascade"
    )]
    Product,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
