//! User entity - The identity records the auth layer resolves callers to.
//!
//! Only the fields order handling needs are stored: a display name, a unique email
//! and a role deciding whether the caller may administer orders and the catalog.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Role attached to a user account
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Regular shopper
    #[sea_orm(string_value = "customer")]
    Customer,
    /// Back-office operator
    #[sea_orm(string_value = "admin")]
    Admin,
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Customer => f.write_str("customer"),
            Self::Admin => f.write_str("admin"),
        }
    }
}

/// User database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Unique identifier for the user
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name
    pub name: String,
    /// Login email, unique across users
    #[sea_orm(unique)]
    pub email: String,
    /// Access role
    pub role: UserRole,
    /// When the account was created
    pub created_at: DateTimeUtc,
}

impl Model {
    /// Whether this user may administer orders and products
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// Defines relationships between User and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// A user's pending cart
    #[sea_orm(has_many = "super::cart_line::Entity")]
    CartLine,
    /// Orders placed by the user
    #[sea_orm(has_many = "super::order::Entity")]
    Order,
}

impl Related<super::cart_line::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CartLine.def()
    }
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
