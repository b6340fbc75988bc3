//! Order entity - An immutable record of a completed purchase.
//!
//! Only `status` changes after creation, and only along the transitions allowed by
//! [`OrderStatus::can_transition_to`]. Order placement always produces `pending`.

use crate::errors::Error;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Lifecycle state of an order
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Freshly placed, nothing done yet
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Being prepared
    #[sea_orm(string_value = "processing")]
    Processing,
    /// Handed to the carrier
    #[sea_orm(string_value = "shipped")]
    Shipped,
    /// Received by the customer
    #[sea_orm(string_value = "delivered")]
    Delivered,
    /// Abandoned before shipping
    #[sea_orm(string_value = "canceled")]
    Canceled,
}

impl OrderStatus {
    /// Lowercase wire name of the status
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Canceled => "canceled",
        }
    }

    /// Whether an order may move from `self` to `next`.
    ///
    /// `pending → {processing, canceled}`, `processing → {shipped, canceled}`,
    /// `shipped → delivered`. Delivered and canceled orders are terminal.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Processing | Self::Canceled)
                | (Self::Processing, Self::Shipped | Self::Canceled)
                | (Self::Shipped, Self::Delivered)
        )
    }

    /// Whether no further transition is possible
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Canceled)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "pending" => Ok(Self::Pending),
            "processing" => Ok(Self::Processing),
            "shipped" => Ok(Self::Shipped),
            "delivered" => Ok(Self::Delivered),
            "canceled" => Ok(Self::Canceled),
            other => Err(Error::UnknownStatus {
                value: other.to_string(),
            }),
        }
    }
}

/// Order database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    /// Unique identifier for the order
    #[sea_orm(primary_key)]
    pub id: i64,
    /// User who placed the order
    pub user_id: i64,
    /// Sum of `quantity × unit_price` over the order's lines
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub total_price: Decimal,
    /// Current lifecycle state
    pub status: OrderStatus,
    /// When the order was placed
    pub created_at: DateTimeUtc,
    /// When the status last changed
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Order and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each order belongs to one user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
    /// Line items of the order
    #[sea_orm(has_many = "super::order_line::Entity")]
    OrderLine,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::order_line::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderLine.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::Iterable;

    #[test]
    fn test_allowed_transitions() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Processing));
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Canceled));
        assert!(OrderStatus::Processing.can_transition_to(OrderStatus::Shipped));
        assert!(OrderStatus::Processing.can_transition_to(OrderStatus::Canceled));
        assert!(OrderStatus::Shipped.can_transition_to(OrderStatus::Delivered));
    }

    #[test]
    fn test_forbidden_transitions() {
        assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::Shipped));
        assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::Pending));
        assert!(!OrderStatus::Shipped.can_transition_to(OrderStatus::Canceled));
        assert!(!OrderStatus::Processing.can_transition_to(OrderStatus::Pending));
    }

    #[test]
    fn test_terminal_states_have_no_exit() {
        for terminal in [OrderStatus::Delivered, OrderStatus::Canceled] {
            assert!(terminal.is_terminal());
            for next in OrderStatus::iter() {
                assert!(!terminal.can_transition_to(next));
            }
        }
    }

    #[test]
    fn test_parse_status() {
        assert_eq!("shipped".parse::<OrderStatus>().ok(), Some(OrderStatus::Shipped));
        assert_eq!(" canceled ".parse::<OrderStatus>().ok(), Some(OrderStatus::Canceled));
        assert!(matches!(
            "lost".parse::<OrderStatus>(),
            Err(Error::UnknownStatus { value }) if value == "lost"
        ));
    }

    #[test]
    fn test_status_round_trips_through_display() {
        for status in OrderStatus::iter() {
            assert_eq!(status.to_string().parse::<OrderStatus>().ok(), Some(status));
        }
    }
}
