//! Cart business logic - a user's pending purchase.
//!
//! Adding or resizing a line checks that the product currently has enough stock. That check
//! is advisory: stock is only reserved when the order is placed.

use crate::{
    core::{product::require_product, user::require_user},
    entities::{CartLine, Product, cart_line, product},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::{debug, instrument};

/// A cart line together with the product it references
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CartItem {
    /// The stored cart line
    pub line: cart_line::Model,
    /// The referenced product, as currently stored
    pub product: product::Model,
}

impl CartItem {
    /// `quantity × current unit price`
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        Decimal::from(self.line.quantity) * self.product.price
    }
}

fn validate_quantity(quantity: i32) -> Result<()> {
    if quantity < 1 {
        return Err(Error::InvalidQuantity { quantity });
    }
    Ok(())
}

fn ensure_stock(product: &product::Model, quantity: i32) -> Result<()> {
    if product.stock < quantity {
        return Err(Error::InsufficientStock {
            product_id: product.id,
            requested: quantity,
            available: product.stock,
        });
    }
    Ok(())
}

/// Loads a user's cart lines joined to their products, in the order they were added.
pub async fn list_cart<C>(db: &C, user_id: i64) -> Result<Vec<CartItem>>
where
    C: ConnectionTrait,
{
    CartLine::find()
        .filter(cart_line::Column::UserId.eq(user_id))
        .order_by_asc(cart_line::Column::Id)
        .find_also_related(Product)
        .all(db)
        .await?
        .into_iter()
        .map(|(line, product)| {
            let product = product.ok_or(Error::ProductNotFound {
                id: line.product_id,
            })?;
            Ok(CartItem { line, product })
        })
        .collect()
}

/// Adds a product to the user's cart as a new line.
///
/// # Errors
/// Returns an error if:
/// - The quantity is below one
/// - The user or product does not exist
/// - The product has fewer than `quantity` units in stock
#[instrument(skip(db))]
pub async fn add_to_cart(
    db: &DatabaseConnection,
    user_id: i64,
    product_id: i64,
    quantity: i32,
) -> Result<CartItem> {
    validate_quantity(quantity)?;
    require_user(db, user_id).await?;
    let product = require_product(db, product_id).await?;
    ensure_stock(&product, quantity)?;

    let now = Utc::now();
    let line = cart_line::ActiveModel {
        user_id: Set(user_id),
        product_id: Set(product_id),
        quantity: Set(quantity),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    debug!(line_id = line.id, "Added cart line");
    Ok(CartItem { line, product })
}

/// Loads a cart line and checks that it belongs to `user_id`.
async fn find_owned_line(
    db: &DatabaseConnection,
    user_id: i64,
    line_id: i64,
    action: &'static str,
) -> Result<cart_line::Model> {
    let line = CartLine::find_by_id(line_id)
        .one(db)
        .await?
        .ok_or(Error::CartLineNotFound { id: line_id })?;

    if line.user_id != user_id {
        return Err(Error::Forbidden { user_id, action });
    }
    Ok(line)
}

/// Changes the quantity of one of the user's cart lines.
///
/// # Errors
/// Returns an error if:
/// - The quantity is below one
/// - The line does not exist or belongs to someone else
/// - The product has fewer than `quantity` units in stock
#[instrument(skip(db))]
pub async fn update_cart_line(
    db: &DatabaseConnection,
    user_id: i64,
    line_id: i64,
    quantity: i32,
) -> Result<CartItem> {
    validate_quantity(quantity)?;
    let line = find_owned_line(db, user_id, line_id, "update this cart line").await?;
    let product = require_product(db, line.product_id).await?;
    ensure_stock(&product, quantity)?;

    let mut active: cart_line::ActiveModel = line.into();
    active.quantity = Set(quantity);
    active.updated_at = Set(Utc::now());
    let line = active.update(db).await?;

    Ok(CartItem { line, product })
}

/// Removes one of the user's cart lines.
///
/// # Errors
/// Returns an error if the line does not exist or belongs to someone else.
#[instrument(skip(db))]
pub async fn remove_cart_line(db: &DatabaseConnection, user_id: i64, line_id: i64) -> Result<()> {
    let line = find_owned_line(db, user_id, line_id, "remove this cart line").await?;
    line.delete(db).await?;
    Ok(())
}
