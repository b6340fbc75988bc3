//! Order business logic - order placement, order queries and status transitions.
//!
//! [`place_order`] turns a user's cart into an order inside one database transaction:
//! the order row, one line per cart line with the price snapshotted, the stock decrements
//! and the cart clearing either all commit together or are all rolled back.

use crate::{
    core::{
        cart::{CartItem, list_cart},
        product::decrement_stock,
        user::require_user,
    },
    entities::{
        CartLine, Order, OrderLine, OrderStatus, Product, cart_line, order, order_line, product,
        user,
    },
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::{debug, info, instrument, warn};

/// An order line together with the product it references
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderLineDetails {
    /// The stored line with its price snapshot
    pub line: order_line::Model,
    /// The product as currently stored (live stock, live price)
    pub product: product::Model,
}

/// An order with its lines and their products eagerly loaded
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderDetails {
    /// The order row
    pub order: order::Model,
    /// Lines in the order they were written
    pub lines: Vec<OrderLineDetails>,
}

/// Sum of `quantity × current unit price` over a cart.
#[must_use]
pub fn cart_total(cart: &[CartItem]) -> Decimal {
    cart.iter().map(CartItem::subtotal).sum()
}

fn creation_failed(err: impl std::fmt::Display) -> Error {
    Error::OrderCreationFailed {
        reason: err.to_string(),
    }
}

/// Places an order from everything in the user's cart.
///
/// The cart is read fresh, the total is computed from current product prices, then a
/// single transaction writes the `pending` order and its lines, decrements each product's
/// stock and deletes the user's cart lines. The returned order, with lines and products
/// attached, is read inside that same transaction so nothing fallible runs after commit.
///
/// # Errors
/// - [`Error::UserNotFound`] if `user_id` is unknown
/// - [`Error::EmptyCart`] if the cart has no lines; nothing is written
/// - [`Error::OrderCreationFailed`] for any failure inside the transaction, including a
///   product running short while decrementing; everything is rolled back
#[instrument(skip(db))]
pub async fn place_order(db: &DatabaseConnection, user_id: i64) -> Result<OrderDetails> {
    require_user(db, user_id).await?;

    let cart = list_cart(db, user_id).await?;
    if cart.is_empty() {
        debug!("Refusing to place an order from an empty cart");
        return Err(Error::EmptyCart);
    }
    let total = cart_total(&cart);

    let txn = db.begin().await.map_err(creation_failed)?;
    let details = match write_order(&txn, user_id, &cart, total).await {
        Ok(details) => details,
        Err(err) => {
            if let Err(rollback_err) = txn.rollback().await {
                warn!("Rollback of failed order placement errored: {}", rollback_err);
            }
            warn!("Order placement rolled back: {}", err);
            return Err(creation_failed(err));
        }
    };
    txn.commit().await.map_err(creation_failed)?;

    info!(
        order_id = details.order.id,
        total = %total,
        lines = cart.len(),
        "Order placed"
    );
    Ok(details)
}

/// Every write of order placement, run on the caller's transaction, followed by the
/// read of the resulting order.
async fn write_order<C>(
    txn: &C,
    user_id: i64,
    cart: &[CartItem],
    total: Decimal,
) -> Result<OrderDetails>
where
    C: ConnectionTrait,
{
    let now = Utc::now();
    let order = order::ActiveModel {
        user_id: Set(user_id),
        total_price: Set(total),
        status: Set(OrderStatus::Pending),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(txn)
    .await?;

    for item in cart {
        order_line::ActiveModel {
            order_id: Set(order.id),
            product_id: Set(item.product.id),
            quantity: Set(item.line.quantity),
            unit_price: Set(item.product.price),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(txn)
        .await?;

        decrement_stock(txn, item.product.id, item.line.quantity).await?;
    }

    CartLine::delete_many()
        .filter(cart_line::Column::UserId.eq(user_id))
        .exec(txn)
        .await?;

    load_order_details(txn, order).await
}

/// Attaches lines and their products to an order.
async fn load_order_details<C>(db: &C, order: order::Model) -> Result<OrderDetails>
where
    C: ConnectionTrait,
{
    let lines = OrderLine::find()
        .filter(order_line::Column::OrderId.eq(order.id))
        .order_by_asc(order_line::Column::Id)
        .find_also_related(Product)
        .all(db)
        .await?
        .into_iter()
        .map(|(line, product)| {
            let product = product.ok_or(Error::ProductNotFound {
                id: line.product_id,
            })?;
            Ok(OrderLineDetails { line, product })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(OrderDetails { order, lines })
}

fn ensure_can_view(user: &user::Model, order: &order::Model) -> Result<()> {
    if user.is_admin() || order.user_id == user.id {
        Ok(())
    } else {
        Err(Error::Forbidden {
            user_id: user.id,
            action: "view this order",
        })
    }
}

/// Lists orders visible to the user: every order for admins, their own otherwise.
pub async fn list_orders(db: &DatabaseConnection, user_id: i64) -> Result<Vec<OrderDetails>> {
    let user = require_user(db, user_id).await?;

    let mut select = Order::find().order_by_asc(order::Column::Id);
    if !user.is_admin() {
        select = select.filter(order::Column::UserId.eq(user.id));
    }

    let mut details = Vec::new();
    for order in select.all(db).await? {
        details.push(load_order_details(db, order).await?);
    }
    Ok(details)
}

/// Fetches one order; only its owner or an admin may see it.
///
/// # Errors
/// [`Error::OrderNotFound`] if absent, [`Error::Forbidden`] for other customers.
pub async fn get_order(db: &DatabaseConnection, user_id: i64, order_id: i64) -> Result<OrderDetails> {
    let user = require_user(db, user_id).await?;
    let order = Order::find_by_id(order_id)
        .one(db)
        .await?
        .ok_or(Error::OrderNotFound { id: order_id })?;
    ensure_can_view(&user, &order)?;
    load_order_details(db, order).await
}

/// Moves an order to a new status. Admin only.
///
/// # Errors
/// Returns an error if:
/// - The user is unknown or not an admin
/// - The order does not exist
/// - The status machine does not allow moving from the current status to `status`
#[instrument(skip(db))]
pub async fn update_order_status(
    db: &DatabaseConnection,
    user_id: i64,
    order_id: i64,
    status: OrderStatus,
) -> Result<OrderDetails> {
    crate::core::user::require_admin(db, user_id, "update order status").await?;

    let order = Order::find_by_id(order_id)
        .one(db)
        .await?
        .ok_or(Error::OrderNotFound { id: order_id })?;

    if !order.status.can_transition_to(status) {
        return Err(Error::InvalidStatusTransition {
            from: order.status,
            to: status,
        });
    }

    let previous = order.status;
    let mut active: order::ActiveModel = order.into();
    active.status = Set(status);
    active.updated_at = Set(Utc::now());
    let order = active.update(db).await?;

    info!(order_id, from = %previous, to = %status, "Order status updated");
    load_order_details(db, order).await
}
