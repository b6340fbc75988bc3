//! Boundary contract consumed by the HTTP routing layer.
//!
//! Each handler takes an already-authenticated user id, calls into [`crate::core`] and
//! returns an [`ApiResponse`]: a status code plus a JSON body using the storefront's wire
//! field names (`commandeId`, `totalPrix`, `orderItems`, ...). Errors become
//! `{"message": "..."}` bodies with the matching status.

use crate::{
    core::{
        cart::{self, CartItem},
        order::{self, OrderDetails, OrderLineDetails},
        product::{self, ProductChanges, ProductPage, ProductQuery},
        user,
    },
    entities::{OrderStatus, product::Model as ProductModel},
    errors::Error,
};
use chrono::{DateTime, Utc};
use http::StatusCode;
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::error;

/// Status code and JSON body handed back to the transport layer
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    /// HTTP status
    pub status: StatusCode,
    /// JSON body; `Value::Null` for 204
    pub body: Value,
}

impl ApiResponse {
    fn json<T: Serialize>(status: StatusCode, payload: &T) -> Self {
        match serde_json::to_value(payload) {
            Ok(body) => Self { status, body },
            Err(e) => {
                error!("Failed to serialize response body: {}", e);
                Self::message(StatusCode::INTERNAL_SERVER_ERROR, "Server error")
            }
        }
    }

    fn message(status: StatusCode, message: &str) -> Self {
        Self {
            status,
            body: json!({ "message": message }),
        }
    }

    const fn no_content() -> Self {
        Self {
            status: StatusCode::NO_CONTENT,
            body: Value::Null,
        }
    }
}

impl From<Error> for ApiResponse {
    fn from(err: Error) -> Self {
        let (status, message) = match &err {
            Error::EmptyCart => (StatusCode::BAD_REQUEST, "Cart is empty".to_string()),
            Error::InsufficientStock { .. } => {
                (StatusCode::BAD_REQUEST, "Not enough stock".to_string())
            }
            Error::OrderCreationFailed { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Order creation failed".to_string(),
            ),
            Error::UserNotFound { .. } => (StatusCode::UNAUTHORIZED, "Unauthenticated.".to_string()),
            Error::Forbidden { .. } => (StatusCode::FORBIDDEN, "Unauthorized.".to_string()),
            Error::ProductNotFound { .. }
            | Error::CartLineNotFound { .. }
            | Error::OrderNotFound { .. } => (StatusCode::NOT_FOUND, "Not found.".to_string()),
            Error::ProductInUse { .. } => (StatusCode::CONFLICT, err.to_string()),
            Error::InvalidQuantity { .. }
            | Error::Validation { .. }
            | Error::InvalidPrice { .. }
            | Error::InvalidStock { .. }
            | Error::InvalidName
            | Error::UnknownStatus { .. }
            | Error::InvalidStatusTransition { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, err.to_string())
            }
            Error::Config { .. } | Error::Database(_) | Error::Io(_) => {
                error!("Request failed: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Server error".to_string())
            }
        };
        Self::message(status, &message)
    }
}

/// Product as embedded in cart and order payloads and listed in the catalog
#[derive(Debug, Serialize)]
pub struct ProductBody {
    /// Product id
    pub id: i64,
    /// Display name
    #[serde(rename = "nom")]
    pub name: String,
    /// Description, omitted when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Current unit price
    #[serde(rename = "prix", with = "rust_decimal::serde::float")]
    pub price: Decimal,
    /// Current stock
    pub stock: i32,
}

impl From<&ProductModel> for ProductBody {
    fn from(product: &ProductModel) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price,
            stock: product.stock,
        }
    }
}

/// One line of an order payload
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemBody {
    /// Line id
    pub order_item_id: i64,
    /// Owning order
    pub commande_id: i64,
    /// Product bought
    pub produit_id: i64,
    /// Units bought
    pub quantite: i32,
    /// Snapshotted unit price
    #[serde(with = "rust_decimal::serde::float")]
    pub prix: Decimal,
    /// When the line was written
    #[serde(rename = "created_at")]
    pub created_at: DateTime<Utc>,
    /// The product as currently stored
    pub product: ProductBody,
}

impl From<&OrderLineDetails> for OrderItemBody {
    fn from(details: &OrderLineDetails) -> Self {
        Self {
            order_item_id: details.line.id,
            commande_id: details.line.order_id,
            produit_id: details.line.product_id,
            quantite: details.line.quantity,
            prix: details.line.unit_price,
            created_at: details.line.created_at,
            product: ProductBody::from(&details.product),
        }
    }
}

/// Order payload with nested items
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderBody {
    /// Order id
    pub commande_id: i64,
    /// Buyer
    pub user_id: i64,
    /// Order total
    #[serde(with = "rust_decimal::serde::float")]
    pub total_prix: Decimal,
    /// Lifecycle state
    pub stat: OrderStatus,
    /// When the order was placed
    #[serde(rename = "created_at")]
    pub created_at: DateTime<Utc>,
    /// When the status last changed
    #[serde(rename = "updated_at")]
    pub updated_at: DateTime<Utc>,
    /// Lines of the order
    pub order_items: Vec<OrderItemBody>,
}

impl From<&OrderDetails> for OrderBody {
    fn from(details: &OrderDetails) -> Self {
        Self {
            commande_id: details.order.id,
            user_id: details.order.user_id,
            total_prix: details.order.total_price,
            stat: details.order.status,
            created_at: details.order.created_at,
            updated_at: details.order.updated_at,
            order_items: details.lines.iter().map(OrderItemBody::from).collect(),
        }
    }
}

/// Cart line payload
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineBody {
    /// Cart line id
    pub id: i64,
    /// Owner of the cart
    pub user_id: i64,
    /// Product in the cart
    pub produit_id: i64,
    /// Units requested
    pub quantite: i32,
    /// The referenced product
    pub product: ProductBody,
}

impl From<&CartItem> for CartLineBody {
    fn from(item: &CartItem) -> Self {
        Self {
            id: item.line.id,
            user_id: item.line.user_id,
            produit_id: item.line.product_id,
            quantite: item.line.quantity,
            product: ProductBody::from(&item.product),
        }
    }
}

/// Pagination block of a product listing
#[derive(Debug, Serialize)]
pub struct PageMeta {
    /// Page served
    pub current_page: u64,
    /// Page size applied
    pub per_page: u64,
    /// Matching products
    pub total: u64,
    /// Last page number
    pub last_page: u64,
}

/// Product listing payload
#[derive(Debug, Serialize)]
pub struct ProductPageBody {
    /// Products on the page
    pub data: Vec<ProductBody>,
    /// Pagination details
    pub meta: PageMeta,
}

impl From<&ProductPage> for ProductPageBody {
    fn from(page: &ProductPage) -> Self {
        Self {
            data: page.items.iter().map(ProductBody::from).collect(),
            meta: PageMeta {
                current_page: page.page,
                per_page: page.per_page,
                total: page.total,
                last_page: page.last_page,
            },
        }
    }
}

/// Body of an add-to-cart request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    /// Product to add
    pub produit_id: i64,
    /// Units to add
    pub quantite: i32,
}

/// Body of a cart quantity update
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateCartRequest {
    /// New quantity
    pub quantite: i32,
}

/// Body of an order status update
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateStatusRequest {
    /// Requested status name
    pub stat: String,
}

/// Body of a product creation request
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProductRequest {
    /// Display name
    pub nom: String,
    /// Optional description
    #[serde(default)]
    pub description: Option<String>,
    /// Unit price
    pub prix: Decimal,
    /// Initial stock
    pub stock: i32,
}

/// Body of a product update request; absent fields are left alone
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProductRequest {
    /// New name
    #[serde(default)]
    pub nom: Option<String>,
    /// New description
    #[serde(default)]
    pub description: Option<String>,
    /// New unit price
    #[serde(default)]
    pub prix: Option<Decimal>,
    /// New stock, set directly
    #[serde(default)]
    pub stock: Option<i32>,
}

/// `POST /commandes` - places an order from the caller's cart.
///
/// 201 with the order, 400 "Cart is empty", 500 "Order creation failed".
pub async fn place_order(db: &DatabaseConnection, user_id: i64) -> ApiResponse {
    match order::place_order(db, user_id).await {
        Ok(details) => ApiResponse::json(StatusCode::CREATED, &OrderBody::from(&details)),
        Err(Error::Database(e)) => {
            error!("Order placement failed before the transaction: {}", e);
            ApiResponse::message(StatusCode::INTERNAL_SERVER_ERROR, "Order creation failed")
        }
        Err(e) => e.into(),
    }
}

/// `GET /commandes` - the caller's orders, or every order for admins.
pub async fn list_orders(db: &DatabaseConnection, user_id: i64) -> ApiResponse {
    match order::list_orders(db, user_id).await {
        Ok(orders) => {
            let bodies: Vec<OrderBody> = orders.iter().map(OrderBody::from).collect();
            ApiResponse::json(StatusCode::OK, &bodies)
        }
        Err(e) => e.into(),
    }
}

/// `GET /commandes/{id}`
pub async fn show_order(db: &DatabaseConnection, user_id: i64, order_id: i64) -> ApiResponse {
    match order::get_order(db, user_id, order_id).await {
        Ok(details) => ApiResponse::json(StatusCode::OK, &OrderBody::from(&details)),
        Err(e) => e.into(),
    }
}

/// `PUT /commandes/{id}` - admin status change.
pub async fn update_order_status(
    db: &DatabaseConnection,
    user_id: i64,
    order_id: i64,
    request: &UpdateStatusRequest,
) -> ApiResponse {
    if let Err(e) = user::require_admin(db, user_id, "update order status").await {
        return e.into();
    }
    let status = match request.stat.parse::<OrderStatus>() {
        Ok(status) => status,
        Err(e) => return e.into(),
    };
    match order::update_order_status(db, user_id, order_id, status).await {
        Ok(details) => ApiResponse::json(StatusCode::OK, &OrderBody::from(&details)),
        Err(e) => e.into(),
    }
}

/// `GET /panier`
pub async fn list_cart(db: &DatabaseConnection, user_id: i64) -> ApiResponse {
    let result = match user::require_user(db, user_id).await {
        Ok(_) => cart::list_cart(db, user_id).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(items) => {
            let bodies: Vec<CartLineBody> = items.iter().map(CartLineBody::from).collect();
            ApiResponse::json(StatusCode::OK, &bodies)
        }
        Err(e) => e.into(),
    }
}

/// `POST /panier`
pub async fn add_to_cart(
    db: &DatabaseConnection,
    user_id: i64,
    request: &AddToCartRequest,
) -> ApiResponse {
    match cart::add_to_cart(db, user_id, request.produit_id, request.quantite).await {
        Ok(item) => ApiResponse::json(StatusCode::CREATED, &CartLineBody::from(&item)),
        Err(e) => e.into(),
    }
}

/// `PUT /panier/{id}`
pub async fn update_cart_line(
    db: &DatabaseConnection,
    user_id: i64,
    line_id: i64,
    request: &UpdateCartRequest,
) -> ApiResponse {
    match cart::update_cart_line(db, user_id, line_id, request.quantite).await {
        Ok(item) => ApiResponse::json(StatusCode::OK, &CartLineBody::from(&item)),
        Err(e) => e.into(),
    }
}

/// `DELETE /panier/{id}` - 204 on success.
pub async fn remove_cart_line(db: &DatabaseConnection, user_id: i64, line_id: i64) -> ApiResponse {
    match cart::remove_cart_line(db, user_id, line_id).await {
        Ok(()) => ApiResponse::no_content(),
        Err(e) => e.into(),
    }
}

/// `GET /products` - public catalog listing.
pub async fn list_products(db: &DatabaseConnection, query: &ProductQuery) -> ApiResponse {
    match product::list_products(db, query).await {
        Ok(page) => ApiResponse::json(StatusCode::OK, &ProductPageBody::from(&page)),
        Err(e) => e.into(),
    }
}

/// `GET /products/{id}`
pub async fn show_product(db: &DatabaseConnection, product_id: i64) -> ApiResponse {
    match product::require_product(db, product_id).await {
        Ok(found) => ApiResponse::json(StatusCode::OK, &ProductBody::from(&found)),
        Err(e) => e.into(),
    }
}

/// `DELETE /products/{id}` - admin only, 204 on success.
pub async fn delete_product(db: &DatabaseConnection, user_id: i64, product_id: i64) -> ApiResponse {
    if let Err(e) = user::require_admin(db, user_id, "delete products").await {
        return e.into();
    }
    match product::delete_product(db, product_id).await {
        Ok(()) => ApiResponse::no_content(),
        Err(e) => e.into(),
    }
}

/// `POST /products` - admin only.
pub async fn create_product(
    db: &DatabaseConnection,
    user_id: i64,
    request: CreateProductRequest,
) -> ApiResponse {
    if let Err(e) = user::require_admin(db, user_id, "create products").await {
        return e.into();
    }
    match product::create_product(
        db,
        request.nom,
        request.description,
        request.prix,
        request.stock,
    )
    .await
    {
        Ok(created) => ApiResponse::json(StatusCode::CREATED, &ProductBody::from(&created)),
        Err(e) => e.into(),
    }
}

/// `PUT /products/{id}` - admin only; stock is set directly.
pub async fn update_product(
    db: &DatabaseConnection,
    user_id: i64,
    product_id: i64,
    request: UpdateProductRequest,
) -> ApiResponse {
    if let Err(e) = user::require_admin(db, user_id, "update products").await {
        return e.into();
    }
    let changes = ProductChanges {
        name: request.nom,
        description: request.description.map(Some),
        price: request.prix,
        stock: request.stock,
    };
    match product::update_product(db, product_id, changes).await {
        Ok(updated) => ApiResponse::json(StatusCode::OK, &ProductBody::from(&updated)),
        Err(e) => e.into(),
    }
}
