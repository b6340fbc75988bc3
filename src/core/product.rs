//! Product business logic - Handles catalog operations.
//!
//! This module provides functions for creating, retrieving, listing and updating products,
//! plus the guarded stock decrement used by order placement. Administrative updates set the
//! stock directly; order placement is the only other path that changes it.

use crate::{
    config::catalog::CatalogConfig,
    entities::{OrderLine, Product, order_line, product},
    errors::{Error, Result},
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    Condition, Order, PaginatorTrait, QueryOrder, Set, TransactionTrait, prelude::*,
    sea_query::Expr,
};
use std::str::FromStr;
use tracing::{debug, info, instrument};

/// Largest page size `list_products` will return
pub const MAX_PER_PAGE: u64 = 100;
/// Page size used when the caller does not ask for one
pub const DEFAULT_PER_PAGE: u64 = 50;

/// Column a product listing is sorted by
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ProductSort {
    /// Alphabetical by name
    Name,
    /// By unit price
    Price,
    /// By units on hand
    Stock,
    /// By creation time
    #[default]
    CreatedAt,
    /// By last modification time
    UpdatedAt,
}

impl ProductSort {
    const fn column(self) -> product::Column {
        match self {
            Self::Name => product::Column::Name,
            Self::Price => product::Column::Price,
            Self::Stock => product::Column::Stock,
            Self::CreatedAt => product::Column::CreatedAt,
            Self::UpdatedAt => product::Column::UpdatedAt,
        }
    }
}

impl FromStr for ProductSort {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "nom" | "name" => Ok(Self::Name),
            "prix" | "price" => Ok(Self::Price),
            "stock" => Ok(Self::Stock),
            "created_at" => Ok(Self::CreatedAt),
            "updated_at" => Ok(Self::UpdatedAt),
            other => Err(Error::Validation {
                message: format!("Cannot sort products by {other}"),
            }),
        }
    }
}

/// Filters, ordering and pagination for [`list_products`]
#[derive(Clone, Debug)]
pub struct ProductQuery {
    /// Substring matched against name or description
    pub search: Option<String>,
    /// Inclusive lower price bound
    pub min_price: Option<Decimal>,
    /// Inclusive upper price bound
    pub max_price: Option<Decimal>,
    /// Sort column
    pub sort_by: ProductSort,
    /// Sort direction
    pub sort_dir: Order,
    /// 1-based page number
    pub page: u64,
    /// Items per page, clamped to `1..=MAX_PER_PAGE`
    pub per_page: u64,
}

impl Default for ProductQuery {
    fn default() -> Self {
        Self {
            search: None,
            min_price: None,
            max_price: None,
            sort_by: ProductSort::default(),
            sort_dir: Order::Desc,
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

/// One page of a product listing
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProductPage {
    /// Products on this page
    pub items: Vec<product::Model>,
    /// 1-based page number that was served
    pub page: u64,
    /// Page size that was applied
    pub per_page: u64,
    /// Number of products matching the filters
    pub total: u64,
    /// Last page number (at least 1)
    pub last_page: u64,
}

/// Optional field changes for [`update_product`]; `None` leaves a field untouched
#[derive(Clone, Debug, Default)]
pub struct ProductChanges {
    /// New name
    pub name: Option<String>,
    /// New description; `Some(None)` clears it
    pub description: Option<Option<String>>,
    /// New unit price
    pub price: Option<Decimal>,
    /// New stock count, set directly
    pub stock: Option<i32>,
}

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::InvalidName);
    }
    Ok(())
}

fn validate_price(price: Decimal) -> Result<()> {
    if price < Decimal::ZERO {
        return Err(Error::InvalidPrice { price });
    }
    Ok(())
}

fn validate_stock(stock: i32) -> Result<()> {
    if stock < 0 {
        return Err(Error::InvalidStock { stock });
    }
    Ok(())
}

/// Creates a new product, trimming the name and rounding the price to cents.
///
/// # Errors
/// Returns an error if:
/// - The product name is empty or whitespace-only
/// - The price or stock is negative
/// - The database insert operation fails
pub async fn create_product(
    db: &DatabaseConnection,
    name: String,
    description: Option<String>,
    price: Decimal,
    stock: i32,
) -> Result<product::Model> {
    validate_name(&name)?;
    validate_price(price)?;
    validate_stock(stock)?;

    let now = Utc::now();
    let product = product::ActiveModel {
        name: Set(name.trim().to_string()),
        description: Set(description),
        price: Set(price.round_dp(2)),
        stock: Set(stock),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    product.insert(db).await.map_err(Into::into)
}

/// Retrieves a specific product by its unique ID.
pub async fn get_product_by_id<C>(db: &C, product_id: i64) -> Result<Option<product::Model>>
where
    C: ConnectionTrait,
{
    Product::find_by_id(product_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a product by ID, failing with [`Error::ProductNotFound`] if absent.
pub async fn require_product<C>(db: &C, product_id: i64) -> Result<product::Model>
where
    C: ConnectionTrait,
{
    get_product_by_id(db, product_id)
        .await?
        .ok_or(Error::ProductNotFound { id: product_id })
}

/// Lists products matching `query`, one page at a time.
///
/// Ties on the sort column are broken by ascending id so paging is stable.
pub async fn list_products(db: &DatabaseConnection, query: &ProductQuery) -> Result<ProductPage> {
    let per_page = query.per_page.clamp(1, MAX_PER_PAGE);
    let page = query.page.max(1);

    let mut select = Product::find();
    if let Some(term) = query.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        select = select.filter(
            Condition::any()
                .add(product::Column::Name.contains(term))
                .add(product::Column::Description.contains(term)),
        );
    }
    if let Some(min) = query.min_price {
        select = select.filter(product::Column::Price.gte(min));
    }
    if let Some(max) = query.max_price {
        select = select.filter(product::Column::Price.lte(max));
    }

    let paginator = select
        .order_by(query.sort_by.column(), query.sort_dir.clone())
        .order_by_asc(product::Column::Id)
        .paginate(db, per_page);

    let counts = paginator.num_items_and_pages().await?;
    // Pages past the end are empty; skipping the fetch also keeps the offset from overflowing
    let items = if page > counts.number_of_pages {
        Vec::new()
    } else {
        paginator.fetch_page(page - 1).await?
    };

    Ok(ProductPage {
        items,
        page,
        per_page,
        total: counts.number_of_items,
        last_page: counts.number_of_pages.max(1),
    })
}

/// Applies administrative changes to a product. Stock is set, not adjusted.
///
/// # Errors
/// Returns an error if:
/// - The product does not exist
/// - A new name is blank, or a new price or stock is negative
/// - The database update operation fails
pub async fn update_product(
    db: &DatabaseConnection,
    product_id: i64,
    changes: ProductChanges,
) -> Result<product::Model> {
    if let Some(name) = &changes.name {
        validate_name(name)?;
    }
    if let Some(price) = changes.price {
        validate_price(price)?;
    }
    if let Some(stock) = changes.stock {
        validate_stock(stock)?;
    }

    let mut product: product::ActiveModel = require_product(db, product_id).await?.into();

    if let Some(name) = changes.name {
        product.name = Set(name.trim().to_string());
    }
    if let Some(description) = changes.description {
        product.description = Set(description);
    }
    if let Some(price) = changes.price {
        product.price = Set(price.round_dp(2));
    }
    if let Some(stock) = changes.stock {
        product.stock = Set(stock);
    }
    product.updated_at = Set(Utc::now());

    product.update(db).await.map_err(Into::into)
}

/// Deletes a product along with any cart lines that reference it.
///
/// Products that appear on an order line are kept so order history stays intact.
///
/// # Errors
/// [`Error::ProductNotFound`] if absent, [`Error::ProductInUse`] if any order references it.
#[instrument(skip(db))]
pub async fn delete_product(db: &DatabaseConnection, product_id: i64) -> Result<()> {
    let product = require_product(db, product_id).await?;

    let ordered = OrderLine::find()
        .filter(order_line::Column::ProductId.eq(product_id))
        .count(db)
        .await?;
    if ordered > 0 {
        return Err(Error::ProductInUse { id: product_id });
    }

    product.delete(db).await?;
    info!(product_id, "Product deleted");
    Ok(())
}

/// Decrements a product's stock by `quantity` in a single guarded statement.
///
/// The update only matches while `stock >= quantity`, so concurrent callers can never
/// drive the stock below zero. Runs on whatever connection or transaction it is given.
///
/// # Errors
/// [`Error::InsufficientStock`] if fewer than `quantity` units remain,
/// [`Error::ProductNotFound`] if the product vanished.
pub async fn decrement_stock<C>(db: &C, product_id: i64, quantity: i32) -> Result<()>
where
    C: ConnectionTrait,
{
    let result = Product::update_many()
        .col_expr(
            product::Column::Stock,
            Expr::col(product::Column::Stock).sub(quantity),
        )
        .col_expr(product::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(product::Column::Id.eq(product_id))
        .filter(product::Column::Stock.gte(quantity))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        let available = require_product(db, product_id).await?.stock;
        debug!(
            product_id,
            requested = quantity,
            available,
            "Stock decrement refused"
        );
        return Err(Error::InsufficientStock {
            product_id,
            requested: quantity,
            available,
        });
    }

    Ok(())
}

/// Inserts the seed catalog when the products table is empty.
///
/// Returns how many products were created; zero if the catalog already had entries.
#[instrument(skip(db, catalog))]
pub async fn seed_catalog(db: &DatabaseConnection, catalog: &CatalogConfig) -> Result<usize> {
    if Product::find().count(db).await? > 0 {
        debug!("Catalog already populated, skipping seed");
        return Ok(0);
    }

    for seed in &catalog.products {
        validate_name(&seed.name)?;
        validate_price(seed.price)?;
        validate_stock(seed.stock)?;
    }

    let txn = db.begin().await?;
    let now = Utc::now();
    for seed in &catalog.products {
        product::ActiveModel {
            name: Set(seed.name.trim().to_string()),
            description: Set(seed.description.clone()),
            price: Set(seed.price.round_dp(2)),
            stock: Set(seed.stock),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
    }
    txn.commit().await?;

    info!("Seeded {} products", catalog.products.len());
    Ok(catalog.products.len())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::config::catalog::parse_catalog;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_create_product_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        // Test empty name validation
        let result = create_product(&db, String::new(), None, price("10.00"), 1).await;
        assert!(matches!(result.unwrap_err(), Error::InvalidName));

        // Test whitespace-only name validation
        let result = create_product(&db, "   ".to_string(), None, price("10.00"), 1).await;
        assert!(matches!(result.unwrap_err(), Error::InvalidName));

        // Test negative price validation
        let result = create_product(&db, "Mouse".to_string(), None, price("-1.00"), 1).await;
        assert!(matches!(result.unwrap_err(), Error::InvalidPrice { price: _ }));

        // Test negative stock validation
        let result = create_product(&db, "Mouse".to_string(), None, price("1.00"), -3).await;
        assert!(matches!(result.unwrap_err(), Error::InvalidStock { stock: -3 }));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_product_integration() -> Result<()> {
        let db = setup_test_db().await?;

        let product = create_product(
            &db,
            " Laptop ".to_string(),
            Some("14 inch".to_string()),
            price("749.99"),
            10,
        )
        .await?;

        assert_eq!(product.name, "Laptop");
        assert_eq!(product.price, price("749.99"));
        assert_eq!(product.stock, 10);

        let retrieved = get_product_by_id(&db, product.id).await?.unwrap();
        assert_eq!(retrieved.price, price("749.99"));
        assert_eq!(retrieved.description.as_deref(), Some("14 inch"));

        Ok(())
    }

    #[tokio::test]
    async fn test_free_product_allowed() -> Result<()> {
        let db = setup_test_db().await?;
        let product = create_custom_product(&db, "Sticker", "0.00", 100).await?;
        assert!(product.price.is_zero());
        Ok(())
    }

    #[tokio::test]
    async fn test_update_product_sets_stock_directly() -> Result<()> {
        let db = setup_test_db().await?;
        let product = create_custom_product(&db, "Laptop", "749.99", 10).await?;

        let updated = update_product(
            &db,
            product.id,
            ProductChanges {
                stock: Some(3),
                price: Some(price("699.99")),
                ..Default::default()
            },
        )
        .await?;

        assert_eq!(updated.stock, 3);
        assert_eq!(updated.price, price("699.99"));
        assert_eq!(updated.name, "Laptop");

        let retrieved = require_product(&db, product.id).await?;
        assert_eq!(retrieved.stock, 3);

        Ok(())
    }

    #[tokio::test]
    async fn test_update_product_not_found() -> Result<()> {
        let db = setup_test_db().await?;
        let result = update_product(&db, 999, ProductChanges::default()).await;
        assert!(matches!(result.unwrap_err(), Error::ProductNotFound { id: 999 }));
        Ok(())
    }

    #[tokio::test]
    async fn test_update_product_rejects_negative_stock() -> Result<()> {
        let db = setup_test_db().await?;
        let product = create_custom_product(&db, "Laptop", "749.99", 10).await?;
        let result = update_product(
            &db,
            product.id,
            ProductChanges {
                stock: Some(-1),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::InvalidStock { stock: -1 }));
        assert_eq!(require_product(&db, product.id).await?.stock, 10);
        Ok(())
    }

    #[tokio::test]
    async fn test_decrement_stock() -> Result<()> {
        let db = setup_test_db().await?;
        let product = create_custom_product(&db, "Laptop", "749.99", 10).await?;

        decrement_stock(&db, product.id, 3).await?;
        assert_eq!(require_product(&db, product.id).await?.stock, 7);

        decrement_stock(&db, product.id, 7).await?;
        assert_eq!(require_product(&db, product.id).await?.stock, 0);

        Ok(())
    }

    #[tokio::test]
    async fn test_decrement_stock_never_goes_negative() -> Result<()> {
        let db = setup_test_db().await?;
        let product = create_custom_product(&db, "Laptop", "749.99", 2).await?;

        let result = decrement_stock(&db, product.id, 3).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InsufficientStock {
                requested: 3,
                available: 2,
                ..
            }
        ));
        assert_eq!(require_product(&db, product.id).await?.stock, 2);

        let result = decrement_stock(&db, 999, 1).await;
        assert!(matches!(result.unwrap_err(), Error::ProductNotFound { id: 999 }));

        Ok(())
    }

    #[tokio::test]
    async fn test_list_products_filters_and_sorts() -> Result<()> {
        let db = setup_test_db().await?;
        create_custom_product(&db, "Laptop", "749.99", 10).await?;
        create_custom_product(&db, "Headphones", "199.99", 25).await?;
        create_custom_product(&db, "Laptop Sleeve", "29.99", 40).await?;

        let page = list_products(
            &db,
            &ProductQuery {
                search: Some("Laptop".to_string()),
                sort_by: ProductSort::Price,
                sort_dir: Order::Asc,
                ..Default::default()
            },
        )
        .await?;
        let names: Vec<_> = page.items.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Laptop Sleeve", "Laptop"]);
        assert_eq!(page.total, 2);

        let page = list_products(
            &db,
            &ProductQuery {
                min_price: Some(price("100")),
                max_price: Some(price("500")),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].name, "Headphones");

        Ok(())
    }

    #[tokio::test]
    async fn test_list_products_pagination() -> Result<()> {
        let db = setup_test_db().await?;
        for i in 0..5 {
            create_custom_product(&db, &format!("Item {i}"), "1.00", 1).await?;
        }

        let query = ProductQuery {
            sort_by: ProductSort::Name,
            sort_dir: Order::Asc,
            per_page: 2,
            page: 3,
            ..Default::default()
        };
        let page = list_products(&db, &query).await?;
        assert_eq!(page.total, 5);
        assert_eq!(page.last_page, 3);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].name, "Item 4");

        // Oversized pages are clamped
        let page = list_products(
            &db,
            &ProductQuery {
                per_page: 1_000,
                page: 0,
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(page.per_page, MAX_PER_PAGE);
        assert_eq!(page.page, 1);
        assert_eq!(page.items.len(), 5);

        Ok(())
    }

    #[tokio::test]
    async fn test_list_products_page_past_the_end() -> Result<()> {
        let db = setup_test_db().await?;
        create_custom_product(&db, "Laptop", "749.99", 10).await?;

        for page in [2, u64::MAX] {
            let result = list_products(
                &db,
                &ProductQuery {
                    page,
                    ..Default::default()
                },
            )
            .await?;
            assert!(result.items.is_empty());
            assert_eq!(result.page, page);
            assert_eq!(result.total, 1);
            assert_eq!(result.last_page, 1);
        }

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_product_clears_cart_lines() -> Result<()> {
        let db = setup_test_db().await?;
        let user = create_test_user(&db, "alice").await?;
        let laptop = create_custom_product(&db, "Laptop", "749.99", 10).await?;
        crate::core::cart::add_to_cart(&db, user.id, laptop.id, 1).await?;

        delete_product(&db, laptop.id).await?;

        assert!(get_product_by_id(&db, laptop.id).await?.is_none());
        assert!(crate::core::cart::list_cart(&db, user.id).await?.is_empty());

        let result = delete_product(&db, laptop.id).await;
        assert!(matches!(result.unwrap_err(), Error::ProductNotFound { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_product_keeps_order_history() -> Result<()> {
        let db = setup_test_db().await?;
        let user = create_test_user(&db, "alice").await?;
        let laptop = create_custom_product(&db, "Laptop", "749.99", 10).await?;
        crate::core::cart::add_to_cart(&db, user.id, laptop.id, 2).await?;
        let placed = crate::core::order::place_order(&db, user.id).await?;

        let result = delete_product(&db, laptop.id).await;
        assert!(matches!(result.unwrap_err(), Error::ProductInUse { id } if id == laptop.id));

        // A direct delete is refused by the foreign key as well
        let result = Product::delete_by_id(laptop.id).exec(&db).await;
        assert!(result.is_err());

        let reloaded = crate::core::order::get_order(&db, user.id, placed.order.id).await?;
        assert_eq!(reloaded.lines.len(), 1);
        assert_eq!(reloaded.order.total_price, price("1499.98"));

        Ok(())
    }

    #[test]
    fn test_parse_sort_column() {
        assert_eq!("prix".parse::<ProductSort>().ok(), Some(ProductSort::Price));
        assert_eq!("name".parse::<ProductSort>().ok(), Some(ProductSort::Name));
        assert!(matches!(
            "color".parse::<ProductSort>(),
            Err(Error::Validation { message: _ })
        ));
    }

    #[tokio::test]
    async fn test_seed_catalog_only_once() -> Result<()> {
        let db = setup_test_db().await?;
        let catalog = parse_catalog(
            r#"
            [[products]]
            name = "Laptop"
            price = "749.99"
            stock = 10

            [[products]]
            name = "Headphones"
            price = "199.99"
            stock = 25
            "#,
        )?;

        assert_eq!(seed_catalog(&db, &catalog).await?, 2);
        assert_eq!(seed_catalog(&db, &catalog).await?, 0);
        assert_eq!(Product::find().count(&db).await?, 2);

        Ok(())
    }
}
