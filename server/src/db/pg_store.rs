// kitchenmate_server/src/db/pg_store.rs

//! PostgreSQL implementation of the product and order stores.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use kitchenmate::models::{
  Category, LineItem, Order, OrderOwner, OrderStatus, OwnedOrder, Product, ProductSales, ShippingInfo, StatusCount,
};
use kitchenmate::{OrderStore, ProductStore, StockDecrement, StorefrontError, StorefrontResult};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use std::collections::HashMap;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

const PRODUCT_COLUMNS: &str = "id, title, category, price, stock, description, origin, quality, storage, \
   packaging, weight, image_urls, created_at, updated_at";

const ORDER_SELECT: &str = "SELECT o.id, o.user_id, o.shipping_info, o.total_amount, o.delivery_fee, \
   o.payment_method, o.status, o.created_at, o.updated_at, u.name AS owner_name, u.email AS owner_email \
   FROM orders o LEFT JOIN users u ON u.id = o.user_id";

#[derive(Debug, FromRow)]
struct ProductRow {
  id: Uuid,
  title: String,
  category: String,
  price: String,
  stock: i32,
  description: String,
  origin: String,
  quality: String,
  storage: String,
  packaging: String,
  weight: String,
  image_urls: Vec<String>,
  created_at: DateTime<Utc>,
  updated_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
  type Error = StorefrontError;

  fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
    let category = row
      .category
      .parse::<Category>()
      .map_err(|e| StorefrontError::Internal(format!("Stored product {} is corrupt: {}", row.id, e)))?;
    Ok(Product {
      id: row.id,
      title: row.title,
      category,
      price: row.price,
      stock: row.stock,
      description: row.description,
      origin: row.origin,
      quality: row.quality,
      storage: row.storage,
      packaging: row.packaging,
      weight: row.weight,
      image_urls: row.image_urls,
      created_at: row.created_at,
      updated_at: row.updated_at,
    })
  }
}

#[derive(Debug, FromRow)]
struct OrderRow {
  id: Uuid,
  user_id: Uuid,
  shipping_info: Json<ShippingInfo>,
  total_amount: f64,
  delivery_fee: f64,
  payment_method: String,
  status: String,
  created_at: DateTime<Utc>,
  updated_at: DateTime<Utc>,
  owner_name: Option<String>,
  owner_email: Option<String>,
}

impl OrderRow {
  fn into_owned_order(mut self, items: Vec<LineItem>) -> StorefrontResult<OwnedOrder> {
    let owner = match (self.owner_name.take(), self.owner_email.take()) {
      (Some(name), Some(email)) => Some(OrderOwner {
        id: self.user_id,
        name,
        email,
      }),
      _ => None,
    };
    Ok(self.into_order(items)?.with_owner(owner))
  }

  fn into_order(self, items: Vec<LineItem>) -> StorefrontResult<Order> {
    let status = parse_status(&self.status)?;
    Ok(Order {
      id: self.id,
      user: self.user_id,
      items,
      shipping_info: self.shipping_info.0,
      total_amount: self.total_amount,
      delivery_fee: self.delivery_fee,
      payment_method: self.payment_method,
      status,
      created_at: self.created_at,
      updated_at: self.updated_at,
    })
  }
}

#[derive(Debug, FromRow)]
struct ItemRow {
  order_id: Uuid,
  product_id: Uuid,
  title: String,
  price: f64,
  quantity: i32,
  image_url: String,
}

fn parse_status(raw: &str) -> StorefrontResult<OrderStatus> {
  raw
    .parse::<OrderStatus>()
    .map_err(|e| StorefrontError::Internal(format!("Stored order status is corrupt: {}", e)))
}

fn db_err(err: sqlx::Error) -> StorefrontError {
  StorefrontError::persistence(err)
}

#[derive(Clone)]
pub struct PgStore {
  pool: PgPool,
}

impl PgStore {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }

  /// Loads the line items of `order_ids` in one query, keyed by order id.
  async fn items_for(&self, order_ids: &[Uuid]) -> StorefrontResult<HashMap<Uuid, Vec<LineItem>>> {
    if order_ids.is_empty() {
      return Ok(HashMap::new());
    }
    let rows: Vec<ItemRow> = sqlx::query_as(
      "SELECT order_id, product_id, title, price, quantity, image_url FROM order_items \
       WHERE order_id = ANY($1) ORDER BY order_id, position",
    )
    .bind(order_ids)
    .fetch_all(&self.pool)
    .await
    .map_err(db_err)?;

    let mut grouped: HashMap<Uuid, Vec<LineItem>> = HashMap::new();
    for row in rows {
      grouped.entry(row.order_id).or_default().push(LineItem {
        product_id: row.product_id,
        title: row.title,
        price: row.price,
        quantity: row.quantity,
        image_url: row.image_url,
      });
    }
    Ok(grouped)
  }

  async fn orders_with_items(&self, rows: Vec<OrderRow>) -> StorefrontResult<Vec<Order>> {
    let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
    let mut items = self.items_for(&ids).await?;
    rows
      .into_iter()
      .map(|row| {
        let order_items = items.remove(&row.id).unwrap_or_default();
        row.into_order(order_items)
      })
      .collect()
  }

  async fn owned_orders_with_items(&self, rows: Vec<OrderRow>) -> StorefrontResult<Vec<OwnedOrder>> {
    let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
    let mut items = self.items_for(&ids).await?;
    rows
      .into_iter()
      .map(|row| {
        let order_items = items.remove(&row.id).unwrap_or_default();
        row.into_owned_order(order_items)
      })
      .collect()
  }

  async fn fetch_order_row(&self, id: Uuid) -> StorefrontResult<Option<OrderRow>> {
    sqlx::query_as::<_, OrderRow>(&format!("{} WHERE o.id = $1", ORDER_SELECT))
      .bind(id)
      .fetch_optional(&self.pool)
      .await
      .map_err(db_err)
  }
}

/// Applies one decrement inside `tx`, telling a missing product apart from a short one.
async fn apply_decrement(
  tx: &mut Transaction<'_, Postgres>,
  decrement: &StockDecrement,
  now: DateTime<Utc>,
) -> StorefrontResult<()> {
  let remaining: Option<i32> = sqlx::query_scalar(
    "UPDATE products SET stock = stock - $1, updated_at = $2 WHERE id = $3 AND stock >= $1 RETURNING stock",
  )
  .bind(decrement.quantity)
  .bind(now)
  .bind(decrement.product_id)
  .fetch_optional(&mut **tx)
  .await
  .map_err(db_err)?;

  if let Some(remaining) = remaining {
    debug!(product_id = %decrement.product_id, remaining, "Stock decremented.");
    return Ok(());
  }

  let available: Option<i32> = sqlx::query_scalar("SELECT stock FROM products WHERE id = $1")
    .bind(decrement.product_id)
    .fetch_optional(&mut **tx)
    .await
    .map_err(db_err)?;

  Err(match available {
    None => StorefrontError::not_found("Product", decrement.product_id),
    Some(available) => StorefrontError::InsufficientStock {
      product_id: decrement.product_id,
      requested: decrement.quantity,
      available,
    },
  })
}

#[async_trait]
impl ProductStore for PgStore {
  #[instrument(name = "PgStore::insert_product", skip_all, fields(product_id = %product.id), err(Display))]
  async fn insert_product(&self, product: &Product) -> StorefrontResult<()> {
    sqlx::query(
      "INSERT INTO products (id, title, category, price, stock, description, origin, quality, storage, \
       packaging, weight, image_urls, created_at, updated_at) \
       VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)",
    )
    .bind(product.id)
    .bind(&product.title)
    .bind(product.category.as_str())
    .bind(&product.price)
    .bind(product.stock)
    .bind(&product.description)
    .bind(&product.origin)
    .bind(&product.quality)
    .bind(&product.storage)
    .bind(&product.packaging)
    .bind(&product.weight)
    .bind(&product.image_urls)
    .bind(product.created_at)
    .bind(product.updated_at)
    .execute(&self.pool)
    .await
    .map_err(db_err)?;
    Ok(())
  }

  #[instrument(name = "PgStore::update_product", skip_all, fields(product_id = %product.id), err(Display))]
  async fn update_product(&self, product: &Product) -> StorefrontResult<()> {
    let result = sqlx::query(
      "UPDATE products SET title = $2, category = $3, price = $4, stock = $5, description = $6, origin = $7, \
       quality = $8, storage = $9, packaging = $10, weight = $11, image_urls = $12, updated_at = $13 \
       WHERE id = $1",
    )
    .bind(product.id)
    .bind(&product.title)
    .bind(product.category.as_str())
    .bind(&product.price)
    .bind(product.stock)
    .bind(&product.description)
    .bind(&product.origin)
    .bind(&product.quality)
    .bind(&product.storage)
    .bind(&product.packaging)
    .bind(&product.weight)
    .bind(&product.image_urls)
    .bind(product.updated_at)
    .execute(&self.pool)
    .await
    .map_err(db_err)?;

    if result.rows_affected() == 0 {
      return Err(StorefrontError::not_found("Product", product.id));
    }
    Ok(())
  }

  async fn find_product(&self, id: Uuid) -> StorefrontResult<Option<Product>> {
    let row: Option<ProductRow> = sqlx::query_as(&format!("SELECT {} FROM products WHERE id = $1", PRODUCT_COLUMNS))
      .bind(id)
      .fetch_optional(&self.pool)
      .await
      .map_err(db_err)?;
    row.map(Product::try_from).transpose()
  }

  async fn find_products(&self, ids: &[Uuid]) -> StorefrontResult<Vec<Product>> {
    let rows: Vec<ProductRow> = sqlx::query_as(&format!("SELECT {} FROM products WHERE id = ANY($1)", PRODUCT_COLUMNS))
      .bind(ids)
      .fetch_all(&self.pool)
      .await
      .map_err(db_err)?;
    rows.into_iter().map(Product::try_from).collect()
  }

  async fn list_products(&self) -> StorefrontResult<Vec<Product>> {
    let rows: Vec<ProductRow> = sqlx::query_as(&format!(
      "SELECT {} FROM products ORDER BY created_at DESC, id",
      PRODUCT_COLUMNS
    ))
    .fetch_all(&self.pool)
    .await
    .map_err(db_err)?;
    rows.into_iter().map(Product::try_from).collect()
  }

  async fn delete_product(&self, id: Uuid) -> StorefrontResult<bool> {
    let result = sqlx::query("DELETE FROM products WHERE id = $1")
      .bind(id)
      .execute(&self.pool)
      .await
      .map_err(db_err)?;
    Ok(result.rows_affected() > 0)
  }

  async fn count_products(&self) -> StorefrontResult<i64> {
    sqlx::query_scalar("SELECT COUNT(*) FROM products")
      .fetch_one(&self.pool)
      .await
      .map_err(db_err)
  }
}

#[async_trait]
impl OrderStore for PgStore {
  /// One transaction: every conditional decrement, then the order and its items.
  /// Any failure drops the transaction, which rolls it back.
  #[instrument(
    name = "PgStore::place_order",
    skip_all,
    fields(order_id = %order.id, decrements = decrements.len()),
    err(Display)
  )]
  async fn place_order(&self, order: &Order, decrements: &[StockDecrement]) -> StorefrontResult<()> {
    let mut tx = self.pool.begin().await.map_err(db_err)?;
    let now = Utc::now();

    // Row locks are always taken in product id order, whatever the line order,
    // so two orders touching the same products cannot deadlock.
    let mut ordered: Vec<&StockDecrement> = decrements.iter().collect();
    ordered.sort_by_key(|d| d.product_id);

    for decrement in ordered {
      if let Err(e) = apply_decrement(&mut tx, decrement, now).await {
        warn!(product_id = %decrement.product_id, error = %e, "Order placement rolled back.");
        return Err(e);
      }
    }

    sqlx::query(
      "INSERT INTO orders (id, user_id, shipping_info, total_amount, delivery_fee, payment_method, status, \
       created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
    )
    .bind(order.id)
    .bind(order.user)
    .bind(Json(&order.shipping_info))
    .bind(order.total_amount)
    .bind(order.delivery_fee)
    .bind(&order.payment_method)
    .bind(order.status.as_str())
    .bind(order.created_at)
    .bind(order.updated_at)
    .execute(&mut *tx)
    .await
    .map_err(db_err)?;

    for (position, item) in order.items.iter().enumerate() {
      sqlx::query(
        "INSERT INTO order_items (order_id, position, product_id, title, price, quantity, image_url) \
         VALUES ($1, $2, $3, $4, $5, $6, $7)",
      )
      .bind(order.id)
      .bind(position as i32)
      .bind(item.product_id)
      .bind(&item.title)
      .bind(item.price)
      .bind(item.quantity)
      .bind(&item.image_url)
      .execute(&mut *tx)
      .await
      .map_err(db_err)?;
    }

    tx.commit().await.map_err(db_err)
  }

  async fn find_order(&self, id: Uuid) -> StorefrontResult<Option<Order>> {
    match self.fetch_order_row(id).await? {
      Some(row) => Ok(self.orders_with_items(vec![row]).await?.pop()),
      None => Ok(None),
    }
  }

  async fn find_owned_order(&self, id: Uuid) -> StorefrontResult<Option<OwnedOrder>> {
    match self.fetch_order_row(id).await? {
      Some(row) => Ok(self.owned_orders_with_items(vec![row]).await?.pop()),
      None => Ok(None),
    }
  }

  async fn list_orders_for_user(&self, user_id: Uuid) -> StorefrontResult<Vec<Order>> {
    let rows: Vec<OrderRow> = sqlx::query_as(&format!(
      "{} WHERE o.user_id = $1 ORDER BY o.created_at DESC, o.id DESC",
      ORDER_SELECT
    ))
    .bind(user_id)
    .fetch_all(&self.pool)
    .await
    .map_err(db_err)?;
    self.orders_with_items(rows).await
  }

  async fn list_owned_orders(&self, limit: Option<i64>) -> StorefrontResult<Vec<OwnedOrder>> {
    // LIMIT NULL is LIMIT ALL.
    let rows: Vec<OrderRow> = sqlx::query_as(&format!("{} ORDER BY o.created_at DESC, o.id DESC LIMIT $1", ORDER_SELECT))
      .bind(limit)
      .fetch_all(&self.pool)
      .await
      .map_err(db_err)?;
    self.owned_orders_with_items(rows).await
  }

  async fn set_order_status(&self, id: Uuid, status: OrderStatus, updated_at: DateTime<Utc>) -> StorefrontResult<bool> {
    let result = sqlx::query("UPDATE orders SET status = $2, updated_at = $3 WHERE id = $1")
      .bind(id)
      .bind(status.as_str())
      .bind(updated_at)
      .execute(&self.pool)
      .await
      .map_err(db_err)?;
    Ok(result.rows_affected() > 0)
  }

  async fn count_orders(&self, status: Option<OrderStatus>) -> StorefrontResult<i64> {
    sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE ($1::text IS NULL OR status = $1)")
      .bind(status.map(|s| s.as_str()))
      .fetch_one(&self.pool)
      .await
      .map_err(db_err)
  }

  async fn revenue_excluding(&self, excluded: OrderStatus) -> StorefrontResult<f64> {
    sqlx::query_scalar("SELECT COALESCE(SUM(total_amount), 0)::float8 FROM orders WHERE status <> $1")
      .bind(excluded.as_str())
      .fetch_one(&self.pool)
      .await
      .map_err(db_err)
  }

  async fn count_by_status(&self) -> StorefrontResult<Vec<StatusCount>> {
    let rows: Vec<(String, i64)> = sqlx::query_as("SELECT status, COUNT(*) FROM orders GROUP BY status ORDER BY status")
      .fetch_all(&self.pool)
      .await
      .map_err(db_err)?;
    rows
      .into_iter()
      .map(|(status, count)| -> StorefrontResult<StatusCount> {
        Ok(StatusCount {
          status: parse_status(&status)?,
          count,
        })
      })
      .collect()
  }

  async fn count_by_month(&self) -> StorefrontResult<Vec<(u32, i64)>> {
    let rows: Vec<(i32, i64)> = sqlx::query_as(
      "SELECT EXTRACT(MONTH FROM created_at AT TIME ZONE 'UTC')::int4 AS month, COUNT(*) \
       FROM orders GROUP BY 1 ORDER BY 1",
    )
    .fetch_all(&self.pool)
    .await
    .map_err(db_err)?;
    Ok(
      rows
        .into_iter()
        .filter_map(|(month, count)| u32::try_from(month).ok().map(|m| (m, count)))
        .collect(),
    )
  }

  async fn top_selling_products(&self, limit: i64) -> StorefrontResult<Vec<ProductSales>> {
    let rows: Vec<(Uuid, i64, Option<String>)> = sqlx::query_as(
      "SELECT oi.product_id, SUM(oi.quantity)::int8 AS sales, p.title \
       FROM order_items oi LEFT JOIN products p ON p.id = oi.product_id \
       GROUP BY oi.product_id, p.title \
       ORDER BY sales DESC, oi.product_id \
       LIMIT $1",
    )
    .bind(limit)
    .fetch_all(&self.pool)
    .await
    .map_err(db_err)?;
    Ok(
      rows
        .into_iter()
        .map(|(product_id, sales, product_title)| ProductSales {
          product_id,
          sales,
          product_title,
        })
        .collect(),
    )
  }
}
