// kitchenmate/src/store/mod.rs

//! Persistence seams for products and orders.
//!
//! Implementations must make [`OrderStore::place_order`] all-or-nothing: the
//! order insert and every stock decrement commit together or not at all.

pub mod memory;

use crate::error::StorefrontResult;
use crate::models::{Order, OrderStatus, OwnedOrder, Product, ProductSales, StatusCount};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

pub use memory::MemoryStore;

/// Stock reduction applied when an order is placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockDecrement {
  pub product_id: Uuid,
  pub quantity: i32,
}

#[async_trait]
pub trait ProductStore: Send + Sync {
  async fn insert_product(&self, product: &Product) -> StorefrontResult<()>;

  /// Overwrites every mutable field; `NotFound` when the id is unknown.
  async fn update_product(&self, product: &Product) -> StorefrontResult<()>;

  async fn find_product(&self, id: Uuid) -> StorefrontResult<Option<Product>>;

  /// Products among `ids` that exist, in no particular order.
  async fn find_products(&self, ids: &[Uuid]) -> StorefrontResult<Vec<Product>>;

  /// Newest first.
  async fn list_products(&self) -> StorefrontResult<Vec<Product>>;

  /// Returns whether a record was removed.
  async fn delete_product(&self, id: Uuid) -> StorefrontResult<bool>;

  async fn count_products(&self) -> StorefrontResult<i64>;
}

#[async_trait]
pub trait OrderStore: Send + Sync {
  /// Inserts `order` and applies `decrements` atomically.
  ///
  /// A decrement against a missing product fails with `NotFound`; one that
  /// would take stock below zero fails with `InsufficientStock`. Either
  /// failure leaves the store untouched.
  async fn place_order(&self, order: &Order, decrements: &[StockDecrement]) -> StorefrontResult<()>;

  async fn find_order(&self, id: Uuid) -> StorefrontResult<Option<Order>>;

  async fn find_owned_order(&self, id: Uuid) -> StorefrontResult<Option<OwnedOrder>>;

  /// Newest first.
  async fn list_orders_for_user(&self, user_id: Uuid) -> StorefrontResult<Vec<Order>>;

  /// Newest first, owners resolved, at most `limit` entries when given.
  async fn list_owned_orders(&self, limit: Option<i64>) -> StorefrontResult<Vec<OwnedOrder>>;

  /// Returns whether an order with `id` existed.
  async fn set_order_status(&self, id: Uuid, status: OrderStatus, updated_at: DateTime<Utc>) -> StorefrontResult<bool>;

  /// All orders, or only those in `status`.
  async fn count_orders(&self, status: Option<OrderStatus>) -> StorefrontResult<i64>;

  /// Sum of `total_amount` over orders not in `excluded`; 0 when none match.
  async fn revenue_excluding(&self, excluded: OrderStatus) -> StorefrontResult<f64>;

  async fn count_by_status(&self) -> StorefrontResult<Vec<StatusCount>>;

  /// `(month 1..=12, count)` for months with at least one order, by UTC creation date.
  async fn count_by_month(&self) -> StorefrontResult<Vec<(u32, i64)>>;

  /// Product ids ranked by summed line-item quantity, highest first.
  async fn top_selling_products(&self, limit: i64) -> StorefrontResult<Vec<ProductSales>>;
}
