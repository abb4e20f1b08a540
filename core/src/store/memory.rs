// kitchenmate/src/store/memory.rs

//! Process-local store used by tests and local tooling.
//!
//! A single mutex guards all collections, which gives `place_order` the same
//! all-or-nothing behaviour a database transaction gives the SQL store.

use super::{OrderStore, ProductStore, StockDecrement};
use crate::error::{StorefrontError, StorefrontResult};
use crate::models::{Order, OrderOwner, OrderStatus, OwnedOrder, Product, ProductSales, StatusCount, User};
use async_trait::async_trait;
use chrono::{DateTime, Datelike, Utc};
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Default)]
struct MemoryState {
  users: HashMap<Uuid, User>,
  products: HashMap<Uuid, Product>,
  /// Insertion order.
  orders: Vec<Order>,
}

impl MemoryState {
  fn owned(&self, order: &Order) -> OwnedOrder {
    let owner = self.users.get(&order.user).map(OrderOwner::from);
    order.clone().with_owner(owner)
  }

  /// Newest first; equal timestamps keep the later insertion first.
  fn orders_newest_first(&self) -> Vec<&Order> {
    let mut orders: Vec<&Order> = self.orders.iter().rev().collect();
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    orders
  }
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
  state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn insert_user(&self, user: User) {
    self.state.lock().users.insert(user.id, user);
  }

  /// Stores an order as-is, without touching stock. Seeds historical data.
  pub fn insert_order(&self, order: Order) {
    self.state.lock().orders.push(order);
  }

  pub fn product_stock(&self, id: Uuid) -> Option<i32> {
    self.state.lock().products.get(&id).map(|p| p.stock)
  }
}

#[async_trait]
impl ProductStore for MemoryStore {
  async fn insert_product(&self, product: &Product) -> StorefrontResult<()> {
    self.state.lock().products.insert(product.id, product.clone());
    Ok(())
  }

  async fn update_product(&self, product: &Product) -> StorefrontResult<()> {
    let mut state = self.state.lock();
    match state.products.get_mut(&product.id) {
      Some(stored) => {
        *stored = product.clone();
        Ok(())
      }
      None => Err(StorefrontError::not_found("Product", product.id)),
    }
  }

  async fn find_product(&self, id: Uuid) -> StorefrontResult<Option<Product>> {
    Ok(self.state.lock().products.get(&id).cloned())
  }

  async fn find_products(&self, ids: &[Uuid]) -> StorefrontResult<Vec<Product>> {
    let state = self.state.lock();
    let mut found: Vec<Product> = Vec::new();
    for id in ids {
      if found.iter().any(|p| p.id == *id) {
        continue;
      }
      if let Some(product) = state.products.get(id) {
        found.push(product.clone());
      }
    }
    Ok(found)
  }

  async fn list_products(&self) -> StorefrontResult<Vec<Product>> {
    let mut products: Vec<Product> = self.state.lock().products.values().cloned().collect();
    products.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
    Ok(products)
  }

  async fn delete_product(&self, id: Uuid) -> StorefrontResult<bool> {
    Ok(self.state.lock().products.remove(&id).is_some())
  }

  async fn count_products(&self) -> StorefrontResult<i64> {
    Ok(self.state.lock().products.len() as i64)
  }
}

#[async_trait]
impl OrderStore for MemoryStore {
  async fn place_order(&self, order: &Order, decrements: &[StockDecrement]) -> StorefrontResult<()> {
    let mut state = self.state.lock();

    // Check every decrement before mutating anything.
    for decrement in decrements {
      let product = state
        .products
        .get(&decrement.product_id)
        .ok_or_else(|| StorefrontError::not_found("Product", decrement.product_id))?;
      if product.stock < decrement.quantity {
        return Err(StorefrontError::InsufficientStock {
          product_id: decrement.product_id,
          requested: decrement.quantity,
          available: product.stock,
        });
      }
    }

    let now = Utc::now();
    for decrement in decrements {
      if let Some(product) = state.products.get_mut(&decrement.product_id) {
        product.stock -= decrement.quantity;
        product.updated_at = now;
        debug!(product_id = %product.id, remaining = product.stock, "Stock decremented.");
      }
    }
    state.orders.push(order.clone());
    Ok(())
  }

  async fn find_order(&self, id: Uuid) -> StorefrontResult<Option<Order>> {
    Ok(self.state.lock().orders.iter().find(|o| o.id == id).cloned())
  }

  async fn find_owned_order(&self, id: Uuid) -> StorefrontResult<Option<OwnedOrder>> {
    let state = self.state.lock();
    Ok(state.orders.iter().find(|o| o.id == id).map(|o| state.owned(o)))
  }

  async fn list_orders_for_user(&self, user_id: Uuid) -> StorefrontResult<Vec<Order>> {
    let state = self.state.lock();
    Ok(
      state
        .orders_newest_first()
        .into_iter()
        .filter(|o| o.user == user_id)
        .cloned()
        .collect(),
    )
  }

  async fn list_owned_orders(&self, limit: Option<i64>) -> StorefrontResult<Vec<OwnedOrder>> {
    let state = self.state.lock();
    let limit = limit.map_or(usize::MAX, |l| l.max(0) as usize);
    Ok(
      state
        .orders_newest_first()
        .into_iter()
        .take(limit)
        .map(|o| state.owned(o))
        .collect(),
    )
  }

  async fn set_order_status(&self, id: Uuid, status: OrderStatus, updated_at: DateTime<Utc>) -> StorefrontResult<bool> {
    let mut state = self.state.lock();
    match state.orders.iter_mut().find(|o| o.id == id) {
      Some(order) => {
        order.status = status;
        order.updated_at = updated_at;
        Ok(true)
      }
      None => Ok(false),
    }
  }

  async fn count_orders(&self, status: Option<OrderStatus>) -> StorefrontResult<i64> {
    let state = self.state.lock();
    let count = state
      .orders
      .iter()
      .filter(|o| status.map_or(true, |s| o.status == s))
      .count();
    Ok(count as i64)
  }

  async fn revenue_excluding(&self, excluded: OrderStatus) -> StorefrontResult<f64> {
    let state = self.state.lock();
    Ok(
      state
        .orders
        .iter()
        .filter(|o| o.status != excluded)
        .map(|o| o.total_amount)
        .sum(),
    )
  }

  async fn count_by_status(&self) -> StorefrontResult<Vec<StatusCount>> {
    let state = self.state.lock();
    let mut counts: BTreeMap<OrderStatus, i64> = BTreeMap::new();
    for order in &state.orders {
      *counts.entry(order.status).or_default() += 1;
    }
    Ok(
      counts
        .into_iter()
        .map(|(status, count)| StatusCount { status, count })
        .collect(),
    )
  }

  async fn count_by_month(&self) -> StorefrontResult<Vec<(u32, i64)>> {
    let state = self.state.lock();
    let mut counts: BTreeMap<u32, i64> = BTreeMap::new();
    for order in &state.orders {
      *counts.entry(order.created_at.month()).or_default() += 1;
    }
    Ok(counts.into_iter().collect())
  }

  async fn top_selling_products(&self, limit: i64) -> StorefrontResult<Vec<ProductSales>> {
    let state = self.state.lock();
    let mut sales: HashMap<Uuid, i64> = HashMap::new();
    for item in state.orders.iter().flat_map(|o| o.items.iter()) {
      *sales.entry(item.product_id).or_default() += i64::from(item.quantity);
    }

    let mut ranked: Vec<(Uuid, i64)> = sales.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(limit.max(0) as usize);

    Ok(
      ranked
        .into_iter()
        .map(|(product_id, sales)| ProductSales {
          product_id,
          sales,
          product_title: state.products.get(&product_id).map(|p| p.title.clone()),
        })
        .collect(),
    )
  }
}
