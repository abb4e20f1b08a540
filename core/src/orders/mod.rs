// kitchenmate/src/orders/mod.rs

//! Order lifecycle: placement with stock decrement, lookups and status changes.

pub mod placement;
pub mod transitions;

pub use placement::{MissingProductPolicy, PlacementCtxData};
pub use transitions::{StatusPolicy, TransitionTable};

use crate::error::{StorefrontError, StorefrontResult};
use crate::models::{NewOrder, Order, OrderStatus, OwnedOrder};
use crate::pipeline::{ContextData, Pipeline, PipelineResult};
use crate::store::{OrderStore, ProductStore};
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

pub struct OrderService {
  orders: Arc<dyn OrderStore>,
  products: Arc<dyn ProductStore>,
  transitions: TransitionTable,
  missing_product_policy: MissingProductPolicy,
  placement: Pipeline<PlacementCtxData, StorefrontError>,
}

impl OrderService {
  /// Service with the open transition table and the `reject` missing-product policy.
  pub fn new(orders: Arc<dyn OrderStore>, products: Arc<dyn ProductStore>) -> StorefrontResult<Self> {
    Ok(Self {
      orders,
      products,
      transitions: TransitionTable::default(),
      missing_product_policy: MissingProductPolicy::default(),
      placement: placement::build_placement_pipeline()?,
    })
  }

  pub fn with_transitions(mut self, transitions: TransitionTable) -> Self {
    self.transitions = transitions;
    self
  }

  pub fn with_missing_product_policy(mut self, policy: MissingProductPolicy) -> Self {
    self.missing_product_policy = policy;
    self
  }

  #[instrument(
    name = "OrderService::create_order",
    skip(self, request),
    fields(user_id = %request.user_id, items = request.items.len()),
    err(Display)
  )]
  pub async fn create_order(&self, request: NewOrder) -> StorefrontResult<Order> {
    let ctx_data = ContextData::new(PlacementCtxData::new(
      self.orders.clone(),
      self.products.clone(),
      self.missing_product_policy,
      request,
    ));

    match self.placement.run(ctx_data.clone()).await? {
      PipelineResult::Completed => ctx_data
        .write()
        .placed_order
        .take()
        .ok_or_else(|| StorefrontError::Internal("Order placement finished without an order".to_string())),
      PipelineResult::Stopped => Err(StorefrontError::Internal(
        "Order placement was halted before the order was stored".to_string(),
      )),
    }
  }

  #[instrument(name = "OrderService::list_orders_for_user", skip(self), err(Display))]
  pub async fn list_orders_for_user(&self, user_id: Uuid) -> StorefrontResult<Vec<Order>> {
    self.orders.list_orders_for_user(user_id).await
  }

  /// Every order, newest first, with its owner resolved.
  #[instrument(name = "OrderService::list_all_orders", skip(self), err(Display))]
  pub async fn list_all_orders(&self) -> StorefrontResult<Vec<OwnedOrder>> {
    self.orders.list_owned_orders(None).await
  }

  #[instrument(name = "OrderService::get_order", skip(self), err(Display))]
  pub async fn get_order(&self, order_id: Uuid) -> StorefrontResult<Order> {
    self
      .orders
      .find_order(order_id)
      .await?
      .ok_or_else(|| StorefrontError::not_found("Order", order_id))
  }

  #[instrument(name = "OrderService::update_order_status", skip(self), err(Display))]
  pub async fn update_order_status(&self, order_id: Uuid, status: OrderStatus) -> StorefrontResult<OwnedOrder> {
    let order = self
      .orders
      .find_owned_order(order_id)
      .await?
      .ok_or_else(|| StorefrontError::not_found("Order", order_id))?;

    if !self.transitions.permits(order.status, status) {
      warn!(from = %order.status, to = %status, "Status transition rejected.");
      return Err(StorefrontError::InvalidTransition {
        from: order.status,
        to: status,
      });
    }

    let updated_at = Utc::now();
    if !self.orders.set_order_status(order_id, status, updated_at).await? {
      // Deleted between the read and the write.
      return Err(StorefrontError::not_found("Order", order_id));
    }
    info!(from = %order.status, to = %status, "Order status updated.");

    Ok(Order {
      status,
      updated_at,
      ..order
    })
  }
}
