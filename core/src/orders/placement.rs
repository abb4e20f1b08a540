// kitchenmate/src/orders/placement.rs

//! The order placement pipeline.
//!
//! Steps, in order:
//! 1. `validate_order_input` rejects malformed requests before any I/O.
//! 2. `resolve_line_items` loads the referenced products and turns the line
//!    items into stock decrements, applying the missing-product policy.
//! 3. `persist_order_and_stock` stores the order and the decrements as one
//!    atomic unit, then reports the placement.

use crate::error::{StorefrontError, StorefrontResult};
use crate::models::{LineItem, NewOrder, Order};
use crate::pipeline::{ContextData, Pipeline, PipelineControl, PipelineError};
use crate::store::{OrderStore, ProductStore, StockDecrement};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

pub const VALIDATE_STEP: &str = "validate_order_input";
pub const RESOLVE_STEP: &str = "resolve_line_items";
pub const PERSIST_STEP: &str = "persist_order_and_stock";

/// What to do with a line item whose product no longer exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MissingProductPolicy {
  /// Fail the whole order with `NotFound`.
  #[default]
  Reject,
  /// Keep the order, skip that item's stock decrement and log a warning.
  Skip,
}

impl fmt::Display for MissingProductPolicy {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      MissingProductPolicy::Reject => f.write_str("reject"),
      MissingProductPolicy::Skip => f.write_str("skip"),
    }
  }
}

impl FromStr for MissingProductPolicy {
  type Err = StorefrontError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "reject" => Ok(MissingProductPolicy::Reject),
      "skip" => Ok(MissingProductPolicy::Skip),
      other => Err(StorefrontError::Validation(format!(
        "Unknown missing product policy '{}'",
        other
      ))),
    }
  }
}

/// Context shared by the placement steps of a single request.
#[derive(Clone)]
pub struct PlacementCtxData {
  pub orders: Arc<dyn OrderStore>,
  pub products: Arc<dyn ProductStore>,
  pub missing_product_policy: MissingProductPolicy,
  pub request: NewOrder,
  pub decrements: Vec<StockDecrement>,
  pub skipped_products: Vec<Uuid>,
  pub placed_order: Option<Order>,
}

impl PlacementCtxData {
  pub fn new(
    orders: Arc<dyn OrderStore>,
    products: Arc<dyn ProductStore>,
    missing_product_policy: MissingProductPolicy,
    request: NewOrder,
  ) -> Self {
    Self {
      orders,
      products,
      missing_product_policy,
      request,
      decrements: Vec::new(),
      skipped_products: Vec::new(),
      placed_order: None,
    }
  }
}

pub fn build_placement_pipeline() -> Result<Pipeline<PlacementCtxData, StorefrontError>, PipelineError> {
  let mut p = Pipeline::<PlacementCtxData, StorefrontError>::new(&[
    (VALIDATE_STEP, false, None),
    (RESOLVE_STEP, false, None),
    (PERSIST_STEP, false, None),
  ]);

  p.on_root(VALIDATE_STEP, validate_order_input)?;
  p.on_root(RESOLVE_STEP, resolve_line_items)?;
  p.on_root(PERSIST_STEP, persist_order_and_stock)?;
  p.after_root(PERSIST_STEP, report_placement)?;

  Ok(p)
}

/// Sums quantities per product, keeping first-seen order.
pub fn merge_quantities(items: &[LineItem]) -> Vec<StockDecrement> {
  let mut merged: Vec<StockDecrement> = Vec::with_capacity(items.len());
  for item in items {
    match merged.iter_mut().find(|d| d.product_id == item.product_id) {
      Some(existing) => existing.quantity = existing.quantity.saturating_add(item.quantity),
      None => merged.push(StockDecrement {
        product_id: item.product_id,
        quantity: item.quantity,
      }),
    }
  }
  merged
}

async fn validate_order_input(ctx_data: ContextData<PlacementCtxData>) -> StorefrontResult<PipelineControl> {
  ctx_data.read().request.validate()?;
  Ok(PipelineControl::Continue)
}

async fn resolve_line_items(ctx_data: ContextData<PlacementCtxData>) -> StorefrontResult<PipelineControl> {
  let (products, policy, requested) = {
    let guard = ctx_data.read();
    (
      guard.products.clone(),
      guard.missing_product_policy,
      merge_quantities(&guard.request.items),
    )
  };

  let ids: Vec<Uuid> = requested.iter().map(|d| d.product_id).collect();
  let found = products.find_products(&ids).await?;

  let mut decrements = Vec::with_capacity(requested.len());
  let mut skipped = Vec::new();
  for wanted in requested {
    match found.iter().find(|p| p.id == wanted.product_id) {
      Some(product) if product.stock < wanted.quantity => {
        warn!(
          product_id = %product.id,
          requested = wanted.quantity,
          available = product.stock,
          "Order rejected: insufficient stock."
        );
        return Err(StorefrontError::InsufficientStock {
          product_id: product.id,
          requested: wanted.quantity,
          available: product.stock,
        });
      }
      Some(_) => decrements.push(wanted),
      None => match policy {
        MissingProductPolicy::Reject => {
          warn!(product_id = %wanted.product_id, "Order rejected: product does not exist.");
          return Err(StorefrontError::not_found("Product", wanted.product_id));
        }
        MissingProductPolicy::Skip => {
          warn!(
            product_id = %wanted.product_id,
            quantity = wanted.quantity,
            "Product does not exist; its stock update is skipped."
          );
          skipped.push(wanted.product_id);
        }
      },
    }
  }

  {
    let mut guard = ctx_data.write();
    guard.decrements = decrements;
    guard.skipped_products = skipped;
  }
  Ok(PipelineControl::Continue)
}

async fn persist_order_and_stock(ctx_data: ContextData<PlacementCtxData>) -> StorefrontResult<PipelineControl> {
  let (orders, order, decrements) = {
    let guard = ctx_data.read();
    (
      guard.orders.clone(),
      guard.request.clone().into_order(),
      guard.decrements.clone(),
    )
  };

  orders.place_order(&order, &decrements).await?;

  ctx_data.write().placed_order = Some(order);
  Ok(PipelineControl::Continue)
}

async fn report_placement(ctx_data: ContextData<PlacementCtxData>) -> StorefrontResult<PipelineControl> {
  let guard = ctx_data.read();
  if let Some(order) = &guard.placed_order {
    info!(
      order_id = %order.id,
      user_id = %order.user,
      items = order.items.len(),
      decrements = guard.decrements.len(),
      skipped = guard.skipped_products.len(),
      "Order placed."
    );
  }
  Ok(PipelineControl::Continue)
}
