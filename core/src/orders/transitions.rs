// kitchenmate/src/orders/transitions.rs

//! Which status changes an administrator may apply to an order.

use crate::error::StorefrontError;
use crate::models::OrderStatus;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Explicit set of permitted `(from, to)` status moves.
///
/// Re-assigning an order's current status is always permitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionTable {
  allowed: HashSet<(OrderStatus, OrderStatus)>,
}

impl TransitionTable {
  /// A table that permits nothing but same-status assignments.
  pub fn empty() -> Self {
    Self {
      allowed: HashSet::new(),
    }
  }

  /// Every status reachable from every status.
  pub fn open() -> Self {
    let mut table = Self::empty();
    for from in OrderStatus::ALL {
      for to in OrderStatus::ALL {
        table = table.allow(from, to);
      }
    }
    table
  }

  /// pending → processing → shipped → delivered, with cancellation allowed
  /// until the order is delivered.
  pub fn forward_only() -> Self {
    use OrderStatus::*;
    Self::empty()
      .allow(Pending, Processing)
      .allow(Processing, Shipped)
      .allow(Shipped, Delivered)
      .allow(Pending, Cancelled)
      .allow(Processing, Cancelled)
      .allow(Shipped, Cancelled)
  }

  pub fn allow(mut self, from: OrderStatus, to: OrderStatus) -> Self {
    self.allowed.insert((from, to));
    self
  }

  pub fn permits(&self, from: OrderStatus, to: OrderStatus) -> bool {
    from == to || self.allowed.contains(&(from, to))
  }
}

impl Default for TransitionTable {
  fn default() -> Self {
    Self::open()
  }
}

/// Named tables selectable from configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusPolicy {
  #[default]
  Open,
  ForwardOnly,
}

impl StatusPolicy {
  pub fn table(&self) -> TransitionTable {
    match self {
      StatusPolicy::Open => TransitionTable::open(),
      StatusPolicy::ForwardOnly => TransitionTable::forward_only(),
    }
  }
}

impl fmt::Display for StatusPolicy {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      StatusPolicy::Open => f.write_str("open"),
      StatusPolicy::ForwardOnly => f.write_str("forward_only"),
    }
  }
}

impl FromStr for StatusPolicy {
  type Err = StorefrontError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "open" => Ok(StatusPolicy::Open),
      "forward_only" | "forward-only" => Ok(StatusPolicy::ForwardOnly),
      other => Err(StorefrontError::Validation(format!("Unknown order status policy '{}'", other))),
    }
  }
}
