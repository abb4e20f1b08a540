// kitchenmate/src/stats.rs

//! Admin dashboard aggregates.

use crate::error::StorefrontResult;
use crate::models::{MonthlyOrderCount, OrderStatus, StatsSnapshot};
use crate::store::{OrderStore, ProductStore};
use futures_util::try_join;
use std::sync::Arc;
use tracing::{debug, instrument};

pub const RECENT_ORDERS_LIMIT: i64 = 5;
pub const TOP_SELLING_LIMIT: i64 = 5;

pub const MONTH_ABBREVIATIONS: [&str; 12] = [
  "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Abbreviated English month name for `month` in `1..=12`.
pub fn month_abbreviation(month: u32) -> Option<&'static str> {
  let index = usize::try_from(month).ok()?.checked_sub(1)?;
  MONTH_ABBREVIATIONS.get(index).copied()
}

pub struct StatsAggregator {
  orders: Arc<dyn OrderStore>,
  products: Arc<dyn ProductStore>,
}

impl StatsAggregator {
  pub fn new(orders: Arc<dyn OrderStore>, products: Arc<dyn ProductStore>) -> Self {
    Self { orders, products }
  }

  /// Runs the independent aggregate queries concurrently and fails with the
  /// first error.
  #[instrument(name = "StatsAggregator::compute", skip(self), err(Display))]
  pub async fn compute(&self) -> StorefrontResult<StatsSnapshot> {
    let (
      total_orders,
      pending_orders,
      total_products,
      recent_orders,
      total_revenue,
      order_status_distribution,
      by_month,
      top_selling_products,
    ) = try_join!(
      self.orders.count_orders(None),
      self.orders.count_orders(Some(OrderStatus::Pending)),
      self.products.count_products(),
      self.orders.list_owned_orders(Some(RECENT_ORDERS_LIMIT)),
      self.orders.revenue_excluding(OrderStatus::Cancelled),
      self.orders.count_by_status(),
      self.orders.count_by_month(),
      self.orders.top_selling_products(TOP_SELLING_LIMIT),
    )?;

    let mut monthly_orders: Vec<MonthlyOrderCount> = by_month
      .into_iter()
      .filter(|(_, count)| *count > 0)
      .filter_map(|(month_number, count)| {
        month_abbreviation(month_number).map(|month| MonthlyOrderCount {
          month_number,
          month: month.to_string(),
          count,
        })
      })
      .collect();
    monthly_orders.sort_by_key(|m| m.month_number);

    debug!(total_orders, total_products, "Dashboard stats computed.");

    Ok(StatsSnapshot {
      total_orders,
      pending_orders,
      total_products,
      recent_orders,
      total_revenue,
      order_status_distribution,
      monthly_orders,
      top_selling_products,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn month_abbreviations_cover_the_calendar() {
    assert_eq!(month_abbreviation(1), Some("Jan"));
    assert_eq!(month_abbreviation(12), Some("Dec"));
    assert_eq!(month_abbreviation(0), None);
    assert_eq!(month_abbreviation(13), None);
  }
}
