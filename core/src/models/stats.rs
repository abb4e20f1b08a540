// kitchenmate/src/models/stats.rs

use crate::models::{OrderStatus, OwnedOrder};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusCount {
  pub status: OrderStatus,
  pub count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MonthlyOrderCount {
  /// Calendar month, 1 = January.
  #[serde(rename = "_id")]
  pub month_number: u32,
  pub month: String,
  pub count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProductSales {
  #[serde(rename = "_id")]
  pub product_id: Uuid,
  pub sales: i64,
  /// Live product title; absent once the product has been deleted.
  #[serde(rename = "product", default, skip_serializing_if = "Option::is_none")]
  pub product_title: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
  pub total_orders: i64,
  pub pending_orders: i64,
  pub total_products: i64,
  pub recent_orders: Vec<OwnedOrder>,
  pub total_revenue: f64,
  pub order_status_distribution: Vec<StatusCount>,
  pub monthly_orders: Vec<MonthlyOrderCount>,
  pub top_selling_products: Vec<ProductSales>,
}
