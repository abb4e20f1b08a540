// tests/stats_tests.rs
mod common;

use common::*;
use kitchenmate::models::OrderStatus;
use kitchenmate::ProductStore;
use serial_test::serial;

#[tokio::test]
#[serial]
async fn test_empty_store_yields_zeroes() {
  setup_tracing();
  let shop = Storefront::new();

  let stats = shop.stats().compute().await.unwrap();

  assert_eq!(stats.total_orders, 0);
  assert_eq!(stats.pending_orders, 0);
  assert_eq!(stats.total_products, 0);
  assert_eq!(stats.total_revenue, 0.0);
  assert!(stats.recent_orders.is_empty());
  assert!(stats.order_status_distribution.is_empty());
  assert!(stats.monthly_orders.is_empty());
  assert!(stats.top_selling_products.is_empty());
}

#[tokio::test]
#[serial]
async fn test_revenue_excludes_cancelled_orders() {
  setup_tracing();
  let shop = Storefront::new();
  let ada = shop.add_user("Ada");
  let apples = shop.add_product("Apples", 50).await;
  shop.seed_order(ada.id, &apples, 1, 10.0, OrderStatus::Pending, utc(2024, 1, 5));
  shop.seed_order(ada.id, &apples, 1, 20.0, OrderStatus::Delivered, utc(2024, 1, 6));
  shop.seed_order(ada.id, &apples, 1, 30.0, OrderStatus::Cancelled, utc(2024, 1, 7));

  let stats = shop.stats().compute().await.unwrap();

  assert_eq!(stats.total_revenue, 30.0);
  assert_eq!(stats.total_orders, 3);
  assert_eq!(stats.pending_orders, 1);
  assert_eq!(stats.total_products, 1);
}

#[tokio::test]
#[serial]
async fn test_status_distribution_sums_to_total() {
  setup_tracing();
  let shop = Storefront::new();
  let ada = shop.add_user("Ada");
  let apples = shop.add_product("Apples", 50).await;
  for (status, day) in [
    (OrderStatus::Pending, 1),
    (OrderStatus::Pending, 2),
    (OrderStatus::Shipped, 3),
    (OrderStatus::Delivered, 4),
  ] {
    shop.seed_order(ada.id, &apples, 1, 5.0, status, utc(2024, 2, day));
  }

  let stats = shop.stats().compute().await.unwrap();

  let sum: i64 = stats.order_status_distribution.iter().map(|s| s.count).sum();
  assert_eq!(sum, stats.total_orders);
  let pending = stats
    .order_status_distribution
    .iter()
    .find(|s| s.status == OrderStatus::Pending)
    .expect("pending bucket");
  assert_eq!(pending.count, 2);
  assert!(stats
    .order_status_distribution
    .iter()
    .all(|s| s.status != OrderStatus::Cancelled));
}

#[tokio::test]
#[serial]
async fn test_monthly_orders_skip_empty_months_and_ignore_year() {
  setup_tracing();
  let shop = Storefront::new();
  let ada = shop.add_user("Ada");
  let apples = shop.add_product("Apples", 50).await;
  shop.seed_order(ada.id, &apples, 1, 5.0, OrderStatus::Pending, utc(2024, 11, 3));
  shop.seed_order(ada.id, &apples, 1, 5.0, OrderStatus::Pending, utc(2023, 3, 3));
  shop.seed_order(ada.id, &apples, 1, 5.0, OrderStatus::Pending, utc(2024, 3, 20));

  let stats = shop.stats().compute().await.unwrap();

  let months: Vec<(u32, &str, i64)> = stats
    .monthly_orders
    .iter()
    .map(|m| (m.month_number, m.month.as_str(), m.count))
    .collect();
  assert_eq!(months, vec![(3, "Mar", 2), (11, "Nov", 1)]);
}

#[tokio::test]
#[serial]
async fn test_recent_orders_are_five_newest_with_owner() {
  setup_tracing();
  let shop = Storefront::new();
  let ada = shop.add_user("Ada");
  let apples = shop.add_product("Apples", 50).await;
  let mut seeded = Vec::new();
  for day in 1..=7 {
    seeded.push(shop.seed_order(ada.id, &apples, 1, 5.0, OrderStatus::Pending, utc(2024, 4, day)));
  }

  let stats = shop.stats().compute().await.unwrap();

  assert_eq!(stats.recent_orders.len(), 5);
  assert_eq!(stats.recent_orders[0].id, seeded[6].id);
  assert_eq!(stats.recent_orders[4].id, seeded[2].id);
  assert!(stats
    .recent_orders
    .iter()
    .all(|o| o.user.as_ref().map(|u| u.name.as_str()) == Some("Ada")));
}

#[tokio::test]
#[serial]
async fn test_top_selling_products_ranked_and_capped() {
  setup_tracing();
  let shop = Storefront::new();
  let ada = shop.add_user("Ada");
  let mut products = Vec::new();
  for (i, title) in ["Apples", "Bread", "Cheese", "Dates", "Eggs", "Figs", "Grapes"]
    .iter()
    .enumerate()
  {
    let product = shop.add_product(title, 100).await;
    shop.seed_order(ada.id, &product, (i as i32) + 1, 5.0, OrderStatus::Pending, utc(2024, 5, 1));
    products.push(product);
  }
  // Grapes was sold 7 units in total, then removed from the catalog.
  shop.store.delete_product(products[6].id).await.unwrap();

  let stats = shop.stats().compute().await.unwrap();
  let top = &stats.top_selling_products;

  assert_eq!(top.len(), 5);
  assert!(top.windows(2).all(|w| w[0].sales >= w[1].sales));
  assert_eq!(top[0].product_id, products[6].id);
  assert_eq!(top[0].sales, 7);
  assert_eq!(top[0].product_title, None);
  assert_eq!(top[1].product_title.as_deref(), Some("Figs"));
  assert_eq!(top[4].sales, 3);
}

#[tokio::test]
#[serial]
async fn test_snapshot_serializes_with_dashboard_field_names() {
  setup_tracing();
  let shop = Storefront::new();
  let ada = shop.add_user("Ada");
  let apples = shop.add_product("Apples", 50).await;
  shop.seed_order(ada.id, &apples, 2, 5.0, OrderStatus::Pending, utc(2024, 6, 1));

  let stats = shop.stats().compute().await.unwrap();
  let json = serde_json::to_value(&stats).unwrap();

  assert_eq!(json["totalOrders"], 1);
  assert_eq!(json["monthlyOrders"][0]["_id"], 6);
  assert_eq!(json["monthlyOrders"][0]["month"], "Jun");
  assert_eq!(json["topSellingProducts"][0]["sales"], 2);
  assert_eq!(json["topSellingProducts"][0]["product"], "Apples");
  assert_eq!(json["recentOrders"][0]["user"]["name"], "Ada");
  assert_eq!(json["orderStatusDistribution"][0]["status"], "pending");
}
