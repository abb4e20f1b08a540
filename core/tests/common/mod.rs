// tests/common/mod.rs
#![allow(dead_code)] // Each test binary uses a different subset.

use chrono::{DateTime, TimeZone, Utc};
use kitchenmate::models::{Category, LineItem, NewOrder, NewProduct, Order, OrderStatus, Product, ShippingInfo, User};
use kitchenmate::{
  CatalogService, ContextData, ImageUpload, MemoryBlobStore, MemoryStore, OrderService, PipelineControl,
  PipelineError, ProductStore, StatsAggregator,
};
use once_cell::sync::Lazy;
use std::sync::Arc;
use tracing::Level;
use uuid::Uuid;

// --- Pipeline test context ---
#[derive(Clone, Debug, Default)]
pub struct StepLog {
  pub steps_executed: Vec<String>,
  pub stop_at: Option<String>,
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum TestError {
  #[error("Pipeline error: {0}")]
  Pipeline(#[from] PipelineError),

  #[error("Test handler failed: {0}")]
  Handler(String),
}

pub fn recording_handler(step_name: &'static str) -> kitchenmate::pipeline::Handler<StepLog, TestError> {
  Box::new(move |ctx: ContextData<StepLog>| {
    Box::pin(async move {
      let mut guard = ctx.write();
      guard.steps_executed.push(step_name.to_string());
      if guard.stop_at.as_deref() == Some(step_name) {
        return Ok(PipelineControl::Stop);
      }
      Ok(PipelineControl::Continue)
    })
  })
}

pub fn failing_handler(
  step_name: &'static str,
  message: &'static str,
) -> kitchenmate::pipeline::Handler<StepLog, TestError> {
  Box::new(move |ctx: ContextData<StepLog>| {
    Box::pin(async move {
      ctx.write().steps_executed.push(step_name.to_string());
      Err(TestError::Handler(message.to_string()))
    })
  })
}

// --- Storefront fixtures ---
pub struct Storefront {
  pub store: MemoryStore,
  pub blobs: MemoryBlobStore,
}

impl Storefront {
  pub fn new() -> Self {
    Self {
      store: MemoryStore::new(),
      blobs: MemoryBlobStore::new("https://cdn.test"),
    }
  }

  pub fn orders(&self) -> OrderService {
    OrderService::new(Arc::new(self.store.clone()), Arc::new(self.store.clone())).expect("order service builds")
  }

  pub fn stats(&self) -> StatsAggregator {
    StatsAggregator::new(Arc::new(self.store.clone()), Arc::new(self.store.clone()))
  }

  pub fn catalog(&self) -> CatalogService {
    CatalogService::new(Arc::new(self.store.clone()), Arc::new(self.blobs.clone()))
  }

  pub fn add_user(&self, name: &str) -> User {
    let user = User::new(name, format!("{}@example.com", name.to_lowercase()));
    self.store.insert_user(user.clone());
    user
  }

  pub async fn add_product(&self, title: &str, stock: i32) -> Product {
    let product = new_product(title, stock).into_product(vec![format!(
      "https://cdn.test/kitchenmate/products/{}.jpg",
      title.to_lowercase()
    )]);
    self.store.insert_product(&product).await.expect("insert product");
    product
  }

  pub fn stock_of(&self, product: &Product) -> i32 {
    self.store.product_stock(product.id).expect("product exists")
  }

  /// Seeds an order directly, bypassing placement and stock.
  pub fn seed_order(
    &self,
    user: Uuid,
    product: &Product,
    quantity: i32,
    total: f64,
    status: OrderStatus,
    created_at: DateTime<Utc>,
  ) -> Order {
    let mut order = order_request(user, &[(product, quantity)]).into_order();
    order.total_amount = total;
    order.status = status;
    order.created_at = created_at;
    order.updated_at = created_at;
    self.store.insert_order(order.clone());
    order
  }
}

pub fn new_product(title: &str, stock: i32) -> NewProduct {
  NewProduct {
    title: title.to_string(),
    category: Category::Fruits,
    price: "2.50".to_string(),
    stock,
    description: format!("Fresh {}", title),
    origin: "Local farm".to_string(),
    quality: "Organic".to_string(),
    storage: "Cool and dry".to_string(),
    packaging: "Paper bag".to_string(),
    weight: "1kg".to_string(),
  }
}

pub fn shipping_info() -> ShippingInfo {
  ShippingInfo {
    first_name: "Ada".to_string(),
    last_name: "Lovelace".to_string(),
    address: "12 Analytical Row".to_string(),
    city: "London".to_string(),
    zip_code: "N1 9GU".to_string(),
    phone: "+44 20 7946 0000".to_string(),
  }
}

pub fn line_item(product: &Product, quantity: i32) -> LineItem {
  LineItem {
    product_id: product.id,
    title: product.title.clone(),
    price: 2.5,
    quantity,
    image_url: product.image_urls.first().cloned().unwrap_or_default(),
  }
}

pub fn order_request(user_id: Uuid, lines: &[(&Product, i32)]) -> NewOrder {
  let items: Vec<LineItem> = lines.iter().map(|(p, q)| line_item(p, *q)).collect();
  let subtotal: f64 = items.iter().map(|i| i.price * f64::from(i.quantity)).sum();
  NewOrder {
    user_id,
    items,
    shipping_info: shipping_info(),
    total_amount: subtotal + 3.0,
    delivery_fee: 3.0,
    payment_method: None,
  }
}

pub fn image(name: &str) -> ImageUpload {
  ImageUpload {
    file_name: name.to_string(),
    content_type: Some("image/jpeg".to_string()),
    bytes: vec![0xFF, 0xD8, 0xFF],
  }
}

pub fn utc(year: i32, month: u32, day: u32) -> DateTime<Utc> {
  Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).single().expect("valid date")
}

static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}
