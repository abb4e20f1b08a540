// kitchenmate/src/models/order.rs

use crate::error::StorefrontError;
use crate::models::User;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

pub const DEFAULT_PAYMENT_METHOD: &str = "cash";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
  #[default]
  Pending,
  Processing,
  Shipped,
  Delivered,
  Cancelled,
}

impl OrderStatus {
  pub const ALL: [OrderStatus; 5] = [
    OrderStatus::Pending,
    OrderStatus::Processing,
    OrderStatus::Shipped,
    OrderStatus::Delivered,
    OrderStatus::Cancelled,
  ];

  pub fn as_str(&self) -> &'static str {
    match self {
      OrderStatus::Pending => "pending",
      OrderStatus::Processing => "processing",
      OrderStatus::Shipped => "shipped",
      OrderStatus::Delivered => "delivered",
      OrderStatus::Cancelled => "cancelled",
    }
  }
}

impl fmt::Display for OrderStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for OrderStatus {
  type Err = StorefrontError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    OrderStatus::ALL
      .into_iter()
      .find(|status| status.as_str() == s)
      .ok_or_else(|| StorefrontError::Validation(format!("Invalid order status '{}'", s)))
  }
}

/// One ordered product, with title/price/image copied at order time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
  pub product_id: Uuid,
  pub title: String,
  pub price: f64,
  pub quantity: i32,
  pub image_url: String,
}

/// Missing JSON fields deserialize as empty strings so validation can name them.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ShippingInfo {
  pub first_name: String,
  pub last_name: String,
  pub address: String,
  pub city: String,
  pub zip_code: String,
  pub phone: String,
}

impl ShippingInfo {
  pub fn validate(&self) -> Result<(), StorefrontError> {
    let fields = [
      ("firstName", &self.first_name),
      ("lastName", &self.last_name),
      ("address", &self.address),
      ("city", &self.city),
      ("zipCode", &self.zip_code),
      ("phone", &self.phone),
    ];
    match fields.iter().find(|(_, value)| value.trim().is_empty()) {
      Some((field, _)) => Err(StorefrontError::Validation(format!(
        "Shipping field '{}' is required",
        field
      ))),
      None => Ok(()),
    }
  }
}

/// Owner identity attached to admin-facing order views.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderOwner {
  #[serde(rename = "_id")]
  pub id: Uuid,
  pub name: String,
  pub email: String,
}

impl From<&User> for OrderOwner {
  fn from(user: &User) -> Self {
    OrderOwner {
      id: user.id,
      name: user.name.clone(),
      email: user.email.clone(),
    }
  }
}

/// A placed order. `U` is the owner representation: the bare user id, or the
/// resolved [`OrderOwner`] (`None` when the user no longer exists).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Order<U = Uuid> {
  #[serde(rename = "_id")]
  pub id: Uuid,
  pub user: U,
  pub items: Vec<LineItem>,
  pub shipping_info: ShippingInfo,
  pub total_amount: f64,
  pub delivery_fee: f64,
  pub payment_method: String,
  pub status: OrderStatus,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

pub type OwnedOrder = Order<Option<OrderOwner>>;

impl<U> Order<U> {
  pub fn with_owner<V>(self, owner: V) -> Order<V> {
    Order {
      id: self.id,
      user: owner,
      items: self.items,
      shipping_info: self.shipping_info,
      total_amount: self.total_amount,
      delivery_fee: self.delivery_fee,
      payment_method: self.payment_method,
      status: self.status,
      created_at: self.created_at,
      updated_at: self.updated_at,
    }
  }
}

impl OwnedOrder {
  pub fn owner_id(&self) -> Option<Uuid> {
    self.user.as_ref().map(|owner| owner.id)
  }
}

/// Order placement request as submitted by the storefront client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
  #[serde(rename = "id")]
  pub user_id: Uuid,
  pub items: Vec<LineItem>,
  #[serde(default)]
  pub shipping_info: ShippingInfo,
  pub total_amount: f64,
  pub delivery_fee: f64,
  #[serde(default)]
  pub payment_method: Option<String>,
}

impl NewOrder {
  pub fn validate(&self) -> Result<(), StorefrontError> {
    if self.items.is_empty() {
      return Err(StorefrontError::Validation("Order must contain at least one item".to_string()));
    }
    for item in &self.items {
      if item.quantity < 1 {
        return Err(StorefrontError::Validation(format!(
          "Quantity for product {} must be at least 1",
          item.product_id
        )));
      }
      if !item.price.is_finite() || item.price < 0.0 {
        return Err(StorefrontError::Validation(format!(
          "Price for product {} must be a non-negative number",
          item.product_id
        )));
      }
      if item.title.trim().is_empty() || item.image_url.trim().is_empty() {
        return Err(StorefrontError::Validation(format!(
          "Item for product {} needs a title and an image URL",
          item.product_id
        )));
      }
    }
    self.shipping_info.validate()?;
    for (field, amount) in [("totalAmount", self.total_amount), ("deliveryFee", self.delivery_fee)] {
      if !amount.is_finite() || amount < 0.0 {
        return Err(StorefrontError::Validation(format!("{} must be a non-negative number", field)));
      }
    }
    Ok(())
  }

  pub fn payment_method(&self) -> String {
    self
      .payment_method
      .as_deref()
      .map(str::trim)
      .filter(|m| !m.is_empty())
      .unwrap_or(DEFAULT_PAYMENT_METHOD)
      .to_string()
  }

  /// Builds the pending order record this request describes.
  pub fn into_order(self) -> Order {
    let now = Utc::now();
    let payment_method = self.payment_method();
    Order {
      id: Uuid::new_v4(),
      user: self.user_id,
      items: self.items,
      shipping_info: self.shipping_info,
      total_amount: self.total_amount,
      delivery_fee: self.delivery_fee,
      payment_method,
      status: OrderStatus::Pending,
      created_at: now,
      updated_at: now,
    }
  }
}
