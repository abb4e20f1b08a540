// kitchenmate/src/models/product.rs

use crate::error::StorefrontError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
  Fruits,
  Vegetables,
  Bakery,
  Dairy,
  Juice,
  Groceries,
}

impl Category {
  pub const ALL: [Category; 6] = [
    Category::Fruits,
    Category::Vegetables,
    Category::Bakery,
    Category::Dairy,
    Category::Juice,
    Category::Groceries,
  ];

  pub fn as_str(&self) -> &'static str {
    match self {
      Category::Fruits => "Fruits",
      Category::Vegetables => "Vegetables",
      Category::Bakery => "Bakery",
      Category::Dairy => "Dairy",
      Category::Juice => "Juice",
      Category::Groceries => "Groceries",
    }
  }
}

impl fmt::Display for Category {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Category {
  type Err = StorefrontError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Category::ALL
      .into_iter()
      .find(|c| c.as_str() == s.trim())
      .ok_or_else(|| StorefrontError::Validation(format!("Unknown product category '{}'", s)))
  }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
  #[serde(rename = "_id")]
  pub id: Uuid,
  pub title: String,
  pub category: Category,
  /// Kept as entered by the catalog admin, e.g. "3.50".
  pub price: String,
  pub stock: i32,
  pub description: String,
  pub origin: String,
  pub quality: String,
  pub storage: String,
  pub packaging: String,
  pub weight: String,
  pub image_urls: Vec<String>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// Fields of a product before it has an id or images.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
  pub title: String,
  pub category: Category,
  pub price: String,
  pub stock: i32,
  pub description: String,
  pub origin: String,
  pub quality: String,
  pub storage: String,
  pub packaging: String,
  pub weight: String,
}

impl NewProduct {
  pub fn validate(&self) -> Result<(), StorefrontError> {
    let required = [
      ("title", &self.title),
      ("price", &self.price),
      ("description", &self.description),
      ("origin", &self.origin),
      ("quality", &self.quality),
      ("storage", &self.storage),
      ("packaging", &self.packaging),
      ("weight", &self.weight),
    ];
    if let Some((field, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
      return Err(StorefrontError::Validation(format!("Product {} is required", field)));
    }
    if self.stock < 0 {
      return Err(StorefrontError::Validation("Product stock cannot be negative".to_string()));
    }
    Ok(())
  }

  pub fn into_product(self, image_urls: Vec<String>) -> Product {
    let now = Utc::now();
    Product {
      id: Uuid::new_v4(),
      title: self.title.trim().to_string(),
      category: self.category,
      price: self.price,
      stock: self.stock,
      description: self.description,
      origin: self.origin,
      quality: self.quality,
      storage: self.storage,
      packaging: self.packaging,
      weight: self.weight,
      image_urls,
      created_at: now,
      updated_at: now,
    }
  }
}

/// Partial update; `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductPatch {
  pub title: Option<String>,
  pub category: Option<Category>,
  pub price: Option<String>,
  pub stock: Option<i32>,
  pub description: Option<String>,
  pub origin: Option<String>,
  pub quality: Option<String>,
  pub storage: Option<String>,
  pub packaging: Option<String>,
  pub weight: Option<String>,
}

impl ProductPatch {
  pub fn validate(&self) -> Result<(), StorefrontError> {
    if matches!(self.stock, Some(stock) if stock < 0) {
      return Err(StorefrontError::Validation("Product stock cannot be negative".to_string()));
    }
    Ok(())
  }

  /// Blank strings count as "not provided".
  pub fn apply_to(self, product: &mut Product) {
    fn replace(target: &mut String, value: Option<String>) {
      if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
        *target = value;
      }
    }

    replace(&mut product.title, self.title.map(|t| t.trim().to_string()));
    replace(&mut product.price, self.price);
    replace(&mut product.description, self.description);
    replace(&mut product.origin, self.origin);
    replace(&mut product.quality, self.quality);
    replace(&mut product.storage, self.storage);
    replace(&mut product.packaging, self.packaging);
    replace(&mut product.weight, self.weight);
    if let Some(category) = self.category {
      product.category = category;
    }
    if let Some(stock) = self.stock {
      product.stock = stock;
    }
  }
}
