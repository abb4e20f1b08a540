// kitchenmate/src/models/user.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Account owned by the external auth system; read here only to label orders.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
  #[serde(rename = "_id")]
  pub id: Uuid,
  pub name: String,
  pub email: String,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl User {
  pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
    let now = Utc::now();
    Self {
      id: Uuid::new_v4(),
      name: name.into(),
      email: email.into(),
      created_at: now,
      updated_at: now,
    }
  }
}
