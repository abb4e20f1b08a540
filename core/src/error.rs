// kitchenmate/src/error.rs
use crate::models::OrderStatus;
use crate::pipeline::PipelineError;
use anyhow::Error as AnyhowError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StorefrontError {
  #[error("{0}")]
  Validation(String),

  /// Display text is what clients see; `id` stays in logs.
  #[error("{entity} not found")]
  NotFound { entity: &'static str, id: String },

  #[error("Insufficient stock for product {product_id}: requested {requested}, available {available}")]
  InsufficientStock {
    product_id: Uuid,
    requested: i32,
    available: i32,
  },

  #[error("Order status cannot change from {from} to {to}")]
  InvalidTransition { from: OrderStatus, to: OrderStatus },

  #[error("Persistence error: {source}")]
  Persistence {
    #[source]
    source: AnyhowError,
  },

  #[error("Blob storage error: {source}")]
  Blob {
    #[source]
    source: AnyhowError,
  },

  #[error(transparent)]
  Pipeline(#[from] PipelineError),

  #[error("Internal error: {0}")]
  Internal(String),
}

impl StorefrontError {
  pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
    StorefrontError::NotFound {
      entity,
      id: id.to_string(),
    }
  }

  pub fn persistence<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    StorefrontError::Persistence {
      source: AnyhowError::new(err),
    }
  }

  pub fn blob<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    StorefrontError::Blob {
      source: AnyhowError::new(err),
    }
  }
}

pub type StorefrontResult<T, E = StorefrontError> = std::result::Result<T, E>;
