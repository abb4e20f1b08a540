// kitchenmate_server/src/errors.rs

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use kitchenmate::StorefrontError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Validation Error: {0}")]
  Validation(String),

  /// No credentials were presented.
  #[error("Authentication Failed: {0}")]
  Auth(String),

  /// Credentials were presented but rejected.
  #[error("Forbidden: {0}")]
  Forbidden(String),

  #[error("Resource Not Found: {0}")]
  NotFound(String),

  #[error("Conflict: {0}")]
  Conflict(String),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Internal Server Error: {0}")]
  Internal(String),
}

impl AppError {
  /// Text placed in the response envelope. Server-side failures stay generic.
  pub fn client_message(&self) -> String {
    match self {
      AppError::Validation(m)
      | AppError::Auth(m)
      | AppError::Forbidden(m)
      | AppError::NotFound(m)
      | AppError::Conflict(m) => m.clone(),
      AppError::Config(_) | AppError::Internal(_) => "Internal server error".to_string(),
    }
  }
}

impl From<StorefrontError> for AppError {
  fn from(err: StorefrontError) -> Self {
    match err {
      StorefrontError::Validation(m) => AppError::Validation(m),
      e @ StorefrontError::NotFound { .. } => AppError::NotFound(e.to_string()),
      e @ (StorefrontError::InsufficientStock { .. } | StorefrontError::InvalidTransition { .. }) => {
        AppError::Conflict(e.to_string())
      }
      e @ (StorefrontError::Persistence { .. }
      | StorefrontError::Blob { .. }
      | StorefrontError::Pipeline(_)
      | StorefrontError::Internal(_)) => AppError::Internal(format!("{:#}", anyhow::Error::new(e))),
    }
  }
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::Validation(_) => StatusCode::BAD_REQUEST,
      AppError::Auth(_) => StatusCode::UNAUTHORIZED,
      AppError::Forbidden(_) => StatusCode::FORBIDDEN,
      AppError::NotFound(_) => StatusCode::NOT_FOUND,
      AppError::Conflict(_) => StatusCode::CONFLICT,
      AppError::Config(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn error_response(&self) -> HttpResponse {
    // Log the full error when it's turned into a response
    tracing::error!(application_error = %self, status = %self.status_code(), "Responding with error");
    HttpResponse::build(self.status_code()).json(json!({
      "success": false,
      "message": self.client_message(),
    }))
  }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
  use super::*;
  use kitchenmate::models::OrderStatus;
  use uuid::Uuid;

  #[test]
  fn storefront_errors_map_to_http_statuses() {
    let cases = [
      (StorefrontError::Validation("bad".to_string()), StatusCode::BAD_REQUEST),
      (StorefrontError::not_found("Order", Uuid::nil()), StatusCode::NOT_FOUND),
      (
        StorefrontError::InsufficientStock {
          product_id: Uuid::nil(),
          requested: 2,
          available: 1,
        },
        StatusCode::CONFLICT,
      ),
      (
        StorefrontError::InvalidTransition {
          from: OrderStatus::Delivered,
          to: OrderStatus::Pending,
        },
        StatusCode::CONFLICT,
      ),
      (StorefrontError::Internal("boom".to_string()), StatusCode::INTERNAL_SERVER_ERROR),
    ];
    for (err, status) in cases {
      assert_eq!(AppError::from(err).status_code(), status);
    }
  }

  #[test]
  fn server_side_details_stay_out_of_the_envelope() {
    let err = AppError::from(StorefrontError::Internal("connection refused".to_string()));
    assert_eq!(err.client_message(), "Internal server error");
    assert_eq!(
      AppError::from(StorefrontError::not_found("Order", Uuid::nil())).client_message(),
      "Order not found"
    );
  }
}
