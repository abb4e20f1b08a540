// kitchenmate_server/src/web/extractors.rs

use actix_web::{web, FromRequest, HttpRequest};
use futures_util::future::{ready, Ready};
use tracing::warn;

use crate::errors::AppError;
use crate::services::auth_service::{bearer_token, Claims};
use crate::state::AppState;

/// Checks the request's bearer token: 401 when absent, 403 when rejected.
pub fn authenticate(req: &HttpRequest) -> Result<Claims, AppError> {
  let app_state = req
    .app_data::<web::Data<AppState>>()
    .ok_or_else(|| AppError::Internal("Application state is not configured".to_string()))?;

  let token = bearer_token(req).ok_or_else(|| {
    warn!("Request carried no bearer token.");
    AppError::Auth("No token provided".to_string())
  })?;

  app_state.token_verifier.verify(token)
}

/// Claims of a verified bearer token.
#[derive(Debug)]
pub struct BearerClaims(pub Claims);

impl FromRequest for BearerClaims {
  type Error = AppError;
  type Future = Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
    ready(authenticate(req).map(BearerClaims))
  }
}
