// kitchenmate_server/src/web/handlers/auth_handlers.rs

use actix_web::HttpResponse;
use serde_json::json;
use tracing::{info, instrument};

use crate::errors::AppError;
use crate::web::extractors::BearerClaims;

/// Echoes the claims of a valid bearer token back to the caller.
#[instrument(name = "handler::verify_token", skip(claims))]
pub async fn verify_token_handler(claims: BearerClaims) -> Result<HttpResponse, AppError> {
  let BearerClaims(claims) = claims;
  info!(user_id = ?claims.id, "Token verified.");
  Ok(HttpResponse::Ok().json(json!({ "message": "Token is valid", "user": claims })))
}
