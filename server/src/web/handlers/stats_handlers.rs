// kitchenmate_server/src/web/handlers/stats_handlers.rs

use actix_web::{web, HttpResponse};
use serde_json::Value;
use tracing::instrument;

use crate::errors::AppError;
use crate::state::AppState;

/// Dashboard snapshot, flattened next to `success`.
#[instrument(name = "handler::dashboard_stats", skip(app_state))]
pub async fn dashboard_stats_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let snapshot = app_state.stats.compute().await?;

  let mut body = serde_json::to_value(&snapshot)
    .map_err(|e| AppError::Internal(format!("Failed to serialize dashboard stats: {}", e)))?;
  if let Value::Object(fields) = &mut body {
    fields.insert("success".to_string(), Value::Bool(true));
  }
  Ok(HttpResponse::Ok().json(body))
}
