// kitchenmate_server/src/web/handlers/order_handlers.rs

use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::authenticate;
use kitchenmate::models::{NewOrder, OrderStatus};

// --- Request DTOs ---
#[derive(Deserialize, Debug)]
pub struct MyOrdersQuery {
  pub id: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct StatusUpdatePayload {
  pub status: String,
}

// --- Handler Implementations ---

#[instrument(
  name = "handler::create_order",
  skip(app_state, req_payload),
  fields(user_id = %req_payload.user_id, items = req_payload.items.len())
)]
pub async fn create_order_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<NewOrder>,
) -> Result<HttpResponse, AppError> {
  let order = app_state.orders.create_order(req_payload.into_inner()).await?;
  info!(order_id = %order.id, "Order created.");
  Ok(HttpResponse::Created().json(json!({ "success": true, "order": order })))
}

#[instrument(name = "handler::list_all_orders", skip(app_state))]
pub async fn list_all_orders_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let orders = app_state.orders.list_all_orders().await?;
  Ok(HttpResponse::Ok().json(json!({ "success": true, "orders": orders })))
}

/// Orders of the user named by `?id=`, or of the bearer token's `id` claim.
#[instrument(name = "handler::my_orders", skip(req, app_state, query))]
pub async fn my_orders_handler(
  req: HttpRequest,
  app_state: web::Data<AppState>,
  query: web::Query<MyOrdersQuery>,
) -> Result<HttpResponse, AppError> {
  let user_id = match query.id.as_deref().map(str::trim).filter(|id| !id.is_empty()) {
    Some(raw) => Uuid::parse_str(raw).map_err(|_| AppError::Validation(format!("Invalid user id '{}'", raw)))?,
    None => authenticate(&req)?
      .user_id()
      .ok_or_else(|| AppError::Validation("Token does not identify a user".to_string()))?,
  };

  let orders = app_state.orders.list_orders_for_user(user_id).await?;
  info!(%user_id, count = orders.len(), "Fetched user orders.");
  Ok(HttpResponse::Ok().json(json!({ "success": true, "orders": orders })))
}

#[instrument(name = "handler::get_order", skip(app_state, path), fields(order_id = %path.as_ref()))]
pub async fn get_order_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let order = app_state.orders.get_order(path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(json!({ "success": true, "order": order })))
}

#[instrument(
  name = "handler::update_order_status",
  skip(app_state, path, req_payload),
  fields(order_id = %path.as_ref(), status = %req_payload.status)
)]
pub async fn update_order_status_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  req_payload: web::Json<StatusUpdatePayload>,
) -> Result<HttpResponse, AppError> {
  let status: OrderStatus = req_payload.status.parse()?;
  let order = app_state.orders.update_order_status(path.into_inner(), status).await?;
  Ok(HttpResponse::Ok().json(json!({ "success": true, "order": order })))
}
