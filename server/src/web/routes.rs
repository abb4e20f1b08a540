// kitchenmate_server/src/web/routes.rs

use std::path::Path;

use actix_files::Files;
use actix_web::{error, web, HttpResponse};

use crate::errors::AppError;
use crate::web::handlers::{auth_handlers, order_handlers, product_handlers, stats_handlers};

async fn root_handler() -> HttpResponse {
  HttpResponse::Ok().json(serde_json::json!({
    "message": "Hello from KitchenMate API!",
    "status": "running",
    "version": env!("CARGO_PKG_VERSION"),
  }))
}

/// Mount point of the stored product images.
pub const UPLOADS_MOUNT: &str = "/uploads";

/// Serves files written by the local blob store, read-only.
pub fn uploads_service(blob_root: &Path) -> Files {
  Files::new(UPLOADS_MOUNT, blob_root)
}

/// Malformed JSON bodies, path ids and query strings all answer 400 in the
/// regular error envelope.
fn extractor_configs(cfg: &mut web::ServiceConfig) {
  cfg
    .app_data(
      web::JsonConfig::default()
        .error_handler(|err, _req| error::Error::from(AppError::Validation(format!("Invalid JSON body: {}", err)))),
    )
    .app_data(
      web::PathConfig::default()
        .error_handler(|err, _req| error::Error::from(AppError::Validation(format!("Invalid path parameter: {}", err)))),
    )
    .app_data(
      web::QueryConfig::default()
        .error_handler(|err, _req| error::Error::from(AppError::Validation(format!("Invalid query string: {}", err)))),
    );
}

pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  extractor_configs(cfg);

  cfg
    .route("/", web::get().to(root_handler))
    .service(
      web::scope("/api/order")
        // Literal segments before `/{id}`.
        .route("/stats", web::get().to(stats_handlers::dashboard_stats_handler))
        .route("/all", web::get().to(order_handlers::list_all_orders_handler))
        .route("/my-orders", web::get().to(order_handlers::my_orders_handler))
        .route("", web::post().to(order_handlers::create_order_handler))
        .route("/{id}", web::get().to(order_handlers::get_order_handler))
        .route("/{id}/status", web::patch().to(order_handlers::update_order_status_handler)),
    )
    .service(
      web::scope("/api/product")
        .route("/add", web::post().to(product_handlers::add_product_handler))
        .route("/update/{id}", web::put().to(product_handlers::update_product_handler))
        .route("/all", web::get().to(product_handlers::list_products_handler))
        .route("/{id}", web::get().to(product_handlers::get_product_handler))
        .route("/{id}", web::delete().to(product_handlers::delete_product_handler)),
    )
    .service(
      web::scope("/api/middleWare")
        .route("/verify-token", web::post().to(auth_handlers::verify_token_handler)),
    );
}
