// kitchenmate_server/src/main.rs

mod config;
mod db;
mod errors;
mod services;
mod state;
mod web;

use crate::config::AppConfig;
use crate::db::PgStore;
use crate::services::auth_service::JwtVerifier;
use crate::services::blob_storage::LocalBlobStore;
use crate::state::AppState;

use actix_web::middleware::NormalizePath;
use actix_web::{web as actix_data, App, HttpServer};
use anyhow::Context;
use kitchenmate::{CatalogService, OrderService, StatsAggregator};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_max_level(Level::INFO)
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
    .with_span_events(FmtSpan::CLOSE)
    .init();

  tracing::info!("Starting KitchenMate API server...");

  let app_config = match AppConfig::from_env() {
    Ok(cfg) => Arc::new(cfg),
    Err(e) => {
      tracing::error!(error = %e, "Failed to load application configuration.");
      return Err(e.into());
    }
  };

  let db_pool = PgPoolOptions::new()
    .max_connections(app_config.database_max_connections)
    .connect(&app_config.database_url)
    .await
    .context("Failed to connect to the database")?;
  tracing::info!("Successfully connected to the database.");

  if app_config.run_migrations {
    sqlx::migrate!("./migrations")
      .run(&db_pool)
      .await
      .context("Failed to run database migrations")?;
    tracing::info!("Database migrations applied.");
  }

  tokio::fs::create_dir_all(&app_config.blob_root_dir)
    .await
    .with_context(|| format!("Failed to create {}", app_config.blob_root_dir.display()))?;

  let store = Arc::new(PgStore::new(db_pool));
  let blobs = Arc::new(LocalBlobStore::new(
    app_config.blob_root_dir.clone(),
    app_config.blob_public_base_url.clone(),
  ));
  tracing::info!(root = %blobs.root().display(), "Image storage ready.");

  let orders = OrderService::new(store.clone(), store.clone())
    .context("Failed to build the order placement pipeline")?
    .with_transitions(app_config.order_status_policy.table())
    .with_missing_product_policy(app_config.missing_product_policy);

  let app_state = AppState {
    orders: Arc::new(orders),
    stats: Arc::new(StatsAggregator::new(store.clone(), store.clone())),
    catalog: Arc::new(CatalogService::new(store, blobs)),
    token_verifier: Arc::new(JwtVerifier::new(&app_config.jwt_secret)),
  };

  let server_address = app_config.bind_address();
  tracing::info!(
    status_policy = %app_config.order_status_policy,
    missing_product_policy = %app_config.missing_product_policy,
    "Attempting to bind server to {}...",
    server_address
  );

  let http_config = app_config.clone();
  HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(app_state.clone()))
      .wrap(web::cors_policy(&http_config.cors_allowed_origins))
      .wrap(NormalizePath::trim())
      .wrap(tracing_actix_web::TracingLogger::default())
      .service(web::uploads_service(&http_config.blob_root_dir))
      .configure(web::configure_app_routes)
  })
  .bind(&server_address)
  .with_context(|| format!("Failed to bind {}", server_address))?
  .run()
  .await?;

  Ok(())
}
