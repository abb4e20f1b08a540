// kitchenmate_server/src/state.rs
use crate::services::auth_service::TokenVerifier;
use kitchenmate::{CatalogService, OrderService, StatsAggregator};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
  pub orders: Arc<OrderService>,
  pub stats: Arc<StatsAggregator>,
  pub catalog: Arc<CatalogService>,
  pub token_verifier: Arc<dyn TokenVerifier>,
}
