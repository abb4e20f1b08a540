// kitchenmate_server/src/web/cors.rs

use actix_cors::Cors;
use actix_web::http::header::{self, HeaderName};

const ALLOWED_METHODS: [&str; 6] = ["GET", "POST", "PUT", "DELETE", "PATCH", "OPTIONS"];
const PREFLIGHT_MAX_AGE_SECS: usize = 3600;

/// CORS for the browser storefront. An empty list allows any origin; an
/// explicit list also allows credentials.
pub fn cors_policy(allowed_origins: &[String]) -> Cors {
  let mut cors = Cors::default()
    .allowed_methods(ALLOWED_METHODS)
    .allowed_headers([
      header::CONTENT_TYPE,
      header::AUTHORIZATION,
      header::ACCEPT,
      HeaderName::from_static("x-requested-with"),
    ])
    .expose_headers([HeaderName::from_static("content-range"), HeaderName::from_static("x-content-range")])
    .max_age(PREFLIGHT_MAX_AGE_SECS);

  if allowed_origins.is_empty() {
    cors = cors.allow_any_origin();
  } else {
    for origin in allowed_origins {
      cors = cors.allowed_origin(origin);
    }
    cors = cors.supports_credentials();
  }
  cors
}
