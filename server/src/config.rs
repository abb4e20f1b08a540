// kitchenmate_server/src/config.rs

use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use kitchenmate::{MissingProductPolicy, StatusPolicy};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  pub database_url: String,
  pub database_max_connections: u32,
  pub run_migrations: bool,

  /// HS256 secret shared with the sign-in service that issues bearer tokens.
  pub jwt_secret: String,

  /// Where uploaded product images are written.
  pub blob_root_dir: PathBuf,
  /// Public prefix of stored images. The default points at this server's
  /// `/uploads` mount.
  pub blob_public_base_url: String,

  pub order_status_policy: StatusPolicy,
  pub missing_product_policy: MissingProductPolicy,

  /// Browser origins allowed by CORS; empty means any origin.
  pub cors_allowed_origins: Vec<String>,
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok(); // Load .env file if present

    let get_env = |var_name: &str| {
      env::var(var_name).map_err(|e| AppError::Config(format!("Missing environment variable '{}': {}", var_name, e)))
    };

    let server_host = get_env("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let server_port = parse_or("SERVER_PORT", 5000u16)?;
    let database_url = get_env("DATABASE_URL")?;
    let database_max_connections = parse_or("DATABASE_MAX_CONNECTIONS", 5u32)?;
    let run_migrations = parse_or("RUN_MIGRATIONS", true)?;

    let jwt_secret = get_env("JWT_SECRET")?;
    if jwt_secret.trim().is_empty() {
      return Err(AppError::Config("JWT_SECRET must not be empty".to_string()));
    }

    let blob_root_dir = PathBuf::from(get_env("BLOB_ROOT_DIR").unwrap_or_else(|_| "./uploads".to_string()));
    let blob_public_base_url = get_env("BLOB_PUBLIC_BASE_URL")
      .unwrap_or_else(|_| format!("http://{}:{}/uploads", server_host, server_port));

    let order_status_policy = parse_or("ORDER_STATUS_POLICY", StatusPolicy::default())?;
    let missing_product_policy = parse_or("MISSING_PRODUCT_POLICY", MissingProductPolicy::default())?;

    let cors_allowed_origins = parse_origins(&get_env("CORS_ALLOWED_ORIGINS").unwrap_or_else(|_| "*".to_string()))?;

    tracing::info!(
      %server_host,
      server_port,
      database_max_connections,
      run_migrations,
      %order_status_policy,
      %missing_product_policy,
      ?cors_allowed_origins,
      "Application configuration loaded successfully."
    );

    Ok(Self {
      server_host,
      server_port,
      database_url,
      database_max_connections,
      run_migrations,
      jwt_secret,
      blob_root_dir,
      blob_public_base_url,
      order_status_policy,
      missing_product_policy,
      cors_allowed_origins,
    })
  }

  pub fn bind_address(&self) -> String {
    format!("{}:{}", self.server_host, self.server_port)
  }
}

/// Parses `var_name` when set, otherwise returns `default`.
fn parse_or<T>(var_name: &str, default: T) -> Result<T>
where
  T: FromStr,
  T::Err: std::fmt::Display,
{
  match env::var(var_name) {
    Ok(raw) => raw
      .trim()
      .parse::<T>()
      .map_err(|e| AppError::Config(format!("Invalid {} value '{}': {}", var_name, raw, e))),
    Err(_) => Ok(default),
  }
}

/// Comma-separated origins; `*` alone allows any origin. Trailing slashes are
/// dropped because browsers never send them in `Origin`.
fn parse_origins(raw: &str) -> Result<Vec<String>> {
  if raw.trim() == "*" {
    return Ok(Vec::new());
  }
  raw
    .split(',')
    .map(|origin| origin.trim().trim_end_matches('/'))
    .filter(|origin| !origin.is_empty())
    .map(|origin| {
      if origin.starts_with("http://") || origin.starts_with("https://") {
        Ok(origin.to_string())
      } else {
        Err(AppError::Config(format!("Invalid CORS origin '{}'", origin)))
      }
    })
    .collect()
}
