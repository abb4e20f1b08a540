// kitchenmate_server/src/services/auth_service.rs

//! Bearer token verification.
//!
//! Tokens are issued by the sign-in service; this server only checks them.

use crate::errors::AppError;
use actix_web::http::header;
use actix_web::HttpRequest;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, instrument};
use uuid::Uuid;

/// Decoded token payload. Claims other than `id` and `exp` are kept verbatim.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub id: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub exp: Option<u64>,
  #[serde(flatten)]
  pub extra: Map<String, Value>,
}

impl Claims {
  pub fn user_id(&self) -> Option<Uuid> {
    self.id.as_deref().and_then(|id| Uuid::parse_str(id).ok())
  }
}

pub trait TokenVerifier: Send + Sync {
  /// Returns the token's claims, or `AppError::Forbidden` when it is rejected.
  fn verify(&self, token: &str) -> Result<Claims, AppError>;
}

/// HS256 verifier. Expiry is enforced for tokens that carry `exp`.
pub struct JwtVerifier {
  key: DecodingKey,
  validation: Validation,
}

impl JwtVerifier {
  pub fn new(secret: &str) -> Self {
    let mut validation = Validation::new(Algorithm::HS256);
    // Tokens without `exp` never expire; `exp` is still checked when present.
    validation.required_spec_claims.clear();
    Self {
      key: DecodingKey::from_secret(secret.as_bytes()),
      validation,
    }
  }
}

impl TokenVerifier for JwtVerifier {
  #[instrument(name = "auth_service::verify_token", skip_all, err(Display))]
  fn verify(&self, token: &str) -> Result<Claims, AppError> {
    decode::<Claims>(token, &self.key, &self.validation)
      .map(|data| data.claims)
      .map_err(|e| {
        debug!(error = %e, "Token rejected.");
        AppError::Forbidden("Invalid token".to_string())
      })
  }
}

/// The credential following the scheme in the `Authorization` header.
pub fn bearer_token(req: &HttpRequest) -> Option<&str> {
  req
    .headers()
    .get(header::AUTHORIZATION)?
    .to_str()
    .ok()?
    .trim()
    .split_once(' ')
    .map(|(_, token)| token.trim())
    .filter(|token| !token.is_empty())
}

#[cfg(test)]
pub(crate) fn issue_token(secret: &str, claims: &Value) -> String {
  use jsonwebtoken::{encode, EncodingKey, Header};
  encode(&Header::default(), claims, &EncodingKey::from_secret(secret.as_bytes())).expect("token encodes")
}

#[cfg(test)]
mod tests {
  use super::*;
  use actix_web::test::TestRequest;
  use serde_json::json;

  const SECRET: &str = "unit-test-secret";

  fn far_future() -> u64 {
    (chrono::Utc::now() + chrono::Duration::hours(1)).timestamp() as u64
  }

  #[test]
  fn valid_token_yields_claims() {
    let user_id = Uuid::new_v4();
    let token = issue_token(SECRET, &json!({ "id": user_id.to_string(), "exp": far_future(), "role": "admin" }));

    let claims = JwtVerifier::new(SECRET).verify(&token).unwrap();

    assert_eq!(claims.user_id(), Some(user_id));
    assert_eq!(claims.extra.get("role"), Some(&json!("admin")));
  }

  #[test]
  fn wrong_secret_and_expired_tokens_are_forbidden() {
    let verifier = JwtVerifier::new(SECRET);
    let foreign = issue_token("someone-else", &json!({ "id": "x", "exp": far_future() }));
    assert!(matches!(verifier.verify(&foreign), Err(AppError::Forbidden(_))));

    let expired = issue_token(SECRET, &json!({ "id": "x", "exp": 1_000_000 }));
    assert!(matches!(verifier.verify(&expired), Err(AppError::Forbidden(_))));

    assert!(matches!(verifier.verify("not-a-jwt"), Err(AppError::Forbidden(_))));
  }

  #[test]
  fn token_without_expiry_is_accepted() {
    let token = issue_token(SECRET, &json!({ "id": "user-7" }));

    let claims = JwtVerifier::new(SECRET).verify(&token).unwrap();

    assert_eq!(claims.id.as_deref(), Some("user-7"));
    assert_eq!(claims.exp, None);
  }

  #[test]
  fn bearer_token_reads_the_second_segment() {
    let req = TestRequest::default()
      .insert_header((header::AUTHORIZATION, "Bearer abc.def.ghi"))
      .to_http_request();
    assert_eq!(bearer_token(&req), Some("abc.def.ghi"));

    let blank = TestRequest::default()
      .insert_header((header::AUTHORIZATION, "Bearer   "))
      .to_http_request();
    assert_eq!(bearer_token(&blank), None);

    assert_eq!(bearer_token(&TestRequest::default().to_http_request()), None);
  }
}
