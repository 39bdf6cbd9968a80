//! HTTP Basic-auth middleware and standalone verifier.
//!
//! Credentials are a single operator account: a username and an argon2 PHC
//! hash from the server configuration. The core never sees auth; it is
//! applied as a layer in front of the whole API.

use std::sync::Arc;

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::{
  extract::{Request, State},
  http::{HeaderMap, StatusCode, header},
  middleware::Next,
  response::{IntoResponse, Response},
};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use thiserror::Error;

/// Credentials accepted as valid for this server instance.
#[derive(Clone)]
pub struct AuthConfig {
  pub username:      String,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
}

#[derive(Debug, Error)]
pub enum AuthError {
  #[error("unauthorized")]
  Unauthorized,
}

impl IntoResponse for AuthError {
  fn into_response(self) -> Response {
    (
      StatusCode::UNAUTHORIZED,
      [(header::WWW_AUTHENTICATE, "Basic realm=\"fanout\"")],
      "unauthorized",
    )
      .into_response()
  }
}

/// Verify credentials directly from headers.
pub fn verify_auth(
  headers: &HeaderMap,
  config: &AuthConfig,
) -> Result<(), AuthError> {
  let header_val = headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or(AuthError::Unauthorized)?;

  let encoded = header_val
    .strip_prefix("Basic ")
    .ok_or(AuthError::Unauthorized)?;

  let decoded = B64.decode(encoded).map_err(|_| AuthError::Unauthorized)?;
  let creds =
    std::str::from_utf8(&decoded).map_err(|_| AuthError::Unauthorized)?;

  let (username, password) =
    creds.split_once(':').ok_or(AuthError::Unauthorized)?;

  if username != config.username {
    return Err(AuthError::Unauthorized);
  }

  let parsed_hash = PasswordHash::new(&config.password_hash)
    .map_err(|_| AuthError::Unauthorized)?;

  Argon2::default()
    .verify_password(password.as_bytes(), &parsed_hash)
    .map_err(|_| AuthError::Unauthorized)?;

  Ok(())
}

/// Middleware: reject the request unless Basic auth checks out.
pub async fn require_auth(
  State(config): State<Arc<AuthConfig>>,
  req: Request,
  next: Next,
) -> Response {
  match verify_auth(req.headers(), &config) {
    Ok(()) => next.run(req).await,
    Err(e) => e.into_response(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn make_config(password: &str) -> AuthConfig {
    use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
    use rand_core::OsRng;
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
      .hash_password(password.as_bytes(), &salt)
      .unwrap()
      .to_string();

    AuthConfig {
      username:      "operator".to_string(),
      password_hash: hash,
    }
  }

  fn headers_with(value: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::AUTHORIZATION, value.parse().unwrap());
    headers
  }

  fn basic(user: &str, pass: &str) -> String {
    let encoded = B64.encode(format!("{user}:{pass}"));
    format!("Basic {encoded}")
  }

  #[test]
  fn correct_credentials() {
    let config = make_config("secret");
    let headers = headers_with(&basic("operator", "secret"));
    assert!(verify_auth(&headers, &config).is_ok());
  }

  #[test]
  fn wrong_password() {
    let config = make_config("secret");
    let headers = headers_with(&basic("operator", "wrong"));
    assert!(matches!(
      verify_auth(&headers, &config),
      Err(AuthError::Unauthorized)
    ));
  }

  #[test]
  fn wrong_username() {
    let config = make_config("secret");
    let headers = headers_with(&basic("intruder", "secret"));
    assert!(matches!(
      verify_auth(&headers, &config),
      Err(AuthError::Unauthorized)
    ));
  }

  #[test]
  fn missing_header() {
    let config = make_config("secret");
    assert!(matches!(
      verify_auth(&HeaderMap::new(), &config),
      Err(AuthError::Unauthorized)
    ));
  }

  #[test]
  fn invalid_base64() {
    let config = make_config("secret");
    let headers = headers_with("Basic !!!not-base64!!!");
    assert!(matches!(
      verify_auth(&headers, &config),
      Err(AuthError::Unauthorized)
    ));
  }
}
