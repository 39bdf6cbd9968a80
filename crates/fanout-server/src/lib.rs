//! Fanout server assembly: configuration, auth and the HTTP collaborator
//! implementations behind the core traits.

pub mod auth;
pub mod compliance;
pub mod dispatch;

use std::{path::PathBuf, sync::Arc};

use axum::{Router, middleware};
use fanout_api::AppState;
use fanout_store_sqlite::SqliteSessionStore;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use auth::AuthConfig;
use compliance::GeminiScorer;
use dispatch::AnyDispatcher;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` with a
/// `FANOUT_` environment overlay.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:                   String,
  pub port:                   u16,
  pub store_path:             PathBuf,
  pub auth_username:          String,
  /// PHC string produced by argon2 (see `--hash-password`).
  pub auth_password_hash:     String,

  /// Key for the Gemini policy classifier. An empty key means every check
  /// fails closed (score 0), which blocks sending but never crashes.
  #[serde(default)]
  pub gemini_api_key:         String,
  #[serde(default = "defaults::gemini_model")]
  pub gemini_model:           String,

  #[serde(default = "defaults::compliance_threshold")]
  pub compliance_threshold:   u8,
  #[serde(default = "defaults::country_prefix")]
  pub default_country_prefix: String,

  /// When true, launches are simulated instead of hitting the Cloud API.
  #[serde(default = "defaults::simulate_dispatch")]
  pub simulate_dispatch:      bool,
  /// Fixed inter-request delay of the real dispatch loop.
  #[serde(default = "defaults::dispatch_throttle_ms")]
  pub dispatch_throttle_ms:   u64,
  /// Latency of the simulated send.
  #[serde(default = "defaults::simulated_latency_ms")]
  pub simulated_latency_ms:   u64,
}

mod defaults {
  pub fn gemini_model() -> String { "gemini-3-flash-preview".to_owned() }
  pub fn compliance_threshold() -> u8 {
    fanout_core::gate::DEFAULT_COMPLIANCE_THRESHOLD
  }
  pub fn country_prefix() -> String {
    fanout_core::phone::DEFAULT_COUNTRY_PREFIX.to_owned()
  }
  pub fn simulate_dispatch() -> bool { true }
  pub fn dispatch_throttle_ms() -> u64 { 200 }
  pub fn simulated_latency_ms() -> u64 { 2500 }
}

impl ServerConfig {
  pub fn api_settings(&self) -> fanout_api::ApiSettings {
    fanout_api::ApiSettings {
      default_country_prefix: self.default_country_prefix.clone(),
      compliance_threshold:   self.compliance_threshold,
    }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// The concrete state type the server runs with.
pub type ServerState = AppState<SqliteSessionStore, GeminiScorer, AnyDispatcher>;

/// Assemble the full application: the JSON API nested under `/api`, HTTP
/// Basic auth in front of everything, request tracing outermost.
pub fn router(state: ServerState, auth: Arc<AuthConfig>) -> Router {
  Router::new()
    .nest("/api", fanout_api::api_router(state))
    .layer(middleware::from_fn_with_state(auth, auth::require_auth))
    .layer(TraceLayer::new_for_http())
}
