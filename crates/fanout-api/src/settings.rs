//! Handlers for `/settings/api` — the stored provider credentials.

use axum::{Json, extract::State};
use fanout_core::{
  config::ApiConfig, dispatch::Dispatcher, gate::PolicyScorer,
  store::SessionStore,
};
use serde::Serialize;

use crate::{AppState, error::ApiError};

/// Credentials plus the derived configured flag, as the console displays
/// them.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigView {
  #[serde(flatten)]
  pub config:        ApiConfig,
  pub is_configured: bool,
}

impl From<ApiConfig> for ConfigView {
  fn from(config: ApiConfig) -> Self {
    let is_configured = config.is_configured();
    Self {
      config,
      is_configured,
    }
  }
}

/// `GET /settings/api`
pub async fn get_config<S, P, D>(
  State(state): State<AppState<S, P, D>>,
) -> Json<ConfigView>
where
  S: SessionStore + 'static,
  P: PolicyScorer + 'static,
  D: Dispatcher + 'static,
{
  let session = state.session.lock().await;
  Json(session.api_config.clone().into())
}

/// `PUT /settings/api` — body: [`ApiConfig`].
pub async fn put_config<S, P, D>(
  State(state): State<AppState<S, P, D>>,
  Json(config): Json<ApiConfig>,
) -> Result<Json<ConfigView>, ApiError>
where
  S: SessionStore + 'static,
  P: PolicyScorer + 'static,
  D: Dispatcher + 'static,
{
  let mut session = state.session.lock().await;
  session.api_config = config.clone();
  state
    .store
    .save_api_config(&session.api_config)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(config.into()))
}
