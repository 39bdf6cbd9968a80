//! JSON REST API for the Fanout campaign console.
//!
//! Exposes an axum [`Router`] backed by any [`SessionStore`], with policy
//! scoring and message dispatch injected as collaborators. Auth, TLS and
//! transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", fanout_api::api_router(state.clone()))
//! ```

pub mod campaigns;
pub mod compliance;
pub mod contacts;
pub mod error;
pub mod settings;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use fanout_core::{
  dispatch::Dispatcher, gate::PolicyScorer, session::Session,
  store::SessionStore,
};
use tokio::sync::Mutex;

pub use error::ApiError;

/// Runtime knobs for the API layer.
#[derive(Debug, Clone)]
pub struct ApiSettings {
  /// Country prefix for phones entered without one.
  pub default_country_prefix: String,
  /// Minimum compliance score to create a campaign.
  pub compliance_threshold:   u8,
}

impl Default for ApiSettings {
  fn default() -> Self {
    Self {
      default_country_prefix:
        fanout_core::phone::DEFAULT_COUNTRY_PREFIX.to_owned(),
      compliance_threshold: fanout_core::gate::DEFAULT_COMPLIANCE_THRESHOLD,
    }
  }
}

/// Shared state threaded through all axum handlers.
///
/// The session mutex makes each collection single-writer: one mutation is in
/// flight at a time, and persisted snapshots are taken under the same lock,
/// so a reader never observes a partially-merged import.
pub struct AppState<S, P, D> {
  pub store:      Arc<S>,
  pub scorer:     Arc<P>,
  pub dispatcher: Arc<D>,
  pub session:    Arc<Mutex<Session>>,
  pub settings:   ApiSettings,
}

impl<S, P, D> Clone for AppState<S, P, D> {
  fn clone(&self) -> Self {
    Self {
      store:      self.store.clone(),
      scorer:     self.scorer.clone(),
      dispatcher: self.dispatcher.clone(),
      session:    self.session.clone(),
      settings:   self.settings.clone(),
    }
  }
}

impl<S, P, D> AppState<S, P, D>
where
  S: SessionStore,
{
  /// Load the session from `store` and assemble the state.
  pub async fn load(
    store: S,
    scorer: P,
    dispatcher: D,
    settings: ApiSettings,
  ) -> Result<Self, S::Error> {
    let session = Session::load(&store).await?;
    Ok(Self {
      store: Arc::new(store),
      scorer: Arc::new(scorer),
      dispatcher: Arc::new(dispatcher),
      session: Arc::new(Mutex::new(session)),
      settings,
    })
  }
}

/// Build a fully-materialised API router for the given collaborators.
///
/// The returned `Router<()>` can be nested into any parent router
/// regardless of its own state type.
pub fn api_router<S, P, D>(state: AppState<S, P, D>) -> Router<()>
where
  S: SessionStore + 'static,
  P: PolicyScorer + 'static,
  D: Dispatcher + 'static,
{
  Router::new()
    // Contacts
    .route(
      "/contacts",
      get(contacts::list::<S, P, D>).post(contacts::create::<S, P, D>),
    )
    .route(
      "/contacts/{id}",
      axum::routing::put(contacts::overwrite::<S, P, D>)
        .delete(contacts::remove::<S, P, D>),
    )
    .route("/contacts/import", post(contacts::import::<S, P, D>))
    // Campaigns
    .route(
      "/campaigns",
      get(campaigns::list::<S, P, D>).post(campaigns::create::<S, P, D>),
    )
    .route("/campaigns/{id}", get(campaigns::get_one::<S, P, D>))
    .route("/campaigns/{id}/launch", post(campaigns::launch::<S, P, D>))
    // Compliance
    .route("/compliance/check", post(compliance::check::<S, P, D>))
    .route("/compliance/optimize", post(compliance::optimize::<S, P, D>))
    // Provider credentials
    .route(
      "/settings/api",
      get(settings::get_config::<S, P, D>)
        .put(settings::put_config::<S, P, D>),
    )
    .with_state(state)
}
