//! The operator session — exclusive owner of both collections.
//!
//! Core components never hold hidden references to global state: the
//! session owns the contact book, the campaign board and the provider
//! credentials, and hands them to components as values. Collections are
//! single-writer: the embedding layer serialises access (one mutation in
//! flight per session).

use crate::{
  book::ContactBook, config::ApiConfig, lifecycle::CampaignBoard,
  store::SessionStore,
};

/// In-memory working state, loaded once at startup from a
/// [`SessionStore`] and saved back snapshot-by-snapshot after each
/// committed mutation.
#[derive(Debug, Clone, Default)]
pub struct Session {
  pub contacts:   ContactBook,
  pub campaigns:  CampaignBoard,
  pub api_config: ApiConfig,
}

impl Session {
  /// Load all three collections from the backend.
  pub async fn load<S: SessionStore>(store: &S) -> Result<Self, S::Error> {
    Ok(Self {
      contacts:   store.load_contacts().await?,
      campaigns:  store.load_campaigns().await?,
      api_config: store.load_api_config().await?,
    })
  }
}
