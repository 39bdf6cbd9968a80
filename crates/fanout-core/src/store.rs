//! The `SessionStore` trait — the persistence boundary.
//!
//! The trait is implemented by storage backends (e.g.
//! `fanout-store-sqlite`). Higher layers (`fanout-api`, `fanout-server`)
//! depend on this abstraction, not on any concrete backend.
//!
//! Transaction boundaries are explicit: the owning session loads every
//! collection once at startup and saves a whole-collection snapshot after
//! each committed mutation. A reader never observes a partially-merged
//! import.

use std::future::Future;

use crate::{book::ContactBook, config::ApiConfig, lifecycle::CampaignBoard};

/// Abstraction over the campaign console's persistence backend.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait SessionStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn load_contacts(
    &self,
  ) -> impl Future<Output = Result<ContactBook, Self::Error>> + Send + '_;

  /// Persist a whole-book snapshot, replacing the previous one.
  fn save_contacts<'a>(
    &'a self,
    book: &'a ContactBook,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  fn load_campaigns(
    &self,
  ) -> impl Future<Output = Result<CampaignBoard, Self::Error>> + Send + '_;

  /// Persist a whole-board snapshot, replacing the previous one.
  fn save_campaigns<'a>(
    &'a self,
    board: &'a CampaignBoard,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  fn load_api_config(
    &self,
  ) -> impl Future<Output = Result<ApiConfig, Self::Error>> + Send + '_;

  fn save_api_config<'a>(
    &'a self,
    config: &'a ApiConfig,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}
