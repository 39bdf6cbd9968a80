//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler. Every variant renders as a short
/// human-readable message in a `{"error": …}` body so the console can
/// display rejections uniformly.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  /// Lifecycle conflicts: launching a non-draft campaign, re-entering a
  /// terminal state.
  #[error("conflict: {0}")]
  Conflict(String),

  /// A draft scored below the compliance threshold.
  #[error("compliance gate: {0}")]
  BelowThreshold(String),

  /// Launch attempted without messaging credentials. The console redirects
  /// the operator to the settings page on this status.
  #[error("configuration missing: {0}")]
  ConfigurationMissing(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Wrap a backend error.
  pub fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(e))
  }
}

impl From<fanout_core::Error> for ApiError {
  fn from(e: fanout_core::Error) -> Self {
    use fanout_core::Error as E;
    match &e {
      E::Validation(_) => Self::BadRequest(e.to_string()),
      E::ContactNotFound(_) | E::CampaignNotFound(_) => {
        Self::NotFound(e.to_string())
      }
      E::BelowThreshold { .. } => Self::BelowThreshold(e.to_string()),
      E::ConfigurationMissing => Self::ConfigurationMissing(e.to_string()),
      E::InvalidTransition { .. } => Self::Conflict(e.to_string()),
      E::Serialization(_) => Self::Store(Box::new(e)),
    }
  }
}

impl From<fanout_csv::Error> for ApiError {
  fn from(e: fanout_csv::Error) -> Self { Self::BadRequest(e.to_string()) }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
      ApiError::BelowThreshold(m) => {
        (StatusCode::UNPROCESSABLE_ENTITY, m.clone())
      }
      ApiError::ConfigurationMissing(m) => {
        (StatusCode::PRECONDITION_FAILED, m.clone())
      }
      ApiError::Store(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
