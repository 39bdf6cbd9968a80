//! Error types for `fanout-core`.

use thiserror::Error;
use uuid::Uuid;

use crate::campaign::CampaignStatus;

#[derive(Debug, Error)]
pub enum Error {
  /// A required field was missing or empty. The operation was aborted with
  /// no mutation of the owning collection.
  #[error("validation failed: {0}")]
  Validation(String),

  #[error("contact not found: {0}")]
  ContactNotFound(Uuid),

  #[error("campaign not found: {0}")]
  CampaignNotFound(Uuid),

  #[error("compliance score {score} is below the sending threshold {threshold}")]
  BelowThreshold { score: u8, threshold: u8 },

  #[error("messaging credentials are not configured")]
  ConfigurationMissing,

  #[error("campaign {id} cannot move from {from:?} to {to:?}")]
  InvalidTransition {
    id:   Uuid,
    from: CampaignStatus,
    to:   CampaignStatus,
  },

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
