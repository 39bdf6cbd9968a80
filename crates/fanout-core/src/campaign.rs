//! Campaign — one bulk send and its delivery counters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle state of a campaign.
///
/// Only `Draft`, `Sending`, `Completed` and `Failed` are reachable today;
/// `PendingApproval` and `Scheduled` are reserved for a future review queue
/// and scheduler and are kept so persisted data stays forward-compatible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CampaignStatus {
  Draft,
  PendingApproval,
  Scheduled,
  Sending,
  Completed,
  Failed,
}

impl CampaignStatus {
  /// Terminal states are never re-entered or mutated further.
  pub fn is_terminal(&self) -> bool {
    matches!(self, Self::Completed | Self::Failed)
  }
}

/// Message category under the provider's template policy. Affects only the
/// policy-check prompt, never the gating logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TemplateCategory {
  Marketing,
  Utility,
  Authentication,
}

impl TemplateCategory {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Marketing => "MARKETING",
      Self::Utility => "UTILITY",
      Self::Authentication => "AUTHENTICATION",
    }
  }
}

/// A campaign record. Immutable after creation except for `status` and the
/// delivery counters, which are written exactly once by the send-completion
/// (or failure) transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
  pub id:               Uuid,
  pub name:             String,
  pub message_text:     String,
  pub category:         TemplateCategory,
  pub status:           CampaignStatus,
  pub sent_count:       u64,
  pub open_count:       u64,
  #[serde(default)]
  pub failed_count:     u64,
  /// Snapshot of the contact-book size at creation time. Never re-derived:
  /// later audience changes do not affect an existing campaign.
  pub total_contacts:   u64,
  pub created_at:       DateTime<Utc>,
  /// Set once from the compliance gate result at creation.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub compliance_score: Option<u8>,
  /// Captured reason for a `Failed` campaign.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub failure_reason:   Option<String>,
}

/// Operator-supplied fields for a new campaign.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignDraft {
  pub name:         String,
  pub message_text: String,
  pub category:     TemplateCategory,
}
