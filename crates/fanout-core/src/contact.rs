//! Contact — one opted-in recipient in the audience database.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A stored contact. The `phone` field is always in canonical form (see
/// [`crate::phone::normalize`]) and acts as the natural dedup key: the
/// reconciler keeps at most one contact per canonical phone.
///
/// Field names serialise in camelCase because the browser console consumes
/// them directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
  /// Assigned at creation, never reused, preserved across overwrites.
  pub id:          Uuid,
  pub name:        String,
  /// Canonical phone identifier.
  pub phone:       String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub email:       Option<String>,
  /// Last-touched timestamp: refreshed on every overwrite or re-import.
  pub opt_in_date: DateTime<Utc>,
  /// Free-form labels; order preserved for display.
  #[serde(default)]
  pub tags:        Vec<String>,
}

/// Caller-supplied fields for a manual contact entry. `phone` is raw (not
/// yet normalised) and `tags` is the raw comma-separated string typed by the
/// operator.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactInput {
  pub name:  String,
  pub phone: String,
  #[serde(default)]
  pub email: Option<String>,
  #[serde(default)]
  pub tags:  String,
}

/// Split a comma-separated tag string, trimming whitespace and dropping
/// empty entries. Order is preserved.
pub fn split_tags(raw: &str) -> Vec<String> {
  raw
    .split(',')
    .map(str::trim)
    .filter(|t| !t.is_empty())
    .map(str::to_owned)
    .collect()
}
