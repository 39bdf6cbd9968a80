//! Encoding and decoding helpers between Rust domain types and the
//! plain-text representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, tags as compact JSON arrays,
//! UUIDs as hyphenated lowercase strings. Enum columns use the same
//! SCREAMING_SNAKE_CASE values that cross the API wire.

use chrono::{DateTime, Utc};
use fanout_core::{
  campaign::{Campaign, CampaignStatus, TemplateCategory},
  contact::Contact,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── CampaignStatus ──────────────────────────────────────────────────────────

pub fn encode_status(s: CampaignStatus) -> &'static str {
  match s {
    CampaignStatus::Draft => "DRAFT",
    CampaignStatus::PendingApproval => "PENDING_APPROVAL",
    CampaignStatus::Scheduled => "SCHEDULED",
    CampaignStatus::Sending => "SENDING",
    CampaignStatus::Completed => "COMPLETED",
    CampaignStatus::Failed => "FAILED",
  }
}

pub fn decode_status(s: &str) -> Result<CampaignStatus> {
  match s {
    "DRAFT" => Ok(CampaignStatus::Draft),
    "PENDING_APPROVAL" => Ok(CampaignStatus::PendingApproval),
    "SCHEDULED" => Ok(CampaignStatus::Scheduled),
    "SENDING" => Ok(CampaignStatus::Sending),
    "COMPLETED" => Ok(CampaignStatus::Completed),
    "FAILED" => Ok(CampaignStatus::Failed),
    other => Err(Error::UnknownStatus(other.to_owned())),
  }
}

// ─── TemplateCategory ────────────────────────────────────────────────────────

pub fn encode_category(c: TemplateCategory) -> &'static str { c.as_str() }

pub fn decode_category(s: &str) -> Result<TemplateCategory> {
  match s {
    "MARKETING" => Ok(TemplateCategory::Marketing),
    "UTILITY" => Ok(TemplateCategory::Utility),
    "AUTHENTICATION" => Ok(TemplateCategory::Authentication),
    other => Err(Error::UnknownCategory(other.to_owned())),
  }
}

// ─── Tags ────────────────────────────────────────────────────────────────────

pub fn encode_tags(tags: &[String]) -> Result<String> {
  Ok(serde_json::to_string(tags)?)
}

pub fn decode_tags(s: &str) -> Result<Vec<String>> {
  Ok(serde_json::from_str(s)?)
}

// ─── Raw rows ────────────────────────────────────────────────────────────────

/// A contact row as read from SQLite, before decoding. Decoding happens
/// outside the connection closure so rusqlite never has to carry our error
/// type.
pub struct RawContact {
  pub id:          String,
  pub name:        String,
  pub phone:       String,
  pub email:       Option<String>,
  pub opt_in_date: String,
  pub tags:        String,
}

impl RawContact {
  pub fn decode(self) -> Result<Contact> {
    Ok(Contact {
      id:          decode_uuid(&self.id)?,
      name:        self.name,
      phone:       self.phone,
      email:       self.email,
      opt_in_date: decode_dt(&self.opt_in_date)?,
      tags:        decode_tags(&self.tags)?,
    })
  }
}

/// A campaign row as read from SQLite, before decoding.
pub struct RawCampaign {
  pub id:               String,
  pub name:             String,
  pub message_text:     String,
  pub category:         String,
  pub status:           String,
  pub sent_count:       u64,
  pub open_count:       u64,
  pub failed_count:     u64,
  pub total_contacts:   u64,
  pub created_at:       String,
  pub compliance_score: Option<u8>,
  pub failure_reason:   Option<String>,
}

impl RawCampaign {
  pub fn decode(self) -> Result<Campaign> {
    Ok(Campaign {
      id:               decode_uuid(&self.id)?,
      name:             self.name,
      message_text:     self.message_text,
      category:         decode_category(&self.category)?,
      status:           decode_status(&self.status)?,
      sent_count:       self.sent_count,
      open_count:       self.open_count,
      failed_count:     self.failed_count,
      total_contacts:   self.total_contacts,
      created_at:       decode_dt(&self.created_at)?,
      compliance_score: self.compliance_score,
      failure_reason:   self.failure_reason,
    })
  }
}
