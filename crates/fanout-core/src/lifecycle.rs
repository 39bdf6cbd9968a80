//! The campaign board and its lifecycle state machine.
//!
//! Reachable transitions:
//!
//! ```text
//!   (compliance gate) ──create──▶ DRAFT ──begin_send──▶ SENDING
//!                                            SENDING ──complete_send──▶ COMPLETED
//!                                            SENDING ──fail_send──────▶ FAILED
//! ```
//!
//! No transition skips a state and terminal states are never re-entered.
//! Creation itself is gated: a draft below the compliance threshold is
//! rejected outright and never becomes a campaign.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  campaign::{Campaign, CampaignDraft, CampaignStatus},
  dispatch::DeliveryOutcome,
  gate::ComplianceResult,
};

/// The ordered campaign collection, newest first. Campaigns are never
/// deleted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CampaignBoard {
  campaigns: Vec<Campaign>,
}

impl CampaignBoard {
  pub fn new(campaigns: Vec<Campaign>) -> Self { Self { campaigns } }

  pub fn campaigns(&self) -> &[Campaign] { &self.campaigns }

  pub fn len(&self) -> usize { self.campaigns.len() }

  pub fn is_empty(&self) -> bool { self.campaigns.is_empty() }

  pub fn get(&self, id: Uuid) -> Option<&Campaign> {
    self.campaigns.iter().find(|c| c.id == id)
  }

  fn get_mut(&mut self, id: Uuid) -> Result<&mut Campaign> {
    self
      .campaigns
      .iter_mut()
      .find(|c| c.id == id)
      .ok_or(Error::CampaignNotFound(id))
  }

  /// Create a campaign from a gated draft.
  ///
  /// `contact_count` is snapshotted into `total_contacts` and never
  /// re-derived. Fails without mutation when name or message is empty or
  /// when the compliance score is below `threshold`.
  pub fn create(
    &mut self,
    draft: CampaignDraft,
    compliance: &ComplianceResult,
    contact_count: u64,
    threshold: u8,
    now: DateTime<Utc>,
  ) -> Result<Campaign> {
    let name = draft.name.trim().to_owned();
    if name.is_empty() {
      return Err(Error::Validation("campaign name is required".into()));
    }
    if draft.message_text.trim().is_empty() {
      return Err(Error::Validation("campaign message is required".into()));
    }
    if !compliance.passes(threshold) {
      return Err(Error::BelowThreshold {
        score: compliance.score,
        threshold,
      });
    }

    let campaign = Campaign {
      id: Uuid::new_v4(),
      name,
      message_text: draft.message_text,
      category: draft.category,
      status: CampaignStatus::Draft,
      sent_count: 0,
      open_count: 0,
      failed_count: 0,
      total_contacts: contact_count,
      created_at: now,
      compliance_score: Some(compliance.score),
      failure_reason: None,
    };
    self.campaigns.insert(0, campaign.clone());
    Ok(campaign)
  }

  /// `DRAFT → SENDING`. The caller checks the credentials collaborator
  /// before invoking this; an unconfigured launch never reaches the board.
  pub fn begin_send(&mut self, id: Uuid) -> Result<Campaign> {
    let campaign = self.get_mut(id)?;
    if campaign.status != CampaignStatus::Draft {
      return Err(Error::InvalidTransition {
        id,
        from: campaign.status,
        to: CampaignStatus::Sending,
      });
    }
    campaign.status = CampaignStatus::Sending;
    Ok(campaign.clone())
  }

  /// `SENDING → COMPLETED`. Writes the delivery counters exactly once.
  pub fn complete_send(
    &mut self,
    id: Uuid,
    outcome: &DeliveryOutcome,
  ) -> Result<Campaign> {
    let campaign = self.get_mut(id)?;
    if campaign.status != CampaignStatus::Sending {
      return Err(Error::InvalidTransition {
        id,
        from: campaign.status,
        to: CampaignStatus::Completed,
      });
    }
    campaign.status = CampaignStatus::Completed;
    campaign.sent_count = outcome.sent;
    campaign.open_count = outcome.opened;
    campaign.failed_count = outcome.failed();
    Ok(campaign.clone())
  }

  /// `SENDING → FAILED`, with the captured reason.
  pub fn fail_send(&mut self, id: Uuid, reason: String) -> Result<Campaign> {
    let campaign = self.get_mut(id)?;
    if campaign.status != CampaignStatus::Sending {
      return Err(Error::InvalidTransition {
        id,
        from: campaign.status,
        to: CampaignStatus::Failed,
      });
    }
    campaign.status = CampaignStatus::Failed;
    campaign.failure_reason = Some(reason);
    Ok(campaign.clone())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    campaign::TemplateCategory, dispatch::DispatchFailure,
    gate::DEFAULT_COMPLIANCE_THRESHOLD,
  };

  fn draft(name: &str) -> CampaignDraft {
    CampaignDraft {
      name:         name.into(),
      message_text: "Hello {{1}}, our summer offer is live.".into(),
      category:     TemplateCategory::Marketing,
    }
  }

  fn passing(score: u8) -> ComplianceResult {
    ComplianceResult {
      score,
      is_compliant: true,
      suggestions: vec![],
      warnings: vec![],
    }
  }

  fn create(board: &mut CampaignBoard, score: u8, count: u64) -> Campaign {
    board
      .create(
        draft("Summer"),
        &passing(score),
        count,
        DEFAULT_COMPLIANCE_THRESHOLD,
        Utc::now(),
      )
      .unwrap()
  }

  #[test]
  fn score_below_threshold_yields_no_campaign() {
    let mut board = CampaignBoard::default();
    let err = board
      .create(
        draft("Summer"),
        &passing(49),
        3,
        DEFAULT_COMPLIANCE_THRESHOLD,
        Utc::now(),
      )
      .unwrap_err();
    assert!(matches!(err, Error::BelowThreshold { score: 49, .. }));
    assert!(board.is_empty());
  }

  #[test]
  fn score_at_threshold_creates_a_draft() {
    let mut board = CampaignBoard::default();
    let campaign = create(&mut board, 50, 3);
    assert_eq!(campaign.status, CampaignStatus::Draft);
    assert_eq!(campaign.compliance_score, Some(50));
    assert_eq!(campaign.total_contacts, 3);
    assert_eq!(campaign.sent_count, 0);
  }

  #[test]
  fn blank_fields_are_rejected() {
    let mut board = CampaignBoard::default();
    let mut d = draft("  ");
    let err = board
      .create(d.clone(), &passing(90), 1, 50, Utc::now())
      .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));

    d.name = "Summer".into();
    d.message_text = "   ".into();
    let err = board.create(d, &passing(90), 1, 50, Utc::now()).unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert!(board.is_empty());
  }

  #[test]
  fn newest_campaign_is_first() {
    let mut board = CampaignBoard::default();
    create(&mut board, 70, 1);
    let second = create(&mut board, 80, 1);
    assert_eq!(board.campaigns()[0].id, second.id);
  }

  #[test]
  fn total_contacts_is_a_snapshot() {
    let mut board = CampaignBoard::default();
    let campaign = create(&mut board, 70, 3);
    // The audience growing afterwards changes nothing for this campaign.
    create(&mut board, 70, 5);
    assert_eq!(board.get(campaign.id).unwrap().total_contacts, 3);
  }

  #[test]
  fn full_send_cycle() {
    let mut board = CampaignBoard::default();
    let campaign = create(&mut board, 70, 10);

    let sending = board.begin_send(campaign.id).unwrap();
    assert_eq!(sending.status, CampaignStatus::Sending);

    let outcome = DeliveryOutcome {
      sent:     10,
      opened:   7,
      failures: vec![],
    };
    let done = board.complete_send(campaign.id, &outcome).unwrap();
    assert_eq!(done.status, CampaignStatus::Completed);
    assert_eq!(done.sent_count, 10);
    assert_eq!(done.open_count, 7);
    assert_eq!(done.failed_count, 0);
  }

  #[test]
  fn launch_is_rejected_outside_draft() {
    let mut board = CampaignBoard::default();
    let campaign = create(&mut board, 70, 2);
    board.begin_send(campaign.id).unwrap();

    let err = board.begin_send(campaign.id).unwrap_err();
    assert!(matches!(err, Error::InvalidTransition {
      from: CampaignStatus::Sending,
      ..
    }));
  }

  #[test]
  fn terminal_states_cannot_be_reentered() {
    let mut board = CampaignBoard::default();
    let campaign = create(&mut board, 70, 2);
    board.begin_send(campaign.id).unwrap();
    board
      .complete_send(campaign.id, &DeliveryOutcome::default())
      .unwrap();

    assert!(board.begin_send(campaign.id).is_err());
    assert!(
      board
        .complete_send(campaign.id, &DeliveryOutcome::default())
        .is_err()
    );
    assert!(board.fail_send(campaign.id, "late".into()).is_err());
  }

  #[test]
  fn hard_dispatch_failure_captures_the_reason() {
    let mut board = CampaignBoard::default();
    let campaign = create(&mut board, 70, 2);
    board.begin_send(campaign.id).unwrap();

    let failed = board
      .fail_send(campaign.id, "provider rejected every recipient".into())
      .unwrap();
    assert_eq!(failed.status, CampaignStatus::Failed);
    assert_eq!(
      failed.failure_reason.as_deref(),
      Some("provider rejected every recipient")
    );
  }

  #[test]
  fn partial_failures_land_in_failed_count() {
    let mut board = CampaignBoard::default();
    let campaign = create(&mut board, 70, 3);
    board.begin_send(campaign.id).unwrap();

    let outcome = DeliveryOutcome {
      sent:     2,
      opened:   1,
      failures: vec![DispatchFailure {
        recipient: "+39333".into(),
        detail:    "131026 unreachable".into(),
      }],
    };
    let done = board.complete_send(campaign.id, &outcome).unwrap();
    assert_eq!(done.sent_count, 2);
    assert_eq!(done.failed_count, 1);
  }

  #[test]
  fn unknown_campaign_is_reported() {
    let mut board = CampaignBoard::default();
    assert!(matches!(
      board.begin_send(Uuid::new_v4()),
      Err(Error::CampaignNotFound(_))
    ));
  }
}
