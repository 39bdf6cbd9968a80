//! Handlers for `/campaigns` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/campaigns` | Newest first |
//! | `POST` | `/campaigns` | Draft + its compliance-check result |
//! | `GET`  | `/campaigns/:id` | 404 if not found |
//! | `POST` | `/campaigns/:id/launch` | 412 when credentials missing |
//!
//! A launch responds as soon as the campaign is observably `SENDING`; the
//! dispatch itself runs as a background task that later records the
//! completion (or failure) transition.

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::Utc;
use fanout_core::{
  Error as CoreError,
  campaign::{Campaign, CampaignDraft},
  dispatch::{DeliveryOutcome, Dispatcher, SendJob},
  gate::{ComplianceResult, PolicyScorer},
  store::SessionStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

// ─── List / get ──────────────────────────────────────────────────────────────

/// `GET /campaigns`
pub async fn list<S, P, D>(
  State(state): State<AppState<S, P, D>>,
) -> Json<Vec<Campaign>>
where
  S: SessionStore + 'static,
  P: PolicyScorer + 'static,
  D: Dispatcher + 'static,
{
  let session = state.session.lock().await;
  Json(session.campaigns.campaigns().to_vec())
}

/// `GET /campaigns/:id`
pub async fn get_one<S, P, D>(
  State(state): State<AppState<S, P, D>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Campaign>, ApiError>
where
  S: SessionStore + 'static,
  P: PolicyScorer + 'static,
  D: Dispatcher + 'static,
{
  let session = state.session.lock().await;
  let campaign = session
    .campaigns
    .get(id)
    .cloned()
    .ok_or_else(|| ApiError::NotFound(format!("campaign {id} not found")))?;
  Ok(Json(campaign))
}

// ─── Create ──────────────────────────────────────────────────────────────────

/// `POST /campaigns` request body: the draft plus the result of the
/// compliance check the console ran on it. The gate re-applies the
/// threshold; a below-threshold draft never becomes a campaign.
#[derive(Debug, Deserialize)]
pub struct CreateBody {
  #[serde(flatten)]
  pub draft:      CampaignDraft,
  pub compliance: ComplianceResult,
}

/// `POST /campaigns`
pub async fn create<S, P, D>(
  State(state): State<AppState<S, P, D>>,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: SessionStore + 'static,
  P: PolicyScorer + 'static,
  D: Dispatcher + 'static,
{
  let mut session = state.session.lock().await;
  // Audience size snapshot: taken now, never re-derived.
  let contact_count = session.contacts.len() as u64;
  let campaign = session.campaigns.create(
    body.draft,
    &body.compliance,
    contact_count,
    state.settings.compliance_threshold,
    Utc::now(),
  )?;
  state
    .store
    .save_campaigns(&session.campaigns)
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(campaign)))
}

// ─── Launch ──────────────────────────────────────────────────────────────────

/// `POST /campaigns/:id/launch`
///
/// Fails with `412` when the provider credentials are missing, leaving the
/// campaign in `DRAFT`. Otherwise moves it to `SENDING`, responds, and lets
/// the spawned dispatch drive the terminal transition.
pub async fn launch<S, P, D>(
  State(state): State<AppState<S, P, D>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Campaign>, ApiError>
where
  S: SessionStore + 'static,
  P: PolicyScorer + 'static,
  D: Dispatcher + 'static,
{
  let mut session = state.session.lock().await;

  let credentials = session
    .api_config
    .credentials()
    .ok_or(CoreError::ConfigurationMissing)
    .map_err(ApiError::from)?;

  // Stage the transition on a copy and commit it only after the snapshot
  // persists; a failed save leaves the campaign a relaunchable draft
  // instead of stranding it in `SENDING` with no task to finish it.
  let mut staged = session.campaigns.clone();
  let sending = staged.begin_send(id)?;
  state
    .store
    .save_campaigns(&staged)
    .await
    .map_err(ApiError::store)?;
  session.campaigns = staged;

  let job = SendJob {
    message_text:   sending.message_text.clone(),
    // Live list for real delivery; the simulated arm reports the
    // creation-time snapshot instead.
    recipients:     session.contacts.phones(),
    total_contacts: sending.total_contacts,
  };
  drop(session);

  let state = state.clone();
  tokio::spawn(async move {
    let outcome = state.dispatcher.dispatch(&credentials, &job).await;
    finish_send(&state, id, outcome).await;
  });

  Ok(Json(sending))
}

/// Fold the dispatch result into the terminal transition and persist it.
async fn finish_send<S, P, D, E>(
  state: &AppState<S, P, D>,
  id: Uuid,
  outcome: Result<DeliveryOutcome, E>,
) where
  S: SessionStore + 'static,
  P: PolicyScorer + 'static,
  D: Dispatcher + 'static,
  E: std::error::Error,
{
  let mut session = state.session.lock().await;

  let transition = match outcome {
    Ok(outcome) if outcome.is_total_failure() => {
      let reason = outcome
        .failures
        .first()
        .map(|f| f.detail.clone())
        .unwrap_or_else(|| "every recipient failed".to_owned());
      session.campaigns.fail_send(id, reason)
    }
    Ok(outcome) => session.campaigns.complete_send(id, &outcome),
    Err(e) => session.campaigns.fail_send(id, e.to_string()),
  };

  match transition {
    Ok(campaign) => {
      tracing::info!(
        campaign = %campaign.id,
        status = ?campaign.status,
        sent = campaign.sent_count,
        "campaign send finished"
      );
    }
    Err(e) => {
      tracing::error!(campaign = %id, error = %e, "send transition failed");
      return;
    }
  }

  if let Err(e) = state.store.save_campaigns(&session.campaigns).await {
    tracing::error!(campaign = %id, error = %e, "failed to persist campaigns");
  }
}
