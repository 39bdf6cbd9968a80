//! Handlers for `/contacts` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/contacts` | Full audience, newest first |
//! | `POST`   | `/contacts` | 201 on insert, 409 + existing record on duplicate |
//! | `PUT`    | `/contacts/:id` | Confirmed duplicate overwrite |
//! | `DELETE` | `/contacts/:id` | 404 if not found |
//! | `POST`   | `/contacts/import` | Raw CSV body, returns `{added, updated}` |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::Utc;
use fanout_core::{
  book::AddOutcome,
  contact::{Contact, ContactInput},
  dispatch::Dispatcher,
  gate::PolicyScorer,
  store::SessionStore,
};
use fanout_csv::ImportReport;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

// ─── List ────────────────────────────────────────────────────────────────────

/// `GET /contacts`
pub async fn list<S, P, D>(
  State(state): State<AppState<S, P, D>>,
) -> Json<Vec<Contact>>
where
  S: SessionStore + 'static,
  P: PolicyScorer + 'static,
  D: Dispatcher + 'static,
{
  let session = state.session.lock().await;
  Json(session.contacts.contacts().to_vec())
}

// ─── Create ──────────────────────────────────────────────────────────────────

/// `POST /contacts` — body: [`ContactInput`].
///
/// A duplicate phone is not an error: the response is `409 Conflict`
/// carrying the conflicting record, and the console asks the operator to
/// confirm before retrying as a `PUT` on that record's id.
pub async fn create<S, P, D>(
  State(state): State<AppState<S, P, D>>,
  Json(input): Json<ContactInput>,
) -> Result<impl IntoResponse, ApiError>
where
  S: SessionStore + 'static,
  P: PolicyScorer + 'static,
  D: Dispatcher + 'static,
{
  let mut session = state.session.lock().await;
  let outcome = session.contacts.add_manual(
    input,
    &state.settings.default_country_prefix,
    Utc::now(),
  )?;

  let status = match &outcome {
    AddOutcome::Added(_) => {
      state
        .store
        .save_contacts(&session.contacts)
        .await
        .map_err(ApiError::store)?;
      StatusCode::CREATED
    }
    AddOutcome::DuplicateRequiresConfirmation(_) => StatusCode::CONFLICT,
  };
  Ok((status, Json(outcome)))
}

// ─── Overwrite ───────────────────────────────────────────────────────────────

/// `PUT /contacts/:id` — the confirmed resolution of a duplicate.
pub async fn overwrite<S, P, D>(
  State(state): State<AppState<S, P, D>>,
  Path(id): Path<Uuid>,
  Json(input): Json<ContactInput>,
) -> Result<Json<Contact>, ApiError>
where
  S: SessionStore + 'static,
  P: PolicyScorer + 'static,
  D: Dispatcher + 'static,
{
  let mut session = state.session.lock().await;
  let contact = session.contacts.overwrite(
    id,
    input,
    &state.settings.default_country_prefix,
    Utc::now(),
  )?;
  state
    .store
    .save_contacts(&session.contacts)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(contact))
}

// ─── Delete ──────────────────────────────────────────────────────────────────

/// `DELETE /contacts/:id`
pub async fn remove<S, P, D>(
  State(state): State<AppState<S, P, D>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: SessionStore + 'static,
  P: PolicyScorer + 'static,
  D: Dispatcher + 'static,
{
  let mut session = state.session.lock().await;
  if !session.contacts.remove(id) {
    return Err(ApiError::NotFound(format!("contact {id} not found")));
  }
  state
    .store
    .save_contacts(&session.contacts)
    .await
    .map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── CSV import ──────────────────────────────────────────────────────────────

/// `POST /contacts/import` — body: raw CSV text.
///
/// The merged book is persisted in one snapshot after the whole file has
/// been applied; a crash mid-import leaves the previous snapshot intact.
pub async fn import<S, P, D>(
  State(state): State<AppState<S, P, D>>,
  body: String,
) -> Result<Json<ImportReport>, ApiError>
where
  S: SessionStore + 'static,
  P: PolicyScorer + 'static,
  D: Dispatcher + 'static,
{
  let mut session = state.session.lock().await;
  let report = fanout_csv::import_csv(
    &body,
    &mut session.contacts,
    &state.settings.default_country_prefix,
    Utc::now(),
  )?;
  state
    .store
    .save_contacts(&session.contacts)
    .await
    .map_err(ApiError::store)?;

  tracing::info!(added = report.added, updated = report.updated, "CSV import");
  Ok(Json(report))
}
