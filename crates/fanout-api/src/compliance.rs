//! Handlers for `/compliance` endpoints.
//!
//! These never surface scorer failures: a broken classifier degrades to the
//! fail-closed result (check) or to the unmodified draft (optimize).

use axum::{Json, extract::State};
use fanout_core::{
  campaign::TemplateCategory,
  dispatch::Dispatcher,
  gate::{self, ComplianceResult, PolicyScorer},
  store::SessionStore,
};
use serde::{Deserialize, Serialize};

use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CheckBody {
  pub text:     String,
  pub category: TemplateCategory,
}

/// `POST /compliance/check` — body: `{"text": …, "category": "MARKETING"}`
pub async fn check<S, P, D>(
  State(state): State<AppState<S, P, D>>,
  Json(body): Json<CheckBody>,
) -> Json<ComplianceResult>
where
  S: SessionStore + 'static,
  P: PolicyScorer + 'static,
  D: Dispatcher + 'static,
{
  let result = gate::evaluate(&*state.scorer, &body.text, body.category).await;
  Json(result)
}

#[derive(Debug, Deserialize)]
pub struct OptimizeBody {
  pub draft:    String,
  pub category: TemplateCategory,
}

#[derive(Debug, Serialize)]
pub struct OptimizeResponse {
  pub text: String,
}

/// `POST /compliance/optimize` — rewrite a draft into a more compliant
/// template. Falls back to echoing the draft when the scorer is down.
pub async fn optimize<S, P, D>(
  State(state): State<AppState<S, P, D>>,
  Json(body): Json<OptimizeBody>,
) -> Json<OptimizeResponse>
where
  S: SessionStore + 'static,
  P: PolicyScorer + 'static,
  D: Dispatcher + 'static,
{
  let text = state
    .scorer
    .optimize(&body.draft, body.category)
    .await
    .unwrap_or_else(|_| body.draft.clone());
  Json(OptimizeResponse { text })
}
