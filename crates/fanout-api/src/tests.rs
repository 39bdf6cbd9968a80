//! Router-level tests with an in-memory store and stub collaborators.

use std::{
  sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
  },
  time::Duration,
};

use axum::{
  Router,
  body::Body,
  http::{Request, StatusCode, header},
};
use fanout_core::{
  book::ContactBook,
  campaign::TemplateCategory,
  config::ApiConfig,
  dispatch::{DeliveryOutcome, DispatchCredentials, Dispatcher, SendJob},
  gate::{ComplianceResult, PolicyScorer},
  lifecycle::CampaignBoard,
  store::SessionStore,
};
use fanout_store_sqlite::SqliteSessionStore;
use http_body_util::BodyExt as _;
use serde_json::{Value, json};
use tower::ServiceExt as _;

use crate::{ApiSettings, AppState, api_router};

// ─── Stub collaborators ──────────────────────────────────────────────────────

/// Scores every message with a fixed value, or errors when `down`.
struct StubScorer {
  score: u8,
  down:  bool,
}

impl PolicyScorer for StubScorer {
  type Error = std::io::Error;

  async fn score(
    &self,
    _text: &str,
    _category: TemplateCategory,
  ) -> Result<ComplianceResult, Self::Error> {
    if self.down {
      return Err(std::io::Error::other("classifier unreachable"));
    }
    Ok(ComplianceResult {
      score:        self.score,
      is_compliant: self.score >= 50,
      suggestions:  vec![],
      warnings:     vec![],
    })
  }

  async fn optimize(
    &self,
    draft: &str,
    _category: TemplateCategory,
  ) -> Result<String, Self::Error> {
    if self.down {
      return Err(std::io::Error::other("classifier unreachable"));
    }
    Ok(format!("{draft} (optimized)"))
  }
}

/// Simulated delivery: reports the audience snapshot as sent, opens ~70%.
struct StubDispatcher;

impl Dispatcher for StubDispatcher {
  type Error = std::io::Error;

  async fn dispatch(
    &self,
    _credentials: &DispatchCredentials,
    job: &SendJob,
  ) -> Result<DeliveryOutcome, Self::Error> {
    let sent = job.total_contacts;
    Ok(DeliveryOutcome {
      sent,
      opened: sent * 7 / 10,
      failures: vec![],
    })
  }
}

/// Delegates to an in-memory store, but errors the next `save_campaigns`
/// when the flag is armed.
struct FlakyStore {
  inner:     SqliteSessionStore,
  fail_next: Arc<AtomicBool>,
}

impl SessionStore for FlakyStore {
  type Error = std::io::Error;

  async fn load_contacts(&self) -> Result<ContactBook, Self::Error> {
    self.inner.load_contacts().await.map_err(std::io::Error::other)
  }

  async fn save_contacts(&self, book: &ContactBook) -> Result<(), Self::Error> {
    self
      .inner
      .save_contacts(book)
      .await
      .map_err(std::io::Error::other)
  }

  async fn load_campaigns(&self) -> Result<CampaignBoard, Self::Error> {
    self
      .inner
      .load_campaigns()
      .await
      .map_err(std::io::Error::other)
  }

  async fn save_campaigns(
    &self,
    board: &CampaignBoard,
  ) -> Result<(), Self::Error> {
    if self.fail_next.swap(false, Ordering::SeqCst) {
      return Err(std::io::Error::other("disk full"));
    }
    self
      .inner
      .save_campaigns(board)
      .await
      .map_err(std::io::Error::other)
  }

  async fn load_api_config(&self) -> Result<ApiConfig, Self::Error> {
    self
      .inner
      .load_api_config()
      .await
      .map_err(std::io::Error::other)
  }

  async fn save_api_config(
    &self,
    config: &ApiConfig,
  ) -> Result<(), Self::Error> {
    self
      .inner
      .save_api_config(config)
      .await
      .map_err(std::io::Error::other)
  }
}

// ─── Harness ─────────────────────────────────────────────────────────────────

async fn app_with(scorer: StubScorer) -> Router {
  let store = SqliteSessionStore::open_in_memory().await.unwrap();
  let state = AppState::load(
    store,
    scorer,
    StubDispatcher,
    ApiSettings::default(),
  )
  .await
  .unwrap();
  api_router(state)
}

async fn app() -> Router {
  app_with(StubScorer {
    score: 75,
    down:  false,
  })
  .await
}

async fn request(
  app: &Router,
  method: &str,
  path: &str,
  body: Option<Value>,
) -> (StatusCode, Value) {
  let builder = Request::builder().method(method).uri(path);
  let req = match body {
    Some(v) => builder
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from(v.to_string())),
    None => builder.body(Body::empty()),
  }
  .unwrap();

  let resp = app.clone().oneshot(req).await.unwrap();
  let status = resp.status();
  let bytes = resp.into_body().collect().await.unwrap().to_bytes();
  let value = if bytes.is_empty() {
    Value::Null
  } else {
    serde_json::from_slice(&bytes).unwrap()
  };
  (status, value)
}

async fn post_csv(app: &Router, csv: &str) -> (StatusCode, Value) {
  let req = Request::builder()
    .method("POST")
    .uri("/contacts/import")
    .header(header::CONTENT_TYPE, "text/csv")
    .body(Body::from(csv.to_owned()))
    .unwrap();
  let resp = app.clone().oneshot(req).await.unwrap();
  let status = resp.status();
  let bytes = resp.into_body().collect().await.unwrap().to_bytes();
  (status, serde_json::from_slice(&bytes).unwrap())
}

fn contact(name: &str, phone: &str) -> Value {
  json!({ "name": name, "phone": phone, "tags": "" })
}

fn campaign_body(name: &str, score: u8) -> Value {
  json!({
    "name": name,
    "messageText": "Hello {{1}}!",
    "category": "MARKETING",
    "compliance": {
      "score": score,
      "isCompliant": score >= 50,
      "suggestions": [],
      "warnings": [],
    },
  })
}

/// Configure provider credentials so launches pass the gate.
async fn configure(app: &Router) {
  let (status, _) = request(
    app,
    "PUT",
    "/settings/api",
    Some(json!({
      "accessToken": "EAAB",
      "phoneNumberId": "102938",
      "wabaId": "556677",
    })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
}

/// Poll until the campaign reaches a terminal state.
async fn wait_terminal(app: &Router, id: &str) -> Value {
  for _ in 0..100 {
    let (_, campaign) = request(app, "GET", &format!("/campaigns/{id}"), None).await;
    let status = campaign["status"].as_str().unwrap().to_owned();
    if status != "SENDING" {
      return campaign;
    }
    tokio::time::sleep(Duration::from_millis(10)).await;
  }
  panic!("campaign {id} never left SENDING");
}

// ─── Contacts ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_list_contacts() {
  let app = app().await;

  let (status, body) =
    request(&app, "POST", "/contacts", Some(contact("Mario", "333 111"))).await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(body["outcome"], "added");

  let (status, list) = request(&app, "GET", "/contacts", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(list.as_array().unwrap().len(), 1);
  assert_eq!(list[0]["phone"], "+39333111");
}

#[tokio::test]
async fn duplicate_contact_returns_conflict_with_existing_record() {
  let app = app().await;
  request(&app, "POST", "/contacts", Some(contact("Mario", "333111"))).await;

  let (status, body) =
    request(&app, "POST", "/contacts", Some(contact("Mario Bis", "333-111")))
      .await;
  assert_eq!(status, StatusCode::CONFLICT);
  assert_eq!(body["outcome"], "duplicate_requires_confirmation");
  assert_eq!(body["name"], "Mario");

  // Declining is just not following up; the book is unchanged.
  let (_, list) = request(&app, "GET", "/contacts", None).await;
  assert_eq!(list.as_array().unwrap().len(), 1);
  assert_eq!(list[0]["name"], "Mario");
}

#[tokio::test]
async fn confirming_a_duplicate_overwrites_in_place() {
  let app = app().await;
  let (_, body) =
    request(&app, "POST", "/contacts", Some(contact("Mario", "333111"))).await;
  let id = body["id"].as_str().unwrap().to_owned();

  let (status, updated) = request(
    &app,
    "PUT",
    &format!("/contacts/{id}"),
    Some(json!({ "name": "Mario Rossi", "phone": "333111", "tags": "vip" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(updated["id"].as_str().unwrap(), id);
  assert_eq!(updated["name"], "Mario Rossi");
}

#[tokio::test]
async fn invalid_contact_is_a_bad_request() {
  let app = app().await;
  let (status, body) =
    request(&app, "POST", "/contacts", Some(contact(" ", "333"))).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].as_str().unwrap().contains("name"));
}

#[tokio::test]
async fn delete_contact() {
  let app = app().await;
  let (_, body) =
    request(&app, "POST", "/contacts", Some(contact("Mario", "333111"))).await;
  let id = body["id"].as_str().unwrap().to_owned();

  let (status, _) =
    request(&app, "DELETE", &format!("/contacts/{id}"), None).await;
  assert_eq!(status, StatusCode::NO_CONTENT);

  let (status, _) =
    request(&app, "DELETE", &format!("/contacts/{id}"), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn csv_import_reports_added_then_updated() {
  let app = app().await;
  let csv = "name,phone\nMario,333111\nAnna,333222";

  let (status, report) = post_csv(&app, csv).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(report, json!({ "added": 2, "updated": 0 }));

  let (_, report) = post_csv(&app, csv).await;
  assert_eq!(report, json!({ "added": 0, "updated": 2 }));
}

#[tokio::test]
async fn empty_csv_is_a_bad_request() {
  let app = app().await;
  let (status, _) = post_csv(&app, "  \n ").await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ─── Compliance ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn compliance_check_returns_the_scorer_verdict() {
  let app = app().await;
  let (status, body) = request(
    &app,
    "POST",
    "/compliance/check",
    Some(json!({ "text": "Hi!", "category": "UTILITY" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["score"], 75);
  assert_eq!(body["isCompliant"], true);
}

#[tokio::test]
async fn broken_scorer_degrades_to_fail_closed() {
  let app = app_with(StubScorer {
    score: 0,
    down:  true,
  })
  .await;
  let (status, body) = request(
    &app,
    "POST",
    "/compliance/check",
    Some(json!({ "text": "Hi!", "category": "MARKETING" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["score"], 0);
  assert_eq!(body["isCompliant"], false);
  assert_eq!(body["suggestions"][0], "error");
}

#[tokio::test]
async fn optimize_falls_back_to_the_draft() {
  let app = app_with(StubScorer {
    score: 0,
    down:  true,
  })
  .await;
  let (status, body) = request(
    &app,
    "POST",
    "/compliance/optimize",
    Some(json!({ "draft": "BUY NOW!!!", "category": "MARKETING" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["text"], "BUY NOW!!!");
}

// ─── Campaigns ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn below_threshold_draft_is_rejected() {
  let app = app().await;
  let (status, body) =
    request(&app, "POST", "/campaigns", Some(campaign_body("Summer", 49)))
      .await;
  assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
  assert!(body["error"].as_str().unwrap().contains("threshold"));

  let (_, list) = request(&app, "GET", "/campaigns", None).await;
  assert!(list.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn threshold_score_creates_a_draft_with_snapshot() {
  let app = app().await;
  for i in 0..3 {
    request(
      &app,
      "POST",
      "/contacts",
      Some(contact(&format!("C{i}"), &format!("33300{i}"))),
    )
    .await;
  }

  let (status, campaign) =
    request(&app, "POST", "/campaigns", Some(campaign_body("Summer", 50)))
      .await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(campaign["status"], "DRAFT");
  assert_eq!(campaign["complianceScore"], 50);
  assert_eq!(campaign["totalContacts"], 3);

  // Growing the audience later must not touch the snapshot.
  request(&app, "POST", "/contacts", Some(contact("C9", "333999"))).await;
  let id = campaign["id"].as_str().unwrap();
  let (_, reloaded) =
    request(&app, "GET", &format!("/campaigns/{id}"), None).await;
  assert_eq!(reloaded["totalContacts"], 3);
}

#[tokio::test]
async fn launch_without_credentials_is_rejected() {
  let app = app().await;
  let (_, campaign) =
    request(&app, "POST", "/campaigns", Some(campaign_body("Summer", 80)))
      .await;
  let id = campaign["id"].as_str().unwrap();

  let (status, _) =
    request(&app, "POST", &format!("/campaigns/{id}/launch"), None).await;
  assert_eq!(status, StatusCode::PRECONDITION_FAILED);

  // Still a draft.
  let (_, reloaded) =
    request(&app, "GET", &format!("/campaigns/{id}"), None).await;
  assert_eq!(reloaded["status"], "DRAFT");
}

#[tokio::test]
async fn launch_runs_to_completion() {
  let app = app().await;
  configure(&app).await;
  for i in 0..4 {
    request(
      &app,
      "POST",
      "/contacts",
      Some(contact(&format!("C{i}"), &format!("33300{i}"))),
    )
    .await;
  }

  let (_, campaign) =
    request(&app, "POST", "/campaigns", Some(campaign_body("Summer", 80)))
      .await;
  let id = campaign["id"].as_str().unwrap().to_owned();

  let (status, sending) =
    request(&app, "POST", &format!("/campaigns/{id}/launch"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(sending["status"], "SENDING");

  let done = wait_terminal(&app, &id).await;
  assert_eq!(done["status"], "COMPLETED");
  assert_eq!(done["sentCount"], 4);
  assert_eq!(done["openCount"], 2); // 4 * 7 / 10
}

#[tokio::test]
async fn sent_count_sticks_to_the_creation_snapshot() {
  let app = app().await;
  configure(&app).await;
  for i in 0..3 {
    request(
      &app,
      "POST",
      "/contacts",
      Some(contact(&format!("C{i}"), &format!("33300{i}"))),
    )
    .await;
  }

  let (_, campaign) =
    request(&app, "POST", "/campaigns", Some(campaign_body("Summer", 80)))
      .await;
  let id = campaign["id"].as_str().unwrap().to_owned();

  // The audience grows between creation and launch.
  request(&app, "POST", "/contacts", Some(contact("C8", "333888"))).await;
  request(&app, "POST", "/contacts", Some(contact("C9", "333999"))).await;

  request(&app, "POST", &format!("/campaigns/{id}/launch"), None).await;
  let done = wait_terminal(&app, &id).await;
  assert_eq!(done["status"], "COMPLETED");
  assert_eq!(done["sentCount"], 3);
  assert_eq!(done["totalContacts"], 3);
}

#[tokio::test]
async fn failed_persist_during_launch_leaves_a_relaunchable_draft() {
  let fail_next = Arc::new(AtomicBool::new(false));
  let store = FlakyStore {
    inner:     SqliteSessionStore::open_in_memory().await.unwrap(),
    fail_next: fail_next.clone(),
  };
  let state = AppState::load(
    store,
    StubScorer {
      score: 75,
      down:  false,
    },
    StubDispatcher,
    ApiSettings::default(),
  )
  .await
  .unwrap();
  let app = api_router(state);
  configure(&app).await;

  let (_, campaign) =
    request(&app, "POST", "/campaigns", Some(campaign_body("Summer", 80)))
      .await;
  let id = campaign["id"].as_str().unwrap().to_owned();

  fail_next.store(true, Ordering::SeqCst);
  let (status, _) =
    request(&app, "POST", &format!("/campaigns/{id}/launch"), None).await;
  assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

  // The transition was never committed; the campaign is still a draft.
  let (_, reloaded) =
    request(&app, "GET", &format!("/campaigns/{id}"), None).await;
  assert_eq!(reloaded["status"], "DRAFT");

  // Once the store recovers, the launch goes through.
  let (status, _) =
    request(&app, "POST", &format!("/campaigns/{id}/launch"), None).await;
  assert_eq!(status, StatusCode::OK);
  let done = wait_terminal(&app, &id).await;
  assert_eq!(done["status"], "COMPLETED");
}

#[tokio::test]
async fn relaunching_is_a_conflict() {
  let app = app().await;
  configure(&app).await;

  let (_, campaign) =
    request(&app, "POST", "/campaigns", Some(campaign_body("Summer", 80)))
      .await;
  let id = campaign["id"].as_str().unwrap().to_owned();

  request(&app, "POST", &format!("/campaigns/{id}/launch"), None).await;
  wait_terminal(&app, &id).await;

  let (status, _) =
    request(&app, "POST", &format!("/campaigns/{id}/launch"), None).await;
  assert_eq!(status, StatusCode::CONFLICT);
}

// ─── Settings ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn settings_expose_the_derived_configured_flag() {
  let app = app().await;

  let (_, view) = request(&app, "GET", "/settings/api", None).await;
  assert_eq!(view["isConfigured"], false);

  configure(&app).await;
  let (_, view) = request(&app, "GET", "/settings/api", None).await;
  assert_eq!(view["isConfigured"], true);
  assert_eq!(view["accessToken"], "EAAB");
}
