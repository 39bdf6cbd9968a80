//! Outbound dispatch implementations: the real WhatsApp Cloud API loop and
//! a simulated stand-in for development.

use std::{convert::Infallible, time::Duration};

use fanout_core::dispatch::{
  DeliveryOutcome, DispatchCredentials, DispatchFailure, Dispatcher, SendJob,
};
use rand::Rng;
use serde_json::json;

const GRAPH_API_BASE: &str = "https://graph.facebook.com/v19.0";

/// Provider error bodies get truncated to this many characters before they
/// are recorded as a failure detail.
const FAILURE_DETAIL_MAX: usize = 300;

// ─── Simulated ───────────────────────────────────────────────────────────────

/// Development dispatcher: sleeps for a configured latency and reports the
/// campaign's audience snapshot as fully sent, with a synthesised open rate
/// between 60% and 90%.
pub struct SimulatedDispatcher {
  latency: Duration,
}

impl SimulatedDispatcher {
  pub fn new(latency: Duration) -> Self { Self { latency } }
}

impl Dispatcher for SimulatedDispatcher {
  type Error = Infallible;

  async fn dispatch(
    &self,
    _credentials: &DispatchCredentials,
    job: &SendJob,
  ) -> Result<DeliveryOutcome, Self::Error> {
    tokio::time::sleep(self.latency).await;

    let sent = job.total_contacts;
    let open_rate = rand::rng().random_range(0.6..0.9);
    Ok(DeliveryOutcome {
      sent,
      opened: (sent as f64 * open_rate).floor() as u64,
      failures: Vec::new(),
    })
  }
}

// ─── Cloud API ───────────────────────────────────────────────────────────────

/// Real dispatcher: one Graph API `/{phone_number_id}/messages` call per
/// recipient, throttled by a fixed delay. Per-recipient errors are collected
/// rather than aborting the run, so one bad number never sinks a campaign.
pub struct CloudApiDispatcher {
  client:     reqwest::Client,
  graph_base: String,
  throttle:   Duration,
}

impl CloudApiDispatcher {
  pub fn new(throttle: Duration) -> Self {
    Self {
      client: reqwest::Client::new(),
      graph_base: GRAPH_API_BASE.to_owned(),
      throttle,
    }
  }

  async fn send_one(
    &self,
    credentials: &DispatchCredentials,
    message_text: &str,
    recipient: &str,
  ) -> Result<(), String> {
    let url = format!(
      "{}/{}/messages",
      self.graph_base, credentials.phone_number_id
    );
    let body = json!({
      "messaging_product": "whatsapp",
      "to": recipient,
      "type": "text",
      "text": { "body": message_text },
    });

    let resp = self
      .client
      .post(url)
      .bearer_auth(&credentials.access_token)
      .json(&body)
      .send()
      .await
      .map_err(|e| e.to_string())?;

    if resp.status().is_success() {
      return Ok(());
    }

    let status = resp.status();
    let detail = resp.text().await.unwrap_or_default();
    Err(format!("{status}: {}", truncate(&detail, FAILURE_DETAIL_MAX)))
  }
}

fn truncate(s: &str, max: usize) -> &str {
  match s.char_indices().nth(max) {
    Some((idx, _)) => &s[..idx],
    None => s,
  }
}

impl Dispatcher for CloudApiDispatcher {
  type Error = Infallible;

  async fn dispatch(
    &self,
    credentials: &DispatchCredentials,
    job: &SendJob,
  ) -> Result<DeliveryOutcome, Self::Error> {
    let mut outcome = DeliveryOutcome::default();

    for recipient in &job.recipients {
      match self.send_one(credentials, &job.message_text, recipient).await {
        Ok(()) => outcome.sent += 1,
        Err(detail) => {
          tracing::warn!(%recipient, %detail, "dispatch failed");
          outcome.failures.push(DispatchFailure {
            recipient: recipient.clone(),
            detail,
          });
        }
      }
      tokio::time::sleep(self.throttle).await;
    }

    Ok(outcome)
  }
}

// ─── Selection ───────────────────────────────────────────────────────────────

/// Runtime-selected dispatcher. Both arms are infallible at the transport
/// level; failures show up per-recipient in the outcome.
pub enum AnyDispatcher {
  Simulated(SimulatedDispatcher),
  CloudApi(CloudApiDispatcher),
}

impl Dispatcher for AnyDispatcher {
  type Error = Infallible;

  async fn dispatch(
    &self,
    credentials: &DispatchCredentials,
    job: &SendJob,
  ) -> Result<DeliveryOutcome, Self::Error> {
    match self {
      Self::Simulated(d) => d.dispatch(credentials, job).await,
      Self::CloudApi(d) => d.dispatch(credentials, job).await,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn credentials() -> DispatchCredentials {
    DispatchCredentials {
      access_token:    "token".to_owned(),
      phone_number_id: "12345".to_owned(),
    }
  }

  fn job(recipients: Vec<String>, total_contacts: u64) -> SendJob {
    SendJob {
      message_text: "hello".to_owned(),
      recipients,
      total_contacts,
    }
  }

  #[tokio::test]
  async fn simulated_reports_the_audience_snapshot_as_sent() {
    let dispatcher = SimulatedDispatcher::new(Duration::from_millis(1));
    let recipients: Vec<String> =
      (0..10).map(|i| format!("+3933300000{i}")).collect();

    let outcome = dispatcher
      .dispatch(&credentials(), &job(recipients, 10))
      .await
      .unwrap();

    assert_eq!(outcome.sent, 10);
    assert!(outcome.failures.is_empty());
    // open rate is drawn from [0.6, 0.9)
    assert!(outcome.opened >= 6);
    assert!(outcome.opened < 9);
  }

  #[tokio::test]
  async fn simulated_sent_tracks_the_snapshot_not_the_live_list() {
    let dispatcher = SimulatedDispatcher::new(Duration::from_millis(1));
    // Audience grew to 5 after the campaign snapshotted 3.
    let recipients: Vec<String> =
      (0..5).map(|i| format!("+393330000{i}")).collect();

    let outcome = dispatcher
      .dispatch(&credentials(), &job(recipients, 3))
      .await
      .unwrap();

    assert_eq!(outcome.sent, 3);
    assert!(outcome.opened >= 1);
    assert!(outcome.opened < 3);
  }

  #[tokio::test]
  async fn simulated_empty_audience() {
    let dispatcher = SimulatedDispatcher::new(Duration::from_millis(1));
    let outcome = dispatcher
      .dispatch(&credentials(), &job(vec![], 0))
      .await
      .unwrap();

    assert_eq!(outcome.sent, 0);
    assert_eq!(outcome.opened, 0);
    assert!(!outcome.is_total_failure());
  }

  #[test]
  fn truncate_respects_char_boundaries() {
    assert_eq!(truncate("hello", 3), "hel");
    assert_eq!(truncate("hi", 300), "hi");
    assert_eq!(truncate("àèìòù", 2), "àè");
  }
}
