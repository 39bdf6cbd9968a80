//! The message-dispatch collaborator boundary.
//!
//! The lifecycle manager never talks to the messaging provider directly: it
//! hands a [`SendJob`] to a [`Dispatcher`] and folds the returned
//! [`DeliveryOutcome`] into the campaign's counters. The simulated and the
//! real Cloud API dispatchers both live behind this trait, so swapping in
//! real delivery telemetry requires no state-machine change.

use std::future::Future;

use serde::{Deserialize, Serialize};

/// Credentials for the messaging provider, extracted from the stored
/// [`crate::config::ApiConfig`].
#[derive(Debug, Clone)]
pub struct DispatchCredentials {
  pub access_token:    String,
  pub phone_number_id: String,
}

/// One recipient the provider rejected, with the provider's error detail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchFailure {
  pub recipient: String,
  pub detail:    String,
}

/// One send run handed to a dispatcher: the message, the live recipient
/// list, and the campaign's audience snapshot from creation time.
///
/// Real dispatchers iterate `recipients` and count actual sends; simulated
/// dispatchers report `total_contacts` as the sent count, so the completed
/// campaign's counter always equals its creation-time snapshot.
#[derive(Debug, Clone)]
pub struct SendJob {
  pub message_text:   String,
  pub recipients:     Vec<String>,
  pub total_contacts: u64,
}

/// Aggregate result of one dispatch run over a recipient list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryOutcome {
  pub sent:     u64,
  /// Opens reported by the provider's telemetry; the simulated dispatcher
  /// synthesises this number.
  pub opened:   u64,
  pub failures: Vec<DispatchFailure>,
}

impl DeliveryOutcome {
  pub fn failed(&self) -> u64 { self.failures.len() as u64 }

  /// A run where nothing went out at all. The lifecycle manager turns this
  /// into a `Failed` campaign rather than a completed one.
  pub fn is_total_failure(&self) -> bool {
    self.sent == 0 && !self.failures.is_empty()
  }
}

/// Abstraction over the outbound messaging transport.
pub trait Dispatcher: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Run one send job, reporting per-recipient results. Implementations
  /// are expected to throttle themselves; the caller does not rate-limit.
  fn dispatch<'a>(
    &'a self,
    credentials: &'a DispatchCredentials,
    job: &'a SendJob,
  ) -> impl Future<Output = Result<DeliveryOutcome, Self::Error>> + Send + 'a;
}
