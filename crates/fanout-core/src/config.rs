//! Stored messaging-provider credentials.

use serde::{Deserialize, Serialize};

use crate::dispatch::DispatchCredentials;

/// WhatsApp Cloud API credentials entered by the operator. Persisted
/// alongside the contact book; the lifecycle manager only ever reads the
/// derived [`ApiConfig::is_configured`] flag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiConfig {
  #[serde(default)]
  pub access_token:    String,
  #[serde(default)]
  pub phone_number_id: String,
  /// WhatsApp Business Account id; informational only.
  #[serde(default)]
  pub waba_id:         String,
}

impl ApiConfig {
  /// Configured means both the access token and the sender phone-number id
  /// are present. The WABA id is not required for sending.
  pub fn is_configured(&self) -> bool {
    !self.access_token.trim().is_empty()
      && !self.phone_number_id.trim().is_empty()
  }

  /// Extract dispatch credentials, or `None` when not configured.
  pub fn credentials(&self) -> Option<DispatchCredentials> {
    self.is_configured().then(|| DispatchCredentials {
      access_token:    self.access_token.clone(),
      phone_number_id: self.phone_number_id.clone(),
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn configured_requires_token_and_phone_id() {
    let mut cfg = ApiConfig::default();
    assert!(!cfg.is_configured());

    cfg.access_token = "EAAB...".into();
    assert!(!cfg.is_configured());

    cfg.phone_number_id = "102938".into();
    assert!(cfg.is_configured());
    assert!(cfg.credentials().is_some());

    // The WABA id alone changes nothing.
    cfg.access_token.clear();
    cfg.waba_id = "556677".into();
    assert!(!cfg.is_configured());
    assert!(cfg.credentials().is_none());
  }
}
