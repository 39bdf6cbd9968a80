//! The compliance gate: external policy scoring plus the threshold policy.
//!
//! Scoring itself is delegated to a [`PolicyScorer`] collaborator (an
//! external text classifier). This module only absorbs collaborator
//! failures into a fail-closed result and applies the minimum-score
//! threshold that a campaign must meet to leave draft.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::campaign::TemplateCategory;

/// Minimum compliance score required to create (and later launch) a
/// campaign. Overridable through server configuration.
pub const DEFAULT_COMPLIANCE_THRESHOLD: u8 = 50;

/// Verdict of the external policy classifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceResult {
  /// 0–100.
  pub score:        u8,
  pub is_compliant: bool,
  pub suggestions:  Vec<String>,
  pub warnings:     Vec<String>,
}

impl ComplianceResult {
  /// The fixed result substituted when the scoring collaborator fails or
  /// returns an unparsable payload. Score zero keeps the gate closed.
  pub fn fail_closed() -> Self {
    Self {
      score:        0,
      is_compliant: false,
      suggestions:  vec!["error".into()],
      warnings:     vec!["error".into()],
    }
  }

  pub fn passes(&self, threshold: u8) -> bool { self.score >= threshold }
}

/// Abstraction over the external message-policy classifier.
///
/// All methods return `Send` futures so the trait can be used from
/// multi-threaded async runtimes.
pub trait PolicyScorer: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Score `text` against the provider's business-messaging policy for the
  /// given template category.
  fn score<'a>(
    &'a self,
    text: &'a str,
    category: TemplateCategory,
  ) -> impl Future<Output = Result<ComplianceResult, Self::Error>> + Send + 'a;

  /// Rewrite a draft into a more policy-compliant template.
  fn optimize<'a>(
    &'a self,
    draft: &'a str,
    category: TemplateCategory,
  ) -> impl Future<Output = Result<String, Self::Error>> + Send + 'a;
}

/// Run the scoring collaborator and absorb any failure into
/// [`ComplianceResult::fail_closed`]. This never errors: a broken classifier
/// must block sending, not crash the draft flow.
pub async fn evaluate<P: PolicyScorer>(
  scorer: &P,
  text: &str,
  category: TemplateCategory,
) -> ComplianceResult {
  match scorer.score(text, category).await {
    Ok(result) => result,
    Err(_) => ComplianceResult::fail_closed(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  struct FixedScorer(Result<ComplianceResult, std::io::Error>);

  impl PolicyScorer for FixedScorer {
    type Error = std::io::Error;

    async fn score(
      &self,
      _text: &str,
      _category: TemplateCategory,
    ) -> Result<ComplianceResult, Self::Error> {
      match &self.0 {
        Ok(r) => Ok(r.clone()),
        Err(e) => Err(std::io::Error::new(e.kind(), "scorer down")),
      }
    }

    async fn optimize(
      &self,
      draft: &str,
      _category: TemplateCategory,
    ) -> Result<String, Self::Error> {
      Ok(draft.to_owned())
    }
  }

  #[tokio::test]
  async fn collaborator_failure_degrades_to_fail_closed() {
    let scorer =
      FixedScorer(Err(std::io::Error::other("connection refused")));
    let result =
      evaluate(&scorer, "hello", TemplateCategory::Marketing).await;
    assert_eq!(result, ComplianceResult::fail_closed());
    assert_eq!(result.score, 0);
    assert!(!result.is_compliant);
  }

  #[tokio::test]
  async fn successful_score_passes_through() {
    let verdict = ComplianceResult {
      score:        82,
      is_compliant: true,
      suggestions:  vec![],
      warnings:     vec![],
    };
    let scorer = FixedScorer(Ok(verdict.clone()));
    let result =
      evaluate(&scorer, "hello", TemplateCategory::Utility).await;
    assert_eq!(result, verdict);
  }

  #[test]
  fn threshold_is_inclusive() {
    let mut r = ComplianceResult::fail_closed();
    r.score = 49;
    assert!(!r.passes(DEFAULT_COMPLIANCE_THRESHOLD));
    r.score = 50;
    assert!(r.passes(DEFAULT_COMPLIANCE_THRESHOLD));
  }
}
