//! [`GeminiScorer`] — the Gemini-backed implementation of
//! [`PolicyScorer`].
//!
//! The classifier is asked for a strict-JSON verdict via a response schema;
//! anything that fails here (network, HTTP status, missing candidate,
//! unparsable JSON) surfaces as an error and is absorbed into the
//! fail-closed result by [`fanout_core::gate::evaluate`].

use fanout_core::{
  campaign::TemplateCategory,
  gate::{ComplianceResult, PolicyScorer},
};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

const GENERATE_CONTENT_BASE: &str =
  "https://generativelanguage.googleapis.com/v1beta/models";

#[derive(Debug, Error)]
pub enum Error {
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("classifier returned status {0}")]
  Status(reqwest::StatusCode),

  #[error("classifier response carried no text candidate")]
  NoCandidate,

  #[error("malformed verdict: {0}")]
  MalformedVerdict(#[from] serde_json::Error),
}

pub struct GeminiScorer {
  client:  reqwest::Client,
  api_key: String,
  model:   String,
}

impl GeminiScorer {
  pub fn new(api_key: String, model: String) -> Self {
    Self {
      client: reqwest::Client::new(),
      api_key,
      model,
    }
  }

  async fn generate(
    &self,
    body: serde_json::Value,
  ) -> Result<String, Error> {
    let url = format!(
      "{GENERATE_CONTENT_BASE}/{}:generateContent?key={}",
      self.model, self.api_key
    );
    let resp = self.client.post(url).json(&body).send().await?;
    if !resp.status().is_success() {
      return Err(Error::Status(resp.status()));
    }

    let parsed: GenerateResponse = resp.json().await?;
    parsed
      .candidates
      .into_iter()
      .next()
      .and_then(|c| c.content.parts.into_iter().next())
      .map(|p| p.text)
      .filter(|t| !t.is_empty())
      .ok_or(Error::NoCandidate)
  }
}

/// The slice of the generateContent response we care about.
#[derive(Debug, Deserialize)]
struct GenerateResponse {
  #[serde(default)]
  candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
  content: Content,
}

#[derive(Debug, Deserialize)]
struct Content {
  #[serde(default)]
  parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
  #[serde(default)]
  text: String,
}

/// The verdict as the model emits it: a float score that needs clamping
/// before it becomes a domain result.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawVerdict {
  score:        f64,
  is_compliant: bool,
  #[serde(default)]
  suggestions:  Vec<String>,
  #[serde(default)]
  warnings:     Vec<String>,
}

impl From<RawVerdict> for ComplianceResult {
  fn from(raw: RawVerdict) -> Self {
    ComplianceResult {
      score:        raw.score.clamp(0.0, 100.0) as u8,
      is_compliant: raw.is_compliant,
      suggestions:  raw.suggestions,
      warnings:     raw.warnings,
    }
  }
}

fn check_prompt(text: &str, category: TemplateCategory) -> String {
  format!(
    "Analyze this WhatsApp message template for compliance with Meta's \
     Official WhatsApp Business Policy.\n\
     Category: {}\n\
     Content: \"{}\"\n\n\
     Guidelines to consider:\n\
     1. Explicit opt-in required.\n\
     2. No prohibited content (drugs, gambling, adult, etc.).\n\
     3. No \"cold\" outreach without clear value or previous interaction.\n\
     4. Accuracy of category.\n\
     5. Avoid excessive capitalization or spammy formatting.\n\n\
     Provide a score from 0 to 100, boolean isCompliant, suggestions for \
     improvement, and any specific policy warnings.",
    category.as_str(),
    text
  )
}

fn optimize_prompt(draft: &str, category: TemplateCategory) -> String {
  format!(
    "Rewrite the following WhatsApp message draft to be more professional, \
     engaging, and fully compliant with Meta Business Policies for the \
     category: {}. Use placeholders like {{{{1}}}}, {{{{2}}}} for dynamic \
     data.\nDraft: \"{}\"",
    category.as_str(),
    draft
  )
}

impl PolicyScorer for GeminiScorer {
  type Error = Error;

  async fn score(
    &self,
    text: &str,
    category: TemplateCategory,
  ) -> Result<ComplianceResult, Self::Error> {
    let body = json!({
      "contents": [{ "parts": [{ "text": check_prompt(text, category) }] }],
      "generationConfig": {
        "responseMimeType": "application/json",
        "responseSchema": {
          "type": "OBJECT",
          "properties": {
            "score":       { "type": "NUMBER" },
            "isCompliant": { "type": "BOOLEAN" },
            "suggestions": { "type": "ARRAY", "items": { "type": "STRING" } },
            "warnings":    { "type": "ARRAY", "items": { "type": "STRING" } },
          },
          "required": ["score", "isCompliant", "suggestions", "warnings"],
        },
      },
    });

    let text = self.generate(body).await?;
    let raw: RawVerdict = serde_json::from_str(text.trim())?;
    Ok(raw.into())
  }

  async fn optimize(
    &self,
    draft: &str,
    category: TemplateCategory,
  ) -> Result<String, Self::Error> {
    let body = json!({
      "contents": [{ "parts": [{ "text": optimize_prompt(draft, category) }] }],
    });
    self.generate(body).await
  }
}
