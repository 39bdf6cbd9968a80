//! The contact book and its reconciliation rules.
//!
//! The book is the single authority over the contact collection's
//! invariants: every insertion path (manual entry, CSV import) goes through
//! it, and duplicate detection is keyed on the canonical phone number.
//! Phone uniqueness is a soft invariant — it holds as long as every
//! duplicate confirmation is resolved through [`ContactBook::overwrite`],
//! but nothing in the storage model enforces it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  contact::{Contact, ContactInput, split_tags},
  phone,
};

// ─── Outcomes ────────────────────────────────────────────────────────────────

/// Result of a manual add. A duplicate is not an error: it is a decision
/// point surfaced to the caller, who resolves it with
/// [`ContactBook::overwrite`] (confirm) or by doing nothing (decline).
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AddOutcome {
  Added(Contact),
  /// The book already holds a contact with the same canonical phone. The
  /// conflicting record is carried so the caller can show it when asking
  /// for confirmation. The book was not mutated.
  DuplicateRequiresConfirmation(Contact),
}

/// Whether an import row landed as a fresh insert or an overwrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
  Added,
  Updated,
}

// ─── Contact book ────────────────────────────────────────────────────────────

/// The ordered contact collection, newest first.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContactBook {
  contacts: Vec<Contact>,
}

impl ContactBook {
  pub fn new(contacts: Vec<Contact>) -> Self { Self { contacts } }

  pub fn contacts(&self) -> &[Contact] { &self.contacts }

  pub fn len(&self) -> usize { self.contacts.len() }

  pub fn is_empty(&self) -> bool { self.contacts.is_empty() }

  pub fn get(&self, id: Uuid) -> Option<&Contact> {
    self.contacts.iter().find(|c| c.id == id)
  }

  /// Look up a contact by canonical phone.
  pub fn find_by_phone(&self, canonical: &str) -> Option<&Contact> {
    self.contacts.iter().find(|c| c.phone == canonical)
  }

  /// All canonical phone numbers, in display order. This is the recipient
  /// list handed to the dispatch collaborator.
  pub fn phones(&self) -> Vec<String> {
    self.contacts.iter().map(|c| c.phone.clone()).collect()
  }

  // ── Manual entry ──────────────────────────────────────────────────────

  /// Add a manually-entered contact.
  ///
  /// Validates that name and (post-normalisation) phone are non-empty,
  /// then either inserts at the front or, when the canonical phone is
  /// already taken, returns [`AddOutcome::DuplicateRequiresConfirmation`]
  /// without touching the book.
  pub fn add_manual(
    &mut self,
    input: ContactInput,
    default_prefix: &str,
    now: DateTime<Utc>,
  ) -> Result<AddOutcome> {
    let name = input.name.trim().to_owned();
    if name.is_empty() {
      return Err(Error::Validation("contact name is required".into()));
    }

    let canonical = phone::normalize(&input.phone, default_prefix);
    if canonical.is_empty() {
      return Err(Error::Validation("contact phone is required".into()));
    }

    if let Some(existing) = self.find_by_phone(&canonical) {
      return Ok(AddOutcome::DuplicateRequiresConfirmation(existing.clone()));
    }

    let contact = Contact {
      id: Uuid::new_v4(),
      name,
      phone: canonical,
      email: normalize_email(input.email),
      opt_in_date: now,
      tags: split_tags(&input.tags),
    };
    self.contacts.insert(0, contact.clone());
    Ok(AddOutcome::Added(contact))
  }

  /// Resolve a duplicate confirmation by replacing the fields of the
  /// existing record `id` with the confirmed input. The record keeps its
  /// id and its position; `opt_in_date` is refreshed.
  pub fn overwrite(
    &mut self,
    id: Uuid,
    input: ContactInput,
    default_prefix: &str,
    now: DateTime<Utc>,
  ) -> Result<Contact> {
    let name = input.name.trim().to_owned();
    if name.is_empty() {
      return Err(Error::Validation("contact name is required".into()));
    }
    let canonical = phone::normalize(&input.phone, default_prefix);
    if canonical.is_empty() {
      return Err(Error::Validation("contact phone is required".into()));
    }

    let contact = self
      .contacts
      .iter_mut()
      .find(|c| c.id == id)
      .ok_or(Error::ContactNotFound(id))?;

    contact.name = name;
    contact.phone = canonical;
    contact.email = normalize_email(input.email);
    contact.opt_in_date = now;
    contact.tags = split_tags(&input.tags);
    Ok(contact.clone())
  }

  /// Remove a contact by id. Returns `false` if the id was not present.
  /// User confirmation is a presentation-layer concern, not enforced here.
  pub fn remove(&mut self, id: Uuid) -> bool {
    let before = self.contacts.len();
    self.contacts.retain(|c| c.id != id);
    self.contacts.len() != before
  }

  // ── Bulk import ───────────────────────────────────────────────────────

  /// Merge one already-mapped import row into the book, keyed by canonical
  /// phone. Matches overwrite fields in place (id preserved); misses insert
  /// at the front. `phone` must already be canonical.
  pub fn upsert_by_phone(
    &mut self,
    name: String,
    canonical_phone: String,
    email: Option<String>,
    tags: Vec<String>,
    now: DateTime<Utc>,
  ) -> Upsert {
    match self.contacts.iter_mut().find(|c| c.phone == canonical_phone) {
      Some(existing) => {
        existing.name = name;
        existing.email = email;
        existing.opt_in_date = now;
        existing.tags = tags;
        Upsert::Updated
      }
      None => {
        self.contacts.insert(0, Contact {
          id: Uuid::new_v4(),
          name,
          phone: canonical_phone,
          email,
          opt_in_date: now,
          tags,
        });
        Upsert::Added
      }
    }
  }
}

fn normalize_email(email: Option<String>) -> Option<String> {
  email
    .map(|e| e.trim().to_owned())
    .filter(|e| !e.is_empty())
}
