//! The import merge loop: parsed rows → running merge into the book.

use chrono::{DateTime, Utc};
use fanout_core::{book::ContactBook, book::Upsert, phone};
use serde::Serialize;

use crate::{
  error::Result,
  parse::{default_matchers, parse_rows},
};

/// Tag stamped on every contact that came in through a CSV import.
/// Manually added contacts never carry it.
pub const IMPORT_TAG: &str = "import-csv";

/// User-visible outcome of one import run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
  pub added:   u32,
  pub updated: u32,
}

/// Import `raw` CSV text into `book`.
///
/// Rows merge against the progressively-updated book, so two rows in the
/// same file sharing a phone number collapse into one contact (first row
/// adds, second updates). Every imported contact gets [`IMPORT_TAG`] and
/// `opt_in_date` = `now`.
pub fn import_csv(
  raw: &str,
  book: &mut ContactBook,
  default_prefix: &str,
  now: DateTime<Utc>,
) -> Result<ImportReport> {
  let rows = parse_rows(raw, default_matchers())?;

  let mut report = ImportReport::default();
  for row in rows {
    let canonical = phone::normalize(&row.raw_phone, default_prefix);
    if canonical.is_empty() {
      // Phone field held no digits at all; nothing to key the merge on.
      continue;
    }
    match book.upsert_by_phone(
      row.name,
      canonical,
      row.email,
      vec![IMPORT_TAG.to_owned()],
      now,
    ) {
      Upsert::Added => report.added += 1,
      Upsert::Updated => report.updated += 1,
    }
  }

  Ok(report)
}
