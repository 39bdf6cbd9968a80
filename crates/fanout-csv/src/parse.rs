//! Delimited-text parsing and header role inference.

use crate::error::{Error, Result};

// ─── Header matching ─────────────────────────────────────────────────────────

/// The role a CSV column plays when mapped onto a contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRole {
  Name,
  Phone,
  Email,
}

/// One rule in the ordered header-matching strategy: a column whose
/// lower-cased header contains any of `needles` takes `role`. Kept as data
/// so alternate header vocabularies can be added without touching the
/// parser core.
#[derive(Debug, Clone, Copy)]
pub struct HeaderMatcher {
  pub role:    ColumnRole,
  pub needles: &'static [&'static str],
}

/// The stock vocabulary: English plus the Italian headers the exports in
/// the wild actually use.
pub fn default_matchers() -> &'static [HeaderMatcher] {
  &[
    HeaderMatcher {
      role:    ColumnRole::Name,
      needles: &["name", "nome"],
    },
    HeaderMatcher {
      role:    ColumnRole::Phone,
      needles: &["phone", "tel", "cell"],
    },
    HeaderMatcher {
      role:    ColumnRole::Email,
      needles: &["email", "mail"],
    },
  ]
}

// ─── Delimiter detection ─────────────────────────────────────────────────────

/// Pick the delimiter from the header line alone: `;` when present,
/// otherwise `,`. One global decision per file; data lines never override
/// it.
pub fn detect_delimiter(header: &str) -> char {
  if header.contains(';') { ';' } else { ',' }
}

// ─── Column map ──────────────────────────────────────────────────────────────

/// Resolved column indices for each role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMap {
  pub name:  usize,
  pub phone: usize,
  /// `None` when no header matched; there is no positional fallback for
  /// email.
  pub email: Option<usize>,
}

impl ColumnMap {
  /// Infer roles from the header fields. Unmatched roles fall back
  /// positionally: name ← column 0, phone ← column 1, email ← absent.
  pub fn infer(headers: &[String], matchers: &[HeaderMatcher]) -> Self {
    let mut name = None;
    let mut phone = None;
    let mut email = None;

    for matcher in matchers {
      let slot = match matcher.role {
        ColumnRole::Name => &mut name,
        ColumnRole::Phone => &mut phone,
        ColumnRole::Email => &mut email,
      };
      if slot.is_some() {
        continue;
      }
      *slot = headers.iter().position(|h| {
        let h = h.to_lowercase();
        matcher.needles.iter().any(|needle| h.contains(needle))
      });
    }

    Self {
      name: name.unwrap_or(0),
      phone: phone.unwrap_or(1),
      email,
    }
  }
}

// ─── Row extraction ──────────────────────────────────────────────────────────

/// One data row with its fields resolved through the column map. The phone
/// is still raw; normalisation happens at merge time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedRow {
  pub name:      String,
  pub raw_phone: String,
  pub email:     Option<String>,
}

/// Trim a field and strip one layer of wrapping quote characters. Embedded
/// quotes are left alone.
fn clean_field(field: &str) -> String {
  let trimmed = field.trim();
  trimmed
    .strip_prefix('"')
    .and_then(|s| s.strip_suffix('"'))
    .unwrap_or(trimmed)
    .trim()
    .to_owned()
}

fn split_line(line: &str, delimiter: char) -> Vec<String> {
  line.split(delimiter).map(clean_field).collect()
}

/// Parse `raw` into mapped rows.
///
/// Fails with [`Error::EmptyFile`] when nothing but whitespace remains.
/// Rows whose resolved name or phone is empty are skipped silently; a
/// header-only file yields an empty vec.
pub fn parse_rows(
  raw: &str,
  matchers: &[HeaderMatcher],
) -> Result<Vec<MappedRow>> {
  let lines: Vec<&str> = raw
    .trim()
    .lines()
    .map(str::trim)
    .filter(|l| !l.is_empty())
    .collect();

  let Some((header, data)) = lines.split_first() else {
    return Err(Error::EmptyFile);
  };

  let delimiter = detect_delimiter(header);
  let headers = split_line(header, delimiter);
  let map = ColumnMap::infer(&headers, matchers);

  let mut rows = Vec::with_capacity(data.len());
  for line in data {
    let fields = split_line(line, delimiter);
    let field = |i: usize| fields.get(i).cloned().unwrap_or_default();

    let name = field(map.name);
    let raw_phone = field(map.phone);
    if name.is_empty() || raw_phone.is_empty() {
      continue;
    }

    let email = map
      .email
      .map(field)
      .filter(|e| !e.is_empty());

    rows.push(MappedRow {
      name,
      raw_phone,
      email,
    });
  }

  Ok(rows)
}
