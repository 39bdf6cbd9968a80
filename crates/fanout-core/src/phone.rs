//! Canonical phone-number normalisation.
//!
//! The canonical form is the dedup key for the whole contact book, so this
//! function must be idempotent: feeding its own output back in must be a
//! no-op.

/// Country prefix prepended when the input carries no `+` of its own.
pub const DEFAULT_COUNTRY_PREFIX: &str = "+39";

/// Reduce `raw` to digits plus an optional leading `+`, then prepend
/// `default_prefix` when no `+` survived.
///
/// No length or checksum validation is performed; a too-short number is
/// passed through as-is. An input with no digits and no `+` normalises to
/// the empty string (callers treat that as a missing phone, not as a bare
/// country prefix).
pub fn normalize(raw: &str, default_prefix: &str) -> String {
  let mut out = String::with_capacity(raw.len());
  for c in raw.chars() {
    if c.is_ascii_digit() || (c == '+' && out.is_empty()) {
      out.push(c);
    }
  }
  if out.is_empty() {
    return out;
  }
  if out.starts_with('+') {
    out
  } else {
    format!("{default_prefix}{out}")
  }
}
