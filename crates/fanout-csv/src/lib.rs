//! CSV contact import for Fanout.
//!
//! Maps raw delimited text onto [`fanout_core`] contacts and merges them
//! into a [`ContactBook`](fanout_core::book::ContactBook). Pure synchronous;
//! no HTTP or database dependencies.
//!
//! Pipeline:
//!   raw &str
//!     └─ non-blank lines
//!          └─ detect_delimiter()  → one global per-file decision
//!               └─ ColumnMap::infer() → header roles (pluggable matchers)
//!                    └─ mapped rows    → running merge into the book
//!
//! The splitter is deliberately naive: fields are split on the bare
//! delimiter and only wrapping quote characters are stripped. Embedded
//! delimiters and escaped quotes are not handled.

pub mod error;
mod import;
mod parse;

pub use error::{Error, Result};
pub use import::{IMPORT_TAG, ImportReport, import_csv};
pub use parse::{
  ColumnMap, ColumnRole, HeaderMatcher, MappedRow, default_matchers,
  detect_delimiter, parse_rows,
};
