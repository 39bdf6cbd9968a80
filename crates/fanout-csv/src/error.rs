//! Error types for the fanout-csv importer.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// The file had no non-blank lines after trimming. A header-only file is
  /// not an error; it imports zero rows.
  #[error("CSV file contains no usable rows")]
  EmptyFile,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
