use std::io;

use thiserror::Error;

use crate::types::EpochSeconds;

/// Error type for file access, CSV decoding, and configuration failures.
#[derive(Debug, Error)]
pub enum PrepError {
    /// Opening, reading, or writing a file failed.
    #[error(transparent)]
    Io(#[from] io::Error),
    /// The CSV could not be parsed or decoded as UTF-8.
    #[error(transparent)]
    Csv(#[from] csv::Error),
    /// A JSON report could not be encoded.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    /// Arguments that cannot describe a valid run.
    #[error("configuration error: {0}")]
    Configuration(String),
}

/// Why a row's timestamp could not be used.
///
/// Rows that fail this way are filtered out, never reported as errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimestampError {
    /// No timestamp column, or the row ends before it.
    #[error("timestamp field is missing")]
    Missing,
    /// The field is not a base-10 integer.
    #[error("timestamp '{0}' is not an integer")]
    NotAnInteger(String),
    /// The integer has no calendar date.
    #[error("timestamp {0} is outside the representable calendar range")]
    OutOfRange(EpochSeconds),
}
