/// Seconds since the Unix epoch as stored in the `timestamp` column.
/// Example: `1609459200`
pub type EpochSeconds = i64;
/// Calendar year derived from a timestamp.
/// Example: `2021`
pub type Year = i32;
/// Zero-based data row position within a file (header excluded).
/// Example: `10000`
pub type RowPosition = u64;
/// Human-facing label for an analysis target.
/// Examples: `LGBT`, `4tran`
pub type TargetLabel = String;
