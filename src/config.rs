use std::borrow::Cow;

use serde::Serialize;

use crate::constants::csv::TIMESTAMP_COLUMN;
use crate::constants::{inspect, stratify};

/// Clock used to turn epoch seconds into calendar dates and years.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeBasis {
    /// Interpret timestamps in UTC. Deterministic across machines.
    #[default]
    Utc,
    /// Interpret timestamps in the host's local time zone.
    Local,
}

/// Row terminator written after every output record.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LineTerminator {
    /// `\r\n`
    #[default]
    Crlf,
    /// `\n`
    Lf,
}

impl From<LineTerminator> for csv::Terminator {
    fn from(value: LineTerminator) -> Self {
        match value {
            LineTerminator::Crlf => csv::Terminator::CRLF,
            LineTerminator::Lf => csv::Terminator::Any(b'\n'),
        }
    }
}

/// Controls which rows the inspector examines and probes.
#[derive(Clone, Debug)]
pub struct InspectConfig {
    /// Iteration stops once this many rows have been examined.
    pub row_cap: u64,
    /// Leading rows whose timestamp is always probed.
    pub head_rows: u64,
    /// Rows at exact multiples of this position are probed (0 disables checkpoints).
    pub checkpoint_interval: u64,
    /// Column holding epoch seconds.
    pub timestamp_column: Cow<'static, str>,
    /// Clock used for dates and years in the report.
    pub time_basis: TimeBasis,
}

impl Default for InspectConfig {
    fn default() -> Self {
        Self {
            row_cap: inspect::ROW_CAP,
            head_rows: inspect::HEAD_ROWS,
            checkpoint_interval: inspect::CHECKPOINT_INTERVAL,
            timestamp_column: Cow::Borrowed(TIMESTAMP_COLUMN),
            time_basis: TimeBasis::default(),
        }
    }
}

/// Controls bucketing, sampling, and output of the stratified sampler.
#[derive(Clone, Debug)]
pub struct StratifyConfig {
    /// Maximum rows kept for any calendar year.
    pub target_per_year: usize,
    /// Rows read between progress events (0 disables progress events).
    pub progress_interval: u64,
    /// Column holding epoch seconds.
    pub timestamp_column: Cow<'static, str>,
    /// Clock used to derive each row's year.
    pub time_basis: TimeBasis,
    /// Optional seed; `None` draws from the thread RNG so runs differ.
    pub seed: Option<u64>,
    /// Row terminator for the output file.
    pub terminator: LineTerminator,
}

impl Default for StratifyConfig {
    fn default() -> Self {
        Self {
            target_per_year: stratify::TARGET_PER_YEAR,
            progress_interval: stratify::PROGRESS_INTERVAL,
            timestamp_column: Cow::Borrowed(TIMESTAMP_COLUMN),
            time_basis: TimeBasis::default(),
            seed: None,
            terminator: LineTerminator::default(),
        }
    }
}
