use std::collections::BTreeSet;
use std::fmt;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::InspectConfig;
use crate::errors::{PrepError, TimestampError};
use crate::report::{format_count, format_list};
use crate::timestamps::parse_epoch_seconds;
use crate::transport::csv_file::CsvStream;
use crate::types::{EpochSeconds, RowPosition, TargetLabel, Year};

/// Earliest and latest sampled calendar dates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct DateRange {
    /// Date of the smallest sampled timestamp.
    pub earliest: NaiveDate,
    /// Date of the largest sampled timestamp.
    pub latest: NaiveDate,
}

/// What one inspection pass observed.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct InspectionSummary {
    /// Rows examined, including rows whose timestamp was never probed.
    pub rows_seen: u64,
    /// Positions whose timestamp was probed, in file order.
    pub probed_positions: Vec<RowPosition>,
    /// Successfully parsed probe timestamps, ascending.
    pub timestamps: Vec<EpochSeconds>,
    /// `None` when no probe produced a usable timestamp.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_range: Option<DateRange>,
    /// Distinct years among the parsed probes, ascending.
    pub years: BTreeSet<Year>,
}

impl InspectionSummary {
    /// True when no probe produced a usable timestamp.
    pub fn is_reduced(&self) -> bool {
        self.timestamps.is_empty()
    }
}

impl fmt::Display for InspectionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Total rows analyzed: {}", format_count(self.rows_seen))?;
        if let Some(range) = self.date_range {
            write!(
                f,
                "\nDate range: {} to {}",
                range.earliest.format("%Y-%m-%d"),
                range.latest.format("%Y-%m-%d")
            )?;
            write!(f, "\nYears present: {}", format_list(&self.years))?;
        }
        Ok(())
    }
}

/// True when the timestamp of the row at `position` should be parsed.
pub fn is_probe_position(position: RowPosition, config: &InspectConfig) -> bool {
    position < config.head_rows
        || (config.checkpoint_interval > 0 && position % config.checkpoint_interval == 0)
}

/// Stream `input` and summarise its sampled timestamps.
///
/// At most `config.row_cap` rows are examined. Unparsable probes are skipped;
/// read or decode failures are returned.
pub fn inspect_reader<R: Read>(
    input: R,
    config: &InspectConfig,
) -> Result<InspectionSummary, PrepError> {
    let stream = CsvStream::from_reader(input, &config.timestamp_column)?;
    inspect_stream(stream, config)
}

/// Open `path` and inspect it.
pub fn inspect_path(path: &Path, config: &InspectConfig) -> Result<InspectionSummary, PrepError> {
    let stream = CsvStream::open(path, &config.timestamp_column)?;
    inspect_stream(stream, config)
}

fn inspect_stream<R: Read>(
    mut stream: CsvStream<R>,
    config: &InspectConfig,
) -> Result<InspectionSummary, PrepError> {
    if !stream.header().has_timestamp_column() {
        warn!(
            column = %config.timestamp_column,
            "timestamp column not found; no timestamps will be sampled"
        );
    }

    let mut probed_positions = Vec::new();
    let mut samples: Vec<(EpochSeconds, NaiveDate)> = Vec::new();
    let mut skipped = 0usize;

    while stream.rows_read() < config.row_cap {
        let Some(position) = stream.advance()? else {
            break;
        };
        if !is_probe_position(position, config) {
            continue;
        }
        probed_positions.push(position);
        let probe = stream
            .header()
            .timestamp_field(stream.current())
            .ok_or(TimestampError::Missing)
            .and_then(parse_epoch_seconds)
            .and_then(|ts| config.time_basis.civil_date(ts).map(|date| (ts, date)));
        match probe {
            Ok(sample) => samples.push(sample),
            Err(reason) => {
                skipped += 1;
                debug!(position, %reason, "skipping unusable timestamp probe");
            }
        }
    }

    let rows_seen = stream.rows_read();
    debug!(
        rows_seen,
        probes = probed_positions.len(),
        skipped,
        "inspection pass completed"
    );
    Ok(summarize(rows_seen, probed_positions, samples))
}

fn summarize(
    rows_seen: u64,
    probed_positions: Vec<RowPosition>,
    mut samples: Vec<(EpochSeconds, NaiveDate)>,
) -> InspectionSummary {
    samples.sort_by_key(|(ts, _)| *ts);
    let date_range = match (samples.first(), samples.last()) {
        (Some((_, earliest)), Some((_, latest))) => Some(DateRange {
            earliest: *earliest,
            latest: *latest,
        }),
        _ => None,
    };
    let years = samples.iter().map(|(_, date)| date.year()).collect();
    InspectionSummary {
        rows_seen,
        probed_positions,
        timestamps: samples.into_iter().map(|(ts, _)| ts).collect(),
        date_range,
        years,
    }
}

/// A labelled file to inspect.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct InspectTarget {
    /// Name shown in the report header.
    pub label: TargetLabel,
    /// CSV file to read.
    pub path: PathBuf,
}

impl InspectTarget {
    /// Build a target from a label and a path.
    pub fn new(label: impl Into<TargetLabel>, path: impl Into<PathBuf>) -> Self {
        Self {
            label: label.into(),
            path: path.into(),
        }
    }
}

impl FromStr for InspectTarget {
    type Err = String;

    /// Parse `LABEL=PATH`; a bare `PATH` uses its file stem as the label.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err("target must not be empty".to_string());
        }
        if let Some((label, path)) = raw.split_once('=') {
            let (label, path) = (label.trim(), path.trim());
            if label.is_empty() || path.is_empty() {
                return Err(format!("invalid target '{raw}': expected LABEL=PATH"));
            }
            return Ok(Self::new(label, path));
        }
        let path = PathBuf::from(raw);
        let label = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or(raw)
            .to_string();
        Ok(Self::new(label, path))
    }
}

/// Result of inspecting one target; exactly one of `summary`/`error` is set.
#[derive(Clone, Debug, Serialize)]
pub struct InspectOutcome {
    /// Target this outcome describes.
    pub target: InspectTarget,
    /// Summary of a successful pass.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<InspectionSummary>,
    /// Rendered error of a failed pass.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// How the multi-target driver renders outcomes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReportFormat {
    /// Human-readable blocks.
    #[default]
    Text,
    /// One JSON object per target per line.
    Json,
}

/// Inspect each target in turn, writing a report for each to `out`.
///
/// A target that cannot be opened or parsed is reported and skipped; the
/// remaining targets still run. Only failures writing to `out` are returned.
pub fn inspect_targets<W: Write>(
    targets: &[InspectTarget],
    config: &InspectConfig,
    format: ReportFormat,
    out: &mut W,
) -> Result<Vec<InspectOutcome>, PrepError> {
    let mut outcomes = Vec::with_capacity(targets.len());
    for target in targets {
        let outcome = match inspect_path(&target.path, config) {
            Ok(summary) => InspectOutcome {
                target: target.clone(),
                summary: Some(summary),
                error: None,
            },
            Err(err) => {
                warn!(
                    label = %target.label,
                    path = %target.path.display(),
                    error = %err,
                    "inspection failed"
                );
                InspectOutcome {
                    target: target.clone(),
                    summary: None,
                    error: Some(err.to_string()),
                }
            }
        };
        match format {
            ReportFormat::Text => write_text_outcome(&outcome, out)?,
            ReportFormat::Json => {
                serde_json::to_writer(&mut *out, &outcome)?;
                writeln!(out)?;
            }
        }
        outcomes.push(outcome);
    }
    Ok(outcomes)
}

fn write_text_outcome<W: Write>(outcome: &InspectOutcome, out: &mut W) -> io::Result<()> {
    let target = &outcome.target;
    writeln!(out)?;
    writeln!(out, "Analyzing {} ({}):", target.label, target.path.display())?;
    if let Some(summary) = &outcome.summary {
        writeln!(out, "{summary}")?;
    }
    if let Some(error) = &outcome.error {
        writeln!(out, "Error reading {}: {}", target.path.display(), error)?;
    }
    Ok(())
}
