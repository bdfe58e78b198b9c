#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

/// Command-line runners shared by the bundled binaries.
pub mod apps;
/// Inspector and sampler configuration types.
pub mod config;
/// Centralized constants used by the inspector and the sampler.
pub mod constants;
/// Header and row types.
pub mod data;
/// Sampled timestamp inspection.
pub mod inspect;
/// Console formatting helpers.
pub mod report;
/// Year-stratified sampling.
pub mod stratify;
/// Epoch-second parsing and calendar conversion.
pub mod timestamps;
/// CSV readers and writers.
pub mod transport;
/// Shared type aliases.
pub mod types;

mod errors;

pub use config::{InspectConfig, LineTerminator, StratifyConfig, TimeBasis};
pub use data::{CsvHeader, CsvRow, TimedRow};
pub use errors::{PrepError, TimestampError};
pub use inspect::{
    InspectOutcome, InspectTarget, InspectionSummary, ReportFormat, inspect_path, inspect_reader,
    inspect_targets,
};
pub use stratify::{
    SampleObserver, SilentObserver, StratifiedSample, StratifyJob, StratifyReport, YearBuckets,
    YearTally, create_stratified_sample,
};
pub use types::{EpochSeconds, RowPosition, TargetLabel, Year};
