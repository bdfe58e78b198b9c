use std::collections::HashMap;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, info, trace, warn};

use crate::config::StratifyConfig;
use crate::data::{CsvHeader, TimedRow};
use crate::errors::PrepError;
use crate::transport::csv_file::{CsvSink, CsvStream};
use crate::types::{TargetLabel, Year};

/// Receives progress from a stratified sampling run.
///
/// Every method defaults to a no-op so observers only implement what they show.
pub trait SampleObserver {
    /// Called every `progress_interval` rows read during bucketing.
    fn rows_read(&mut self, _rows_read: u64) {}
    /// Called once the bucketing pass has consumed the whole input.
    fn bucketing_finished(&mut self, _buckets: &YearBuckets) {}
    /// Called after each year is sampled, in ascending year order.
    fn year_sampled(&mut self, _tally: &YearTally) {}
    /// Called after the output file is flushed.
    fn sample_written(&mut self, _output: &Path, _rows_written: usize) {}
}

/// Observer that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentObserver;

impl SampleObserver for SilentObserver {}

/// Rows grouped by calendar year, in input order within each year.
#[derive(Debug)]
pub struct YearBuckets {
    header: CsvHeader,
    buckets: HashMap<Year, Vec<TimedRow>>,
    rows_read: u64,
    rows_dropped: u64,
}

impl YearBuckets {
    /// Header of the bucketed input.
    pub fn header(&self) -> &CsvHeader {
        &self.header
    }

    /// Every data row read, kept or dropped.
    pub fn rows_read(&self) -> u64 {
        self.rows_read
    }

    /// Rows excluded because their timestamp was missing or unusable.
    pub fn rows_dropped(&self) -> u64 {
        self.rows_dropped
    }

    /// Years present, ascending.
    pub fn years(&self) -> Vec<Year> {
        let mut years: Vec<Year> = self.buckets.keys().copied().collect();
        years.sort_unstable();
        years
    }

    /// Number of rows bucketed under `year`.
    pub fn bucket_len(&self, year: Year) -> usize {
        self.buckets.get(&year).map_or(0, Vec::len)
    }
}

/// Per-year outcome of the sampling pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct YearTally {
    /// Calendar year of the bucket.
    pub year: Year,
    /// Rows bucketed under the year.
    pub bucket_size: usize,
    /// Rows kept, `min(bucket_size, target_per_year)`.
    pub sampled: usize,
}

/// Sampled rows of every year, merged and sorted by timestamp.
#[derive(Debug)]
pub struct StratifiedSample {
    /// Header of the source file.
    pub header: CsvHeader,
    /// Kept rows in non-decreasing timestamp order.
    pub rows: Vec<TimedRow>,
    /// One entry per year, ascending.
    pub tallies: Vec<YearTally>,
}

/// Summary of one `create_stratified_sample` run.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StratifyReport {
    /// Source file.
    pub input: PathBuf,
    /// Written sample.
    pub output: PathBuf,
    /// Data rows read from `input`.
    pub rows_read: u64,
    /// Rows skipped for an unusable timestamp.
    pub rows_dropped: u64,
    /// Per-year counts, ascending by year.
    pub tallies: Vec<YearTally>,
    /// Data rows written to `output`, header excluded.
    pub rows_written: usize,
}

/// One input file and the path its sample is written to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StratifyJob {
    /// Name used in the closing summary.
    pub label: TargetLabel,
    /// CSV file to sample.
    pub input: PathBuf,
    /// Destination of the sampled CSV.
    pub output: PathBuf,
}

impl StratifyJob {
    /// Build a job labelled by the output file stem without a `_stratified` suffix.
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        let output = output.into();
        let stem = output
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or_default();
        let label = stem.strip_suffix("_stratified").unwrap_or(stem).to_string();
        Self {
            label,
            input: input.into(),
            output,
        }
    }

    /// Replace the derived label.
    pub fn with_label(mut self, label: impl Into<TargetLabel>) -> Self {
        self.label = label.into();
        self
    }
}

impl FromStr for StratifyJob {
    type Err = String;

    /// Parse `INPUT=OUTPUT`.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let Some((input, output)) = raw.split_once('=') else {
            return Err(format!("invalid job '{raw}': expected INPUT=OUTPUT"));
        };
        let (input, output) = (input.trim(), output.trim());
        if input.is_empty() || output.is_empty() {
            return Err(format!("invalid job '{raw}': expected INPUT=OUTPUT"));
        }
        if input == output {
            return Err(format!("invalid job '{raw}': output would overwrite input"));
        }
        Ok(Self::new(input, output))
    }
}

/// Stream every row of `input` into a bucket keyed by its calendar year.
///
/// Rows whose timestamp is missing, non-integer, or outside the calendar
/// range are dropped. Read or decode failures are returned.
pub fn bucket_by_year<R: Read>(
    input: R,
    config: &StratifyConfig,
    observer: &mut dyn SampleObserver,
) -> Result<YearBuckets, PrepError> {
    let stream = CsvStream::from_reader(input, &config.timestamp_column)?;
    bucket_stream(stream, config, observer)
}

fn bucket_stream<R: Read>(
    mut stream: CsvStream<R>,
    config: &StratifyConfig,
    observer: &mut dyn SampleObserver,
) -> Result<YearBuckets, PrepError> {
    let header = stream.header().clone();
    if !header.has_timestamp_column() {
        warn!(
            column = %config.timestamp_column,
            "timestamp column not found; every row will be dropped"
        );
    }

    let mut buckets: HashMap<Year, Vec<TimedRow>> = HashMap::new();
    let mut rows_read = 0u64;
    let mut rows_dropped = 0u64;

    for row in &mut stream {
        let row = row?;
        rows_read += 1;
        let position = row.position;
        match row.into_timed(&header, config.time_basis) {
            Ok(timed) => buckets.entry(timed.year).or_default().push(timed),
            Err(reason) => {
                rows_dropped += 1;
                trace!(position, %reason, "dropping row with unusable timestamp");
            }
        }
        if config.progress_interval > 0 && rows_read % config.progress_interval == 0 {
            info!(rows_read, "bucketing in progress");
            observer.rows_read(rows_read);
        }
    }

    debug!(
        rows_read,
        rows_dropped,
        years = buckets.len(),
        "bucketing pass completed"
    );
    Ok(YearBuckets {
        header,
        buckets,
        rows_read,
        rows_dropped,
    })
}

/// Draw at most `target_per_year` rows from every bucket and merge them.
///
/// Years are visited in ascending order. Oversized buckets are sampled
/// uniformly without replacement; smaller buckets are kept whole. The merged
/// rows are stably sorted by timestamp, so equal timestamps keep input order.
pub fn sample_buckets<R: Rng + ?Sized>(
    buckets: YearBuckets,
    target_per_year: usize,
    rng: &mut R,
    observer: &mut dyn SampleObserver,
) -> StratifiedSample {
    let YearBuckets {
        header,
        mut buckets,
        ..
    } = buckets;
    let mut years: Vec<Year> = buckets.keys().copied().collect();
    years.sort_unstable();

    let mut rows = Vec::new();
    let mut tallies = Vec::with_capacity(years.len());
    for year in years {
        let Some(bucket) = buckets.remove(&year) else {
            continue;
        };
        let bucket_size = bucket.len();
        let sampled = draw_without_replacement(bucket, target_per_year, rng);
        let tally = YearTally {
            year,
            bucket_size,
            sampled: sampled.len(),
        };
        debug!(year, bucket_size, sampled = tally.sampled, "sampled year bucket");
        observer.year_sampled(&tally);
        tallies.push(tally);
        rows.extend(sampled);
    }

    rows.sort_by_key(|row| row.timestamp);
    StratifiedSample {
        header,
        rows,
        tallies,
    }
}

/// Keep `amount` uniformly chosen items, preserving their relative order.
///
/// Returns `items` untouched when it holds `amount` or fewer.
pub fn draw_without_replacement<T, R: Rng + ?Sized>(
    items: Vec<T>,
    amount: usize,
    rng: &mut R,
) -> Vec<T> {
    if items.len() <= amount {
        return items;
    }
    let mut picked = index::sample(rng, items.len(), amount).into_vec();
    picked.sort_unstable();
    let mut picked = picked.into_iter().peekable();
    items
        .into_iter()
        .enumerate()
        .filter_map(|(idx, item)| {
            if picked.peek() == Some(&idx) {
                picked.next();
                Some(item)
            } else {
                None
            }
        })
        .collect()
}

/// Write the header and every sampled row; returns the number of rows written.
pub fn write_sample<W: Write>(
    sink: &mut CsvSink<W>,
    sample: &StratifiedSample,
) -> Result<usize, PrepError> {
    let before = sink.rows_written();
    sink.write_header(&sample.header)?;
    for timed in &sample.rows {
        sink.write_row(&sample.header, &timed.row)?;
    }
    Ok(sink.rows_written() - before)
}

/// Build a year-balanced sample of `input` and write it to `output`.
///
/// Failing to open either path is returned as an error; nothing is caught.
pub fn create_stratified_sample(
    input: &Path,
    output: &Path,
    config: &StratifyConfig,
    observer: &mut dyn SampleObserver,
) -> Result<StratifyReport, PrepError> {
    if input == output {
        return Err(PrepError::Configuration(format!(
            "output {} would overwrite its input",
            output.display()
        )));
    }
    let stream = CsvStream::open(input, &config.timestamp_column)?;
    let buckets = bucket_stream(stream, config, observer)?;
    observer.bucketing_finished(&buckets);
    let (rows_read, rows_dropped) = (buckets.rows_read(), buckets.rows_dropped());

    let sample = match config.seed {
        Some(seed) => {
            let mut rng = StdRng::seed_from_u64(seed);
            sample_buckets(buckets, config.target_per_year, &mut rng, observer)
        }
        None => sample_buckets(buckets, config.target_per_year, &mut rand::rng(), observer),
    };

    let mut sink = CsvSink::create(output, config.terminator)?;
    write_sample(&mut sink, &sample)?;
    let rows_written = sink.rows_written();
    sink.finish()?;
    info!(
        input = %input.display(),
        output = %output.display(),
        rows_written,
        "stratified sample written"
    );
    observer.sample_written(output, rows_written);

    Ok(StratifyReport {
        input: input.to_path_buf(),
        output: output.to_path_buf(),
        rows_read,
        rows_dropped,
        tallies: sample.tallies,
        rows_written,
    })
}
