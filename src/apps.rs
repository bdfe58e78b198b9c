use std::borrow::Cow;
use std::error::Error;
use std::fmt;
use std::io::{self, Write};
use std::path::Path;

use clap::{Parser, ValueEnum, error::ErrorKind};
use tracing_subscriber::EnvFilter;

use crate::config::{InspectConfig, LineTerminator, StratifyConfig, TimeBasis};
use crate::constants::csv::TIMESTAMP_COLUMN;
use crate::constants::{inspect, stratify};
use crate::inspect::{InspectTarget, ReportFormat, inspect_targets};
use crate::report::{format_count, format_list, rule};
use crate::stratify::{
    SampleObserver, StratifyJob, StratifyReport, YearBuckets, YearTally, create_stratified_sample,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum TimeBasisArg {
    Utc,
    Local,
}

impl From<TimeBasisArg> for TimeBasis {
    fn from(value: TimeBasisArg) -> Self {
        match value {
            TimeBasisArg::Utc => TimeBasis::Utc,
            TimeBasisArg::Local => TimeBasis::Local,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LineTerminatorArg {
    Crlf,
    Lf,
}

impl From<LineTerminatorArg> for LineTerminator {
    fn from(value: LineTerminatorArg) -> Self {
        match value {
            LineTerminatorArg::Crlf => LineTerminator::Crlf,
            LineTerminatorArg::Lf => LineTerminator::Lf,
        }
    }
}

/// CLI for `inspect_timestamps`.
///
/// Common usage:
/// - Inspect the default datasets: `inspect_timestamps`
/// - Inspect one file: `--target LGBT=datasets/4chan_lgbt_detailed.csv`
/// - Machine-readable output: `--json`
#[derive(Debug, Parser)]
#[command(
    name = "inspect_timestamps",
    disable_help_subcommand = true,
    about = "Summarise the timestamp coverage of CSV files",
    long_about = "Sample the first rows and periodic checkpoints of each CSV file, then report the row count, date range, and years present.",
    after_help = "Targets default to the bundled comment datasets when none are given. A target that cannot be read is reported and skipped."
)]
struct InspectCli {
    #[arg(
        long = "target",
        value_name = "LABEL=PATH",
        help = "File to inspect, repeat as needed; a bare PATH is labelled by its file stem"
    )]
    targets: Vec<InspectTarget>,
    #[arg(
        long = "row-cap",
        default_value_t = inspect::ROW_CAP,
        value_parser = parse_positive_u64,
        help = "Stop after examining this many rows"
    )]
    row_cap: u64,
    #[arg(
        long = "head-rows",
        default_value_t = inspect::HEAD_ROWS,
        help = "Leading rows whose timestamp is always sampled"
    )]
    head_rows: u64,
    #[arg(
        long = "checkpoint-interval",
        default_value_t = inspect::CHECKPOINT_INTERVAL,
        help = "Also sample rows at multiples of this position (0 disables)"
    )]
    checkpoint_interval: u64,
    #[arg(
        long = "timestamp-column",
        default_value = TIMESTAMP_COLUMN,
        help = "Column holding integer epoch seconds"
    )]
    timestamp_column: String,
    #[arg(
        long = "time-basis",
        value_enum,
        default_value_t = TimeBasisArg::Utc,
        help = "Clock used for dates and years"
    )]
    time_basis: TimeBasisArg,
    #[arg(long, help = "Emit one JSON object per target instead of text")]
    json: bool,
}

/// CLI for `stratified_sample`.
///
/// Common usage:
/// - Run the default jobs: `stratified_sample`
/// - Sample one file: `--job comments.csv=comments_stratified.csv`
/// - Reproducible output: `--seed 7`
#[derive(Debug, Parser)]
#[command(
    name = "stratified_sample",
    disable_help_subcommand = true,
    about = "Build year-balanced samples of CSV files",
    long_about = "Bucket every row by the calendar year of its timestamp, keep at most --target-per-year rows per year, and write the merged rows sorted by timestamp.",
    after_help = "Jobs default to the bundled comment datasets when none are given. Sampling is unseeded unless --seed is set."
)]
struct StratifyCli {
    #[arg(
        long = "job",
        value_name = "INPUT=OUTPUT",
        help = "Input file and output path, repeat as needed"
    )]
    jobs: Vec<StratifyJob>,
    #[arg(
        long = "target-per-year",
        default_value_t = stratify::TARGET_PER_YEAR,
        value_parser = parse_positive_usize,
        help = "Maximum rows kept for any calendar year"
    )]
    target_per_year: usize,
    #[arg(long, help = "Optional seed for reproducible sampling")]
    seed: Option<u64>,
    #[arg(
        long = "progress-interval",
        default_value_t = stratify::PROGRESS_INTERVAL,
        help = "Report progress every N rows read (0 disables)"
    )]
    progress_interval: u64,
    #[arg(
        long = "timestamp-column",
        default_value = TIMESTAMP_COLUMN,
        help = "Column holding integer epoch seconds"
    )]
    timestamp_column: String,
    #[arg(
        long = "time-basis",
        value_enum,
        default_value_t = TimeBasisArg::Utc,
        help = "Clock used to derive each row's year"
    )]
    time_basis: TimeBasisArg,
    #[arg(
        long = "line-terminator",
        value_enum,
        default_value_t = LineTerminatorArg::Crlf,
        help = "Row terminator for output files"
    )]
    line_terminator: LineTerminatorArg,
}

/// Install a stderr `tracing` subscriber filtered by `RUST_LOG` (default `warn`).
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

/// Run the timestamp inspector, printing reports to stdout.
pub fn run_inspect<I>(args_iter: I) -> Result<(), Box<dyn Error>>
where
    I: Iterator<Item = String>,
{
    let stdout = io::stdout();
    let mut out = stdout.lock();
    run_inspect_with_output(args_iter, &mut out)
}

/// Run the timestamp inspector, writing reports to `out`.
pub fn run_inspect_with_output<I, W>(args_iter: I, out: &mut W) -> Result<(), Box<dyn Error>>
where
    I: Iterator<Item = String>,
    W: Write,
{
    let Some(cli) = parse_cli::<InspectCli, _>(
        std::iter::once("inspect_timestamps".to_string()).chain(args_iter),
    )?
    else {
        return Ok(());
    };

    let targets = if cli.targets.is_empty() {
        inspect::DEFAULT_TARGETS
            .iter()
            .map(|(label, path)| InspectTarget::new(*label, *path))
            .collect()
    } else {
        cli.targets
    };
    let config = InspectConfig {
        row_cap: cli.row_cap,
        head_rows: cli.head_rows,
        checkpoint_interval: cli.checkpoint_interval,
        timestamp_column: Cow::Owned(cli.timestamp_column),
        time_basis: cli.time_basis.into(),
    };
    let format = if cli.json {
        ReportFormat::Json
    } else {
        ReportFormat::Text
    };

    inspect_targets(&targets, &config, format, out)?;
    out.flush()?;
    Ok(())
}

/// Run the stratified sampler, printing progress to stdout.
pub fn run_stratify<I>(args_iter: I) -> Result<(), Box<dyn Error>>
where
    I: Iterator<Item = String>,
{
    let stdout = io::stdout();
    let mut out = stdout.lock();
    run_stratify_with_output(args_iter, &mut out).map(|_| ())
}

/// Run the stratified sampler, writing progress to `out`.
///
/// Jobs run in order; the first failing job stops the run and its error is returned.
pub fn run_stratify_with_output<I, W>(
    args_iter: I,
    out: &mut W,
) -> Result<Vec<StratifyReport>, Box<dyn Error>>
where
    I: Iterator<Item = String>,
    W: Write,
{
    let Some(cli) = parse_cli::<StratifyCli, _>(
        std::iter::once("stratified_sample".to_string()).chain(args_iter),
    )?
    else {
        return Ok(Vec::new());
    };

    let jobs = if cli.jobs.is_empty() {
        stratify::DEFAULT_JOBS
            .iter()
            .map(|(label, input, output)| StratifyJob::new(*input, *output).with_label(*label))
            .collect()
    } else {
        cli.jobs
    };
    let config = StratifyConfig {
        target_per_year: cli.target_per_year,
        progress_interval: cli.progress_interval,
        timestamp_column: Cow::Owned(cli.timestamp_column),
        time_basis: cli.time_basis.into(),
        seed: cli.seed,
        terminator: cli.line_terminator.into(),
    };

    writeln!(out, "Creating stratified samples for better time distribution...")?;
    writeln!(out, "{}", rule(stratify::BANNER_WIDTH))?;

    let mut reports = Vec::with_capacity(jobs.len());
    for (idx, job) in jobs.iter().enumerate() {
        if idx > 0 {
            writeln!(out)?;
        }
        writeln!(out, "Creating stratified sample from {}...", job.input.display())?;
        let mut console = ConsoleObserver::new(&mut *out);
        let result = create_stratified_sample(&job.input, &job.output, &config, &mut console);
        console.finish()?;
        reports.push(result?);
    }

    writeln!(out)?;
    writeln!(out, "{}", rule(stratify::BANNER_WIDTH))?;
    writeln!(out, "Stratified sampling complete!")?;
    for (job, report) in jobs.iter().zip(&reports) {
        writeln!(
            out,
            "{} stratified sample: {} rows",
            job.label,
            format_count(report.rows_written as u64)
        )?;
    }
    writeln!(
        out,
        "These samples maintain time distribution across all available years."
    )?;
    out.flush()?;
    Ok(reports)
}

/// Prints sampler events as indented console lines.
///
/// The first write failure is kept and returned by `finish`; later events are dropped.
struct ConsoleObserver<'a, W: Write> {
    out: &'a mut W,
    failure: Option<io::Error>,
}

impl<'a, W: Write> ConsoleObserver<'a, W> {
    fn new(out: &'a mut W) -> Self {
        Self { out, failure: None }
    }

    fn line(&mut self, args: fmt::Arguments<'_>) {
        if self.failure.is_some() {
            return;
        }
        if let Err(err) = self.out.write_fmt(args).and_then(|_| self.out.write_all(b"\n")) {
            self.failure = Some(err);
        }
    }

    fn finish(self) -> io::Result<()> {
        match self.failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl<W: Write> SampleObserver for ConsoleObserver<'_, W> {
    fn rows_read(&mut self, rows_read: u64) {
        self.line(format_args!("  Processed {} rows...", format_count(rows_read)));
    }

    fn bucketing_finished(&mut self, buckets: &YearBuckets) {
        self.line(format_args!(
            "  Total rows processed: {}",
            format_count(buckets.rows_read())
        ));
        self.line(format_args!("  Years found: {}", format_list(buckets.years())));
    }

    fn year_sampled(&mut self, tally: &YearTally) {
        self.line(format_args!(
            "  {}: {} rows -> sampled {}",
            tally.year,
            format_count(tally.bucket_size as u64),
            format_count(tally.sampled as u64)
        ));
    }

    fn sample_written(&mut self, output: &Path, rows_written: usize) {
        self.line(format_args!(
            "  Created {} with {} rows",
            output.display(),
            format_count(rows_written as u64)
        ));
    }
}

fn parse_positive_usize(raw: &str) -> Result<usize, String> {
    let parsed = raw
        .parse::<usize>()
        .map_err(|_| format!("Could not parse '{raw}' as a positive integer"))?;
    if parsed == 0 {
        return Err("value must be greater than zero".to_string());
    }
    Ok(parsed)
}

fn parse_positive_u64(raw: &str) -> Result<u64, String> {
    let parsed = raw
        .parse::<u64>()
        .map_err(|_| format!("Could not parse '{raw}' as a positive integer"))?;
    if parsed == 0 {
        return Err("value must be greater than zero".to_string());
    }
    Ok(parsed)
}

fn parse_cli<T, I>(args: I) -> Result<Option<T>, Box<dyn Error>>
where
    T: Parser,
    I: IntoIterator,
    I::Item: Into<std::ffi::OsString> + Clone,
{
    match T::try_parse_from(args) {
        Ok(cli) => Ok(Some(cli)),
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                err.print()?;
                Ok(None)
            }
            _ => Err(err.into()),
        },
    }
}
