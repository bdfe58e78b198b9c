/// Constants shared by every CSV pass.
pub mod csv {
    /// Column holding integer epoch seconds.
    pub const TIMESTAMP_COLUMN: &str = "timestamp";
}

/// Constants used by the timestamp inspector.
pub mod inspect {
    /// Maximum number of rows examined before the pass stops.
    pub const ROW_CAP: u64 = 50_000;
    /// Leading rows whose timestamp is always probed.
    pub const HEAD_ROWS: u64 = 5;
    /// Rows at exact multiples of this position are probed as checkpoints.
    pub const CHECKPOINT_INTERVAL: u64 = 10_000;
    /// Default analysis targets as `(label, path)`.
    pub const DEFAULT_TARGETS: [(&str, &str); 2] = [
        ("LGBT", "datasets/4chan_lgbt_detailed.csv"),
        ("4tran", "datasets/4tran_comments_filtered.csv"),
    ];
}

/// Constants used by the per-year stratified sampler.
pub mod stratify {
    /// Maximum rows kept for any calendar year.
    pub const TARGET_PER_YEAR: usize = 10_000;
    /// Rows read between progress events during the bucketing pass.
    pub const PROGRESS_INTERVAL: u64 = 50_000;
    /// Default sampling jobs as `(label, input, output)`.
    pub const DEFAULT_JOBS: [(&str, &str, &str); 2] = [
        (
            "LGBT",
            "datasets/4chan_lgbt_detailed.csv",
            "datasets/lgbt_stratified.csv",
        ),
        (
            "4tran",
            "datasets/4tran_comments_filtered.csv",
            "datasets/r4tran_stratified.csv",
        ),
    ];
    /// Width of the banner rule printed around a batch of jobs.
    pub const BANNER_WIDTH: usize = 60;
}
