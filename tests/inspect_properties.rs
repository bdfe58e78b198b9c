use std::fs;
use std::path::Path;

use comment_strata::{
    InspectConfig, InspectTarget, ReportFormat, inspect_path, inspect_reader, inspect_targets,
};

const Y2018: i64 = 1_514_764_800;

fn write_timestamps(path: &Path, count: usize, start: i64, step: i64) {
    let mut body = String::from("id,timestamp,body\n");
    for idx in 0..count {
        body.push_str(&format!("{idx},{},text\n", start + step * idx as i64));
    }
    fs::write(path, body).unwrap();
}

#[test]
fn row_cap_bounds_reported_total() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("big.csv");
    write_timestamps(&path, 60_000, Y2018, 1_200);

    let summary = inspect_path(&path, &InspectConfig::default()).unwrap();
    assert_eq!(summary.rows_seen, 50_000);
    assert!(summary.to_string().starts_with("Total rows analyzed: 50,000\n"));
}

#[test]
fn probed_positions_follow_head_and_checkpoint_rule() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("big.csv");
    write_timestamps(&path, 60_000, Y2018, 1_200);

    let summary = inspect_path(&path, &InspectConfig::default()).unwrap();
    assert_eq!(
        summary.probed_positions,
        vec![0, 1, 2, 3, 4, 10_000, 20_000, 30_000, 40_000]
    );
    assert_eq!(summary.timestamps.len(), 9);
    assert_eq!(summary.timestamps[0], Y2018);
    assert_eq!(*summary.timestamps.last().unwrap(), Y2018 + 1_200 * 40_000);
    // 40,000 * 20 minutes spans into 2019
    assert_eq!(
        summary.years.iter().copied().collect::<Vec<_>>(),
        vec![2018, 2019]
    );
}

#[test]
fn short_file_counts_every_row() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("small.csv");
    write_timestamps(&path, 8, Y2018, 86_400);

    let summary = inspect_path(&path, &InspectConfig::default()).unwrap();
    assert_eq!(summary.rows_seen, 8);
    assert_eq!(summary.probed_positions, vec![0, 1, 2, 3, 4]);
    let range = summary.date_range.unwrap();
    assert_eq!(range.earliest.to_string(), "2018-01-01");
    assert_eq!(range.latest.to_string(), "2018-01-05");
}

#[test]
fn malformed_timestamp_is_counted_but_excluded_from_years() {
    let input = "id,timestamp\n0,1609459200\n1,not_a_number\n2,1640995200\n3,1577836800\n";
    let summary = inspect_reader(input.as_bytes(), &InspectConfig::default()).unwrap();
    assert_eq!(summary.rows_seen, 4);
    assert_eq!(
        summary.years.iter().copied().collect::<Vec<_>>(),
        vec![2020, 2021, 2022]
    );
    assert_eq!(
        summary.to_string(),
        "Total rows analyzed: 4\nDate range: 2020-01-01 to 2022-01-01\nYears present: [2020, 2021, 2022]"
    );
}

#[test]
fn driver_reports_failures_and_continues() {
    let temp = tempfile::tempdir().unwrap();
    let good = temp.path().join("good.csv");
    write_timestamps(&good, 3, Y2018, 60);
    let missing = temp.path().join("missing.csv");

    let targets = vec![
        InspectTarget::new("Missing", &missing),
        InspectTarget::new("Good", &good),
    ];
    let mut out = Vec::new();
    let outcomes = inspect_targets(
        &targets,
        &InspectConfig::default(),
        ReportFormat::Text,
        &mut out,
    )
    .unwrap();

    assert_eq!(outcomes.len(), 2);
    assert!(outcomes[0].summary.is_none());
    assert!(outcomes[0].error.is_some());
    assert_eq!(outcomes[1].summary.as_ref().unwrap().rows_seen, 3);

    let text = String::from_utf8(out).unwrap();
    assert!(text.contains(&format!("Analyzing Missing ({}):", missing.display())));
    assert!(text.contains(&format!("Error reading {}: ", missing.display())));
    assert!(text.contains(&format!("Analyzing Good ({}):", good.display())));
    assert!(text.contains("Total rows analyzed: 3\nDate range: 2018-01-01 to 2018-01-01"));
}

#[test]
fn driver_reports_undecodable_files() {
    let temp = tempfile::tempdir().unwrap();
    let broken = temp.path().join("broken.csv");
    fs::write(&broken, b"timestamp,body\n1514764800,\xff\xfe\n").unwrap();

    let mut out = Vec::new();
    let outcomes = inspect_targets(
        &[InspectTarget::new("Broken", &broken)],
        &InspectConfig::default(),
        ReportFormat::Text,
        &mut out,
    )
    .unwrap();
    assert!(outcomes[0].error.is_some());
    assert!(
        String::from_utf8(out)
            .unwrap()
            .contains("Error reading")
    );
}

#[test]
fn json_format_emits_one_object_per_target() {
    let temp = tempfile::tempdir().unwrap();
    let good = temp.path().join("good.csv");
    write_timestamps(&good, 2, Y2018, 60);
    let missing = temp.path().join("missing.csv");

    let mut out = Vec::new();
    inspect_targets(
        &[
            InspectTarget::new("Good", &good),
            InspectTarget::new("Missing", &missing),
        ],
        &InspectConfig::default(),
        ReportFormat::Json,
        &mut out,
    )
    .unwrap();

    let text = String::from_utf8(out).unwrap();
    let lines: Vec<serde_json::Value> = text
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["target"]["label"], "Good");
    assert_eq!(lines[0]["summary"]["rows_seen"], 2);
    assert_eq!(lines[0]["summary"]["date_range"]["earliest"], "2018-01-01");
    assert!(lines[1].get("summary").is_none());
    assert!(lines[1]["error"].is_string());
}
