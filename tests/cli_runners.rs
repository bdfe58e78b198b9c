use std::fs;
use std::path::Path;

use comment_strata::apps::{run_inspect_with_output, run_stratify_with_output};

const Y2020: i64 = 1_577_836_800;
const Y2021: i64 = 1_609_459_200;

fn args(items: &[&str]) -> impl Iterator<Item = String> {
    items
        .iter()
        .map(|item| item.to_string())
        .collect::<Vec<_>>()
        .into_iter()
}

fn write_two_year_csv(path: &Path, per_year: i64) {
    let mut body = String::from("id,timestamp,body\n");
    for i in 0..per_year {
        body.push_str(&format!("{i},{},a{i}\n", Y2020 + i));
        body.push_str(&format!("{i},{},b{i}\n", Y2021 + i));
    }
    fs::write(path, body).unwrap();
}

#[test]
fn stratify_runner_prints_transcript_and_writes_samples() {
    let temp = tempfile::tempdir().unwrap();
    let input = temp.path().join("comments.csv");
    let output = temp.path().join("comments_stratified.csv");
    write_two_year_csv(&input, 6);

    let job = format!("{}={}", input.display(), output.display());
    let mut out = Vec::new();
    let reports = run_stratify_with_output(
        args(&[
            "--job",
            &job,
            "--seed",
            "1",
            "--target-per-year",
            "4",
            "--progress-interval",
            "5",
        ]),
        &mut out,
    )
    .unwrap();

    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].rows_read, 12);
    assert_eq!(reports[0].rows_written, 8);

    let rule = "=".repeat(60);
    let expected = format!(
        "Creating stratified samples for better time distribution...\n\
         {rule}\n\
         Creating stratified sample from {}...\n\
         \x20 Processed 5 rows...\n\
         \x20 Processed 10 rows...\n\
         \x20 Total rows processed: 12\n\
         \x20 Years found: [2020, 2021]\n\
         \x20 2020: 6 rows -> sampled 4\n\
         \x20 2021: 6 rows -> sampled 4\n\
         \x20 Created {} with 8 rows\n\
         \n\
         {rule}\n\
         Stratified sampling complete!\n\
         comments stratified sample: 8 rows\n\
         These samples maintain time distribution across all available years.\n",
        input.display(),
        output.display()
    );
    assert_eq!(String::from_utf8(out).unwrap(), expected);

    let written = fs::read_to_string(&output).unwrap();
    assert_eq!(written.lines().count(), 9);
    assert!(written.starts_with("id,timestamp,body\r\n"));
}

#[test]
fn stratify_runner_stops_at_first_failing_job() {
    let temp = tempfile::tempdir().unwrap();
    let missing = temp.path().join("missing.csv");
    let good = temp.path().join("good.csv");
    write_two_year_csv(&good, 2);
    let first = format!("{}={}", missing.display(), temp.path().join("a.csv").display());
    let second_output = temp.path().join("b.csv");
    let second = format!("{}={}", good.display(), second_output.display());

    let mut out = Vec::new();
    let result = run_stratify_with_output(args(&["--job", &first, "--job", &second]), &mut out);
    assert!(result.is_err());
    assert!(!second_output.exists());
}

#[test]
fn stratify_runner_rejects_invalid_arguments() {
    let mut out = Vec::new();
    assert!(run_stratify_with_output(args(&["--target-per-year", "0"]), &mut out).is_err());
    assert!(run_stratify_with_output(args(&["--job", "same.csv=same.csv"]), &mut out).is_err());
    assert!(out.is_empty());
}

#[test]
fn inspect_runner_reports_each_target() {
    let temp = tempfile::tempdir().unwrap();
    let input = temp.path().join("comments.csv");
    write_two_year_csv(&input, 3);
    let missing = temp.path().join("gone.csv");

    let first = format!("Comments={}", input.display());
    let second = format!("Gone={}", missing.display());
    let mut out = Vec::new();
    run_inspect_with_output(args(&["--target", &first, "--target", &second]), &mut out).unwrap();

    let text = String::from_utf8(out).unwrap();
    let expected_first = format!(
        "\nAnalyzing Comments ({}):\n\
         Total rows analyzed: 6\n\
         Date range: 2020-01-01 to 2021-01-01\n\
         Years present: [2020, 2021]\n",
        input.display()
    );
    assert!(text.starts_with(&expected_first));
    assert!(text.contains(&format!("Analyzing Gone ({}):\n", missing.display())));
    assert!(text.contains(&format!("Error reading {}: ", missing.display())));
}

#[test]
fn inspect_runner_honors_row_cap_and_json() {
    let temp = tempfile::tempdir().unwrap();
    let input = temp.path().join("comments.csv");
    write_two_year_csv(&input, 10);

    let target = input.display().to_string();
    let mut out = Vec::new();
    run_inspect_with_output(
        args(&["--target", &target, "--row-cap", "7", "--json"]),
        &mut out,
    )
    .unwrap();

    let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(value["target"]["label"], "comments");
    assert_eq!(value["summary"]["rows_seen"], 7);
    assert_eq!(
        value["summary"]["probed_positions"],
        serde_json::json!([0, 1, 2, 3, 4])
    );
}
