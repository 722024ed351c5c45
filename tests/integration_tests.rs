#![cfg(feature = "cli")]

use clap::Parser;
use httpmock::prelude::*;
use std::io::Read;
use tempfile::TempDir;
use therapist_finder::{CliConfig, FinderEngine, FinderError, FinderPipeline, LocalStorage};

const SAMPLE: &str = include_str!("../data/sample_candidates.csv");
const WORKBOOK: &[u8] = include_bytes!("../data/sample_candidates.xlsx");

fn cli(args: &[&str]) -> CliConfig {
    let mut argv = vec!["therapist-finder"];
    argv.extend_from_slice(args);
    CliConfig::try_parse_from(argv).unwrap()
}

async fn run(base: &str, config: CliConfig) -> therapist_finder::Result<String> {
    let storage = LocalStorage::new(base.to_string());
    let engine = FinderEngine::new(FinderPipeline::new(storage, config));
    engine.run().await
}

fn setup() -> (TempDir, String) {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join("candidates.csv"), SAMPLE).unwrap();
    let base = temp_dir.path().to_str().unwrap().to_string();
    (temp_dir, base)
}

#[tokio::test]
async fn test_end_to_end_preview() {
    let (_temp_dir, base) = setup();

    let output = run(
        &base,
        cli(&[
            "--in",
            "candidates.csv",
            "--city",
            "vancouver",
            "--price-max",
            "120",
            "--rating-min",
            "4.6",
        ]),
    )
    .await
    .unwrap();

    let lines: Vec<&str> = output.lines().collect();
    assert!(lines[0].starts_with("Name"));
    assert!(lines[1].starts_with("Ana Silva"));
    assert!(lines[2].starts_with("Farid Haddad"));
    assert_eq!(lines.last().unwrap(), &"Matched 2 of 6 candidates.");
    // 未知欄位排在最後
    assert!(lines[0].trim_end().ends_with("Website"));
}

#[tokio::test]
async fn test_end_to_end_csv_output_sorted() {
    let (temp_dir, base) = setup();

    let output = run(
        &base,
        cli(&[
            "--in",
            "candidates.csv",
            "--modalities",
            "sports",
            "--sort",
            "-rating,price",
            "--out",
            "out/shortlist.csv",
        ]),
    )
    .await
    .unwrap();

    assert_eq!(output, "Wrote 3 rows to out/shortlist.csv");

    let written = std::fs::read_to_string(temp_dir.path().join("out/shortlist.csv")).unwrap();
    let names: Vec<&str> = written
        .lines()
        .skip(1)
        .map(|l| l.split(',').next().unwrap())
        .collect();
    // Dev 沒有評分，排最後
    assert_eq!(names, vec!["Ana Silva", "Farid Haddad", "Dev Patel"]);
}

#[tokio::test]
async fn test_end_to_end_zip_output() {
    let (temp_dir, base) = setup();

    run(
        &base,
        cli(&[
            "--in",
            "candidates.csv",
            "--mobile",
            "--languages",
            "english",
            "--out",
            "shortlist.zip",
        ]),
    )
    .await
    .unwrap();

    let zip_data = std::fs::read(temp_dir.path().join("shortlist.zip")).unwrap();
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(zip_data)).unwrap();
    assert_eq!(archive.len(), 3);

    let mut json = String::new();
    archive
        .by_name("candidates.json")
        .unwrap()
        .read_to_string(&mut json)
        .unwrap();
    let records: serde_json::Value = serde_json::from_str(&json).unwrap();
    let names: Vec<&str> = records
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["Name"].as_str().unwrap())
        .collect();
    assert_eq!(
        names,
        vec!["Ana Silva", "Cleo Roy", "Elena Petrova", "Farid Haddad"]
    );
}

#[tokio::test]
async fn test_end_to_end_text_and_days() {
    let (_temp_dir, base) = setup();

    let output = run(
        &base,
        cli(&[
            "--in",
            "candidates.csv",
            "--text",
            "rmt",
            "--available",
            "sat, sun",
            "--out",
            "days.json",
        ]),
    )
    .await
    .unwrap();

    assert_eq!(output, "Wrote 2 rows to days.json");
}

#[tokio::test]
async fn test_end_to_end_remote_source() {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(GET).path("/exports/candidates.csv");
        then.status(200)
            .header("Content-Type", "text/csv")
            .body(SAMPLE);
    });

    let temp_dir = TempDir::new().unwrap();
    let url = server.url("/exports/candidates.csv");
    let output = run(
        temp_dir.path().to_str().unwrap(),
        cli(&["--in", &url, "--gender", "female", "--limit", "1"]),
    )
    .await
    .unwrap();

    api_mock.assert();
    assert!(output.contains("... 2 more rows"));
    assert!(output.ends_with("Matched 3 of 6 candidates."));
}

#[tokio::test]
async fn test_malformed_rows_are_skipped_not_fatal() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(
        temp_dir.path().join("messy.csv"),
        "Name,City,Price\nAna,Vancouver,95\nBroken,row,1,2,3\nBen,Vancouver\n",
    )
    .unwrap();

    let output = run(
        temp_dir.path().to_str().unwrap(),
        cli(&["--in", "messy.csv", "--city", "Vancouver"]),
    )
    .await
    .unwrap();

    assert!(output.ends_with("Matched 2 of 2 candidates."));
}

#[tokio::test]
async fn test_missing_input_file() {
    let temp_dir = TempDir::new().unwrap();
    let result = run(
        temp_dir.path().to_str().unwrap(),
        cli(&["--in", "nope.csv"]),
    )
    .await;

    let err = result.unwrap_err();
    assert!(matches!(err, FinderError::IoError(_)));
    assert_eq!(err.exit_code(), 3);
}

#[tokio::test]
async fn test_end_to_end_excel_input() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join("candidates.xlsx"), WORKBOOK).unwrap();

    let output = run(
        temp_dir.path().to_str().unwrap(),
        cli(&[
            "--in",
            "candidates.xlsx",
            "--modalities",
            "sports",
            "--sort",
            "-price",
            "--out",
            "shortlist.csv",
        ]),
    )
    .await
    .unwrap();
    assert_eq!(output, "Wrote 3 rows to shortlist.csv");

    let written = std::fs::read_to_string(temp_dir.path().join("shortlist.csv")).unwrap();
    let names: Vec<&str> = written
        .lines()
        .skip(1)
        .map(|l| l.split(',').next().unwrap())
        .collect();
    // Dev 的價格是 n/a，排最後
    assert_eq!(names, vec!["Farid Haddad", "Ana Silva", "Dev Patel"]);
}

#[tokio::test]
async fn test_inverted_price_range_matches_nothing() {
    let (_temp_dir, base) = setup();

    let output = run(
        &base,
        cli(&[
            "--in",
            "candidates.csv",
            "--price-min",
            "150",
            "--price-max",
            "100",
        ]),
    )
    .await
    .unwrap();

    assert!(output.ends_with("Matched 0 of 6 candidates."));
}

#[tokio::test]
async fn test_unknown_output_extension_is_rejected() {
    let (_temp_dir, base) = setup();
    let result = run(&base, cli(&["--in", "candidates.csv", "--out", "shortlist.pdf"])).await;

    assert!(matches!(
        result,
        Err(FinderError::UnsupportedFormatError { format }) if format == "pdf"
    ));
}
