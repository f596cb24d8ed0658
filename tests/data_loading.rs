use innings_story::data::{
    analyze_csv, file_sha256, load_dataset, parse_innings_csv, validate_schema, DataSource,
};
use innings_story::session::{Command, Outcome, StorySession};
use innings_story::state::StoryAct;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const HEADER: &str = "match_id,batter,runs,impact,balls,avg_pressure";

fn write_csv(path: &Path, header: &str, rows: &[&str]) {
    let mut out = String::new();
    out.push_str(header);
    out.push('\n');
    for row in rows {
        out.push_str(row);
        out.push('\n');
    }
    fs::write(path, out).unwrap();
}

#[test]
fn schema_accepts_good_header() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("good.csv");
    write_csv(&path, HEADER, &["1,A,30,70,20,1.0"]);
    let report = validate_schema(&path).unwrap();
    assert!(report.ok, "{}", report.message);
    assert!(report.missing.is_empty());
}

#[test]
fn schema_rejects_missing_columns() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.csv");
    write_csv(&path, "match_id,batter,runs", &["1,A,30"]);
    let report = validate_schema(&path).unwrap();
    assert!(!report.ok);
    assert_eq!(report.missing, vec!["impact", "balls", "avg_pressure"]);
}

#[test]
fn manifest_counts_bad_rows_and_hashes_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("season.csv");
    write_csv(&path, HEADER, &["1,A,30,70,20,1.0", ",B,10,5,8,0.2", "3,C,n/a,5,8,0.2", "4,D,55,66,30,2.1"]);
    let manifest = analyze_csv(&path).unwrap();
    assert_eq!(manifest.row_count, 2);
    assert_eq!(manifest.bad_rows, 2);
    assert_eq!(manifest.warnings.len(), 2);
    assert_eq!(manifest.hash_sha256, file_sha256(&path).unwrap());
    assert_eq!(manifest.hash_sha256.len(), 64);
}

#[test]
fn hash_changes_with_content() {
    let dir = TempDir::new().unwrap();
    let a = dir.path().join("a.csv");
    let b = dir.path().join("b.csv");
    write_csv(&a, HEADER, &["1,A,30,70,20,1.0"]);
    write_csv(&b, HEADER, &["1,A,31,70,20,1.0"]);
    assert_ne!(file_sha256(&a).unwrap(), file_sha256(&b).unwrap());
}

#[tokio::test]
async fn load_from_file_feeds_session() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("innings_impact.csv");
    write_csv(&path, HEADER, &["1,A,30,70,20,1.0", "2,B,100,160,60,2.8", "3,\"Smith, J\",50,40,35,0.2"]);
    let source = DataSource::parse(path.to_str().unwrap());
    let dataset = load_dataset(&source).await.unwrap();
    assert_eq!(dataset.len(), 3);
    assert_eq!(dataset.records()[2].batter, "Smith, J");

    let mut session = StorySession::new(StoryAct::FIRST);
    assert!(matches!(session.apply(Command::Next), Outcome::Rejected(_)));
    let first = session.finish_loading(dataset).clone();
    assert_eq!(first.shown, 2);
    assert_eq!(session.apply(Command::Next), Outcome::Changed);
    assert_eq!(session.summary().unwrap().shown, 3);
}

#[tokio::test]
async fn missing_file_is_a_load_failure() {
    let dir = TempDir::new().unwrap();
    let source = DataSource::parse(dir.path().join("absent.csv").to_str().unwrap());
    assert!(load_dataset(&source).await.is_err());
}

#[tokio::test]
async fn header_without_required_columns_fails_whole_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("partial.csv");
    write_csv(&path, "match_id,runs", &["1,30"]);
    let source = DataSource::parse(path.to_str().unwrap());
    let err = load_dataset(&source).await.unwrap_err();
    assert!(err.to_string().contains("missing column"));
}

#[test]
fn empty_body_is_an_empty_dataset() {
    let parsed = parse_innings_csv(&format!("{}\n", HEADER)).unwrap();
    assert!(parsed.records.is_empty());
    assert_eq!(parsed.dropped, 0);
}
