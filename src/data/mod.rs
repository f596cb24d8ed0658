use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use csv::StringRecord;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use url::Url;

use crate::logging::{log_load_failed, log_load_ok, log_load_start};
use crate::record::{Dataset, InningsRecord};

pub const EXPECTED_COLUMNS: [&str; 6] = ["match_id", "batter", "runs", "impact", "balls", "avg_pressure"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaReport {
    pub columns: Vec<String>,
    pub expected: Vec<String>,
    pub missing: Vec<String>,
    pub ok: bool,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetManifest {
    pub path: String,
    pub hash_sha256: String,
    pub row_count: u64,
    pub bad_rows: u64,
    pub columns: Vec<String>,
    pub warnings: Vec<String>,
    pub generated_at: String,
}

/// Outcome of parsing one CSV document.
#[derive(Debug, Clone)]
pub struct ParsedCsv {
    pub records: Vec<InningsRecord>,
    pub columns: Vec<String>,
    pub dropped: usize,
    pub warnings: Vec<String>,
}

impl ParsedCsv {
    pub fn into_dataset(self) -> Dataset {
        Dataset::new(self.records)
    }
}

fn csv_reader() -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .comment(Some(b'#'));
    builder
}

#[derive(Debug, Clone, Copy)]
struct ColumnMap {
    match_id: usize,
    batter: usize,
    runs: usize,
    impact: usize,
    balls: usize,
    avg_pressure: usize,
}

fn missing_columns(header: &[String]) -> Vec<String> {
    EXPECTED_COLUMNS
        .iter()
        .filter(|c| !header.iter().any(|h| h.as_str() == **c))
        .map(|c| c.to_string())
        .collect()
}

impl ColumnMap {
    fn from_header(header: &StringRecord) -> Result<Self> {
        let find = |name: &str| {
            header
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| anyhow!("missing column {:?} in header {:?}", name, header))
        };
        Ok(Self {
            match_id: find("match_id")?,
            batter: find("batter")?,
            runs: find("runs")?,
            impact: find("impact")?,
            balls: find("balls")?,
            avg_pressure: find("avg_pressure")?,
        })
    }
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn to_count(v: f64) -> u32 {
    v.max(0.0).trunc().min(u32::MAX as f64) as u32
}

fn parse_row(fields: &StringRecord, cols: &ColumnMap) -> Result<InningsRecord, String> {
    let get = |idx: usize| fields.get(idx).unwrap_or("");
    let match_id = get(cols.match_id);
    if match_id.is_empty() {
        return Err("missing match_id".to_string());
    }
    let runs = parse_number(get(cols.runs)).ok_or_else(|| format!("non-numeric runs {:?}", get(cols.runs)))?;
    Ok(InningsRecord {
        match_id: match_id.to_string(),
        batter: get(cols.batter).to_string(),
        runs: to_count(runs),
        impact: parse_number(get(cols.impact)).unwrap_or(0.0).max(0.0),
        balls: to_count(parse_number(get(cols.balls)).unwrap_or(0.0)),
        avg_pressure: parse_number(get(cols.avg_pressure)).unwrap_or(0.0).max(0.0),
    })
}

/// Parse an innings CSV. The first non-blank, non-comment record is the header.
///
/// Rows without a `match_id`, with non-numeric `runs`, or that the reader
/// cannot decode are dropped and counted; a header missing any expected
/// column is an error.
pub fn parse_innings_csv(text: &str) -> Result<ParsedCsv> {
    let mut rdr = csv_reader().from_reader(text.as_bytes());
    let header = rdr.headers().context("reading csv header")?.clone();
    if header.is_empty() {
        bail!("empty csv: no header row");
    }
    let cols = ColumnMap::from_header(&header)?;
    let columns = header.iter().map(str::to_string).collect();

    let mut records = Vec::new();
    let mut dropped = 0usize;
    let mut warnings = Vec::new();
    for (i, row) in rdr.records().enumerate() {
        let parsed = row.map_err(|e| e.to_string()).and_then(|r| parse_row(&r, &cols));
        match parsed {
            Ok(r) => records.push(r),
            Err(err) => {
                dropped += 1;
                warnings.push(format!("bad_row {}: {}", i + 1, err));
            }
        }
    }
    Ok(ParsedCsv {
        records,
        columns,
        dropped,
        warnings,
    })
}

// =============================================================================
// Sources
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    File(PathBuf),
    Http(Url),
}

impl DataSource {
    /// http(s) URLs fetch over the network; anything else is a local path.
    pub fn parse(location: &str) -> Self {
        match Url::parse(location) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => DataSource::Http(url),
            Ok(url) if url.scheme() == "file" => url
                .to_file_path()
                .map(DataSource::File)
                .unwrap_or_else(|_| DataSource::File(PathBuf::from(location))),
            _ => DataSource::File(PathBuf::from(location)),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            DataSource::File(p) => p.display().to_string(),
            DataSource::Http(u) => u.to_string(),
        }
    }
}

#[async_trait]
pub trait DatasetFetcher {
    async fn fetch_text(&self) -> Result<String>;
}

#[async_trait]
impl DatasetFetcher for DataSource {
    async fn fetch_text(&self) -> Result<String> {
        match self {
            DataSource::File(path) => tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("reading {}", path.display())),
            DataSource::Http(url) => {
                let resp = reqwest::get(url.clone()).await?;
                let status = resp.status();
                if !status.is_success() {
                    bail!("HTTP error! status: {} fetching {}", status, url);
                }
                Ok(resp.text().await?)
            }
        }
    }
}

async fn fetch_and_parse(source: &DataSource) -> Result<ParsedCsv> {
    let text = source.fetch_text().await?;
    parse_innings_csv(&text)
}

/// Fetch and parse once. Failures are logged and handed back unchanged.
pub async fn load_dataset(source: &DataSource) -> Result<Dataset> {
    let label = source.describe();
    log_load_start(&label);
    match fetch_and_parse(source).await {
        Ok(parsed) => {
            log_load_ok(&label, parsed.records.len(), parsed.dropped);
            Ok(parsed.into_dataset())
        }
        Err(err) => {
            log_load_failed(&label, &err);
            Err(err)
        }
    }
}

// =============================================================================
// Schema + manifest
// =============================================================================

pub fn read_header(path: &Path) -> Result<Vec<String>> {
    let mut rdr = csv_reader()
        .from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;
    let header = rdr.headers().with_context(|| format!("reading header of {}", path.display()))?;
    Ok(header.iter().map(str::to_string).collect())
}

pub fn validate_schema(path: &Path) -> Result<SchemaReport> {
    let header = read_header(path)?;
    let expected = EXPECTED_COLUMNS.iter().map(|s| s.to_string()).collect::<Vec<_>>();
    let missing = missing_columns(&header);
    let ok = missing.is_empty();
    let message = if ok {
        "schema ok".to_string()
    } else {
        format!("schema mismatch: missing {:?} in {:?}", missing, header)
    };
    Ok(SchemaReport {
        columns: header,
        expected,
        missing,
        ok,
        message,
    })
}

pub fn analyze_csv(path: &Path) -> Result<DatasetManifest> {
    let hash = file_sha256(path)?;
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let parsed = parse_innings_csv(&text)?;
    Ok(DatasetManifest {
        path: path.display().to_string(),
        hash_sha256: hash,
        row_count: parsed.records.len() as u64,
        bad_rows: parsed.dropped as u64,
        columns: parsed.columns,
        warnings: parsed.warnings,
        generated_at: crate::logging::ts_now(),
    })
}

pub fn file_sha256(path: &Path) -> Result<String> {
    let mut file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

pub fn default_manifest_path(dataset_path: &Path) -> PathBuf {
    let mut p = dataset_path.to_path_buf();
    let fname = dataset_path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("dataset.csv");
    p.set_file_name(format!("{}.manifest.json", fname));
    p
}
