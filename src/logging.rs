//! Structured JSON-lines logging.
//!
//! One JSON object per line: `ts`, `seq`, `lvl`, `component`, `event`, `msg`
//! and a `data` map. Filtering is driven by env:
//! - `LOG_LEVEL`: trace | debug | info | warn | error | fatal (default info)
//! - `LOG_DOMAINS`: comma-separated domains, or `all` (default)
//! - `LOG_FILE`: optional path; every emitted line is mirrored there
//! - `LOG_SINK`: stderr (default) | stdout
//!
//! Stdout belongs to the CLI's JSON protocol, so logs stay off it unless asked.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, OnceLock};
use std::time::Instant;

// =============================================================================
// Log Levels
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
    Fatal = 5,
}

impl Level {
    pub fn from_env() -> Self {
        std::env::var("LOG_LEVEL")
            .ok()
            .and_then(|v| Self::parse(&v))
            .unwrap_or(Level::Info)
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "trace" => Some(Level::Trace),
            "debug" => Some(Level::Debug),
            "info" => Some(Level::Info),
            "warn" => Some(Level::Warn),
            "error" => Some(Level::Error),
            "fatal" => Some(Level::Fatal),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Trace => "trace",
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
            Level::Fatal => "fatal",
        }
    }
}

// =============================================================================
// Log Domains
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Data,    // Dataset fetch, parse, validation
    Story,   // Act navigation and filter changes
    View,    // Derived-view recomputation
    System,  // Startup, shutdown
    Profile, // Timing scopes
}

impl Domain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Data => "data",
            Domain::Story => "story",
            Domain::View => "view",
            Domain::System => "system",
            Domain::Profile => "profile",
        }
    }

    pub fn is_enabled(&self) -> bool {
        match std::env::var("LOG_DOMAINS").as_deref() {
            Ok("all") | Err(_) => true,
            Ok(domains) => domains.split(',').any(|d| d.trim() == self.as_str()),
        }
    }
}

// =============================================================================
// Sinks
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sink {
    Stdout,
    Stderr,
}

impl Sink {
    pub fn from_env() -> Self {
        Self::parse(std::env::var("LOG_SINK").ok().as_deref())
    }

    pub fn parse(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_lowercase()).as_deref() {
            Some("stdout") => Sink::Stdout,
            _ => Sink::Stderr,
        }
    }
}

static LOG_SEQ: AtomicU64 = AtomicU64::new(0);
static MIRROR: OnceLock<Option<Mutex<BufWriter<File>>>> = OnceLock::new();

fn next_seq() -> u64 {
    LOG_SEQ.fetch_add(1, Ordering::SeqCst)
}

fn mirror() -> Option<&'static Mutex<BufWriter<File>>> {
    MIRROR
        .get_or_init(|| {
            let path = std::env::var("LOG_FILE").ok()?;
            match OpenOptions::new().create(true).append(true).open(&path) {
                Ok(f) => Some(Mutex::new(BufWriter::new(f))),
                Err(err) => {
                    eprintln!("[log] failed to open {}: {}", path, err);
                    None
                }
            }
        })
        .as_ref()
}

/// RFC3339 timestamp with milliseconds
pub fn ts_now() -> String {
    Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

// =============================================================================
// Core logging functions
// =============================================================================

/// Emit a structured log entry
pub fn log(level: Level, domain: Domain, event: &str, fields: Map<String, Value>) {
    if level < Level::from_env() || !domain.is_enabled() {
        return;
    }
    let line = format_record(level, domain, event, fields);
    match Sink::from_env() {
        Sink::Stdout => println!("{}", line),
        Sink::Stderr => eprintln!("{}", line),
    }
    if let Some(writer) = mirror() {
        if let Ok(mut w) = writer.lock() {
            let _ = writeln!(w, "{}", line);
            let _ = w.flush();
        }
    }
}

fn format_record(level: Level, domain: Domain, event: &str, mut fields: Map<String, Value>) -> String {
    let msg = fields.remove("msg").unwrap_or(Value::String(String::new()));
    let mut entry = Map::new();
    entry.insert("ts".to_string(), json!(ts_now()));
    entry.insert("seq".to_string(), json!(next_seq()));
    entry.insert("lvl".to_string(), json!(level.as_str().to_uppercase()));
    entry.insert("component".to_string(), json!(domain.as_str()));
    entry.insert("event".to_string(), json!(event));
    entry.insert("msg".to_string(), msg);
    entry.insert("data".to_string(), Value::Object(fields));
    Value::Object(entry).to_string()
}

// =============================================================================
// Domain-Specific Logging Helpers
// =============================================================================

pub fn log_load_start(source: &str) {
    log(
        Level::Info,
        Domain::Data,
        "load_start",
        obj(&[("source", v_str(source)), ("msg", v_str("fetching dataset"))]),
    );
}

pub fn log_load_ok(source: &str, valid: usize, dropped: usize) {
    log(
        Level::Info,
        Domain::Data,
        "load_ok",
        obj(&[
            ("source", v_str(source)),
            ("valid_rows", json!(valid)),
            ("dropped_rows", json!(dropped)),
            ("msg", v_str(&format!("parsed {} valid innings", valid))),
        ]),
    );
}

pub fn log_load_failed(source: &str, err: &anyhow::Error) {
    log(
        Level::Error,
        Domain::Data,
        "load_failed",
        obj(&[
            ("source", v_str(source)),
            ("error", v_str(&format!("{:#}", err))),
            ("msg", v_str("dataset load failed; check the configured location exists")),
        ]),
    );
}

pub fn log_act_change(from: u8, to: u8, command: &str) {
    log(
        Level::Info,
        Domain::Story,
        "act_change",
        obj(&[("from", json!(from)), ("to", json!(to)), ("command", v_str(command))]),
    );
}

pub fn log_filter_change(command: &str, filters: &Value) {
    log(
        Level::Debug,
        Domain::Story,
        "filter_change",
        obj(&[("command", v_str(command)), ("filters", filters.clone())]),
    );
}

pub fn log_command_rejected(command: &str, reason: &str) {
    log(
        Level::Warn,
        Domain::Story,
        "command_rejected",
        obj(&[("command", v_str(command)), ("reason", v_str(reason))]),
    );
}

pub fn log_view(act: u8, strategy: &str, shown: usize, anchors: usize, hash: &str) {
    log(
        Level::Debug,
        Domain::View,
        "view_derived",
        obj(&[
            ("act", json!(act)),
            ("strategy", v_str(strategy)),
            ("shown", json!(shown)),
            ("anchors", json!(anchors)),
            ("view_hash", v_str(hash)),
        ]),
    );
}

// =============================================================================
// Utility Functions
// =============================================================================

pub fn obj(pairs: &[(&str, Value)]) -> Map<String, Value> {
    let mut map = Map::new();
    for (k, v) in pairs {
        map.insert((*k).to_string(), v.clone());
    }
    map
}

pub fn v_str(s: &str) -> Value {
    Value::String(s.to_string())
}

pub fn v_num(n: f64) -> Value {
    json!(n)
}

// =============================================================================
// Profiling Scope
// =============================================================================

/// Emits elapsed time at trace level on drop.
pub struct ProfileScope {
    label: &'static str,
    context: Map<String, Value>,
    started: Instant,
}

impl ProfileScope {
    pub fn with_context(label: &'static str, fields: &[(&str, Value)]) -> Self {
        Self {
            label,
            context: obj(fields),
            started: Instant::now(),
        }
    }
}

impl Drop for ProfileScope {
    fn drop(&mut self) {
        let elapsed_ms = self.started.elapsed().as_secs_f64() * 1000.0;
        let mut fields = std::mem::take(&mut self.context);
        fields.insert("label".to_string(), v_str(self.label));
        fields.insert("elapsed_ms".to_string(), v_num(elapsed_ms));
        log(Level::Trace, Domain::Profile, "profile", fields);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_ordering() {
        assert!(Level::Trace < Level::Debug);
        assert!(Level::Debug < Level::Info);
        assert!(Level::Info < Level::Warn);
        assert!(Level::Warn < Level::Error);
        assert!(Level::Error < Level::Fatal);
    }

    #[test]
    fn test_level_parse() {
        assert_eq!(Level::parse("WARN"), Some(Level::Warn));
        assert_eq!(Level::parse(" debug "), Some(Level::Debug));
        assert_eq!(Level::parse("loud"), None);
    }

    #[test]
    fn test_obj_helper() {
        let m = obj(&[("key", v_str("value")), ("num", v_num(42.0))]);
        assert_eq!(m.get("key").unwrap(), "value");
        assert_eq!(m.get("num").unwrap(), 42.0);
    }

    #[test]
    fn test_record_shape() {
        let line = format_record(
            Level::Info,
            Domain::View,
            "view_derived",
            obj(&[("msg", v_str("hello")), ("shown", json!(3))]),
        );
        let v: Value = serde_json::from_str(&line).unwrap();
        assert_eq!(v["lvl"], "INFO");
        assert_eq!(v["component"], "view");
        assert_eq!(v["event"], "view_derived");
        assert_eq!(v["msg"], "hello");
        assert_eq!(v["data"]["shown"], 3);
        assert!(v["data"].get("msg").is_none());
    }

    #[test]
    fn test_sink_defaults_to_stderr() {
        assert_eq!(Sink::parse(None), Sink::Stderr);
        assert_eq!(Sink::parse(Some("STDOUT")), Sink::Stdout);
        assert_eq!(Sink::parse(Some("stderr")), Sink::Stderr);
        assert_eq!(Sink::parse(Some("syslog")), Sink::Stderr);
    }

    #[test]
    fn test_seq_increments() {
        let s1 = next_seq();
        let s2 = next_seq();
        assert!(s2 > s1);
    }
}
