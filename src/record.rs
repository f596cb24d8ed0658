// Innings records and the loaded-once dataset they live in.

use serde::{Deserialize, Serialize};

/// One batting performance by one player in one match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InningsRecord {
    pub match_id: String,
    pub batter: String,
    pub runs: u32,
    pub impact: f64,
    pub balls: u32,
    pub avg_pressure: f64,
}

impl InningsRecord {
    pub fn new(
        match_id: impl Into<String>,
        batter: impl Into<String>,
        runs: u32,
        impact: f64,
        balls: u32,
        avg_pressure: f64,
    ) -> Self {
        Self {
            match_id: match_id.into(),
            batter: batter.into(),
            runs,
            impact,
            balls,
            avg_pressure,
        }
    }
}

/// Ordered, read-only sequence of innings.
///
/// Built once by the loader and only ever borrowed afterwards; the view
/// engine selects and annotates records but never mutates them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    records: Vec<InningsRecord>,
}

impl Dataset {
    pub fn new(records: Vec<InningsRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[InningsRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, InningsRecord> {
        self.records.iter()
    }
}

impl From<Vec<InningsRecord>> for Dataset {
    fn from(records: Vec<InningsRecord>) -> Self {
        Self::new(records)
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a InningsRecord;
    type IntoIter = std::slice::Iter<'a, InningsRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
