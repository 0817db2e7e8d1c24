//! Per-generation statistics records.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Fixed leading columns of every logbook.
pub const FIXED_FIELDS: [&str; 2] = ["gen", "nevals"];

/// One logbook row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Generation index (0 = initial population).
    #[serde(rename = "gen")]
    pub generation: usize,
    /// Individuals evaluated during this generation.
    pub nevals: usize,
    /// Compiled statistics, keyed by field name.
    #[serde(flatten)]
    pub stats: BTreeMap<String, f64>,
}

impl Record {
    /// Create a record without statistics.
    pub fn new(generation: usize, nevals: usize) -> Self {
        Self {
            generation,
            nevals,
            stats: BTreeMap::new(),
        }
    }

    /// Look up a field, including the fixed `gen` and `nevals` columns.
    pub fn get(&self, field: &str) -> Option<f64> {
        match field {
            "gen" => Some(self.generation as f64),
            "nevals" => Some(self.nevals as f64),
            other => self.stats.get(other).copied(),
        }
    }
}

/// Append-only sequence of records with a fixed header.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Logbook {
    header: Vec<String>,
    records: Vec<Record>,
}

impl Logbook {
    /// Create an empty logbook whose header is the fixed columns followed by
    /// `stat_fields`.
    pub fn new<I, S>(stat_fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let header = FIXED_FIELDS
            .iter()
            .map(|f| f.to_string())
            .chain(stat_fields.into_iter().map(Into::into))
            .collect();

        Self {
            header,
            records: Vec::new(),
        }
    }

    /// Column names, fixed at construction.
    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// Append a record.
    pub fn record(&mut self, record: Record) {
        self.records.push(record);
    }

    /// All records in insertion order.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Most recent record.
    pub fn last(&self) -> Option<&Record> {
        self.records.last()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Column of values for `field`, skipping records that lack it.
    pub fn select(&self, field: &str) -> Vec<f64> {
        self.records.iter().filter_map(|r| r.get(field)).collect()
    }

    /// Tab-separated header line.
    pub fn header_line(&self) -> String {
        self.header.join("\t")
    }

    /// Tab-separated record line in header order. Missing fields are blank.
    pub fn format_record(&self, record: &Record) -> String {
        self.header
            .iter()
            .map(|field| match field.as_str() {
                "gen" => record.generation.to_string(),
                "nevals" => record.nevals.to_string(),
                other => record
                    .stats
                    .get(other)
                    .map(|v| format!("{v:.6}"))
                    .unwrap_or_default(),
            })
            .collect::<Vec<_>>()
            .join("\t")
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Write the logbook to a JSON file.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let json = self.to_json()?;
        fs::write(path, json)
    }

    /// Read a logbook back from a JSON file.
    pub fn load_json<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}
