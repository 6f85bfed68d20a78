//! Run log: the CSV file the renderer appends one row to after each run.
//!
//! This crate only reads it. A missing file means no run has happened yet.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Columns every run log must carry. Git hash and per-phase timings are
/// optional.
pub const REQUIRED_COLUMNS: [&str; 12] = [
    "Platform",
    "Architecture",
    "Implementation",
    "Filename",
    "Width",
    "Height",
    "Samples",
    "Bounces",
    "Rays",
    "Triangles",
    "Spheres",
    "Total Duration (ms)",
];

#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("missing column '{0}'")]
    MissingColumn(String),
    #[error(transparent)]
    Csv(#[from] csv::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum RunLogError {
    #[error("cannot read run log {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("run log {} is corrupt: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: SchemaError,
    },
}

/// One row of the run log, written by the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    #[serde(rename = "Platform")]
    pub platform: String,
    #[serde(rename = "Architecture")]
    pub architecture: String,
    #[serde(rename = "Git Hash", default)]
    pub git_hash: Option<String>,
    #[serde(rename = "Implementation")]
    pub implementation: String,
    #[serde(rename = "Filename")]
    pub filename: String,
    #[serde(rename = "Width")]
    pub width: u32,
    #[serde(rename = "Height")]
    pub height: u32,
    #[serde(rename = "Samples")]
    pub samples: u32,
    #[serde(rename = "Bounces")]
    pub bounces: u32,
    #[serde(rename = "Rays")]
    pub rays: u64,
    #[serde(rename = "Triangles")]
    pub triangles: u64,
    #[serde(rename = "Spheres")]
    pub spheres: u64,
    #[serde(rename = "Encoding(ms)", default)]
    pub encoding_ms: Option<f64>,
    #[serde(rename = "Raytracing(ms)", default)]
    pub raytracing_ms: Option<f64>,
    #[serde(rename = "Decoding(ms)", default)]
    pub decoding_ms: Option<f64>,
    #[serde(rename = "Total Duration (ms)")]
    pub total_ms: f64,
}

impl RunRecord {
    /// `rays × bounces × triangles`. Saturates instead of wrapping.
    pub fn workload(&self) -> u64 {
        self.rays
            .saturating_mul(u64::from(self.bounces))
            .saturating_mul(self.triangles)
    }
}

/// Prior runs, in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunLog {
    records: Vec<RunRecord>,
}

impl RunLog {
    pub fn new(records: Vec<RunRecord>) -> Self {
        Self { records }
    }

    /// Load the log at `path`. A missing file is an empty history.
    pub fn load(path: &Path) -> Result<Self, RunLogError> {
        let file = match std::fs::File::open(path) {
            Ok(file) => file,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no run log yet, starting from empty history");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(RunLogError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        let log = Self::from_reader(file).map_err(|source| RunLogError::Corrupt {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), records = log.len(), "loaded run log");
        Ok(log)
    }

    /// Parse CSV with a header row. Fails when a required column is missing
    /// or on the first row that does not fit the schema.
    pub fn from_reader<R: std::io::Read>(reader: R) -> Result<Self, SchemaError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = csv_reader.headers()?;
        if let Some(missing) = REQUIRED_COLUMNS
            .iter()
            .find(|column| !headers.iter().any(|h| h == **column))
        {
            return Err(SchemaError::MissingColumn(missing.to_string()));
        }

        let records = csv_reader
            .deserialize()
            .collect::<Result<Vec<RunRecord>, _>>()?;
        Ok(Self { records })
    }

    pub fn records(&self) -> &[RunRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
