use std::fmt;
use std::path::PathBuf;

use clap::ValueEnum;
use serde::Deserialize;

use crate::errors::BenchError;

/// Identifies one benchmark run: problem size, secondary parameter, repetitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RunId {
    pub n: u64,
    pub k: u64,
    pub r: u64,
}

impl RunId {
    pub fn new(n: u64, k: u64, r: u64) -> Self {
        Self { n, k, r }
    }

    pub fn get(&self, field: Field) -> u64 {
        match field {
            Field::N => self.n,
            Field::K => self.k,
            Field::R => self.r,
        }
    }

    pub(crate) fn set(&mut self, field: Field, value: u64) {
        match field {
            Field::N => self.n = value,
            Field::K => self.k = value,
            Field::R => self.r = value,
        }
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "N={}, K={}, R={}", self.n, self.k, self.r)
    }
}

/// One numeric group embedded in a run filename.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    N,
    K,
    R,
}

impl Field {
    /// Letter written in front of the number when encoding a filename.
    pub fn prefix(self) -> char {
        match self {
            Field::N => 'n',
            Field::K => 'k',
            Field::R => 'r',
        }
    }
}

/// Cheap directory-listing candidate before any file contents are read
#[derive(Debug, Clone)]
pub struct LogCandidate {
    pub path: PathBuf,
    pub name: String,
}

/// One line of the result table
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRow {
    pub run: RunId,
    pub elapsed_secs: f64,
    pub path: PathBuf,
}

/// A log file the aggregator could not turn into a row.
#[derive(Debug)]
pub struct SkippedLog {
    pub path: PathBuf,
    pub error: BenchError,
}

#[derive(Debug, Default)]
pub struct Aggregation {
    pub rows: Vec<ResultRow>,
    pub skipped: Vec<SkippedLog>,
}

#[derive(Clone, ValueEnum)]
pub enum OutputFormat {
    Default,
    Json,
}

/// What the aggregator does when a single log file cannot be processed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Report the file and carry on with the rest.
    #[default]
    Skip,
    /// Stop at the first bad file without writing any output.
    Abort,
}
