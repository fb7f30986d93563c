use std::path::PathBuf;
use std::process::ExitStatus;

#[derive(thiserror::Error, Debug)]
pub enum BenchError {
    #[error("Log directory {path} does not exist or is not a directory")]
    LogDirNotFound { path: PathBuf },

    #[error("Failed to list log directory {path}: {source}")]
    LogDirRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to read log file {path}: {source}")]
    LogRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Log file {path} is empty, no timestamps to compare")]
    EmptyLog { path: PathBuf },

    #[error("Line {line} of {path} is {len} characters long, a timestamp needs 26")]
    ShortLogLine {
        path: PathBuf,
        line: usize,
        len: usize,
    },

    #[error("Line {line} of {path} does not start with a valid timestamp '{value}': {source}")]
    BadTimestamp {
        path: PathBuf,
        line: usize,
        value: String,
        source: chrono::ParseError,
    },

    #[error("Cannot decode run parameters from filename {name}: {detail}")]
    FilenameParse { name: String, detail: String },

    #[error("Failed to launch {program} for N={n}, K={k}, R={r}: {source}")]
    LaunchFailed {
        program: String,
        n: u64,
        k: u64,
        r: u64,
        source: std::io::Error,
    },

    #[error("Run N={n}, K={k}, R={r} exited unsuccessfully ({status})")]
    RunFailed {
        n: u64,
        k: u64,
        r: u64,
        status: ExitStatus,
    },

    #[error("Failed to read config file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {detail}")]
    ConfigInvalid { detail: String },

    #[error("Failed to write results to {path}: {source}")]
    OutputWrite { path: PathBuf, source: csv::Error },
}
