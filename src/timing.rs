use std::borrow::Cow;
use std::io::{BufRead, BufReader};
use std::path::Path;

use chrono::{NaiveDateTime, TimeDelta};

use crate::errors::BenchError;

/// Format of the fixed-width timestamp that starts every log line.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Characters taken from the start of a line, `YYYY-MM-DD HH:MM:SS.ffffff`.
pub const TIMESTAMP_WIDTH: usize = 26;

#[derive(thiserror::Error, Debug)]
pub enum TimestampError {
    #[error("line is {len} characters long, a timestamp needs 26")]
    TooShort { len: usize },

    #[error("'{value}' is not a valid timestamp: {source}")]
    Invalid {
        value: String,
        source: chrono::ParseError,
    },
}

/// Parse the leading timestamp of a log line.
///
/// The line must be at least `TIMESTAMP_WIDTH` characters; anything after the
/// timestamp is ignored.
pub fn parse_timestamp(line: &str) -> Result<NaiveDateTime, TimestampError> {
    let end = match line.char_indices().nth(TIMESTAMP_WIDTH) {
        Some((i, _)) => i,
        None => {
            let len = line.chars().count();
            if len < TIMESTAMP_WIDTH {
                return Err(TimestampError::TooShort { len });
            }
            line.len()
        }
    };

    let value = &line[..end];
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT).map_err(|source| {
        TimestampError::Invalid {
            value: value.to_string(),
            source,
        }
    })
}

/// Signed seconds from `start` to `end`, microsecond precision.
pub fn elapsed_secs(start: NaiveDateTime, end: NaiveDateTime) -> f64 {
    let delta: TimeDelta = end - start;
    match delta.num_microseconds() {
        Some(us) => us as f64 / 1_000_000.0,
        None => delta.num_milliseconds() as f64 / 1_000.0,
    }
}

/// Elapsed seconds between the first and last line of a log file.
///
/// A single-line log yields `0.0`. A last line stamped earlier than the first
/// gives a negative value. Lines are read as raw bytes and only the first and
/// last are decoded, so binary content in between does not matter.
pub fn log_duration(path: &Path) -> Result<f64, BenchError> {
    let read_err = |source: std::io::Error| BenchError::LogRead {
        path: path.to_path_buf(),
        source,
    };

    let (first, last, line_count) = {
        let file = std::fs::File::open(path).map_err(read_err)?;
        let mut reader = BufReader::new(file);

        let mut first: Option<Vec<u8>> = None;
        let mut last: Option<Vec<u8>> = None;
        let mut line_count = 0;
        let mut buf = Vec::new();

        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf).map_err(read_err)? == 0 {
                break;
            }
            line_count += 1;
            if first.is_none() {
                first = Some(std::mem::take(&mut buf));
            } else {
                last = Some(std::mem::take(&mut buf));
            }
        }

        (first, last, line_count)
    };

    let first = first.ok_or_else(|| BenchError::EmptyLog {
        path: path.to_path_buf(),
    })?;

    let start = stamp_at(path, &decode_line(&first), 1)?;
    let end = match &last {
        Some(line) => stamp_at(path, &decode_line(line), line_count)?,
        None => start,
    };

    Ok(elapsed_secs(start, end))
}

/// Strip the line terminator and decode lossily; invalid bytes inside the
/// timestamp then fail to parse, and anywhere after it they are ignored.
fn decode_line(raw: &[u8]) -> Cow<'_, str> {
    let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    String::from_utf8_lossy(raw)
}

fn stamp_at(path: &Path, line: &str, line_no: usize) -> Result<NaiveDateTime, BenchError> {
    parse_timestamp(line).map_err(|e| match e {
        TimestampError::TooShort { len } => BenchError::ShortLogLine {
            path: path.to_path_buf(),
            line: line_no,
            len,
        },
        TimestampError::Invalid { value, source } => BenchError::BadTimestamp {
            path: path.to_path_buf(),
            line: line_no,
            value,
            source,
        },
    })
}
