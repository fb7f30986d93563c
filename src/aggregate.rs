use std::path::Path;

use serde::Serialize;

use crate::discover::discover_logs;
use crate::errors::BenchError;
use crate::naming::NamingScheme;
use crate::timing::log_duration;
use crate::types::{Aggregation, FailurePolicy, LogCandidate, ResultRow, SkippedLog};

/// Header of the results table, in column order.
pub const CSV_HEADER: [&str; 4] = ["N", "K", "R", "time (s)"];

/// Turn every matching log file in `dir` into a result row.
///
/// Rows come out in discovery order and duplicates are kept. With
/// `FailurePolicy::Skip` a file that cannot be decoded or timed is logged and
/// recorded in `skipped`; with `FailurePolicy::Abort` its error is returned.
pub fn aggregate(
    dir: &Path,
    scheme: &NamingScheme,
    policy: FailurePolicy,
) -> Result<Aggregation, BenchError> {
    let candidates = discover_logs(dir, scheme)?;
    log::debug!(
        "found {} .{} files in {}",
        candidates.len(),
        scheme.extension,
        dir.display()
    );

    let mut aggregation = Aggregation::default();

    for candidate in &candidates {
        match process_log(candidate, scheme) {
            Ok(row) => aggregation.rows.push(row),
            Err(error) => match policy {
                FailurePolicy::Abort => return Err(error),
                FailurePolicy::Skip => {
                    log::warn!("Skipping {}: {}", candidate.name, error);
                    aggregation.skipped.push(SkippedLog {
                        path: candidate.path.clone(),
                        error,
                    });
                }
            },
        }
    }

    Ok(aggregation)
}

/// Decode the run parameters of one log file and time it.
pub fn process_log(candidate: &LogCandidate, scheme: &NamingScheme) -> Result<ResultRow, BenchError> {
    let run = scheme.decode(scheme.stem(&candidate.name))?;
    let elapsed_secs = log_duration(&candidate.path)?;

    Ok(ResultRow {
        run,
        elapsed_secs,
        path: candidate.path.clone(),
    })
}

/// Stable sort by `(N, K, R)`.
pub fn sort_rows(rows: &mut [ResultRow]) {
    rows.sort_by_key(|row| row.run);
}

#[derive(Serialize)]
struct CsvRow {
    n: u64,
    k: u64,
    r: u64,
    time_s: f64,
}

/// Write the result table to `path`, replacing whatever was there.
///
/// The header is written even when there are no rows.
pub fn write_csv(path: &Path, rows: &[ResultRow]) -> Result<(), BenchError> {
    let wrap = |source: csv::Error| BenchError::OutputWrite {
        path: path.to_path_buf(),
        source,
    };

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(wrap)?;

    writer.write_record(CSV_HEADER).map_err(wrap)?;
    for row in rows {
        writer
            .serialize(CsvRow {
                n: row.run.n,
                k: row.run.k,
                r: row.run.r,
                time_s: row.elapsed_secs,
            })
            .map_err(wrap)?;
    }
    writer.flush().map_err(|e| wrap(e.into()))?;

    Ok(())
}
