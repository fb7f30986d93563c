use std::path::Path;

use crate::errors::BenchError;
use crate::naming::NamingScheme;
use crate::types::LogCandidate;

/// Discover log files directly inside `dir` whose extension matches `scheme`.
///
/// Candidates are returned in directory-listing order, which the filesystem
/// does not promise to be sorted. Subdirectories are never entered, and a
/// directory whose name happens to match is skipped. Nothing is opened here;
/// unreadable files surface later when their contents are read.
pub fn discover_logs(dir: &Path, scheme: &NamingScheme) -> Result<Vec<LogCandidate>, BenchError> {
    if !dir.is_dir() {
        return Err(BenchError::LogDirNotFound {
            path: dir.to_path_buf(),
        });
    }

    let entries = std::fs::read_dir(dir).map_err(|source| BenchError::LogDirRead {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut candidates = Vec::new();

    for entry in entries {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                log::warn!("Cannot read an entry of {}: {}", dir.display(), e);
                continue;
            }
        };

        let file_name = entry.file_name();
        if !scheme.matches(&file_name) {
            continue;
        }

        let path = entry.path();
        if path.is_dir() {
            continue;
        }

        // Non-UTF-8 names are kept lossily and fail later when decoded.
        let name = file_name.to_string_lossy().into_owned();
        candidates.push(LogCandidate { path, name });
    }

    Ok(candidates)
}
