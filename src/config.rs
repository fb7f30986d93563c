use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::driver::DriverConfig;
use crate::errors::BenchError;
use crate::naming::NamingScheme;
use crate::types::FailurePolicy;

/// Name of the config file looked up inside the log directory.
pub const LOCAL_CONFIG_NAME: &str = "clogbench.toml";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct AggregateConfig {
    /// Results file, relative to the log directory unless absolute.
    pub output: PathBuf,
    pub on_error: FailurePolicy,
    pub sort: bool,
}

impl Default for AggregateConfig {
    fn default() -> Self {
        Self {
            output: PathBuf::from("results.csv"),
            on_error: FailurePolicy::Skip,
            sort: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct Config {
    pub driver: DriverConfig,
    pub naming: NamingScheme,
    pub aggregate: AggregateConfig,
}

impl Config {
    pub fn from_toml(path: &Path, text: &str) -> Result<Self, BenchError> {
        let config: Config = toml::from_str(text).map_err(|source| BenchError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        config.naming.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, BenchError> {
        let text = std::fs::read_to_string(path).map_err(|source| BenchError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(path, &text)
    }

    /// Load configuration for a run against `dir`.
    ///
    /// An explicit path must exist. Otherwise `<dir>/clogbench.toml` is tried,
    /// then `<config dir>/clogbench/config.toml`, then built-in defaults.
    pub fn load(explicit: Option<&Path>, dir: &Path) -> Result<Self, BenchError> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        match find_config(dir) {
            Some(path) => {
                log::debug!("using config {}", path.display());
                Self::from_file(&path)
            }
            None => Ok(Self::default()),
        }
    }
}

fn find_config(dir: &Path) -> Option<PathBuf> {
    let local = dir.join(LOCAL_CONFIG_NAME);
    if local.is_file() {
        return Some(local);
    }

    let user = dirs::config_dir()?.join("clogbench").join("config.toml");
    user.is_file().then_some(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Field;
    use std::fs;

    #[test]
    fn empty_file_gives_defaults() {
        let config = Config::from_toml(Path::new("x.toml"), "").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.driver.sizes, vec![2, 4, 8, 16, 32, 64, 128]);
        assert_eq!(config.driver.repetitions, 3);
        assert_eq!(config.driver.k, 0);
        assert_eq!(config.naming.extension, "clog");
        assert_eq!(config.aggregate.output, PathBuf::from("results.csv"));
        assert_eq!(config.aggregate.on_error, FailurePolicy::Skip);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let text = r#"
[driver]
executable = "/opt/bench/client"
sizes = [1, 2, 3]

[naming]
fields = ["r", "n", "k"]

[aggregate]
on_error = "abort"
sort = true
"#;
        let config = Config::from_toml(Path::new("x.toml"), text).unwrap();
        assert_eq!(config.driver.executable, "/opt/bench/client");
        assert_eq!(config.driver.sizes, vec![1, 2, 3]);
        assert_eq!(config.driver.repetitions, 3);
        assert_eq!(config.naming.fields, vec![Field::R, Field::N, Field::K]);
        assert_eq!(config.naming.extension, "clog");
        assert_eq!(config.aggregate.on_error, FailurePolicy::Abort);
        assert!(config.aggregate.sort);
    }

    #[test]
    fn unknown_keys_rejected() {
        let err = Config::from_toml(Path::new("x.toml"), "[driver]\nsize = [2]\n").unwrap_err();
        assert!(matches!(err, BenchError::ConfigParse { .. }));
    }

    #[test]
    fn invalid_scheme_rejected() {
        let err =
            Config::from_toml(Path::new("x.toml"), "[naming]\nfields = [\"n\", \"k\"]\n").unwrap_err();
        assert!(matches!(err, BenchError::ConfigInvalid { .. }));
    }

    #[test]
    fn from_file_reads_toml() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[driver]\nrepetitions = 10\nargs = [\"--quiet\"]").unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.driver.repetitions, 10);
        assert_eq!(config.driver.args, vec!["--quiet".to_string()]);
    }

    #[test]
    fn explicit_missing_file_is_error() {
        let tmp = assert_fs::TempDir::new().unwrap();
        let err = Config::load(Some(&tmp.path().join("nope.toml")), tmp.path()).unwrap_err();
        assert!(matches!(err, BenchError::ConfigRead { .. }));
    }

    #[test]
    fn local_config_in_log_dir_is_used() {
        let tmp = assert_fs::TempDir::new().unwrap();
        fs::write(
            tmp.path().join(LOCAL_CONFIG_NAME),
            "[aggregate]\noutput = \"times.csv\"\n",
        )
        .unwrap();

        let config = Config::load(None, tmp.path()).unwrap();
        assert_eq!(config.aggregate.output, PathBuf::from("times.csv"));
    }

    #[test]
    fn explicit_path_wins_over_local() {
        let tmp = assert_fs::TempDir::new().unwrap();
        fs::write(tmp.path().join(LOCAL_CONFIG_NAME), "[driver]\nk = 1\n").unwrap();
        let other = tmp.path().join("other.toml");
        fs::write(&other, "[driver]\nk = 9\n").unwrap();

        let config = Config::load(Some(&other), tmp.path()).unwrap();
        assert_eq!(config.driver.k, 9);
    }
}
