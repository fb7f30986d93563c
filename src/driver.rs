use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde::Deserialize;

use crate::errors::BenchError;
use crate::naming::NamingScheme;
use crate::types::RunId;

pub const DEFAULT_SIZES: [u64; 7] = [2, 4, 8, 16, 32, 64, 128];

/// Parameters of a benchmark sweep.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct DriverConfig {
    /// Client executable under test.
    pub executable: String,
    /// Extra arguments placed before the generated flags.
    pub args: Vec<String>,
    pub sizes: Vec<u64>,
    pub repetitions: u64,
    pub k: u64,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            executable: "./target/debug/client".to_string(),
            args: Vec::new(),
            sizes: DEFAULT_SIZES.to_vec(),
            repetitions: 3,
            k: 0,
        }
    }
}

/// A fully resolved command line for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub run: RunId,
    pub program: String,
    pub args: Vec<OsString>,
    pub log_path: PathBuf,
}

impl Invocation {
    /// `<program> <extra args> -a<K> -r<R> -l <log path>`
    pub fn build(config: &DriverConfig, scheme: &NamingScheme, dir: &Path, n: u64) -> Self {
        let run = RunId::new(n, config.k, config.repetitions);
        let log_path = dir.join(scheme.encode(&run));

        let mut args: Vec<OsString> = config.args.iter().map(OsString::from).collect();
        args.push(format!("-a{}", run.k).into());
        args.push(format!("-r{}", run.r).into());
        args.push("-l".into());
        args.push(log_path.clone().into_os_string());

        Self {
            run,
            program: config.executable.clone(),
            args,
            log_path,
        }
    }
}

/// Starts a run and blocks until it has finished.
pub trait Launcher {
    fn launch(&mut self, invocation: &Invocation) -> Result<(), BenchError>;
}

/// Runs invocations as child processes with inherited stdio.
#[derive(Debug, Default)]
pub struct ProcessLauncher;

impl Launcher for ProcessLauncher {
    fn launch(&mut self, invocation: &Invocation) -> Result<(), BenchError> {
        let run = invocation.run;
        let status = Command::new(&invocation.program)
            .args(&invocation.args)
            .status()
            .map_err(|source| BenchError::LaunchFailed {
                program: invocation.program.clone(),
                n: run.n,
                k: run.k,
                r: run.r,
                source,
            })?;

        if !status.success() {
            return Err(BenchError::RunFailed {
                n: run.n,
                k: run.k,
                r: run.r,
                status,
            });
        }

        Ok(())
    }
}

#[derive(Debug)]
pub struct FailedRun {
    pub run: RunId,
    pub error: BenchError,
}

#[derive(Debug, Default)]
pub struct SweepReport {
    /// Runs that exited cleanly, with the log path they were given.
    pub completed: Vec<(RunId, PathBuf)>,
    pub failed: Vec<FailedRun>,
}

/// Launch one run per configured size, in order, writing logs into `dir`.
///
/// A failed run is logged and skipped; the sweep always continues and never
/// retries. Only a missing `dir` stops it before the first launch.
pub fn run_sweep<L: Launcher>(
    config: &DriverConfig,
    scheme: &NamingScheme,
    dir: &Path,
    launcher: &mut L,
) -> Result<SweepReport, BenchError> {
    if !dir.is_dir() {
        return Err(BenchError::LogDirNotFound {
            path: dir.to_path_buf(),
        });
    }

    let mut report = SweepReport::default();

    for &n in &config.sizes {
        let invocation = Invocation::build(config, scheme, dir, n);
        log::info!("Starting tests with {}.", invocation.run);

        match launcher.launch(&invocation) {
            Ok(()) => report.completed.push((invocation.run, invocation.log_path)),
            Err(error) => {
                log::warn!(
                    "Failed execution for {}. Ignoring.. ({})",
                    invocation.run,
                    error
                );
                report.failed.push(FailedRun {
                    run: invocation.run,
                    error,
                });
            }
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records invocations and fails the sizes listed in `fail_on`.
    #[derive(Default)]
    struct FakeLauncher {
        calls: Vec<Invocation>,
        fail_on: Vec<u64>,
    }

    impl Launcher for FakeLauncher {
        fn launch(&mut self, invocation: &Invocation) -> Result<(), BenchError> {
            self.calls.push(invocation.clone());
            if self.fail_on.contains(&invocation.run.n) {
                return Err(BenchError::LaunchFailed {
                    program: invocation.program.clone(),
                    n: invocation.run.n,
                    k: invocation.run.k,
                    r: invocation.run.r,
                    source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
                });
            }
            Ok(())
        }
    }

    #[test]
    fn invocation_flags() {
        let config = DriverConfig::default();
        let inv = Invocation::build(&config, &NamingScheme::default(), Path::new("logs"), 16);

        assert_eq!(inv.run, RunId::new(16, 0, 3));
        assert_eq!(inv.program, "./target/debug/client");
        assert_eq!(inv.log_path, Path::new("logs").join("n16-k0-r3.clog"));
        assert_eq!(
            inv.args,
            vec![
                OsString::from("-a0"),
                OsString::from("-r3"),
                OsString::from("-l"),
                inv.log_path.clone().into_os_string(),
            ]
        );
    }

    #[test]
    fn invocation_keeps_extra_args_first() {
        let config = DriverConfig {
            executable: "/bin/sh".to_string(),
            args: vec!["client.sh".to_string()],
            k: 2,
            repetitions: 5,
            ..DriverConfig::default()
        };
        let inv = Invocation::build(&config, &NamingScheme::default(), Path::new("."), 4);
        assert_eq!(inv.args[0], "client.sh");
        assert_eq!(inv.args[1], "-a2");
        assert_eq!(inv.args[2], "-r5");
        assert!(Path::new(&inv.args[4]).ends_with("n4-k2-r5.clog"));
    }

    #[cfg(unix)]
    #[test]
    fn log_path_argument_keeps_raw_bytes() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = Path::new(OsStr::from_bytes(b"logs-\xff"));
        let inv = Invocation::build(&DriverConfig::default(), &NamingScheme::default(), dir, 2);

        let last = inv.args.last().unwrap();
        assert_eq!(last.as_os_str(), inv.log_path.as_os_str());
        assert!(last.as_bytes().starts_with(b"logs-\xff/"));
    }

    #[test]
    fn sweep_launches_every_size_in_order() {
        let tmp = assert_fs::TempDir::new().unwrap();
        let mut launcher = FakeLauncher::default();

        let report = run_sweep(
            &DriverConfig::default(),
            &NamingScheme::default(),
            tmp.path(),
            &mut launcher,
        )
        .unwrap();

        let sizes: Vec<u64> = launcher.calls.iter().map(|c| c.run.n).collect();
        assert_eq!(sizes, DEFAULT_SIZES.to_vec());
        assert_eq!(report.completed.len(), 7);
        assert!(report.failed.is_empty());
        assert_eq!(report.completed[0].1, tmp.path().join("n2-k0-r3.clog"));
    }

    #[test]
    fn sweep_continues_after_failure() {
        let tmp = assert_fs::TempDir::new().unwrap();
        let mut launcher = FakeLauncher {
            fail_on: vec![4, 64],
            ..FakeLauncher::default()
        };

        let report = run_sweep(
            &DriverConfig::default(),
            &NamingScheme::default(),
            tmp.path(),
            &mut launcher,
        )
        .unwrap();

        assert_eq!(launcher.calls.len(), 7, "no retries, no early stop");
        let failed: Vec<u64> = report.failed.iter().map(|f| f.run.n).collect();
        assert_eq!(failed, vec![4, 64]);
        let completed: Vec<u64> = report.completed.iter().map(|(r, _)| r.n).collect();
        assert_eq!(completed, vec![2, 8, 16, 32, 128]);
    }

    #[test]
    fn sweep_requires_existing_dir() {
        let tmp = assert_fs::TempDir::new().unwrap();
        let mut launcher = FakeLauncher::default();
        let err = run_sweep(
            &DriverConfig::default(),
            &NamingScheme::default(),
            &tmp.path().join("missing"),
            &mut launcher,
        )
        .unwrap_err();

        assert!(matches!(err, BenchError::LogDirNotFound { .. }));
        assert!(launcher.calls.is_empty());
    }

    #[test]
    fn empty_size_list_launches_nothing() {
        let tmp = assert_fs::TempDir::new().unwrap();
        let mut launcher = FakeLauncher::default();
        let config = DriverConfig {
            sizes: vec![],
            ..DriverConfig::default()
        };
        let report = run_sweep(&config, &NamingScheme::default(), tmp.path(), &mut launcher).unwrap();
        assert!(report.completed.is_empty());
        assert!(launcher.calls.is_empty());
    }

    #[test]
    fn process_launcher_reports_missing_program() {
        let tmp = assert_fs::TempDir::new().unwrap();
        let config = DriverConfig {
            executable: tmp.path().join("no-such-client").to_string_lossy().into_owned(),
            ..DriverConfig::default()
        };
        let inv = Invocation::build(&config, &NamingScheme::default(), tmp.path(), 2);
        let err = ProcessLauncher.launch(&inv).unwrap_err();
        assert!(matches!(err, BenchError::LaunchFailed { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn process_launcher_reports_nonzero_exit() {
        let tmp = assert_fs::TempDir::new().unwrap();
        let config = DriverConfig {
            executable: "/bin/sh".to_string(),
            args: vec!["-c".to_string(), "exit 3".to_string(), "client".to_string()],
            ..DriverConfig::default()
        };
        let inv = Invocation::build(&config, &NamingScheme::default(), tmp.path(), 2);
        let err = ProcessLauncher.launch(&inv).unwrap_err();
        match err {
            BenchError::RunFailed { n, status, .. } => {
                assert_eq!(n, 2);
                assert_eq!(status.code(), Some(3));
            }
            other => panic!("expected RunFailed, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn process_launcher_runs_client_that_writes_log() {
        let tmp = assert_fs::TempDir::new().unwrap();
        let script = tmp.path().join("client.sh");
        std::fs::write(
            &script,
            "while [ $# -gt 0 ]; do\n  if [ \"$1\" = \"-l\" ]; then shift; log=\"$1\"; fi\n  shift\ndone\necho \"2024-01-01 00:00:00.000000 - $$\" > \"$log\"\n",
        )
        .unwrap();

        let config = DriverConfig {
            executable: "/bin/sh".to_string(),
            args: vec![script.to_string_lossy().into_owned()],
            ..DriverConfig::default()
        };
        let inv = Invocation::build(&config, &NamingScheme::default(), tmp.path(), 8);
        ProcessLauncher.launch(&inv).unwrap();
        assert!(inv.log_path.is_file());
    }
}
