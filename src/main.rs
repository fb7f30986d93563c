use std::path::PathBuf;
use std::process;

use anyhow::Result;
use clap::{Parser, Subcommand};

use clogbench::aggregate;
use clogbench::config::Config;
use clogbench::display;
use clogbench::driver::{self, ProcessLauncher};
use clogbench::types::{FailurePolicy, OutputFormat};

#[derive(Parser)]
#[command(
    name = "clogbench",
    version,
    about = "Sweep a benchmark client over problem sizes and tabulate run times from its logs"
)]
struct Cli {
    /// Directory holding the log files
    #[arg(short, long, global = true, default_value = ".")]
    dir: PathBuf,

    /// Config file (default: <dir>/clogbench.toml, then the user config dir)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Launch the client once per problem size, one log file per run
    Run {
        /// Client executable under test
        #[arg(short, long)]
        executable: Option<String>,

        /// Problem sizes, comma separated
        #[arg(long, value_delimiter = ',')]
        sizes: Option<Vec<u64>>,

        #[arg(short, long)]
        repetitions: Option<u64>,

        /// Secondary parameter passed as -a<K>
        #[arg(short)]
        k: Option<u64>,
    },

    /// Compute per-run elapsed time from log files and write a CSV table
    Aggregate {
        /// Results file, relative to --dir unless absolute
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Log file extension to scan for
        #[arg(long)]
        extension: Option<String>,

        /// What to do with a log that cannot be processed
        #[arg(long, value_name = "POLICY")]
        on_error: Option<FailurePolicy>,

        /// Stop at the first log that cannot be processed (same as --on-error abort)
        #[arg(long)]
        fail_fast: bool,

        /// Sort rows by N, K, R instead of directory order
        #[arg(long)]
        sort: bool,

        #[arg(long, default_value = "default")]
        format: OutputFormat,

        #[arg(long)]
        json: bool,
    },
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref(), &cli.dir)?;

    match cli.command {
        Command::Run {
            executable,
            sizes,
            repetitions,
            k,
        } => {
            if let Some(executable) = executable {
                config.driver.executable = executable;
            }
            if let Some(sizes) = sizes {
                config.driver.sizes = sizes;
            }
            if let Some(repetitions) = repetitions {
                config.driver.repetitions = repetitions;
            }
            if let Some(k) = k {
                config.driver.k = k;
            }

            let report = driver::run_sweep(
                &config.driver,
                &config.naming,
                &cli.dir,
                &mut ProcessLauncher,
            )?;

            print!("{}", display::format_sweep(&report));
        }
        Command::Aggregate {
            output,
            extension,
            on_error,
            fail_fast,
            sort,
            format,
            json,
        } => {
            if let Some(extension) = extension {
                config.naming.extension = extension;
                config.naming.validate()?;
            }
            if let Some(on_error) = on_error {
                config.aggregate.on_error = on_error;
            }
            if fail_fast {
                config.aggregate.on_error = FailurePolicy::Abort;
            }
            let output = cli.dir.join(output.unwrap_or(config.aggregate.output));

            let mut aggregation =
                aggregate::aggregate(&cli.dir, &config.naming, config.aggregate.on_error)?;
            if sort || config.aggregate.sort {
                aggregate::sort_rows(&mut aggregation.rows);
            }

            aggregate::write_csv(&output, &aggregation.rows)?;

            let text = if json {
                display::format_results_json(&aggregation)
            } else {
                match format {
                    OutputFormat::Json => display::format_results_json(&aggregation),
                    OutputFormat::Default => display::format_results(&aggregation, &output),
                }
            };

            println!("{}", text.trim_end());
        }
    }

    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(err) = run() {
        eprintln!("{}", err);
        process::exit(1);
    }
}
