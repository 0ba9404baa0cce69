//! satbench: run a SAT solver over a grouped instance corpus.
//!
//! Groups (`data/uf20-91`, `data/uuf50-218`, ...) run in ascending order of
//! variable count, satisfiable before unsatisfiable. Ctrl-C skips the rest of
//! the current group and continues with the next one.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing::debug;

use satbench::bench::{run_bench, summary_line};
use satbench::cancel::{CancelToken, install_ctrlc};
use satbench::config::{
    CONFIG_FILE_NAME, Overrides, RunConfig, harness_root, load_file_config,
};
use satbench::corpus::load_corpus;
use satbench::exit_codes;
use satbench::logging;
use satbench::output::{OutputFormat, ResultWriter};
use satbench::progress::{BarProgress, LogProgress, ProgressObserver};
use satbench::solver::ProcessSolver;

#[derive(Parser, Debug)]
#[command(
    name = "satbench",
    version,
    about = "Run the SAT solver over the benchmark corpus and report solved instances",
    after_help = "Relative --solver and --data paths, and the default config file, resolve \
against the harness directory: the satbench crate directory this binary was built from. \
Set SATBENCH_ROOT to use another directory, e.g. after moving the binary."
)]
struct Cli {
    /// Run only groups whose name matches this regex (searched, not anchored).
    #[arg(long)]
    filter: Option<String>,

    /// Forward `-j JOBS` to the solver.
    #[arg(short, long)]
    jobs: Option<u32>,

    /// Write per-instance results to this file.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Result file format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
    format: OutputFormat,

    /// Per-instance timeout in seconds.
    #[arg(short, long)]
    timeout: Option<u64>,

    /// Solver executable (relative paths resolve against the harness directory).
    #[arg(long)]
    solver: Option<PathBuf>,

    /// Corpus root (relative paths resolve against the harness directory).
    #[arg(long)]
    data: Option<PathBuf>,

    /// Harness config file [default: <harness>/satbench.toml].
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the ordered group plan and exit without running the solver.
    #[arg(long)]
    list: bool,

    /// Report progress through tracing instead of a live progress line.
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            filter: self.filter.clone(),
            jobs: self.jobs,
            timeout_secs: self.timeout,
            solver: self.solver.clone(),
            data: self.data.clone(),
            output: self.output.clone(),
            format: self.format,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.quiet);
    if let Err(err) = run(&cli) {
        eprintln!("{:#}", err);
        std::process::exit(exit_codes::INVALID);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let root = harness_root();
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| root.join(CONFIG_FILE_NAME));
    let file_config = load_file_config(&config_path)?;
    let cwd = std::env::current_dir().context("resolve working directory")?;
    let config = RunConfig::resolve(file_config, cli.overrides(), &root, &cwd)?;
    debug!(?config, "configuration resolved");

    if cli.list {
        return list_groups(&config);
    }

    if !config.solver.exists() {
        bail!(
            "solver not found at {} (build it or pass --solver)",
            config.solver.display()
        );
    }
    let solver = ProcessSolver::new(&config.solver);

    let cancel = CancelToken::new();
    install_ctrlc(&cancel)?;

    let mut progress: Box<dyn ProgressObserver> = if cli.quiet {
        Box::new(LogProgress)
    } else {
        Box::new(BarProgress::new()?)
    };

    let mut writer = match &config.output {
        Some(path) => Some(ResultWriter::create(path, config.format)?),
        None => None,
    };

    let report = run_bench(
        &config,
        &solver,
        &cancel,
        &mut *progress,
        writer.as_mut(),
    )?;

    println!("{}", summary_line(&report.tally));
    Ok(())
}

fn list_groups(config: &RunConfig) -> Result<()> {
    for group in load_corpus(&config.data, &config.filter)? {
        let class = if group.key.unsat { "unsat" } else { "sat" };
        println!(
            "{:<16} vars={:<5} class={:<5} files={}",
            group.name,
            group.key.variables,
            class,
            group.len()
        );
    }
    Ok(())
}
