#![warn(missing_docs)]
//! BranchBench CLI Library
//!
//! Sweep planning, the iteration timing loop, fixture verification and
//! report output for the min/max branch-probability benchmarks. Use
//! `branchbench::run()` (or `branchbench_cli::run()`) from a binary's `main`.
//!
//! # Example
//!
//! ```ignore
//! fn main() {
//!     if let Err(e) = branchbench_cli::run() {
//!         eprintln!("Error: {e}");
//!         std::process::exit(1);
//!     }
//! }
//! ```

mod bencher;
mod config;
mod executor;
mod measure;
mod planner;
mod report;
mod verify;

pub use bencher::{
    Bencher, BenchmarkResult, IterationSample, MAX_BATCH, MIN_BATCH_NS, Schedule,
};
pub use config::*;
pub use executor::{
    ExecutionConfig, Executor, RunRecord, SeededFixture, build_fixture, configuration_seed,
};
pub use measure::{HAS_TICK_COUNTER, Timer, pin_to_cpu};
pub use planner::{ExecutionPlan, PlanError, build_plan};
pub use report::{
    Report, ReportMeta, format_human_output, format_verify_output, generate_json_report,
};
pub use verify::{VerifyOutcome, check_fixture, verify_plan};

use anyhow::Context;
use clap::{Parser, Subcommand};
use rayon::ThreadPoolBuilder;
use regex::Regex;
use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// BranchBench CLI arguments
#[derive(Parser, Debug)]
#[command(name = "branchbench")]
#[command(
    author,
    version,
    about = "BranchBench - min/max throughput under controlled branch-taken probability"
)]
pub struct Cli {
    /// Optional subcommand (Run, List, Verify, Init); defaults to Run
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Filter operations by regex over their ids (e.g. "^long_.*_max$")
    pub filter: Option<String>,

    /// Configuration file (default: discover branchbench.toml upwards)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Sequence lengths, comma separated
    #[arg(long, value_delimiter = ',', global = true)]
    pub size: Vec<usize>,

    /// Target branch-taken percentages, comma separated
    #[arg(long, value_delimiter = ',', global = true)]
    pub probability: Vec<u32>,

    /// Output format
    #[arg(long, value_enum, global = true)]
    pub format: Option<OutputFormat>,

    /// Output file (stdout if not specified)
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    /// Base seed for reproducible fixtures
    #[arg(long, global = true)]
    pub seed: Option<u64>,

    /// Generator attempts before a configuration is given up
    #[arg(long, global = true)]
    pub max_attempts: Option<u32>,

    /// Warm-up iterations per operation
    #[arg(long, global = true)]
    pub warmup_iterations: Option<u32>,

    /// Length of each warm-up iteration (e.g. "5s", "200ms")
    #[arg(long, global = true)]
    pub warmup: Option<String>,

    /// Measured iterations per operation
    #[arg(long, global = true)]
    pub iterations: Option<u32>,

    /// Length of each measured iteration (e.g. "5s", "200ms")
    #[arg(long, global = true)]
    pub measurement: Option<String>,

    /// Pin the timing thread to this CPU (Linux only)
    #[arg(long, global = true)]
    pub pin_cpu: Option<usize>,

    /// Threads for parallel verification
    /// 0 = use all available cores (default)
    #[arg(long, short = 'j', default_value = "0", global = true)]
    pub threads: usize,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Show a progress bar while timing
    #[arg(long, global = true)]
    pub progress: bool,
}

/// CLI subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Time every selected operation against every configuration (default)
    Run,
    /// List the configurations and operations that would run
    List,
    /// Check fixture guarantees and operation results without timing
    Verify,
    /// Write a default branchbench.toml to the current directory
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Effective settings after layering branchbench.toml and CLI flags
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Sequence lengths
    pub sizes: Vec<usize>,
    /// Target percentages
    pub probabilities: Vec<u32>,
    /// Operation filter regex
    pub operations: String,
    /// Timing schedule
    pub schedule: Schedule,
    /// Base seed
    pub seed: Option<u64>,
    /// Generator attempt budget
    pub max_attempts: u32,
    /// CPU to pin the timing thread to
    pub pin_cpu: Option<usize>,
    /// Report format
    pub format: OutputFormat,
    /// Report file
    pub output: Option<PathBuf>,
}

impl Settings {
    /// Layer CLI flags over the file configuration; flags win when given.
    pub fn resolve(cli: &Cli, config: &BenchConfig) -> anyhow::Result<Self> {
        let runner = &config.runner;

        let warmup_ns = BenchConfig::parse_duration(
            cli.warmup.as_deref().unwrap_or(&runner.warmup_time),
        )
        .context("invalid warm-up time")?;
        let measurement_ns = BenchConfig::parse_duration(
            cli.measurement.as_deref().unwrap_or(&runner.measurement_time),
        )
        .context("invalid measurement time")?;

        Ok(Self {
            sizes: if cli.size.is_empty() {
                config.sweep.sizes.clone()
            } else {
                cli.size.clone()
            },
            probabilities: if cli.probability.is_empty() {
                config.sweep.probabilities.clone()
            } else {
                cli.probability.clone()
            },
            operations: cli
                .filter
                .clone()
                .unwrap_or_else(|| config.sweep.operations.clone()),
            schedule: Schedule {
                warmup_iterations: cli.warmup_iterations.unwrap_or(runner.warmup_iterations),
                warmup_ns,
                measurement_iterations: cli.iterations.unwrap_or(runner.measurement_iterations),
                measurement_ns,
            },
            seed: cli.seed.or(runner.seed),
            max_attempts: cli.max_attempts.unwrap_or(runner.max_attempts),
            pin_cpu: cli.pin_cpu.or(runner.pin_cpu),
            format: cli.format.unwrap_or(config.output.format),
            output: cli.output.clone().or_else(|| config.output.path.clone()),
        })
    }

    /// Build the execution plan these settings describe
    pub fn plan(&self) -> anyhow::Result<ExecutionPlan> {
        let filter = Regex::new(&self.operations)
            .with_context(|| format!("invalid operation filter '{}'", self.operations))?;
        Ok(build_plan(&self.sizes, &self.probabilities, Some(&filter))?)
    }
}

/// Run the BranchBench CLI with the process arguments.
///
/// # Returns
/// Returns `Ok(())` on success, or an error if something goes wrong.
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    run_with_cli(cli)
}

/// Run the BranchBench CLI with pre-parsed arguments.
pub fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    init_tracing(cli.verbose);

    if let Some(Commands::Init { force }) = cli.command {
        return init_config(force);
    }

    let config = match cli.config.clone().or_else(BenchConfig::discover) {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading configuration");
            BenchConfig::load(&path)
                .with_context(|| format!("failed to load {}", path.display()))?
        }
        None => BenchConfig::default(),
    };
    let settings = Settings::resolve(&cli, &config)?;

    match cli.command {
        Some(Commands::List) => list_plan(&settings),
        Some(Commands::Verify) => verify_configurations(&cli, &settings),
        Some(Commands::Run) | None => run_benchmarks(&cli, &settings),
        Some(Commands::Init { .. }) => Ok(()),
    }
}

/// Install the stderr subscriber; `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose {
        "branchbench=debug"
    } else {
        "branchbench=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    // A subscriber may already be installed when embedded
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn init_config(force: bool) -> anyhow::Result<()> {
    let path = PathBuf::from(CONFIG_FILE_NAME);
    if path.exists() && !force {
        anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
    }
    std::fs::write(&path, BenchConfig::default_toml())?;
    println!("Wrote {}", path.display());
    Ok(())
}

fn list_plan(settings: &Settings) -> anyhow::Result<()> {
    let plan = settings.plan()?;

    println!("BranchBench Plan:");
    for config in &plan.configurations {
        println!("├── {config}");
        for op in &plan.operations {
            println!("│   ├── {op}");
        }
    }
    println!(
        "{} configurations × {} operations = {} runs.",
        plan.configurations.len(),
        plan.operations.len(),
        plan.len()
    );

    let minimum_s = settings.schedule.minimum_ns() as f64 * plan.len() as f64 / 1e9;
    println!("Minimum timing: {minimum_s:.1}s");
    Ok(())
}

fn verify_configurations(cli: &Cli, settings: &Settings) -> anyhow::Result<()> {
    if cli.threads > 0 {
        ThreadPoolBuilder::new()
            .num_threads(cli.threads)
            .build_global()
            .ok();
    }

    let plan = settings.plan()?;
    println!(
        "Verifying {} configurations on {} threads...\n",
        plan.configurations.len(),
        rayon::current_num_threads()
    );

    let outcomes = verify_plan(&plan, settings.seed, settings.max_attempts);
    print!("{}", format_verify_output(&outcomes));

    let failed = outcomes.iter().filter(|o| !o.passed()).count();
    if failed > 0 {
        anyhow::bail!("{failed} configuration(s) failed verification");
    }
    Ok(())
}

fn run_benchmarks(cli: &Cli, settings: &Settings) -> anyhow::Result<()> {
    let plan = settings.plan()?;

    if let Some(cpu) = settings.pin_cpu {
        match pin_to_cpu(cpu) {
            Ok(()) => tracing::info!(cpu, "timing thread pinned"),
            Err(e) => tracing::warn!(cpu, "could not pin timing thread: {e}"),
        }
    }

    let seed_str = settings
        .seed
        .map(|s| format!("seed {s}"))
        .unwrap_or_else(|| "fresh seeds".to_string());
    println!(
        "Running {} operations × {} configurations ({seed_str})...\n",
        plan.operations.len(),
        plan.configurations.len(),
    );

    let start_time = Instant::now();
    let executor = Executor::new(ExecutionConfig {
        schedule: settings.schedule,
        seed: settings.seed,
        max_attempts: settings.max_attempts,
        progress: cli.progress,
    });
    let records = executor.execute(&plan)?;
    tracing::info!(
        runs = records.len(),
        elapsed_s = start_time.elapsed().as_secs_f64(),
        "sweep complete"
    );

    let report = Report::new(settings.schedule, settings.seed, records);
    let output = match settings.format {
        OutputFormat::Json => generate_json_report(&report)?,
        OutputFormat::Human => format_human_output(&report),
    };

    if let Some(ref path) = settings.output {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = std::fs::File::create(path)?;
        file.write_all(output.as_bytes())?;
        println!("Report written to: {}", path.display());
    } else {
        print!("{output}");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("branchbench").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults_come_from_config() {
        let settings = Settings::resolve(&parse(&[]), &BenchConfig::default()).unwrap();

        assert_eq!(settings.sizes, vec![100, 1000, 10000]);
        assert_eq!(settings.probabilities, vec![50, 80, 100]);
        assert_eq!(settings.operations, ".*");
        assert_eq!(settings.schedule, Schedule::default());
        assert_eq!(settings.seed, None);
        assert_eq!(settings.max_attempts, branchbench_core::DEFAULT_MAX_ATTEMPTS);
        assert_eq!(settings.format, OutputFormat::Human);
    }

    #[test]
    fn test_flags_override_config() {
        let mut config = BenchConfig::default();
        config.runner.seed = Some(1);
        config.output.format = OutputFormat::Json;

        let cli = parse(&[
            "run",
            "--size",
            "10,20",
            "--probability",
            "50",
            "--seed",
            "9",
            "--iterations",
            "2",
            "--measurement",
            "100ms",
            "--format",
            "human",
        ]);
        let settings = Settings::resolve(&cli, &config).unwrap();

        assert_eq!(cli.command, Some(Commands::Run));
        assert_eq!(settings.sizes, vec![10, 20]);
        assert_eq!(settings.probabilities, vec![50]);
        assert_eq!(settings.seed, Some(9));
        assert_eq!(settings.schedule.measurement_iterations, 2);
        assert_eq!(settings.schedule.measurement_ns, 100_000_000);
        assert_eq!(settings.schedule.warmup_ns, 5_000_000_000);
        assert_eq!(settings.format, OutputFormat::Human);
    }

    #[test]
    fn test_filter_selects_operations() {
        let settings =
            Settings::resolve(&parse(&["reduction", "--size", "100"]), &BenchConfig::default())
                .unwrap();
        let plan = settings.plan().unwrap();

        assert_eq!(plan.operations.len(), 4);
        assert!(plan.operations.iter().all(|op| !op.is_loop()));
    }

    #[test]
    fn test_bad_inputs_are_errors() {
        let config = BenchConfig::default();
        assert!(Settings::resolve(&parse(&["--warmup", "soon"]), &config).is_err());

        let settings = Settings::resolve(&parse(&["("]), &config).unwrap();
        assert!(settings.plan().is_err());

        let settings =
            Settings::resolve(&parse(&["--size", "10", "--probability", "55"]), &config).unwrap();
        let err = settings.plan().unwrap_err();
        assert!(err.to_string().contains("size=10 probability=55"));
    }

    #[test]
    fn test_init_subcommand_parses() {
        assert_eq!(
            parse(&["init", "--force"]).command,
            Some(Commands::Init { force: true })
        );
        assert_eq!(parse(&["verify"]).command, Some(Commands::Verify));
    }
}
