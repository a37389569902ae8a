//! Sweep Execution
//!
//! Runs an [`ExecutionPlan`] in-process, one configuration at a time.
//!
//! ## Data Flow
//!
//! ```text
//! Configuration ──► seed ──► Fixture::build (untimed)
//!                                 │
//!                                 ▼
//!                      ┌────────────────────┐
//!   Operation ───────► │  Bencher           │  warm-up → measured iterations
//!                      │  (fixture+scratch) │
//!                      └─────────┬──────────┘
//!                                ▼
//!                            RunRecord
//! ```
//!
//! The fixture and its scratch buffers are owned by the executing thread for
//! every operation of a configuration, then dropped before the next one.

use crate::bencher::{Bencher, BenchmarkResult, Schedule};
use crate::planner::ExecutionPlan;
use branchbench_core::operations::{
    int_loop_max, int_loop_min, int_reduction_max, int_reduction_min, long_loop_max,
    long_loop_min, long_reduction_max, long_reduction_min,
};
use branchbench_core::{
    Configuration, Fixture, GenerateError, Operation, Scratch, SeededRandom, SequenceGenerator,
};
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::hint::black_box;
use std::time::Instant;

/// Settings shared by every configuration of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionConfig {
    /// Iteration schedule applied to every operation
    pub schedule: Schedule,
    /// Base seed; `None` draws a fresh seed per configuration
    pub seed: Option<u64>,
    /// Generator attempt budget
    pub max_attempts: u32,
    /// Show a progress bar on stderr
    pub progress: bool,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            schedule: Schedule::default(),
            seed: None,
            max_attempts: branchbench_core::DEFAULT_MAX_ATTEMPTS,
            progress: false,
        }
    }
}

/// Seed for `config` derived from `base`, independent of plan order.
pub fn configuration_seed(base: u64, config: Configuration) -> u64 {
    // splitmix64 finalizer over base and the configuration
    let mut z = base
        ^ (config.size() as u64).rotate_left(17)
        ^ (config.probability() as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// A fixture together with the seed it was generated from
#[derive(Debug, Clone)]
pub struct SeededFixture {
    /// The fixture
    pub fixture: Fixture,
    /// Seed of the source the fixture was drawn from
    pub seed: u64,
    /// Wall-clock generation time in nanoseconds
    pub setup_ns: u64,
}

/// Build the fixture for `config`, seeding from `base_seed` when given.
pub fn build_fixture(
    config: Configuration,
    base_seed: Option<u64>,
    max_attempts: u32,
) -> Result<SeededFixture, GenerateError> {
    let mut rng = match base_seed {
        Some(base) => SeededRandom::new(configuration_seed(base, config)),
        None => SeededRandom::from_entropy(),
    };
    let generator = SequenceGenerator::with_max_attempts(max_attempts);

    let start = Instant::now();
    let fixture = Fixture::build(config, &generator, &mut rng)?;
    let setup_ns = start.elapsed().as_nanos() as u64;

    Ok(SeededFixture {
        fixture,
        seed: rng.seed(),
        setup_ns,
    })
}

/// Result of timing one operation against one configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    /// Operation id
    pub operation: String,
    /// Sequence length
    pub size: usize,
    /// Target branch-taken percentage
    pub probability: u32,
    /// Seed the fixture was generated from
    pub seed: u64,
    /// Generator attempts the fixture took
    pub attempts: u32,
    /// Fixture generation time in nanoseconds
    pub setup_ns: u64,
    /// Digest of the operation's return value
    pub digest: i64,
    /// Mean operations per millisecond across measured iterations
    pub mean_ops_per_ms: f64,
    /// Slowest measured iteration, operations per millisecond
    pub min_ops_per_ms: f64,
    /// Fastest measured iteration, operations per millisecond
    pub max_ops_per_ms: f64,
    /// Raw warm-up and measured iterations
    pub result: BenchmarkResult,
}

/// Runs plans in-process on the calling thread
pub struct Executor {
    config: ExecutionConfig,
}

impl Executor {
    /// Create an executor
    pub fn new(config: ExecutionConfig) -> Self {
        Self { config }
    }

    /// Execute every configuration of `plan`, stopping at the first generation failure.
    pub fn execute(&self, plan: &ExecutionPlan) -> Result<Vec<RunRecord>, GenerateError> {
        let pb = if self.config.progress {
            let pb = ProgressBar::new(plan.len() as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template(
                        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
                    )
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("#>-"),
            );
            pb
        } else {
            ProgressBar::hidden()
        };

        let mut records = Vec::with_capacity(plan.len());
        for &config in &plan.configurations {
            pb.set_message(format!("{config} (generating)"));
            let seeded = build_fixture(config, self.config.seed, self.config.max_attempts)
                .inspect_err(|e| tracing::error!(%config, "fixture generation failed: {e}"))?;
            tracing::info!(
                %config,
                seed = seeded.seed,
                attempts = seeded.fixture.attempts(),
                setup_ms = seeded.setup_ns as f64 / 1e6,
                "fixture ready"
            );

            let mut scratch = seeded.fixture.scratch();
            for &op in &plan.operations {
                pb.set_message(format!("{config} {op}"));
                let record = self.execute_single(op, &seeded, &mut scratch);
                tracing::debug!(
                    %config,
                    operation = %op,
                    ops_per_ms = record.mean_ops_per_ms,
                    digest = record.digest,
                    "operation timed"
                );
                records.push(record);
                pb.inc(1);
            }
        }

        pb.finish_with_message("Complete");
        Ok(records)
    }

    /// Time one operation against an existing fixture and scratch.
    pub fn execute_single(
        &self,
        op: Operation,
        seeded: &SeededFixture,
        scratch: &mut Scratch,
    ) -> RunRecord {
        let fixture = &seeded.fixture;
        let result = time_operation(self.config.schedule, op, fixture, scratch);
        let digest = op.invoke(fixture, scratch).digest();
        let config = fixture.config();

        RunRecord {
            operation: op.id().to_string(),
            size: config.size(),
            probability: config.probability(),
            seed: seeded.seed,
            attempts: fixture.attempts(),
            setup_ns: seeded.setup_ns,
            digest,
            mean_ops_per_ms: result.mean_ops_per_ms(),
            min_ops_per_ms: result.min_ops_per_ms(),
            max_ops_per_ms: result.max_ops_per_ms(),
            result,
        }
    }
}

/// Time `op` with a dedicated closure per operation so no dispatch sits in the timed loop.
fn time_operation(
    schedule: Schedule,
    op: Operation,
    fixture: &Fixture,
    scratch: &mut Scratch,
) -> BenchmarkResult {
    let bencher = Bencher::new(schedule);
    match op {
        Operation::IntLoopMin => bencher.run(|| {
            black_box(int_loop_min(fixture, &mut scratch.ints));
        }),
        Operation::IntLoopMax => bencher.run(|| {
            black_box(int_loop_max(fixture, &mut scratch.ints));
        }),
        Operation::IntReductionMin => bencher.run(|| int_reduction_min(fixture)),
        Operation::IntReductionMax => bencher.run(|| int_reduction_max(fixture)),
        Operation::LongLoopMin => bencher.run(|| {
            black_box(long_loop_min(fixture, &mut scratch.longs));
        }),
        Operation::LongLoopMax => bencher.run(|| {
            black_box(long_loop_max(fixture, &mut scratch.longs));
        }),
        Operation::LongReductionMin => bencher.run(|| long_reduction_min(fixture)),
        Operation::LongReductionMax => bencher.run(|| long_reduction_max(fixture)),
    }
}
