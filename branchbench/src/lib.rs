#![warn(missing_docs)]
//! # BranchBench
//!
//! Micro-benchmarks for min/max selection over data whose branch-taken rate
//! is fixed in advance.
//!
//! Each configuration pairs a sequence length with a target percentage. The
//! generator draws a random walk in which exactly that percentage of elements
//! reach a new running maximum, and eight operations are timed against it:
//! - pointwise `min`/`max` loops over `i32` and `i64` arrays
//! - scaled `min`/`max` reductions over `i32` and `i64` arrays
//!
//! ## Quick Start
//!
//! ```ignore
//! fn main() {
//!     if let Err(e) = branchbench::run() {
//!         eprintln!("Error: {e}");
//!         std::process::exit(1);
//!     }
//! }
//! ```
//!
//! ## Building a Fixture Directly
//!
//! ```ignore
//! use branchbench::prelude::*;
//!
//! let config = Configuration::new(1000, 80)?;
//! let fixture = Fixture::build(config, &SequenceGenerator::new(), &mut SeededRandom::new(7))?;
//! let mut scratch = fixture.scratch();
//! let digest = Operation::IntLoopMax.invoke(&fixture, &mut scratch).digest();
//! ```

// Re-export core types
pub use branchbench_core::{
    BranchSequences, ConfigError, Configuration, DEFAULT_MAX_ATTEMPTS, Fixture, GenerateError,
    Lane, Operation, Outcome, REDUCTION_SCALE, Scratch, SeededRandom, SequenceGenerator,
    UniformSource, UnknownOperation, narrow, negate, operations,
};

// Re-export runner types
pub use branchbench_cli::{
    BenchConfig, Bencher, BenchmarkResult, ExecutionConfig, ExecutionPlan, Executor,
    IterationSample, OutputFormat, Report, RunRecord, Schedule, VerifyOutcome, build_plan,
    check_fixture, verify_plan,
};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        Configuration, Fixture, Operation, Scratch, SeededRandom, SequenceGenerator,
        UniformSource,
    };
}

/// Run the BranchBench CLI.
///
/// Call this from a binary's `main()`:
/// ```ignore
/// fn main() {
///     branchbench::run().unwrap();
/// }
/// ```
pub use branchbench_cli::run;
