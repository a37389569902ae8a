//! Bencher - Iteration Timing
//!
//! Follows the warm-up/measurement iteration model:
//! - an iteration invokes the operation back to back until its time budget elapses
//! - warm-up iterations are recorded separately and never reported as results
//! - throughput is operations per millisecond of each measured iteration
//!
//! Calls are issued in batches so the clock is read once per batch rather than
//! once per call. The batch doubles until one batch takes at least
//! [`MIN_BATCH_NS`], then stays put for the rest of the run.

use crate::measure::Timer;
use serde::{Deserialize, Serialize};
use std::hint::black_box;

/// A batch shorter than this is doubled before the next clock read
pub const MIN_BATCH_NS: u64 = 10_000;

/// Upper bound on calls between clock reads
pub const MAX_BATCH: u64 = 1 << 20;

/// Warm-up and measurement iteration counts and lengths
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    /// Iterations run and discarded before measuring
    pub warmup_iterations: u32,
    /// Budget of each warm-up iteration in nanoseconds
    pub warmup_ns: u64,
    /// Iterations whose throughput is reported
    pub measurement_iterations: u32,
    /// Budget of each measured iteration in nanoseconds
    pub measurement_ns: u64,
}

impl Default for Schedule {
    fn default() -> Self {
        Self {
            warmup_iterations: 3,
            warmup_ns: 5_000_000_000,
            measurement_iterations: 4,
            measurement_ns: 5_000_000_000,
        }
    }
}

impl Schedule {
    /// Lower bound on wall-clock time spent timing one operation
    pub fn minimum_ns(&self) -> u64 {
        self.warmup_iterations as u64 * self.warmup_ns
            + self.measurement_iterations as u64 * self.measurement_ns
    }
}

/// One timed iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IterationSample {
    /// Operation calls made
    pub operations: u64,
    /// Wall-clock nanoseconds
    pub elapsed_ns: u64,
    /// CPU ticks (0 without a tick counter)
    pub ticks: u64,
}

impl IterationSample {
    /// Calls per millisecond
    pub fn ops_per_ms(&self) -> f64 {
        if self.elapsed_ns == 0 {
            return 0.0;
        }
        self.operations as f64 * 1e6 / self.elapsed_ns as f64
    }

    /// Average nanoseconds per call
    pub fn ns_per_op(&self) -> f64 {
        if self.operations == 0 {
            return 0.0;
        }
        self.elapsed_ns as f64 / self.operations as f64
    }
}

/// Samples from one operation run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkResult {
    /// Warm-up iterations, excluded from every figure below
    pub warmup: Vec<IterationSample>,
    /// Measured iterations
    pub samples: Vec<IterationSample>,
}

impl BenchmarkResult {
    /// Calls made across measured iterations
    pub fn total_operations(&self) -> u64 {
        self.samples.iter().map(|s| s.operations).sum()
    }

    /// Mean of the per-iteration throughputs
    pub fn mean_ops_per_ms(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.samples.iter().map(|s| s.ops_per_ms()).sum::<f64>() / self.samples.len() as f64
    }

    /// Lowest per-iteration throughput
    pub fn min_ops_per_ms(&self) -> f64 {
        self.samples
            .iter()
            .map(|s| s.ops_per_ms())
            .reduce(f64::min)
            .unwrap_or(0.0)
    }

    /// Highest per-iteration throughput
    pub fn max_ops_per_ms(&self) -> f64 {
        self.samples
            .iter()
            .map(|s| s.ops_per_ms())
            .reduce(f64::max)
            .unwrap_or(0.0)
    }
}

/// Runs one operation through its warm-up and measured iterations.
pub struct Bencher {
    schedule: Schedule,
    batch: u64,
}

impl Bencher {
    /// Create a bencher for `schedule`
    pub fn new(schedule: Schedule) -> Self {
        Self { schedule, batch: 1 }
    }

    /// Calls issued between clock reads at this point
    pub fn batch(&self) -> u64 {
        self.batch
    }

    /// Run every warm-up iteration, then every measured iteration, of `f`.
    pub fn run<T, F>(mut self, mut f: F) -> BenchmarkResult
    where
        F: FnMut() -> T,
    {
        let warmup = (0..self.schedule.warmup_iterations)
            .map(|_| self.iteration(self.schedule.warmup_ns, &mut f))
            .collect();
        let samples = (0..self.schedule.measurement_iterations)
            .map(|_| self.iteration(self.schedule.measurement_ns, &mut f))
            .collect();

        BenchmarkResult { warmup, samples }
    }

    /// Call `f` in batches until `budget_ns` has elapsed; at least one batch runs.
    pub fn iteration<T, F>(&mut self, budget_ns: u64, f: &mut F) -> IterationSample
    where
        F: FnMut() -> T,
    {
        let timer = Timer::start();
        let mut operations = 0u64;
        let mut last_ns = 0u64;

        loop {
            for _ in 0..self.batch {
                black_box(f());
            }
            operations += self.batch;

            let (elapsed_ns, ticks) = timer.elapsed();
            if elapsed_ns >= budget_ns {
                return IterationSample {
                    operations,
                    elapsed_ns,
                    ticks,
                };
            }

            if elapsed_ns - last_ns < MIN_BATCH_NS && self.batch < MAX_BATCH {
                self.batch *= 2;
            }
            last_ns = elapsed_ns;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instant_schedule(warmup_iterations: u32, measurement_iterations: u32) -> Schedule {
        Schedule {
            warmup_iterations,
            warmup_ns: 0,
            measurement_iterations,
            measurement_ns: 0,
        }
    }

    #[test]
    fn test_zero_budget_runs_one_batch() {
        let mut bencher = Bencher::new(instant_schedule(0, 1));
        let mut calls = 0u64;
        let sample = bencher.iteration(0, &mut || calls += 1);

        assert_eq!(sample.operations, 1);
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_iteration_counts_every_call() {
        let mut bencher = Bencher::new(Schedule::default());
        let mut calls = 0u64;
        let sample = bencher.iteration(2_000_000, &mut || {
            calls += 1;
            calls
        });

        assert_eq!(sample.operations, calls);
        assert!(sample.elapsed_ns >= 2_000_000);
        assert!(bencher.batch() > 1, "cheap calls should grow the batch");
        assert!(bencher.batch() <= MAX_BATCH);
    }

    #[test]
    fn test_run_separates_warmup() {
        let result = Bencher::new(instant_schedule(3, 4)).run(|| 42u64);

        assert_eq!(result.warmup.len(), 3);
        assert_eq!(result.samples.len(), 4);
        assert_eq!(result.total_operations(), 4);
    }

    #[test]
    fn test_throughput_figures() {
        let result = BenchmarkResult {
            warmup: vec![IterationSample {
                operations: 1,
                elapsed_ns: 1,
                ticks: 0,
            }],
            samples: vec![
                IterationSample {
                    operations: 2_000,
                    elapsed_ns: 1_000_000,
                    ticks: 0,
                },
                IterationSample {
                    operations: 4_000,
                    elapsed_ns: 1_000_000,
                    ticks: 0,
                },
            ],
        };

        assert_eq!(result.total_operations(), 6_000);
        assert_eq!(result.mean_ops_per_ms(), 3_000.0);
        assert_eq!(result.min_ops_per_ms(), 2_000.0);
        assert_eq!(result.max_ops_per_ms(), 4_000.0);
        assert_eq!(result.samples[0].ns_per_op(), 500.0);
    }

    #[test]
    fn test_empty_result() {
        let result = BenchmarkResult::default();
        assert_eq!(result.mean_ops_per_ms(), 0.0);
        assert_eq!(result.min_ops_per_ms(), 0.0);

        let idle = IterationSample {
            operations: 0,
            elapsed_ns: 0,
            ticks: 0,
        };
        assert_eq!(idle.ops_per_ms(), 0.0);
        assert_eq!(idle.ns_per_op(), 0.0);
    }

    #[test]
    fn test_schedule_minimum() {
        assert_eq!(Schedule::default().minimum_ns(), 35_000_000_000);
    }
}
