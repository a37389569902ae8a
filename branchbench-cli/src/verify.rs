//! Fixture Verification
//!
//! Checks the data-level guarantees of every planned configuration without
//! timing anything. Configurations are spread over rayon workers; each worker
//! builds and checks its own fixture, so nothing is shared between threads.

use crate::executor::build_fixture;
use crate::planner::ExecutionPlan;
use branchbench_core::operations::{
    int_loop_max, int_loop_min, int_reduction_max, int_reduction_min, long_loop_max,
    long_loop_min, long_reduction_max, long_reduction_min,
};
use branchbench_core::{Configuration, Fixture, Operation};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Verification result for one configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyOutcome {
    /// Configuration checked
    pub config: Configuration,
    /// Seed the fixture was generated from (0 if generation failed)
    pub seed: u64,
    /// Generator attempts (0 if generation failed)
    pub attempts: u32,
    /// Failed checks, empty when everything holds
    pub failures: Vec<String>,
}

impl VerifyOutcome {
    /// Whether every check held
    pub fn passed(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Build and check a fixture for every configuration of `plan`, in parallel.
///
/// Outcomes come back in plan order.
pub fn verify_plan(
    plan: &ExecutionPlan,
    base_seed: Option<u64>,
    max_attempts: u32,
) -> Vec<VerifyOutcome> {
    plan.configurations
        .par_iter()
        .map(|&config| match build_fixture(config, base_seed, max_attempts) {
            Ok(seeded) => {
                let failures = check_fixture(&seeded.fixture);
                if failures.is_empty() {
                    tracing::debug!(%config, "fixture verified");
                } else {
                    tracing::warn!(%config, failed = failures.len(), "fixture verification failed");
                }
                VerifyOutcome {
                    config,
                    seed: seeded.seed,
                    attempts: seeded.fixture.attempts(),
                    failures,
                }
            }
            Err(e) => VerifyOutcome {
                config,
                seed: 0,
                attempts: 0,
                failures: vec![format!("generation: {e}")],
            },
        })
        .collect()
}

/// Check every guarantee a fixture makes; returns one message per failed check.
pub fn check_fixture(fixture: &Fixture) -> Vec<String> {
    let mut failures = Vec::new();
    let config = fixture.config();
    let size = fixture.size();

    if size != config.size() {
        failures.push(format!("size {size} != configured {}", config.size()));
        return failures;
    }

    // Branch-taken ratio, max side (value reaches running max) and min side
    let max_taken = count_pairs(fixture.max_long_a(), fixture.max_long_b(), |a, b| b <= a);
    let min_taken = count_pairs(fixture.min_long_a(), fixture.min_long_b(), |a, b| a <= b);
    for (side, taken) in [("max", max_taken), ("min", min_taken)] {
        let realized = taken * 100 / size;
        if realized != config.probability() as usize {
            failures.push(format!(
                "{side} side realizes {realized}%, expected {}%",
                config.probability()
            ));
        }
    }

    // Derived datasets
    let negated = |max: &[i64], min: &[i64]| {
        max.iter().zip(min).all(|(&hi, &lo)| lo == hi.wrapping_neg())
    };
    if !negated(fixture.max_long_a(), fixture.min_long_a())
        || !negated(fixture.max_long_b(), fixture.min_long_b())
    {
        failures.push("min side is not the negated max side".to_string());
    }

    let narrowed =
        |long: &[i64], int: &[i32]| long.iter().zip(int).all(|(&l, &i)| l as i32 == i);
    if !narrowed(fixture.max_long_a(), fixture.max_int_a())
        || !narrowed(fixture.max_long_b(), fixture.max_int_b())
        || !narrowed(fixture.min_long_a(), fixture.min_int_a())
        || !narrowed(fixture.min_long_b(), fixture.min_int_b())
    {
        failures.push("int arrays are not the truncated long arrays".to_string());
    }

    // Loop operations, pointwise
    let mut scratch = fixture.scratch();
    let pointwise = [
        (
            Operation::IntLoopMin,
            pointwise_ok(
                int_loop_min(fixture, &mut scratch.ints),
                fixture.min_int_a(),
                fixture.min_int_b(),
                Ord::min,
            ),
        ),
        (
            Operation::IntLoopMax,
            pointwise_ok(
                int_loop_max(fixture, &mut scratch.ints),
                fixture.max_int_a(),
                fixture.max_int_b(),
                Ord::max,
            ),
        ),
        (
            Operation::LongLoopMin,
            pointwise_ok(
                long_loop_min(fixture, &mut scratch.longs),
                fixture.min_long_a(),
                fixture.min_long_b(),
                Ord::min,
            ),
        ),
        (
            Operation::LongLoopMax,
            pointwise_ok(
                long_loop_max(fixture, &mut scratch.longs),
                fixture.max_long_a(),
                fixture.max_long_b(),
                Ord::max,
            ),
        ),
    ];
    for (op, ok) in pointwise {
        if !ok {
            failures.push(format!("{op} is not pointwise"));
        }
    }

    // Reductions against a sequential reference
    let reductions = [
        (
            Operation::IntReductionMin,
            int_reduction_min(fixture) as i64,
            reference_fold(fixture.min_int_a(), |x| x.wrapping_mul(11), Ord::min) as i64,
        ),
        (
            Operation::IntReductionMax,
            int_reduction_max(fixture) as i64,
            reference_fold(fixture.max_int_a(), |x| x.wrapping_mul(11), Ord::max) as i64,
        ),
        (
            Operation::LongReductionMin,
            long_reduction_min(fixture),
            reference_fold(fixture.min_long_a(), |x| x.wrapping_mul(11), Ord::min),
        ),
        (
            Operation::LongReductionMax,
            long_reduction_max(fixture),
            reference_fold(fixture.max_long_a(), |x| x.wrapping_mul(11), Ord::max),
        ),
    ];
    for (op, got, expected) in reductions {
        if got != expected {
            failures.push(format!("{op} returned {got}, reference {expected}"));
        }
    }

    // Repeated calls must agree despite the reused buffers
    for op in Operation::ALL {
        let first = op.invoke(fixture, &mut scratch).digest();
        let second = op.invoke(fixture, &mut scratch).digest();
        if first != second {
            failures.push(format!("{op} is not idempotent ({first} then {second})"));
        }
    }

    failures
}

fn count_pairs(a: &[i64], b: &[i64], taken: impl Fn(i64, i64) -> bool) -> usize {
    a.iter().zip(b).filter(|&(&x, &y)| taken(x, y)).count()
}

fn pointwise_ok<T: Copy + Eq>(out: &[T], a: &[T], b: &[T], pick: fn(T, T) -> T) -> bool {
    out.len() == a.len()
        && out
            .iter()
            .zip(a.iter().zip(b))
            .all(|(&o, (&x, &y))| o == pick(x, y))
}

fn reference_fold<T: Copy + Default>(a: &[T], scale: fn(T) -> T, pick: fn(T, T) -> T) -> T {
    let mut acc = T::default();
    for &x in a {
        acc = pick(acc, scale(x));
    }
    acc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::build_plan;
    use branchbench_core::{BranchSequences, SeededRandom, SequenceGenerator};

    #[test]
    fn test_generated_fixture_passes() {
        let config = Configuration::new(1000, 80).unwrap();
        let fixture =
            Fixture::build(config, &SequenceGenerator::new(), &mut SeededRandom::new(1)).unwrap();
        assert_eq!(check_fixture(&fixture), Vec::<String>::new());
    }

    #[test]
    fn test_wrong_ratio_is_reported() {
        // Every value a new max (100%) but labelled as a 50% configuration
        let config = Configuration::new(4, 50).unwrap();
        let sequences = BranchSequences {
            values: vec![1, 2, 3, 4],
            running: vec![0, 1, 2, 3],
            attempts: 1,
        };
        let failures = check_fixture(&Fixture::from_sequences(config, sequences));

        assert_eq!(failures.len(), 2);
        assert!(failures[0].contains("max side realizes 100%"));
        assert!(failures[1].contains("min side realizes 100%"));
    }

    #[test]
    fn test_verify_plan_in_order() {
        let plan = build_plan(&[100, 1000], &[50, 80, 100], None).unwrap();
        let outcomes = verify_plan(&plan, Some(42), 100_000);

        assert_eq!(outcomes.len(), 6);
        for (outcome, config) in outcomes.iter().zip(&plan.configurations) {
            assert_eq!(outcome.config, *config);
            assert!(outcome.passed(), "{config}: {:?}", outcome.failures);
            assert!(outcome.attempts >= 1);
        }
    }
}
