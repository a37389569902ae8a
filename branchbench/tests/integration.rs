//! Integration tests for BranchBench
//!
//! End-to-end checks from scripted draws through fixtures, operations,
//! timing and verification.

use branchbench::operations::{
    int_loop_max, int_loop_min, int_reduction_max, int_reduction_min, long_loop_max,
    long_loop_min, long_reduction_max, long_reduction_min,
};
use branchbench::{
    Configuration, ExecutionConfig, Executor, Fixture, Operation, Schedule, SeededRandom,
    SequenceGenerator, UniformSource, build_plan, check_fixture, verify_plan,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Replays a fixed list of draws
struct Scripted {
    draws: Vec<u64>,
    pos: usize,
}

impl Scripted {
    fn new(draws: &[u64]) -> Self {
        Self {
            draws: draws.to_vec(),
            pos: 0,
        }
    }
}

impl UniformSource for Scripted {
    fn below(&mut self, bound: u64) -> u64 {
        let draw = self.draws[self.pos];
        self.pos += 1;
        assert!(draw < bound, "scripted draw {draw} out of range {bound}");
        draw
    }
}

/// Ten elements at 50%: four above-rolls plus the seed element
fn half_taken_fixture() -> Fixture {
    let mut rng = Scripted::new(&[
        3, // seed max
        10, 4, // above: 3 + 4
        90, 2, // below: 7 - 3
        50, 0, // above: 7 + 0 (roll equal to P counts as above)
        51, 0, // below: 7 - 1
        0, 9, // above: 7 + 9
        100, 9, // below: 16 - 10
        75, 5, // below: 16 - 6
        25, 2, // above: 16 + 2
        60, 1, // below: 18 - 2
    ]);
    let config = Configuration::new(10, 50).unwrap();
    let fixture = Fixture::build(config, &SequenceGenerator::new(), &mut rng).unwrap();
    assert_eq!(rng.pos, rng.draws.len(), "every scripted draw consumed");
    fixture
}

#[test]
fn test_scripted_half_taken_fixture() {
    let fixture = half_taken_fixture();

    assert_eq!(fixture.attempts(), 1);
    assert_eq!(fixture.max_long_a(), &[3, 7, 4, 7, 6, 16, 6, 10, 18, 16]);
    assert_eq!(fixture.max_long_b(), &[2, 3, 7, 7, 7, 7, 16, 16, 16, 18]);
    assert_eq!(
        fixture.min_long_a(),
        &[-3, -7, -4, -7, -6, -16, -6, -10, -18, -16]
    );
    assert_eq!(fixture.max_int_b(), &[2, 3, 7, 7, 7, 7, 16, 16, 16, 18]);

    // five of ten elements reach the running max
    let taken = fixture
        .max_long_a()
        .iter()
        .zip(fixture.max_long_b())
        .filter(|&(a, b)| b <= a)
        .count();
    assert_eq!(taken, 5);
}

#[test]
fn test_scripted_operations() {
    let fixture = half_taken_fixture();
    let mut scratch = fixture.scratch();

    let expected_max = [3, 7, 7, 7, 7, 16, 16, 16, 18, 18];
    assert_eq!(int_loop_max(&fixture, &mut scratch.ints), &expected_max);
    assert_eq!(
        long_loop_max(&fixture, &mut scratch.longs),
        &expected_max.map(i64::from)
    );

    let expected_min = expected_max.map(|x: i32| -x);
    assert_eq!(int_loop_min(&fixture, &mut scratch.ints), &expected_min);
    assert_eq!(
        long_loop_min(&fixture, &mut scratch.longs),
        &expected_min.map(i64::from)
    );

    // 18 is the largest value; the fold starts from zero
    assert_eq!(int_reduction_max(&fixture), 198);
    assert_eq!(int_reduction_min(&fixture), -198);
    assert_eq!(long_reduction_max(&fixture), 198);
    assert_eq!(long_reduction_min(&fixture), -198);

    assert!(check_fixture(&fixture).is_empty());
}

#[test]
fn test_always_taken_fixture() {
    let mut rng = Scripted::new(&[4, 100, 3, 100, 0, 100, 9]);
    let config = Configuration::new(4, 100).unwrap();
    let fixture = Fixture::build(config, &SequenceGenerator::new(), &mut rng).unwrap();

    assert_eq!(fixture.max_long_a(), &[4, 7, 7, 16]);
    assert_eq!(fixture.max_long_b(), &[3, 4, 7, 7]);
    assert_eq!(long_reduction_max(&fixture), 176);
    assert!(check_fixture(&fixture).is_empty());
}

#[test]
fn test_seeded_fixtures_hold_their_ratio() {
    let mut seeds = StdRng::seed_from_u64(2024);
    for (size, probability) in [(100, 50), (100, 80), (100, 100), (1000, 50), (1000, 80)] {
        let seed: u64 = seeds.r#gen();
        let config = Configuration::new(size, probability).unwrap();
        let fixture =
            Fixture::build(config, &SequenceGenerator::new(), &mut SeededRandom::new(seed))
                .unwrap();

        assert_eq!(fixture.size(), size);
        assert_eq!(
            check_fixture(&fixture),
            Vec::<String>::new(),
            "{config} seed {seed}"
        );
    }
}

#[test]
fn test_every_operation_is_repeatable() {
    let config = Configuration::new(1000, 80).unwrap();
    let fixture =
        Fixture::build(config, &SequenceGenerator::new(), &mut SeededRandom::new(5)).unwrap();
    let mut scratch = fixture.scratch();

    for op in Operation::ALL {
        let first = op.invoke(&fixture, &mut scratch).digest();
        let second = op.invoke(&fixture, &mut scratch).digest();
        assert_eq!(first, second, "{op}");
        assert_eq!(op.id().parse::<Operation>().unwrap(), op);
    }
}

#[test]
fn test_quick_sweep_end_to_end() {
    let plan = build_plan(&[100, 1000], &[50, 100], None).unwrap();

    let outcomes = verify_plan(&plan, Some(1), 100_000);
    assert!(outcomes.iter().all(|o| o.passed()));

    let executor = Executor::new(ExecutionConfig {
        schedule: Schedule {
            warmup_iterations: 1,
            warmup_ns: 0,
            measurement_iterations: 1,
            measurement_ns: 100_000,
        },
        seed: Some(1),
        ..ExecutionConfig::default()
    });
    let records = executor.execute(&plan).unwrap();

    assert_eq!(records.len(), 32);
    for (record, outcome) in records.chunks(8).zip(&outcomes) {
        assert!(record.iter().all(|r| r.seed == outcome.seed));
        assert!(record.iter().all(|r| r.attempts == outcome.attempts));
        assert!(record.iter().all(|r| r.mean_ops_per_ms > 0.0));
    }
}
