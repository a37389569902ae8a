//! Benchmark Fixture
//!
//! All datasets for one configuration, built once and read by every timed call.

use crate::generator::{BranchSequences, Configuration, GenerateError, SequenceGenerator};
use crate::random::UniformSource;
use crate::transforms::{narrow, negate};

/// Derived datasets for one `(size, probability)` configuration.
///
/// The max side is the generated pair; the min side is its negation; the int
/// arrays are the low 32 bits of the long arrays. Nothing here changes after
/// construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fixture {
    config: Configuration,
    attempts: u32,

    max_long_a: Vec<i64>,
    max_long_b: Vec<i64>,
    max_int_a: Vec<i32>,
    max_int_b: Vec<i32>,

    min_long_a: Vec<i64>,
    min_long_b: Vec<i64>,
    min_int_a: Vec<i32>,
    min_int_b: Vec<i32>,
}

impl Fixture {
    /// Generate the sequences for `config` and derive every dataset from them.
    pub fn build<R>(
        config: Configuration,
        generator: &SequenceGenerator,
        rng: &mut R,
    ) -> Result<Self, GenerateError>
    where
        R: UniformSource + ?Sized,
    {
        let sequences = generator.generate(config, rng)?;
        Ok(Self::from_sequences(config, sequences))
    }

    /// Derive every dataset from already generated sequences.
    pub fn from_sequences(config: Configuration, sequences: BranchSequences) -> Self {
        let BranchSequences {
            values,
            running,
            attempts,
        } = sequences;

        let min_long_a = negate(&values);
        let min_long_b = negate(&running);

        Self {
            config,
            attempts,
            max_int_a: narrow(&values),
            max_int_b: narrow(&running),
            min_int_a: narrow(&min_long_a),
            min_int_b: narrow(&min_long_b),
            max_long_a: values,
            max_long_b: running,
            min_long_a,
            min_long_b,
        }
    }

    /// Configuration this fixture was built for
    pub fn config(&self) -> Configuration {
        self.config
    }

    /// Element count of every dataset
    pub fn size(&self) -> usize {
        self.max_long_a.len()
    }

    /// Generator attempts it took to produce the datasets
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Fresh zeroed output buffers sized for this fixture
    pub fn scratch(&self) -> Scratch {
        Scratch::new(self.size())
    }

    /// Generated values
    pub fn max_long_a(&self) -> &[i64] {
        &self.max_long_a
    }

    /// Running maximum before each generated value
    pub fn max_long_b(&self) -> &[i64] {
        &self.max_long_b
    }

    /// [`Fixture::max_long_a`] truncated to 32 bits
    pub fn max_int_a(&self) -> &[i32] {
        &self.max_int_a
    }

    /// [`Fixture::max_long_b`] truncated to 32 bits
    pub fn max_int_b(&self) -> &[i32] {
        &self.max_int_b
    }

    /// Negated [`Fixture::max_long_a`]
    pub fn min_long_a(&self) -> &[i64] {
        &self.min_long_a
    }

    /// Negated [`Fixture::max_long_b`]
    pub fn min_long_b(&self) -> &[i64] {
        &self.min_long_b
    }

    /// [`Fixture::min_long_a`] truncated to 32 bits
    pub fn min_int_a(&self) -> &[i32] {
        &self.min_int_a
    }

    /// [`Fixture::min_long_b`] truncated to 32 bits
    pub fn min_int_b(&self) -> &[i32] {
        &self.min_int_b
    }
}

/// Caller-owned output buffers reused across loop operation calls.
///
/// Not shared between threads: each thread running a fixture owns its own scratch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scratch {
    /// Output of the int loop operations
    pub ints: Vec<i32>,
    /// Output of the long loop operations
    pub longs: Vec<i64>,
}

impl Scratch {
    /// Zeroed buffers of `size` elements
    pub fn new(size: usize) -> Self {
        Self {
            ints: vec![0; size],
            longs: vec![0; size],
        }
    }
}
