//! Probabilistic Sequence Generator
//!
//! Produces a sequence of values paired with the running maximum seen before
//! each one, such that the share of "new maximum" outcomes is exactly the
//! requested percentage.
//!
//! Each attempt walks the sequence once:
//! - index 0 is seeded from `[0, 10)` with a running value one below it, so it
//!   always counts as taken
//! - every later index rolls `[0, 101)`; a roll `<= probability` adds `[0, 10)`
//!   to the current maximum, anything else subtracts `[1, 10]` from it
//!
//! Attempts whose realized percentage (`taken * 100 / size`, integer division)
//! differs from the target are thrown away whole. Approximate matches are never
//! accepted.

use crate::random::UniformSource;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Exclusive upper bound of the seed value at index 0
pub const SEED_RANGE: u64 = 10;

/// Exclusive upper bound of the per-index percentage roll
pub const ROLL_RANGE: u64 = 101;

/// Exclusive upper bound of the increment/decrement draw (the decrement adds 1)
pub const STEP_RANGE: u64 = 10;

/// Attempts made before [`SequenceGenerator::generate`] gives up
pub const DEFAULT_MAX_ATTEMPTS: u32 = 100_000;

/// Rejected `(size, probability)` pairs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Size of zero
    #[error("Sequence size must be positive")]
    ZeroSize,

    /// Probability above 100
    #[error("Probability {0} is outside 0..=100")]
    ProbabilityOutOfRange(u32),

    /// No taken count in `[1, size]` gives exactly `probability` percent
    #[error("Probability {probability}% can never be realized exactly with {size} elements")]
    Unreachable {
        /// Requested size
        size: usize,
        /// Requested percentage
        probability: u32,
    },
}

/// Generation failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerateError {
    /// Invalid configuration
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Attempt budget ran out before an exact match
    #[error("No sequence matched {probability}% for size {size} after {attempts} attempts")]
    AttemptsExhausted {
        /// Requested size
        size: usize,
        /// Requested percentage
        probability: u32,
        /// Attempts made
        attempts: u32,
    },
}

/// One benchmark configuration: sequence length and target branch-taken percentage.
///
/// Only reachable pairs can be constructed, so generation for a `Configuration`
/// is expected to terminate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RawConfiguration")]
pub struct Configuration {
    size: usize,
    probability: u32,
}

#[derive(Deserialize)]
struct RawConfiguration {
    size: usize,
    probability: u32,
}

impl TryFrom<RawConfiguration> for Configuration {
    type Error = ConfigError;

    fn try_from(raw: RawConfiguration) -> Result<Self, Self::Error> {
        Configuration::new(raw.size, raw.probability)
    }
}

impl Configuration {
    /// Validate and build a configuration.
    pub fn new(size: usize, probability: u32) -> Result<Self, ConfigError> {
        if size == 0 {
            return Err(ConfigError::ZeroSize);
        }
        if probability > 100 {
            return Err(ConfigError::ProbabilityOutOfRange(probability));
        }
        if !Self::is_reachable(size, probability) {
            return Err(ConfigError::Unreachable { size, probability });
        }
        Ok(Self { size, probability })
    }

    /// Whether some taken count in `[1, size]` yields exactly `probability` percent.
    pub fn is_reachable(size: usize, probability: u32) -> bool {
        if size == 0 || probability > 100 {
            return false;
        }
        // percent(taken) is monotone in taken, so the smallest taken reaching
        // the target decides it
        let target = probability as u128;
        let size = size as u128;
        let taken = (target * size).div_ceil(100).max(1);
        taken <= size && taken * 100 / size == target
    }

    /// Sequence length
    pub fn size(&self) -> usize {
        self.size
    }

    /// Target branch-taken percentage
    pub fn probability(&self) -> u32 {
        self.probability
    }
}

impl std::fmt::Display for Configuration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "size={} probability={}%", self.size, self.probability)
    }
}

/// Accepted output of the generator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchSequences {
    /// Generated values, left to right
    pub values: Vec<i64>,
    /// Running maximum before each value was considered
    pub running: Vec<i64>,
    /// Attempts consumed, including the accepted one
    pub attempts: u32,
}

impl BranchSequences {
    /// Indices where the value reaches or exceeds the running maximum
    pub fn taken_count(&self) -> usize {
        self.values
            .iter()
            .zip(&self.running)
            .filter(|(value, running)| running <= value)
            .count()
    }

    /// `taken_count * 100 / len`, integer division
    pub fn realized_percent(&self) -> u32 {
        match self.values.len() {
            0 => 0,
            n => (self.taken_count() * 100 / n) as u32,
        }
    }

    /// Sequence length
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the sequences are empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Rejection-sampling generator with a bounded attempt budget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceGenerator {
    max_attempts: u32,
}

impl Default for SequenceGenerator {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl SequenceGenerator {
    /// Generator with [`DEFAULT_MAX_ATTEMPTS`]
    pub fn new() -> Self {
        Self::default()
    }

    /// Generator that gives up after `max_attempts` (at least one attempt is always made)
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
        }
    }

    /// Attempt budget
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Validate `(size, probability)` and generate for it.
    pub fn generate_for<R>(
        &self,
        size: usize,
        probability: u32,
        rng: &mut R,
    ) -> Result<BranchSequences, GenerateError>
    where
        R: UniformSource + ?Sized,
    {
        let config = Configuration::new(size, probability)?;
        self.generate(config, rng)
    }

    /// Draw attempts until one realizes `config.probability()` exactly.
    pub fn generate<R>(
        &self,
        config: Configuration,
        rng: &mut R,
    ) -> Result<BranchSequences, GenerateError>
    where
        R: UniformSource + ?Sized,
    {
        let size = config.size();
        let probability = config.probability();
        let mut values = Vec::with_capacity(size);
        let mut running = Vec::with_capacity(size);

        for attempt in 1..=self.max_attempts {
            let above = fill_attempt(probability, size, rng, &mut values, &mut running);
            let realized = (above + 1) * 100 / size;
            if realized == probability as usize {
                return Ok(BranchSequences {
                    values,
                    running,
                    attempts: attempt,
                });
            }
        }

        Err(GenerateError::AttemptsExhausted {
            size,
            probability,
            attempts: self.max_attempts,
        })
    }
}

/// Run one attempt into the given buffers, returning the above-branch count
/// (index 0 excluded).
fn fill_attempt<R>(
    probability: u32,
    size: usize,
    rng: &mut R,
    values: &mut Vec<i64>,
    running: &mut Vec<i64>,
) -> usize
where
    R: UniformSource + ?Sized,
{
    values.clear();
    running.clear();

    let mut max = rng.below(SEED_RANGE) as i64;
    values.push(max);
    running.push(max.wrapping_sub(1));

    let mut above = 0;
    for _ in 1..size {
        let value = if rng.below(ROLL_RANGE) <= probability as u64 {
            above += 1;
            max.wrapping_add(rng.below(STEP_RANGE) as i64)
        } else {
            max.wrapping_sub(rng.below(STEP_RANGE) as i64 + 1)
        };
        values.push(value);
        running.push(max);
        max = max.max(value);
    }

    above
}
