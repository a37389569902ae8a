#![warn(missing_docs)]
//! BranchBench Core - Data and Kernels
//!
//! This crate provides everything a timed run touches:
//! - `SequenceGenerator` for value sequences with an exact branch-taken percentage
//! - `negate` / `narrow` transforms deriving the min-side and 32-bit datasets
//! - `Fixture` holding the eight datasets of one configuration
//! - the eight min/max loop and reduction kernels behind `Operation`
//!
//! Randomness always comes from an explicit `UniformSource`, so fixtures can be
//! rebuilt bit-for-bit from a seed.

mod fixture;
mod generator;
pub mod operations;
mod random;
mod transforms;

pub use fixture::{Fixture, Scratch};
pub use generator::{
    BranchSequences, ConfigError, Configuration, DEFAULT_MAX_ATTEMPTS, GenerateError, ROLL_RANGE,
    SEED_RANGE, STEP_RANGE, SequenceGenerator,
};
pub use operations::{Lane, Operation, Outcome, REDUCTION_SCALE, UnknownOperation};
pub use random::{SeededRandom, UniformSource};
pub use transforms::{narrow, negate};
