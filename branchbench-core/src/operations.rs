//! Benchmark Operations
//!
//! The eight timed kernels. Each is a single left-to-right pass:
//! - loop operations write `min(a[i], b[i])` / `max(a[i], b[i])` into a caller
//!   provided buffer and hand that buffer back
//! - reductions fold `11 * a[i]` from an accumulator of zero
//!
//! Arithmetic wraps on overflow; nothing here allocates.

use crate::fixture::{Fixture, Scratch};
use std::fmt;
use std::str::FromStr;

/// Factor applied to every element before a reduction folds it
pub const REDUCTION_SCALE: i32 = 11;

/// Fixed-width integer lane the kernels run over
pub trait Lane: Copy + Ord + Default {
    /// `REDUCTION_SCALE * self`, wrapping
    fn scaled(self) -> Self;
}

impl Lane for i32 {
    #[inline(always)]
    fn scaled(self) -> Self {
        self.wrapping_mul(REDUCTION_SCALE)
    }
}

impl Lane for i64 {
    #[inline(always)]
    fn scaled(self) -> Self {
        self.wrapping_mul(REDUCTION_SCALE as i64)
    }
}

/// Pointwise minimum of `a` and `b` into `out`.
///
/// # Panics
/// If `b` or `out` is shorter than `a`.
#[inline]
pub fn loop_min<'o, T: Lane>(a: &[T], b: &[T], out: &'o mut [T]) -> &'o [T] {
    let n = a.len();
    let (b, out) = (&b[..n], &mut out[..n]);
    for ((o, &x), &y) in out.iter_mut().zip(a).zip(b) {
        *o = x.min(y);
    }
    out
}

/// Pointwise maximum of `a` and `b` into `out`.
///
/// # Panics
/// If `b` or `out` is shorter than `a`.
#[inline]
pub fn loop_max<'o, T: Lane>(a: &[T], b: &[T], out: &'o mut [T]) -> &'o [T] {
    let n = a.len();
    let (b, out) = (&b[..n], &mut out[..n]);
    for ((o, &x), &y) in out.iter_mut().zip(a).zip(b) {
        *o = x.max(y);
    }
    out
}

/// Minimum of zero and every scaled element of `a`.
#[inline]
pub fn reduction_min<T: Lane>(a: &[T]) -> T {
    let mut result = T::default();
    for &x in a {
        result = result.min(x.scaled());
    }
    result
}

/// Maximum of zero and every scaled element of `a`.
#[inline]
pub fn reduction_max<T: Lane>(a: &[T]) -> T {
    let mut result = T::default();
    for &x in a {
        result = result.max(x.scaled());
    }
    result
}

/// `min(minIntA[i], minIntB[i])` into `out`
pub fn int_loop_min<'o>(fixture: &Fixture, out: &'o mut [i32]) -> &'o [i32] {
    loop_min(fixture.min_int_a(), fixture.min_int_b(), out)
}

/// `max(maxIntA[i], maxIntB[i])` into `out`
pub fn int_loop_max<'o>(fixture: &Fixture, out: &'o mut [i32]) -> &'o [i32] {
    loop_max(fixture.max_int_a(), fixture.max_int_b(), out)
}

/// Scaled minimum over `minIntA`
pub fn int_reduction_min(fixture: &Fixture) -> i32 {
    reduction_min(fixture.min_int_a())
}

/// Scaled maximum over `maxIntA`
pub fn int_reduction_max(fixture: &Fixture) -> i32 {
    reduction_max(fixture.max_int_a())
}

/// `min(minLongA[i], minLongB[i])` into `out`
pub fn long_loop_min<'o>(fixture: &Fixture, out: &'o mut [i64]) -> &'o [i64] {
    loop_min(fixture.min_long_a(), fixture.min_long_b(), out)
}

/// `max(maxLongA[i], maxLongB[i])` into `out`
pub fn long_loop_max<'o>(fixture: &Fixture, out: &'o mut [i64]) -> &'o [i64] {
    loop_max(fixture.max_long_a(), fixture.max_long_b(), out)
}

/// Scaled minimum over `minLongA`
pub fn long_reduction_min(fixture: &Fixture) -> i64 {
    reduction_min(fixture.min_long_a())
}

/// Scaled maximum over `maxLongA`
pub fn long_reduction_max(fixture: &Fixture) -> i64 {
    reduction_max(fixture.max_long_a())
}

/// The eight benchmark operations, by name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Operation {
    /// See [`int_loop_min`]
    IntLoopMin,
    /// See [`int_loop_max`]
    IntLoopMax,
    /// See [`int_reduction_min`]
    IntReductionMin,
    /// See [`int_reduction_max`]
    IntReductionMax,
    /// See [`long_loop_min`]
    LongLoopMin,
    /// See [`long_loop_max`]
    LongLoopMax,
    /// See [`long_reduction_min`]
    LongReductionMin,
    /// See [`long_reduction_max`]
    LongReductionMax,
}

impl Operation {
    /// Every operation, in reporting order
    pub const ALL: [Operation; 8] = [
        Operation::IntLoopMax,
        Operation::IntLoopMin,
        Operation::IntReductionMax,
        Operation::IntReductionMin,
        Operation::LongLoopMax,
        Operation::LongLoopMin,
        Operation::LongReductionMax,
        Operation::LongReductionMin,
    ];

    /// Stable identifier used for filtering and reports
    pub fn id(self) -> &'static str {
        match self {
            Operation::IntLoopMin => "int_loop_min",
            Operation::IntLoopMax => "int_loop_max",
            Operation::IntReductionMin => "int_reduction_min",
            Operation::IntReductionMax => "int_reduction_max",
            Operation::LongLoopMin => "long_loop_min",
            Operation::LongLoopMax => "long_loop_max",
            Operation::LongReductionMin => "long_reduction_min",
            Operation::LongReductionMax => "long_reduction_max",
        }
    }

    /// Whether the operation produces an array rather than a scalar
    pub fn is_loop(self) -> bool {
        matches!(
            self,
            Operation::IntLoopMin
                | Operation::IntLoopMax
                | Operation::LongLoopMin
                | Operation::LongLoopMax
        )
    }

    /// Run once against `fixture`, writing array results into `scratch`.
    pub fn invoke<'s>(self, fixture: &Fixture, scratch: &'s mut Scratch) -> Outcome<'s> {
        match self {
            Operation::IntLoopMin => Outcome::Ints(int_loop_min(fixture, &mut scratch.ints)),
            Operation::IntLoopMax => Outcome::Ints(int_loop_max(fixture, &mut scratch.ints)),
            Operation::IntReductionMin => Outcome::Int(int_reduction_min(fixture)),
            Operation::IntReductionMax => Outcome::Int(int_reduction_max(fixture)),
            Operation::LongLoopMin => Outcome::Longs(long_loop_min(fixture, &mut scratch.longs)),
            Operation::LongLoopMax => Outcome::Longs(long_loop_max(fixture, &mut scratch.longs)),
            Operation::LongReductionMin => Outcome::Long(long_reduction_min(fixture)),
            Operation::LongReductionMax => Outcome::Long(long_reduction_max(fixture)),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Unknown operation identifier
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown operation: {0}")]
pub struct UnknownOperation(pub String);

impl FromStr for Operation {
    type Err = UnknownOperation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operation::ALL
            .into_iter()
            .find(|op| op.id() == s)
            .ok_or_else(|| UnknownOperation(s.to_string()))
    }
}

/// Return value of one operation call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome<'s> {
    /// Borrowed int output buffer
    Ints(&'s [i32]),
    /// Borrowed long output buffer
    Longs(&'s [i64]),
    /// Int reduction result
    Int(i32),
    /// Long reduction result
    Long(i64),
}

impl Outcome<'_> {
    /// Wrapping sum of every returned value, for recording results compactly
    pub fn digest(&self) -> i64 {
        match *self {
            Outcome::Ints(values) => values
                .iter()
                .fold(0i64, |acc, &v| acc.wrapping_add(v as i64)),
            Outcome::Longs(values) => values.iter().fold(0i64, |acc, &v| acc.wrapping_add(v)),
            Outcome::Int(v) => v as i64,
            Outcome::Long(v) => v,
        }
    }
}
