//! Arithmetic Transforms
//!
//! Derive the min-side and 32-bit datasets from the generated 64-bit max-side pair.

/// Elementwise two's-complement negation.
///
/// `i64::MIN` maps to itself, as with wrapping negation everywhere else.
pub fn negate(values: &[i64]) -> Vec<i64> {
    values.iter().map(|v| v.wrapping_neg()).collect()
}

/// Elementwise truncating conversion: keep the low 32 bits, reinterpreted as signed.
pub fn narrow(values: &[i64]) -> Vec<i32> {
    values.iter().map(|&v| v as i32).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negate() {
        assert_eq!(negate(&[3, -7, 0, 18]), vec![-3, 7, 0, -18]);
        assert!(negate(&[]).is_empty());
        assert_eq!(negate(&[i64::MIN]), vec![i64::MIN]);
    }

    #[test]
    fn test_narrow_in_range() {
        assert_eq!(narrow(&[0, 1, -1, 12_345, -98_765]), vec![0, 1, -1, 12_345, -98_765]);
    }

    #[test]
    fn test_narrow_discards_high_bits() {
        // 2^32 + 5 keeps only the 5
        assert_eq!(narrow(&[(1_i64 << 32) + 5]), vec![5]);
        // 2^31 wraps to i32::MIN
        assert_eq!(narrow(&[1_i64 << 31]), vec![i32::MIN]);
        assert_eq!(narrow(&[i64::MAX, i64::MIN]), vec![-1, 0]);
    }
}
