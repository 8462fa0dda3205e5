//! Integer helpers

/// Returns true if `v` is a power of 2.
#[inline(always)]
pub fn is_power_of_2(v: i32) -> bool {
    v > 0 && (v & (v - 1)) == 0
}

/// Rounds up to the next power of 2. Returns `v` if it already is one.
#[inline(always)]
pub fn round_up_pow2(v: i32) -> i32 {
    if v <= 1 {
        1
    } else {
        (v as u32).next_power_of_two() as i32
    }
}

/// Returns floor(log2(v)) for `v > 0`.
#[inline(always)]
pub fn log2_int(v: u64) -> u32 {
    63 - v.leading_zeros()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn powers_of_two() {
        assert!(is_power_of_2(1));
        assert!(is_power_of_2(64));
        assert!(!is_power_of_2(0));
        assert!(!is_power_of_2(12));
        assert_eq!(round_up_pow2(12), 16);
        assert_eq!(round_up_pow2(16), 16);
        assert_eq!(round_up_pow2(0), 1);
        assert_eq!(log2_int(1), 0);
        assert_eq!(log2_int(1024), 10);
        assert_eq!(log2_int(1025), 10);
    }
}
