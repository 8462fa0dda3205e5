//! Radical inverse and scrambled radical inverse.

use super::primes::*;
use crate::pbrt::*;
use crate::rng::RNG;

/// Returns the radical inverse of `a` in the prime base `PRIMES[base_index]`,
/// i.e. the digits of `a` mirrored about the radix point.
///
/// * `base_index` - Index of the prime base.
/// * `a`          - The value.
pub fn radical_inverse(base_index: usize, a: u64) -> Float {
    if base_index == 0 {
        // Base 2 is a bit reversal.
        return min(
            (a.reverse_bits() as f64 * hexf64!("0x1.0p-64")) as Float,
            ONE_MINUS_EPSILON,
        );
    }
    radical_inverse_base(PRIMES[base_index % PRIME_TABLE_SIZE] as u64, a)
}

fn radical_inverse_base(base: u64, mut a: u64) -> Float {
    let inv_base = 1.0 / base as f64;
    let mut reversed_digits = 0_u64;
    let mut inv_base_n = 1.0_f64;
    while a != 0 {
        let next = a / base;
        let digit = a - next * base;
        reversed_digits = reversed_digits * base + digit;
        inv_base_n *= inv_base;
        a = next;
    }
    min((reversed_digits as f64 * inv_base_n) as Float, ONE_MINUS_EPSILON)
}

/// Returns the radical inverse of `a` with every base-b digit mapped
/// through `perm`. Leading zero digits map through `perm[0]` as well, which
/// is summed in closed form as a geometric series.
///
/// * `base_index` - Index of the prime base.
/// * `a`          - The value.
/// * `perm`       - Digit permutation for the base; `perm.len()` is the base.
pub fn scrambled_radical_inverse(base_index: usize, a: u64, perm: &[u16]) -> Float {
    let base = PRIMES[base_index % PRIME_TABLE_SIZE] as u64;
    debug_assert_eq!(perm.len() as u64, base);

    let inv_base = 1.0 / base as f64;
    let mut reversed_digits = 0_u64;
    let mut inv_base_n = 1.0_f64;
    let mut a = a;
    while a != 0 {
        let next = a / base;
        let digit = a - next * base;
        reversed_digits = reversed_digits * base + perm[digit as usize] as u64;
        inv_base_n *= inv_base;
        a = next;
    }
    let value = inv_base_n * (reversed_digits as f64 + inv_base * perm[0] as f64 / (1.0 - inv_base));
    min(value as Float, ONE_MINUS_EPSILON)
}

/// Inverts the base-`B` radical inverse for a value given as `n_digits`
/// integer digits.
///
/// * `inverse`  - The digits of the radical inverse as an integer.
/// * `n_digits` - Number of digits.
pub fn inverse_radical_inverse<const B: u64>(mut inverse: u64, n_digits: u32) -> u64 {
    let mut index = 0_u64;
    for _ in 0..n_digits {
        let digit = inverse % B;
        inverse /= B;
        index = index * B + digit;
    }
    index
}

/// Random digit permutations for every prime in the table, stored back to
/// back. The permutation for base index `i` starts at `PRIME_SUMS[i]` and
/// has `PRIMES[i]` entries.
///
/// * `rng` - Random number generator.
pub fn compute_radical_inverse_permutations(rng: &mut RNG) -> Vec<u16> {
    let total = (PRIME_SUMS[PRIME_TABLE_SIZE - 1] + PRIMES[PRIME_TABLE_SIZE - 1]) as usize;
    let mut perms: Vec<u16> = Vec::with_capacity(total);
    for &prime in PRIMES.iter() {
        let start = perms.len();
        perms.extend(0..prime as u16);
        rng.shuffle(&mut perms[start..], prime as usize, 1);
    }
    perms
}

/// Returns the slice of the permutation for a base index.
///
/// * `perms`      - Output of `compute_radical_inverse_permutations`.
/// * `base_index` - Index of the prime base.
pub fn permutation_for_dimension(perms: &[u16], base_index: usize) -> &[u16] {
    let i = base_index % PRIME_TABLE_SIZE;
    let start = PRIME_SUMS[i] as usize;
    &perms[start..start + PRIMES[i] as usize]
}

// ---- Tests ----

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;
    use proptest::prelude::*;

    #[test]
    fn base_two_reverses_bits() {
        assert_eq!(radical_inverse(0, 1), 0.5);
        assert_eq!(radical_inverse(0, 2), 0.25);
        assert_eq!(radical_inverse(0, 3), 0.75);
    }

    #[test]
    fn base_three_mirrors_digits() {
        assert!(approx_eq!(Float, radical_inverse(1, 1), 1.0 / 3.0));
        assert!(approx_eq!(Float, radical_inverse(1, 5), 7.0 / 9.0));
    }

    #[test]
    fn identity_permutation_matches_plain_radical_inverse() {
        let perm: Vec<u16> = (0..5).collect();
        for a in 0..200 {
            assert!(approx_eq!(
                Float,
                scrambled_radical_inverse(2, a, &perm),
                radical_inverse(2, a),
                epsilon = 1e-6
            ));
        }
    }

    #[test]
    fn inverse_recovers_index() {
        // 6 in base 3 is "20"; reversed digits are "02" = 2.
        assert_eq!(inverse_radical_inverse::<3>(2, 2), 6);
        assert_eq!(inverse_radical_inverse::<2>(0b011, 3), 0b110);
    }

    #[test]
    fn permutations_are_permutations() {
        let mut rng = RNG::new(0);
        let perms = compute_radical_inverse_permutations(&mut rng);
        for i in [0, 1, 7, 100, PRIME_TABLE_SIZE - 1] {
            let mut p = permutation_for_dimension(&perms, i).to_vec();
            p.sort_unstable();
            assert_eq!(p, (0..PRIMES[i] as u16).collect::<Vec<_>>());
        }
    }

    proptest! {
        #[test]
        fn radical_inverse_in_unit_interval(base in 0..PRIME_TABLE_SIZE, a in any::<u64>()) {
            let v = radical_inverse(base, a);
            prop_assert!((0.0..1.0).contains(&v));
        }
    }
}
