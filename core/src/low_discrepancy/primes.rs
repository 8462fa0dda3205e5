//! Prime tables

/// Number of primes in `PRIMES`.
pub const PRIME_TABLE_SIZE: usize = 1000;

/// The first `PRIME_TABLE_SIZE` primes.
pub const PRIMES: [u32; PRIME_TABLE_SIZE] = generate_primes();

/// Running sums of `PRIMES`; `PRIME_SUMS[i]` is the sum of the first `i`
/// primes and gives the offset of the `i`-th digit permutation.
pub const PRIME_SUMS: [u32; PRIME_TABLE_SIZE] = generate_prime_sums();

const fn generate_primes() -> [u32; PRIME_TABLE_SIZE] {
    let mut primes = [0_u32; PRIME_TABLE_SIZE];
    let mut count = 0;
    let mut candidate = 2_u32;
    while count < PRIME_TABLE_SIZE {
        let mut is_prime = true;
        let mut i = 0;
        while i < count {
            let p = primes[i];
            if p * p > candidate {
                break;
            }
            if candidate % p == 0 {
                is_prime = false;
                break;
            }
            i += 1;
        }
        if is_prime {
            primes[count] = candidate;
            count += 1;
        }
        candidate += 1;
    }
    primes
}

const fn generate_prime_sums() -> [u32; PRIME_TABLE_SIZE] {
    let mut sums = [0_u32; PRIME_TABLE_SIZE];
    let mut i = 1;
    while i < PRIME_TABLE_SIZE {
        sums[i] = sums[i - 1] + PRIMES[i - 1];
        i += 1;
    }
    sums
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_starts_and_ends_with_known_primes() {
        assert_eq!(&PRIMES[..6], &[2, 3, 5, 7, 11, 13]);
        assert_eq!(PRIMES[PRIME_TABLE_SIZE - 1], 7919);
    }

    #[test]
    fn sums_are_prefix_sums() {
        assert_eq!(&PRIME_SUMS[..4], &[0, 2, 5, 10]);
        assert_eq!(PRIME_SUMS[PRIME_TABLE_SIZE - 1] + PRIMES[PRIME_TABLE_SIZE - 1], 3682913);
    }
}
