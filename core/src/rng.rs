//! Random Number Generator.

use crate::pbrt::*;

const PCG32_DEFAULT_STATE: u64 = 0x853c49e6748fea9b;
const PCG32_DEFAULT_STREAM: u64 = 0xda3e39cb94b95bdb;
const PCG32_MULT: u64 = 0x5851f42d4c957f2d;

/// PCG32 pseudo-random number generator. Each instance is owned by a single
/// sampler or task; it is cheap to copy and reseed.
#[derive(Clone, Debug)]
pub struct RNG {
    state: u64,
    inc: u64,
}

impl Default for RNG {
    fn default() -> Self {
        Self {
            state: PCG32_DEFAULT_STATE,
            inc: PCG32_DEFAULT_STREAM,
        }
    }
}

impl RNG {
    /// Create a new `RNG` by seeding it with the given starting sequence.
    ///
    /// * `sequence_index` - The starting sequence to seed with.
    pub fn new(sequence_index: u64) -> Self {
        let mut rng = Self { state: 0, inc: 0 };
        rng.set_sequence(sequence_index);
        rng
    }

    /// Reseeds the generator.
    ///
    /// * `init_seq` - The starting sequence to seed with.
    pub fn set_sequence(&mut self, init_seq: u64) {
        self.state = 0;
        self.inc = (init_seq << 1) | 1;
        let _ = self.uniform_u32();
        self.state = self.state.wrapping_add(PCG32_DEFAULT_STATE);
        let _ = self.uniform_u32();
    }

    /// Returns a uniformly distributed u32 value.
    #[inline]
    pub fn uniform_u32(&mut self) -> u32 {
        let old_state = self.state;
        self.state = old_state.wrapping_mul(PCG32_MULT).wrapping_add(self.inc);
        let xor_shifted = (((old_state >> 18) ^ old_state) >> 27) as u32;
        let rot = (old_state >> 59) as u32;
        xor_shifted.rotate_right(rot)
    }

    /// Returns a uniformly distributed value in `[0, b)` without modulo bias.
    ///
    /// * `b` - Exclusive upper bound; must be non-zero.
    pub fn bounded_uniform_u32(&mut self, b: u32) -> u32 {
        debug_assert!(b > 0);
        let threshold = b.wrapping_neg() % b;
        loop {
            let r = self.uniform_u32();
            if r >= threshold {
                return r % b;
            }
        }
    }

    /// Returns a uniformly distributed value over `[0, 1)`.
    pub fn uniform_float(&mut self) -> Float {
        min(
            self.uniform_u32() as Float * hexf32!("0x1.0p-32"),
            ONE_MINUS_EPSILON,
        )
    }

    /// Randomly permutes `count` blocks of `n_dimensions` consecutive values.
    ///
    /// * `v`            - The values to shuffle.
    /// * `count`        - Number of blocks.
    /// * `n_dimensions` - Values per block.
    pub fn shuffle<T>(&mut self, v: &mut [T], count: usize, n_dimensions: usize) {
        debug_assert!(count * n_dimensions <= v.len());

        for i in 0..count {
            let other = i + self.bounded_uniform_u32((count - i) as u32) as usize;
            for j in 0..n_dimensions {
                v.swap(n_dimensions * i + j, n_dimensions * other + j);
            }
        }
    }
}

// ---- Tests ----

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn same_sequence_gives_same_values() {
        let mut a = RNG::new(7);
        let mut b = RNG::new(7);
        for _ in 0..100 {
            assert_eq!(a.uniform_u32(), b.uniform_u32());
        }
    }

    #[test]
    fn different_sequences_diverge() {
        let mut a = RNG::new(1);
        let mut b = RNG::new(2);
        let same = (0..32).filter(|_| a.uniform_u32() == b.uniform_u32()).count();
        assert!(same < 4);
    }

    #[test]
    fn shuffle_is_a_permutation() {
        let mut rng = RNG::new(3);
        let mut v: Vec<usize> = (0..20).collect();
        rng.shuffle(&mut v, 10, 2);
        let mut sorted = v.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..20).collect::<Vec<_>>());
        for pair in v.chunks(2) {
            assert_eq!(pair[0] % 2, 0);
            assert_eq!(pair[1], pair[0] + 1);
        }
    }

    proptest! {
        #[test]
        fn uniform_float_in_unit_interval(seed in any::<u64>()) {
            let mut rng = RNG::new(seed);
            for _ in 0..16 {
                let u = rng.uniform_float();
                prop_assert!((0.0..1.0).contains(&u));
            }
        }

        #[test]
        fn bounded_values_below_bound(seed in any::<u64>(), b in 1..1000_u32) {
            let mut rng = RNG::new(seed);
            prop_assert!(rng.bounded_uniform_u32(b) < b);
        }
    }
}
