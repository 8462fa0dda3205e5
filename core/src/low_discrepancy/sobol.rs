//! Sobol' generator matrices.

use crate::pbrt::*;

/// Number of columns in every Sobol' generator matrix; sample indices may
/// use up to this many bits.
pub const SOBOL_MATRIX_SIZE: usize = 52;

/// Number of dimensions with proper Sobol' generator matrices.
pub const NUM_SOBOL_DIMENSIONS: usize = 21;

/// Primitive polynomial degree `s`, coefficient bits `a` and initial
/// direction numbers `m` for dimensions 2 and up (Joe and Kuo, new-joe-kuo-6).
const DIRECTION_NUMBERS: [(u32, u32, &[u32]); NUM_SOBOL_DIMENSIONS - 1] = [
    (1, 0, &[1]),
    (2, 1, &[1, 3]),
    (3, 1, &[1, 3, 1]),
    (3, 2, &[1, 1, 1]),
    (4, 1, &[1, 1, 3, 3]),
    (4, 4, &[1, 3, 5, 13]),
    (5, 2, &[1, 1, 5, 5, 17]),
    (5, 4, &[1, 1, 5, 5, 5]),
    (5, 7, &[1, 1, 7, 11, 19]),
    (5, 11, &[1, 1, 5, 1, 1]),
    (5, 13, &[1, 1, 1, 3, 11]),
    (5, 14, &[1, 3, 5, 5, 31]),
    (6, 1, &[1, 3, 3, 9, 7, 49]),
    (6, 13, &[1, 1, 1, 15, 21, 21]),
    (6, 16, &[1, 3, 1, 13, 27, 49]),
    (6, 19, &[1, 1, 1, 15, 7, 5]),
    (6, 22, &[1, 3, 1, 15, 13, 25]),
    (6, 25, &[1, 1, 5, 5, 19, 61]),
    (7, 1, &[1, 3, 7, 11, 23, 15, 103]),
    (7, 4, &[1, 3, 7, 13, 13, 15, 69]),
];

/// 32-bit generator matrices for the first `NUM_SOBOL_DIMENSIONS` Sobol'
/// dimensions. Immutable once built; share it with `Arc`.
#[derive(Clone, Debug)]
pub struct SobolMatrices {
    columns: Vec<[u32; SOBOL_MATRIX_SIZE]>,
}

impl SobolMatrices {
    /// Builds the matrices from the direction number table.
    pub fn new() -> Self {
        let mut columns = Vec::with_capacity(NUM_SOBOL_DIMENSIONS);

        // The first dimension is the van der Corput sequence; higher bits
        // of the index have no effect on a 32-bit result.
        let mut vdc = [0_u32; SOBOL_MATRIX_SIZE];
        for (i, c) in vdc.iter_mut().enumerate().take(32) {
            *c = 1 << (31 - i);
        }
        columns.push(vdc);

        for &(s, a, m) in DIRECTION_NUMBERS.iter() {
            let s = s as usize;
            let mut v = [0_u32; SOBOL_MATRIX_SIZE];
            for i in 0..SOBOL_MATRIX_SIZE {
                v[i] = if i < s {
                    m[i] << (31 - i)
                } else {
                    let mut vi = v[i - s] ^ (v[i - s] >> s);
                    for k in 1..s {
                        if (a >> (s - 1 - k)) & 1 != 0 {
                            vi ^= v[i - k];
                        }
                    }
                    vi
                };
            }
            columns.push(v);
        }

        Self { columns }
    }

    /// Returns the number of dimensions.
    pub fn dimensions(&self) -> usize {
        self.columns.len()
    }

    /// Returns the generator matrix columns for a dimension.
    ///
    /// * `dim` - The dimension; must be below `NUM_SOBOL_DIMENSIONS`.
    pub fn matrix(&self, dim: usize) -> &[u32; SOBOL_MATRIX_SIZE] {
        &self.columns[dim]
    }

    /// Returns the 32-bit value of sample `index` in dimension `dim` XORed
    /// with `scramble`.
    ///
    /// * `index`    - Sample index.
    /// * `dim`      - Dimension.
    /// * `scramble` - Scramble bits.
    pub fn sample_bits(&self, mut index: u64, dim: usize, scramble: u32) -> u32 {
        let c = &self.columns[dim];
        let mut v = scramble;
        let mut i = 0;
        while index != 0 && i < SOBOL_MATRIX_SIZE {
            if index & 1 != 0 {
                v ^= c[i];
            }
            index >>= 1;
            i += 1;
        }
        v
    }

    /// Returns sample `index` in dimension `dim` as a value in [0, 1).
    ///
    /// * `index`    - Sample index.
    /// * `dim`      - Dimension.
    /// * `scramble` - Scramble bits.
    pub fn sample(&self, index: u64, dim: usize, scramble: u32) -> Float {
        min(
            self.sample_bits(index, dim, scramble) as Float * hexf32!("0x1.0p-32"),
            ONE_MINUS_EPSILON,
        )
    }
}

impl Default for SobolMatrices {
    fn default() -> Self {
        Self::new()
    }
}

/// Maps the samples of a single pixel to indices of the Sobol' sequence
/// scaled over a `2^m x 2^m` pixel grid.
///
/// The top `m` bits of the first two dimensions select the pixel. Those bits
/// depend linearly (over GF(2)) on the index bits, so the low `2m` index bits
/// of the `n`-th sample falling in a pixel are found by inverting that map.
#[derive(Clone, Debug)]
pub struct SobolIntervalMap {
    /// Number of pixel bits per axis.
    m: u32,

    /// Image of each index bit in the packed `(x, y)` pixel bits.
    pixel_columns: Vec<u64>,

    /// Preimage in the low `2m` index bits of each packed pixel bit.
    inverse: Vec<u64>,
}

impl SobolIntervalMap {
    /// Creates the map for a grid of `2^log2_resolution` pixels per axis.
    ///
    /// * `matrices`        - The Sobol' generator matrices.
    /// * `log2_resolution` - Pixel bits per axis.
    pub fn new(matrices: &SobolMatrices, log2_resolution: u32) -> Self {
        let m = log2_resolution;
        debug_assert!(2 * m as usize <= SOBOL_MATRIX_SIZE);

        let pixel_columns: Vec<u64> = (0..SOBOL_MATRIX_SIZE)
            .map(|c| {
                if m == 0 {
                    0
                } else {
                    let x = (matrices.matrix(0)[c] >> (32 - m)) as u64;
                    let y = (matrices.matrix(1)[c] >> (32 - m)) as u64;
                    (x << m) | y
                }
            })
            .collect();

        // Gauss-Jordan elimination over GF(2), tracking the combination of
        // index bits that produces each image.
        let n = 2 * m as usize;
        let mut basis: Vec<(u64, u64)> = (0..n).map(|c| (pixel_columns[c], 1_u64 << c)).collect();
        for k in 0..n {
            if let Some(pivot) = (k..n).find(|&r| (basis[r].0 >> k) & 1 != 0) {
                basis.swap(k, pivot);
                let (image, preimage) = basis[k];
                for (r, row) in basis.iter_mut().enumerate() {
                    if r != k && (row.0 >> k) & 1 != 0 {
                        row.0 ^= image;
                        row.1 ^= preimage;
                    }
                }
            }
        }
        let inverse = basis.into_iter().map(|(_, preimage)| preimage).collect();

        Self {
            m,
            pixel_columns,
            inverse,
        }
    }

    /// Returns the pixel bits per axis.
    pub fn log2_resolution(&self) -> u32 {
        self.m
    }

    /// Returns the global index of the `frame`-th sample inside pixel `p`,
    /// given relative to the origin of the sampled grid.
    ///
    /// * `frame` - Sample number within the pixel.
    /// * `px`    - Pixel x-coordinate in `[0, 2^m)`.
    /// * `py`    - Pixel y-coordinate in `[0, 2^m)`.
    pub fn index(&self, frame: u64, px: u32, py: u32) -> u64 {
        if self.m == 0 {
            return frame;
        }
        let m2 = 2 * self.m as usize;

        // Contribution of the high index bits to the pixel bits.
        let mut delta = 0_u64;
        let mut high = frame;
        let mut c = m2;
        while high != 0 && c < SOBOL_MATRIX_SIZE {
            if high & 1 != 0 {
                delta ^= self.pixel_columns[c];
            }
            high >>= 1;
            c += 1;
        }

        let target = (((px as u64) << self.m) | py as u64) ^ delta;
        let mut index = frame << m2;
        for (k, preimage) in self.inverse.iter().enumerate() {
            if (target >> k) & 1 != 0 {
                index ^= preimage;
            }
        }
        index
    }
}

// ---- Tests ----

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_dimension_matches_closed_form() {
        let matrices = SobolMatrices::new();
        let c = matrices.matrix(1);
        assert_eq!(&c[..4], &[0x80000000, 0xc0000000, 0xa0000000, 0xf0000000]);
    }

    #[test]
    fn first_points_follow_generator_columns() {
        let matrices = SobolMatrices::new();
        let expected = [(0.0, 0.0), (0.5, 0.5), (0.25, 0.75), (0.75, 0.25)];
        for (i, (x, y)) in expected.iter().enumerate() {
            assert_eq!(matrices.sample(i as u64, 0, 0), *x);
            assert_eq!(matrices.sample(i as u64, 1, 0), *y);
        }
        assert_eq!(matrices.sample(2, 2, 0), 0.75);
    }

    #[test]
    fn every_dimension_is_a_zero_one_sequence() {
        let matrices = SobolMatrices::new();
        for dim in 0..NUM_SOBOL_DIMENSIONS {
            let mut strata: Vec<u32> = (0..64).map(|i| matrices.sample_bits(i, dim, 0) >> 26).collect();
            strata.sort_unstable();
            assert_eq!(strata, (0..64).collect::<Vec<_>>(), "dimension {}", dim);
        }
    }

    #[test]
    fn interval_map_lands_in_requested_pixel() {
        let matrices = SobolMatrices::new();
        for m in 0..4 {
            let map = SobolIntervalMap::new(&matrices, m);
            let res = 1_u32 << m;
            for py in 0..res {
                for px in 0..res {
                    for frame in 0..8 {
                        let index = map.index(frame, px, py);
                        let x = (matrices.sample(index, 0, 0) * res as Float) as u32;
                        let y = (matrices.sample(index, 1, 0) * res as Float) as u32;
                        assert_eq!((x, y), (px, py), "m={} frame={}", m, frame);
                    }
                }
            }
        }
    }

    #[test]
    fn interval_map_gives_distinct_indices_per_frame() {
        let matrices = SobolMatrices::new();
        let map = SobolIntervalMap::new(&matrices, 3);
        let mut indices: Vec<u64> = (0..32).map(|f| map.index(f, 5, 2)).collect();
        indices.sort_unstable();
        indices.dedup();
        assert_eq!(indices.len(), 32);
    }
}
