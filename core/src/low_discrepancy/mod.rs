//! Low-discrepancy sequences.

mod primes;
mod radical_inverse;
mod sobol;

// Re-export
pub use primes::*;
pub use radical_inverse::*;
pub use sobol::*;

use crate::geometry::*;
use crate::pbrt::*;
use crate::rng::RNG;

/// Generator matrix of the Sobol' sequence's second dimension for 32 bits.
pub const C_SOBOL: [u32; 32] = sobol_second_dimension();

/// Generator matrix of the van der Corput sequence for 32 bits.
pub const C_VAN_DER_CORPUT: [u32; 32] = van_der_corput_matrix();

const fn van_der_corput_matrix() -> [u32; 32] {
    let mut c = [0_u32; 32];
    let mut i = 0;
    while i < 32 {
        c[i] = 1 << (31 - i);
        i += 1;
    }
    c
}

const fn sobol_second_dimension() -> [u32; 32] {
    // Primitive polynomial x + 1 with m_1 = 1.
    let mut c = [0_u32; 32];
    c[0] = 1 << 31;
    let mut i = 1;
    while i < 32 {
        c[i] = c[i - 1] ^ (c[i - 1] >> 1);
        i += 1;
    }
    c
}

/// Multiplies a 32x32 generator matrix over GF(2) with the bits of `a`.
///
/// * `c` - Columns of the generator matrix.
/// * `a` - Sample index.
#[inline]
pub fn multiply_generator(c: &[u32; 32], mut a: u32) -> u32 {
    let mut v = 0_u32;
    let mut i = 0;
    while a != 0 {
        if a & 1 != 0 {
            v ^= c[i];
        }
        a >>= 1;
        i += 1;
    }
    v
}

/// Returns the `n` points of a scrambled (0, 1)-sequence generated in Gray
/// code order.
///
/// * `c`        - Generator matrix.
/// * `n`        - Number of samples.
/// * `scramble` - Random scramble bits.
pub fn gray_code_sample_1d(c: &[u32; 32], n: u32, scramble: u32) -> Vec<Float> {
    let mut v = scramble;
    let mut p = Vec::with_capacity(n as usize);
    for i in 0..n {
        p.push(min(v as Float * hexf32!("0x1.0p-32"), ONE_MINUS_EPSILON));
        v ^= c[(i + 1).trailing_zeros() as usize];
    }
    p
}

/// Returns the `n` points of a scrambled (0, 2)-sequence generated in Gray
/// code order.
///
/// * `c0`       - Generator matrix for the first dimension.
/// * `c1`       - Generator matrix for the second dimension.
/// * `n`        - Number of samples.
/// * `scramble` - Random scramble bits per dimension.
pub fn gray_code_sample_2d(c0: &[u32; 32], c1: &[u32; 32], n: u32, scramble: &Point2<u32>) -> Vec<Point2f> {
    let mut v = [scramble.x, scramble.y];
    let mut p = Vec::with_capacity(n as usize);
    for i in 0..n {
        p.push(Point2f::new(
            min(v[0] as Float * hexf32!("0x1.0p-32"), ONE_MINUS_EPSILON),
            min(v[1] as Float * hexf32!("0x1.0p-32"), ONE_MINUS_EPSILON),
        ));
        let b = (i + 1).trailing_zeros() as usize;
        v[0] ^= c0[b];
        v[1] ^= c1[b];
    }
    p
}

/// Fills `n_pixel_samples * n_samples_per_pixel_sample` values with a
/// scrambled van der Corput sequence. Values are shuffled within each pixel
/// sample and then across pixel samples.
///
/// * `n_samples_per_pixel_sample` - Samples per pixel sample (array length).
/// * `n_pixel_samples`            - Samples per pixel.
/// * `rng`                        - Random number generator.
pub fn van_der_corput(n_samples_per_pixel_sample: usize, n_pixel_samples: usize, rng: &mut RNG) -> Vec<Float> {
    let scramble = rng.uniform_u32();
    let total_samples = n_samples_per_pixel_sample * n_pixel_samples;
    let mut samples = gray_code_sample_1d(&C_VAN_DER_CORPUT, total_samples as u32, scramble);

    // Randomly shuffle 1D sample points.
    for chunk in samples.chunks_mut(n_samples_per_pixel_sample) {
        rng.shuffle(chunk, n_samples_per_pixel_sample, 1);
    }
    rng.shuffle(&mut samples, n_pixel_samples, n_samples_per_pixel_sample);
    samples
}

/// Fills `n_pixel_samples * n_samples_per_pixel_sample` points with a
/// scrambled Sobol' (0, 2)-sequence. Points are shuffled within each pixel
/// sample and then across pixel samples.
///
/// * `n_samples_per_pixel_sample` - Samples per pixel sample (array length).
/// * `n_pixel_samples`            - Samples per pixel.
/// * `rng`                        - Random number generator.
pub fn sobol_2d(n_samples_per_pixel_sample: usize, n_pixel_samples: usize, rng: &mut RNG) -> Vec<Point2f> {
    let scramble = Point2::new(rng.uniform_u32(), rng.uniform_u32());
    let total_samples = n_samples_per_pixel_sample * n_pixel_samples;
    let mut samples = gray_code_sample_2d(&C_VAN_DER_CORPUT, &C_SOBOL, total_samples as u32, &scramble);

    // Randomly shuffle 2D sample points.
    for chunk in samples.chunks_mut(n_samples_per_pixel_sample) {
        rng.shuffle(chunk, n_samples_per_pixel_sample, 1);
    }
    rng.shuffle(&mut samples, n_pixel_samples, n_samples_per_pixel_sample);
    samples
}

// ---- Tests ----

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sobol_second_dimension_matches_known_columns() {
        assert_eq!(C_SOBOL[0], 0x80000000);
        assert_eq!(C_SOBOL[1], 0xc0000000);
        assert_eq!(C_SOBOL[2], 0xa0000000);
        assert_eq!(C_SOBOL[3], 0xf0000000);
    }

    #[test]
    fn gray_code_visits_same_points_as_direct_generation() {
        let mut gray = gray_code_sample_1d(&C_SOBOL, 16, 0);
        let mut direct: Vec<Float> = (0..16)
            .map(|i| multiply_generator(&C_SOBOL, i) as Float * hexf32!("0x1.0p-32"))
            .collect();
        gray.sort_by(|a, b| a.total_cmp(b));
        direct.sort_by(|a, b| a.total_cmp(b));
        assert_eq!(gray, direct);
    }

    #[test]
    fn zero_two_points_are_stratified_in_elementary_intervals() {
        let pts = gray_code_sample_2d(&C_VAN_DER_CORPUT, &C_SOBOL, 16, &Point2::new(0, 0));
        // Every 4x4 grid cell must hold exactly one point.
        let mut cells = [0_u32; 16];
        for p in &pts {
            cells[(p.y * 4.0) as usize * 4 + (p.x * 4.0) as usize] += 1;
        }
        assert!(cells.iter().all(|c| *c == 1));
    }

    #[test]
    fn van_der_corput_is_stratified_per_pixel_sample_block() {
        let mut rng = RNG::new(9);
        let samples = van_der_corput(4, 8, &mut rng);
        assert_eq!(samples.len(), 32);
        let mut strata: Vec<usize> = samples.iter().map(|v| (v * 32.0) as usize).collect();
        strata.sort_unstable();
        assert_eq!(strata, (0..32).collect::<Vec<_>>());
    }
}
