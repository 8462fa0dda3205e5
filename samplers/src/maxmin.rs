//! Maximized Minimal Distance Sampler.

use crate::{pixel_samples, round_up_power_of_2, sampled_dimensions};
use render_core::app::Options;
use render_core::error::ConfigError;
use render_core::forward_pixel_sampler;
use render_core::geometry::*;
use render_core::low_discrepancy::*;
use render_core::paramset::*;
use render_core::pbrt::*;
use render_core::rng::*;
use render_core::sampler::*;

/// Largest supported `log2(samples_per_pixel)`.
pub const MAX_MIN_DIST_LOG2_SAMPLES: u32 = 10;

/// Number of generator matrices tried per sample count.
const CANDIDATE_MATRICES: usize = 48;

/// Implements a sampler whose first 2D dimension is a (0, 2)-net of the
/// form `(i / n, C * i)` with the generator matrix `C` chosen to maximize
/// the minimum toroidal distance between points. Other dimensions use
/// scrambled (0, 2)-sequences.
#[derive(Clone)]
pub struct MaxMinDistSampler {
    /// Use a pixel sampler.
    pixel: PixelSampler,

    /// Generator matrix for the second coordinate of the first 2D dimension.
    c_pixel: [u32; 32],
}

impl MaxMinDistSampler {
    /// Create a new `MaxMinDistSampler`.
    ///
    /// * `samples_per_pixel`    - Number of samples per pixel; rounded to a
    ///                            power of 2 no larger than
    ///                            `2^MAX_MIN_DIST_LOG2_SAMPLES`.
    /// * `n_sampled_dimensions` - Number of dimensions for sampling.
    /// * `seed`                 - Seed for the random number generator.
    pub fn new(samples_per_pixel: usize, n_sampled_dimensions: usize, seed: u64) -> Self {
        let max_spp = 1 << MAX_MIN_DIST_LOG2_SAMPLES;
        let mut spp = samples_per_pixel;
        if spp > max_spp {
            warn!(
                "No more than {} samples per pixel are supported with MaxMinDistSampler. Rounding down.",
                max_spp
            );
            spp = max_spp;
        }
        let spp = round_up_power_of_2("MaxMinDistSampler", spp);
        let c_pixel = max_min_dist_matrix(log2_int(spp as u64));

        Self {
            pixel: PixelSampler::new(spp, n_sampled_dimensions, seed),
            c_pixel,
        }
    }

    /// Create a `MaxMinDistSampler` from `pixelsamples` (default 16) and
    /// `dimensions` (default 4).
    ///
    /// * `params`  - Sampler parameters.
    /// * `options` - Render options.
    pub fn create(params: &ParamSet, options: &Options) -> Result<Self, ConfigError> {
        let spp = pixel_samples(params, 16, options)?;
        let sd = sampled_dimensions(params)?;
        Ok(Self::new(spp, sd, 0))
    }

    /// Returns the generator matrix used for the first 2D dimension.
    pub fn generator_matrix(&self) -> &[u32; 32] {
        &self.c_pixel
    }
}

impl Sampler for MaxMinDistSampler {
    forward_pixel_sampler!();

    fn clone_sampler(&self, seed: u64) -> Box<dyn Sampler> {
        Box::new(Self {
            pixel: self.pixel.reseeded(seed),
            c_pixel: self.c_pixel,
        })
    }

    fn start_pixel(&mut self, p: &Point2i) {
        let spp = self.pixel.data.samples_per_pixel;
        let inv_spp = 1.0 / spp as Float;
        let pixel = &mut self.pixel;

        if let Some(first) = pixel.samples_2d.first_mut() {
            for (i, s) in first.iter_mut().enumerate() {
                *s = Point2f::new(i as Float * inv_spp, sample_generator_matrix(&self.c_pixel, i as u32, 0));
            }
            pixel.rng.shuffle(first, spp, 1);
        }

        // Generate remaining samples for `MaxMinDistSampler`.
        for samples in pixel.samples_1d.iter_mut() {
            *samples = van_der_corput(1, spp, &mut pixel.rng);
        }
        for samples in pixel.samples_2d.iter_mut().skip(1) {
            *samples = sobol_2d(1, spp, &mut pixel.rng);
        }

        let data = &mut pixel.data;
        for (array, &n) in data.sample_array_1d.iter_mut().zip(data.samples_1d_array_sizes.iter()) {
            *array = van_der_corput(n, spp, &mut pixel.rng);
        }
        for (array, &n) in data.sample_array_2d.iter_mut().zip(data.samples_2d_array_sizes.iter()) {
            *array = sobol_2d(n, spp, &mut pixel.rng);
        }

        pixel.start_pixel(p);
    }

    /// Rounds up to power of 2.
    ///
    /// * `n` - The integer value to round.
    fn round_count(&self, n: usize) -> usize {
        n.next_power_of_two()
    }
}

/// Returns `C * a` as a value in [0, 1) after XOR-ing `scramble`.
fn sample_generator_matrix(c: &[u32; 32], a: u32, scramble: u32) -> Float {
    min(
        (multiply_generator(c, a) ^ scramble) as Float * hexf32!("0x1.0p-32"),
        ONE_MINUS_EPSILON,
    )
}

/// Searches upper triangular generator matrices for the one whose
/// `2^log2_n` points `(i / n, C * i)` form a (0, 2)-net with the largest
/// minimum toroidal distance. The Sobol' matrix is the first candidate and
/// the search is seeded by `log2_n` so it is deterministic.
///
/// These matrices come from a seeded random search over (0, 2)-nets, so
/// they are not pbrt's published `CMaxMinDist` table and the resulting
/// points differ from pbrt's for the same sample count.
///
/// * `log2_n` - Base 2 logarithm of the number of points.
pub fn max_min_dist_matrix(log2_n: u32) -> [u32; 32] {
    if log2_n <= 1 {
        return C_SOBOL;
    }

    let mut rng = RNG::new(log2_n as u64);
    let mut best = C_SOBOL;
    let mut best_dist = min_toroidal_distance2(&C_SOBOL, log2_n);
    for _ in 0..CANDIDATE_MATRICES {
        let mut c = [0_u32; 32];
        for (l, column) in c.iter_mut().enumerate() {
            // Diagonal bit plus random bits in the rows above it.
            let above = if l == 0 { 0 } else { rng.uniform_u32() & !(u32::MAX >> l) };
            *column = (1 << (31 - l)) | above;
        }
        if !is_zero_two_net(&c, log2_n) {
            continue;
        }
        let dist = min_toroidal_distance2(&c, log2_n);
        if dist > best_dist {
            best = c;
            best_dist = dist;
        }
    }
    debug!(
        "MaxMinDistSampler: 2^{} point net with min distance {}",
        log2_n,
        best_dist.sqrt()
    );
    best
}

/// Returns `true` if every elementary interval of volume `1 / 2^m` holds
/// exactly one of the points `(i / 2^m, C * i)`.
fn is_zero_two_net(c: &[u32; 32], m: u32) -> bool {
    let m = m as usize;
    (0..=m).all(|k| {
        // Top k bits of x are index bits m - 1 .. m - k; top m - k bits of y
        // come from the matrix rows.
        let mut rows: Vec<u64> = (0..k).map(|j| 1_u64 << (m - 1 - j)).collect();
        rows.extend((0..m - k).map(|j| {
            (0..m).fold(0_u64, |row, l| row | ((((c[l] >> (31 - j)) & 1) as u64) << l))
        }));
        gf2_rank(rows) == m
    })
}

fn gf2_rank(mut rows: Vec<u64>) -> usize {
    let mut rank = 0;
    for bit in 0..64 {
        if let Some(pivot) = (rank..rows.len()).find(|&r| (rows[r] >> bit) & 1 != 0) {
            rows.swap(rank, pivot);
            let pivot_row = rows[rank];
            for (r, row) in rows.iter_mut().enumerate() {
                if r != rank && (*row >> bit) & 1 != 0 {
                    *row ^= pivot_row;
                }
            }
            rank += 1;
        }
    }
    rank
}

/// Returns the smallest squared toroidal distance between two points of the
/// net.
fn min_toroidal_distance2(c: &[u32; 32], m: u32) -> Float {
    let n = 1_u32 << m;
    let points: Vec<Point2f> = (0..n)
        .map(|i| Point2f::new(i as Float / n as Float, sample_generator_matrix(c, i, 0)))
        .collect();
    let wrap = |d: Float| {
        let d = d.abs();
        min(d, 1.0 - d)
    };
    let mut best = Float::INFINITY;
    for (i, a) in points.iter().enumerate() {
        for b in points.iter().skip(i + 1) {
            let dx = wrap(a.x - b.x);
            let dy = wrap(a.y - b.y);
            best = min(best, dx * dx + dy * dy);
        }
    }
    best
}

// ---- Tests ----

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sobol_matrix_is_a_net() {
        for m in 0..8 {
            assert!(is_zero_two_net(&C_SOBOL, m));
        }
    }

    #[test]
    fn chosen_matrix_is_a_net_at_least_as_spread_as_sobol() {
        for m in 2..7 {
            let c = max_min_dist_matrix(m);
            assert!(is_zero_two_net(&c, m));
            assert!(min_toroidal_distance2(&c, m) >= min_toroidal_distance2(&C_SOBOL, m));
        }
    }

    #[test]
    fn first_dimension_is_stratified_in_x() {
        let mut sampler = MaxMinDistSampler::new(16, 2, 1);
        sampler.start_pixel(&Point2i::new(0, 0));
        let mut strata = [false; 16];
        loop {
            let u = sampler.get_2d();
            strata[(u.x * 16.0) as usize] = true;
            if !sampler.start_next_sample() {
                break;
            }
        }
        assert!(strata.iter().all(|&s| s));
    }

    #[test]
    fn sample_count_is_rounded_and_capped() {
        assert_eq!(MaxMinDistSampler::new(12, 1, 0).samples_per_pixel(), 16);
        assert_eq!(
            MaxMinDistSampler::new(5000, 1, 0).samples_per_pixel(),
            1 << MAX_MIN_DIST_LOG2_SAMPLES
        );
    }

    #[test]
    fn clones_share_the_matrix_and_reseed() {
        let sampler = MaxMinDistSampler::new(8, 2, 0);
        let mut a = sampler.clone_sampler(5);
        let mut b = sampler.clone_sampler(5);
        a.start_pixel(&Point2i::new(2, 2));
        b.start_pixel(&Point2i::new(2, 2));
        assert_eq!(a.get_2d(), b.get_2d());
        assert_eq!(a.get_1d(), b.get_1d());
    }
}
