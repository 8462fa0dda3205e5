//! Sobol' Sampler.

use crate::{pixel_samples, round_up_power_of_2};
use render_core::app::Options;
use render_core::error::ConfigError;
use render_core::geometry::*;
use render_core::low_discrepancy::*;
use render_core::paramset::*;
use render_core::pbrt::*;
use render_core::rng::*;
use render_core::sampler::*;
use std::sync::Arc;

/// A Sobol' sampler.
pub type SobolSampler = GlobalSampler<SobolSequence>;

/// The Sobol' sequence scaled over the smallest power of 2 square covering
/// the sample bounds, so that the first two dimensions of consecutive
/// samples of a pixel land inside it.
#[derive(Clone)]
pub struct SobolSequence {
    /// Generator matrices; shared between clones.
    matrices: Arc<SobolMatrices>,

    /// Maps per pixel sample numbers to sequence indices.
    interval_map: Arc<SobolIntervalMap>,

    /// Sample bounds.
    sample_bounds: Bounds2i,

    /// Side of the square covering the sample bounds.
    resolution: Int,
}

impl SobolSequence {
    /// Create a new `SobolSequence`.
    ///
    /// * `sample_bounds` - Sample bounds.
    pub fn new(sample_bounds: &Bounds2i) -> Self {
        let diag = sample_bounds.diagonal();
        let resolution = round_up_pow2(max(max(diag.x, diag.y), 1));
        let log2_resolution = log2_int(resolution as u64);
        let matrices = SobolMatrices::new();
        let interval_map = SobolIntervalMap::new(&matrices, log2_resolution);
        Self {
            matrices: Arc::new(matrices),
            interval_map: Arc::new(interval_map),
            sample_bounds: *sample_bounds,
            resolution,
        }
    }

    /// Returns a `SobolSampler`.
    ///
    /// * `samples_per_pixel` - Number of samples per pixel; rounded up to a
    ///                         power of 2.
    /// * `sample_bounds`     - Sample bounds.
    pub fn sampler(samples_per_pixel: usize, sample_bounds: &Bounds2i) -> SobolSampler {
        let spp = round_up_power_of_2("SobolSampler", samples_per_pixel);
        GlobalSampler::new(spp, Self::new(sample_bounds))
    }

    /// Create a `SobolSampler` from `pixelsamples` (default 16).
    ///
    /// * `params`        - Sampler parameters.
    /// * `sample_bounds` - Sample bounds.
    /// * `options`       - Render options.
    pub fn create_sampler(
        params: &ParamSet,
        sample_bounds: &Bounds2i,
        options: &Options,
    ) -> Result<SobolSampler, ConfigError> {
        let spp = pixel_samples(params, 16, options)?;
        Ok(Self::sampler(spp, sample_bounds))
    }

    /// Returns the side of the power of 2 square the sequence is scaled to.
    pub fn resolution(&self) -> Int {
        self.resolution
    }
}

impl GlobalSequence for SobolSequence {
    fn index_for_sample(&mut self, pixel: &Point2i, sample_num: u64) -> u64 {
        let p = *pixel - self.sample_bounds.p_min;
        self.interval_map.index(sample_num, p.x as u32, p.y as u32)
    }

    fn sample_dimension(&self, pixel: &Point2i, index: u64, dim: usize) -> Float {
        if dim >= self.matrices.dimensions() {
            // Past the generator matrices every (index, dimension) pair gets
            // its own random stream.
            let mut rng = RNG::new(index);
            rng.set_sequence(index ^ ((dim as u64) << 40));
            return rng.uniform_float();
        }

        let s = self.matrices.sample(index, dim, 0);
        if dim < 2 {
            // Map to an offset inside `pixel`.
            let v = s * self.resolution as Float + self.sample_bounds.p_min[dim] as Float;
            clamp(v - pixel[dim] as Float, 0.0, ONE_MINUS_EPSILON)
        } else {
            s
        }
    }

    fn round_count(&self, n: usize) -> usize {
        n.next_power_of_two()
    }
}

// ---- Tests ----

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds() -> Bounds2i {
        Bounds2i::new(Point2i::new(2, 3), Point2i::new(12, 9))
    }

    #[test]
    fn resolution_covers_bounds() {
        assert_eq!(SobolSequence::new(&bounds()).resolution(), 16);
    }

    #[test]
    fn sample_count_rounds_up() {
        assert_eq!(SobolSequence::sampler(3, &bounds()).samples_per_pixel(), 4);
    }

    #[test]
    fn film_samples_stay_inside_pixel() {
        let mut sampler = SobolSequence::sampler(8, &bounds());
        for y in 3..9 {
            for x in 2..12 {
                let p = Point2i::new(x, y);
                sampler.start_pixel(&p);
                loop {
                    let cs = sampler.get_camera_sample(&p);
                    assert!(cs.p_film.x >= x as Float && cs.p_film.x < (x + 1) as Float);
                    assert!(cs.p_film.y >= y as Float && cs.p_film.y < (y + 1) as Float);
                    if !sampler.start_next_sample() {
                        break;
                    }
                }
            }
        }
    }

    #[test]
    fn film_offsets_are_stratified() {
        let mut sampler = SobolSequence::sampler(4, &bounds());
        let p = Point2i::new(5, 5);
        sampler.start_pixel(&p);
        let mut quadrants = [false; 4];
        loop {
            let u = sampler.get_2d();
            quadrants[(u.x * 2.0) as usize * 2 + (u.y * 2.0) as usize] = true;
            if !sampler.start_next_sample() {
                break;
            }
        }
        assert!(quadrants.iter().all(|&q| q));
    }

    #[test]
    fn dimensions_past_the_matrices_are_deterministic() {
        let seq = SobolSequence::new(&bounds());
        let p = Point2i::new(2, 3);
        let dim = NUM_SOBOL_DIMENSIONS + 3;
        let a = seq.sample_dimension(&p, 17, dim);
        assert_eq!(a, seq.sample_dimension(&p, 17, dim));
        assert!((0.0..1.0).contains(&a));
        assert_ne!(a, seq.sample_dimension(&p, 18, dim));
    }
}
