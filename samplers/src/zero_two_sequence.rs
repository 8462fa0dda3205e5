//! (0, 2)-Sequence Sampler.

use crate::{pixel_samples, round_up_power_of_2, sampled_dimensions};
use render_core::app::Options;
use render_core::error::ConfigError;
use render_core::forward_pixel_sampler;
use render_core::geometry::*;
use render_core::low_discrepancy::*;
use render_core::paramset::*;
use render_core::sampler::*;

/// Implements a (0, 2)-sequence sampler. Every dimension of a pixel is a
/// randomly scrambled and shuffled (0, 2)-sequence, so each pixel sample's
/// values are well stratified in pairs.
#[derive(Clone)]
pub struct ZeroTwoSequenceSampler {
    /// Use a pixel sampler.
    pixel: PixelSampler,
}

impl ZeroTwoSequenceSampler {
    /// Create a new `ZeroTwoSequenceSampler`.
    ///
    /// * `samples_per_pixel`    - Number of samples per pixel; rounded up to
    ///                            a power of 2.
    /// * `n_sampled_dimensions` - Number of dimensions for sampling.
    /// * `seed`                 - Seed for the random number generator.
    pub fn new(samples_per_pixel: usize, n_sampled_dimensions: usize, seed: u64) -> Self {
        let spp = round_up_power_of_2("ZeroTwoSequenceSampler", samples_per_pixel);
        Self {
            pixel: PixelSampler::new(spp, n_sampled_dimensions, seed),
        }
    }

    /// Create a `ZeroTwoSequenceSampler` from `pixelsamples` (default 16)
    /// and `dimensions` (default 4).
    ///
    /// * `params`  - Sampler parameters.
    /// * `options` - Render options.
    pub fn create(params: &ParamSet, options: &Options) -> Result<Self, ConfigError> {
        let spp = pixel_samples(params, 16, options)?;
        let n_dims = sampled_dimensions(params)?;
        Ok(Self::new(spp, n_dims, 0))
    }
}

impl Sampler for ZeroTwoSequenceSampler {
    forward_pixel_sampler!();

    fn clone_sampler(&self, seed: u64) -> Box<dyn Sampler> {
        Box::new(Self {
            pixel: self.pixel.reseeded(seed),
        })
    }

    fn start_pixel(&mut self, p: &Point2i) {
        let spp = self.pixel.data.samples_per_pixel;
        let pixel = &mut self.pixel;

        // Generate 1D and 2D pixel sample components using (0, 2)-sequence.
        for samples in pixel.samples_1d.iter_mut() {
            *samples = van_der_corput(1, spp, &mut pixel.rng);
        }
        for samples in pixel.samples_2d.iter_mut() {
            *samples = sobol_2d(1, spp, &mut pixel.rng);
        }

        // Generate 1D and 2D array samples using (0, 2)-sequence.
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

// ---- Tests ----

#[cfg(test)]
mod tests {
    use super::*;
    use render_core::pbrt::*;

    fn pixel_values(sampler: &mut dyn Sampler, p: &Point2i) -> Vec<Float> {
        let mut values = vec![];
        sampler.start_pixel(p);
        loop {
            values.push(sampler.get_1d());
            let u = sampler.get_2d();
            values.push(u.x);
            values.push(u.y);
            if !sampler.start_next_sample() {
                break;
            }
        }
        values
    }

    #[test]
    fn sample_count_rounds_up() {
        let sampler = ZeroTwoSequenceSampler::new(6, 2, 0);
        assert_eq!(sampler.samples_per_pixel(), 8);
    }

    #[test]
    fn first_dimension_is_stratified() {
        let mut sampler = ZeroTwoSequenceSampler::new(16, 1, 3);
        sampler.start_pixel(&Point2i::new(4, 2));
        let mut strata = [false; 16];
        loop {
            let u = sampler.get_1d();
            strata[(u * 16.0) as usize] = true;
            if !sampler.start_next_sample() {
                break;
            }
        }
        assert!(strata.iter().all(|&s| s));
    }

    #[test]
    fn clones_with_same_seed_agree() {
        let sampler = ZeroTwoSequenceSampler::new(8, 2, 0);
        let mut a = sampler.clone_sampler(11);
        let mut b = sampler.clone_sampler(11);
        let mut c = sampler.clone_sampler(12);
        let p = Point2i::new(1, 1);
        let va = pixel_values(a.as_mut(), &p);
        assert_eq!(va, pixel_values(b.as_mut(), &p));
        assert_ne!(va, pixel_values(c.as_mut(), &p));
    }

    #[test]
    fn exhausted_dimensions_fall_back_to_uniform() {
        let mut sampler = ZeroTwoSequenceSampler::new(4, 0, 5);
        sampler.start_pixel(&Point2i::new(0, 0));
        for _ in 0..10 {
            let u = sampler.get_1d();
            assert!((0.0..1.0).contains(&u));
        }
    }

    #[test]
    fn arrays_are_filled_per_sample() {
        let mut sampler = ZeroTwoSequenceSampler::new(4, 2, 1);
        sampler.request_2d_array(4);
        sampler.start_pixel(&Point2i::new(0, 0));
        let mut count = 0;
        loop {
            let array = sampler.get_2d_array(4).unwrap();
            assert_eq!(array.len(), 4);
            count += 1;
            if !sampler.start_next_sample() {
                break;
            }
        }
        assert_eq!(count, 4);
    }
}
