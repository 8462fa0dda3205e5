//! Random Sampler.

use crate::pixel_samples;
use render_core::app::Options;
use render_core::error::ConfigError;
use render_core::geometry::*;
use render_core::paramset::*;
use render_core::pbrt::*;
use render_core::rng::*;
use render_core::sampler::*;

/// Implements a sampler that uses a PRNG to generate uniformly random samples.
#[derive(Clone)]
pub struct RandomSampler {
    /// The common sampler data.
    data: SamplerData,

    /// The random number generator.
    rng: RNG,
}

impl RandomSampler {
    /// Create a new `RandomSampler`.
    ///
    /// * `samples_per_pixel` - Number of samples to generate for each pixel.
    /// * `seed`              - Seed for the random number generator.
    pub fn new(samples_per_pixel: usize, seed: u64) -> Self {
        Self {
            data: SamplerData::new(samples_per_pixel),
            rng: RNG::new(seed),
        }
    }

    /// Create a `RandomSampler` from `pixelsamples` (default 4).
    ///
    /// * `params`  - Sampler parameters.
    /// * `options` - Render options.
    pub fn create(params: &ParamSet, options: &Options) -> Result<Self, ConfigError> {
        Ok(Self::new(pixel_samples(params, 4, options)?, 0))
    }
}

impl Sampler for RandomSampler {
    fn get_data(&self) -> &SamplerData {
        &self.data
    }

    fn get_data_mut(&mut self) -> &mut SamplerData {
        &mut self.data
    }

    fn clone_sampler(&self, seed: u64) -> Box<dyn Sampler> {
        let mut sampler = self.clone();
        sampler.rng.set_sequence(seed);
        Box::new(sampler)
    }

    fn start_pixel(&mut self, p: &Point2i) {
        for array in self.data.sample_array_1d.iter_mut() {
            for v in array.iter_mut() {
                *v = self.rng.uniform_float();
            }
        }
        for array in self.data.sample_array_2d.iter_mut() {
            for v in array.iter_mut() {
                *v = Point2f::new(self.rng.uniform_float(), self.rng.uniform_float());
            }
        }
        self.data.start_pixel(p);
    }

    fn get_1d(&mut self) -> Float {
        debug_assert!(self.data.current_pixel_sample_index < self.data.samples_per_pixel);
        self.rng.uniform_float()
    }

    fn get_2d(&mut self) -> Point2f {
        debug_assert!(self.data.current_pixel_sample_index < self.data.samples_per_pixel);
        let x = self.rng.uniform_float();
        let y = self.rng.uniform_float();
        Point2f::new(x, y)
    }
}

// ---- Tests ----

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    #[test]
    fn clones_with_same_seed_agree() {
        let sampler = RandomSampler::new(2, 0);
        let mut a = sampler.clone_sampler(42);
        let mut b = sampler.clone_sampler(42);
        let mut c = sampler.clone_sampler(43);
        let p = Point2i::new(0, 0);
        a.start_pixel(&p);
        b.start_pixel(&p);
        c.start_pixel(&p);
        let (ua, ub, uc) = (a.get_2d(), b.get_2d(), c.get_2d());
        assert_eq!(ua, ub);
        assert_ne!(ua, uc);
    }

    #[test]
    fn values_average_to_one_half() {
        let mut sampler = RandomSampler::new(1, 7);
        sampler.start_pixel(&Point2i::new(0, 0));
        let n = 20_000;
        let mean = (0..n).map(|_| sampler.get_1d()).sum::<Float>() / n as Float;
        assert!(approx_eq!(Float, mean, 0.5, epsilon = 0.01));
    }

    #[test]
    fn arrays_are_refilled_each_pixel() {
        let mut sampler = RandomSampler::new(1, 1);
        sampler.request_1d_array(3);
        sampler.start_pixel(&Point2i::new(0, 0));
        let first = sampler.get_1d_array(3).unwrap();
        sampler.start_pixel(&Point2i::new(1, 0));
        let second = sampler.get_1d_array(3).unwrap();
        assert_ne!(first, second);
    }
}
