//! Pixel Sampler.

use super::*;
use crate::rng::*;

/// Shared state for samplers that generate all sample values for all sample
/// vectors of a pixel at once.
///
/// Concrete samplers fill `samples_1d`, `samples_2d` and the requested
/// arrays in `start_pixel()` and forward the per-sample calls here.
#[derive(Clone)]
pub struct PixelSampler {
    /// The common sampler data.
    pub data: SamplerData,

    /// Precomputed 1D values; one vector of `samples_per_pixel` values per
    /// dimension.
    pub samples_1d: Vec<Vec<Float>>,

    /// Precomputed 2D values; one vector of `samples_per_pixel` values per
    /// dimension.
    pub samples_2d: Vec<Vec<Point2f>>,

    /// Offset into the `samples_1d` array for the current pixel sample. It
    /// must be reset to 0 at the start of each new sample.
    pub current_1d_dimension: usize,

    /// Offset into the `samples_2d` array for the current pixel sample.
    pub current_2d_dimension: usize,

    /// The random number generator.
    pub rng: RNG,
}

impl PixelSampler {
    /// Create a new `PixelSampler`.
    ///
    /// * `samples_per_pixel`    - Number of samples per pixel.
    /// * `n_sampled_dimensions` - Number of precomputed dimensions.
    /// * `seed`                 - Seed for the random number generator.
    pub fn new(samples_per_pixel: usize, n_sampled_dimensions: usize, seed: u64) -> Self {
        Self {
            data: SamplerData::new(samples_per_pixel),
            samples_1d: vec![vec![0.0; samples_per_pixel]; n_sampled_dimensions],
            samples_2d: vec![vec![Point2f::default(); samples_per_pixel]; n_sampled_dimensions],
            current_1d_dimension: 0,
            current_2d_dimension: 0,
            rng: RNG::new(seed),
        }
    }

    /// Returns a copy keeping the sample count and requested arrays with
    /// the random number generator reseeded.
    ///
    /// * `seed` - The new seed.
    pub fn reseeded(&self, seed: u64) -> Self {
        let mut clone = self.clone();
        clone.rng.set_sequence(seed);
        clone.current_1d_dimension = 0;
        clone.current_2d_dimension = 0;
        clone
    }

    /// Returns the number of precomputed dimensions.
    pub fn n_sampled_dimensions(&self) -> usize {
        self.samples_1d.len()
    }

    /// Resets the per pixel state.
    ///
    /// * `p` - The pixel.
    pub fn start_pixel(&mut self, p: &Point2i) {
        self.current_1d_dimension = 0;
        self.current_2d_dimension = 0;
        self.data.start_pixel(p);
    }

    /// Returns the next precomputed 1D value or falls back to a uniform
    /// random value once the precomputed dimensions are used up.
    pub fn get_1d(&mut self) -> Float {
        debug_assert!(self.data.current_pixel_sample_index < self.data.samples_per_pixel);
        if self.current_1d_dimension < self.samples_1d.len() {
            let r = self.samples_1d[self.current_1d_dimension][self.data.current_pixel_sample_index];
            self.current_1d_dimension += 1;
            r
        } else {
            self.rng.uniform_float()
        }
    }

    /// Returns the next precomputed 2D value or falls back to uniform random
    /// values once the precomputed dimensions are used up.
    pub fn get_2d(&mut self) -> Point2f {
        debug_assert!(self.data.current_pixel_sample_index < self.data.samples_per_pixel);
        if self.current_2d_dimension < self.samples_2d.len() {
            let r = self.samples_2d[self.current_2d_dimension][self.data.current_pixel_sample_index];
            self.current_2d_dimension += 1;
            r
        } else {
            let x = self.rng.uniform_float();
            let y = self.rng.uniform_float();
            Point2f::new(x, y)
        }
    }

    /// Advances to the next sample.
    pub fn start_next_sample(&mut self) -> bool {
        self.current_1d_dimension = 0;
        self.current_2d_dimension = 0;
        self.data.start_next_sample()
    }

    /// Sets the sample number.
    ///
    /// * `sample_num` - The sample number.
    pub fn set_sample_number(&mut self, sample_num: usize) -> bool {
        self.current_1d_dimension = 0;
        self.current_2d_dimension = 0;
        self.data.set_sample_number(sample_num)
    }
}

/// Implements the `Sampler` methods that forward to a `PixelSampler` field
/// named `pixel`. The implementing type provides `clone_sampler()` and
/// `start_pixel()` itself.
#[macro_export]
macro_rules! forward_pixel_sampler {
    () => {
        fn get_data(&self) -> &$crate::sampler::SamplerData {
            &self.pixel.data
        }

        fn get_data_mut(&mut self) -> &mut $crate::sampler::SamplerData {
            &mut self.pixel.data
        }

        fn get_1d(&mut self) -> $crate::pbrt::Float {
            self.pixel.get_1d()
        }

        fn get_2d(&mut self) -> $crate::geometry::Point2f {
            self.pixel.get_2d()
        }

        fn start_next_sample(&mut self) -> bool {
            self.pixel.start_next_sample()
        }

        fn set_sample_number(&mut self, sample_num: usize) -> bool {
            self.pixel.set_sample_number(sample_num)
        }
    };
}
