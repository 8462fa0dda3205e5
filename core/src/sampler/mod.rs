//! Sampler

mod common;
mod global_sampler;
mod pixel_sampler;

use crate::camera::*;
use crate::geometry::*;
use crate::pbrt::*;

// Re-export
pub use common::*;
pub use global_sampler::*;
pub use pixel_sampler::*;

/// Sampler interface.
///
/// Per pixel the renderer calls `start_pixel()`, then for every sample draws
/// values with `get_1d()`, `get_2d()` and the array getters before moving on
/// with `start_next_sample()` until it returns `false`. A sampler is used by
/// exactly one thread at a time; use `clone_sampler()` to get one per task.
pub trait Sampler: Send + Sync {
    /// Returns a shared reference underlying `SamplerData`.
    fn get_data(&self) -> &SamplerData;

    /// Returns a mutable reference to underlying `SamplerData`.
    fn get_data_mut(&mut self) -> &mut SamplerData;

    /// Generates a new instance of an initial `Sampler` for use by a
    /// rendering thread. The clone keeps the requested arrays and sample
    /// count and reseeds any random number generator.
    ///
    /// * `seed` - The seed for the random number generator (if any).
    fn clone_sampler(&self, seed: u64) -> Box<dyn Sampler>;

    /// This should be called when the rendering algorithm is ready to start
    /// working on a given pixel.
    ///
    /// * `p` - The pixel.
    fn start_pixel(&mut self, p: &Point2i) {
        self.get_data_mut().start_pixel(p);
    }

    /// Returns the sample value for the next dimension of the current sample
    /// vector.
    fn get_1d(&mut self) -> Float;

    /// Returns the sample value for the next two dimensions of the current
    /// sample vector.
    fn get_2d(&mut self) -> Point2f;

    /// Returns an initialized `CameraSample` for a given pixel. The film
    /// offset, time and lens position are always the first five dimensions.
    ///
    /// * `p_raster` - The pixel.
    fn get_camera_sample(&mut self, p_raster: &Point2i) -> CameraSample {
        let film_sample = self.get_2d();
        let p_film = Point2f::new(
            p_raster.x as Float + film_sample.x,
            p_raster.y as Float + film_sample.y,
        );
        let time = self.get_1d();
        let p_lens = self.get_2d();
        CameraSample::new(p_film, p_lens, time)
    }

    /// This should be called before rendering begins when an array of 1D
    /// samples is required.
    ///
    /// * `n` - The number of samples.
    fn request_1d_array(&mut self, n: usize) {
        debug_assert_eq!(self.round_count(n), n);
        self.get_data_mut().request_1d_array(n);
    }

    /// This should be called before rendering begins when an array of 2D
    /// samples is required.
    ///
    /// * `n` - The number of samples.
    fn request_2d_array(&mut self, n: usize) {
        debug_assert_eq!(self.round_count(n), n);
        self.get_data_mut().request_2d_array(n);
    }

    /// Returns the array size closest to `n` that the sampler generates
    /// well (e.g. the next power of two). The default returns `n`.
    ///
    /// * `n` - The integer value to round.
    fn round_count(&self, n: usize) -> usize {
        n
    }

    /// Returns the next requested 1D array for the current sample or `None`
    /// once all requested arrays were consumed.
    ///
    /// * `n` - The number of samples.
    fn get_1d_array(&mut self, n: usize) -> Option<Vec<Float>> {
        self.get_data_mut().get_1d_array(n)
    }

    /// Returns the next requested 2D array for the current sample or `None`
    /// once all requested arrays were consumed.
    ///
    /// * `n` - The number of samples.
    fn get_2d_array(&mut self, n: usize) -> Option<Vec<Point2f>> {
        self.get_data_mut().get_2d_array(n)
    }

    /// Advances to the next sample of the current pixel. Returns `true` while
    /// the sample index is below `samples_per_pixel`.
    fn start_next_sample(&mut self) -> bool {
        self.get_data_mut().start_next_sample()
    }

    /// Set the index of the sample in the current pixel to generate next.
    /// Returns `true` if the index is below `samples_per_pixel`.
    ///
    /// * `sample_num` - The sample number.
    fn set_sample_number(&mut self, sample_num: usize) -> bool {
        self.get_data_mut().set_sample_number(sample_num)
    }

    /// Returns the number of samples generated for each pixel.
    fn samples_per_pixel(&self) -> usize {
        self.get_data().samples_per_pixel
    }

    /// Returns the pixel currently being sampled.
    fn current_pixel(&self) -> Point2i {
        self.get_data().current_pixel
    }

    /// Returns the index of the current sample within the pixel.
    fn current_sample_number(&self) -> usize {
        self.get_data().current_pixel_sample_index
    }
}
