//! Common

use crate::geometry::*;
use crate::pbrt::*;

/// Stores the sampler data and implements common functionality for all
/// samplers.
#[derive(Clone, Default)]
pub struct SamplerData {
    /// Number of samples generated for each pixel.
    pub samples_per_pixel: usize,

    /// Coordinates of current pixel being generated.
    pub current_pixel: Point2i,

    /// Sample number of the pixel currently being generated.
    pub current_pixel_sample_index: usize,

    /// Stores sizes of requested 1D sample arrays.
    pub samples_1d_array_sizes: Vec<usize>,

    /// Stores sizes of requested 2D sample arrays.
    pub samples_2d_array_sizes: Vec<usize>,

    /// Stores the `n * samples_per_pixel` values of each requested 1D array.
    pub sample_array_1d: Vec<Vec<Float>>,

    /// Stores the `n * samples_per_pixel` values of each requested 2D array.
    pub sample_array_2d: Vec<Vec<Point2f>>,

    /// Tracks index of the next 1D array. This is reset to 0 when a new
    /// pixel starts or the sample number in current pixel changes.
    pub array_1d_offset: usize,

    /// Tracks index of the next 2D array.
    pub array_2d_offset: usize,
}

impl SamplerData {
    /// Create a new `SamplerData` instance.
    ///
    /// * `samples_per_pixel` - Number of samples to generate for each pixel.
    pub fn new(samples_per_pixel: usize) -> Self {
        Self {
            samples_per_pixel,
            ..Default::default()
        }
    }

    /// Resets the per pixel state.
    ///
    /// * `p` - The pixel.
    pub fn start_pixel(&mut self, p: &Point2i) {
        self.current_pixel = *p;
        self.current_pixel_sample_index = 0;
        self.array_1d_offset = 0;
        self.array_2d_offset = 0;
    }

    /// Records a request for an array of 1D samples.
    ///
    /// * `n` - The number of samples.
    pub fn request_1d_array(&mut self, n: usize) {
        self.samples_1d_array_sizes.push(n);
        self.sample_array_1d.push(vec![0.0; n * self.samples_per_pixel]);
    }

    /// Records a request for an array of 2D samples.
    ///
    /// * `n` - The number of samples.
    pub fn request_2d_array(&mut self, n: usize) {
        self.samples_2d_array_sizes.push(n);
        self.sample_array_2d
            .push(vec![Point2f::default(); n * self.samples_per_pixel]);
    }

    /// Returns the next 1D array for the current sample.
    ///
    /// * `n` - The number of samples.
    pub fn get_1d_array(&mut self, n: usize) -> Option<Vec<Float>> {
        if self.array_1d_offset == self.sample_array_1d.len() {
            return None;
        }
        debug_assert_eq!(self.samples_1d_array_sizes[self.array_1d_offset], n);
        debug_assert!(self.current_pixel_sample_index < self.samples_per_pixel);

        let array = &self.sample_array_1d[self.array_1d_offset];
        self.array_1d_offset += 1;
        let start = self.current_pixel_sample_index * n;
        array.get(start..start + n).map(|s| s.to_vec())
    }

    /// Returns the next 2D array for the current sample.
    ///
    /// * `n` - The number of samples.
    pub fn get_2d_array(&mut self, n: usize) -> Option<Vec<Point2f>> {
        if self.array_2d_offset == self.sample_array_2d.len() {
            return None;
        }
        debug_assert_eq!(self.samples_2d_array_sizes[self.array_2d_offset], n);
        debug_assert!(self.current_pixel_sample_index < self.samples_per_pixel);

        let array = &self.sample_array_2d[self.array_2d_offset];
        self.array_2d_offset += 1;
        let start = self.current_pixel_sample_index * n;
        array.get(start..start + n).map(|s| s.to_vec())
    }

    /// Advances the sample index. Returns `true` if
    /// `current_pixel_sample_index` < `samples_per_pixel`.
    pub fn start_next_sample(&mut self) -> bool {
        self.array_1d_offset = 0;
        self.array_2d_offset = 0;
        self.current_pixel_sample_index += 1;
        self.current_pixel_sample_index < self.samples_per_pixel
    }

    /// Sets the sample index. Returns `true` if `current_pixel_sample_index`
    /// < `samples_per_pixel`.
    ///
    /// * `sample_num` - The sample number.
    pub fn set_sample_number(&mut self, sample_num: usize) -> bool {
        self.array_1d_offset = 0;
        self.array_2d_offset = 0;
        self.current_pixel_sample_index = sample_num;
        self.current_pixel_sample_index < self.samples_per_pixel
    }

    /// Returns the total number of requested array dimensions; each 2D
    /// array counts twice.
    pub fn array_dimensions(&self) -> usize {
        self.sample_array_1d.len() + 2 * self.sample_array_2d.len()
    }
}
