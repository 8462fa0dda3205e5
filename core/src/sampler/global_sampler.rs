//! Global Sampler.

use super::*;

/// The first dimensions are reserved for the camera sample (film offset,
/// time and lens position). Requested arrays start here.
pub const ARRAY_START_DIM: usize = 5;

/// A low-discrepancy sequence spread over the whole image rather than a
/// single pixel.
pub trait GlobalSequence: Clone + Send + Sync + 'static {
    /// Returns the global index of the `sample_num`-th sample that lands in
    /// `pixel`.
    ///
    /// * `pixel`      - The pixel.
    /// * `sample_num` - Sample number within the pixel.
    fn index_for_sample(&mut self, pixel: &Point2i, sample_num: u64) -> u64;

    /// Returns the sample value for dimension `dim` of the sample at global
    /// `index`. Dimensions 0 and 1 are returned as offsets inside `pixel`.
    ///
    /// * `pixel` - The pixel.
    /// * `index` - Global sample index.
    /// * `dim`   - Dimension.
    fn sample_dimension(&self, pixel: &Point2i, index: u64, dim: usize) -> Float;

    /// Returns the preferred array size for a requested size `n`.
    ///
    /// * `n` - Requested size.
    fn round_count(&self, n: usize) -> usize {
        n
    }
}

/// Sampler base that maps per pixel sample numbers to indices of a
/// `GlobalSequence`.
#[derive(Clone)]
pub struct GlobalSampler<S: GlobalSequence> {
    /// The common sampler data.
    data: SamplerData,

    /// The underlying sequence.
    sequence: S,

    /// Next dimension to be consumed by `get_1d()`/`get_2d()`.
    dimension: usize,

    /// Global index of the current sample.
    interval_sample_index: u64,

    /// Non-array samples resume here once dimension reaches
    /// `ARRAY_START_DIM`.
    array_end_dim: usize,
}

impl<S: GlobalSequence> GlobalSampler<S> {
    /// Creates a new global sampler.
    ///
    /// * `samples_per_pixel` - Number of samples per pixel.
    /// * `sequence`          - The sequence.
    pub fn new(samples_per_pixel: usize, sequence: S) -> Self {
        Self {
            data: SamplerData::new(samples_per_pixel),
            sequence,
            dimension: 0,
            interval_sample_index: 0,
            array_end_dim: ARRAY_START_DIM,
        }
    }

    /// Returns the underlying sequence.
    pub fn sequence(&self) -> &S {
        &self.sequence
    }

    fn next_dimension(&mut self, count: usize) -> usize {
        if self.dimension >= ARRAY_START_DIM && self.dimension < self.array_end_dim {
            self.dimension = self.array_end_dim;
        }
        let dim = self.dimension;
        self.dimension += count;
        dim
    }
}

impl<S: GlobalSequence> Sampler for GlobalSampler<S> {
    fn get_data(&self) -> &SamplerData {
        &self.data
    }

    fn get_data_mut(&mut self) -> &mut SamplerData {
        &mut self.data
    }

    fn clone_sampler(&self, _seed: u64) -> Box<dyn Sampler> {
        // Deterministic sequences need no reseeding.
        Box::new(self.clone())
    }

    fn start_pixel(&mut self, p: &Point2i) {
        self.data.start_pixel(p);
        self.dimension = 0;
        self.interval_sample_index = self.sequence.index_for_sample(p, 0);

        // Recomputed per pixel since arrays may be requested between renders.
        self.array_end_dim = ARRAY_START_DIM + self.data.array_dimensions();

        let spp = self.data.samples_per_pixel;

        // Generate 1D array samples for the whole pixel.
        for i in 0..self.data.samples_1d_array_sizes.len() {
            let n_samples = self.data.samples_1d_array_sizes[i] * spp;
            for j in 0..n_samples {
                let index = self.sequence.index_for_sample(p, j as u64);
                self.data.sample_array_1d[i][j] =
                    self.sequence.sample_dimension(p, index, ARRAY_START_DIM + i);
            }
        }

        // Generate 2D array samples for the whole pixel.
        let mut dim = ARRAY_START_DIM + self.data.samples_1d_array_sizes.len();
        for i in 0..self.data.samples_2d_array_sizes.len() {
            let n_samples = self.data.samples_2d_array_sizes[i] * spp;
            for j in 0..n_samples {
                let index = self.sequence.index_for_sample(p, j as u64);
                let x = self.sequence.sample_dimension(p, index, dim);
                let y = self.sequence.sample_dimension(p, index, dim + 1);
                self.data.sample_array_2d[i][j] = Point2f::new(x, y);
            }
            dim += 2;
        }
        debug_assert_eq!(dim, self.array_end_dim);
    }

    fn get_1d(&mut self) -> Float {
        let dim = self.next_dimension(1);
        let p = self.data.current_pixel;
        self.sequence.sample_dimension(&p, self.interval_sample_index, dim)
    }

    fn get_2d(&mut self) -> Point2f {
        let dim = self.next_dimension(2);
        let p = self.data.current_pixel;
        Point2f::new(
            self.sequence.sample_dimension(&p, self.interval_sample_index, dim),
            self.sequence.sample_dimension(&p, self.interval_sample_index, dim + 1),
        )
    }

    fn round_count(&self, n: usize) -> usize {
        self.sequence.round_count(n)
    }

    fn start_next_sample(&mut self) -> bool {
        self.dimension = 0;
        let p = self.data.current_pixel;
        let next = self.data.current_pixel_sample_index as u64 + 1;
        self.interval_sample_index = self.sequence.index_for_sample(&p, next);
        self.data.start_next_sample()
    }

    fn set_sample_number(&mut self, sample_num: usize) -> bool {
        self.dimension = 0;
        let p = self.data.current_pixel;
        self.interval_sample_index = self.sequence.index_for_sample(&p, sample_num as u64);
        self.data.set_sample_number(sample_num)
    }
}

// ---- Tests ----

#[cfg(test)]
mod tests {
    use super::*;

    /// Encodes the dimension and index in the returned value so tests can
    /// see which dimension was consumed.
    #[derive(Clone)]
    struct Counting;

    impl GlobalSequence for Counting {
        fn index_for_sample(&mut self, pixel: &Point2i, sample_num: u64) -> u64 {
            (pixel.x as u64) * 1000 + sample_num
        }

        fn sample_dimension(&self, _pixel: &Point2i, index: u64, dim: usize) -> Float {
            (dim * 10_000) as Float + index as Float
        }
    }

    fn dim_of(v: Float) -> usize {
        (v / 10_000.0) as usize
    }

    #[test]
    fn non_array_samples_skip_array_dimensions() {
        let mut sampler = GlobalSampler::new(4, Counting);
        sampler.request_1d_array(2);
        sampler.request_2d_array(3);
        sampler.start_pixel(&Point2i::new(1, 0));

        let _ = sampler.get_camera_sample(&Point2i::new(1, 0));
        // Camera sample used dims 0-4; arrays occupy 5, 6 and 7.
        assert_eq!(dim_of(sampler.get_1d()), 8);
        let p = sampler.get_2d();
        assert_eq!((dim_of(p.x), dim_of(p.y)), (9, 10));
    }

    #[test]
    fn arrays_cover_the_whole_pixel_budget() {
        let mut sampler = GlobalSampler::new(2, Counting);
        sampler.request_1d_array(3);
        sampler.start_pixel(&Point2i::new(0, 0));

        let first = sampler.get_1d_array(3).unwrap();
        assert_eq!(first, vec![50_000.0, 50_001.0, 50_002.0]);
        assert!(sampler.start_next_sample());
        let second = sampler.get_1d_array(3).unwrap();
        assert_eq!(second, vec![50_003.0, 50_004.0, 50_005.0]);
        assert!(sampler.get_1d_array(3).is_none());
        assert!(!sampler.start_next_sample());
    }

    #[test]
    fn array_layout_is_recomputed_per_pixel() {
        let mut sampler = GlobalSampler::new(1, Counting);
        sampler.start_pixel(&Point2i::new(0, 0));
        sampler.start_pixel(&Point2i::new(0, 0));
        let _ = sampler.get_camera_sample(&Point2i::new(0, 0));
        assert_eq!(dim_of(sampler.get_1d()), ARRAY_START_DIM);
    }

    #[test]
    fn set_sample_number_selects_global_index() {
        let mut sampler = GlobalSampler::new(8, Counting);
        sampler.start_pixel(&Point2i::new(2, 0));
        assert!(sampler.set_sample_number(5));
        assert_eq!(sampler.get_1d(), 2005.0);
        assert!(!sampler.set_sample_number(8));
    }
}
