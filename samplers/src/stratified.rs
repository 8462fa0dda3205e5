//! Stratified Sampler.

use crate::sampled_dimensions;
use render_core::app::Options;
use render_core::error::ConfigError;
use render_core::forward_pixel_sampler;
use render_core::geometry::*;
use render_core::paramset::*;
use render_core::sampler::*;
use render_core::sampling::*;

/// Implements a sampler that subdivides the pixel into `x * y` strata and
/// places one jittered sample in each. Arrays of 2D samples use Latin
/// hypercube sampling since their size need not be a square.
#[derive(Clone)]
pub struct StratifiedSampler {
    /// Use a pixel sampler.
    pixel: PixelSampler,

    /// Number of strata in x-direction.
    x_pixel_samples: usize,

    /// Number of strata in y-direction.
    y_pixel_samples: usize,

    /// Jitter samples inside their strata.
    jitter_samples: bool,
}

impl StratifiedSampler {
    /// Create a new `StratifiedSampler`.
    ///
    /// * `x_pixel_samples`      - Number of strata in x-direction.
    /// * `y_pixel_samples`      - Number of strata in y-direction.
    /// * `jitter_samples`       - Jitter samples inside their strata.
    /// * `n_sampled_dimensions` - Number of dimensions for sampling.
    /// * `seed`                 - Seed for the random number generator.
    pub fn new(
        x_pixel_samples: usize,
        y_pixel_samples: usize,
        jitter_samples: bool,
        n_sampled_dimensions: usize,
        seed: u64,
    ) -> Self {
        Self {
            pixel: PixelSampler::new(x_pixel_samples * y_pixel_samples, n_sampled_dimensions, seed),
            x_pixel_samples,
            y_pixel_samples,
            jitter_samples,
        }
    }

    /// Create a `StratifiedSampler` from `xsamples`, `ysamples` (default 4),
    /// `jitter` (default true) and `dimensions` (default 4).
    ///
    /// * `params`  - Sampler parameters.
    /// * `options` - Render options.
    pub fn create(params: &ParamSet, options: &Options) -> Result<Self, ConfigError> {
        let jitter = params.find_one_bool("jitter", true);
        let mut x_samples = params.find_one_int("xsamples", 4);
        let mut y_samples = params.find_one_int("ysamples", 4);
        if x_samples < 1 || y_samples < 1 {
            return Err(ConfigError::InvalidParameter {
                name: "xsamples/ysamples".to_string(),
                reason: format!("{} x {} strata", x_samples, y_samples),
            });
        }
        let sd = sampled_dimensions(params)?;
        if options.quick_render {
            x_samples = 1;
            y_samples = 1;
        }
        Ok(Self::new(x_samples as usize, y_samples as usize, jitter, sd, 0))
    }
}

impl Sampler for StratifiedSampler {
    forward_pixel_sampler!();

    fn clone_sampler(&self, seed: u64) -> Box<dyn Sampler> {
        Box::new(Self {
            pixel: self.pixel.reseeded(seed),
            x_pixel_samples: self.x_pixel_samples,
            y_pixel_samples: self.y_pixel_samples,
            jitter_samples: self.jitter_samples,
        })
    }

    fn start_pixel(&mut self, p: &Point2i) {
        let spp = self.pixel.data.samples_per_pixel;
        let (nx, ny, jitter) = (self.x_pixel_samples, self.y_pixel_samples, self.jitter_samples);
        let pixel = &mut self.pixel;

        // Generate single stratified samples for the pixel.
        for samples in pixel.samples_1d.iter_mut() {
            *samples = stratified_sample_1d(&mut pixel.rng, spp, jitter);
            pixel.rng.shuffle(samples, spp, 1);
        }
        for samples in pixel.samples_2d.iter_mut() {
            *samples = stratified_sample_2d(&mut pixel.rng, nx, ny, jitter);
            pixel.rng.shuffle(samples, spp, 1);
        }

        // Generate arrays of stratified samples for the pixel.
        let data = &mut pixel.data;
        for (array, &count) in data.sample_array_1d.iter_mut().zip(data.samples_1d_array_sizes.iter()) {
            array.clear();
            for _ in 0..spp {
                let mut samples = stratified_sample_1d(&mut pixel.rng, count, jitter);
                pixel.rng.shuffle(&mut samples, count, 1);
                array.extend(samples);
            }
        }
        for (array, &count) in data.sample_array_2d.iter_mut().zip(data.samples_2d_array_sizes.iter()) {
            array.clear();
            for _ in 0..spp {
                array.extend(latin_hypercube_2d(&mut pixel.rng, count));
            }
        }

        pixel.start_pixel(p);
    }
}

// ---- Tests ----

#[cfg(test)]
mod tests {
    use super::*;
    use render_core::pbrt::*;

    #[test]
    fn one_sample_per_stratum() {
        let mut sampler = StratifiedSampler::new(4, 2, true, 1, 9);
        assert_eq!(sampler.samples_per_pixel(), 8);
        sampler.start_pixel(&Point2i::new(3, 3));
        let mut strata = [[0; 2]; 4];
        loop {
            let u = sampler.get_2d();
            strata[(u.x * 4.0) as usize][(u.y * 2.0) as usize] += 1;
            if !sampler.start_next_sample() {
                break;
            }
        }
        assert!(strata.iter().flatten().all(|&n| n == 1));
    }

    #[test]
    fn unjittered_samples_sit_at_stratum_centres() {
        let mut sampler = StratifiedSampler::new(2, 1, false, 1, 0);
        sampler.start_pixel(&Point2i::new(0, 0));
        let mut xs = vec![sampler.get_2d().x];
        assert!(sampler.start_next_sample());
        xs.push(sampler.get_2d().x);
        xs.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(xs, vec![0.25, 0.75]);
    }

    #[test]
    fn clones_with_same_seed_agree() {
        let sampler = StratifiedSampler::new(2, 2, true, 2, 0);
        let mut a = sampler.clone_sampler(3);
        let mut b = sampler.clone_sampler(3);
        let p = Point2i::new(5, 7);
        a.start_pixel(&p);
        b.start_pixel(&p);
        for _ in 0..4 {
            assert_eq!(a.get_1d(), b.get_1d());
            assert_eq!(a.get_2d(), b.get_2d());
            a.start_next_sample();
            b.start_next_sample();
        }
    }

    #[test]
    fn exhausted_dimensions_fall_back_to_uniform() {
        let mut sampler = StratifiedSampler::new(2, 2, true, 1, 4);
        sampler.start_pixel(&Point2i::new(0, 0));
        let _ = sampler.get_1d();
        let values: Vec<Float> = (0..8).map(|_| sampler.get_1d()).collect();
        assert!(values.iter().all(|u| (0.0..1.0).contains(u)));
        assert!(values.windows(2).any(|w| w[0] != w[1]));
    }

    #[test]
    fn quick_render_uses_a_single_stratum() {
        let options = Options {
            quick_render: true,
            ..Default::default()
        };
        let sampler = StratifiedSampler::create(&ParamSet::new(), &options).unwrap();
        assert_eq!(sampler.samples_per_pixel(), 1);
    }

    #[test]
    fn one_dimensional_arrays_are_stratified() {
        let mut sampler = StratifiedSampler::new(1, 2, true, 0, 2);
        sampler.request_1d_array(4);
        sampler.start_pixel(&Point2i::new(0, 0));
        let mut array = sampler.get_1d_array(4).unwrap();
        array.sort_by(|a, b| a.partial_cmp(b).unwrap());
        for (i, u) in array.iter().enumerate() {
            assert_eq!((u * 4.0) as usize, i);
        }
    }
}
