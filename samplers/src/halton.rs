//! Halton Sampler.

use crate::pixel_samples;
use render_core::app::Options;
use render_core::error::ConfigError;
use render_core::geometry::*;
use render_core::low_discrepancy::*;
use render_core::paramset::*;
use render_core::pbrt::*;
use render_core::rng::*;
use render_core::sampler::*;
use std::sync::Arc;

/// Maximum resolution for sampling first 2 dimensions.
const K_MAX_RESOLUTION: Int = 128;

/// A Halton sampler.
pub type HaltonSampler = GlobalSampler<HaltonSequence>;

/// The Halton sequence scaled so that the first two dimensions cover a
/// `2^j x 3^k` pixel block. Dimensions from 2 on use digit permuted
/// radical inverses.
#[derive(Clone)]
pub struct HaltonSequence {
    /// The scale factors `2^j` and `3^k`.
    base_scales: [u64; 2],

    /// The exponents `j` and `k` of `base_scales`.
    base_exponents: [u32; 2],

    /// `2^j * 3^k`. Each pixel of the block is visited once per stride.
    sample_stride: u64,

    /// Multiplicative inverses for `base_scales`.
    mult_inverse: [u64; 2],

    /// Indicates if pixel is sampled at the center.
    sample_at_pixel_center: bool,

    /// Digit permutations for all prime bases; shared between clones.
    permutations: Arc<[u16]>,

    /// Pixel for which `offset_for_current_pixel` was computed.
    pixel_for_offset: Point2i,

    /// Index of the first Halton sample in `pixel_for_offset`.
    offset_for_current_pixel: u64,
}

impl HaltonSequence {
    /// Create a new `HaltonSequence`.
    ///
    /// * `sample_bounds`    - Sample bounds.
    /// * `sample_at_center` - Place the film sample at the pixel center.
    pub fn new(sample_bounds: &Bounds2i, sample_at_center: bool) -> Self {
        // Find radical inverse, base scales and exponents that cover sampling area.
        let res = sample_bounds.p_max - sample_bounds.p_min;
        let mut base_scales = [1_u64; 2];
        let mut base_exponents = [0_u32; 2];
        for i in 0..2 {
            let base = if i == 0 { 2 } else { 3 };
            while (base_scales[i] as Int) < min(res[i], K_MAX_RESOLUTION) {
                base_scales[i] *= base;
                base_exponents[i] += 1;
            }
        }

        let sample_stride = base_scales[0] * base_scales[1];
        let mult_inverse = [
            multiplicative_inverse(base_scales[1] as i64, base_scales[0] as i64),
            multiplicative_inverse(base_scales[0] as i64, base_scales[1] as i64),
        ];

        let permutations: Arc<[u16]> = compute_radical_inverse_permutations(&mut RNG::default()).into();

        Self {
            base_scales,
            base_exponents,
            sample_stride,
            mult_inverse,
            sample_at_pixel_center: sample_at_center,
            permutations,
            pixel_for_offset: Point2i::new(Int::MAX, Int::MAX),
            offset_for_current_pixel: 0,
        }
    }

    /// Returns a `HaltonSampler`.
    ///
    /// * `samples_per_pixel` - Number of samples per pixel.
    /// * `sample_bounds`     - Sample bounds.
    /// * `sample_at_center`  - Place the film sample at the pixel center.
    pub fn sampler(samples_per_pixel: usize, sample_bounds: &Bounds2i, sample_at_center: bool) -> HaltonSampler {
        GlobalSampler::new(samples_per_pixel, Self::new(sample_bounds, sample_at_center))
    }

    /// Create a `HaltonSampler` from `pixelsamples` (default 16) and
    /// `samplepixelcenter` (default false).
    ///
    /// * `params`        - Sampler parameters.
    /// * `sample_bounds` - Sample bounds.
    /// * `options`       - Render options.
    pub fn create_sampler(
        params: &ParamSet,
        sample_bounds: &Bounds2i,
        options: &Options,
    ) -> Result<HaltonSampler, ConfigError> {
        let spp = pixel_samples(params, 16, options)?;
        let sample_at_center = params.find_one_bool("samplepixelcenter", false);
        Ok(Self::sampler(spp, sample_bounds, sample_at_center))
    }

    /// Returns the shared digit permutations.
    pub fn permutations(&self) -> &Arc<[u16]> {
        &self.permutations
    }
}

impl GlobalSequence for HaltonSequence {
    fn index_for_sample(&mut self, pixel: &Point2i, sample_num: u64) -> u64 {
        if *pixel != self.pixel_for_offset {
            // Compute Halton sample offset for `pixel`.
            self.offset_for_current_pixel = 0;
            if self.sample_stride > 1 {
                let pm = [
                    rem(pixel.x, K_MAX_RESOLUTION) as u64,
                    rem(pixel.y, K_MAX_RESOLUTION) as u64,
                ];
                for i in 0..2 {
                    let dim_offset = if i == 0 {
                        inverse_radical_inverse::<2>(pm[i], self.base_exponents[i])
                    } else {
                        inverse_radical_inverse::<3>(pm[i], self.base_exponents[i])
                    };
                    let offset =
                        dim_offset * (self.sample_stride / self.base_scales[i]) * self.mult_inverse[i] % self.sample_stride;
                    self.offset_for_current_pixel = (self.offset_for_current_pixel + offset) % self.sample_stride;
                }
            }
            self.pixel_for_offset = *pixel;
        }
        self.offset_for_current_pixel + sample_num * self.sample_stride
    }

    fn sample_dimension(&self, _pixel: &Point2i, index: u64, dim: usize) -> Float {
        if self.sample_at_pixel_center && (dim == 0 || dim == 1) {
            0.5
        } else if dim == 0 {
            radical_inverse(dim, index >> self.base_exponents[0])
        } else if dim == 1 {
            radical_inverse(dim, index / self.base_scales[1])
        } else {
            // Dimensions past the prime table wrap around to earlier bases.
            scrambled_radical_inverse(dim, index, permutation_for_dimension(&self.permutations, dim))
        }
    }
}

/// Returns `a^-1 mod n` for coprime `a` and `n`.
fn multiplicative_inverse(a: i64, n: i64) -> u64 {
    let (x, _) = extended_gcd(a as u64, n as u64);
    x.rem_euclid(n) as u64
}

fn extended_gcd(a: u64, b: u64) -> (i64, i64) {
    if b == 0 {
        return (1, 0);
    }
    let d = (a / b) as i64;
    let (xp, yp) = extended_gcd(b, a % b);
    (yp, xp - d * yp)
}

// ---- Tests ----

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    fn bounds(w: Int, h: Int) -> Bounds2i {
        Bounds2i::new(Point2i::new(0, 0), Point2i::new(w, h))
    }

    #[test]
    fn multiplicative_inverses() {
        assert_eq!(multiplicative_inverse(3, 8), 3);
        assert_eq!(multiplicative_inverse(9, 16), 9);
        assert_eq!((multiplicative_inverse(16, 27) * 16) % 27, 1);
        assert_eq!((multiplicative_inverse(128, 243) * 128) % 243, 1);
    }

    #[test]
    fn scales_cover_the_image() {
        let seq = HaltonSequence::new(&bounds(20, 7), false);
        assert_eq!(seq.base_scales, [32, 9]);
        assert_eq!(seq.base_exponents, [5, 2]);
        assert_eq!(seq.sample_stride, 288);
    }

    #[test]
    fn film_samples_land_in_their_pixel() {
        // The low digits of the index are the mirrored pixel coordinates, so
        // the first two radical inverses fall inside the pixel.
        let mut seq = HaltonSequence::new(&bounds(8, 9), false);
        for y in 0..9 {
            for x in 0..8 {
                let p = Point2i::new(x, y);
                for s in 0..3 {
                    let index = seq.index_for_sample(&p, s);
                    assert_eq!(index % 8, inverse_radical_inverse::<2>(x as u64, 3));
                    assert_eq!(index % 9, inverse_radical_inverse::<3>(y as u64, 2));
                }
            }
        }
    }

    #[test]
    fn pixel_center_option() {
        let mut sampler = HaltonSequence::sampler(4, &bounds(4, 4), true);
        sampler.start_pixel(&Point2i::new(1, 2));
        let cs = sampler.get_camera_sample(&Point2i::new(1, 2));
        assert!(approx_eq!(Float, cs.p_film.x, 1.5));
        assert!(approx_eq!(Float, cs.p_film.y, 2.5));
    }

    #[test]
    fn clones_share_permutations_and_values() {
        let sampler = HaltonSequence::sampler(4, &bounds(16, 16), false);
        let mut a = sampler.clone_sampler(1);
        let mut b = sampler.clone_sampler(2);
        a.start_pixel(&Point2i::new(3, 5));
        b.start_pixel(&Point2i::new(3, 5));
        for _ in 0..6 {
            assert_eq!(a.get_1d(), b.get_1d());
        }
        let clone = sampler.clone();
        assert!(Arc::ptr_eq(clone.sequence().permutations(), sampler.sequence().permutations()));
    }

    #[test]
    fn high_dimensions_stay_in_unit_interval() {
        let mut sampler = HaltonSequence::sampler(2, &bounds(4, 4), false);
        sampler.start_pixel(&Point2i::new(0, 0));
        for _ in 0..200 {
            let u = sampler.get_1d();
            assert!((0.0..1.0).contains(&u));
        }
    }
}
