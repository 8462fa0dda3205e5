//! 1D Distribution.

use crate::pbrt::*;

/// Represents a piecewise-constant 1D function’s PDF and CDF and provides
/// methods to perform this sampling efficiently.
#[derive(Clone, Debug)]
pub struct Distribution1D {
    /// Piecewise-constant function; all values are non-negative.
    pub func: Vec<Float>,

    /// CDF for `func` with `func.len() + 1` entries.
    pub cdf: Vec<Float>,

    /// Integral of `func`.
    pub func_int: Float,
}

impl Distribution1D {
    /// Returns a new `Distribution1D` for given piecewise-constant function.
    /// When the function integrates to zero the CDF is uniform.
    ///
    /// * `f` - Piecewise-constant 1D function. Must not be empty.
    pub fn new(f: Vec<Float>) -> Self {
        debug_assert!(!f.is_empty(), "Distribution1D needs at least one value");
        debug_assert!(f.iter().all(|v| *v >= 0.0), "Distribution1D with negative value");
        let n = f.len();

        // Compute integral of step function at `x_i`.
        let mut cdf: Vec<Float> = Vec::with_capacity(n + 1);
        cdf.push(0.0);
        for i in 1..=n {
            cdf.push(cdf[i - 1] + f[i - 1] / n as Float);
        }

        // Transform step function integral into CDF.
        let func_int = cdf[n];
        if func_int == 0.0 {
            for (i, v) in cdf.iter_mut().enumerate().skip(1) {
                *v = i as Float / n as Float;
            }
        } else {
            for v in cdf.iter_mut().skip(1) {
                *v /= func_int;
            }
        }
        // Guard against round-off leaving the last entry slightly below 1.
        cdf[n] = 1.0;

        Self { func: f, cdf, func_int }
    }

    /// Returns the number of sample points for the piecewise-constant function.
    pub fn count(&self) -> usize {
        self.func.len()
    }

    /// Return a sample in [0, 1), PDF and offset from the distribution given
    /// a random sample.
    ///
    /// * `u` - The random sample.
    pub fn sample_continuous(&self, u: Float) -> (Float, Float, usize) {
        // Find surrounding CDF segments and `offset`.
        let offset = find_interval(self.cdf.len(), |index| self.cdf[index] <= u);

        // Compute offset along CDF segment.
        let mut du = u - self.cdf[offset];
        if self.cdf[offset + 1] - self.cdf[offset] > 0.0 {
            du /= self.cdf[offset + 1] - self.cdf[offset];
        }
        debug_assert!(!du.is_nan());

        // Compute PDF for sampled offset.
        let pdf = if self.func_int > 0.0 {
            self.func[offset] / self.func_int
        } else {
            0.0
        };

        // Return `x` in [0,1) corresponding to sample, PDF and offset.
        let x = min((offset as Float + du) / self.count() as Float, ONE_MINUS_EPSILON);
        (x, pdf, offset)
    }

    /// Return a sample from the discrete distribution given a random sample.
    /// Returns the index, the probability of picking it and the sample
    /// remapped to [0, 1) within the chosen segment.
    ///
    /// * `u` - The random sample.
    pub fn sample_discrete(&self, u: Float) -> (usize, Float, Float) {
        // Find surrounding CDF segments and `offset`.
        let offset = find_interval(self.cdf.len(), |index| self.cdf[index] <= u);
        let pdf = if self.func_int > 0.0 {
            self.func[offset] / (self.func_int * self.count() as Float)
        } else {
            1.0 / self.count() as Float
        };

        let width = self.cdf[offset + 1] - self.cdf[offset];
        let u_remapped = if width > 0.0 {
            clamp((u - self.cdf[offset]) / width, 0.0, ONE_MINUS_EPSILON)
        } else {
            0.0
        };

        (offset, pdf, u_remapped)
    }

    /// Return the probability of sampling a given index from the discrete
    /// distribution.
    ///
    /// * `index` - Sample index.
    pub fn discrete_pdf(&self, index: usize) -> Float {
        debug_assert!(index < self.count());
        if self.func_int > 0.0 {
            self.func[index] / (self.func_int * self.count() as Float)
        } else {
            1.0 / self.count() as Float
        }
    }
}

// ---- Tests ----

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;
    use proptest::prelude::*;

    #[test]
    fn zero_function_has_uniform_cdf() {
        let d = Distribution1D::new(vec![0.0; 4]);
        assert_eq!(d.cdf, vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        assert_eq!(d.func_int, 0.0);
        let (offset, pdf, _) = d.sample_discrete(0.6);
        assert_eq!(offset, 2);
        assert!(approx_eq!(Float, pdf, 0.25));
    }

    #[test]
    fn discrete_sampling_frequencies_follow_weights() {
        let d = Distribution1D::new(vec![1.0, 3.0]);
        let n = 10_000;
        let mut counts = [0_usize; 2];
        for i in 0..n {
            let u = (i as Float + 0.5) / n as Float;
            let (offset, _, _) = d.sample_discrete(u);
            counts[offset] += 1;
        }
        assert!(approx_eq!(Float, counts[0] as Float / n as Float, 0.25, epsilon = 1e-3));
        assert!(approx_eq!(Float, counts[1] as Float / n as Float, 0.75, epsilon = 1e-3));
    }

    #[test]
    fn zero_weight_entries_are_never_chosen() {
        let d = Distribution1D::new(vec![0.0, 2.0, 0.0, 2.0]);
        for i in 0..1000 {
            let (offset, pdf, _) = d.sample_discrete(i as Float / 1000.0);
            assert!(offset == 1 || offset == 3);
            assert!(approx_eq!(Float, pdf, 0.5));
        }
    }

    #[test]
    fn continuous_pdf_matches_function() {
        let d = Distribution1D::new(vec![1.0, 3.0]);
        let (x, pdf, offset) = d.sample_continuous(0.5);
        assert_eq!(offset, 1);
        assert!(approx_eq!(Float, pdf, 1.5));
        assert!(x >= 0.5 && x < 1.0);
    }

    proptest! {
        #[test]
        fn cdf_is_monotonic_and_normalized(f in prop::collection::vec(0.0..10.0_f32, 1..32)) {
            let d = Distribution1D::new(f);
            prop_assert_eq!(d.cdf[0], 0.0);
            prop_assert_eq!(d.cdf[d.count()], 1.0);
            prop_assert!(d.cdf.windows(2).all(|w| w[0] <= w[1]));
        }

        #[test]
        fn samples_are_in_range(
            f in prop::collection::vec(0.0..10.0_f32, 1..32),
            u in 0.0..1.0_f32,
        ) {
            let d = Distribution1D::new(f);
            let (x, _, offset) = d.sample_continuous(u);
            prop_assert!((0.0..1.0).contains(&x));
            prop_assert!(offset < d.count());
            let (index, pdf, u_remapped) = d.sample_discrete(u);
            prop_assert!(index < d.count());
            prop_assert!((0.0..1.0).contains(&u_remapped));
            prop_assert!(approx_eq!(Float, pdf, d.discrete_pdf(index), ulps = 4));
        }
    }
}
