//! 2D Distribution.

use crate::geometry::*;
use crate::pbrt::*;
use crate::sampling::Distribution1D;

/// Represents a piecewise-constant 2D function’s PDF and CDF and provides
/// methods to perform this sampling efficiently.
#[derive(Clone, Debug)]
pub struct Distribution2D {
    /// 1D conditional sampling density `p[ũ|ṽ]` for each `nv`.
    p_conditional_v: Vec<Distribution1D>,

    /// Marginal sampling density p[ṽ].
    p_marginal: Distribution1D,
}

impl Distribution2D {
    /// Returns a new `Distribution2D` for given piecewise-constant function
    /// stored in row-major order.
    ///
    /// * `func` - Piecewise-constant 2D function with `nu * nv` values.
    /// * `nu`   - Number of values in u.
    /// * `nv`   - Number of values in v.
    pub fn new(func: &[Float], nu: usize, nv: usize) -> Self {
        debug_assert_eq!(func.len(), nu * nv);
        let p_conditional_v: Vec<Distribution1D> = func
            .chunks(nu)
            .take(nv)
            .map(|row| Distribution1D::new(row.to_vec()))
            .collect();
        let marginal_func: Vec<Float> = p_conditional_v.iter().map(|pcv| pcv.func_int).collect();
        let p_marginal = Distribution1D::new(marginal_func);
        Self {
            p_conditional_v,
            p_marginal,
        }
    }

    /// Return a sample point and PDF from the distribution given a random sample.
    ///
    /// * `u` - The random sample.
    pub fn sample_continuous(&self, u: &Point2f) -> (Point2f, Float) {
        // Draw a sample from the p[ṽ] marginal distribution in order to find
        // the ṽ coordinate.
        let (d1, pdf1, v) = self.p_marginal.sample_continuous(u[1]);

        // Use ṽ to find the precomputed conditional distribution to use for
        // sampling ũ.
        let (d0, pdf0, _) = self.p_conditional_v[v].sample_continuous(u[0]);

        (Point2f::new(d0, d1), pdf0 * pdf1)
    }

    /// Return the PDF value for a given sample value.
    ///
    /// * `p` - Sample value.
    pub fn pdf(&self, p: &Point2f) -> Float {
        if self.p_marginal.func_int == 0.0 {
            return 0.0;
        }
        let nu = self.p_conditional_v[0].count();
        let nv = self.p_marginal.count();
        let iu = clamp((p[0] * nu as Float) as isize, 0, nu as isize - 1) as usize;
        let iv = clamp((p[1] * nv as Float) as isize, 0, nv as isize - 1) as usize;
        self.p_conditional_v[iv].func[iu] / self.p_marginal.func_int
    }
}

// ---- Tests ----

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;
    use proptest::prelude::*;

    #[test]
    fn pdf_of_sample_matches_sampling_pdf() {
        let func = [1.0, 2.0, 3.0, 4.0, 0.5, 0.5];
        let d = Distribution2D::new(&func, 3, 2);
        let (p, pdf) = d.sample_continuous(&Point2f::new(0.3, 0.7));
        assert!(approx_eq!(Float, pdf, d.pdf(&p), epsilon = 1e-4));
    }

    #[test]
    fn zero_rows_are_not_sampled() {
        let func = [0.0, 0.0, 1.0, 1.0];
        let d = Distribution2D::new(&func, 2, 2);
        for i in 0..100 {
            let (p, _) = d.sample_continuous(&Point2f::new(0.5, i as Float / 100.0));
            assert!(p.y >= 0.5);
        }
    }

    proptest! {
        #[test]
        fn samples_lie_in_unit_square(
            func in prop::collection::vec(0.0..4.0_f32, 12),
            u in 0.0..1.0_f32,
            v in 0.0..1.0_f32,
        ) {
            let d = Distribution2D::new(&func, 4, 3);
            let (p, pdf) = d.sample_continuous(&Point2f::new(u, v));
            prop_assert!((0.0..1.0).contains(&p.x) && (0.0..1.0).contains(&p.y));
            prop_assert!(pdf >= 0.0);
        }
    }
}
