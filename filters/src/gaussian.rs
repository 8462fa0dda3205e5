//! Gaussian Filter

use render_core::filter::*;
use render_core::geometry::*;
use render_core::paramset::*;
use render_core::pbrt::*;

/// Implements a Gaussian filter with the value at the filter radius
/// subtracted so it goes to zero at the edge.
pub struct GaussianFilter {
    /// Filter data.
    pub data: FilterData,

    /// Falloff rate; smaller values give a wider bump.
    pub alpha: Float,

    /// `exp(-alpha * radius.x^2)`.
    pub exp_x: Float,

    /// `exp(-alpha * radius.y^2)`.
    pub exp_y: Float,
}

impl GaussianFilter {
    /// Returns a new instance of `GaussianFilter`.
    ///
    /// * `radius` - Radius of the filter in x and y directions.
    /// * `alpha`  - Falloff rate.
    pub fn new(radius: Vector2f, alpha: Float) -> Self {
        Self {
            data: FilterData::new(radius),
            alpha,
            exp_x: (-alpha * radius.x * radius.x).exp(),
            exp_y: (-alpha * radius.y * radius.y).exp(),
        }
    }

    fn gaussian(&self, d: Float, expv: Float) -> Float {
        max(0.0, (-self.alpha * d * d).exp() - expv)
    }
}

impl Filter for GaussianFilter {
    fn get_data(&self) -> &FilterData {
        &self.data
    }

    fn evaluate(&self, p: &Point2f) -> Float {
        self.gaussian(p.x, self.exp_x) * self.gaussian(p.y, self.exp_y)
    }
}

impl From<&ParamSet> for GaussianFilter {
    /// Create a `GaussianFilter` from `ParamSet`.
    ///
    /// * `params` - Parameter set.
    fn from(params: &ParamSet) -> Self {
        let xw = params.find_one_float("xwidth", 2.0);
        let yw = params.find_one_float("ywidth", 2.0);
        let alpha = params.find_one_float("alpha", 2.0);
        Self::new(Vector2f::new(xw, yw), alpha)
    }
}

// ---- Tests ----

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    #[test]
    fn vanishes_at_radius() {
        let filter = GaussianFilter::new(Vector2f::new(1.5, 1.5), 2.0);
        assert!(approx_eq!(Float, filter.evaluate(&Point2f::new(1.5, 0.0)), 0.0, epsilon = 1e-6));
        assert_eq!(filter.evaluate(&Point2f::new(2.0, 0.0)), 0.0);
    }

    #[test]
    fn decreases_away_from_center() {
        let filter = GaussianFilter::from(&ParamSet::new());
        let a = filter.evaluate(&Point2f::new(0.0, 0.0));
        let b = filter.evaluate(&Point2f::new(0.5, 0.0));
        let c = filter.evaluate(&Point2f::new(1.0, 0.5));
        assert!(a > b && b > c);
    }
}
