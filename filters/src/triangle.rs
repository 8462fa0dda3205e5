//! Triangle Filter

use render_core::filter::*;
use render_core::geometry::*;
use render_core::paramset::*;
use render_core::pbrt::*;

/// Implements the triangle filter in which the weight falls off linearly from
/// the filter center over the square extent of the filter.
pub struct TriangleFilter {
    /// Filter data.
    pub data: FilterData,
}

impl TriangleFilter {
    /// Returns a new instance of `TriangleFilter`.
    ///
    /// * `radius` - Radius of the filter in x and y directions; beyond this
    ///              filter is 0.
    pub fn new(radius: Vector2f) -> Self {
        Self {
            data: FilterData::new(radius),
        }
    }
}

impl Filter for TriangleFilter {
    fn get_data(&self) -> &FilterData {
        &self.data
    }

    fn evaluate(&self, p: &Point2f) -> Float {
        max(0.0, self.data.radius.x - abs(p.x)) * max(0.0, self.data.radius.y - abs(p.y))
    }
}

impl From<&ParamSet> for TriangleFilter {
    /// Create a `TriangleFilter` from `ParamSet`.
    ///
    /// * `params` - Parameter set.
    fn from(params: &ParamSet) -> Self {
        let xw = params.find_one_float("xwidth", 2.0);
        let yw = params.find_one_float("ywidth", 2.0);
        Self::new(Vector2f::new(xw, yw))
    }
}

// ---- Tests ----

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;
    use proptest::prelude::*;

    #[test]
    fn peak_at_center() {
        let filter = TriangleFilter::new(Vector2f::new(2.0, 1.0));
        assert!(approx_eq!(Float, filter.evaluate(&Point2f::new(0.0, 0.0)), 2.0));
        assert!(approx_eq!(Float, filter.evaluate(&Point2f::new(1.0, 0.5)), 0.5));
        assert_eq!(filter.evaluate(&Point2f::new(2.5, 0.0)), 0.0);
    }

    proptest! {
        #[test]
        fn symmetric_and_non_negative(x in -3.0..3.0 as Float, y in -3.0..3.0 as Float) {
            let filter = TriangleFilter::from(&ParamSet::new());
            let v = filter.evaluate(&Point2f::new(x, y));
            prop_assert!(v >= 0.0);
            prop_assert_eq!(v, filter.evaluate(&Point2f::new(-x, -y)));
        }
    }
}
