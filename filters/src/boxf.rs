//! Box Filter

use render_core::filter::*;
use render_core::geometry::*;
use render_core::paramset::*;
use render_core::pbrt::*;

/// Implements the box filter which weights every sample within its square
/// extent equally.
pub struct BoxFilter {
    /// Filter data.
    pub data: FilterData,
}

impl BoxFilter {
    /// Returns a new instance of `BoxFilter`.
    ///
    /// * `radius` - Radius of the filter in x and y directions; beyond this
    ///              filter is 0.
    pub fn new(radius: Vector2f) -> Self {
        Self {
            data: FilterData::new(radius),
        }
    }
}

impl Filter for BoxFilter {
    fn get_data(&self) -> &FilterData {
        &self.data
    }

    fn evaluate(&self, _p: &Point2f) -> Float {
        1.0
    }
}

impl From<&ParamSet> for BoxFilter {
    /// Create a `BoxFilter` from `ParamSet`.
    ///
    /// * `params` - Parameter set.
    fn from(params: &ParamSet) -> Self {
        let xw = params.find_one_float("xwidth", 0.5);
        let yw = params.find_one_float("ywidth", 0.5);
        Self::new(Vector2f::new(xw, yw))
    }
}

// ---- Tests ----

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_radius_covers_one_pixel() {
        let filter = BoxFilter::from(&ParamSet::new());
        assert_eq!(filter.get_data().radius, Vector2f::new(0.5, 0.5));
        assert_eq!(filter.evaluate(&Point2f::new(0.4, -0.4)), 1.0);
    }
}
