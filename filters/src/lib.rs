//! Filters

mod boxf; // box is reserved keyword
mod gaussian;
mod triangle;

use render_core::error::ConfigError;
use render_core::filter::*;
use render_core::paramset::*;
use std::sync::Arc;

// Re-export.
pub use boxf::*;
pub use gaussian::*;
pub use triangle::*;

/// Creates a reconstruction filter by name.
///
/// * `name`   - One of `box`, `gaussian` or `triangle`.
/// * `params` - Filter parameters.
pub fn create_filter(name: &str, params: &ParamSet) -> Result<ArcFilter, ConfigError> {
    match name {
        "box" => Ok(Arc::new(BoxFilter::from(params))),
        "gaussian" => Ok(Arc::new(GaussianFilter::from(params))),
        "triangle" => Ok(Arc::new(TriangleFilter::from(params))),
        _ => Err(ConfigError::Unknown {
            kind: "filter",
            name: name.to_string(),
        }),
    }
}

// ---- Tests ----

#[cfg(test)]
mod tests {
    use super::*;
    use render_core::geometry::*;

    #[test]
    fn known_filters_are_created() {
        for name in ["box", "gaussian", "triangle"] {
            let filter = create_filter(name, &ParamSet::new()).unwrap();
            assert!(filter.evaluate(&Point2f::new(0.0, 0.0)) > 0.0);
        }
        assert!(create_filter("mitchell", &ParamSet::new()).is_err());
    }
}
