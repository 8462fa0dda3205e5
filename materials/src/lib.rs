//! Materials

#[macro_use]
extern crate log;

mod glass;
mod matte;
mod mirror;
mod subsurface;

use render_core::error::ConfigError;
use render_core::material::*;
use render_core::paramset::*;
use std::sync::Arc;

// Re-export
pub use glass::*;
pub use matte::*;
pub use mirror::*;
pub use subsurface::*;

/// Creates a material by name.
///
/// * `name`   - One of `matte`, `mirror`, `glass`, `subsurface` or
///              `kdsubsurface`.
/// * `params` - Material parameters.
pub fn create_material(name: &str, params: &ParamSet) -> Result<ArcMaterial, ConfigError> {
    match name {
        "matte" => Ok(Arc::new(MatteMaterial::from(params))),
        "mirror" => Ok(Arc::new(MirrorMaterial::from(params))),
        "glass" => Ok(Arc::new(GlassMaterial::from(params))),
        "subsurface" => Ok(Arc::new(SubsurfaceMaterial::from(params))),
        "kdsubsurface" => Ok(Arc::new(create_kd_subsurface(params))),
        _ => Err(ConfigError::Unknown {
            kind: "material",
            name: name.to_string(),
        }),
    }
}

#[cfg(test)]
pub(crate) mod test_util {
    use render_core::geometry::*;
    use render_core::interaction::*;

    /// Returns a hit on the xy-plane facing +z, viewed from `wo`.
    pub fn plane_hit(wo: Vector3f) -> SurfaceInteraction<'static> {
        SurfaceInteraction::new(
            Point3f::ZERO,
            Vector3f::ZERO,
            Point2f::new(0.5, 0.5),
            wo,
            Vector3f::new(1.0, 0.0, 0.0),
            Vector3f::new(0.0, 1.0, 0.0),
            0.0,
            false,
        )
    }
}
