//! Integrator

mod common;
mod sampler_integrator;

use crate::error::ConfigError;
use crate::geometry::*;
use crate::paramset::ParamSet;

// Re-export.
pub use common::*;
pub use sampler_integrator::*;

/// Reads the optional `pixelbounds` parameter `[x0, x1, y0, y1]` and
/// intersects it with the film's pixel bounds. Without the parameter the
/// film bounds are returned unchanged.
///
/// * `params`      - Integrator parameters.
/// * `film_bounds` - The cropped pixel bounds of the film.
pub fn get_pixel_bounds(params: &ParamSet, film_bounds: &Bounds2i) -> Result<Bounds2i, ConfigError> {
    let pb = params.find_int("pixelbounds");
    match pb.as_slice() {
        [] => Ok(*film_bounds),
        [x0, x1, y0, y1] => {
            let bounds = film_bounds.intersect(&Bounds2i {
                p_min: Point2i::new(*x0, *y0),
                p_max: Point2i::new(*x1, *y1),
            });
            if bounds.area() == 0 {
                Err(ConfigError::PixelBoundsEmpty(format!("{}", bounds)))
            } else {
                Ok(bounds)
            }
        }
        _ => Err(ConfigError::PixelBoundsCount(pb.len())),
    }
}

// ---- Tests ----
