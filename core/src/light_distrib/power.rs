//! Power Light Distribution.

use crate::geometry::*;
use crate::sampling::*;
use crate::scene::*;
use std::sync::Arc;

/// PowerLightDistribution returns a distribution with sampling probability
/// proportional to the total emitted power for each light. It ignores the
/// provided point. This works well for scenes where the most powerful
/// lights are also the most important contributors to lighting in the
/// scene.
pub struct PowerLightDistribution {
    distrib: Arc<Distribution1D>,
}

impl PowerLightDistribution {
    /// Create a new instance of `PowerLightDistribution`.
    ///
    /// * `scene` - The scene.
    pub fn new(scene: &Scene) -> Self {
        Self {
            distrib: Arc::new(compute_light_power_distribution(scene)),
        }
    }

    /// Returns the distribution; `p` is ignored.
    pub fn lookup(&self, _p: &Point3f) -> Arc<Distribution1D> {
        Arc::clone(&self.distrib)
    }
}

/// Returns a distribution over the scene's lights proportional to the
/// luminance of their emitted power.
///
/// * `scene` - The scene.
pub fn compute_light_power_distribution(scene: &Scene) -> Distribution1D {
    let light_power: Vec<_> = scene.lights.iter().map(|light| light.power().y()).collect();
    Distribution1D::new(light_power)
}
