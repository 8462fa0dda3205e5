//! Uniform Light Distribution.

use crate::geometry::*;
use crate::sampling::*;
use crate::scene::*;
use std::sync::Arc;

/// The simplest possible implementation of LightDistribution: this returns
/// a uniform distribution over all light sources, ignoring the provided
/// point. This approach works well for very simple scenes, but is quite
/// ineffective for scenes with more than a handful of light sources.
pub struct UniformLightDistribution {
    distrib: Arc<Distribution1D>,
}

impl UniformLightDistribution {
    /// Create a new instance of `UniformLightDistribution`.
    ///
    /// * `scene` - The scene.
    pub fn new(scene: &Scene) -> Self {
        Self {
            distrib: Arc::new(Distribution1D::new(vec![1.0; scene.lights.len()])),
        }
    }

    /// Returns the distribution; `p` is ignored.
    pub fn lookup(&self, _p: &Point3f) -> Arc<Distribution1D> {
        Arc::clone(&self.distrib)
    }
}
