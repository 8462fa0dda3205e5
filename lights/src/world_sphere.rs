//! Scene Bounding Sphere

use arc_swap::ArcSwap;
use render_core::geometry::*;
use render_core::pbrt::*;
use render_core::scene::*;
use std::sync::Arc;

/// Center and radius of a sphere bounding the scene.
#[derive(Copy, Clone, Debug)]
pub(crate) struct Sphere {
    pub center: Point3f,
    pub radius: Float,
}

/// Scene bounding sphere for lights at infinity. It is only known once the
/// scene exists so it is filled in during `Light::preprocess()`.
pub(crate) struct WorldSphere(ArcSwap<Sphere>);

impl WorldSphere {
    /// Returns a unit sphere at the origin until `update()` is called.
    pub fn new() -> Self {
        Self(ArcSwap::from_pointee(Sphere {
            center: Point3f::ZERO,
            radius: 1.0,
        }))
    }

    /// Replaces the sphere with one bounding the scene geometry.
    ///
    /// * `scene` - The scene.
    pub fn update(&self, scene: &Scene) {
        self.set(scene.world_bound.bounding_sphere());
    }

    /// Replaces the sphere.
    ///
    /// * `sphere` - Center and radius.
    pub fn set(&self, (center, radius): (Point3f, Float)) {
        self.0.store(Arc::new(Sphere { center, radius }));
    }

    /// Returns the current sphere.
    pub fn get(&self) -> Sphere {
        **self.0.load()
    }
}
