//! Surface Interactions

use super::Hit;
use crate::bssrdf::TabulatedBSSRDF;
use crate::geometry::*;
use crate::material::*;
use crate::medium::*;
use crate::memory::MemoryArena;
use crate::pbrt::*;
use crate::primitives::*;
use crate::reflection::*;
use crate::spectrum::*;
use std::fmt;

/// SurfaceInteraction represents geometry of a particular point on a surface.
///
/// The lifetime `'a` covers both the scene that owns the primitive and the
/// memory arena holding the BSDF.
#[derive(Clone)]
pub struct SurfaceInteraction<'a> {
    /// The common interaction data.
    pub hit: Hit,

    /// The uv coordinates from surface parametrization.
    pub uv: Point2f,

    /// Parametric partial derivative of the point ∂p/∂u.
    pub dpdu: Vector3f,

    /// Parametric partial derivative of the point ∂p/∂v.
    pub dpdv: Vector3f,

    /// Shading geometry.
    pub shading: Shading,

    /// The primitive that was hit.
    pub primitive: Option<&'a dyn Primitive>,

    /// The BSDF, once `compute_scattering_functions()` ran.
    pub bsdf: Option<&'a BSDF<'a>>,

    /// Subsurface scattering at this point, for translucent materials.
    pub bssrdf: Option<&'a TabulatedBSSRDF<'a>>,
}

impl<'a> SurfaceInteraction<'a> {
    /// Create a new surface interaction. The geometric normal is the
    /// normalized cross product of the partial derivatives.
    ///
    /// * `p`                   - Point of interaction.
    /// * `p_error`             - Floating point error for ray intersection points.
    /// * `uv`                  - The uv coordinates from surface parametrization.
    /// * `wo`                  - The negative ray direction.
    /// * `dpdu`                - Parametric partial derivative ∂p/∂u.
    /// * `dpdv`                - Parametric partial derivative ∂p/∂v.
    /// * `time`                - Time when interaction occurred.
    /// * `reverse_orientation` - Flip the normal.
    pub fn new(
        p: Point3f,
        p_error: Vector3f,
        uv: Point2f,
        wo: Vector3f,
        dpdu: Vector3f,
        dpdv: Vector3f,
        time: Float,
        reverse_orientation: bool,
    ) -> Self {
        let mut n = Normal3f::from(dpdu.cross(&dpdv).normalize());
        if reverse_orientation {
            n = -n;
        }

        Self {
            hit: Hit::new(p, time, p_error, wo, n, MediumInterface::default()),
            uv,
            dpdu,
            dpdv,
            shading: Shading { n, dpdu },
            primitive: None,
            bsdf: None,
            bssrdf: None,
        }
    }

    /// Allocates the BSDF through the primitive's material. Material-less
    /// surfaces keep `bsdf = None`.
    ///
    /// * `arena`                - The memory arena.
    /// * `mode`                 - Transport mode.
    /// * `allow_multiple_lobes` - Allow BxDFs combining several lobes.
    pub fn compute_scattering_functions(
        &mut self,
        arena: &'a MemoryArena,
        mode: TransportMode,
        allow_multiple_lobes: bool,
    ) {
        if let Some(primitive) = self.primitive {
            primitive.compute_scattering_functions(self, arena, mode, allow_multiple_lobes);
        }
    }

    /// Returns the emitted radiance at a surface point intersected by a ray
    /// for an area light.
    ///
    /// * `w` - The outgoing direction.
    pub fn le(&self, w: &Vector3f) -> Spectrum {
        self.primitive
            .and_then(|p| p.get_area_light())
            .map_or(Spectrum::ZERO, |area| area.l(&self.hit, w))
    }

    /// Spawn's a new ray in the given direction.
    ///
    /// * `d` - The new direction.
    pub fn spawn_ray(&self, d: &Vector3f) -> Ray {
        self.hit.spawn_ray(d)
    }

    /// Spawn's a new ray towards another interaction.
    ///
    /// * `hit` - The interaction.
    pub fn spawn_ray_to_hit(&self, hit: &Hit) -> Ray {
        self.hit.spawn_ray_to_hit(hit)
    }
}

impl<'a> fmt::Debug for SurfaceInteraction<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SurfaceInteraction")
            .field("p", &self.hit.p)
            .field("n", &self.hit.n)
            .field("uv", &self.uv)
            .field("has_bsdf", &self.bsdf.is_some())
            .field("has_bssrdf", &self.bssrdf.is_some())
            .finish()
    }
}

/// Shading geometry used for perturbed values.
#[derive(Copy, Clone, Debug, Default)]
pub struct Shading {
    /// Surface normal.
    pub n: Normal3f,

    /// Parametric partial derivative of the point ∂p/∂u.
    pub dpdu: Vector3f,
}

// ---- Tests ----

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normal_follows_derivatives_and_orientation() {
        let si = SurfaceInteraction::new(
            Point3f::ZERO,
            Vector3f::ZERO,
            Point2f::default(),
            Vector3f::new(0.0, 0.0, 1.0),
            Vector3f::new(1.0, 0.0, 0.0),
            Vector3f::new(0.0, 1.0, 0.0),
            0.0,
            false,
        );
        assert_eq!(si.hit.n, Normal3f::new(0.0, 0.0, 1.0));
        assert!(si.le(&si.hit.wo).is_black());

        let flipped = SurfaceInteraction::new(
            Point3f::ZERO,
            Vector3f::ZERO,
            Point2f::default(),
            Vector3f::new(0.0, 0.0, 1.0),
            Vector3f::new(1.0, 0.0, 0.0),
            Vector3f::new(0.0, 1.0, 0.0),
            0.0,
            true,
        );
        assert_eq!(flipped.hit.n, Normal3f::new(0.0, 0.0, -1.0));
        assert_eq!(flipped.shading.n, flipped.hit.n);
    }
}
