//! Primitives

use crate::geometry::*;
use crate::interaction::*;
use crate::light::*;
use crate::material::*;
use crate::medium::*;
use crate::memory::MemoryArena;
use std::sync::Arc;

mod geometric_primitive;
mod primitive_list;

// Re-export
pub use geometric_primitive::*;
pub use primitive_list::*;

/// Primitive trait provide common behavior.
pub trait Primitive: Send + Sync {
    /// Returns a bounding box in the world space.
    fn world_bound(&self) -> Bounds3f;

    /// Returns geometric details if a ray intersects the primitive and updates
    /// the t_max parameter of the ray. If there is no intersection, `None` is
    /// returned.
    ///
    /// * `r` - The ray.
    fn intersect(&self, r: &mut Ray) -> Option<SurfaceInteraction<'_>>;

    /// Returns `true` if a ray-primitive intersection succeeds; otherwise `false`.
    ///
    /// * `r` - The ray.
    fn intersect_p(&self, r: &Ray) -> bool;

    /// Returns the area light that describes the primitive's emission
    /// distribution, if the primitive is itself a light source.
    fn get_area_light(&self) -> Option<ArcLight>;

    /// Returns the material instance assigned to the primitive. If `None` is
    /// returned, ray intersections with the primitive should be ignored; the
    /// primitive only serves to delineate a volume of space for participating
    /// media.
    fn get_material(&self) -> Option<ArcMaterial>;

    /// Initializes representations of the light-scattering properties of the
    /// material at the intersection point on the surface.
    ///
    /// * `si`                   - The surface interaction at the intersection.
    /// * `arena`                - The memory arena.
    /// * `mode`                 - Transport mode.
    /// * `allow_multiple_lobes` - Allow BxDFs combining several lobes.
    fn compute_scattering_functions<'a>(
        &'a self,
        si: &mut SurfaceInteraction<'a>,
        arena: &'a MemoryArena,
        mode: TransportMode,
        allow_multiple_lobes: bool,
    );
}

/// Atomic referenced counted `Primitive`.
pub type ArcPrimitive = Arc<dyn Primitive>;
