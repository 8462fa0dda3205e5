//! Material

use crate::interaction::*;
use crate::memory::MemoryArena;
use std::sync::Arc;

/// Light transport mode enumeration.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TransportMode {
    /// Indicates incident ray that intersected a point started at the camera.
    Radiance,

    /// Indicates incident ray that intersected a point started at the light
    /// source.
    Importance,
}

/// Material trait provides common behavior.
pub trait Material: Send + Sync {
    /// Initializes representations of the light-scattering properties of the
    /// material at the intersection point on the surface. The BSDF is
    /// allocated in `arena` and stored in `si.bsdf`; translucent materials
    /// also set `si.bssrdf`. The material is borrowed for as long as the
    /// interaction so those values may refer back into it.
    ///
    /// * `si`                   - The surface interaction at the intersection.
    /// * `arena`                - The arena for memory allocations.
    /// * `mode`                 - Transport mode.
    /// * `allow_multiple_lobes` - Indicates whether the material should use
    ///                            BxDFs that aggregate multiple types of
    ///                            scattering into a single BxDF when such BxDFs
    ///                            are available.
    fn compute_scattering_functions<'a>(
        &'a self,
        si: &mut SurfaceInteraction<'a>,
        arena: &'a MemoryArena,
        mode: TransportMode,
        allow_multiple_lobes: bool,
    );
}

/// Atomic reference counted `Material`.
pub type ArcMaterial = Arc<dyn Material>;
