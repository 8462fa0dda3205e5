//! Matte Material

use render_core::interaction::*;
use render_core::material::*;
use render_core::memory::MemoryArena;
use render_core::paramset::*;
use render_core::reflection::*;
use render_core::spectrum::*;

/// Implements purely diffuse surfaces.
pub struct MatteMaterial {
    /// Spectral diffuse reflection.
    kd: Spectrum,
}

impl MatteMaterial {
    /// Create a new `MatteMaterial`.
    ///
    /// * `kd` - Spectral diffuse reflection.
    pub fn new(kd: Spectrum) -> Self {
        Self { kd }
    }
}

impl Material for MatteMaterial {
    /// Allocates a Lambertian BSDF. Black surfaces get a BSDF without lobes.
    ///
    /// * `si`                   - The surface interaction at the intersection.
    /// * `arena`                - The arena for memory allocations.
    /// * `mode`                 - Transport mode (ignored).
    /// * `allow_multiple_lobes` - Ignored.
    fn compute_scattering_functions<'a>(
        &'a self,
        si: &mut SurfaceInteraction<'a>,
        arena: &'a MemoryArena,
        _mode: TransportMode,
        _allow_multiple_lobes: bool,
    ) {
        let r = self.kd.clamp(0.0, 1.0);
        let bxdfs = if r.is_black() {
            vec![]
        } else {
            vec![LambertianReflection::new(r)]
        };
        si.bsdf = Some(BSDF::alloc(arena, si.hit.n, si.shading.n, &si.shading.dpdu, 1.0, &bxdfs));
    }
}

impl From<&ParamSet> for MatteMaterial {
    /// Create a matte material from given parameter set.
    ///
    /// * `params` - Parameter set.
    fn from(params: &ParamSet) -> Self {
        Self::new(params.find_one_spectrum("Kd", Spectrum::new(0.5)))
    }
}

// ---- Tests ----
