//! Mirror Material

use render_core::interaction::*;
use render_core::material::*;
use render_core::memory::MemoryArena;
use render_core::paramset::*;
use render_core::reflection::*;
use render_core::spectrum::*;

/// Implements a simple mirror, modeled with perfect specular reflection.
pub struct MirrorMaterial {
    /// Reflectivity of the mirror.
    kr: Spectrum,
}

impl MirrorMaterial {
    /// Create a new `MirrorMaterial`.
    ///
    /// * `kr` - Reflectivity of the mirror.
    pub fn new(kr: Spectrum) -> Self {
        Self { kr }
    }
}

impl Material for MirrorMaterial {
    fn compute_scattering_functions<'a>(
        &'a self,
        si: &mut SurfaceInteraction<'a>,
        arena: &'a MemoryArena,
        _mode: TransportMode,
        _allow_multiple_lobes: bool,
    ) {
        let r = self.kr.clamp(0.0, 1.0);
        let bxdfs = if r.is_black() {
            vec![]
        } else {
            vec![SpecularReflection::new(r, Fresnel::NoOp)]
        };
        si.bsdf = Some(BSDF::alloc(arena, si.hit.n, si.shading.n, &si.shading.dpdu, 1.0, &bxdfs));
    }
}

impl From<&ParamSet> for MirrorMaterial {
    /// Create a mirror material from given parameter set.
    ///
    /// * `params` - Parameter set.
    fn from(params: &ParamSet) -> Self {
        Self::new(params.find_one_spectrum("Kr", Spectrum::new(0.9)))
    }
}

// ---- Tests ----

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::plane_hit;
    use float_cmp::approx_eq;
    use render_core::geometry::*;
    use render_core::pbrt::*;

    #[test]
    fn reflects_about_the_normal() {
        let material = MirrorMaterial::from(&ParamSet::new());
        let arena = MemoryArena::default();
        let wo = Vector3f::new(0.6, 0.0, 0.8);
        let mut si = plane_hit(wo);
        material.compute_scattering_functions(&mut si, &arena, TransportMode::Radiance, true);

        let bsdf = si.bsdf.unwrap();
        let sample = bsdf.sample_f(&si.hit.wo, &Point2f::new(0.5, 0.5), BxDFType::BSDF_ALL);
        assert!(sample.bxdf_type.is_specular());
        assert!(approx_eq!(Float, sample.wi.x, -0.6, epsilon = 1e-6));
        assert!(approx_eq!(Float, sample.wi.z, 0.8, epsilon = 1e-6));
        assert_eq!(sample.pdf, 1.0);

        // f * |cos| / pdf recovers the reflectivity.
        let weight = sample.f * sample.wi.abs_dot(&si.shading.n) / sample.pdf;
        assert!(approx_eq!(Float, weight[1], 0.9, epsilon = 1e-5));
        assert!(bsdf.f(&si.hit.wo, &sample.wi, BxDFType::BSDF_ALL).is_black());
    }
}
