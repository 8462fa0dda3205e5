//! Glass Material

use render_core::interaction::*;
use render_core::material::*;
use render_core::memory::MemoryArena;
use render_core::paramset::*;
use render_core::pbrt::*;
use render_core::reflection::*;
use render_core::spectrum::*;

/// Implements perfect specular reflection and transmission, weighted by
/// Fresnel terms for accurate angular-dependent variation.
pub struct GlassMaterial {
    /// Reflectivity of the surface.
    kr: Spectrum,

    /// Transmissibity of the surface.
    kt: Spectrum,

    /// The index of refraction of the inside of the object. The exterior is
    /// assumed to be a vacuum with an IOR of 1.
    eta: Float,
}

impl GlassMaterial {
    /// Create a new `GlassMaterial`.
    ///
    /// * `kr`  - Reflectivity of the surface.
    /// * `kt`  - Transmissibity of the surface.
    /// * `eta` - Index of refraction of the inside of the object.
    pub fn new(kr: Spectrum, kt: Spectrum, eta: Float) -> Self {
        Self { kr, kt, eta }
    }
}

impl Material for GlassMaterial {
    /// Allocates a single Fresnel-weighted specular lobe when multiple-lobe
    /// BxDFs are allowed and separate reflection and transmission lobes
    /// otherwise.
    ///
    /// * `si`                   - The surface interaction at the intersection.
    /// * `arena`                - The arena for memory allocations.
    /// * `mode`                 - Transport mode.
    /// * `allow_multiple_lobes` - Use the combined lobe.
    fn compute_scattering_functions<'a>(
        &'a self,
        si: &mut SurfaceInteraction<'a>,
        arena: &'a MemoryArena,
        mode: TransportMode,
        allow_multiple_lobes: bool,
    ) {
        let r = self.kr.clamp(0.0, 1.0);
        let t = self.kt.clamp(0.0, 1.0);

        let mut bxdfs = Vec::with_capacity(2);
        if !(r.is_black() && t.is_black()) {
            if allow_multiple_lobes {
                bxdfs.push(FresnelSpecular::new(r, t, 1.0, self.eta, mode));
            } else {
                if !r.is_black() {
                    let fresnel = Fresnel::Dielectric {
                        eta_i: 1.0,
                        eta_t: self.eta,
                    };
                    bxdfs.push(SpecularReflection::new(r, fresnel));
                }
                if !t.is_black() {
                    bxdfs.push(SpecularTransmission::new(t, 1.0, self.eta, mode));
                }
            }
        }

        si.bsdf = Some(BSDF::alloc(arena, si.hit.n, si.shading.n, &si.shading.dpdu, self.eta, &bxdfs));
    }
}

impl From<&ParamSet> for GlassMaterial {
    /// Create a glass material from given parameter set.
    ///
    /// * `params` - Parameter set.
    fn from(params: &ParamSet) -> Self {
        let kr = params.find_one_spectrum("Kr", Spectrum::ONE);
        let kt = params.find_one_spectrum("Kt", Spectrum::ONE);
        let mut eta = params.find_one_float("eta", params.find_one_float("index", 1.5));
        if eta <= 0.0 {
            error!("Glass index of refraction {} is not positive; using 1.5.", eta);
            eta = 1.5;
        }
        Self::new(kr, kt, eta)
    }
}

// ---- Tests ----

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::plane_hit;
    use float_cmp::approx_eq;
    use render_core::geometry::*;

    #[test]
    fn combined_lobe_splits_by_fresnel() {
        let material = GlassMaterial::from(&ParamSet::new());
        let arena = MemoryArena::default();
        let mut si = plane_hit(Vector3f::new(0.0, 0.0, 1.0));
        material.compute_scattering_functions(&mut si, &arena, TransportMode::Radiance, true);
        let bsdf = si.bsdf.unwrap();
        assert_eq!(bsdf.num_components(BxDFType::BSDF_ALL), 1);
        assert!(approx_eq!(Float, bsdf.eta, 1.5));

        // Normal incidence reflects 4% for eta = 1.5.
        let reflected = bsdf.sample_f(&si.hit.wo, &Point2f::new(0.01, 0.5), BxDFType::BSDF_ALL);
        assert!(reflected.bxdf_type.contains(BxDFType::BSDF_REFLECTION));
        assert!(approx_eq!(Float, reflected.pdf, 0.04, epsilon = 1e-4));

        let refracted = bsdf.sample_f(&si.hit.wo, &Point2f::new(0.5, 0.5), BxDFType::BSDF_ALL);
        assert!(refracted.bxdf_type.contains(BxDFType::BSDF_TRANSMISSION));
        assert!(approx_eq!(Float, refracted.wi.z, -1.0, epsilon = 1e-5));
    }

    #[test]
    fn separate_lobes_without_multiple_lobe_support() {
        let material = GlassMaterial::new(Spectrum::ONE, Spectrum::ZERO, 1.5);
        let arena = MemoryArena::default();
        let mut si = plane_hit(Vector3f::new(0.0, 0.0, 1.0));
        material.compute_scattering_functions(&mut si, &arena, TransportMode::Importance, false);
        let bsdf = si.bsdf.unwrap();
        assert_eq!(bsdf.num_components(BxDFType::BSDF_REFLECTION | BxDFType::BSDF_SPECULAR), 1);
        assert_eq!(bsdf.num_components(BxDFType::BSDF_TRANSMISSION | BxDFType::BSDF_SPECULAR), 0);
    }
}
