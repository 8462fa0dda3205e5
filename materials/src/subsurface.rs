//! Subsurface Material

use render_core::bssrdf::*;
use render_core::interaction::*;
use render_core::material::*;
use render_core::memory::MemoryArena;
use render_core::paramset::*;
use render_core::pbrt::*;
use render_core::reflection::*;
use render_core::spectrum::*;

/// Translucent dielectric whose interior scatters light: a specular
/// boundary over a homogeneous medium described by a tabulated BSSRDF.
pub struct SubsurfaceMaterial {
    /// Scale factor for absorption and scattering coefficients.
    scale: Float,

    /// Reflectivity of the boundary.
    kr: Spectrum,

    /// Transmissivity of the boundary.
    kt: Spectrum,

    /// Absorption coefficient `σa`.
    sigma_a: Spectrum,

    /// Scattering coefficient `σs`.
    sigma_s: Spectrum,

    /// Index of refraction of the scattering medium.
    eta: Float,

    /// Radial scattering profile.
    table: BSSRDFTable,
}

impl SubsurfaceMaterial {
    /// Create a new `SubsurfaceMaterial`.
    ///
    /// * `scale`   - Scale factor for `sigma_a` and `sigma_s`.
    /// * `kr`      - Reflectivity of the boundary.
    /// * `kt`      - Transmissivity of the boundary.
    /// * `sigma_a` - Absorption coefficient `σa`.
    /// * `sigma_s` - Scattering coefficient `σs`.
    /// * `g`       - Henyey-Greenstein asymmetry parameter.
    /// * `eta`     - Index of refraction of the scattering medium.
    pub fn new(
        scale: Float,
        kr: Spectrum,
        kt: Spectrum,
        sigma_a: Spectrum,
        sigma_s: Spectrum,
        g: Float,
        eta: Float,
    ) -> Self {
        Self {
            scale,
            kr,
            kt,
            sigma_a,
            sigma_s,
            eta,
            table: BSSRDFTable::new(BSSRDF_RHO_SAMPLES, BSSRDF_RADIUS_SAMPLES, g, eta),
        }
    }

    /// Create a `SubsurfaceMaterial` from a diffuse reflectance and a mean
    /// free path instead of scattering coefficients.
    ///
    /// * `kd`  - Diffuse reflectance.
    /// * `mfp` - Mean free path.
    /// * `kr`  - Reflectivity of the boundary.
    /// * `kt`  - Transmissivity of the boundary.
    /// * `g`   - Henyey-Greenstein asymmetry parameter.
    /// * `eta` - Index of refraction of the scattering medium.
    pub fn from_diffuse(kd: Spectrum, mfp: Spectrum, kr: Spectrum, kt: Spectrum, g: Float, eta: Float) -> Self {
        let table = BSSRDFTable::new(BSSRDF_RHO_SAMPLES, BSSRDF_RADIUS_SAMPLES, g, eta);
        let (sigma_a, sigma_s) = table.subsurface_from_diffuse(&kd.clamp(0.0, 1.0), &mfp);
        Self {
            scale: 1.0,
            kr,
            kt,
            sigma_a,
            sigma_s,
            eta,
            table,
        }
    }
}

impl Material for SubsurfaceMaterial {
    /// Allocates the specular boundary and the BSSRDF of the interior.
    ///
    /// * `si`                   - The surface interaction at the intersection.
    /// * `arena`                - The arena for memory allocations.
    /// * `mode`                 - Transport mode.
    /// * `allow_multiple_lobes` - Use a single Fresnel-weighted lobe.
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
        if bxdfs.is_empty() {
            return;
        }

        let sigma_a = (self.sigma_a * self.scale).clamp(0.0, INFINITY);
        let sigma_s = (self.sigma_s * self.scale).clamp(0.0, INFINITY);
        let bssrdf = TabulatedBSSRDF::new(si, self.eta, sigma_a, sigma_s, &self.table, self, mode);
        si.bssrdf = Some(arena.alloc(bssrdf));
    }
}

impl From<&ParamSet> for SubsurfaceMaterial {
    /// Create a subsurface material from given parameter set. Coefficients
    /// default to a skin-like medium in inverse millimeters.
    ///
    /// * `params` - Parameter set.
    fn from(params: &ParamSet) -> Self {
        let sigma_a = params.find_one_spectrum("sigma_a", Spectrum::from_rgb([0.0011, 0.0024, 0.014]));
        let sigma_s = params.find_one_spectrum("sigma_s", Spectrum::from_rgb([2.55, 3.21, 3.77]));
        let scale = params.find_one_float("scale", 1.0);
        let g = params.find_one_float("g", 0.0);
        let kr = params.find_one_spectrum("Kr", Spectrum::ONE);
        let kt = params.find_one_spectrum("Kt", Spectrum::ONE);
        let mut eta = params.find_one_float("eta", 1.33);
        if eta <= 0.0 {
            error!("Subsurface index of refraction {} is not positive; using 1.33.", eta);
            eta = 1.33;
        }
        Self::new(scale, kr, kt, sigma_a, sigma_s, g, eta)
    }
}

/// Create a subsurface material from diffuse reflectance `Kd` and mean free
/// path `mfp`.
///
/// * `params` - Parameter set.
pub fn create_kd_subsurface(params: &ParamSet) -> SubsurfaceMaterial {
    let kd = params.find_one_spectrum("Kd", Spectrum::new(0.5));
    let mfp = params.find_one_spectrum("mfp", Spectrum::ONE);
    let g = params.find_one_float("g", 0.0);
    let kr = params.find_one_spectrum("Kr", Spectrum::ONE);
    let kt = params.find_one_spectrum("Kt", Spectrum::ONE);
    let eta = params.find_one_float("eta", 1.33);
    SubsurfaceMaterial::from_diffuse(kd, mfp, kr, kt, g, eta)
}

// ---- Tests ----

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::plane_hit;
    use render_core::geometry::*;

    #[test]
    fn translucent_surface_gets_a_bssrdf() {
        let material = SubsurfaceMaterial::from(&ParamSet::new());
        let arena = MemoryArena::default();
        let mut si = plane_hit(Vector3f::new(0.0, 0.0, 1.0));
        material.compute_scattering_functions(&mut si, &arena, TransportMode::Radiance, true);

        let bsdf = si.bsdf.unwrap();
        assert_eq!(bsdf.num_components(BxDFType::BSDF_ALL), 1);
        assert_eq!(bsdf.num_components(BxDFType::BSDF_ALL & !BxDFType::BSDF_SPECULAR), 0);

        let bssrdf = si.bssrdf.unwrap();
        assert!(!bssrdf.sr(0.5).is_black());
    }

    #[test]
    fn opaque_boundary_has_no_bssrdf() {
        let material = SubsurfaceMaterial::new(
            1.0,
            Spectrum::ZERO,
            Spectrum::ZERO,
            Spectrum::new(1.0),
            Spectrum::new(1.0),
            0.0,
            1.33,
        );
        let arena = MemoryArena::default();
        let mut si = plane_hit(Vector3f::new(0.0, 0.0, 1.0));
        material.compute_scattering_functions(&mut si, &arena, TransportMode::Radiance, false);
        assert_eq!(si.bsdf.unwrap().num_components(BxDFType::BSDF_ALL), 0);
        assert!(si.bssrdf.is_none());
    }

    #[test]
    fn brighter_diffuse_reflectance_scatters_more() {
        let dull = SubsurfaceMaterial::from_diffuse(
            Spectrum::new(0.2),
            Spectrum::ONE,
            Spectrum::ONE,
            Spectrum::ONE,
            0.0,
            1.33,
        );
        let bright = SubsurfaceMaterial::from_diffuse(
            Spectrum::new(0.8),
            Spectrum::ONE,
            Spectrum::ONE,
            Spectrum::ONE,
            0.0,
            1.33,
        );
        let albedo = |m: &SubsurfaceMaterial| m.sigma_s[0] / (m.sigma_a[0] + m.sigma_s[0]);
        assert!(albedo(&bright) > albedo(&dull));
    }
}
