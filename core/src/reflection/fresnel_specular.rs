//! Fresnel-Modulated Specular Reflection and Transmission

use super::*;

/// Chooses between specular reflection and transmission in proportion to
/// the dielectric Fresnel term.
#[derive(Copy, Clone, Debug)]
pub struct FresnelSpecular {
    /// Reflection scale factor.
    r: Spectrum,

    /// Transmission scale factor.
    t: Spectrum,

    /// Index of refraction above the surface.
    eta_a: Float,

    /// Index of refraction below the surface.
    eta_b: Float,

    /// Transport mode.
    mode: TransportMode,
}

impl FresnelSpecular {
    /// Create a new Fresnel-modulated specular model.
    ///
    /// * `r`     - Reflection scale factor.
    /// * `t`     - Transmission scale factor.
    /// * `eta_a` - Index of refraction above the surface.
    /// * `eta_b` - Index of refraction below the surface.
    /// * `mode`  - Transport mode.
    pub fn new(r: Spectrum, t: Spectrum, eta_a: Float, eta_b: Float, mode: TransportMode) -> BxDF {
        BxDF::FresnelSpecular(Self {
            r,
            t,
            eta_a,
            eta_b,
            mode,
        })
    }

    /// Returns the BxDF type.
    pub fn get_type(&self) -> BxDFType {
        BxDFType::BSDF_REFLECTION | BxDFType::BSDF_TRANSMISSION | BxDFType::BSDF_SPECULAR
    }

    /// A delta distribution never matches an arbitrary pair of directions.
    pub fn f(&self, _wo: &Vector3f, _wi: &Vector3f) -> Spectrum {
        Spectrum::ZERO
    }

    /// Samples reflection with probability `F` and transmission otherwise.
    ///
    /// * `wo` - Outgoing direction.
    /// * `u`  - The 2D uniform random values.
    pub fn sample_f(&self, wo: &Vector3f, u: &Point2f) -> BxDFSample {
        let f = fr_dielectric(cos_theta(wo), self.eta_a, self.eta_b);

        if u[0] < f {
            // Perfect specular reflection.
            let wi = Vector3f::new(-wo.x, -wo.y, wo.z);
            let sampled_type = BxDFType::BSDF_SPECULAR | BxDFType::BSDF_REFLECTION;
            BxDFSample::new(self.r * f / abs_cos_theta(&wi), f, wi, sampled_type)
        } else {
            // Figure out which η is incident and which is transmitted.
            let entering = cos_theta(wo) > 0.0;
            let (eta_i, eta_t) = if entering {
                (self.eta_a, self.eta_b)
            } else {
                (self.eta_b, self.eta_a)
            };

            let sampled_type = BxDFType::BSDF_SPECULAR | BxDFType::BSDF_TRANSMISSION;
            let n = Normal3f::new(0.0, 0.0, 1.0).face_forward(wo);
            match refract(wo, &n, eta_i / eta_t) {
                Some(wi) => {
                    let mut ft = self.t * (1.0 - f);

                    // Account for non-symmetry with transmission to different medium.
                    if self.mode == TransportMode::Radiance {
                        ft *= (eta_i * eta_i) / (eta_t * eta_t);
                    }
                    BxDFSample::new(ft / abs_cos_theta(&wi), 1.0 - f, wi, sampled_type)
                }
                None => BxDFSample::from(sampled_type),
            }
        }
    }

    /// Returns 0 as a delta distribution can't be matched.
    pub fn pdf(&self, _wo: &Vector3f, _wi: &Vector3f) -> Float {
        0.0
    }
}
