//! Specular Transmission

use super::*;

/// Perfect specular transmission through a dielectric interface.
#[derive(Copy, Clone, Debug)]
pub struct SpecularTransmission {
    /// Transmission scale factor.
    t: Spectrum,

    /// Index of refraction above the surface.
    eta_a: Float,

    /// Index of refraction below the surface.
    eta_b: Float,

    /// Indicates whether incident ray started from a light source or from
    /// the camera.
    mode: TransportMode,
}

impl SpecularTransmission {
    /// Create a new specular transmission model.
    ///
    /// * `t`     - Transmission scale factor.
    /// * `eta_a` - Index of refraction above the surface.
    /// * `eta_b` - Index of refraction below the surface.
    /// * `mode`  - Transport mode.
    pub fn new(t: Spectrum, eta_a: Float, eta_b: Float, mode: TransportMode) -> BxDF {
        BxDF::SpecularTransmission(Self { t, eta_a, eta_b, mode })
    }

    /// Returns the BxDF type.
    pub fn get_type(&self) -> BxDFType {
        BxDFType::BSDF_TRANSMISSION | BxDFType::BSDF_SPECULAR
    }

    /// A delta distribution never matches an arbitrary pair of directions.
    pub fn f(&self, _wo: &Vector3f, _wi: &Vector3f) -> Spectrum {
        Spectrum::ZERO
    }

    /// Returns the refracted direction with a PDF of 1.
    ///
    /// * `wo` - Outgoing direction.
    /// * `_u` - Unused.
    pub fn sample_f(&self, wo: &Vector3f, _u: &Point2f) -> BxDFSample {
        // Figure out which η is incident and which is transmitted.
        let entering = cos_theta(wo) > 0.0;
        let (eta_i, eta_t) = if entering {
            (self.eta_a, self.eta_b)
        } else {
            (self.eta_b, self.eta_a)
        };

        let n = Normal3f::new(0.0, 0.0, 1.0).face_forward(wo);
        match refract(wo, &n, eta_i / eta_t) {
            Some(wi) => {
                let fresnel = Fresnel::Dielectric {
                    eta_i: self.eta_a,
                    eta_t: self.eta_b,
                };
                let mut ft = self.t * (Spectrum::ONE - fresnel.evaluate(cos_theta(&wi)));

                // Account for non-symmetry with transmission to different medium.
                if self.mode == TransportMode::Radiance {
                    ft *= (eta_i * eta_i) / (eta_t * eta_t);
                }
                BxDFSample::new(ft / abs_cos_theta(&wi), 1.0, wi, self.get_type())
            }
            None => BxDFSample::from(self.get_type()),
        }
    }

    /// Returns 0 as a delta distribution can't be matched.
    pub fn pdf(&self, _wo: &Vector3f, _wi: &Vector3f) -> Float {
        0.0
    }
}
