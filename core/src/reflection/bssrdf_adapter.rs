//! BSSRDF Adapter

use super::*;
use crate::bssrdf::fresnel_moment_1;

/// Directional term of a separable BSSRDF at the exit point, exposed as a
/// BxDF so the exit point can be shaded like any other surface.
#[derive(Copy, Clone, Debug)]
pub struct BSSRDFAdapter {
    /// Relative index of refraction.
    eta: Float,

    /// Light transport mode.
    mode: TransportMode,
}

impl BSSRDFAdapter {
    /// Create a new adapter.
    ///
    /// * `eta`  - Relative index of refraction of the scattering medium.
    /// * `mode` - Light transport mode.
    pub fn new(eta: Float, mode: TransportMode) -> BxDF {
        BxDF::BSSRDFAdapter(Self { eta, mode })
    }

    /// Returns the normalized Fresnel transmittance for a direction at
    /// `cos_theta` to the normal.
    ///
    /// * `eta`       - Relative index of refraction.
    /// * `cos_theta` - Cosine of the angle to the normal.
    pub fn sw(eta: Float, cos_theta: Float) -> Float {
        let c = 1.0 - 2.0 * fresnel_moment_1(1.0 / eta);
        (1.0 - fr_dielectric(cos_theta, 1.0, eta)) / (c * PI)
    }

    /// Returns the BxDF type.
    pub fn get_type(&self) -> BxDFType {
        BxDFType::BSDF_REFLECTION | BxDFType::BSDF_DIFFUSE
    }

    /// Returns the directional term; radiance picks up `η²` for the change
    /// in solid angle across the boundary.
    pub fn f(&self, _wo: &Vector3f, wi: &Vector3f) -> Spectrum {
        let f = Self::sw(self.eta, cos_theta(wi));
        match self.mode {
            TransportMode::Radiance => Spectrum::new(f * self.eta * self.eta),
            TransportMode::Importance => Spectrum::new(f),
        }
    }

    /// Samples a cosine-weighted direction on the side of `wo`.
    ///
    /// * `wo` - Outgoing direction.
    /// * `u`  - The 2D uniform random values.
    pub fn sample_f(&self, wo: &Vector3f, u: &Point2f) -> BxDFSample {
        let mut wi = cosine_sample_hemisphere(u);
        if wo.z < 0.0 {
            wi.z = -wi.z;
        }
        BxDFSample::new(self.f(wo, &wi), self.pdf(wo, &wi), wi, self.get_type())
    }

    pub fn pdf(&self, wo: &Vector3f, wi: &Vector3f) -> Float {
        if same_hemisphere(wo, wi) {
            abs_cos_theta(wi) * INV_PI
        } else {
            0.0
        }
    }
}

// ---- Tests ----

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    #[test]
    fn radiance_mode_scales_by_eta_squared() {
        let wi = Vector3f::new(0.0, 0.0, 1.0);
        let radiance = BSSRDFAdapter::new(1.5, TransportMode::Radiance).f(&wi, &wi);
        let importance = BSSRDFAdapter::new(1.5, TransportMode::Importance).f(&wi, &wi);
        assert!(approx_eq!(Float, radiance[0], importance[0] * 2.25, epsilon = 1e-5));
        assert!(importance[0] > 0.0);
    }

    #[test]
    fn grazing_directions_transmit_less() {
        let normal = BSSRDFAdapter::sw(1.33, 1.0);
        let grazing = BSSRDFAdapter::sw(1.33, 0.05);
        assert!(grazing < normal);
    }

    #[test]
    fn samples_the_upper_hemisphere() {
        let adapter = BSSRDFAdapter::new(1.33, TransportMode::Radiance);
        let wo = Vector3f::new(0.0, 0.0, 1.0);
        let sample = adapter.sample_f(&wo, &Point2f::new(0.3, 0.7));
        assert!(sample.wi.z > 0.0);
        assert!(approx_eq!(Float, sample.pdf, sample.wi.z * INV_PI, epsilon = 1e-6));
        assert!(sample.bxdf_type.contains(BxDFType::BSDF_DIFFUSE));
    }
}
