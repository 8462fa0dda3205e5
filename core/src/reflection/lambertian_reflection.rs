//! Lambertian Reflection

use super::*;

/// Perfectly diffuse reflection.
#[derive(Copy, Clone, Debug)]
pub struct LambertianReflection {
    /// Reflectance spectrum giving the fraction of incident light scattered.
    r: Spectrum,
}

impl LambertianReflection {
    /// Create a new Lambertian reflection model.
    ///
    /// * `r` - Reflectance spectrum.
    pub fn new(r: Spectrum) -> BxDF {
        BxDF::LambertianReflection(Self { r })
    }

    /// Returns the BxDF type.
    pub fn get_type(&self) -> BxDFType {
        BxDFType::BSDF_REFLECTION | BxDFType::BSDF_DIFFUSE
    }

    /// Returns the constant value `R/π`.
    pub fn f(&self, _wo: &Vector3f, _wi: &Vector3f) -> Spectrum {
        self.r * INV_PI
    }

    /// Samples a direction with a cosine-weighted distribution on the side
    /// of `wo`.
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

    /// Returns the cosine-weighted hemisphere density.
    ///
    /// * `wo` - Outgoing direction.
    /// * `wi` - Incident direction.
    pub fn pdf(&self, wo: &Vector3f, wi: &Vector3f) -> Float {
        if same_hemisphere(wo, wi) {
            abs_cos_theta(wi) * INV_PI
        } else {
            0.0
        }
    }
}
