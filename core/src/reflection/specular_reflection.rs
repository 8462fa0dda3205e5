//! Specular Reflection

use super::*;

/// Perfect mirror reflection scaled by a Fresnel term.
#[derive(Copy, Clone, Debug)]
pub struct SpecularReflection {
    /// Scale factor for the reflected colour.
    r: Spectrum,

    /// Fresnel properties.
    fresnel: Fresnel,
}

impl SpecularReflection {
    /// Create a new specular reflection model.
    ///
    /// * `r`       - Scale factor for the reflected colour.
    /// * `fresnel` - Fresnel properties.
    pub fn new(r: Spectrum, fresnel: Fresnel) -> BxDF {
        BxDF::SpecularReflection(Self { r, fresnel })
    }

    /// Returns the BxDF type.
    pub fn get_type(&self) -> BxDFType {
        BxDFType::BSDF_REFLECTION | BxDFType::BSDF_SPECULAR
    }

    /// A delta distribution never matches an arbitrary pair of directions.
    pub fn f(&self, _wo: &Vector3f, _wi: &Vector3f) -> Spectrum {
        Spectrum::ZERO
    }

    /// Returns the mirror direction with a PDF of 1.
    ///
    /// * `wo` - Outgoing direction.
    /// * `_u` - Unused.
    pub fn sample_f(&self, wo: &Vector3f, _u: &Point2f) -> BxDFSample {
        let wi = Vector3f::new(-wo.x, -wo.y, wo.z);
        let cos = abs_cos_theta(&wi);
        if cos == 0.0 {
            return BxDFSample::from(self.get_type());
        }
        let f = self.fresnel.evaluate(cos_theta(&wi)) * self.r / cos;
        BxDFSample::new(f, 1.0, wi, self.get_type())
    }

    /// Returns 0 as a delta distribution can't be matched.
    pub fn pdf(&self, _wo: &Vector3f, _wi: &Vector3f) -> Float {
        0.0
    }
}
