//! Reflection and surface scattering models

use crate::geometry::*;
use crate::material::TransportMode;
use crate::pbrt::*;
use crate::sampling::*;
use crate::spectrum::*;

mod bsdf;
mod bssrdf_adapter;
mod bxdf_sample;
mod bxdf_type;
mod common;
mod fresnel;
mod fresnel_specular;
mod lambertian_reflection;
mod specular_reflection;
mod specular_transmission;

// Re-export
pub use bsdf::*;
pub use bssrdf_adapter::*;
pub use bxdf_sample::*;
pub use bxdf_type::*;
pub use common::*;
pub use fresnel::*;
pub use fresnel_specular::*;
pub use lambertian_reflection::*;
pub use specular_reflection::*;
pub use specular_transmission::*;

/// BxDF for BRDFs and BTDFs. The set of scattering models is closed so
/// they are enumerated directly; values are plain data that can be copied
/// into a memory arena.
#[derive(Copy, Clone, Debug)]
pub enum BxDF {
    BSSRDFAdapter(BSSRDFAdapter),
    FresnelSpecular(FresnelSpecular),
    LambertianReflection(LambertianReflection),
    SpecularReflection(SpecularReflection),
    SpecularTransmission(SpecularTransmission),
}

impl BxDF {
    /// Returns the BxDF type.
    pub fn get_type(&self) -> BxDFType {
        match self {
            BxDF::BSSRDFAdapter(bxdf) => bxdf.get_type(),
            BxDF::FresnelSpecular(bxdf) => bxdf.get_type(),
            BxDF::LambertianReflection(bxdf) => bxdf.get_type(),
            BxDF::SpecularReflection(bxdf) => bxdf.get_type(),
            BxDF::SpecularTransmission(bxdf) => bxdf.get_type(),
        }
    }

    /// Returns true if all flags of this BxDF are contained in `t`.
    ///
    /// * `t` - The reflection model to compare.
    pub fn matches_flags(&self, t: BxDFType) -> bool {
        t.contains(self.get_type())
    }

    /// Returns the value of the distribution function for the given pair of
    /// directions in the local shading frame.
    ///
    /// * `wo` - Outgoing direction.
    /// * `wi` - Incident direction.
    pub fn f(&self, wo: &Vector3f, wi: &Vector3f) -> Spectrum {
        match self {
            BxDF::BSSRDFAdapter(bxdf) => bxdf.f(wo, wi),
            BxDF::FresnelSpecular(bxdf) => bxdf.f(wo, wi),
            BxDF::LambertianReflection(bxdf) => bxdf.f(wo, wi),
            BxDF::SpecularReflection(bxdf) => bxdf.f(wo, wi),
            BxDF::SpecularTransmission(bxdf) => bxdf.f(wo, wi),
        }
    }

    /// Samples an incident direction for the outgoing direction `wo`.
    ///
    /// * `wo` - Outgoing direction.
    /// * `u`  - The 2D uniform random values.
    pub fn sample_f(&self, wo: &Vector3f, u: &Point2f) -> BxDFSample {
        match self {
            BxDF::BSSRDFAdapter(bxdf) => bxdf.sample_f(wo, u),
            BxDF::FresnelSpecular(bxdf) => bxdf.sample_f(wo, u),
            BxDF::LambertianReflection(bxdf) => bxdf.sample_f(wo, u),
            BxDF::SpecularReflection(bxdf) => bxdf.sample_f(wo, u),
            BxDF::SpecularTransmission(bxdf) => bxdf.sample_f(wo, u),
        }
    }

    /// Evaluates the PDF for the sampling method.
    ///
    /// * `wo` - Outgoing direction.
    /// * `wi` - Incident direction.
    pub fn pdf(&self, wo: &Vector3f, wi: &Vector3f) -> Float {
        match self {
            BxDF::BSSRDFAdapter(bxdf) => bxdf.pdf(wo, wi),
            BxDF::FresnelSpecular(bxdf) => bxdf.pdf(wo, wi),
            BxDF::LambertianReflection(bxdf) => bxdf.pdf(wo, wi),
            BxDF::SpecularReflection(bxdf) => bxdf.pdf(wo, wi),
            BxDF::SpecularTransmission(bxdf) => bxdf.pdf(wo, wi),
        }
    }
}
