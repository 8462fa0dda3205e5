//! BxDF Sample

use super::*;

/// Result of sampling a BxDF or BSDF.
#[derive(Copy, Clone, Debug, Default)]
pub struct BxDFSample {
    /// The value of the distribution function.
    pub f: Spectrum,

    /// The value of the PDF.
    pub pdf: Float,

    /// The sampled incident direction.
    pub wi: Vector3f,

    /// The type of the BxDF that was sampled.
    pub bxdf_type: BxDFType,
}

impl BxDFSample {
    /// Create a new `BxDFSample`.
    ///
    /// * `f`         - The value of the distribution function.
    /// * `pdf`       - The value of the PDF.
    /// * `wi`        - The sampled incident direction.
    /// * `bxdf_type` - The type of BxDF.
    pub fn new(f: Spectrum, pdf: Float, wi: Vector3f, bxdf_type: BxDFType) -> Self {
        Self { f, pdf, wi, bxdf_type }
    }
}

impl From<BxDFType> for BxDFSample {
    /// Create a zero-valued `BxDFSample` that only records the BxDF type.
    fn from(bxdf_type: BxDFType) -> Self {
        Self {
            bxdf_type,
            ..Default::default()
        }
    }
}
