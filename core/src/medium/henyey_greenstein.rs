//! Henyey-Greenstein

use crate::geometry::*;
use crate::pbrt::*;

/// Models scattering properties in volumetric media.
#[derive(Copy, Clone, Debug)]
pub enum PhaseFunction {
    HenyeyGreenstein(HenyeyGreenstein),
}

impl PhaseFunction {
    /// Returns the value of the phase function for the given pair of directions.
    ///
    /// * `wo` - Outgoing direction.
    /// * `wi` - Incident direction.
    pub fn p(&self, wo: &Vector3f, wi: &Vector3f) -> Float {
        match self {
            Self::HenyeyGreenstein(f) => f.p(wo, wi),
        }
    }

    /// Returns the phase function value and sampled incident direction.
    ///
    /// * `wo` - Outgoing direction.
    /// * `u`  - Sample value in [0, 1)^2.
    pub fn sample_p(&self, wo: &Vector3f, u: &Point2f) -> (Float, Vector3f) {
        match self {
            Self::HenyeyGreenstein(f) => f.sample_p(wo, u),
        }
    }
}

/// Henyey-Greenstein phase function.
#[derive(Copy, Clone, Debug)]
pub struct HenyeyGreenstein {
    /// The asymmetry parameter in (-1, 1); 0 is isotropic.
    pub g: Float,
}

impl HenyeyGreenstein {
    /// Returns a new Henyey-Greenstein phase function.
    ///
    /// * `g` - The asymmetry parameter.
    pub fn new(g: Float) -> PhaseFunction {
        PhaseFunction::HenyeyGreenstein(Self { g })
    }

    fn p(&self, wo: &Vector3f, wi: &Vector3f) -> Float {
        phase_hg(wo.dot(wi), self.g)
    }

    fn sample_p(&self, wo: &Vector3f, u: &Point2f) -> (Float, Vector3f) {
        // Compute cos(theta) for Henyey-Greenstein sample.
        let g = self.g;
        let cos_theta = if abs(g) < 1e-3 {
            1.0 - 2.0 * u[0]
        } else {
            let sqr_term = (1.0 - g * g) / (1.0 + g - 2.0 * g * u[0]);
            -(1.0 + g * g - sqr_term * sqr_term) / (2.0 * g)
        };

        // Compute direction `wi` for Henyey-Greenstein sample.
        let sin_theta = max(0.0, 1.0 - cos_theta * cos_theta).sqrt();
        let phi = TWO_PI * u[1];
        let (v1, v2) = coordinate_system(wo);
        let wi = spherical_direction_in_frame(sin_theta, cos_theta, phi, &v1, &v2, wo);
        (phase_hg(cos_theta, g), wi)
    }
}

/// Evaluates the Henyey-Greenstein phase function. `wo` points away from the
/// scattering point so forward scattering has `cos_theta = -1`.
///
/// * `cos_theta` - Cosine of the angle between `wo` and `wi`.
/// * `g`         - Asymmetry parameter.
#[inline]
pub fn phase_hg(cos_theta: Float, g: Float) -> Float {
    let denom = 1.0 + g * g + 2.0 * g * cos_theta;
    INV_FOUR_PI * (1.0 - g * g) / (denom * denom.sqrt())
}

// ---- Tests ----

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;
    use proptest::prelude::*;

    #[test]
    fn isotropic_phase_is_constant() {
        assert!(approx_eq!(Float, phase_hg(0.3, 0.0), INV_FOUR_PI, epsilon = 1e-7));
        assert!(approx_eq!(Float, phase_hg(-1.0, 0.0), INV_FOUR_PI, epsilon = 1e-7));
    }

    proptest! {
        #[test]
        fn sampled_value_matches_evaluation(g in -0.9..0.9_f32, u0 in 0.0..1.0_f32, u1 in 0.0..1.0_f32) {
            let hg = HenyeyGreenstein::new(g);
            let wo = Vector3f::new(0.0, 0.6, 0.8);
            let (p, wi) = hg.sample_p(&wo, &Point2f::new(u0, u1));
            prop_assert!(approx_eq!(Float, wi.length(), 1.0, epsilon = 1e-3));
            prop_assert!(approx_eq!(Float, p, hg.p(&wo, &wi), epsilon = 1e-2 * max(1.0, p)));
        }
    }
}
