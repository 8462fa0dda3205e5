//! Fresnel

use super::*;
use std::mem::swap;

/// Fresnel reflectance models.
#[derive(Copy, Clone, Debug)]
pub enum Fresnel {
    /// Dielectric interface with the indices of refraction on the outside
    /// (`eta_i`) and inside (`eta_t`) of the surface.
    Dielectric { eta_i: Float, eta_t: Float },

    /// Reflects all incident light.
    NoOp,
}

impl Fresnel {
    /// Returns the amount of light reflected by the surface.
    ///
    /// * `cos_theta_i` - Cosine of the angle between the incident direction
    ///                   and the surface normal.
    pub fn evaluate(&self, cos_theta_i: Float) -> Spectrum {
        match self {
            Self::Dielectric { eta_i, eta_t } => Spectrum::new(fr_dielectric(cos_theta_i, *eta_i, *eta_t)),
            Self::NoOp => Spectrum::ONE,
        }
    }
}

/// Returns the fresnel reflection for dielectric materials and unpolarized
/// light.
///
/// * `cos_theta_i` - cos(θi) for angle between incident direction and
///                   geometric surface normal.
/// * `eta_i`       - index of refraction for medium that incident ray is in.
/// * `eta_t`       - index of refraction for medium that incident ray is
///                   entering.
pub fn fr_dielectric(cos_theta_i: Float, eta_i: Float, eta_t: Float) -> Float {
    let mut cos_theta_i = clamp(cos_theta_i, -1.0, 1.0);
    let mut eta_i = eta_i;
    let mut eta_t = eta_t;

    // Potentially swap indices of refraction.
    if cos_theta_i <= 0.0 {
        swap(&mut eta_i, &mut eta_t);
        cos_theta_i = abs(cos_theta_i);
    }

    // Compute cos(θt) using Snell's law.
    let sin_theta_i = max(0.0, 1.0 - cos_theta_i * cos_theta_i).sqrt();
    let sin_theta_t = eta_i / eta_t * sin_theta_i;

    // Handle total internal reflection.
    if sin_theta_t >= 1.0 {
        return 1.0;
    }

    let cos_theta_t = max(0.0, 1.0 - sin_theta_t * sin_theta_t).sqrt();
    let r_parl = ((eta_t * cos_theta_i) - (eta_i * cos_theta_t)) / ((eta_t * cos_theta_i) + (eta_i * cos_theta_t));
    let r_perp = ((eta_i * cos_theta_i) - (eta_t * cos_theta_t)) / ((eta_i * cos_theta_i) + (eta_t * cos_theta_t));
    (r_parl * r_parl + r_perp * r_perp) / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    #[test]
    fn normal_incidence_on_glass_reflects_four_percent() {
        assert!(approx_eq!(Float, fr_dielectric(1.0, 1.0, 1.5), 0.04, epsilon = 1e-4));
        assert!(approx_eq!(Float, fr_dielectric(-1.0, 1.0, 1.5), 0.04, epsilon = 1e-4));
    }

    #[test]
    fn total_internal_reflection_reflects_everything() {
        assert_eq!(fr_dielectric(-0.1, 1.0, 1.5), 1.0);
    }
}
