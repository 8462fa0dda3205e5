//! Shading frame helpers. Directions are given in the local shading
//! coordinate system where the normal is `(0, 0, 1)`.

use crate::geometry::*;
use crate::pbrt::*;

/// Returns cos(θ) of a direction.
#[inline]
pub fn cos_theta(w: &Vector3f) -> Float {
    w.z
}

/// Returns |cos(θ)| of a direction.
#[inline]
pub fn abs_cos_theta(w: &Vector3f) -> Float {
    abs(w.z)
}

/// Returns true if two directions lie in the same hemisphere.
#[inline]
pub fn same_hemisphere(w: &Vector3f, wp: &Vector3f) -> bool {
    w.z * wp.z > 0.0
}

/// Refracts `wi` about the normal `n` with relative index of refraction
/// `eta`. Returns `None` on total internal reflection.
///
/// * `wi`  - Incident direction.
/// * `n`   - Normal on the same side as `wi`.
/// * `eta` - Ratio of indices of refraction (incident over transmitted).
pub fn refract(wi: &Vector3f, n: &Normal3f, eta: Float) -> Option<Vector3f> {
    // Compute cos(θt) using Snell's law.
    let cos_theta_i = n.dot(wi);
    let sin2_theta_i = max(0.0, 1.0 - cos_theta_i * cos_theta_i);
    let sin2_theta_t = eta * eta * sin2_theta_i;

    // Handle total internal reflection for transmission.
    if sin2_theta_t >= 1.0 {
        return None;
    }

    let cos_theta_t = (1.0 - sin2_theta_t).sqrt();
    Some(-*wi * eta + Vector3f::from(*n) * (eta * cos_theta_i - cos_theta_t))
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    #[test]
    fn normal_incidence_passes_straight_through() {
        let wi = Vector3f::new(0.0, 0.0, 1.0);
        let wt = refract(&wi, &Normal3f::new(0.0, 0.0, 1.0), 1.0 / 1.5).unwrap();
        assert!(approx_eq!(Float, wt.z, -1.0, epsilon = 1e-6));
    }

    #[test]
    fn grazing_exit_is_totally_reflected() {
        let wi = Vector3f::new(0.9, 0.0, 0.1).normalize();
        assert!(refract(&wi, &Normal3f::new(0.0, 0.0, 1.0), 1.5).is_none());
    }
}
