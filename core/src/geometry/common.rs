//! Common geometric functions

use crate::geometry::*;
use crate::pbrt::*;

/// Dot product between vectors and normals.
pub trait Dot<Rhs> {
    /// Returns the dot product.
    fn dot(&self, other: &Rhs) -> Float;

    /// Returns the absolute value of the dot product.
    fn abs_dot(&self, other: &Rhs) -> Float {
        self.dot(other).abs()
    }
}

macro_rules! impl_dot {
    ($lhs: ty, $rhs: ty) => {
        impl Dot<$rhs> for $lhs {
            #[inline(always)]
            fn dot(&self, other: &$rhs) -> Float {
                self.x * other.x + self.y * other.y + self.z * other.z
            }
        }
    };
}

impl_dot!(Vector3f, Vector3f);
impl_dot!(Vector3f, Normal3f);
impl_dot!(Normal3f, Vector3f);
impl_dot!(Normal3f, Normal3f);

/// Flips a vector so it lies in the same hemisphere as `n`.
///
/// * `v` - The vector.
/// * `n` - The reference normal.
pub fn face_forward(v: &Vector3f, n: &Normal3f) -> Vector3f {
    if v.dot(n) < 0.0 {
        -*v
    } else {
        *v
    }
}

/// Constructs a local coordinate system given only a single unit vector. The
/// returned vectors `(v2, v3)` satisfy `v2 x v3 = v1`.
///
/// * `v1` - The unit vector.
pub fn coordinate_system(v1: &Vector3f) -> (Vector3f, Vector3f) {
    let v2 = if v1.x.abs() > v1.y.abs() {
        Vector3f::new(-v1.z, 0.0, v1.x) / (v1.x * v1.x + v1.z * v1.z).sqrt()
    } else {
        Vector3f::new(0.0, v1.z, -v1.y) / (v1.y * v1.y + v1.z * v1.z).sqrt()
    };
    let v3 = v1.cross(&v2);
    (v2, v3)
}

/// Converts spherical coordinates to a direction in the standard basis.
///
/// * `sin_theta` - Sine of the polar angle.
/// * `cos_theta` - Cosine of the polar angle.
/// * `phi`       - Azimuth.
pub fn spherical_direction(sin_theta: Float, cos_theta: Float, phi: Float) -> Vector3f {
    Vector3f::new(
        clamp(sin_theta, -1.0, 1.0) * phi.cos(),
        clamp(sin_theta, -1.0, 1.0) * phi.sin(),
        clamp(cos_theta, -1.0, 1.0),
    )
}

/// Converts spherical coordinates to a direction in the given basis.
pub fn spherical_direction_in_frame(
    sin_theta: Float,
    cos_theta: Float,
    phi: Float,
    x: &Vector3f,
    y: &Vector3f,
    z: &Vector3f,
) -> Vector3f {
    *x * (sin_theta * phi.cos()) + *y * (sin_theta * phi.sin()) + *z * cos_theta
}

/// Offsets a ray origin along the surface normal far enough to avoid
/// re-intersecting the surface it leaves.
///
/// * `p`       - The surface point.
/// * `p_error` - Conservative absolute error bounds of `p`.
/// * `n`       - Geometric normal.
/// * `w`       - Direction of the spawned ray.
pub fn offset_ray_origin(p: &Point3f, p_error: &Vector3f, n: &Normal3f, w: &Vector3f) -> Point3f {
    let d = n.x.abs() * p_error.x + n.y.abs() * p_error.y + n.z.abs() * p_error.z;
    let mut offset = Vector3f::from(*n) * d;
    if w.dot(n) < 0.0 {
        offset = -offset;
    }

    let mut po = *p + offset;

    // Round offset point away from `p`.
    for i in 0..3 {
        if offset[i] > 0.0 {
            po[i] = next_float_up(po[i]);
        } else if offset[i] < 0.0 {
            po[i] = next_float_down(po[i]);
        }
    }
    po
}

// ---- Tests ----

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;
    use proptest::prelude::*;

    fn unit_vector() -> impl Strategy<Value = Vector3f> {
        (-1.0..1.0_f32, 0.0..TWO_PI).prop_map(|(z, phi)| {
            let r = (1.0 - z * z).max(0.0).sqrt();
            Vector3f::new(r * phi.cos(), r * phi.sin(), z)
        })
    }

    proptest! {
        #[test]
        fn coordinate_system_is_orthonormal(v in unit_vector()) {
            let (v2, v3) = coordinate_system(&v);
            prop_assert!(v.dot(&v2).abs() < 1e-4);
            prop_assert!(v.dot(&v3).abs() < 1e-4);
            prop_assert!(v2.dot(&v3).abs() < 1e-4);
            prop_assert!(approx_eq!(Float, v2.length(), 1.0, epsilon = 1e-4));
            let c = v2.cross(&v3);
            prop_assert!((c - v).length() < 1e-3);
        }

        #[test]
        fn offset_origin_lies_on_side_of_w(v in unit_vector()) {
            let p = Point3f::new(1.0, 2.0, 3.0);
            let n = Normal3f::new(0.0, 0.0, 1.0);
            let err = Vector3f::new(1e-4, 1e-4, 1e-4);
            let po = offset_ray_origin(&p, &err, &n, &v);
            if v.z > 0.0 {
                prop_assert!(po.z > p.z);
            } else if v.z < 0.0 {
                prop_assert!(po.z < p.z);
            }
        }
    }
}
