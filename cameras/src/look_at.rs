//! Look-at camera frame.

use render_core::geometry::*;

/// Orthonormal camera frame placing the camera at `origin` looking along
/// `forward` (camera space +z) with `right` (+x) and `up` (+y).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LookAt {
    /// Camera position.
    pub origin: Point3f,

    /// Camera space x-axis in world space.
    pub right: Vector3f,

    /// Camera space y-axis in world space.
    pub up: Vector3f,

    /// Camera space z-axis (viewing direction) in world space.
    pub forward: Vector3f,
}

impl LookAt {
    /// Returns the frame for a camera at `pos` looking at `look` with the
    /// approximate `up` direction. Returns `None` if `up` and the viewing
    /// direction are parallel or `pos == look`.
    ///
    /// * `pos`  - Camera position.
    /// * `look` - Point the camera looks at.
    /// * `up`   - Up vector.
    pub fn new(pos: Point3f, look: Point3f, up: Vector3f) -> Option<Self> {
        let d = look - pos;
        if d.length_squared() == 0.0 || up.length_squared() == 0.0 {
            return None;
        }
        let forward = d.normalize();
        let right = up.normalize().cross(&forward);
        if right.length_squared() == 0.0 {
            error!(
                "\"up\" vector ({}, {}, {}) and viewing direction ({}, {}, {}) passed to LookAt are pointing in the same direction.",
                up.x, up.y, up.z, forward.x, forward.y, forward.z
            );
            return None;
        }
        let right = right.normalize();
        let up = forward.cross(&right);
        Some(Self {
            origin: pos,
            right,
            up,
            forward,
        })
    }

    /// Transforms a camera space point to world space.
    ///
    /// * `p` - The point.
    pub fn point_to_world(&self, p: &Point3f) -> Point3f {
        self.origin + self.vector_to_world(&Vector3f::new(p.x, p.y, p.z))
    }

    /// Transforms a camera space vector to world space.
    ///
    /// * `v` - The vector.
    pub fn vector_to_world(&self, v: &Vector3f) -> Vector3f {
        self.right * v.x + self.up * v.y + self.forward * v.z
    }

    /// Transforms a world space point to camera space.
    ///
    /// * `p` - The point.
    pub fn point_to_camera(&self, p: &Point3f) -> Point3f {
        let v = self.vector_to_camera(&(*p - self.origin));
        Point3f::new(v.x, v.y, v.z)
    }

    /// Transforms a world space vector to camera space.
    ///
    /// * `v` - The vector.
    pub fn vector_to_camera(&self, v: &Vector3f) -> Vector3f {
        Vector3f::new(v.dot(&self.right), v.dot(&self.up), v.dot(&self.forward))
    }

    /// Transforms a camera space ray to world space.
    ///
    /// * `r` - The ray.
    pub fn ray_to_world(&self, r: &Ray) -> Ray {
        let mut ray = r.clone();
        ray.o = self.point_to_world(&r.o);
        ray.d = self.vector_to_world(&r.d);
        if let Some(rd) = ray.differentials.as_mut() {
            rd.rx_origin = self.point_to_world(&rd.rx_origin);
            rd.ry_origin = self.point_to_world(&rd.ry_origin);
            rd.rx_direction = self.vector_to_world(&rd.rx_direction);
            rd.ry_direction = self.vector_to_world(&rd.ry_direction);
        }
        ray
    }
}

// ---- Tests ----

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;
    use proptest::prelude::*;
    use render_core::pbrt::*;

    #[test]
    fn axis_aligned_frame() {
        let frame = LookAt::new(
            Point3f::new(0.0, 0.0, -5.0),
            Point3f::new(0.0, 0.0, 0.0),
            Vector3f::new(0.0, 1.0, 0.0),
        )
        .unwrap();
        assert_eq!(frame.forward, Vector3f::new(0.0, 0.0, 1.0));
        assert_eq!(frame.right, Vector3f::new(1.0, 0.0, 0.0));
        assert_eq!(frame.up, Vector3f::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn degenerate_frames_are_rejected() {
        let p = Point3f::new(1.0, 2.0, 3.0);
        assert!(LookAt::new(p, p, Vector3f::new(0.0, 1.0, 0.0)).is_none());
        assert!(LookAt::new(p, Point3f::new(1.0, 5.0, 3.0), Vector3f::new(0.0, 1.0, 0.0)).is_none());
    }

    proptest! {
        #[test]
        fn world_and_camera_space_round_trip(
            x in -10.0..10.0 as Float,
            y in -10.0..10.0 as Float,
            z in -10.0..10.0 as Float,
        ) {
            let frame = LookAt::new(
                Point3f::new(3.0, 1.0, -2.0),
                Point3f::new(-1.0, 0.5, 4.0),
                Vector3f::new(0.0, 1.0, 0.0),
            )
            .unwrap();
            let p = Point3f::new(x, y, z);
            let q = frame.point_to_world(&frame.point_to_camera(&p));
            prop_assert!(approx_eq!(Float, p.x, q.x, epsilon = 1e-4));
            prop_assert!(approx_eq!(Float, p.y, q.y, epsilon = 1e-4));
            prop_assert!(approx_eq!(Float, p.z, q.z, epsilon = 1e-4));
        }
    }
}
