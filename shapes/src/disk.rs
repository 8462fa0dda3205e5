//! Disks

use render_core::geometry::*;
use render_core::interaction::*;
use render_core::medium::MediumInterface;
use render_core::paramset::*;
use render_core::pbrt::*;
use render_core::sampling::concentric_sample_disk;

/// A one-sided disk defined in world space by its center, normal and radius.
#[derive(Clone)]
pub struct Disk {
    /// Center of the disk.
    pub center: Point3f,

    /// Unit normal of the disk's plane.
    pub normal: Vector3f,

    /// Radius of disk.
    pub radius: Float,

    /// Indicates whether the surface normal is flipped.
    pub reverse_orientation: bool,

    /// In-plane basis; `u_axis x v_axis = normal`.
    u_axis: Vector3f,
    v_axis: Vector3f,
}

impl Disk {
    /// Create a new disk.
    ///
    /// * `center`              - Center of the disk.
    /// * `normal`              - Normal of the disk's plane.
    /// * `radius`              - Radius of disk.
    /// * `reverse_orientation` - Indicates whether the surface normal is
    ///                           flipped.
    pub fn new(center: Point3f, normal: Vector3f, radius: Float, reverse_orientation: bool) -> Self {
        let normal = normal.normalize();
        let (u_axis, v_axis) = coordinate_system(&normal);
        Self {
            center,
            normal,
            radius,
            reverse_orientation,
            u_axis,
            v_axis,
        }
    }

    /// Returns the surface normal accounting for orientation.
    fn oriented_normal(&self) -> Normal3f {
        let n = Normal3f::from(self.normal);
        if self.reverse_orientation {
            -n
        } else {
            n
        }
    }

    /// Returns the ray parameter and in-plane coordinates of the hit.
    ///
    /// * `r` - The ray.
    fn hit_parameter(&self, r: &Ray) -> Option<(Float, Float, Float)> {
        // Reject disk intersections for rays parallel to the disk's plane.
        let denom = r.d.dot(&self.normal);
        if denom == 0.0 {
            return None;
        }
        let t_hit = (self.center - r.o).dot(&self.normal) / denom;
        if t_hit <= 0.0 || t_hit >= r.t_max {
            return None;
        }

        // See if hit point is inside disk radius.
        let local = r.at(t_hit) - self.center;
        let x = local.dot(&self.u_axis);
        let y = local.dot(&self.v_axis);
        if x * x + y * y > self.radius * self.radius {
            return None;
        }
        Some((t_hit, x, y))
    }
}

impl Shape for Disk {
    fn get_type(&self) -> &'static str {
        "disk"
    }

    fn world_bound(&self) -> Bounds3f {
        let e = Vector3f::new(
            self.radius * max(0.0, 1.0 - self.normal.x * self.normal.x).sqrt(),
            self.radius * max(0.0, 1.0 - self.normal.y * self.normal.y).sqrt(),
            self.radius * max(0.0, 1.0 - self.normal.z * self.normal.z).sqrt(),
        );
        Bounds3f::new(self.center - e, self.center + e)
    }

    /// Returns geometric details if a ray intersects the disk.
    ///
    /// * `r` - The ray.
    fn intersect(&self, r: &Ray) -> Option<Intersection> {
        let (t_hit, x, y) = self.hit_parameter(r)?;

        // Refine disk intersection point onto the plane.
        let p_hit = self.center + self.u_axis * x + self.v_axis * y;
        let uv = Point2f::new(0.5 * (x / self.radius + 1.0), 0.5 * (y / self.radius + 1.0));
        let dpdu = self.u_axis * (2.0 * self.radius);
        let dpdv = self.v_axis * (2.0 * self.radius);
        let p_error = Vector3f::from(p_hit.abs()) * gamma(5);

        let si = SurfaceInteraction::new(
            p_hit,
            p_error,
            uv,
            -r.d,
            dpdu,
            dpdv,
            r.time,
            self.reverse_orientation,
        );
        Some(Intersection::new(t_hit, si))
    }

    fn intersect_p(&self, r: &Ray) -> bool {
        self.hit_parameter(r).is_some()
    }

    fn area(&self) -> Float {
        PI * self.radius * self.radius
    }

    /// Sample a point uniformly over the disk.
    ///
    /// * `u` - Sample value to use.
    fn sample_area(&self, u: &Point2f) -> (Hit, Float) {
        let pd = concentric_sample_disk(u);
        let p = self.center + self.u_axis * (pd.x * self.radius) + self.v_axis * (pd.y * self.radius);
        let p_error = Vector3f::from(p.abs()) * gamma(5);
        let hit = Hit::new(
            p,
            0.0,
            p_error,
            Vector3f::ZERO,
            self.oriented_normal(),
            MediumInterface::default(),
        );
        (hit, 1.0 / self.area())
    }
}

impl From<&ParamSet> for Disk {
    /// Create a `Disk` from a parameter set.
    ///
    /// * `params` - Parameter set.
    fn from(params: &ParamSet) -> Self {
        let center = params.find_one_point3f("center", Point3f::ZERO);
        let normal = Vector3f::from(params.find_one_point3f("normal", Point3f::new(0.0, 0.0, 1.0)));
        let radius = params.find_one_float("radius", 1.0);
        let reverse_orientation = params.find_one_bool("reverseorientation", false);

        if normal.length_squared() == 0.0 {
            error!("Disk normal is zero; using +z.");
            return Self::new(center, Vector3f::new(0.0, 0.0, 1.0), radius, reverse_orientation);
        }
        Self::new(center, normal, radius, reverse_orientation)
    }
}

// ---- Tests ----

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;
    use proptest::prelude::*;

    #[test]
    fn hit_normal_follows_plane_normal() {
        let disk = Disk::new(Point3f::new(0.0, 0.0, 2.0), Vector3f::new(0.0, 0.0, -1.0), 1.0, false);
        let ray = Ray::new(Point3f::new(0.3, 0.2, 0.0), Vector3f::new(0.0, 0.0, 1.0), INFINITY, 0.0, None);
        let Intersection { t, isect } = disk.intersect(&ray).unwrap();
        assert!(approx_eq!(Float, t, 2.0));
        assert!(approx_eq!(Float, isect.hit.n.z, -1.0, epsilon = 1e-6));
        assert!(approx_eq!(Float, isect.hit.p.x, 0.3, epsilon = 1e-6));
    }

    #[test]
    fn center_hit_is_well_defined() {
        let disk = Disk::new(Point3f::ZERO, Vector3f::new(0.0, 1.0, 0.0), 10.0, false);
        let ray = Ray::new(Point3f::new(0.0, 5.0, 0.0), Vector3f::new(0.0, -1.0, 0.0), INFINITY, 0.0, None);
        let isect = disk.intersect(&ray).unwrap().isect;
        assert!(approx_eq!(Float, isect.hit.n.y, 1.0, epsilon = 1e-6));
        assert!(approx_eq!(Float, isect.uv.x, 0.5));
    }

    #[test]
    fn rays_outside_radius_or_parallel_miss() {
        let disk = Disk::new(Point3f::ZERO, Vector3f::new(0.0, 0.0, 1.0), 1.0, false);
        let outside = Ray::new(Point3f::new(1.5, 0.0, 1.0), Vector3f::new(0.0, 0.0, -1.0), INFINITY, 0.0, None);
        assert!(!disk.intersect_p(&outside));
        let parallel = Ray::new(Point3f::new(0.0, 0.0, 1.0), Vector3f::new(1.0, 0.0, 0.0), INFINITY, 0.0, None);
        assert!(disk.intersect(&parallel).is_none());
    }

    #[test]
    fn bounds_are_flat_along_normal() {
        let disk = Disk::new(Point3f::new(1.0, 2.0, 3.0), Vector3f::new(0.0, 0.0, 1.0), 2.0, false);
        let b = disk.world_bound();
        assert!(approx_eq!(Float, b.p_min.z, 3.0));
        assert!(approx_eq!(Float, b.p_max.z, 3.0));
        assert!(approx_eq!(Float, b.p_max.x, 3.0));
    }

    proptest! {
        #[test]
        fn area_samples_lie_on_disk(u0 in 0.0..1.0 as Float, u1 in 0.0..1.0 as Float) {
            let disk = Disk::new(Point3f::new(0.0, 1.0, 0.0), Vector3f::new(1.0, 1.0, 0.0), 0.5, true);
            let (hit, pdf) = disk.sample_area(&Point2f::new(u0, u1));
            let local = hit.p - disk.center;
            prop_assert!(local.dot(&disk.normal).abs() < 1e-5);
            prop_assert!(local.length() <= 0.5 + 1e-5);
            prop_assert!(hit.n.dot(&disk.normal) < 0.0);
            prop_assert!((pdf * disk.area() - 1.0).abs() < 1e-5);
        }
    }
}
