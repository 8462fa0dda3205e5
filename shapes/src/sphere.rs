//! Spheres

use render_core::geometry::*;
use render_core::interaction::*;
use render_core::medium::MediumInterface;
use render_core::paramset::*;
use render_core::pbrt::*;
use render_core::sampling::*;

/// A full sphere defined in world space.
#[derive(Clone)]
pub struct Sphere {
    /// Center of the sphere.
    pub center: Point3f,

    /// Radius of the sphere.
    pub radius: Float,

    /// Indicates whether surface normals point inwards.
    pub reverse_orientation: bool,
}

impl Sphere {
    /// Create a new sphere.
    ///
    /// * `center`              - Center of the sphere.
    /// * `radius`              - Radius of the sphere.
    /// * `reverse_orientation` - Indicates whether surface normals point
    ///                           inwards.
    pub fn new(center: Point3f, radius: Float, reverse_orientation: bool) -> Self {
        Self {
            center,
            radius,
            reverse_orientation,
        }
    }

    /// Returns the nearest ray parameter in `(0, r.t_max)` where the ray
    /// meets the sphere. The quadratic is solved in double precision.
    ///
    /// * `r` - The ray.
    fn hit_parameter(&self, r: &Ray) -> Option<Float> {
        let o = r.o - self.center;
        let (ox, oy, oz) = (o.x as f64, o.y as f64, o.z as f64);
        let (dx, dy, dz) = (r.d.x as f64, r.d.y as f64, r.d.z as f64);
        let radius = self.radius as f64;

        let a = dx * dx + dy * dy + dz * dz;
        let b = 2.0 * (dx * ox + dy * oy + dz * oz);
        let c = ox * ox + oy * oy + oz * oz - radius * radius;

        let discrim = b * b - 4.0 * a * c;
        if a == 0.0 || discrim < 0.0 {
            return None;
        }
        let root_discrim = discrim.sqrt();
        let q = if b < 0.0 {
            -0.5 * (b - root_discrim)
        } else {
            -0.5 * (b + root_discrim)
        };
        let (mut t0, mut t1) = (q / a, c / q);
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
        }

        let t_max = r.t_max as f64;
        if t0 >= t_max || t1 <= 0.0 {
            return None;
        }
        let t_hit = if t0 > 0.0 { t0 } else { t1 };
        if t_hit >= t_max {
            None
        } else {
            Some(t_hit as Float)
        }
    }

    /// Returns `true` if the point (after offsetting for error) lies inside
    /// the sphere.
    ///
    /// * `hit` - Reference point.
    fn contains_reference(&self, hit: &Hit) -> bool {
        let p_origin = offset_ray_origin(&hit.p, &hit.p_error, &hit.n, &(self.center - hit.p));
        p_origin.distance_squared(&self.center) <= self.radius * self.radius
    }

    /// Returns the cosine of the half-angle of the cone of directions that
    /// the sphere subtends from `p`.
    ///
    /// * `p` - A point outside the sphere.
    fn cos_theta_max(&self, p: &Point3f) -> Float {
        let sin2_theta_max = self.radius * self.radius / p.distance_squared(&self.center);
        max(0.0, 1.0 - sin2_theta_max).sqrt()
    }
}

impl Shape for Sphere {
    fn get_type(&self) -> &'static str {
        "sphere"
    }

    fn world_bound(&self) -> Bounds3f {
        let r = Vector3f::new(self.radius, self.radius, self.radius);
        Bounds3f::new(self.center - r, self.center + r)
    }

    /// Returns geometric details if a ray intersects the sphere.
    ///
    /// * `r` - The ray.
    fn intersect(&self, r: &Ray) -> Option<Intersection> {
        let t_hit = self.hit_parameter(r)?;

        // Refine sphere intersection point.
        let mut p_rel = r.at(t_hit) - self.center;
        p_rel = p_rel * (self.radius / p_rel.length());
        if p_rel.x == 0.0 && p_rel.y == 0.0 {
            p_rel.x = 1e-5 * self.radius;
        }
        let p_hit = self.center + p_rel;

        // Find parametric representation of sphere hit.
        let mut phi = p_rel.y.atan2(p_rel.x);
        if phi < 0.0 {
            phi += TWO_PI;
        }
        let cos_theta = clamp(p_rel.z / self.radius, -1.0, 1.0);
        let theta = cos_theta.acos();
        let u = phi * INV_TWO_PI;
        let v = 1.0 - theta * INV_PI;

        // Compute sphere ∂p/∂u and ∂p/∂v.
        let z_radius = (p_rel.x * p_rel.x + p_rel.y * p_rel.y).sqrt();
        let cos_phi = p_rel.x / z_radius;
        let sin_phi = p_rel.y / z_radius;
        let sin_theta = max(0.0, 1.0 - cos_theta * cos_theta).sqrt();
        let dpdu = Vector3f::new(-TWO_PI * p_rel.y, TWO_PI * p_rel.x, 0.0);
        let dpdv = Vector3f::new(
            p_rel.z * cos_phi,
            p_rel.z * sin_phi,
            -self.radius * sin_theta,
        ) * -PI;

        let p_error = p_rel.abs() * gamma(5);
        let si = SurfaceInteraction::new(
            p_hit,
            p_error,
            Point2f::new(u, v),
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
        FOUR_PI * self.radius * self.radius
    }

    /// Sample a point uniformly over the sphere's surface.
    ///
    /// * `u` - Sample value to use.
    fn sample_area(&self, u: &Point2f) -> (Hit, Float) {
        let p_rel = uniform_sample_sphere(u) * self.radius;
        let mut n = Normal3f::from(p_rel.normalize());
        if self.reverse_orientation {
            n = -n;
        }
        let p_error = p_rel.abs() * gamma(5);
        let hit = Hit::new(
            self.center + p_rel,
            0.0,
            p_error,
            Vector3f::ZERO,
            n,
            MediumInterface::default(),
        );
        (hit, 1.0 / self.area())
    }

    /// Sample a point inside the cone of directions the sphere subtends
    /// from `hit`. Reference points inside the sphere fall back to area
    /// sampling.
    ///
    /// * `hit` - Reference point.
    /// * `u`   - Sample value to use.
    fn sample_solid_angle(&self, hit: &Hit, u: &Point2f) -> (Hit, Float) {
        if self.contains_reference(hit) {
            let (intr, pdf) = self.sample_area(u);
            let wi = intr.p - hit.p;
            if wi.length_squared() == 0.0 {
                return (intr, 0.0);
            }
            let wi = wi.normalize();
            let pdf = pdf * hit.p.distance_squared(&intr.p) / intr.n.abs_dot(&(-wi));
            return (intr, if pdf.is_infinite() { 0.0 } else { pdf });
        }

        // Compute coordinate system for sphere sampling.
        let dc = hit.p.distance(&self.center);
        let inv_dc = 1.0 / dc;
        let wc = (self.center - hit.p) * inv_dc;
        let (wc_x, wc_y) = coordinate_system(&wc);

        // Compute θ and φ values for sample in cone.
        let sin_theta_max = self.radius * inv_dc;
        let sin2_theta_max = sin_theta_max * sin_theta_max;
        let inv_sin_theta_max = 1.0 / sin_theta_max;
        let cos_theta_max = max(0.0, 1.0 - sin2_theta_max).sqrt();

        let mut cos_theta = (cos_theta_max - 1.0) * u[0] + 1.0;
        let mut sin2_theta = 1.0 - cos_theta * cos_theta;
        if sin2_theta_max < 0.00068523 {
            // Fall back to a Taylor expansion for small angles.
            sin2_theta = sin2_theta_max * u[0];
            cos_theta = (1.0 - sin2_theta).sqrt();
        }

        // Compute angle α from center of sphere to sampled point on surface.
        let cos_alpha = sin2_theta * inv_sin_theta_max
            + cos_theta * max(0.0, 1.0 - sin2_theta * inv_sin_theta_max * inv_sin_theta_max).sqrt();
        let sin_alpha = max(0.0, 1.0 - cos_alpha * cos_alpha).sqrt();
        let phi = u[1] * TWO_PI;

        let n_world = spherical_direction_in_frame(sin_alpha, cos_alpha, phi, &(-wc_x), &(-wc_y), &(-wc));
        let p_rel = n_world * self.radius;
        let mut n = Normal3f::from(n_world);
        if self.reverse_orientation {
            n = -n;
        }

        let intr = Hit::new(
            self.center + p_rel,
            hit.time,
            p_rel.abs() * gamma(5),
            Vector3f::ZERO,
            n,
            MediumInterface::default(),
        );
        (intr, uniform_cone_pdf(cos_theta_max))
    }

    fn pdf_solid_angle(&self, hit: &Hit, wi: &Vector3f) -> Float {
        if !self.contains_reference(hit) {
            return uniform_cone_pdf(self.cos_theta_max(&hit.p));
        }

        // Inside the sphere: convert the area density along `wi`.
        let ray = hit.spawn_ray(wi);
        match self.intersect(&ray) {
            Some(Intersection { isect, .. }) => {
                let pdf = hit.p.distance_squared(&isect.hit.p) / (isect.hit.n.abs_dot(&(-*wi)) * self.area());
                if pdf.is_infinite() {
                    0.0
                } else {
                    pdf
                }
            }
            None => 0.0,
        }
    }
}

impl From<&ParamSet> for Sphere {
    /// Create a `Sphere` from a parameter set.
    ///
    /// * `params` - Parameter set.
    fn from(params: &ParamSet) -> Self {
        let center = params.find_one_point3f("center", Point3f::ZERO);
        let mut radius = params.find_one_float("radius", 1.0);
        if radius <= 0.0 {
            error!("Sphere radius {} is not positive; using 1.", radius);
            radius = 1.0;
        }
        let reverse_orientation = params.find_one_bool("reverseorientation", false);
        Self::new(center, radius, reverse_orientation)
    }
}

// ---- Tests ----
