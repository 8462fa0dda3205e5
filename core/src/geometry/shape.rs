//! Shapes

use crate::geometry::*;
use crate::interaction::*;
use crate::low_discrepancy::radical_inverse;
use crate::medium::MediumInterface;
use crate::pbrt::*;
use std::sync::Arc;

/// Shape common functions. Shapes are defined directly in world space.
pub trait Shape: Send + Sync {
    /// Returns the shape type. Usually these are behind ArcShape and harder to
    /// debug. So this will be helpful.
    fn get_type(&self) -> &'static str;

    /// Returns a bounding box in the world space.
    fn world_bound(&self) -> Bounds3f;

    /// Returns geometric details if a ray intersects the shape within
    /// `[0, r.t_max)`. If there is no intersection, `None` is returned.
    ///
    /// * `r` - The ray.
    fn intersect(&self, r: &Ray) -> Option<Intersection>;

    /// Returns `true` if a ray-shape intersection succeeds; otherwise `false`.
    ///
    /// * `r` - The ray.
    fn intersect_p(&self, r: &Ray) -> bool {
        self.intersect(r).is_some()
    }

    /// Returns the surface area of the shape.
    fn area(&self) -> Float;

    /// Sample a point on the surface and return the PDF with respect to area on
    /// the surface.
    ///
    /// NOTE: The returned `Hit` value will have `wo` = Vector3f::ZERO.
    ///
    /// * `u` - Sample value to use.
    fn sample_area(&self, u: &Point2f) -> (Hit, Float);

    /// Sample a point on the shape given a reference point and return the PDF
    /// with respect to the solid angle from ref.
    ///
    /// * `hit` - Reference point.
    /// * `u`   - Sample value to use.
    fn sample_solid_angle(&self, hit: &Hit, u: &Point2f) -> (Hit, Float) {
        let (intr, mut pdf) = self.sample_area(u);
        let wi = intr.p - hit.p;

        if wi.length_squared() == 0.0 {
            pdf = 0.0;
        } else {
            // Convert from area measure to solid angle measure.
            let wi = wi.normalize();
            pdf *= hit.p.distance_squared(&intr.p) / intr.n.abs_dot(&(-wi));
            if pdf.is_infinite() {
                pdf = 0.0;
            }
        }

        (intr, pdf)
    }

    /// Returns the PDF with respect to solid angle.
    ///
    /// * `hit` - The interaction hit point.
    /// * `wi`  - The incident direction.
    fn pdf_solid_angle(&self, hit: &Hit, wi: &Vector3f) -> Float {
        // Intersect sample ray with area light geometry.
        let ray = hit.spawn_ray(wi);
        match self.intersect(&ray) {
            Some(Intersection { isect, .. }) => {
                // Convert light sample weight to solid angle measure.
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

    /// Returns the solid angle subtended by the shape w.r.t. the reference
    /// point p estimated with Monte Carlo integration.
    ///
    /// * `p`         - The reference point.
    /// * `n_samples` - The number of samples to use.
    fn solid_angle(&self, p: &Point3f, n_samples: usize) -> Float {
        let hit = Hit::new_minimal(*p, 0.0, MediumInterface::default());

        let mut solid_angle: f64 = 0.0;
        for i in 0..n_samples {
            let u = Point2f::new(radical_inverse(0, i as u64), radical_inverse(1, i as u64));
            let (p_shape, pdf) = self.sample_solid_angle(&hit, &u);
            let ray = Ray::new(*p, p_shape.p - *p, 0.999, 0.0, None);
            if pdf > 0.0 && !self.intersect_p(&ray) {
                solid_angle += 1.0_f64 / pdf as f64;
            }
        }
        (solid_angle / n_samples as f64) as Float
    }
}

/// Atomic reference counted `Shape`.
pub type ArcShape = Arc<dyn Shape>;

/// Stores geometric information about a single ray-shape intersection.
pub struct Intersection {
    /// The parameter along the ray where intersection occurred.
    pub t: Float,

    /// The surface interaction details. The primitive is not yet known.
    pub isect: SurfaceInteraction<'static>,
}

impl Intersection {
    /// Create a new intersection.
    ///
    /// * `t`     - The parameter along the ray where intersection occurred.
    /// * `isect` - The surface interaction details.
    pub fn new(t: Float, isect: SurfaceInteraction<'static>) -> Self {
        Self { t, isect }
    }
}
