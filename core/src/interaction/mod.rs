//! Interactions

use crate::geometry::*;
use crate::medium::*;
use crate::pbrt::*;
use crate::reflection::*;
use crate::spectrum::*;

mod medium_interaction;
mod surface_interaction;

// Re-export
pub use medium_interaction::*;
pub use surface_interaction::*;

/// A scattering point, borrowed from either a surface or a medium
/// interaction.
#[derive(Copy, Clone)]
pub enum Interaction<'a> {
    /// Represents geometry of a particular point on a surface.
    Surface { si: &'a SurfaceInteraction<'a> },

    /// Represents an interaction point in a scattering medium.
    Medium { mi: &'a MediumInteraction },
}

impl<'a> Interaction<'a> {
    /// Returns the interaction hit point.
    pub fn get_hit(&self) -> &Hit {
        match self {
            Self::Surface { si } => &si.hit,
            Self::Medium { mi } => &mi.hit,
        }
    }

    /// Evaluates the BSDF or phase function for a pair of directions. The
    /// surface value includes the cosine term with the shading normal.
    /// Returns the value and its sampling density.
    ///
    /// * `wi`    - Incident direction.
    /// * `flags` - BxDF types to consider on surfaces.
    pub fn f_and_pdf(&self, wi: &Vector3f, flags: BxDFType) -> (Spectrum, Float) {
        match self {
            Self::Surface { si } => match si.bsdf {
                Some(bsdf) => {
                    let wo = si.hit.wo;
                    let f = bsdf.f(&wo, wi, flags) * wi.abs_dot(&si.shading.n);
                    (f, bsdf.pdf(&wo, wi, flags))
                }
                None => (Spectrum::ZERO, 0.0),
            },
            Self::Medium { mi } => {
                let p = mi.phase.p(&mi.hit.wo, wi);
                (Spectrum::new(p), p)
            }
        }
    }
}

/// Hit provides common data shared by surface and medium interactions.
#[derive(Clone, Default)]
pub struct Hit {
    /// Point of interaction.
    pub p: Point3f,

    /// Time when interaction occurred.
    pub time: Float,

    /// Floating point error for ray intersection points.
    pub p_error: Vector3f,

    /// The negative ray direction (outgoing direction used when computing
    /// lighting at points).
    pub wo: Vector3f,

    /// Surface normal at the point `p`. Zero for medium interactions.
    pub n: Normal3f,

    /// The medium interface used for scattering media.
    pub medium_interface: MediumInterface,
}

impl Hit {
    /// Create a new hit.
    ///
    /// NOTE: Use `Hit::new_minimal()` when `wo`, `n` and `p_error` are not
    /// known; this function normalizes `wo`.
    ///
    /// `p`                - Point of interaction.
    /// `time`             - Time when interaction occurred.
    /// `p_error`          - Floating point error for ray intersection points.
    /// `wo`               - The negative ray direction.
    /// `n`                - Surface normal at the point `p`.
    /// `medium_interface` - The medium interface used for scattering media.
    pub fn new(
        p: Point3f,
        time: Float,
        p_error: Vector3f,
        wo: Vector3f,
        n: Normal3f,
        medium_interface: MediumInterface,
    ) -> Self {
        let wo = if wo.length_squared() > 0.0 { wo.normalize() } else { wo };
        Self {
            p,
            time,
            p_error,
            wo,
            n,
            medium_interface,
        }
    }

    /// Create a new hit from minimal fields.
    ///
    /// `p`                - Point of interaction.
    /// `time`             - Time when interaction occurred.
    /// `medium_interface` - The medium interface used for scattering media.
    pub fn new_minimal(p: Point3f, time: Float, medium_interface: MediumInterface) -> Self {
        Self {
            p,
            time,
            medium_interface,
            ..Default::default()
        }
    }

    /// Returns `true` if this is a surface interaction.
    pub fn is_surface_interaction(&self) -> bool {
        !self.n.is_zero()
    }

    /// Returns `true` if this is a medium interaction.
    pub fn is_medium_interaction(&self) -> bool {
        !self.is_surface_interaction()
    }

    /// Spawn's a new ray in the given direction.
    ///
    /// * `d` - The new direction.
    pub fn spawn_ray(&self, d: &Vector3f) -> Ray {
        let origin = offset_ray_origin(&self.p, &self.p_error, &self.n, d);
        Ray::new(origin, *d, INFINITY, self.time, self.get_medium_in_direction(d))
    }

    /// Spawn's a new ray towards another point.
    ///
    /// * `p` - The target point.
    pub fn spawn_ray_to_point(&self, p: &Point3f) -> Ray {
        let d = *p - self.p;
        let origin = offset_ray_origin(&self.p, &self.p_error, &self.n, &d);
        let d = *p - origin;
        Ray::new(origin, d, 1.0 - SHADOW_EPSILON, self.time, self.get_medium_in_direction(&d))
    }

    /// Spawn's a new ray towards another interaction.
    ///
    /// * `hit` - The interaction.
    pub fn spawn_ray_to_hit(&self, hit: &Hit) -> Ray {
        let origin = offset_ray_origin(&self.p, &self.p_error, &self.n, &(hit.p - self.p));
        let target = offset_ray_origin(&hit.p, &hit.p_error, &hit.n, &(origin - hit.p));
        let d = target - origin;
        Ray::new(origin, d, 1.0 - SHADOW_EPSILON, self.time, self.get_medium_in_direction(&d))
    }

    /// Returns the medium towards a direction. Medium interactions always
    /// return the medium they are in.
    ///
    /// * `w` - The direction.
    pub fn get_medium_in_direction(&self, w: &Vector3f) -> Option<ArcMedium> {
        if self.is_medium_interaction() {
            self.medium_interface.inside.clone()
        } else if w.dot(&self.n) > 0.0 {
            self.medium_interface.outside.clone()
        } else {
            self.medium_interface.inside.clone()
        }
    }

    /// Returns the medium when interior and exterior are the same.
    pub fn get_medium(&self) -> Option<ArcMedium> {
        if self.medium_interface.is_medium_transition() {
            None
        } else {
            self.medium_interface.inside.clone()
        }
    }
}

// ---- Tests ----

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawned_rays_start_above_the_surface() {
        let hit = Hit::new(
            Point3f::ZERO,
            0.0,
            Vector3f::new(1e-4, 1e-4, 1e-4),
            Vector3f::new(0.0, 0.0, 1.0),
            Normal3f::new(0.0, 0.0, 1.0),
            MediumInterface::default(),
        );
        let up = hit.spawn_ray(&Vector3f::new(0.0, 0.0, 1.0));
        let down = hit.spawn_ray(&Vector3f::new(0.0, 0.0, -1.0));
        assert!(up.o.z > 0.0);
        assert!(down.o.z < 0.0);
    }

    #[test]
    fn ray_to_point_stops_short_of_target() {
        let hit = Hit::new_minimal(Point3f::ZERO, 0.0, MediumInterface::default());
        let target = Point3f::new(0.0, 3.0, 0.0);
        let ray = hit.spawn_ray_to_point(&target);
        let end = ray.at(ray.t_max);
        assert!(end.y < 3.0 && end.y > 2.99);
        assert!(hit.is_medium_interaction());
    }
}
