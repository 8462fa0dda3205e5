//! Rays

use crate::geometry::*;
use crate::medium::*;
use crate::pbrt::*;
use std::fmt;
use std::sync::Arc;

/// Offset rays for the neighbouring pixels in x and y, used to estimate the
/// footprint of a camera ray.
#[derive(Copy, Clone, Debug, Default)]
pub struct RayDifferential {
    /// Origin of the ray offset in x.
    pub rx_origin: Point3f,

    /// Origin of the ray offset in y.
    pub ry_origin: Point3f,

    /// Direction of the ray offset in x.
    pub rx_direction: Vector3f,

    /// Direction of the ray offset in y.
    pub ry_direction: Vector3f,
}

/// A semi-infinite line with an optional parametric limit.
#[derive(Clone)]
pub struct Ray {
    /// Origin.
    pub o: Point3f,

    /// Direction.
    pub d: Vector3f,

    /// Limits the ray to the segment `[0, t_max)`.
    pub t_max: Float,

    /// Time value.
    pub time: Float,

    /// The medium containing the ray origin.
    pub medium: Option<ArcMedium>,

    /// Auxilliary rays offset by one pixel in x and y.
    pub differentials: Option<RayDifferential>,
}

impl Ray {
    /// Creates a new ray.
    ///
    /// * `o`      - Origin.
    /// * `d`      - Direction.
    /// * `t_max`  - Parametric limit.
    /// * `time`   - Time value.
    /// * `medium` - The medium containing the origin.
    pub fn new(o: Point3f, d: Vector3f, t_max: Float, time: Float, medium: Option<ArcMedium>) -> Self {
        Self {
            o,
            d,
            t_max,
            time,
            medium,
            differentials: None,
        }
    }

    /// Returns the point at parameter `t` along the ray.
    ///
    /// * `t` - The parameter.
    pub fn at(&self, t: Float) -> Point3f {
        self.o + self.d * t
    }

    /// Scales the differential rays to account for sample spacing when more
    /// than one sample is taken per pixel.
    ///
    /// * `s` - The scale.
    pub fn scale_differentials(&mut self, s: Float) {
        if let Some(diff) = self.differentials.as_mut() {
            diff.rx_origin = self.o + (diff.rx_origin - self.o) * s;
            diff.ry_origin = self.o + (diff.ry_origin - self.o) * s;
            diff.rx_direction = self.d + (diff.rx_direction - self.d) * s;
            diff.ry_direction = self.d + (diff.ry_direction - self.d) * s;
        }
    }

    /// Returns true if the origin or direction contain NaNs.
    pub fn has_nans(&self) -> bool {
        self.o.has_nans() || self.d.has_nans() || self.t_max.is_nan()
    }

    /// Returns a copy of the ray medium.
    pub fn medium(&self) -> Option<ArcMedium> {
        self.medium.as_ref().map(Arc::clone)
    }
}

impl Default for Ray {
    fn default() -> Self {
        Self::new(Point3f::ZERO, Vector3f::ZERO, INFINITY, 0.0, None)
    }
}

impl fmt::Debug for Ray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ray")
            .field("o", &self.o)
            .field("d", &self.d)
            .field("t_max", &self.t_max)
            .field("time", &self.time)
            .field("has_medium", &self.medium.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    #[test]
    fn scaling_differentials_moves_offsets_towards_ray() {
        let mut ray = Ray::new(Point3f::ZERO, Vector3f::new(0.0, 0.0, 1.0), INFINITY, 0.0, None);
        ray.differentials = Some(RayDifferential {
            rx_origin: Point3f::new(2.0, 0.0, 0.0),
            ry_origin: Point3f::new(0.0, 2.0, 0.0),
            rx_direction: Vector3f::new(1.0, 0.0, 1.0),
            ry_direction: Vector3f::new(0.0, 1.0, 1.0),
        });
        ray.scale_differentials(0.5);

        let diff = ray.differentials.unwrap();
        assert!(approx_eq!(Float, diff.rx_origin.x, 1.0));
        assert!(approx_eq!(Float, diff.ry_origin.y, 1.0));
        assert!(approx_eq!(Float, diff.rx_direction.x, 0.5));
        assert!(approx_eq!(Float, diff.ry_direction.y, 0.5));
    }

    #[test]
    fn at_returns_point_along_direction() {
        let ray = Ray::new(
            Point3f::new(1.0, 1.0, 1.0),
            Vector3f::new(0.0, 2.0, 0.0),
            INFINITY,
            0.0,
            None,
        );
        let p = ray.at(1.5);
        assert!(approx_eq!(Float, p.y, 4.0));
    }
}
