//! Axis-aligned bounding boxes

use crate::geometry::*;
use crate::pbrt::*;
use num_traits::{Bounded, Num};
use std::fmt;

/// 2-D axis aligned bounding box.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Bounds2<T> {
    /// Minimum bounds.
    pub p_min: Point2<T>,

    /// Maximum bounds.
    pub p_max: Point2<T>,
}

/// 2-D bounding box containing `Float` points.
pub type Bounds2f = Bounds2<Float>;

/// 2-D bounding box containing `Int` points.
pub type Bounds2i = Bounds2<Int>;

/// 3-D axis aligned bounding box.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Bounds3<T> {
    /// Minimum bounds.
    pub p_min: Point3<T>,

    /// Maximum bounds.
    pub p_max: Point3<T>,
}

/// 3-D bounding box containing `Float` points.
pub type Bounds3f = Bounds3<Float>;

impl<T: Num + PartialOrd + Copy> Bounds2<T> {
    /// Creates a new 2-D bounding box from 2 corner points. The minimum and
    /// maximum bounds are sorted per axis.
    ///
    /// * `p1` - First corner.
    /// * `p2` - Second corner.
    pub fn new(p1: Point2<T>, p2: Point2<T>) -> Self {
        Self {
            p_min: p1.min(&p2),
            p_max: p1.max(&p2),
        }
    }

    /// Returns the vector along the box diagonal from the minimum point to
    /// the maximum point.
    pub fn diagonal(&self) -> Vector2<T> {
        self.p_max - self.p_min
    }

    /// Returns the area of the box. Empty boxes have zero area.
    pub fn area(&self) -> T {
        let d = self.diagonal();
        if d.x <= T::zero() || d.y <= T::zero() {
            T::zero()
        } else {
            d.x * d.y
        }
    }

    /// Returns the intersection of two boxes.
    ///
    /// * `other` - The other box.
    pub fn intersect(&self, other: &Self) -> Self {
        Self {
            p_min: self.p_min.max(&other.p_min),
            p_max: self.p_max.min(&other.p_max),
        }
    }

    /// Returns true if a point lies inside the box, excluding the upper
    /// boundary. This is the convention used for integer pixel bounds.
    ///
    /// * `p` - The point.
    pub fn contains_exclusive(&self, p: &Point2<T>) -> bool {
        p.x >= self.p_min.x && p.x < self.p_max.x && p.y >= self.p_min.y && p.y < self.p_max.y
    }

    /// Returns true if a point lies inside the box including its boundary.
    pub fn contains(&self, p: &Point2<T>) -> bool {
        p.x >= self.p_min.x && p.x <= self.p_max.x && p.y >= self.p_min.y && p.y <= self.p_max.y
    }
}

impl Bounds2f {
    /// Linearly interpolates between the corners of the box.
    ///
    /// * `t` - Interpolation parameter per axis.
    pub fn lerp(&self, t: &Point2f) -> Point2f {
        Point2f::new(
            lerp(t.x, self.p_min.x, self.p_max.x),
            lerp(t.y, self.p_min.y, self.p_max.y),
        )
    }
}

impl From<Bounds2i> for Bounds2f {
    fn from(b: Bounds2i) -> Self {
        Self {
            p_min: Point2f::from(b.p_min),
            p_max: Point2f::from(b.p_max),
        }
    }
}

impl<T: Num + Copy + fmt::Display> fmt::Display for Bounds2<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[ {}, {} - {}, {} ]",
            self.p_min.x, self.p_min.y, self.p_max.x, self.p_max.y
        )
    }
}

impl IntoIterator for Bounds2i {
    type Item = Point2i;
    type IntoIter = Bounds2iIterator;

    /// Iterates the integer points in the box in scanline order, excluding
    /// the upper bounds.
    fn into_iter(self) -> Self::IntoIter {
        Bounds2iIterator {
            p: self.p_min,
            bounds: self,
        }
    }
}

/// Iterator over the integer points of a `Bounds2i`.
pub struct Bounds2iIterator {
    /// Next point.
    p: Point2i,

    /// The bounds being iterated.
    bounds: Bounds2i,
}

impl Iterator for Bounds2iIterator {
    type Item = Point2i;

    fn next(&mut self) -> Option<Point2i> {
        if self.bounds.p_min.x >= self.bounds.p_max.x || self.p.y >= self.bounds.p_max.y {
            return None;
        }

        let current = self.p;
        self.p.x += 1;
        if self.p.x == self.bounds.p_max.x {
            self.p.x = self.bounds.p_min.x;
            self.p.y += 1;
        }
        Some(current)
    }
}

impl<T: Num + PartialOrd + Copy + Bounded> Bounds3<T> {
    /// Creates a new 3-D bounding box from 2 corner points.
    ///
    /// * `p1` - First corner.
    /// * `p2` - Second corner.
    pub fn new(p1: Point3<T>, p2: Point3<T>) -> Self {
        Self {
            p_min: p1.min(&p2),
            p_max: p1.max(&p2),
        }
    }

    /// Returns an empty box, where the minimum is larger than the maximum so
    /// that any union yields the other operand.
    pub fn empty() -> Self {
        Self {
            p_min: Point3::new(T::max_value(), T::max_value(), T::max_value()),
            p_max: Point3::new(T::min_value(), T::min_value(), T::min_value()),
        }
    }

    /// Returns the box enclosing this box and a point.
    ///
    /// * `p` - The point.
    pub fn union_point(&self, p: &Point3<T>) -> Self {
        Self {
            p_min: self.p_min.min(p),
            p_max: self.p_max.max(p),
        }
    }

    /// Returns the box enclosing both boxes.
    ///
    /// * `other` - The other box.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            p_min: self.p_min.min(&other.p_min),
            p_max: self.p_max.max(&other.p_max),
        }
    }

    /// Returns the vector along the box diagonal.
    pub fn diagonal(&self) -> Vector3<T> {
        self.p_max - self.p_min
    }

    /// Returns true if the point lies inside the box.
    pub fn inside(&self, p: &Point3<T>) -> bool {
        p.x >= self.p_min.x
            && p.x <= self.p_max.x
            && p.y >= self.p_min.y
            && p.y <= self.p_max.y
            && p.z >= self.p_min.z
            && p.z <= self.p_max.z
    }
}

impl Bounds3f {
    /// Returns the continuous position of a point relative to the corners of
    /// the box; `p_min` maps to `(0, 0, 0)` and `p_max` to `(1, 1, 1)`.
    ///
    /// * `p` - The point.
    pub fn offset(&self, p: &Point3f) -> Vector3f {
        let mut o = *p - self.p_min;
        for i in 0..3 {
            if self.p_max[i] > self.p_min[i] {
                o[i] /= self.p_max[i] - self.p_min[i];
            }
        }
        o
    }

    /// Linearly interpolates between the corners of the box.
    ///
    /// * `t` - Interpolation parameter per axis.
    pub fn lerp(&self, t: &Point3f) -> Point3f {
        Point3f::new(
            lerp(t.x, self.p_min.x, self.p_max.x),
            lerp(t.y, self.p_min.y, self.p_max.y),
            lerp(t.z, self.p_min.z, self.p_max.z),
        )
    }

    /// Returns the center and radius of a sphere that bounds the box.
    pub fn bounding_sphere(&self) -> (Point3f, Float) {
        let center = (self.p_min + self.p_max) * 0.5;
        let radius = if self.inside(&center) {
            center.distance(&self.p_max)
        } else {
            0.0
        };
        (center, radius)
    }
}

// ---- Tests ----

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn point2i() -> impl Strategy<Value = Point2i> {
        (-50..50_i32, -50..50_i32).prop_map(|(x, y)| Point2i::new(x, y))
    }

    #[test]
    fn iterating_empty_bounds_returns_none() {
        let b = Bounds2i::new(Point2i::new(2, 2), Point2i::new(2, 5));
        assert_eq!(b.into_iter().count(), 0);
    }

    #[test]
    fn iterates_in_scanline_order() {
        let b = Bounds2i::new(Point2i::new(0, 0), Point2i::new(2, 2));
        let points: Vec<Point2i> = b.into_iter().collect();
        assert_eq!(
            points,
            vec![
                Point2i::new(0, 0),
                Point2i::new(1, 0),
                Point2i::new(0, 1),
                Point2i::new(1, 1)
            ]
        );
    }

    #[test]
    fn bounding_sphere_of_empty_box_is_degenerate() {
        let (_, r) = Bounds3f::empty().bounding_sphere();
        assert_eq!(r, 0.0);
    }

    proptest! {
        #[test]
        fn iteration_visits_area_points(p1 in point2i(), p2 in point2i()) {
            let b = Bounds2i::new(p1, p2);
            prop_assert_eq!(b.into_iter().count() as i32, b.area());
            prop_assert!(b.into_iter().all(|p| b.contains_exclusive(&p)));
        }

        #[test]
        fn intersection_is_contained(p1 in point2i(), p2 in point2i(), p3 in point2i(), p4 in point2i()) {
            let a = Bounds2i::new(p1, p2);
            let b = Bounds2i::new(p3, p4);
            let c = a.intersect(&b);
            for p in c {
                prop_assert!(a.contains_exclusive(&p) && b.contains_exclusive(&p));
            }
        }
    }
}
