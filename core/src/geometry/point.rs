//! Points

use crate::geometry::*;
use crate::pbrt::*;
use num_traits::Num;
use std::ops::{Add, AddAssign, Div, Index, IndexMut, Mul, Sub};

/// A 2-D point containing numeric values.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Point2<T> {
    /// X-coordinate.
    pub x: T,

    /// Y-coordinate.
    pub y: T,
}

/// 2-D point containing `Float` values.
pub type Point2f = Point2<Float>;

/// 2-D point containing `Int` values.
pub type Point2i = Point2<Int>;

/// A 3-D point containing numeric values.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Point3<T> {
    /// X-coordinate.
    pub x: T,

    /// Y-coordinate.
    pub y: T,

    /// Z-coordinate.
    pub z: T,
}

/// 3-D point containing `Float` values.
pub type Point3f = Point3<Float>;

/// 3-D point containing `Int` values.
pub type Point3i = Point3<Int>;

impl<T: Num + Copy> Point2<T> {
    /// Creates a new 2-D point.
    ///
    /// * `x` - X-coordinate.
    /// * `y` - Y-coordinate.
    pub fn new(x: T, y: T) -> Self {
        Self { x, y }
    }

    /// Return the component-wise minimum coordinate values with another point.
    pub fn min(&self, other: &Self) -> Self
    where
        T: PartialOrd,
    {
        Self::new(min(self.x, other.x), min(self.y, other.y))
    }

    /// Return the component-wise maximum coordinate values with another point.
    pub fn max(&self, other: &Self) -> Self
    where
        T: PartialOrd,
    {
        Self::new(max(self.x, other.x), max(self.y, other.y))
    }
}

impl Point2f {
    /// Returns a new point containing floor of values of the components.
    pub fn floor(&self) -> Self {
        Self::new(self.x.floor(), self.y.floor())
    }

    /// Returns a new point containing ceil of values of the components.
    pub fn ceil(&self) -> Self {
        Self::new(self.x.ceil(), self.y.ceil())
    }
}

impl<T: Num + Copy> Add<Vector2<T>> for Point2<T> {
    type Output = Self;

    fn add(self, v: Vector2<T>) -> Self {
        Self::new(self.x + v.x, self.y + v.y)
    }
}

impl<T: Num + Copy> Add for Point2<T> {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

impl<T: Num + Copy> Sub for Point2<T> {
    type Output = Vector2<T>;

    fn sub(self, other: Self) -> Vector2<T> {
        Vector2::new(self.x - other.x, self.y - other.y)
    }
}

impl<T: Num + Copy> Sub<Vector2<T>> for Point2<T> {
    type Output = Self;

    fn sub(self, v: Vector2<T>) -> Self {
        Self::new(self.x - v.x, self.y - v.y)
    }
}

impl<T: Num + Copy> Mul<T> for Point2<T> {
    type Output = Self;

    fn mul(self, s: T) -> Self {
        Self::new(self.x * s, self.y * s)
    }
}

impl Mul<Point2f> for Float {
    type Output = Point2f;

    fn mul(self, p: Point2f) -> Point2f {
        p * self
    }
}

impl<T> Index<usize> for Point2<T> {
    type Output = T;

    fn index(&self, i: usize) -> &T {
        match i {
            0 => &self.x,
            1 => &self.y,
            _ => panic!("Invalid index {i} for Point2"),
        }
    }
}

impl<T> IndexMut<usize> for Point2<T> {
    fn index_mut(&mut self, i: usize) -> &mut T {
        match i {
            0 => &mut self.x,
            1 => &mut self.y,
            _ => panic!("Invalid index {i} for Point2"),
        }
    }
}

impl From<Point2i> for Point2f {
    fn from(p: Point2i) -> Self {
        Self::new(p.x as Float, p.y as Float)
    }
}

impl From<Point2f> for Point2i {
    /// Truncates the coordinates.
    fn from(p: Point2f) -> Self {
        Self::new(p.x as Int, p.y as Int)
    }
}

impl<T: Num + Copy> Point3<T> {
    /// Creates a new 3-D point.
    ///
    /// * `x` - X-coordinate.
    /// * `y` - Y-coordinate.
    /// * `z` - Z-coordinate.
    pub fn new(x: T, y: T, z: T) -> Self {
        Self { x, y, z }
    }

    /// Return the component-wise minimum coordinate values with another point.
    pub fn min(&self, other: &Self) -> Self
    where
        T: PartialOrd,
    {
        Self::new(min(self.x, other.x), min(self.y, other.y), min(self.z, other.z))
    }

    /// Return the component-wise maximum coordinate values with another point.
    pub fn max(&self, other: &Self) -> Self
    where
        T: PartialOrd,
    {
        Self::new(max(self.x, other.x), max(self.y, other.y), max(self.z, other.z))
    }
}

impl Point3f {
    /// The origin.
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    /// Returns the distance to another point.
    pub fn distance(&self, other: &Self) -> Float {
        (*self - *other).length()
    }

    /// Returns the square of the distance to another point.
    pub fn distance_squared(&self, other: &Self) -> Float {
        (*self - *other).length_squared()
    }

    /// Returns a new point containing absolute values of the components.
    pub fn abs(&self) -> Self {
        Self::new(self.x.abs(), self.y.abs(), self.z.abs())
    }

    /// Returns true if any coordinate is NaN.
    pub fn has_nans(&self) -> bool {
        self.x.is_nan() || self.y.is_nan() || self.z.is_nan()
    }
}

impl<T: Num + Copy> Add<Vector3<T>> for Point3<T> {
    type Output = Self;

    fn add(self, v: Vector3<T>) -> Self {
        Self::new(self.x + v.x, self.y + v.y, self.z + v.z)
    }
}

impl<T: Num + Copy> AddAssign<Vector3<T>> for Point3<T> {
    fn add_assign(&mut self, v: Vector3<T>) {
        *self = *self + v;
    }
}

impl<T: Num + Copy> Add for Point3<T> {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

impl<T: Num + Copy> Sub for Point3<T> {
    type Output = Vector3<T>;

    fn sub(self, other: Self) -> Vector3<T> {
        Vector3::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

impl<T: Num + Copy> Sub<Vector3<T>> for Point3<T> {
    type Output = Self;

    fn sub(self, v: Vector3<T>) -> Self {
        Self::new(self.x - v.x, self.y - v.y, self.z - v.z)
    }
}

impl<T: Num + Copy> Mul<T> for Point3<T> {
    type Output = Self;

    fn mul(self, s: T) -> Self {
        Self::new(self.x * s, self.y * s, self.z * s)
    }
}

impl Mul<Point3f> for Float {
    type Output = Point3f;

    fn mul(self, p: Point3f) -> Point3f {
        p * self
    }
}

impl<T: Num + Copy> Div<T> for Point3<T> {
    type Output = Self;

    fn div(self, s: T) -> Self {
        Self::new(self.x / s, self.y / s, self.z / s)
    }
}

impl<T> Index<usize> for Point3<T> {
    type Output = T;

    fn index(&self, i: usize) -> &T {
        match i {
            0 => &self.x,
            1 => &self.y,
            2 => &self.z,
            _ => panic!("Invalid index {i} for Point3"),
        }
    }
}

impl<T> IndexMut<usize> for Point3<T> {
    fn index_mut(&mut self, i: usize) -> &mut T {
        match i {
            0 => &mut self.x,
            1 => &mut self.y,
            2 => &mut self.z,
            _ => panic!("Invalid index {i} for Point3"),
        }
    }
}

impl From<Point3f> for Vector3f {
    fn from(p: Point3f) -> Self {
        Self::new(p.x, p.y, p.z)
    }
}

impl From<Vector3f> for Point3f {
    fn from(v: Vector3f) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

// ---- Tests ----

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;
    use proptest::prelude::*;

    fn point3f() -> impl Strategy<Value = Point3f> {
        (-100.0..100.0_f32, -100.0..100.0_f32, -100.0..100.0_f32)
            .prop_map(|(x, y, z)| Point3f::new(x, y, z))
    }

    #[test]
    fn point2_conversion_truncates() {
        let p = Point2i::from(Point2f::new(1.7, 2.2));
        assert_eq!(p, Point2i::new(1, 2));
    }

    proptest! {
        #[test]
        fn distance_is_symmetric(p1 in point3f(), p2 in point3f()) {
            prop_assert!(approx_eq!(Float, p1.distance(&p2), p2.distance(&p1)));
        }

        #[test]
        fn adding_difference_recovers_point(p1 in point3f(), p2 in point3f()) {
            let p = p2 + (p1 - p2);
            prop_assert!(approx_eq!(Float, p.x, p1.x, epsilon = 1e-3));
            prop_assert!(approx_eq!(Float, p.y, p1.y, epsilon = 1e-3));
            prop_assert!(approx_eq!(Float, p.z, p1.z, epsilon = 1e-3));
        }
    }
}
