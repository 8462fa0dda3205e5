//! Vectors

use crate::pbrt::*;
use num_traits::Num;
use std::ops::{Add, AddAssign, Div, DivAssign, Index, IndexMut, Mul, MulAssign, Neg, Sub};

/// A 2-D vector containing numeric values.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Vector2<T> {
    /// X-coordinate.
    pub x: T,

    /// Y-coordinate.
    pub y: T,
}

/// 2-D vector containing `Float` values.
pub type Vector2f = Vector2<Float>;

/// 2-D vector containing `Int` values.
pub type Vector2i = Vector2<Int>;

/// A 3-D vector containing numeric values.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Vector3<T> {
    /// X-coordinate.
    pub x: T,

    /// Y-coordinate.
    pub y: T,

    /// Z-coordinate.
    pub z: T,
}

/// 3-D vector containing `Float` values.
pub type Vector3f = Vector3<Float>;

impl<T: Num + Copy> Vector2<T> {
    /// Creates a new 2-D vector.
    pub fn new(x: T, y: T) -> Self {
        Self { x, y }
    }
}

impl Vector2f {
    /// Returns the square of the vector's length.
    pub fn length_squared(&self) -> Float {
        self.x * self.x + self.y * self.y
    }

    /// Returns the vector's length.
    pub fn length(&self) -> Float {
        self.length_squared().sqrt()
    }
}

impl<T: Num + Copy> Add for Vector2<T> {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

impl<T: Num + Copy> Sub for Vector2<T> {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }
}

impl<T: Num + Copy> Mul<T> for Vector2<T> {
    type Output = Self;

    fn mul(self, s: T) -> Self {
        Self::new(self.x * s, self.y * s)
    }
}

impl<T: Num + Copy> Div<T> for Vector2<T> {
    type Output = Self;

    fn div(self, s: T) -> Self {
        Self::new(self.x / s, self.y / s)
    }
}

impl<T> Index<usize> for Vector2<T> {
    type Output = T;

    fn index(&self, i: usize) -> &T {
        match i {
            0 => &self.x,
            1 => &self.y,
            _ => panic!("Invalid index {i} for Vector2"),
        }
    }
}

impl From<Vector2i> for Vector2f {
    fn from(v: Vector2i) -> Self {
        Self::new(v.x as Float, v.y as Float)
    }
}

impl<T: Num + Copy> Vector3<T> {
    /// Creates a new 3-D vector.
    ///
    /// * `x` - X-coordinate.
    /// * `y` - Y-coordinate.
    /// * `z` - Z-coordinate.
    pub fn new(x: T, y: T, z: T) -> Self {
        Self { x, y, z }
    }

    /// Returns the largest coordinate value.
    pub fn max_component(&self) -> T
    where
        T: PartialOrd,
    {
        max(self.x, max(self.y, self.z))
    }

    /// Returns the index of the coordinate with the largest value.
    pub fn max_dimension(&self) -> usize
    where
        T: PartialOrd,
    {
        if self.x > self.y {
            if self.x > self.z {
                0
            } else {
                2
            }
        } else if self.y > self.z {
            1
        } else {
            2
        }
    }

    /// Returns a new vector containing absolute values of the components.
    pub fn abs(&self) -> Self
    where
        T: Neg<Output = T> + PartialOrd,
    {
        Self::new(abs(self.x), abs(self.y), abs(self.z))
    }
}

impl Vector3f {
    /// The zero vector.
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    /// Returns true if any coordinate is NaN.
    pub fn has_nans(&self) -> bool {
        self.x.is_nan() || self.y.is_nan() || self.z.is_nan()
    }

    /// Returns the square of the vector's length.
    pub fn length_squared(&self) -> Float {
        self.x * self.x + self.y * self.y + self.z * self.z
    }

    /// Returns the vector's length.
    pub fn length(&self) -> Float {
        self.length_squared().sqrt()
    }

    /// Returns a unit vector in the same direction.
    pub fn normalize(&self) -> Self {
        *self / self.length()
    }

    /// Returns the cross product with another vector.
    ///
    /// * `other` - The other vector.
    pub fn cross(&self, other: &Self) -> Self {
        // Widen to f64 to avoid catastrophic cancellation.
        let (v1x, v1y, v1z) = (self.x as f64, self.y as f64, self.z as f64);
        let (v2x, v2y, v2z) = (other.x as f64, other.y as f64, other.z as f64);
        Self::new(
            (v1y * v2z - v1z * v2y) as Float,
            (v1z * v2x - v1x * v2z) as Float,
            (v1x * v2y - v1y * v2x) as Float,
        )
    }
}

impl<T: Num + Copy> Add for Vector3<T> {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

impl<T: Num + Copy> AddAssign for Vector3<T> {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl<T: Num + Copy> Sub for Vector3<T> {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

impl<T: Num + Copy> Mul<T> for Vector3<T> {
    type Output = Self;

    fn mul(self, s: T) -> Self {
        Self::new(self.x * s, self.y * s, self.z * s)
    }
}

impl Mul<Vector3f> for Float {
    type Output = Vector3f;

    fn mul(self, v: Vector3f) -> Vector3f {
        v * self
    }
}

impl<T: Num + Copy> MulAssign<T> for Vector3<T> {
    fn mul_assign(&mut self, s: T) {
        *self = *self * s;
    }
}

impl<T: Num + Copy> Div<T> for Vector3<T> {
    type Output = Self;

    fn div(self, s: T) -> Self {
        Self::new(self.x / s, self.y / s, self.z / s)
    }
}

impl<T: Num + Copy> DivAssign<T> for Vector3<T> {
    fn div_assign(&mut self, s: T) {
        *self = *self / s;
    }
}

impl<T: Num + Copy + Neg<Output = T>> Neg for Vector3<T> {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

impl<T> Index<usize> for Vector3<T> {
    type Output = T;

    fn index(&self, i: usize) -> &T {
        match i {
            0 => &self.x,
            1 => &self.y,
            2 => &self.z,
            _ => panic!("Invalid index {i} for Vector3"),
        }
    }
}

impl<T> IndexMut<usize> for Vector3<T> {
    fn index_mut(&mut self, i: usize) -> &mut T {
        match i {
            0 => &mut self.x,
            1 => &mut self.y,
            2 => &mut self.z,
            _ => panic!("Invalid index {i} for Vector3"),
        }
    }
}

// ---- Tests ----

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Dot;
    use float_cmp::approx_eq;
    use proptest::prelude::*;

    fn vector3f() -> impl Strategy<Value = Vector3f> {
        (-100.0..100.0_f32, -100.0..100.0_f32, -100.0..100.0_f32)
            .prop_map(|(x, y, z)| Vector3f::new(x, y, z))
    }

    #[test]
    fn max_dimension_picks_largest() {
        assert_eq!(Vector3f::new(3.0, 1.0, 2.0).max_dimension(), 0);
        assert_eq!(Vector3f::new(1.0, 3.0, 2.0).max_dimension(), 1);
        assert_eq!(Vector3f::new(1.0, 2.0, 3.0).max_dimension(), 2);
    }

    proptest! {
        #[test]
        fn cross_is_orthogonal(v1 in vector3f(), v2 in vector3f()) {
            let c = v1.cross(&v2);
            let scale = 1.0 + v1.length_squared() * v2.length();
            prop_assert!(c.dot(&v1).abs() / scale < 1e-2);
        }

        #[test]
        fn normalized_has_unit_length(v in vector3f()) {
            prop_assume!(v.length() > 1e-3);
            prop_assert!(approx_eq!(Float, v.normalize().length(), 1.0, epsilon = 1e-5));
        }
    }
}
