//! Surface normals

use crate::geometry::*;
use crate::pbrt::*;
use num_traits::Num;
use std::ops::{Add, Index, Mul, Neg, Sub};

/// A 3-D surface normal. Unlike vectors, normals are not necessarily
/// normalized and transform differently.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Normal3<T> {
    /// X-coordinate.
    pub x: T,

    /// Y-coordinate.
    pub y: T,

    /// Z-coordinate.
    pub z: T,
}

/// 3-D normal containing `Float` values.
pub type Normal3f = Normal3<Float>;

impl<T: Num + Copy> Normal3<T> {
    /// Creates a new 3-D normal.
    pub fn new(x: T, y: T, z: T) -> Self {
        Self { x, y, z }
    }
}

impl Normal3f {
    /// The zero normal. Used to mark interactions that are not on a surface.
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    /// Returns the square of the normal's length.
    pub fn length_squared(&self) -> Float {
        self.x * self.x + self.y * self.y + self.z * self.z
    }

    /// Returns the normal's length.
    pub fn length(&self) -> Float {
        self.length_squared().sqrt()
    }

    /// Returns a unit normal in the same direction.
    pub fn normalize(&self) -> Self {
        *self * (1.0 / self.length())
    }

    /// Returns true if this is the zero normal.
    pub fn is_zero(&self) -> bool {
        self.x == 0.0 && self.y == 0.0 && self.z == 0.0
    }

    /// Flips the normal so it lies in the same hemisphere as `v`.
    ///
    /// * `v` - The reference direction.
    pub fn face_forward(&self, v: &Vector3f) -> Self {
        if self.dot(v) < 0.0 {
            -*self
        } else {
            *self
        }
    }
}

impl<T: Num + Copy> Add for Normal3<T> {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

impl<T: Num + Copy> Sub for Normal3<T> {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

impl<T: Num + Copy> Mul<T> for Normal3<T> {
    type Output = Self;

    fn mul(self, s: T) -> Self {
        Self::new(self.x * s, self.y * s, self.z * s)
    }
}

impl Mul<Normal3f> for Float {
    type Output = Normal3f;

    fn mul(self, n: Normal3f) -> Normal3f {
        n * self
    }
}

impl<T: Num + Copy + Neg<Output = T>> Neg for Normal3<T> {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

impl<T> Index<usize> for Normal3<T> {
    type Output = T;

    fn index(&self, i: usize) -> &T {
        match i {
            0 => &self.x,
            1 => &self.y,
            2 => &self.z,
            _ => panic!("Invalid index {i} for Normal3"),
        }
    }
}

impl From<Vector3f> for Normal3f {
    fn from(v: Vector3f) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

impl From<Normal3f> for Vector3f {
    fn from(n: Normal3f) -> Self {
        Self::new(n.x, n.y, n.z)
    }
}
