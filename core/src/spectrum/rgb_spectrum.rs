//! RGB Spectrum

use super::{rgb_to_xyz, xyz_to_rgb};
use crate::pbrt::*;
use std::fmt;
use std::iter::Sum;
use std::ops::{
    Add, AddAssign, Div, DivAssign, Index, IndexMut, Mul, MulAssign, Neg, Sub, SubAssign,
};

/// Spectral power distribution represented by linear RGB coefficients.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct RGBSpectrum {
    /// The red, green and blue coefficients.
    c: [Float; 3],
}

impl RGBSpectrum {
    /// Spectrum with all coefficients set to zero.
    pub const ZERO: Self = Self { c: [0.0; 3] };

    /// Spectrum with all coefficients set to one.
    pub const ONE: Self = Self { c: [1.0; 3] };

    /// Creates a spectrum with a constant value.
    ///
    /// * `v` - The value.
    pub const fn new(v: Float) -> Self {
        Self { c: [v; 3] }
    }

    /// Creates a spectrum from RGB coefficients.
    ///
    /// * `rgb` - The RGB coefficients.
    pub const fn from_rgb(rgb: [Float; 3]) -> Self {
        Self { c: rgb }
    }

    /// Creates a spectrum from XYZ coefficients.
    ///
    /// * `xyz` - The XYZ coefficients.
    pub fn from_xyz(xyz: &[Float; 3]) -> Self {
        Self::from_rgb(xyz_to_rgb(xyz))
    }

    /// Returns the RGB coefficients.
    pub fn to_rgb(&self) -> [Float; 3] {
        self.c
    }

    /// Returns the XYZ coefficients.
    pub fn to_xyz(&self) -> [Float; 3] {
        rgb_to_xyz(&self.c)
    }

    /// Returns the luminance (the y-coefficient of the XYZ colour).
    pub fn y(&self) -> Float {
        0.212671 * self.c[0] + 0.715160 * self.c[1] + 0.072169 * self.c[2]
    }

    /// Returns true if all coefficients are zero.
    pub fn is_black(&self) -> bool {
        self.c.iter().all(|v| *v == 0.0)
    }

    /// Returns true if any coefficient is NaN.
    pub fn has_nans(&self) -> bool {
        self.c.iter().any(|v| v.is_nan())
    }

    /// Returns the maximum coefficient.
    pub fn max_component_value(&self) -> Float {
        max(self.c[0], max(self.c[1], self.c[2]))
    }

    /// Returns the component-wise square root.
    pub fn sqrt(&self) -> Self {
        Self::from_rgb([self.c[0].sqrt(), self.c[1].sqrt(), self.c[2].sqrt()])
    }

    /// Returns the component-wise exponential.
    pub fn exp(&self) -> Self {
        Self::from_rgb([self.c[0].exp(), self.c[1].exp(), self.c[2].exp()])
    }

    /// Clamps the coefficients to `[low, high]`.
    pub fn clamp(&self, low: Float, high: Float) -> Self {
        Self::from_rgb([
            clamp(self.c[0], low, high),
            clamp(self.c[1], low, high),
            clamp(self.c[2], low, high),
        ])
    }

    /// Divides component-wise, treating division by zero as zero.
    pub fn safe_div(&self, other: &Self) -> Self {
        let mut r = *self;
        for i in 0..3 {
            r.c[i] = if other.c[i] != 0.0 {
                self.c[i] / other.c[i]
            } else {
                0.0
            };
        }
        r
    }

    fn map2(self, other: Self, f: impl Fn(Float, Float) -> Float) -> Self {
        Self::from_rgb([
            f(self.c[0], other.c[0]),
            f(self.c[1], other.c[1]),
            f(self.c[2], other.c[2]),
        ])
    }
}

impl Add for RGBSpectrum {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        self.map2(other, |a, b| a + b)
    }
}

impl AddAssign for RGBSpectrum {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl Sub for RGBSpectrum {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        self.map2(other, |a, b| a - b)
    }
}

impl SubAssign for RGBSpectrum {
    fn sub_assign(&mut self, other: Self) {
        *self = *self - other;
    }
}

impl Mul for RGBSpectrum {
    type Output = Self;

    fn mul(self, other: Self) -> Self {
        self.map2(other, |a, b| a * b)
    }
}

impl MulAssign for RGBSpectrum {
    fn mul_assign(&mut self, other: Self) {
        *self = *self * other;
    }
}

impl Mul<Float> for RGBSpectrum {
    type Output = Self;

    fn mul(self, s: Float) -> Self {
        Self::from_rgb([self.c[0] * s, self.c[1] * s, self.c[2] * s])
    }
}

impl Mul<RGBSpectrum> for Float {
    type Output = RGBSpectrum;

    fn mul(self, s: RGBSpectrum) -> RGBSpectrum {
        s * self
    }
}

impl MulAssign<Float> for RGBSpectrum {
    fn mul_assign(&mut self, s: Float) {
        *self = *self * s;
    }
}

impl Div for RGBSpectrum {
    type Output = Self;

    fn div(self, other: Self) -> Self {
        self.map2(other, |a, b| a / b)
    }
}

impl Div<Float> for RGBSpectrum {
    type Output = Self;

    fn div(self, s: Float) -> Self {
        debug_assert!(s != 0.0, "Division of spectrum by zero");
        let inv = 1.0 / s;
        self * inv
    }
}

impl DivAssign<Float> for RGBSpectrum {
    fn div_assign(&mut self, s: Float) {
        *self = *self / s;
    }
}

impl Neg for RGBSpectrum {
    type Output = Self;

    fn neg(self) -> Self {
        Self::from_rgb([-self.c[0], -self.c[1], -self.c[2]])
    }
}

impl Index<usize> for RGBSpectrum {
    type Output = Float;

    fn index(&self, i: usize) -> &Float {
        &self.c[i]
    }
}

impl IndexMut<usize> for RGBSpectrum {
    fn index_mut(&mut self, i: usize) -> &mut Float {
        &mut self.c[i]
    }
}

impl Sum for RGBSpectrum {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |a, b| a + b)
    }
}

impl fmt::Display for RGBSpectrum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}]", self.c[0], self.c[1], self.c[2])
    }
}

// ---- Tests ----
