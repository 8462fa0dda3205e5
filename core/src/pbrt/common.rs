//! Common

use num_traits::{Num, Zero};
use std::ops::{Add, Mul, Neg};

/// Use 32-bit precision for floating point numbers.
pub type Float = f32;

/// Default signed integer to 32-bit.
pub type Int = i32;

/// Infinty (∞)
pub const INFINITY: Float = Float::INFINITY;

/// PI (π)
pub const PI: Float = std::f32::consts::PI;

/// 1/PI (1/π)
pub const INV_PI: Float = 1.0 / PI;

/// PI/2 (π/2)
pub const PI_OVER_TWO: Float = PI * 0.5;

/// PI/4 (π/4)
pub const PI_OVER_FOUR: Float = PI * 0.25;

/// 2*PI (2π)
pub const TWO_PI: Float = PI * 2.0;

/// 1/2*PI (1/2π)
pub const INV_TWO_PI: Float = 1.0 / TWO_PI;

/// 4*PI (4π)
pub const FOUR_PI: Float = PI * 4.0;

/// 1/4*PI (1/4π)
pub const INV_FOUR_PI: Float = 1.0 / FOUR_PI;

/// Machine Epsilon
pub const MACHINE_EPSILON: Float = std::f32::EPSILON * 0.5;

/// Shadow Epsilon
pub const SHADOW_EPSILON: Float = 0.0001;

/// 1 - epsilon in the precision we've selected for `Float`.
pub const ONE_MINUS_EPSILON: Float = hexf32!("0x1.fffffep-1");

/// Returns the absolute value of a number.
///
/// * `n` - The number.
#[inline(always)]
pub fn abs<T>(n: T) -> T
where
    T: Num + Neg<Output = T> + PartialOrd + Copy,
{
    if n < T::zero() {
        -n
    } else {
        n
    }
}

/// Returns the minimum of 2 numbers.
#[inline(always)]
pub fn min<T>(a: T, b: T) -> T
where
    T: PartialOrd + Copy,
{
    if a < b {
        a
    } else {
        b
    }
}

/// Returns the maximum of 2 numbers.
#[inline(always)]
pub fn max<T>(a: T, b: T) -> T
where
    T: PartialOrd + Copy,
{
    if a > b {
        a
    } else {
        b
    }
}

/// Clamps a value to the closed interval `[low, high]`.
///
/// * `val`  - The value.
/// * `low`  - Lower bound.
/// * `high` - Upper bound.
#[inline(always)]
pub fn clamp<T>(val: T, low: T, high: T) -> T
where
    T: PartialOrd + Copy,
{
    if val < low {
        low
    } else if val > high {
        high
    } else {
        val
    }
}

/// Computes a mod b. The result for a negative dividend is zero or positive.
///
/// * `a` - Dividend.
/// * `b` - Divisor.
#[inline(always)]
pub fn rem<T>(a: T, b: T) -> T
where
    T: Num + Zero + PartialOrd + Copy,
{
    let result = a - (a / b) * b;
    if result < T::zero() {
        result + b
    } else {
        result
    }
}

/// Returns the error bound for adding n terms.
///
/// * `n` - Number of terms
#[inline(always)]
pub fn gamma(n: Int) -> Float {
    (n as Float * MACHINE_EPSILON) / (1.0 - n as Float * MACHINE_EPSILON)
}

/// Returns gamma corrected values for use in 8-bit images.
///
/// * `value` - Value to correct.
#[inline(always)]
pub fn gamma_correct(value: Float) -> Float {
    if value <= 0.0031308 {
        12.92 * value
    } else {
        1.055 * value.powf(1.0 / 2.4) - 0.055
    }
}

/// Linearly interpolate between two values for parameters in [0, 1] and
/// extrapolate for parameters outside that interval.
///
/// * `t`  - Parameter.
/// * `p0` - Value at t=0.
/// * `p1` - Value at t=1.
#[inline(always)]
pub fn lerp<P>(t: Float, p0: P, p1: P) -> P
where
    Float: Mul<P, Output = P>,
    P: Add<P, Output = P>,
{
    (1.0 - t) * p0 + t * p1
}

/// Converts degrees to radians.
#[inline(always)]
pub fn radians(deg: Float) -> Float {
    (PI / 180.0) * deg
}

/// Convert a 32-bit floating point value to its constituent bits.
#[inline(always)]
pub fn float_to_bits(f: f32) -> u32 {
    f.to_bits()
}

/// Convert the bits of a 32-bit unsigned integer to a 32-bit floating point
/// value.
#[inline(always)]
pub fn bits_to_float(i: u32) -> f32 {
    f32::from_bits(i)
}

/// Bump a floating point value up to the next greater representable floating
/// point value.
///
/// * `v` - Floating point value.
pub fn next_float_up(v: Float) -> Float {
    if v.is_infinite() && v > 0.0 {
        return v;
    }

    let nv = if v == -0.0 { 0.0 } else { v };
    let mut ui = float_to_bits(nv);
    if nv >= 0.0 {
        ui += 1;
    } else {
        ui -= 1;
    }
    bits_to_float(ui)
}

/// Bump a floating point value down to the next lower representable floating
/// point value.
///
/// * `v` - Floating point value.
pub fn next_float_down(v: Float) -> Float {
    if v.is_infinite() && v < 0.0 {
        return v;
    }

    let nv = if v == 0.0 { -0.0 } else { v };
    let mut ui = float_to_bits(nv);
    if nv > 0.0 {
        ui -= 1;
    } else {
        ui += 1;
    }
    bits_to_float(ui)
}

/// Emulates the behavior of `upper_bound` but uses a function object to get
/// values at various indices instead of requiring access to an actual array.
/// Returns an index in `[0, size - 2]`.
///
/// * `size` - Size of array.
/// * `pred` - Function that returns a value at a given index.
pub fn find_interval<Predicate>(size: usize, pred: Predicate) -> usize
where
    Predicate: Fn(usize) -> bool,
{
    let (mut first, mut len) = (0_usize, size);

    while len > 0 {
        let half = len >> 1;
        let middle = first + half;

        // Bisect range based on value of `pred` at `middle`.
        if pred(middle) {
            first = middle + 1;
            len -= half + 1;
        } else {
            len = half;
        }
    }

    clamp(first as isize - 1, 0, size as isize - 2) as usize
}

// ---- Tests ----

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;
    use proptest::prelude::*;

    #[test]
    fn find_interval_clamps_to_valid_range() {
        let values = [0.0, 0.25, 0.5, 1.0];
        assert_eq!(find_interval(4, |i| values[i] <= -1.0), 0);
        assert_eq!(find_interval(4, |i| values[i] <= 0.3), 1);
        assert_eq!(find_interval(4, |i| values[i] <= 2.0), 2);
    }

    #[test]
    fn next_float_brackets_value() {
        let v = 1.5;
        assert!(next_float_up(v) > v);
        assert!(next_float_down(v) < v);
        assert!(next_float_up(-0.0) > 0.0);
        assert!(next_float_down(0.0) < 0.0);
    }

    #[test]
    fn lerp_endpoints() {
        assert!(approx_eq!(Float, lerp(0.0, 2.0, 4.0), 2.0));
        assert!(approx_eq!(Float, lerp(1.0, 2.0, 4.0), 4.0));
        assert!(approx_eq!(Float, lerp(0.5, 2.0, 4.0), 3.0));
    }

    proptest! {
        #[test]
        fn rem_is_non_negative(a in -1000..1000_i32, b in 1..100_i32) {
            let r = rem(a, b);
            prop_assert!(r >= 0 && r < b);
        }

        #[test]
        fn clamp_stays_in_range(v in -10.0..10.0_f32) {
            let c = clamp(v, -1.0, 1.0);
            prop_assert!((-1.0..=1.0).contains(&c));
        }
    }
}
