//! Catmull-Rom spline interpolation

use crate::pbrt::*;

/// Segment `i` of a Catmull-Rom spline through `(x, f)`: the end points,
/// the function values and the finite difference derivatives scaled to
/// the segment width.
struct Segment {
    x0: Float,
    width: Float,
    f0: Float,
    f1: Float,
    d0: Float,
    d1: Float,
}

impl Segment {
    /// Looks up segment `i` where `f(j)` returns the function value at node
    /// `j`.
    ///
    /// * `x` - The nodes.
    /// * `i` - Segment index; `i + 1 < x.len()`.
    /// * `f` - Function values by node index.
    fn new<F: Fn(usize) -> Float>(x: &[Float], i: usize, f: F) -> Self {
        let n = x.len();
        let (x0, x1) = (x[i], x[i + 1]);
        let (f0, f1) = (f(i), f(i + 1));
        let width = x1 - x0;

        let d0 = if i > 0 {
            width * (f1 - f(i - 1)) / (x1 - x[i - 1])
        } else {
            f1 - f0
        };
        let d1 = if i + 2 < n {
            width * (f(i + 2) - f0) / (x[i + 2] - x0)
        } else {
            f1 - f0
        };

        Self { x0, width, f0, f1, d0, d1 }
    }

    /// Returns the definite integral of the segment over `[x0, x1]`.
    fn integral(&self) -> Float {
        ((self.d0 - self.d1) * (1.0 / 12.0) + (self.f0 + self.f1) * 0.5) * self.width
    }

    /// Solves `∫₀ᵗ f = u` for `t ∈ [0, 1]` with Newton-bisection. Returns `t`
    /// and the spline value at `t`.
    ///
    /// * `u` - Target integral in units of the normalized segment.
    #[allow(non_snake_case)]
    fn invert_integral(&self, u: Float) -> (Float, Float) {
        let Self { f0, f1, d0, d1, .. } = *self;

        // Initial guess by importance sampling the linear interpolant.
        let mut t = if f0 != f1 {
            (f0 - max(0.0, f0 * f0 + 2.0 * u * (f1 - f0)).sqrt()) / (f0 - f1)
        } else {
            u / f0
        };

        let (mut a, mut b) = (0.0 as Float, 1.0 as Float);
        loop {
            if !(t >= a && t <= b) {
                t = 0.5 * (a + b);
            }

            // Horner forms of the integral and the spline.
            let F = t
                * (f0
                    + t * (0.5 * d0
                        + t * ((1.0 / 3.0) * (-2.0 * d0 - d1) + f1 - f0
                            + t * (0.25 * (d0 + d1) + 0.5 * (f0 - f1)))));
            let f = f0 + t * (d0 + t * (-2.0 * d0 - d1 + 3.0 * (f1 - f0) + t * (d0 + d1 + 2.0 * (f0 - f1))));

            if abs(F - u) < 1e-6 || b - a < 1e-6 {
                return (t, f);
            }
            if F - u < 0.0 {
                a = t;
            } else {
                b = t;
            }
            t -= (F - u) / f;
        }
    }
}

/// Returns the four spline weights and the offset of the first weighted node
/// for evaluating a Catmull-Rom spline at `x`. Weights of nodes outside the
/// array are zero. Returns `None` when `x` lies outside the nodes.
///
/// * `nodes` - Interpolation nodes in increasing order.
/// * `x`     - Variable to interpolate.
pub fn catmull_rom_weights(nodes: &[Float], x: Float) -> Option<([Float; 4], isize)> {
    let size = nodes.len();
    if size < 2 || !(x >= nodes[0] && x <= nodes[size - 1]) {
        return None;
    }

    let idx = find_interval(size, |i| nodes[i] <= x);
    let (x0, x1) = (nodes[idx], nodes[idx + 1]);
    let t = (x - x0) / (x1 - x0);
    let t2 = t * t;
    let t3 = t2 * t;

    let mut w = [0.0; 4];
    w[1] = 2.0 * t3 - 3.0 * t2 + 1.0;
    w[2] = -2.0 * t3 + 3.0 * t2;

    if idx > 0 {
        let w0 = (t3 - 2.0 * t2 + t) * (x1 - x0) / (x1 - nodes[idx - 1]);
        w[0] = -w0;
        w[2] += w0;
    } else {
        let w0 = t3 - 2.0 * t2 + t;
        w[1] -= w0;
        w[2] += w0;
    }

    if idx + 2 < size {
        let w3 = (t3 - t2) * (x1 - x0) / (nodes[idx + 2] - x0);
        w[1] -= w3;
        w[3] = w3;
    } else {
        let w3 = t3 - t2;
        w[1] -= w3;
        w[2] += w3;
    }

    Some((w, idx as isize - 1))
}

/// Integrates the spline through `(x, values)`. Returns the running
/// integral at every node, usable as a CDF, and the total.
///
/// * `x`      - Nodes.
/// * `values` - Function values at the nodes.
pub fn integrate_catmull_rom(x: &[Float], values: &[Float]) -> (Vec<Float>, Float) {
    let mut cdf = vec![0.0; x.len()];
    let mut sum = 0.0;
    for i in 0..x.len().saturating_sub(1) {
        sum += Segment::new(x, i, |j| values[j]).integral();
        cdf[i + 1] = sum;
    }
    (cdf, sum)
}

/// Inverts a monotonically increasing spline: returns `x` such that the
/// spline through `(x, values)` equals `u`. Clamps to the end nodes.
///
/// * `x`      - Nodes.
/// * `values` - Increasing function values at the nodes.
/// * `u`      - Target function value.
#[allow(non_snake_case)]
pub fn invert_catmull_rom(x: &[Float], values: &[Float], u: Float) -> Float {
    let n = x.len();
    if u <= values[0] {
        return x[0];
    } else if u >= values[n - 1] {
        return x[n - 1];
    }

    let i = find_interval(n, |i| values[i] <= u);
    let Segment { x0, width, f0, f1, d0, d1 } = Segment::new(x, i, |j| values[j]);

    let (mut a, mut b, mut t) = (0.0 as Float, 1.0 as Float, 0.5 as Float);
    loop {
        if !(t > a && t < b) {
            t = 0.5 * (a + b);
        }

        let t2 = t * t;
        let t3 = t2 * t;
        let F = (2.0 * t3 - 3.0 * t2 + 1.0) * f0 + (-2.0 * t3 + 3.0 * t2) * f1 + (t3 - 2.0 * t2 + t) * d0 + (t3 - t2) * d1;
        let f = (6.0 * t2 - 6.0 * t) * f0
            + (-6.0 * t2 + 6.0 * t) * f1
            + (3.0 * t2 - 4.0 * t + 1.0) * d0
            + (3.0 * t2 - 2.0 * t) * d1;

        if abs(F - u) < 1e-6 || b - a < 1e-6 {
            break;
        }
        if F - u < 0.0 {
            a = t;
        } else {
            b = t;
        }
        t -= (F - u) / f;
    }

    x0 + t * width
}

/// A sample drawn from a 2D tabulated spline.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct SplineSample {
    /// Sampled position along the second dimension.
    pub x: Float,

    /// Interpolated function value at `x`.
    pub value: Float,

    /// Probability density of `x`.
    pub pdf: Float,
}

/// Samples the second dimension of a function tabulated on a 2D grid of
/// nodes, with the first dimension fixed at `alpha`. Returns a zero sample
/// when `alpha` is outside `nodes1`.
///
/// * `nodes1` - Nodes of the first dimension.
/// * `nodes2` - Nodes of the second dimension.
/// * `values` - Row-major function values, one row per `nodes1` entry.
/// * `cdf`    - Row-major running integrals of `values` per row, from
///              `integrate_catmull_rom()`.
/// * `alpha`  - Fixed first-dimension value.
/// * `u`      - Uniform random value.
pub fn sample_catmull_rom_2d(
    nodes1: &[Float],
    nodes2: &[Float],
    values: &[Float],
    cdf: &[Float],
    alpha: Float,
    u: Float,
) -> SplineSample {
    let size2 = nodes2.len();
    let (weights, offset) = match catmull_rom_weights(nodes1, alpha) {
        Some(w) => w,
        None => return SplineSample::default(),
    };

    // Blend the rows adjacent to `alpha`.
    let interpolate = |array: &[Float], idx: usize| -> Float {
        weights
            .iter()
            .enumerate()
            .filter(|(_, w)| **w != 0.0)
            .map(|(i, w)| array[(offset + i as isize) as usize * size2 + idx] * w)
            .sum()
    };

    // Invert the interpolated CDF to find the segment.
    let maximum = interpolate(cdf, size2 - 1);
    if maximum <= 0.0 {
        return SplineSample::default();
    }
    let u = u * maximum;
    let idx = find_interval(size2, |i| interpolate(cdf, i) <= u);

    let segment = Segment::new(nodes2, idx, |j| interpolate(values, j));
    let (t, value) = segment.invert_integral((u - interpolate(cdf, idx)) / segment.width);

    SplineSample {
        x: segment.x0 + segment.width * t,
        value,
        pdf: value / maximum,
    }
}

// ---- Tests ----

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;
    use proptest::prelude::*;

    const NODES: [Float; 5] = [0.0, 0.5, 1.0, 2.0, 4.0];

    #[test]
    fn weights_outside_nodes() {
        assert!(catmull_rom_weights(&NODES, -0.1).is_none());
        assert!(catmull_rom_weights(&NODES, 4.1).is_none());
        let (w, offset) = catmull_rom_weights(&NODES, 0.0).unwrap();
        assert_eq!(offset, -1);
        assert_eq!(w[0], 0.0);
        assert!(approx_eq!(Float, w[1], 1.0));
    }

    #[test]
    fn integrates_linear_functions_exactly() {
        let values: Vec<Float> = NODES.iter().map(|x| 2.0 * x + 1.0).collect();
        let (cdf, sum) = integrate_catmull_rom(&NODES, &values);
        assert_eq!(cdf[0], 0.0);
        assert!(approx_eq!(Float, cdf[2], 2.0, epsilon = 1e-5));
        assert!(approx_eq!(Float, sum, 20.0, epsilon = 1e-4));
    }

    #[test]
    fn inverts_increasing_spline() {
        let values: Vec<Float> = NODES.iter().map(|x| x * x).collect();
        assert_eq!(invert_catmull_rom(&NODES, &values, -1.0), 0.0);
        assert_eq!(invert_catmull_rom(&NODES, &values, 20.0), 4.0);
        assert!(approx_eq!(Float, invert_catmull_rom(&NODES, &values, 1.0), 1.0, epsilon = 1e-4));
    }

    #[test]
    fn samples_constant_rows_uniformly() {
        let nodes1 = [0.0, 1.0];
        let values = vec![1.0; nodes1.len() * NODES.len()];
        let mut cdf = vec![];
        for _ in 0..nodes1.len() {
            cdf.extend(integrate_catmull_rom(&NODES, &values[..NODES.len()]).0);
        }

        let s = sample_catmull_rom_2d(&nodes1, &NODES, &values, &cdf, 0.5, 0.25);
        assert!(approx_eq!(Float, s.x, 1.0, epsilon = 1e-4));
        assert!(approx_eq!(Float, s.value, 1.0, epsilon = 1e-5));
        assert!(approx_eq!(Float, s.pdf, 0.25, epsilon = 1e-5));

        let outside = sample_catmull_rom_2d(&nodes1, &NODES, &values, &cdf, 2.0, 0.25);
        assert_eq!(outside, SplineSample::default());
    }

    proptest! {
        #[test]
        fn weights_sum_to_one(x in 0.0..4.0f32) {
            let (w, _) = catmull_rom_weights(&NODES, x).unwrap();
            let sum: Float = w.iter().sum();
            prop_assert!(approx_eq!(Float, sum, 1.0, epsilon = 1e-5));
        }
    }
}
