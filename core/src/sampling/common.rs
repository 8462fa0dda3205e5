//! Common sampling functions.

use crate::geometry::*;
use crate::pbrt::*;
use crate::rng::*;

/// Generate stratified 1D samples.
///
/// * `rng`       - Random number generator.
/// * `n_samples` - Number of samples.
/// * `jitter`    - Jitter the samples.
pub fn stratified_sample_1d(rng: &mut RNG, n_samples: usize, jitter: bool) -> Vec<Float> {
    let inv_n_samples = 1.0 / n_samples as Float;

    (0..n_samples)
        .map(|i| {
            let delta = if jitter { rng.uniform_float() } else { 0.5 };
            min((i as Float + delta) * inv_n_samples, ONE_MINUS_EPSILON)
        })
        .collect()
}

/// Generate stratified 2D samples in scanline order over an `nx` by `ny`
/// grid of strata.
///
/// * `rng`    - Random number generator.
/// * `nx`     - Number of samples in x-direction.
/// * `ny`     - Number of samples in y-direction.
/// * `jitter` - Jitter the samples.
pub fn stratified_sample_2d(rng: &mut RNG, nx: usize, ny: usize, jitter: bool) -> Vec<Point2f> {
    let dx = 1.0 / nx as Float;
    let dy = 1.0 / ny as Float;

    let mut samples = Vec::with_capacity(nx * ny);
    for y in 0..ny {
        for x in 0..nx {
            let jx = if jitter { rng.uniform_float() } else { 0.5 };
            let jy = if jitter { rng.uniform_float() } else { 0.5 };
            samples.push(Point2f::new(
                min((x as Float + jx) * dx, ONE_MINUS_EPSILON),
                min((y as Float + jy) * dy, ONE_MINUS_EPSILON),
            ));
        }
    }
    samples
}

/// Generate Latin Hypercube samples. The result holds `n_samples` points of
/// `n_dim` consecutive values each.
///
/// * `rng`       - Random number generator.
/// * `n_samples` - Number of samples.
/// * `n_dim`     - Number of dimensions.
pub fn latin_hypercube(rng: &mut RNG, n_samples: usize, n_dim: usize) -> Vec<Float> {
    let mut samples = vec![0.0; n_samples * n_dim];
    let inv_n_samples = 1.0 / n_samples as Float;

    // Generate LHS samples along diagonal.
    for i in 0..n_samples {
        for j in 0..n_dim {
            let sj = (i as Float + rng.uniform_float()) * inv_n_samples;
            samples[n_dim * i + j] = min(sj, ONE_MINUS_EPSILON);
        }
    }

    // Permute LHS samples in each dimension.
    for i in 0..n_dim {
        for j in 0..n_samples {
            let other = j + rng.bounded_uniform_u32((n_samples - j) as u32) as usize;
            samples.swap(n_dim * j + i, n_dim * other + i);
        }
    }

    samples
}

/// Latin hypercube samples for 2D points.
///
/// * `rng`       - Random number generator.
/// * `n_samples` - Number of samples.
pub fn latin_hypercube_2d(rng: &mut RNG, n_samples: usize) -> Vec<Point2f> {
    latin_hypercube(rng, n_samples, 2)
        .chunks_exact(2)
        .map(|c| Point2f::new(c[0], c[1]))
        .collect()
}

/// Uniformly sample a direction on a hemisphere.
///
/// * `u` - The random sample point.
pub fn uniform_sample_hemisphere(u: &Point2f) -> Vector3f {
    let z = u[0];
    let r = max(0.0, 1.0 - z * z).sqrt();
    let phi = TWO_PI * u[1];
    Vector3f::new(r * phi.cos(), r * phi.sin(), z)
}

/// Returns the PDF for uniformly sampling a direction from a hemisphere.
#[inline]
pub fn uniform_hemisphere_pdf() -> Float {
    INV_TWO_PI
}

/// Uniformly sample a direction from a sphere.
///
/// * `u` - The random sample point.
pub fn uniform_sample_sphere(u: &Point2f) -> Vector3f {
    let z = 1.0 - 2.0 * u[0];
    let r = max(0.0, 1.0 - z * z).sqrt();
    let phi = TWO_PI * u[1];
    Vector3f::new(r * phi.cos(), r * phi.sin(), z)
}

/// Returns the PDF for uniformly sampling a direction from a sphere.
#[inline]
pub fn uniform_sphere_pdf() -> Float {
    INV_FOUR_PI
}

/// Sample a point on a unit disk by mapping from a unit square to the unit
/// circle. The concentric mapping takes points in [-1, 1]^2 to unit disk by
/// uniformly mapping concentric squares to concentric circles.
///
/// * `u` - The random sample point.
pub fn concentric_sample_disk(u: &Point2f) -> Point2f {
    // Map uniform random numbers to [-1,1]^2.
    let ox = 2.0 * u[0] - 1.0;
    let oy = 2.0 * u[1] - 1.0;

    // Handle degeneracy at the origin.
    if ox == 0.0 && oy == 0.0 {
        return Point2f::new(0.0, 0.0);
    }

    // Apply concentric mapping to point.
    let (r, theta) = if abs(ox) > abs(oy) {
        (ox, PI_OVER_FOUR * (oy / ox))
    } else {
        (oy, PI_OVER_TWO - PI_OVER_FOUR * (ox / oy))
    };

    Point2f::new(r * theta.cos(), r * theta.sin())
}

/// Uniformly sample a direction from a cone of directions about the z-axis
/// of the given coordinate system.
///
/// * `u`             - The random sample point.
/// * `cos_theta_max` - Cosine of the cone half-angle.
/// * `x`             - The x-axis basis vector.
/// * `y`             - The y-axis basis vector.
/// * `z`             - The z-axis basis vector.
pub fn uniform_sample_cone(
    u: &Point2f,
    cos_theta_max: Float,
    x: &Vector3f,
    y: &Vector3f,
    z: &Vector3f,
) -> Vector3f {
    let cos_theta = lerp(u[0], cos_theta_max, 1.0);
    let sin_theta = max(0.0, 1.0 - cos_theta * cos_theta).sqrt();
    let phi = u[1] * TWO_PI;
    *x * (phi.cos() * sin_theta) + *y * (phi.sin() * sin_theta) + *z * cos_theta
}

/// Returns the PDF for sampling a direction from a cone of directions.
///
/// * `cos_theta_max` - Cosine of the cone half-angle.
#[inline]
pub fn uniform_cone_pdf(cos_theta_max: Float) -> Float {
    1.0 / (TWO_PI * (1.0 - cos_theta_max))
}

/// Sample a direction on a hemisphere using cosine-weighted sampling.
///
/// * `u` - The random sample point.
#[inline]
pub fn cosine_sample_hemisphere(u: &Point2f) -> Vector3f {
    let d = concentric_sample_disk(u);
    let z = max(0.0, 1.0 - d.x * d.x - d.y * d.y).sqrt();
    Vector3f::new(d.x, d.y, z)
}

/// Returns the PDF for cosine-weighted sampling a direction from a hemisphere.
///
/// * `cos_theta` - Cosine term of incident radiance.
#[inline]
pub fn cosine_hemisphere_pdf(cos_theta: Float) -> Float {
    cos_theta * INV_PI
}

/// Weight samples using the balance heuristic.
///
/// * `nf`    - Number of samples taken from `f_pdf`.
/// * `f_pdf` - First sampling distribution.
/// * `ng`    - Number of samples taken from `g_pdf`.
/// * `g_pdf` - Second sampling distribution.
#[inline]
pub fn balance_heuristic(nf: Int, f_pdf: Float, ng: Int, g_pdf: Float) -> Float {
    let f = nf as Float * f_pdf;
    let g = ng as Float * g_pdf;
    if f == 0.0 {
        return 0.0;
    }
    f / (f + g)
}

/// Weight samples using the power heuristic with an exponent of two.
///
/// * `nf`    - Number of samples taken from `f_pdf`.
/// * `f_pdf` - First sampling distribution.
/// * `ng`    - Number of samples taken from `g_pdf`.
/// * `g_pdf` - Second sampling distribution.
#[inline]
pub fn power_heuristic(nf: Int, f_pdf: Float, ng: Int, g_pdf: Float) -> Float {
    let f = nf as Float * f_pdf;
    let g = ng as Float * g_pdf;
    if f == 0.0 {
        return 0.0;
    }
    if g.is_infinite() {
        return 0.0;
    }
    (f * f) / (f * f + g * g)
}

// ---- Tests ----

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;
    use proptest::prelude::*;

    #[test]
    fn power_heuristic_zero_pdf_gets_no_weight() {
        for x in [0.1, 1.0, 25.0] {
            assert_eq!(power_heuristic(1, 0.0, 1, x), 0.0);
            assert_eq!(power_heuristic(1, x, 1, 0.0), 1.0);
        }
    }

    #[test]
    fn power_heuristic_weights_sum_to_one() {
        let (f, g) = (0.7, 2.3);
        let w = power_heuristic(1, f, 1, g) + power_heuristic(1, g, 1, f);
        assert!(approx_eq!(Float, w, 1.0, epsilon = 1e-6));
    }

    #[test]
    fn stratified_2d_covers_every_stratum() {
        let mut rng = RNG::new(1);
        let samples = stratified_sample_2d(&mut rng, 4, 3, true);
        assert_eq!(samples.len(), 12);
        for (i, p) in samples.iter().enumerate() {
            assert_eq!((p.x * 4.0) as usize, i % 4);
            assert_eq!((p.y * 3.0) as usize, i / 4);
        }
    }

    #[test]
    fn latin_hypercube_has_one_sample_per_row() {
        let mut rng = RNG::new(5);
        let n = 8;
        let samples = latin_hypercube(&mut rng, n, 3);
        for dim in 0..3 {
            let mut rows: Vec<usize> = (0..n)
                .map(|i| (samples[3 * i + dim] * n as Float) as usize)
                .collect();
            rows.sort_unstable();
            assert_eq!(rows, (0..n).collect::<Vec<_>>());
        }
    }

    proptest! {
        #[test]
        fn concentric_disk_stays_in_unit_disk(u in 0.0..1.0_f32, v in 0.0..1.0_f32) {
            let p = concentric_sample_disk(&Point2f::new(u, v));
            prop_assert!(p.x * p.x + p.y * p.y <= 1.0 + 1e-5);
        }

        #[test]
        fn hemisphere_samples_are_unit_and_upper(u in 0.0..1.0_f32, v in 0.0..1.0_f32) {
            let w = cosine_sample_hemisphere(&Point2f::new(u, v));
            prop_assert!(w.z >= 0.0);
            prop_assert!(approx_eq!(Float, w.length(), 1.0, epsilon = 1e-4));
        }

        #[test]
        fn cone_samples_stay_in_cone(u in 0.0..1.0_f32, v in 0.0..1.0_f32, c in 0.0..0.99_f32) {
            let w = uniform_sample_cone(
                &Point2f::new(u, v),
                c,
                &Vector3f::new(1.0, 0.0, 0.0),
                &Vector3f::new(0.0, 1.0, 0.0),
                &Vector3f::new(0.0, 0.0, 1.0),
            );
            prop_assert!(w.z >= c - 1e-4);
        }
    }
}
