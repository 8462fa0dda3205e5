//! Common

use render_core::error::ConfigError;
use render_core::paramset::*;
use render_core::pbrt::*;
use render_core::sampler::*;
use render_core::spectrum::*;

/// Default maximum path depth.
pub const DEFAULT_MAX_DEPTH: Int = 5;

/// Reads `maxdepth` from the integrator parameters.
///
/// * `params` - Integrator parameters.
pub(crate) fn max_depth(params: &ParamSet) -> Result<usize, ConfigError> {
    let max_depth = params.find_one_int("maxdepth", DEFAULT_MAX_DEPTH);
    if max_depth < 0 {
        return Err(ConfigError::InvalidParameter {
            name: "maxdepth".to_string(),
            reason: format!("{} is negative", max_depth),
        });
    }
    Ok(max_depth as usize)
}

/// Possibly terminates a path with Russian roulette. Paths are only
/// considered after three bounces and when the throughput scaled by
/// `eta_scale` falls below `rr_threshold`. Returns the reweighted throughput
/// of a surviving path or `None` when the path terminates.
///
/// * `beta`         - Path throughput.
/// * `eta_scale`    - Accumulated radiance scaling from refraction.
/// * `bounces`      - Number of bounces so far.
/// * `rr_threshold` - Russian roulette threshold.
/// * `sampler`      - The sampler.
pub fn russian_roulette(
    beta: Spectrum,
    eta_scale: Float,
    bounces: usize,
    rr_threshold: Float,
    sampler: &mut dyn Sampler,
) -> Option<Spectrum> {
    let rr_beta = beta * eta_scale;
    let max_rr_beta = rr_beta.max_component_value();
    if bounces > 3 && max_rr_beta < rr_threshold {
        let q = max(0.05, 1.0 - max_rr_beta);
        if sampler.get_1d() < q {
            return None;
        }
        return Some(beta / (1.0 - q));
    }
    Some(beta)
}

// ---- Tests ----

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;
    use render_core::geometry::Point2i;
    use samplers::RandomSampler;

    #[test]
    fn early_bounces_always_survive() {
        let mut sampler = RandomSampler::new(1, 3);
        sampler.start_pixel(&Point2i::new(0, 0));
        for bounces in 0..=3 {
            let beta = russian_roulette(Spectrum::new(0.01), 1.0, bounces, 1.0, &mut sampler);
            assert_eq!(beta, Some(Spectrum::new(0.01)));
        }
    }

    #[test]
    fn bright_paths_are_not_terminated() {
        let mut sampler = RandomSampler::new(1, 3);
        sampler.start_pixel(&Point2i::new(0, 0));
        let beta = russian_roulette(Spectrum::new(0.5), 4.0, 10, 1.0, &mut sampler);
        assert_eq!(beta, Some(Spectrum::new(0.5)));
    }

    #[test]
    fn roulette_is_unbiased() {
        let mut sampler = RandomSampler::new(1, 11);
        sampler.start_pixel(&Point2i::new(0, 0));

        let beta = Spectrum::new(0.3);
        let n = 200_000;
        let mut sum = 0.0;
        let mut survivors = 0;
        for _ in 0..n {
            if let Some(b) = russian_roulette(beta, 1.0, 4, 1.0, &mut sampler) {
                sum += b[0];
                survivors += 1;
            }
        }
        let mean = sum / n as Float;
        assert!(approx_eq!(Float, mean, 0.3, epsilon = 0.01), "mean {}", mean);

        // Survival probability is 1 - q = 0.3.
        let p = survivors as Float / n as Float;
        assert!(approx_eq!(Float, p, 0.3, epsilon = 0.01), "p {}", p);
    }

    #[test]
    fn negative_depth_is_rejected() {
        let mut params = ParamSet::new();
        params.add_int("maxdepth", &[-1]);
        assert!(max_depth(&params).is_err());
        assert_eq!(max_depth(&ParamSet::new()).ok(), Some(5));
    }
}
