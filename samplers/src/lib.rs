//! Samplers

#[macro_use]
extern crate hexf;
#[macro_use]
extern crate log;

mod halton;
mod maxmin;
mod random;
mod sobol;
mod stratified;
mod zero_two_sequence;

use render_core::app::Options;
use render_core::error::ConfigError;
use render_core::geometry::*;
use render_core::paramset::*;
use render_core::pbrt::Int;
use render_core::sampler::*;

// Re-export.
pub use halton::*;
pub use maxmin::*;
pub use random::*;
pub use sobol::*;
pub use stratified::*;
pub use zero_two_sequence::*;

/// Names accepted by `create_sampler()`.
pub const SAMPLER_NAMES: [&str; 7] = [
    "02sequence",
    "lowdiscrepancy",
    "halton",
    "maxmindist",
    "random",
    "sobol",
    "stratified",
];

/// Creates a sampler by name from its parameters.
///
/// * `name`          - Sampler name; see `SAMPLER_NAMES`.
/// * `params`        - Sampler parameters.
/// * `sample_bounds` - Pixel bounds the sampler will be asked for.
/// * `options`       - Render options.
pub fn create_sampler(
    name: &str,
    params: &ParamSet,
    sample_bounds: &Bounds2i,
    options: &Options,
) -> Result<Box<dyn Sampler>, ConfigError> {
    let sampler: Box<dyn Sampler> = match name {
        "02sequence" | "lowdiscrepancy" => {
            Box::new(ZeroTwoSequenceSampler::create(params, options)?)
        }
        "halton" => Box::new(HaltonSequence::create_sampler(params, sample_bounds, options)?),
        "maxmindist" => Box::new(MaxMinDistSampler::create(params, options)?),
        "random" => Box::new(RandomSampler::create(params, options)?),
        "sobol" => Box::new(SobolSequence::create_sampler(params, sample_bounds, options)?),
        "stratified" => Box::new(StratifiedSampler::create(params, options)?),
        _ => {
            return Err(ConfigError::Unknown {
                kind: "sampler",
                name: name.to_string(),
            })
        }
    };
    info!(
        "Created '{}' sampler with {} samples per pixel",
        name,
        sampler.samples_per_pixel()
    );
    Ok(sampler)
}

/// Reads `pixelsamples`; `--quick` forces a single sample.
///
/// * `params`  - Sampler parameters.
/// * `default` - Count used when the parameter is missing.
/// * `options` - Render options.
pub(crate) fn pixel_samples(params: &ParamSet, default: Int, options: &Options) -> Result<usize, ConfigError> {
    let n = params.find_one_int("pixelsamples", default);
    if n < 1 {
        return Err(ConfigError::InvalidParameter {
            name: "pixelsamples".to_string(),
            reason: format!("{} is not a positive sample count", n),
        });
    }
    Ok(if options.quick_render { 1 } else { n as usize })
}

/// Reads `dimensions`, the number of precomputed dimensions of a pixel
/// sampler.
pub(crate) fn sampled_dimensions(params: &ParamSet) -> Result<usize, ConfigError> {
    let n = params.find_one_int("dimensions", 4);
    if n < 0 {
        return Err(ConfigError::InvalidParameter {
            name: "dimensions".to_string(),
            reason: format!("{} is negative", n),
        });
    }
    Ok(n as usize)
}

/// Rounds a sample count up to the next power of 2 with a warning when it
/// changes.
///
/// * `sampler` - Sampler name used in the warning.
/// * `n`       - Requested count.
pub(crate) fn round_up_power_of_2(sampler: &str, n: usize) -> usize {
    let rounded = n.max(1).next_power_of_two();
    if rounded != n {
        warn!(
            "{}: pixel samples being rounded up to power of 2 (from {} to {}).",
            sampler, n, rounded
        );
    }
    rounded
}

// ---- Tests ----

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds() -> Bounds2i {
        Bounds2i::new(Point2i::new(0, 0), Point2i::new(16, 16))
    }

    #[test]
    fn every_name_creates_a_sampler() {
        let mut params = ParamSet::new();
        params.add_int("pixelsamples", &[4]);
        for name in SAMPLER_NAMES {
            let sampler = create_sampler(name, &params, &bounds(), &Options::default());
            assert!(sampler.is_ok(), "{} failed", name);
        }
    }

    #[test]
    fn unknown_sampler_is_rejected() {
        let sampler = create_sampler("bogus", &ParamSet::new(), &bounds(), &Options::default());
        assert!(matches!(sampler, Err(ConfigError::Unknown { kind: "sampler", .. })));
    }

    #[test]
    fn quick_render_uses_one_sample() {
        let options = Options {
            quick_render: true,
            ..Default::default()
        };
        let mut params = ParamSet::new();
        params.add_int("pixelsamples", &[64]);
        let sampler = create_sampler("random", &params, &bounds(), &options).unwrap();
        assert_eq!(sampler.samples_per_pixel(), 1);
    }

    #[test]
    fn non_positive_pixel_samples_are_rejected() {
        let mut params = ParamSet::new();
        params.add_int("pixelsamples", &[0]);
        assert!(pixel_samples(&params, 16, &Options::default()).is_err());
    }

    #[test]
    fn counts_round_up_to_power_of_2() {
        assert_eq!(round_up_power_of_2("test", 1), 1);
        assert_eq!(round_up_power_of_2("test", 5), 8);
        assert_eq!(round_up_power_of_2("test", 16), 16);
    }
}
