//! Homogeneous Medium

use render_core::geometry::*;
use render_core::interaction::MediumInteraction;
use render_core::medium::*;
use render_core::paramset::*;
use render_core::pbrt::*;
use render_core::sampler::*;
use render_core::spectrum::*;

/// Implements a homogeneous medium representing a region of space with
/// constant σa and σs values throughout its extent.
pub struct HomogeneousMedium {
    /// Scattering coefficient `σs`; the probability density of an
    /// out-scattering event per unit distance.
    sigma_s: Spectrum,

    /// Attenuation `σt = σs + σa` combining absorption and out-scattering.
    sigma_t: Spectrum,

    /// The asymmetry parameter for Henyey-Greenstein phase function.
    g: Float,
}

impl HomogeneousMedium {
    /// Create a new `HomogeneousMedium `.
    ///
    /// * `sigma_a` - Absorption cross section `σa`.
    /// * `sigma_s` - Scattering coefficient `σs`.
    /// * `g`       - The asymmetry parameter for Henyey-Greenstein phase
    ///               function.
    pub fn new(sigma_a: Spectrum, sigma_s: Spectrum, g: Float) -> Self {
        Self {
            sigma_s,
            sigma_t: sigma_s + sigma_a,
            g,
        }
    }
}

impl Medium for HomogeneousMedium {
    /// Returns the beam transmittance `exp(-σt d)` along the ray.
    ///
    /// * `ray`     - The ray.
    /// * `sampler` - The sampler (unused).
    fn tr(&self, ray: &Ray, _sampler: &mut dyn Sampler) -> Spectrum {
        (-self.sigma_t * min(ray.t_max * ray.d.length(), Float::MAX)).exp()
    }

    /// Samples a scattering distance along the ray using one spectral
    /// channel chosen uniformly. The interaction carries the ray's medium.
    ///
    /// * `ray`     - The ray.
    /// * `sampler` - The sampler.
    fn sample(&self, ray: &Ray, sampler: &mut dyn Sampler) -> (Spectrum, Option<MediumInteraction>) {
        // Sample a channel and distance along the ray.
        let channel = min(
            (sampler.get_1d() * SPECTRUM_SAMPLES as Float) as usize,
            SPECTRUM_SAMPLES - 1,
        );
        let dist = -(1.0 - sampler.get_1d()).ln() / self.sigma_t[channel];
        let t = min(dist / ray.d.length(), ray.t_max);
        let sampled_medium = t < ray.t_max;

        let mi = if sampled_medium {
            Some(MediumInteraction::new(
                ray.at(t),
                -ray.d,
                ray.time,
                ray.medium(),
                HenyeyGreenstein::new(self.g),
            ))
        } else {
            None
        };

        // Compute the transmittance and sampling density.
        let tr = (-self.sigma_t * min(t, Float::MAX) * ray.d.length()).exp();
        let density = if sampled_medium { self.sigma_t * tr } else { tr };
        let mut pdf = (0..SPECTRUM_SAMPLES).map(|i| density[i]).sum::<Float>() / SPECTRUM_SAMPLES as Float;
        if pdf == 0.0 {
            debug_assert!(tr.is_black());
            pdf = 1.0;
        }

        let weight = if sampled_medium {
            tr * self.sigma_s / pdf
        } else {
            tr / pdf
        };
        (weight, mi)
    }
}

impl From<&ParamSet> for HomogeneousMedium {
    /// Create a homogeneous medium from a parameter set. The coefficients
    /// are multiplied by `scale`.
    ///
    /// * `params` - Parameter set.
    fn from(params: &ParamSet) -> Self {
        let sig_a = params.find_one_spectrum("sigma_a", Spectrum::from_rgb([0.0011, 0.0024, 0.014]));
        let sig_s = params.find_one_spectrum("sigma_s", Spectrum::from_rgb([2.55, 3.21, 3.77]));
        let scale = params.find_one_float("scale", 1.0);
        let mut g = params.find_one_float("g", 0.0);
        if !(-1.0..=1.0).contains(&g) {
            warn!("Henyey-Greenstein g = {} clamped to [-1, 1].", g);
            g = clamp(g, -1.0, 1.0);
        }
        Self::new(sig_a * scale, sig_s * scale, g)
    }
}

// ---- Tests ----

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;
    use samplers::RandomSampler;
    use std::sync::Arc;

    #[test]
    fn transmittance_follows_beer_lambert() {
        let medium = HomogeneousMedium::new(Spectrum::new(0.5), Spectrum::new(0.5), 0.0);
        let mut sampler = RandomSampler::new(1, 0);
        let ray = Ray::new(Point3f::ZERO, Vector3f::new(0.0, 0.0, 2.0), 1.5, 0.0, None);
        let tr = medium.tr(&ray, &mut sampler);
        assert!(approx_eq!(Float, tr[0], (-3.0 as Float).exp(), epsilon = 1e-6));
    }

    #[test]
    fn sampling_weight_is_unbiased_for_transmittance() {
        // E[weight * 1{no scattering}] + E[weight * 1{scattering}] / albedo
        // integrates to one for a grey medium.
        let sigma_a = Spectrum::new(0.25);
        let sigma_s = Spectrum::new(0.75);
        let medium = Arc::new(HomogeneousMedium::new(sigma_a, sigma_s, 0.3));
        let arc: ArcMedium = medium.clone();
        let mut sampler = RandomSampler::new(1, 7);
        sampler.start_pixel(&Point2i::new(0, 0));

        let n = 20_000;
        let mut total = 0.0;
        let mut scattered = 0;
        for _ in 0..n {
            let ray = Ray::new(Point3f::ZERO, Vector3f::new(1.0, 0.0, 0.0), 2.0, 0.0, Some(arc.clone()));
            let (weight, mi) = medium.sample(&ray, &mut sampler);
            match mi {
                Some(mi) => {
                    scattered += 1;
                    assert!(mi.hit.medium_interface.inside.is_some());
                    total += weight[0] / 0.75;
                }
                None => total += weight[0],
            }
        }
        assert!(scattered > 0);
        assert!(approx_eq!(Float, total / n as Float, 1.0, epsilon = 0.02));
    }
}
