//! Volumetric Path Integrator

use crate::common::*;
use render_core::camera::*;
use render_core::error::ConfigError;
use render_core::geometry::*;
use render_core::integrator::*;
use render_core::interaction::*;
use render_core::light_distrib::*;
use render_core::material::*;
use render_core::memory::MemoryArena;
use render_core::paramset::*;
use render_core::pbrt::*;
use render_core::reflection::*;
use render_core::sampler::*;
use render_core::scene::*;
use render_core::spectrum::*;

/// Implements path tracing through participating media. Surfaces are
/// handled as in `PathIntegrator`; medium interactions sample the phase
/// function.
pub struct VolPathIntegrator {
    /// Common data for sampler integrators.
    pub data: SamplerIntegratorData,

    /// Maximum number of bounces.
    max_depth: usize,

    /// Russian roulette threshold used to terminate path sampling.
    rr_threshold: Float,

    /// Light sampling strategy.
    light_sample_strategy: LightSampleStategy,

    /// Light distribution; `None` for scenes without lights.
    light_distribution: Option<LightDistribution>,
}

impl VolPathIntegrator {
    /// Create a new `VolPathIntegrator`.
    ///
    /// * `camera`                - The camera.
    /// * `sampler`               - The sampler.
    /// * `pixel_bounds`          - Pixel bounds for the image.
    /// * `max_depth`             - Maximum number of bounces.
    /// * `rr_threshold`          - Russian roulette threshold.
    /// * `light_sample_strategy` - Light sampling strategy.
    pub fn new(
        camera: ArcCamera,
        sampler: Box<dyn Sampler>,
        pixel_bounds: Bounds2i,
        max_depth: usize,
        rr_threshold: Float,
        light_sample_strategy: LightSampleStategy,
    ) -> Self {
        Self {
            data: SamplerIntegratorData::new(camera, sampler, pixel_bounds),
            max_depth,
            rr_threshold,
            light_sample_strategy,
            light_distribution: None,
        }
    }

    /// Create a `VolPathIntegrator` from integrator parameters. Accepts the
    /// same parameters as `PathIntegrator`.
    ///
    /// * `params`  - Integrator parameters.
    /// * `camera`  - The camera.
    /// * `sampler` - The sampler.
    pub fn create(params: &ParamSet, camera: ArcCamera, sampler: Box<dyn Sampler>) -> Result<Self, ConfigError> {
        let max_depth = max_depth(params)?;
        let rr_threshold = params.find_one_float("rrthreshold", 1.0);
        let lss = params.find_one_string("lightsamplestrategy", "spatial".to_owned());
        let pixel_bounds = get_pixel_bounds(params, &camera.film().get_sample_bounds())?;
        Ok(Self::new(
            camera,
            sampler,
            pixel_bounds,
            max_depth,
            rr_threshold,
            LightSampleStategy::from(lss.as_str()),
        ))
    }

    /// Samples one light from the distribution at `it`, including
    /// attenuation through media along the shadow ray.
    fn sample_light(&self, it: &Interaction, scene: &Scene, sampler: &mut dyn Sampler) -> Spectrum {
        match self.light_distribution.as_ref() {
            Some(light_distribution) => {
                let distrib = light_distribution.lookup(&it.get_hit().p);
                uniform_sample_one_light(it, scene, sampler, true, Some(&distrib))
            }
            None => Spectrum::ZERO,
        }
    }
}

impl SamplerIntegrator for VolPathIntegrator {
    fn get_data(&self) -> &SamplerIntegratorData {
        &self.data
    }

    fn preprocess(&mut self, scene: &Scene) {
        self.light_distribution = if scene.lights.is_empty() {
            warn!("Scene has no lights; only emitted radiance will be visible.");
            None
        } else {
            Some(LightDistribution::new(self.light_sample_strategy, scene))
        };
    }

    fn li<'a>(
        &self,
        ray: &mut Ray,
        scene: &'a Scene,
        sampler: &mut dyn Sampler,
        arena: &'a MemoryArena,
        _depth: usize,
    ) -> Spectrum {
        let mut l = Spectrum::ZERO;
        let mut beta = Spectrum::ONE;
        let mut specular_bounce = false;
        let mut eta_scale: Float = 1.0;

        let mut bounces = 0_usize;
        loop {
            trace!("Volpath bounce {}, current L = {}, beta = {}", bounces, l, beta);

            // Intersect `ray` with scene; `t_max` now bounds the medium segment.
            let isect = scene.intersect(ray);

            // Sample the participating medium, if present.
            let mut mi: Option<MediumInteraction> = None;
            if let Some(medium) = ray.medium.as_ref() {
                let (weight, sampled) = medium.sample(ray, sampler);
                beta *= weight;
                mi = sampled;
            }
            if beta.is_black() {
                break;
            }

            if let Some(mi) = mi {
                // Handle scattering at point in medium.
                if bounces >= self.max_depth {
                    break;
                }

                let it = Interaction::Medium { mi: &mi };
                l += beta * self.sample_light(&it, scene, sampler);

                let wo = -ray.d;
                let u = sampler.get_2d();
                let (_p, wi) = mi.phase.sample_p(&wo, &u);
                *ray = mi.spawn_ray(&wi);
                specular_bounce = false;
            } else {
                // Handle scattering at point on surface. Possibly add
                // emitted light at intersection.
                if bounces == 0 || specular_bounce {
                    match isect.as_ref() {
                        Some(isect) => l += beta * isect.le(&-ray.d),
                        None => {
                            for light in scene.infinite_lights.iter() {
                                l += beta * light.le(ray);
                            }
                        }
                    }
                }

                // Terminate path if ray escaped or `max_depth` was reached.
                let mut isect = match isect {
                    Some(isect) if bounces < self.max_depth => isect,
                    _ => break,
                };

                // Compute scattering functions and skip over medium boundaries.
                isect.compute_scattering_functions(arena, TransportMode::Radiance, true);
                let bsdf = match isect.bsdf {
                    Some(bsdf) => bsdf,
                    None => {
                        *ray = isect.spawn_ray(&ray.d);
                        continue;
                    }
                };

                // Sample illumination from lights, skipping perfectly
                // specular BSDFs.
                let it = Interaction::Surface { si: &isect };
                if bsdf.num_components(BxDFType::BSDF_ALL & !BxDFType::BSDF_SPECULAR) > 0 {
                    l += beta * self.sample_light(&it, scene, sampler);
                }

                // Sample BSDF to get new path direction.
                let wo = -ray.d;
                let u = sampler.get_2d();
                let BxDFSample { f, pdf, wi, bxdf_type } = bsdf.sample_f(&wo, &u, BxDFType::BSDF_ALL);
                if f.is_black() || pdf == 0.0 {
                    break;
                }
                beta *= f * wi.abs_dot(&isect.shading.n) / pdf;
                debug_assert!(beta.y().is_finite());

                specular_bounce = bxdf_type.is_specular();
                if specular_bounce && bxdf_type.contains(BxDFType::BSDF_TRANSMISSION) {
                    let eta = bsdf.eta;
                    eta_scale *= if wo.dot(&isect.hit.n) > 0.0 {
                        eta * eta
                    } else {
                        1.0 / (eta * eta)
                    };
                }
                *ray = isect.spawn_ray(&wi);
            }

            // Possibly terminate the path with Russian roulette.
            beta = match russian_roulette(beta, eta_scale, bounces, self.rr_threshold, sampler) {
                Some(beta) => beta,
                None => break,
            };

            bounces += 1;
        }

        l
    }
}

// ---- Tests ----

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::*;
    use float_cmp::approx_eq;

    fn integrator(scene: &Scene, max_depth: Int, spp: usize) -> VolPathIntegrator {
        let mut params = ParamSet::new();
        params.add_int("maxdepth", &[max_depth]);
        params.add_string("lightsamplestrategy", &["power".to_owned()]);
        let mut integrator = VolPathIntegrator::create(&params, overhead_camera(8, 8), random_sampler(spp)).unwrap();
        integrator.preprocess(scene);
        integrator
    }

    #[test]
    fn vacuum_matches_path_tracing() {
        let lights = [(Point3f::new(0.0, 0.0, 2.0), 4.0)];
        let scene = lit_plane(&lights);
        let integrator = integrator(&scene, 1, 1);
        let l = radiance_at_origin(&integrator, &scene, 1);
        assert!(approx_eq!(Float, l[0], expected_direct(&lights), epsilon = 1e-5));
    }

    #[test]
    fn absorbing_fog_attenuates_both_segments() {
        let sigma_a = 0.2;
        let (scene, fog) = fog_plane(sigma_a, 4.0);
        let n = 20_000;
        let integrator = integrator(&scene, 1, n);
        let l = radiance_through(&integrator, &scene, n, Some(fog));

        // Camera segment has length 1; the shadow ray has length 2.
        let expected = (-sigma_a).exp() * 0.5 * INV_PI * (-2.0 * sigma_a).exp();
        assert!((l[0] - expected).abs() < 0.05 * expected, "{} vs {}", l[0], expected);
    }

    #[test]
    fn scattering_fog_adds_in_scattered_light() {
        let (scene, fog) = scattering_fog_plane(0.3, 4.0);
        let n = 4_000;
        let integrator = integrator(&scene, 3, n);
        let l = radiance_through(&integrator, &scene, n, Some(fog));
        assert!(l[0] > 0.0 && l[0].is_finite());
    }
}
