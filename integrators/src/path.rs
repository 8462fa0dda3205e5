//! Path Integrator

use crate::common::*;
use render_core::bssrdf::BSSRDFSample;
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

/// Implements unidirectional path tracing with next event estimation.
pub struct PathIntegrator {
    /// Common data for sampler integrators.
    pub data: SamplerIntegratorData,

    /// Maximum number of bounces.
    max_depth: usize,

    /// Russian roulette threshold used to terminate path sampling.
    rr_threshold: Float,

    /// Light sampling strategy.
    light_sample_strategy: LightSampleStategy,

    /// Light distribution; `None` until `preprocess()` runs or when the
    /// scene has no lights.
    light_distribution: Option<LightDistribution>,
}

impl PathIntegrator {
    /// Create a new `PathIntegrator`.
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

    /// Create a `PathIntegrator` from `maxdepth`, `rrthreshold`,
    /// `lightsamplestrategy` and `pixelbounds`.
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
}

impl SamplerIntegrator for PathIntegrator {
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

        // Radiance scaling from refraction; factored out of `beta` for
        // Russian roulette.
        let mut eta_scale: Float = 1.0;

        let mut bounces = 0_usize;
        loop {
            trace!("Path tracer bounce {}, current L = {}, beta = {}", bounces, l, beta);

            // Find closest ray intersection or return background radiance.
            let isect = scene.intersect(ray);

            // Possibly add emitted light at intersection.
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

            // Sample illumination from lights to find path contribution,
            // skipping perfectly specular BSDFs.
            let it = Interaction::Surface { si: &isect };
            if let Some(light_distribution) = self.light_distribution.as_ref() {
                if bsdf.num_components(BxDFType::BSDF_ALL & !BxDFType::BSDF_SPECULAR) > 0 {
                    let distrib = light_distribution.lookup(&isect.hit.p);
                    let ld = beta * uniform_sample_one_light(&it, scene, sampler, false, Some(&distrib));
                    debug_assert!(ld.y() >= 0.0);
                    l += ld;
                }
            }

            // Sample BSDF to get new path direction.
            let wo = -ray.d;
            let u = sampler.get_2d();
            let BxDFSample { f, pdf, wi, bxdf_type } = bsdf.sample_f(&wo, &u, BxDFType::BSDF_ALL);
            if f.is_black() || pdf == 0.0 {
                break;
            }
            beta *= f * wi.abs_dot(&isect.shading.n) / pdf;
            debug_assert!(beta.y() >= 0.0 && beta.y().is_finite());

            specular_bounce = bxdf_type.is_specular();
            if specular_bounce && bxdf_type.contains(BxDFType::BSDF_TRANSMISSION) {
                // Entering or leaving the refractive medium.
                let eta = bsdf.eta;
                eta_scale *= if wo.dot(&isect.hit.n) > 0.0 {
                    eta * eta
                } else {
                    1.0 / (eta * eta)
                };
            }
            *ray = isect.spawn_ray(&wi);

            // Continue the path from an exit point after transmission into a
            // translucent surface.
            if let Some(bssrdf) = isect.bssrdf {
                if bxdf_type.contains(BxDFType::BSDF_TRANSMISSION) {
                    let u1 = sampler.get_1d();
                    let u2 = sampler.get_2d();
                    let BSSRDFSample { si: pi, s, pdf } = match bssrdf.sample_s(scene, arena, u1, &u2) {
                        Some(sample) => sample,
                        None => break,
                    };
                    beta *= s / pdf;

                    // Direct subsurface scattering at the exit point.
                    let pi_bsdf = match pi.bsdf {
                        Some(bsdf) => bsdf,
                        None => break,
                    };
                    if let Some(light_distribution) = self.light_distribution.as_ref() {
                        let distrib = light_distribution.lookup(&pi.hit.p);
                        let it = Interaction::Surface { si: &pi };
                        l += beta * uniform_sample_one_light(&it, scene, sampler, false, Some(&distrib));
                    }

                    // Indirect subsurface scattering.
                    let u = sampler.get_2d();
                    let BxDFSample { f, pdf, wi, bxdf_type } = pi_bsdf.sample_f(&pi.hit.wo, &u, BxDFType::BSDF_ALL);
                    if f.is_black() || pdf == 0.0 {
                        break;
                    }
                    beta *= f * wi.abs_dot(&pi.shading.n) / pdf;
                    debug_assert!(beta.y().is_finite());
                    specular_bounce = bxdf_type.is_specular();
                    *ray = pi.spawn_ray(&wi);
                }
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
    use materials::{GlassMaterial, SubsurfaceMaterial};
    use std::sync::Arc;

    fn integrator(scene: &Scene, max_depth: Int, spp: usize) -> PathIntegrator {
        let mut params = ParamSet::new();
        params.add_int("maxdepth", &[max_depth]);
        let mut integrator = PathIntegrator::create(&params, overhead_camera(8, 8), random_sampler(spp)).unwrap();
        integrator.preprocess(scene);
        integrator
    }

    #[test]
    fn single_bounce_matches_direct_lighting() {
        let lights = [(Point3f::new(0.0, 0.0, 2.0), 4.0)];
        let scene = lit_plane(&lights);
        let integrator = integrator(&scene, 1, 1);
        let l = radiance_at_origin(&integrator, &scene, 1);
        assert!(approx_eq!(Float, l[0], 0.5 * INV_PI, epsilon = 1e-5));
        assert!(approx_eq!(Float, l[0], expected_direct(&lights), epsilon = 1e-5));
    }

    #[test]
    fn zero_depth_sees_only_emission() {
        let scene = lit_plane(&[(Point3f::new(0.0, 0.0, 2.0), 4.0)]);
        let integrator = integrator(&scene, 0, 1);
        let l = radiance_at_origin(&integrator, &scene, 1);
        assert!(l.is_black());
    }

    #[test]
    fn scene_without_lights_is_black() {
        let scene = lit_plane(&[]);
        let integrator = integrator(&scene, 5, 4);
        assert!(integrator.light_distribution.is_none());
        let l = radiance_at_origin(&integrator, &scene, 4);
        assert!(l.is_black());
    }

    #[test]
    fn emitter_is_seen_directly() {
        let scene = emitter_plane(Spectrum::new(2.0));
        let integrator = integrator(&scene, 3, 1);
        let l = radiance_at_origin(&integrator, &scene, 1);
        assert!(approx_eq!(Float, l[1], 2.0, epsilon = 1e-5));
    }

    #[test]
    fn translucent_plane_glows_through_subsurface_scattering() {
        // The boundary only transmits, so light reaches the viewer solely
        // by scattering inside the slab.
        let translucent = SubsurfaceMaterial::new(
            1.0,
            Spectrum::ZERO,
            Spectrum::ONE,
            Spectrum::new(0.5),
            Spectrum::new(2.0),
            0.0,
            1.33,
        );
        let scene = material_plane(Arc::new(translucent), 4.0);
        let subsurface = integrator(&scene, 5, 1);
        let l = radiance_at_origin(&subsurface, &scene, 64);
        assert!(l[0] > 0.0 && l[2] > 0.0, "subsurface radiance {}", l);
        assert!(l.y().is_finite());

        // Without an interior medium the same boundary lets light through.
        let clear = GlassMaterial::new(Spectrum::ZERO, Spectrum::ONE, 1.33);
        let scene = material_plane(Arc::new(clear), 4.0);
        let integrator = integrator(&scene, 5, 1);
        assert!(radiance_at_origin(&integrator, &scene, 64).is_black());
    }

    #[test]
    fn full_render_covers_every_pixel() {
        let scene = lit_plane(&[(Point3f::new(0.0, 0.0, 2.0), 40.0)]);
        let integrator = integrator(&scene, 2, 2);
        let stats = integrator.render(&scene, &quiet_options());
        assert_eq!(stats.samples(), 8 * 8 * 2);

        let film = integrator.get_data().camera.film();
        for p in film.cropped_pixel_bounds {
            let rgb = film.get_pixel_rgb(&p, 1.0);
            assert!(rgb[0] > 0.0, "pixel {:?} is black", p);
        }
    }

    #[test]
    fn pixel_bounds_restrict_rendered_pixels() {
        let scene = lit_plane(&[(Point3f::new(0.0, 0.0, 2.0), 40.0)]);
        let mut params = ParamSet::new();
        params.add_int("maxdepth", &[1]);
        params.add_int("pixelbounds", &[2, 5, 3, 7]);
        let mut integrator = PathIntegrator::create(&params, overhead_camera(8, 8), random_sampler(2)).unwrap();
        integrator.preprocess(&scene);

        let stats = integrator.render(&scene, &quiet_options());
        let inside = Bounds2i::new(Point2i::new(2, 3), Point2i::new(5, 7));
        assert_eq!(stats.samples(), inside.area() as u64 * 2);

        let film = integrator.get_data().camera.film();
        for p in film.cropped_pixel_bounds {
            let weight = film.get_filter_weight_sum(&p);
            if inside.contains_exclusive(&p) {
                assert!(weight > 0.0, "pixel {:?} has no samples", p);
            } else {
                assert_eq!(weight, 0.0, "pixel {:?} outside the bounds was sampled", p);
            }
        }
    }
}
