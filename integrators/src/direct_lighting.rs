//! Direct Lighting Integrator

use crate::common::*;
use render_core::camera::*;
use render_core::error::ConfigError;
use render_core::geometry::*;
use render_core::integrator::*;
use render_core::interaction::*;
use render_core::material::*;
use render_core::memory::MemoryArena;
use render_core::paramset::*;
use render_core::sampler::*;
use render_core::scene::*;
use render_core::spectrum::*;

/// Direct light sampling strategy.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum DirectLightStrategy {
    /// Loops over all of the lights and takes `light.get_num_samples()`
    /// samples from each of them, summing the result.
    UniformSampleAll,

    /// Takes a single sample from just one of the lights, chosen at random.
    UniformSampleOne,
}

impl From<&str> for DirectLightStrategy {
    /// Returns the strategy for a parameter value. Unknown names fall back
    /// to sampling all lights.
    fn from(name: &str) -> Self {
        match name {
            "one" => Self::UniformSampleOne,
            "all" => Self::UniformSampleAll,
            _ => {
                error!("Strategy '{}' for direct lighting unknown. Using 'all'.", name);
                Self::UniformSampleAll
            }
        }
    }
}

/// Implements the direct lighting integrator. Only light arriving directly
/// from emitters is accounted for, plus perfect specular reflection and
/// transmission.
pub struct DirectLightingIntegrator {
    /// Common data for sampler integrators.
    pub data: SamplerIntegratorData,

    /// Maximum recursion depth for specular paths.
    max_depth: usize,

    /// Direct light sampling strategy.
    strategy: DirectLightStrategy,

    /// Number of samples to use for each light source.
    n_light_samples: Vec<usize>,
}

impl DirectLightingIntegrator {
    /// Create a new `DirectLightingIntegrator`.
    ///
    /// * `camera`       - The camera.
    /// * `sampler`      - The sampler.
    /// * `pixel_bounds` - Pixel bounds for the image.
    /// * `max_depth`    - Maximum recursion depth.
    /// * `strategy`     - Light sampling strategy.
    pub fn new(
        camera: ArcCamera,
        sampler: Box<dyn Sampler>,
        pixel_bounds: Bounds2i,
        max_depth: usize,
        strategy: DirectLightStrategy,
    ) -> Self {
        Self {
            data: SamplerIntegratorData::new(camera, sampler, pixel_bounds),
            max_depth,
            strategy,
            n_light_samples: vec![],
        }
    }

    /// Create a `DirectLightingIntegrator` from `maxdepth`, `strategy` and
    /// `pixelbounds`.
    ///
    /// * `params`  - Integrator parameters.
    /// * `camera`  - The camera.
    /// * `sampler` - The sampler.
    pub fn create(params: &ParamSet, camera: ArcCamera, sampler: Box<dyn Sampler>) -> Result<Self, ConfigError> {
        let max_depth = max_depth(params)?;
        let strategy = DirectLightStrategy::from(params.find_one_string("strategy", "all".to_owned()).as_str());
        let pixel_bounds = get_pixel_bounds(params, &camera.film().get_sample_bounds())?;
        Ok(Self::new(camera, sampler, pixel_bounds, max_depth, strategy))
    }

    /// Returns the light sampling strategy.
    pub fn strategy(&self) -> DirectLightStrategy {
        self.strategy
    }
}

impl SamplerIntegrator for DirectLightingIntegrator {
    fn get_data(&self) -> &SamplerIntegratorData {
        &self.data
    }

    /// Computes the per light sample counts and requests the sample arrays
    /// used at every depth.
    ///
    /// * `scene` - The scene.
    fn preprocess(&mut self, scene: &Scene) {
        if self.strategy != DirectLightStrategy::UniformSampleAll {
            return;
        }

        let sampler = &mut self.data.sampler;
        self.n_light_samples = scene
            .lights
            .iter()
            .map(|light| {
                let n = light.get_num_samples();
                let rounded = sampler.round_count(n);
                if rounded != n {
                    warn!("Light sample count {} rounded to {}", n, rounded);
                }
                rounded
            })
            .collect();

        for _ in 0..self.max_depth {
            for n in self.n_light_samples.iter() {
                sampler.request_2d_array(*n);
                sampler.request_2d_array(*n);
            }
        }
    }

    fn li<'a>(
        &self,
        ray: &mut Ray,
        scene: &'a Scene,
        sampler: &mut dyn Sampler,
        arena: &'a MemoryArena,
        depth: usize,
    ) -> Spectrum {
        let mut l = Spectrum::ZERO;

        // Find closest ray intersection or return background radiance.
        let mut isect = match scene.intersect(ray) {
            Some(isect) => isect,
            None => {
                for light in scene.lights.iter() {
                    l += light.le(ray);
                }
                return l;
            }
        };

        // Compute scattering functions for surface interaction.
        isect.compute_scattering_functions(arena, TransportMode::Radiance, false);
        if isect.bsdf.is_none() {
            let mut ray = isect.spawn_ray(&ray.d);
            return self.li(&mut ray, scene, sampler, arena, depth);
        }

        // Compute emitted light if ray hit an area light source.
        let wo = isect.hit.wo;
        l += isect.le(&wo);

        if !scene.lights.is_empty() {
            // Compute direct lighting for `DirectLightingIntegrator`.
            let it = Interaction::Surface { si: &isect };
            l += match self.strategy {
                DirectLightStrategy::UniformSampleAll => {
                    uniform_sample_all_lights(&it, scene, sampler, &self.n_light_samples, false)
                }
                DirectLightStrategy::UniformSampleOne => uniform_sample_one_light(&it, scene, sampler, false, None),
            };
        }

        if depth + 1 < self.max_depth {
            // Trace rays for specular reflection and refraction.
            l += self.specular_reflect(&isect, scene, sampler, arena, depth);
            l += self.specular_transmit(&isect, scene, sampler, arena, depth);
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
    use render_core::pbrt::*;

    fn integrator(scene: &Scene, strategy: &str, spp: usize) -> DirectLightingIntegrator {
        let mut params = ParamSet::new();
        params.add_string("strategy", &[strategy.to_owned()]);
        let mut integrator = DirectLightingIntegrator::create(&params, overhead_camera(8, 8), random_sampler(spp)).unwrap();
        integrator.preprocess(scene);
        integrator
    }

    #[test]
    fn unknown_strategy_samples_all_lights() {
        assert_eq!(DirectLightStrategy::from("one"), DirectLightStrategy::UniformSampleOne);
        assert_eq!(DirectLightStrategy::from("bogus"), DirectLightStrategy::UniformSampleAll);
    }

    #[test]
    fn point_light_over_plane() {
        let scene = lit_plane(&[(Point3f::new(0.0, 0.0, 2.0), 4.0)]);
        let integrator = integrator(&scene, "all", 1);
        let l = radiance_at_origin(&integrator, &scene, 1);
        assert!(approx_eq!(Float, l[0], expected_direct(&[(Point3f::new(0.0, 0.0, 2.0), 4.0)]), epsilon = 1e-5));
    }

    #[test]
    fn one_light_converges_to_all_lights() {
        let lights = [(Point3f::new(1.0, 0.0, 2.0), 5.0), (Point3f::new(-1.0, 0.5, 1.0), 2.0)];
        let scene = lit_plane(&lights);
        let expected = expected_direct(&lights);

        // Sampling all delta lights is exact.
        let all = integrator(&scene, "all", 1);
        let l_all = radiance_at_origin(&all, &scene, 1);
        assert!(approx_eq!(Float, l_all[0], expected, epsilon = 1e-5));

        // Sampling one light is exact only on average.
        let n = 20_000;
        let one = integrator(&scene, "one", n);
        let l_one = radiance_at_origin(&one, &scene, n);
        assert!((l_one[0] - expected).abs() < 0.03 * expected, "{} vs {}", l_one[0], expected);
    }

    #[test]
    fn escaping_rays_see_background() {
        let scene = lit_plane(&[(Point3f::new(0.0, 0.0, 2.0), 4.0)]);
        let integrator = integrator(&scene, "one", 1);
        let mut sampler = random_sampler(1);
        sampler.start_pixel(&Point2i::new(0, 0));
        let arena = MemoryArena::default();
        let mut ray = Ray::new(Point3f::new(0.0, 0.0, 1.0), Vector3f::new(0.0, 0.0, 1.0), INFINITY, 0.0, None);
        let l = integrator.li(&mut ray, &scene, sampler.as_mut(), &arena, 0);
        assert!(l.is_black());
    }
}
