//! Integrators

#[macro_use]
extern crate log;

mod bdpt;
mod common;
mod direct_lighting;
mod path;
mod volpath;

use render_core::app::Options;
use render_core::camera::ArcCamera;
use render_core::error::{ConfigError, ImageError};
use render_core::integrator::SamplerIntegrator;
use render_core::paramset::ParamSet;
use render_core::sampler::Sampler;
use render_core::scene::Scene;
use render_core::stats::RenderStats;

// Re-export.
pub use bdpt::*;
pub use common::*;
pub use direct_lighting::*;
pub use path::*;
pub use volpath::*;

/// Names accepted by `create_integrator()`.
pub const INTEGRATOR_NAMES: [&str; 4] = ["directlighting", "path", "volpath", "bdpt"];

/// The light transport algorithms.
pub enum Integrator {
    DirectLighting(DirectLightingIntegrator),
    Path(PathIntegrator),
    VolPath(VolPathIntegrator),
    BDPT(BDPTIntegrator),
}

impl Integrator {
    /// Preprocesses the scene and renders it into the camera's film.
    ///
    /// * `scene`   - The scene.
    /// * `options` - Render options.
    pub fn render(&mut self, scene: &Scene, options: &Options) -> RenderStats {
        match self {
            Self::DirectLighting(integrator) => {
                integrator.preprocess(scene);
                integrator.render(scene, options)
            }
            Self::Path(integrator) => {
                integrator.preprocess(scene);
                integrator.render(scene, options)
            }
            Self::VolPath(integrator) => {
                integrator.preprocess(scene);
                integrator.render(scene, options)
            }
            Self::BDPT(integrator) => integrator.render(scene, options),
        }
    }

    /// Returns the camera.
    pub fn camera(&self) -> &ArcCamera {
        match self {
            Self::DirectLighting(integrator) => &integrator.data.camera,
            Self::Path(integrator) => &integrator.data.camera,
            Self::VolPath(integrator) => &integrator.data.camera,
            Self::BDPT(integrator) => integrator.camera(),
        }
    }

    /// Writes the rendered image.
    pub fn write_image(&self) -> Result<(), ImageError> {
        match self {
            Self::BDPT(integrator) => integrator.write_image(),
            _ => self.camera().film().write_image(1.0),
        }
    }
}

/// Creates an integrator by name.
///
/// * `name`    - Integrator name; see `INTEGRATOR_NAMES`.
/// * `params`  - Integrator parameters.
/// * `camera`  - The camera.
/// * `sampler` - The sampler.
pub fn create_integrator(
    name: &str,
    params: &ParamSet,
    camera: ArcCamera,
    sampler: Box<dyn Sampler>,
) -> Result<Integrator, ConfigError> {
    let integrator = match name {
        "directlighting" => Integrator::DirectLighting(DirectLightingIntegrator::create(params, camera, sampler)?),
        "path" => Integrator::Path(PathIntegrator::create(params, camera, sampler)?),
        "volpath" => Integrator::VolPath(VolPathIntegrator::create(params, camera, sampler)?),
        "bdpt" => Integrator::BDPT(BDPTIntegrator::create(params, camera, sampler)?),
        _ => {
            return Err(ConfigError::Unknown {
                kind: "integrator",
                name: name.to_string(),
            })
        }
    };
    info!("Created '{}' integrator", name);
    Ok(integrator)
}

#[cfg(test)]
pub(crate) mod test_util {
    use cameras::*;
    use filters::BoxFilter;
    use lights::*;
    use materials::MatteMaterial;
    use media::HomogeneousMedium;
    use render_core::app::Options;
    use render_core::camera::ArcCamera;
    use render_core::film::Film;
    use render_core::geometry::*;
    use render_core::integrator::SamplerIntegrator;
    use render_core::light::ArcLight;
    use render_core::material::ArcMaterial;
    use render_core::medium::*;
    use render_core::memory::MemoryArena;
    use render_core::paramset::ParamSet;
    use render_core::pbrt::*;
    use render_core::primitives::*;
    use render_core::sampler::Sampler;
    use render_core::scene::Scene;
    use render_core::spectrum::Spectrum;
    use samplers::RandomSampler;
    use shapes::Disk;
    use std::sync::Arc;

    /// Returns a camera one unit above the origin looking down at the
    /// xy-plane.
    pub fn overhead_camera(w: Int, h: Int) -> ArcCamera {
        let frame = LookAt::new(Point3f::new(0.0, 0.0, 1.0), Point3f::ZERO, Vector3f::new(0.0, 1.0, 0.0)).unwrap();
        let film = Film::new(
            &Point2i::new(w, h),
            &Bounds2f::new(Point2f::new(0.0, 0.0), Point2f::new(1.0, 1.0)),
            Arc::new(BoxFilter::new(Vector2f::new(0.5, 0.5))),
            35.0,
            "test.png",
            1.0,
            INFINITY,
        );
        let mut params = ParamSet::new();
        params.add_float("fov", &[60.0]);
        Arc::new(PerspectiveCamera::from((&params, &frame, film, None)))
    }

    pub fn random_sampler(spp: usize) -> Box<dyn Sampler> {
        Box::new(RandomSampler::new(spp, 0))
    }

    pub fn quiet_options() -> Options {
        Options {
            quiet: true,
            n_threads: 2,
            ..Default::default()
        }
    }

    /// Builds a large matte disk with albedo 0.5 in the xy-plane.
    fn plane(medium: Option<ArcMedium>) -> ArcPrimitive {
        let shape = Arc::new(Disk::new(Point3f::ZERO, Vector3f::new(0.0, 0.0, 1.0), 100.0, false));
        Arc::new(GeometricPrimitive::new(
            shape,
            Some(Arc::new(MatteMaterial::new(Spectrum::new(0.5)))),
            None,
            MediumInterface::from(medium),
        ))
    }

    fn point_lights(lights: &[(Point3f, Float)], medium: Option<ArcMedium>) -> Vec<ArcLight> {
        lights
            .iter()
            .map(|(p, intensity)| {
                let light: ArcLight = Arc::new(PointLight::new(
                    *p,
                    MediumInterface::from(medium.clone()),
                    Spectrum::new(*intensity),
                ));
                light
            })
            .collect()
    }

    /// Matte plane lit by point lights `(position, intensity)`.
    pub fn lit_plane(lights: &[(Point3f, Float)]) -> Scene {
        let aggregate = Arc::new(PrimitiveList::new(vec![plane(None)]));
        Scene::new(aggregate, point_lights(lights, None))
    }

    /// Plane of an arbitrary material lit by a light at `(0, 0, 2)`.
    pub fn material_plane(material: ArcMaterial, intensity: Float) -> Scene {
        let shape = Arc::new(Disk::new(Point3f::ZERO, Vector3f::new(0.0, 0.0, 1.0), 100.0, false));
        let primitive = Arc::new(GeometricPrimitive::new(shape, Some(material), None, MediumInterface::default()));
        let lights = point_lights(&[(Point3f::new(0.0, 0.0, 2.0), intensity)], None);
        Scene::new(Arc::new(PrimitiveList::new(vec![primitive])), lights)
    }

    /// Black plane emitting `l` towards +z.
    pub fn emitter_plane(l: Spectrum) -> Scene {
        let shape = Arc::new(Disk::new(Point3f::ZERO, Vector3f::new(0.0, 0.0, 1.0), 100.0, false));
        let light: ArcLight = Arc::new(DiffuseAreaLight::new(MediumInterface::default(), l, 1, shape.clone(), false));
        let primitive = Arc::new(GeometricPrimitive::new(
            shape,
            Some(Arc::new(MatteMaterial::new(Spectrum::ZERO))),
            Some(light.clone()),
            MediumInterface::default(),
        ));
        Scene::new(Arc::new(PrimitiveList::new(vec![primitive])), vec![light])
    }

    /// Matte plane in a purely absorbing fog, lit by a light at `(0, 0, 2)`.
    pub fn fog_plane(sigma_a: Float, intensity: Float) -> (Scene, ArcMedium) {
        fog_scene(HomogeneousMedium::new(Spectrum::new(sigma_a), Spectrum::ZERO, 0.0), intensity)
    }

    /// Matte plane in a scattering fog, lit by a light at `(0, 0, 2)`.
    pub fn scattering_fog_plane(sigma_s: Float, intensity: Float) -> (Scene, ArcMedium) {
        fog_scene(HomogeneousMedium::new(Spectrum::new(0.05), Spectrum::new(sigma_s), 0.0), intensity)
    }

    fn fog_scene(fog: HomogeneousMedium, intensity: Float) -> (Scene, ArcMedium) {
        let fog: ArcMedium = Arc::new(fog);
        let aggregate = Arc::new(PrimitiveList::new(vec![plane(Some(fog.clone()))]));
        let lights = point_lights(&[(Point3f::new(0.0, 0.0, 2.0), intensity)], Some(fog.clone()));
        (Scene::new(aggregate, lights), fog)
    }

    /// Direct illumination at the origin of the albedo 0.5 plane.
    pub fn expected_direct(lights: &[(Point3f, Float)]) -> Float {
        lights
            .iter()
            .map(|(p, intensity)| {
                let d = Vector3f::new(p.x, p.y, p.z);
                0.5 * INV_PI * intensity * p.z / d.length().powi(3)
            })
            .sum()
    }

    /// Averages `n` radiance estimates along the ray from `(0, 0, 1)`
    /// straight down to the origin.
    pub fn radiance_through<I: SamplerIntegrator>(
        integrator: &I,
        scene: &Scene,
        n: usize,
        medium: Option<ArcMedium>,
    ) -> Spectrum {
        let mut sampler = integrator.get_data().sampler.clone_sampler(0);
        sampler.start_pixel(&Point2i::new(0, 0));
        let mut arena = MemoryArena::default();

        let mut sum = Spectrum::ZERO;
        for _ in 0..n {
            let mut ray = Ray::new(
                Point3f::new(0.0, 0.0, 1.0),
                Vector3f::new(0.0, 0.0, -1.0),
                INFINITY,
                0.0,
                medium.clone(),
            );
            sum += integrator.li(&mut ray, scene, sampler.as_mut(), &arena, 0);
            arena.reset();
            sampler.start_next_sample();
        }
        sum / n as Float
    }

    pub fn radiance_at_origin<I: SamplerIntegrator>(integrator: &I, scene: &Scene, n: usize) -> Spectrum {
        radiance_through(integrator, scene, n, None)
    }
}

// ---- Tests ----

#[cfg(test)]
mod tests {
    use super::test_util::*;
    use super::*;
    use render_core::geometry::*;

    #[test]
    fn every_name_creates_an_integrator() {
        for name in INTEGRATOR_NAMES {
            let integrator = create_integrator(name, &ParamSet::new(), overhead_camera(4, 4), random_sampler(1));
            assert!(integrator.is_ok(), "{} failed", name);
        }
    }

    #[test]
    fn unknown_integrator_is_rejected() {
        let integrator = create_integrator("whitted", &ParamSet::new(), overhead_camera(4, 4), random_sampler(1));
        assert!(matches!(
            integrator,
            Err(ConfigError::Unknown {
                kind: "integrator",
                ..
            })
        ));
    }

    #[test]
    fn negative_depth_is_rejected() {
        let mut params = ParamSet::new();
        params.add_int("maxdepth", &[-1]);
        let integrator = create_integrator("bdpt", &params, overhead_camera(4, 4), random_sampler(1));
        assert!(matches!(integrator, Err(ConfigError::InvalidParameter { .. })));
    }

    #[test]
    fn every_integrator_renders_the_lit_plane() {
        let scene = lit_plane(&[(Point3f::new(0.0, 0.0, 2.0), 40.0)]);
        for name in INTEGRATOR_NAMES {
            let mut integrator =
                create_integrator(name, &ParamSet::new(), overhead_camera(4, 4), random_sampler(2)).unwrap();
            let stats = integrator.render(&scene, &quiet_options());
            assert_eq!(stats.samples(), 4 * 4 * 2, "{}", name);

            let film = integrator.camera().film();
            let center = film.get_pixel_rgb(&Point2i::new(2, 2), 0.5);
            assert!(center[0] > 0.0, "{} rendered a black center pixel", name);
        }
    }
}
