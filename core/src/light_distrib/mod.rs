//! Light Distribution.

mod power;
mod spatial;
mod uniform;

pub use power::*;
pub use spatial::*;
pub use uniform::*;

use crate::geometry::*;
use crate::sampling::*;
use crate::scene::*;
use std::sync::Arc;

/// Light sampling strategy.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LightSampleStategy {
    /// Sample all light sources uniformly.
    Uniform,

    /// Samples light sources according to their emitted power.
    Power,

    /// Compute light contributions in regions of the scene and samples from a
    /// related distribution.
    Spatial,
}

impl From<&str> for LightSampleStategy {
    /// Returns a `LightSampleStrategy` given a string name.
    fn from(name: &str) -> Self {
        match name {
            "uniform" => Self::Uniform,
            "power" => Self::Power,
            "spatial" => Self::Spatial,
            _ => {
                error!("Light sample distribution type '{}' unknown. Using 'spatial'.", name);
                Self::Spatial
            }
        }
    }
}

/// Provides probability distributions for sampling light sources at a
/// given point in space. Lookups are thread-safe and the returned tables
/// live at least as long as the distribution.
pub enum LightDistribution {
    /// Same probability for every light.
    Uniform(UniformLightDistribution),

    /// Probability proportional to emitted power.
    Power(PowerLightDistribution),

    /// Per-voxel distributions computed on demand.
    Spatial(SpatialLightDistribution),
}

impl LightDistribution {
    /// Creates a light distribution for the scene. A scene with a single
    /// light always uses the uniform strategy.
    ///
    /// * `strategy` - The strategy to use for light sampling.
    /// * `scene`    - The scene.
    pub fn new(strategy: LightSampleStategy, scene: &Scene) -> Self {
        let strategy = if scene.lights.len() == 1 {
            LightSampleStategy::Uniform
        } else {
            strategy
        };
        match strategy {
            LightSampleStategy::Uniform => Self::Uniform(UniformLightDistribution::new(scene)),
            LightSampleStategy::Power => Self::Power(PowerLightDistribution::new(scene)),
            LightSampleStategy::Spatial => Self::Spatial(SpatialLightDistribution::new(scene, MAX_VOXELS)),
        }
    }

    /// Given a point `p` in space, returns a sampling distribution for light
    /// sources at that point.
    ///
    /// * `p` - The point.
    pub fn lookup(&self, p: &Point3f) -> Arc<Distribution1D> {
        match self {
            Self::Uniform(d) => d.lookup(p),
            Self::Power(d) => d.lookup(p),
            Self::Spatial(d) => d.lookup(p),
        }
    }
}

// ---- Tests ----

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction::*;
    use crate::light::*;
    use crate::material::*;
    use crate::memory::MemoryArena;
    use crate::pbrt::*;
    use crate::primitives::*;
    use crate::spectrum::*;
    use float_cmp::approx_eq;

    /// Isotropic point emitter.
    struct Bulb {
        p: Point3f,
        intensity: Float,
    }

    impl Light for Bulb {
        fn get_type(&self) -> LightType {
            LightType::DELTA_POSITION_LIGHT
        }

        fn sample_li(&self, hit: &Hit, _u: &Point2f) -> Li {
            let wi = (self.p - hit.p).normalize();
            let d2 = self.p.distance_squared(&hit.p);
            Li::new(wi, 1.0, None, Spectrum::new(self.intensity / d2))
        }

        fn power(&self) -> Spectrum {
            Spectrum::new(FOUR_PI * self.intensity)
        }

        fn pdf_li(&self, _hit: &Hit, _wi: &Vector3f) -> Float {
            0.0
        }

        fn sample_le(&self, _u1: &Point2f, _u2: &Point2f, _time: Float) -> Le {
            Le::default()
        }

        fn pdf_le(&self, _ray: &Ray, _n_light: &Normal3f) -> Pdf {
            Pdf::default()
        }
    }

    /// Empty geometry with fixed bounds.
    struct Void(Bounds3f);

    impl Primitive for Void {
        fn world_bound(&self) -> Bounds3f {
            self.0
        }

        fn intersect(&self, _r: &mut Ray) -> Option<SurfaceInteraction<'_>> {
            None
        }

        fn intersect_p(&self, _r: &Ray) -> bool {
            false
        }

        fn get_area_light(&self) -> Option<ArcLight> {
            None
        }

        fn get_material(&self) -> Option<ArcMaterial> {
            None
        }

        fn compute_scattering_functions<'a>(
            &'a self,
            _si: &mut SurfaceInteraction<'a>,
            _arena: &'a MemoryArena,
            _mode: TransportMode,
            _allow_multiple_lobes: bool,
        ) {
        }
    }

    fn scene(lights: Vec<(Point3f, Float)>) -> Scene {
        let bounds = Bounds3f::new(Point3f::new(-10.0, -10.0, -10.0), Point3f::new(10.0, 10.0, 10.0));
        let lights: Vec<ArcLight> = lights
            .into_iter()
            .map(|(p, intensity)| Arc::new(Bulb { p, intensity }) as ArcLight)
            .collect();
        Scene::new(Arc::new(Void(bounds)), lights)
    }

    #[test]
    fn unknown_strategy_falls_back_to_spatial() {
        assert_eq!(LightSampleStategy::from("power"), LightSampleStategy::Power);
        assert_eq!(LightSampleStategy::from("bogus"), LightSampleStategy::Spatial);
    }

    #[test]
    fn single_light_always_uses_uniform() {
        let s = scene(vec![(Point3f::ZERO, 1.0)]);
        let d = LightDistribution::new(LightSampleStategy::Spatial, &s);
        assert!(matches!(d, LightDistribution::Uniform(_)));
    }

    #[test]
    fn uniform_gives_equal_probabilities() {
        let s = scene(vec![(Point3f::ZERO, 1.0), (Point3f::new(1.0, 0.0, 0.0), 9.0)]);
        let d = LightDistribution::new(LightSampleStategy::Uniform, &s).lookup(&Point3f::ZERO);
        assert!(approx_eq!(Float, d.discrete_pdf(0), 0.5));
        assert!(approx_eq!(Float, d.discrete_pdf(1), 0.5));
    }

    #[test]
    fn power_is_proportional_to_emitted_power() {
        let s = scene(vec![(Point3f::ZERO, 1.0), (Point3f::new(1.0, 0.0, 0.0), 3.0)]);
        let d = LightDistribution::new(LightSampleStategy::Power, &s).lookup(&Point3f::ZERO);
        assert!(approx_eq!(Float, d.discrete_pdf(0), 0.25, epsilon = 1e-5));
        assert!(approx_eq!(Float, d.discrete_pdf(1), 0.75, epsilon = 1e-5));
    }

    #[test]
    fn spatial_favours_nearby_light() {
        let s = scene(vec![
            (Point3f::new(-9.0, -9.0, -9.0), 1.0),
            (Point3f::new(9.0, 9.0, 9.0), 1.0),
        ]);
        let d = LightDistribution::new(LightSampleStategy::Spatial, &s);
        let near_first = d.lookup(&Point3f::new(-9.5, -9.5, -9.5));
        assert!(near_first.discrete_pdf(0) > near_first.discrete_pdf(1));
        let near_second = d.lookup(&Point3f::new(9.5, 9.5, 9.5));
        assert!(near_second.discrete_pdf(1) > near_second.discrete_pdf(0));
    }

    #[test]
    fn spatial_probabilities_stay_positive() {
        let s = scene(vec![(Point3f::ZERO, 1.0), (Point3f::new(1.0, 0.0, 0.0), 0.0)]);
        let d = LightDistribution::new(LightSampleStategy::Spatial, &s);
        let dist = d.lookup(&Point3f::new(3.0, 3.0, 3.0));
        assert!(dist.discrete_pdf(1) > 0.0);
    }

    #[test]
    fn concurrent_lookups_share_one_table() {
        let s = scene(vec![(Point3f::ZERO, 1.0), (Point3f::new(5.0, 0.0, 0.0), 2.0)]);
        let d = LightDistribution::new(LightSampleStategy::Spatial, &s);
        let p = Point3f::new(1.0, 2.0, 3.0);

        let tables: Vec<Arc<Distribution1D>> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8).map(|_| scope.spawn(|| d.lookup(&p))).collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        for t in tables.iter() {
            assert!(Arc::ptr_eq(t, &tables[0]));
        }
        assert!(Arc::ptr_eq(&d.lookup(&p), &tables[0]));
    }
}
