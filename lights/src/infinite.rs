//! Uniform Infinite Light Source

use crate::world_sphere::WorldSphere;
use render_core::geometry::*;
use render_core::interaction::*;
use render_core::light::*;
use render_core::paramset::*;
use render_core::pbrt::*;
use render_core::sampling::*;
use render_core::scene::*;
use render_core::spectrum::*;

/// Implements an infinitely far away light source that surrounds the scene
/// and emits the same radiance from every direction.
pub struct UniformInfiniteLight {
    /// Emitted radiance.
    pub l_emit: Spectrum,

    /// Used to trace multiple shadow rays to the light.
    pub n_samples: usize,

    /// Scene bounds; known after `preprocess()`.
    world: WorldSphere,
}

impl UniformInfiniteLight {
    /// Returns a new `UniformInfiniteLight`.
    ///
    /// * `l_emit`    - Emitted radiance.
    /// * `n_samples` - Number of shadow rays per lookup.
    pub fn new(l_emit: Spectrum, n_samples: usize) -> Self {
        Self {
            l_emit,
            n_samples: max(1, n_samples),
            world: WorldSphere::new(),
        }
    }
}

impl Light for UniformInfiniteLight {
    fn preprocess(&self, scene: &Scene) {
        self.world.update(scene);
    }

    fn get_type(&self) -> LightType {
        LightType::INFINITE_LIGHT
    }

    /// Samples a direction uniformly over the sphere.
    ///
    /// * `hit` - The interaction hit point.
    /// * `u`   - Sample value for Monte Carlo integration.
    fn sample_li(&self, hit: &Hit, u: &Point2f) -> Li {
        let world = self.world.get();
        let wi = uniform_sample_sphere(u);
        let p_outside = hit.p + wi * (2.0 * world.radius);
        let p1 = Hit::new_minimal(p_outside, hit.time, hit.medium_interface.clone());
        let vis = VisibilityTester::new(hit.clone(), p1);
        Li::new(wi, uniform_sphere_pdf(), Some(vis), self.l_emit)
    }

    fn power(&self) -> Spectrum {
        let world = self.world.get();
        self.l_emit * (PI * world.radius * world.radius)
    }

    fn le(&self, _ray: &Ray) -> Spectrum {
        self.l_emit
    }

    fn pdf_li(&self, _hit: &Hit, _wi: &Vector3f) -> Float {
        uniform_sphere_pdf()
    }

    /// Returns a ray entering the scene from a disk that covers the scene
    /// bounds and faces a uniformly sampled direction.
    ///
    /// * `u1`   - Sample values for the direction.
    /// * `u2`   - Sample values for the position on the disk.
    /// * `time` - Time to use for the ray.
    fn sample_le(&self, u1: &Point2f, u2: &Point2f, time: Float) -> Le {
        let world = self.world.get();

        let d = -uniform_sample_sphere(u1);
        let (v1, v2) = coordinate_system(&(-d));
        let cd = concentric_sample_disk(u2);
        let p_disk = world.center + (v1 * cd.x + v2 * cd.y) * world.radius;
        let ray = Ray::new(p_disk + (-d) * world.radius, d, INFINITY, time, None);

        Le::new(
            ray,
            Normal3f::from(d),
            1.0 / (PI * world.radius * world.radius),
            uniform_sphere_pdf(),
            self.l_emit,
        )
    }

    fn pdf_le(&self, _ray: &Ray, _n_light: &Normal3f) -> Pdf {
        let world = self.world.get();
        Pdf::new(1.0 / (PI * world.radius * world.radius), uniform_sphere_pdf())
    }

    fn get_num_samples(&self) -> usize {
        self.n_samples
    }
}

impl From<&ParamSet> for UniformInfiniteLight {
    /// Create a `UniformInfiniteLight` from a parameter set.
    ///
    /// * `params` - Parameter set.
    fn from(params: &ParamSet) -> Self {
        let l = params.find_one_spectrum("L", Spectrum::ONE);
        let sc = params.find_one_spectrum("scale", Spectrum::ONE);
        let n_samples = params.find_one_int("samples", params.find_one_int("nsamples", 1));
        Self::new(l * sc, max(1, n_samples) as usize)
    }
}

// ---- Tests ----
