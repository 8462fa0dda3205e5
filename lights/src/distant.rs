//! Distant Source

use crate::world_sphere::WorldSphere;
use render_core::geometry::*;
use render_core::interaction::*;
use render_core::light::*;
use render_core::paramset::*;
use render_core::pbrt::*;
use render_core::sampling::*;
use render_core::scene::*;
use render_core::spectrum::*;

/// Implements a directional light source that deposits illumination from the
/// same direction at every point in space.
pub struct DistantLight {
    /// The emitted radiance `L`.
    pub emitted_radiance: Spectrum,

    /// Direction towards the light.
    pub w_light: Vector3f,

    /// Scene bounds; known after `preprocess()`.
    world: WorldSphere,
}

impl DistantLight {
    /// Returns a new `DistantLight`.
    ///
    /// * `emitted_radiance` - The emitted radiance.
    /// * `w_light`          - Direction towards the light.
    pub fn new(emitted_radiance: Spectrum, w_light: Vector3f) -> Self {
        Self {
            emitted_radiance,
            w_light: w_light.normalize(),
            world: WorldSphere::new(),
        }
    }
}

impl Light for DistantLight {
    fn preprocess(&self, scene: &Scene) {
        self.world.update(scene);
    }

    fn get_type(&self) -> LightType {
        LightType::DELTA_DIRECTION_LIGHT
    }

    /// Return the radiance arriving at an interaction point.
    ///
    /// * `hit` - The interaction hit point.
    /// * `u`   - Sample value for Monte Carlo integration.
    fn sample_li(&self, hit: &Hit, _u: &Point2f) -> Li {
        let world = self.world.get();
        let p_outside = hit.p + self.w_light * (2.0 * world.radius);
        let p1 = Hit::new_minimal(p_outside, hit.time, hit.medium_interface.clone());
        let vis = VisibilityTester::new(hit.clone(), p1);

        Li::new(self.w_light, 1.0, Some(vis), self.emitted_radiance)
    }

    fn power(&self) -> Spectrum {
        let world = self.world.get();
        self.emitted_radiance * PI * world.radius * world.radius
    }

    fn pdf_li(&self, _hit: &Hit, _wi: &Vector3f) -> Float {
        0.0
    }

    /// Returns a sampled light-carrying ray leaving a disk that covers the
    /// scene and faces the light.
    ///
    /// * `u1`   - Sample values for the position on the disk.
    /// * `u2`   - Unused.
    /// * `time` - Time to use for the ray.
    fn sample_le(&self, u1: &Point2f, _u2: &Point2f, time: Float) -> Le {
        let world = self.world.get();

        // Choose point on disk oriented toward infinite light direction.
        let (v1, v2) = coordinate_system(&self.w_light);
        let cd = concentric_sample_disk(u1);
        let p_disk = world.center + (v1 * cd.x + v2 * cd.y) * world.radius;

        // Set ray origin and direction for infinite light ray.
        let dir = -self.w_light;
        let ray = Ray::new(p_disk + self.w_light * world.radius, dir, INFINITY, time, None);
        Le::new(
            ray,
            Normal3f::from(dir),
            1.0 / (PI * world.radius * world.radius),
            1.0,
            self.emitted_radiance,
        )
    }

    fn pdf_le(&self, _ray: &Ray, _n_light: &Normal3f) -> Pdf {
        let world = self.world.get();
        Pdf::new(1.0 / (PI * world.radius * world.radius), 0.0)
    }
}

impl From<&ParamSet> for DistantLight {
    /// Create a `DistantLight` from given parameter set. The light shines
    /// from `from` towards `to`.
    ///
    /// * `params` - Parameter set.
    fn from(params: &ParamSet) -> Self {
        let emitted_radiance = params.find_one_spectrum("L", Spectrum::ONE);
        let sc = params.find_one_spectrum("scale", Spectrum::ONE);
        let from = params.find_one_point3f("from", Point3f::ZERO);
        let to = params.find_one_point3f("to", Point3f::new(0.0, 0.0, 1.0));
        let mut dir = from - to;
        if dir.length_squared() == 0.0 {
            error!("Distant light 'from' and 'to' coincide; shining along +z.");
            dir = Vector3f::new(0.0, 0.0, -1.0);
        }
        Self::new(emitted_radiance * sc, dir)
    }
}

// ---- Tests ----

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;
    use render_core::medium::MediumInterface;

    #[test]
    fn radiance_is_independent_of_position() {
        let light = DistantLight::new(Spectrum::new(3.0), Vector3f::new(0.0, 1.0, 0.0));
        for p in [Point3f::ZERO, Point3f::new(10.0, -4.0, 2.0)] {
            let hit = Hit::new_minimal(p, 0.0, MediumInterface::default());
            let li = light.sample_li(&hit, &Point2f::new(0.1, 0.9));
            assert_eq!(li.value, Spectrum::new(3.0));
            assert!(approx_eq!(Float, li.wi.y, 1.0));
        }
    }

    #[test]
    fn emission_covers_world_disk() {
        let light = DistantLight::new(Spectrum::ONE, Vector3f::new(0.0, 0.0, 1.0));
        light.world.set((Point3f::new(1.0, 1.0, 1.0), 2.0));

        let le = light.sample_le(&Point2f::new(0.9, 0.2), &Point2f::new(0.5, 0.5), 0.0);
        assert!(approx_eq!(Float, le.ray.d.z, -1.0));
        assert!(approx_eq!(Float, le.ray.o.z, 3.0, epsilon = 1e-5));
        assert!(approx_eq!(Float, le.pdf_pos, 1.0 / (4.0 * PI)));
        assert!(approx_eq!(Float, light.power()[0], 4.0 * PI));
    }
}
