//! Point Light Source

use render_core::geometry::*;
use render_core::interaction::*;
use render_core::light::*;
use render_core::medium::*;
use render_core::paramset::*;
use render_core::pbrt::*;
use render_core::sampling::*;
use render_core::spectrum::*;

/// Implements an isotropic point light source that emits the same amount of
/// light in all directions.
#[derive(Clone)]
pub struct PointLight {
    /// Participating medium.
    pub medium_interface: MediumInterface,

    /// Position.
    pub p_light: Point3f,

    /// Intensity.
    pub intensity: Spectrum,
}

impl PointLight {
    /// Returns a new `PointLight`.
    ///
    /// * `p_light`          - Position.
    /// * `medium_interface` - Participating medium.
    /// * `intensity`        - Intensity.
    pub fn new(p_light: Point3f, medium_interface: MediumInterface, intensity: Spectrum) -> Self {
        Self {
            medium_interface,
            p_light,
            intensity,
        }
    }
}

impl Light for PointLight {
    fn get_type(&self) -> LightType {
        LightType::DELTA_POSITION_LIGHT
    }

    /// Return the radiance arriving at an interaction point.
    ///
    /// * `hit` - The interaction hit point.
    /// * `u`   - Sample value for Monte Carlo integration.
    fn sample_li(&self, hit: &Hit, _u: &Point2f) -> Li {
        let wi = (self.p_light - hit.p).normalize();
        let p1 = Hit::new_minimal(self.p_light, hit.time, self.medium_interface.clone());
        let vis = VisibilityTester::new(hit.clone(), p1);

        let value = self.intensity / self.p_light.distance_squared(&hit.p);
        Li::new(wi, 1.0, Some(vis), value)
    }

    fn power(&self) -> Spectrum {
        self.intensity * FOUR_PI
    }

    fn pdf_li(&self, _hit: &Hit, _wi: &Vector3f) -> Float {
        0.0
    }

    /// Returns a sampled light-carrying ray leaving the light source.
    ///
    /// * `u1`   - Sample values for the direction.
    /// * `u2`   - Unused.
    /// * `time` - Time to use for the ray.
    fn sample_le(&self, u1: &Point2f, _u2: &Point2f, time: Float) -> Le {
        let dir = uniform_sample_sphere(u1);
        let ray = Ray::new(self.p_light, dir, INFINITY, time, self.medium_interface.inside.clone());
        Le::new(ray, Normal3f::from(dir), 1.0, uniform_sphere_pdf(), self.intensity)
    }

    fn pdf_le(&self, _ray: &Ray, _n_light: &Normal3f) -> Pdf {
        Pdf::new(0.0, uniform_sphere_pdf())
    }
}

impl From<(&ParamSet, Option<ArcMedium>)> for PointLight {
    /// Create a `PointLight` from given parameter set and medium.
    ///
    /// * `p` - A tuple containing the parameter set and medium.
    fn from(p: (&ParamSet, Option<ArcMedium>)) -> Self {
        let (params, medium) = p;

        let intensity = params.find_one_spectrum("I", Spectrum::ONE);
        let sc = params.find_one_spectrum("scale", Spectrum::ONE);
        let from = params.find_one_point3f("from", Point3f::ZERO);
        Self::new(from, MediumInterface::from(medium), intensity * sc)
    }
}

// ---- Tests ----

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    #[test]
    fn inverse_square_falloff() {
        let mut params = ParamSet::new();
        params.add_point3f("from", &[Point3f::new(0.0, 0.0, 2.0)]);
        params.add_spectrum("I", &[Spectrum::new(8.0)]);
        let light = PointLight::from((&params, None));

        let hit = Hit::new_minimal(Point3f::ZERO, 0.0, MediumInterface::default());
        let li = light.sample_li(&hit, &Point2f::new(0.5, 0.5));
        assert_eq!(li.pdf, 1.0);
        assert!(approx_eq!(Float, li.value[0], 2.0));
        assert!(approx_eq!(Float, li.wi.z, 1.0));
        assert!(li.visibility.is_some());
        assert!(light.is_delta_light());
        assert_eq!(light.pdf_li(&hit, &li.wi), 0.0);
    }

    #[test]
    fn emitted_rays_start_at_light() {
        let light = PointLight::new(Point3f::new(1.0, 2.0, 3.0), MediumInterface::default(), Spectrum::ONE);
        let le = light.sample_le(&Point2f::new(0.3, 0.7), &Point2f::new(0.1, 0.1), 0.25);
        assert_eq!(le.ray.o, light.p_light);
        assert_eq!(le.ray.time, 0.25);
        assert!(approx_eq!(Float, le.pdf_dir, INV_FOUR_PI));
        assert!(approx_eq!(Float, light.power()[1], FOUR_PI));
    }
}
