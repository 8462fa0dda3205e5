//! Spot Light Source

use render_core::geometry::*;
use render_core::interaction::*;
use render_core::light::*;
use render_core::medium::*;
use render_core::paramset::*;
use render_core::pbrt::*;
use render_core::sampling::*;
use render_core::spectrum::*;

/// Implements an spot light source that emits light in a cone of directions
/// from its position.
#[derive(Clone)]
pub struct SpotLight {
    /// Participating medium.
    pub medium_interface: MediumInterface,

    /// Position.
    pub p_light: Point3f,

    /// Intensity.
    pub intensity: Spectrum,

    /// Cone axis and the two directions perpendicular to it.
    axis: Vector3f,
    axis_u: Vector3f,
    axis_v: Vector3f,

    /// Cosine of overall angular width of the cone.
    cos_total_width: Float,

    /// Cosine of angle at which falloff starts.
    cos_falloff_start: Float,
}

impl SpotLight {
    /// Returns a new `SpotLight`.
    ///
    /// * `from`             - Position.
    /// * `to`               - Point the cone axis passes through.
    /// * `medium_interface` - Participating medium.
    /// * `intensity`        - Intensity.
    /// * `total_width`      - Overall angular width of the cone in degrees.
    /// * `falloff_start`    - Angle at which fallof starts in degrees.
    pub fn new(
        from: Point3f,
        to: Point3f,
        medium_interface: MediumInterface,
        intensity: Spectrum,
        total_width: Float,
        falloff_start: Float,
    ) -> Self {
        let axis = (to - from).normalize();
        let (axis_u, axis_v) = coordinate_system(&axis);
        Self {
            medium_interface,
            p_light: from,
            intensity,
            axis,
            axis_u,
            axis_v,
            cos_total_width: radians(total_width).cos(),
            cos_falloff_start: radians(falloff_start).cos(),
        }
    }

    /// Returns the distribution of light accounting for the spotlight cone.
    ///
    /// * `w` - Direction leaving the light.
    fn falloff(&self, w: &Vector3f) -> Float {
        let cos_theta = w.normalize().dot(&self.axis);
        if cos_theta < self.cos_total_width {
            return 0.0;
        }
        if cos_theta >= self.cos_falloff_start {
            return 1.0;
        }

        // Compute falloff inside spotlight cone.
        let delta = (cos_theta - self.cos_total_width) / (self.cos_falloff_start - self.cos_total_width);
        (delta * delta) * (delta * delta)
    }
}

impl Light for SpotLight {
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

        let value = self.intensity * self.falloff(&-wi) / self.p_light.distance_squared(&hit.p);
        Li::new(wi, 1.0, Some(vis), value)
    }

    fn power(&self) -> Spectrum {
        self.intensity * TWO_PI * (1.0 - 0.5 * (self.cos_falloff_start + self.cos_total_width))
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
        let w = uniform_sample_cone(u1, self.cos_total_width, &self.axis_u, &self.axis_v, &self.axis);
        let ray = Ray::new(self.p_light, w, INFINITY, time, self.medium_interface.inside.clone());
        Le::new(
            ray,
            Normal3f::from(w),
            1.0,
            uniform_cone_pdf(self.cos_total_width),
            self.intensity * self.falloff(&w),
        )
    }

    fn pdf_le(&self, ray: &Ray, _n_light: &Normal3f) -> Pdf {
        let pdf_dir = if ray.d.normalize().dot(&self.axis) >= self.cos_total_width {
            uniform_cone_pdf(self.cos_total_width)
        } else {
            0.0
        };
        Pdf::new(0.0, pdf_dir)
    }
}

impl From<(&ParamSet, Option<ArcMedium>)> for SpotLight {
    /// Create a `SpotLight` from given parameter set and medium.
    ///
    /// * `p` - A tuple containing the parameter set and medium.
    fn from(p: (&ParamSet, Option<ArcMedium>)) -> Self {
        let (params, medium) = p;

        let intensity = params.find_one_spectrum("I", Spectrum::ONE);
        let sc = params.find_one_spectrum("scale", Spectrum::ONE);
        let cone_angle = params.find_one_float("coneangle", 30.0);
        let cone_delta = params.find_one_float("conedeltaangle", 5.0);
        let from = params.find_one_point3f("from", Point3f::ZERO);
        let mut to = params.find_one_point3f("to", Point3f::new(0.0, 0.0, 1.0));
        if from == to {
            error!("Spotlight 'from' and 'to' coincide; pointing down +z.");
            to = from + Vector3f::new(0.0, 0.0, 1.0);
        }

        Self::new(
            from,
            to,
            MediumInterface::from(medium),
            intensity * sc,
            cone_angle,
            cone_angle - cone_delta,
        )
    }
}

// ---- Tests ----

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;
    use proptest::prelude::*;

    fn spot() -> SpotLight {
        SpotLight::new(
            Point3f::new(0.0, 0.0, 4.0),
            Point3f::ZERO,
            MediumInterface::default(),
            Spectrum::new(16.0),
            30.0,
            20.0,
        )
    }

    #[test]
    fn full_intensity_on_axis_and_dark_outside() {
        let light = spot();
        let on_axis = Hit::new_minimal(Point3f::ZERO, 0.0, MediumInterface::default());
        let li = light.sample_li(&on_axis, &Point2f::new(0.5, 0.5));
        assert!(approx_eq!(Float, li.value[0], 1.0));

        let outside = Hit::new_minimal(Point3f::new(4.0, 0.0, 0.0), 0.0, MediumInterface::default());
        assert!(light.sample_li(&outside, &Point2f::new(0.5, 0.5)).value.is_black());
    }

    #[test]
    fn falloff_is_between_zero_and_one_in_transition() {
        let light = spot();
        let angle = radians(25.0);
        let w = Vector3f::new(angle.sin(), 0.0, -angle.cos());
        let f = light.falloff(&w);
        assert!(f > 0.0 && f < 1.0);
    }

    proptest! {
        #[test]
        fn emitted_rays_stay_inside_cone(u0 in 0.0..1.0 as Float, u1 in 0.0..1.0 as Float) {
            let light = spot();
            let le = light.sample_le(&Point2f::new(u0, u1), &Point2f::new(0.5, 0.5), 0.0);
            prop_assert!(le.ray.d.dot(&light.axis) >= light.cos_total_width - 1e-5);
            prop_assert!(le.pdf_dir > 0.0);
            prop_assert!(light.pdf_le(&le.ray, &le.n_light).pdf_dir > 0.0);
        }
    }
}
