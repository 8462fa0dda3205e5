//! Diffuse Area Light Source

use render_core::geometry::*;
use render_core::interaction::*;
use render_core::light::*;
use render_core::medium::*;
use render_core::paramset::*;
use render_core::pbrt::*;
use render_core::sampling::*;
use render_core::spectrum::*;

/// Implements a basic area light source with uniform spatial and directional
/// radiance distribution.
#[derive(Clone)]
pub struct DiffuseAreaLight {
    /// Used to trace multiple shadow rays to the light to compute soft shadows.
    pub n_samples: usize,

    /// Participating medium.
    pub medium_interface: MediumInterface,

    /// Emitted radiance.
    pub l_emit: Spectrum,

    /// Shape describing surface of the light source.
    pub shape: ArcShape,

    /// Surface area of the shape.
    pub area: Float,

    /// Indicates whether light source 2-sided.
    pub two_sided: bool,
}

impl DiffuseAreaLight {
    /// Returns a new `DiffuseAreaLight`.
    ///
    /// * `medium_interface` - Participating medium.
    /// * `l_emit`           - Emitted radiance.
    /// * `n_samples`        - Used to trace multiple shadow rays to the light
    ///                        to compute soft shadows. Default to 1.
    /// * `shape`            - Shape describing surface of the light source.
    /// * `two_sided`        - Indicates whether light source 2-sided.
    pub fn new(
        medium_interface: MediumInterface,
        l_emit: Spectrum,
        n_samples: usize,
        shape: ArcShape,
        two_sided: bool,
    ) -> Self {
        let area = shape.area();
        Self {
            medium_interface,
            l_emit,
            n_samples: max(1, n_samples),
            shape,
            area,
            two_sided,
        }
    }
}

impl Light for DiffuseAreaLight {
    fn get_type(&self) -> LightType {
        LightType::AREA_LIGHT
    }

    /// Return the radiance arriving at an interaction point.
    ///
    /// * `hit` - The interaction hit point.
    /// * `u`   - Sample value for Monte Carlo integration.
    fn sample_li(&self, hit: &Hit, u: &Point2f) -> Li {
        let (mut p_shape, pdf) = self.shape.sample_solid_angle(hit, u);
        p_shape.medium_interface = self.medium_interface.clone();
        p_shape.time = hit.time;

        let wi = p_shape.p - hit.p;
        if pdf == 0.0 || wi.length_squared() == 0.0 {
            return Li::default();
        }

        let wi = wi.normalize();
        let value = self.l(&p_shape, &(-wi));
        let visibility = Some(VisibilityTester::new(hit.clone(), p_shape));
        Li::new(wi, pdf, visibility, value)
    }

    fn power(&self) -> Spectrum {
        let sides = if self.two_sided { 2.0 } else { 1.0 };
        self.l_emit * (sides * self.area * PI)
    }

    fn pdf_li(&self, hit: &Hit, wi: &Vector3f) -> Float {
        self.shape.pdf_solid_angle(hit, wi)
    }

    /// Returns a sampled light-carrying ray leaving the light source with a
    /// cosine-weighted direction.
    ///
    /// * `u1`   - Sample values for the position.
    /// * `u2`   - Sample values for the direction.
    /// * `time` - Time to use for the ray.
    fn sample_le(&self, u1: &Point2f, u2: &Point2f, time: Float) -> Le {
        let (mut p_shape, pdf_pos) = self.shape.sample_area(u1);
        p_shape.medium_interface = self.medium_interface.clone();
        p_shape.time = time;
        let n_light = p_shape.n;

        // Sample a cosine-weighted outgoing direction `w` for area light.
        let (w, pdf_dir) = if self.two_sided {
            // Choose a side to sample and then remap u[0] to [0,1] before
            // applying cosine-weighted hemisphere sampling for the chosen side.
            let mut u = *u2;
            let flip = u[0] >= 0.5;
            u.x = if flip {
                min((u[0] - 0.5) * 2.0, ONE_MINUS_EPSILON)
            } else {
                min(u[0] * 2.0, ONE_MINUS_EPSILON)
            };
            let mut w = cosine_sample_hemisphere(&u);
            if flip {
                w.z = -w.z;
            }
            (w, 0.5 * cosine_hemisphere_pdf(abs(w.z)))
        } else {
            let w = cosine_sample_hemisphere(u2);
            (w, cosine_hemisphere_pdf(w.z))
        };

        let n = Vector3f::from(n_light);
        let (v1, v2) = coordinate_system(&n);
        let w = v1 * w.x + v2 * w.y + n * w.z;

        let value = self.l(&p_shape, &w);
        let ray = p_shape.spawn_ray(&w);
        Le::new(ray, n_light, pdf_pos, pdf_dir, value)
    }

    fn pdf_le(&self, ray: &Ray, n_light: &Normal3f) -> Pdf {
        let cos = n_light.dot(&ray.d.normalize());
        let pdf_dir = if self.two_sided {
            0.5 * cosine_hemisphere_pdf(abs(cos))
        } else {
            cosine_hemisphere_pdf(cos)
        };
        Pdf::new(1.0 / self.area, pdf_dir)
    }

    /// Returns emitted radiance based on `two_sided` flag.
    ///
    /// * `hit` - Point on the light surface.
    /// * `w`   - Outgoing direction.
    fn l(&self, hit: &Hit, w: &Vector3f) -> Spectrum {
        if self.two_sided || hit.n.dot(w) > 0.0 {
            self.l_emit
        } else {
            Spectrum::ZERO
        }
    }

    fn get_num_samples(&self) -> usize {
        self.n_samples
    }
}

impl From<(&ParamSet, Option<ArcMedium>, ArcShape)> for DiffuseAreaLight {
    /// Create a `DiffuseAreaLight` from given parameter set, medium and shape.
    ///
    /// * `p` - A tuple containing the parameter set, medium and shape.
    fn from(p: (&ParamSet, Option<ArcMedium>, ArcShape)) -> Self {
        let (params, medium, shape) = p;

        let l = params.find_one_spectrum("L", Spectrum::ONE);
        let sc = params.find_one_spectrum("scale", Spectrum::ONE);
        let two_sided = params.find_one_bool("twosided", false);
        let n_samples = params.find_one_int("samples", params.find_one_int("nsamples", 1));
        if n_samples < 1 {
            warn!("Area light sample count {} raised to 1.", n_samples);
        }

        Self::new(
            MediumInterface::from(medium),
            l * sc,
            max(1, n_samples) as usize,
            shape,
            two_sided,
        )
    }
}

// ---- Tests ----

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;
    use proptest::prelude::*;
    use shapes::Disk;
    use std::sync::Arc;

    /// A unit-radius disk at height 2 facing down.
    fn ceiling(two_sided: bool) -> DiffuseAreaLight {
        let disk = Disk::new(Point3f::new(0.0, 0.0, 2.0), Vector3f::new(0.0, 0.0, -1.0), 1.0, false);
        DiffuseAreaLight::new(MediumInterface::default(), Spectrum::new(2.0), 4, Arc::new(disk), two_sided)
    }

    #[test]
    fn one_sided_emission_faces_normal() {
        let light = ceiling(false);
        let hit = Hit::new(
            Point3f::new(0.0, 0.0, 2.0),
            0.0,
            Vector3f::ZERO,
            Vector3f::ZERO,
            Normal3f::new(0.0, 0.0, -1.0),
            MediumInterface::default(),
        );
        assert_eq!(light.l(&hit, &Vector3f::new(0.0, 0.0, -1.0)), Spectrum::new(2.0));
        assert!(light.l(&hit, &Vector3f::new(0.0, 0.0, 1.0)).is_black());
        assert!(ceiling(true).l(&hit, &Vector3f::new(0.0, 0.0, 1.0)) == Spectrum::new(2.0));
        assert_eq!(light.get_num_samples(), 4);
    }

    #[test]
    fn power_scales_with_area_and_sides() {
        assert!(approx_eq!(Float, ceiling(false).power()[0], 2.0 * PI * PI, epsilon = 1e-4));
        assert!(approx_eq!(Float, ceiling(true).power()[0], 4.0 * PI * PI, epsilon = 1e-4));
    }

    proptest! {
        #[test]
        fn light_sample_pdf_matches_pdf_li(u0 in 0.01..0.99 as Float, u1 in 0.01..0.99 as Float) {
            let light = ceiling(false);
            let hit = Hit::new(
                Point3f::new(0.2, -0.1, 0.0),
                0.0,
                Vector3f::ZERO,
                Vector3f::ZERO,
                Normal3f::new(0.0, 0.0, 1.0),
                MediumInterface::default(),
            );
            let li = light.sample_li(&hit, &Point2f::new(u0, u1));
            prop_assume!(li.pdf > 0.0);
            let pdf = light.pdf_li(&hit, &li.wi);
            prop_assert!((pdf - li.pdf).abs() <= 1e-2 * li.pdf);
            prop_assert_eq!(li.value, Spectrum::new(2.0));
        }

        #[test]
        fn emitted_rays_leave_front_side(u in 0.0..1.0 as Float, v in 0.0..1.0 as Float) {
            let light = ceiling(false);
            let le = light.sample_le(&Point2f::new(u, v), &Point2f::new(v, u), 0.0);
            prop_assume!(le.pdf_dir > 0.0);
            prop_assert!(le.ray.d.z < 0.0);
            let pdf = light.pdf_le(&le.ray, &le.n_light);
            prop_assert!((pdf.pdf_dir - le.pdf_dir).abs() <= 1e-3 * le.pdf_dir.max(1.0));
            prop_assert!((pdf.pdf_pos - 1.0 / PI).abs() < 1e-5);
        }
    }
}
