//! Perspective Camera

use crate::LookAt;
use render_core::camera::*;
use render_core::film::*;
use render_core::geometry::*;
use render_core::interaction::*;
use render_core::light::*;
use render_core::medium::*;
use render_core::paramset::*;
use render_core::pbrt::*;
use render_core::sampling::*;
use render_core::spectrum::*;

/// Perspective camera with an optional thin lens.
pub struct PerspectiveCamera {
    /// Common camera parameters.
    pub data: CameraData,

    /// Camera to world frame.
    pub frame: LookAt,

    /// Screen window on the z = 1 plane before scaling by the field of view.
    pub screen_window: Bounds2f,

    /// `tan(fov / 2)`.
    pub tan_half_fov: Float,

    /// Radius of camera lens.
    pub lens_radius: Float,

    /// Distance to the plane of focus.
    pub focal_distance: Float,

    /// Differential change in camera space position for a one pixel step in
    /// raster x on the z = 1 plane.
    pub dx_camera: Vector3f,

    /// Differential change for a one pixel step in raster y.
    pub dy_camera: Vector3f,

    /// Area covered by the image plane bounds at z=1.
    pub a: Float,
}

impl PerspectiveCamera {
    /// Create a new perspective camera.
    ///
    /// * `frame`          - Camera to world frame.
    /// * `screen_window`  - Bounds of screen space.
    /// * `shutter_open`   - Time when shutter is open.
    /// * `shutter_close`  - Time when shutter is closed.
    /// * `lens_radius`    - Radius of camera lens.
    /// * `focal_distance` - Focal distance.
    /// * `fov`            - The field-of-view angle in degrees.
    /// * `film`           - The film to capture the rendered image.
    /// * `medium`         - Scattering medium the camera lies in.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        frame: LookAt,
        screen_window: Bounds2f,
        shutter_open: Float,
        shutter_close: Float,
        lens_radius: Float,
        focal_distance: Float,
        fov: Float,
        film: Film,
        medium: Option<ArcMedium>,
    ) -> Self {
        let res = film.full_resolution;
        let data = CameraData::new(shutter_open, shutter_close, film, medium);
        let tan_half_fov = (radians(fov) / 2.0).tan();

        let mut camera = Self {
            data,
            frame,
            screen_window,
            tan_half_fov,
            lens_radius,
            focal_distance,
            dx_camera: Vector3f::ZERO,
            dy_camera: Vector3f::ZERO,
            a: 0.0,
        };

        // Compute differential changes in origin for perspective camera rays.
        let p0 = camera.raster_to_camera(&Point2f::new(0.0, 0.0));
        camera.dx_camera = camera.raster_to_camera(&Point2f::new(1.0, 0.0)) - p0;
        camera.dy_camera = camera.raster_to_camera(&Point2f::new(0.0, 1.0)) - p0;

        // Compute the image plane bounds at z=1 for perspective camera.
        let p_max = camera.raster_to_camera(&Point2f::new(res.x as Float, res.y as Float));
        camera.a = abs((p_max.x - p0.x) * (p_max.y - p0.y));

        camera
    }

    /// Maps a raster position to the camera space point on the z = 1 plane.
    /// Raster y grows downwards while camera y points up.
    ///
    /// * `p_raster` - Raster position.
    pub fn raster_to_camera(&self, p_raster: &Point2f) -> Vector3f {
        let res = self.data.film.full_resolution;
        let sw = &self.screen_window;
        let sx = sw.p_min.x + p_raster.x / res.x as Float * (sw.p_max.x - sw.p_min.x);
        let sy = sw.p_max.y - p_raster.y / res.y as Float * (sw.p_max.y - sw.p_min.y);
        Vector3f::new(sx * self.tan_half_fov, sy * self.tan_half_fov, 1.0)
    }

    /// Maps a camera space point with `z > 0` to its raster position.
    ///
    /// * `p_camera` - Camera space point.
    pub fn camera_to_raster(&self, p_camera: &Point3f) -> Point2f {
        let res = self.data.film.full_resolution;
        let sw = &self.screen_window;
        let sx = p_camera.x / (p_camera.z * self.tan_half_fov);
        let sy = p_camera.y / (p_camera.z * self.tan_half_fov);
        Point2f::new(
            (sx - sw.p_min.x) / (sw.p_max.x - sw.p_min.x) * res.x as Float,
            (sw.p_max.y - sy) / (sw.p_max.y - sw.p_min.y) * res.y as Float,
        )
    }

    /// Returns the camera space ray through the lens for a film position.
    fn camera_space_ray(&self, sample: &CameraSample, p_camera: &Vector3f) -> Ray {
        let mut ray = Ray::new(
            Point3f::ZERO,
            p_camera.normalize(),
            INFINITY,
            lerp(sample.time, self.data.shutter_open, self.data.shutter_close),
            self.data.medium.clone(),
        );

        // Modify ray for depth of field.
        if self.lens_radius > 0.0 {
            // Sample point on lens.
            let p_lens = self.lens_radius * concentric_sample_disk(&sample.p_lens);

            // Compute point on plane of focus.
            let ft = self.focal_distance / ray.d.z;
            let p_focus = ray.at(ft);

            // Update ray for effect of lens.
            ray.o = Point3f::new(p_lens.x, p_lens.y, 0.0);
            ray.d = (p_focus - ray.o).normalize();
        }
        ray
    }

    /// Returns the raster position where a world space ray leaving the lens
    /// lands on the film along with `cos(theta)` to the viewing direction.
    /// Returns `None` for rays pointing away or missing the film.
    fn raster_position(&self, ray: &Ray) -> Option<(Point2f, Float)> {
        let cos_theta = ray.d.dot(&self.frame.forward);
        if cos_theta <= 0.0 {
            return None;
        }

        // Map ray (p, w) onto the raster grid.
        let t = if self.lens_radius > 0.0 { self.focal_distance } else { 1.0 } / cos_theta;
        let p_focus = self.frame.point_to_camera(&ray.at(t));
        let p_raster = self.camera_to_raster(&p_focus);

        // Return `None` for out of bounds points.
        let sample_bounds = self.data.film.get_sample_bounds();
        if p_raster.x < sample_bounds.p_min.x as Float
            || p_raster.x >= sample_bounds.p_max.x as Float
            || p_raster.y < sample_bounds.p_min.y as Float
            || p_raster.y >= sample_bounds.p_max.y as Float
        {
            return None;
        }
        Some((p_raster, cos_theta))
    }

    fn lens_area(&self) -> Float {
        if self.lens_radius != 0.0 {
            PI * self.lens_radius * self.lens_radius
        } else {
            1.0
        }
    }
}

impl Camera for PerspectiveCamera {
    fn get_data(&self) -> &CameraData {
        &self.data
    }

    fn generate_ray(&self, sample: &CameraSample) -> (Ray, Float) {
        let p_camera = self.raster_to_camera(&sample.p_film);
        let ray = self.camera_space_ray(sample, &p_camera);
        (self.frame.ray_to_world(&ray), 1.0)
    }

    fn generate_ray_differential(&self, sample: &CameraSample) -> (Ray, Float) {
        let p_camera = self.raster_to_camera(&sample.p_film);
        let mut ray = self.camera_space_ray(sample, &p_camera);

        // Compute ray differentials for perspective camera.
        let rd = if self.lens_radius > 0.0 {
            // Compute perspective camera ray differentials accounting for lens.
            let p_lens = self.lens_radius * concentric_sample_disk(&sample.p_lens);
            let origin = Point3f::new(p_lens.x, p_lens.y, 0.0);

            let dx = (p_camera + self.dx_camera).normalize();
            let p_focus = Point3f::ZERO + dx * (self.focal_distance / dx.z);
            let rx_direction = (p_focus - origin).normalize();

            let dy = (p_camera + self.dy_camera).normalize();
            let p_focus = Point3f::ZERO + dy * (self.focal_distance / dy.z);
            let ry_direction = (p_focus - origin).normalize();

            RayDifferential {
                rx_origin: origin,
                ry_origin: origin,
                rx_direction,
                ry_direction,
            }
        } else {
            RayDifferential {
                rx_origin: ray.o,
                ry_origin: ray.o,
                rx_direction: (p_camera + self.dx_camera).normalize(),
                ry_direction: (p_camera + self.dy_camera).normalize(),
            }
        };
        ray.differentials = Some(rd);

        (self.frame.ray_to_world(&ray), 1.0)
    }

    fn we(&self, ray: &Ray) -> (Spectrum, Option<Point2f>) {
        match self.raster_position(ray) {
            Some((p_raster, cos_theta)) => {
                // Return importance for point on image plane.
                let cos2_theta = cos_theta * cos_theta;
                let we = 1.0 / (self.a * self.lens_area() * cos2_theta * cos2_theta);
                (Spectrum::new(we), Some(p_raster))
            }
            None => (Spectrum::ZERO, None),
        }
    }

    fn pdf_we(&self, ray: &Ray) -> Pdf {
        match self.raster_position(ray) {
            Some((_, cos_theta)) => Pdf::new(
                1.0 / self.lens_area(),
                1.0 / (self.a * cos_theta * cos_theta * cos_theta),
            ),
            None => Pdf::new(0.0, 0.0),
        }
    }

    fn sample_wi(&self, hit: &Hit, u: &Point2f) -> Option<CameraWi> {
        // Uniformly sample a lens interaction `lens_intr`.
        let p_lens = self.lens_radius * concentric_sample_disk(u);
        let p_lens_world = self.frame.point_to_world(&Point3f::new(p_lens.x, p_lens.y, 0.0));
        let n = Normal3f::from(self.frame.forward);
        let lens_intr = Hit::new(
            p_lens_world,
            hit.time,
            Vector3f::ZERO,
            Vector3f::ZERO,
            n,
            MediumInterface::from(self.data.medium.clone()),
        );

        // Populate arguments and compute the importance value.
        let wi = lens_intr.p - hit.p;
        let dist = wi.length();
        if dist == 0.0 {
            return None;
        }
        let wi = wi / dist;

        // Compute PDF for importance arriving at `hit`.
        let pdf = (dist * dist) / (n.abs_dot(&wi) * self.lens_area());
        if !pdf.is_finite() || pdf == 0.0 {
            return None;
        }

        let ray = lens_intr.spawn_ray(&(-wi));
        let (value, p_raster) = self.we(&ray);
        let p_raster = p_raster?;
        Some(CameraWi {
            value,
            wi,
            pdf,
            p_raster,
            vis: VisibilityTester::new(hit.clone(), lens_intr),
        })
    }
}

impl From<(&ParamSet, &LookAt, Film, Option<ArcMedium>)> for PerspectiveCamera {
    /// Create a `PerspectiveCamera` from given parameter set, camera frame,
    /// film and medium.
    ///
    /// * `p` - A tuple containing parameter set, camera frame, film and
    ///         medium.
    fn from(p: (&ParamSet, &LookAt, Film, Option<ArcMedium>)) -> Self {
        let (params, frame, film, medium) = p;

        let shutter_open = params.find_one_float("shutteropen", 0.0);
        let shutter_close = params.find_one_float("shutterclose", 1.0);
        let lens_radius = params.find_one_float("lensradius", 0.0);
        let focal_distance = params.find_one_float("focaldistance", 1e6);

        let frame_aspect = params.find_one_float(
            "frameaspectratio",
            film.full_resolution.x as Float / film.full_resolution.y as Float,
        );
        let mut screen = if frame_aspect > 1.0 {
            Bounds2f::new(Point2f::new(-frame_aspect, -1.0), Point2f::new(frame_aspect, 1.0))
        } else {
            Bounds2f::new(
                Point2f::new(-1.0, -1.0 / frame_aspect),
                Point2f::new(1.0, 1.0 / frame_aspect),
            )
        };

        let sw = params.find_float("screenwindow");
        if !sw.is_empty() {
            if sw.len() == 4 {
                screen.p_min.x = sw[0];
                screen.p_max.x = sw[1];
                screen.p_min.y = sw[2];
                screen.p_max.y = sw[3];
            } else {
                error!("'screenwindow' should have four values");
            }
        }

        let mut fov = params.find_one_float("fov", 90.0);
        let half_fov = params.find_one_float("halffov", -1.0);
        if half_fov > 0.0 {
            fov = 2.0 * half_fov;
        }

        Self::new(
            *frame,
            screen,
            shutter_open,
            shutter_close,
            lens_radius,
            focal_distance,
            fov,
            film,
            medium,
        )
    }
}

// ---- Tests ----

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;
    use render_core::filter::*;
    use std::sync::Arc;

    struct UnitBox(FilterData);

    impl Filter for UnitBox {
        fn get_data(&self) -> &FilterData {
            &self.0
        }

        fn evaluate(&self, _p: &Point2f) -> Float {
            1.0
        }
    }

    fn film(w: Int, h: Int) -> Film {
        Film::new(
            &Point2i::new(w, h),
            &Bounds2f::new(Point2f::new(0.0, 0.0), Point2f::new(1.0, 1.0)),
            Arc::new(UnitBox(FilterData::new(Vector2f::new(0.5, 0.5)))),
            35.0,
            "test.png",
            1.0,
            INFINITY,
        )
    }

    fn camera(lens_radius: Float) -> PerspectiveCamera {
        let frame = LookAt::new(
            Point3f::new(0.0, 0.0, -5.0),
            Point3f::new(0.0, 0.0, 0.0),
            Vector3f::new(0.0, 1.0, 0.0),
        )
        .unwrap();
        let mut params = ParamSet::new();
        params.add_float("fov", &[60.0]);
        params.add_float("lensradius", &[lens_radius]);
        params.add_float("focaldistance", &[5.0]);
        PerspectiveCamera::from((&params, &frame, film(32, 16), None))
    }

    #[test]
    fn center_ray_looks_forward() {
        let camera = camera(0.0);
        let sample = CameraSample::new(Point2f::new(16.0, 8.0), Point2f::new(0.5, 0.5), 0.5);
        let (ray, weight) = camera.generate_ray(&sample);
        assert_eq!(weight, 1.0);
        assert!(approx_eq!(Float, ray.d.z, 1.0, epsilon = 1e-6));
        assert_eq!(ray.o, Point3f::new(0.0, 0.0, -5.0));
        assert!(approx_eq!(Float, ray.time, 0.5));
    }

    #[test]
    fn raster_top_maps_to_camera_up() {
        let camera = camera(0.0);
        let top = camera.raster_to_camera(&Point2f::new(16.0, 0.0));
        assert!(top.y > 0.0);
        let right = camera.raster_to_camera(&Point2f::new(32.0, 8.0));
        assert!(right.x > 0.0);
    }

    #[test]
    fn we_recovers_raster_position() {
        for lens_radius in [0.0, 0.1] {
            let camera = camera(lens_radius);
            let sample = CameraSample::new(Point2f::new(7.25, 3.5), Point2f::new(0.3, 0.8), 0.0);
            let (ray, _) = camera.generate_ray(&sample);
            let (we, p_raster) = camera.we(&ray);
            let p_raster = p_raster.unwrap();
            assert!(!we.is_black());
            assert!(approx_eq!(Float, p_raster.x, 7.25, epsilon = 1e-3));
            assert!(approx_eq!(Float, p_raster.y, 3.5, epsilon = 1e-3));
        }
    }

    #[test]
    fn rays_behind_the_camera_carry_no_importance() {
        let camera = camera(0.0);
        let ray = Ray::new(
            Point3f::new(0.0, 0.0, -5.0),
            Vector3f::new(0.0, 0.0, -1.0),
            INFINITY,
            0.0,
            None,
        );
        assert!(camera.we(&ray).0.is_black());
        let pdf = camera.pdf_we(&ray);
        assert_eq!(pdf.pdf_pos, 0.0);
        assert_eq!(pdf.pdf_dir, 0.0);
    }

    #[test]
    fn importance_integrates_over_film() {
        // For a pinhole, We * cos(theta) integrated over the solid angle
        // subtended by the film is 1: W = 1 / (A cos^4) and
        // dw = cos^3 dA on the z = 1 plane.
        let camera = camera(0.0);
        let n = 64;
        let mut sum = 0.0;
        for j in 0..n {
            for i in 0..n {
                let p_film = Point2f::new(
                    (i as Float + 0.5) / n as Float * 32.0,
                    (j as Float + 0.5) / n as Float * 16.0,
                );
                let (ray, _) = camera.generate_ray(&CameraSample::new(p_film, Point2f::default(), 0.0));
                let cos_theta = ray.d.z;
                let (we, _) = camera.we(&ray);
                sum += we[0] * cos_theta * cos_theta * cos_theta * cos_theta * camera.a / (n * n) as Float;
            }
        }
        assert!(approx_eq!(Float, sum, 1.0, epsilon = 1e-3));
    }

    #[test]
    fn sample_wi_sees_points_in_view() {
        let camera = camera(0.0);
        let hit = Hit::new_minimal(Point3f::new(0.2, -0.1, 3.0), 0.0, MediumInterface::default());
        let cw = camera.sample_wi(&hit, &Point2f::new(0.5, 0.5)).unwrap();
        assert!(cw.pdf > 0.0);
        assert!(cw.wi.z < 0.0);
        assert!(cw.p_raster.x > 16.0);
        assert!(cw.p_raster.y > 8.0);

        let behind = Hit::new_minimal(Point3f::new(0.0, 0.0, -8.0), 0.0, MediumInterface::default());
        assert!(camera.sample_wi(&behind, &Point2f::new(0.5, 0.5)).is_none());
    }
}
