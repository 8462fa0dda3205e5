//! Camera

use crate::film::*;
use crate::geometry::*;
use crate::interaction::*;
use crate::light::*;
use crate::medium::*;
use crate::pbrt::*;
use crate::spectrum::*;
use std::fmt;
use std::sync::Arc;

/// Camera trait provides common behavior.
pub trait Camera: Send + Sync {
    /// Returns the common camera data.
    fn get_data(&self) -> &CameraData;

    /// Returns the film.
    fn film(&self) -> &Film {
        &self.get_data().film
    }

    /// Returns the medium the camera lies in.
    fn medium(&self) -> Option<ArcMedium> {
        self.get_data().medium.clone()
    }

    /// Returns a ray corresponding to a given sample. It also returns, a floating
    /// point value that affects how much the radiance arriving at the film plane
    /// will contribute to final image.
    ///
    /// * `sample` - The sample.
    fn generate_ray(&self, sample: &CameraSample) -> (Ray, Float);

    /// Returns a main ray and rays shifted one pixel in x and y directions on
    /// the film plane for corresponding to a given sample. It also returns a
    /// floating point value that affects how much the radiance arriving at the
    /// film plane will contribute to final image.
    ///
    /// * `sample` - The sample.
    fn generate_ray_differential(&self, sample: &CameraSample) -> (Ray, Float) {
        let (mut ray, wt) = self.generate_ray(sample);
        if wt == 0.0 {
            return (ray, 0.0);
        }

        // Find camera ray after shifting a fraction of a pixel in the x-direction.
        let mut rd = RayDifferential::default();
        let mut wtx = 0.0;
        for eps in [0.05, -0.05] {
            let mut sshift = *sample;
            sshift.p_film.x += eps;

            let (rx, w) = self.generate_ray(&sshift);
            rd.rx_origin = ray.o + (rx.o - ray.o) / eps;
            rd.rx_direction = ray.d + (rx.d - ray.d) / eps;

            wtx = w;
            if wtx != 0.0 {
                break;
            }
        }
        if wtx == 0.0 {
            return (ray, 0.0);
        }

        // Find camera ray after shifting a fraction of a pixel in the y-direction.
        let mut wty = 0.0;
        for eps in [0.05, -0.05] {
            let mut sshift = *sample;
            sshift.p_film.y += eps;

            let (ry, w) = self.generate_ray(&sshift);
            rd.ry_origin = ray.o + (ry.o - ray.o) / eps;
            rd.ry_direction = ray.d + (ry.d - ray.d) / eps;

            wty = w;
            if wty != 0.0 {
                break;
            }
        }
        if wty == 0.0 {
            return (ray, 0.0);
        }

        ray.differentials = Some(rd);
        (ray, wt)
    }

    /// Evaluate the importance emitted from the point on the camera in a
    /// direction. Also returns the raster position associated with the ray
    /// when it lands on the film.
    ///
    /// * `ray` - The ray.
    fn we(&self, ray: &Ray) -> (Spectrum, Option<Point2f>);

    /// Return the spatial and directional PDFs for sampling a particular ray
    /// leaving the camera.
    ///
    /// * `ray` - The ray.
    fn pdf_we(&self, ray: &Ray) -> Pdf;

    /// Samples a point on the lens as seen from a reference point and
    /// returns the importance arriving there. Returns `None` when the point
    /// cannot be seen by the camera.
    ///
    /// * `hit` - The reference point.
    /// * `u`   - Used to sample point on the lens.
    fn sample_wi(&self, hit: &Hit, u: &Point2f) -> Option<CameraWi>;
}

/// Atomic reference counted `Camera`.
pub type ArcCamera = Arc<dyn Camera>;

/// Stores all of the sample values needed to specify a camera ray.
#[derive(Copy, Clone, Debug, Default)]
pub struct CameraSample {
    /// Point on the film to which the generated ray carries radiance.
    pub p_film: Point2f,

    /// The point on the lens the ray passes through.
    pub p_lens: Point2f,

    /// Time at which the ray should sample the scene.
    pub time: Float,
}

impl CameraSample {
    /// Create a new `CameraSample`.
    ///
    /// * `p_film` - Point on the film to which the generated ray carries radiance.
    /// * `p_lens` - The point on the lens the ray passes through.
    /// * `time`   - Time at which the ray should sample the scene.
    pub fn new(p_film: Point2f, p_lens: Point2f, time: Float) -> Self {
        Self { p_film, p_lens, time }
    }
}

impl fmt::Display for CameraSample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CameraSample<p_film: ({}, {}), p_lens: ({}, {}), time: {}>",
            self.p_film.x, self.p_film.y, self.p_lens.x, self.p_lens.y, self.time
        )
    }
}

/// Result of `Camera::sample_wi()`.
#[derive(Clone)]
pub struct CameraWi {
    /// Importance arriving at the reference point.
    pub value: Spectrum,

    /// Direction from the reference point to the lens.
    pub wi: Vector3f,

    /// PDF with respect to solid angle at the reference point.
    pub pdf: Float,

    /// Raster position of the sample.
    pub p_raster: Point2f,

    /// Visibility tester between the reference point and the lens.
    pub vis: VisibilityTester,
}

/// Stores common camera parameters.
pub struct CameraData {
    /// Time when shutter is open.
    pub shutter_open: Float,

    /// Time when shutter is closed.
    pub shutter_close: Float,

    /// The film to capture the rendered image.
    pub film: Film,

    /// Scattering medium the camera lies in.
    pub medium: Option<ArcMedium>,
}

impl CameraData {
    /// Creates a new instance of `CameraData`.
    ///
    /// * `shutter_open`  - Time when shutter is open.
    /// * `shutter_close` - Time when shutter is closed.
    /// * `film`          - The film to capture the rendered image.
    /// * `medium`        - Scattering medium the camera lies in.
    pub fn new(shutter_open: Float, shutter_close: Float, film: Film, medium: Option<ArcMedium>) -> Self {
        if shutter_close < shutter_open {
            warn!(
                "Shutter close time {} < shutter open {}. Swapping them.",
                shutter_close, shutter_open
            );
            Self {
                shutter_open: shutter_close,
                shutter_close: shutter_open,
                film,
                medium,
            }
        } else {
            Self {
                shutter_open,
                shutter_close,
                film,
                medium,
            }
        }
    }
}
