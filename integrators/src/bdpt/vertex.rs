//! BDPT Vertex

use super::common::*;
use render_core::camera::*;
use render_core::geometry::*;
use render_core::interaction::*;
use render_core::light::*;
use render_core::material::*;
use render_core::medium::MediumInterface;
use render_core::pbrt::*;
use render_core::reflection::*;
use render_core::sampling::*;
use render_core::scene::*;
use render_core::spectrum::*;
use std::collections::HashMap;
use std::fmt;

/// Payload of a path vertex.
#[derive(Clone)]
pub(crate) enum VertexKind<'a> {
    /// Camera endpoint; either the origin of a camera subpath or a point
    /// sampled on the lens.
    Camera { hit: Hit, camera: &'a dyn Camera },

    /// Light endpoint. Rays escaping the scene create a light vertex without
    /// a light that stands for all infinite lights.
    Light { hit: Hit, light: Option<ArcLight> },

    /// Scattering on a surface with a BSDF.
    Surface { si: SurfaceInteraction<'a> },

    /// Scattering inside a participating medium.
    Medium { mi: MediumInteraction },
}

/// A vertex of a camera or light subpath.
#[derive(Clone)]
pub(crate) struct Vertex<'a> {
    /// Vertex payload.
    pub kind: VertexKind<'a>,

    /// Product of BSDF/phase values, cosines and inverse densities from the
    /// subpath origin up to this vertex.
    pub beta: Spectrum,

    /// Vertex was sampled from a Dirac delta distribution.
    pub delta: bool,

    /// Probability per unit area of sampling this vertex from its
    /// predecessor.
    pub pdf_fwd: Float,

    /// Probability per unit area of sampling this vertex from its successor
    /// when the path is traced in the opposite direction.
    pub pdf_rev: Float,
}

impl<'a> Vertex<'a> {
    /// Returns a vertex with zero densities.
    fn new(kind: VertexKind<'a>, beta: Spectrum, pdf_fwd: Float) -> Self {
        Self {
            kind,
            beta,
            delta: false,
            pdf_fwd,
            pdf_rev: 0.0,
        }
    }

    /// Create the camera vertex at the origin of a camera ray.
    ///
    /// * `camera` - The camera.
    /// * `ray`    - The camera ray.
    /// * `beta`   - Ray weight.
    pub fn camera_from_ray(camera: &'a dyn Camera, ray: &Ray, beta: Spectrum) -> Self {
        let hit = Hit::new_minimal(ray.o, ray.time, MediumInterface::from(ray.medium()));
        Self::new(VertexKind::Camera { hit, camera }, beta, 0.0)
    }

    /// Create a camera vertex at a sampled lens position.
    ///
    /// * `camera` - The camera.
    /// * `hit`    - Point on the lens.
    /// * `beta`   - Importance divided by the sampling density.
    pub fn camera_from_hit(camera: &'a dyn Camera, hit: Hit, beta: Spectrum) -> Self {
        Self::new(VertexKind::Camera { hit, camera }, beta, 0.0)
    }

    /// Create the light vertex at the origin of a ray leaving a light.
    ///
    /// * `light`   - The light.
    /// * `ray`     - The emitted ray.
    /// * `n_light` - Surface normal at the ray origin.
    /// * `le`      - Emitted radiance.
    /// * `pdf`     - Area density of choosing the light and the origin.
    pub fn light_from_ray(light: ArcLight, ray: &Ray, n_light: Normal3f, le: Spectrum, pdf: Float) -> Self {
        let hit = Hit::new(
            ray.o,
            ray.time,
            Vector3f::ZERO,
            Vector3f::ZERO,
            n_light,
            MediumInterface::from(ray.medium()),
        );
        Self::new(VertexKind::Light { hit, light: Some(light) }, le, pdf)
    }

    /// Create a light vertex at a point sampled on a light.
    ///
    /// * `light` - The light.
    /// * `hit`   - Point on the light.
    /// * `beta`  - Radiance divided by the sampling densities.
    /// * `pdf`   - Area density of the point.
    pub fn light_from_hit(light: ArcLight, hit: Hit, beta: Spectrum, pdf: Float) -> Self {
        Self::new(VertexKind::Light { hit, light: Some(light) }, beta, pdf)
    }

    /// Create the vertex for a ray that left the scene. It lies on the ray at
    /// unit distance and faces back along the ray.
    ///
    /// * `ray`  - The escaping ray.
    /// * `beta` - Path throughput.
    /// * `pdf`  - Solid angle density of the ray direction.
    pub fn escaped(ray: &Ray, beta: Spectrum, pdf: Float) -> Self {
        let hit = Hit::new(
            ray.at(1.0),
            ray.time,
            Vector3f::ZERO,
            Vector3f::ZERO,
            Normal3f::from(-ray.d),
            MediumInterface::from(ray.medium()),
        );
        Self::new(VertexKind::Light { hit, light: None }, beta, pdf)
    }

    /// Create a surface vertex and convert the solid angle density `pdf` at
    /// `prev` to an area density.
    ///
    /// * `si`   - The surface interaction with its BSDF computed.
    /// * `beta` - Path throughput.
    /// * `pdf`  - Solid angle density at `prev`.
    /// * `prev` - The preceding vertex.
    pub fn surface(si: SurfaceInteraction<'a>, beta: Spectrum, pdf: Float, prev: &Vertex<'a>) -> Self {
        let mut v = Self::new(VertexKind::Surface { si }, beta, 0.0);
        v.pdf_fwd = prev.convert_density(pdf, &v);
        v
    }

    /// Create a medium vertex and convert the solid angle density `pdf` at
    /// `prev` to an area density.
    ///
    /// * `mi`   - The medium interaction.
    /// * `beta` - Path throughput.
    /// * `pdf`  - Solid angle density at `prev`.
    /// * `prev` - The preceding vertex.
    pub fn medium(mi: MediumInteraction, beta: Spectrum, pdf: Float, prev: &Vertex<'a>) -> Self {
        let mut v = Self::new(VertexKind::Medium { mi }, beta, 0.0);
        v.pdf_fwd = prev.convert_density(pdf, &v);
        v
    }

    /// Returns the interaction data.
    pub fn hit(&self) -> &Hit {
        match &self.kind {
            VertexKind::Camera { hit, .. } => hit,
            VertexKind::Light { hit, .. } => hit,
            VertexKind::Surface { si } => &si.hit,
            VertexKind::Medium { mi } => &mi.hit,
        }
    }

    /// Returns the vertex position.
    pub fn p(&self) -> Point3f {
        self.hit().p
    }

    /// Returns the time.
    pub fn time(&self) -> Float {
        self.hit().time
    }

    /// Returns the geometric normal; zero for points in media.
    pub fn ng(&self) -> Normal3f {
        self.hit().n
    }

    /// Returns the shading normal.
    pub fn ns(&self) -> Normal3f {
        match &self.kind {
            VertexKind::Surface { si } => si.shading.n,
            _ => self.hit().n,
        }
    }

    /// Returns a snapshot of the densities used for MIS weights.
    pub fn density(&self) -> VertexDensity {
        VertexDensity {
            pdf_fwd: self.pdf_fwd,
            pdf_rev: self.pdf_rev,
            delta: self.delta,
        }
    }

    /// Returns `true` if the vertex has a surface normal.
    pub fn is_on_surface(&self) -> bool {
        !self.ng().is_zero()
    }

    /// Returns the area light of a surface vertex or the light of a light
    /// vertex.
    fn light(&self) -> Option<ArcLight> {
        match &self.kind {
            VertexKind::Light { light, .. } => light.clone(),
            VertexKind::Surface { si } => si.primitive.and_then(|p| p.get_area_light()),
            _ => None,
        }
    }

    /// Evaluates the BSDF or phase function for scattering towards `next`.
    ///
    /// * `next` - The next vertex.
    /// * `mode` - Light transport mode.
    pub fn f(&self, next: &Vertex, mode: TransportMode) -> Spectrum {
        let wi = next.p() - self.p();
        if wi.length_squared() == 0.0 {
            return Spectrum::ZERO;
        }
        let wi = wi.normalize();

        match &self.kind {
            VertexKind::Surface { si } => match si.bsdf {
                Some(bsdf) => {
                    let wo = si.hit.wo;
                    bsdf.f(&wo, &wi, BxDFType::BSDF_ALL) * correct_shading_normal(&si.shading.n, &si.hit.n, &wo, &wi, mode)
                }
                None => Spectrum::ZERO,
            },
            VertexKind::Medium { mi } => Spectrum::new(mi.phase.p(&mi.hit.wo, &wi)),
            _ => {
                debug!("Vertex::f() called on an endpoint");
                Spectrum::ZERO
            }
        }
    }

    /// Returns `true` if a deterministic connection can be made to the
    /// vertex.
    pub fn is_connectible(&self) -> bool {
        match &self.kind {
            VertexKind::Medium { .. } | VertexKind::Camera { .. } => true,
            VertexKind::Light { light, .. } => light
                .as_ref()
                .map_or(true, |l| !l.get_type().contains(LightType::DELTA_DIRECTION_LIGHT)),
            VertexKind::Surface { si } => si.bsdf.map_or(false, |bsdf| {
                bsdf.num_components(
                    BxDFType::BSDF_DIFFUSE
                        | BxDFType::BSDF_GLOSSY
                        | BxDFType::BSDF_REFLECTION
                        | BxDFType::BSDF_TRANSMISSION,
                ) > 0
            }),
        }
    }

    /// Returns `true` if the vertex is a light endpoint or lies on an area
    /// light.
    pub fn is_light(&self) -> bool {
        match &self.kind {
            VertexKind::Light { .. } => true,
            VertexKind::Surface { si } => si.primitive.map_or(false, |p| p.get_area_light().is_some()),
            _ => false,
        }
    }

    /// Returns `true` for light endpoints described by a delta distribution.
    pub fn is_delta_light(&self) -> bool {
        match &self.kind {
            VertexKind::Light { light: Some(light), .. } => light.is_delta_light(),
            _ => false,
        }
    }

    /// Returns `true` for escaped rays and infinitely distant lights.
    pub fn is_infinite_light(&self) -> bool {
        match &self.kind {
            VertexKind::Light { light: None, .. } => true,
            VertexKind::Light { light: Some(light), .. } => light
                .get_type()
                .intersects(LightType::INFINITE_LIGHT | LightType::DELTA_DIRECTION_LIGHT),
            _ => false,
        }
    }

    /// Returns the radiance emitted from the vertex towards `v`.
    ///
    /// * `scene` - The scene.
    /// * `v`     - The receiving vertex.
    pub fn le(&self, scene: &Scene, v: &Vertex) -> Spectrum {
        if !self.is_light() {
            return Spectrum::ZERO;
        }
        let w = v.p() - self.p();
        if w.length_squared() == 0.0 {
            return Spectrum::ZERO;
        }
        let w = w.normalize();

        if self.is_infinite_light() {
            // Sum radiance of all infinite lights along the escaped ray.
            let ray = Ray::new(self.p(), -w, INFINITY, self.time(), None);
            scene.infinite_lights.iter().map(|light| light.le(&ray)).sum()
        } else {
            self.light().map_or(Spectrum::ZERO, |light| light.l(self.hit(), &w))
        }
    }

    /// Converts a solid angle density at this vertex into an area density at
    /// `next`.
    ///
    /// * `pdf`  - Solid angle density.
    /// * `next` - The next vertex.
    pub fn convert_density(&self, pdf: Float, next: &Vertex) -> Float {
        // Infinite lights keep their solid angle density.
        if next.is_infinite_light() {
            return pdf;
        }

        let w = next.p() - self.p();
        let dist2 = w.length_squared();
        if dist2 == 0.0 {
            return 0.0;
        }
        let inv_dist2 = 1.0 / dist2;

        let mut pdf = pdf;
        if next.is_on_surface() {
            pdf *= next.ng().abs_dot(&(w * inv_dist2.sqrt()));
        }
        pdf * inv_dist2
    }

    /// Returns the area density at `next` of sampling it from this vertex
    /// after arriving from `prev`.
    ///
    /// * `scene` - The scene.
    /// * `prev`  - The preceding vertex; only camera vertices have none.
    /// * `next`  - The next vertex.
    pub fn pdf(&self, scene: &Scene, prev: Option<&Vertex>, next: &Vertex) -> Float {
        if let VertexKind::Light { .. } = self.kind {
            return self.pdf_light(scene, next);
        }

        // Compute directions to preceding and next vertex.
        let wn = next.p() - self.p();
        if wn.length_squared() == 0.0 {
            return 0.0;
        }
        let wn = wn.normalize();

        let wp = match prev {
            Some(prev) => {
                let wp = prev.p() - self.p();
                if wp.length_squared() == 0.0 {
                    return 0.0;
                }
                wp.normalize()
            }
            None => {
                debug_assert!(matches!(self.kind, VertexKind::Camera { .. }));
                Vector3f::ZERO
            }
        };

        // Compute directional density depending on the vertex type.
        let pdf = match &self.kind {
            VertexKind::Camera { hit, camera } => camera.pdf_we(&hit.spawn_ray(&wn)).pdf_dir,
            VertexKind::Surface { si } => si.bsdf.map_or(0.0, |bsdf| bsdf.pdf(&wp, &wn, BxDFType::BSDF_ALL)),
            VertexKind::Medium { mi } => mi.phase.p(&wp, &wn),
            VertexKind::Light { .. } => 0.0,
        };

        // Return probability per unit area at vertex `next`.
        self.convert_density(pdf, next)
    }

    /// Returns the area density at `v` of sampling it from a ray leaving
    /// this light vertex.
    ///
    /// * `scene` - The scene.
    /// * `v`     - The receiving vertex.
    pub fn pdf_light(&self, scene: &Scene, v: &Vertex) -> Float {
        let w = v.p() - self.p();
        let dist2 = w.length_squared();
        if dist2 == 0.0 {
            return 0.0;
        }
        let inv_dist2 = 1.0 / dist2;
        let w = w * inv_dist2.sqrt();

        let mut pdf = if self.is_infinite_light() {
            // Planar density over the disk covering the scene.
            let (_center, radius) = scene.world_bound.bounding_sphere();
            1.0 / (PI * radius * radius)
        } else {
            match self.light() {
                Some(light) => {
                    let ray = Ray::new(self.p(), w, INFINITY, self.time(), None);
                    light.pdf_le(&ray, &self.ng()).pdf_dir * inv_dist2
                }
                None => return 0.0,
            }
        };
        if v.is_on_surface() {
            pdf *= v.ng().abs_dot(&w);
        }
        pdf
    }

    /// Returns the density of choosing this vertex as the origin of a light
    /// subpath that continues towards `v`.
    ///
    /// * `scene`       - The scene.
    /// * `v`           - The next vertex.
    /// * `light_distr` - Light selection probabilities.
    /// * `light_index` - Map from light keys to indices in `light_distr`.
    pub fn pdf_light_origin(
        &self,
        scene: &Scene,
        v: &Vertex,
        light_distr: &Distribution1D,
        light_index: &HashMap<usize, usize>,
    ) -> Float {
        let w = v.p() - self.p();
        if w.length_squared() == 0.0 {
            return 0.0;
        }
        let w = w.normalize();

        if self.is_infinite_light() {
            // Density of infinite lights is computed over all of them.
            return infinite_light_density(scene, light_distr, light_index, &w);
        }

        match self.light() {
            Some(light) => {
                let pdf_choice = light_index
                    .get(&light_key(&light))
                    .map_or(0.0, |index| light_distr.discrete_pdf(*index));
                let ray = Ray::new(self.p(), w, INFINITY, self.time(), None);
                light.pdf_le(&ray, &self.ng()).pdf_pos * pdf_choice
            }
            None => 0.0,
        }
    }
}

impl<'a> fmt::Display for Vertex<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            VertexKind::Camera { .. } => "camera",
            VertexKind::Light { .. } => "light",
            VertexKind::Surface { .. } => "surface",
            VertexKind::Medium { .. } => "medium",
        };
        write!(
            f,
            "[{} p: {:?} beta: {} delta: {} pdf_fwd: {} pdf_rev: {}]",
            kind,
            self.p(),
            self.beta,
            self.delta,
            self.pdf_fwd,
            self.pdf_rev
        )
    }
}

// ---- Tests ----

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;
    use render_core::medium::HenyeyGreenstein;
    use std::sync::Arc;

    fn medium_vertex(p: Point3f) -> Vertex<'static> {
        let mi = MediumInteraction::new(p, Vector3f::new(0.0, 0.0, 1.0), 0.0, None, HenyeyGreenstein::new(0.0));
        Vertex::new(VertexKind::Medium { mi }, Spectrum::ONE, 1.0)
    }

    fn light_vertex(p: Point3f, n: Normal3f) -> Vertex<'static> {
        let hit = Hit::new(p, 0.0, Vector3f::ZERO, Vector3f::ZERO, n, MediumInterface::default());
        Vertex::new(VertexKind::Light { hit, light: None }, Spectrum::ONE, 1.0)
    }

    #[test]
    fn density_conversion_uses_distance_and_cosine() {
        let a = medium_vertex(Point3f::ZERO);
        let b = medium_vertex(Point3f::new(0.0, 0.0, 2.0));
        assert!(approx_eq!(Float, a.convert_density(1.0, &b), 0.25));

        // Surface normal tilted by 60 degrees halves the density.
        let hit = Hit::new(
            Point3f::new(0.0, 0.0, 2.0),
            0.0,
            Vector3f::ZERO,
            Vector3f::ZERO,
            Normal3f::new(0.0, (0.75 as Float).sqrt(), 0.5),
            MediumInterface::default(),
        );
        let c = Vertex::light_from_hit(
            Arc::new(lights::PointLight::new(Point3f::ZERO, MediumInterface::default(), Spectrum::ONE)),
            hit,
            Spectrum::ONE,
            1.0,
        );
        assert!(approx_eq!(Float, a.convert_density(1.0, &c), 0.125, epsilon = 1e-6));
    }

    #[test]
    fn infinite_lights_keep_solid_angle_density() {
        let a = medium_vertex(Point3f::ZERO);
        let escaped = light_vertex(Point3f::new(0.0, 0.0, 1.0), Normal3f::new(0.0, 0.0, -1.0));
        assert!(escaped.is_infinite_light());
        assert!(escaped.is_light());
        assert!(!escaped.is_delta_light());
        assert!(approx_eq!(Float, a.convert_density(0.3, &escaped), 0.3));
    }

    #[test]
    fn coincident_vertices_have_zero_density() {
        let a = medium_vertex(Point3f::new(1.0, 1.0, 1.0));
        let b = medium_vertex(Point3f::new(1.0, 1.0, 1.0));
        assert_eq!(a.convert_density(1.0, &b), 0.0);
        assert!(a.f(&b, TransportMode::Radiance).is_black());
    }

    #[test]
    fn medium_vertices_scatter_with_phase_function() {
        let a = medium_vertex(Point3f::ZERO);
        let b = medium_vertex(Point3f::new(3.0, 0.0, 0.0));
        assert!(a.is_connectible());
        assert!(!a.is_on_surface());
        assert!(approx_eq!(Float, a.f(&b, TransportMode::Importance)[0], INV_FOUR_PI, epsilon = 1e-6));
    }
}
