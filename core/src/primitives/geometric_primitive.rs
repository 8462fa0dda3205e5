//! Geometric Primitives

use super::*;

/// GeometricPrimitive represents a single shape in a scene.
#[derive(Clone)]
pub struct GeometricPrimitive {
    /// The shape.
    pub shape: ArcShape,

    /// The material.
    pub material: Option<ArcMaterial>,

    /// Optional area light that describes emmission characterisitics if it
    /// emits light.
    pub area_light: Option<ArcLight>,

    /// Information about the participating media on the inside and outside
    /// the primitive.
    pub medium_interface: MediumInterface,
}

impl GeometricPrimitive {
    /// Create a new geometric primitive.
    ///
    /// * `shape`            - The shape.
    /// * `material`         - The material; `None` for invisible media
    ///                        boundaries.
    /// * `area_light`       - Optional area light.
    /// * `medium_interface` - Media on the inside and outside the primitive.
    pub fn new(
        shape: ArcShape,
        material: Option<ArcMaterial>,
        area_light: Option<ArcLight>,
        medium_interface: MediumInterface,
    ) -> Self {
        Self {
            shape,
            material,
            area_light,
            medium_interface,
        }
    }
}

impl Primitive for GeometricPrimitive {
    fn world_bound(&self) -> Bounds3f {
        self.shape.world_bound()
    }

    fn intersect(&self, r: &mut Ray) -> Option<SurfaceInteraction<'_>> {
        let Intersection { t, isect } = self.shape.intersect(r)?;
        r.t_max = t;

        let mut si: SurfaceInteraction<'_> = isect;
        si.primitive = Some(self);

        // A primitive that is not a medium boundary takes the ray's medium
        // on both sides.
        si.hit.medium_interface = if self.medium_interface.is_medium_transition() {
            self.medium_interface.clone()
        } else {
            MediumInterface::from(r.medium())
        };

        Some(si)
    }

    fn intersect_p(&self, r: &Ray) -> bool {
        self.shape.intersect_p(r)
    }

    fn get_area_light(&self) -> Option<ArcLight> {
        self.area_light.clone()
    }

    fn get_material(&self) -> Option<ArcMaterial> {
        self.material.clone()
    }

    fn compute_scattering_functions<'a>(
        &'a self,
        si: &mut SurfaceInteraction<'a>,
        arena: &'a MemoryArena,
        mode: TransportMode,
        allow_multiple_lobes: bool,
    ) {
        if let Some(material) = self.material.as_ref() {
            material.compute_scattering_functions(si, arena, mode, allow_multiple_lobes);
        }
    }
}
