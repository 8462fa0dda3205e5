//! Primitive List

use super::*;

/// Aggregate that tests every primitive in turn. The nearest hit wins since
/// each successful intersection shortens the ray.
#[derive(Clone, Default)]
pub struct PrimitiveList {
    /// The primitives.
    primitives: Vec<ArcPrimitive>,

    /// Union of all primitive bounds.
    bounds: Bounds3f,
}

impl PrimitiveList {
    /// Create a new aggregate.
    ///
    /// * `primitives` - The primitives.
    pub fn new(primitives: Vec<ArcPrimitive>) -> Self {
        let bounds = primitives
            .iter()
            .fold(Bounds3f::empty(), |b, p| b.union(&p.world_bound()));
        Self { primitives, bounds }
    }

    /// Returns the number of primitives.
    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    /// Returns true if the aggregate has no primitives.
    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }
}

impl Primitive for PrimitiveList {
    fn world_bound(&self) -> Bounds3f {
        self.bounds
    }

    fn intersect(&self, r: &mut Ray) -> Option<SurfaceInteraction<'_>> {
        let mut closest = None;
        for primitive in self.primitives.iter() {
            if let Some(si) = primitive.intersect(r) {
                closest = Some(si);
            }
        }
        closest
    }

    fn intersect_p(&self, r: &Ray) -> bool {
        self.primitives.iter().any(|p| p.intersect_p(r))
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
        // Aggregates never appear in a `SurfaceInteraction`.
    }
}
