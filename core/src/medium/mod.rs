//! Medium

use crate::geometry::*;
use crate::interaction::*;
use crate::sampler::*;
use crate::spectrum::*;
use std::sync::Arc;

mod henyey_greenstein;

// Re-exports
pub use henyey_greenstein::*;

/// Medium trait to handle volumetric scattering properties.
pub trait Medium: Send + Sync {
    /// Returns the beam transmittance along a given ray up to `ray.t_max`.
    ///
    /// * `ray`     - The ray.
    /// * `sampler` - The sampler.
    fn tr(&self, ray: &Ray, sampler: &mut dyn Sampler) -> Spectrum;

    /// Samples a scattering event along the ray. Returns the sampling weight
    /// and a `MediumInteraction` if the ray scatters before `ray.t_max`.
    ///
    /// * `ray`     - The ray.
    /// * `sampler` - The sampler.
    fn sample(&self, ray: &Ray, sampler: &mut dyn Sampler) -> (Spectrum, Option<MediumInteraction>);
}

/// Atomic reference counted `Medium`.
pub type ArcMedium = Arc<dyn Medium>;

/// MediumInterface represents the boundary interface between two media.
#[derive(Clone, Default)]
pub struct MediumInterface {
    /// Represent the interior of a geometric primitive.
    pub inside: Option<ArcMedium>,

    /// Represent the exterior of a geometric primitive.
    pub outside: Option<ArcMedium>,
}

impl MediumInterface {
    /// Create a medium interface between two media.
    ///
    /// * `inside`  - The interior medium.
    /// * `outside` - The exterior medium.
    pub fn new(inside: Option<ArcMedium>, outside: Option<ArcMedium>) -> Self {
        Self { inside, outside }
    }

    /// Returns `true` if the medium interface marks a transition between
    /// two distinct media.
    pub fn is_medium_transition(&self) -> bool {
        !same_medium(&self.inside, &self.outside)
    }
}

impl From<Option<ArcMedium>> for MediumInterface {
    /// Create a medium interface with the same medium on both sides.
    ///
    /// * `medium` - The medium on either side of the interface.
    fn from(medium: Option<ArcMedium>) -> Self {
        Self {
            inside: medium.clone(),
            outside: medium,
        }
    }
}

/// Returns `true` if both refer to the same medium (or both to vacuum).
///
/// * `a` - First medium.
/// * `b` - Second medium.
pub fn same_medium(a: &Option<ArcMedium>, b: &Option<ArcMedium>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b)),
        (None, None) => true,
        _ => false,
    }
}

// ---- Tests ----
