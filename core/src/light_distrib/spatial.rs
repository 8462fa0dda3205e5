//! Spatial Light Distribution.

use crate::geometry::*;
use crate::interaction::*;
use crate::light::*;
use crate::low_discrepancy::radical_inverse;
use crate::medium::*;
use crate::pbrt::*;
use crate::sampling::*;
use crate::scene::*;
use arc_swap::ArcSwapOption;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Voxel count along the widest scene dimension.
pub const MAX_VOXELS: usize = 64;

/// Number of points sampled in a voxel when estimating light contributions.
const N_SAMPLES: u64 = 128;

/// Voxel coordinates are packed into a u64 with 20 bits per coordinate. No
/// packed coordinate can have all bits set so this marks a free slot.
const INVALID_PACKED_POS: u64 = u64::MAX;

/// A hash table slot. A slot whose `packed_pos` was claimed but whose
/// `distribution` is still empty is being computed by another thread.
struct HashEntry {
    packed_pos: AtomicU64,
    distribution: ArcSwapOption<Distribution1D>,
}

impl Default for HashEntry {
    fn default() -> Self {
        Self {
            packed_pos: AtomicU64::new(INVALID_PACKED_POS),
            distribution: ArcSwapOption::const_empty(),
        }
    }
}

/// A spatially-varying light distribution that adjusts the probability of
/// sampling a light source based on an estimate of its contribution to a
/// region of space. A fixed voxel grid is imposed over the scene bounds and
/// a sampling distribution is computed on first use for each voxel.
pub struct SpatialLightDistribution {
    /// The scene lights.
    lights: Vec<ArcLight>,

    /// Scene bounds.
    world_bound: Bounds3f,

    /// Voxel grid resolution.
    n_voxels: [usize; 3],

    /// Open addressing table with quadratic probing; never resized.
    hash_table: Vec<HashEntry>,
}

impl SpatialLightDistribution {
    /// Create a new instance of `SpatialLightDistribution`.
    ///
    /// * `scene`      - The scene.
    /// * `max_voxels` - Number of voxels along the widest scene dimension.
    pub fn new(scene: &Scene, max_voxels: usize) -> Self {
        // The widest dimension gets `max_voxels` voxels and the others are
        // sized so voxels are roughly cubes.
        let b = scene.world_bound;
        let diag = b.diagonal();
        let bmax = diag[diag.max_dimension()];
        let mut n_voxels = [1_usize; 3];
        if bmax > 0.0 {
            for (i, n) in n_voxels.iter_mut().enumerate() {
                *n = max(1, (diag[i] / bmax * max_voxels as Float).round() as usize);
                debug_assert!(*n < (1 << 20));
            }
        }

        info!(
            "SpatialLightDistribution: voxel res ({}, {}, {})",
            n_voxels[0], n_voxels[1], n_voxels[2]
        );

        let hash_table_size = 4 * n_voxels[0] * n_voxels[1] * n_voxels[2];
        Self {
            lights: scene.lights.iter().map(Arc::clone).collect(),
            world_bound: b,
            n_voxels,
            hash_table: (0..hash_table_size).map(|_| HashEntry::default()).collect(),
        }
    }

    /// Returns the voxel grid resolution.
    pub fn resolution(&self) -> [usize; 3] {
        self.n_voxels
    }

    /// Returns the sampling distribution for the voxel containing `p`,
    /// computing it on first use. Concurrent callers for the same voxel all
    /// receive the same table.
    ///
    /// * `p` - The point.
    pub fn lookup(&self, p: &Point3f) -> Arc<Distribution1D> {
        let pi = self.voxel_coordinates(p);
        let packed_pos = pack_voxel(&pi);
        let hash_table_size = self.hash_table.len() as u64;
        let mut hash = mix_bits(packed_pos) % hash_table_size;

        let mut step = 1_u64;
        loop {
            let entry = &self.hash_table[hash as usize];
            let entry_packed_pos = entry.packed_pos.load(Ordering::Acquire);

            if entry_packed_pos == packed_pos {
                // Someone claimed this voxel; wait until its table is published.
                loop {
                    if let Some(dist) = entry.distribution.load_full() {
                        return dist;
                    }
                    std::hint::spin_loop();
                }
            } else if entry_packed_pos != INVALID_PACKED_POS {
                hash = (hash + step * step) % hash_table_size;
                step += 1;
            } else if entry
                .packed_pos
                .compare_exchange(INVALID_PACKED_POS, packed_pos, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                let dist = Arc::new(self.compute_distribution(&pi));
                entry.distribution.store(Some(Arc::clone(&dist)));
                return dist;
            }
            // Lost the race for the slot; re-read it on the next iteration.
        }
    }

    /// Returns the integer voxel coordinates of a point. Points slightly
    /// outside the bounds due to roundoff are clamped into the grid.
    fn voxel_coordinates(&self, p: &Point3f) -> Point3i {
        let offset = self.world_bound.offset(p);
        let mut pi = Point3i::new(0, 0, 0);
        for i in 0..3 {
            let n = self.n_voxels[i] as Int;
            pi[i] = clamp((offset[i] * n as Float) as Int, 0, n - 1);
        }
        pi
    }

    /// Computes the sampling distribution for voxel `pi`. Each light is
    /// weighted by the luminance of `Li / pdf` summed over Halton points in
    /// the voxel; visibility is not taken into account.
    fn compute_distribution(&self, pi: &Point3i) -> Distribution1D {
        let nv = |i: usize, o: Int| (pi[i] + o) as Float / self.n_voxels[i] as Float;
        let p0 = Point3f::new(nv(0, 0), nv(1, 0), nv(2, 0));
        let p1 = Point3f::new(nv(0, 1), nv(1, 1), nv(2, 1));
        let voxel_bounds = Bounds3f::new(self.world_bound.lerp(&p0), self.world_bound.lerp(&p1));

        let mut light_contrib = vec![0.0; self.lights.len()];
        for i in 0..N_SAMPLES {
            let po = voxel_bounds.lerp(&Point3f::new(
                radical_inverse(0, i),
                radical_inverse(1, i),
                radical_inverse(2, i),
            ));
            let hit = Hit::new_minimal(po, 0.0, MediumInterface::default());

            let u = Point2f::new(radical_inverse(3, i), radical_inverse(4, i));
            for (j, light) in self.lights.iter().enumerate() {
                let li = light.sample_li(&hit, &u);
                if li.pdf > 0.0 {
                    light_contrib[j] += li.value.y() / li.pdf;
                }
            }
        }

        // Every light keeps a small non-zero probability, since it may reach
        // points in the voxel the samples above missed.
        let sum_contrib: Float = light_contrib.iter().sum();
        let avg_contrib = sum_contrib / (N_SAMPLES as usize * light_contrib.len()) as Float;
        let min_contrib = if avg_contrib > 0.0 { 0.001 * avg_contrib } else { 1.0 };
        for contrib in light_contrib.iter_mut() {
            *contrib = max(*contrib, min_contrib);
        }
        debug!(
            "Initialized light distribution in voxel ({}, {}, {}), avg contrib = {}",
            pi.x, pi.y, pi.z, avg_contrib
        );

        Distribution1D::new(light_contrib)
    }
}

/// Packs voxel coordinates into a single key with 20 bits per axis.
fn pack_voxel(pi: &Point3i) -> u64 {
    ((pi.x as u64) << 40) | ((pi.y as u64) << 20) | pi.z as u64
}

/// Bit mixer so neighbouring voxels spread over the table.
/// See http://zimbry.blogspot.ch/2011/09/better-bit-mixing-improving-on.html
fn mix_bits(mut v: u64) -> u64 {
    v ^= v >> 31;
    v = v.wrapping_mul(0x7fb5d329728ea185);
    v ^= v >> 27;
    v = v.wrapping_mul(0x81dadef4bc2dd44d);
    v ^= v >> 33;
    v
}

// ---- Tests ----

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packed_voxels_never_collide_with_sentinel() {
        let max = (1 << 20) - 1;
        assert_ne!(pack_voxel(&Point3i::new(max, max, max)), INVALID_PACKED_POS);
        assert_ne!(pack_voxel(&Point3i::new(1, 0, 0)), pack_voxel(&Point3i::new(0, 1, 0)));
    }
}
