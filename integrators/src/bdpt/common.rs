//! Common

use render_core::geometry::*;
use render_core::interaction::*;
use render_core::light::*;
use render_core::material::*;
use render_core::pbrt::*;
use render_core::sampling::Distribution1D;
use render_core::scene::*;
use std::collections::HashMap;
use std::sync::Arc;

/// Returns the correction term for adjoint BSDF with shading normals.
///
/// * `ns`   - Shading normal.
/// * `ng`   - Geometric normal.
/// * `wo`   - Outgoing direction.
/// * `wi`   - Incident direction.
/// * `mode` - Light transport mode.
pub(crate) fn correct_shading_normal(
    ns: &Normal3f,
    ng: &Normal3f,
    wo: &Vector3f,
    wi: &Vector3f,
    mode: TransportMode,
) -> Float {
    match mode {
        TransportMode::Importance => {
            let num = wo.abs_dot(ns) * wi.abs_dot(ng);
            let denom = wo.abs_dot(ng) * wi.abs_dot(ns);

            // `wi` can be perpendicular to the shading normal.
            if denom == 0.0 {
                0.0
            } else {
                num / denom
            }
        }
        _ => 1.0,
    }
}

/// Returns the key identifying a light in the light index map.
///
/// * `light` - The light.
pub(crate) fn light_key(light: &ArcLight) -> usize {
    Arc::as_ptr(light) as *const () as usize
}

/// Maps each light of the scene to its index in `scene.lights` and hence
/// in light distributions built for the scene.
///
/// * `scene` - The scene.
pub(crate) fn light_index_map(scene: &Scene) -> HashMap<usize, usize> {
    scene
        .lights
        .iter()
        .enumerate()
        .map(|(i, light)| (light_key(light), i))
        .collect()
}

/// Returns the density of sampling direction `w` from the combined
/// infinite lights, weighted by the probability of choosing each of them.
///
/// * `scene`       - The scene.
/// * `light_distr` - Light selection probabilities.
/// * `light_index` - Map from light keys to indices in `light_distr`.
/// * `w`           - Direction towards the scene.
pub(crate) fn infinite_light_density(
    scene: &Scene,
    light_distr: &Distribution1D,
    light_index: &HashMap<usize, usize>,
    w: &Vector3f,
) -> Float {
    scene
        .infinite_lights
        .iter()
        .filter_map(|light| {
            light_index
                .get(&light_key(light))
                .map(|index| light.pdf_li(&Hit::default(), &-*w) * light_distr.discrete_pdf(*index))
        })
        .sum()
}

/// Densities of a path vertex used for MIS weights.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub(crate) struct VertexDensity {
    /// Area density of sampling the vertex from its subpath predecessor.
    pub pdf_fwd: Float,

    /// Area density of sampling the vertex from the other direction.
    pub pdf_rev: Float,

    /// Vertex was sampled from a Dirac delta distribution.
    pub delta: bool,
}

/// Maps zero densities of delta distributions to 1.
///
/// * `f` - The density.
fn remap0(f: Float) -> Float {
    if f != 0.0 {
        f
    } else {
        1.0
    }
}

/// Computes the balance heuristic weight of a strategy from the densities of
/// its camera subpath (`t` vertices) and light subpath (`s` vertices). The
/// connection vertices must already carry their reverse densities. Strategies
/// that would connect at a delta vertex are left out.
///
/// * `camera`             - Camera subpath densities, endpoint first.
/// * `light`              - Light subpath densities, endpoint first.
/// * `delta_light_origin` - The light subpath starts on a delta light.
pub(crate) fn mis_weight_from_densities(
    camera: &[VertexDensity],
    light: &[VertexDensity],
    delta_light_origin: bool,
) -> Float {
    let mut sum_ri = 0.0;

    // Consider hypothetical connection strategies along the camera subpath.
    let mut ri = 1.0;
    for i in (1..camera.len()).rev() {
        ri *= remap0(camera[i].pdf_rev) / remap0(camera[i].pdf_fwd);
        if !camera[i].delta && !camera[i - 1].delta {
            sum_ri += ri;
        }
    }

    // Consider hypothetical connection strategies along the light subpath.
    ri = 1.0;
    for i in (0..light.len()).rev() {
        ri *= remap0(light[i].pdf_rev) / remap0(light[i].pdf_fwd);
        let delta_prev = if i > 0 { light[i - 1].delta } else { delta_light_origin };
        if !light[i].delta && !delta_prev {
            sum_ri += ri;
        }
    }

    1.0 / (1.0 + sum_ri)
}

/// Returns the index of the weight film for strategy `(s, t)`.
///
/// * `s` - Number of light subpath vertices.
/// * `t` - Number of camera subpath vertices.
pub(crate) fn buffer_index(s: usize, t: usize) -> usize {
    let depth = s + t - 2;
    s + depth * (5 + depth) / 2
}

/// Returns the number of weight films needed up to `max_depth`.
///
/// * `max_depth` - Maximum path depth.
pub(crate) fn buffer_count(max_depth: usize) -> usize {
    (1 + max_depth) * (6 + max_depth) / 2
}

// ---- Tests ----
