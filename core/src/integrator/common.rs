//! Common

use crate::geometry::*;
use crate::interaction::*;
use crate::light::*;
use crate::pbrt::*;
use crate::reflection::*;
use crate::sampler::*;
use crate::sampling::*;
use crate::scene::*;
use crate::spectrum::*;

/// Sample all lights in the scene for direct lighting and sum their
/// contributions.
///
/// * `it`              - The intersection information.
/// * `scene`           - The scene.
/// * `sampler`         - The sampler.
/// * `n_light_samples` - The number of samples requested for each light.
/// * `handle_media`    - Indicates whether effects of volumetric attenuation
///                       should be considered.
pub fn uniform_sample_all_lights(
    it: &Interaction,
    scene: &Scene,
    sampler: &mut dyn Sampler,
    n_light_samples: &[usize],
    handle_media: bool,
) -> Spectrum {
    let mut l = Spectrum::ZERO;

    for (j, light) in scene.lights.iter().enumerate() {
        // Accumulate contribution of j^th light to `l`.
        let n_samples = n_light_samples.get(j).copied().unwrap_or(1);
        let u_light_array = sampler.get_2d_array(n_samples);
        let u_scattering_array = sampler.get_2d_array(n_samples);

        match (u_light_array, u_scattering_array) {
            (Some(u_light_array), Some(u_scattering_array)) => {
                // Estimate direct lighting using sample arrays.
                let mut ld = Spectrum::ZERO;
                for k in 0..n_samples {
                    ld += estimate_direct(
                        it,
                        &u_scattering_array[k],
                        light,
                        &u_light_array[k],
                        scene,
                        sampler,
                        handle_media,
                        false,
                    );
                }
                l += ld / n_samples as Float;
            }
            _ => {
                // Use a single sample for illumination from `light`.
                let u_light = sampler.get_2d();
                let u_scattering = sampler.get_2d();
                l += estimate_direct(
                    it,
                    &u_scattering,
                    light,
                    &u_light,
                    scene,
                    sampler,
                    handle_media,
                    false,
                );
            }
        }
    }
    l
}

/// Sample one light in the scene for direct lighting and divide by the
/// probability of choosing it.
///
/// * `it`            - The intersection information.
/// * `scene`         - The scene.
/// * `sampler`       - The sampler.
/// * `handle_media`  - Indicates whether effects of volumetric attenuation
///                     should be considered.
/// * `light_distrib` - Distribution to choose the light from; lights are
///                     chosen uniformly if `None`.
pub fn uniform_sample_one_light(
    it: &Interaction,
    scene: &Scene,
    sampler: &mut dyn Sampler,
    handle_media: bool,
    light_distrib: Option<&Distribution1D>,
) -> Spectrum {
    // Randomly choose a single light to sample, `light`.
    let n_lights = scene.lights.len();
    if n_lights == 0 {
        return Spectrum::ZERO;
    }

    let u = sampler.get_1d();
    let (light_num, light_pdf) = match light_distrib {
        Some(distrib) => {
            let (light_num, pdf, _) = distrib.sample_discrete(u);
            (light_num, pdf)
        }
        None => {
            let light_num = min((u * n_lights as Float) as usize, n_lights - 1);
            (light_num, 1.0 / n_lights as Float)
        }
    };
    if light_pdf == 0.0 {
        return Spectrum::ZERO;
    }

    let light = &scene.lights[light_num];
    let u_light = sampler.get_2d();
    let u_scattering = sampler.get_2d();
    estimate_direct(
        it,
        &u_scattering,
        light,
        &u_light,
        scene,
        sampler,
        handle_media,
        false,
    ) / light_pdf
}

/// Compute a direct lighting estimate for a light source sample by applying
/// multiple importance sampling.
///
/// * `it`           - The intersection information.
/// * `u_scattering` - Scattering sample.
/// * `light`        - The light.
/// * `u_light`      - Light sample.
/// * `scene`        - The scene.
/// * `sampler`      - The sampler.
/// * `handle_media` - Indicates whether effects of volumetric attenuation
///                    should be considered.
/// * `specular`     - Indicates whether perfectly specular lobes should be
///                    considered.
#[allow(clippy::too_many_arguments)]
pub fn estimate_direct(
    it: &Interaction,
    u_scattering: &Point2f,
    light: &ArcLight,
    u_light: &Point2f,
    scene: &Scene,
    sampler: &mut dyn Sampler,
    handle_media: bool,
    specular: bool,
) -> Spectrum {
    let bsdf_flags = if specular {
        BxDFType::BSDF_ALL
    } else {
        BxDFType::BSDF_ALL & !BxDFType::BSDF_SPECULAR
    };
    let hit = it.get_hit();
    let mut ld = Spectrum::ZERO;

    // Sample light source with multiple importance sampling.
    let Li {
        wi,
        pdf: light_pdf,
        visibility,
        value: mut li,
    } = light.sample_li(hit, u_light);
    trace!("EstimateDirect u_light: {:?} -> Li: {}, wi: {:?}, pdf: {}", u_light, li, wi, light_pdf);

    if light_pdf > 0.0 && !li.is_black() {
        // Compute BSDF or phase function's value for light sample.
        let (f, scattering_pdf) = it.f_and_pdf(&wi, bsdf_flags);

        if !f.is_black() {
            // Compute effect of visibility for light source sample.
            if let Some(vis) = visibility {
                if handle_media {
                    li *= vis.tr(scene, sampler);
                } else if !vis.unoccluded(scene) {
                    li = Spectrum::ZERO;
                }
            }

            // Add light's contribution to reflected radiance.
            if !li.is_black() {
                if light.is_delta_light() {
                    ld += f * li / light_pdf;
                } else {
                    let weight = power_heuristic(1, light_pdf, 1, scattering_pdf);
                    ld += f * li * weight / light_pdf;
                }
            }
        }
    }

    // Sample BSDF with multiple importance sampling.
    if !light.is_delta_light() {
        let (f, scattering_pdf, wi, sampled_specular) = match it {
            Interaction::Surface { si } => match si.bsdf {
                Some(bsdf) => {
                    let sample = bsdf.sample_f(&hit.wo, u_scattering, bsdf_flags);
                    (
                        sample.f * sample.wi.abs_dot(&si.shading.n),
                        sample.pdf,
                        sample.wi,
                        sample.bxdf_type.is_specular(),
                    )
                }
                None => (Spectrum::ZERO, 0.0, Vector3f::ZERO, false),
            },
            Interaction::Medium { mi } => {
                let (p, wi) = mi.phase.sample_p(&mi.hit.wo, u_scattering);
                (Spectrum::new(p), p, wi, false)
            }
        };

        if !f.is_black() && scattering_pdf > 0.0 {
            // Account for light contributions along sampled direction `wi`.
            let mut weight = 1.0;
            if !sampled_specular {
                let light_pdf = light.pdf_li(hit, &wi);
                if light_pdf == 0.0 {
                    return ld;
                }
                weight = power_heuristic(1, scattering_pdf, 1, light_pdf);
            }

            // Find intersection and compute transmittance.
            let mut ray = hit.spawn_ray(&wi);
            let (light_isect, tr) = if handle_media {
                scene.intersect_tr(&mut ray, sampler)
            } else {
                (scene.intersect(&mut ray), Spectrum::ONE)
            };

            // Add light contribution from material sampling.
            let li = match light_isect {
                Some(light_isect) => {
                    let hits_light = light_isect
                        .primitive
                        .and_then(|p| p.get_area_light())
                        .map_or(false, |area_light| same_light(&area_light, light));
                    if hits_light {
                        light_isect.le(&(-wi))
                    } else {
                        Spectrum::ZERO
                    }
                }
                None => light.le(&ray),
            };

            if !li.is_black() {
                ld += f * li * tr * weight / scattering_pdf;
            }
        }
    }

    ld
}
