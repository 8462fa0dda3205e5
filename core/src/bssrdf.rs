//! Subsurface Scattering

use crate::geometry::*;
use crate::interaction::*;
use crate::interpolation::*;
use crate::material::*;
use crate::medium::{phase_hg, MediumInterface};
use crate::memory::MemoryArena;
use crate::pbrt::*;
use crate::reflection::*;
use crate::scene::Scene;
use crate::spectrum::*;
use std::sync::Arc;

/// Number of albedo samples in a profile table.
pub const BSSRDF_RHO_SAMPLES: usize = 100;

/// Number of radius samples in a profile table.
pub const BSSRDF_RADIUS_SAMPLES: usize = 64;

/// Number of samples for the photon beam diffusion integrals.
const PBD_SAMPLES: usize = 100;

/// First moment of the Fresnel reflectance of a dielectric, fitted as a
/// polynomial in the relative index of refraction.
///
/// * `eta` - Relative index of refraction.
pub fn fresnel_moment_1(eta: Float) -> Float {
    let eta2 = eta * eta;
    let eta3 = eta2 * eta;
    let eta4 = eta3 * eta;
    let eta5 = eta4 * eta;
    if eta < 1.0 {
        0.45966 - 1.73965 * eta + 3.37668 * eta2 - 3.904945 * eta3 + 2.49277 * eta4 - 0.68441 * eta5
    } else {
        -4.61686 + 11.1136 * eta - 10.4646 * eta2 + 5.11455 * eta3 - 1.27198 * eta4 + 0.12746 * eta5
    }
}

/// Second moment of the Fresnel reflectance of a dielectric.
///
/// * `eta` - Relative index of refraction.
pub fn fresnel_moment_2(eta: Float) -> Float {
    let eta2 = eta * eta;
    let eta3 = eta2 * eta;
    let eta4 = eta3 * eta;
    let eta5 = eta4 * eta;
    if eta < 1.0 {
        0.27614 - 0.87350 * eta + 1.12077 * eta2 - 0.65095 * eta3 + 0.07883 * eta4 + 0.04860 * eta5
    } else {
        let r_eta = 1.0 / eta;
        let r_eta2 = r_eta * r_eta;
        let r_eta3 = r_eta2 * r_eta;
        -547.033 + 45.3087 * r_eta3 - 218.725 * r_eta2 + 458.843 * r_eta + 404.557 * eta - 189.519 * eta2
            + 54.9327 * eta3
            - 9.00603 * eta4
            + 0.63942 * eta5
    }
}

/// Photon beam diffusion single scattering term at radius `r`.
///
/// * `sigma_s` - Scattering coefficient.
/// * `sigma_a` - Absorption coefficient.
/// * `g`       - Henyey-Greenstein asymmetry parameter.
/// * `eta`     - Relative index of refraction.
/// * `r`       - Radius.
fn beam_diffusion_ss(sigma_s: Float, sigma_a: Float, g: Float, eta: Float, r: Float) -> Float {
    let sigma_t = sigma_a + sigma_s;
    let rho = sigma_s / sigma_t;

    // Depths below the critical angle do not refract out.
    let t_crit = r * (eta * eta - 1.0).sqrt();

    let sum: Float = (0..PBD_SAMPLES)
        .map(|i| {
            let ti = t_crit - (1.0 - (i as Float + 0.5) / PBD_SAMPLES as Float).ln() / sigma_t;
            let d = (r * r + ti * ti).sqrt();
            let cos_theta_o = ti / d;
            rho * (-sigma_t * (d + t_crit)).exp() / (d * d)
                * phase_hg(cos_theta_o, g)
                * (1.0 - fr_dielectric(-cos_theta_o, 1.0, eta))
                * abs(cos_theta_o)
        })
        .sum();
    sum / PBD_SAMPLES as Float
}

/// Photon beam diffusion multiple scattering term at radius `r`: a dipole
/// integrated over real source depths.
///
/// * `sigma_s` - Scattering coefficient.
/// * `sigma_a` - Absorption coefficient.
/// * `g`       - Henyey-Greenstein asymmetry parameter.
/// * `eta`     - Relative index of refraction.
/// * `r`       - Radius.
fn beam_diffusion_ms(sigma_s: Float, sigma_a: Float, g: Float, eta: Float, r: Float) -> Float {
    // Reduced coefficients.
    let sigmap_s = sigma_s * (1.0 - g);
    let sigmap_t = sigma_a + sigmap_s;
    let rhop = sigmap_s / sigmap_t;

    // Non-classical diffusion coefficient and effective transport coefficient.
    let d_g = (2.0 * sigma_a + sigmap_s) / (3.0 * sigmap_t * sigmap_t);
    let sigma_tr = (sigma_a / d_g).sqrt();

    // Extrapolation depth of the virtual source and exitance weights.
    let fm1 = fresnel_moment_1(eta);
    let fm2 = fresnel_moment_2(eta);
    let ze = -2.0 * d_g * (1.0 + 3.0 * fm2) / (1.0 - 2.0 * fm1);
    let c_phi = 0.25 * (1.0 - 2.0 * fm1);
    let c_e = 0.5 * (1.0 - 3.0 * fm2);

    let sum: Float = (0..PBD_SAMPLES)
        .map(|i| {
            let zr = -(1.0 - (i as Float + 0.5) / PBD_SAMPLES as Float).ln() / sigmap_t;
            let zv = -zr + 2.0 * ze;
            let dr = (r * r + zr * zr).sqrt();
            let dv = (r * r + zv * zv).sqrt();

            // Fluence rate and vector irradiance of the dipole.
            let phi_d = INV_FOUR_PI / d_g * ((-sigma_tr * dr).exp() / dr - (-sigma_tr * dv).exp() / dv);
            let ed_n = INV_FOUR_PI
                * (zr * (1.0 + sigma_tr * dr) * (-sigma_tr * dr).exp() / (dr * dr * dr)
                    - zv * (1.0 + sigma_tr * dv) * (-sigma_tr * dv).exp() / (dv * dv * dv));

            let e = phi_d * c_phi + ed_n * c_e;
            let kappa = 1.0 - (-2.0 * sigmap_t * (dr + zr)).exp();
            kappa * rhop * rhop * e
        })
        .sum();
    sum / PBD_SAMPLES as Float
}

/// Radial scattering profile tabulated over single scattering albedo and
/// optical radius, in units where `σt = 1`.
#[derive(Clone, Debug)]
pub struct BSSRDFTable {
    /// Albedo nodes.
    rho_samples: Vec<Float>,

    /// Optical radius nodes.
    radius_samples: Vec<Float>,

    /// `2πr Sr(r)` per albedo row.
    profile: Vec<Float>,

    /// Running integral of each profile row.
    profile_cdf: Vec<Float>,

    /// Effective albedo of each row; the integral of the whole row.
    rho_eff: Vec<Float>,
}

impl BSSRDFTable {
    /// Tabulates the photon beam diffusion profile for a medium.
    ///
    /// * `n_rho_samples`    - Number of albedo nodes; at least 2.
    /// * `n_radius_samples` - Number of radius nodes; at least 2.
    /// * `g`                - Henyey-Greenstein asymmetry parameter.
    /// * `eta`              - Relative index of refraction.
    pub fn new(n_rho_samples: usize, n_radius_samples: usize, g: Float, eta: Float) -> Self {
        // Radii grow geometrically after the first two nodes.
        let radius_samples: Vec<Float> = std::iter::once(0.0)
            .chain(std::iter::successors(Some(2.5e-3 as Float), |r| Some(r * 1.2)))
            .take(n_radius_samples)
            .collect();

        // Albedos cluster towards 1 where the profile varies most.
        let denom = 1.0 - (-8.0 as Float).exp();
        let rho_samples: Vec<Float> = (0..n_rho_samples)
            .map(|i| (1.0 - (-8.0 * i as Float / (n_rho_samples - 1) as Float).exp()) / denom)
            .collect();

        let mut profile = Vec::with_capacity(n_rho_samples * n_radius_samples);
        let mut profile_cdf = Vec::with_capacity(n_rho_samples * n_radius_samples);
        let mut rho_eff = Vec::with_capacity(n_rho_samples);
        for &rho in rho_samples.iter() {
            let row: Vec<Float> = radius_samples
                .iter()
                .map(|&r| {
                    TWO_PI * r * (beam_diffusion_ss(rho, 1.0 - rho, g, eta, r) + beam_diffusion_ms(rho, 1.0 - rho, g, eta, r))
                })
                .collect();
            let (cdf, total) = integrate_catmull_rom(&radius_samples, &row);
            profile.extend(row);
            profile_cdf.extend(cdf);
            rho_eff.push(total);
        }

        Self {
            rho_samples,
            radius_samples,
            profile,
            profile_cdf,
            rho_eff,
        }
    }

    /// Returns the effective albedo of every albedo node.
    pub fn rho_eff(&self) -> &[Float] {
        &self.rho_eff
    }

    /// Interpolates the profile `Sr` and the effective albedo at a single
    /// scattering albedo and optical radius. Returns `None` outside the
    /// table.
    ///
    /// * `rho`       - Single scattering albedo.
    /// * `r_optical` - Radius in units of mean free paths.
    fn interpolate(&self, rho: Float, r_optical: Float) -> Option<(Float, Float)> {
        let (rho_weights, rho_offset) = catmull_rom_weights(&self.rho_samples, rho)?;
        let (radius_weights, radius_offset) = catmull_rom_weights(&self.radius_samples, r_optical)?;
        let n_radius = self.radius_samples.len();

        let mut sr = 0.0;
        let mut rho_eff = 0.0;
        for (i, &wi) in rho_weights.iter().enumerate().filter(|(_, w)| **w != 0.0) {
            let row = (rho_offset + i as isize) as usize;
            rho_eff += self.rho_eff[row] * wi;
            for (j, &wj) in radius_weights.iter().enumerate().filter(|(_, w)| **w != 0.0) {
                let col = (radius_offset + j as isize) as usize;
                sr += self.profile[row * n_radius + col] * wi * wj;
            }
        }

        // Cancel the 2πr factor stored in the table.
        if r_optical != 0.0 {
            sr /= TWO_PI * r_optical;
        }
        Some((sr, rho_eff))
    }

    /// Inverts the effective albedo to find scattering coefficients that
    /// reproduce a diffuse reflectance with a given mean free path. Returns
    /// `(σa, σs)`.
    ///
    /// * `rho_eff` - Desired diffuse reflectance.
    /// * `mfp`     - Mean free path.
    pub fn subsurface_from_diffuse(&self, rho_eff: &Spectrum, mfp: &Spectrum) -> (Spectrum, Spectrum) {
        let mut sigma_a = Spectrum::ZERO;
        let mut sigma_s = Spectrum::ZERO;
        for c in 0..SPECTRUM_SAMPLES {
            let rho = invert_catmull_rom(&self.rho_samples, &self.rho_eff, rho_eff[c]);
            sigma_s[c] = rho / mfp[c];
            sigma_a[c] = (1.0 - rho) / mfp[c];
        }
        (sigma_a, sigma_s)
    }
}

/// Exit point found by `TabulatedBSSRDF::sample_s()`.
pub struct BSSRDFSample<'a> {
    /// The exit point, with a BSDF for the directional term and `wo` set to
    /// the shading normal.
    pub si: SurfaceInteraction<'a>,

    /// Spatial profile value between entry and exit points.
    pub s: Spectrum,

    /// Area density of the exit point.
    pub pdf: Float,
}

/// Separable BSSRDF at an entry point `po` whose radial profile comes from a
/// `BSSRDFTable` scaled by the medium's coefficients. Exit points are found
/// by tracing short rays through the surface around `po`.
#[derive(Copy, Clone)]
pub struct TabulatedBSSRDF<'a> {
    /// Entry point.
    p: Point3f,

    /// Time of the entry point.
    time: Float,

    /// Outgoing direction at the entry point.
    wo: Vector3f,

    /// Shading frame at the entry point.
    ns: Vector3f,
    ss: Vector3f,
    ts: Vector3f,

    /// Relative index of refraction.
    eta: Float,

    /// Light transport mode.
    mode: TransportMode,

    /// Extinction coefficient.
    sigma_t: Spectrum,

    /// Single scattering albedo.
    rho: Spectrum,

    /// Radial profile.
    table: &'a BSSRDFTable,

    /// Material of the surface; only exit points on it are admissible.
    material: &'a dyn Material,
}

impl<'a> TabulatedBSSRDF<'a> {
    /// Creates the BSSRDF at a surface interaction.
    ///
    /// * `po`       - Entry point.
    /// * `eta`      - Relative index of refraction.
    /// * `sigma_a`  - Absorption coefficient.
    /// * `sigma_s`  - Scattering coefficient.
    /// * `table`    - Radial profile.
    /// * `material` - Material of the surface.
    /// * `mode`     - Light transport mode.
    pub fn new(
        po: &SurfaceInteraction,
        eta: Float,
        sigma_a: Spectrum,
        sigma_s: Spectrum,
        table: &'a BSSRDFTable,
        material: &'a dyn Material,
        mode: TransportMode,
    ) -> Self {
        let (ss, ts) = shading_frame(&po.shading.n, &po.shading.dpdu);
        let sigma_t = sigma_a + sigma_s;
        Self {
            p: po.hit.p,
            time: po.hit.time,
            wo: po.hit.wo,
            ns: Vector3f::from(po.shading.n),
            ss,
            ts,
            eta,
            mode,
            sigma_t,
            rho: sigma_s.safe_div(&sigma_t),
            table,
            material,
        }
    }

    /// Evaluates `S(po, wo, pi, wi)` for an exit point and a direction leaving
    /// it.
    ///
    /// * `pi` - Exit point.
    /// * `wi` - Direction at the exit point.
    pub fn s(&self, pi: &SurfaceInteraction, wi: &Vector3f) -> Spectrum {
        let ft = 1.0 - fr_dielectric(self.wo.dot(&self.ns), 1.0, self.eta);
        let sw = BSSRDFAdapter::sw(self.eta, wi.dot(&pi.shading.n));
        self.sp(&pi.hit.p) * (ft * sw)
    }

    /// Spatial term at an exit point.
    ///
    /// * `pi` - Exit point.
    pub fn sp(&self, pi: &Point3f) -> Spectrum {
        self.sr(self.p.distance(pi))
    }

    /// Radial profile at distance `r` in world units.
    ///
    /// * `r` - Distance between entry and exit points.
    pub fn sr(&self, r: Float) -> Spectrum {
        let mut sr = Spectrum::ZERO;
        for ch in 0..SPECTRUM_SAMPLES {
            if let Some((value, _)) = self.table.interpolate(self.rho[ch], r * self.sigma_t[ch]) {
                sr[ch] = value;
            }
        }

        // Scale from optical to world units.
        (sr * self.sigma_t * self.sigma_t).clamp(0.0, INFINITY)
    }

    /// Samples a radius proportional to the profile of channel `ch`. Returns
    /// `None` for channels without extinction.
    ///
    /// * `ch` - Spectral channel.
    /// * `u`  - Uniform random value.
    pub fn sample_sr(&self, ch: usize, u: Float) -> Option<Float> {
        if self.sigma_t[ch] == 0.0 {
            return None;
        }
        let sample = sample_catmull_rom_2d(
            &self.table.rho_samples,
            &self.table.radius_samples,
            &self.table.profile,
            &self.table.profile_cdf,
            self.rho[ch],
            u,
        );
        Some(sample.x / self.sigma_t[ch])
    }

    /// Density of radii drawn by `sample_sr()`.
    ///
    /// * `ch` - Spectral channel.
    /// * `r`  - Radius in world units.
    pub fn pdf_sr(&self, ch: usize, r: Float) -> Float {
        match self.table.interpolate(self.rho[ch], r * self.sigma_t[ch]) {
            // NaN when the effective albedo vanishes; `max` maps it to 0.
            Some((sr, rho_eff)) => (sr * self.sigma_t[ch] * self.sigma_t[ch] / rho_eff).max(0.0),
            None => 0.0,
        }
    }

    /// Samples an exit point by choosing a projection axis and a channel,
    /// drawing a radius and tracing a ray through the scene along the axis.
    /// Returns the exit point, the spatial term and the combined area density.
    ///
    /// * `scene` - The scene.
    /// * `u1`    - Uniform value selecting axis, channel and intersection.
    /// * `u2`    - Uniform values for radius and angle.
    pub fn sample_sp(&self, scene: &'a Scene, u1: Float, u2: &Point2f) -> Option<(SurfaceInteraction<'a>, Spectrum, Float)> {
        // Trace along the normal half the time and along each tangent a
        // quarter of the time.
        let (vx, vy, vz, u1) = if u1 < 0.5 {
            (self.ss, self.ts, self.ns, u1 * 2.0)
        } else if u1 < 0.75 {
            (self.ts, self.ns, self.ss, (u1 - 0.5) * 4.0)
        } else {
            (self.ns, self.ss, self.ts, (u1 - 0.75) * 4.0)
        };

        let n_channels = SPECTRUM_SAMPLES as Float;
        let ch = min((u1 * n_channels) as usize, SPECTRUM_SAMPLES - 1);
        let u1 = u1 * n_channels - ch as Float;

        // Radius, angle and the half length of the ray inside the sphere
        // of radius `r_max`.
        let r = self.sample_sr(ch, u2[0])?;
        let r_max = self.sample_sr(ch, 0.999)?;
        if r < 0.0 || r >= r_max {
            return None;
        }
        let phi = TWO_PI * u2[1];
        let l = 2.0 * (r_max * r_max - r * r).sqrt();

        let start = self.p + r * (vx * phi.cos() + vy * phi.sin()) - vz * (l * 0.5);
        let target = start + vz * l;

        // Collect every crossing of this material along the ray.
        let mut chain: Vec<SurfaceInteraction<'a>> = Vec::new();
        let mut base = Hit::new_minimal(start, self.time, MediumInterface::default());
        loop {
            let mut ray = base.spawn_ray_to_point(&target);
            if ray.d.length_squared() == 0.0 {
                break;
            }
            match scene.intersect(&mut ray) {
                Some(si) => {
                    base = si.hit.clone();
                    if self.is_own_surface(&si) {
                        chain.push(si);
                    }
                }
                None => break,
            }
        }
        if chain.is_empty() {
            return None;
        }

        let n_found = chain.len();
        let pi = chain.swap_remove(min((u1 * n_found as Float) as usize, n_found - 1));
        let pdf = self.pdf_sp(&pi.hit) / n_found as Float;
        let sp = self.sp(&pi.hit.p);
        Some((pi, sp, pdf))
    }

    /// Area density of `sample_sp()` producing `pi`, combining all axes and
    /// channels.
    ///
    /// * `pi` - Exit point.
    pub fn pdf_sp(&self, pi: &Hit) -> Float {
        let d = self.p - pi.p;
        let d_local = Vector3f::new(self.ss.dot(&d), self.ts.dot(&d), self.ns.dot(&d));
        let n_local = Vector3f::new(self.ss.dot(&pi.n), self.ts.dot(&pi.n), self.ns.dot(&pi.n));

        // Radius seen when projecting along each local axis.
        let r_proj = [
            (d_local.y * d_local.y + d_local.z * d_local.z).sqrt(),
            (d_local.z * d_local.z + d_local.x * d_local.x).sqrt(),
            (d_local.x * d_local.x + d_local.y * d_local.y).sqrt(),
        ];

        let axis_prob = [0.25, 0.25, 0.5];
        let ch_prob = 1.0 / SPECTRUM_SAMPLES as Float;
        let mut pdf = 0.0;
        for axis in 0..3 {
            for ch in 0..SPECTRUM_SAMPLES {
                pdf += self.pdf_sr(ch, r_proj[axis]) * abs(n_local[axis]) * ch_prob * axis_prob[axis];
            }
        }
        pdf
    }

    /// Samples an exit point and prepares it for shading: the returned
    /// interaction carries a BSDF with the directional term and faces its
    /// shading normal. Returns `None` when no admissible exit point carries
    /// energy.
    ///
    /// * `scene` - The scene.
    /// * `arena` - The memory arena for the exit point's BSDF.
    /// * `u1`    - Uniform value selecting axis, channel and intersection.
    /// * `u2`    - Uniform values for radius and angle.
    pub fn sample_s(&self, scene: &'a Scene, arena: &'a MemoryArena, u1: Float, u2: &Point2f) -> Option<BSSRDFSample<'a>> {
        let (mut si, s, pdf) = self.sample_sp(scene, u1, u2)?;
        if s.is_black() || pdf == 0.0 {
            return None;
        }

        let adapter = BSSRDFAdapter::new(self.eta, self.mode);
        si.bsdf = Some(BSDF::alloc(arena, si.hit.n, si.shading.n, &si.shading.dpdu, 1.0, &[adapter]));
        si.hit.wo = Vector3f::from(si.shading.n);
        Some(BSSRDFSample { si, s, pdf })
    }

    fn is_own_surface(&self, si: &SurfaceInteraction) -> bool {
        si.primitive.and_then(|p| p.get_material()).map_or(false, |m| {
            Arc::as_ptr(&m) as *const u8 == self.material as *const dyn Material as *const u8
        })
    }
}

// ---- Tests ----

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    struct Opaque;

    impl Material for Opaque {
        fn compute_scattering_functions<'a>(
            &'a self,
            _si: &mut SurfaceInteraction<'a>,
            _arena: &'a MemoryArena,
            _mode: TransportMode,
            _allow_multiple_lobes: bool,
        ) {
        }
    }

    fn small_table() -> BSSRDFTable {
        BSSRDFTable::new(32, 48, 0.0, 1.33)
    }

    fn entry_point() -> SurfaceInteraction<'static> {
        SurfaceInteraction::new(
            Point3f::ZERO,
            Vector3f::ZERO,
            Point2f::default(),
            Vector3f::new(0.0, 0.0, 1.0),
            Vector3f::new(1.0, 0.0, 0.0),
            Vector3f::new(0.0, 1.0, 0.0),
            0.0,
            false,
        )
    }

    #[test]
    fn fresnel_moments_match_known_values() {
        assert!(approx_eq!(Float, fresnel_moment_1(1.0), 0.0, epsilon = 1e-2));
        assert!(approx_eq!(Float, fresnel_moment_2(1.0), 0.0, epsilon = 1e-2));
        assert!(fresnel_moment_1(1.5) > 0.0 && fresnel_moment_1(1.5) < 0.5);
    }

    #[test]
    fn effective_albedo_grows_with_albedo() {
        let table = small_table();
        let rho_eff = table.rho_eff();
        assert_eq!(rho_eff[0], 0.0);
        assert!(rho_eff[..24].windows(2).all(|w| w[1] > w[0]));
        assert!(rho_eff[rho_eff.len() - 1] > rho_eff[24]);
    }

    #[test]
    fn diffuse_inversion_recovers_coefficients() {
        let table = small_table();
        let mid = table.rho_eff()[20];
        let (sigma_a, sigma_s) = table.subsurface_from_diffuse(&Spectrum::new(mid), &Spectrum::new(0.5));

        // Albedo of the recovered medium maps back to the requested reflectance.
        let rho = sigma_s[0] / (sigma_a[0] + sigma_s[0]);
        assert!(approx_eq!(Float, sigma_a[0] + sigma_s[0], 2.0, epsilon = 1e-4));
        assert!(approx_eq!(Float, rho, table.rho_samples[20], epsilon = 1e-3));
    }

    #[test]
    fn profile_decays_with_distance() {
        let table = small_table();
        let material = Opaque;
        let bssrdf = TabulatedBSSRDF::new(
            &entry_point(),
            1.33,
            Spectrum::new(0.1),
            Spectrum::new(1.0),
            &table,
            &material,
            TransportMode::Radiance,
        );
        let near = bssrdf.sr(0.1);
        let far = bssrdf.sr(2.0);
        assert!(near[0] > far[0]);
        assert!(far[0] >= 0.0);
        assert!(bssrdf.sp(&Point3f::new(0.1, 0.0, 0.0))[1] > 0.0);
    }

    #[test]
    fn channels_without_extinction_are_not_sampled() {
        let table = small_table();
        let material = Opaque;
        let bssrdf = TabulatedBSSRDF::new(
            &entry_point(),
            1.33,
            Spectrum::from_rgb([1.0, 0.0, 1.0]),
            Spectrum::from_rgb([1.0, 0.0, 1.0]),
            &table,
            &material,
            TransportMode::Radiance,
        );
        assert!(bssrdf.sample_sr(1, 0.5).is_none());
        assert!(bssrdf.sample_sr(0, 0.5).is_some());
        assert_eq!(bssrdf.pdf_sr(1, 0.5), 0.0);
    }

    #[test]
    fn sampled_radii_have_density() {
        let table = small_table();
        let material = Opaque;
        let bssrdf = TabulatedBSSRDF::new(
            &entry_point(),
            1.33,
            Spectrum::new(0.5),
            Spectrum::new(2.0),
            &table,
            &material,
            TransportMode::Radiance,
        );
        let r_max = bssrdf.sample_sr(0, 0.999).unwrap();
        let mut previous = 0.0;
        for i in 1..20 {
            let r = bssrdf.sample_sr(0, i as Float / 20.0).unwrap();
            assert!(r >= previous && r <= r_max, "radius {} out of order", r);
            assert!(bssrdf.pdf_sr(0, r) > 0.0);
            previous = r;
        }
    }
}
