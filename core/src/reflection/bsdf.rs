//! BSDF

use super::*;
use crate::memory::MemoryArena;

/// A collection of BRDFs and BTDFs at a surface point together with the
/// local shading frame. Both the `BSDF` and its BxDFs live in the per-sample
/// memory arena.
#[derive(Copy, Clone, Debug)]
pub struct BSDF<'a> {
    /// Relative index of refraction over the surface boundary.
    pub eta: Float,

    /// The shading normal; the z-axis of the shading frame.
    pub ns: Normal3f,

    /// The geometric normal defined by surface geometry.
    pub ng: Normal3f,

    /// x-axis of the shading frame.
    pub ss: Vector3f,

    /// y-axis of the shading frame.
    pub ts: Vector3f,

    /// The `BxDF`s.
    bxdfs: &'a [BxDF],
}

/// Returns the tangent axes `(ss, ts)` of an orthonormal frame around the
/// shading normal, with `ss` following the projection of `dpdu`.
///
/// * `ns`   - Shading normal.
/// * `dpdu` - Shading tangent; any vector not parallel to `ns` works.
pub fn shading_frame(ns: &Normal3f, dpdu: &Vector3f) -> (Vector3f, Vector3f) {
    let n = Vector3f::from(*ns);
    let tangent = *dpdu - n * n.dot(dpdu);
    if tangent.length_squared() > 1e-12 {
        let ss = tangent.normalize();
        (ss, n.cross(&ss))
    } else {
        coordinate_system(&n)
    }
}

impl<'a> BSDF<'a> {
    /// Creates a new `BSDF`.
    ///
    /// * `ng`    - Geometric normal.
    /// * `ns`    - Shading normal.
    /// * `dpdu`  - Shading tangent; any vector not parallel to `ns` works.
    /// * `eta`   - Relative index of refraction; 1 for opaque surfaces.
    /// * `bxdfs` - The scattering models.
    pub fn new(ng: Normal3f, ns: Normal3f, dpdu: &Vector3f, eta: Float, bxdfs: &'a [BxDF]) -> Self {
        let (ss, ts) = shading_frame(&ns, dpdu);
        Self {
            eta,
            ns,
            ng,
            ss,
            ts,
            bxdfs,
        }
    }

    /// Allocates a `BSDF` and its `BxDF`s in the arena.
    ///
    /// * `arena` - The memory arena.
    /// * `ng`    - Geometric normal.
    /// * `ns`    - Shading normal.
    /// * `dpdu`  - Shading tangent.
    /// * `eta`   - Relative index of refraction.
    /// * `bxdfs` - The scattering models.
    pub fn alloc(
        arena: &'a MemoryArena,
        ng: Normal3f,
        ns: Normal3f,
        dpdu: &Vector3f,
        eta: Float,
        bxdfs: &[BxDF],
    ) -> &'a BSDF<'a> {
        let bxdfs: &'a [BxDF] = arena.alloc_slice_copy(bxdfs);
        arena.alloc(Self::new(ng, ns, dpdu, eta, bxdfs))
    }

    /// Returns the number of `BxDF`s that match the given flags.
    ///
    /// * `flags` - The `BxDFType` to match.
    pub fn num_components(&self, flags: BxDFType) -> usize {
        self.bxdfs.iter().filter(|b| b.matches_flags(flags)).count()
    }

    /// Transforms a vector from world space to the local shading frame.
    ///
    /// * `v` - The vector to transform.
    pub fn world_to_local(&self, v: &Vector3f) -> Vector3f {
        Vector3f::new(v.dot(&self.ss), v.dot(&self.ts), v.dot(&self.ns))
    }

    /// Transforms a vector from the local shading frame to world space.
    ///
    /// * `v` - The vector to transform.
    pub fn local_to_world(&self, v: &Vector3f) -> Vector3f {
        Vector3f::new(
            self.ss.x * v.x + self.ts.x * v.y + self.ns.x * v.z,
            self.ss.y * v.x + self.ts.y * v.y + self.ns.y * v.z,
            self.ss.z * v.x + self.ts.z * v.y + self.ns.z * v.z,
        )
    }

    fn sums_side(&self, bxdf: &BxDF, reflect: bool) -> bool {
        let t = bxdf.get_type();
        (reflect && t.contains(BxDFType::BSDF_REFLECTION)) || (!reflect && t.contains(BxDFType::BSDF_TRANSMISSION))
    }

    /// Returns the BSDF evaluated for a pair of directions. The geometric
    /// normal decides between reflection and transmission.
    ///
    /// * `wo_w`  - Outgoing direction in world-space.
    /// * `wi_w`  - Incident direction in world-space.
    /// * `flags` - The `BxDFType` to evaluate.
    pub fn f(&self, wo_w: &Vector3f, wi_w: &Vector3f, flags: BxDFType) -> Spectrum {
        let wi = self.world_to_local(wi_w);
        let wo = self.world_to_local(wo_w);
        if wo.z == 0.0 {
            return Spectrum::ZERO;
        }

        let reflect = wi_w.dot(&self.ng) * wo_w.dot(&self.ng) > 0.0;
        self.bxdfs
            .iter()
            .filter(|b| b.matches_flags(flags) && self.sums_side(b, reflect))
            .map(|b| b.f(&wo, &wi))
            .sum()
    }

    /// Samples an incident direction by choosing one of the matching
    /// components uniformly. Returns a zero sample when nothing matches.
    ///
    /// * `wo_w`  - Outgoing direction in world-space.
    /// * `u`     - The 2D uniform random values.
    /// * `flags` - The `BxDFType` to sample.
    pub fn sample_f(&self, wo_w: &Vector3f, u: &Point2f, flags: BxDFType) -> BxDFSample {
        // Choose which `BxDF` to sample.
        let matching_comps = self.num_components(flags);
        if matching_comps == 0 {
            return BxDFSample::default();
        }
        let comp = min((u[0] * matching_comps as Float).floor() as usize, matching_comps - 1);
        let bxdf = match self.bxdfs.iter().filter(|b| b.matches_flags(flags)).nth(comp) {
            Some(b) => b,
            None => return BxDFSample::default(),
        };

        // Remap BxDF sample `u` to [0,1)^2.
        let u_remapped = Point2f::new(
            min(u[0] * matching_comps as Float - comp as Float, ONE_MINUS_EPSILON),
            u[1],
        );

        // Sample chosen `BxDF`.
        let wo = self.world_to_local(wo_w);
        if wo.z == 0.0 {
            return BxDFSample::default();
        }
        let sample = bxdf.sample_f(&wo, &u_remapped);
        if sample.pdf == 0.0 {
            return BxDFSample::from(sample.bxdf_type);
        }
        let wi_w = self.local_to_world(&sample.wi);

        // Compute overall PDF with all matching BxDFs.
        let mut pdf = sample.pdf;
        let specular = bxdf.get_type().is_specular();
        if !specular && matching_comps > 1 {
            pdf = self
                .bxdfs
                .iter()
                .filter(|b| b.matches_flags(flags))
                .map(|b| b.pdf(&wo, &sample.wi))
                .sum();
        }
        if matching_comps > 1 {
            pdf /= matching_comps as Float;
        }

        // Compute value of BSDF for sampled direction.
        let f = if !specular && matching_comps > 1 {
            let reflect = wi_w.dot(&self.ng) * wo_w.dot(&self.ng) > 0.0;
            self.bxdfs
                .iter()
                .filter(|b| b.matches_flags(flags) && self.sums_side(b, reflect))
                .map(|b| b.f(&wo, &sample.wi))
                .sum()
        } else {
            sample.f
        };

        BxDFSample::new(f, pdf, wi_w, sample.bxdf_type)
    }

    /// Evaluates the PDF of `sample_f()` for a pair of directions.
    ///
    /// * `wo_w`  - Outgoing direction in world-space.
    /// * `wi_w`  - Incident direction in world-space.
    /// * `flags` - The `BxDFType` to evaluate.
    pub fn pdf(&self, wo_w: &Vector3f, wi_w: &Vector3f, flags: BxDFType) -> Float {
        let wo = self.world_to_local(wo_w);
        let wi = self.world_to_local(wi_w);
        if wo.z == 0.0 {
            return 0.0;
        }

        let (count, pdf) = self
            .bxdfs
            .iter()
            .filter(|b| b.matches_flags(flags))
            .fold((0, 0.0), |(count, pdf), b| (count + 1, pdf + b.pdf(&wo, &wi)));
        if count > 0 {
            pdf / count as Float
        } else {
            0.0
        }
    }
}

// ---- Tests ----

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;
    use proptest::prelude::*;

    fn up() -> Normal3f {
        Normal3f::new(0.0, 0.0, 1.0)
    }

    #[test]
    fn lambertian_evaluates_to_albedo_over_pi() {
        let bxdfs = [LambertianReflection::new(Spectrum::new(0.5))];
        let bsdf = BSDF::new(up(), up(), &Vector3f::new(1.0, 0.0, 0.0), 1.0, &bxdfs);
        let wo = Vector3f::new(0.0, 0.3, 1.0).normalize();
        let wi = Vector3f::new(0.2, 0.0, 1.0).normalize();
        let f = bsdf.f(&wo, &wi, BxDFType::BSDF_ALL);
        assert!(approx_eq!(Float, f[0], 0.5 * INV_PI, epsilon = 1e-6));

        // Transmission side gets nothing from a reflection-only BSDF.
        let below = Vector3f::new(0.2, 0.0, -1.0).normalize();
        assert!(bsdf.f(&wo, &below, BxDFType::BSDF_ALL).is_black());
    }

    #[test]
    fn num_components_uses_flag_containment() {
        let bxdfs = [
            LambertianReflection::new(Spectrum::ONE),
            SpecularReflection::new(Spectrum::ONE, Fresnel::NoOp),
        ];
        let bsdf = BSDF::new(up(), up(), &Vector3f::new(1.0, 0.0, 0.0), 1.0, &bxdfs);
        assert_eq!(bsdf.num_components(BxDFType::BSDF_ALL), 2);
        let no_specular = BxDFType::BSDF_ALL & !BxDFType::BSDF_SPECULAR;
        assert_eq!(bsdf.num_components(no_specular), 1);
    }

    #[test]
    fn mirror_sample_reflects_about_normal() {
        let bxdfs = [SpecularReflection::new(Spectrum::ONE, Fresnel::NoOp)];
        let bsdf = BSDF::new(up(), up(), &Vector3f::new(1.0, 0.0, 0.0), 1.0, &bxdfs);
        let wo = Vector3f::new(1.0, 0.0, 1.0).normalize();
        let s = bsdf.sample_f(&wo, &Point2f::new(0.5, 0.5), BxDFType::BSDF_ALL);
        assert_eq!(s.pdf, 1.0);
        assert!(approx_eq!(Float, s.wi.x, -wo.x, epsilon = 1e-6));
        assert!(approx_eq!(Float, s.wi.z, wo.z, epsilon = 1e-6));
        assert!(s.bxdf_type.is_specular());
    }

    #[test]
    fn glass_conserves_energy_at_normal_incidence() {
        let bxdfs = [FresnelSpecular::new(
            Spectrum::ONE,
            Spectrum::ONE,
            1.0,
            1.5,
            TransportMode::Importance,
        )];
        let bsdf = BSDF::new(up(), up(), &Vector3f::new(1.0, 0.0, 0.0), 1.5, &bxdfs);
        let wo = Vector3f::new(0.0, 0.0, 1.0);
        let r = bsdf.sample_f(&wo, &Point2f::new(0.01, 0.5), BxDFType::BSDF_ALL);
        let t = bsdf.sample_f(&wo, &Point2f::new(0.99, 0.5), BxDFType::BSDF_ALL);
        let weight = |s: &BxDFSample| s.f[0] * abs(s.wi.z) / s.pdf;
        assert!(approx_eq!(Float, weight(&r), 1.0, epsilon = 1e-4));
        assert!(approx_eq!(Float, weight(&t), 1.0, epsilon = 1e-4));
    }

    proptest! {
        #[test]
        fn sampled_pdf_matches_evaluated_pdf(u in 0.0..1.0_f32, v in 0.0..1.0_f32) {
            let bxdfs = [LambertianReflection::new(Spectrum::new(0.8))];
            let bsdf = BSDF::new(up(), up(), &Vector3f::new(0.0, 1.0, 0.0), 1.0, &bxdfs);
            let wo = Vector3f::new(0.3, -0.2, 0.9).normalize();
            let s = bsdf.sample_f(&wo, &Point2f::new(u, v), BxDFType::BSDF_ALL);
            if s.pdf > 0.0 {
                prop_assert!(approx_eq!(Float, s.pdf, bsdf.pdf(&wo, &s.wi, BxDFType::BSDF_ALL), epsilon = 1e-4));
            }
        }
    }
}
