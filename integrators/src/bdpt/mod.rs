//! Bi-directional Path Tracer

use itertools::iproduct;
use render_core::app::*;
use render_core::camera::*;
use render_core::error::{ConfigError, ImageError};
use render_core::film::Film;
use render_core::geometry::*;
use render_core::integrator::*;
use render_core::light::*;
use render_core::light_distrib::*;
use render_core::material::*;
use render_core::memory::MemoryArena;
use render_core::paramset::*;
use render_core::pbrt::*;
use render_core::reflection::*;
use render_core::sampler::*;
use render_core::sampling::*;
use render_core::scene::*;
use render_core::spectrum::*;
use render_core::stats::RenderStats;
use std::collections::HashMap;
use std::sync::Arc;

mod common;
mod vertex;

use crate::common::max_depth;
use common::*;
use vertex::*;

/// Default edge length of image tiles rendered by BDPT.
pub const BDPT_TILE_SIZE: usize = 16;

/// Maximum path depth when strategy or weight visualization is enabled.
const MAX_VISUALIZE_DEPTH: usize = 5;

/// Result of a single connection strategy.
struct Connection {
    /// Weighted path contribution.
    l: Spectrum,

    /// Raster position when the strategy resampled the camera vertex.
    p_raster: Option<Point2f>,

    /// The MIS weight already applied to `l`.
    mis_weight: Float,
}

impl Connection {
    /// Returns a connection that does not contribute.
    fn empty() -> Self {
        Self {
            l: Spectrum::ZERO,
            p_raster: None,
            mis_weight: 0.0,
        }
    }
}

/// Implements bi-directional path tracing integrator.
pub struct BDPTIntegrator {
    /// The camera.
    camera: ArcCamera,

    /// The sampler. Tiles work on clones.
    sampler: Box<dyn Sampler>,

    /// Pixel bounds for the image.
    pixel_bounds: Bounds2i,

    /// Maximum path depth.
    max_depth: usize,

    /// Write the unweighted contribution of every strategy to its own film.
    visualize_strategies: bool,

    /// Write the weighted contribution of every strategy to its own film.
    visualize_weights: bool,

    /// Light sampling strategy.
    light_sample_strategy: LightSampleStategy,

    /// Per strategy films indexed by `buffer_index()`; empty unless
    /// visualizing.
    weight_films: Vec<Option<Film>>,
}

impl BDPTIntegrator {
    /// Create a new `BDPTIntegrator`.
    ///
    /// * `camera`                - The camera.
    /// * `sampler`               - The sampler.
    /// * `pixel_bounds`          - Pixel bounds for the image.
    /// * `max_depth`             - Maximum path depth.
    /// * `visualize_strategies`  - Write a film per strategy with unweighted
    ///                             contributions.
    /// * `visualize_weights`     - Write a film per strategy with weighted
    ///                             contributions.
    /// * `light_sample_strategy` - Light sampling strategy.
    pub fn new(
        camera: ArcCamera,
        sampler: Box<dyn Sampler>,
        pixel_bounds: Bounds2i,
        max_depth: usize,
        visualize_strategies: bool,
        visualize_weights: bool,
        light_sample_strategy: LightSampleStategy,
    ) -> Self {
        let mut weight_films = vec![];
        if visualize_strategies || visualize_weights {
            weight_films.resize_with(buffer_count(max_depth), || None);
            for (depth, s) in iproduct!(0..=max_depth, 0..=max_depth + 2) {
                if s > depth + 2 {
                    continue;
                }
                let t = depth + 2 - s;
                if t == 0 || (s == 1 && t == 1) {
                    continue;
                }
                let filename = format!("bdpt_d{:02}_s{:02}_t{:02}.png", depth, s, t);
                weight_films[buffer_index(s, t)] = Some(camera.film().duplicate(&filename));
            }
        }

        Self {
            camera,
            sampler,
            pixel_bounds,
            max_depth,
            visualize_strategies,
            visualize_weights,
            light_sample_strategy,
            weight_films,
        }
    }

    /// Create a `BDPTIntegrator` from `maxdepth`, `visualizestrategies`,
    /// `visualizeweights`, `pixelbounds` and `lightsamplestrategy`.
    ///
    /// * `params`  - Integrator parameters.
    /// * `camera`  - The camera.
    /// * `sampler` - The sampler.
    pub fn create(params: &ParamSet, camera: ArcCamera, sampler: Box<dyn Sampler>) -> Result<Self, ConfigError> {
        let mut max_depth = max_depth(params)?;
        let visualize_strategies = params.find_one_bool("visualizestrategies", false);
        let visualize_weights = params.find_one_bool("visualizeweights", false);

        if (visualize_strategies || visualize_weights) && max_depth > MAX_VISUALIZE_DEPTH {
            warn!(
                "visualizestrategies/visualizeweights was enabled, limiting maxdepth to {}",
                MAX_VISUALIZE_DEPTH
            );
            max_depth = MAX_VISUALIZE_DEPTH;
        }

        let pixel_bounds = get_pixel_bounds(params, &camera.film().get_sample_bounds())?;
        let lss = params.find_one_string("lightsamplestrategy", "power".to_owned());

        Ok(Self::new(
            camera,
            sampler,
            pixel_bounds,
            max_depth,
            visualize_strategies,
            visualize_weights,
            LightSampleStategy::from(lss.as_str()),
        ))
    }

    /// Returns the maximum path depth.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Returns the camera.
    pub fn camera(&self) -> &ArcCamera {
        &self.camera
    }

    /// Returns the number of samples per pixel.
    pub fn samples_per_pixel(&self) -> usize {
        self.sampler.samples_per_pixel()
    }

    /// Render the scene into the camera's film and return the sample
    /// statistics. Light splats are scaled when the image is written.
    ///
    /// * `scene`   - The scene.
    /// * `options` - Thread count, tile size and output settings.
    pub fn render(&self, scene: &Scene, options: &Options) -> RenderStats {
        if scene.lights.is_empty() {
            warn!("Scene has no lights; BDPT has nothing to render.");
            return RenderStats::new();
        }

        // Each sample looks the distribution up at its camera vertex.
        let light_distribution = LightDistribution::new(self.light_sample_strategy, scene);
        let light_index = light_index_map(scene);

        let film = self.camera.film();
        let grid = TileGrid::new(film.get_sample_bounds(), options.tile_size_or(BDPT_TILE_SIZE));
        let n_tiles = grid.n_tiles();
        info!("Rendering {}x{} tiles with BDPT", n_tiles.x, n_tiles.y);

        let stats = RenderStats::new();
        let progress = create_progress_bar(grid.count() as u64, options.quiet);
        progress.set_message("Rendering scene");

        render_tiles(&grid, options.threads(), &progress, |tile| {
            self.render_tile(tile, scene, &light_distribution, &light_index, &stats);
        });

        progress.finish_with_message("Render complete");
        stats.report();
        stats
    }

    /// Writes the film and any strategy films. Splats are scaled by
    /// `1 / samples_per_pixel`.
    pub fn write_image(&self) -> Result<(), ImageError> {
        let splat_scale = 1.0 / self.samples_per_pixel() as Float;
        self.camera.film().write_image(splat_scale)?;
        for film in self.weight_films.iter().flatten() {
            film.write_image(splat_scale)?;
        }
        Ok(())
    }

    /// Render an image tile and merge it into the film.
    ///
    /// * `tile`               - The tile.
    /// * `scene`              - The scene.
    /// * `light_distribution` - Light distribution for light subpaths.
    /// * `light_index`        - Map from light keys to light indices.
    /// * `stats`              - Sample statistics.
    fn render_tile(
        &self,
        tile: Tile,
        scene: &Scene,
        light_distribution: &LightDistribution,
        light_index: &HashMap<usize, usize>,
        stats: &RenderStats,
    ) {
        let film = self.camera.film();
        let mut sampler = self.sampler.clone_sampler(tile.index as u64);
        let mut arena = MemoryArena::default();

        debug!("Starting image tile ({}, {}) -> {}", tile.x, tile.y, tile.bounds);
        let mut film_tile = film.get_film_tile(&tile.bounds);

        for pixel in tile.bounds {
            sampler.start_pixel(&pixel);
            if !self.pixel_bounds.contains_exclusive(&pixel) {
                continue;
            }

            loop {
                let (p_film, l) = self.sample(
                    scene,
                    sampler.as_mut(),
                    &arena,
                    &pixel,
                    light_distribution,
                    light_index,
                    stats,
                );
                let l = stats.sanitize(l, &pixel, sampler.current_sample_number());
                film_tile.add_sample(p_film, l, 1.0);

                arena.reset();

                if !sampler.start_next_sample() {
                    break;
                }
            }
        }

        debug!("Finished image tile ({}, {}) -> {}", tile.x, tile.y, tile.bounds);
        film.merge_film_tile(film_tile);
    }

    /// Generates both subpaths for one pixel sample and executes every
    /// connection strategy. Returns the film position and the radiance of
    /// all strategies with `t > 1`; strategies with `t = 1` are splatted.
    #[allow(clippy::too_many_arguments)]
    fn sample(
        &self,
        scene: &Scene,
        sampler: &mut dyn Sampler,
        arena: &MemoryArena,
        pixel: &Point2i,
        light_distribution: &LightDistribution,
        light_index: &HashMap<usize, usize>,
        stats: &RenderStats,
    ) -> (Point2f, Spectrum) {
        let camera = self.camera.as_ref();
        let film = camera.film();

        // Trace the camera subpath.
        let (camera_vertices, p_film) =
            generate_camera_subpath(scene, sampler, arena, self.max_depth + 2, camera, pixel);

        // Trace the light subpath.
        let light_distr = light_distribution.lookup(&camera_vertices[0].p());
        let light_vertices = generate_light_subpath(
            scene,
            sampler,
            arena,
            self.max_depth + 1,
            camera_vertices[0].time(),
            &light_distr,
            light_index,
        );

        // Execute all BDPT connection strategies.
        let mut l = Spectrum::ZERO;
        for (t, s) in iproduct!(1..=camera_vertices.len(), 0..=light_vertices.len()) {
            let depth = s + t;
            if (s == 1 && t == 1) || depth < 2 || depth - 2 > self.max_depth {
                continue;
            }

            let Connection {
                l: l_path,
                p_raster,
                mis_weight,
            } = connect_bdpt(
                scene,
                &light_vertices,
                &camera_vertices,
                s,
                t,
                &light_distr,
                light_index,
                camera,
                sampler,
            );
            trace!("Connect BDPT s: {}, t: {}, l_path: {}, mis_weight: {}", s, t, l_path, mis_weight);

            if self.visualize_strategies || self.visualize_weights {
                let value = if self.visualize_weights {
                    l_path
                } else if mis_weight == 0.0 {
                    Spectrum::ZERO
                } else {
                    l_path / mis_weight
                };
                if let Some(weight_film) = self.weight_films[buffer_index(s, t)].as_ref() {
                    weight_film.add_splat(&p_raster.unwrap_or(p_film), &value);
                }
            }

            if t != 1 {
                l += l_path;
            } else if !l_path.is_black() {
                if let Some(p_raster) = p_raster {
                    film.add_splat(&p_raster, &l_path);
                    stats.add_splat();
                }
            }
        }

        (p_film, l)
    }
}

/// Generates a camera subpath starting at a camera ray through `pixel`.
/// Returns the vertices and the film position of the ray.
///
/// * `scene`     - The scene.
/// * `sampler`   - The sampler.
/// * `arena`     - Memory arena for BSDFs.
/// * `max_depth` - Maximum number of vertices.
/// * `camera`    - The camera.
/// * `pixel`     - The pixel.
fn generate_camera_subpath<'a>(
    scene: &'a Scene,
    sampler: &mut dyn Sampler,
    arena: &'a MemoryArena,
    max_depth: usize,
    camera: &'a dyn Camera,
    pixel: &Point2i,
) -> (Vec<Vertex<'a>>, Point2f) {
    let camera_sample = sampler.get_camera_sample(pixel);
    let p_film = camera_sample.p_film;

    let mut path = Vec::with_capacity(max_depth);
    if max_depth == 0 {
        return (path, p_film);
    }

    // Generate first vertex on camera subpath and start random walk.
    let (mut ray, _weight) = camera.generate_ray_differential(&camera_sample);
    ray.scale_differentials(1.0 / (sampler.samples_per_pixel() as Float).sqrt());

    let beta = Spectrum::ONE;
    let pdf_dir = camera.pdf_we(&ray).pdf_dir;
    path.push(Vertex::camera_from_ray(camera, &ray, beta));

    random_walk(
        scene,
        ray,
        sampler,
        arena,
        beta,
        pdf_dir,
        max_depth - 1,
        TransportMode::Radiance,
        &mut path,
    );
    (path, p_film)
}

/// Generates a light subpath starting at a light chosen from `light_distr`.
///
/// * `scene`       - The scene.
/// * `sampler`     - The sampler.
/// * `arena`       - Memory arena for BSDFs.
/// * `max_depth`   - Maximum number of vertices.
/// * `time`        - Time of the camera ray.
/// * `light_distr` - Light selection probabilities.
/// * `light_index` - Map from light keys to indices in `light_distr`.
fn generate_light_subpath<'a>(
    scene: &'a Scene,
    sampler: &mut dyn Sampler,
    arena: &'a MemoryArena,
    max_depth: usize,
    time: Float,
    light_distr: &Distribution1D,
    light_index: &HashMap<usize, usize>,
) -> Vec<Vertex<'a>> {
    let mut path = Vec::with_capacity(max_depth);
    if max_depth == 0 {
        return path;
    }

    // Sample initial ray for light subpath.
    let (light_num, light_pdf, _) = light_distr.sample_discrete(sampler.get_1d());
    let light = match scene.lights.get(light_num) {
        Some(light) => Arc::clone(light),
        None => return path,
    };
    let u1 = sampler.get_2d();
    let u2 = sampler.get_2d();
    let Le {
        ray,
        n_light,
        pdf_pos,
        pdf_dir,
        value,
    } = light.sample_le(&u1, &u2, time);
    if pdf_pos == 0.0 || pdf_dir == 0.0 || light_pdf == 0.0 || value.is_black() {
        return path;
    }

    // Generate first vertex on light subpath and start random walk.
    let d = ray.d;
    path.push(Vertex::light_from_ray(light, &ray, n_light, value, pdf_pos * light_pdf));
    let beta = value * n_light.abs_dot(&d) / (light_pdf * pdf_pos * pdf_dir);
    let n_vertices = random_walk(
        scene,
        ray,
        sampler,
        arena,
        beta,
        pdf_dir,
        max_depth - 1,
        TransportMode::Importance,
        &mut path,
    );

    // Correct subpath sampling densities for infinite area lights.
    if path[0].is_infinite_light() {
        // Set spatial density of `path[1]` for infinite area light.
        if n_vertices > 0 {
            path[1].pdf_fwd = pdf_pos;
            if path[1].is_on_surface() {
                path[1].pdf_fwd *= d.abs_dot(&path[1].ng());
            }
        }

        // Set spatial density of `path[0]` for infinite area light.
        path[0].pdf_fwd = infinite_light_density(scene, light_distr, light_index, &d);
    }

    path
}

/// Extends `path` by tracing `ray` through the scene. Returns the number of
/// vertices added.
///
/// * `scene`     - The scene.
/// * `ray`       - The ray leaving the last vertex of `path`.
/// * `sampler`   - The sampler.
/// * `arena`     - Memory arena for BSDFs.
/// * `beta`      - Throughput of the ray.
/// * `pdf`       - Solid angle density of the ray direction.
/// * `max_depth` - Maximum number of vertices to add.
/// * `mode`      - Light transport mode.
/// * `path`      - The subpath; must contain its endpoint.
#[allow(clippy::too_many_arguments)]
fn random_walk<'a>(
    scene: &'a Scene,
    mut ray: Ray,
    sampler: &mut dyn Sampler,
    arena: &'a MemoryArena,
    mut beta: Spectrum,
    pdf: Float,
    max_depth: usize,
    mode: TransportMode,
    path: &mut Vec<Vertex<'a>>,
) -> usize {
    if max_depth == 0 {
        return 0;
    }

    let mut bounces = 0;

    // Declare variables for forward and reverse probability densities.
    let mut pdf_fwd = pdf;
    let mut pdf_rev: Float;

    loop {
        // Attempt to create the next subpath vertex in `path`.
        trace!("Random walk bounce {}, beta = {}, pdf_fwd = {}", bounces, beta, pdf_fwd);

        // Trace a ray and sample the medium, if any.
        let isect = scene.intersect(&mut ray);
        let mut mi = None;
        if let Some(medium) = ray.medium.as_ref() {
            let (weight, sampled) = medium.sample(&ray, sampler);
            beta *= weight;
            mi = sampled;
        }
        if beta.is_black() {
            break;
        }

        let prev = path.len() - 1;
        if let Some(mi) = mi {
            // Record medium interaction in `path` and compute forward density.
            let vertex = Vertex::medium(mi.clone(), beta, pdf_fwd, &path[prev]);
            path.push(vertex);
            bounces += 1;
            if bounces >= max_depth {
                break;
            }

            // Sample direction and compute reverse density at preceding vertex.
            let wo = -ray.d;
            let u = sampler.get_2d();
            let (p, wi) = mi.phase.sample_p(&wo, &u);
            pdf_fwd = p;
            pdf_rev = p;
            ray = mi.spawn_ray(&wi);
        } else {
            // Handle surface interaction for path generation.
            let mut si = match isect {
                Some(si) => si,
                None => {
                    // Capture escaped rays when tracing from the camera.
                    if mode == TransportMode::Radiance {
                        path.push(Vertex::escaped(&ray, beta, pdf_fwd));
                        bounces += 1;
                    }
                    break;
                }
            };

            // Compute scattering functions and skip over medium boundaries.
            si.compute_scattering_functions(arena, mode, true);
            let bsdf = match si.bsdf {
                Some(bsdf) => bsdf,
                None => {
                    ray = si.spawn_ray(&ray.d);
                    continue;
                }
            };
            let hit = si.hit.clone();
            let ns = si.shading.n;

            // Initialize `vertex` with surface intersection information.
            let vertex = Vertex::surface(si, beta, pdf_fwd, &path[prev]);
            path.push(vertex);
            bounces += 1;
            if bounces >= max_depth {
                break;
            }

            // Sample BSDF at current vertex and compute reverse probability.
            let wo = hit.wo;
            let u = sampler.get_2d();
            let BxDFSample { f, pdf, wi, bxdf_type } = bsdf.sample_f(&wo, &u, BxDFType::BSDF_ALL);
            if f.is_black() || pdf == 0.0 {
                break;
            }
            pdf_fwd = pdf;
            beta *= f * wi.abs_dot(&ns) / pdf_fwd;
            pdf_rev = bsdf.pdf(&wi, &wo, BxDFType::BSDF_ALL);
            if bxdf_type.is_specular() {
                let n = path.len();
                path[n - 1].delta = true;
                pdf_rev = 0.0;
                pdf_fwd = 0.0;
            }
            beta *= correct_shading_normal(&ns, &hit.n, &wo, &wi, mode);
            ray = hit.spawn_ray(&wi);
        }

        // Compute reverse area density at preceding vertex.
        let n = path.len();
        path[n - 2].pdf_rev = path[n - 1].convert_density(pdf_rev, &path[n - 2]);
    }

    bounces
}

/// Returns the generalized geometry term between two vertices including
/// the transmittance between them.
///
/// * `scene`   - The scene.
/// * `sampler` - The sampler.
/// * `v0`      - First vertex.
/// * `v1`      - Second vertex.
fn g(scene: &Scene, sampler: &mut dyn Sampler, v0: &Vertex, v1: &Vertex) -> Spectrum {
    let d = v0.p() - v1.p();
    let mut g = 1.0 / d.length_squared();
    let d = d * g.sqrt();
    if v0.is_on_surface() {
        g *= v0.ns().abs_dot(&d);
    }
    if v1.is_on_surface() {
        g *= v1.ns().abs_dot(&d);
    }
    let vis = VisibilityTester::new(v0.hit().clone(), v1.hit().clone());
    vis.tr(scene, sampler) * g
}

/// Executes connection strategy `(s, t)` and returns its weighted
/// contribution.
///
/// * `scene`           - The scene.
/// * `light_vertices`  - The light subpath.
/// * `camera_vertices` - The camera subpath.
/// * `s`               - Number of light subpath vertices to use.
/// * `t`               - Number of camera subpath vertices to use.
/// * `light_distr`     - Light selection probabilities.
/// * `light_index`     - Map from light keys to indices in `light_distr`.
/// * `camera`          - The camera.
/// * `sampler`         - The sampler.
#[allow(clippy::too_many_arguments)]
fn connect_bdpt<'a>(
    scene: &'a Scene,
    light_vertices: &[Vertex<'a>],
    camera_vertices: &[Vertex<'a>],
    s: usize,
    t: usize,
    light_distr: &Distribution1D,
    light_index: &HashMap<usize, usize>,
    camera: &'a dyn Camera,
    sampler: &mut dyn Sampler,
) -> Connection {
    // Ignore invalid connections related to infinite area lights.
    if t > 1 && s != 0 && matches!(camera_vertices[t - 1].kind, VertexKind::Light { .. }) {
        return Connection::empty();
    }

    let mut l = Spectrum::ZERO;
    let mut p_raster = None;
    let mut sampled: Option<Vertex<'a>> = None;

    if s == 0 {
        // Interpret the camera subpath as a complete path.
        let pt = &camera_vertices[t - 1];
        if pt.is_light() {
            l = pt.le(scene, &camera_vertices[t - 2]) * pt.beta;
        }
    } else if t == 1 {
        // Sample a point on the camera and connect it to the light subpath.
        let qs = &light_vertices[s - 1];
        if qs.is_connectible() {
            let u = sampler.get_2d();
            if let Some(CameraWi {
                value,
                wi,
                pdf,
                p_raster: raster,
                vis,
            }) = camera.sample_wi(qs.hit(), &u)
            {
                p_raster = Some(raster);
                if pdf > 0.0 && !value.is_black() {
                    let v = Vertex::camera_from_hit(camera, vis.p1.clone(), value / pdf);
                    l = qs.beta * qs.f(&v, TransportMode::Importance) * v.beta;
                    if qs.is_on_surface() {
                        l *= wi.abs_dot(&qs.ns());
                    }
                    if !l.is_black() {
                        l *= vis.tr(scene, sampler);
                    }
                    sampled = Some(v);
                }
            }
        }
    } else if s == 1 {
        // Sample a point on a light and connect it to the camera subpath.
        let pt = &camera_vertices[t - 1];
        if pt.is_connectible() {
            let (light_num, light_pdf, _) = light_distr.sample_discrete(sampler.get_1d());
            let u = sampler.get_2d();
            if let Some(light) = scene.lights.get(light_num) {
                let Li {
                    wi,
                    pdf,
                    visibility,
                    value,
                } = light.sample_li(pt.hit(), &u);
                if let Some(vis) = visibility.filter(|_| pdf > 0.0 && !value.is_black()) {
                    let mut v = Vertex::light_from_hit(
                        Arc::clone(light),
                        vis.p1.clone(),
                        value / (pdf * light_pdf),
                        0.0,
                    );
                    v.pdf_fwd = v.pdf_light_origin(scene, pt, light_distr, light_index);
                    l = pt.beta * pt.f(&v, TransportMode::Radiance) * v.beta;
                    if pt.is_on_surface() {
                        l *= wi.abs_dot(&pt.ns());
                    }
                    if !l.is_black() {
                        l *= vis.tr(scene, sampler);
                    }
                    sampled = Some(v);
                }
            }
        }
    } else {
        // Handle all other bidirectional connection cases.
        let qs = &light_vertices[s - 1];
        let pt = &camera_vertices[t - 1];
        if qs.is_connectible() && pt.is_connectible() {
            l = qs.beta * qs.f(pt, TransportMode::Importance) * pt.f(qs, TransportMode::Radiance) * pt.beta;
            trace!("General connect s: {}, t: {} qs: {} pt: {}", s, t, qs, pt);
            if !l.is_black() {
                l *= g(scene, sampler, qs, pt);
            }
        }
    }

    // Compute MIS weight for connection strategy.
    let mis_weight = if l.is_black() {
        0.0
    } else {
        mis_weight(
            scene,
            light_vertices,
            camera_vertices,
            sampled.as_ref(),
            s,
            t,
            light_distr,
            light_index,
        )
    };

    Connection {
        l: l * mis_weight,
        p_raster,
        mis_weight,
    }
}

/// Computes the MIS weight of strategy `(s, t)` from snapshots of the
/// subpath densities. The vertex arrays are left untouched.
///
/// * `scene`           - The scene.
/// * `light_vertices`  - The light subpath.
/// * `camera_vertices` - The camera subpath.
/// * `sampled`         - Endpoint resampled by strategies with `s = 1` or
///                       `t = 1`.
/// * `s`               - Number of light subpath vertices.
/// * `t`               - Number of camera subpath vertices.
/// * `light_distr`     - Light selection probabilities.
/// * `light_index`     - Map from light keys to indices in `light_distr`.
#[allow(clippy::too_many_arguments)]
fn mis_weight<'a>(
    scene: &Scene,
    light_vertices: &[Vertex<'a>],
    camera_vertices: &[Vertex<'a>],
    sampled: Option<&Vertex<'a>>,
    s: usize,
    t: usize,
    light_distr: &Distribution1D,
    light_index: &HashMap<usize, usize>,
) -> Float {
    if s + t == 2 {
        return 1.0;
    }

    // Vertices of the strategy with the resampled endpoint substituted.
    let mut light: Vec<&Vertex<'a>> = light_vertices[..s].iter().collect();
    let mut camera: Vec<&Vertex<'a>> = camera_vertices[..t].iter().collect();
    if let Some(v) = sampled {
        if s == 1 {
            light[0] = v;
        } else if t == 1 {
            camera[0] = v;
        }
    }

    let mut light_densities: Vec<VertexDensity> = light.iter().map(|v| v.density()).collect();
    let mut camera_densities: Vec<VertexDensity> = camera.iter().map(|v| v.density()).collect();

    let pt = camera[t - 1];
    let pt_minus = if t > 1 { Some(camera[t - 2]) } else { None };
    let qs = if s > 0 { Some(light[s - 1]) } else { None };
    let qs_minus = if s > 1 { Some(light[s - 2]) } else { None };

    // The connection vertices are never delta vertices.
    camera_densities[t - 1].delta = false;
    if s > 0 {
        light_densities[s - 1].delta = false;
    }

    // Reverse density of the camera subpath endpoint.
    camera_densities[t - 1].pdf_rev = match qs {
        Some(qs) => qs.pdf(scene, qs_minus, pt),
        None => pt_minus.map_or(0.0, |pt_minus| {
            pt.pdf_light_origin(scene, pt_minus, light_distr, light_index)
        }),
    };

    // Reverse density of the camera subpath predecessor.
    if let Some(pt_minus) = pt_minus {
        camera_densities[t - 2].pdf_rev = match qs {
            Some(qs) => pt.pdf(scene, Some(qs), pt_minus),
            None => pt.pdf_light(scene, pt_minus),
        };
    }

    // Reverse densities of the light subpath endpoint and its predecessor.
    if let Some(qs) = qs {
        light_densities[s - 1].pdf_rev = pt.pdf(scene, pt_minus, qs);
        if let Some(qs_minus) = qs_minus {
            light_densities[s - 2].pdf_rev = qs.pdf(scene, Some(pt), qs_minus);
        }
    }

    let delta_light_origin = s > 0 && light[0].is_delta_light();
    mis_weight_from_densities(&camera_densities, &light_densities, delta_light_origin)
}

// ---- Tests ----

#[cfg(test)]
mod tests {
    use super::*;
    use crate::direct_lighting::DirectLightingIntegrator;
    use crate::test_util::*;
    use float_cmp::approx_eq;

    fn bdpt(max_depth: Int, spp: usize) -> BDPTIntegrator {
        let mut params = ParamSet::new();
        params.add_int("maxdepth", &[max_depth]);
        BDPTIntegrator::create(&params, overhead_camera(8, 8), random_sampler(spp)).unwrap()
    }

    fn direct_lighting(scene: &Scene, max_depth: Int, spp: usize) -> DirectLightingIntegrator {
        let mut params = ParamSet::new();
        params.add_int("maxdepth", &[max_depth]);
        let mut integrator =
            DirectLightingIntegrator::create(&params, overhead_camera(8, 8), random_sampler(spp)).unwrap();
        integrator.preprocess(scene);
        integrator
    }

    /// Returns the mean red channel over the film.
    fn image_mean(camera: &ArcCamera, splat_scale: Float) -> Float {
        let film = camera.film();
        let mut sum = 0.0;
        let mut n = 0;
        for p in film.cropped_pixel_bounds {
            sum += film.get_pixel_rgb(&p, splat_scale)[0];
            n += 1;
        }
        sum / n as Float
    }

    #[test]
    fn depth_zero_matches_direct_lighting() {
        let scene = emitter_plane(Spectrum::new(2.0));

        let integrator = bdpt(0, 2);
        let stats = integrator.render(&scene, &quiet_options());
        assert_eq!(stats.samples(), 8 * 8 * 2);
        assert_eq!(stats.splats(), 0);

        let direct = direct_lighting(&scene, 0, 2);
        direct.render(&scene, &quiet_options());

        let film = integrator.camera().film();
        let direct_film = direct.get_data().camera.film();
        for p in film.cropped_pixel_bounds {
            let l = film.get_pixel_rgb(&p, 0.5);
            let expected = direct_film.get_pixel_rgb(&p, 1.0);
            assert!(approx_eq!(Float, l[0], 2.0, epsilon = 1e-4), "pixel {:?}: {}", p, l[0]);
            assert!(approx_eq!(Float, l[0], expected[0], epsilon = 1e-4));
        }
    }

    #[test]
    fn point_light_over_plane_agrees_with_direct_lighting() {
        let scene = lit_plane(&[(Point3f::new(0.0, 0.0, 2.0), 4.0)]);
        let spp = 16;

        let integrator = bdpt(1, spp);
        integrator.render(&scene, &quiet_options());
        let l = image_mean(integrator.camera(), 1.0 / spp as Float);

        let direct = direct_lighting(&scene, 1, spp);
        direct.render(&scene, &quiet_options());
        let expected = image_mean(&direct.get_data().camera, 1.0);

        assert!(expected > 0.0);
        assert!((l - expected).abs() < 0.1 * expected, "{} vs {}", l, expected);
    }

    #[test]
    fn pixel_bounds_restrict_camera_samples() {
        let scene = lit_plane(&[(Point3f::new(0.0, 0.0, 2.0), 4.0)]);
        let mut params = ParamSet::new();
        params.add_int("maxdepth", &[2]);
        params.add_int("pixelbounds", &[1, 4, 5, 8]);
        let integrator = BDPTIntegrator::create(&params, overhead_camera(8, 8), random_sampler(2)).unwrap();

        let stats = integrator.render(&scene, &quiet_options());
        let inside = Bounds2i::new(Point2i::new(1, 5), Point2i::new(4, 8));
        assert_eq!(stats.samples(), inside.area() as u64 * 2);

        // Light subpaths may splat anywhere, but filtered samples stay inside.
        let film = integrator.camera().film();
        for p in film.cropped_pixel_bounds {
            let weight = film.get_filter_weight_sum(&p);
            if inside.contains_exclusive(&p) {
                assert!(weight > 0.0, "pixel {:?} has no samples", p);
            } else {
                assert_eq!(weight, 0.0, "pixel {:?} outside the bounds was sampled", p);
            }
        }
    }

    #[test]
    fn visualization_limits_depth_and_names_films() {
        let mut params = ParamSet::new();
        params.add_int("maxdepth", &[8]);
        params.add_bool("visualizestrategies", &[true]);
        let integrator = BDPTIntegrator::create(&params, overhead_camera(4, 4), random_sampler(1)).unwrap();
        assert_eq!(integrator.max_depth(), 5);
        assert_eq!(integrator.weight_films.len(), buffer_count(5));

        let film = integrator.weight_films[buffer_index(0, 2)].as_ref().unwrap();
        assert_eq!(film.filename, "bdpt_d00_s00_t02.png");
        let film = integrator.weight_films[buffer_index(2, 3)].as_ref().unwrap();
        assert_eq!(film.filename, "bdpt_d03_s02_t03.png");

        // Strategy (1, 1) is never executed.
        assert!(integrator.weight_films[buffer_index(1, 1)].is_none());
    }

    #[test]
    fn plain_rendering_has_no_weight_films() {
        let integrator = bdpt(7, 1);
        assert_eq!(integrator.max_depth(), 7);
        assert!(integrator.weight_films.is_empty());
    }

    #[test]
    fn scene_without_lights_renders_nothing() {
        let scene = lit_plane(&[]);
        let integrator = bdpt(3, 2);
        let stats = integrator.render(&scene, &quiet_options());
        assert_eq!(stats.samples(), 0);
    }

    #[test]
    fn subpaths_end_on_the_plane() {
        let scene = lit_plane(&[(Point3f::new(0.0, 0.0, 2.0), 4.0)]);
        let integrator = bdpt(3, 1);
        let light_distribution = LightDistribution::new(LightSampleStategy::Power, &scene);
        let light_distr = light_distribution.lookup(&Point3f::ZERO);
        let light_index = light_index_map(&scene);

        let mut sampler = random_sampler(1);
        sampler.start_pixel(&Point2i::new(4, 4));
        let arena = MemoryArena::default();

        let (camera_vertices, _) = generate_camera_subpath(
            &scene,
            sampler.as_mut(),
            &arena,
            5,
            integrator.camera().as_ref(),
            &Point2i::new(4, 4),
        );
        assert!(camera_vertices.len() >= 2);
        assert!(matches!(camera_vertices[0].kind, VertexKind::Camera { .. }));
        assert!(approx_eq!(Float, camera_vertices[1].p().z, 0.0, epsilon = 1e-4));
        assert!(camera_vertices[1].pdf_fwd > 0.0);
        assert!(camera_vertices[0].pdf_rev >= 0.0);

        let light_vertices =
            generate_light_subpath(&scene, sampler.as_mut(), &arena, 4, 0.0, &light_distr, &light_index);
        assert!(!light_vertices.is_empty());
        assert!(light_vertices[0].is_delta_light());
        assert!(approx_eq!(Float, light_vertices[0].pdf_fwd, 1.0));
    }
}
