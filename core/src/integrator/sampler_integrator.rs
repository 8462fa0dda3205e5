//! Sampler Integrator

use crate::app::*;
use crate::camera::*;
use crate::geometry::*;
use crate::interaction::*;
use crate::memory::MemoryArena;
use crate::pbrt::*;
use crate::reflection::*;
use crate::sampler::*;
use crate::scene::*;
use crate::spectrum::*;
use crate::stats::RenderStats;
use indicatif::ProgressBar;
use std::sync::Arc;

/// Default edge length of square image tiles in pixels.
pub const DEFAULT_TILE_SIZE: usize = 32;

/// A rectangular region of the sample bounds rendered by a single task.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Tile {
    /// Tile index `y * n_tiles_x + x`; also used to seed the task's sampler.
    pub index: usize,

    /// Tile coordinates in the tile grid.
    pub x: usize,
    pub y: usize,

    /// Pixel bounds covered by the tile.
    pub bounds: Bounds2i,
}

/// Splits the film sample bounds into tiles.
#[derive(Copy, Clone, Debug)]
pub struct TileGrid {
    /// The sample bounds.
    sample_bounds: Bounds2i,

    /// Tile edge length.
    tile_size: Int,

    /// Number of tiles in x and y.
    n_tiles: Point2<usize>,
}

impl TileGrid {
    /// Create a new `TileGrid`.
    ///
    /// * `sample_bounds` - The film sample bounds.
    /// * `tile_size`     - Tile edge length in pixels.
    pub fn new(sample_bounds: Bounds2i, tile_size: usize) -> Self {
        let tile_size = max(1, tile_size) as Int;
        let extent = sample_bounds.diagonal();
        let n_tiles = Point2::new(
            max(0, (extent.x + tile_size - 1) / tile_size) as usize,
            max(0, (extent.y + tile_size - 1) / tile_size) as usize,
        );
        Self {
            sample_bounds,
            tile_size,
            n_tiles,
        }
    }

    /// Returns the number of tiles in x and y.
    pub fn n_tiles(&self) -> Point2<usize> {
        self.n_tiles
    }

    /// Returns the total number of tiles.
    pub fn count(&self) -> usize {
        self.n_tiles.x * self.n_tiles.y
    }

    /// Returns the tile at a given index.
    ///
    /// * `index` - Tile index in `[0, count())`.
    pub fn tile(&self, index: usize) -> Tile {
        let x = index % self.n_tiles.x;
        let y = index / self.n_tiles.x;

        let x0 = self.sample_bounds.p_min.x + x as Int * self.tile_size;
        let x1 = min(x0 + self.tile_size, self.sample_bounds.p_max.x);
        let y0 = self.sample_bounds.p_min.y + y as Int * self.tile_size;
        let y1 = min(y0 + self.tile_size, self.sample_bounds.p_max.y);

        Tile {
            index,
            x,
            y,
            bounds: Bounds2i::new(Point2i::new(x0, y0), Point2i::new(x1, y1)),
        }
    }
}

/// Renders every tile of `grid` exactly once on a fixed pool of scoped
/// worker threads fed through a bounded channel. Returns once all tiles
/// finished.
///
/// * `grid`        - The tile grid.
/// * `n_threads`   - Number of worker threads.
/// * `progress`    - Progress bar advanced once per tile.
/// * `render_tile` - Renders a single tile.
pub fn render_tiles<F>(grid: &TileGrid, n_threads: usize, progress: &ProgressBar, render_tile: F)
where
    F: Fn(Tile) + Sync,
{
    let n_threads = max(1, n_threads);
    let render_tile = &render_tile;

    std::thread::scope(|scope| {
        let (tx, rx) = crossbeam_channel::bounded::<usize>(n_threads);

        // Spawn worker threads.
        for _ in 0..n_threads {
            let rxc = rx.clone();
            scope.spawn(move || {
                for tile_idx in rxc.iter() {
                    render_tile(grid.tile(tile_idx));
                    progress.inc(1);
                }
            });
        }
        drop(rx);

        // Send work. Workers only stop once the sender is dropped.
        for tile_idx in 0..grid.count() {
            if tx.send(tile_idx).is_err() {
                error!("Render workers exited early; tile {} not rendered", tile_idx);
                break;
            }
        }
    });
}

/// Common data for sampler integrators.
pub struct SamplerIntegratorData {
    /// Sampler responsible for choosing points on the image plane from which
    /// to trace rays and for supplying sample positions used by integrators.
    /// Tasks work on clones.
    pub sampler: Box<dyn Sampler>,

    /// The camera.
    pub camera: ArcCamera,

    /// Pixel bounds for the image.
    pub pixel_bounds: Bounds2i,
}

impl SamplerIntegratorData {
    /// Create a new `SamplerIntegratorData`.
    ///
    /// * `camera`       - The camera.
    /// * `sampler`      - Sampler responsible for choosing point on image plane
    ///                    from which to trace rays.
    /// * `pixel_bounds` - Pixel bounds for the image.
    pub fn new(camera: ArcCamera, sampler: Box<dyn Sampler>, pixel_bounds: Bounds2i) -> Self {
        Self {
            sampler,
            camera,
            pixel_bounds,
        }
    }
}

/// Implements the basis of a rendering process driven by a stream of samples
/// from a `Sampler`. Each sample identifies a point on the image plane at
/// which we compute the light arriving from the scene.
pub trait SamplerIntegrator: Send + Sync {
    /// Returns the common data.
    fn get_data(&self) -> &SamplerIntegratorData;

    /// Called once before rendering; integrators request sample arrays and
    /// build light distributions here.
    ///
    /// * `scene` - The scene.
    fn preprocess(&mut self, _scene: &Scene) {}

    /// Returns the incident radiance at the origin of a given ray.
    ///
    /// * `ray`     - The ray.
    /// * `scene`   - The scene.
    /// * `sampler` - The sampler.
    /// * `arena`   - Per-sample memory arena for BSDFs.
    /// * `depth`   - The recursion depth.
    fn li<'a>(
        &self,
        ray: &mut Ray,
        scene: &'a Scene,
        sampler: &mut dyn Sampler,
        arena: &'a MemoryArena,
        depth: usize,
    ) -> Spectrum;

    /// Returns the preferred tile size.
    fn default_tile_size(&self) -> usize {
        DEFAULT_TILE_SIZE
    }

    /// Trace rays for specular reflection.
    ///
    /// * `isect`   - The surface interaction.
    /// * `scene`   - The scene.
    /// * `sampler` - The sampler.
    /// * `arena`   - The memory arena.
    /// * `depth`   - The recursion depth.
    fn specular_reflect<'a>(
        &self,
        isect: &SurfaceInteraction<'a>,
        scene: &'a Scene,
        sampler: &mut dyn Sampler,
        arena: &'a MemoryArena,
        depth: usize,
    ) -> Spectrum {
        let flags = BxDFType::BSDF_REFLECTION | BxDFType::BSDF_SPECULAR;
        self.specular_scatter(isect, flags, scene, sampler, arena, depth)
    }

    /// Trace rays for specular refraction.
    ///
    /// * `isect`   - The surface interaction.
    /// * `scene`   - The scene.
    /// * `sampler` - The sampler.
    /// * `arena`   - The memory arena.
    /// * `depth`   - The recursion depth.
    fn specular_transmit<'a>(
        &self,
        isect: &SurfaceInteraction<'a>,
        scene: &'a Scene,
        sampler: &mut dyn Sampler,
        arena: &'a MemoryArena,
        depth: usize,
    ) -> Spectrum {
        let flags = BxDFType::BSDF_TRANSMISSION | BxDFType::BSDF_SPECULAR;
        self.specular_scatter(isect, flags, scene, sampler, arena, depth)
    }

    /// Samples the specular lobe selected by `flags` and recursively
    /// evaluates radiance along the scattered ray.
    fn specular_scatter<'a>(
        &self,
        isect: &SurfaceInteraction<'a>,
        flags: BxDFType,
        scene: &'a Scene,
        sampler: &mut dyn Sampler,
        arena: &'a MemoryArena,
        depth: usize,
    ) -> Spectrum {
        let u = sampler.get_2d();
        if let Some(bsdf) = isect.bsdf {
            let BxDFSample { f, pdf, wi, .. } = bsdf.sample_f(&isect.hit.wo, &u, flags);

            // Return contribution of specular scattering.
            let ns = isect.shading.n;
            let cos = wi.abs_dot(&ns);
            if pdf > 0.0 && !f.is_black() && cos != 0.0 {
                let mut rd = isect.spawn_ray(&wi);
                return f * self.li(&mut rd, scene, sampler, arena, depth + 1) * cos / pdf;
            }
        }
        Spectrum::ZERO
    }

    /// Render the scene into the camera's film and return the sample
    /// statistics. The image is not written.
    ///
    /// * `scene`   - The scene.
    /// * `options` - Thread count, tile size and output settings.
    fn render(&self, scene: &Scene, options: &Options) -> RenderStats {
        let data = self.get_data();
        let film = data.camera.film();

        // Compute number of tiles to use for parallel rendering.
        let grid = TileGrid::new(film.get_sample_bounds(), options.tile_size_or(self.default_tile_size()));
        let n_tiles = grid.n_tiles();
        info!("Rendering {}x{} tiles", n_tiles.x, n_tiles.y);

        let stats = RenderStats::new();
        let progress = create_progress_bar(grid.count() as u64, options.quiet);
        progress.set_message("Rendering scene");

        render_tiles(&grid, options.threads(), &progress, |tile| {
            self.render_tile(tile, scene, &stats);
        });

        progress.finish_with_message("Render complete");
        stats.report();
        stats
    }

    /// Render an image tile and merge it into the film.
    ///
    /// * `tile`  - The tile.
    /// * `scene` - The scene.
    /// * `stats` - Sample statistics.
    fn render_tile(&self, tile: Tile, scene: &Scene, stats: &RenderStats) {
        let data = self.get_data();
        let camera = Arc::clone(&data.camera);
        let film = camera.film();

        // Get sampler instance for tile.
        let mut sampler = data.sampler.clone_sampler(tile.index as u64);
        let spp = sampler.samples_per_pixel();
        let mut arena = MemoryArena::default();

        debug!("Starting image tile ({}, {}) -> {}", tile.x, tile.y, tile.bounds);
        let mut film_tile = film.get_film_tile(&tile.bounds);

        // Loop over pixels in tile to render them.
        for pixel in tile.bounds {
            sampler.start_pixel(&pixel);

            // Do this check after `start_pixel()`; this keeps the usage of
            // RNG values from samplers that use RNGs consistent.
            if !data.pixel_bounds.contains_exclusive(&pixel) {
                continue;
            }

            loop {
                // Initialize `CameraSample` for current sample.
                let camera_sample = sampler.get_camera_sample(&pixel);

                // Generate camera ray for current sample.
                let (mut ray, ray_weight) = camera.generate_ray_differential(&camera_sample);
                ray.scale_differentials(1.0 / (spp as Float).sqrt());

                // Evaluate radiance along camera ray.
                let mut l = Spectrum::ZERO;
                if ray_weight > 0.0 {
                    l = self.li(&mut ray, scene, sampler.as_mut(), &arena, 0);
                }
                let l = stats.sanitize(l, &pixel, sampler.current_sample_number());

                // Add camera ray's contribution to image.
                film_tile.add_sample(camera_sample.p_film, l, ray_weight);

                // Free memory used during the sample.
                arena.reset();

                if !sampler.start_next_sample() {
                    break;
                }
            }
        }

        debug!("Finished image tile ({}, {}) -> {}", tile.x, tile.y, tile.bounds);
        film.merge_film_tile(film_tile);
    }
}

// ---- Tests ----
