#[macro_use]
extern crate log;

mod scenes;

use cameras::PerspectiveCamera;
use clap::Parser;
use filters::create_filter;
use integrators::*;
use render_core::app::*;
use render_core::camera::*;
use render_core::error::{ConfigError, ImageError};
use render_core::film::Film;
use render_core::geometry::*;
use render_core::paramset::ParamSet;
use render_core::pbrt::*;
use samplers::create_sampler;
use scenes::*;
use std::sync::Arc;
use thiserror::Error;

#[cfg(all(feature = "dhat-rs", feature = "jemalloc"))]
compile_error!("feature 'dhat-rs' and feature 'jemalloc' cannot be enabled at the same time");

#[cfg(feature = "dhat-rs")]
use dhat::{Dhat, DhatAlloc};

#[cfg(feature = "dhat-rs")]
#[global_allocator]
static ALLOCATOR: DhatAlloc = DhatAlloc;

#[cfg(feature = "jemalloc")]
#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(feature = "jemalloc")]
#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static ALLOCATOR: Jemalloc = Jemalloc;

/// Command line arguments.
#[derive(Parser, Debug)]
#[clap(author, version, about = "Renders built-in scenes with Monte Carlo light transport.")]
struct Args {
    #[clap(flatten)]
    options: Options,

    /// Scene to render.
    #[clap(long, default_value = "plane", help = "One of: plane, spheres, fog.")]
    scene: String,

    /// Light transport algorithm.
    #[clap(
        long,
        short = 'i',
        default_value = "path",
        help = "One of: directlighting, path, volpath, bdpt."
    )]
    integrator: String,

    /// Sampler name.
    #[clap(long, short = 's', default_value = "halton")]
    sampler: String,

    /// Pixel reconstruction filter.
    #[clap(long, default_value = "box", help = "One of: box, gaussian, triangle.")]
    filter: String,

    /// Samples per pixel.
    #[clap(long, default_value_t = 16)]
    spp: usize,

    /// Maximum path depth.
    #[clap(long, default_value_t = 5)]
    maxdepth: Int,

    /// Light sampling strategy for path tracers.
    #[clap(long, help = "One of: uniform, power, spatial.")]
    lightsamplestrategy: Option<String>,

    /// Direct lighting strategy.
    #[clap(long, help = "One of: all, one.")]
    strategy: Option<String>,

    /// Write a film per BDPT strategy.
    #[clap(long)]
    visualizestrategies: bool,

    /// Write a weighted film per BDPT strategy.
    #[clap(long)]
    visualizeweights: bool,

    /// Image width in pixels.
    #[clap(long, default_value_t = 400)]
    width: Int,

    /// Image height in pixels.
    #[clap(long, default_value_t = 300)]
    height: Int,

    /// Vertical field of view in degrees.
    #[clap(long, default_value_t = 45.0)]
    fov: Float,
}

/// Errors that abort a render.
#[derive(Debug, Error)]
enum RenderError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Image(#[from] ImageError),
}

fn main() {
    #[cfg(feature = "dhat-rs")]
    let _dhat = Dhat::start_heap_profiling();

    // Initialize `env_logger`.
    env_logger::init();

    let args = Args::parse();
    if let Err(err) = render(&args) {
        error!("{}", err);
        std::process::exit(1);
    }
}

/// Builds the requested scene, camera, sampler and integrator, renders and
/// writes the image.
///
/// * `args` - Command line arguments.
fn render(args: &Args) -> Result<(), RenderError> {
    let options = &args.options;
    let demo = create_scene(&args.scene)?;

    // Film.
    let filter = create_filter(&args.filter, &ParamSet::new())?;
    let crop = match options.crop_window() {
        Some([x0, x1, y0, y1]) => Bounds2f::new(
            Point2f::new(clamp(x0, 0.0, 1.0), clamp(y0, 0.0, 1.0)),
            Point2f::new(clamp(x1, 0.0, 1.0), clamp(y1, 0.0, 1.0)),
        ),
        None => Bounds2f::new(Point2f::new(0.0, 0.0), Point2f::new(1.0, 1.0)),
    };
    let filename = options
        .image_file
        .clone()
        .unwrap_or_else(|| format!("{}.png", args.scene));
    let (width, height) = if options.quick_render {
        (max(1, args.width / 4), max(1, args.height / 4))
    } else {
        (args.width, args.height)
    };
    let film = Film::new(
        &Point2i::new(width, height),
        &crop,
        filter,
        35.0,
        &filename,
        1.0,
        INFINITY,
    );

    // Camera.
    let mut camera_params = ParamSet::new();
    camera_params.add_float("fov", &[args.fov]);
    let camera: ArcCamera = Arc::new(PerspectiveCamera::from((
        &camera_params,
        &demo.look_at,
        film,
        demo.camera_medium.clone(),
    )));

    // Sampler.
    let mut sampler_params = ParamSet::new();
    sampler_params.add_int("pixelsamples", &[args.spp as Int]);
    let sampler = create_sampler(
        &args.sampler,
        &sampler_params,
        &camera.film().get_sample_bounds(),
        options,
    )?;

    // Integrator.
    let mut params = ParamSet::new();
    params.add_int("maxdepth", &[args.maxdepth]);
    if let Some(lss) = args.lightsamplestrategy.as_ref() {
        params.add_string("lightsamplestrategy", &[lss.clone()]);
    }
    if let Some(strategy) = args.strategy.as_ref() {
        params.add_string("strategy", &[strategy.clone()]);
    }
    if args.visualizestrategies {
        params.add_bool("visualizestrategies", &[true]);
    }
    if args.visualizeweights {
        params.add_bool("visualizeweights", &[true]);
    }
    let mut integrator = create_integrator(&args.integrator, &params, camera, sampler)?;
    if !params.report_unused().is_empty() {
        warn!("'{}' integrator ignores some options", args.integrator);
    }

    let stats = integrator.render(&demo.scene, options);
    info!("Rendered {} samples and {} splats", stats.samples(), stats.splats());

    integrator.write_image()?;
    info!("Wrote '{}'", filename);
    Ok(())
}
