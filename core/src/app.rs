//! Application related stuff

use crate::pbrt::Float;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};

/// System wide options.
#[derive(Parser, Clone, Debug, Default)]
#[clap(author, version, about, long_about = None)]
pub struct Options {
    /// Number of threads to use for rendering.
    #[clap(
        long = "nthreads",
        short = 't',
        value_name = "NUM",
        default_value_t = 0,
        help = "Use specified number of threads for rendering (0 uses all CPUs)."
    )]
    pub n_threads: usize,

    /// Automatically reduce a number of quality settings to render more quickly.
    #[clap(
        long = "quick",
        help = "Automatically reduce a number of quality settings to render more quickly."
    )]
    pub quick_render: bool,

    /// Suppress all text output other than error messages.
    #[clap(long, help = "Suppress all text output other than error messages.")]
    pub quiet: bool,

    /// Path to the image file.
    #[clap(
        long = "outfile",
        short = 'o',
        value_name = "FILE",
        help = "Write the final image to the given filename."
    )]
    pub image_file: Option<String>,

    /// The crop window x0, x1, y0, y1.
    #[clap(
        long = "cropwindow",
        short = 'c',
        value_name = "FLOAT",
        number_of_values = 4,
        allow_negative_numbers = true,
        help = "Specify an image crop window (x0 x1 y0 y1)."
    )]
    pub crop_window: Vec<Float>,

    /// Tile size.
    #[clap(
        long = "tilesize",
        short = 'p',
        value_name = "NUM",
        help = "Size in pixels of square tiles rendered per thread."
    )]
    pub tile_size: Option<usize>,
}

impl Options {
    /// Returns the number of threads to use. `0` selects all logical CPUs
    /// and larger requests are clamped to that count.
    pub fn threads(&self) -> usize {
        let max_threads = num_cpus::get();
        match self.n_threads {
            0 => max_threads,
            n if n > max_threads => {
                warn!("Num threads > max logical CPUs {}", max_threads);
                max_threads
            }
            n => n,
        }
    }

    /// Returns the tile size to use, falling back to the integrator's
    /// preferred size.
    ///
    /// * `default` - Integrator specific default.
    pub fn tile_size_or(&self, default: usize) -> usize {
        match self.tile_size {
            Some(0) => {
                warn!("Invalid tile size 0. Using {}.", default);
                default
            }
            Some(n) => n,
            None => default,
        }
    }

    /// Returns the crop window as `[x0, x1, y0, y1]` if one was given.
    pub fn crop_window(&self) -> Option<[Float; 4]> {
        match self.crop_window.as_slice() {
            [x0, x1, y0, y1] => Some([*x0, *x1, *y0, *y1]),
            _ => None,
        }
    }
}

/// Returns a progress bar with `len` steps. The bar is hidden when `quiet`
/// is set.
///
/// * `len`   - Number of steps.
/// * `quiet` - Suppress output.
pub fn create_progress_bar(len: u64, quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }

    let style = ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar())
    .progress_chars("#>-");
    ProgressBar::new(len).with_style(style)
}

// ---- Tests ----
