//! Film

use crate::error::ImageError;
use crate::filter::*;
use crate::geometry::*;
use crate::image_io::write_image;
use crate::parallel::AtomicFloat;
use crate::pbrt::*;
use crate::spectrum::*;
use std::sync::{PoisonError, RwLock};

mod film_tile;

// Re-export.
pub use film_tile::*;

/// Filter table width.
pub const FILTER_TABLE_WIDTH: usize = 16;

/// Filter table size.
pub const FILTER_TABLE_SIZE: usize = FILTER_TABLE_WIDTH * FILTER_TABLE_WIDTH;

/// Reciprocal of `FILTER_TABLE_WIDTH`.
pub const INV_FILTER_TABLE_WIDTH: Float = 1.0 / (FILTER_TABLE_WIDTH as Float);

/// Pixel data.
#[derive(Default)]
pub struct Pixel {
    /// Running weighted sums of pixel contributions.
    pub rgb: [Float; 3],

    /// Holds the sum of filter weight values for the sample contributions to the pixel.
    pub filter_weight_sum: Float,

    /// Holds an unweighted sum of sample splats. Splats are added
    /// concurrently without taking the write lock.
    pub splat_rgb: [AtomicFloat; 3],
}

/// Models the sensing device in a simulated camera.
pub struct Film {
    /// The overall image resolution in pixels.
    pub full_resolution: Point2i,

    /// The diagonal of the film's physical area in meters.
    pub diagonal: Float,

    /// Filter function to use for image reconstruction from samples.
    pub filter: ArcFilter,

    /// Filename of output image.
    pub filename: String,

    /// Crop window of the subset of the image to render.
    pub cropped_pixel_bounds: Bounds2i,

    /// Crop window in NDC space.
    crop_window: Bounds2f,

    /// The filter table.
    filter_table: Vec<Float>,

    /// Scale factor for pixel values.
    scale: Float,

    /// Maximum sample luminence.
    max_sample_luminance: Float,

    /// Stores the image pixels.
    pixels: RwLock<Vec<Pixel>>,
}

impl Film {
    /// Create a new `Film` instance.
    ///
    /// * `resolution`           - The overall image resolution in pixels.
    /// * `crop_window`          - Crop window of the subset of the image to render.
    /// * `filter`               - Filter function to use for image reconstruction.
    /// * `diagonal`             - The diagonal of the film's physical area in millimeters.
    /// * `filename`             - Filename of output image.
    /// * `scale`                - Scale factor for pixel values.
    /// * `max_sample_luminance` - Maximum sample luminence.
    pub fn new(
        resolution: &Point2i,
        crop_window: &Bounds2f,
        filter: ArcFilter,
        diagonal: Float,
        filename: &str,
        scale: Float,
        max_sample_luminance: Float,
    ) -> Self {
        // Compute the film image bounds.
        let cropped_pixel_bounds = Bounds2i::new(
            Point2i::new(
                (resolution.x as Float * crop_window.p_min.x).ceil() as Int,
                (resolution.y as Float * crop_window.p_min.y).ceil() as Int,
            ),
            Point2i::new(
                (resolution.x as Float * crop_window.p_max.x).ceil() as Int,
                (resolution.y as Float * crop_window.p_max.y).ceil() as Int,
            ),
        );
        info!(
            "Created film with full resolution {}x{}. Crop window -> {}",
            resolution.x, resolution.y, cropped_pixel_bounds
        );

        // Precompute filter weight table.
        let radius = filter.get_data().radius;
        let mut filter_table = Vec::with_capacity(FILTER_TABLE_SIZE);
        for y in 0..FILTER_TABLE_WIDTH {
            for x in 0..FILTER_TABLE_WIDTH {
                let p = Point2f::new(
                    (x as Float + 0.5) * radius.x * INV_FILTER_TABLE_WIDTH,
                    (y as Float + 0.5) * radius.y * INV_FILTER_TABLE_WIDTH,
                );
                filter_table.push(filter.evaluate(&p));
            }
        }

        // Allocate film image storage.
        let n = cropped_pixel_bounds.area() as usize;
        let pixels = RwLock::new((0..n).map(|_| Pixel::default()).collect());

        Self {
            full_resolution: *resolution,
            diagonal: diagonal * 0.001, // Convert to meters.
            filter,
            filename: String::from(filename),
            cropped_pixel_bounds,
            crop_window: *crop_window,
            filter_table,
            scale,
            max_sample_luminance,
            pixels,
        }
    }

    /// Returns an empty film with the same resolution, crop window and
    /// filter but another output file.
    ///
    /// * `filename` - Filename of output image.
    pub fn duplicate(&self, filename: &str) -> Self {
        Self::new(
            &self.full_resolution,
            &self.crop_window,
            self.filter.clone(),
            self.diagonal * 1000.0,
            filename,
            self.scale,
            self.max_sample_luminance,
        )
    }

    /// Returns the sample bounds accounting for the half-pixel offsets when
    /// converting from discrete to continuous pixel coordinates.
    pub fn get_sample_bounds(&self) -> Bounds2i {
        let radius = self.filter.get_data().radius;
        let half_pixel = Vector2f::new(0.5, 0.5);

        let p0 = (Point2f::from(self.cropped_pixel_bounds.p_min) + half_pixel - radius).floor();
        let p1 = (Point2f::from(self.cropped_pixel_bounds.p_max) - half_pixel + radius).ceil();
        Bounds2i::new(Point2i::from(p0), Point2i::from(p1))
    }

    /// Returns the actual extent of the film in the scene.
    pub fn get_physical_extent(&self) -> Bounds2f {
        let aspect = self.full_resolution.y as Float / self.full_resolution.x as Float;
        let x = (self.diagonal * self.diagonal / (1.0 + aspect * aspect)).sqrt();
        let y = aspect * x;
        Bounds2f::new(Point2f::new(-x / 2.0, -y / 2.0), Point2f::new(x / 2.0, y / 2.0))
    }

    /// Gets the pixel offset given its coordinates in the overall image.
    ///
    /// * `p` - The pixel coordinates with respect to the overall image.
    fn get_pixel_offset(&self, p: &Point2i) -> usize {
        debug_assert!(self.cropped_pixel_bounds.contains_exclusive(p));
        let width = self.cropped_pixel_bounds.p_max.x - self.cropped_pixel_bounds.p_min.x;
        let offset = (p.x - self.cropped_pixel_bounds.p_min.x) + (p.y - self.cropped_pixel_bounds.p_min.y) * width;
        offset as usize
    }

    /// Returns a `FilmTile` that stores the contributions for pixels in the
    /// specified region of the image.
    ///
    /// * `sample_bounds` - Tile region in the overall image.
    pub fn get_film_tile(&self, sample_bounds: &Bounds2i) -> FilmTile<'_> {
        let radius = self.filter.get_data().radius;
        let half_pixel = Vector2f::new(0.5, 0.5);

        // Bound image pixels that samples in `sample_bounds` contribute to.
        let float_bounds = Bounds2f::from(*sample_bounds);
        let p0 = Point2i::from((float_bounds.p_min - half_pixel - radius).ceil());
        let p1 = Point2i::from((float_bounds.p_max - half_pixel + radius).floor()) + Point2i::new(1, 1);
        let tile_pixel_bounds = Bounds2i::new(p0, p1).intersect(&self.cropped_pixel_bounds);

        FilmTile::new(tile_pixel_bounds, radius, &self.filter_table, self.max_sample_luminance)
    }

    /// Merge the `FilmTile`'s pixel contribution into the image. Merges are
    /// serialized by the pixel lock.
    ///
    /// * `tile` - The `FilmTile` to merge.
    pub fn merge_film_tile(&self, tile: FilmTile<'_>) {
        let tile_pixel_bounds = tile.get_pixel_bounds();
        debug!("Merging film tile {}", tile_pixel_bounds);

        let mut pixels = self.pixels.write().unwrap_or_else(PoisonError::into_inner);
        for pixel in tile_pixel_bounds {
            let tile_pixel = &tile.pixels[tile.get_pixel_offset(&pixel)];
            let merge_pixel = &mut pixels[self.get_pixel_offset(&pixel)];
            let rgb = tile_pixel.contrib_sum.to_rgb();
            for (sum, c) in merge_pixel.rgb.iter_mut().zip(rgb) {
                *sum += c;
            }
            merge_pixel.filter_weight_sum += tile_pixel.filter_weight_sum;
        }
    }

    /// Add a splat contribution to a pixel. Splats from many threads are
    /// accumulated with atomic adds.
    ///
    /// * `p` - The pixel coordinates with respect to the overall image.
    /// * `v` - Splat contribution to add to the pixel.
    pub fn add_splat(&self, p: &Point2f, v: &Spectrum) {
        if v.has_nans() {
            error!("Ignoring splatted spectrum with NaN values at ({}, {})", p.x, p.y);
            return;
        }

        let vy = v.y();
        if vy < 0.0 {
            error!("Ignoring splatted spectrum with negative luminance {} at ({}, {})", vy, p.x, p.y);
        } else if vy.is_infinite() {
            error!("Ignoring splatted spectrum with infinite luminance at ({}, {})", p.x, p.y);
        } else {
            let pi = Point2i::from(p.floor());
            if !self.cropped_pixel_bounds.contains_exclusive(&pi) {
                return;
            }

            let v = if vy > self.max_sample_luminance {
                *v * self.max_sample_luminance / vy
            } else {
                *v
            };

            let pixels = self.pixels.read().unwrap_or_else(PoisonError::into_inner);
            let pixel = &pixels[self.get_pixel_offset(&pi)];
            for (splat, c) in pixel.splat_rgb.iter().zip(v.to_rgb()) {
                splat.add(c);
            }
        }
    }

    /// Returns the final RGB value of a pixel.
    ///
    /// * `p`           - The pixel coordinates with respect to the overall image.
    /// * `splat_scale` - Scale factor for `add_splat()` contributions.
    pub fn get_pixel_rgb(&self, p: &Point2i, splat_scale: Float) -> [Float; 3] {
        let pixels = self.pixels.read().unwrap_or_else(PoisonError::into_inner);
        self.resolve_pixel(&pixels[self.get_pixel_offset(p)], splat_scale)
    }

    /// Returns the sum of filter weights accumulated at a pixel.
    ///
    /// * `p` - The pixel coordinates with respect to the overall image.
    pub fn get_filter_weight_sum(&self, p: &Point2i) -> Float {
        let pixels = self.pixels.read().unwrap_or_else(PoisonError::into_inner);
        pixels[self.get_pixel_offset(p)].filter_weight_sum
    }

    /// Write the image to the output file.
    ///
    /// * `splat_scale` - Scale factor for `add_splat()` contributions.
    pub fn write_image(&self, splat_scale: Float) -> Result<(), ImageError> {
        info!("Converting image to RGB and computing final weighted pixel values");

        let rgb: Vec<Float> = {
            let pixels = self.pixels.read().unwrap_or_else(PoisonError::into_inner);
            self.cropped_pixel_bounds
                .into_iter()
                .flat_map(|p| self.resolve_pixel(&pixels[self.get_pixel_offset(&p)], splat_scale))
                .collect()
        };

        write_image(&self.filename, &rgb, &self.cropped_pixel_bounds)
    }

    /// Computes the final RGB value of a pixel.
    ///
    /// * `pixel`       - The pixel.
    /// * `splat_scale` - Scale factor for `add_splat()` contributions.
    fn resolve_pixel(&self, pixel: &Pixel, splat_scale: Float) -> [Float; 3] {
        let mut rgb = pixel.rgb;
        for (i, v) in rgb.iter_mut().enumerate() {
            if pixel.filter_weight_sum != 0.0 {
                // Normalize pixel with weight sum.
                *v = max(0.0, *v / pixel.filter_weight_sum);
            }

            // Add splat value at pixel.
            *v += splat_scale * pixel.splat_rgb[i].load();

            // Scale pixel value by `scale`.
            *v *= self.scale;
        }
        rgb
    }
}

// ---- Tests ----

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;
    use std::sync::Arc;

    struct BoxFilter(FilterData);

    impl Filter for BoxFilter {
        fn get_data(&self) -> &FilterData {
            &self.0
        }

        fn evaluate(&self, _p: &Point2f) -> Float {
            1.0
        }
    }

    fn film(crop: Bounds2f) -> Film {
        let filter = Arc::new(BoxFilter(FilterData::new(Vector2f::new(0.5, 0.5))));
        Film::new(&Point2i::new(8, 4), &crop, filter, 35.0, "test.png", 1.0, INFINITY)
    }

    fn full() -> Bounds2f {
        Bounds2f::new(Point2f::new(0.0, 0.0), Point2f::new(1.0, 1.0))
    }

    #[test]
    fn crop_window_selects_pixels() {
        let f = film(Bounds2f::new(Point2f::new(0.5, 0.0), Point2f::new(1.0, 0.5)));
        assert_eq!(
            f.cropped_pixel_bounds,
            Bounds2i::new(Point2i::new(4, 0), Point2i::new(8, 2))
        );
    }

    #[test]
    fn merged_tiles_are_normalized() {
        let f = film(full());
        let bounds = f.get_sample_bounds();
        let mut tile = f.get_film_tile(&bounds);
        tile.add_sample(Point2f::new(2.5, 1.5), Spectrum::new(3.0), 1.0);
        tile.add_sample(Point2f::new(2.5, 1.5), Spectrum::new(1.0), 1.0);
        f.merge_film_tile(tile);
        let rgb = f.get_pixel_rgb(&Point2i::new(2, 1), 1.0);
        assert!(approx_eq!(Float, rgb[0], 2.0, epsilon = 1e-6));
        assert_eq!(f.get_pixel_rgb(&Point2i::new(0, 0), 1.0), [0.0; 3]);
    }

    #[test]
    fn concurrent_splats_accumulate() {
        let f = film(full());
        std::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    for _ in 0..100 {
                        f.add_splat(&Point2f::new(1.2, 1.7), &Spectrum::new(0.5));
                    }
                });
            }
        });
        let rgb = f.get_pixel_rgb(&Point2i::new(1, 1), 0.5);
        assert!(approx_eq!(Float, rgb[1], 100.0, epsilon = 1e-3));
    }

    #[test]
    fn invalid_splats_are_dropped() {
        let f = film(full());
        f.add_splat(&Point2f::new(1.0, 1.0), &Spectrum::new(Float::NAN));
        f.add_splat(&Point2f::new(1.0, 1.0), &Spectrum::new(-1.0));
        f.add_splat(&Point2f::new(100.0, 1.0), &Spectrum::new(1.0));
        assert_eq!(f.get_pixel_rgb(&Point2i::new(1, 1), 1.0), [0.0; 3]);
    }
}
