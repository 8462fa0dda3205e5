//! Image output

use crate::error::ImageError;
use crate::geometry::*;
use crate::pbrt::*;
use image::{ImageBuffer, ImageFormat, Rgb};
use std::path::Path;

/// Write an RGB image. The format is chosen from the file extension.
///
/// * `path`          - Output file path.
/// * `rgb`           - Linear floating point RGB pixel data.
/// * `output_bounds` - Pixel bounds of the image.
pub fn write_image(path: &str, rgb: &[Float], output_bounds: &Bounds2i) -> Result<(), ImageError> {
    let resolution = output_bounds.diagonal();
    let res_x = resolution.x as u32;
    let res_y = resolution.y as u32;

    let extension = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match extension.as_deref() {
        Some("png") => write_8_bit(path, rgb, res_x, res_y, ImageFormat::Png),
        Some("tga") => write_8_bit(path, rgb, res_x, res_y, ImageFormat::Tga),
        _ => Err(ImageError::UnsupportedFormat(path.to_owned())),
    }
}

/// Writes the image in an 8-bit image format.
///
/// * `path`         - Output file path.
/// * `rgb`          - Floating point RGB pixel data.
/// * `res_x`        - X resolution.
/// * `res_y`        - Y resolution.
/// * `image_format` - Image format.
fn write_8_bit(path: &str, rgb: &[Float], res_x: u32, res_y: u32, image_format: ImageFormat) -> Result<(), ImageError> {
    info!("Writing image {path} with resolution {res_x}x{res_y}");

    let imgbuf = ImageBuffer::from_fn(res_x, res_y, |x, y| {
        // 8-bit format; apply gamma and clamp.
        let offset = 3 * (y * res_x + x) as usize;
        Rgb(apply_gamma(&[rgb[offset], rgb[offset + 1], rgb[offset + 2]]))
    });

    imgbuf
        .save_with_format(path, image_format)
        .map_err(|source| ImageError::Write {
            path: path.to_owned(),
            source,
        })
}

/// Apply gamma correction and clamp to 8-bit range.
///
/// * `rgb` - Linear RGB value.
pub fn apply_gamma(rgb: &[Float; 3]) -> [u8; 3] {
    [clamp_byte(rgb[0]), clamp_byte(rgb[1]), clamp_byte(rgb[2])]
}

/// Clamp floating point value to 8-bit range [0, 255].
///
/// * `v` - Value to clamp.
#[inline]
fn clamp_byte(v: Float) -> u8 {
    clamp(255.0 * gamma_correct(v) + 0.5, 0.0, 255.0) as u8
}

// ---- Tests ----

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gamma_maps_extremes() {
        assert_eq!(apply_gamma(&[0.0, 1.0, 2.0]), [0, 255, 255]);
        assert_eq!(apply_gamma(&[-1.0, 0.0, 0.0]), [0, 0, 0]);
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let bounds = Bounds2i::new(Point2i::new(0, 0), Point2i::new(1, 1));
        let result = write_image("out.xyz", &[0.0; 3], &bounds);
        assert!(matches!(result, Err(ImageError::UnsupportedFormat(_))));
    }
}
