//! Spectrum

use crate::pbrt::Float;

mod rgb_spectrum;

// Re-export
pub use rgb_spectrum::*;

/// Use `RGBSpectrum` for rendering.
pub type Spectrum = RGBSpectrum;

/// Number of samples used in `Spectrum`.
pub const SPECTRUM_SAMPLES: usize = 3;

/// Converts XYZ coefficients to linear sRGB.
///
/// * `xyz` - The XYZ coefficients.
#[rustfmt::skip]
pub fn xyz_to_rgb(xyz: &[Float; 3]) -> [Float; 3] {
    [
         3.240479 * xyz[0] - 1.537150 * xyz[1] - 0.498535 * xyz[2],
        -0.969256 * xyz[0] + 1.875991 * xyz[1] + 0.041556 * xyz[2],
         0.055648 * xyz[0] - 0.204043 * xyz[1] + 1.057311 * xyz[2],
    ]
}

/// Converts linear sRGB coefficients to XYZ.
///
/// * `rgb` - The RGB coefficients.
#[rustfmt::skip]
pub fn rgb_to_xyz(rgb: &[Float; 3]) -> [Float; 3] {
    [
        0.412453 * rgb[0] + 0.357580 * rgb[1] + 0.180423 * rgb[2],
        0.212671 * rgb[0] + 0.715160 * rgb[1] + 0.072169 * rgb[2],
        0.019334 * rgb[0] + 0.119193 * rgb[1] + 0.950227 * rgb[2],
    ]
}
