//! Errors

use thiserror::Error;

/// Errors raised while configuring a render from parameters.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// `pixelbounds` did not have exactly four values.
    #[error("{0} values supplied for 'pixelbounds'; expected 4")]
    PixelBoundsCount(usize),

    /// `pixelbounds` does not overlap the film.
    #[error("degenerate 'pixelbounds' {0}")]
    PixelBoundsEmpty(String),

    /// A named component does not exist.
    #[error("unknown {kind} '{name}'")]
    Unknown { kind: &'static str, name: String },

    /// A parameter value is out of range.
    #[error("invalid value for '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },
}

/// Errors raised while writing images.
#[derive(Debug, Error)]
pub enum ImageError {
    /// The file extension is not a supported output format.
    #[error("unsupported image format for '{0}'")]
    UnsupportedFormat(String),

    /// The encoder failed.
    #[error("error saving output image '{path}'")]
    Write {
        path: String,
        #[source]
        source: image::ImageError,
    },
}
