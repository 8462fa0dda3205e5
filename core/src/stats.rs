//! Statistics

use crate::geometry::*;
use crate::spectrum::*;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for a single render. All counters are updated with relaxed
/// atomics from the worker threads and read once rendering finished.
#[derive(Debug, Default)]
pub struct RenderStats {
    /// Camera samples evaluated.
    samples: AtomicU64,

    /// Radiance values containing NaNs.
    nan: AtomicU64,

    /// Radiance values with negative luminance.
    negative: AtomicU64,

    /// Radiance values with infinite luminance.
    infinite: AtomicU64,

    /// Light splats recorded on the film.
    splats: AtomicU64,
}

impl RenderStats {
    /// Returns a new set of zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts a sample and replaces corrupt radiance values with black.
    ///
    /// * `l`          - Radiance returned for the sample.
    /// * `pixel`      - The pixel being sampled.
    /// * `sample_num` - Sample index within the pixel.
    pub fn sanitize(&self, l: Spectrum, pixel: &Point2i, sample_num: usize) -> Spectrum {
        self.samples.fetch_add(1, Ordering::Relaxed);

        if l.has_nans() {
            error!(
                "Not-a-number radiance value returned for pixel ({}, {}), sample {}. Setting to black.",
                pixel.x, pixel.y, sample_num
            );
            self.nan.fetch_add(1, Ordering::Relaxed);
            Spectrum::ZERO
        } else if l.y() < -1e-5 {
            error!(
                "Negative luminance value, {}, returned for pixel ({}, {}), sample {}. Setting to black.",
                l.y(),
                pixel.x,
                pixel.y,
                sample_num
            );
            self.negative.fetch_add(1, Ordering::Relaxed);
            Spectrum::ZERO
        } else if l.y().is_infinite() {
            error!(
                "Infinite luminance value returned for pixel ({}, {}), sample {}. Setting to black.",
                pixel.x, pixel.y, sample_num
            );
            self.infinite.fetch_add(1, Ordering::Relaxed);
            Spectrum::ZERO
        } else {
            l
        }
    }

    /// Counts a light splat.
    pub fn add_splat(&self) {
        self.splats.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns the number of evaluated samples.
    pub fn samples(&self) -> u64 {
        self.samples.load(Ordering::Relaxed)
    }

    /// Returns the number of samples replaced due to NaNs.
    pub fn nan(&self) -> u64 {
        self.nan.load(Ordering::Relaxed)
    }

    /// Returns the number of samples replaced due to negative luminance.
    pub fn negative(&self) -> u64 {
        self.negative.load(Ordering::Relaxed)
    }

    /// Returns the number of samples replaced due to infinite luminance.
    pub fn infinite(&self) -> u64 {
        self.infinite.load(Ordering::Relaxed)
    }

    /// Returns the number of recorded light splats.
    pub fn splats(&self) -> u64 {
        self.splats.load(Ordering::Relaxed)
    }

    /// Returns the total number of discarded samples.
    pub fn discarded(&self) -> u64 {
        self.nan() + self.negative() + self.infinite()
    }

    /// Logs the counters at the end of a render.
    pub fn report(&self) {
        info!("{}", self);
        if self.discarded() > 0 {
            warn!(
                "{} of {} samples were discarded ({} NaN, {} negative, {} infinite)",
                self.discarded(),
                self.samples(),
                self.nan(),
                self.negative(),
                self.infinite()
            );
        }
    }
}

impl fmt::Display for RenderStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Render statistics: samples {}, splats {}, discarded {}",
            self.samples(),
            self.splats(),
            self.discarded()
        )
    }
}

// ---- Tests ----

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pbrt::*;

    #[test]
    fn corrupt_values_are_zeroed_and_counted() {
        let stats = RenderStats::new();
        let p = Point2i::new(3, 4);

        let ok = Spectrum::new(0.5);
        assert_eq!(stats.sanitize(ok, &p, 0), ok);
        assert_eq!(stats.sanitize(Spectrum::new(Float::NAN), &p, 1), Spectrum::ZERO);
        assert_eq!(stats.sanitize(Spectrum::new(-1.0), &p, 2), Spectrum::ZERO);
        assert_eq!(stats.sanitize(Spectrum::new(INFINITY), &p, 3), Spectrum::ZERO);

        assert_eq!(stats.samples(), 4);
        assert_eq!((stats.nan(), stats.negative(), stats.infinite()), (1, 1, 1));
        assert_eq!(stats.discarded(), 3);
    }

    #[test]
    fn tiny_negative_luminance_is_kept() {
        let stats = RenderStats::new();
        let l = Spectrum::new(-1e-7);
        assert_eq!(stats.sanitize(l, &Point2i::new(0, 0), 0), l);
        assert_eq!(stats.discarded(), 0);
    }
}
