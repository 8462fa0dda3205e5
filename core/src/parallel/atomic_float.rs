//! AtomicFloat

use crate::pbrt::{bits_to_float, float_to_bits, Float};
use std::sync::atomic::{AtomicU32, Ordering};

/// Floating point value that supports lock-free addition. Used for film
/// splats that arrive from every worker thread.
#[derive(Default)]
pub struct AtomicFloat {
    /// Bit representation of floating point value.
    bits: AtomicU32,
}

impl AtomicFloat {
    /// Create a new `AtomicFloat`.
    ///
    /// * `v` - The value.
    pub fn new(v: Float) -> Self {
        Self {
            bits: AtomicU32::new(float_to_bits(v)),
        }
    }

    /// Atomically adds a value.
    ///
    /// * `v` - The value to add.
    pub fn add(&self, v: Float) {
        let mut old_bits = self.bits.load(Ordering::Relaxed);
        loop {
            let new_bits = float_to_bits(bits_to_float(old_bits) + v);
            match self
                .bits
                .compare_exchange_weak(old_bits, new_bits, Ordering::AcqRel, Ordering::Relaxed)
            {
                Ok(_) => break,
                Err(x) => old_bits = x,
            }
        }
    }

    /// Loads the value.
    pub fn load(&self) -> Float {
        bits_to_float(self.bits.load(Ordering::Acquire))
    }

    /// Stores a value.
    ///
    /// * `v` - The value.
    pub fn store(&self, v: Float) {
        self.bits.store(float_to_bits(v), Ordering::Release);
    }
}

impl Clone for AtomicFloat {
    fn clone(&self) -> Self {
        Self::new(self.load())
    }
}
