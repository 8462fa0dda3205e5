//! PBRT common stuff

mod common;
mod math;

// Re-export
pub use common::*;
pub use math::*;
