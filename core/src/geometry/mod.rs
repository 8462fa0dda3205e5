//! Geometry

mod bounds;
mod common;
mod normal;
mod point;
mod ray;
mod shape;
mod vector;

// Re-export
pub use bounds::*;
pub use common::*;
pub use normal::*;
pub use point::*;
pub use ray::*;
pub use shape::*;
pub use vector::*;
