//! Camera

#[macro_use]
extern crate log;

mod look_at;
mod perspective_camera;

// Re-export
pub use look_at::*;
pub use perspective_camera::*;
