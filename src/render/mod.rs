//! Scene description and hidden-line rendering.
//!
//! - [`Scene`] - owned shapes plus the lazily built occlusion hierarchy
//! - [`Camera`] - immutable camera/viewport parameters
//! - [`render`] - 3D scene to visible 2D paths

mod camera;
mod scene;
mod visibility;

pub use camera::Camera;
pub use scene::Scene;
pub use visibility::{render, validate_step};
