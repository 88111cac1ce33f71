//! # laserline
//!
//! Hidden-line rendering of 3D wireframe scenes for galvo laser projectors.
//!
//! Each frame the scene is projected to the visible 2D portions of its
//! edges, the resulting paths are reordered to cut beam-off travel, and the
//! frame is encoded as a closed loop of drawn and blank points for a DAC
//! transport.
//!
//! ## Modules
//!
//! - [`util`] - Errors, glam re-exports, bounding boxes
//! - [`geom`] - Rays, shapes, paths and the occlusion BVH
//! - [`render`] - Scene, camera and the visibility renderer
//! - [`optimize`] - Draw-order optimization
//! - [`stream`] - Point encoding, sinks and the streaming loop
//! - [`config`] - JSON configuration for the binary
//!
//! ## Example
//!
//! ```no_run
//! use laserline::prelude::*;
//!
//! let mut scene = Scene::new();
//! scene.add(Cube::new(Vector::splat(-1.0), Vector::ONE))?;
//!
//! let camera = Camera { width: 1000.0, height: 1000.0, ..Camera::default() };
//! let paths = optimize(scene.render(&camera, 0.01)?);
//!
//! let encoder = Encoder::new(50.0, Color::default())?;
//! for point in encoder.encode(&paths) {
//!     println!("{} {} {}", point.x, point.y, point.on);
//! }
//! # Ok::<(), laserline::Error>(())
//! ```

pub mod util;
pub mod geom;
pub mod render;
pub mod optimize;
pub mod stream;
pub mod config;

// Re-export commonly used types
pub use util::{Error, Result};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::geom::{Cube, Mesh, Path, Paths, Ray, Shape, Triangle};
    pub use crate::optimize::optimize;
    pub use crate::render::{render, Camera, Scene};
    pub use crate::stream::{
        channel, Color, Encoder, Pipeline, PipelineConfig, Point, PointSink, State, WriterSink,
    };
    pub use crate::util::{BBox3d, Error, Result, Vector};
}
