//! Scene geometry: rays, shapes and the 2D/3D paths they produce.
//!
//! - [`Shape`] - capability trait implemented by [`Cube`], [`Triangle`] and [`Mesh`]
//! - [`Path`] / [`Paths`] - polylines and their ordered collections
//! - [`Bvh`] - nearest-hit acceleration for occlusion queries

mod bvh;
mod cube;
mod mesh;
mod path;
mod ray;
mod shape;
mod triangle;

pub use bvh::Bvh;
pub use cube::Cube;
pub use mesh::Mesh;
pub use path::{Path, Paths};
pub use ray::Ray;
pub use shape::Shape;
pub use triangle::Triangle;
