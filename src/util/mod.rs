//! Utility types and functions for laserline.
//!
//! This module contains fundamental types used throughout the library:
//! - [`Error`] / [`Result`] - Error handling
//! - Math type re-exports from glam, [`BBox3d`] and projection helpers

mod error;
mod math;

pub use error::*;
pub use math::*;
