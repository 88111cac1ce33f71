//! The renderable-shape capability.

use std::fmt;

use crate::util::{BBox3d, Error, Result};

use super::{Paths, Ray};

/// Anything the visibility renderer can draw.
///
/// A shape contributes occluding surfaces through [`Shape::intersect`] and
/// candidate strokes through [`Shape::paths`]. Shapes are read-only once
/// added to a scene and are queried from several render threads at once.
pub trait Shape: Send + Sync + fmt::Debug {
    /// Box enclosing every surface and path of the shape.
    fn bounding_box(&self) -> BBox3d;

    /// Distance along `ray` to the nearest opaque surface, if any.
    ///
    /// Surfaces at (numerically) zero distance from the origin are ignored,
    /// so a ray cast from a point sampled on the shape's own surface does
    /// not hit that surface.
    fn intersect(&self, ray: &Ray) -> Option<f64>;

    /// 3D strokes depicting the shape, before visibility is applied.
    fn paths(&self) -> Paths;

    /// Build-time check: reject shapes that cannot be rendered.
    fn validate(&self) -> Result<()> {
        let b = self.bounding_box();
        if b.is_empty() || !b.is_finite() {
            return Err(Error::shape(format!("{self:?} has no finite bounds")));
        }
        if self.paths().is_empty() {
            return Err(Error::shape(format!("{self:?} has no drawable edges")));
        }
        Ok(())
    }
}

impl<S: Shape + ?Sized> Shape for Box<S> {
    fn bounding_box(&self) -> BBox3d {
        (**self).bounding_box()
    }

    fn intersect(&self, ray: &Ray) -> Option<f64> {
        (**self).intersect(ray)
    }

    fn paths(&self) -> Paths {
        (**self).paths()
    }

    fn validate(&self) -> Result<()> {
        (**self).validate()
    }
}
