//! Axis-aligned boxes.

use crate::util::{BBox3d, Vector};

use super::{Path, Paths, Ray, Shape};

/// Distance below which a box face counts as the ray origin's own surface.
const SURFACE_EPS: f64 = 1e-3;

/// Solid axis-aligned box, drawn as its twelve edges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cube {
    pub min: Vector,
    pub max: Vector,
}

impl Cube {
    /// Box spanning two opposite corners, given in any order.
    pub fn new(a: Vector, b: Vector) -> Self {
        let b = BBox3d::new(a, b);
        Self {
            min: b.min,
            max: b.max,
        }
    }
}

impl Shape for Cube {
    fn bounding_box(&self) -> BBox3d {
        BBox3d { min: self.min, max: self.max }
    }

    fn intersect(&self, ray: &Ray) -> Option<f64> {
        let (t0, t1) = self.bounding_box().ray_span(ray.origin, ray.direction);
        if t0 < SURFACE_EPS && t1 > SURFACE_EPS {
            // Origin inside or on the surface: the ray passes through the solid
            Some(t1)
        } else if t0 >= SURFACE_EPS && t0 < t1 {
            Some(t0)
        } else {
            None
        }
    }

    fn paths(&self) -> Paths {
        let (x1, y1, z1) = self.min.into();
        let (x2, y2, z2) = self.max.into();
        let v = Vector::new;
        [
            (v(x1, y1, z1), v(x1, y1, z2)),
            (v(x1, y1, z1), v(x1, y2, z1)),
            (v(x1, y1, z1), v(x2, y1, z1)),
            (v(x1, y1, z2), v(x1, y2, z2)),
            (v(x1, y1, z2), v(x2, y1, z2)),
            (v(x1, y2, z1), v(x1, y2, z2)),
            (v(x1, y2, z1), v(x2, y2, z1)),
            (v(x1, y2, z2), v(x2, y2, z2)),
            (v(x2, y1, z1), v(x2, y1, z2)),
            (v(x2, y1, z1), v(x2, y2, z1)),
            (v(x2, y1, z2), v(x2, y2, z2)),
            (v(x2, y2, z1), v(x2, y2, z2)),
        ]
        .into_iter()
        .filter_map(|(a, b)| Path::segment(a, b))
        .collect()
    }
}
