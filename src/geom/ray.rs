//! Rays for occlusion queries.

use crate::util::Vector;

/// A half-line starting at `origin`. `direction` is unit length when built
/// with [`Ray::new`], so hit parameters are distances.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vector,
    pub direction: Vector,
}

impl Ray {
    /// Create a ray, normalizing `direction`.
    #[inline]
    pub fn new(origin: Vector, direction: Vector) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Point at parameter `t` along the ray.
    #[inline]
    pub fn position(&self, t: f64) -> Vector {
        self.origin + self.direction * t
    }
}
