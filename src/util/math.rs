//! Math type re-exports and projection helpers.
//!
//! This module re-exports the double precision types from `glam` used as
//! the scene's Vector and Matrix types, and provides the axis-aligned
//! bounding box used by shapes and the scene hierarchy.

// Re-export glam types
pub use glam::{DMat4, DVec2, DVec3, DVec4};

use std::fmt;

/// A point or direction in scene (or screen) space.
pub type Vector = DVec3;

/// A 4x4 homogeneous transform.
pub type Matrix = DMat4;

/// 3D bounding box with double precision.
#[derive(Clone, Copy, PartialEq)]
pub struct BBox3d {
    pub min: DVec3,
    pub max: DVec3,
}

impl BBox3d {
    /// Empty bounding box (inverted, will expand on first point).
    pub const EMPTY: Self = Self {
        min: DVec3::splat(f64::INFINITY),
        max: DVec3::splat(f64::NEG_INFINITY),
    };

    /// Create a new bounding box from two opposite corners, in any order.
    #[inline]
    pub fn new(a: DVec3, b: DVec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Create a bounding box from a single point.
    #[inline]
    pub fn from_point(p: DVec3) -> Self {
        Self { min: p, max: p }
    }

    /// Check if this box is empty (min above max on some axis).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Both corners are finite.
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.min.is_finite() && self.max.is_finite()
    }

    /// Expand this box to include a point.
    #[inline]
    pub fn expand_by_point(&mut self, p: DVec3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    /// Expand this box to include another box.
    #[inline]
    pub fn expand_by_box(&mut self, other: &Self) {
        if !other.is_empty() {
            self.min = self.min.min(other.min);
            self.max = self.max.max(other.max);
        }
    }

    /// Get the center of the box.
    #[inline]
    pub fn center(&self) -> DVec3 {
        (self.min + self.max) * 0.5
    }

    /// Get the size (extents) of the box.
    #[inline]
    pub fn size(&self) -> DVec3 {
        self.max - self.min
    }

    /// Surface area (for SAH cost). Zero for empty boxes.
    #[inline]
    pub fn surface_area(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        let d = self.size();
        2.0 * (d.x * d.y + d.y * d.z + d.z * d.x)
    }

    /// Point containment, inclusive of the faces.
    #[inline]
    pub fn contains(&self, p: DVec3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }

    /// Slab test along a ray.
    ///
    /// Returns `(t_enter, t_exit)`; the ray misses when `t_enter > t_exit`.
    /// Axis-parallel rays produce infinities (or NaN on a face plane), which
    /// `f64::min`/`f64::max` absorb.
    pub fn ray_span(&self, origin: DVec3, direction: DVec3) -> (f64, f64) {
        let n = (self.min - origin) / direction;
        let f = (self.max - origin) / direction;
        let mut t0 = f64::NEG_INFINITY;
        let mut t1 = f64::INFINITY;
        for i in 0..3 {
            t0 = t0.max(n[i].min(f[i]));
            t1 = t1.min(n[i].max(f[i]));
        }
        (t0, t1)
    }
}

impl Default for BBox3d {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl fmt::Debug for BBox3d {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BBox3d({:?} - {:?})", self.min, self.max)
    }
}

/// World-to-clip transform for a look-at camera with an OpenGL-style
/// perspective (clip volume is [-1, 1] on every axis). `fovy` is in degrees.
pub fn view_projection(
    eye: DVec3,
    center: DVec3,
    up: DVec3,
    fovy: f64,
    aspect: f64,
    znear: f64,
    zfar: f64,
) -> DMat4 {
    let view = DMat4::look_at_rh(eye, center, up);
    let projection = DMat4::perspective_rh_gl(fovy.to_radians(), aspect, znear, zfar);
    projection * view
}

/// Clip-space to viewport transform: x and y map from [-1, 1] to
/// [0, width] and [0, height]; depth is flattened to zero.
pub fn viewport(width: f64, height: f64) -> DMat4 {
    DMat4::from_scale(DVec3::new(width / 2.0, height / 2.0, 0.0))
        * DMat4::from_translation(DVec3::new(1.0, 1.0, 0.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bbox3d() {
        let mut b = BBox3d::EMPTY;
        assert!(b.is_empty());
        assert_eq!(b.surface_area(), 0.0);

        b.expand_by_point(DVec3::new(-1.0, -1.0, -1.0));
        b.expand_by_point(DVec3::new(1.0, 1.0, 1.0));

        assert_eq!(b.center(), DVec3::ZERO);
        assert_eq!(b.size(), DVec3::splat(2.0));
        assert_eq!(b.surface_area(), 24.0);
        assert!(b.contains(DVec3::new(1.0, 0.0, -1.0)));
        assert!(!b.contains(DVec3::new(1.5, 0.0, 0.0)));
    }

    #[test]
    fn test_bbox_new_orders_corners() {
        let b = BBox3d::new(DVec3::new(1.0, -2.0, 3.0), DVec3::new(-1.0, 2.0, 0.0));
        assert_eq!(b.min, DVec3::new(-1.0, -2.0, 0.0));
        assert_eq!(b.max, DVec3::new(1.0, 2.0, 3.0));
        assert_eq!(b.size(), DVec3::new(2.0, 4.0, 3.0));
    }

    #[test]
    fn test_ray_span() {
        let b = BBox3d::new(DVec3::splat(-1.0), DVec3::splat(1.0));
        let (t0, t1) = b.ray_span(DVec3::new(-5.0, 0.0, 0.0), DVec3::X);
        assert!((t0 - 4.0).abs() < 1e-12);
        assert!((t1 - 6.0).abs() < 1e-12);

        // Parallel ray outside the slab misses
        let (t0, t1) = b.ray_span(DVec3::new(-5.0, 2.0, 0.0), DVec3::X);
        assert!(t0 > t1);
    }

    #[test]
    fn test_viewport_maps_clip_corners() {
        let m = viewport(1000.0, 500.0);
        assert_eq!(m.transform_point3(DVec3::new(-1.0, -1.0, 0.7)), DVec3::ZERO);
        assert_eq!(m.transform_point3(DVec3::new(1.0, 1.0, -0.3)), DVec3::new(1000.0, 500.0, 0.0));
    }

    #[test]
    fn test_view_projection_centers_target() {
        let eye = DVec3::new(4.0, 3.0, 2.0);
        let m = view_projection(eye, DVec3::ZERO, DVec3::Z, 50.0, 1.0, 0.1, 10.0);
        let p = m.project_point3(DVec3::ZERO);
        assert!(p.x.abs() < 1e-9 && p.y.abs() < 1e-9);
        assert!(p.z > -1.0 && p.z < 1.0);
    }
}
