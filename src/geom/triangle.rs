//! Single triangles: the occluding primitive of meshes.

use crate::util::{BBox3d, Vector};

use super::{Path, Paths, Ray, Shape};

/// Determinant and hit-distance cutoff for ray/triangle tests.
const EPS: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub v1: Vector,
    pub v2: Vector,
    pub v3: Vector,
}

impl Triangle {
    pub const fn new(v1: Vector, v2: Vector, v3: Vector) -> Self {
        Self { v1, v2, v3 }
    }

    /// Edges in winding order: v1-v2, v2-v3, v3-v1.
    pub fn edges(&self) -> [(Vector, Vector); 3] {
        [(self.v1, self.v2), (self.v2, self.v3), (self.v3, self.v1)]
    }

    pub fn is_finite(&self) -> bool {
        self.v1.is_finite() && self.v2.is_finite() && self.v3.is_finite()
    }
}

impl Shape for Triangle {
    fn bounding_box(&self) -> BBox3d {
        let mut b = BBox3d::from_point(self.v1);
        b.expand_by_point(self.v2);
        b.expand_by_point(self.v3);
        b
    }

    /// Möller–Trumbore.
    fn intersect(&self, ray: &Ray) -> Option<f64> {
        let e1 = self.v2 - self.v1;
        let e2 = self.v3 - self.v1;
        let p = ray.direction.cross(e2);
        let det = e1.dot(p);
        if det.abs() < EPS {
            return None;
        }
        let inv = 1.0 / det;
        let t = ray.origin - self.v1;
        let u = t.dot(p) * inv;
        if !(0.0..=1.0).contains(&u) {
            return None;
        }
        let q = t.cross(e1);
        let v = ray.direction.dot(q) * inv;
        if v < 0.0 || u + v > 1.0 {
            return None;
        }
        let d = e2.dot(q) * inv;
        (d >= EPS).then_some(d)
    }

    fn paths(&self) -> Paths {
        self.edges()
            .into_iter()
            .filter_map(|(a, b)| Path::segment(a, b))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn floor() -> Triangle {
        Triangle::new(
            Vector::new(0.0, 0.0, 0.0),
            Vector::new(2.0, 0.0, 0.0),
            Vector::new(0.0, 2.0, 0.0),
        )
    }

    #[test]
    fn test_hit_from_above() {
        let ray = Ray::new(Vector::new(0.5, 0.5, 3.0), -Vector::Z);
        let t = floor().intersect(&ray).unwrap();
        assert!((t - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_miss_outside_and_behind() {
        let outside = Ray::new(Vector::new(1.5, 1.5, 3.0), -Vector::Z);
        assert!(floor().intersect(&outside).is_none());

        let behind = Ray::new(Vector::new(0.5, 0.5, 3.0), Vector::Z);
        assert!(floor().intersect(&behind).is_none());

        let parallel = Ray::new(Vector::new(0.5, 0.5, 1.0), Vector::X);
        assert!(floor().intersect(&parallel).is_none());
    }

    #[test]
    fn test_no_self_hit_from_surface() {
        let ray = Ray::new(Vector::new(0.5, 0.5, 0.0), Vector::new(0.3, 0.2, 1.0));
        assert!(floor().intersect(&ray).is_none());
    }

    #[test]
    fn test_paths_are_edges() {
        let paths = floor().paths();
        assert_eq!(paths.len(), 3);
        assert_eq!(paths[0].start(), Vector::ZERO);
        assert_eq!(paths[2].end(), Vector::ZERO);
        assert!(floor().validate().is_ok());
    }
}
