//! Triangle meshes.

use std::collections::HashSet;

use crate::util::{BBox3d, Error, Result, Vector};

use super::{Bvh, Path, Paths, Ray, Shape, Triangle};

/// Arbitrary triangle soup, drawn as its unique edges.
#[derive(Debug, Clone)]
pub struct Mesh {
    triangles: Vec<Triangle>,
    bounds: BBox3d,
    bvh: Bvh,
}

impl Mesh {
    /// Build a mesh. Fails for an empty list or non-finite vertices.
    pub fn new(triangles: Vec<Triangle>) -> Result<Self> {
        if triangles.is_empty() {
            return Err(Error::shape("mesh has no triangles"));
        }
        if let Some(i) = triangles.iter().position(|t| !t.is_finite()) {
            return Err(Error::shape(format!("mesh triangle {i} has non-finite vertices")));
        }
        let boxes: Vec<BBox3d> = triangles.iter().map(|t| t.bounding_box()).collect();
        let mut bounds = BBox3d::EMPTY;
        for b in &boxes {
            bounds.expand_by_box(b);
        }
        let bvh = Bvh::build(&boxes);
        Ok(Self {
            triangles,
            bounds,
            bvh,
        })
    }

    /// Build from a vertex list and triangle index triples.
    pub fn from_indexed(positions: &[Vector], faces: &[[usize; 3]]) -> Result<Self> {
        let triangles = faces
            .iter()
            .map(|&[a, b, c]| {
                let get = |i: usize| {
                    let count = positions.len();
                    positions.get(i).copied().ok_or_else(|| {
                        Error::shape(format!("face index {i} out of bounds (count: {count})"))
                    })
                };
                Ok(Triangle::new(get(a)?, get(b)?, get(c)?))
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(triangles)
    }
}

/// Order-independent key for an edge.
fn edge_key(a: Vector, b: Vector) -> [u64; 6] {
    let (a, b) = (a.to_array().map(f64::to_bits), b.to_array().map(f64::to_bits));
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    [lo[0], lo[1], lo[2], hi[0], hi[1], hi[2]]
}

impl Shape for Mesh {
    fn bounding_box(&self) -> BBox3d {
        self.bounds
    }

    fn intersect(&self, ray: &Ray) -> Option<f64> {
        self.bvh.nearest_hit(ray, |i, ray| self.triangles[i].intersect(ray))
    }

    /// Shared edges are emitted once, at their first occurrence.
    fn paths(&self) -> Paths {
        let mut seen = HashSet::new();
        self.triangles
            .iter()
            .flat_map(Triangle::edges)
            .filter(|&(a, b)| seen.insert(edge_key(a, b)))
            .filter_map(|(a, b)| Path::segment(a, b))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> Mesh {
        let positions = [
            Vector::new(0.0, 0.0, 0.0),
            Vector::new(1.0, 0.0, 0.0),
            Vector::new(1.0, 1.0, 0.0),
            Vector::new(0.0, 1.0, 0.0),
        ];
        Mesh::from_indexed(&positions, &[[0, 1, 2], [0, 2, 3]]).unwrap()
    }

    #[test]
    fn test_shared_edge_emitted_once() {
        let paths = quad().paths();
        // 4 rim edges + 1 diagonal
        assert_eq!(paths.len(), 5);
    }

    #[test]
    fn test_intersect_nearest() {
        let at_depth = |z: f64| {
            Triangle::new(
                Vector::new(-1.0, -1.0, z),
                Vector::new(1.0, -1.0, z),
                Vector::new(0.0, 1.0, z),
            )
        };
        let (near, far) = (at_depth(1.0), at_depth(2.0));
        let mesh = Mesh::new(vec![far, near]).unwrap();
        let t = mesh.intersect(&Ray::new(Vector::ZERO, Vector::Z)).unwrap();
        assert!((t - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_meshes() {
        assert!(matches!(Mesh::new(vec![]), Err(Error::InvalidShape(_))));

        let nan = Triangle::new(Vector::new(f64::NAN, 0.0, 0.0), Vector::X, Vector::Y);
        assert!(Mesh::new(vec![nan]).is_err());

        let err = Mesh::from_indexed(&[Vector::ZERO], &[[0, 1, 2]]).unwrap_err();
        assert!(err.to_string().contains("out of bounds"));
    }

    #[test]
    fn test_bounds() {
        let b = quad().bounding_box();
        assert_eq!(b.min, Vector::ZERO);
        assert_eq!(b.max, Vector::new(1.0, 1.0, 0.0));
        assert!(quad().validate().is_ok());
    }
}
