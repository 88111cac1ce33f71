//! Scene: the owned, insertion-ordered set of shapes.

use std::sync::OnceLock;

use crate::geom::{Bvh, Paths, Ray, Shape};
use crate::util::{BBox3d, Result, Vector};

use super::Camera;

/// Collection of shapes queried by the renderer.
///
/// Shapes are validated when added, so a scene that was built successfully
/// always renders. The occlusion hierarchy is built lazily on the first
/// query and dropped whenever a shape is added.
#[derive(Debug, Default)]
pub struct Scene {
    shapes: Vec<Box<dyn Shape>>,
    bvh: OnceLock<Bvh>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a shape, rejecting unrenderable ones.
    pub fn add<S: Shape + 'static>(&mut self, shape: S) -> Result<()> {
        self.add_boxed(Box::new(shape))
    }

    pub fn add_boxed(&mut self, shape: Box<dyn Shape>) -> Result<()> {
        shape.validate()?;
        tracing::debug!(index = self.shapes.len(), ?shape, "add shape");
        self.shapes.push(shape);
        self.bvh = OnceLock::new();
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn shapes(&self) -> &[Box<dyn Shape>] {
        &self.shapes
    }

    pub fn bounding_box(&self) -> BBox3d {
        self.bvh().bounds()
    }

    /// Occlusion hierarchy over shape bounds, built on first use.
    pub(crate) fn bvh(&self) -> &Bvh {
        self.bvh.get_or_init(|| {
            let boxes: Vec<BBox3d> = self.shapes.iter().map(|s| s.bounding_box()).collect();
            Bvh::build(&boxes)
        })
    }

    /// Nearest hit over all shapes.
    pub fn intersect(&self, ray: &Ray) -> Option<f64> {
        self.bvh().nearest_hit(ray, |i, ray| self.shapes[i].intersect(ray))
    }

    /// Whether the segment from `point` to `eye` is unobstructed.
    pub fn visible(&self, eye: Vector, point: Vector) -> bool {
        let v = eye - point;
        let ray = Ray::new(point, v);
        match self.intersect(&ray) {
            Some(t) => t >= v.length(),
            None => true,
        }
    }

    /// Unclipped 3D strokes of every shape, in insertion order.
    pub fn paths(&self) -> Paths {
        self.shapes.iter().flat_map(|s| s.paths()).collect()
    }

    /// Hidden-line render; see [`super::render`].
    pub fn render(&self, camera: &Camera, step: f64) -> Result<Paths> {
        super::render(self, camera, step)
    }
}
