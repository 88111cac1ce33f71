//! Polylines: the unit of drawing.
//!
//! A [`Path`] is one continuous stroke of at least two points with no
//! adjacent duplicates; the constructor enforces this, so degenerate strokes
//! are dropped at creation rather than special-cased downstream.
//! [`Paths`] is an ordered collection; its order is the draw order.

use std::ops::Index;

use crate::util::{BBox3d, Matrix, Vector};

/// One continuous stroke.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    points: Vec<Vector>,
}

impl Path {
    /// Build a path, removing adjacent duplicate points.
    ///
    /// Returns `None` if fewer than two distinct points remain.
    pub fn new(mut points: Vec<Vector>) -> Option<Self> {
        points.dedup();
        (points.len() >= 2).then_some(Self { points })
    }

    /// Two-point path; `None` for a zero-length segment.
    pub fn segment(a: Vector, b: Vector) -> Option<Self> {
        Self::new(vec![a, b])
    }

    #[inline]
    pub fn points(&self) -> &[Vector] {
        &self.points
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false: a path holds at least two points.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[inline]
    pub fn start(&self) -> Vector {
        self.points[0]
    }

    #[inline]
    pub fn end(&self) -> Vector {
        self.points[self.points.len() - 1]
    }

    /// Drawn length along the stroke.
    pub fn length(&self) -> f64 {
        self.points.windows(2).map(|w| w[0].distance(w[1])).sum()
    }

    pub fn bounding_box(&self) -> BBox3d {
        let mut b = BBox3d::EMPTY;
        for &p in &self.points {
            b.expand_by_point(p);
        }
        b
    }

    /// Subdivide so consecutive points are at most `step` apart.
    ///
    /// Original vertices are kept and each segment is split evenly, so no
    /// sample lands a rounding error away from a vertex. `step` must be
    /// positive.
    pub fn chop(&self, step: f64) -> Self {
        debug_assert!(step > 0.0);
        let mut out = Vec::with_capacity(self.points.len());
        out.push(self.points[0]);
        for w in self.points.windows(2) {
            let (a, b) = (w[0], w[1]);
            let v = b - a;
            let n = (v.length() / step).ceil().max(1.0) as usize;
            out.extend((1..n).map(|i| a + v * (i as f64 / n as f64)));
            out.push(b);
        }
        Self { points: out }
    }

    /// Split into maximal runs of points accepted by `f`, replacing each
    /// accepted point with the value `f` returns. Runs shorter than two
    /// points are dropped.
    pub fn filter<F>(&self, mut f: F) -> Vec<Self>
    where
        F: FnMut(Vector) -> Option<Vector>,
    {
        let mut out = Vec::new();
        let mut run = Vec::new();
        for &p in &self.points {
            match f(p) {
                Some(mapped) => run.push(mapped),
                None => {
                    if let Some(path) = Self::new(std::mem::take(&mut run)) {
                        out.push(path);
                    }
                }
            }
        }
        if let Some(path) = Self::new(run) {
            out.push(path);
        }
        out
    }

    /// Douglas-Peucker simplification; endpoints are always kept.
    pub fn simplify(&self, threshold: f64) -> Self {
        let n = self.points.len();
        if n < 3 {
            return self.clone();
        }
        let mut keep = vec![false; n];
        keep[0] = true;
        keep[n - 1] = true;

        // Explicit stack; chopped edges can hold thousands of points
        let mut stack = vec![(0usize, n - 1)];
        while let Some((first, last)) = stack.pop() {
            let (a, b) = (self.points[first], self.points[last]);
            let mut index = 0;
            let mut distance = 0.0;
            for i in first + 1..last {
                let d = segment_distance(self.points[i], a, b);
                if d > distance {
                    index = i;
                    distance = d;
                }
            }
            if distance > threshold {
                keep[index] = true;
                stack.push((first, index));
                stack.push((index, last));
            }
        }

        let points = self
            .points
            .iter()
            .zip(&keep)
            .filter_map(|(&p, &k)| k.then_some(p))
            .collect();
        Self { points }
    }

    /// Apply a projective transform (with perspective divide) to every point.
    ///
    /// `None` if the result collapses to fewer than two distinct points.
    pub fn transform(&self, matrix: &Matrix) -> Option<Self> {
        Self::new(
            self.points
                .iter()
                .map(|&p| matrix.project_point3(p))
                .collect(),
        )
    }
}

impl Index<usize> for Path {
    type Output = Vector;

    fn index(&self, index: usize) -> &Vector {
        &self.points[index]
    }
}

/// Distance from `p` to the segment `a`-`b`.
fn segment_distance(p: Vector, a: Vector, b: Vector) -> f64 {
    let v = b - a;
    let l2 = v.length_squared();
    if l2 == 0.0 {
        return p.distance(a);
    }
    let t = ((p - a).dot(v) / l2).clamp(0.0, 1.0);
    p.distance(a + v * t)
}

/// Ordered collection of paths.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Paths {
    paths: Vec<Path>,
}

impl Paths {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn push(&mut self, path: Path) {
        self.paths.push(path);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Path> {
        self.paths.iter()
    }

    pub fn as_slice(&self) -> &[Path] {
        &self.paths
    }

    pub fn into_inner(self) -> Vec<Path> {
        self.paths
    }

    /// Total number of points over all paths.
    pub fn point_count(&self) -> usize {
        self.paths.iter().map(Path::len).sum()
    }

    /// Total drawn length.
    pub fn length(&self) -> f64 {
        self.paths.iter().map(Path::length).sum()
    }

    pub fn bounding_box(&self) -> BBox3d {
        let mut b = BBox3d::EMPTY;
        for p in &self.paths {
            b.expand_by_box(&p.bounding_box());
        }
        b
    }

    /// Beam-off travel for one closed traversal: the distance from each
    /// path's end to the next path's start, wrapping from the last back to
    /// the first.
    pub fn blank_distance(&self) -> f64 {
        let n = self.paths.len();
        (0..n)
            .map(|i| self.paths[i].end().distance(self.paths[(i + 1) % n].start()))
            .sum()
    }

    pub fn chop(&self, step: f64) -> Self {
        self.paths.iter().map(|p| p.chop(step)).collect()
    }

    pub fn filter<F>(&self, mut f: F) -> Self
    where
        F: FnMut(Vector) -> Option<Vector>,
    {
        self.paths.iter().flat_map(|p| p.filter(&mut f)).collect()
    }

    pub fn simplify(&self, threshold: f64) -> Self {
        self.paths.iter().map(|p| p.simplify(threshold)).collect()
    }

    pub fn transform(&self, matrix: &Matrix) -> Self {
        self.paths.iter().filter_map(|p| p.transform(matrix)).collect()
    }
}

impl Index<usize> for Paths {
    type Output = Path;

    fn index(&self, index: usize) -> &Path {
        &self.paths[index]
    }
}

impl FromIterator<Path> for Paths {
    fn from_iter<I: IntoIterator<Item = Path>>(iter: I) -> Self {
        Self {
            paths: iter.into_iter().collect(),
        }
    }
}

impl Extend<Path> for Paths {
    fn extend<I: IntoIterator<Item = Path>>(&mut self, iter: I) {
        self.paths.extend(iter);
    }
}

impl From<Vec<Path>> for Paths {
    fn from(paths: Vec<Path>) -> Self {
        Self { paths }
    }
}

impl IntoIterator for Paths {
    type Item = Path;
    type IntoIter = std::vec::IntoIter<Path>;

    fn into_iter(self) -> Self::IntoIter {
        self.paths.into_iter()
    }
}

impl<'a> IntoIterator for &'a Paths {
    type Item = &'a Path;
    type IntoIter = std::slice::Iter<'a, Path>;

    fn into_iter(self) -> Self::IntoIter {
        self.paths.iter()
    }
}
