//! Bounding volume hierarchy for nearest-hit ray queries.
//!
//! Built over a slice of item boxes with binned SAH splits into a flat node
//! array. Items are referenced by index; callers keep the items themselves
//! and answer per-item hit tests through a closure.

use crate::util::{BBox3d, Vector};

use super::Ray;

/// Number of SAH bins per axis.
const NUM_BINS: usize = 12;

const TRAVERSAL_COST: f64 = 1.0;
const INTERSECT_COST: f64 = 1.0;

/// Leaves never hold more items than this unless splitting is degenerate.
const MAX_LEAF_SIZE: usize = 4;

/// Flat node. Internal: `first` is the left child (right is `first + 1`),
/// `count == 0`. Leaf: `first..first + count` indexes `Bvh::items`.
#[derive(Debug, Clone, Copy)]
struct Node {
    bounds: BBox3d,
    first: usize,
    count: usize,
}

/// Built hierarchy.
#[derive(Debug, Clone)]
pub struct Bvh {
    nodes: Vec<Node>,
    /// Item indices reordered so every leaf covers a contiguous range.
    items: Vec<usize>,
}

impl Bvh {
    /// Build from per-item bounding boxes.
    #[tracing::instrument(skip_all, fields(item_count = boxes.len()))]
    pub fn build(boxes: &[BBox3d]) -> Self {
        let n = boxes.len();
        let mut items: Vec<usize> = (0..n).collect();
        let mut nodes = Vec::with_capacity(2 * n.max(1));
        nodes.push(Node {
            bounds: BBox3d::EMPTY,
            first: 0,
            count: 0,
        });
        if n == 0 {
            return Self { nodes, items };
        }

        let centroids: Vec<Vector> = boxes.iter().map(BBox3d::center).collect();

        // (node, item range) still to be placed
        let mut pending = vec![(0usize, 0usize, n)];

        while let Some((node, start, end)) = pending.pop() {
            let range = &mut items[start..end];

            let mut bounds = BBox3d::EMPTY;
            let mut centroid_bounds = BBox3d::EMPTY;
            for &i in range.iter() {
                bounds.expand_by_box(&boxes[i]);
                centroid_bounds.expand_by_point(centroids[i]);
            }

            let leaf = Node {
                bounds,
                first: start,
                count: range.len(),
            };
            if range.len() <= MAX_LEAF_SIZE {
                nodes[node] = leaf;
                continue;
            }

            let leaf_cost = range.len() as f64 * INTERSECT_COST * bounds.surface_area();
            let split = best_split(range, boxes, &centroids, &centroid_bounds)
                .filter(|split| split.cost < leaf_cost);
            let Some(split) = split else {
                nodes[node] = leaf;
                continue;
            };
            tracing::trace!(node, axis = split.binning.axis, cost = split.cost, "split");

            // Left side first, then cut where the right side begins
            let goes_right = |i: &usize| split.binning.bin(centroids[*i]) >= split.first_right;
            range.sort_unstable_by_key(|i| goes_right(i));
            let mid = match start + range.partition_point(|i| !goes_right(i)) {
                mid if mid == start || mid == end => (start + end) / 2,
                mid => mid,
            };

            let left = nodes.len();
            nodes.extend([leaf, leaf]);
            nodes[node] = Node {
                bounds,
                first: left,
                count: 0,
            };

            pending.push((left + 1, mid, end));
            pending.push((left, start, mid));
        }

        Self { nodes, items }
    }

    /// Number of nodes (1 for an empty or single-leaf hierarchy).
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Bounds of everything in the hierarchy.
    pub fn bounds(&self) -> BBox3d {
        self.nodes[0].bounds
    }

    /// Nearest hit distance along `ray`.
    ///
    /// `hit(index, ray)` tests a single item and returns its hit distance.
    /// Subtrees whose boxes lie entirely behind the ray origin or beyond the
    /// best hit so far are skipped.
    pub fn nearest_hit<F>(&self, ray: &Ray, mut hit: F) -> Option<f64>
    where
        F: FnMut(usize, &Ray) -> Option<f64>,
    {
        if self.items.is_empty() {
            return None;
        }
        let mut best = f64::INFINITY;
        let mut stack = vec![0usize];
        while let Some(i) = stack.pop() {
            let node = &self.nodes[i];
            let (t0, t1) = node.bounds.ray_span(ray.origin, ray.direction);
            if t0 > t1 || t1 < 0.0 || t0 > best {
                continue;
            }
            if node.count > 0 {
                for &item in &self.items[node.first..node.first + node.count] {
                    if let Some(t) = hit(item, ray) {
                        best = best.min(t);
                    }
                }
            } else {
                stack.push(node.first + 1);
                stack.push(node.first);
            }
        }
        best.is_finite().then_some(best)
    }
}

/// Items whose centroids fall in one slot of a [`Binning`].
#[derive(Debug, Clone, Copy, Default)]
struct Bin {
    bounds: BBox3d,
    count: usize,
}

impl Bin {
    fn merge(&mut self, other: &Bin) {
        self.bounds.expand_by_box(&other.bounds);
        self.count += other.count;
    }

    fn cost(&self) -> f64 {
        self.count as f64 * self.bounds.surface_area()
    }
}

/// Equal-width slots along one axis of the centroid bounds.
#[derive(Debug, Clone, Copy)]
struct Binning {
    axis: usize,
    lo: f64,
    scale: f64,
}

impl Binning {
    /// `None` when the centroids do not spread along `axis`.
    fn new(axis: usize, centroid_bounds: &BBox3d) -> Option<Self> {
        let lo = centroid_bounds.min[axis];
        let extent = centroid_bounds.max[axis] - lo;
        (extent >= 1e-12).then(|| Self {
            axis,
            lo,
            scale: NUM_BINS as f64 / extent,
        })
    }

    fn bin(&self, centroid: Vector) -> usize {
        (((centroid[self.axis] - self.lo) * self.scale) as usize).min(NUM_BINS - 1)
    }
}

/// Candidate split: bins `first_right..` go to the right child.
#[derive(Debug, Clone, Copy)]
struct Split {
    binning: Binning,
    first_right: usize,
    cost: f64,
}

/// Cheapest SAH split over all three axes, `None` if every axis is
/// degenerate.
fn best_split(
    items: &[usize],
    boxes: &[BBox3d],
    centroids: &[Vector],
    centroid_bounds: &BBox3d,
) -> Option<Split> {
    (0..3)
        .filter_map(|axis| Binning::new(axis, centroid_bounds))
        .filter_map(|binning| {
            let mut bins = [Bin::default(); NUM_BINS];
            for &i in items {
                let bin = &mut bins[binning.bin(centroids[i])];
                bin.bounds.expand_by_box(&boxes[i]);
                bin.count += 1;
            }

            // left[k] covers bins[..k]
            let mut left = [Bin::default(); NUM_BINS];
            for k in 1..NUM_BINS {
                left[k] = left[k - 1];
                left[k].merge(&bins[k - 1]);
            }

            let mut right = Bin::default();
            let mut best: Option<Split> = None;
            for k in (1..NUM_BINS).rev() {
                right.merge(&bins[k]);
                let cost = TRAVERSAL_COST + INTERSECT_COST * (left[k].cost() + right.cost());
                if best.is_none_or(|b| cost < b.cost) {
                    best = Some(Split {
                        binning,
                        first_right: k,
                        cost,
                    });
                }
            }
            best
        })
        .min_by(|a, b| a.cost.total_cmp(&b.cost))
}
