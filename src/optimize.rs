//! Draw-order optimization.
//!
//! Reorders paths to cut the beam-off travel between the end of one path
//! and the start of the next. This is an open path-linking (TSP-like)
//! problem; a greedy nearest-neighbour chain is good enough for wireframes
//! and, unlike local-search heuristics, is a fixed point of itself.

use crate::geom::{Path, Paths};

/// Greedy nearest-neighbour order over `paths`, as input indices.
///
/// The first path stays first. Each following path is the remaining one
/// whose start is closest to the current end; ties go to the earliest in
/// input order. Running this on its own output returns the identity order.
pub fn order(paths: &[Path]) -> Vec<usize> {
    let n = paths.len();
    let mut out = Vec::with_capacity(n);
    if n == 0 {
        return out;
    }
    let mut remaining: Vec<usize> = (1..n).collect();
    out.push(0);
    let mut end = paths[0].end();
    while !remaining.is_empty() {
        let mut best = 0;
        let mut best_distance = f64::INFINITY;
        for (slot, &i) in remaining.iter().enumerate() {
            let d = end.distance_squared(paths[i].start());
            if d < best_distance {
                best = slot;
                best_distance = d;
            }
        }
        let next = remaining.remove(best);
        end = paths[next].end();
        out.push(next);
    }
    out
}

/// Reorder `paths` to reduce blank travel. Paths themselves are untouched.
#[tracing::instrument(skip_all, fields(paths = paths.len()))]
pub fn optimize(paths: Paths) -> Paths {
    let before = paths.blank_distance();
    let order = order(paths.as_slice());
    let mut slots: Vec<Option<Path>> = paths.into_inner().into_iter().map(Some).collect();
    let optimized: Paths = order.into_iter().filter_map(|i| slots[i].take()).collect();
    tracing::debug!(before, after = optimized.blank_distance(), "optimized blank travel");
    optimized
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::Vector;

    fn seg(x1: f64, y1: f64, x2: f64, y2: f64) -> Path {
        Path::segment(Vector::new(x1, y1, 0.0), Vector::new(x2, y2, 0.0)).unwrap()
    }

    #[test]
    fn test_empty_and_single() {
        assert!(optimize(Paths::new()).is_empty());
        let one: Paths = vec![seg(0.0, 0.0, 1.0, 0.0)].into();
        assert_eq!(optimize(one.clone()), one);
    }

    #[test]
    fn test_chains_nearest() {
        let paths: Paths = vec![
            seg(0.0, 0.0, 1.0, 0.0),
            seg(10.0, 0.0, 11.0, 0.0),
            seg(1.0, 0.0, 2.0, 0.0),
            seg(2.5, 0.0, 3.0, 0.0),
        ]
        .into();
        let out = optimize(paths.clone());
        assert_eq!(
            out.as_slice(),
            &[
                paths[0].clone(),
                paths[2].clone(),
                paths[3].clone(),
                paths[1].clone()
            ]
        );
        assert!(out.blank_distance() < paths.blank_distance());
    }

    #[test]
    fn test_ties_keep_input_order() {
        // Both candidates start 1 unit from the first path's end
        let paths: Paths = vec![
            seg(0.0, 0.0, 1.0, 0.0),
            seg(1.0, 1.0, 5.0, 5.0),
            seg(1.0, -1.0, 6.0, 6.0),
        ]
        .into();
        assert_eq!(order(paths.as_slice()), vec![0, 1, 2]);
    }

    #[test]
    fn test_permutation_and_idempotent() {
        let paths: Paths = (0..40)
            .map(|i| {
                let a = (i * 37 % 40) as f64;
                let b = (i * 11 % 13) as f64;
                seg(a, b, b + 0.5, a * 0.5)
            })
            .collect();
        let once = optimize(paths.clone());
        assert_eq!(once.len(), paths.len());
        for p in &paths {
            let want = paths.iter().filter(|q| *q == p).count();
            assert_eq!(once.iter().filter(|q| *q == p).count(), want);
        }

        let twice = optimize(once.clone());
        assert_eq!(twice, once);
        assert_eq!(order(once.as_slice()), (0..once.len()).collect::<Vec<_>>());
    }
}
