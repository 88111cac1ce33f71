//! Paths to point stream.
//!
//! A frame is one closed traversal: every path is drawn in order, and a
//! single blank point moves the beam from each path's end to the next
//! path's start. The last path links back to the first, so each frame
//! starts where the previous one ended regardless of what the next frame
//! contains.

use std::iter;

use crate::geom::{Path, Paths};
use crate::util::{Error, Result, Vector};

use super::{Color, Point};

/// Per-frame encoding parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Encoder {
    speed: f64,
    color: Color,
}

impl Encoder {
    /// `speed` is the longest screen distance allowed between consecutive
    /// drawn points; lower values emit more points and slow the galvos.
    pub fn new(speed: f64, color: Color) -> Result<Self> {
        if !(speed > 0.0 && speed.is_finite()) {
            return Err(Error::parameter("speed", format!("{speed} must be positive and finite")));
        }
        Ok(Self { speed, color })
    }

    /// Lazily encode one frame. Nothing is emitted for an empty `paths`.
    pub fn encode<'a>(&self, paths: &'a Paths) -> impl Iterator<Item = Point> + 'a {
        let Self { speed, color } = *self;
        let paths = paths.as_slice();
        paths.iter().enumerate().flat_map(move |(i, path)| {
            let next = &paths[(i + 1) % paths.len()];
            draw(path, speed, color).chain(blank(path.end(), next.start()))
        })
    }
}

/// Drawn points of one path: every vertex, plus evenly spaced points on
/// segments longer than `speed`.
fn draw(path: &Path, speed: f64, color: Color) -> impl Iterator<Item = Point> + '_ {
    let segments = path.points().windows(2).flat_map(move |w| {
        let (a, b) = (w[0], w[1]);
        let n = (a.distance(b) / speed).ceil().max(1.0) as usize;
        (1..=n).map(move |k| {
            if k == n {
                b
            } else {
                a + (b - a) * (k as f64 / n as f64)
            }
        })
    });
    iter::once(path.start())
        .chain(segments)
        .map(move |v| Point::drawn(v, color))
}

/// Blank move between two paths; nothing when they already touch.
fn blank(from: Vector, to: Vector) -> Option<Point> {
    (from.distance(to) > 0.0).then(|| Point::blank(to))
}
