//! Hidden-line rendering.
//!
//! Every shape edge is chopped into samples `step` apart (in scene units).
//! Each sample is kept only if it falls inside the clip volume and has an
//! unobstructed line of sight to the eye; contiguous runs of kept samples
//! become paths. Runs are simplified in clip space and mapped to the
//! viewport. `step` is a linear fidelity/cost trade-off: halving it doubles
//! the number of occlusion queries and halves the worst-case error at
//! visibility transitions.

use rayon::prelude::*;

use crate::geom::{Paths, Shape};
use crate::util::{BBox3d, DVec4, Error, Matrix, Result, Vector};

use super::{Camera, Scene};

/// Clip-space Douglas-Peucker tolerance applied to visible runs.
const SIMPLIFY_THRESHOLD: f64 = 1e-6;

/// Reject a sampling step that would not terminate or sample nothing.
pub fn validate_step(step: f64) -> Result<()> {
    if step > 0.0 && step.is_finite() {
        Ok(())
    } else {
        Err(Error::parameter("step", format!("{step} must be positive and finite")))
    }
}

/// Render the visible portions of every shape edge as 2D viewport paths.
///
/// Output order follows shape insertion order, then each shape's own edge
/// order, regardless of how shapes are spread across threads.
#[tracing::instrument(skip_all, fields(shapes = scene.len(), step = step))]
pub fn render(scene: &Scene, camera: &Camera, step: f64) -> Result<Paths> {
    camera.validate()?;
    validate_step(step)?;

    let matrix = camera.matrix();
    // Build the occlusion hierarchy once, before fanning out
    scene.bvh();

    let per_shape: Vec<Paths> = scene
        .shapes()
        .par_iter()
        .map(|shape| render_shape(scene, shape.as_ref(), &matrix, camera.eye, step))
        .collect();

    let clip: Paths = per_shape.into_iter().flatten().collect();
    let paths = clip.transform(&camera.viewport());
    tracing::debug!(paths = paths.len(), points = paths.point_count(), "rendered");
    Ok(paths)
}

/// Visible clip-space runs of one shape.
fn render_shape(
    scene: &Scene,
    shape: &dyn Shape,
    matrix: &Matrix,
    eye: Vector,
    step: f64,
) -> Paths {
    if outside_frustum(matrix, &shape.bounding_box()) {
        return Paths::new();
    }
    shape
        .paths()
        .chop(step)
        .filter(|p| clip_point(matrix, p).filter(|_| scene.visible(eye, p)))
        .simplify(SIMPLIFY_THRESHOLD)
}

/// Clip-space position of `p`, or `None` outside the clip volume or
/// behind the eye.
fn clip_point(matrix: &Matrix, p: Vector) -> Option<Vector> {
    let c = *matrix * p.extend(1.0);
    if c.w <= 0.0 {
        return None;
    }
    let ndc = c.truncate() / c.w;
    BBox3d::new(Vector::NEG_ONE, Vector::ONE).contains(ndc).then_some(ndc)
}

/// True when all eight corners of `b` lie beyond the same clip plane.
fn outside_frustum(matrix: &Matrix, b: &BBox3d) -> bool {
    let corners: Vec<DVec4> = (0..8)
        .map(|i| {
            let x = if i & 1 == 0 { b.min.x } else { b.max.x };
            let y = if i & 2 == 0 { b.min.y } else { b.max.y };
            let z = if i & 4 == 0 { b.min.z } else { b.max.z };
            *matrix * DVec4::new(x, y, z, 1.0)
        })
        .collect();
    (0..3).any(|axis| {
        corners.iter().all(|c| c[axis] < -c.w) || corners.iter().all(|c| c[axis] > c.w)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::{Cube, Mesh};

    fn camera(width: f64, height: f64) -> Camera {
        Camera {
            eye: Vector::new(4.0, 3.0, 2.0),
            center: Vector::ZERO,
            up: Vector::Z,
            width,
            height,
            fovy: 50.0,
            znear: 0.1,
            zfar: 10.0,
        }
    }

    fn unit_cube_scene() -> Scene {
        let mut scene = Scene::new();
        scene.add(Cube::new(Vector::splat(-1.0), Vector::ONE)).unwrap();
        scene
    }

    #[test]
    fn test_empty_scene_renders_nothing() {
        let paths = render(&Scene::new(), &camera(1000.0, 1000.0), 0.01).unwrap();
        assert!(paths.is_empty());
    }

    #[test]
    fn test_cube_within_viewport() {
        let paths = render(&unit_cube_scene(), &camera(1000.0, 1000.0), 0.01).unwrap();
        assert!(!paths.is_empty());
        for path in &paths {
            assert!(path.len() >= 2);
            for p in path.points() {
                assert!((0.0..=1000.0).contains(&p.x), "{p:?}");
                assert!((0.0..=1000.0).contains(&p.y), "{p:?}");
                assert_eq!(p.z, 0.0);
            }
            for w in path.points().windows(2) {
                assert_ne!(w[0], w[1]);
            }
        }
    }

    #[test]
    fn test_cube_hides_back_edges() {
        // From (4,3,2) the three edges meeting at (-1,-1,-1) are hidden and
        // the other nine are at least partly visible.
        let paths = render(&unit_cube_scene(), &camera(1000.0, 1000.0), 0.01).unwrap();
        assert_eq!(paths.len(), 9);

        // Collinear samples collapse back to straight strokes
        assert!(paths.iter().all(|p| p.len() == 2));
    }

    #[test]
    fn test_offscreen_shape_contributes_nothing() {
        let mut scene = Scene::new();
        scene.add(Cube::new(Vector::new(-20.0, 0.0, 0.0), Vector::new(-19.0, 1.0, 1.0))).unwrap();
        // Behind the eye
        scene.add(Cube::new(Vector::new(8.0, 6.0, 4.0), Vector::new(9.0, 7.0, 5.0))).unwrap();
        let paths = render(&scene, &camera(1000.0, 1000.0), 0.01).unwrap();
        assert!(paths.is_empty());
    }

    #[test]
    fn test_fully_occluded_shape() {
        // Small cube hidden inside a big one
        let mut scene = Scene::new();
        scene.add(Cube::new(Vector::splat(-0.2), Vector::splat(0.2))).unwrap();
        scene.add(Cube::new(Vector::splat(-1.0), Vector::ONE)).unwrap();
        let with_inner = render(&scene, &camera(1000.0, 1000.0), 0.01).unwrap();
        let alone = render(&unit_cube_scene(), &camera(1000.0, 1000.0), 0.01).unwrap();
        assert_eq!(with_inner, alone);
    }

    #[test]
    fn test_closed_mesh_hides_back_edges() {
        // Unit cube as 12 triangles; corner i has x, y, z from bits 0, 1, 2
        let corners: Vec<Vector> = (0..8)
            .map(|i| {
                let c = |bit: usize| if i & bit == 0 { -1.0 } else { 1.0 };
                Vector::new(c(1), c(2), c(4))
            })
            .collect();
        let faces = [
            [0, 4, 6],
            [0, 6, 2],
            [1, 3, 7],
            [1, 7, 5],
            [0, 1, 5],
            [0, 5, 4],
            [2, 6, 7],
            [2, 7, 3],
            [0, 2, 3],
            [0, 3, 1],
            [4, 5, 7],
            [4, 7, 6],
        ];
        let mesh = Mesh::from_indexed(&corners, &faces).unwrap();
        assert_eq!(mesh.paths().len(), 18);

        let mut scene = Scene::new();
        scene.add(mesh).unwrap();
        let cam = camera(1000.0, 1000.0);
        let paths = render(&scene, &cam, 0.01).unwrap();

        // 9 rim edges plus the diagonals of the three faces toward the eye
        assert_eq!(paths.len(), 12);
        assert!(paths.iter().all(|p| p.len() == 2));

        // Nothing reaches the corner facing away from the eye
        let hidden = (cam.viewport() * cam.matrix()).project_point3(Vector::splat(-1.0));
        for p in &paths {
            assert!(p.start().distance(hidden) > 1.0, "{p:?}");
            assert!(p.end().distance(hidden) > 1.0, "{p:?}");
        }
    }

    #[test]
    fn test_wall_occludes_everything_behind() {
        // A square between the eye and the cube, larger than the cube's
        // silhouette; only the square's own rim is drawn.
        let d = Vector::new(4.0, 3.0, 2.0).normalize();
        let c = d * 2.5;
        let u = d.cross(Vector::Z).normalize() * 3.0;
        let v = u.cross(d).normalize() * 3.0;
        let corners = [c - u - v, c + u - v, c + u + v, c - u + v];
        let wall = Mesh::from_indexed(&corners, &[[0, 1, 2], [0, 2, 3]]).unwrap();

        let mut scene = unit_cube_scene();
        scene.add(wall).unwrap();
        let paths = render(&scene, &camera(1000.0, 1000.0), 0.01).unwrap();
        let cube_only = render(&unit_cube_scene(), &camera(1000.0, 1000.0), 0.01).unwrap();
        for cube_path in &cube_only {
            assert!(!paths.iter().any(|p| p == cube_path));
        }
    }

    #[test]
    fn test_deterministic_across_runs() {
        let mut scene = Scene::new();
        for i in 0..8 {
            let o = Vector::new(i as f64 * 0.3 - 1.0, 0.0, 0.0);
            scene.add(Cube::new(o, o + Vector::splat(0.25))).unwrap();
        }
        let a = render(&scene, &camera(1000.0, 1000.0), 0.02).unwrap();
        let b = render(&scene, &camera(1000.0, 1000.0), 0.02).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_rejects_bad_step_and_camera() {
        let scene = unit_cube_scene();
        let cam = camera(1000.0, 1000.0);
        assert!(matches!(
            render(&scene, &cam, 0.0),
            Err(Error::InvalidParameter { .. })
        ));
        assert!(render(&scene, &cam, f64::NAN).is_err());
        let bad = Camera {
            center: Vector::new(4.0, 3.0, 2.0),
            ..cam
        };
        assert!(matches!(render(&scene, &bad, 0.01), Err(Error::InvalidCamera(_))));
    }
}
