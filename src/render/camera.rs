//! Camera parameter bundle.

use serde::{Deserialize, Serialize};

use crate::util::{view_projection, viewport, Error, Matrix, Result, Vector};

/// Look-at perspective camera and the viewport it renders into.
///
/// Passed by reference into every render; never shared mutable state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Camera {
    /// Camera position
    pub eye: Vector,
    /// Point the camera looks at
    pub center: Vector,
    /// Up direction
    pub up: Vector,
    /// Rendered width, in output units
    pub width: f64,
    /// Rendered height, in output units
    pub height: f64,
    /// Vertical field of view, degrees
    pub fovy: f64,
    /// Near clip plane
    pub znear: f64,
    /// Far clip plane
    pub zfar: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            eye: Vector::new(4.0, 3.0, 2.0),
            center: Vector::ZERO,
            up: Vector::Z,
            width: 10240.0,
            height: 10240.0,
            fovy: 50.0,
            znear: 0.1,
            zfar: 10.0,
        }
    }
}

impl Camera {
    /// Reject parameters that cannot build a projection.
    pub fn validate(&self) -> Result<()> {
        if !(self.eye.is_finite() && self.center.is_finite() && self.up.is_finite()) {
            return Err(Error::camera("eye, center and up must be finite"));
        }
        let forward = self.center - self.eye;
        if forward.length_squared() == 0.0 {
            return Err(Error::camera("eye and center coincide"));
        }
        let tolerance = f64::EPSILON * forward.length_squared() * self.up.length_squared();
        if self.up.cross(forward).length_squared() <= tolerance {
            return Err(Error::camera("up is zero or parallel to the view direction"));
        }
        let positive = |x: f64| x > 0.0 && x.is_finite();
        if !(positive(self.width) && positive(self.height)) {
            return Err(Error::camera(format!(
                "viewport {}x{} must be positive",
                self.width, self.height
            )));
        }
        if !(self.fovy > 0.0 && self.fovy < 180.0) {
            return Err(Error::camera(format!("fovy {} outside (0, 180)", self.fovy)));
        }
        if !(self.znear > 0.0 && self.zfar > self.znear && self.zfar.is_finite()) {
            return Err(Error::camera(format!("clip planes {}..{} invalid", self.znear, self.zfar)));
        }
        Ok(())
    }

    #[inline]
    pub fn aspect(&self) -> f64 {
        self.width / self.height
    }

    /// World to clip space.
    pub fn matrix(&self) -> Matrix {
        view_projection(
            self.eye,
            self.center,
            self.up,
            self.fovy,
            self.aspect(),
            self.znear,
            self.zfar,
        )
    }

    /// Clip space to the `[0, width] x [0, height]` viewport.
    pub fn viewport(&self) -> Matrix {
        viewport(self.width, self.height)
    }
}
