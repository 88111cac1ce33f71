//! Configuration file for the streaming binary.
//!
//! JSON, every field optional; missing fields fall back to the defaults of
//! the reference setup (one unit cube seen from (4, 3, 2)).

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::geom::{Cube, Mesh};
use crate::render::{Camera, Scene};
use crate::stream::{Color, PipelineConfig};
use crate::util::{Result, Vector};

/// One shape of the configured scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ShapeConfig {
    /// Axis-aligned box between two corners
    Cube { min: Vector, max: Vector },
    /// Indexed triangle mesh
    Mesh {
        positions: Vec<Vector>,
        faces: Vec<[usize; 3]>,
    },
}

/// Streaming configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub camera: Camera,
    /// How finely edges are chopped for visibility testing
    pub step: f64,
    /// Point spacing; lower is more points and slower scanning
    pub speed: f64,
    pub color: Color,
    pub max_frames: Option<u64>,
    /// Frames the in-process queue may hold before writes block
    pub queue_frames: usize,
    pub scene: Vec<ShapeConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            camera: Camera::default(),
            step: 0.01,
            speed: 50.0,
            color: Color::default(),
            max_frames: None,
            queue_frames: 2,
            scene: vec![ShapeConfig::Cube {
                min: Vector::splat(-1.0),
                max: Vector::ONE,
            }],
        }
    }
}

impl Config {
    /// Load from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config = serde_json::from_str(&text)?;
        tracing::debug!(path = %path.as_ref().display(), "loaded config");
        Ok(config)
    }

    /// Save as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Build and validate the scene.
    pub fn build_scene(&self) -> Result<Scene> {
        let mut scene = Scene::new();
        for shape in &self.scene {
            match shape {
                ShapeConfig::Cube { min, max } => scene.add(Cube::new(*min, *max))?,
                ShapeConfig::Mesh { positions, faces } => {
                    scene.add(Mesh::from_indexed(positions, faces)?)?
                }
            }
        }
        Ok(scene)
    }

    pub fn pipeline(&self) -> PipelineConfig {
        PipelineConfig {
            camera: self.camera,
            step: self.step,
            speed: self.speed,
            color: self.color,
            max_frames: self.max_frames,
        }
    }
}
