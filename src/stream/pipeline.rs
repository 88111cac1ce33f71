//! The streaming loop.
//!
//! One frame is render -> optimize -> encode -> transmit, strictly in
//! sequence. The sink's backpressure is the only rate limit: a device with
//! a full playback buffer blocks `write`, which holds the loop.
//!
//! ```text
//! Init -> Rendering -> Optimizing -> Encoding -> Transmitting -+
//!            ^                                                  |
//!            +--------------------------------------------------+
//!   Rendering --(shutdown / frame limit)--> Closed
//!   any state --(render or sink error)----> Closed
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::geom::Paths;
use crate::optimize::optimize;
use crate::render::{render, validate_step, Camera, Scene};
use crate::util::Result;

use super::{Color, Encoder, Point, PointSink};

/// Loop state. `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Init,
    Rendering,
    Optimizing,
    Encoding,
    Transmitting,
    Closed,
}

/// Everything the loop needs besides the scene and the sink.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineConfig {
    pub camera: Camera,
    /// Visibility sampling step, scene units
    pub step: f64,
    /// Longest screen distance between drawn points
    pub speed: f64,
    pub color: Color,
    /// Stop cleanly after this many frames
    pub max_frames: Option<u64>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            camera: Camera::default(),
            step: 0.01,
            speed: 50.0,
            color: Color::default(),
            max_frames: None,
        }
    }
}

/// Cloneable request to stop the loop at the next frame boundary.
#[derive(Debug, Clone, Default)]
pub struct ShutdownHandle(Arc<AtomicBool>);

impl ShutdownHandle {
    pub fn request(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Diagnostics from a finished run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSummary {
    pub frames: u64,
    pub points: u64,
}

/// Drives scene -> points -> sink until closed.
pub struct Pipeline<S: PointSink> {
    scene: Scene,
    config: PipelineConfig,
    encoder: Encoder,
    sink: S,
    sink_open: bool,
    state: State,
    shutdown: ShutdownHandle,
    frames: u64,
    points: u64,
    paths: Paths,
    buffer: Vec<Point>,
}

impl<S: PointSink> Pipeline<S> {
    /// Validate configuration up front; nothing is rendered yet.
    pub fn new(scene: Scene, config: PipelineConfig, sink: S) -> Result<Self> {
        config.camera.validate()?;
        validate_step(config.step)?;
        let encoder = Encoder::new(config.speed, config.color)?;
        Ok(Self {
            scene,
            config,
            encoder,
            sink,
            sink_open: true,
            state: State::Init,
            shutdown: ShutdownHandle::default(),
            frames: 0,
            points: 0,
            paths: Paths::new(),
            buffer: Vec::new(),
        })
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// Completed frames so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            frames: self.frames,
            points: self.points,
        }
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    /// Advance one transition and return the new state.
    ///
    /// On error the loop is already `Closed` and the sink released.
    pub fn step(&mut self) -> Result<State> {
        let next = match self.advance() {
            Ok(next) => next,
            Err(e) => {
                tracing::warn!(
                    frame = self.frames,
                    state = ?self.state,
                    error = %e,
                    "streaming stopped"
                );
                self.finish();
                return Err(e);
            }
        };
        if next == State::Closed {
            self.finish();
        }
        self.state = next;
        Ok(next)
    }

    /// Step until `Closed`.
    pub fn run(&mut self) -> Result<RunSummary> {
        tracing::info!(
            shapes = self.scene.len(),
            step = self.config.step,
            speed = self.config.speed,
            "streaming"
        );
        while self.step()? != State::Closed {}
        let summary = self.summary();
        tracing::info!(frames = summary.frames, points = summary.points, "stream closed");
        Ok(summary)
    }

    fn advance(&mut self) -> Result<State> {
        Ok(match self.state {
            State::Init => State::Rendering,
            State::Rendering => {
                let limit_hit = self.config.max_frames.is_some_and(|max| self.frames >= max);
                if limit_hit || self.shutdown.is_requested() {
                    State::Closed
                } else {
                    self.paths = render(&self.scene, &self.config.camera, self.config.step)?;
                    State::Optimizing
                }
            }
            State::Optimizing => {
                self.paths = optimize(std::mem::take(&mut self.paths));
                State::Encoding
            }
            State::Encoding => {
                self.buffer.clear();
                self.buffer.extend(self.encoder.encode(&self.paths));
                self.paths = Paths::new();
                State::Transmitting
            }
            State::Transmitting => {
                self.sink.write(&self.buffer)?;
                self.frames += 1;
                self.points += self.buffer.len() as u64;
                tracing::trace!(frame = self.frames, points = self.buffer.len(), "frame sent");
                self.buffer.clear();
                State::Rendering
            }
            State::Closed => State::Closed,
        })
    }

    /// Enter `Closed`, releasing the sink exactly once.
    fn finish(&mut self) {
        self.state = State::Closed;
        self.buffer = Vec::new();
        self.paths = Paths::new();
        if std::mem::take(&mut self.sink_open) {
            if let Err(e) = self.sink.close() {
                tracing::warn!(error = %e, "sink close failed");
            }
        }
    }
}

impl<S: PointSink> Drop for Pipeline<S> {
    fn drop(&mut self) {
        self.finish();
    }
}
