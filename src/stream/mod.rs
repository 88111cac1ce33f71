//! Frame encoding and transmission.
//!
//! - [`Point`] / [`Color`] - the abstract samples handed to a device
//! - [`Encoder`] - paths to one closed frame of points
//! - [`PointSink`] - device transport boundary, with [`channel`] and [`WriterSink`]
//! - [`Pipeline`] - the render/optimize/encode/transmit loop

mod encoder;
mod pipeline;
mod point;
mod sink;

pub use encoder::Encoder;
pub use pipeline::{Pipeline, PipelineConfig, RunSummary, ShutdownHandle, State};
pub use point::{Color, Point};
pub use sink::{channel, ChannelSink, PointReceiver, PointSink, SinkCloser, WriterSink};
