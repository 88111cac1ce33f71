//! Output sinks: where encoded frames go.
//!
//! The device transport (wire format, acknowledgements, discovery) lives
//! behind [`PointSink`]. Two transports ship with the crate:
//! - [`channel`] - bounded in-process queue with backpressure, for a
//!   device driver thread or tests
//! - [`WriterSink`] - line-oriented text over any `io::Write`

use std::io::Write;
use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender};
use parking_lot::Mutex;

use crate::util::{Error, Result};

use super::Point;

/// Destination for whole frames of points.
pub trait PointSink: Send {
    /// Send one frame. May block while the device applies backpressure.
    /// Fails with [`Error::SinkClosed`] once the sink is closed.
    fn write(&mut self, points: &[Point]) -> Result<()>;

    /// Release the transport. Closing twice is not an error.
    fn close(&mut self) -> Result<()>;
}

impl<S: PointSink + ?Sized> PointSink for Box<S> {
    fn write(&mut self, points: &[Point]) -> Result<()> {
        (**self).write(points)
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }
}

// ============================================================================
// Channel sink
// ============================================================================

/// Create a bounded frame queue holding at most `capacity` frames (min 1).
///
/// Writes block while the queue is full. Closing from either end (or via a
/// [`SinkCloser`]) wakes blocked writers, which then fail fast. Dropping
/// the receiver fails every later write.
pub fn channel(capacity: usize) -> (ChannelSink, PointReceiver) {
    let (frames, rx) = crossbeam_channel::bounded(capacity.max(1));
    let closer = SinkCloser::new();
    let sink = ChannelSink {
        frames: Some(frames),
        closer: closer.clone(),
    };
    (sink, PointReceiver { frames: rx, closer })
}

/// Writing half of [`channel`].
#[derive(Debug)]
pub struct ChannelSink {
    frames: Option<Sender<Vec<Point>>>,
    closer: SinkCloser,
}

impl ChannelSink {
    /// Handle that closes this sink from another thread.
    pub fn closer(&self) -> SinkCloser {
        self.closer.clone()
    }
}

impl PointSink for ChannelSink {
    fn write(&mut self, points: &[Point]) -> Result<()> {
        let Some(frames) = &self.frames else {
            return Err(Error::SinkClosed);
        };
        if self.closer.is_closed() {
            return Err(Error::SinkClosed);
        }
        let frame = points.to_vec();
        crossbeam_channel::select! {
            send(frames, frame) -> sent => sent.map_err(|_| Error::SinkClosed),
            recv(self.closer.signal) -> _ => Err(Error::SinkClosed),
        }
    }

    fn close(&mut self) -> Result<()> {
        self.frames = None;
        self.closer.close();
        Ok(())
    }
}

/// Cloneable, thread-safe close switch for a [`channel`].
///
/// Nothing is ever sent on `signal`. Closing drops its only sender, which
/// disconnects every clone of the receiver and wakes any `select!` on it.
#[derive(Debug, Clone)]
pub struct SinkCloser {
    trigger: Arc<Mutex<Option<Sender<()>>>>,
    signal: Receiver<()>,
}

impl SinkCloser {
    fn new() -> Self {
        let (trigger, signal) = crossbeam_channel::bounded(0);
        Self {
            trigger: Arc::new(Mutex::new(Some(trigger))),
            signal,
        }
    }

    pub fn close(&self) {
        if self.trigger.lock().take().is_some() {
            tracing::debug!("channel sink closed");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.trigger.lock().is_none()
    }
}

/// Reading half of [`channel`]; the device side.
#[derive(Debug)]
pub struct PointReceiver {
    frames: Receiver<Vec<Point>>,
    closer: SinkCloser,
}

impl PointReceiver {
    /// Block for the next frame. `None` once closed and drained.
    pub fn recv(&self) -> Option<Vec<Point>> {
        crossbeam_channel::select! {
            recv(self.frames) -> frame => frame.ok(),
            recv(self.closer.signal) -> _ => self.frames.try_recv().ok(),
        }
    }

    /// Next frame if one is queued.
    pub fn try_recv(&self) -> Option<Vec<Point>> {
        self.frames.try_recv().ok()
    }

    /// Frames waiting to be consumed.
    pub fn pending(&self) -> usize {
        self.frames.len()
    }

    pub fn closer(&self) -> SinkCloser {
        self.closer.clone()
    }
}

// ============================================================================
// Text sink
// ============================================================================

/// Writes each point as `x y on r g b a`, with a blank line after each frame.
#[derive(Debug)]
pub struct WriterSink<W: Write + Send> {
    out: W,
    closed: bool,
}

impl<W: Write + Send> WriterSink<W> {
    pub fn new(out: W) -> Self {
        Self { out, closed: false }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> PointSink for WriterSink<W> {
    fn write(&mut self, points: &[Point]) -> Result<()> {
        if self.closed {
            return Err(Error::SinkClosed);
        }
        // One write per frame, so a failing transport never sees half a frame
        let mut frame: String = points
            .iter()
            .map(|p| {
                let [r, g, b, a] = p.color.0;
                format!("{:.3} {:.3} {} {r} {g} {b} {a}\n", p.x, p.y, u8::from(p.on))
            })
            .collect();
        frame.push('\n');
        self.out.write_all(frame.as_bytes())?;
        self.out.flush()?;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::Color;
    use crate::util::Vector;
    use std::thread;
    use std::time::Duration;

    fn frame(n: usize) -> Vec<Point> {
        (0..n)
            .map(|i| Point::drawn(Vector::new(i as f64, 0.0, 0.0), Color::default()))
            .collect()
    }

    #[test]
    fn test_channel_roundtrip_in_order() {
        let (mut sink, rx) = channel(4);
        sink.write(&frame(1)).unwrap();
        sink.write(&frame(2)).unwrap();
        assert_eq!(rx.pending(), 2);
        assert_eq!(rx.recv().unwrap().len(), 1);
        assert_eq!(rx.try_recv().unwrap().len(), 2);
        assert!(rx.try_recv().is_none());
    }

    #[test]
    fn test_close_drains_then_ends() {
        let (mut sink, rx) = channel(4);
        sink.write(&frame(3)).unwrap();
        sink.close().unwrap();
        sink.close().unwrap();
        assert!(matches!(sink.write(&frame(1)), Err(Error::SinkClosed)));
        assert_eq!(rx.recv().unwrap().len(), 3);
        assert!(rx.recv().is_none());
    }

    #[test]
    fn test_dropped_receiver_fails_writes() {
        let (mut sink, rx) = channel(1);
        drop(rx);
        assert!(matches!(sink.write(&frame(1)), Err(Error::SinkClosed)));
    }

    #[test]
    fn test_close_wakes_blocked_writer() {
        let (mut sink, rx) = channel(1);
        let closer = rx.closer();
        sink.write(&frame(1)).unwrap();

        let writer = thread::spawn(move || sink.write(&frame(1)));
        thread::sleep(Duration::from_millis(50));
        assert!(!writer.is_finished());
        closer.close();
        assert!(closer.is_closed());
        assert!(matches!(writer.join().unwrap(), Err(Error::SinkClosed)));
    }

    #[test]
    fn test_backpressure_releases_on_recv() {
        let (mut sink, rx) = channel(1);
        let writer = thread::spawn(move || {
            for _ in 0..5 {
                sink.write(&frame(2))?;
            }
            Ok::<_, Error>(())
        });
        let mut got = 0;
        while let Some(f) = rx.recv() {
            assert_eq!(f.len(), 2);
            got += 1;
            if got == 5 {
                break;
            }
        }
        writer.join().unwrap().unwrap();
        assert_eq!(got, 5);
    }

    #[test]
    fn test_receiver_sees_close_after_drain() {
        let (mut sink, rx) = channel(2);
        let closer = sink.closer();
        sink.write(&frame(2)).unwrap();
        closer.close();
        assert!(matches!(sink.write(&frame(1)), Err(Error::SinkClosed)));
        assert_eq!(rx.recv().unwrap().len(), 2);
        assert!(rx.recv().is_none());
    }

    /// Records each `write` call separately.
    #[derive(Debug, Default)]
    struct Chunks(Vec<Vec<u8>>);

    impl Write for Chunks {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.push(buf.to_vec());
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_writer_sink_frame_is_one_write() {
        let mut sink = WriterSink::new(Chunks::default());
        sink.write(&frame(3)).unwrap();
        sink.write(&frame(5)).unwrap();
        let chunks = sink.into_inner().0;
        assert_eq!(chunks.len(), 2);
        assert_eq!(String::from_utf8_lossy(&chunks[0]).lines().count(), 4);
        assert!(chunks[1].ends_with(b"\n\n"));
    }

    #[test]
    fn test_writer_sink_format() {
        let mut sink = WriterSink::new(Vec::new());
        sink.write(&[
            Point::drawn(Vector::new(1.0, 2.5, 0.0), Color::rgba(0x88, 0, 0, 0xff)),
            Point::blank(Vector::new(0.0, 0.0, 0.0)),
        ])
        .unwrap();
        sink.close().unwrap();
        assert!(matches!(sink.write(&[]), Err(Error::SinkClosed)));
        let text = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(text, "1.000 2.500 1 136 0 0 255\n0.000 0.000 0 0 0 0 0\n\n");
    }
}
