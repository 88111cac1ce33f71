//! laserline CLI - render a wireframe scene and stream it as laser points.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::thread;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use laserline::config::Config;
use laserline::optimize::optimize;
use laserline::stream::{channel, Color, Pipeline, PointSink, WriterSink};

#[derive(Parser, Debug)]
#[command(name = "laserline", version, about)]
struct Cli {
    /// More output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Errors only
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render and optimize one frame, then print path statistics
    #[command(alias = "r")]
    Render(Common),

    /// Stream frames to a file or stdout until the frame limit or an error
    #[command(alias = "s")]
    Stream {
        #[command(flatten)]
        common: Common,

        /// Output path, `-` for stdout
        #[arg(short, long, default_value = "-")]
        output: String,

        /// Stop after this many frames
        #[arg(short = 'n', long)]
        frames: Option<u64>,
    },
}

/// Overrides shared by every command.
#[derive(Args, Debug)]
struct Common {
    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Visibility sampling step (scene units)
    #[arg(long)]
    step: Option<f64>,

    /// Point spacing; lower is more points and slower scanning
    #[arg(long)]
    speed: Option<f64>,

    /// Beam color, rrggbb[aa]
    #[arg(long)]
    color: Option<Color>,

    /// Viewport width and height
    #[arg(long)]
    size: Option<f64>,
}

impl Common {
    fn load(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => {
                Config::load(path).with_context(|| format!("loading {}", path.display()))?
            }
            None => Config::default(),
        };
        if let Some(step) = self.step {
            config.step = step;
        }
        if let Some(speed) = self.speed {
            config.speed = speed;
        }
        if let Some(color) = self.color {
            config.color = color;
        }
        if let Some(size) = self.size {
            config.camera.width = size;
            config.camera.height = size;
        }
        Ok(config)
    }
}

fn main() {
    let cli = Cli::parse();
    let _trace_guard = init_logging(&cli);
    tracing::debug!(
        version = env!("CARGO_PKG_VERSION"),
        built = option_env!("LASERLINE_BUILD_DATE").unwrap_or("unknown"),
        at = option_env!("LASERLINE_BUILD_TIME").unwrap_or("unknown"),
        "laserline"
    );

    let result = match cli.command {
        Command::Render(common) => cmd_render(&common),
        Command::Stream {
            common,
            output,
            frames,
        } => cmd_stream(&common, &output, frames),
    };

    if let Err(e) = result {
        tracing::error!("{e:#}");
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

#[cfg(feature = "trace")]
type TraceGuard = Option<tracing_chrome::FlushGuard>;
#[cfg(not(feature = "trace"))]
type TraceGuard = ();

/// stderr logging filtered by `RUST_LOG`, else by -v/-q. With the `trace`
/// feature, `LASERLINE_TRACE=1` also writes `trace.json` for chrome://tracing.
fn init_logging(cli: &Cli) -> TraceGuard {
    let level = match (cli.quiet, cli.verbose) {
        (true, _) => "error",
        (false, 0) => "info",
        (false, 1) => "debug",
        (false, _) => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("laserline={level}")));
    let registry = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr));

    #[cfg(feature = "trace")]
    if std::env::var("LASERLINE_TRACE").ok().as_deref() == Some("1") {
        let (chrome_layer, guard) = tracing_chrome::ChromeLayerBuilder::new()
            .file("trace.json")
            .build();
        registry.with(chrome_layer).init();
        return Some(guard);
    }

    registry.init();
    TraceGuard::default()
}

fn cmd_render(common: &Common) -> Result<()> {
    let config = common.load()?;
    let scene = config.build_scene()?;

    let rendered = scene.render(&config.camera, config.step)?;
    let before = rendered.blank_distance();
    let paths = optimize(rendered);

    let mut out = io::stdout().lock();
    writeln!(out, "Shapes:        {}", scene.len())?;
    writeln!(out, "Paths:         {}", paths.len())?;
    writeln!(out, "Points:        {}", paths.point_count())?;
    writeln!(out, "Drawn length:  {:.1}", paths.length())?;
    writeln!(out, "Blank travel:  {before:.1} -> {:.1}", paths.blank_distance())?;
    if !paths.is_empty() {
        let b = paths.bounding_box();
        writeln!(
            out,
            "Bounds:        ({:.1}, {:.1}) - ({:.1}, {:.1})",
            b.min.x, b.min.y, b.max.x, b.max.y
        )?;
    }
    Ok(())
}

/// Resolve the output target. Failing here is fatal before any frame.
fn open_sink(output: &str) -> Result<WriterSink<BufWriter<Box<dyn Write + Send>>>> {
    let out: Box<dyn Write + Send> = if output == "-" {
        Box::new(io::stdout())
    } else {
        let file = File::create(output).with_context(|| format!("opening output {output}"))?;
        Box::new(file)
    };
    tracing::info!(output, "sink ready");
    Ok(WriterSink::new(BufWriter::new(out)))
}

/// The pipeline runs on a worker thread feeding a bounded queue; this
/// thread drains the queue into the output. A failed write closes the
/// queue, which stops the worker at its next transmit.
fn cmd_stream(common: &Common, output: &str, frames: Option<u64>) -> Result<()> {
    let mut config = common.load()?;
    if frames.is_some() {
        config.max_frames = frames;
    }
    let scene = config.build_scene()?;
    let mut out = open_sink(output)?;

    let (queue, rx) = channel(config.queue_frames);
    let mut pipeline = Pipeline::new(scene, config.pipeline(), queue)?;
    let worker = thread::Builder::new()
        .name("laserline-pipeline".into())
        .spawn(move || pipeline.run())
        .context("spawning pipeline thread")?;

    let mut written = Ok(());
    while let Some(frame) = rx.recv() {
        if let Err(e) = out.write(&frame) {
            written = Err(e);
            break;
        }
    }
    rx.closer().close();
    out.close()?;

    let summary = worker.join().map_err(|_| anyhow::anyhow!("pipeline thread panicked"))?;
    written.context("writing output")?;
    let summary = summary?;
    tracing::info!(frames = summary.frames, points = summary.points, "done");
    Ok(())
}
