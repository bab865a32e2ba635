use std::{
    cell::RefCell,
    io::{self, Write},
    path::PathBuf,
    rc::Rc,
};

use clap::{Args, Parser, Subcommand, ValueEnum};
use progress_indicator_core::{
    AnimationPolicy, Bounds, Frame, FrameClock, IndicatorConfig, Progress, ProgressError,
    ProgressIndicator, ShapeKind,
};
use tracing_subscriber::EnvFilter;

fn main() -> progress_indicator_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Simulate {
            indicator,
            target,
            seconds,
            fps,
        } => run_simulate(&indicator, target, seconds, fps),
        Commands::Geometry {
            indicator,
            progress,
        } => run_geometry(&indicator, progress),
    }
}

fn run_simulate(
    args: &IndicatorArgs,
    target: f32,
    seconds: f64,
    fps: u32,
) -> progress_indicator_core::Result<()> {
    let step = frame_step(fps)?;
    let config = args.resolve()?;
    tracing::info!(
        shape = ?config.shape,
        policy = ?config.animation,
        target,
        seconds,
        fps,
        "running simulation"
    );

    let frames = Rc::new(RefCell::new(Vec::<Frame>::new()));
    let sink = Rc::clone(&frames);

    let mut indicator = ProgressIndicator::new(config, args.bounds(), FrameClock::new());
    indicator.on_frame(move |frame| sink.borrow_mut().push(frame.clone()));
    indicator.start();
    indicator.set_target(target);

    let total_frames = (seconds.max(0.0) / step).round() as u64;
    for _ in 0..total_frames {
        indicator.clock_mut().advance(step);
        indicator.frame();
    }
    indicator.cancel();

    tracing::info!(
        frames = indicator.frames_emitted(),
        displayed = indicator.displayed().get(),
        "simulation finished"
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for frame in frames.borrow().iter() {
        writeln!(out, "{}", serde_json::to_string(frame)?)?;
    }
    Ok(())
}

/// Seconds between simulated frames.
fn frame_step(fps: u32) -> progress_indicator_core::Result<f64> {
    if fps == 0 {
        return Err(ProgressError::msg("--fps must be at least 1"));
    }
    Ok(1.0 / f64::from(fps))
}

fn run_geometry(args: &IndicatorArgs, progress: f32) -> progress_indicator_core::Result<()> {
    let config = args.resolve()?;
    tracing::info!(shape = ?config.shape, progress, "computing geometry");

    let indicator = ProgressIndicator::new(config, args.bounds(), FrameClock::new());
    let frame = indicator.render(Progress::new(progress));
    println!("{}", serde_json::to_string_pretty(&frame)?);
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Animated progress indicator engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Animate an indicator on a simulated frame clock and print every frame
    /// as a JSON line.
    Simulate {
        #[command(flatten)]
        indicator: IndicatorArgs,
        /// Progress value handed to the indicator after mounting.
        #[arg(short, long, default_value_t = 1.0)]
        target: f32,
        /// Simulated wall time in seconds.
        #[arg(short, long, default_value_t = 2.0)]
        seconds: f64,
        /// Frame cadence of the simulated clock.
        #[arg(long, default_value_t = 60)]
        fps: u32,
    },
    /// Print the track, fill and paint for a single progress value.
    Geometry {
        #[command(flatten)]
        indicator: IndicatorArgs,
        #[arg(short, long, default_value_t = 0.5)]
        progress: f32,
    },
}

#[derive(Args, Debug)]
struct IndicatorArgs {
    /// JSON configuration file; flags below override its values.
    #[arg(short, long)]
    config: Option<PathBuf>,
    #[arg(long, value_enum)]
    shape: Option<ShapeArg>,
    /// Arc start angle in degrees, clockwise from the top.
    #[arg(long, default_value_t = ShapeKind::DEFAULT_ARC_START, allow_negative_numbers = true)]
    start_angle: f32,
    /// Arc end angle in degrees; may exceed 360.
    #[arg(long, default_value_t = ShapeKind::DEFAULT_ARC_END, allow_negative_numbers = true)]
    end_angle: f32,
    #[arg(long, value_enum)]
    policy: Option<PolicyArg>,
    /// Animation duration in seconds.
    #[arg(long)]
    duration: Option<f64>,
    #[arg(long, default_value_t = 200.0)]
    width: f32,
    #[arg(long, default_value_t = 200.0)]
    height: f32,
}

impl IndicatorArgs {
    fn resolve(&self) -> progress_indicator_core::Result<IndicatorConfig> {
        let mut config = match &self.config {
            Some(path) => {
                tracing::debug!(?path, "loading configuration");
                IndicatorConfig::load(path)?
            }
            None => IndicatorConfig::default(),
        };

        if let Some(shape) = self.shape {
            config.shape = match shape {
                ShapeArg::Horizontal => ShapeKind::Horizontal,
                ShapeArg::Vertical => ShapeKind::Vertical,
                ShapeArg::Circular => ShapeKind::Circular,
                ShapeArg::Arc => ShapeKind::arc(self.start_angle, self.end_angle),
            };
        }

        let duration = self
            .duration
            .or_else(|| config.animation.duration())
            .unwrap_or(1.0);
        if let Some(policy) = self.policy {
            config.animation = match policy {
                PolicyArg::None => AnimationPolicy::None,
                PolicyArg::Simple => AnimationPolicy::Simple { duration },
                PolicyArg::ForwardBackward => AnimationPolicy::ForwardBackward { duration },
            };
        } else if let Some(duration) = self.duration {
            config.animation = match config.animation {
                AnimationPolicy::None => AnimationPolicy::None,
                AnimationPolicy::Simple { .. } => AnimationPolicy::Simple { duration },
                AnimationPolicy::ForwardBackward { .. } => {
                    AnimationPolicy::ForwardBackward { duration }
                }
            };
        }

        Ok(config)
    }

    fn bounds(&self) -> Bounds {
        Bounds::from_size(self.width, self.height)
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ShapeArg {
    Horizontal,
    Vertical,
    Circular,
    Arc,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PolicyArg {
    None,
    Simple,
    ForwardBackward,
}
