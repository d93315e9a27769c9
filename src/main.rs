//! gauge-trace - Command line driver
//!
//! Replays a recorded message log through a signal session and prints the
//! resulting trace, or parses a path expression for inspection.

use std::path::PathBuf;
use std::thread;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use crossbeam_channel::bounded;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use gauge_trace::config::{default_config_path, DisplayComponent, PanelConfig};
use gauge_trace::session::{group_into_frames, BatchPolicy, ReplayReader};
use gauge_trace::{parse_message_path, GaugeError, MessageEvent, SignalSession};

/// Frames buffered between the reader thread and the processing loop
const FRAME_QUEUE_DEPTH: usize = 64;

#[derive(Parser)]
#[command(name = "gauge-trace", about = "Message-path signal extraction for live gauges")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a path expression and print topic, field path and modifiers
    Parse {
        /// Expression such as `/odom.twist.linear.x.@abs`
        expression: String,
    },
    /// Replay a JSON Lines message log and print the final trace snapshot
    Replay {
        /// Path to the message log
        #[arg(short, long)]
        input: PathBuf,

        /// Path expression (overrides the config)
        #[arg(short, long)]
        path: Option<String>,

        /// Panel config file (JSON or TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Trailing window in seconds (overrides the config)
        #[arg(long)]
        window: Option<f64>,

        /// Low-pass coefficient in [0, 1] (overrides the config)
        #[arg(long)]
        alpha: Option<f64>,

        /// Group messages into frames of this many milliseconds
        #[arg(long, default_value_t = 33)]
        frame_ms: i64,

        /// Display component (overrides the config); gauges print only the reading
        #[arg(long, value_enum)]
        component: Option<ComponentArg>,

        /// Only evaluate the newest message of each frame
        #[arg(long)]
        latest_only: bool,

        /// Print a summary line after every frame
        #[arg(long)]
        every_frame: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ComponentArg {
    Speedometer,
    SteeringWheel,
    TimeSeriesChart,
}

impl From<ComponentArg> for DisplayComponent {
    fn from(arg: ComponentArg) -> Self {
        match arg {
            ComponentArg::Speedometer => DisplayComponent::Speedometer,
            ComponentArg::SteeringWheel => DisplayComponent::SteeringWheel,
            ComponentArg::TimeSeriesChart => DisplayComponent::TimeSeriesChart,
        }
    }
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,gauge_trace=debug")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Parse { expression } => {
            let parsed = parse_message_path(&expression);
            println!("{}", serde_json::to_string_pretty(&parsed)?);
        }
        Commands::Replay {
            input,
            path,
            config,
            window,
            alpha,
            component,
            frame_ms,
            latest_only,
            every_frame,
        } => {
            let mut panel = load_config(config)?;
            if let Some(path) = path {
                panel.data.set_message_path(path);
            }
            if let Some(window) = window {
                panel.data.time_window = window;
            }
            if let Some(alpha) = alpha {
                panel.data.alpha = alpha;
            }
            if let Some(component) = component {
                panel.view.component = component.into();
            }
            let panel = panel.normalized();

            if panel.data.message_path().trim().is_empty() {
                bail!("no path expression given (use --path or a config with messagePath)");
            }

            let policy = if latest_only {
                BatchPolicy::LatestOnly
            } else {
                BatchPolicy::EveryMessage
            };
            let settings = panel.session_settings().with_batch_policy(policy);
            let mut session = SignalSession::new(panel.data.message_path(), settings);
            tracing::info!(
                "Replaying {:?} for '{}' on {} (window {} ms, alpha {})",
                input,
                session.expression(),
                panel.view.component.display_name(),
                settings.window_ms,
                settings.filter_alpha
            );

            replay(&mut session, input, frame_ms, every_frame)?;

            let stats = session.stats();
            tracing::info!(
                "Done: {} messages, {} samples ({:.1}% accepted), {} unresolved, {} non-finite, {} resets",
                stats.messages_seen,
                stats.samples_accepted,
                stats.acceptance_rate(),
                stats.unresolved,
                stats.non_finite,
                stats.resets
            );

            let component = panel.view.component;
            let snapshot = session.snapshot();
            if component.uses_window() {
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
            } else {
                // Gauges only show the current reading
                let reading = serde_json::json!({
                    "component": component.display_name(),
                    "value": snapshot.current_value,
                    "live": snapshot.live,
                    "now_ms": snapshot.now_ms,
                });
                println!("{}", serde_json::to_string_pretty(&reading)?);
            }
        }
    }

    Ok(())
}

/// Explicit config file, else the default location if present, else defaults
fn load_config(explicit: Option<PathBuf>) -> Result<PanelConfig> {
    if let Some(path) = explicit {
        return PanelConfig::load(&path)
            .with_context(|| format!("loading config {}", path.display()));
    }

    match default_config_path() {
        Some(path) if path.exists() => {
            tracing::info!("Using config from {:?}", path);
            Ok(PanelConfig::load_or_default(path))
        }
        _ => Ok(PanelConfig::default()),
    }
}

/// Read the log on a separate thread and feed frames to the session in order
fn replay(
    session: &mut SignalSession,
    input: PathBuf,
    frame_ms: i64,
    every_frame: bool,
) -> Result<()> {
    let (frame_tx, frame_rx) = bounded::<Result<Vec<MessageEvent>, GaugeError>>(FRAME_QUEUE_DEPTH);

    let reader_handle = thread::spawn(move || {
        let events = match ReplayReader::open(&input).and_then(|r| r.collect::<Result<Vec<_>, _>>()) {
            Ok(events) => events,
            Err(e) => {
                let _ = frame_tx.send(Err(e));
                return;
            }
        };
        for frame in group_into_frames(events, frame_ms) {
            if frame_tx.send(Ok(frame)).is_err() {
                break;
            }
        }
    });

    for (index, frame) in frame_rx.iter().enumerate() {
        let frame = frame.context("reading message log")?;
        let stored = session.process_batch(&frame);

        if every_frame {
            let snapshot = session.snapshot();
            println!(
                "frame {:>5}  now={:>10}  stored={}  value={:.3}  samples={}  live={}  accepted={:.1}%",
                index,
                snapshot.now_ms.map_or_else(|| "-".to_string(), |t| t.to_string()),
                stored,
                snapshot.current_value,
                snapshot.samples.len(),
                snapshot.live,
                session.stats().acceptance_rate()
            );
        }
    }

    if reader_handle.join().is_err() {
        bail!("message log reader thread panicked");
    }
    Ok(())
}
