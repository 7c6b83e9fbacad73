use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use moodlight_core::hume::{decode_message, StreamEvent};
use moodlight_core::{
    AggregateSnapshot, Clock, ConfigError, EmotionColorMapper, EmotionScores, EmotionSnapshot,
    LightCommand, ManualClock, MemorySink, MoodPipeline, MoodlightConfig,
};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "moodlight", about = "Map live emotion scores to smart-light colors")]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Map a single snapshot to a light command
    Map {
        #[command(flatten)]
        snapshot: SnapshotArgs,
    },
    /// Replay a file of emotion-service messages, one JSON object per line
    Replay {
        file: PathBuf,
        /// Simulated spacing between messages
        #[arg(long, default_value_t = 250)]
        interval_ms: i64,
        #[arg(long)]
        window_ms: Option<u64>,
    },
    /// Load, validate and print the effective configuration
    CheckConfig {
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Map a snapshot and push it to the configured bridge
    Apply {
        #[arg(long)]
        config: Option<PathBuf>,
        #[command(flatten)]
        snapshot: SnapshotArgs,
    },
}

#[derive(clap::Args)]
struct SnapshotArgs {
    /// NAME=SCORE, repeatable
    #[arg(long = "emotion", value_parser = parse_emotion)]
    emotions: Vec<(String, f64)>,
    #[arg(long, allow_negative_numbers = true)]
    valence: Option<f64>,
    #[arg(long)]
    arousal: Option<f64>,
}

impl SnapshotArgs {
    fn to_aggregate(&self) -> AggregateSnapshot {
        AggregateSnapshot {
            emotions: self.emotions.iter().cloned().collect::<EmotionScores>(),
            valence: self.valence,
            arousal: self.arousal,
        }
    }
}

fn parse_emotion(s: &str) -> Result<(String, f64), String> {
    let (name, score) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=SCORE, got '{}'", s))?;
    let score: f64 = score
        .trim()
        .parse()
        .map_err(|_| format!("invalid score in '{}'", s))?;
    Ok((name.trim().to_string(), score))
}

fn init_logging() {
    let mut filter = EnvFilter::from_default_env();
    if let Ok(d) = "moodlight_core=info".parse() {
        filter = filter.add_directive(d);
    }
    if let Ok(d) = "moodlight=info".parse() {
        filter = filter.add_directive(d);
    }

    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

/// An explicit `--config` file must exist; without one, defaults plus
/// environment apply.
fn load_config(path: Option<&Path>) -> Result<MoodlightConfig, ConfigError> {
    match path {
        Some(path) => MoodlightConfig::from_file_with_env(path),
        None => MoodlightConfig::load_layered(None, None),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();
    let cli = Cli::parse();

    match cli.cmd {
        Commands::Map { snapshot } => {
            let cmd = EmotionColorMapper::new().map(&snapshot.to_aggregate());
            println!("{}", serde_json::to_string_pretty(&cmd)?);
        }
        Commands::Replay {
            file,
            interval_ms,
            window_ms,
        } => {
            let mut config = MoodlightConfig::default();
            if let Some(w) = window_ms {
                config.window.window_ms = w;
            }
            config.validate()?;
            for (at_ms, cmd) in replay(&file, interval_ms, &config)? {
                info!(at_ms, label = %cmd.label, "replayed update");
                println!("{}", serde_json::to_string(&cmd)?);
            }
        }
        Commands::CheckConfig { config } => {
            let config = load_config(config.as_deref())?;
            print!("{}", config.to_toml_string()?);
            match config.require_credentials() {
                Ok(()) => info!("configuration complete"),
                Err(e) => warn!("{}", e),
            }
        }
        Commands::Apply { config, snapshot } => {
            let config = load_config(config.as_deref())?;
            apply(&config, &snapshot)?;
        }
    }
    Ok(())
}

/// Run recorded stream messages through the full pipeline on a simulated
/// clock. Returns every light command that would have been sent, with the
/// simulated time it went out.
fn replay(
    file: &Path,
    interval_ms: i64,
    config: &MoodlightConfig,
) -> Result<Vec<(i64, LightCommand)>, Box<dyn std::error::Error>> {
    let reader = BufReader::new(File::open(file)?);
    let clock = Arc::new(ManualClock::new(0));
    let mut pipeline = MoodPipeline::with_clock(config, Arc::clone(&clock), MemorySink::new());
    let mut due_at: Option<i64> = None;
    let mut sent = Vec::new();

    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        match decode_message(&line) {
            Ok(StreamEvent::Emotions(snaps)) => {
                for snap in snaps {
                    if let Some(delay) = pipeline.ingest(snap) {
                        due_at = Some(clock.now_ms() + delay as i64);
                    }
                }
            }
            Ok(StreamEvent::ServiceError(msg)) => warn!(line = lineno + 1, "service error: {}", msg),
            Ok(StreamEvent::Ignored) => {}
            Err(e) => warn!(line = lineno + 1, "skipping message: {}", e),
        }

        if let Some(t) = due_at {
            if t <= clock.now_ms() {
                sent.push((clock.now_ms(), pipeline.flush()));
                due_at = None;
            }
        }
        clock.advance(interval_ms);
    }

    if let Some(t) = due_at {
        clock.set(t.max(clock.now_ms()));
        sent.push((clock.now_ms(), pipeline.flush()));
    }

    Ok(sent)
}

#[cfg(feature = "bridge")]
fn apply(config: &MoodlightConfig, snapshot: &SnapshotArgs) -> Result<(), Box<dyn std::error::Error>> {
    use moodlight_core::{HueBridgeClient, LightSink};

    config.hue.require_credentials()?;
    let client = HueBridgeClient::from_config(&config.hue);
    let cmd = EmotionColorMapper::new().map(&snapshot.to_aggregate());
    client.apply(&cmd)?;
    info!(label = %cmd.label, brightness = cmd.brightness, "lights updated");
    Ok(())
}

#[cfg(not(feature = "bridge"))]
fn apply(_config: &MoodlightConfig, _snapshot: &SnapshotArgs) -> Result<(), Box<dyn std::error::Error>> {
    Err("built without the `bridge` feature".into())
}
