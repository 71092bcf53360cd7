// main.rs - Viewer for the automaton crate

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use automaton::sandpile::{DEFAULT_MAX_ITERATIONS, DEFAULT_THRESHOLD};
use automaton::{Boundary, Model, ModelConfig, SimulationConfig};
use clap::Parser;
use eframe::egui;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod app;
mod ui;

use app::Viewer;

#[derive(Parser, Debug, Default)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TOML simulation file; built-in defaults when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Automaton to run, replacing the one in the file
    #[arg(short, long, value_enum)]
    kind: Option<Kind>,

    #[arg(long)]
    rows: Option<usize>,

    #[arg(long)]
    cols: Option<usize>,

    /// Rulestring for life ("B36/S23") or Wolfram number for elementary
    #[arg(long)]
    rule: Option<String>,

    #[arg(long, value_enum)]
    boundary: Option<BoundaryArg>,

    /// Delay between generations while running
    #[arg(long, default_value_t = 100)]
    interval_ms: u64,

    /// Stop after this many generations
    #[arg(long)]
    frames: Option<u64>,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Kind {
    Life,
    Elementary,
    Sandpile,
    Turmite,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum BoundaryArg {
    Fixed,
    Wrap,
}

impl From<BoundaryArg> for Boundary {
    fn from(arg: BoundaryArg) -> Self {
        match arg {
            BoundaryArg::Fixed => Boundary::Fixed,
            BoundaryArg::Wrap => Boundary::Wrap,
        }
    }
}

impl Kind {
    fn default_model(self) -> ModelConfig {
        match self {
            Kind::Life => ModelConfig::default(),
            Kind::Elementary => ModelConfig::Elementary { rule: 30 },
            Kind::Sandpile => ModelConfig::Sandpile {
                threshold: DEFAULT_THRESHOLD,
                max_iterations: DEFAULT_MAX_ITERATIONS,
                tower_factor: None,
            },
            Kind::Turmite => ModelConfig::Turmite,
        }
    }

    fn of(model: &ModelConfig) -> Self {
        match model {
            ModelConfig::Life { .. } => Kind::Life,
            ModelConfig::Elementary { .. } => Kind::Elementary,
            ModelConfig::Sandpile { .. } => Kind::Sandpile,
            ModelConfig::Turmite => Kind::Turmite,
        }
    }
}

/// Loads the file (if any) and lays the command-line values over it.
fn build_config(args: &Args) -> Result<SimulationConfig> {
    let mut config = match &args.config {
        Some(path) => SimulationConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => SimulationConfig::default(),
    };

    if let Some(kind) = args.kind {
        if Kind::of(&config.model) != kind {
            config.model = kind.default_model();
            // a seed written for another automaton rarely makes sense
            config.seed = None;
        }
    }
    if let Some(rows) = args.rows {
        config.rows = rows;
    }
    if let Some(cols) = args.cols {
        config.cols = cols;
    }
    if let Some(boundary) = args.boundary {
        config.boundary = boundary.into();
    }
    if let Some(text) = &args.rule {
        match &mut config.model {
            ModelConfig::Life { rule } => *rule = text.clone(),
            ModelConfig::Elementary { rule } => {
                *rule = text
                    .parse()
                    .with_context(|| format!("{text:?} is not a rule number in 0..=255"))?;
            }
            other => bail!("--rule does not apply to {:?}", Kind::of(other)),
        }
    }

    config.validate()?;
    Ok(config)
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let config = build_config(&args)?;
    let model = Model::from_config(&config)?;
    info!(model = %model, frames = ?args.frames, "starting viewer");

    let viewer = Viewer::new(
        config,
        model,
        Duration::from_millis(args.interval_ms.max(1)),
        args.frames,
    );

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([820.0, 960.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Cellular Automata",
        options,
        Box::new(|_cc| Box::new(viewer)),
    )
    .map_err(|e| anyhow::anyhow!("viewer failed: {e}"))
}
