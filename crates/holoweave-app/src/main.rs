use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use holoweave_app::{RunOptions, generate_seed, run_headless};
use holoweave_core::{EngineConfig, MarksMode, MovementMode, TextSource, Theme};
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "holoweave",
    version,
    about = "Run the holoweave pixel engine headless for a seed"
)]
struct Cli {
    /// Seed string; a fresh six-character seed is drawn when omitted.
    #[arg(short, long, env = "HOLOWEAVE_SEED")]
    seed: Option<String>,

    /// JSON engine config to start from; flags below override it.
    #[arg(long, env = "HOLOWEAVE_CONFIG")]
    config: Option<PathBuf>,

    /// Movement mode slug (dream-machine-84, glitch-crawl, data-mosh).
    #[arg(short, long, env = "HOLOWEAVE_MOVEMENT")]
    movement: Option<String>,

    /// Marks mode slug (mixed, glitch-text, blueprint, marks-off).
    #[arg(long, env = "HOLOWEAVE_MARKS")]
    marks: Option<String>,

    /// Text source slug (mixed, 80s-design, original, 80s-hooks).
    #[arg(long, env = "HOLOWEAVE_TEXT")]
    text: Option<String>,

    /// Theme slug (80s or any).
    #[arg(long, env = "HOLOWEAVE_THEME")]
    theme: Option<String>,

    /// Pin a palette by slug instead of drawing one.
    #[arg(short, long, env = "HOLOWEAVE_PALETTE")]
    palette: Option<String>,

    /// Viewport width in display pixels.
    #[arg(long, env = "HOLOWEAVE_WIDTH", default_value_t = 1280)]
    width: u32,

    /// Viewport height in display pixels.
    #[arg(long, env = "HOLOWEAVE_HEIGHT", default_value_t = 720)]
    height: u32,

    /// Frames to simulate.
    #[arg(short, long, env = "HOLOWEAVE_FRAMES", default_value_t = 120)]
    frames: usize,

    /// Directory for the PNG export of the final frame.
    #[arg(long, env = "HOLOWEAVE_EXPORT_DIR")]
    export_dir: Option<PathBuf>,

    /// Export width in pixels.
    #[arg(long, env = "HOLOWEAVE_EXPORT_WIDTH", default_value_t = holoweave_render::DEFAULT_EXPORT_SIZE)]
    export_width: u32,

    /// Export height in pixels.
    #[arg(long, env = "HOLOWEAVE_EXPORT_HEIGHT", default_value_t = holoweave_render::DEFAULT_EXPORT_SIZE)]
    export_height: u32,

    /// Write the JSON report here instead of stdout.
    #[arg(long, env = "HOLOWEAVE_REPORT")]
    report: Option<PathBuf>,
}

impl Cli {
    fn engine_config(&self) -> Result<EngineConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let raw = fs::read_to_string(path)
                    .with_context(|| format!("failed to read config {}", path.display()))?;
                serde_json::from_str(&raw)
                    .with_context(|| format!("failed to parse config {}", path.display()))?
            }
            None => EngineConfig {
                seed: generate_seed(),
                ..EngineConfig::default()
            },
        };
        if let Some(seed) = &self.seed {
            config.seed.clone_from(seed);
        }
        if let Some(slug) = &self.movement {
            config.movement = MovementMode::from_slug(slug);
        }
        if let Some(slug) = &self.marks {
            config.marks = MarksMode::from_slug(slug);
        }
        if let Some(slug) = &self.text {
            config.text_source = TextSource::from_slug(slug);
        }
        if let Some(slug) = &self.theme {
            config.theme = Theme::from_slug(slug);
        }
        if self.palette.is_some() {
            config.palette.clone_from(&self.palette);
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = cli.engine_config()?;
    info!(seed = %config.seed, movement = %config.movement, "starting holoweave run");

    let options = RunOptions {
        config,
        viewport: (cli.width, cli.height),
        frames: cli.frames,
        export_dir: cli.export_dir.clone(),
        export_size: (cli.export_width, cli.export_height),
        report: cli.report.clone(),
    };
    let report = run_headless(&options)?;
    if options.report.is_none() {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}
