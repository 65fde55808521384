//! Headless holoweave runner shared by the CLI binary and its tests.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use holoweave_core::{
    Engine, EngineConfig, EngineRng, ExternalSource, FrameScheduler, Geometry, MarksMode,
    MovementMode, TextSource, Theme,
};
use holoweave_render::{export_file_name, render_png_offscreen};
use rand::Rng;
use serde::Serialize;
use tracing::info;

/// Simulated host frame interval, in milliseconds.
const FRAME_MS: f64 = 1000.0 / 60.0;
const SEED_LEN: usize = 6;

/// Fresh shareable seed from OS-backed entropy.
#[must_use]
pub fn generate_seed() -> String {
    let mut thread = rand::rng();
    let mut rng = EngineRng::from_source(ExternalSource::new(move || thread.random::<f64>()));
    rng.short_seed(SEED_LEN)
}

/// Everything a headless run needs.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub config: EngineConfig,
    pub viewport: (u32, u32),
    pub frames: usize,
    /// Directory receiving the final frame as PNG, if any.
    pub export_dir: Option<PathBuf>,
    pub export_size: (u32, u32),
    /// Where to write the JSON report, if anywhere.
    pub report: Option<PathBuf>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            config: EngineConfig::default(),
            viewport: (1280, 720),
            frames: 120,
            export_dir: None,
            export_size: (
                holoweave_render::DEFAULT_EXPORT_SIZE,
                holoweave_render::DEFAULT_EXPORT_SIZE,
            ),
            report: None,
        }
    }
}

/// Per-frame statistics.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FrameStats {
    pub frame: u64,
    pub stamps: usize,
    pub mean_luminance: f64,
    pub held: usize,
}

impl FrameStats {
    fn sample(engine: &Engine, stamps: usize) -> Self {
        let buffer = engine.buffer();
        Self {
            frame: engine.frame().0,
            stamps,
            mean_luminance: buffer.mean_luminance(),
            held: buffer.held_count(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct ReportSummary {
    pub frame_count: usize,
    pub final_frame: u64,
    pub stamps_total: usize,
    pub luminance_mean: f64,
    pub luminance_min: f64,
    pub luminance_max: f64,
    pub final_held: usize,
}

impl ReportSummary {
    fn from_frames(frames: &[FrameStats]) -> Self {
        let Some(last) = frames.last() else {
            return Self::default();
        };
        let lum = frames.iter().map(|f| f.mean_luminance);
        Self {
            frame_count: frames.len(),
            final_frame: last.frame,
            stamps_total: frames.iter().map(|f| f.stamps).sum(),
            luminance_mean: lum.clone().sum::<f64>() / frames.len() as f64,
            luminance_min: lum.clone().fold(f64::INFINITY, f64::min),
            luminance_max: lum.fold(f64::NEG_INFINITY, f64::max),
            final_held: last.held,
        }
    }
}

/// JSON report of one headless run.
#[derive(Debug, Clone, Serialize)]
pub struct HeadlessReport {
    pub seed: String,
    pub palette: String,
    pub movement: MovementMode,
    pub marks: MarksMode,
    pub text_source: TextSource,
    pub theme: Theme,
    pub geometry: Geometry,
    pub initial: FrameStats,
    pub frames: Vec<FrameStats>,
    pub summary: ReportSummary,
    pub export: Option<PathBuf>,
}

impl HeadlessReport {
    pub fn write_json(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = File::create(path)?;
        serde_json::to_writer_pretty(file, self).context("failed to serialize headless report")?;
        Ok(())
    }
}

/// Simulate `options.frames` frames and optionally export and report.
pub fn run_headless(options: &RunOptions) -> Result<HeadlessReport> {
    let (vw, vh) = options.viewport;
    let mut engine = Engine::new(options.config.clone(), vw, vh).context("failed to build engine")?;
    let mut scheduler = FrameScheduler::new();
    let initial = FrameStats::sample(&engine, 0);

    let mut frames = Vec::with_capacity(options.frames);
    let mut seconds = 0.0;
    for i in 0..options.frames {
        let now_ms = i as f64 * FRAME_MS;
        if let Some(frame) = scheduler.frame(&mut engine, now_ms) {
            seconds = frame.seconds;
            frames.push(FrameStats::sample(&engine, frame.events.stamps.len()));
        }
    }
    let summary = ReportSummary::from_frames(&frames);

    let export = match &options.export_dir {
        Some(dir) => Some(export_png(&engine, dir, options.export_size, seconds)?),
        None => None,
    };

    let config = engine.config();
    let report = HeadlessReport {
        seed: config.seed.clone(),
        palette: engine.palette().slug().to_owned(),
        movement: config.movement,
        marks: config.marks,
        text_source: config.text_source,
        theme: config.theme,
        geometry: engine.geometry(),
        initial,
        frames,
        summary,
        export,
    };
    info!(
        seed = %report.seed,
        palette = %report.palette,
        frames = report.summary.frame_count,
        stamps = report.summary.stamps_total,
        "headless run complete"
    );

    if let Some(path) = &options.report {
        report
            .write_json(path)
            .with_context(|| format!("failed to write headless report to {}", path.display()))?;
    }
    Ok(report)
}

fn export_png(engine: &Engine, dir: &Path, (w, h): (u32, u32), seconds: f64) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    let name = export_file_name(engine.movement(), engine.palette().slug(), w, h, millis);
    let path = dir.join(name);
    let png = render_png_offscreen(engine, w, h, seconds)?;
    fs::write(&path, png).with_context(|| format!("failed to write {}", path.display()))?;
    info!(path = %path.display(), width = w, height = h, "exported frame");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_seeds_are_short_base62() {
        let seed = generate_seed();
        assert_eq!(seed.len(), SEED_LEN);
        assert!(seed.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn summary_aggregates_frames() {
        let frames = vec![
            FrameStats {
                frame: 1,
                stamps: 2,
                mean_luminance: 0.2,
                held: 10,
            },
            FrameStats {
                frame: 2,
                stamps: 1,
                mean_luminance: 0.4,
                held: 7,
            },
        ];
        let summary = ReportSummary::from_frames(&frames);
        assert_eq!(summary.frame_count, 2);
        assert_eq!(summary.final_frame, 2);
        assert_eq!(summary.stamps_total, 3);
        assert!((summary.luminance_mean - 0.3).abs() < 1e-12);
        assert_eq!(summary.luminance_min, 0.2);
        assert_eq!(summary.luminance_max, 0.4);
        assert_eq!(summary.final_held, 7);
        assert_eq!(ReportSummary::from_frames(&[]), ReportSummary::default());
    }

    #[test]
    fn headless_runs_are_reproducible() {
        let options = RunOptions {
            config: EngineConfig::seeded("repeat"),
            viewport: (320, 240),
            frames: 12,
            ..RunOptions::default()
        };
        let a = run_headless(&options).expect("run a");
        let b = run_headless(&options).expect("run b");
        assert_eq!(a.frames, b.frames);
        assert_eq!(a.palette, b.palette);
        assert_eq!(a.summary.final_frame, 12);
        assert!(a.export.is_none());
    }
}
