//! The engine context: one value owning every piece of simulation state.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, trace};

use crate::Tick;
use crate::buffer::{BufferError, PixelBuffer};
use crate::config::{ConfigError, EngineConfig};
use crate::glitch;
use crate::heads::HeadPool;
use crate::marks::{MarkSettings, MarkStamper, StampEvent, SurfaceError};
use crate::modes::{MarksMode, MovementMode, TextSource, Theme};
use crate::palette::{Hsl, PaletteManager};
use crate::rng::EngineRng;

const MIN_CELL: u32 = 2;
const MAX_CELL: u32 = 6;
const BLOCK_COPY_PERIOD: u64 = 7;
const ROW_SHIFT_PERIOD: u64 = 5;
const FADE_PERIOD: u64 = 4;
const SEED_LEN: usize = 6;

type Layout = (Geometry, PixelBuffer, MarkStamper);

/// Errors that can occur while building or rebuilding an engine.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("viewport must be non-zero, got {width}x{height}")]
    InvalidViewport { width: u32, height: u32 },
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Buffer(#[from] BufferError),
    #[error(transparent)]
    Surface(#[from] SurfaceError),
}

/// Buffer size derived from a viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Geometry {
    /// Display pixels per buffer cell.
    pub cell: u32,
    pub width: u32,
    pub height: u32,
    pub viewport_width: u32,
    pub viewport_height: u32,
}

impl Geometry {
    /// Pick a cell size so the shorter viewport side spans about
    /// `target_cells` cells, clamped to 2..=6 display pixels.
    pub fn from_viewport(
        viewport_width: u32,
        viewport_height: u32,
        config: &EngineConfig,
    ) -> Result<Self, EngineError> {
        if viewport_width == 0 || viewport_height == 0 {
            return Err(EngineError::InvalidViewport {
                width: viewport_width,
                height: viewport_height,
            });
        }
        let min_dim = viewport_width.min(viewport_height);
        let cell = (min_dim / config.target_cells.max(1)).clamp(MIN_CELL, MAX_CELL);
        Ok(Self {
            cell,
            width: (viewport_width / cell).max(config.min_buffer),
            height: (viewport_height / cell).max(config.min_buffer),
            viewport_width,
            viewport_height,
        })
    }
}

/// Borrowed view of the current frame for presentation.
///
/// Consumers scale `pixels` (`width x height` RGBA8, row-major) to the
/// display size with nearest-neighbour sampling.
#[derive(Debug, Clone, Copy)]
pub struct RenderTarget<'a> {
    pub pixels: &'a [u8],
    pub width: u32,
    pub height: u32,
    pub display_width: u32,
    pub display_height: u32,
    /// Background tone, used to tint overlays.
    pub background: Hsl,
    buffer: &'a PixelBuffer,
}

impl RenderTarget<'_> {
    /// Nearest-neighbour copy of the frame at `out_w x out_h`.
    #[must_use]
    pub fn upscale(&self, out_w: u32, out_h: u32) -> Vec<u8> {
        self.buffer.upscale_nearest(out_w, out_h)
    }
}

/// Events emitted after processing one tick.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct TickEvents {
    pub tick: Tick,
    /// Head painting steps executed.
    pub steps: usize,
    pub block_copy: Option<(i32, i32, i32, i32)>,
    pub rows_shifted: usize,
    pub stamps: Vec<StampEvent>,
    pub faded: bool,
}

/// Deterministic animation engine.
#[derive(Debug)]
pub struct Engine {
    config: EngineConfig,
    external_rng: bool,
    rng: EngineRng,
    palette: PaletteManager,
    geometry: Geometry,
    buffer: PixelBuffer,
    heads: HeadPool,
    stamper: MarkStamper,
    frame: Tick,
}

impl Engine {
    /// Build an engine driven by the seed in `config`.
    pub fn new(
        config: EngineConfig,
        viewport_width: u32,
        viewport_height: u32,
    ) -> Result<Self, EngineError> {
        let rng = EngineRng::seeded(&config.seed);
        Self::build(config, viewport_width, viewport_height, rng, false)
    }

    /// Build an engine drawing from an externally supplied stream.
    ///
    /// The seed in `config` is kept for naming only. Reseeding keeps using
    /// the supplied stream.
    pub fn with_rng(
        config: EngineConfig,
        viewport_width: u32,
        viewport_height: u32,
        rng: EngineRng,
    ) -> Result<Self, EngineError> {
        Self::build(config, viewport_width, viewport_height, rng, true)
    }

    fn build(
        config: EngineConfig,
        viewport_width: u32,
        viewport_height: u32,
        rng: EngineRng,
        external_rng: bool,
    ) -> Result<Self, EngineError> {
        let layout = Self::allocate(&config, viewport_width, viewport_height)?;
        Ok(Self::assemble(config, layout, rng, external_rng))
    }

    /// Every fallible step of a rebuild; draws nothing from the stream.
    fn allocate(
        config: &EngineConfig,
        viewport_width: u32,
        viewport_height: u32,
    ) -> Result<Layout, EngineError> {
        config.validate()?;
        let geometry = Geometry::from_viewport(viewport_width, viewport_height, config)?;
        let stamper = MarkStamper::new(geometry.width, geometry.height)?;
        let buffer = PixelBuffer::new(geometry.width, geometry.height)?;
        Ok((geometry, buffer, stamper))
    }

    fn assemble(
        config: EngineConfig,
        (geometry, mut buffer, stamper): Layout,
        mut rng: EngineRng,
        external_rng: bool,
    ) -> Self {
        let mut palette = PaletteManager::new();
        match config.palette_index() {
            Some(index) => palette.apply(index, &mut rng),
            None => {
                palette.draw_next(&mut rng);
            }
        }

        let heads = Self::populate(&mut buffer, &palette, &mut rng);
        info!(
            seed = %config.seed,
            palette = palette.slug(),
            movement = %config.movement,
            width = geometry.width,
            height = geometry.height,
            cell = geometry.cell,
            heads = heads.len(),
            "engine initialised"
        );

        Self {
            config,
            external_rng,
            rng,
            palette,
            geometry,
            buffer,
            heads,
            stamper,
            frame: Tick::zero(),
        }
    }

    /// Clear `buffer` to the backdrop and spawn its heads.
    fn populate(buffer: &mut PixelBuffer, palette: &PaletteManager, rng: &mut EngineRng) -> HeadPool {
        buffer.clear(palette, rng);
        let (w, h) = (buffer.width(), buffer.height());
        HeadPool::spawn(HeadPool::count_for(w, h), w, h, palette, Tick::zero(), rng)
    }

    /// Advance the simulation by one frame.
    pub fn tick(&mut self) -> TickEvents {
        let next_tick = self.frame.next();
        self.frame = next_tick;
        self.buffer.hold_decay();

        let steps = self.stage_heads();
        let (block_copy, rows_shifted) = self.stage_glitches();
        let stamps = self.stage_marks();
        let faded = self.stage_fade();

        trace!(
            tick = next_tick.0,
            steps,
            stamps = stamps.len(),
            rows_shifted,
            faded,
            "tick complete"
        );
        TickEvents {
            tick: next_tick,
            steps,
            block_copy,
            rows_shifted,
            stamps,
            faded,
        }
    }

    fn stage_heads(&mut self) -> usize {
        let movement = self.config.movement;
        self.heads.step_all(
            &mut self.buffer,
            &self.palette,
            movement,
            self.frame,
            &mut self.rng,
        );
        HeadPool::steps_for(self.buffer.width(), self.buffer.height(), movement)
    }

    fn stage_glitches(&mut self) -> (Option<(i32, i32, i32, i32)>, usize) {
        let mut block = None;
        let mut rows = 0;
        match self.config.movement {
            MovementMode::Glitch if self.frame.every(BLOCK_COPY_PERIOD) => {
                block = glitch::block_copy(&mut self.buffer, &self.palette, &mut self.rng);
            }
            MovementMode::Datamosh if self.frame.every(ROW_SHIFT_PERIOD) => {
                rows = glitch::row_shift(&mut self.buffer, &mut self.rng);
            }
            _ => {}
        }
        (block, rows)
    }

    fn stage_marks(&mut self) -> Vec<StampEvent> {
        let settings = self.mark_settings();
        (0..self.config.stamps_per_tick)
            .filter_map(|_| {
                self.stamper
                    .attempt(&mut self.buffer, &self.palette, settings, &mut self.rng)
            })
            .collect()
    }

    fn stage_fade(&mut self) -> bool {
        if !self.frame.every(FADE_PERIOD) {
            return false;
        }
        self.buffer.fade(self.config.movement.fade());
        true
    }

    fn mark_settings(&self) -> MarkSettings {
        MarkSettings {
            movement: self.config.movement,
            marks: self.config.marks,
            text: self.config.text_source,
            theme: self.config.theme,
        }
    }

    /// Start over from `seed`, discarding every piece of state.
    ///
    /// Any pinned palette is released so the new seed draws its own. On
    /// error the engine is left exactly as it was.
    pub fn reseed(&mut self, seed: &str) -> Result<(), EngineError> {
        let config = EngineConfig {
            seed: seed.to_owned(),
            palette: None,
            ..self.config.clone()
        };
        let layout = Self::allocate(
            &config,
            self.geometry.viewport_width,
            self.geometry.viewport_height,
        )?;
        let rng = if self.external_rng {
            std::mem::replace(&mut self.rng, EngineRng::seeded(seed))
        } else {
            EngineRng::seeded(seed)
        };
        *self = Self::assemble(config, layout, rng, self.external_rng);
        info!(seed, palette = self.palette.slug(), "reseeded");
        Ok(())
    }

    /// Reseed with a short seed drawn from the current stream.
    pub fn reseed_next(&mut self) -> Result<String, EngineError> {
        let seed = self.rng.short_seed(SEED_LEN);
        self.reseed(&seed)?;
        Ok(seed)
    }

    /// Rebuild buffer, heads and stamp surface for a new viewport.
    ///
    /// The random stream and the active palette carry over; the palette bag
    /// starts afresh.
    pub fn resize(&mut self, viewport_width: u32, viewport_height: u32) -> Result<(), EngineError> {
        let (geometry, mut buffer, stamper) =
            Self::allocate(&self.config, viewport_width, viewport_height)?;
        self.palette.empty_bag();
        self.heads = Self::populate(&mut buffer, &self.palette, &mut self.rng);
        self.geometry = geometry;
        self.buffer = buffer;
        self.stamper = stamper;
        self.frame = Tick::zero();
        info!(
            width = geometry.width,
            height = geometry.height,
            cell = geometry.cell,
            "resized"
        );
        Ok(())
    }

    pub fn cycle_movement(&mut self) -> MovementMode {
        self.config.movement = self.config.movement.next();
        info!(movement = %self.config.movement, "movement mode changed");
        self.config.movement
    }

    pub fn cycle_marks(&mut self) -> MarksMode {
        self.config.marks = self.config.marks.next();
        info!(marks = %self.config.marks, "marks mode changed");
        self.config.marks
    }

    pub fn cycle_text(&mut self) -> TextSource {
        self.config.text_source = self.config.text_source.next();
        info!(text = %self.config.text_source, "text source changed");
        self.config.text_source
    }

    pub fn toggle_theme(&mut self) -> Theme {
        self.config.theme = self.config.theme.next();
        info!(theme = %self.config.theme, "theme toggled");
        self.config.theme
    }

    /// Current frame for presentation at the viewport size.
    #[must_use]
    pub fn render_target(&self) -> RenderTarget<'_> {
        RenderTarget {
            pixels: self.buffer.data(),
            width: self.buffer.width(),
            height: self.buffer.height(),
            display_width: self.geometry.viewport_width,
            display_height: self.geometry.viewport_height,
            background: self.palette.background(),
            buffer: &self.buffer,
        }
    }

    /// Nearest-neighbour copy of the buffer at an arbitrary size.
    ///
    /// Reads only; simulation state is untouched.
    #[must_use]
    pub fn export_rgba(&self, width: u32, height: u32) -> Vec<u8> {
        self.buffer.upscale_nearest(width, height)
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn seed(&self) -> &str {
        &self.config.seed
    }

    #[must_use]
    pub const fn frame(&self) -> Tick {
        self.frame
    }

    #[must_use]
    pub const fn geometry(&self) -> Geometry {
        self.geometry
    }

    #[must_use]
    pub fn buffer(&self) -> &PixelBuffer {
        &self.buffer
    }

    #[must_use]
    pub fn palette(&self) -> &PaletteManager {
        &self.palette
    }

    #[must_use]
    pub fn heads(&self) -> &HeadPool {
        &self.heads
    }

    #[must_use]
    pub fn movement(&self) -> MovementMode {
        self.config.movement
    }

    #[must_use]
    pub const fn uses_external_rng(&self) -> bool {
        self.external_rng
    }

    /// Random values drawn so far.
    #[must_use]
    pub const fn rng_draws(&self) -> u64 {
        self.rng.draws()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::ExternalSource;

    fn config(seed: &str) -> EngineConfig {
        EngineConfig::seeded(seed)
    }

    #[test]
    fn geometry_targets_260_cells_on_the_short_side() {
        let cfg = EngineConfig::default();
        let g = Geometry::from_viewport(1920, 1080, &cfg).expect("geometry");
        assert_eq!(g.cell, 4);
        assert_eq!((g.width, g.height), (480, 270));

        let small = Geometry::from_viewport(300, 200, &cfg).expect("geometry");
        assert_eq!(small.cell, 2);
        assert_eq!((small.width, small.height), (150, 100));

        let huge = Geometry::from_viewport(8000, 4000, &cfg).expect("geometry");
        assert_eq!(huge.cell, 6);
    }

    #[test]
    fn geometry_enforces_minimum_buffer() {
        let g = Geometry::from_viewport(40, 10, &EngineConfig::default()).expect("geometry");
        assert_eq!((g.width, g.height), (64, 64));
    }

    #[test]
    fn zero_viewport_fails_fast() {
        let err = Engine::new(config("x"), 0, 600).expect_err("zero width");
        assert!(matches!(err, EngineError::InvalidViewport { width: 0, height: 600 }));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let cfg = EngineConfig {
            min_buffer: 8,
            ..config("x")
        };
        assert!(matches!(Engine::new(cfg, 320, 240), Err(EngineError::Config(_))));
    }

    #[test]
    fn tick_runs_stages_on_schedule() {
        let cfg = EngineConfig {
            movement: MovementMode::Glitch,
            ..config("sched")
        };
        let mut engine = Engine::new(cfg, 320, 240).expect("engine");
        let mut events = Vec::new();
        for _ in 0..28 {
            events.push(engine.tick());
        }
        assert_eq!(engine.frame(), Tick(28));
        for ev in &events {
            assert_eq!(ev.faded, ev.tick.0 % 4 == 0);
            assert_eq!(ev.rows_shifted, 0);
            if ev.tick.0 % 7 != 0 {
                assert!(ev.block_copy.is_none());
            }
            assert!(ev.steps >= 900);
        }
        assert!(events[6].block_copy.is_some());
    }

    #[test]
    fn datamosh_shifts_rows_every_fifth_frame() {
        let cfg = EngineConfig {
            movement: MovementMode::Datamosh,
            ..config("mosh")
        };
        let mut engine = Engine::new(cfg, 320, 240).expect("engine");
        for _ in 0..10 {
            let ev = engine.tick();
            if ev.tick.0 % 5 != 0 {
                assert_eq!(ev.rows_shifted, 0);
            }
            assert!(ev.rows_shifted <= 7);
            assert!(ev.block_copy.is_none());
        }
    }

    #[test]
    fn export_leaves_state_untouched() {
        let mut engine = Engine::new(config("export"), 320, 240).expect("engine");
        engine.tick();
        let before = engine.buffer().clone();
        let draws = engine.rng_draws();
        let out = engine.export_rgba(300, 300);
        assert_eq!(out.len(), 300 * 300 * 4);
        assert_eq!(engine.buffer(), &before);
        assert_eq!(engine.rng_draws(), draws);
    }

    #[test]
    fn pinned_palette_is_applied() {
        let cfg = EngineConfig {
            palette: Some(crate::PALETTES[5].slug.to_owned()),
            ..config("pin")
        };
        let engine = Engine::new(cfg, 320, 240).expect("engine");
        assert_eq!(engine.palette().current_index(), 5);
    }

    #[test]
    fn cycling_selectors_wraps() {
        let mut engine = Engine::new(config("cycle"), 320, 240).expect("engine");
        assert_eq!(engine.cycle_movement(), MovementMode::Glitch);
        assert_eq!(engine.cycle_movement(), MovementMode::Datamosh);
        assert_eq!(engine.cycle_movement(), MovementMode::Pixel);
        assert_eq!(engine.cycle_marks(), MarksMode::Text);
        assert_eq!(engine.cycle_text(), TextSource::Design80s);
        assert_eq!(engine.toggle_theme(), Theme::Any);
        assert_eq!(engine.toggle_theme(), Theme::Eighties);
    }

    #[test]
    fn external_stream_survives_reseed() {
        let mut counter = 0u32;
        let source = ExternalSource::new(move || {
            counter = counter.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            f64::from(counter >> 8) / f64::from(1u32 << 24)
        });
        let mut engine =
            Engine::with_rng(config("ext"), 320, 240, EngineRng::from_source(source)).expect("engine");
        engine.tick();
        let draws = engine.rng_draws();
        engine.reseed("other").expect("reseed");
        assert!(engine.uses_external_rng());
        assert!(engine.rng_draws() > draws);
        assert_eq!(engine.seed(), "other");
    }

    #[test]
    fn failed_reseed_leaves_engine_untouched() {
        let mut engine = Engine::new(config("steady"), 320, 240).expect("engine");
        for _ in 0..3 {
            engine.tick();
        }
        engine.config.target_cells = 0;
        let before = engine.buffer().clone();
        let draws = engine.rng_draws();
        let palette = engine.palette().slug();

        assert!(matches!(engine.reseed("fresh"), Err(EngineError::Config(_))));
        assert_eq!(engine.seed(), "steady");
        assert_eq!(engine.frame(), Tick(3));
        assert_eq!(engine.buffer(), &before);
        assert_eq!(engine.rng_draws(), draws);
        assert_eq!(engine.palette().slug(), palette);
    }
}
