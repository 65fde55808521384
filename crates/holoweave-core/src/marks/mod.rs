//! Decorative marks: text and blueprint stamps composited into the buffer.
//!
//! A stamp is drawn onto an off-screen [`StampSurface`] through the
//! [`VectorCanvas`] capability, then folded into the pixel buffer texel by
//! texel. Ink polarity follows the buffer luminance under the stamp centre and
//! every inked texel is marked held so fresh marks survive the next few ticks.

pub mod canvas;
pub mod doodles;
pub mod phrases;
pub mod surface;

use serde::{Deserialize, Serialize};
use tracing::debug;

pub use canvas::{Ink, VectorCanvas};
pub use doodles::{Area, Doodle, SymbolBag};
pub use phrases::PhrasePicker;
pub use surface::{StampSurface, SurfaceError};

use crate::buffer::PixelBuffer;
use crate::glitch::{self, clamp_low};
use crate::modes::{MarksMode, MovementMode, TextSource, Theme};
use crate::palette::{PaletteManager, Rgb};
use crate::rng::EngineRng;

const MIXED_BLUEPRINT_SKIP: f64 = 0.55;
const SMEAR_CHANCE: f64 = 0.6;
const INVERT_FLIP: f64 = 0.03;
const TEXT_STRENGTH: f64 = 0.95;
const BLUEPRINT_STRENGTH: f64 = 0.9;

const BLUEPRINT_LIGHT: Rgb = Rgb::new(245, 247, 255);
const BLUEPRINT_DARK: Rgb = Rgb::new(5, 6, 10);
const BLUEPRINT_SHADOW: Rgb = Rgb::new(10, 12, 18);

/// What a stamp depicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StampKind {
    Text,
    Blueprint,
}

/// Selectors the stamper reads each attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkSettings {
    pub movement: MovementMode,
    pub marks: MarksMode,
    pub text: TextSource,
    pub theme: Theme,
}

/// Outcome of a successful stamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StampEvent {
    pub kind: StampKind,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    /// Buffer texels that received ink.
    pub inked: usize,
    /// Whether a block-copy glitch smeared the mark afterwards.
    pub smeared: bool,
}

/// Owns the stamp surface and the shuffle-bags feeding it.
#[derive(Debug)]
pub struct MarkStamper {
    surface: StampSurface,
    kinds: Vec<StampKind>,
    symbols: SymbolBag,
    phrases: PhrasePicker,
}

impl MarkStamper {
    pub fn new(width: u32, height: u32) -> Result<Self, SurfaceError> {
        Ok(Self {
            surface: StampSurface::new(width, height)?,
            kinds: Vec::new(),
            symbols: SymbolBag::default(),
            phrases: PhrasePicker::default(),
        })
    }

    #[must_use]
    pub fn surface(&self) -> &StampSurface {
        &self.surface
    }

    /// Next kind from a 2:1 blueprint-biased bag.
    fn next_kind(&mut self, rng: &mut EngineRng) -> StampKind {
        if self.kinds.is_empty() {
            self.kinds = vec![StampKind::Blueprint, StampKind::Blueprint, StampKind::Text];
            rng.shuffle(&mut self.kinds);
        }
        self.kinds.pop().unwrap_or(StampKind::Blueprint)
    }

    /// Roll for a stamp and, if it goes ahead, draw and composite it.
    pub fn attempt(
        &mut self,
        buffer: &mut PixelBuffer,
        palette: &PaletteManager,
        settings: MarkSettings,
        rng: &mut EngineRng,
    ) -> Option<StampEvent> {
        if settings.marks == MarksMode::Off {
            return None;
        }
        if rng.next_f64() > settings.movement.stamp_chance() {
            return None;
        }
        let kind = match settings.marks {
            MarksMode::Blueprint => StampKind::Blueprint,
            MarksMode::Text => StampKind::Text,
            MarksMode::Mixed | MarksMode::Off => self.next_kind(rng),
        };
        if settings.marks == MarksMode::Mixed
            && kind == StampKind::Blueprint
            && rng.chance(MIXED_BLUEPRINT_SKIP)
        {
            return None;
        }

        let (bw, bh) = (buffer.width() as i32, buffer.height() as i32);
        let w = clamp_low(56 + rng.range_int(120), 46, (f64::from(bw) * 0.78).floor() as i32);
        let h = clamp_low(28 + rng.range_int(78), 22, (f64::from(bh) * 0.6).floor() as i32);
        let x = rng.range_int((bw - w).max(1));
        let y = rng.range_int((bh - h).max(1));
        let (xf, yf, wf, hf) = (x as f32, y as f32, w as f32, h as f32);

        self.surface.clear_rect(xf - 2.0, yf - 2.0, wf + 4.0, hf + 4.0);

        let strength = match kind {
            StampKind::Text => {
                let phrase = self.phrases.pick(settings.text, settings.theme, rng);
                if rng.chance(0.55) {
                    let underline = (yf + hf * 0.65).floor();
                    self.surface.set_stroke_style(Ink::white(0.35));
                    self.surface.line(xf + 2.0, underline, xf + wf - 2.0, underline);
                }
                let top = yf + 2.0 + rng.range_int((h - 16).max(1)) as f32;
                self.jitter_text(xf + 2.0, top, phrase, wf - 6.0, settings.movement, rng);
                TEXT_STRENGTH
            }
            StampKind::Blueprint => {
                self.blueprint(Area::new(xf + 1.0, yf + 1.0, wf - 2.0, hf - 2.0), settings.theme, rng);
                if rng.chance(0.6) {
                    let note = if rng.chance(0.5) { "SPEC // 198X" } else { "CALC: OK" };
                    self.surface.set_font_size(7.0);
                    self.surface.set_fill_style(Ink::white(0.85));
                    self.surface.fill_text(note, xf + 2.0, yf + 2.0);
                }
                BLUEPRINT_STRENGTH
            }
        };

        let inked = self.composite(
            buffer,
            palette,
            (x - 2, y - 2, w + 4, h + 4),
            strength,
            kind == StampKind::Text,
            rng,
        );

        let smeared = !settings.movement.is_pixel()
            && rng.chance(SMEAR_CHANCE)
            && glitch::block_copy(buffer, palette, rng).is_some();

        debug!(?kind, x, y, w, h, inked, smeared, "stamped mark");
        Some(StampEvent {
            kind,
            x,
            y,
            width: w,
            height: h,
            inked,
            smeared,
        })
    }

    /// Per-character jittered, tilted text with occasional glyph substitutions.
    fn jitter_text(
        &mut self,
        x: f32,
        y: f32,
        text: &str,
        max_width: f32,
        movement: MovementMode,
        rng: &mut EngineRng,
    ) {
        let c = &mut self.surface;
        let size = 7 + rng.range_int(8);
        let jitter = 0.8 + (rng.next_f64() * 1.6).trunc() as f32;
        let tilt = (rng.next_f64() * 0.16 - 0.08) as f32;

        c.save();
        c.set_font_size(size as f32);
        c.translate(x, y);
        c.rotate(tilt);
        c.translate(-x, -y);
        c.set_fill_style(Ink::black(0.95));
        c.set_stroke_style(Ink::white(0.92));
        c.set_line_width(2.0);

        let mut cx = x;
        let mut glyph = [0u8; 4];
        for ch in text.chars() {
            let glitch = !movement.is_pixel() && rng.chance(0.1);
            let substitute = char::from(33 + rng.range_int(60) as u8);
            let dx = (rng.next_f64() * f64::from(jitter)) as f32 - jitter / 2.0;
            let dy = (rng.next_f64() * f64::from(jitter)) as f32 - jitter / 2.0;
            let s = ch.encode_utf8(&mut glyph);

            c.stroke_text(s, cx + dx + 1.0, y + dy + 1.0);
            c.fill_text(s, cx + dx, y + dy);

            if glitch {
                c.save();
                c.set_global_alpha(c.global_alpha() * 0.55);
                let gx = cx + dx + if rng.chance(0.5) { 2.0 } else { -2.0 };
                let gy = y + dy + if rng.chance(0.5) { 2.0 } else { -2.0 };
                let mut sub = [0u8; 4];
                let g = substitute.encode_utf8(&mut sub);
                if rng.chance(0.35) {
                    c.stroke_text(g, gx + 1.0, gy + 1.0);
                }
                c.fill_text(g, gx, gy);
                c.restore();
            }

            let advance = c.measure_text(s);
            cx += advance + if rng.chance(0.22) { 0.0 } else { 1.0 };
            if cx > x + max_width {
                break;
            }
        }
        c.restore();
    }

    /// Framed grid, one doodle and a caption, slightly rotated.
    fn blueprint(&mut self, area: Area, theme: Theme, rng: &mut EngineRng) {
        let Area { x, y, w, h } = area;
        let (cx, cy) = (x + w * 0.5, y + h * 0.5);
        let c = &mut self.surface;
        c.save();
        c.translate(cx, cy);
        c.rotate((rng.next_f64() * 0.28 - 0.14) as f32);
        c.translate(-cx, -cy);
        c.set_line_width(1.0);
        c.set_stroke_style(Ink::white(0.85));
        c.set_fill_style(Ink::white(0.14));
        c.stroke_rect(x, y, w, h);

        let gx = 3 + rng.range_int(5);
        let gy = 3 + rng.range_int(5);
        c.set_global_alpha(0.55);
        for i in 1..gx {
            let xx = x + w * i as f32 / gx as f32;
            c.line(xx, y, xx, y + h);
        }
        for j in 1..gy {
            let yy = y + h * j as f32 / gy as f32;
            c.line(x, yy, x + w, yy);
        }
        c.set_global_alpha(1.0);

        let doodle = if theme.is_eighties() {
            self.symbols.next(rng)
        } else {
            doodles::GENERIC[rng.index(doodles::GENERIC.len())]
        };
        doodle(&mut self.surface, area, rng);

        let label = if theme.is_eighties() {
            doodles::LABELS_80S[rng.index(doodles::LABELS_80S.len())]
        } else {
            doodles::LABELS_PLAIN[usize::from(!rng.chance(0.5))]
        };
        let c = &mut self.surface;
        c.set_global_alpha(0.9);
        c.set_font_size(7.0);
        c.set_fill_style(Ink::white(0.85));
        c.fill_text(label, x + 2.0, y + h - 9.0);
        c.restore();
    }

    /// Fold the surface region into the buffer. Returns the number of inked texels.
    fn composite(
        &self,
        buffer: &mut PixelBuffer,
        palette: &PaletteManager,
        (x0, y0, w, h): (i32, i32, i32, i32),
        strength: f64,
        text: bool,
        rng: &mut EngineRng,
    ) -> usize {
        let mut invert = buffer.luminance_at(x0 + (w >> 1), y0 + (h >> 1)) > 0.55;
        if rng.chance(INVERT_FLIP) {
            invert = !invert;
        }

        let mut inked = 0;
        for y in 0..h {
            for x in 0..w {
                let [r, g, b, a] = self.surface.texel(x0 + x, y0 + y);
                if a < 12 {
                    continue;
                }
                let lum = Rgb::new(r, g, b).luminance();
                if lum < 0.12 && a < 80 {
                    continue;
                }
                let t = (f64::from(a) / 255.0 * strength * (0.55 + 0.6 * lum)).clamp(0.06, 0.92);

                let ink = if text {
                    if lum > 0.62 { Rgb::new(255, 255, 255) } else { Rgb::new(0, 0, 0) }
                } else {
                    let mut ink = BLUEPRINT_LIGHT;
                    if !invert && rng.chance(0.055) {
                        ink = palette.weighted_color(rng);
                    }
                    if invert {
                        ink = BLUEPRINT_DARK;
                    }
                    if rng.chance(0.08) {
                        ink = BLUEPRINT_SHADOW;
                    }
                    ink
                };

                buffer.blend(x0 + x, y0 + y, ink, t);
                buffer.mark_held(x0 + x, y0 + y, strength);
                inked += 1;
            }
        }
        inked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(movement: MovementMode, marks: MarksMode) -> MarkSettings {
        MarkSettings {
            movement,
            marks,
            text: TextSource::Mixed,
            theme: Theme::Eighties,
        }
    }

    #[test]
    fn marks_off_never_draws_or_consumes_randomness() {
        let mut rng = EngineRng::seeded("off");
        let palette = PaletteManager::new();
        let mut buffer = PixelBuffer::new(128, 96).expect("buffer");
        let mut stamper = MarkStamper::new(128, 96).expect("stamper");
        for _ in 0..100 {
            let event = stamper.attempt(
                &mut buffer,
                &palette,
                settings(MovementMode::Pixel, MarksMode::Off),
                &mut rng,
            );
            assert!(event.is_none());
        }
        assert_eq!(rng.draws(), 0);
    }

    #[test]
    fn stamps_fit_and_hold_their_texels() {
        let mut rng = EngineRng::seeded("stamps");
        let palette = PaletteManager::new();
        let mut buffer = PixelBuffer::new(160, 120).expect("buffer");
        let mut stamper = MarkStamper::new(160, 120).expect("stamper");
        let mut kinds = Vec::new();
        for _ in 0..400 {
            if let Some(event) = stamper.attempt(
                &mut buffer,
                &palette,
                settings(MovementMode::Pixel, MarksMode::Mixed),
                &mut rng,
            ) {
                assert!((46..=124).contains(&event.width));
                assert!((22..=72).contains(&event.height));
                assert!(event.x >= 0 && event.x + event.width <= 160);
                assert!(!event.smeared);
                kinds.push(event.kind);
            }
        }
        assert!(kinds.contains(&StampKind::Text));
        assert!(kinds.contains(&StampKind::Blueprint));
        assert!(buffer.held_count() > 0);
        assert!(buffer.hold().iter().all(|&h| h == 0 || h >= 120));
    }

    #[test]
    fn text_marks_ink_in_black_and_white_only() {
        let mut rng = EngineRng::seeded("ink");
        let palette = PaletteManager::new();
        let mut buffer = PixelBuffer::new(128, 96).expect("buffer");
        let grey = Rgb::new(77, 77, 77);
        for y in 0..96 {
            for x in 0..128 {
                buffer.set(x, y, grey, 255);
            }
        }
        let mut stamper = MarkStamper::new(128, 96).expect("stamper");
        let mut stamped = 0;
        for _ in 0..200 {
            if stamper
                .attempt(&mut buffer, &palette, settings(MovementMode::Pixel, MarksMode::Text), &mut rng)
                .is_some()
            {
                stamped += 1;
            }
        }
        assert!(stamped > 0);
        for px in buffer.data().chunks_exact(4) {
            assert!(px[0] == px[1] && px[1] == px[2], "tinted texel {px:?}");
        }
    }
}
