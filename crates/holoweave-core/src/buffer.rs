//! Toroidal RGBA pixel grid with a parallel hold (paint resistance) plane.

use thiserror::Error;

use crate::palette::{PaletteManager, Rgb};
use crate::rng::EngineRng;

/// Fraction of the requested strength removed by a fully held pixel.
pub const HOLD_STRENGTH: f64 = 0.92;
/// Per-tick multiplicative decay of hold values.
pub const HOLD_FRAME_DECAY: f64 = 0.9986;
/// Attenuated strengths below this are dropped.
pub const MIN_PAINT: f64 = 0.02;

const SPECK_DENSITY: f64 = 0.02;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BufferError {
    #[error("pixel buffer dimensions must be non-zero (got {width}x{height})")]
    ZeroSize { width: u32, height: u32 },
}

/// Row-major RGBA8 buffer whose coordinates wrap on both axes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
    hold: Vec<u8>,
}

#[inline]
fn lerp_channel(from: u8, to: u8, t: f64) -> u8 {
    let a = f64::from(from);
    (a + (f64::from(to) - a) * t) as u8
}

impl PixelBuffer {
    /// Allocate an opaque black buffer.
    pub fn new(width: u32, height: u32) -> Result<Self, BufferError> {
        if width == 0 || height == 0 {
            return Err(BufferError::ZeroSize { width, height });
        }
        let cells = width as usize * height as usize;
        let mut data = vec![0; cells * 4];
        for pixel in data.chunks_exact_mut(4) {
            pixel[3] = 255;
        }
        Ok(Self {
            width,
            height,
            data,
            hold: vec![0; cells],
        })
    }

    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    #[must_use]
    pub fn hold(&self) -> &[u8] {
        &self.hold
    }

    /// Raw bytes for transforms that bypass blending.
    pub(crate) fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Wrap any integer coordinate onto the torus.
    #[must_use]
    pub fn wrap(&self, x: i32, y: i32) -> (u32, u32) {
        (
            i64::from(x).rem_euclid(i64::from(self.width)) as u32,
            i64::from(y).rem_euclid(i64::from(self.height)) as u32,
        )
    }

    #[inline]
    fn cell(&self, x: i32, y: i32) -> usize {
        let (x, y) = self.wrap(x, y);
        y as usize * self.width as usize + x as usize
    }

    /// Direct overwrite.
    pub fn set(&mut self, x: i32, y: i32, rgb: Rgb, alpha: u8) {
        let i = self.cell(x, y) * 4;
        self.data[i..i + 4].copy_from_slice(&[rgb.r, rgb.g, rgb.b, alpha]);
    }

    /// Colour and alpha at a wrapped coordinate.
    #[must_use]
    pub fn get(&self, x: i32, y: i32) -> (Rgb, u8) {
        let i = self.cell(x, y) * 4;
        (
            Rgb::new(self.data[i], self.data[i + 1], self.data[i + 2]),
            self.data[i + 3],
        )
    }

    #[must_use]
    pub fn luminance_at(&self, x: i32, y: i32) -> f64 {
        self.get(x, y).0.luminance()
    }

    #[must_use]
    pub fn hold_at(&self, x: i32, y: i32) -> u8 {
        self.hold[self.cell(x, y)]
    }

    /// Linear blend toward `rgb`, truncating each channel. Alpha becomes opaque.
    pub fn blend(&mut self, x: i32, y: i32, rgb: Rgb, t: f64) {
        let i = self.cell(x, y) * 4;
        let px = &mut self.data[i..i + 4];
        px[0] = lerp_channel(px[0], rgb.r, t);
        px[1] = lerp_channel(px[1], rgb.g, t);
        px[2] = lerp_channel(px[2], rgb.b, t);
        px[3] = 255;
    }

    /// Blend attenuated by the hold value. Returns whether anything was written.
    pub fn paint_blend(&mut self, x: i32, y: i32, rgb: Rgb, t: f64) -> bool {
        let h = f64::from(self.hold[self.cell(x, y)]) / 255.0;
        let t = t * (1.0 - h * HOLD_STRENGTH);
        if t < MIN_PAINT {
            return false;
        }
        self.blend(x, y, rgb, t);
        true
    }

    /// Flat background fill, a sprinkle of palette specks, hold reset.
    pub fn clear(&mut self, palette: &PaletteManager, rng: &mut EngineRng) {
        let bg = palette.background_rgb();
        for px in self.data.chunks_exact_mut(4) {
            px.copy_from_slice(&[bg.r, bg.g, bg.b, 255]);
        }
        let specks = (f64::from(self.width) * f64::from(self.height) * SPECK_DENSITY) as usize;
        let (w, h) = (self.width as i32, self.height as i32);
        for _ in 0..specks {
            let x = rng.range_int(w);
            let y = rng.range_int(h);
            let color = palette.weighted_color(rng);
            let t = 0.15 + rng.next_f64() * 0.5;
            self.blend(x, y, color, t);
        }
        self.hold.fill(0);
    }

    pub fn hold_decay(&mut self) {
        for h in &mut self.hold {
            *h = (f64::from(*h) * HOLD_FRAME_DECAY) as u8;
        }
    }

    /// Raise the hold value for a freshly stamped texel. Never lowers it.
    pub fn mark_held(&mut self, x: i32, y: i32, strength: f64) {
        let value = ((200.0 + strength * 90.0) as i32).clamp(120, 255) as u8;
        let i = self.cell(x, y);
        if value > self.hold[i] {
            self.hold[i] = value;
        }
    }

    /// Darken every RGB channel by `factor`, truncating.
    pub fn fade(&mut self, factor: f64) {
        let keep = 1.0 - factor;
        for px in self.data.chunks_exact_mut(4) {
            px[0] = (f64::from(px[0]) * keep) as u8;
            px[1] = (f64::from(px[1]) * keep) as u8;
            px[2] = (f64::from(px[2]) * keep) as u8;
            px[3] = 255;
        }
    }

    /// Mean luma over the whole buffer.
    #[must_use]
    pub fn mean_luminance(&self) -> f64 {
        let total: f64 = self
            .data
            .chunks_exact(4)
            .map(|px| Rgb::new(px[0], px[1], px[2]).luminance())
            .sum();
        total / (self.width as f64 * self.height as f64)
    }

    /// Number of cells whose hold value is above zero.
    #[must_use]
    pub fn held_count(&self) -> usize {
        self.hold.iter().filter(|&&h| h > 0).count()
    }

    /// Nearest-neighbour resample into a fresh RGBA8 vector.
    #[must_use]
    pub fn upscale_nearest(&self, out_w: u32, out_h: u32) -> Vec<u8> {
        let mut out = Vec::with_capacity(out_w as usize * out_h as usize * 4);
        let (w, h) = (u64::from(self.width), u64::from(self.height));
        for oy in 0..u64::from(out_h) {
            let sy = (oy * h / u64::from(out_h.max(1))) as usize;
            let row = sy * self.width as usize * 4;
            for ox in 0..u64::from(out_w) {
                let sx = (ox * w / u64::from(out_w.max(1))) as usize;
                let i = row + sx * 4;
                out.extend_from_slice(&self.data[i..i + 4]);
            }
        }
        out
    }
}
