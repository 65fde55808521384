//! Palette catalog, background drift and the no-repeat palette bag.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::rng::EngineRng;

/// 8-bit RGB colour.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Unpack a `0xRRGGBB` literal.
    #[must_use]
    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xff) as u8,
            g: ((hex >> 8) & 0xff) as u8,
            b: (hex & 0xff) as u8,
        }
    }

    /// Rec. 601 luma in `[0, 1]`.
    #[must_use]
    pub fn luminance(self) -> f64 {
        (f64::from(self.r) * 0.299 + f64::from(self.g) * 0.587 + f64::from(self.b) * 0.114) / 255.0
    }

    #[must_use]
    pub fn to_hsl(self) -> Hsl {
        let r = f64::from(self.r) / 255.0;
        let g = f64::from(self.g) / 255.0;
        let b = f64::from(self.b) / 255.0;
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let l = (max + min) / 2.0;
        let d = max - min;
        if d == 0.0 {
            return Hsl::new(0.0, 0.0, l * 100.0);
        }
        let s = d / (1.0 - (2.0 * l - 1.0).abs());
        let mut h = if max == r {
            ((g - b) / d) % 6.0
        } else if max == g {
            (b - r) / d + 2.0
        } else {
            (r - g) / d + 4.0
        };
        h *= 60.0;
        if h < 0.0 {
            h += 360.0;
        }
        Hsl::new(h, s * 100.0, l * 100.0)
    }

    /// Lowercase `#rrggbb` form.
    #[must_use]
    pub fn to_hex_string(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Hue in degrees, saturation and lightness in percent.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Hsl {
    pub h: f64,
    pub s: f64,
    pub l: f64,
}

impl Hsl {
    #[must_use]
    pub const fn new(h: f64, s: f64, l: f64) -> Self {
        Self { h, s, l }
    }

    /// Convert to RGB, rounding each channel to the nearest byte.
    #[must_use]
    pub fn to_rgb(self) -> Rgb {
        let h = self.h.rem_euclid(360.0);
        let s = (self.s / 100.0).clamp(0.0, 1.0);
        let l = (self.l / 100.0).clamp(0.0, 1.0);
        let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
        let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
        let m = l - c / 2.0;
        let (r, g, b) = match (h / 60.0) as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };
        let channel = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
        Rgb::new(channel(r), channel(g), channel(b))
    }
}

/// Named four-colour palette. Index 0 is the dark base tone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub name: &'static str,
    pub slug: &'static str,
    pub colors: [Rgb; 4],
}

const fn palette(name: &'static str, slug: &'static str, hex: [u32; 4]) -> Palette {
    Palette {
        name,
        slug,
        colors: [
            Rgb::from_hex(hex[0]),
            Rgb::from_hex(hex[1]),
            Rgb::from_hex(hex[2]),
            Rgb::from_hex(hex[3]),
        ],
    }
}

/// Built-in palette catalog.
pub static PALETTES: [Palette; 24] = [
    palette("Opal Sheen", "opal-sheen", [0x05060A, 0xF6F2FF, 0x40E0FF, 0xFF4FD8]),
    palette("Prism Aurora", "prism-aurora", [0x0A1020, 0x7B61FF, 0x35F4C6, 0xFFE66D]),
    palette("Oil Slick", "oil-slick", [0x05060A, 0x2B2F36, 0x3DF2FF, 0xB8FF3D]),
    palette("Laser Orchid", "laser-orchid", [0x060518, 0xFF4FD8, 0x7B61FF, 0x4DFFF3]),
    palette("Chrome Candy", "chrome-candy", [0x0B0B0C, 0xDDE3F0, 0xFF3EA5, 0x2AF1FF]),
    palette("Pearl Neon", "pearl-neon", [0x0B1026, 0xF3F0E8, 0x22C55E, 0x60A5FA]),
    palette("Glacier Holo", "glacier-holo", [0x06101C, 0xA7C7E7, 0x7CE7FF, 0xFF5FA2]),
    palette("Unicorn Plastic", "unicorn-plastic", [0x0B0B0C, 0xF6F2FF, 0xA855F7, 0x34D399]),
    palette("CD Rainbow", "cd-rainbow", [0x070915, 0xF3F0E8, 0x00D9FF, 0xF7D200]),
    palette("Iridescent Ink", "iridescent-ink", [0x05060A, 0x111827, 0x6EE7FF, 0xD946EF]),
    palette("Biochrome", "biochrome", [0x05060A, 0xE5E7EB, 0x22D3EE, 0xA3E635]),
    palette("Vapor Holo", "vapor-holo", [0x0B1026, 0xFF5FA2, 0x60A5FA, 0xF3F0E8]),
    palette("Synth Foil", "synth-foil", [0x05060A, 0xC7A34A, 0x7CE7FF, 0xFF2DAA]),
    palette("Aurora Lime", "aurora-lime", [0x05060A, 0xB8FF3D, 0x35F4C6, 0x7B61FF]),
    palette("Electric Opaline", "electric-opaline", [0x060518, 0xF6F2FF, 0x2AF1FF, 0xFF3EA5]),
    palette("Holo Titanium", "holo-titanium", [0x0B0B0C, 0x2B2F36, 0xDDE3F0, 0x7CE7FF]),
    palette("Spectral Rose", "spectral-rose", [0x05060A, 0xF6F2FF, 0xFB7185, 0x22D3EE]),
    palette("Mint Prism", "mint-prism", [0x06101C, 0x34D399, 0x7B61FF, 0xF6F2FF]),
    palette("Holo Sunset", "holo-sunset", [0x0A1020, 0xFF7849, 0xFF4FD8, 0x40E0FF]),
    palette("Cosmic Foil", "cosmic-foil", [0x05060A, 0x7B61FF, 0xFF4FD8, 0xFFE66D]),
    palette("Sterling Aura", "sterling-aura", [0x0B0B0C, 0xDDE3F0, 0x60A5FA, 0xA855F7]),
    palette("Prismatic Sea", "prismatic-sea", [0x051225, 0x22D3EE, 0x35F4C6, 0xF6F2FF]),
    palette("Neon Cellophane", "neon-cellophane", [0x05060A, 0xF6F2FF, 0xA3E635, 0xFF5FA2]),
    palette("Laser Ice", "laser-ice", [0x06101C, 0x7CE7FF, 0xF6F2FF, 0x7B61FF]),
];

/// Index of the palette with the given slug.
#[must_use]
pub fn find_by_slug(slug: &str) -> Option<usize> {
    PALETTES.iter().position(|p| p.slug == slug)
}

const BACKGROUND_START: Hsl = Hsl::new(220.0, 26.0, 7.0);

/// Active palette, the drifting background tone and the selection bag.
#[derive(Debug, Clone)]
pub struct PaletteManager {
    palettes: &'static [Palette],
    current: usize,
    last_applied: Option<usize>,
    bag: Vec<usize>,
    background: Hsl,
    anchor: Hsl,
}

impl Default for PaletteManager {
    fn default() -> Self {
        Self::with_catalog(&PALETTES)
    }
}

impl PaletteManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Manager over a custom catalog. An empty catalog falls back to the built-in one.
    #[must_use]
    pub fn with_catalog(palettes: &'static [Palette]) -> Self {
        let palettes = if palettes.is_empty() {
            &PALETTES[..]
        } else {
            palettes
        };
        let anchor = palettes[0].colors[0].to_hsl();
        Self {
            palettes,
            current: 0,
            last_applied: None,
            bag: Vec::new(),
            background: BACKGROUND_START,
            anchor,
        }
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.palettes.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.palettes.is_empty()
    }

    #[must_use]
    pub const fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current(&self) -> &Palette {
        &self.palettes[self.current]
    }

    #[must_use]
    pub fn slug(&self) -> &'static str {
        self.palettes[self.current].slug
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.palettes[self.current].name
    }

    #[must_use]
    pub const fn background(&self) -> Hsl {
        self.background
    }

    /// Darkest colour of the applied palette.
    #[must_use]
    pub const fn anchor(&self) -> Hsl {
        self.anchor
    }

    #[must_use]
    pub fn background_rgb(&self) -> Rgb {
        self.background.to_rgb()
    }

    /// Entries still waiting in the bag, consumed from the back.
    #[must_use]
    pub fn bag(&self) -> &[usize] {
        &self.bag
    }

    /// Forget the bag so the next draw reshuffles.
    pub fn empty_bag(&mut self) {
        self.bag.clear();
    }

    /// Switch to `index` (clamped) and nudge the background tone.
    pub fn apply(&mut self, index: usize, rng: &mut EngineRng) {
        self.current = index.min(self.palettes.len() - 1);
        self.last_applied = Some(self.current);
        self.anchor = self
            .palettes[self.current]
            .colors
            .iter()
            .map(|c| c.to_hsl())
            .fold(None::<Hsl>, |darkest, c| match darkest {
                Some(d) if d.l <= c.l => Some(d),
                _ => Some(c),
            })
            .unwrap_or_default();

        let slug = self.slug();
        let bg = &mut self.background;
        bg.h = (bg.h + (rng.next_f64() * 22.0 - 11.0) + 360.0) % 360.0;
        bg.s = (bg.s + (rng.next_f64() * 8.0 - 4.0)).clamp(8.0, 40.0);
        bg.l = (bg.l + (rng.next_f64() * 2.0 - 1.0)).clamp(2.6, 11.0);
        debug!(palette = slug, hue = bg.h, sat = bg.s, light = bg.l, "palette applied");
    }

    fn refill(&mut self, rng: &mut EngineRng) {
        self.bag = (0..self.palettes.len()).collect();
        rng.shuffle(&mut self.bag);
        if let Some(last) = self.last_applied
            && self.bag.len() > 1
            && self.bag.last() == Some(&last)
            && let Some(j) = self.bag.iter().position(|&v| v != last)
        {
            let end = self.bag.len() - 1;
            self.bag.swap(j, end);
        }
    }

    /// Pop the next palette index from the bag without applying it.
    pub fn next_from_bag(&mut self, rng: &mut EngineRng) -> usize {
        if self.bag.is_empty() {
            self.refill(rng);
        }
        let end = self.bag.len() - 1;
        if let Some(last) = self.last_applied
            && self.bag[end] == last
            && let Some(i) = self.bag[..end].iter().position(|&v| v != last)
        {
            self.bag.swap(i, end);
        }
        self.bag.pop().unwrap_or(0)
    }

    /// Draw from the bag and apply the result.
    pub fn draw_next(&mut self, rng: &mut EngineRng) -> usize {
        let index = self.next_from_bag(rng);
        self.apply(index, rng);
        index
    }

    /// Most legible colour of the current palette, for UI chrome and export tags.
    #[must_use]
    pub fn accent_color(&self) -> Rgb {
        let colors = &self.current().colors;
        let mut best = 0;
        let mut best_score = f64::NEG_INFINITY;
        for (i, color) in colors.iter().enumerate() {
            let hsl = color.to_hsl();
            let visibility = 1.0 - (hsl.l - 55.0).abs() / 55.0;
            let score = visibility * (0.75 + hsl.s / 110.0);
            if score > best_score {
                best_score = score;
                best = i;
            }
        }
        colors[best]
    }

    /// Painting weights for the current palette.
    #[must_use]
    pub fn paint_weights(&self) -> [f64; 4] {
        self.current().colors.map(|c| {
            let hsl = c.to_hsl();
            let mid = 1.0 - (hsl.l - 58.0).abs() / 58.0;
            let sat = 0.6 + hsl.s / 120.0;
            let avoid_black = if hsl.l < 10.0 { 0.25 } else { 1.0 };
            (mid * sat * avoid_black).max(0.06)
        })
    }

    /// Weighted pick favouring mid-lightness, saturated colours.
    pub fn weighted_color(&self, rng: &mut EngineRng) -> Rgb {
        let weights = self.paint_weights();
        self.current().colors[rng.weighted_index(&weights)]
    }
}
