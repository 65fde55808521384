//! Blueprint doodles: a lookup table of small pure draw functions.

use std::f32::consts::{PI, TAU};

use super::canvas::{Ink, VectorCanvas};
use crate::rng::EngineRng;

/// Rectangle a doodle is fitted into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Area {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Area {
    #[must_use]
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Centred box of `fw x fh` times this area, never smaller than the minimums.
    fn centered(self, fw: f32, min_w: f32, fh: f32, min_h: f32) -> Self {
        let w = min_w.max((self.w * fw).floor());
        let h = min_h.max((self.h * fh).floor());
        Self {
            x: (self.x + (self.w - w) / 2.0).floor(),
            y: (self.y + (self.h - h) / 2.0).floor(),
            w,
            h,
        }
    }

    fn at(self, fx: f32, fy: f32) -> (f32, f32) {
        (self.x + self.w * fx, self.y + self.h * fy)
    }

    fn random_point(self, inset: f32, rng: &mut EngineRng) -> (f32, f32) {
        (
            self.x + inset + rng.range_int((self.w - inset * 2.0) as i32) as f32,
            self.y + inset + rng.range_int((self.h - inset * 2.0) as i32) as f32,
        )
    }
}

pub type Doodle = fn(&mut dyn VectorCanvas, Area, &mut EngineRng);

/// Themed doodles, drawn through a shuffle-bag.
pub static EIGHTIES: &[Doodle] = &[
    cassette, vhs, floppy, crt, arcade, joystick, synth, memphis, circuit, boombox, walkman,
    palm_sun, ghost, bolt, star, note, chomper, vinyl, sunset_grid, dice, test_bars, yoyo,
];

/// Neutral doodles used with the theme off.
pub static GENERIC: &[Doodle] = &[tape_outline, traces, crossed_box, speaker_box, waveform];

pub const LABELS_80S: &[&str] = &[
    "NTSC", "PAL", "TRACK", "SIDE A", "SIDE B", "HI-SCORE", "INSERT", "MIDI", "BPM 120", "REV A",
    "SHEET 01", "CRT", "VHS", "FLOPPY",
];

pub const LABELS_PLAIN: &[&str] = &["REV A", "SHEET 01"];

/// Small caption in the default label style.
pub fn mini_label(canvas: &mut dyn VectorCanvas, text: &str, x: f32, y: f32) {
    canvas.save();
    canvas.set_global_alpha(0.8);
    canvas.set_font_size(8.0);
    canvas.set_fill_style(Ink::white(0.85));
    canvas.fill_text(text, x.floor(), y.floor());
    canvas.restore();
}

fn twin_reels(canvas: &mut dyn VectorCanvas, b: Area, fy: f32, fr: f32, spread: f32) {
    let r = 2f32.max((b.h * fr).floor());
    let (lx, ly) = b.at(0.5 - spread, fy);
    let (rx, ry) = b.at(0.5 + spread, fy);
    canvas.begin_path();
    canvas.arc(lx, ly, r, 0.0, TAU);
    canvas.arc(rx, ry, r, 0.0, TAU);
    canvas.stroke();
}

fn cassette(c: &mut dyn VectorCanvas, a: Area, _rng: &mut EngineRng) {
    let b = a.centered(0.66, 14.0, 0.44, 10.0);
    c.stroke_rect(b.x, b.y, b.w, b.h);
    c.stroke_rect(b.x + 2.0, b.y + 2.0, b.w - 4.0, b.h - 4.0);
    twin_reels(c, b, 0.56, 0.18, 0.17);
    let (lx, ly) = b.at(0.33, 0.56);
    let (rx, _) = b.at(0.67, 0.56);
    c.line(lx, ly, rx, ly);
    c.set_global_alpha(0.45);
    c.stroke_rect(b.x + 3.0, b.y + 3.0, b.w - 6.0, 3f32.max((b.h * 0.22).floor()));
    c.set_global_alpha(1.0);
}

fn vhs(c: &mut dyn VectorCanvas, a: Area, _rng: &mut EngineRng) {
    let b = a.centered(0.76, 16.0, 0.46, 10.0);
    c.stroke_rect(b.x, b.y, b.w, b.h);
    c.stroke_rect(b.x + 3.0, b.y + 3.0, b.w - 6.0, b.h - 6.0);
    let ww = 3f32.max((b.w * 0.18).floor());
    let (lx, wy) = b.at(0.18, 0.36);
    let (rx, _) = b.at(0.64, 0.36);
    c.stroke_rect(lx, wy, ww, ww);
    c.stroke_rect(rx, wy, ww, ww);
    c.set_global_alpha(0.45);
    c.stroke_rect(b.x + b.w * 0.34, b.y + 2.0, b.w * 0.32, b.h * 0.24);
    c.set_global_alpha(1.0);
}

fn floppy(c: &mut dyn VectorCanvas, a: Area, _rng: &mut EngineRng) {
    let b = a.centered(0.54, 14.0, 0.62, 14.0);
    c.stroke_rect(b.x, b.y, b.w, b.h);
    c.stroke_rect(b.x + 2.0, b.y + 2.0, b.w - 4.0, 3f32.max((b.h * 0.18).floor()));
    c.set_global_alpha(0.5);
    c.stroke_rect(b.x + 2.0, b.y + b.h * 0.55, b.w - 4.0, b.h * 0.22);
    c.set_global_alpha(1.0);
    c.fill_rect(b.x + b.w - 3.0, b.y + b.h - 7.0, 2.0, 6.0);
}

fn crt(c: &mut dyn VectorCanvas, a: Area, _rng: &mut EngineRng) {
    let b = a.centered(0.68, 16.0, 0.5, 14.0);
    c.round_rect(b.x, b.y, b.w, b.h, 3.0);
    c.set_global_alpha(0.55);
    c.round_rect(b.x + 2.0, b.y + 2.0, b.w - 4.0, b.h - 6.0, 2.0);
    c.set_global_alpha(0.35);
    for i in 0..5 {
        let yy = (b.y + 4.0 + i as f32 * (b.h - 10.0) / 4.0).floor();
        c.line(b.x + 4.0, yy, b.x + b.w - 4.0, yy);
    }
    c.set_global_alpha(1.0);
    c.line(b.x + b.w * 0.35, b.y + b.h + 2.0, b.x + b.w * 0.65, b.y + b.h + 2.0);
}

fn arcade(c: &mut dyn VectorCanvas, a: Area, _rng: &mut EngineRng) {
    let b = a.centered(0.5, 16.0, 0.72, 18.0);
    c.begin_path();
    c.move_to(b.x, b.y + b.h);
    c.line_to(b.x, b.y + 5.0);
    c.line_to(b.x + b.w * 0.22, b.y);
    c.line_to(b.x + b.w, b.y);
    c.line_to(b.x + b.w, b.y + b.h);
    c.close_path();
    c.stroke();
    c.stroke_rect(b.x + b.w * 0.18, b.y + b.h * 0.18, b.w * 0.64, b.h * 0.26);
    c.stroke_rect(b.x + b.w * 0.22, b.y + b.h * 0.55, b.w * 0.56, b.h * 0.16);
    let (lx, ly) = b.at(0.34, 0.63);
    let (rx, ry) = b.at(0.66, 0.63);
    c.begin_path();
    c.arc(lx, ly, 2.0, 0.0, TAU);
    c.arc(rx, ry, 2.0, 0.0, TAU);
    c.stroke();
}

fn joystick(c: &mut dyn VectorCanvas, a: Area, _rng: &mut EngineRng) {
    let b = a.centered(0.66, 16.0, 0.32, 10.0);
    c.round_rect(b.x, b.y, b.w, b.h, 3.0);
    let sx = b.x + b.w * 0.28;
    c.line(sx, b.y + b.h * 0.2, sx, b.y - b.h * 0.35);
    c.circle(sx, b.y - b.h * 0.35, 3.0);
    let (ax, ay) = b.at(0.72, 0.55);
    let (bx, by) = b.at(0.82, 0.45);
    c.begin_path();
    c.arc(ax, ay, 2.0, 0.0, TAU);
    c.arc(bx, by, 2.0, 0.0, TAU);
    c.stroke();
}

fn synth(c: &mut dyn VectorCanvas, a: Area, rng: &mut EngineRng) {
    let b = a.centered(0.78, 18.0, 0.28, 10.0);
    c.stroke_rect(b.x, b.y, b.w, b.h);
    let keys = 10 + rng.range_int(8);
    c.set_global_alpha(0.5);
    for i in 1..keys {
        let xx = (b.x + b.w * i as f32 / keys as f32).floor();
        c.line(xx, b.y + 2.0, xx, b.y + b.h - 2.0);
    }
    c.set_global_alpha(1.0);
    let (k1x, ky) = b.at(0.12, 0.35);
    let (k2x, _) = b.at(0.2, 0.35);
    c.begin_path();
    c.arc(k1x, ky, 2.0, 0.0, TAU);
    c.arc(k2x, ky, 2.0, 0.0, TAU);
    c.stroke();
}

fn memphis(c: &mut dyn VectorCanvas, a: Area, rng: &mut EngineRng) {
    let sx = a.x + 3.0 + rng.range_int((a.w as i32 - 6).max(1)) as f32;
    let sy = a.y + 3.0 + rng.range_int((a.h as i32 - 6).max(1)) as f32;
    c.set_global_alpha(0.75);
    let amp = (2 + rng.range_int(4)) as f32;
    let len = 10f32.max((a.w.min(a.h) * 0.55).floor()) as i32;
    c.begin_path();
    c.move_to(sx, sy);
    for i in (0..len).step_by(3) {
        let i = i as f32;
        c.line_to(sx + i, sy + (i / 6.0 * TAU).sin() * amp);
    }
    c.stroke();
    let (tx, ty) = (a.at(0.22, 0.7).0.floor(), a.at(0.22, 0.7).1.floor());
    c.begin_path();
    c.move_to(tx, ty);
    c.line_to(tx + 10.0, ty - 8.0);
    c.line_to(tx + 18.0, ty + 6.0);
    c.close_path();
    c.stroke();
    for _ in 0..8 {
        let (dx, dy) = a.random_point(2.0, rng);
        c.fill_rect(dx, dy, 1.0, 1.0);
    }
    c.set_global_alpha(1.0);
}

fn trace_lines(c: &mut dyn VectorCanvas, a: Area, rng: &mut EngineRng, count: i32, pad_chance: f64) {
    for _ in 0..count {
        let (x1, y1) = a.random_point(1.0, rng);
        let (x2, y2) = a.random_point(1.0, rng);
        c.line(x1, y1, x2, y1);
        c.line(x2, y1, x2, y2);
        if rng.chance(pad_chance) {
            c.fill_rect(x2 - 1.0, y2 - 1.0, 2.0, 2.0);
        }
    }
}

fn circuit(c: &mut dyn VectorCanvas, a: Area, rng: &mut EngineRng) {
    let n = 10 + rng.range_int(14);
    c.set_global_alpha(0.8);
    trace_lines(c, a, rng, n, 0.45);
    c.set_global_alpha(1.0);
}

fn boombox(c: &mut dyn VectorCanvas, a: Area, _rng: &mut EngineRng) {
    let b = a.centered(0.74, 14.0, 0.42, 10.0);
    c.stroke_rect(b.x, b.y, b.w, b.h);
    twin_reels(c, b, 0.56, 0.2, 0.25);
    c.stroke_rect(b.x + b.w * 0.4, b.y + 2.0, b.w * 0.2, b.h * 0.22);
    let yy = b.y + b.h * 0.26;
    c.line(b.x + 2.0, yy, b.x + b.w - 2.0, yy);
}

fn walkman(c: &mut dyn VectorCanvas, a: Area, _rng: &mut EngineRng) {
    let b = a.centered(0.46, 14.0, 0.62, 16.0);
    c.round_rect(b.x, b.y, b.w, b.h, 3.0);
    c.stroke_rect(b.x + 3.0, b.y + 4.0, b.w - 6.0, (b.h * 0.28).floor());
    let yy = (b.y + b.h * 0.42).floor();
    c.line(b.x + 3.0, yy, b.x + b.w - 3.0, yy);
    c.begin_path();
    for fx in [0.3, 0.5, 0.7] {
        let (bx, by) = b.at(fx, 0.78);
        c.arc(bx, by, 1.8, 0.0, TAU);
    }
    c.stroke();
    c.begin_path();
    c.arc(b.x + b.w * 0.5, b.y - 2.0, b.w * 0.55, PI * 0.15, PI * 0.85);
    c.stroke();
    c.round_rect(b.x - 3.0, b.y + 2.0, 5.0, 7.0, 2.0);
    c.round_rect(b.x + b.w - 2.0, b.y + 2.0, 5.0, 7.0, 2.0);
}

fn palm_sun(c: &mut dyn VectorCanvas, a: Area, _rng: &mut EngineRng) {
    let (cx, cy) = a.at(0.5, 0.62);
    let (cx, cy) = (cx.floor(), cy.floor());
    c.line(cx, cy, cx - 2.0, cy - 10.0);
    c.line(cx - 2.0, cy - 10.0, cx - 1.0, cy - 16.0);
    c.line(cx - 1.0, cy - 16.0, cx - 10.0, cy - 20.0);
    c.line(cx - 1.0, cy - 16.0, cx + 8.0, cy - 22.0);
    c.line(cx - 1.0, cy - 16.0, cx - 2.0, cy - 24.0);
    c.circle(cx + 10.0, cy - 18.0, 4.0);
    c.set_global_alpha(0.5);
    c.line(cx - 14.0, cy + 2.0, cx + 16.0, cy + 2.0);
    c.set_global_alpha(1.0);
}

fn ghost(c: &mut dyn VectorCanvas, a: Area, _rng: &mut EngineRng) {
    let r = 6f32.max((a.w.min(a.h) * 0.24).floor());
    let (cx, cy) = a.at(0.5, 0.5);
    c.begin_path();
    c.arc(cx, cy, r, PI, TAU);
    c.line_to(cx + r, cy + r);
    let teeth = 4;
    for i in 0..teeth {
        let x0 = cx + r - (2.0 * r) * (i as f32 + 0.5) / teeth as f32;
        let x1 = cx + r - (2.0 * r) * (i as f32 + 1.0) / teeth as f32;
        c.line_to(x0, cy + r - 3.0);
        c.line_to(x1, cy + r);
    }
    c.close_path();
    c.stroke();
    c.fill_rect(cx - r * 0.45, cy - r * 0.2, 2.0, 2.0);
    c.fill_rect(cx + r * 0.2, cy - r * 0.2, 2.0, 2.0);
}

fn bolt(c: &mut dyn VectorCanvas, a: Area, _rng: &mut EngineRng) {
    let b = a.centered(0.3, 8.0, 0.7, 16.0);
    c.begin_path();
    c.move_to(b.x + b.w * 0.6, b.y);
    c.line_to(b.x, b.y + b.h * 0.55);
    c.line_to(b.x + b.w * 0.5, b.y + b.h * 0.55);
    c.line_to(b.x + b.w * 0.3, b.y + b.h);
    c.line_to(b.x + b.w, b.y + b.h * 0.4);
    c.line_to(b.x + b.w * 0.5, b.y + b.h * 0.4);
    c.close_path();
    c.stroke();
}

fn star(c: &mut dyn VectorCanvas, a: Area, _rng: &mut EngineRng) {
    let (cx, cy) = a.at(0.5, 0.5);
    let outer = 5f32.max((a.w.min(a.h) * 0.3).floor());
    let inner = outer * 0.45;
    c.begin_path();
    for i in 0..10 {
        let r = if i % 2 == 0 { outer } else { inner };
        let angle = -PI / 2.0 + i as f32 * PI / 5.0;
        c.line_to(cx + r * angle.cos(), cy + r * angle.sin());
    }
    c.close_path();
    c.stroke();
}

fn note(c: &mut dyn VectorCanvas, a: Area, _rng: &mut EngineRng) {
    let (hx, hy) = a.at(0.4, 0.7);
    let stem = 10f32.max(a.h * 0.45);
    c.circle(hx, hy, 3.0);
    c.line(hx + 3.0, hy, hx + 3.0, hy - stem);
    c.begin_path();
    c.move_to(hx + 3.0, hy - stem);
    c.quad_to(hx + 10.0, hy - stem + 2.0, hx + 9.0, hy - stem + 8.0);
    c.stroke();
}

fn chomper(c: &mut dyn VectorCanvas, a: Area, _rng: &mut EngineRng) {
    let r = 5f32.max((a.w.min(a.h) * 0.22).floor());
    let (cx, cy) = a.at(0.35, 0.5);
    c.begin_path();
    c.move_to(cx, cy);
    c.arc(cx, cy, r, PI * 0.2, PI * 1.8);
    c.close_path();
    c.stroke();
    for i in 1..4 {
        let dx = cx + r + i as f32 * (r * 0.9);
        c.fill_rect(dx, cy - 1.0, 2.0, 2.0);
    }
}

fn vinyl(c: &mut dyn VectorCanvas, a: Area, _rng: &mut EngineRng) {
    let r = 6f32.max((a.w.min(a.h) * 0.3).floor());
    let (cx, cy) = a.at(0.5, 0.5);
    c.circle(cx, cy, r);
    c.set_global_alpha(0.45);
    c.circle(cx, cy, r * 0.7);
    c.circle(cx, cy, r * 0.5);
    c.set_global_alpha(1.0);
    c.circle(cx, cy, 2f32.max(r * 0.18));
    c.line(cx + r * 0.9, cy - r, cx + r * 0.3, cy - r * 0.2);
}

fn sunset_grid(c: &mut dyn VectorCanvas, a: Area, _rng: &mut EngineRng) {
    let horizon = a.y + a.h * 0.55;
    let (cx, _) = a.at(0.5, 0.0);
    let r = 5f32.max((a.w.min(a.h) * 0.25).floor());
    c.begin_path();
    c.arc(cx, horizon, r, PI, TAU);
    c.stroke();
    c.set_global_alpha(0.6);
    c.line(a.x + 2.0, horizon, a.x + a.w - 2.0, horizon);
    for i in 1..4 {
        let yy = horizon + (a.y + a.h - horizon) * (i as f32 / 4.0).powi(2);
        c.line(a.x + 2.0, yy, a.x + a.w - 2.0, yy);
    }
    for i in -3..=3 {
        c.line(cx + i as f32 * 3.0, horizon, cx + i as f32 * a.w * 0.16, a.y + a.h - 1.0);
    }
    c.set_global_alpha(1.0);
}

fn dice(c: &mut dyn VectorCanvas, a: Area, rng: &mut EngineRng) {
    let s = 10f32.max((a.w.min(a.h) * 0.42).floor());
    let b = Area::new((a.x + (a.w - s) / 2.0).floor(), (a.y + (a.h - s) / 2.0).floor(), s, s);
    c.round_rect(b.x, b.y, s, s, 3.0);
    let face = 1 + rng.range_int(6);
    let pips: &[(f32, f32)] = match face {
        1 => &[(0.5, 0.5)],
        2 => &[(0.28, 0.28), (0.72, 0.72)],
        3 => &[(0.28, 0.28), (0.5, 0.5), (0.72, 0.72)],
        4 => &[(0.28, 0.28), (0.72, 0.28), (0.28, 0.72), (0.72, 0.72)],
        5 => &[(0.28, 0.28), (0.72, 0.28), (0.5, 0.5), (0.28, 0.72), (0.72, 0.72)],
        _ => &[(0.28, 0.25), (0.72, 0.25), (0.28, 0.5), (0.72, 0.5), (0.28, 0.75), (0.72, 0.75)],
    };
    for (fx, fy) in pips {
        let (px, py) = b.at(*fx, *fy);
        c.fill_rect(px - 1.0, py - 1.0, 2.0, 2.0);
    }
}

fn test_bars(c: &mut dyn VectorCanvas, a: Area, rng: &mut EngineRng) {
    let b = a.centered(0.7, 16.0, 0.5, 10.0);
    c.stroke_rect(b.x, b.y, b.w, b.h);
    let bars = 6 + rng.range_int(3);
    for i in 0..bars {
        let bx = b.x + b.w * i as f32 / bars as f32;
        c.set_global_alpha(0.25 + 0.7 * (i as f32 / bars as f32));
        c.fill_rect(bx + 1.0, b.y + 1.0, b.w / bars as f32 - 1.0, b.h * 0.7);
    }
    c.set_global_alpha(1.0);
    c.line(b.x, b.y + b.h * 0.78, b.x + b.w, b.y + b.h * 0.78);
}

fn yoyo(c: &mut dyn VectorCanvas, a: Area, _rng: &mut EngineRng) {
    let (cx, cy) = a.at(0.5, 0.58);
    let (cx, cy) = (cx.floor(), cy.floor());
    let r = 6f32.max((a.w.min(a.h) * 0.22).floor());
    c.set_global_alpha(0.7);
    c.begin_path();
    c.move_to(cx, a.y + 2.0);
    c.cubic_to(cx - 6.0, cy - r * 2.0, cx + 8.0, cy - r * 1.3, cx, cy - r);
    c.stroke();
    c.set_global_alpha(1.0);
    c.begin_path();
    c.arc(cx - r * 0.35, cy, r, 0.0, TAU);
    c.arc(cx + r * 0.35, cy, r, 0.0, TAU);
    c.stroke();
    c.set_global_alpha(0.55);
    c.line(cx - r * 0.2, cy, cx + r * 0.2, cy);
    c.set_global_alpha(1.0);
    mini_label(c, "YOYO", cx - r * 1.4, cy + r + 6.0);
}

fn tape_outline(c: &mut dyn VectorCanvas, a: Area, _rng: &mut EngineRng) {
    let b = a.centered(0.62, 10.0, 0.42, 8.0);
    c.stroke_rect(b.x, b.y, b.w, b.h);
    c.stroke_rect(b.x + 2.0, b.y + 2.0, b.w - 4.0, b.h - 4.0);
    twin_reels(c, b, 0.55, 0.18, 0.17);
}

fn traces(c: &mut dyn VectorCanvas, a: Area, rng: &mut EngineRng) {
    let n = 8 + rng.range_int(10);
    trace_lines(c, a, rng, n, 0.35);
}

fn crossed_box(c: &mut dyn VectorCanvas, a: Area, _rng: &mut EngineRng) {
    let b = a.centered(0.5, 10.0, 0.5, 10.0);
    c.stroke_rect(b.x, b.y, b.w, b.h);
    c.line(b.x, b.y, b.x + b.w, b.y + b.h);
    c.line(b.x + b.w, b.y, b.x, b.y + b.h);
}

fn speaker_box(c: &mut dyn VectorCanvas, a: Area, _rng: &mut EngineRng) {
    let b = a.centered(0.7, 12.0, 0.44, 10.0);
    c.stroke_rect(b.x, b.y, b.w, b.h);
    twin_reels(c, b, 0.55, 0.2, 0.25);
}

fn waveform(c: &mut dyn VectorCanvas, a: Area, rng: &mut EngineRng) {
    let n = 10 + rng.range_int(14);
    c.set_global_alpha(0.75);
    for _ in 0..n {
        let (ox, oy) = a.random_point(2.0, rng);
        let r = (2 + rng.range_int(((a.w.min(a.h) * 0.22) as i32).max(2))) as f32;
        c.circle(ox, oy, r);
        if rng.chance(0.35) {
            let (ox2, oy2) = a.random_point(2.0, rng);
            c.line(ox, oy, ox2, oy2);
        }
    }
    c.set_global_alpha(1.0);
}

/// Shuffle-bag over the themed doodle table.
#[derive(Debug, Clone, Default)]
pub struct SymbolBag {
    bag: Vec<usize>,
}

impl SymbolBag {
    /// Index into [`EIGHTIES`] of the next doodle.
    pub fn next_index(&mut self, rng: &mut EngineRng) -> usize {
        if self.bag.is_empty() {
            self.bag = (0..EIGHTIES.len()).collect();
            rng.shuffle(&mut self.bag);
        }
        self.bag.pop().unwrap_or(0)
    }

    pub fn next(&mut self, rng: &mut EngineRng) -> Doodle {
        EIGHTIES[self.next_index(rng)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marks::surface::StampSurface;

    fn render(doodle: Doodle, seed: &str) -> usize {
        let mut surface = StampSurface::new(140, 100).expect("surface");
        surface.set_stroke_style(Ink::white(0.85));
        surface.set_fill_style(Ink::white(0.85));
        let mut rng = EngineRng::seeded(seed);
        doodle(&mut surface, Area::new(20.0, 20.0, 100.0, 60.0), &mut rng);
        surface.covered()
    }

    #[test]
    fn every_doodle_leaves_marks() {
        for (i, doodle) in EIGHTIES.iter().chain(GENERIC.iter()).enumerate() {
            assert!(render(*doodle, "doodle") > 0, "doodle {i} drew nothing");
        }
    }

    #[test]
    fn symbol_bag_cycles_through_the_table() {
        let mut rng = EngineRng::seeded("symbols");
        let mut bag = SymbolBag::default();
        let mut drawn: Vec<usize> = (0..EIGHTIES.len())
            .map(|_| bag.next_index(&mut rng))
            .collect();
        drawn.sort_unstable();
        assert_eq!(drawn, (0..EIGHTIES.len()).collect::<Vec<_>>());
    }
}
