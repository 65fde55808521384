//! Minimal immediate-mode vector drawing capability used by mark content.

use std::f32::consts::TAU;

/// Straight (non-premultiplied) RGBA colour with float alpha.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ink {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Ink {
    #[must_use]
    pub const fn rgba(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    #[must_use]
    pub const fn white(a: f32) -> Self {
        Self::rgba(255, 255, 255, a)
    }

    #[must_use]
    pub const fn black(a: f32) -> Self {
        Self::rgba(0, 0, 0, a)
    }
}

/// Drawing surface with a canvas-like state machine.
///
/// Angles are radians, clockwise with y pointing down. Transform, alpha,
/// styles and font size are part of the saved state.
pub trait VectorCanvas {
    fn save(&mut self);
    fn restore(&mut self);
    fn translate(&mut self, x: f32, y: f32);
    fn rotate(&mut self, radians: f32);

    fn global_alpha(&self) -> f32;
    fn set_global_alpha(&mut self, alpha: f32);
    fn set_stroke_style(&mut self, ink: Ink);
    fn set_fill_style(&mut self, ink: Ink);
    fn set_line_width(&mut self, width: f32);
    fn set_font_size(&mut self, px: f32);

    fn begin_path(&mut self);
    fn move_to(&mut self, x: f32, y: f32);
    fn line_to(&mut self, x: f32, y: f32);
    fn quad_to(&mut self, cx: f32, cy: f32, x: f32, y: f32);
    fn cubic_to(&mut self, c1x: f32, c1y: f32, c2x: f32, c2y: f32, x: f32, y: f32);
    /// Circular arc; joined to the current point by a straight segment.
    fn arc(&mut self, cx: f32, cy: f32, radius: f32, start: f32, end: f32);
    fn close_path(&mut self);
    fn stroke(&mut self);
    fn fill(&mut self);

    fn stroke_rect(&mut self, x: f32, y: f32, w: f32, h: f32);
    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32);
    /// Text with its top-left corner at `(x, y)`.
    fn fill_text(&mut self, text: &str, x: f32, y: f32);
    fn stroke_text(&mut self, text: &str, x: f32, y: f32);
    fn measure_text(&self, text: &str) -> f32;
    /// Reset a region to fully transparent, ignoring the transform.
    fn clear_rect(&mut self, x: f32, y: f32, w: f32, h: f32);

    fn line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) {
        self.begin_path();
        self.move_to(x1, y1);
        self.line_to(x2, y2);
        self.stroke();
    }

    fn circle(&mut self, cx: f32, cy: f32, radius: f32) {
        self.begin_path();
        self.arc(cx, cy, radius, 0.0, TAU);
        self.stroke();
    }

    /// Stroked rectangle with quadratic corners.
    fn round_rect(&mut self, x: f32, y: f32, w: f32, h: f32, r: f32) {
        let r = r.min(w * 0.25).min(h * 0.25);
        self.begin_path();
        self.move_to(x + r, y);
        self.line_to(x + w - r, y);
        self.quad_to(x + w, y, x + w, y + r);
        self.line_to(x + w, y + h - r);
        self.quad_to(x + w, y + h, x + w - r, y + h);
        self.line_to(x + r, y + h);
        self.quad_to(x, y + h, x, y + h - r);
        self.line_to(x, y + r);
        self.quad_to(x, y, x + r, y);
        self.stroke();
    }
}
