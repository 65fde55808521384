//! Off-screen raster surface for marks, backed by a tiny-skia pixmap.

use embedded_graphics::Pixel;
use embedded_graphics::draw_target::DrawTarget;
use embedded_graphics::geometry::{OriginDimensions, Point, Size};
use embedded_graphics::mono_font::ascii::{FONT_4X6, FONT_5X8, FONT_6X10, FONT_7X13, FONT_9X15};
use embedded_graphics::mono_font::{MonoFont, MonoTextStyle};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::text::{Baseline, Text};
use embedded_graphics::Drawable;
use thiserror::Error;
use tiny_skia::{FillRule, Paint, Path, PathBuilder, Pixmap, PremultipliedColorU8, Rect, Stroke, Transform};

use super::canvas::{Ink, VectorCanvas};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SurfaceError {
    #[error("cannot allocate a {width}x{height} mark surface")]
    Allocation { width: u32, height: u32 },
}

/// Glyph pixels collected from an embedded-graphics text draw.
#[derive(Default)]
struct GlyphMask {
    lit: Vec<Point>,
}

impl OriginDimensions for GlyphMask {
    fn size(&self) -> Size {
        Size::new(4096, 64)
    }
}

impl DrawTarget for GlyphMask {
    type Color = BinaryColor;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        self.lit.extend(
            pixels
                .into_iter()
                .filter(|Pixel(_, color)| color.is_on())
                .map(|Pixel(point, _)| point),
        );
        Ok(())
    }
}

fn font_for(size: f32) -> &'static MonoFont<'static> {
    match size {
        s if s <= 7.0 => &FONT_4X6,
        s if s <= 9.0 => &FONT_5X8,
        s if s <= 11.0 => &FONT_6X10,
        s if s <= 13.0 => &FONT_7X13,
        _ => &FONT_9X15,
    }
}

#[derive(Debug, Clone, Copy)]
struct DrawState {
    transform: Transform,
    alpha: f32,
    stroke: Ink,
    fill: Ink,
    line_width: f32,
    font_size: f32,
}

impl Default for DrawState {
    fn default() -> Self {
        Self {
            transform: Transform::identity(),
            alpha: 1.0,
            stroke: Ink::black(1.0),
            fill: Ink::black(1.0),
            line_width: 1.0,
            font_size: 8.0,
        }
    }
}

/// Raster [`VectorCanvas`] the size of the pixel buffer.
pub struct StampSurface {
    pixmap: Pixmap,
    state: DrawState,
    stack: Vec<DrawState>,
    path: PathBuilder,
    current: Option<(f32, f32)>,
}

impl std::fmt::Debug for StampSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StampSurface")
            .field("width", &self.pixmap.width())
            .field("height", &self.pixmap.height())
            .field("depth", &self.stack.len())
            .finish_non_exhaustive()
    }
}

impl StampSurface {
    pub fn new(width: u32, height: u32) -> Result<Self, SurfaceError> {
        let pixmap = Pixmap::new(width, height).ok_or(SurfaceError::Allocation { width, height })?;
        Ok(Self {
            pixmap,
            state: DrawState::default(),
            stack: Vec::new(),
            path: PathBuilder::new(),
            current: None,
        })
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Straight-alpha RGBA at `(x, y)`; transparent outside the surface.
    #[must_use]
    pub fn texel(&self, x: i32, y: i32) -> [u8; 4] {
        if x < 0 || y < 0 {
            return [0; 4];
        }
        self.pixmap
            .pixel(x as u32, y as u32)
            .map_or([0; 4], |px| {
                let c = px.demultiply();
                [c.red(), c.green(), c.blue(), c.alpha()]
            })
    }

    /// Number of texels with any coverage.
    #[must_use]
    pub fn covered(&self) -> usize {
        self.pixmap.pixels().iter().filter(|px| px.alpha() > 0).count()
    }

    fn paint(&self, ink: Ink) -> Paint<'static> {
        let mut paint = Paint::default();
        let alpha = (ink.a * self.state.alpha).clamp(0.0, 1.0);
        paint.set_color_rgba8(ink.r, ink.g, ink.b, (alpha * 255.0).round() as u8);
        paint.anti_alias = true;
        paint
    }

    fn stroke_style(&self) -> Stroke {
        Stroke {
            width: self.state.line_width.max(0.1),
            ..Stroke::default()
        }
    }

    fn device(&self, x: f32, y: f32) -> (f32, f32) {
        let mut points = [tiny_skia::Point::from_xy(x, y)];
        self.state.transform.map_points(&mut points);
        (points[0].x, points[0].y)
    }

    fn take_path(&mut self) -> Option<Path> {
        let builder = std::mem::replace(&mut self.path, PathBuilder::new());
        self.current = None;
        builder.finish()
    }

    fn rect_path(x: f32, y: f32, w: f32, h: f32) -> Option<Path> {
        Rect::from_xywh(x, y, w, h).map(PathBuilder::from_rect)
    }

    fn glyph_path(&self, text: &str, x: f32, y: f32, dot: f32) -> Option<Path> {
        let font = font_for(self.state.font_size);
        let style = MonoTextStyle::new(font, BinaryColor::On);
        let mut mask = GlyphMask::default();
        let _ = Text::with_baseline(text, Point::zero(), style, Baseline::Top).draw(&mut mask);
        let offset = (dot - 1.0) / 2.0;
        let mut builder = PathBuilder::new();
        for point in &mask.lit {
            if let Some(rect) = Rect::from_xywh(
                x + point.x as f32 - offset,
                y + point.y as f32 - offset,
                dot,
                dot,
            ) {
                builder.push_rect(rect);
            }
        }
        builder.finish()
    }
}

impl VectorCanvas for StampSurface {
    fn save(&mut self) {
        self.stack.push(self.state);
    }

    fn restore(&mut self) {
        if let Some(state) = self.stack.pop() {
            self.state = state;
        }
    }

    fn translate(&mut self, x: f32, y: f32) {
        self.state.transform = self.state.transform.pre_translate(x, y);
    }

    fn rotate(&mut self, radians: f32) {
        self.state.transform = self
            .state
            .transform
            .pre_concat(Transform::from_rotate(radians.to_degrees()));
    }

    fn global_alpha(&self) -> f32 {
        self.state.alpha
    }

    fn set_global_alpha(&mut self, alpha: f32) {
        self.state.alpha = alpha.clamp(0.0, 1.0);
    }

    fn set_stroke_style(&mut self, ink: Ink) {
        self.state.stroke = ink;
    }

    fn set_fill_style(&mut self, ink: Ink) {
        self.state.fill = ink;
    }

    fn set_line_width(&mut self, width: f32) {
        self.state.line_width = width;
    }

    fn set_font_size(&mut self, px: f32) {
        self.state.font_size = px;
    }

    fn begin_path(&mut self) {
        self.path = PathBuilder::new();
        self.current = None;
    }

    fn move_to(&mut self, x: f32, y: f32) {
        let (dx, dy) = self.device(x, y);
        self.path.move_to(dx, dy);
        self.current = Some((dx, dy));
    }

    fn line_to(&mut self, x: f32, y: f32) {
        if self.current.is_none() {
            self.move_to(x, y);
            return;
        }
        let (dx, dy) = self.device(x, y);
        self.path.line_to(dx, dy);
        self.current = Some((dx, dy));
    }

    fn quad_to(&mut self, cx: f32, cy: f32, x: f32, y: f32) {
        if self.current.is_none() {
            self.move_to(cx, cy);
        }
        let (c1, c2) = self.device(cx, cy);
        let (dx, dy) = self.device(x, y);
        self.path.quad_to(c1, c2, dx, dy);
        self.current = Some((dx, dy));
    }

    fn cubic_to(&mut self, c1x: f32, c1y: f32, c2x: f32, c2y: f32, x: f32, y: f32) {
        if self.current.is_none() {
            self.move_to(c1x, c1y);
        }
        let (ax, ay) = self.device(c1x, c1y);
        let (bx, by) = self.device(c2x, c2y);
        let (dx, dy) = self.device(x, y);
        self.path.cubic_to(ax, ay, bx, by, dx, dy);
        self.current = Some((dx, dy));
    }

    fn arc(&mut self, cx: f32, cy: f32, radius: f32, start: f32, end: f32) {
        let sweep = end - start;
        let segments = (sweep.abs() * radius.max(1.0) / 2.0).ceil().clamp(8.0, 96.0) as usize;
        for i in 0..=segments {
            let angle = start + sweep * i as f32 / segments as f32;
            self.line_to(cx + radius * angle.cos(), cy + radius * angle.sin());
        }
    }

    fn close_path(&mut self) {
        if self.current.is_some() {
            self.path.close();
        }
    }

    fn stroke(&mut self) {
        let paint = self.paint(self.state.stroke);
        let stroke = self.stroke_style();
        if let Some(path) = self.take_path() {
            self.pixmap
                .stroke_path(&path, &paint, &stroke, Transform::identity(), None);
        }
    }

    fn fill(&mut self) {
        let paint = self.paint(self.state.fill);
        if let Some(path) = self.take_path() {
            self.pixmap
                .fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
        }
    }

    fn stroke_rect(&mut self, x: f32, y: f32, w: f32, h: f32) {
        let paint = self.paint(self.state.stroke);
        let stroke = self.stroke_style();
        if let Some(path) = Self::rect_path(x, y, w, h) {
            self.pixmap
                .stroke_path(&path, &paint, &stroke, self.state.transform, None);
        }
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32) {
        let paint = self.paint(self.state.fill);
        if let Some(path) = Self::rect_path(x, y, w, h) {
            self.pixmap
                .fill_path(&path, &paint, FillRule::Winding, self.state.transform, None);
        }
    }

    fn fill_text(&mut self, text: &str, x: f32, y: f32) {
        let paint = self.paint(self.state.fill);
        if let Some(path) = self.glyph_path(text, x, y, 1.0) {
            self.pixmap
                .fill_path(&path, &paint, FillRule::Winding, self.state.transform, None);
        }
    }

    fn stroke_text(&mut self, text: &str, x: f32, y: f32) {
        let paint = self.paint(self.state.stroke);
        let dot = 1.0 + self.state.line_width.max(0.0);
        if let Some(path) = self.glyph_path(text, x, y, dot) {
            self.pixmap
                .fill_path(&path, &paint, FillRule::Winding, self.state.transform, None);
        }
    }

    fn measure_text(&self, text: &str) -> f32 {
        let font = font_for(self.state.font_size);
        let advance = font.character_size.width + font.character_spacing;
        (text.chars().count() as u32 * advance) as f32
    }

    fn clear_rect(&mut self, x: f32, y: f32, w: f32, h: f32) {
        let (sw, sh) = (self.pixmap.width() as i64, self.pixmap.height() as i64);
        let x0 = (x.floor() as i64).clamp(0, sw);
        let y0 = (y.floor() as i64).clamp(0, sh);
        let x1 = ((x + w).ceil() as i64).clamp(x0, sw);
        let y1 = ((y + h).ceil() as i64).clamp(y0, sh);
        let stride = sw as usize;
        let pixels = self.pixmap.pixels_mut();
        for row in y0..y1 {
            let start = row as usize * stride;
            pixels[start + x0 as usize..start + x1 as usize].fill(PremultipliedColorU8::TRANSPARENT);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_sized_surface_is_an_error() {
        assert_eq!(
            StampSurface::new(0, 10).err(),
            Some(SurfaceError::Allocation { width: 0, height: 10 })
        );
    }

    #[test]
    fn fill_rect_writes_straight_colour() {
        let mut surface = StampSurface::new(16, 16).expect("surface");
        surface.set_fill_style(Ink::white(1.0));
        surface.fill_rect(2.0, 2.0, 4.0, 4.0);
        assert_eq!(surface.texel(3, 3), [255, 255, 255, 255]);
        assert_eq!(surface.texel(10, 10), [0, 0, 0, 0]);
        assert_eq!(surface.texel(-1, 3), [0, 0, 0, 0]);
    }

    #[test]
    fn clear_rect_resets_region() {
        let mut surface = StampSurface::new(16, 16).expect("surface");
        surface.set_fill_style(Ink::white(1.0));
        surface.fill_rect(0.0, 0.0, 16.0, 16.0);
        surface.clear_rect(-4.0, -4.0, 10.0, 10.0);
        assert_eq!(surface.texel(5, 5)[3], 0);
        assert_eq!(surface.texel(6, 6)[3], 255);
    }

    #[test]
    fn text_leaves_glyph_coverage() {
        let mut surface = StampSurface::new(64, 16).expect("surface");
        surface.set_fill_style(Ink::white(1.0));
        surface.set_font_size(8.0);
        surface.fill_text("HI", 1.0, 1.0);
        assert!(surface.covered() > 4);
        assert_eq!(surface.measure_text("HI"), 10.0);
    }

    #[test]
    fn save_restore_brackets_transform_and_alpha() {
        let mut surface = StampSurface::new(8, 8).expect("surface");
        surface.save();
        surface.translate(3.0, 0.0);
        surface.set_global_alpha(0.25);
        surface.restore();
        assert_eq!(surface.global_alpha(), 1.0);
        surface.set_fill_style(Ink::white(1.0));
        surface.fill_rect(0.0, 0.0, 1.0, 1.0);
        assert_eq!(surface.texel(0, 0)[3], 255);
    }

    #[test]
    fn stroked_circle_touches_its_rim() {
        let mut surface = StampSurface::new(32, 32).expect("surface");
        surface.set_stroke_style(Ink::white(1.0));
        surface.set_line_width(2.0);
        surface.circle(16.0, 16.0, 8.0);
        assert!(surface.texel(24, 16)[3] > 0);
        assert_eq!(surface.texel(16, 16)[3], 0);
    }
}
