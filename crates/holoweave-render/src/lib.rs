//! Frame composition for holoweave: nearest-neighbour upscale, holo sheen and PNG export.

use std::io::Cursor;

use anyhow::{Context, Result, anyhow};
use holoweave_core::{Engine, Hsl, MovementMode, RenderTarget};
use image::{ImageBuffer, Rgba};
use tiny_skia::{
    BlendMode, Color, GradientStop, LinearGradient, Paint, Pixmap, Point, Rect, SpreadMode,
    Transform,
};
use tracing::info;

/// Side length of the default square export.
pub const DEFAULT_EXPORT_SIZE: u32 = 3000;
/// Opacity of the sheen layer.
pub const SHEEN_OPACITY: f32 = 0.04;

/// One gradient stop of the sheen, straight alpha.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SheenStop {
    pub offset: f32,
    pub color: Hsl,
    pub alpha: f32,
}

/// Linear gradient laid over the frame at wall-clock time `seconds`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sheen {
    pub start: (f32, f32),
    pub end: (f32, f32),
    pub stops: [SheenStop; 3],
}

impl Sheen {
    /// Sheen for a `width x height` surface tinted from `background`.
    ///
    /// Endpoints and the middle stop alpha drift with time; hues sit at
    /// +30, +170 and +290 degrees from the background.
    #[must_use]
    pub fn at(background: Hsl, width: u32, height: u32, seconds: f64) -> Self {
        let t = seconds;
        let (w, h) = (f64::from(width), f64::from(height));
        let mid_alpha = 0.25 + 0.25 * (t * 0.22).sin();
        let start = (
            (w * (0.15 + 0.25 * (t * 0.17).sin())) as f32,
            (h * (0.2 + 0.25 * (t * 0.19).cos())) as f32,
        );
        let end = (
            (w * (0.85 + 0.18 * (t * 0.13).cos())) as f32,
            (h * (0.8 + 0.18 * (t * 0.15).sin())) as f32,
        );
        let Hsl { h: hue, s, l } = background;
        let tone = |shift: f64, ds: f64, s_max: f64, dl: f64, l_max: f64| {
            Hsl::new(
                (hue + shift) % 360.0,
                (s + ds).clamp(8.0, s_max),
                (l + dl).clamp(10.0, l_max),
            )
        };
        Self {
            start,
            end,
            stops: [
                SheenStop {
                    offset: 0.0,
                    color: tone(30.0, 22.0, 70.0, 40.0, 72.0),
                    alpha: 1.0,
                },
                SheenStop {
                    offset: 0.5,
                    color: tone(170.0, 26.0, 80.0, 30.0, 66.0),
                    alpha: mid_alpha as f32,
                },
                SheenStop {
                    offset: 1.0,
                    color: tone(290.0, 18.0, 70.0, 38.0, 70.0),
                    alpha: 1.0,
                },
            ],
        }
    }

    /// Screen-blend this sheen over `pixmap` at [`SHEEN_OPACITY`].
    pub fn apply(&self, pixmap: &mut Pixmap) {
        let stops = self
            .stops
            .iter()
            .map(|stop| {
                let rgb = stop.color.to_rgb();
                let alpha = (stop.alpha * SHEEN_OPACITY).clamp(0.0, 1.0);
                let mut color = Color::from_rgba8(rgb.r, rgb.g, rgb.b, 255);
                color.apply_opacity(alpha);
                GradientStop::new(stop.offset, color)
            })
            .collect();
        let Some(shader) = LinearGradient::new(
            Point::from_xy(self.start.0, self.start.1),
            Point::from_xy(self.end.0, self.end.1),
            stops,
            SpreadMode::Pad,
            Transform::identity(),
        ) else {
            return;
        };
        let Some(rect) = Rect::from_xywh(0.0, 0.0, pixmap.width() as f32, pixmap.height() as f32)
        else {
            return;
        };
        let paint = Paint {
            shader,
            blend_mode: BlendMode::Screen,
            anti_alias: false,
            ..Paint::default()
        };
        pixmap.fill_rect(rect, &paint, Transform::identity(), None);
    }
}

/// Compose a displayable frame: upscaled buffer plus sheen, RGBA8.
pub fn compose_frame(
    target: &RenderTarget<'_>,
    out_w: u32,
    out_h: u32,
    seconds: f64,
) -> Result<Vec<u8>> {
    let mut pixmap =
        Pixmap::new(out_w, out_h).ok_or_else(|| anyhow!("cannot allocate {out_w}x{out_h} frame"))?;
    let scaled = target.upscale(out_w, out_h);
    if scaled.len() != pixmap.data().len() {
        return Err(anyhow!("scaled frame does not match {out_w}x{out_h}"));
    }
    // The buffer is always opaque, so straight and premultiplied bytes agree.
    pixmap.data_mut().copy_from_slice(&scaled);
    Sheen::at(target.background, out_w, out_h, seconds).apply(&mut pixmap);
    Ok(pixmap.take())
}

/// Encode the current engine frame as a PNG at `width x height`.
pub fn render_png_offscreen(engine: &Engine, width: u32, height: u32, seconds: f64) -> Result<Vec<u8>> {
    let width = width.max(1);
    let height = height.max(1);
    let rgba = compose_frame(&engine.render_target(), width, height, seconds)?;
    let image = ImageBuffer::<Rgba<u8>, Vec<u8>>::from_raw(width, height, rgba)
        .ok_or_else(|| anyhow!("frame buffer does not match {width}x{height}"))?;

    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .context("encode png")?;
    info!(width, height, bytes = bytes.len(), "rendered png");
    Ok(bytes)
}

/// `<move-slug>-<palette-slug>-<W>x<H>-<unix-millis>.png`
#[must_use]
pub fn export_file_name(
    movement: MovementMode,
    palette_slug: &str,
    width: u32,
    height: u32,
    unix_millis: u128,
) -> String {
    format!("{movement}-{palette_slug}-{width}x{height}-{unix_millis}.png")
}
