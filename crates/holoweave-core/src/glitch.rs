//! Raw-byte glitch transforms applied straight to the pixel buffer.

use crate::buffer::PixelBuffer;
use crate::palette::PaletteManager;
use crate::rng::EngineRng;

const FLARE_CHANCE: f64 = 0.65;

/// `max(lo, min(hi, v))`; the lower bound wins when the range is inverted.
pub(crate) fn clamp_low(v: i32, lo: i32, hi: i32) -> i32 {
    lo.max(hi.min(v))
}

/// Copy a random block a short distance away and optionally flare its edges.
///
/// Returns the destination rectangle `(x, y, w, h)` when a copy happened.
pub fn block_copy(
    buffer: &mut PixelBuffer,
    palette: &PaletteManager,
    rng: &mut EngineRng,
) -> Option<(i32, i32, i32, i32)> {
    let (w, h) = (buffer.width() as i32, buffer.height() as i32);
    if w < 8 || h < 8 {
        return None;
    }

    let bw = clamp_low(
        (rng.next_f64() * f64::from(w)) as i32,
        6,
        (f64::from(w) * 0.28).floor() as i32,
    );
    let bh = clamp_low(
        (rng.next_f64() * f64::from(h)) as i32,
        4,
        (f64::from(h) * 0.18).floor() as i32,
    );
    let sx = (rng.next_f64() * f64::from(w - bw)) as i32;
    let sy = (rng.next_f64() * f64::from(h - bh)) as i32;
    let dx = clamp_low(sx + (rng.next_f64() * 26.0 - 13.0) as i32, 0, w - bw);
    let dy = clamp_low(sy + (rng.next_f64() * 18.0 - 9.0) as i32, 0, h - bh);

    let stride = w as usize * 4;
    let span = bw as usize * 4;
    let data = buffer.data_mut();
    for row in 0..bh as usize {
        let src = (sy as usize + row) * stride + sx as usize * 4;
        let dst = (dy as usize + row) * stride + dx as usize * 4;
        data.copy_within(src..src + span, dst);
    }

    if rng.chance(FLARE_CHANCE) {
        let color = palette.weighted_color(rng);
        for k in 0..bw {
            buffer.blend(dx + k, dy, color, 0.25);
            buffer.blend(dx + k, dy + bh - 1, color, 0.18);
        }
    }
    Some((dx, dy, bw, bh))
}

/// Circularly shift 2..7 random rows by up to 18 cells either way.
///
/// Returns how many rows actually moved.
pub fn row_shift(buffer: &mut PixelBuffer, rng: &mut EngineRng) -> usize {
    let (w, h) = (buffer.width(), buffer.height());
    let rows = 2 + (rng.next_f64() * 6.0) as usize;
    let stride = w as usize * 4;
    let mut shifted = 0;
    for _ in 0..rows {
        let y = (rng.next_f64() * f64::from(h)) as usize;
        let shift = ((rng.next_f64() * 36.0 - 18.0) as i64) * 4;
        if shift == 0 {
            continue;
        }
        let start = y * stride;
        let row = &mut buffer.data_mut()[start..start + stride];
        row.rotate_right(shift.rem_euclid(stride as i64) as usize);
        shifted += 1;
    }
    shifted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::Rgb;

    fn gradient(w: u32, h: u32) -> PixelBuffer {
        let mut buffer = PixelBuffer::new(w, h).expect("buffer");
        for y in 0..h as i32 {
            for x in 0..w as i32 {
                buffer.set(x, y, Rgb::new(x as u8, y as u8, 7), 255);
            }
        }
        buffer
    }

    #[test]
    fn tiny_buffers_are_left_alone() {
        let mut rng = EngineRng::seeded("tiny");
        let palette = PaletteManager::new();
        let mut buffer = gradient(7, 20);
        let before = buffer.clone();
        assert_eq!(block_copy(&mut buffer, &palette, &mut rng), None);
        assert_eq!(buffer, before);
        assert_eq!(rng.draws(), 0);
    }

    #[test]
    fn block_copy_stays_in_bounds_and_opaque() {
        let mut rng = EngineRng::seeded("blocks");
        let palette = PaletteManager::new();
        let mut buffer = gradient(100, 80);
        for _ in 0..200 {
            let (x, y, bw, bh) = block_copy(&mut buffer, &palette, &mut rng).expect("copied");
            assert!(x >= 0 && y >= 0);
            assert!(x + bw <= 100 && y + bh <= 80);
            assert!((6..=28).contains(&bw));
            assert!((4..=14).contains(&bh));
        }
        assert!(buffer.data().chunks_exact(4).all(|px| px[3] == 255));
    }

    #[test]
    fn row_shift_rotates_whole_pixels() {
        let mut rng = EngineRng::seeded("rows");
        let mut buffer = gradient(64, 64);
        for _ in 0..20 {
            row_shift(&mut buffer, &mut rng);
        }
        for y in 0..64 {
            let mut xs: Vec<u8> = (0..64).map(|x| buffer.get(x, y).0.r).collect();
            assert!((0..64).all(|x| buffer.get(x, y).0.g == y as u8));
            xs.sort_unstable();
            assert_eq!(xs, (0..64).collect::<Vec<u8>>());
        }
        assert!(buffer.data().chunks_exact(4).all(|px| px[3] == 255));
    }
}
