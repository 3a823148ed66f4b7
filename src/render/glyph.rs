// ASCII style: brightness -> ramp character, perturbed by a glitch wave.
// Visual: near the cursor the image dissolves into a shimmering grid of
// characters on dark chips; darker areas pick earlier ramp entries.

use std::time::Duration;

use crate::blur::box_blur;
use crate::cursor::Cursor;
use crate::influence::Falloff;
use crate::params::{AsciiOptions, GlyphQuality};
use crate::raster::{blend_pixel, draw_glyph, fill_rect};
use crate::types::{Cell, FrameBuffer, Point, Rgb};

const GLITCH_TICK_MS: f32 = 150.0;
const BASE_GLITCH_SPEED: f32 = 0.5;
const BACKDROP_BLUR: usize = 3;
const HIGHLIGHT_LUMA: f32 = 180.0;

/// Glitch clock: at the default speed it advances one radian every 150 ms.
pub fn glitch_time(now: Duration, glitch_speed: f32) -> f32 {
    now.as_secs_f32() * 1000.0 / GLITCH_TICK_MS * (glitch_speed / BASE_GLITCH_SPEED)
}

pub fn glitch(time: f32, col: u32, row: u32, intensity: f32) -> f32 {
    (time + (col as f32 * row as f32) / 1000.0).sin() * intensity
}

/// Ramp index for a brightness in 0..=255. Brightness is inverted, so
/// black picks the last ramp entry and white the first.
pub fn glyph_index(brightness: f32, glitch: f32, ramp_len: usize) -> usize {
    if ramp_len <= 1 {
        return 0;
    }
    let adjusted = 255.0 - brightness + glitch;
    let idx = ((adjusted / 255.0) * (ramp_len - 1) as f32).floor();
    (idx.max(0.0) as usize).min(ramp_len - 1)
}

/// Font pixel size for a glyph cell of `size` px.
fn glyph_scale(size: u32) -> u32 {
    (size / 8).max(1)
}

/// Blurred, darkened copy of the source for the enhanced backdrop.
/// Built lazily the first time the enhanced tier draws.
#[derive(Debug, Clone, Default)]
pub struct GlyphBackdrop {
    depth: Option<FrameBuffer>,
}

impl GlyphBackdrop {
    fn depth_for(&mut self, source: &FrameBuffer) -> &FrameBuffer {
        let stale = self.depth.as_ref().is_none_or(|d| d.width != source.width || d.height != source.height);
        if stale {
            let mut tmp = FrameBuffer::new(0, 0);
            let mut out = FrameBuffer::new(0, 0);
            box_blur(source, &mut tmp, &mut out, BACKDROP_BLUR);
            for px in out.pixels.iter_mut() {
                let c = Rgb::from_argb(*px);
                let dark = Rgb::new(c.r / 3, c.g / 3, c.b / 3);
                *px = dark.to_argb(255);
            }
            self.depth = Some(out);
        }
        self.depth.get_or_insert_with(|| FrameBuffer::new(0, 0))
    }

    /// Visual: a dim, soft version of the picture inside the glyph disk so
    /// characters seem to float above it.
    fn draw(&mut self, fb: &mut FrameBuffer, source: &FrameBuffer, falloff: &Falloff, cursor: Point) {
        let depth = self.depth_for(source);
        let reach = falloff.reach();
        let y0 = ((cursor.y - reach).floor() as i32).max(0);
        let y1 = ((cursor.y + reach).ceil() as i32).min(fb.height as i32);
        let x0 = ((cursor.x - reach).floor() as i32).max(0);
        let x1 = ((cursor.x + reach).ceil() as i32).min(fb.width as i32);
        for y in y0..y1 {
            for x in x0..x1 {
                let p = Point::new(x as f32 + 0.5, y as f32 + 0.5);
                let Some(a) = falloff.at_point(p, cursor) else { continue };
                if let Some(px) = depth.get(x, y) {
                    blend_pixel(fb, x, y, Rgb::from_argb(px), a * 0.85);
                }
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
pub fn draw_glyphs(
    fb: &mut FrameBuffer,
    cells: &[Cell],
    source: Option<&FrameBuffer>,
    opts: &AsciiOptions,
    falloff: &Falloff,
    cursor: &Cursor,
    now: Duration,
    backdrop: &mut GlyphBackdrop,
) {
    if !cursor.active || opts.chars.is_empty() {
        return;
    }
    let enhanced = opts.quality == GlyphQuality::Enhanced;
    if enhanced && let Some(src) = source {
        backdrop.draw(fb, src, falloff, cursor.pos);
    }

    let time = glitch_time(now, opts.glitch_speed);
    let size = opts.size as f32;
    let scale = glyph_scale(opts.size);
    let chip = if enhanced { 0.6 } else { 0.8 };

    for cell in cells {
        let Some(alpha) = falloff.at_point(cell.pos, cursor.pos) else { continue };
        let brightness = if enhanced { cell.rgb.luma() } else { cell.rgb.brightness() };
        let g = glitch(time, cell.col, cell.row, opts.glitch_intensity);
        let ch = opts.chars[glyph_index(brightness, g, opts.chars.len())];
        let color = if opts.colored { cell.rgb } else { Rgb::WHITE };

        fill_rect(fb, cell.pos.x - size / 2.0, cell.pos.y - size / 2.0, size, size, Rgb::BLACK, alpha * chip, None);
        draw_glyph(fb, cell.pos, ch, scale, color, alpha, enhanced);

        if enhanced && brightness > HIGHLIGHT_LUMA {
            let lift = Point::new(cell.pos.x - 1.0, cell.pos.y - 1.0);
            draw_glyph(fb, lift, ch, scale, Rgb::WHITE, alpha * 0.35, false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::DEFAULT_RAMP;

    #[test]
    fn test_index_inverts_brightness() {
        let n = DEFAULT_RAMP.len();
        assert_eq!(glyph_index(255.0, 0.0, n), 0);
        assert_eq!(glyph_index(0.0, 0.0, n), n - 1);
        assert_eq!(glyph_index(127.5, 0.0, n), 5);
    }

    #[test]
    fn test_index_is_clamped_under_glitch() {
        assert_eq!(glyph_index(0.0, 50.0, 4), 3);
        assert_eq!(glyph_index(255.0, -50.0, 4), 0);
        assert_eq!(glyph_index(100.0, 0.0, 1), 0);
    }

    #[test]
    fn test_glitch_is_bounded_and_moves() {
        let a = glitch(glitch_time(Duration::from_millis(0), 0.5), 3, 4, 3.0);
        let b = glitch(glitch_time(Duration::from_millis(300), 0.5), 3, 4, 3.0);
        assert!(a.abs() <= 3.0 && b.abs() <= 3.0);
        assert_ne!(a, b);
        // default speed: one radian per 150 ms
        assert!((glitch_time(Duration::from_millis(150), 0.5) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_chip_and_glyph_near_cursor_only() {
        let mut fb = FrameBuffer::new(64, 16);
        let opts = AsciiOptions { glitch_intensity: 0.0, ..Default::default() };
        let cells = [
            Cell { pos: Point::new(8.0, 8.0), col: 0, row: 0, rgb: Rgb::BLACK },
            Cell { pos: Point::new(56.0, 8.0), col: 3, row: 0, rgb: Rgb::BLACK },
        ];
        let cursor = Cursor { pos: Point::new(8.0, 8.0), active: true };
        let falloff = Falloff::new(0.0, 20.0, 1.0);
        draw_glyphs(&mut fb, &cells, None, &opts, &falloff, &cursor, Duration::ZERO, &mut GlyphBackdrop::default());
        // black cell -> last ramp entry (space): only the chip is drawn
        assert_eq!(fb.pixels[8 * 64 + 8] >> 24, 204);
        assert_eq!(fb.pixels[8 * 64 + 56], 0);
    }
}
