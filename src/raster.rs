// Software drawing into an ARGB FrameBuffer.
// Every renderer builds its look out of these: flat rects, discs, rings,
// filled polygons (voxel faces, rotated particles), additive glow and a
// tiny 5x7 bitmap font (ASCII glyphs + viewer HUD).

use crate::types::{FrameBuffer, Point, Rgb};

/// Circular clip region. Pixels whose centers fall outside are never touched.
#[derive(Debug, Clone, Copy)]
pub struct ClipDisk {
    pub center: Point,
    pub radius: f32,
}

impl ClipDisk {
    #[inline]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        let dx = x as f32 + 0.5 - self.center.x;
        let dy = y as f32 + 0.5 - self.center.y;
        dx * dx + dy * dy < self.radius * self.radius
    }
}

#[inline]
fn visible(clip: Option<&ClipDisk>, x: i32, y: i32) -> bool {
    clip.is_none_or(|c| c.contains(x, y))
}

/// Source-over one color at (x,y) with straight alpha.
/// Visual: the pixel takes on `color` by `alpha`; a transparent surface pixel
/// simply becomes `color` at that alpha.
#[inline]
pub fn blend_pixel(fb: &mut FrameBuffer, x: i32, y: i32, color: Rgb, alpha: f32) {
    if alpha <= 0.0 || x < 0 || y < 0 {
        return;
    }
    let (ux, uy) = (x as usize, y as usize);
    if ux >= fb.width || uy >= fb.height {
        return;
    }
    let idx = uy * fb.width + ux;
    let a = alpha.min(1.0);
    if a >= 1.0 {
        fb.pixels[idx] = color.to_argb(255);
        return;
    }

    let dst = fb.pixels[idx];
    let da = ((dst >> 24) & 0xFF) as f32 / 255.0;
    let out_a = a + da * (1.0 - a);
    if out_a <= 0.0 {
        fb.pixels[idx] = 0;
        return;
    }
    let d = Rgb::from_argb(dst);
    let ch = |s: u8, d: u8| ((s as f32 * a + d as f32 * da * (1.0 - a)) / out_a).round().clamp(0.0, 255.0) as u8;
    let out = Rgb::new(ch(color.r, d.r), ch(color.g, d.g), ch(color.b, d.b));
    fb.pixels[idx] = out.to_argb((out_a * 255.0).round() as u8);
}

/// Overwrite a pixel (no blending). Used by the lens renderers.
#[inline]
pub fn put_pixel(fb: &mut FrameBuffer, x: i32, y: i32, argb: u32) {
    if x < 0 || y < 0 {
        return;
    }
    let (x, y) = (x as usize, y as usize);
    if x >= fb.width || y >= fb.height {
        return;
    }
    fb.pixels[y * fb.width + x] = argb;
}

/// Additive blend (saturating) that also raises coverage.
/// Visual: light stacks until white, like a glowing LED halo.
#[inline]
fn add_pixel(fb: &mut FrameBuffer, x: i32, y: i32, color: Rgb, strength: f32) {
    if strength <= 0.0 || x < 0 || y < 0 {
        return;
    }
    let (ux, uy) = (x as usize, y as usize);
    if ux >= fb.width || uy >= fb.height {
        return;
    }
    let idx = uy * fb.width + ux;
    let old = fb.pixels[idx];
    let o = Rgb::from_argb(old);
    let oa = (old >> 24) & 0xFF;
    let add = |base: u8, c: u8| (base as u16 + (c as f32 * strength) as u16).min(255) as u8;
    let na = (oa + (255.0 * strength) as u32).min(255) as u8;
    fb.pixels[idx] = Rgb::new(add(o.r, color.r), add(o.g, color.g), add(o.b, color.b)).to_argb(na);
}

/// Axis-aligned rectangle with float coordinates snapped to pixel edges.
#[allow(clippy::too_many_arguments)]
pub fn fill_rect(
    fb: &mut FrameBuffer,
    x: f32,
    y: f32,
    w: f32,
    h: f32,
    color: Rgb,
    alpha: f32,
    clip: Option<&ClipDisk>,
) {
    if w <= 0.0 || h <= 0.0 {
        return;
    }
    let x0 = (x.round() as i32).max(0);
    let y0 = (y.round() as i32).max(0);
    let x1 = ((x + w).round() as i32).min(fb.width as i32);
    let y1 = ((y + h).round() as i32).min(fb.height as i32);
    for py in y0..y1 {
        for px in x0..x1 {
            if visible(clip, px, py) {
                blend_pixel(fb, px, py, color, alpha);
            }
        }
    }
}

/// Rectangle with circular corners of radius `r` (r=0 is a plain rect).
pub fn fill_rounded_rect(fb: &mut FrameBuffer, x: f32, y: f32, w: f32, h: f32, r: f32, color: Rgb, alpha: f32) {
    let r = r.min(w / 2.0).min(h / 2.0);
    if r < 0.5 {
        fill_rect(fb, x, y, w, h, color, alpha, None);
        return;
    }
    let x0 = (x.round() as i32).max(0);
    let y0 = (y.round() as i32).max(0);
    let x1 = ((x + w).round() as i32).min(fb.width as i32);
    let y1 = ((y + h).round() as i32).min(fb.height as i32);
    for py in y0..y1 {
        for px in x0..x1 {
            let cx = px as f32 + 0.5;
            let cy = py as f32 + 0.5;
            // distance to the nearest corner center, only inside the corner boxes
            let kx = if cx < x + r { x + r - cx } else if cx > x + w - r { cx - (x + w - r) } else { 0.0 };
            let ky = if cy < y + r { y + r - cy } else if cy > y + h - r { cy - (y + h - r) } else { 0.0 };
            if kx * kx + ky * ky <= r * r {
                blend_pixel(fb, px, py, color, alpha);
            }
        }
    }
}

/// Solid disc. Visual: LED dots, brick studs.
pub fn fill_disc(fb: &mut FrameBuffer, center: Point, radius: f32, color: Rgb, alpha: f32) {
    if radius <= 0.0 {
        return;
    }
    let r2 = radius * radius;
    let y0 = (center.y - radius).floor() as i32;
    let y1 = (center.y + radius).ceil() as i32;
    let x0 = (center.x - radius).floor() as i32;
    let x1 = (center.x + radius).ceil() as i32;
    for py in y0..=y1 {
        for px in x0..=x1 {
            let dx = px as f32 + 0.5 - center.x;
            let dy = py as f32 + 0.5 - center.y;
            if dx * dx + dy * dy <= r2 {
                blend_pixel(fb, px, py, color, alpha);
            }
        }
    }
}

/// Ring of the given stroke width centered on `radius`.
pub fn stroke_ring(fb: &mut FrameBuffer, center: Point, radius: f32, width: f32, color: Rgb, alpha: f32) {
    let inner = (radius - width / 2.0).max(0.0);
    let outer = radius + width / 2.0;
    let (i2, o2) = (inner * inner, outer * outer);
    let y0 = (center.y - outer).floor() as i32;
    let y1 = (center.y + outer).ceil() as i32;
    let x0 = (center.x - outer).floor() as i32;
    let x1 = (center.x + outer).ceil() as i32;
    for py in y0..=y1 {
        for px in x0..=x1 {
            let dx = px as f32 + 0.5 - center.x;
            let dy = py as f32 + 0.5 - center.y;
            let d2 = dx * dx + dy * dy;
            if d2 >= i2 && d2 <= o2 {
                blend_pixel(fb, px, py, color, alpha);
            }
        }
    }
}

/// Make every pixel inside the disk fully transparent.
/// Visual: punches a hole so whatever is underneath shows through.
pub fn clear_disc(fb: &mut FrameBuffer, clip: &ClipDisk) {
    let r = clip.radius;
    let y0 = ((clip.center.y - r).floor() as i32).max(0);
    let y1 = ((clip.center.y + r).ceil() as i32).min(fb.height as i32 - 1);
    let x0 = ((clip.center.x - r).floor() as i32).max(0);
    let x1 = ((clip.center.x + r).ceil() as i32).min(fb.width as i32 - 1);
    for py in y0..=y1 {
        for px in x0..=x1 {
            if clip.contains(px, py) {
                fb.pixels[py as usize * fb.width + px as usize] = 0;
            }
        }
    }
}

/// Scanline fill of a simple polygon (even-odd rule).
/// Visual: voxel top/side faces, rotated particle squares.
pub fn fill_polygon(fb: &mut FrameBuffer, pts: &[Point], color: Rgb, alpha: f32, clip: Option<&ClipDisk>) {
    if pts.len() < 3 || alpha <= 0.0 {
        return;
    }
    let ymin = pts.iter().map(|p| p.y).fold(f32::INFINITY, f32::min);
    let ymax = pts.iter().map(|p| p.y).fold(f32::NEG_INFINITY, f32::max);
    let y0 = (ymin.floor() as i32).max(0);
    let y1 = (ymax.ceil() as i32).min(fb.height as i32);

    let mut xs: Vec<f32> = Vec::with_capacity(pts.len());
    for py in y0..y1 {
        let sy = py as f32 + 0.5;
        xs.clear();
        for i in 0..pts.len() {
            let a = pts[i];
            let b = pts[(i + 1) % pts.len()];
            if (a.y <= sy && b.y > sy) || (b.y <= sy && a.y > sy) {
                let t = (sy - a.y) / (b.y - a.y);
                xs.push(a.x + t * (b.x - a.x));
            }
        }
        xs.sort_by(|a, b| a.total_cmp(b));
        for span in xs.chunks_exact(2) {
            let xa = ((span[0] - 0.5).ceil() as i32).max(0);
            let xb = ((span[1] - 0.5).floor() as i32).min(fb.width as i32 - 1);
            for px in xa..=xb {
                if visible(clip, px, py) {
                    blend_pixel(fb, px, py, color, alpha);
                }
            }
        }
    }
}

/// Soft round glow with Gaussian falloff, blended additively.
/// Visual: a fuzzy halo of light around an LED.
pub fn add_glow_disc(fb: &mut FrameBuffer, center: Point, radius: f32, color: Rgb, strength: f32) {
    if radius <= 0.0 || strength <= 0.0 {
        return;
    }
    let r = radius.ceil() as i32;
    let r2 = radius * radius;
    let sigma = radius * 0.5;
    let denom = 2.0 * sigma * sigma;
    let (cx, cy) = (center.x.floor() as i32, center.y.floor() as i32);
    for y in (cy - r)..=(cy + r) {
        for x in (cx - r)..=(cx + r) {
            let dx = x as f32 + 0.5 - center.x;
            let dy = y as f32 + 0.5 - center.y;
            let d2 = dx * dx + dy * dy;
            if d2 > r2 {
                continue;
            }
            add_pixel(fb, x, y, color, (-d2 / denom).exp() * strength);
        }
    }
}

/// Bresenham line, 1 pixel wide, opaque.
pub fn draw_line(fb: &mut FrameBuffer, x0: i32, y0: i32, x1: i32, y1: i32, color: Rgb) {
    let (mut x0, mut y0) = (x0, y0);
    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    loop {
        blend_pixel(fb, x0, y0, color, 1.0);
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

/// Small "+" with a gap at the center.
/// Visual: marks where the viewer thinks the pointer is.
pub fn draw_crosshair(fb: &mut FrameBuffer, cx: i32, cy: i32, size: i32, color: Rgb) {
    draw_line(fb, cx - size, cy, cx - 2, cy, color);
    draw_line(fb, cx + 2, cy, cx + size, cy, color);
    draw_line(fb, cx, cy - size, cx, cy - 2, color);
    draw_line(fb, cx, cy + 2, cx, cy + size, color);
    blend_pixel(fb, cx, cy, color, 1.0);
}

/// Composite an overlay onto an opaque base at the given overall opacity.
/// Visual: what the page shows when the canvas sits above the <img>.
pub fn composite_over(base: &mut FrameBuffer, overlay: &FrameBuffer, opacity: f32) {
    if opacity <= 0.0 || base.width != overlay.width || base.height != overlay.height {
        return;
    }
    for (i, &px) in overlay.pixels.iter().enumerate() {
        let a = ((px >> 24) & 0xFF) as f32 / 255.0 * opacity.min(1.0);
        if a <= 0.0 {
            continue;
        }
        let s = Rgb::from_argb(px);
        let d = Rgb::from_argb(base.pixels[i]);
        let ch = |s: u8, d: u8| (s as f32 * a + d as f32 * (1.0 - a)).round() as u8;
        base.pixels[i] = Rgb::new(ch(s.r, d.r), ch(s.g, d.g), ch(s.b, d.b)).to_argb(255);
    }
}

/* ---------- 5x7 bitmap font: ASCII ramp characters + HUD subset ---------- */

/// Return a 5x7 glyph bitmap. Each u8 is a row; bit 4 is the leftmost pixel.
pub fn glyph5x7(ch: char) -> Option<[u8; 7]> {
    macro_rules! g { ($a:expr,$b:expr,$c:expr,$d:expr,$e:expr,$f:expr,$g:expr) => {
        Some([$a,$b,$c,$d,$e,$f,$g])
    }; }

    match ch.to_ascii_uppercase() {
        '0' => g!(0b01110,0b10001,0b10011,0b10101,0b11001,0b10001,0b01110),
        '1' => g!(0b00100,0b01100,0b00100,0b00100,0b00100,0b00100,0b01110),
        '2' => g!(0b01110,0b10001,0b00001,0b00010,0b00100,0b01000,0b11111),
        '3' => g!(0b11110,0b00001,0b00001,0b01110,0b00001,0b00001,0b11110),
        '4' => g!(0b00010,0b00110,0b01010,0b10010,0b11111,0b00010,0b00010),
        '5' => g!(0b11111,0b10000,0b11110,0b00001,0b00001,0b10001,0b01110),
        '6' => g!(0b00110,0b01000,0b10000,0b11110,0b10001,0b10001,0b01110),
        '7' => g!(0b11111,0b00001,0b00010,0b00100,0b01000,0b01000,0b01000),
        '8' => g!(0b01110,0b10001,0b10001,0b01110,0b10001,0b10001,0b01110),
        '9' => g!(0b01110,0b10001,0b10001,0b01111,0b00001,0b00010,0b01100),

        'A' => g!(0b01110,0b10001,0b10001,0b11111,0b10001,0b10001,0b10001),
        'B' => g!(0b11110,0b10001,0b10001,0b11110,0b10001,0b10001,0b11110),
        'C' => g!(0b01110,0b10001,0b10000,0b10000,0b10000,0b10001,0b01110),
        'D' => g!(0b11100,0b10010,0b10001,0b10001,0b10001,0b10010,0b11100),
        'E' => g!(0b11111,0b10000,0b10000,0b11110,0b10000,0b10000,0b11111),
        'F' => g!(0b11111,0b10000,0b10000,0b11110,0b10000,0b10000,0b10000),
        'G' => g!(0b01110,0b10001,0b10000,0b10111,0b10001,0b10001,0b01111),
        'I' => g!(0b01110,0b00100,0b00100,0b00100,0b00100,0b00100,0b01110),
        'K' => g!(0b10001,0b10010,0b10100,0b11000,0b10100,0b10010,0b10001),
        'L' => g!(0b10000,0b10000,0b10000,0b10000,0b10000,0b10000,0b11111),
        'M' => g!(0b10001,0b11011,0b10101,0b10101,0b10001,0b10001,0b10001),
        'N' => g!(0b10001,0b11001,0b10101,0b10011,0b10001,0b10001,0b10001),
        'O' => g!(0b01110,0b10001,0b10001,0b10001,0b10001,0b10001,0b01110),
        'P' => g!(0b11110,0b10001,0b10001,0b11110,0b10000,0b10000,0b10000),
        'R' => g!(0b11110,0b10001,0b10001,0b11110,0b10100,0b10010,0b10001),
        'S' => g!(0b01111,0b10000,0b10000,0b01110,0b00001,0b00001,0b11110),
        'T' => g!(0b11111,0b00100,0b00100,0b00100,0b00100,0b00100,0b00100),
        'U' => g!(0b10001,0b10001,0b10001,0b10001,0b10001,0b10001,0b01110),
        'X' => g!(0b10001,0b10001,0b01010,0b00100,0b01010,0b10001,0b10001),
        'Z' => g!(0b11111,0b00001,0b00010,0b00100,0b01000,0b10000,0b11111),

        // ASCII-art ramp, densest first
        '█' => g!(0b11111,0b11111,0b11111,0b11111,0b11111,0b11111,0b11111),
        '@' => g!(0b01110,0b10001,0b10111,0b10101,0b10111,0b10000,0b01110),
        '%' => g!(0b11000,0b11001,0b00010,0b00100,0b01000,0b10011,0b00011),
        '#' => g!(0b01010,0b01010,0b11111,0b01010,0b11111,0b01010,0b01010),
        '*' => g!(0b00000,0b10101,0b01110,0b11111,0b01110,0b10101,0b00000),
        '+' => g!(0b00000,0b00100,0b00100,0b11111,0b00100,0b00100,0b00000),
        '=' => g!(0b00000,0b00000,0b11111,0b00000,0b11111,0b00000,0b00000),
        '-' => g!(0b00000,0b00000,0b00000,0b11111,0b00000,0b00000,0b00000),
        ':' => g!(0b00000,0b00100,0b00000,0b00000,0b00100,0b00000,0b00000),
        '.' => g!(0b00000,0b00000,0b00000,0b00000,0b00000,0b00100,0b00000),
        '|' => g!(0b00100,0b00100,0b00100,0b00100,0b00100,0b00100,0b00100),
        ' ' => g!(0b00000,0b00000,0b00000,0b00000,0b00000,0b00000,0b00000),

        _ => None,
    }
}

/// Draw one glyph centered at `center`, each font pixel a `scale` x `scale` block.
/// With `shadow`, a black copy is laid down first, offset by one font pixel.
pub fn draw_glyph(fb: &mut FrameBuffer, center: Point, ch: char, scale: u32, color: Rgb, alpha: f32, shadow: bool) {
    let Some(rows) = glyph5x7(ch) else { return };
    let s = scale.max(1) as f32;
    let left = center.x - 2.5 * s;
    let top = center.y - 3.5 * s;

    let mut pass = |ox: f32, oy: f32, c: Rgb, a: f32| {
        for (ry, rowbits) in rows.iter().enumerate() {
            for rx in 0..5 {
                if (rowbits & (1 << (4 - rx))) != 0 {
                    fill_rect(fb, left + rx as f32 * s + ox, top + ry as f32 * s + oy, s, s, c, a, None);
                }
            }
        }
    };
    if shadow {
        pass(s, s, Rgb::BLACK, alpha * 0.8);
    }
    pass(0.0, 0.0, color, alpha);
}

/// Draw a text string with 5x7 glyphs from its top-left corner.
/// Visual: compact HUD text with a 1-pixel black shadow.
pub fn draw_text_5x7(fb: &mut FrameBuffer, x: i32, y: i32, text: &str, color: Rgb) {
    let mut cx = x as f32 + 2.5;
    for ch in text.chars() {
        draw_glyph(fb, Point::new(cx, y as f32 + 3.5), ch, 1, color, 1.0, true);
        cx += 6.0; // 5 pixels glyph width + 1 pixel spacing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alpha_at(fb: &FrameBuffer, x: usize, y: usize) -> u32 {
        fb.pixels[y * fb.width + x] >> 24
    }

    #[test]
    fn test_blend_on_transparent_takes_color_and_alpha() {
        let mut fb = FrameBuffer::new(2, 2);
        blend_pixel(&mut fb, 0, 0, Rgb::new(200, 10, 10), 0.5);
        let px = fb.pixels[0];
        assert_eq!(Rgb::from_argb(px), Rgb::new(200, 10, 10));
        assert_eq!(px >> 24, 128);
    }

    #[test]
    fn test_fill_rect_respects_clip() {
        let mut fb = FrameBuffer::new(20, 20);
        let clip = ClipDisk { center: Point::new(0.0, 0.0), radius: 5.0 };
        fill_rect(&mut fb, 0.0, 0.0, 20.0, 20.0, Rgb::WHITE, 1.0, Some(&clip));
        assert_eq!(alpha_at(&fb, 1, 1), 255);
        assert_eq!(alpha_at(&fb, 10, 10), 0);
    }

    #[test]
    fn test_fill_polygon_covers_square_interior() {
        let mut fb = FrameBuffer::new(10, 10);
        let sq = [Point::new(2.0, 2.0), Point::new(6.0, 2.0), Point::new(6.0, 6.0), Point::new(2.0, 6.0)];
        fill_polygon(&mut fb, &sq, Rgb::WHITE, 1.0, None);
        assert_eq!(alpha_at(&fb, 3, 3), 255);
        assert_eq!(alpha_at(&fb, 5, 5), 255);
        assert_eq!(alpha_at(&fb, 6, 6), 0);
        assert_eq!(alpha_at(&fb, 1, 3), 0);
    }

    #[test]
    fn test_clear_disc_only_clears_inside() {
        let mut fb = FrameBuffer::new(10, 10);
        fill_rect(&mut fb, 0.0, 0.0, 10.0, 10.0, Rgb::WHITE, 1.0, None);
        clear_disc(&mut fb, &ClipDisk { center: Point::new(5.0, 5.0), radius: 2.0 });
        assert_eq!(alpha_at(&fb, 5, 5), 0);
        assert_eq!(alpha_at(&fb, 0, 0), 255);
    }

    #[test]
    fn test_composite_over_ignores_transparent_overlay() {
        let mut base = FrameBuffer::new(2, 1);
        base.pixels = vec![Rgb::new(1, 2, 3).to_argb(255); 2];
        let mut over = FrameBuffer::new(2, 1);
        over.pixels[1] = Rgb::WHITE.to_argb(255);
        composite_over(&mut base, &over, 1.0);
        assert_eq!(Rgb::from_argb(base.pixels[0]), Rgb::new(1, 2, 3));
        assert_eq!(Rgb::from_argb(base.pixels[1]), Rgb::WHITE);
    }

    #[test]
    fn test_default_ramp_has_glyphs() {
        for ch in ['█', '@', '%', '#', '*', '+', '=', '-', ':', '.', ' '] {
            assert!(glyph5x7(ch).is_some(), "missing glyph for {ch:?}");
        }
    }
}
