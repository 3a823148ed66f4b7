// Pseudo-3D styles: voxel blocks and bricks. Nothing is retained between
// frames; elevation and bevels come from the influence every time.

use crate::cursor::Cursor;
use crate::influence::Falloff;
use crate::params::LegoOptions;
use crate::raster::{fill_disc, fill_polygon, fill_rect, fill_rounded_rect, stroke_ring};
use crate::types::{Cell, FrameBuffer, Point, Rgb};

/// Move each channel toward white (`p > 0`) or black (`p < 0`) by `|p|` of
/// the remaining headroom.
pub fn shade(c: Rgb, p: f32) -> Rgb {
    let t = if p > 0.0 { 255.0 } else { 0.0 };
    let k = p.abs();
    let ch = |v: u8| (v as f32 + ((t - v as f32) * k).round()).clamp(0.0, 255.0) as u8;
    Rgb::new(ch(c.r), ch(c.g), ch(c.b))
}

/// Brick tint: scale every channel by `1 + k`, clamped.
pub fn tint(c: Rgb, k: f32) -> Rgb {
    let ch = |v: u8| (v as f32 * (1.0 + k)).clamp(0.0, 255.0) as u8;
    Rgb::new(ch(c.r), ch(c.g), ch(c.b))
}

const EXTRUSION: f32 = 0.7;
const VOXEL_TOP: f32 = 0.25;
const VOXEL_SIDE: f32 = -0.25;

/// Visual: every block near the cursor lifts off the image as a little cube
/// with a lit top face and a shaded right face; the closer, the higher.
pub fn draw_voxels(fb: &mut FrameBuffer, cells: &[Cell], block: u32, falloff: &Falloff, cursor: &Cursor) {
    if !cursor.active {
        return;
    }
    let size = block as f32;
    let half = size / 2.0;
    for cell in cells {
        let Some(eased) = falloff.at_point(cell.pos, cursor.pos) else { continue };
        let (x, y) = (cell.pos.x, cell.pos.y - eased * size * EXTRUSION);

        fill_rect(fb, x, y, size, size, cell.rgb, eased, None);

        let top = [
            Point::new(x, y),
            Point::new(x + half, y - half),
            Point::new(x + size + half, y - half),
            Point::new(x + size, y),
        ];
        fill_polygon(fb, &top, shade(cell.rgb, VOXEL_TOP), eased, None);

        let side = [
            Point::new(x + size, y),
            Point::new(x + size + half, y - half),
            Point::new(x + size + half, y + size - half),
            Point::new(x + size, y + size),
        ];
        fill_polygon(fb, &side, shade(cell.rgb, VOXEL_SIDE), eased, None);
    }
}

const MORTAR: Rgb = Rgb::new(35, 35, 35);

/// Visual: a beveled brick with mortar seams on the top/left and a round
/// stud in the middle (drop shadow, base, rim, lit top, highlight dot).
pub fn draw_brick(fb: &mut FrameBuffer, cell: &Cell, opts: &LegoOptions, alpha: f32) {
    let s = opts.block_size as f32;
    let g = (opts.gap as f32).min(s / 2.0);
    let d = opts.depth;
    let (x, y, rgb) = (cell.pos.x, cell.pos.y, cell.rgb);
    let inner = s - 2.0 * g;
    let corner = g.min(opts.soft_edge / 30.0);

    fill_rounded_rect(fb, x + g, y + g, inner, inner, corner, tint(rgb, d), alpha);
    fill_rect(fb, x + s - g, y + g, g, inner, tint(rgb, -d), alpha, None);
    fill_rect(fb, x + g, y + s - g, inner, g, tint(rgb, -d * 1.2), alpha, None);

    fill_rect(fb, x, y, s, g, MORTAR, alpha, None);
    fill_rect(fb, x, y, g, s, MORTAR, alpha, None);

    let stud_r = opts.stud_scale * s * 0.5;
    if stud_r <= 0.0 {
        return;
    }
    let mid = Point::new(x + s / 2.0, y + s / 2.0);
    fill_disc(fb, mid, stud_r + 1.0, Rgb::BLACK, 0.2 * alpha);
    fill_disc(fb, mid, stud_r, tint(rgb, -d * 0.3), alpha);
    stroke_ring(fb, mid, stud_r, (s / 24.0).max(1.0), tint(rgb, -d * 0.4), alpha);
    fill_disc(fb, mid, stud_r * 0.8, tint(rgb, d * 0.5), alpha);
    let dot = Point::new(mid.x - stud_r * 0.2, mid.y - stud_r * 0.2);
    fill_disc(fb, dot, stud_r * 0.25, tint(rgb, d * 2.0), alpha);
}

pub fn draw_bricks(fb: &mut FrameBuffer, cells: &[Cell], opts: &LegoOptions, falloff: &Falloff, cursor: &Cursor) {
    if !cursor.active {
        return;
    }
    for cell in cells {
        if let Some(alpha) = falloff.at_point(cell.pos, cursor.pos) {
            draw_brick(fb, cell, opts, alpha);
        }
    }
}
