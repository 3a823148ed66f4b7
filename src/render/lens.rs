// Per-pixel lenses. These read the source image directly instead of a cell
// list, so a tainted source means nothing is drawn.

use crate::blur::box_blur;
use crate::cursor::Cursor;
use crate::gamma::GammaLut;
use crate::influence::Falloff;
use crate::params::ZoomOptions;
use crate::raster::{put_pixel, stroke_ring};
use crate::types::{FrameBuffer, Point, Rgb};

const RING_WIDTH: f32 = 2.0;
const RING_ALPHA: f32 = 0.3;

/// Pixel rows/cols a disk of `r` around `c` touches, clipped to the buffer.
fn disk_bounds(fb: &FrameBuffer, c: Point, r: f32) -> (i32, i32, i32, i32) {
    let x0 = ((c.x - r).floor() as i32).max(0);
    let y0 = ((c.y - r).floor() as i32).max(0);
    let x1 = ((c.x + r).ceil() as i32).min(fb.width as i32);
    let y1 = ((c.y + r).ceil() as i32).min(fb.height as i32);
    (x0, y0, x1, y1)
}

/// Visual: a magnifying glass. The image is drawn as-is, and inside the
/// lens disk it is enlarged `scale` times about the cursor, with a faint
/// white rim.
pub fn draw_zoom(fb: &mut FrameBuffer, source: &FrameBuffer, opts: &ZoomOptions, cursor: &Cursor) {
    if !cursor.active || source.width != fb.width || source.height != fb.height {
        return;
    }
    fb.pixels.copy_from_slice(&source.pixels);

    let c = cursor.pos;
    let r = opts.radius;
    let scale = opts.scale.max(0.01);
    let (x0, y0, x1, y1) = disk_bounds(fb, c, r);
    for y in y0..y1 {
        for x in x0..x1 {
            let (px, py) = (x as f32 + 0.5, y as f32 + 0.5);
            if (px - c.x).hypot(py - c.y) >= r {
                continue;
            }
            let sx = (c.x + (px - c.x) / scale).floor() as i32;
            let sy = (c.y + (py - c.y) / scale).floor() as i32;
            if let Some(argb) = source.get(sx, sy) {
                put_pixel(fb, x, y, argb);
            }
        }
    }
    stroke_ring(fb, c, r, RING_WIDTH, Rgb::WHITE, RING_ALPHA);
}

/// Blurred copy of the source, rebuilt on every sample pass.
pub struct BlurLayer {
    blurred: FrameBuffer,
    lut: GammaLut,
}

impl BlurLayer {
    pub fn new(source: &FrameBuffer, strength: u32) -> Self {
        let mut tmp = FrameBuffer::new(0, 0);
        let mut blurred = FrameBuffer::new(0, 0);
        box_blur(source, &mut tmp, &mut blurred, strength as usize);
        Self { blurred, lut: GammaLut::new() }
    }

    pub fn size(&self) -> (usize, usize) {
        (self.blurred.width, self.blurred.height)
    }
}

/// Visual: the image goes soft around the cursor, sharpening again across
/// the soft edge; everything else shows the untouched image underneath.
pub fn draw_blur(
    fb: &mut FrameBuffer,
    source: &FrameBuffer,
    layer: &BlurLayer,
    falloff: &Falloff,
    cursor: &Cursor,
) {
    let size = (fb.width, fb.height);
    if !cursor.active || layer.size() != size || (source.width, source.height) != size {
        return;
    }
    let (x0, y0, x1, y1) = disk_bounds(fb, cursor.pos, falloff.reach());
    for y in y0..y1 {
        for x in x0..x1 {
            let p = Point::new(x as f32 + 0.5, y as f32 + 0.5);
            let Some(t) = falloff.at_point(p, cursor.pos) else { continue };
            let (Some(sharp), Some(soft)) = (source.get(x, y), layer.blurred.get(x, y)) else { continue };
            let mixed = layer.lut.mix(Rgb::from_argb(sharp), Rgb::from_argb(soft), t);
            put_pixel(fb, x, y, mixed.to_argb((sharp >> 24) as u8));
        }
    }
}
