// Separable box blur over ARGB buffers.
// Visual: `dst` becomes a soft copy of `src`; used by the blur lens and the
// enhanced ASCII depth backdrop.

use crate::types::FrameBuffer;

/// Radii past this are clamped; wider windows look the same on real images.
pub const MAX_RADIUS: usize = 1024;

#[inline]
fn channels(px: u32) -> [u64; 4] {
    [(px >> 24) & 0xFF, (px >> 16) & 0xFF, (px >> 8) & 0xFF, px & 0xFF].map(u64::from)
}

#[inline]
fn pack(sum: [u64; 4], win: u64) -> u32 {
    let [a, r, g, b] = sum.map(|s| (s / win) as u32);
    (a << 24) | (r << 16) | (g << 8) | b
}

/// One sliding-window pass. `get(i)` reads the i-th sample along the line,
/// `set(i, px)` writes it. Edges are clamped so borders don't darken.
fn blur_line(len: i32, r: i32, get: impl Fn(usize) -> u32, mut set: impl FnMut(usize, u32)) {
    let win = (2 * r + 1) as u64;
    let first = channels(get(0));
    let mut sum = first.map(|c| c * (r as u64 + 1));

    for i in 1..=r {
        let c = channels(get(i.min(len - 1) as usize));
        for k in 0..4 {
            sum[k] += c[k];
        }
    }

    for i in 0..len {
        set(i as usize, pack(sum, win));
        let sub = channels(get((i - r).max(0) as usize));
        let add = channels(get((i + r + 1).min(len - 1) as usize));
        for k in 0..4 {
            sum[k] = sum[k] + add[k] - sub[k];
        }
    }
}

/// Blur `src` into `dst` using `tmp` as scratch for the horizontal pass.
/// Buffers are resized to match `src`; radius 0 copies.
pub fn box_blur(src: &FrameBuffer, tmp: &mut FrameBuffer, dst: &mut FrameBuffer, radius: usize) {
    if tmp.width != src.width || tmp.height != src.height {
        tmp.resize(src.width, src.height);
    }
    if dst.width != src.width || dst.height != src.height {
        dst.resize(src.width, src.height);
    }
    if src.is_empty() {
        return;
    }
    if radius == 0 {
        dst.pixels.copy_from_slice(&src.pixels);
        return;
    }

    let w = src.width;
    let h = src.height;
    let r = radius.min(MAX_RADIUS) as i32;

    // Pass 1: rows, src -> tmp
    for y in 0..h {
        let row = y * w;
        let out = &mut tmp.pixels[row..row + w];
        blur_line(w as i32, r, |i| src.pixels[row + i], |i, px| out[i] = px);
    }

    // Pass 2: columns, tmp -> dst
    for x in 0..w {
        let input = &tmp.pixels;
        let out = &mut dst.pixels;
        blur_line(h as i32, r, |i| input[i * w + x], |i, px| out[i * w + x] = px);
    }
}
