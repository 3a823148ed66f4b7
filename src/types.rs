// Core types shared by the sampler, the influence engine and every renderer.

use std::fmt;

/// One RGB color sampled from the source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Plain channel mean in 0..=255.
    /// Visual: what "how bright is this block" means for ASCII / LED styles.
    #[inline]
    pub fn brightness(self) -> f32 {
        (self.r as f32 + self.g as f32 + self.b as f32) / 3.0
    }

    /// Rec. 601 weighted luma in 0..=255 (used by the enhanced glyph pass).
    #[inline]
    pub fn luma(self) -> f32 {
        0.299 * self.r as f32 + 0.587 * self.g as f32 + 0.114 * self.b as f32
    }

    /// Pack as 0xAARRGGBB with the given alpha.
    #[inline]
    pub fn to_argb(self, alpha: u8) -> u32 {
        ((alpha as u32) << 24) | ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }

    #[inline]
    pub fn from_argb(px: u32) -> Self {
        Self {
            r: ((px >> 16) & 0xFF) as u8,
            g: ((px >> 8) & 0xFF) as u8,
            b: (px & 0xFF) as u8,
        }
    }
}

/// A 2D position in surface (= sampled image) pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn distance(self, other: Point) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// One sampled grid unit. Created once per sampling pass, immutable afterwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    pub pos: Point, // where distance-to-cursor is measured from
    pub col: u32,   // grid column (animation phases use it)
    pub row: u32,   // grid row
    pub rgb: Rgb,
}

/// ARGB software surface.
#[derive(Clone)]
pub struct FrameBuffer {
    pub width: usize,     // surface width in pixels
    pub height: usize,    // surface height in pixels
    pub pixels: Vec<u32>, // each entry is 0xAARRGGBB, straight (non-premultiplied) alpha
}

// Size only; the pixel vector is too long to be useful in logs.
impl fmt::Debug for FrameBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameBuffer").field("width", &self.width).field("height", &self.height).finish_non_exhaustive()
    }
}

impl FrameBuffer {
    /// Fully transparent buffer.
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height, pixels: vec![0u32; width * height] }
    }

    /// Copy an RGBA image into an opaque-where-the-image-is-opaque buffer.
    pub fn from_rgba(img: &image::RgbaImage) -> Self {
        let (w, h) = img.dimensions();
        let mut pixels = Vec::with_capacity((w as usize) * (h as usize));
        for px in img.pixels() {
            let [r, g, b, a] = px.0;
            pixels.push(Rgb::new(r, g, b).to_argb(a));
        }
        Self { width: w as usize, height: h as usize, pixels }
    }

    pub fn clear(&mut self) {
        self.pixels.fill(0);
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.pixels.clear();
        self.pixels.resize(width * height, 0);
    }

    #[inline]
    pub fn get(&self, x: i32, y: i32) -> Option<u32> {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return None;
        }
        Some(self.pixels[y as usize * self.width + x as usize])
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_argb_round_trip_keeps_channels() {
        let c = Rgb::new(12, 200, 7);
        let px = c.to_argb(128);
        assert_eq!(px >> 24, 128);
        assert_eq!(Rgb::from_argb(px), c);
    }

    #[test]
    fn test_brightness_is_channel_mean() {
        assert_eq!(Rgb::new(30, 60, 90).brightness(), 60.0);
        assert!(Rgb::WHITE.luma() > 254.9);
    }

    #[test]
    fn test_get_out_of_bounds_is_none() {
        let fb = FrameBuffer::new(4, 3);
        assert_eq!(fb.get(3, 2), Some(0));
        assert_eq!(fb.get(4, 0), None);
        assert_eq!(fb.get(-1, 0), None);
    }

    #[test]
    fn test_debug_shows_size_not_pixels() {
        let fb = FrameBuffer::new(3, 2);
        assert_eq!(format!("{fb:?}"), "FrameBuffer { width: 3, height: 2, .. }");
        let surface = crate::surface::RenderSurface::new(3, 2);
        assert!(format!("{surface:?}").contains("width: 3"));
    }
}
