// Grid sampler: decoded image -> sparse list of cells.
// One representative pixel per grid position (no averaging), row-major
// order, transparent positions skipped.
// Visual: transparent parts of the image stay untouched by every style.

use image::RgbaImage;
use image::imageops::{self, FilterType};

use crate::error::Error;
use crate::types::{Cell, FrameBuffer, Point, Rgb};

/// The source image as the effect may read it.
#[derive(Clone)]
pub enum SourcePixels {
    /// Pixels drawn at surface size, ready to read.
    Readable(FrameBuffer),
    /// Decoded but refusing reads (cross-origin tainting).
    Tainted { width: usize, height: usize },
}

impl SourcePixels {
    /// Draw `img` at `width` x `height`, the way the page would scale it
    /// into the overlay canvas.
    pub fn from_image(img: &RgbaImage, width: u32, height: u32) -> Self {
        if width == 0 || height == 0 {
            return Self::Readable(FrameBuffer::new(width as usize, height as usize));
        }
        if img.dimensions() == (width, height) {
            return Self::Readable(FrameBuffer::from_rgba(img));
        }
        let scaled = imageops::resize(img, width, height, FilterType::Triangle);
        Self::Readable(FrameBuffer::from_rgba(&scaled))
    }

    pub fn size(&self) -> (usize, usize) {
        match self {
            Self::Readable(fb) => (fb.width, fb.height),
            Self::Tainted { width, height } => (*width, *height),
        }
    }

    pub fn read(&self) -> Result<&FrameBuffer, Error> {
        match self {
            Self::Readable(fb) => Ok(fb),
            Self::Tainted { .. } => Err(Error::SampleUnavailable("source image is tainted".into())),
        }
    }
}

/// Where a grid cell's reference point sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// Top-left of every step, including a partial last row/column.
    Corner,
    /// Center of every whole step; partial steps at the edges are dropped.
    Center,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridSpec {
    pub step: u32,
    pub alpha_threshold: u8,
    pub anchor: Anchor,
}

impl GridSpec {
    pub const fn corner(step: u32, alpha_threshold: u8) -> Self {
        Self { step, alpha_threshold, anchor: Anchor::Corner }
    }

    pub const fn center(step: u32) -> Self {
        Self { step, alpha_threshold: 0, anchor: Anchor::Center }
    }

    /// Columns and rows this spec lays over a surface.
    pub fn dimensions(&self, width: usize, height: usize) -> (u32, u32) {
        let step = self.step.max(1) as usize;
        match self.anchor {
            Anchor::Corner => (width.div_ceil(step) as u32, height.div_ceil(step) as u32),
            Anchor::Center => ((width / step) as u32, (height / step) as u32),
        }
    }
}

/// A sampled cell list plus the geometry it was sampled for.
#[derive(Debug, Clone, Default)]
pub struct Grid {
    pub spec: Option<GridSpec>,
    pub width: usize,
    pub height: usize,
    pub cols: u32,
    pub rows: u32,
    pub cells: Vec<Cell>,
}

impl Grid {
    pub fn empty(spec: GridSpec, width: usize, height: usize) -> Self {
        let (cols, rows) = spec.dimensions(width, height);
        Self { spec: Some(spec), width, height, cols, rows, cells: Vec::new() }
    }

    /// True when this grid was sampled for exactly this spec and surface size.
    pub fn matches(&self, spec: &GridSpec, width: usize, height: usize) -> bool {
        self.spec.as_ref() == Some(spec) && self.width == width && self.height == height
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Sample `source` on the grid described by `spec`.
///
/// A degenerate surface (zero width/height/cols/rows) yields an empty grid.
/// An unreadable source is `SampleUnavailable`; callers treat it as zero cells.
pub fn sample_grid(source: &SourcePixels, spec: &GridSpec) -> Result<Grid, Error> {
    let (width, height) = source.size();
    let spec = GridSpec { step: spec.step.max(1), ..*spec };
    let (cols, rows) = spec.dimensions(width, height);
    if cols == 0 || rows == 0 {
        return Ok(Grid::empty(spec, width, height));
    }
    let fb = source.read()?;

    let step = spec.step as f32;
    let mut cells = Vec::with_capacity(cols as usize * rows as usize);
    for row in 0..rows {
        for col in 0..cols {
            let (px, py, pos) = match spec.anchor {
                Anchor::Corner => {
                    let (x, y) = (col * spec.step, row * spec.step);
                    (x, y, Point::new(x as f32, y as f32))
                }
                Anchor::Center => {
                    let cx = (col as f32 + 0.5) * step;
                    let cy = (row as f32 + 0.5) * step;
                    (cx as u32, cy as u32, Point::new(cx, cy))
                }
            };
            let Some(argb) = fb.get(px as i32, py as i32) else { continue };
            if ((argb >> 24) & 0xFF) < spec.alpha_threshold as u32 {
                continue; // transparent here: leave a hole
            }
            cells.push(Cell { pos, col, row, rgb: Rgb::from_argb(argb) });
        }
    }

    log::debug!(
        "sampled {} cells on a {}x{} grid (step {}, {}x{} px)",
        cells.len(), cols, rows, spec.step, width, height
    );
    Ok(Grid { spec: Some(spec), width, height, cols, rows, cells })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn solid(width: u32, height: u32, alpha: u8) -> SourcePixels {
        let img = RgbaImage::from_pixel(width, height, image::Rgba([90, 30, 200, alpha]));
        SourcePixels::from_image(&img, width, height)
    }

    #[test]
    fn test_opaque_image_covers_ceil_grid() {
        let grid = sample_grid(&solid(320, 200, 255), &GridSpec::corner(16, 120)).unwrap();
        assert_eq!((grid.cols, grid.rows), (20, 13));
        assert_eq!(grid.len(), 260);

        let odd = sample_grid(&solid(33, 10, 255), &GridSpec::corner(8, 120)).unwrap();
        assert_eq!(odd.len(), 5 * 2);
    }

    #[test]
    fn test_transparent_image_has_no_cells() {
        let grid = sample_grid(&solid(64, 64, 0), &GridSpec::corner(4, 120)).unwrap();
        assert!(grid.is_empty());
    }

    #[test]
    fn test_alpha_threshold_skips_partially_transparent_cells() {
        let mut img = RgbaImage::from_pixel(32, 16, image::Rgba([255, 255, 255, 255]));
        // left half nearly transparent
        for y in 0..16 {
            for x in 0..16 {
                img.put_pixel(x, y, image::Rgba([255, 255, 255, 60]));
            }
        }
        let src = SourcePixels::from_image(&img, 32, 16);
        assert_eq!(sample_grid(&src, &GridSpec::corner(8, 120)).unwrap().len(), 4);
        assert_eq!(sample_grid(&src, &GridSpec::corner(8, 50)).unwrap().len(), 8);
    }

    #[test]
    fn test_sampling_is_idempotent_and_positions_unique() {
        let src = solid(100, 70, 255);
        let spec = GridSpec::corner(7, 120);
        let a = sample_grid(&src, &spec).unwrap();
        let b = sample_grid(&src, &spec).unwrap();
        let pos = |g: &Grid| g.cells.iter().map(|c| (c.pos.x as i32, c.pos.y as i32)).collect::<HashSet<_>>();
        assert_eq!(a.len(), b.len());
        assert_eq!(pos(&a), pos(&b));
        assert_eq!(pos(&a).len(), a.len());
    }

    #[test]
    fn test_degenerate_source_is_empty_not_error() {
        let grid = sample_grid(&solid(0, 0, 255), &GridSpec::corner(8, 0)).unwrap();
        assert!(grid.is_empty());
        let too_small = sample_grid(&solid(5, 5, 255), &GridSpec::center(9)).unwrap();
        assert!(too_small.is_empty());
    }

    #[test]
    fn test_tainted_source_is_unavailable() {
        let src = SourcePixels::Tainted { width: 40, height: 40 };
        let err = sample_grid(&src, &GridSpec::corner(8, 0)).unwrap_err();
        assert!(matches!(err, Error::SampleUnavailable(_)));
    }

    #[test]
    fn test_center_anchor_uses_whole_steps() {
        let grid = sample_grid(&solid(50, 20, 255), &GridSpec::center(9)).unwrap();
        assert_eq!((grid.cols, grid.rows), (5, 2));
        assert_eq!(grid.cells[0].pos, Point::new(4.5, 4.5));
    }

    #[test]
    fn test_matches_detects_resize() {
        let spec = GridSpec::center(9);
        let grid = sample_grid(&solid(50, 20, 255), &spec).unwrap();
        assert!(grid.matches(&spec, 50, 20));
        assert!(!grid.matches(&spec, 60, 20));
        assert!(!grid.matches(&GridSpec::center(10), 50, 20));
    }
}
