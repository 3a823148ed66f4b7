// Style renderers.
// One `Renderer` variant per style holds whatever that style keeps between
// frames (particles, LED drift, blurred copies). It is rebuilt on every
// sample pass and asked to draw once per accepted frame.

pub mod extruded;
pub mod flat;
pub mod glyph;
pub mod lens;
pub mod particles;

use std::time::Duration;

use rand::RngCore;

use crate::cursor::{Cursor, CursorMotion};
use crate::influence::Falloff;
use crate::params::{AnimationType, EffectOptions};
use crate::sampler::{Grid, SourcePixels};
use crate::types::FrameBuffer;

use self::flat::LedDrift;
use self::glyph::GlyphBackdrop;
use self::lens::BlurLayer;
use self::particles::ParticleField;

/// Everything a renderer may look at for one frame.
pub struct FrameCtx<'a> {
    pub cursor: Cursor,
    pub falloff: Falloff,
    pub motion: &'a CursorMotion,
    /// Accepted frame number (LED animations).
    pub frame: u64,
    /// Host time (glitch clock, particle wobble).
    pub now: Duration,
}

pub enum Renderer {
    Pixel,
    Voxel,
    Brick,
    Dust(ParticleField),
    Glyph(GlyphBackdrop),
    Led(LedDrift),
    Zoom,
    Blur(Option<BlurLayer>),
}

impl Renderer {
    /// Fresh per-style state for a newly sampled grid.
    pub fn prepare(opts: &EffectOptions, grid: &Grid, source: &SourcePixels, rng: &mut dyn RngCore) -> Self {
        match opts {
            EffectOptions::Pixel(_) => Renderer::Pixel,
            EffectOptions::Minecraft(_) => Renderer::Voxel,
            EffectOptions::Lego(_) => Renderer::Brick,
            EffectOptions::ParticleDust(o) => Renderer::Dust(ParticleField::from_cells(&grid.cells, o.spacing, rng)),
            EffectOptions::Ascii(_) => Renderer::Glyph(GlyphBackdrop::default()),
            EffectOptions::DotMatrix(_) => Renderer::Led(LedDrift::new(grid.cols, grid.rows, rng)),
            EffectOptions::Zoom(_) => Renderer::Zoom,
            EffectOptions::Blur(o) => Renderer::Blur(source.read().ok().map(|fb| BlurLayer::new(fb, o.strength))),
        }
    }

    /// Redraw `fb` from scratch. Draws nothing while the cursor is inactive.
    pub fn draw(
        &mut self,
        fb: &mut FrameBuffer,
        opts: &EffectOptions,
        grid: &Grid,
        source: &SourcePixels,
        ctx: &FrameCtx<'_>,
        rng: &mut dyn RngCore,
    ) {
        fb.clear();
        if !ctx.cursor.active {
            return;
        }
        let (cells, cursor, falloff) = (&grid.cells[..], &ctx.cursor, &ctx.falloff);
        let pixels = source.read().ok();

        match (self, opts) {
            (Renderer::Pixel, EffectOptions::Pixel(o)) => flat::draw_pixels(fb, cells, o.block_size, falloff, cursor),
            (Renderer::Voxel, EffectOptions::Minecraft(o)) => {
                extruded::draw_voxels(fb, cells, o.block_size, falloff, cursor)
            }
            (Renderer::Brick, EffectOptions::Lego(o)) => extruded::draw_bricks(fb, cells, o, falloff, cursor),
            (Renderer::Dust(field), EffectOptions::ParticleDust(o)) => {
                particles::draw_particles(fb, pixels, field, o, falloff, cursor, ctx.motion, ctx.now, rng)
            }
            (Renderer::Glyph(backdrop), EffectOptions::Ascii(o)) => {
                glyph::draw_glyphs(fb, cells, pixels, o, falloff, cursor, ctx.now, backdrop)
            }
            (Renderer::Led(drift), EffectOptions::DotMatrix(o)) => {
                if o.animation_type == AnimationType::Drift {
                    if drift.len() != cells_in(grid) {
                        *drift = LedDrift::new(grid.cols, grid.rows, rng);
                    }
                    drift.step(o.animation_speed, o.animation_intensity, rng);
                }
                flat::draw_dot_matrix(fb, cells, o, falloff, cursor, ctx.frame, drift)
            }
            (Renderer::Zoom, EffectOptions::Zoom(o)) => {
                if let Some(src) = pixels {
                    lens::draw_zoom(fb, src, o, cursor)
                }
            }
            (Renderer::Blur(layer), EffectOptions::Blur(_)) => {
                if let (Some(src), Some(layer)) = (pixels, layer.as_ref()) {
                    lens::draw_blur(fb, src, layer, falloff, cursor)
                }
            }
            _ => log::warn!("renderer does not match {} options; skipping frame", opts.tag()),
        }
    }
}

fn cells_in(grid: &Grid) -> usize {
    grid.cols as usize * grid.rows as usize
}
