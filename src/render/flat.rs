// Flat-fill styles: pixel blocks and the LED dot matrix.

use rand::{Rng, RngCore};

use crate::cursor::Cursor;
use crate::influence::Falloff;
use crate::params::{AnimationType, ColorMode, DotMatrixOptions};
use crate::raster::{add_glow_disc, fill_disc, fill_rect};
use crate::types::{Cell, FrameBuffer, Point, Rgb};

/// Visual: the image turns into square blocks of `block` px around the
/// cursor, fading out across the soft edge.
pub fn draw_pixels(fb: &mut FrameBuffer, cells: &[Cell], block: u32, falloff: &Falloff, cursor: &Cursor) {
    if !cursor.active {
        return;
    }
    let s = block as f32;
    for cell in cells {
        let Some(eased) = falloff.at_point(cell.pos, cursor.pos) else { continue };
        fill_rect(fb, cell.pos.x, cell.pos.y, s, s, cell.rgb, eased, None);
    }
}

const LED_CYAN: Rgb = Rgb::new(0, 255, 255);
const MIN_LED_ALPHA: f32 = 0.05;
const MAX_DRIFT_VELOCITY: f32 = 0.8;

/// Per-LED animation transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LedMotion {
    pub offset: Point,
    pub scale: f32,
    /// Radians. Invisible on a round LED.
    pub rotation: f32,
}

impl LedMotion {
    const REST: LedMotion = LedMotion { offset: Point::new(0.0, 0.0), scale: 1.0, rotation: 0.0 };
}

/// Bounded random walk per LED for the `drift` animation.
#[derive(Debug, Clone, Default)]
pub struct LedDrift {
    cols: u32,
    offsets: Vec<Point>,
    velocities: Vec<Point>,
}

impl LedDrift {
    pub fn new(cols: u32, rows: u32, rng: &mut dyn RngCore) -> Self {
        let n = cols as usize * rows as usize;
        let velocities = (0..n)
            .map(|_| Point::new((rng.random::<f32>() - 0.5) * 0.5, (rng.random::<f32>() - 0.5) * 0.5))
            .collect();
        Self { cols, offsets: vec![Point::default(); n], velocities }
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// One accepted frame of drift.
    pub fn step(&mut self, speed: f32, intensity: f32, rng: &mut dyn RngCore) {
        for (off, vel) in self.offsets.iter_mut().zip(self.velocities.iter_mut()) {
            off.x += vel.x * speed;
            off.y += vel.y * speed;

            if rng.random::<f32>() < 0.02 {
                vel.x += (rng.random::<f32>() - 0.5) * 0.1;
                vel.y += (rng.random::<f32>() - 0.5) * 0.1;
            }
            vel.x = vel.x.clamp(-MAX_DRIFT_VELOCITY, MAX_DRIFT_VELOCITY);
            vel.y = vel.y.clamp(-MAX_DRIFT_VELOCITY, MAX_DRIFT_VELOCITY);
            off.x = off.x.clamp(-intensity, intensity);
            off.y = off.y.clamp(-intensity, intensity);
        }
    }

    pub fn offset(&self, col: u32, row: u32) -> Point {
        let idx = row as usize * self.cols as usize + col as usize;
        self.offsets.get(idx).copied().unwrap_or_default()
    }
}

/// Closed-form animation for one LED at grid (col,row) on accepted frame `frame`.
pub fn led_motion(
    opts: &DotMatrixOptions,
    col: u32,
    row: u32,
    frame: u64,
    cursor: Point,
    drift: &LedDrift,
) -> LedMotion {
    let t = frame as f32 * 0.1 * opts.animation_speed;
    let i = opts.animation_intensity;
    let (gx, gy) = (col as f32, row as f32);
    match opts.animation_type {
        AnimationType::None => LedMotion::REST,
        AnimationType::Wave => LedMotion {
            offset: Point::new((t + gx * 0.3).sin() * i, (t + gy * 0.3).cos() * i),
            scale: 1.0 + (t + (gx + gy) * 0.2).sin() * 0.3,
            rotation: 0.0,
        },
        AnimationType::Pulse => {
            let pulse = (t + (gx + gy) * 0.1).sin() * 0.5 + 0.5;
            LedMotion { scale: 1.0 + pulse * 0.8, ..LedMotion::REST }
        }
        AnimationType::Drift => LedMotion { offset: drift.offset(col, row), ..LedMotion::REST },
        AnimationType::Ripple => {
            // distance in grid units from the LED under the cursor
            let spacing = opts.spacing().max(1) as f32;
            let d = (gx - cursor.x / spacing).hypot(gy - cursor.y / spacing);
            let ripple = (t * 2.0 - d * 0.5).sin() * i;
            LedMotion { scale: (1.0 + ripple * 0.3).max(0.0), ..LedMotion::REST }
        }
        AnimationType::Rotation => {
            let spin = t * 0.5;
            let r = i * 0.5;
            LedMotion {
                offset: Point::new((spin + gx * 0.1).cos() * r, (spin + gy * 0.1).sin() * r),
                scale: 1.0,
                rotation: spin + (gx + gy) * 0.1,
            }
        }
    }
}

/// Visual: a black panel of round LEDs near the cursor; each lights up with
/// the brightness of the image under it, in cyan or in the image's color.
/// Influence is measured from the LED's rest position, so animation never
/// changes which LEDs are lit.
pub fn draw_dot_matrix(
    fb: &mut FrameBuffer,
    cells: &[Cell],
    opts: &DotMatrixOptions,
    falloff: &Falloff,
    cursor: &Cursor,
    frame: u64,
    drift: &LedDrift,
) {
    if !cursor.active {
        return;
    }
    fb.pixels.fill(Rgb::BLACK.to_argb(255));

    let led_r = opts.led_size as f32 / 2.0;
    for cell in cells {
        let Some(influence) = falloff.at_point(cell.pos, cursor.pos) else { continue };
        let alpha = cell.rgb.brightness() / 255.0 * influence;
        if alpha < MIN_LED_ALPHA {
            continue;
        }
        let color = match opts.color_mode {
            ColorMode::Mono => LED_CYAN,
            ColorMode::Rgb => cell.rgb,
        };
        let m = led_motion(opts, cell.col, cell.row, frame, cursor.pos, drift);
        let center = Point::new(cell.pos.x + m.offset.x, cell.pos.y + m.offset.y);
        let r = led_r * m.scale;

        if opts.glow {
            add_glow_disc(fb, center, r + 4.0 * m.scale, color, alpha * 0.35);
        }
        fill_disc(fb, center, r, color, alpha);
    }
}
